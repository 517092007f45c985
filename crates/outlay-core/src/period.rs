//! Calendar period (month/year) helpers
//!
//! Budgets and the status report operate on whole calendar months. The
//! boundary rule is fixed: a period covers the first instant of day 1
//! through 23:59:59 of the last day, where the last day is the day before
//! the 1st of the following month.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};

/// One calendar month of one year
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Self {
        Self { month, year }
    }

    /// The current month according to the system clock (UTC)
    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        Self {
            month: today.month(),
            year: today.year(),
        }
    }

    /// The month immediately before this one, rolling over year boundaries
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                month: 12,
                year: self.year - 1,
            }
        } else {
            Self {
                month: self.month - 1,
                year: self.year,
            }
        }
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        // month is validated to 1-12 before a Period is built
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(self.year, 1, 1).expect("valid date"))
    }

    /// Last day of the month (day before the 1st of the next month)
    pub fn last_day(&self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or_else(|| self.first_day())
    }

    /// Inclusive datetime bounds of the month:
    /// [day 1 00:00:00, last day 23:59:59]
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.first_day().and_hms_opt(0, 0, 0).expect("valid time");
        let end = self.last_day().and_hms_opt(23, 59, 59).expect("valid time");
        (start, end)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_whole_month() {
        let (start, end) = Period::new(3, 2024).bounds();
        assert_eq!(start.to_string(), "2024-03-01 00:00:00");
        assert_eq!(end.to_string(), "2024-03-31 23:59:59");
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = Period::new(12, 2023).bounds();
        assert_eq!(start.to_string(), "2023-12-01 00:00:00");
        assert_eq!(end.to_string(), "2023-12-31 23:59:59");
    }

    #[test]
    fn february_leap_year() {
        assert_eq!(Period::new(2, 2024).days_in_month(), 29);
        assert_eq!(Period::new(2, 2023).days_in_month(), 28);
        let (_, end) = Period::new(2, 2024).bounds();
        assert_eq!(end.to_string(), "2024-02-29 23:59:59");
    }

    #[test]
    fn previous_rolls_over_january() {
        assert_eq!(Period::new(1, 2024).previous(), Period::new(12, 2023));
        assert_eq!(Period::new(7, 2024).previous(), Period::new(6, 2024));
    }
}
