//! Spend aggregation and the budget status projection

use chrono::NaiveDateTime;
use rusqlite::params;

use super::Database;
use crate::budget_status::build_budget_status;
use crate::error::Result;
use crate::models::{BudgetStatus, Category, CategoryTotal, MonthlyTotal, SpendSummary};
use crate::period::Period;

fn format_bound(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Row counts across the whole store, for the CLI status command
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub total_budgets: i64,
    pub total_expenses: i64,
    pub total_users: i64,
}

impl Database {
    /// Sum a user's spending per category within [start, end], ordered by
    /// total descending. Categories without expenses in range are absent;
    /// an inverted range simply matches nothing.
    pub fn category_totals(
        &self,
        user: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CategoryTotal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category, SUM(amount) as total, COUNT(*) as tx_count
            FROM expenses
            WHERE user_email = ? AND date BETWEEN ? AND ?
            GROUP BY category
            ORDER BY total DESC
            "#,
        )?;

        let totals = stmt
            .query_map(
                params![user, format_bound(start), format_bound(end)],
                |row| {
                    let category_str: String = row.get(0)?;
                    Ok(CategoryTotal {
                        category: category_str.parse().unwrap_or(Category::Other),
                        total: row.get(1)?,
                        count: row.get(2)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }

    /// Sum a user's spending per calendar month of one year, ordered by
    /// month ascending. Months without expenses are absent.
    pub fn monthly_totals(&self, user: &str, year: i32) -> Result<Vec<MonthlyTotal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT CAST(strftime('%m', date) AS INTEGER) as month, SUM(amount) as total, COUNT(*) as tx_count
            FROM expenses
            WHERE user_email = ? AND date BETWEEN ? AND ?
            GROUP BY month
            ORDER BY month ASC
            "#,
        )?;

        let start = format!("{}-01-01 00:00:00", year);
        let end = format!("{}-12-31 23:59:59", year);
        let totals = stmt
            .query_map(params![user, start, end], |row| {
                let month: i64 = row.get(0)?;
                Ok(MonthlyTotal {
                    month: month as u32,
                    total: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }

    /// Total, transaction count and average expense within [start, end]
    pub fn spend_summary(
        &self,
        user: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<SpendSummary> {
        let conn = self.conn()?;
        let summary = conn.query_row(
            r#"
            SELECT COALESCE(SUM(amount), 0), COUNT(*), COALESCE(AVG(amount), 0)
            FROM expenses
            WHERE user_email = ? AND date BETWEEN ? AND ?
            "#,
            params![user, format_bound(start), format_bound(end)],
            |row| {
                Ok(SpendSummary {
                    total: row.get(0)?,
                    count: row.get(1)?,
                    avg_expense: row.get(2)?,
                })
            },
        )?;

        Ok(summary)
    }

    /// Store-wide row counts
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;
        let stats = conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(*) FROM budgets),
                (SELECT COUNT(*) FROM expenses),
                (SELECT COUNT(*) FROM (
                    SELECT user_email FROM budgets
                    UNION
                    SELECT user_email FROM expenses
                ))
            "#,
            [],
            |row| {
                Ok(StoreStats {
                    total_budgets: row.get(0)?,
                    total_expenses: row.get(1)?,
                    total_users: row.get(2)?,
                })
            },
        )?;

        Ok(stats)
    }

    /// The full budget status list for a user's (month, year): every budget
    /// row joined with actual spending over the month's bounds.
    /// Recomputed from the store on every call; nothing is cached.
    pub fn budget_status(&self, user: &str, month: u32, year: i32) -> Result<Vec<BudgetStatus>> {
        let period = Period::new(month, year);
        let (start, end) = period.bounds();

        let budgets = self.list_budgets(user, month, year)?;
        let totals = self.category_totals(user, start, end)?;

        Ok(build_budget_status(budgets, &totals))
    }
}
