//! Expense filter builder for constructing dynamic SQL queries
//!
//! Builder for the WHERE/ORDER BY components of the expense listing, shared
//! between the page query and the matching COUNT query so the two can never
//! drift apart.

use chrono::{DateTime, Utc};

use super::format_datetime;
use crate::models::Category;

/// Sortable columns of the expense listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Amount,
    CreatedAt,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One page of a filtered expense listing, plus the unpaged match count
#[derive(Debug)]
pub struct ExpensePage {
    pub expenses: Vec<crate::models::Expense>,
    pub total: i64,
}

/// Builder for constructing expense query filters
#[derive(Debug, Clone)]
pub struct ExpenseFilter<'query> {
    pub category: Option<Category>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub search: Option<&'query str>,
    pub sort: (SortField, SortOrder),
    pub page: i64,
    pub limit: i64,
}

impl Default for ExpenseFilter<'_> {
    fn default() -> Self {
        Self {
            category: None,
            start_date: None,
            end_date: None,
            min_amount: None,
            max_amount: None,
            search: None,
            sort: (SortField::Date, SortOrder::Desc),
            page: 1,
            limit: 20,
        }
    }
}

impl<'query> ExpenseFilter<'query> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn date_range(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn amount_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    /// Case-insensitive substring search over descriptions
    pub fn search(mut self, query: Option<&'query str>) -> Self {
        self.search = query;
        self
    }

    pub fn sort(mut self, sort: (SortField, SortOrder)) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, page: i64, limit: i64) -> Self {
        self.page = page.max(1);
        self.limit = limit.max(1);
        self
    }

    /// Parse a sort key of the form `date`, `-date`, `amount`, `-amount`,
    /// `createdAt`, `-createdAt` (leading `-` means descending)
    pub fn parse_sort(key: &str) -> std::result::Result<(SortField, SortOrder), String> {
        let (order, field) = match key.strip_prefix('-') {
            Some(rest) => (SortOrder::Desc, rest),
            None => (SortOrder::Asc, key),
        };
        let field = match field {
            "date" => SortField::Date,
            "amount" => SortField::Amount,
            "createdAt" => SortField::CreatedAt,
            _ => return Err(format!("Unknown sort field: {}", field)),
        };
        Ok((field, order))
    }

    /// Build the shared SQL components. The owning user is always the first
    /// condition; callers supply pagination separately.
    pub fn build(&self, user: &str) -> FilterResult {
        let mut conditions = vec!["user_email = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user.to_string())];

        if let Some(category) = self.category {
            conditions.push("category = ?".to_string());
            params.push(Box::new(category.as_str()));
        }

        if let Some(start) = self.start_date {
            conditions.push("date >= ?".to_string());
            params.push(Box::new(format_datetime(start)));
        }

        if let Some(end) = self.end_date {
            conditions.push("date <= ?".to_string());
            params.push(Box::new(format_datetime(end)));
        }

        if let Some(min) = self.min_amount {
            conditions.push("amount >= ?".to_string());
            params.push(Box::new(min));
        }

        if let Some(max) = self.max_amount {
            conditions.push("amount <= ?".to_string());
            params.push(Box::new(max));
        }

        if let Some(q) = self.search {
            if !q.trim().is_empty() {
                conditions.push("description LIKE ? COLLATE NOCASE".to_string());
                params.push(Box::new(format!("%{}%", q.trim())));
            }
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let (field, order) = self.sort;
        let order_clause = format!(
            "ORDER BY {} {}, id DESC",
            field.column(),
            order.keyword()
        );

        FilterResult {
            where_clause,
            order_clause,
            params,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Result of building a filter - SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including the "WHERE" keyword
    pub where_clause: String,
    /// ORDER BY clause including the "ORDER BY" keyword
    pub order_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl FilterResult {
    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
