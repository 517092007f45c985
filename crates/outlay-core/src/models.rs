//! Domain models for Outlay

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spending categories for expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transportation,
    Entertainment,
    Shopping,
    Utilities,
    Healthcare,
    Education,
    Travel,
    Subscriptions,
    Groceries,
    Rent,
    Other,
}

impl Category {
    /// Human-readable label for presentation surfaces
    pub fn label(&self) -> &'static str {
        match self {
            Self::Food => "Food & Dining",
            Self::Transportation => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Utilities => "Utilities",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Travel => "Travel",
            Self::Subscriptions => "Subscriptions",
            Self::Groceries => "Groceries",
            Self::Rent => "Rent",
            Self::Other => "Other",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transportation => "transportation",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Utilities => "utilities",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Travel => "travel",
            Self::Subscriptions => "subscriptions",
            Self::Groceries => "groceries",
            Self::Rent => "rent",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "transportation" => Ok(Self::Transportation),
            "entertainment" => Ok(Self::Entertainment),
            "shopping" => Ok(Self::Shopping),
            "utilities" => Ok(Self::Utilities),
            "healthcare" => Ok(Self::Healthcare),
            "education" => Ok(Self::Education),
            "travel" => Ok(Self::Travel),
            "subscriptions" => Ok(Self::Subscriptions),
            "groceries" => Ok(Self::Groceries),
            "rent" => Ok(Self::Rent),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget target: either one spending category or the "total" sentinel
/// covering the whole month across every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BudgetCategory {
    /// Whole-month budget across all categories
    Total,
    /// Budget for a single spending category
    Spending(Category),
}

impl BudgetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Spending(c) => c.as_str(),
        }
    }

    /// Human-readable label for presentation surfaces
    pub fn label(&self) -> &'static str {
        match self {
            Self::Total => "Total Budget",
            Self::Spending(c) => c.label(),
        }
    }

    /// The underlying spending category, unless this is the total sentinel
    pub fn spending(&self) -> Option<Category> {
        match self {
            Self::Total => None,
            Self::Spending(c) => Some(*c),
        }
    }

    pub fn is_total(&self) -> bool {
        matches!(self, Self::Total)
    }
}

impl std::str::FromStr for BudgetCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("total") {
            return Ok(Self::Total);
        }
        s.parse::<Category>().map(Self::Spending)
    }
}

impl std::fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<BudgetCategory> for String {
    fn from(c: BudgetCategory) -> Self {
        c.as_str().to_string()
    }
}

impl TryFrom<String> for BudgetCategory {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// Payment method used for an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Credit,
    Debit,
    Upi,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Upi => "upi",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "upi" => Ok(Self::Upi),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending limit for one category (or the total sentinel) in one
/// calendar month. At most one budget exists per (user, category, month,
/// year); the database enforces this with a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: i64,
    /// Owning user identifier (email or API principal)
    pub user: String,
    pub category: BudgetCategory,
    pub limit: f64,
    /// Calendar month, 1-12
    pub month: u32,
    pub year: i32,
    /// Percentage of the limit at which the near-limit flag trips (50-100)
    pub alert_threshold: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating (or atomically updating) a budget
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub category: BudgetCategory,
    pub limit: f64,
    pub month: u32,
    pub year: i32,
    pub alert_threshold: Option<f64>,
    pub notes: Option<String>,
}

impl NewBudget {
    /// Field-level validation mirroring the API contract.
    /// Category parsing is already enforced by deserialization.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.limit < 1.0 {
            return Err("Budget limit must be at least 1".to_string());
        }
        if !(1..=12).contains(&self.month) {
            return Err("Month must be between 1 and 12".to_string());
        }
        if !(2020..=2100).contains(&self.year) {
            return Err("Invalid year".to_string());
        }
        if let Some(threshold) = self.alert_threshold {
            if !(50.0..=100.0).contains(&threshold) {
                return Err("Alert threshold must be between 50 and 100".to_string());
            }
        }
        if let Some(ref notes) = self.notes {
            if notes.len() > 200 {
                return Err("Notes cannot be more than 200 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Partial update for an existing budget; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub limit: Option<f64>,
    pub alert_threshold: Option<f64>,
    pub notes: Option<String>,
}

impl BudgetUpdate {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(limit) = self.limit {
            if limit < 1.0 {
                return Err("Budget limit must be at least 1".to_string());
            }
        }
        if let Some(threshold) = self.alert_threshold {
            if !(50.0..=100.0).contains(&threshold) {
                return Err("Alert threshold must be between 50 and 100".to_string());
            }
        }
        if let Some(ref notes) = self.notes {
            if notes.len() > 200 {
                return Err("Notes cannot be more than 200 characters".to_string());
            }
        }
        Ok(())
    }
}

/// A single spending transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    /// Owning user identifier
    pub user: String,
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Informational only; not used by aggregation
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or replacing an expense
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub amount: f64,
    pub category: Category,
    pub description: String,
    /// Defaults to the current time when omitted
    pub date: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub is_recurring: Option<bool>,
}

impl NewExpense {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.amount < 0.01 {
            return Err("Amount must be greater than 0".to_string());
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err("Description is required".to_string());
        }
        if description.len() > 200 {
            return Err("Description cannot be more than 200 characters".to_string());
        }
        if let Some(ref notes) = self.notes {
            if notes.len() > 500 {
                return Err("Notes cannot be more than 500 characters".to_string());
            }
        }
        Ok(())
    }
}

/// A budget joined with actual spending for its period.
/// Computed fresh on every request; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    #[serde(flatten)]
    pub budget: Budget,
    /// Sum of matching expense amounts (grand total for the total sentinel)
    pub spent: f64,
    /// limit - spent
    pub remaining: f64,
    /// spent / limit * 100, rounded to 2 decimals; 0 when limit <= 0
    pub percentage: f64,
    pub is_over_budget: bool,
    /// percentage in [alert_threshold, 100)
    pub is_near_limit: bool,
}

/// Aggregated spend for one category within a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub count: i64,
}

/// Aggregated spend for one calendar month of a year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: u32,
    pub total: f64,
    pub count: i64,
}

/// Sum/count/average over all expenses in a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendSummary {
    pub total: f64,
    pub count: i64,
    pub avg_expense: f64,
}
