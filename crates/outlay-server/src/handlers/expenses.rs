//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{get_user_email, ApiResponse, AppError, AppState, MAX_PAGE_LIMIT};
use outlay_core::budget_status::round2;
use outlay_core::db::ExpenseFilter;
use outlay_core::models::{Category, CategoryTotal, Expense, MonthlyTotal, NewExpense};
use outlay_core::period::Period;

use super::budgets::{read_json_body, resolve_period, PeriodQuery};

/// Query parameters for the expense listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExpensesQuery {
    pub category: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    /// Case-insensitive substring of the description
    pub search: Option<String>,
    /// `date`, `amount` or `createdAt`, prefixed with `-` for descending
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Response for the paginated expense listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListResponse {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub data: Vec<Expense>,
}

fn parse_date_param(value: &str, name: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).expect("valid time").and_utc());
    }
    Err(AppError::bad_request(&format!(
        "Invalid {} format (use RFC 3339 or YYYY-MM-DD)",
        name
    )))
}

/// GET /api/expenses - Filtered, paginated expense listing
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListExpensesQuery>,
    headers: HeaderMap,
) -> Result<Json<ExpenseListResponse>, AppError> {
    let user = get_user_email(&headers);

    let category = params
        .category
        .as_deref()
        .map(|s| {
            s.parse::<Category>()
                .map_err(|_| AppError::bad_request(&format!("Invalid category: {}", s)))
        })
        .transpose()?;

    let start_date = params
        .start_date
        .as_deref()
        .map(|s| parse_date_param(s, "startDate"))
        .transpose()?;
    let end_date = params
        .end_date
        .as_deref()
        .map(|s| parse_date_param(s, "endDate"))
        .transpose()?;

    let sort = ExpenseFilter::parse_sort(params.sort.as_deref().unwrap_or("-date"))
        .map_err(|msg| AppError::bad_request(&msg))?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, MAX_PAGE_LIMIT);

    let filter = ExpenseFilter::new()
        .category(category)
        .date_range(start_date, end_date)
        .amount_range(params.min_amount, params.max_amount)
        .search(params.search.as_deref())
        .sort(sort)
        .page(page, limit);

    let result = state.db.list_expenses(&user, &filter)?;

    let total_pages = (result.total + limit - 1) / limit;

    Ok(Json(ExpenseListResponse {
        success: true,
        count: result.expenses.len(),
        total: result.total,
        total_pages,
        current_page: page,
        data: result.expenses,
    }))
}

/// GET /api/expenses/:id - Get a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let user = get_user_email(&headers);

    let expense = state
        .db
        .get_expense(&user, id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    Ok(Json(ApiResponse::new(expense)))
}

/// POST /api/expenses - Record a new expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<ApiResponse<Expense>>), AppError> {
    let user = get_user_email(request.headers());
    let new: NewExpense = read_json_body(request).await?;

    new.validate().map_err(|msg| AppError::bad_request(&msg))?;

    let expense = state.db.create_expense(&user, &new)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(expense))))
}

/// PUT /api/expenses/:id - Replace an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<ApiResponse<Expense>>, AppError> {
    let user = get_user_email(request.headers());
    let update: NewExpense = read_json_body(request).await?;

    update.validate().map_err(|msg| AppError::bad_request(&msg))?;

    let expense = state
        .db
        .update_expense(&user, id, &update)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    Ok(Json(ApiResponse::new(expense)))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let user = get_user_email(&headers);

    if !state.db.delete_expense(&user, id)? {
        return Err(AppError::not_found("Expense not found"));
    }

    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}

/// Month-over-month spending change
#[derive(Debug, Serialize)]
pub struct MonthOverMonth {
    /// Current total minus previous month's total
    pub amount: f64,
    /// Change relative to the previous month, rounded to 2 decimals;
    /// 0 when there was no spending last month
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_spent: f64,
    pub transaction_count: i64,
    pub avg_expense: f64,
    pub daily_average: f64,
    pub month_over_month: MonthOverMonth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    pub summary: StatsSummary,
    pub category_breakdown: Vec<CategoryTotal>,
    pub monthly_trend: Vec<MonthlyTotal>,
    pub recent_expenses: Vec<Expense>,
    pub period: Period,
}

/// GET /api/expenses/stats - Spending statistics for a month: totals,
/// month-over-month change, daily average, category breakdown, the year's
/// monthly trend and the five most recent expenses
pub async fn get_expense_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ExpenseStats>>, AppError> {
    let user = get_user_email(&headers);
    let period = resolve_period(&params)?;
    let previous = period.previous();

    let (start, end) = period.bounds();
    let (prev_start, prev_end) = previous.bounds();

    let category_breakdown = state.db.category_totals(&user, start, end)?;
    let monthly_trend = state.db.monthly_totals(&user, period.year)?;
    let current = state.db.spend_summary(&user, start, end)?;
    let prev_total = state.db.spend_summary(&user, prev_start, prev_end)?.total;
    let recent_expenses = state.db.recent_expenses(&user, 5)?;

    let percent_change = if prev_total > 0.0 {
        (current.total - prev_total) / prev_total * 100.0
    } else {
        0.0
    };

    // Average over the days elapsed so far, capped at the month's length
    let days_in_month = period.days_in_month();
    let days_passed = Utc::now().day().min(days_in_month);
    let daily_average = if days_passed > 0 {
        current.total / days_passed as f64
    } else {
        0.0
    };

    Ok(Json(ApiResponse::new(ExpenseStats {
        summary: StatsSummary {
            total_spent: current.total,
            transaction_count: current.count,
            avg_expense: current.avg_expense,
            daily_average,
            month_over_month: MonthOverMonth {
                amount: current.total - prev_total,
                percentage: round2(percent_change),
            },
        },
        category_breakdown,
        monthly_trend,
        recent_expenses,
        period,
    })))
}
