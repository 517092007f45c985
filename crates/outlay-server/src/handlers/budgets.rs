//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{get_user_email, ApiResponse, AppError, AppState, ListResponse};
use outlay_core::budget_status::round2;
use outlay_core::models::{Budget, BudgetCategory, BudgetStatus, BudgetUpdate, NewBudget};
use outlay_core::period::Period;

/// Query parameters selecting a (month, year) period; both default to the
/// current date on the server
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Resolve and validate a period query
pub fn resolve_period(params: &PeriodQuery) -> Result<Period, AppError> {
    let current = Period::current();
    let month = params.month.unwrap_or(current.month);
    let year = params.year.unwrap_or(current.year);

    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request("Month must be between 1 and 12"));
    }
    if !(2020..=2100).contains(&year) {
        return Err(AppError::bad_request("Invalid year"));
    }

    Ok(Period::new(month, year))
}

/// GET /api/budgets - List budgets for a period
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodQuery>,
    headers: HeaderMap,
) -> Result<Json<ListResponse<Budget>>, AppError> {
    let user = get_user_email(&headers);
    let period = resolve_period(&params)?;

    let budgets = state.db.list_budgets(&user, period.month, period.year)?;

    Ok(Json(ListResponse::new(budgets)))
}

/// Overall totals across all non-"total" budgets of the period
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub overall_percentage: f64,
    pub over_budget_count: usize,
    pub near_limit_count: usize,
}

#[derive(Debug, Serialize)]
pub struct OverBudgetAlert {
    pub category: BudgetCategory,
    /// spent - limit
    pub overspent: f64,
}

#[derive(Debug, Serialize)]
pub struct NearLimitAlert {
    pub category: BudgetCategory,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusAlerts {
    pub over_budget: Vec<OverBudgetAlert>,
    pub near_limit: Vec<NearLimitAlert>,
}

#[derive(Debug, Serialize)]
pub struct BudgetStatusReport {
    pub budgets: Vec<BudgetStatus>,
    pub summary: StatusSummary,
    pub alerts: StatusAlerts,
    pub period: Period,
}

/// GET /api/budgets/status - Budgets joined with actual spending, plus
/// summary totals and alert lists
pub async fn get_budget_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<BudgetStatusReport>>, AppError> {
    let user = get_user_email(&headers);
    let period = resolve_period(&params)?;

    let statuses = state.db.budget_status(&user, period.month, period.year)?;

    // Overall stats ignore the "total" sentinel so limits are not counted twice
    let total_budget: f64 = statuses
        .iter()
        .filter(|s| !s.budget.category.is_total())
        .map(|s| s.budget.limit)
        .sum();
    let total_spent: f64 = statuses
        .iter()
        .filter(|s| !s.budget.category.is_total())
        .map(|s| s.spent)
        .sum();
    let overall_percentage = if total_budget > 0.0 {
        round2(total_spent / total_budget * 100.0)
    } else {
        0.0
    };

    let over_budget: Vec<OverBudgetAlert> = statuses
        .iter()
        .filter(|s| s.is_over_budget)
        .map(|s| OverBudgetAlert {
            category: s.budget.category,
            overspent: s.spent - s.budget.limit,
        })
        .collect();
    let near_limit: Vec<NearLimitAlert> = statuses
        .iter()
        .filter(|s| s.is_near_limit)
        .map(|s| NearLimitAlert {
            category: s.budget.category,
            percentage: s.percentage,
        })
        .collect();

    let report = BudgetStatusReport {
        summary: StatusSummary {
            total_budget,
            total_spent,
            total_remaining: total_budget - total_spent,
            overall_percentage,
            over_budget_count: over_budget.len(),
            near_limit_count: near_limit.len(),
        },
        alerts: StatusAlerts {
            over_budget,
            near_limit,
        },
        budgets: statuses,
        period,
    };

    Ok(Json(ApiResponse::new(report)))
}

/// Maximum accepted body size for budget/expense payloads (64 KB)
pub(crate) const MAX_BODY_SIZE: usize = 64 * 1024;

/// Read and deserialize a JSON request body, mapping failures to 400
pub(crate) async fn read_json_body<T: serde::de::DeserializeOwned>(
    request: Request,
) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}

/// POST /api/budgets - Create a budget, or update the existing one for the
/// same (category, month, year) in place
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<ApiResponse<Budget>>), AppError> {
    let user = get_user_email(request.headers());
    let new: NewBudget = read_json_body(request).await?;

    new.validate().map_err(|msg| AppError::bad_request(&msg))?;

    let budget = state.db.upsert_budget(&user, &new)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(budget))))
}

/// PUT /api/budgets/:id - Update a budget's limit, threshold or notes
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<ApiResponse<Budget>>, AppError> {
    let user = get_user_email(request.headers());
    let update: BudgetUpdate = read_json_body(request).await?;

    update.validate().map_err(|msg| AppError::bad_request(&msg))?;

    let budget = state
        .db
        .update_budget(&user, id, &update)?
        .ok_or_else(|| AppError::not_found("Budget not found"))?;

    Ok(Json(ApiResponse::new(budget)))
}

/// DELETE /api/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let user = get_user_email(&headers);

    if !state.db.delete_budget(&user, id)? {
        return Err(AppError::not_found("Budget not found"));
    }

    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}

/// Request body for copying budgets from the previous month
#[derive(Debug, Deserialize)]
pub struct CopyBudgetsRequest {
    pub month: u32,
    pub year: i32,
}

/// POST /api/budgets/copy - Copy the previous month's budgets into the
/// given period, skipping categories that already have one
pub async fn copy_budgets(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<ListResponse<Budget>>), AppError> {
    let user = get_user_email(request.headers());
    let req: CopyBudgetsRequest = read_json_body(request).await?;

    let period = resolve_period(&PeriodQuery {
        month: Some(req.month),
        year: Some(req.year),
    })?;

    let copied = state
        .db
        .copy_budgets_from_previous_month(&user, period.month, period.year)?;

    if copied.is_empty() {
        return Err(AppError::not_found("No budgets found for previous month"));
    }

    Ok((StatusCode::CREATED, Json(ListResponse::new(copied))))
}
