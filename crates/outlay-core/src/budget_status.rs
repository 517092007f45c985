//! Budget status projection
//!
//! Joins a period's budget rows with aggregated category spending to
//! produce the derived per-budget view (spent, remaining, percentage and
//! the over-budget/near-limit flags). Pure computation; the database layer
//! supplies both inputs and `Database::budget_status` glues them together.

use std::collections::HashMap;

use crate::models::{Budget, BudgetStatus, Category, CategoryTotal};

/// Round to two decimal places, matching the API's percentage formatting
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Merge budget rows with category spend totals.
///
/// A budget for the `total` sentinel is charged the grand total across all
/// categories; any other budget is charged its category's total, defaulting
/// to zero when the category has no expenses in range. Categories with
/// spending but no budget row do not appear in the output. Input order of
/// the budget rows is preserved.
pub fn build_budget_status(budgets: Vec<Budget>, totals: &[CategoryTotal]) -> Vec<BudgetStatus> {
    let spending: HashMap<Category, f64> =
        totals.iter().map(|t| (t.category, t.total)).collect();
    let grand_total: f64 = totals.iter().map(|t| t.total).sum();

    budgets
        .into_iter()
        .map(|budget| {
            let spent = match budget.category.spending() {
                None => grand_total,
                Some(category) => spending.get(&category).copied().unwrap_or(0.0),
            };

            let percentage = if budget.limit > 0.0 {
                round2(spent / budget.limit * 100.0)
            } else {
                0.0
            };

            BudgetStatus {
                remaining: budget.limit - spent,
                percentage,
                is_over_budget: spent > budget.limit,
                is_near_limit: percentage >= budget.alert_threshold && percentage < 100.0,
                spent,
                budget,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetCategory;
    use chrono::Utc;

    fn budget(category: BudgetCategory, limit: f64, alert_threshold: f64) -> Budget {
        Budget {
            id: 1,
            user: "test@example.com".to_string(),
            category,
            limit,
            month: 3,
            year: 2024,
            alert_threshold,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn total(category: Category, amount: f64, count: i64) -> CategoryTotal {
        CategoryTotal {
            category,
            total: amount,
            count,
        }
    }

    #[test]
    fn near_limit_and_total_sentinel() {
        // Food limit 500 with 420 spent, plus a whole-month budget of 1000
        let budgets = vec![
            budget(BudgetCategory::Spending(Category::Food), 500.0, 80.0),
            budget(BudgetCategory::Total, 1000.0, 80.0),
        ];
        let totals = vec![total(Category::Food, 420.0, 7)];

        let status = build_budget_status(budgets, &totals);
        assert_eq!(status.len(), 2);

        let food = &status[0];
        assert_eq!(food.spent, 420.0);
        assert_eq!(food.remaining, 80.0);
        assert_eq!(food.percentage, 84.00);
        assert!(!food.is_over_budget);
        assert!(food.is_near_limit);

        let overall = &status[1];
        assert_eq!(overall.spent, 420.0);
        assert_eq!(overall.remaining, 580.0);
        assert_eq!(overall.percentage, 42.00);
        assert!(!overall.is_over_budget);
        assert!(!overall.is_near_limit);
    }

    #[test]
    fn missing_category_defaults_to_zero() {
        let budgets = vec![budget(BudgetCategory::Spending(Category::Rent), 1200.0, 80.0)];
        let totals = vec![total(Category::Food, 99.0, 3)];

        let status = build_budget_status(budgets, &totals);
        assert_eq!(status[0].spent, 0.0);
        assert_eq!(status[0].remaining, 1200.0);
        assert_eq!(status[0].percentage, 0.0);
        assert!(!status[0].is_over_budget);
        assert!(!status[0].is_near_limit);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        let budgets = vec![budget(BudgetCategory::Spending(Category::Food), 100.0, 80.0)];
        let totals = vec![total(Category::Food, 77.123, 1)];

        let status = build_budget_status(budgets, &totals);
        assert_eq!(status[0].percentage, 77.12);
    }

    #[test]
    fn flags_at_exactly_one_hundred_percent() {
        // spent == limit: not over budget (strict >), not near-limit
        // (percentage must stay below 100)
        let budgets = vec![budget(BudgetCategory::Spending(Category::Food), 200.0, 80.0)];
        let totals = vec![total(Category::Food, 200.0, 4)];

        let status = build_budget_status(budgets, &totals);
        assert_eq!(status[0].percentage, 100.0);
        assert!(!status[0].is_over_budget);
        assert!(!status[0].is_near_limit);
    }

    #[test]
    fn over_budget_excludes_near_limit() {
        let budgets = vec![budget(BudgetCategory::Spending(Category::Food), 100.0, 80.0)];
        let totals = vec![total(Category::Food, 130.0, 2)];

        let status = build_budget_status(budgets, &totals);
        assert!(status[0].is_over_budget);
        assert!(!status[0].is_near_limit);
        assert_eq!(status[0].remaining, -30.0);
    }

    #[test]
    fn non_positive_limit_yields_zero_percentage() {
        // Limits are constrained to >= 1 at the API boundary; defensive only
        let budgets = vec![budget(BudgetCategory::Spending(Category::Food), 0.0, 80.0)];
        let totals = vec![total(Category::Food, 50.0, 1)];

        let status = build_budget_status(budgets, &totals);
        assert_eq!(status[0].percentage, 0.0);
        assert!(status[0].is_over_budget);
    }

    #[test]
    fn unbudgeted_spending_is_excluded() {
        // Spending in a category without a budget row never surfaces in the
        // status list; category-level sums and the grand total diverge.
        let budgets = vec![
            budget(BudgetCategory::Spending(Category::Food), 500.0, 80.0),
            budget(BudgetCategory::Total, 1000.0, 80.0),
        ];
        let totals = vec![
            total(Category::Food, 100.0, 1),
            total(Category::Travel, 250.0, 1),
        ];

        let status = build_budget_status(budgets, &totals);
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].spent, 100.0);
        // The total sentinel still sees the unbudgeted travel spend
        assert_eq!(status[1].spent, 350.0);
    }
}
