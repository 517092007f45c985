//! Budget status report command

use anyhow::Result;
use outlay_core::db::Database;
use outlay_core::period::Period;

use super::truncate;

pub fn cmd_budgets_status(
    db: &Database,
    user: &str,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<()> {
    let current = Period::current();
    let period = Period::new(
        month.unwrap_or(current.month),
        year.unwrap_or(current.year),
    );
    if !(1..=12).contains(&period.month) {
        anyhow::bail!("Month must be between 1 and 12");
    }

    let status = db.budget_status(user, period.month, period.year)?;

    println!();
    println!("💰 Budget Status");
    println!("   Period: {}", period);
    println!("   ─────────────────────────────────────────────────────────────");

    if status.is_empty() {
        println!("   No budgets configured for this period.");
        println!("   Set one with: POST /api/budgets");
        return Ok(());
    }

    println!(
        "   {:15} │ {:>10} │ {:>10} │ {:>10} │ {:>6} │",
        "Category", "Limit", "Spent", "Remaining", "%"
    );
    println!("   ────────────────┼────────────┼────────────┼────────────┼────────┼──────");

    for s in &status {
        let flag = if s.is_over_budget {
            "🔴 over"
        } else if s.is_near_limit {
            "🟡 near"
        } else {
            ""
        };
        println!(
            "   {:15} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>5.1}% │ {}",
            truncate(s.budget.category.label(), 15),
            s.budget.limit,
            s.spent,
            s.remaining,
            s.percentage,
            flag
        );
    }

    // Overall totals skip the "total" sentinel so limits are not double-counted
    let total_budget: f64 = status
        .iter()
        .filter(|s| !s.budget.category.is_total())
        .map(|s| s.budget.limit)
        .sum();
    let total_spent: f64 = status
        .iter()
        .filter(|s| !s.budget.category.is_total())
        .map(|s| s.spent)
        .sum();

    println!();
    println!(
        "   Total budgeted: ${:.2}   spent: ${:.2}   remaining: ${:.2}",
        total_budget,
        total_spent,
        total_budget - total_spent
    );

    Ok(())
}
