//! Expense listing and statistics commands

use anyhow::Result;
use outlay_core::db::Database;
use outlay_core::period::Period;

use super::truncate;

pub fn cmd_expenses_list(db: &Database, user: &str, limit: i64) -> Result<()> {
    let expenses = db.recent_expenses(user, limit)?;

    println!();
    println!("🧾 Recent Expenses");
    println!("   ─────────────────────────────────────────────────────────────");

    if expenses.is_empty() {
        println!("   No expenses recorded yet.");
        return Ok(());
    }

    println!(
        "   {:10} │ {:>10} │ {:15} │ {:30}",
        "Date", "Amount", "Category", "Description"
    );
    println!("   ───────────┼────────────┼─────────────────┼────────────────");

    for expense in &expenses {
        println!(
            "   {:10} │ {:>10.2} │ {:15} │ {:30}",
            expense.date.format("%Y-%m-%d"),
            expense.amount,
            expense.category.label(),
            truncate(&expense.description, 30)
        );
    }

    Ok(())
}

pub fn cmd_expense_stats(
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

    let (start, end) = period.bounds();
    let summary = db.spend_summary(user, start, end)?;
    let totals = db.category_totals(user, start, end)?;

    println!();
    println!("📈 Spending Statistics");
    println!("   Period: {}", period);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total spent: ${:.2}", summary.total);
    println!("   Transactions: {}", summary.count);
    println!("   Average expense: ${:.2}", summary.avg_expense);

    if totals.is_empty() {
        println!();
        println!("   No spending found in this period.");
        return Ok(());
    }

    println!();
    println!("   {:15} │ {:>10} │ {:>5}", "Category", "Amount", "Count");
    println!("   ────────────────┼────────────┼──────");
    for t in &totals {
        println!(
            "   {:15} │ {:>10.2} │ {:>5}",
            truncate(t.category.label(), 15),
            t.total,
            t.count
        );
    }

    Ok(())
}
