//! Budget operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Budget, BudgetCategory, BudgetUpdate, Category, NewBudget};

const BUDGET_COLUMNS: &str =
    "id, user_email, category, limit_amount, month, year, alert_threshold, notes, created_at, updated_at";

fn map_budget_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    let category_str: String = row.get(2)?;
    let month: i64 = row.get(4)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    Ok(Budget {
        id: row.get(0)?,
        user: row.get(1)?,
        category: category_str
            .parse()
            .unwrap_or(BudgetCategory::Spending(Category::Other)),
        limit: row.get(3)?,
        month: month as u32,
        year: row.get(5)?,
        alert_threshold: row.get(6)?,
        notes: row.get(7)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

impl Database {
    /// List a user's budgets for one (month, year) period.
    /// No explicit ordering; consumers sort if they need to.
    pub fn list_budgets(&self, user: &str, month: u32, year: i32) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE user_email = ? AND month = ? AND year = ?",
            BUDGET_COLUMNS
        ))?;

        let budgets = stmt
            .query_map(params![user, month, year], map_budget_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Get a budget by id, scoped to its owner
    pub fn get_budget(&self, user: &str, id: i64) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                &format!(
                    "SELECT {} FROM budgets WHERE id = ? AND user_email = ?",
                    BUDGET_COLUMNS
                ),
                params![id, user],
                map_budget_row,
            )
            .optional()?;

        Ok(budget)
    }

    /// Create a budget, or update the existing one for the same
    /// (user, category, month, year) in a single atomic statement.
    ///
    /// The limit is always overwritten; alert_threshold and notes only when
    /// provided. The unique index is the enforcement mechanism, so two
    /// concurrent creates cannot race into duplicates.
    pub fn upsert_budget(&self, user: &str, new: &NewBudget) -> Result<Budget> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO budgets (user_email, category, limit_amount, month, year, alert_threshold, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, 80), ?7)
            ON CONFLICT(user_email, category, month, year) DO UPDATE SET
                limit_amount = excluded.limit_amount,
                alert_threshold = COALESCE(?6, budgets.alert_threshold),
                notes = COALESCE(?7, budgets.notes),
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                user,
                new.category.as_str(),
                new.limit,
                new.month,
                new.year,
                new.alert_threshold,
                new.notes,
            ],
        )?;

        let budget = conn.query_row(
            &format!(
                "SELECT {} FROM budgets WHERE user_email = ? AND category = ? AND month = ? AND year = ?",
                BUDGET_COLUMNS
            ),
            params![user, new.category.as_str(), new.month, new.year],
            map_budget_row,
        )?;

        Ok(budget)
    }

    /// Apply a partial update to an existing budget.
    /// Returns None when the id does not exist or belongs to another user.
    pub fn update_budget(
        &self,
        user: &str,
        id: i64,
        update: &BudgetUpdate,
    ) -> Result<Option<Budget>> {
        let conn = self.conn()?;

        let mut sets = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(limit) = update.limit {
            sets.push("limit_amount = ?");
            values.push(Box::new(limit));
        }
        if let Some(threshold) = update.alert_threshold {
            sets.push("alert_threshold = ?");
            values.push(Box::new(threshold));
        }
        if let Some(ref notes) = update.notes {
            sets.push("notes = ?");
            values.push(Box::new(notes.clone()));
        }

        if !sets.is_empty() {
            sets.push("updated_at = CURRENT_TIMESTAMP");
            let sql = format!("UPDATE budgets SET {} WHERE id = ? AND user_email = ?", sets.join(", "));
            values.push(Box::new(id));
            values.push(Box::new(user.to_string()));

            let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            let changed = conn.execute(&sql, refs.as_slice())?;
            if changed == 0 {
                return Ok(None);
            }
        }

        drop(conn);
        self.get_budget(user, id)
    }

    /// Delete a budget; returns false when nothing matched
    pub fn delete_budget(&self, user: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM budgets WHERE id = ? AND user_email = ?",
            params![id, user],
        )?;
        Ok(deleted > 0)
    }

    /// Copy the previous month's budgets into (month, year).
    ///
    /// Existing budgets in the target month are left untouched; only
    /// categories without a target-month entry are created, carrying over
    /// the previous limit and alert threshold (notes are not copied).
    /// Returns the target-month budget for every copied category, or an
    /// empty list when the previous month has no budgets at all.
    pub fn copy_budgets_from_previous_month(
        &self,
        user: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<Budget>> {
        let period = crate::period::Period::new(month, year);
        let prev = period.previous();

        let prev_budgets = self.list_budgets(user, prev.month, prev.year)?;
        if prev_budgets.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let mut copied = Vec::with_capacity(prev_budgets.len());

        for prev_budget in &prev_budgets {
            conn.execute(
                r#"
                INSERT INTO budgets (user_email, category, limit_amount, month, year, alert_threshold)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(user_email, category, month, year) DO NOTHING
                "#,
                params![
                    user,
                    prev_budget.category.as_str(),
                    prev_budget.limit,
                    month,
                    year,
                    prev_budget.alert_threshold,
                ],
            )?;

            let budget = conn.query_row(
                &format!(
                    "SELECT {} FROM budgets WHERE user_email = ? AND category = ? AND month = ? AND year = ?",
                    BUDGET_COLUMNS
                ),
                params![user, prev_budget.category.as_str(), month, year],
                map_budget_row,
            )?;
            copied.push(budget);
        }

        Ok(copied)
    }
}
