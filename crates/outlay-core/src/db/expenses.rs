//! Expense operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::expense_filter::{ExpenseFilter, ExpensePage};
use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{Category, Expense, NewExpense, PaymentMethod};

const EXPENSE_COLUMNS: &str =
    "id, user_email, amount, category, description, date, payment_method, notes, is_recurring, created_at, updated_at";

fn map_expense_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let category_str: String = row.get(3)?;
    let date_str: String = row.get(5)?;
    let payment_method_str: String = row.get(6)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    Ok(Expense {
        id: row.get(0)?,
        user: row.get(1)?,
        amount: row.get(2)?,
        category: category_str.parse().unwrap_or(Category::Other),
        description: row.get(4)?,
        date: parse_datetime(&date_str),
        payment_method: payment_method_str.parse().unwrap_or(PaymentMethod::Cash),
        notes: row.get(7)?,
        is_recurring: row.get(8)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

impl Database {
    /// Record a new expense; the date defaults to now when omitted
    pub fn create_expense(&self, user: &str, new: &NewExpense) -> Result<Expense> {
        let conn = self.conn()?;

        let date = new.date.unwrap_or_else(Utc::now);
        conn.execute(
            r#"
            INSERT INTO expenses (user_email, amount, category, description, date, payment_method, notes, is_recurring)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user,
                new.amount,
                new.category.as_str(),
                new.description.trim(),
                format_datetime(date),
                new.payment_method.unwrap_or_default().as_str(),
                new.notes,
                new.is_recurring.unwrap_or(false),
            ],
        )?;
        let id = conn.last_insert_rowid();

        let expense = conn.query_row(
            &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
            params![id],
            map_expense_row,
        )?;

        Ok(expense)
    }

    /// Get an expense by id, scoped to its owner
    pub fn get_expense(&self, user: &str, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!(
                    "SELECT {} FROM expenses WHERE id = ? AND user_email = ?",
                    EXPENSE_COLUMNS
                ),
                params![id, user],
                map_expense_row,
            )
            .optional()?;

        Ok(expense)
    }

    /// Replace an expense's fields.
    /// Returns None when the id does not exist or belongs to another user.
    pub fn update_expense(
        &self,
        user: &str,
        id: i64,
        update: &NewExpense,
    ) -> Result<Option<Expense>> {
        let conn = self.conn()?;

        let date = update.date.unwrap_or_else(Utc::now);
        let changed = conn.execute(
            r#"
            UPDATE expenses
            SET amount = ?, category = ?, description = ?, date = ?, payment_method = ?,
                notes = ?, is_recurring = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND user_email = ?
            "#,
            params![
                update.amount,
                update.category.as_str(),
                update.description.trim(),
                format_datetime(date),
                update.payment_method.unwrap_or_default().as_str(),
                update.notes,
                update.is_recurring.unwrap_or(false),
                id,
                user,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        drop(conn);
        self.get_expense(user, id)
    }

    /// Delete an expense; returns false when nothing matched
    pub fn delete_expense(&self, user: &str, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_email = ?",
            params![id, user],
        )?;
        Ok(deleted > 0)
    }

    /// List one page of a user's expenses with the given filter, together
    /// with the total match count for pagination
    pub fn list_expenses(&self, user: &str, filter: &ExpenseFilter<'_>) -> Result<ExpensePage> {
        let conn = self.conn()?;
        let built = filter.build(user);

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM expenses {}", built.where_clause),
            built.params_refs().as_slice(),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {} FROM expenses {} {} LIMIT ? OFFSET ?",
            EXPENSE_COLUMNS, built.where_clause, built.order_clause
        );
        let mut stmt = conn.prepare(&sql)?;

        let mut query_params = built.params;
        query_params.push(Box::new(filter.limit));
        query_params.push(Box::new(filter.offset()));
        let refs: Vec<&dyn rusqlite::ToSql> = query_params.iter().map(|p| p.as_ref()).collect();

        let expenses = stmt
            .query_map(refs.as_slice(), map_expense_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ExpensePage { expenses, total })
    }

    /// The most recently dated expenses for a user
    pub fn recent_expenses(&self, user: &str, limit: i64) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE user_email = ? ORDER BY date DESC, id DESC LIMIT ?",
            EXPENSE_COLUMNS
        ))?;

        let expenses = stmt
            .query_map(params![user, limit], map_expense_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }
}
