use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::backend::domain::errors::{LedgerError, LedgerResult};
use crate::backend::domain::models::{expense::Expense, payment_method::PaymentMethod};
use crate::backend::storage::connection::DbConnection;

/// Repository for clinic expenses
#[derive(Clone)]
pub struct ExpenseRepository {
    db: DbConnection,
}

impl ExpenseRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_expense(row: &SqliteRow) -> LedgerResult<Expense> {
        let id: String = row.try_get("id")?;
        let method: String = row.try_get("method")?;
        let method = PaymentMethod::parse(&method).ok_or_else(|| {
            LedgerError::CorruptRecord(format!("expense {}: unknown method '{}'", id, method))
        })?;

        Ok(Expense {
            id,
            date: row.try_get("date")?,
            vendor: row.try_get("vendor")?,
            amount: row.try_get("amount")?,
            method,
            description: row.try_get("description")?,
        })
    }

    pub async fn list_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, date, vendor, amount, method, description
            FROM expenses
            WHERE date = ?
            ORDER BY ROWID ASC
            "#,
        )
        .bind(date)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    pub async fn get(&self, id: &str) -> LedgerResult<Option<Expense>> {
        let mut conn = self.db.acquire().await?;
        self.find(&mut conn, id).await
    }

    pub async fn find(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> LedgerResult<Option<Expense>> {
        let row = sqlx::query(
            r#"
            SELECT id, date, vendor, amount, method, description
            FROM expenses
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(Self::row_to_expense).transpose()
    }

    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        expense: &Expense,
    ) -> LedgerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, date, vendor, amount, method, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.id)
        .bind(expense.date)
        .bind(&expense.vendor)
        .bind(expense.amount)
        .bind(expense.method.as_str())
        .bind(&expense.description)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn update(
        &self,
        conn: &mut SqliteConnection,
        expense: &Expense,
    ) -> LedgerResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET date = ?, vendor = ?, amount = ?, method = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(expense.date)
        .bind(&expense.vendor)
        .bind(expense.amount)
        .bind(expense.method.as_str())
        .bind(&expense.description)
        .bind(&expense.id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, conn: &mut SqliteConnection, id: &str) -> LedgerResult<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
