use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::backend::domain::errors::LedgerResult;
use crate::backend::domain::models::ledger_record::LedgerRecord;
use crate::backend::storage::connection::DbConnection;

const SELECT_COLUMNS: &str = r#"
    SELECT id, date, kind, amount, description, source_visit_payment_id, source_expense_id
    FROM ledger_records
"#;

/// Repository for ledger record operations.
///
/// Read helpers run against the pool. Every write takes a connection so the
/// caller decides whether it belongs to a larger transaction.
#[derive(Clone)]
pub struct LedgerRepository {
    db: DbConnection,
}

impl LedgerRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_record(row: &SqliteRow) -> LedgerResult<LedgerRecord> {
        LedgerRecord::from_parts(
            row.try_get("id")?,
            row.try_get("date")?,
            row.try_get::<String, _>("kind")?.as_str(),
            row.try_get("amount")?,
            row.try_get("description")?,
            row.try_get("source_visit_payment_id")?,
            row.try_get("source_expense_id")?,
        )
    }

    fn rows_to_records(rows: &[SqliteRow]) -> LedgerResult<Vec<LedgerRecord>> {
        rows.iter().map(Self::row_to_record).collect()
    }

    /// All records dated `date`, oldest insert first
    pub async fn list_records_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<LedgerRecord>> {
        let rows = sqlx::query(&format!("{} WHERE date = ? ORDER BY ROWID ASC", SELECT_COLUMNS))
            .bind(date)
            .fetch_all(self.db.pool())
            .await?;
        Self::rows_to_records(&rows)
    }

    pub async fn get_record(&self, id: &str) -> LedgerResult<Option<LedgerRecord>> {
        let mut conn = self.db.acquire().await?;
        self.find_record(&mut conn, id).await
    }

    /// Most recent date strictly before `date` that has at least one record
    pub async fn latest_activity_date_before(
        &self,
        date: NaiveDate,
    ) -> LedgerResult<Option<NaiveDate>> {
        let row = sqlx::query(
            r#"
            SELECT date
            FROM ledger_records
            WHERE date < ?
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .bind(date)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_get("date")?)),
            None => Ok(None),
        }
    }

    /// Signed sum of every record dated on or before `date`
    pub async fn net_total_through(&self, date: NaiveDate) -> LedgerResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(CASE WHEN kind = 'Income' THEN amount ELSE -amount END), 0)
            FROM ledger_records
            WHERE date <= ?
            "#,
        )
        .bind(date)
        .fetch_one(self.db.pool())
        .await?;
        Ok(total)
    }

    pub async fn find_record(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> LedgerResult<Option<LedgerRecord>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(Self::row_to_record).transpose()
    }

    pub async fn find_records_for_visit_payment(
        &self,
        conn: &mut SqliteConnection,
        visit_payment_id: &str,
    ) -> LedgerResult<Vec<LedgerRecord>> {
        let rows = sqlx::query(&format!(
            "{} WHERE source_visit_payment_id = ? ORDER BY ROWID ASC",
            SELECT_COLUMNS
        ))
        .bind(visit_payment_id)
        .fetch_all(&mut *conn)
        .await?;
        Self::rows_to_records(&rows)
    }

    pub async fn find_records_for_expense(
        &self,
        conn: &mut SqliteConnection,
        expense_id: &str,
    ) -> LedgerResult<Vec<LedgerRecord>> {
        let rows = sqlx::query(&format!(
            "{} WHERE source_expense_id = ? ORDER BY ROWID ASC",
            SELECT_COLUMNS
        ))
        .bind(expense_id)
        .fetch_all(&mut *conn)
        .await?;
        Self::rows_to_records(&rows)
    }

    pub async fn insert_record(
        &self,
        conn: &mut SqliteConnection,
        record: &LedgerRecord,
    ) -> LedgerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ledger_records
                (id, date, kind, amount, description, source_visit_payment_id, source_expense_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.date)
        .bind(record.kind.as_str())
        .bind(record.amount)
        .bind(&record.description)
        .bind(&record.source_visit_payment_id)
        .bind(&record.source_expense_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Overwrite date, amount and description. Kind and source references
    /// never change after insert.
    pub async fn update_record(
        &self,
        conn: &mut SqliteConnection,
        record: &LedgerRecord,
    ) -> LedgerResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ledger_records
            SET date = ?, amount = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(record.date)
        .bind(record.amount)
        .bind(&record.description)
        .bind(&record.id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_record(&self, conn: &mut SqliteConnection, id: &str) -> LedgerResult<bool> {
        let result = sqlx::query("DELETE FROM ledger_records WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_records_for_visit_payment(
        &self,
        conn: &mut SqliteConnection,
        visit_payment_id: &str,
    ) -> LedgerResult<u64> {
        let result = sqlx::query("DELETE FROM ledger_records WHERE source_visit_payment_id = ?")
            .bind(visit_payment_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_records_for_expense(
        &self,
        conn: &mut SqliteConnection,
        expense_id: &str,
    ) -> LedgerResult<u64> {
        let result = sqlx::query("DELETE FROM ledger_records WHERE source_expense_id = ?")
            .bind(expense_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
