use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::backend::domain::errors::{LedgerError, LedgerResult};
use crate::backend::domain::models::{payment_method::PaymentMethod, visit_payment::VisitPayment};
use crate::backend::storage::connection::DbConnection;

/// Repository for patient visit payments
#[derive(Clone)]
pub struct VisitPaymentRepository {
    db: DbConnection,
}

impl VisitPaymentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_visit_payment(row: &SqliteRow) -> LedgerResult<VisitPayment> {
        let id: String = row.try_get("id")?;
        let method: String = row.try_get("method")?;
        let method = PaymentMethod::parse(&method).ok_or_else(|| {
            LedgerError::CorruptRecord(format!("visit payment {}: unknown method '{}'", id, method))
        })?;

        Ok(VisitPayment {
            id,
            date: row.try_get("date")?,
            patient_name: row.try_get("patient_name")?,
            amount: row.try_get("amount")?,
            method,
            description: row.try_get("description")?,
        })
    }

    pub async fn list_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<VisitPayment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, date, patient_name, amount, method, description
            FROM visit_payments
            WHERE date = ?
            ORDER BY ROWID ASC
            "#,
        )
        .bind(date)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_visit_payment).collect()
    }

    pub async fn get(&self, id: &str) -> LedgerResult<Option<VisitPayment>> {
        let mut conn = self.db.acquire().await?;
        self.find(&mut conn, id).await
    }

    pub async fn find(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> LedgerResult<Option<VisitPayment>> {
        let row = sqlx::query(
            r#"
            SELECT id, date, patient_name, amount, method, description
            FROM visit_payments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(Self::row_to_visit_payment).transpose()
    }

    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        payment: &VisitPayment,
    ) -> LedgerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO visit_payments (id, date, patient_name, amount, method, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(payment.date)
        .bind(&payment.patient_name)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(&payment.description)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn update(
        &self,
        conn: &mut SqliteConnection,
        payment: &VisitPayment,
    ) -> LedgerResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE visit_payments
            SET date = ?, patient_name = ?, amount = ?, method = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(payment.date)
        .bind(&payment.patient_name)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(&payment.description)
        .bind(&payment.id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, conn: &mut SqliteConnection, id: &str) -> LedgerResult<bool> {
        let result = sqlx::query("DELETE FROM visit_payments WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
