//! Visit payment service.
//!
//! Only the cash-relevant slice of visit registration lives here: saving a
//! payment keeps its `Income` ledger row in step, inside the same
//! transaction as the payment itself.

use chrono::NaiveDate;
use tracing::{error, info};

use crate::backend::domain::{
    commands::visit_payments::{
        DeleteVisitPaymentResult, SaveVisitPaymentCommand, VisitPaymentResult,
    },
    errors::{LedgerError, LedgerResult, ValidationIssue},
    ledger_service::{LedgerService, LinkedSource},
    manual_deposit_form::normalize_text,
    models::visit_payment::VisitPayment,
    refresh_coordinator::RefreshReason,
};
use crate::backend::storage::{DbConnection, VisitPaymentRepository};

#[derive(Clone)]
pub struct VisitPaymentService {
    db: DbConnection,
    visit_payment_repository: VisitPaymentRepository,
    ledger_service: LedgerService,
}

impl VisitPaymentService {
    pub fn new(db: DbConnection, ledger_service: LedgerService) -> Self {
        let visit_payment_repository = VisitPaymentRepository::new(db.clone());
        Self {
            db,
            visit_payment_repository,
            ledger_service,
        }
    }

    pub async fn list_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<VisitPayment>> {
        self.visit_payment_repository.list_for_date(date).await
    }

    pub async fn get_visit_payment(&self, id: &str) -> LedgerResult<VisitPayment> {
        self.visit_payment_repository
            .get(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Visit payment", id))
    }

    pub async fn create_visit_payment(
        &self,
        command: SaveVisitPaymentCommand,
    ) -> LedgerResult<VisitPaymentResult> {
        info!("Creating visit payment: {:?}", command);
        let payment = self.build_payment(VisitPayment::generate_id(), command)?;

        let mut tx = self.db.begin().await?;
        self.visit_payment_repository.insert(&mut *tx, &payment).await?;
        let change = self
            .ledger_service
            .sync_linked(&mut *tx, LinkedSource::VisitPayment(&payment.id), payment.drawer_entry())
            .await?;
        tx.commit().await.map_err(|e| {
            error!("Failed to commit visit payment {}: {}", payment.id, e);
            e
        })?;

        info!("Created visit payment {} ({:?})", payment.id, change);
        self.notify();
        Ok(VisitPaymentResult {
            ledger_record: change.record().cloned(),
            payment,
        })
    }

    /// Replace every field of a visit payment. Switching to or from cash adds
    /// or removes the ledger row.
    pub async fn update_visit_payment(
        &self,
        id: &str,
        command: SaveVisitPaymentCommand,
    ) -> LedgerResult<VisitPaymentResult> {
        info!("Updating visit payment {}: {:?}", id, command);
        let payment = self.build_payment(id.to_string(), command)?;

        let mut tx = self.db.begin().await?;
        if self.visit_payment_repository.find(&mut *tx, id).await?.is_none() {
            return Err(LedgerError::not_found("Visit payment", id));
        }
        self.visit_payment_repository.update(&mut *tx, &payment).await?;
        let change = self
            .ledger_service
            .sync_linked(&mut *tx, LinkedSource::VisitPayment(id), payment.drawer_entry())
            .await?;
        tx.commit().await?;

        info!("Updated visit payment {} ({:?})", id, change);
        self.notify();
        Ok(VisitPaymentResult {
            ledger_record: change.record().cloned(),
            payment,
        })
    }

    /// Delete a visit payment together with its ledger row
    pub async fn delete_visit_payment(&self, id: &str) -> LedgerResult<DeleteVisitPaymentResult> {
        info!("Deleting visit payment {}", id);

        let mut tx = self.db.begin().await?;
        if self.visit_payment_repository.find(&mut *tx, id).await?.is_none() {
            return Err(LedgerError::not_found("Visit payment", id));
        }
        let change = self
            .ledger_service
            .sync_linked(&mut *tx, LinkedSource::VisitPayment(id), None)
            .await?;
        self.visit_payment_repository.delete(&mut *tx, id).await?;
        tx.commit().await?;

        self.notify();
        Ok(DeleteVisitPaymentResult {
            deleted_id: id.to_string(),
            removed_ledger_records: change.removed_count(),
        })
    }

    fn build_payment(&self, id: String, command: SaveVisitPaymentCommand) -> LedgerResult<VisitPayment> {
        let mut issues = Vec::new();
        let patient_name = command.patient_name.trim().to_string();
        if patient_name.is_empty() {
            issues.push(ValidationIssue::MissingField("Patient name"));
        }
        issues.extend(
            self.ledger_service
                .form()
                .check_record_fields(command.amount, command.description.as_deref()),
        );
        if !issues.is_empty() {
            return Err(LedgerError::Validation(issues));
        }

        Ok(VisitPayment {
            id,
            date: command.date,
            patient_name,
            amount: command.amount,
            method: command.method,
            description: normalize_text(command.description),
        })
    }

    fn notify(&self) {
        self.ledger_service
            .refresh_coordinator()
            .notify(RefreshReason::VisitPayment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{ledger_record::LedgerKind, payment_method::PaymentMethod};
    use crate::backend::domain::refresh_coordinator::RefreshCoordinator;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    async fn create_test_service() -> (VisitPaymentService, LedgerService) {
        let db = DbConnection::init_test().await.unwrap();
        let ledger_service = LedgerService::new(db.clone(), RefreshCoordinator::new());
        (VisitPaymentService::new(db, ledger_service.clone()), ledger_service)
    }

    fn command(amount: i64, method: PaymentMethod) -> SaveVisitPaymentCommand {
        SaveVisitPaymentCommand {
            date: date(4),
            patient_name: "Kim Minji".to_string(),
            amount,
            method,
            description: Some("Scaling".to_string()),
        }
    }

    #[tokio::test]
    async fn test_cash_payment_creates_linked_income() {
        let (service, ledger) = create_test_service().await;
        let result = service
            .create_visit_payment(command(50_000, PaymentMethod::Cash))
            .await
            .unwrap();

        let record = result.ledger_record.unwrap();
        assert_eq!(record.kind, LedgerKind::Income);
        assert_eq!(record.amount, 50_000);
        assert_eq!(record.description.as_deref(), Some("Scaling"));
        assert_eq!(record.source_visit_payment_id.as_deref(), Some(result.payment.id.as_str()));
        assert_eq!(ledger.list_for_date(date(4)).await.unwrap(), vec![record]);
        assert_eq!(ledger.refresh_coordinator().generation(), 1);
    }

    #[tokio::test]
    async fn test_card_payment_leaves_ledger_alone() {
        let (service, ledger) = create_test_service().await;
        let result = service
            .create_visit_payment(command(80_000, PaymentMethod::Card))
            .await
            .unwrap();

        assert!(result.ledger_record.is_none());
        assert!(ledger.list_for_date(date(4)).await.unwrap().is_empty());
        assert_eq!(service.list_for_date(date(4)).await.unwrap().len(), 1);
        assert_eq!(ledger.refresh_coordinator().generation(), 1);
    }

    #[tokio::test]
    async fn test_update_follows_amount_and_method_changes() {
        let (service, ledger) = create_test_service().await;
        let created = service
            .create_visit_payment(command(50_000, PaymentMethod::Cash))
            .await
            .unwrap();
        let id = created.payment.id.clone();

        let updated = service
            .update_visit_payment(&id, command(65_000, PaymentMethod::Cash))
            .await
            .unwrap();
        let record = updated.ledger_record.unwrap();
        assert_eq!(record.id, created.ledger_record.unwrap().id);
        assert_eq!(record.amount, 65_000);

        let to_card = service
            .update_visit_payment(&id, command(65_000, PaymentMethod::Card))
            .await
            .unwrap();
        assert!(to_card.ledger_record.is_none());
        assert!(ledger.list_for_date(date(4)).await.unwrap().is_empty());

        let back_to_cash = service
            .update_visit_payment(&id, command(30_000, PaymentMethod::Cash))
            .await
            .unwrap();
        assert_eq!(back_to_cash.ledger_record.unwrap().amount, 30_000);
        assert_eq!(ledger.list_for_date(date(4)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_moves_ledger_row_with_date() {
        let (service, ledger) = create_test_service().await;
        let created = service
            .create_visit_payment(command(10_000, PaymentMethod::Cash))
            .await
            .unwrap();

        let mut moved = command(10_000, PaymentMethod::Cash);
        moved.date = date(5);
        service.update_visit_payment(&created.payment.id, moved).await.unwrap();

        assert!(ledger.list_for_date(date(4)).await.unwrap().is_empty());
        assert_eq!(ledger.list_for_date(date(5)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_ledger() {
        let (service, ledger) = create_test_service().await;
        let created = service
            .create_visit_payment(command(50_000, PaymentMethod::Cash))
            .await
            .unwrap();

        let deleted = service.delete_visit_payment(&created.payment.id).await.unwrap();
        assert_eq!(deleted.removed_ledger_records, 1);
        assert!(ledger.list_for_date(date(4)).await.unwrap().is_empty());
        assert!(matches!(
            service.get_visit_payment(&created.payment.id).await,
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_validation_and_missing_payment() {
        let (service, ledger) = create_test_service().await;
        let mut invalid = command(-5, PaymentMethod::Cash);
        invalid.patient_name = "   ".to_string();

        match service.create_visit_payment(invalid).await {
            Err(LedgerError::Validation(issues)) => assert_eq!(
                issues,
                vec![
                    ValidationIssue::MissingField("Patient name"),
                    ValidationIssue::AmountNegative
                ]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }

        let err = service
            .update_visit_payment("missing", command(1_000, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
        let err = service.delete_visit_payment("missing").await.unwrap_err();
        assert_eq!(err.kind(), "NotFound");

        assert!(ledger.list_for_date(date(4)).await.unwrap().is_empty());
        assert_eq!(ledger.refresh_coordinator().generation(), 0);
    }

    #[tokio::test]
    async fn test_zero_cash_payment_still_links() {
        let (service, _ledger) = create_test_service().await;
        let result = service
            .create_visit_payment(command(0, PaymentMethod::Cash))
            .await
            .unwrap();
        assert_eq!(result.ledger_record.unwrap().amount, 0);
    }

    #[tokio::test]
    async fn test_failed_ledger_write_rolls_back_payment() {
        let db = DbConnection::init_test().await.unwrap();
        sqlx::query(
            "CREATE TRIGGER refuse_ledger_insert BEFORE INSERT ON ledger_records \
             BEGIN SELECT RAISE(ABORT, 'ledger unavailable'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let ledger = LedgerService::new(db.clone(), RefreshCoordinator::new());
        let service = VisitPaymentService::new(db, ledger.clone());

        let result = service
            .create_visit_payment(command(50_000, PaymentMethod::Cash))
            .await;
        assert!(matches!(result, Err(LedgerError::Storage(_))));

        assert!(service.list_for_date(date(4)).await.unwrap().is_empty());
        assert!(ledger.list_for_date(date(4)).await.unwrap().is_empty());
        assert_eq!(ledger.refresh_coordinator().generation(), 0);
    }
}
