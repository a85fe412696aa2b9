//! Ledger record store.
//!
//! The public operations here are the manual adjustment surface: they only
//! ever create, change or remove `ManualDeposit` rows. Income and expense
//! rows are written through [`LedgerService::sync_linked`], which the visit
//! payment and expense services call inside their own transactions.

use chrono::NaiveDate;
use sqlx::SqliteConnection;
use tracing::{info, warn};

use crate::backend::domain::{
    commands::ledger::{CreateManualDepositCommand, LinkedChange, UpdateManualDepositCommand},
    errors::{LedgerError, LedgerResult, ValidationIssue},
    manual_deposit_form::ManualDepositForm,
    models::ledger_record::{LedgerKind, LedgerRecord, LinkedEntry, RecordOwner},
    refresh_coordinator::{RefreshCoordinator, RefreshReason},
};
use crate::backend::storage::{DbConnection, LedgerRepository};

/// Domain record a linked ledger row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedSource<'a> {
    VisitPayment(&'a str),
    Expense(&'a str),
}

#[derive(Clone)]
pub struct LedgerService {
    db: DbConnection,
    ledger_repository: LedgerRepository,
    form: ManualDepositForm,
    refresh: RefreshCoordinator,
}

impl LedgerService {
    pub fn new(db: DbConnection, refresh: RefreshCoordinator) -> Self {
        Self::with_form(db, refresh, ManualDepositForm::new())
    }

    pub fn with_form(db: DbConnection, refresh: RefreshCoordinator, form: ManualDepositForm) -> Self {
        let ledger_repository = LedgerRepository::new(db.clone());
        Self {
            db,
            ledger_repository,
            form,
            refresh,
        }
    }

    pub fn form(&self) -> &ManualDepositForm {
        &self.form
    }

    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    pub async fn list_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<LedgerRecord>> {
        self.ledger_repository.list_records_for_date(date).await
    }

    pub async fn get_record(&self, id: &str) -> LedgerResult<LedgerRecord> {
        self.ledger_repository
            .get_record(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Ledger record", id))
    }

    pub async fn create_manual_deposit(
        &self,
        command: CreateManualDepositCommand,
    ) -> LedgerResult<LedgerRecord> {
        info!("Creating manual deposit: {:?}", command);

        if command.kind != LedgerKind::ManualDeposit {
            return Err(LedgerError::validation(ValidationIssue::KindNotAllowed(
                command.kind.as_str().to_string(),
            )));
        }

        let valid = self
            .form
            .validate(&command.amount_input, command.description.as_deref())?;
        let record = LedgerRecord::manual_deposit(command.date, valid.amount, valid.description);

        let mut conn = self.db.acquire().await?;
        self.ledger_repository.insert_record(&mut conn, &record).await?;
        drop(conn);

        info!("Created manual deposit {} of {}", record.id, record.amount);
        self.refresh.notify(RefreshReason::ManualDeposit);
        Ok(record)
    }

    pub async fn update_manual_deposit(
        &self,
        command: UpdateManualDepositCommand,
    ) -> LedgerResult<LedgerRecord> {
        info!("Updating manual deposit {}", command.id);

        let mut tx = self.db.begin().await?;
        let mut record = self
            .ledger_repository
            .find_record(&mut *tx, &command.id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Ledger record", command.id.as_str()))?;
        Self::ensure_operator_editable(&record)?;

        let valid = self
            .form
            .validate(&command.amount_input, command.description.as_deref())?;
        record.amount = valid.amount;
        record.description = Some(valid.description);

        if !self.ledger_repository.update_record(&mut *tx, &record).await? {
            return Err(LedgerError::not_found("Ledger record", record.id));
        }
        tx.commit().await?;

        self.refresh.notify(RefreshReason::ManualDeposit);
        Ok(record)
    }

    /// Remove a manual deposit and return the row that was removed
    pub async fn delete_manual_deposit(&self, id: &str) -> LedgerResult<LedgerRecord> {
        info!("Deleting manual deposit {}", id);

        let mut tx = self.db.begin().await?;
        let record = self
            .ledger_repository
            .find_record(&mut *tx, id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Ledger record", id))?;
        Self::ensure_operator_editable(&record)?;

        if !self.ledger_repository.delete_record(&mut *tx, id).await? {
            return Err(LedgerError::not_found("Ledger record", id));
        }
        tx.commit().await?;

        self.refresh.notify(RefreshReason::ManualDeposit);
        Ok(record)
    }

    /// Refuse changes to rows owned by a visit payment or an expense
    pub fn ensure_operator_editable(record: &LedgerRecord) -> LedgerResult<()> {
        match record.owner() {
            RecordOwner::Operator => Ok(()),
            RecordOwner::VisitPayment(owner_id) => {
                warn!("Refused direct change to ledger record {} (visit payment {})", record.id, owner_id);
                Err(LedgerError::InvalidOperation(format!(
                    "Ledger record {} belongs to visit payment {}; change it from the visit registration screen",
                    record.id, owner_id
                )))
            }
            RecordOwner::Expense(owner_id) => {
                warn!("Refused direct change to ledger record {} (expense {})", record.id, owner_id);
                Err(LedgerError::InvalidOperation(format!(
                    "Ledger record {} belongs to expense {}; change it from the expense list",
                    record.id, owner_id
                )))
            }
        }
    }

    /// Bring the ledger rows of one visit payment or expense in line with
    /// `desired`. `None` removes every linked row. Runs on the caller's
    /// connection so it commits or rolls back with the owning write, and
    /// does not fire the refresh signal.
    pub(crate) async fn sync_linked(
        &self,
        conn: &mut SqliteConnection,
        source: LinkedSource<'_>,
        desired: Option<LinkedEntry>,
    ) -> LedgerResult<LinkedChange> {
        let existing = match source {
            LinkedSource::VisitPayment(id) => {
                self.ledger_repository
                    .find_records_for_visit_payment(&mut *conn, id)
                    .await?
            }
            LinkedSource::Expense(id) => {
                self.ledger_repository
                    .find_records_for_expense(&mut *conn, id)
                    .await?
            }
        };

        let Some(entry) = desired else {
            if existing.is_empty() {
                return Ok(LinkedChange::Unchanged(None));
            }
            let removed = match source {
                LinkedSource::VisitPayment(id) => {
                    self.ledger_repository
                        .delete_records_for_visit_payment(&mut *conn, id)
                        .await?
                }
                LinkedSource::Expense(id) => {
                    self.ledger_repository
                        .delete_records_for_expense(&mut *conn, id)
                        .await?
                }
            };
            return Ok(LinkedChange::Removed(removed));
        };

        let mut existing = existing.into_iter();
        let Some(mut record) = existing.next() else {
            let record = match source {
                LinkedSource::VisitPayment(id) => {
                    LedgerRecord::for_visit_payment(id, entry.date, entry.amount, entry.description)
                }
                LinkedSource::Expense(id) => {
                    LedgerRecord::for_expense(id, entry.date, entry.amount, entry.description)
                }
            };
            self.ledger_repository.insert_record(&mut *conn, &record).await?;
            return Ok(LinkedChange::Created(record));
        };

        let mut dropped_duplicates = false;
        for duplicate in existing {
            warn!(
                "Removing duplicate ledger record {} for {:?}, keeping {}",
                duplicate.id, source, record.id
            );
            self.ledger_repository
                .delete_record(&mut *conn, &duplicate.id)
                .await?;
            dropped_duplicates = true;
        }

        if record.matches_entry(&entry) && !dropped_duplicates {
            return Ok(LinkedChange::Unchanged(Some(record)));
        }

        record.date = entry.date;
        record.amount = entry.amount;
        record.description = entry.description;
        self.ledger_repository.update_record(&mut *conn, &record).await?;
        Ok(LinkedChange::Updated(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    async fn create_test_service() -> LedgerService {
        let db = DbConnection::init_test().await.unwrap();
        LedgerService::new(db, RefreshCoordinator::new())
    }

    fn deposit(amount: &str, description: Option<&str>) -> CreateManualDepositCommand {
        CreateManualDepositCommand {
            date: date(4),
            kind: LedgerKind::ManualDeposit,
            amount_input: amount.to_string(),
            description: description.map(str::to_string),
        }
    }

    async fn insert_linked(service: &LedgerService, source: LinkedSource<'_>, amount: i64) -> LedgerRecord {
        let mut conn = service.db.acquire().await.unwrap();
        let change = service
            .sync_linked(
                &mut conn,
                source,
                Some(LinkedEntry {
                    date: date(4),
                    amount,
                    description: None,
                }),
            )
            .await
            .unwrap();
        change.record().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_manual_deposit_defaults_label_and_notifies() {
        let service = create_test_service().await;
        let record = service.create_manual_deposit(deposit("5,000", Some("  "))).await.unwrap();

        assert_eq!(record.kind, LedgerKind::ManualDeposit);
        assert_eq!(record.amount, 5_000);
        assert_eq!(record.description.as_deref(), Some("Bank deposit"));
        assert_eq!(service.refresh_coordinator().generation(), 1);

        let listed = service.list_for_date(date(4)).await.unwrap();
        assert_eq!(listed, vec![record]);
    }

    #[tokio::test]
    async fn test_create_rejects_other_kinds_and_bad_amounts() {
        let service = create_test_service().await;

        let mut income = deposit("5000", None);
        income.kind = LedgerKind::Income;
        let err = service.create_manual_deposit(income).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ref issues) if issues == &vec![ValidationIssue::KindNotAllowed("Income".to_string())]
        ));

        let err = service.create_manual_deposit(deposit("0", None)).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        let err = service.create_manual_deposit(deposit("five", None)).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");

        assert!(service.list_for_date(date(4)).await.unwrap().is_empty());
        assert_eq!(service.refresh_coordinator().generation(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete_manual_deposit() {
        let service = create_test_service().await;
        let record = service.create_manual_deposit(deposit("10000", Some("Night drop"))).await.unwrap();

        let updated = service
            .update_manual_deposit(UpdateManualDepositCommand {
                id: record.id.clone(),
                amount_input: "12,000".to_string(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(updated.amount, 12_000);
        assert_eq!(updated.description.as_deref(), Some("Bank deposit"));
        assert_eq!(service.get_record(&record.id).await.unwrap(), updated);

        let removed = service.delete_manual_deposit(&record.id).await.unwrap();
        assert_eq!(removed.id, record.id);
        assert!(matches!(
            service.get_record(&record.id).await,
            Err(LedgerError::NotFound { .. })
        ));
        assert_eq!(service.refresh_coordinator().generation(), 3);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let service = create_test_service().await;
        let err = service.delete_manual_deposit("nope").await.unwrap_err();
        assert_eq!(err.kind(), "NotFound");

        let err = service
            .update_manual_deposit(UpdateManualDepositCommand {
                id: "nope".to_string(),
                amount_input: "100".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }

    #[tokio::test]
    async fn test_linked_records_refuse_direct_changes() {
        let service = create_test_service().await;
        let income = insert_linked(&service, LinkedSource::VisitPayment("v1"), 50_000).await;
        let expense = insert_linked(&service, LinkedSource::Expense("e1"), 20_000).await;

        let err = service
            .update_manual_deposit(UpdateManualDepositCommand {
                id: income.id.clone(),
                amount_input: "1".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOperation(ref msg) if msg.contains("visit registration")));

        let err = service.delete_manual_deposit(&expense.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOperation(ref msg) if msg.contains("expense list")));

        assert_eq!(service.get_record(&income.id).await.unwrap(), income);
        assert_eq!(service.get_record(&expense.id).await.unwrap(), expense);
        assert_eq!(service.refresh_coordinator().generation(), 0);
    }

    #[tokio::test]
    async fn test_linked_check_runs_before_validation() {
        let service = create_test_service().await;
        let income = insert_linked(&service, LinkedSource::VisitPayment("v1"), 50_000).await;

        let err = service
            .update_manual_deposit(UpdateManualDepositCommand {
                id: income.id,
                amount_input: "not a number".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidOperation");
    }

    #[tokio::test]
    async fn test_sync_linked_creates_updates_and_removes() {
        let service = create_test_service().await;
        let mut conn = service.db.acquire().await.unwrap();
        let source = LinkedSource::Expense("e1");
        let entry = LinkedEntry {
            date: date(4),
            amount: 3_000,
            description: Some("Gloves".to_string()),
        };

        let created = service.sync_linked(&mut conn, source, Some(entry.clone())).await.unwrap();
        assert!(matches!(created, LinkedChange::Created(_)));

        let same = service.sync_linked(&mut conn, source, Some(entry.clone())).await.unwrap();
        assert!(matches!(same, LinkedChange::Unchanged(Some(_))));

        let changed = LinkedEntry {
            amount: 4_500,
            ..entry
        };
        let updated = service.sync_linked(&mut conn, source, Some(changed)).await.unwrap();
        match updated {
            LinkedChange::Updated(record) => {
                assert_eq!(record.amount, 4_500);
                assert_eq!(record.kind, LedgerKind::Expense);
            }
            other => panic!("expected update, got {:?}", other),
        }

        let removed = service.sync_linked(&mut conn, source, None).await.unwrap();
        assert_eq!(removed, LinkedChange::Removed(1));
        let again = service.sync_linked(&mut conn, source, None).await.unwrap();
        assert_eq!(again, LinkedChange::Unchanged(None));
    }

    #[tokio::test]
    async fn test_sync_linked_collapses_duplicates() {
        let service = create_test_service().await;
        let mut conn = service.db.acquire().await.unwrap();
        for _ in 0..2 {
            let stray = LedgerRecord::for_visit_payment("v1", date(4), 5_000, None);
            service.ledger_repository.insert_record(&mut conn, &stray).await.unwrap();
        }

        let change = service
            .sync_linked(
                &mut conn,
                LinkedSource::VisitPayment("v1"),
                Some(LinkedEntry {
                    date: date(4),
                    amount: 5_000,
                    description: None,
                }),
            )
            .await
            .unwrap();
        assert!(matches!(change, LinkedChange::Updated(_)));

        let remaining = service
            .ledger_repository
            .find_records_for_visit_payment(&mut conn, "v1")
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
    }
}
