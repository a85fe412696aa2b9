//! Expense service.
//!
//! A cash expense owns one `Expense` ledger row. Saving, editing or
//! deleting the expense rewrites that row in the same transaction.

use chrono::NaiveDate;
use tracing::{error, info};

use crate::backend::domain::{
    commands::expenses::{DeleteExpenseResult, ExpenseResult, SaveExpenseCommand},
    errors::{LedgerError, LedgerResult},
    ledger_service::{LedgerService, LinkedSource},
    manual_deposit_form::normalize_text,
    models::expense::Expense,
    refresh_coordinator::RefreshReason,
};
use crate::backend::storage::{DbConnection, ExpenseRepository};

#[derive(Clone)]
pub struct ExpenseService {
    db: DbConnection,
    expense_repository: ExpenseRepository,
    ledger_service: LedgerService,
}

impl ExpenseService {
    pub fn new(db: DbConnection, ledger_service: LedgerService) -> Self {
        let expense_repository = ExpenseRepository::new(db.clone());
        Self {
            db,
            expense_repository,
            ledger_service,
        }
    }

    pub async fn list_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<Expense>> {
        self.expense_repository.list_for_date(date).await
    }

    pub async fn get_expense(&self, id: &str) -> LedgerResult<Expense> {
        self.expense_repository
            .get(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Expense", id))
    }

    pub async fn create_expense(
        &self,
        command: SaveExpenseCommand,
    ) -> LedgerResult<ExpenseResult> {
        info!("Creating expense: {:?}", command);
        let expense = self.build_expense(Expense::generate_id(), command)?;

        let mut tx = self.db.begin().await?;
        self.expense_repository.insert(&mut *tx, &expense).await?;
        let change = self
            .ledger_service
            .sync_linked(&mut *tx, LinkedSource::Expense(&expense.id), expense.drawer_entry())
            .await?;
        tx.commit().await.map_err(|e| {
            error!("Failed to commit expense {}: {}", expense.id, e);
            e
        })?;

        info!("Created expense {} ({:?})", expense.id, change);
        self.notify();
        Ok(ExpenseResult {
            ledger_record: change.record().cloned(),
            expense,
        })
    }

    /// Replace every field of an expense. Switching to or from cash adds
    /// or removes the ledger row.
    pub async fn update_expense(
        &self,
        id: &str,
        command: SaveExpenseCommand,
    ) -> LedgerResult<ExpenseResult> {
        info!("Updating expense {}: {:?}", id, command);
        let expense = self.build_expense(id.to_string(), command)?;

        let mut tx = self.db.begin().await?;
        if self.expense_repository.find(&mut *tx, id).await?.is_none() {
            return Err(LedgerError::not_found("Expense", id));
        }
        self.expense_repository.update(&mut *tx, &expense).await?;
        let change = self
            .ledger_service
            .sync_linked(&mut *tx, LinkedSource::Expense(id), expense.drawer_entry())
            .await?;
        tx.commit().await?;

        info!("Updated expense {} ({:?})", id, change);
        self.notify();
        Ok(ExpenseResult {
            ledger_record: change.record().cloned(),
            expense,
        })
    }

    /// Delete an expense together with its ledger row
    pub async fn delete_expense(&self, id: &str) -> LedgerResult<DeleteExpenseResult> {
        info!("Deleting expense {}", id);

        let mut tx = self.db.begin().await?;
        if self.expense_repository.find(&mut *tx, id).await?.is_none() {
            return Err(LedgerError::not_found("Expense", id));
        }
        let change = self
            .ledger_service
            .sync_linked(&mut *tx, LinkedSource::Expense(id), None)
            .await?;
        self.expense_repository.delete(&mut *tx, id).await?;
        tx.commit().await?;

        self.notify();
        Ok(DeleteExpenseResult {
            deleted_id: id.to_string(),
            removed_ledger_records: change.removed_count(),
        })
    }

    fn build_expense(&self, id: String, command: SaveExpenseCommand) -> LedgerResult<Expense> {
        let issues = self
            .ledger_service
            .form()
            .check_record_fields(command.amount, command.description.as_deref());
        if !issues.is_empty() {
            return Err(LedgerError::Validation(issues));
        }

        Ok(Expense {
            id,
            date: command.date,
            vendor: normalize_text(command.vendor),
            amount: command.amount,
            method: command.method,
            description: normalize_text(command.description),
        })
    }

    fn notify(&self) {
        self.ledger_service
            .refresh_coordinator()
            .notify(RefreshReason::Expense);
    }
}
