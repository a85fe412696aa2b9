//! Cash ledger view model.
//!
//! Holds what the drawer screen shows for the selected date: the previous
//! closing, the daily delta, the running balance and one formatted row per
//! ledger record. The view re-fetches when its date changes or when the
//! refresh signal reports a mutation made elsewhere.
//!
//! Manual deposits can be added, edited and deleted from here (deletes go
//! through a confirmation step). Income and expense rows are read-only and
//! point the operator to the screen that owns them.
//!
//! This is the in-process view model for UIs that embed the crate directly;
//! the REST layer does not go through it.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::backend::domain::{
    balance_service::{BalanceService, DayBalance},
    commands::ledger::{CreateManualDepositCommand, UpdateManualDepositCommand},
    errors::{LedgerError, LedgerResult},
    ledger_service::LedgerService,
    manual_deposit_form::ManualDepositForm,
    models::ledger_record::{LedgerKind, LedgerRecord, RecordOwner},
    refresh_coordinator::RefreshSubscription,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSign {
    Plus,
    Minus,
}

/// Color hint for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTone {
    Income,
    Expense,
    Deposit,
}

impl RowTone {
    pub fn css_class(&self) -> &'static str {
        match self {
            RowTone::Income => "ledger-income",
            RowTone::Expense => "ledger-expense",
            RowTone::Deposit => "ledger-deposit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub id: String,
    pub kind: LedgerKind,
    pub sign: AmountSign,
    pub tone: RowTone,
    pub formatted_amount: String,
    pub description: String,
    pub raw_amount: i64,
    pub editable: bool,
    /// Screen that owns a read-only row
    pub owner_screen: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    pub date: NaiveDate,
    pub generation: u64,
    pub previous_closing: i64,
    pub daily_delta: i64,
    pub current_balance: i64,
    pub formatted_previous_closing: String,
    pub formatted_daily_delta: String,
    pub formatted_current_balance: String,
    pub rows: Vec<LedgerRow>,
}

impl LedgerSnapshot {
    pub fn row(&self, id: &str) -> Option<&LedgerRow> {
        self.rows.iter().find(|row| row.id == id)
    }
}

pub struct CashLedgerView {
    ledger_service: LedgerService,
    balance_service: BalanceService,
    subscription: RefreshSubscription,
    selected_date: NaiveDate,
    snapshot: Option<LedgerSnapshot>,
    pending_delete: Option<String>,
}

impl CashLedgerView {
    pub fn new(ledger_service: LedgerService, balance_service: BalanceService, date: NaiveDate) -> Self {
        let subscription = ledger_service.refresh_coordinator().subscribe();
        Self {
            ledger_service,
            balance_service,
            subscription,
            selected_date: date,
            snapshot: None,
            pending_delete: None,
        }
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn snapshot(&self) -> Option<&LedgerSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        if date != self.selected_date {
            debug!("Ledger view moved from {} to {}", self.selected_date, date);
            self.selected_date = date;
            self.pending_delete = None;
        }
    }

    pub fn previous_day(&mut self) {
        if let Some(date) = self.selected_date.pred_opt() {
            self.select_date(date);
        }
    }

    pub fn next_day(&mut self) {
        if let Some(date) = self.selected_date.succ_opt() {
            self.select_date(date);
        }
    }

    /// True when the shown data is for another date or a mutation happened
    /// since the last fetch
    pub fn is_stale(&self) -> bool {
        match &self.snapshot {
            None => true,
            Some(snapshot) => snapshot.date != self.selected_date || self.subscription.has_changed(),
        }
    }

    pub async fn refresh(&mut self) -> LedgerResult<&LedgerSnapshot> {
        // Marked before fetching so a mutation landing mid-fetch leaves us stale
        let signal = self.subscription.mark_seen();
        let day = self.balance_service.day_balance(self.selected_date).await?;
        let snapshot = build_snapshot(self.ledger_service.form(), signal.generation, day);
        let snapshot: &LedgerSnapshot = self.snapshot.insert(snapshot);
        Ok(snapshot)
    }

    /// Refresh only when needed. Returns whether a fetch happened.
    pub async fn refresh_if_stale(&mut self) -> LedgerResult<bool> {
        if !self.is_stale() {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    pub async fn add_deposit(
        &mut self,
        amount_input: &str,
        description: Option<&str>,
    ) -> LedgerResult<LedgerRecord> {
        let record = self
            .ledger_service
            .create_manual_deposit(CreateManualDepositCommand {
                date: self.selected_date,
                kind: LedgerKind::ManualDeposit,
                amount_input: amount_input.to_string(),
                description: description.map(str::to_string),
            })
            .await?;
        self.refresh().await?;
        Ok(record)
    }

    pub async fn edit_deposit(
        &mut self,
        id: &str,
        amount_input: &str,
        description: Option<&str>,
    ) -> LedgerResult<LedgerRecord> {
        self.refuse_read_only(id)?;
        let record = self
            .ledger_service
            .update_manual_deposit(UpdateManualDepositCommand {
                id: id.to_string(),
                amount_input: amount_input.to_string(),
                description: description.map(str::to_string),
            })
            .await?;
        self.refresh().await?;
        Ok(record)
    }

    /// First step of a delete. Returns the confirmation prompt.
    pub fn request_delete(&mut self, id: &str) -> LedgerResult<String> {
        self.refuse_read_only(id)?;
        let prompt = match self.snapshot.as_ref().and_then(|s| s.row(id)) {
            Some(row) => format!("Delete {} ({})?", row.description, row.formatted_amount),
            None => "Delete this deposit?".to_string(),
        };
        self.pending_delete = Some(id.to_string());
        Ok(prompt)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the record chosen by `request_delete`. Does nothing when no
    /// delete is pending.
    pub async fn confirm_delete(&mut self) -> LedgerResult<Option<LedgerRecord>> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(None);
        };
        info!("Operator confirmed delete of ledger record {}", id);
        let removed = self.ledger_service.delete_manual_deposit(&id).await?;
        self.refresh().await?;
        Ok(Some(removed))
    }

    fn refuse_read_only(&self, id: &str) -> LedgerResult<()> {
        let Some(row) = self.snapshot.as_ref().and_then(|s| s.row(id)) else {
            // Not on screen; the service still checks ownership
            return Ok(());
        };
        match row.owner_screen {
            Some(screen) if !row.editable => Err(LedgerError::InvalidOperation(format!(
                "This entry is managed from the {}. Edit or delete it there.",
                screen
            ))),
            _ => Ok(()),
        }
    }
}

fn build_snapshot(form: &ManualDepositForm, generation: u64, day: DayBalance) -> LedgerSnapshot {
    let rows = day.records.iter().map(|record| build_row(form, record)).collect();
    let previous_closing = day.previous_closing.closing_amount;

    LedgerSnapshot {
        date: day.date,
        generation,
        previous_closing,
        daily_delta: day.fold.daily_delta,
        current_balance: day.fold.current_balance,
        formatted_previous_closing: format_balance(form, previous_closing),
        formatted_daily_delta: format_delta(form, day.fold.daily_delta),
        formatted_current_balance: format_balance(form, day.fold.current_balance),
        rows,
    }
}

fn build_row(form: &ManualDepositForm, record: &LedgerRecord) -> LedgerRow {
    let (sign, tone) = match record.kind {
        LedgerKind::Income => (AmountSign::Plus, RowTone::Income),
        LedgerKind::Expense => (AmountSign::Minus, RowTone::Expense),
        LedgerKind::ManualDeposit => (AmountSign::Minus, RowTone::Deposit),
    };
    let prefix = match sign {
        AmountSign::Plus => "+",
        AmountSign::Minus => "-",
    };
    let owner_screen = match record.owner() {
        RecordOwner::VisitPayment(_) => Some("visit registration screen"),
        RecordOwner::Expense(_) => Some("expense list"),
        RecordOwner::Operator => None,
    };

    LedgerRow {
        id: record.id.clone(),
        kind: record.kind,
        sign,
        tone,
        formatted_amount: format!("{}{}", prefix, form.format_amount(record.amount)),
        description: record
            .description
            .clone()
            .unwrap_or_else(|| record.kind.as_str().to_string()),
        raw_amount: record.amount,
        editable: record.is_operator_editable(),
        owner_screen,
    }
}

fn format_balance(form: &ManualDepositForm, amount: i64) -> String {
    if amount < 0 {
        format!("-{}", form.format_amount(amount))
    } else {
        form.format_amount(amount)
    }
}

fn format_delta(form: &ManualDepositForm, amount: i64) -> String {
    if amount > 0 {
        format!("+{}", form.format_amount(amount))
    } else {
        format_balance(form, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::{
        commands::{expenses::SaveExpenseCommand, visit_payments::SaveVisitPaymentCommand},
        expense_service::ExpenseService,
        models::payment_method::PaymentMethod,
        refresh_coordinator::RefreshCoordinator,
        visit_payment_service::VisitPaymentService,
    };
    use crate::backend::storage::DbConnection;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    async fn setup() -> (CashLedgerView, VisitPaymentService, ExpenseService) {
        let db = DbConnection::init_test().await.unwrap();
        let ledger = LedgerService::new(db.clone(), RefreshCoordinator::new());
        let visits = VisitPaymentService::new(db.clone(), ledger.clone());
        let expenses = ExpenseService::new(db.clone(), ledger.clone());
        let view = CashLedgerView::new(ledger, BalanceService::new(db), date(4));
        (view, visits, expenses)
    }

    fn cash_visit(day: u32, amount: i64) -> SaveVisitPaymentCommand {
        SaveVisitPaymentCommand {
            date: date(day),
            patient_name: "Park Seoyeon".to_string(),
            amount,
            method: PaymentMethod::Cash,
            description: Some("Implant consult".to_string()),
        }
    }

    #[tokio::test]
    async fn test_snapshot_formats_rows_and_totals() {
        let (mut view, visits, expenses) = setup().await;
        visits.create_visit_payment(cash_visit(3, 100_000)).await.unwrap();
        visits.create_visit_payment(cash_visit(4, 50_000)).await.unwrap();
        expenses
            .create_expense(SaveExpenseCommand {
                date: date(4),
                vendor: None,
                amount: 20_000,
                method: PaymentMethod::Cash,
                description: None,
            })
            .await
            .unwrap();
        view.add_deposit("10,000", None).await.unwrap();

        let snapshot = view.snapshot().unwrap();
        assert_eq!(snapshot.formatted_previous_closing, "₩100,000");
        assert_eq!(snapshot.formatted_daily_delta, "+₩20,000");
        assert_eq!(snapshot.formatted_current_balance, "₩120,000");

        let tones: Vec<RowTone> = snapshot.rows.iter().map(|r| r.tone).collect();
        assert_eq!(tones, vec![RowTone::Income, RowTone::Expense, RowTone::Deposit]);
        assert_eq!(snapshot.rows[0].formatted_amount, "+₩50,000");
        assert_eq!(snapshot.rows[1].formatted_amount, "-₩20,000");
        assert_eq!(snapshot.rows[1].description, "Expense");
        assert_eq!(snapshot.rows[2].description, "Bank deposit");
        assert!(snapshot.rows[2].editable);
        assert!(!snapshot.rows[0].editable);
    }

    #[tokio::test]
    async fn test_refresh_signal_marks_view_stale() {
        let (mut view, visits, _expenses) = setup().await;
        assert!(view.refresh_if_stale().await.unwrap());
        assert!(!view.refresh_if_stale().await.unwrap());

        visits.create_visit_payment(cash_visit(4, 7_000)).await.unwrap();
        assert!(view.is_stale());
        assert!(view.refresh_if_stale().await.unwrap());
        assert_eq!(view.snapshot().unwrap().current_balance, 7_000);
        assert_eq!(view.snapshot().unwrap().generation, 1);
    }

    #[tokio::test]
    async fn test_date_navigation_refetches() {
        let (mut view, visits, _expenses) = setup().await;
        visits.create_visit_payment(cash_visit(5, 3_000)).await.unwrap();
        view.refresh().await.unwrap();
        assert!(view.snapshot().unwrap().rows.is_empty());

        view.next_day();
        assert_eq!(view.selected_date(), date(5));
        assert!(view.is_stale());
        view.refresh_if_stale().await.unwrap();
        assert_eq!(view.snapshot().unwrap().rows.len(), 1);

        view.previous_day();
        view.previous_day();
        assert_eq!(view.selected_date(), date(3));
    }

    #[tokio::test]
    async fn test_linked_rows_are_refused_with_owner_screen() {
        let (mut view, visits, _expenses) = setup().await;
        let created = visits.create_visit_payment(cash_visit(4, 50_000)).await.unwrap();
        let record_id = created.ledger_record.unwrap().id;
        view.refresh().await.unwrap();

        let err = view.request_delete(&record_id).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOperation(ref msg) if msg.contains("visit registration")));
        assert_eq!(view.pending_delete(), None);

        let err = view.edit_deposit(&record_id, "1", None).await.unwrap_err();
        assert_eq!(err.kind(), "InvalidOperation");
        assert_eq!(view.snapshot().unwrap().rows[0].raw_amount, 50_000);
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let (mut view, _visits, _expenses) = setup().await;
        let record = view.add_deposit("5,000", Some("Night drop")).await.unwrap();

        let prompt = view.request_delete(&record.id).unwrap();
        assert_eq!(prompt, "Delete Night drop (-₩5,000)?");
        view.cancel_delete();
        assert_eq!(view.confirm_delete().await.unwrap(), None);
        assert_eq!(view.snapshot().unwrap().rows.len(), 1);

        view.request_delete(&record.id).unwrap();
        let removed = view.confirm_delete().await.unwrap().unwrap();
        assert_eq!(removed.id, record.id);
        assert!(view.snapshot().unwrap().rows.is_empty());
        assert_eq!(view.snapshot().unwrap().formatted_current_balance, "₩0");
    }

    #[tokio::test]
    async fn test_edit_deposit_updates_snapshot() {
        let (mut view, _visits, _expenses) = setup().await;
        let record = view.add_deposit("5,000", None).await.unwrap();

        view.edit_deposit(&record.id, "8,000", Some("Corrected")).await.unwrap();
        let snapshot = view.snapshot().unwrap();
        assert_eq!(snapshot.rows[0].description, "Corrected");
        assert_eq!(snapshot.formatted_daily_delta, "-₩8,000");
        assert_eq!(snapshot.formatted_current_balance, "-₩8,000");
    }
}
