//! Daily cash drawer balance.
//!
//! Nothing here is stored. A day's balance is always recomputed from the
//! ledger rows:
//!
//! 1. The previous closing is the net of every row dated on or before the
//!    most recent earlier day that has activity (0 when there is none).
//! 2. The day's rows are folded onto it: income adds, expenses and manual
//!    deposits subtract.
//! 3. The daily delta is the folded balance minus the previous closing.
//!
//! The same module also checks a day's ledger rows against the visit
//! payments and expenses that own them.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::backend::domain::{
    errors::LedgerResult,
    models::ledger_record::{LedgerKind, LedgerRecord, LinkedEntry, RecordOwner},
};
use crate::backend::storage::{
    DbConnection, ExpenseRepository, LedgerRepository, VisitPaymentRepository,
};

/// Closing balance carried into a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousClosing {
    pub closing_amount: i64,
    /// The earlier day the closing was taken from
    pub activity_date: Option<NaiveDate>,
}

/// Result of folding one day's rows onto its previous closing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayFold {
    pub total_income: i64,
    pub total_expense: i64,
    pub total_manual_deposit: i64,
    pub current_balance: i64,
    pub daily_delta: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayBalance {
    pub date: NaiveDate,
    pub previous_closing: PreviousClosing,
    pub fold: DayFold,
    pub records: Vec<LedgerRecord>,
}

/// Fold a day's records onto the previous closing. Order does not matter.
pub fn fold_day(previous_closing: i64, records: &[LedgerRecord]) -> DayFold {
    let mut fold = DayFold::default();
    for record in records {
        match record.kind {
            LedgerKind::Income => fold.total_income += record.amount,
            LedgerKind::Expense => fold.total_expense += record.amount,
            LedgerKind::ManualDeposit => fold.total_manual_deposit += record.amount,
        }
    }
    fold.current_balance =
        previous_closing + fold.total_income - fold.total_expense - fold.total_manual_deposit;
    fold.daily_delta = fold.current_balance - previous_closing;
    fold
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub ledger_record_id: String,
    pub source_id: String,
    pub reason: String,
}

/// Differences between a day's ledger rows and their owning records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub date: NaiveDate,
    /// Cash visit payments or expenses with no ledger row
    pub missing_ledger_records: Vec<String>,
    /// Ledger rows whose visit payment or expense no longer exists
    pub orphaned_ledger_records: Vec<String>,
    pub mismatched_records: Vec<Mismatch>,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.missing_ledger_records.is_empty()
            && self.orphaned_ledger_records.is_empty()
            && self.mismatched_records.is_empty()
    }
}

/// Service responsible for balance calculations and reconciliation
#[derive(Clone)]
pub struct BalanceService {
    db: DbConnection,
    ledger_repository: LedgerRepository,
    visit_payment_repository: VisitPaymentRepository,
    expense_repository: ExpenseRepository,
}

impl BalanceService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            ledger_repository: LedgerRepository::new(db.clone()),
            visit_payment_repository: VisitPaymentRepository::new(db.clone()),
            expense_repository: ExpenseRepository::new(db.clone()),
            db,
        }
    }

    pub async fn previous_closing(&self, date: NaiveDate) -> LedgerResult<PreviousClosing> {
        let Some(activity_date) = self.ledger_repository.latest_activity_date_before(date).await?
        else {
            debug!("No activity before {}, previous closing is 0", date);
            return Ok(PreviousClosing {
                closing_amount: 0,
                activity_date: None,
            });
        };

        let closing_amount = self.ledger_repository.net_total_through(activity_date).await?;
        Ok(PreviousClosing {
            closing_amount,
            activity_date: Some(activity_date),
        })
    }

    pub async fn day_balance(&self, date: NaiveDate) -> LedgerResult<DayBalance> {
        let previous_closing = self.previous_closing(date).await?;
        let records = self.ledger_repository.list_records_for_date(date).await?;
        let fold = fold_day(previous_closing.closing_amount, &records);

        info!(
            "Balance for {}: previous {} + delta {} = {} over {} records",
            date,
            previous_closing.closing_amount,
            fold.daily_delta,
            fold.current_balance,
            records.len()
        );

        Ok(DayBalance {
            date,
            previous_closing,
            fold,
            records,
        })
    }

    /// Compare the day's ledger rows with the visit payments and expenses
    /// dated that day.
    pub async fn reconcile_day(&self, date: NaiveDate) -> LedgerResult<Reconciliation> {
        let payments = self.visit_payment_repository.list_for_date(date).await?;
        let expenses = self.expense_repository.list_for_date(date).await?;
        let records = self.ledger_repository.list_records_for_date(date).await?;

        let mut report = Reconciliation {
            date,
            missing_ledger_records: Vec::new(),
            orphaned_ledger_records: Vec::new(),
            mismatched_records: Vec::new(),
        };
        let mut checked_sources = HashSet::new();

        let mut conn = self.db.acquire().await?;
        for payment in &payments {
            let linked = self
                .ledger_repository
                .find_records_for_visit_payment(&mut conn, &payment.id)
                .await?;
            check_linked(&payment.id, payment.drawer_entry(), &linked, &mut report);
            checked_sources.insert(payment.id.clone());
        }
        for expense in &expenses {
            let linked = self
                .ledger_repository
                .find_records_for_expense(&mut conn, &expense.id)
                .await?;
            check_linked(&expense.id, expense.drawer_entry(), &linked, &mut report);
            checked_sources.insert(expense.id.clone());
        }

        // Rows on this day whose owner is dated elsewhere or gone
        for record in &records {
            match record.owner() {
                RecordOwner::Operator => {}
                RecordOwner::VisitPayment(id) if !checked_sources.contains(id) => {
                    match self.visit_payment_repository.find(&mut conn, id).await? {
                        Some(payment) => {
                            check_single(record, id, payment.drawer_entry(), &mut report)
                        }
                        None => report.orphaned_ledger_records.push(record.id.clone()),
                    }
                }
                RecordOwner::Expense(id) if !checked_sources.contains(id) => {
                    match self.expense_repository.find(&mut conn, id).await? {
                        Some(expense) => {
                            check_single(record, id, expense.drawer_entry(), &mut report)
                        }
                        None => report.orphaned_ledger_records.push(record.id.clone()),
                    }
                }
                RecordOwner::VisitPayment(_) | RecordOwner::Expense(_) => {}
            }
        }

        if !report.is_consistent() {
            warn!(
                "Ledger for {} is inconsistent: {} missing, {} orphaned, {} mismatched",
                date,
                report.missing_ledger_records.len(),
                report.orphaned_ledger_records.len(),
                report.mismatched_records.len()
            );
        }
        Ok(report)
    }
}

fn check_linked(
    source_id: &str,
    desired: Option<LinkedEntry>,
    linked: &[LedgerRecord],
    report: &mut Reconciliation,
) {
    match (desired, linked.split_first()) {
        (None, None) => {}
        (Some(_), None) => report.missing_ledger_records.push(source_id.to_string()),
        (desired, Some((first, rest))) => {
            check_single(first, source_id, desired, report);
            for duplicate in rest {
                report.mismatched_records.push(Mismatch {
                    ledger_record_id: duplicate.id.clone(),
                    source_id: source_id.to_string(),
                    reason: "duplicate ledger record".to_string(),
                });
            }
        }
    }
}

fn check_single(
    record: &LedgerRecord,
    source_id: &str,
    desired: Option<LinkedEntry>,
    report: &mut Reconciliation,
) {
    let reason = match desired {
        None => Some("source was not paid in cash".to_string()),
        Some(entry) if record.matches_entry(&entry) => None,
        Some(entry) => {
            let mut differences = Vec::new();
            if record.date != entry.date {
                differences.push(format!("date {} vs {}", record.date, entry.date));
            }
            if record.amount != entry.amount {
                differences.push(format!("amount {} vs {}", record.amount, entry.amount));
            }
            if record.description != entry.description {
                differences.push("description differs".to_string());
            }
            Some(differences.join(", "))
        }
    };

    if let Some(reason) = reason {
        report.mismatched_records.push(Mismatch {
            ledger_record_id: record.id.clone(),
            source_id: source_id.to_string(),
            reason,
        });
    }
}
