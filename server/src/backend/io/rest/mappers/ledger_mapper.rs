use crate::backend::domain::{
    balance_service::{DayBalance as DomainDayBalance, PreviousClosing, Reconciliation},
    models::ledger_record::{LedgerKind as DomainLedgerKind, LedgerRecord as DomainLedgerRecord},
};
use shared::{
    DayBalance as SharedDayBalance, LedgerKind as SharedLedgerKind, LedgerMismatch,
    LedgerRecord as SharedLedgerRecord, PreviousClosingResponse, ReconciliationReport,
};

pub struct LedgerMapper;

impl LedgerMapper {
    pub fn to_dto(domain: DomainLedgerRecord) -> SharedLedgerRecord {
        SharedLedgerRecord {
            id: domain.id,
            date: domain.date,
            kind: Self::to_dto_kind(domain.kind),
            amount: domain.amount,
            description: domain.description,
            source_visit_payment_ref: domain.source_visit_payment_id,
            source_expense_ref: domain.source_expense_id,
        }
    }

    pub fn to_dto_list(records: Vec<DomainLedgerRecord>) -> Vec<SharedLedgerRecord> {
        records.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_domain_kind(dto_kind: SharedLedgerKind) -> DomainLedgerKind {
        match dto_kind {
            SharedLedgerKind::Income => DomainLedgerKind::Income,
            SharedLedgerKind::Expense => DomainLedgerKind::Expense,
            SharedLedgerKind::ManualDeposit => DomainLedgerKind::ManualDeposit,
        }
    }

    pub fn to_dto_kind(domain_kind: DomainLedgerKind) -> SharedLedgerKind {
        match domain_kind {
            DomainLedgerKind::Income => SharedLedgerKind::Income,
            DomainLedgerKind::Expense => SharedLedgerKind::Expense,
            DomainLedgerKind::ManualDeposit => SharedLedgerKind::ManualDeposit,
        }
    }

    pub fn to_previous_closing_dto(domain: PreviousClosing) -> PreviousClosingResponse {
        PreviousClosingResponse {
            closing_amount: domain.closing_amount,
            activity_date: domain.activity_date,
        }
    }

    pub fn to_day_balance_dto(domain: DomainDayBalance) -> SharedDayBalance {
        SharedDayBalance {
            date: domain.date,
            previous_closing: domain.previous_closing.closing_amount,
            daily_delta: domain.fold.daily_delta,
            current_balance: domain.fold.current_balance,
            total_income: domain.fold.total_income,
            total_expense: domain.fold.total_expense,
            total_manual_deposit: domain.fold.total_manual_deposit,
            records: Self::to_dto_list(domain.records),
        }
    }

    pub fn to_reconciliation_dto(domain: Reconciliation) -> ReconciliationReport {
        let is_consistent = domain.is_consistent();
        ReconciliationReport {
            date: domain.date,
            missing_ledger_records: domain.missing_ledger_records,
            orphaned_ledger_records: domain.orphaned_ledger_records,
            mismatched_records: domain
                .mismatched_records
                .into_iter()
                .map(|m| LedgerMismatch {
                    ledger_record_id: m.ledger_record_id,
                    source_id: m.source_id,
                    reason: m.reason,
                })
                .collect(),
            is_consistent,
        }
    }
}
