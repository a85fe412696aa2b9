//! Domain-level command and result types.
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types.

pub mod ledger {
    use chrono::NaiveDate;

    use crate::backend::domain::models::ledger_record::{LedgerKind, LedgerRecord};

    /// Input for an operator-entered drawer movement.
    #[derive(Debug, Clone)]
    pub struct CreateManualDepositCommand {
        pub date: NaiveDate,
        /// Anything other than `ManualDeposit` is rejected
        pub kind: LedgerKind,
        pub amount_input: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateManualDepositCommand {
        pub id: String,
        pub amount_input: String,
        pub description: Option<String>,
    }

    /// What a linked write did to the ledger
    #[derive(Debug, Clone, PartialEq)]
    pub enum LinkedChange {
        Created(LedgerRecord),
        Updated(LedgerRecord),
        Removed(u64),
        /// Already in sync; carries the existing row when there is one
        Unchanged(Option<LedgerRecord>),
    }

    impl LinkedChange {
        /// The ledger row left in place, if any
        pub fn record(&self) -> Option<&LedgerRecord> {
            match self {
                LinkedChange::Created(record) | LinkedChange::Updated(record) => Some(record),
                LinkedChange::Unchanged(record) => record.as_ref(),
                LinkedChange::Removed(_) => None,
            }
        }

        pub fn removed_count(&self) -> u64 {
            match self {
                LinkedChange::Removed(count) => *count,
                _ => 0,
            }
        }
    }
}

pub mod visit_payments {
    use chrono::NaiveDate;

    use crate::backend::domain::models::{
        ledger_record::LedgerRecord, payment_method::PaymentMethod, visit_payment::VisitPayment,
    };

    /// Field values for creating or replacing a visit payment.
    #[derive(Debug, Clone)]
    pub struct SaveVisitPaymentCommand {
        pub date: NaiveDate,
        pub patient_name: String,
        pub amount: i64,
        pub method: PaymentMethod,
        pub description: Option<String>,
    }

    /// A saved visit payment with its cash drawer row, if it has one.
    #[derive(Debug, Clone)]
    pub struct VisitPaymentResult {
        pub payment: VisitPayment,
        pub ledger_record: Option<LedgerRecord>,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteVisitPaymentResult {
        pub deleted_id: String,
        pub removed_ledger_records: u64,
    }
}

pub mod expenses {
    use chrono::NaiveDate;

    use crate::backend::domain::models::{
        expense::Expense, ledger_record::LedgerRecord, payment_method::PaymentMethod,
    };

    /// Field values for creating or replacing an expense.
    #[derive(Debug, Clone)]
    pub struct SaveExpenseCommand {
        pub date: NaiveDate,
        pub vendor: Option<String>,
        pub amount: i64,
        pub method: PaymentMethod,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct ExpenseResult {
        pub expense: Expense,
        pub ledger_record: Option<LedgerRecord>,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteExpenseResult {
        pub deleted_id: String,
        pub removed_ledger_records: u64,
    }
}
