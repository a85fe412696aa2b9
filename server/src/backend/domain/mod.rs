//! # Domain Module
//!
//! Business logic for the clinic cash drawer.
//!
//! ## Module Organization
//!
//! - **ledger_service**: Ledger record store; manual deposits and linked writes
//! - **visit_payment_service**: Visit payments and their `Income` ledger rows
//! - **expense_service**: Expenses and their `Expense` ledger rows
//! - **balance_service**: Previous closing, daily fold and reconciliation
//! - **refresh_coordinator**: Signal that tells views to re-fetch after a mutation
//! - **manual_deposit_form**: Amount/description parsing and validation
//! - **cash_ledger_view**: Drawer screen state, formatting and delete confirmation
//!
//! ## Business Rules
//!
//! - Amounts are whole won and never stored negative; the kind gives the sign
//! - Only cash visit payments and expenses reach the ledger
//! - Income and expense rows change only through their owning record
//! - Balances are derived from the rows on every read, never stored

pub mod balance_service;
pub mod cash_ledger_view;
pub mod commands;
pub mod errors;
pub mod expense_service;
pub mod ledger_service;
pub mod manual_deposit_form;
pub mod models;
pub mod refresh_coordinator;
pub mod visit_payment_service;

pub use balance_service::BalanceService;
pub use cash_ledger_view::CashLedgerView;
pub use errors::{LedgerError, LedgerResult};
pub use expense_service::ExpenseService;
pub use ledger_service::LedgerService;
pub use manual_deposit_form::ManualDepositForm;
pub use refresh_coordinator::RefreshCoordinator;
pub use visit_payment_service::VisitPaymentService;
