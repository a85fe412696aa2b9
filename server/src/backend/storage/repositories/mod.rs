// Repository modules
pub mod expense_repository;
pub mod ledger_repository;
pub mod visit_payment_repository;

// Re-export repository types
pub use expense_repository::ExpenseRepository;
pub use ledger_repository::LedgerRepository;
pub use visit_payment_repository::VisitPaymentRepository;
