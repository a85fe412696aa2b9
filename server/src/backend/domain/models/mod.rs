pub mod expense;
pub mod ledger_record;
pub mod payment_method;
pub mod visit_payment;
