pub mod ledger_mapper;
pub mod payment_mapper;

pub use ledger_mapper::LedgerMapper;
pub use payment_mapper::PaymentMapper;
