//! # Storage Module
//!
//! Persists visit payments, expenses and cash drawer ledger records in
//! SQLite through SQLx.
//!
//! Repositories expose pool-backed reads for listing, and connection-taking
//! writes so a domain write and its linked ledger write can share one
//! transaction.

pub mod connection;
pub mod repositories;

pub use connection::DbConnection;
pub use repositories::{ExpenseRepository, LedgerRepository, VisitPaymentRepository};
