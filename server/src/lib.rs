//! Clinic cash drawer ledger server.
//!
//! Tracks cash movements from visit payments, expenses and manual bank
//! deposits, and computes the daily drawer balance from them.

pub mod backend;
pub mod config;
