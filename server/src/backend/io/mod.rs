//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services.
//!
//! ## Supported Operations
//!
//! - **/api/ledger**: day listing, previous closing, day balance,
//!   reconciliation and manual deposit create/update/delete
//! - **/api/visit-payments**: visit payment CRUD
//! - **/api/expenses**: expense CRUD
//! - **/api/refresh**: current refresh generation
//! - **/api/health**: liveness

pub mod rest;

pub use rest::*;
