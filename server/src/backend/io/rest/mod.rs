//! # REST API Interface Layer
//!
//! HTTP endpoints for the clinic cash drawer. Handlers translate shared DTOs
//! into domain commands, call one service, and map the result back.
//! Failures are returned as [`shared::ApiErrorBody`] with a status picked
//! from the error kind (see [`error`]).

pub mod error;
pub mod expense_apis;
pub mod extract;
pub mod ledger_apis;
pub mod mappers;
pub mod refresh_apis;
pub mod visit_payment_apis;

pub use expense_apis::*;
pub use ledger_apis::*;
pub use refresh_apis::*;
pub use visit_payment_apis::*;
