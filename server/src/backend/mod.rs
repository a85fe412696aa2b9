//! # Backend Module
//!
//! Contains all non-UI logic for the clinic cash drawer.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (ledger, visit payments, expenses, balances)
//!     ↓
//! Storage Layer (SQLite)
//! ```
//!
//! This module wires the layers together: it opens the database, builds the
//! services around one shared refresh coordinator and exposes the router.

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::Method,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::backend::domain::{
    BalanceService, ExpenseService, LedgerService, ManualDepositForm, RefreshCoordinator,
    VisitPaymentService,
};
use crate::backend::storage::DbConnection;
use crate::config::ServerConfig;
use shared::ManualDepositConfig;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub ledger_service: LedgerService,
    pub visit_payment_service: VisitPaymentService,
    pub expense_service: ExpenseService,
    pub balance_service: BalanceService,
    pub refresh_coordinator: RefreshCoordinator,
}

impl AppState {
    /// Build every service on top of an open database with default form limits
    pub fn new(db: DbConnection) -> Self {
        Self::with_deposit_config(db, ManualDepositConfig::default())
    }

    pub fn with_deposit_config(db: DbConnection, deposit: ManualDepositConfig) -> Self {
        let refresh_coordinator = RefreshCoordinator::new();
        let ledger_service = LedgerService::with_form(
            db.clone(),
            refresh_coordinator.clone(),
            ManualDepositForm::with_config(deposit),
        );
        Self {
            visit_payment_service: VisitPaymentService::new(db.clone(), ledger_service.clone()),
            expense_service: ExpenseService::new(db.clone(), ledger_service.clone()),
            balance_service: BalanceService::new(db),
            ledger_service,
            refresh_coordinator,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &ServerConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    info!("Setting up application state");
    Ok(AppState::with_deposit_config(db, config.deposit.clone()))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/ledger",
            get(io::list_ledger_records).post(io::create_manual_deposit),
        )
        .route("/ledger/previous", get(io::get_previous_closing))
        .route("/ledger/day", get(io::get_day_balance))
        .route("/ledger/reconcile", get(io::reconcile_day))
        .route(
            "/ledger/:id",
            put(io::update_manual_deposit).delete(io::delete_manual_deposit),
        )
        .route(
            "/visit-payments",
            get(io::list_visit_payments).post(io::create_visit_payment),
        )
        .route(
            "/visit-payments/:id",
            get(io::get_visit_payment)
                .put(io::update_visit_payment)
                .delete(io::delete_visit_payment),
        )
        .route("/expenses", get(io::list_expenses).post(io::create_expense))
        .route(
            "/expenses/:id",
            get(io::get_expense)
                .put(io::update_expense)
                .delete(io::delete_expense),
        )
        .route("/refresh", get(io::get_refresh_signal))
        .route("/health", get(io::health_check));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
