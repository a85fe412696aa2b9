//! # REST API for the Cash Ledger
//!
//! Day listing, previous closing, day balance, reconciliation and the
//! manual deposit endpoints. Income and expense rows are listed here but
//! can only be changed through the visit payment and expense endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{info, warn};

use crate::backend::domain::commands::ledger::{
    CreateManualDepositCommand, UpdateManualDepositCommand,
};
use crate::backend::io::rest::extract::ApiJson;
use crate::backend::io::rest::mappers::LedgerMapper;
use crate::backend::AppState;
use shared::{CreateManualDepositRequest, DateQuery, DeleteResponse, UpdateManualDepositRequest};

/// List every ledger record for a date
pub async fn list_ledger_records(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    info!("GET /api/ledger - date: {}", query.date);

    match state.ledger_service.list_for_date(query.date).await {
        Ok(records) => (StatusCode::OK, Json(LedgerMapper::to_dto_list(records))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Closing balance of the most recent earlier day with activity
pub async fn get_previous_closing(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    info!("GET /api/ledger/previous - date: {}", query.date);

    match state.balance_service.previous_closing(query.date).await {
        Ok(previous) => {
            (StatusCode::OK, Json(LedgerMapper::to_previous_closing_dto(previous))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_day_balance(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    info!("GET /api/ledger/day - date: {}", query.date);

    match state.balance_service.day_balance(query.date).await {
        Ok(day) => (StatusCode::OK, Json(LedgerMapper::to_day_balance_dto(day))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn reconcile_day(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    info!("GET /api/ledger/reconcile - date: {}", query.date);

    match state.balance_service.reconcile_day(query.date).await {
        Ok(report) => {
            (StatusCode::OK, Json(LedgerMapper::to_reconciliation_dto(report))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Create a manual deposit. Any other kind is rejected.
pub async fn create_manual_deposit(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateManualDepositRequest>,
) -> impl IntoResponse {
    info!("POST /api/ledger - request: {:?}", request);

    let command = CreateManualDepositCommand {
        date: request.date,
        kind: LedgerMapper::to_domain_kind(request.kind),
        amount_input: request.amount.into_text(),
        description: request.description,
    };

    match state.ledger_service.create_manual_deposit(command).await {
        Ok(record) => (StatusCode::CREATED, Json(LedgerMapper::to_dto(record))).into_response(),
        Err(e) => {
            warn!("Failed to create manual deposit: {}", e);
            e.into_response()
        }
    }
}

pub async fn update_manual_deposit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateManualDepositRequest>,
) -> impl IntoResponse {
    info!("PUT /api/ledger/{} - request: {:?}", id, request);

    let command = UpdateManualDepositCommand {
        id,
        amount_input: request.amount.into_text(),
        description: request.description,
    };

    match state.ledger_service.update_manual_deposit(command).await {
        Ok(record) => (StatusCode::OK, Json(LedgerMapper::to_dto(record))).into_response(),
        Err(e) => {
            warn!("Failed to update manual deposit: {}", e);
            e.into_response()
        }
    }
}

pub async fn delete_manual_deposit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/ledger/{}", id);

    match state.ledger_service.delete_manual_deposit(&id).await {
        Ok(record) => {
            let response = DeleteResponse {
                success_message: format!("Deleted manual deposit {}", record.id),
                deleted_id: record.id,
                removed_ledger_records: 1,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Failed to delete manual deposit {}: {}", id, e);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::{
        commands::visit_payments::SaveVisitPaymentCommand, models::payment_method::PaymentMethod,
    };
    use crate::backend::storage::DbConnection;
    use axum::body::to_bytes;
    use axum::response::Response;
    use chrono::NaiveDate;
    use serde::de::DeserializeOwned;
    use shared::{
        AmountInput, ApiErrorBody, DayBalance, LedgerKind, LedgerRecord, PreviousClosingResponse,
    };

    async fn setup_test_state() -> AppState {
        let db = DbConnection::init_test().await.unwrap();
        AppState::new(db)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn deposit_request(kind: LedgerKind, amount: &str) -> CreateManualDepositRequest {
        CreateManualDepositRequest {
            date: date(4),
            kind,
            amount: AmountInput::Text(amount.to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_manual_deposit_handler() {
        let state = setup_test_state().await;

        let response = create_manual_deposit(
            State(state.clone()),
            ApiJson(deposit_request(LedgerKind::ManualDeposit, "5,000")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let record: LedgerRecord = read_json(response).await;
        assert_eq!(record.amount, 5_000);
        assert_eq!(record.description.as_deref(), Some("Bank deposit"));
        assert_eq!(state.refresh_coordinator.generation(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_non_manual_kind() {
        let state = setup_test_state().await;

        let response = create_manual_deposit(
            State(state),
            ApiJson(deposit_request(LedgerKind::Income, "5,000")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: ApiErrorBody = read_json(response).await;
        assert_eq!(body.kind, "ValidationError");
    }

    #[tokio::test]
    async fn test_update_and_delete_linked_record_conflict() {
        let state = setup_test_state().await;
        let created = state
            .visit_payment_service
            .create_visit_payment(SaveVisitPaymentCommand {
                date: date(4),
                patient_name: "Choi Yuna".to_string(),
                amount: 50_000,
                method: PaymentMethod::Cash,
                description: None,
            })
            .await
            .unwrap();
        let record_id = created.ledger_record.unwrap().id;

        let response = update_manual_deposit(
            State(state.clone()),
            Path(record_id.clone()),
            ApiJson(UpdateManualDepositRequest {
                amount: AmountInput::Number(1),
                description: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: ApiErrorBody = read_json(response).await;
        assert_eq!(body.kind, "InvalidOperation");

        let response = delete_manual_deposit(State(state.clone()), Path(record_id.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let stored = state.ledger_service.get_record(&record_id).await.unwrap();
        assert_eq!(stored.amount, 50_000);
    }

    #[tokio::test]
    async fn test_delete_missing_record_is_not_found() {
        let state = setup_test_state().await;
        let response = delete_manual_deposit(State(state), Path("missing".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_previous_and_day_handlers() {
        let state = setup_test_state().await;
        let mut earlier = deposit_request(LedgerKind::ManualDeposit, "3,000");
        earlier.date = date(2);
        create_manual_deposit(State(state.clone()), ApiJson(earlier)).await;
        create_manual_deposit(
            State(state.clone()),
            ApiJson(deposit_request(LedgerKind::ManualDeposit, "1,000")),
        )
        .await;

        let response = list_ledger_records(State(state.clone()), Query(DateQuery { date: date(4) }))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let records: Vec<LedgerRecord> = read_json(response).await;
        assert_eq!(records.len(), 1);

        let response = get_previous_closing(State(state.clone()), Query(DateQuery { date: date(4) }))
            .await
            .into_response();
        let previous: PreviousClosingResponse = read_json(response).await;
        assert_eq!(previous.closing_amount, -3_000);
        assert_eq!(previous.activity_date, Some(date(2)));

        let response = get_day_balance(State(state), Query(DateQuery { date: date(4) }))
            .await
            .into_response();
        let day: DayBalance = read_json(response).await;
        assert_eq!(day.previous_closing, -3_000);
        assert_eq!(day.current_balance, -4_000);
        assert_eq!(day.daily_delta, -1_000);
        assert_eq!(day.total_manual_deposit, 1_000);
    }

    #[tokio::test]
    async fn test_numeric_amount_is_validated_like_text() {
        let state = setup_test_state().await;

        let mut request = deposit_request(LedgerKind::ManualDeposit, "");
        request.amount = AmountInput::Number(7_000);
        let response = create_manual_deposit(State(state.clone()), ApiJson(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let record: LedgerRecord = read_json(response).await;
        assert_eq!(record.amount, 7_000);

        let response = update_manual_deposit(
            State(state.clone()),
            Path(record.id.clone()),
            ApiJson(UpdateManualDepositRequest {
                amount: AmountInput::Number(-5),
                description: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ApiErrorBody = read_json(response).await;
        assert_eq!(body.kind, "ValidationError");
        assert_eq!(body.issues, vec!["Amount must be greater than zero"]);

        let stored = state.ledger_service.get_record(&record.id).await.unwrap();
        assert_eq!(stored.amount, 7_000);
    }
}
