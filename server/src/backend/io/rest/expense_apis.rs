//! # REST API for Expenses

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{info, warn};

use crate::backend::io::rest::extract::ApiJson;
use crate::backend::io::rest::mappers::PaymentMapper;
use crate::backend::AppState;
use shared::{DateQuery, DeleteResponse, ExpenseRequest};

pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    info!("GET /api/expenses - date: {}", query.date);

    match state.expense_service.list_for_date(query.date).await {
        Ok(expenses) => {
            let dtos: Vec<_> = expenses.into_iter().map(PaymentMapper::to_expense_dto).collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_expense(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /api/expenses/{}", id);

    match state.expense_service.get_expense(&id).await {
        Ok(expense) => (StatusCode::OK, Json(PaymentMapper::to_expense_dto(expense))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_expense(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/expenses - request: {:?}", request);

    match state
        .expense_service
        .create_expense(PaymentMapper::to_expense_command(request))
        .await
    {
        Ok(result) => {
            (StatusCode::CREATED, Json(PaymentMapper::to_expense_dto(result.expense))).into_response()
        }
        Err(e) => {
            warn!("Failed to create expense: {}", e);
            e.into_response()
        }
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ExpenseRequest>,
) -> impl IntoResponse {
    info!("PUT /api/expenses/{} - request: {:?}", id, request);

    match state
        .expense_service
        .update_expense(&id, PaymentMapper::to_expense_command(request))
        .await
    {
        Ok(result) => (StatusCode::OK, Json(PaymentMapper::to_expense_dto(result.expense))).into_response(),
        Err(e) => {
            warn!("Failed to update expense {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn delete_expense(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/expenses/{}", id);

    match state.expense_service.delete_expense(&id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(DeleteResponse {
                success_message: format!("Deleted expense {}", result.deleted_id),
                deleted_id: result.deleted_id,
                removed_ledger_records: result.removed_ledger_records,
            }),
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to delete expense {}: {}", id, e);
            e.into_response()
        }
    }
}
