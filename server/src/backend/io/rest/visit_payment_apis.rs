//! # REST API for Visit Payments
//!
//! Cash payments also write their ledger row; see the visit payment service.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{info, warn};

use crate::backend::io::rest::extract::ApiJson;
use crate::backend::io::rest::mappers::PaymentMapper;
use crate::backend::AppState;
use shared::{DateQuery, DeleteResponse, VisitPaymentRequest};

pub async fn list_visit_payments(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> impl IntoResponse {
    info!("GET /api/visit-payments - date: {}", query.date);

    match state.visit_payment_service.list_for_date(query.date).await {
        Ok(payments) => {
            let dtos: Vec<_> = payments
                .into_iter()
                .map(PaymentMapper::to_visit_payment_dto)
                .collect();
            (StatusCode::OK, Json(dtos)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_visit_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/visit-payments/{}", id);

    match state.visit_payment_service.get_visit_payment(&id).await {
        Ok(payment) => {
            (StatusCode::OK, Json(PaymentMapper::to_visit_payment_dto(payment))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn create_visit_payment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VisitPaymentRequest>,
) -> impl IntoResponse {
    info!("POST /api/visit-payments - request: {:?}", request);

    let command = PaymentMapper::to_visit_payment_command(request);
    match state.visit_payment_service.create_visit_payment(command).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(PaymentMapper::to_visit_payment_dto(result.payment)),
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to create visit payment: {}", e);
            e.into_response()
        }
    }
}

pub async fn update_visit_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<VisitPaymentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/visit-payments/{} - request: {:?}", id, request);

    let command = PaymentMapper::to_visit_payment_command(request);
    match state.visit_payment_service.update_visit_payment(&id, command).await {
        Ok(result) => (
            StatusCode::OK,
            Json(PaymentMapper::to_visit_payment_dto(result.payment)),
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to update visit payment {}: {}", id, e);
            e.into_response()
        }
    }
}

pub async fn delete_visit_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/visit-payments/{}", id);

    match state.visit_payment_service.delete_visit_payment(&id).await {
        Ok(result) => {
            let response = DeleteResponse {
                success_message: format!(
                    "Deleted visit payment {} and {} ledger record(s)",
                    result.deleted_id, result.removed_ledger_records
                ),
                deleted_id: result.deleted_id,
                removed_ledger_records: result.removed_ledger_records,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Failed to delete visit payment {}: {}", id, e);
            e.into_response()
        }
    }
}
