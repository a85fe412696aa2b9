//! JSON body extraction for the REST handlers.
//!
//! A body that is missing a field, has the wrong type or is not JSON at all
//! is reported the same way as any other operator input problem.

use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::backend::domain::errors::{LedgerError, ValidationIssue};

/// `Json` extractor whose rejection is a [`LedgerError::Validation`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(LedgerError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for LedgerError {
    fn from(rejection: JsonRejection) -> Self {
        LedgerError::validation(ValidationIssue::MalformedBody(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use shared::UpdateManualDepositRequest;

    async fn extract(body: &str) -> Result<UpdateManualDepositRequest, LedgerError> {
        let request = Request::builder()
            .method("PUT")
            .uri("/api/ledger/x")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        ApiJson::<UpdateManualDepositRequest>::from_request(request, &())
            .await
            .map(|ApiJson(request)| request)
    }

    #[tokio::test]
    async fn test_well_formed_body_is_extracted() {
        let request = extract(r#"{"amount":5000,"description":null}"#).await.unwrap();
        assert_eq!(request.amount.into_text(), "5000");
    }

    #[tokio::test]
    async fn test_missing_field_is_a_validation_error() {
        let err = extract(r#"{"description":"night safe"}"#).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        match err {
            LedgerError::Validation(issues) => {
                assert_eq!(issues.len(), 1);
                assert!(issues[0].to_string().contains("amount"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broken_json_is_a_validation_error() {
        let err = extract("{not json").await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
