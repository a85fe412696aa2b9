//! Error taxonomy for ledger operations.

use thiserror::Error;

/// One rejected field on an operator-entered form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("Amount is required")]
    EmptyAmount,
    #[error("Amount '{0}' is not a whole number of won")]
    InvalidAmountFormat(String),
    #[error("Amount must be greater than zero")]
    AmountNotPositive,
    #[error("Amount must not be negative")]
    AmountNegative,
    #[error("Amount must not exceed {0}")]
    AmountTooLarge(i64),
    #[error("Description is {0} characters long, the limit is {1}")]
    DescriptionTooLong(usize, usize),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Only ManualDeposit records can be created here, got {0}")]
    KindNotAllowed(String),
    #[error("Request body is invalid: {0}")]
    MalformedBody(String),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    /// A linked row was targeted through the manual adjustment surface
    #[error("{0}")]
    InvalidOperation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    /// A persisted row no longer satisfies the ledger invariants
    #[error("corrupt ledger record: {0}")]
    CorruptRecord(String),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(issue: ValidationIssue) -> Self {
        LedgerError::Validation(vec![issue])
    }

    /// Stable name used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "ValidationError",
            LedgerError::InvalidOperation(_) => "InvalidOperation",
            LedgerError::NotFound { .. } => "NotFound",
            LedgerError::Storage(_) => "TransportError",
            LedgerError::CorruptRecord(_) => "CorruptRecord",
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type LedgerResult<T> = Result<T, LedgerError>;
