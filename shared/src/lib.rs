use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a cash movement in the drawer.
///
/// The amount on a record is always positive; whether it adds to or
/// subtracts from the drawer is decided by the kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerKind {
    /// Cash taken in from a patient visit payment
    Income,
    /// Cash paid out for an expense
    Expense,
    /// Cash removed from the drawer by an operator (bank deposit)
    ManualDeposit,
}

/// A single cash movement as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub id: String,
    pub date: NaiveDate,
    pub kind: LedgerKind,
    /// Won, always non-negative
    pub amount: i64,
    pub description: Option<String>,
    pub source_visit_payment_ref: Option<String>,
    pub source_expense_ref: Option<String>,
}

/// Balance view for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBalance {
    pub date: NaiveDate,
    pub previous_closing: i64,
    pub daily_delta: i64,
    pub current_balance: i64,
    pub total_income: i64,
    pub total_expense: i64,
    pub total_manual_deposit: i64,
    pub records: Vec<LedgerRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousClosingResponse {
    pub closing_amount: i64,
    /// Most recent day before the requested date that had any activity
    pub activity_date: Option<NaiveDate>,
}

/// Query string shared by every date-scoped listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateManualDepositRequest {
    pub date: NaiveDate,
    /// Only `ManualDeposit` is accepted on this endpoint
    pub kind: LedgerKind,
    pub amount: AmountInput,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManualDepositRequest {
    pub amount: AmountInput,
    pub description: Option<String>,
}

/// Manual deposit amount as sent by a client: a plain integer, or the raw
/// text the operator typed ("5,000", "₩5,000"). Both are validated server side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(i64),
    Text(String),
}

impl AmountInput {
    pub fn into_text(self) -> String {
        match self {
            AmountInput::Number(amount) => amount.to_string(),
            AmountInput::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPayment {
    pub id: String,
    pub date: NaiveDate,
    pub patient_name: String,
    pub amount: i64,
    pub method: PaymentMethod,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPaymentRequest {
    pub date: NaiveDate,
    pub patient_name: String,
    pub amount: i64,
    pub method: PaymentMethod,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    pub vendor: Option<String>,
    pub amount: i64,
    pub method: PaymentMethod,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    pub date: NaiveDate,
    pub vendor: Option<String>,
    pub amount: i64,
    pub method: PaymentMethod,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_id: String,
    /// Ledger rows removed by the delete
    pub removed_ledger_records: u64,
    pub success_message: String,
}

/// Current value of the cross-view refresh signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshSignalResponse {
    pub generation: u64,
}

/// Discrepancy between a cash domain record and its ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMismatch {
    pub ledger_record_id: String,
    pub source_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub date: NaiveDate,
    /// Cash visit payments or expenses with no ledger row
    pub missing_ledger_records: Vec<String>,
    /// Ledger rows whose owning record no longer exists
    pub orphaned_ledger_records: Vec<String>,
    pub mismatched_records: Vec<LedgerMismatch>,
    pub is_consistent: bool,
}

/// Error payload returned by every endpoint on failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// One of `ValidationError`, `InvalidOperation`, `NotFound`,
    /// `TransportError`, `CorruptRecord`
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

/// Limits and labels applied to the manual deposit form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualDepositConfig {
    pub max_description_length: usize,
    pub max_amount: i64,
    pub currency_symbol: String,
    /// Stored when the operator leaves the description blank
    pub default_label: String,
}

impl Default for ManualDepositConfig {
    fn default() -> Self {
        Self {
            max_description_length: 256,
            max_amount: 100_000_000,
            currency_symbol: "₩".to_string(),
            default_label: "Bank deposit".to_string(),
        }
    }
}
