//! Domain model for a cash drawer ledger record.
use chrono::NaiveDate;
use uuid::Uuid;

use crate::backend::domain::errors::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerKind {
    Income,
    Expense,
    ManualDeposit,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Income => "Income",
            LedgerKind::Expense => "Expense",
            LedgerKind::ManualDeposit => "ManualDeposit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Income" => Some(LedgerKind::Income),
            "Expense" => Some(LedgerKind::Expense),
            "ManualDeposit" => Some(LedgerKind::ManualDeposit),
            _ => None,
        }
    }
}

/// The domain record that owns a linked ledger row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOwner<'a> {
    VisitPayment(&'a str),
    Expense(&'a str),
    /// Operator-entered row, owned by the ledger itself
    Operator,
}

/// Cash movement a visit payment or expense wants mirrored in the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedEntry {
    pub date: NaiveDate,
    pub amount: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    pub id: String,
    pub date: NaiveDate,
    pub kind: LedgerKind,
    pub amount: i64,
    pub description: Option<String>,
    pub source_visit_payment_id: Option<String>,
    pub source_expense_id: Option<String>,
}

impl LedgerRecord {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn manual_deposit(date: NaiveDate, amount: i64, description: String) -> Self {
        Self {
            id: Self::generate_id(),
            date,
            kind: LedgerKind::ManualDeposit,
            amount,
            description: Some(description),
            source_visit_payment_id: None,
            source_expense_id: None,
        }
    }

    pub fn for_visit_payment(
        visit_payment_id: &str,
        date: NaiveDate,
        amount: i64,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Self::generate_id(),
            date,
            kind: LedgerKind::Income,
            amount,
            description,
            source_visit_payment_id: Some(visit_payment_id.to_string()),
            source_expense_id: None,
        }
    }

    pub fn for_expense(
        expense_id: &str,
        date: NaiveDate,
        amount: i64,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Self::generate_id(),
            date,
            kind: LedgerKind::Expense,
            amount,
            description,
            source_visit_payment_id: None,
            source_expense_id: Some(expense_id.to_string()),
        }
    }

    /// True when date, amount and description already match `entry`
    pub fn matches_entry(&self, entry: &LinkedEntry) -> bool {
        self.date == entry.date
            && self.amount == entry.amount
            && self.description == entry.description
    }

    /// Rebuild a record from stored columns, rejecting rows that break the
    /// kind/reference pairing or carry a negative amount.
    pub fn from_parts(
        id: String,
        date: NaiveDate,
        kind: &str,
        amount: i64,
        description: Option<String>,
        source_visit_payment_id: Option<String>,
        source_expense_id: Option<String>,
    ) -> Result<Self, LedgerError> {
        let kind = LedgerKind::parse(kind)
            .ok_or_else(|| LedgerError::CorruptRecord(format!("{}: unknown kind '{}'", id, kind)))?;

        if amount < 0 {
            return Err(LedgerError::CorruptRecord(format!(
                "{}: negative amount {}",
                id, amount
            )));
        }

        let consistent = match (&kind, &source_visit_payment_id, &source_expense_id) {
            (LedgerKind::Income, Some(_), None) => true,
            (LedgerKind::Expense, None, Some(_)) => true,
            (LedgerKind::ManualDeposit, None, None) => true,
            _ => false,
        };
        if !consistent {
            return Err(LedgerError::CorruptRecord(format!(
                "{}: kind {} does not match its source references",
                id,
                kind.as_str()
            )));
        }

        Ok(Self {
            id,
            date,
            kind,
            amount,
            description,
            source_visit_payment_id,
            source_expense_id,
        })
    }

    /// Only rows without an owning domain record may be changed from the
    /// ledger surface.
    pub fn is_operator_editable(&self) -> bool {
        self.source_visit_payment_id.is_none() && self.source_expense_id.is_none()
    }

    pub fn owner(&self) -> RecordOwner<'_> {
        match (&self.source_visit_payment_id, &self.source_expense_id) {
            (Some(id), _) => RecordOwner::VisitPayment(id),
            (None, Some(id)) => RecordOwner::Expense(id),
            (None, None) => RecordOwner::Operator,
        }
    }

    /// Effect of this record on the drawer balance
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            LedgerKind::Income => self.amount,
            LedgerKind::Expense | LedgerKind::ManualDeposit => -self.amount,
        }
    }
}
