//! Domain model for a patient visit payment.
use chrono::NaiveDate;
use uuid::Uuid;

use super::{ledger_record::LinkedEntry, payment_method::PaymentMethod};

#[derive(Debug, Clone, PartialEq)]
pub struct VisitPayment {
    pub id: String,
    pub date: NaiveDate,
    pub patient_name: String,
    pub amount: i64,
    pub method: PaymentMethod,
    pub description: Option<String>,
}

impl VisitPayment {
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// The ledger row this payment should have, if it was settled in cash
    pub fn drawer_entry(&self) -> Option<LinkedEntry> {
        self.method.touches_drawer().then(|| LinkedEntry {
            date: self.date,
            amount: self.amount,
            description: self.description.clone(),
        })
    }
}
