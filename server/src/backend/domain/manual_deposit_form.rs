//! Manual deposit form handling.
//!
//! Operators type the amount as free text ("5,000", "₩5,000", " 5000 ").
//! This module turns that input into a validated amount and description, or
//! into the list of problems to show inline next to the form.

use shared::ManualDepositConfig;

use crate::backend::domain::errors::{LedgerError, ValidationIssue};

/// A manual deposit that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidManualDeposit {
    pub amount: i64,
    pub description: String,
}

#[derive(Clone)]
pub struct ManualDepositForm {
    config: ManualDepositConfig,
}

impl ManualDepositForm {
    pub fn new() -> Self {
        Self {
            config: ManualDepositConfig::default(),
        }
    }

    pub fn with_config(config: ManualDepositConfig) -> Self {
        Self { config }
    }

    /// Validate raw form input. All problems are collected, not just the first.
    pub fn validate(
        &self,
        amount_input: &str,
        description: Option<&str>,
    ) -> Result<ValidManualDeposit, LedgerError> {
        let mut issues = Vec::new();

        let amount = match self.parse_amount(amount_input) {
            Ok(amount) => Some(amount),
            Err(issue) => {
                issues.push(issue);
                None
            }
        };

        let description = description.map(str::trim).unwrap_or("");
        let char_count = description.chars().count();
        if char_count > self.config.max_description_length {
            issues.push(ValidationIssue::DescriptionTooLong(
                char_count,
                self.config.max_description_length,
            ));
        }

        match amount {
            Some(amount) if issues.is_empty() => Ok(ValidManualDeposit {
                amount,
                description: if description.is_empty() {
                    self.config.default_label.clone()
                } else {
                    description.to_string()
                },
            }),
            _ => Err(LedgerError::Validation(issues)),
        }
    }

    /// Parse a whole-won amount, tolerating the currency symbol, thousands
    /// separators and surrounding whitespace.
    pub fn parse_amount(&self, amount_input: &str) -> Result<i64, ValidationIssue> {
        let cleaned: String = amount_input
            .trim()
            .replace(&self.config.currency_symbol, "")
            .replace('원', "")
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return Err(ValidationIssue::EmptyAmount);
        }

        let amount = cleaned
            .parse::<i64>()
            .map_err(|_| ValidationIssue::InvalidAmountFormat(amount_input.trim().to_string()))?;

        if amount <= 0 {
            return Err(ValidationIssue::AmountNotPositive);
        }
        if amount > self.config.max_amount {
            return Err(ValidationIssue::AmountTooLarge(self.config.max_amount));
        }

        Ok(amount)
    }

    /// Checks shared by visit payment and expense saves, where the amount is
    /// already numeric and zero is allowed.
    pub fn check_record_fields(&self, amount: i64, description: Option<&str>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if amount < 0 {
            issues.push(ValidationIssue::AmountNegative);
        } else if amount > self.config.max_amount {
            issues.push(ValidationIssue::AmountTooLarge(self.config.max_amount));
        }
        if let Some(description) = description {
            let char_count = description.trim().chars().count();
            if char_count > self.config.max_description_length {
                issues.push(ValidationIssue::DescriptionTooLong(
                    char_count,
                    self.config.max_description_length,
                ));
            }
        }
        issues
    }

    /// Format an amount for display, e.g. `₩1,234,500`
    pub fn format_amount(&self, amount: i64) -> String {
        format!("{}{}", self.config.currency_symbol, group_thousands(amount.unsigned_abs()))
    }
}

impl Default for ManualDepositForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim optional free text, treating blank as absent
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
