//! How a visit payment or expense was settled.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Transfer => "Transfer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Cash" => Some(PaymentMethod::Cash),
            "Card" => Some(PaymentMethod::Card),
            "Transfer" => Some(PaymentMethod::Transfer),
            _ => None,
        }
    }

    /// Only cash moves money through the drawer
    pub fn touches_drawer(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}
