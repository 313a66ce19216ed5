//! Invoice arithmetic.
//!
//! Every derived money field on an invoice is produced here; nothing else in
//! the crate adds up line items or subtracts payments.

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

pub const OVERPAID_MESSAGE: &str = "The paid amount cannot be greater than the grand total.";

/// `quantity * price` for a single line.
pub fn item_total(quantity: i32, price: &BigDecimal) -> BigDecimal {
    BigDecimal::from(quantity) * price
}

/// Sum of line totals; zero for an empty invoice.
pub fn grand_total<'a, I>(totals: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a BigDecimal>,
{
    totals
        .into_iter()
        .fold(BigDecimal::zero(), |acc, total| acc + total)
}

/// Unpaid portion of an invoice.
///
/// Fails with a caller-facing message when the payment exceeds the total or
/// is negative.
pub fn remaining_balance(
    grand_total: &BigDecimal,
    paid_amount: &BigDecimal,
) -> Result<BigDecimal, DomainError> {
    if paid_amount < &BigDecimal::zero() {
        return Err(DomainError::invalid("The paid amount cannot be negative."));
    }
    if paid_amount > grand_total {
        return Err(DomainError::invalid(OVERPAID_MESSAGE));
    }
    Ok(grand_total - paid_amount)
}

/// Payment state derived from the paid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Partial,
}

impl PaymentStatus {
    /// `paid` wins over `unpaid`, so a zero-value invoice counts as paid.
    pub fn classify(grand_total: &BigDecimal, paid_amount: &BigDecimal) -> Self {
        if paid_amount >= grand_total {
            PaymentStatus::Paid
        } else if paid_amount.is_zero() {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "partial" => Ok(PaymentStatus::Partial),
            other => Err(DomainError::invalid(format!(
                "Unknown payment status '{other}', expected paid, unpaid or partial"
            ))),
        }
    }
}
