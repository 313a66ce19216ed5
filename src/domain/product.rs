use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::DomainError;
use super::{required, within_limit};

const NAME_AND_DESIGN_REQUIRED: &str = "Name and design number are required.";
const PRICE_POSITIVE: &str = "Price must be a positive number.";

pub const NAME_MAX_CHARS: usize = 255;
pub const DESIGN_NUMBER_MAX_CHARS: usize = 100;

/// Product fields as submitted by a form, before validation.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub design_number: String,
    pub price: BigDecimal,
    pub sizes: Vec<String>,
}

impl ProductInput {
    /// New products may be free (`price >= 0`).
    pub fn validate_for_create(&self) -> Result<ProductDetails, DomainError> {
        if self.price < BigDecimal::zero() {
            return Err(DomainError::invalid(PRICE_POSITIVE));
        }
        self.details()
    }

    /// Edits must carry a strictly positive price.
    pub fn validate_for_update(&self) -> Result<ProductDetails, DomainError> {
        if self.price <= BigDecimal::zero() {
            return Err(DomainError::invalid(PRICE_POSITIVE));
        }
        self.details()
    }

    fn details(&self) -> Result<ProductDetails, DomainError> {
        let details = ProductDetails {
            name: required(&self.name, NAME_AND_DESIGN_REQUIRED)?,
            design_number: required(&self.design_number, NAME_AND_DESIGN_REQUIRED)?,
            price: self.price.clone(),
            sizes: self
                .sizes
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        };
        within_limit(&details.name, NAME_MAX_CHARS, "Name")?;
        within_limit(&details.design_number, DESIGN_NUMBER_MAX_CHARS, "Design number")?;
        Ok(details)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetails {
    pub name: String,
    pub design_number: String,
    pub price: BigDecimal,
    /// Empty when the product is not sold in sizes.
    pub sizes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub design_number: String,
    pub price: BigDecimal,
    pub sizes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn details(&self) -> ProductDetails {
        ProductDetails {
            name: self.name.clone(),
            design_number: self.design_number.clone(),
            price: self.price.clone(),
            sizes: self.sizes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn input(price: &str) -> ProductInput {
        ProductInput {
            name: " Kurta ".into(),
            design_number: " D-101 ".into(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            sizes: vec![" S".into(), "".into(), "M ".into()],
        }
    }

    #[test]
    fn create_accepts_zero_price() {
        let details = input("0").validate_for_create().expect("free product allowed");
        assert_eq!(details.name, "Kurta");
        assert_eq!(details.design_number, "D-101");
        assert_eq!(details.sizes, vec!["S".to_string(), "M".to_string()]);
    }

    #[test]
    fn create_rejects_negative_price() {
        assert!(input("-1").validate_for_create().is_err());
    }

    #[test]
    fn update_requires_strictly_positive_price() {
        assert!(input("0").validate_for_update().is_err());
        assert!(input("0.01").validate_for_update().is_ok());
    }

    #[test]
    fn name_and_design_number_are_required() {
        let mut missing = input("10");
        missing.design_number = "  ".into();
        let err = missing.validate_for_create().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(ref m) if m == NAME_AND_DESIGN_REQUIRED));
    }

    #[test]
    fn overlong_design_number_is_rejected_on_create_and_update() {
        let mut long = input("10");
        long.design_number = "D".repeat(DESIGN_NUMBER_MAX_CHARS + 1);
        assert!(long.validate_for_create().is_err());
        assert!(long.validate_for_update().is_err());

        long.design_number = "D".repeat(DESIGN_NUMBER_MAX_CHARS);
        assert!(long.validate_for_create().is_ok());
    }
}
