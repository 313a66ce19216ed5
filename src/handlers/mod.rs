pub mod clients;
pub mod invoices;
pub mod products;

use std::str::FromStr;

use actix_web::web;
use bigdecimal::BigDecimal;

use crate::errors::AppError;

/// Money travels as a decimal string, e.g. "9.99", to avoid floating-point drift.
pub(crate) fn parse_money(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid {field} '{value}': {e}")))
}

/// Runs a blocking service call on the actix thread pool.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, crate::domain::errors::DomainError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}
