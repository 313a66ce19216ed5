pub mod bill_number;
pub mod billing;
pub mod client;
pub mod errors;
pub mod events;
pub mod invoice;
pub mod ports;
pub mod product;

/// Result of a compare-then-write update.
///
/// `Unchanged` means the submitted data was identical to the stored record
/// and nothing was written.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<T> {
    Modified(T),
    Unchanged(T),
}

impl<T> UpdateOutcome<T> {
    pub fn is_modified(&self) -> bool {
        matches!(self, UpdateOutcome::Modified(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            UpdateOutcome::Modified(v) | UpdateOutcome::Unchanged(v) => v,
        }
    }
}

/// Trim a required text field, rejecting it when nothing is left.
pub(crate) fn required(value: &str, msg: &str) -> Result<String, errors::DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(errors::DomainError::invalid(msg));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank becomes `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Reject text longer than the column that stores it. Counts characters,
/// like PostgreSQL `VARCHAR(n)`.
pub(crate) fn within_limit(value: &str, limit: usize, field: &str) -> Result<(), errors::DomainError> {
    if value.chars().count() > limit {
        return Err(errors::DomainError::invalid(format!(
            "{field} must be at most {limit} characters."
        )));
    }
    Ok(())
}
