use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DomainError::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(DomainError::NotFound("Invoice").to_string(), "Invoice not found");
    }

    #[test]
    fn invalid_helper_builds_invalid_input() {
        let err = DomainError::invalid("bad");
        assert!(matches!(err, DomainError::InvalidInput(ref m) if m == "bad"));
    }
}
