use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Client,
    Product,
    Invoice,
}

impl Aggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Client => "Client",
            Aggregate::Product => "Product",
            Aggregate::Invoice => "Invoice",
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change published through the outbox, one per committed mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub aggregate: Aggregate,
    pub aggregate_id: Uuid,
    /// `ClientCreated`, `InvoiceUpdated`, `ProductDeleted`, ...
    pub event_type: String,
    pub payload: Value,
}

impl ChangeEvent {
    pub fn created<T: Serialize>(aggregate: Aggregate, id: Uuid, entity: &T) -> Result<Self, DomainError> {
        Self::with_entity(aggregate, id, "Created", entity)
    }

    pub fn updated<T: Serialize>(aggregate: Aggregate, id: Uuid, entity: &T) -> Result<Self, DomainError> {
        Self::with_entity(aggregate, id, "Updated", entity)
    }

    pub fn deleted(aggregate: Aggregate, id: Uuid) -> Self {
        Self {
            aggregate,
            aggregate_id: id,
            event_type: format!("{aggregate}Deleted"),
            payload: json!({ "id": id }),
        }
    }

    fn with_entity<T: Serialize>(
        aggregate: Aggregate,
        id: Uuid,
        action: &str,
        entity: &T,
    ) -> Result<Self, DomainError> {
        let payload = serde_json::to_value(entity)
            .map_err(|e| DomainError::Internal(format!("cannot serialize {aggregate} event: {e}")))?;
        Ok(Self {
            aggregate,
            aggregate_id: id,
            event_type: format!("{aggregate}{action}"),
            payload,
        })
    }
}
