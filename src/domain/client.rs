use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::DomainError;
use super::{optional, required, within_limit};

const NAME_AND_PHONE_REQUIRED: &str = "The name and phone number are required.";

pub const NAME_MAX_CHARS: usize = 255;
pub const PHONE_MAX_CHARS: usize = 50;
pub const LOCATION_MAX_CHARS: usize = 255;

/// Client fields as submitted by a form, before validation.
#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    pub name: String,
    pub phone: String,
    pub location: Option<String>,
}

impl ClientInput {
    pub fn validate(&self) -> Result<ClientDetails, DomainError> {
        let details = ClientDetails {
            name: required(&self.name, NAME_AND_PHONE_REQUIRED)?,
            phone: required(&self.phone, NAME_AND_PHONE_REQUIRED)?,
            location: optional(self.location.as_deref()),
        };
        within_limit(&details.name, NAME_MAX_CHARS, "Name")?;
        within_limit(&details.phone, PHONE_MAX_CHARS, "Phone number")?;
        if let Some(location) = &details.location {
            within_limit(location, LOCATION_MAX_CHARS, "Location")?;
        }
        Ok(details)
    }
}

/// The editable part of a client, already trimmed and validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientDetails {
    pub name: String,
    pub phone: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn details(&self) -> ClientDetails {
        ClientDetails {
            name: self.name.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
        }
    }
}
