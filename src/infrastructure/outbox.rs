use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::events::ChangeEvent;
use crate::schema::billing_outbox;

use super::models::NewOutboxEventRow;

/// Insert `event` into `billing_outbox`.
///
/// Must be called on the connection of the transaction that performs the
/// change, so the event is committed if and only if the change is. A CDC
/// relay routes rows by `aggregate_type`.
pub fn record(conn: &mut PgConnection, event: ChangeEvent) -> Result<(), DomainError> {
    diesel::insert_into(billing_outbox::table)
        .values(&NewOutboxEventRow {
            id: Uuid::new_v4(),
            aggregate_type: event.aggregate.as_str().to_string(),
            aggregate_id: event.aggregate_id.to_string(),
            event_type: event.event_type,
            payload: event.payload,
        })
        .execute(conn)?;
    Ok(())
}
