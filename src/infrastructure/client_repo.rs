use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::client::{Client, ClientDetails};
use crate::domain::errors::DomainError;
use crate::domain::events::{Aggregate, ChangeEvent};
use crate::domain::ports::ClientRepository;
use crate::schema::{clients, invoices};

use super::models::{ClientRow, NewClientRow};
use super::{client_in_use, outbox};

pub struct DieselClientRepository {
    pool: DbPool,
}

impl DieselClientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ClientRepository for DieselClientRepository {
    fn create(&self, details: ClientDetails) -> Result<Client, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row: ClientRow = diesel::insert_into(clients::table)
                .values(&NewClientRow {
                    id: Uuid::new_v4(),
                    name: details.name,
                    phone: details.phone,
                    location: details.location,
                })
                .returning(ClientRow::as_returning())
                .get_result(conn)?;

            let client = Client::from(row);
            outbox::record(conn, ChangeEvent::created(Aggregate::Client, client.id, &client)?)?;
            Ok(client)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, DomainError> {
        let mut conn = self.pool.get()?;

        let row: Option<ClientRow> = clients::table
            .find(id)
            .select(ClientRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Client::from))
    }

    fn list(&self) -> Result<Vec<Client>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<ClientRow> = clients::table
            .select(ClientRow::as_select())
            .order(clients::created_at.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    fn update(&self, id: Uuid, details: ClientDetails) -> Result<Client, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row: ClientRow = diesel::update(clients::table.find(id))
                .set((
                    clients::name.eq(details.name),
                    clients::phone.eq(details.phone),
                    clients::location.eq(details.location),
                    clients::updated_at.eq(diesel::dsl::now),
                ))
                .returning(ClientRow::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Client"))?;

            let client = Client::from(row);
            outbox::record(conn, ChangeEvent::updated(Aggregate::Client, id, &client)?)?;
            Ok(client)
        })
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let referenced: i64 = invoices::table
                .filter(invoices::client_id.eq(id))
                .count()
                .get_result(conn)?;
            if referenced > 0 {
                return Err(client_in_use());
            }

            let deleted = diesel::delete(clients::table.find(id)).execute(conn)?;
            if deleted == 0 {
                return Err(DomainError::NotFound("Client"));
            }

            outbox::record(conn, ChangeEvent::deleted(Aggregate::Client, id))
        })
    }
}
