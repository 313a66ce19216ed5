use std::sync::Arc;

use uuid::Uuid;

use crate::domain::client::{Client, ClientInput};
use crate::domain::errors::DomainError;
use crate::domain::ports::ClientRepository;
use crate::domain::UpdateOutcome;

use super::rejected;

#[derive(Clone)]
pub struct ClientService {
    repo: Arc<dyn ClientRepository>,
}

impl ClientService {
    pub fn new(repo: Arc<dyn ClientRepository>) -> Self {
        Self { repo }
    }

    pub fn create_client(&self, input: ClientInput) -> Result<Client, DomainError> {
        let details = input.validate().map_err(|e| rejected("client", e))?;
        let client = self.repo.create(details)?;
        log::info!("created client {} ({})", client.id, client.name);
        Ok(client)
    }

    pub fn get_client(&self, id: Uuid) -> Result<Client, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Client"))
    }

    pub fn list_clients(&self) -> Result<Vec<Client>, DomainError> {
        self.repo.list()
    }

    pub fn update_client(&self, id: Uuid, input: ClientInput) -> Result<UpdateOutcome<Client>, DomainError> {
        let details = input.validate().map_err(|e| rejected("client", e))?;
        let existing = self.get_client(id)?;
        if existing.details() == details {
            log::debug!("client {id} unchanged, skipping write");
            return Ok(UpdateOutcome::Unchanged(existing));
        }

        let client = self.repo.update(id, details)?;
        log::info!("updated client {id}");
        Ok(UpdateOutcome::Modified(client))
    }

    pub fn delete_client(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id)?;
        log::info!("deleted client {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryStore;

    fn service() -> (InMemoryStore, ClientService) {
        let store = InMemoryStore::new();
        (store.clone(), ClientService::new(Arc::new(store)))
    }

    fn input(name: &str, phone: &str) -> ClientInput {
        ClientInput {
            name: name.into(),
            phone: phone.into(),
            location: None,
        }
    }

    #[test]
    fn create_stores_trimmed_client() {
        let (_, svc) = service();
        let client = svc.create_client(input(" Meena ", " 555-0101 ")).unwrap();

        let fetched = svc.get_client(client.id).unwrap();
        assert_eq!(fetched.name, "Meena");
        assert_eq!(fetched.phone, "555-0101");
    }

    #[test]
    fn create_rejects_blank_phone() {
        let (store, svc) = service();
        assert!(matches!(
            svc.create_client(input("Meena", "  ")),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(store.events().unwrap().is_empty());
    }

    #[test]
    fn update_with_same_data_is_unchanged() {
        let (store, svc) = service();
        let client = svc.create_client(input("Meena", "555")).unwrap();

        let outcome = svc.update_client(client.id, input(" Meena", "555 ")).unwrap();

        assert!(!outcome.is_modified());
        assert_eq!(outcome.into_inner().updated_at, client.updated_at);
        assert_eq!(store.events().unwrap().len(), 1, "only the create event");
    }

    #[test]
    fn update_with_new_phone_is_modified() {
        let (store, svc) = service();
        let client = svc.create_client(input("Meena", "555")).unwrap();

        let outcome = svc.update_client(client.id, input("Meena", "777")).unwrap();

        assert!(outcome.is_modified());
        assert_eq!(outcome.into_inner().phone, "777");
        assert_eq!(store.events().unwrap()[1].event_type, "ClientUpdated");
    }

    #[test]
    fn get_unknown_client_is_not_found() {
        let (_, svc) = service();
        assert!(matches!(
            svc.get_client(Uuid::new_v4()),
            Err(DomainError::NotFound("Client"))
        ));
    }

    #[test]
    fn delete_removes_client() {
        let (_, svc) = service();
        let client = svc.create_client(input("Meena", "555")).unwrap();

        svc.delete_client(client.id).unwrap();

        assert!(svc.list_clients().unwrap().is_empty());
        assert!(matches!(
            svc.delete_client(client.id),
            Err(DomainError::NotFound("Client"))
        ));
    }
}
