use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductInput};
use crate::domain::UpdateOutcome;

use super::rejected;

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub fn create_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        let details = input
            .validate_for_create()
            .map_err(|e| rejected("product", e))?;
        let product = self.repo.create(details)?;
        log::info!(
            "created product {} ({} / {})",
            product.id,
            product.name,
            product.design_number
        );
        Ok(product)
    }

    pub fn get_product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Product"))
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.repo.list()
    }

    pub fn update_product(
        &self,
        id: Uuid,
        input: ProductInput,
    ) -> Result<UpdateOutcome<Product>, DomainError> {
        let details = input
            .validate_for_update()
            .map_err(|e| rejected("product", e))?;
        let existing = self.get_product(id)?;
        if existing.details() == details {
            log::debug!("product {id} unchanged, skipping write");
            return Ok(UpdateOutcome::Unchanged(existing));
        }

        let product = self.repo.update(id, details)?;
        log::info!("updated product {id}");
        Ok(UpdateOutcome::Modified(product))
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id)?;
        log::info!("deleted product {id}");
        Ok(())
    }
}
