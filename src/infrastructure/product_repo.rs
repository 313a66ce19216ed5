use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::events::{Aggregate, ChangeEvent};
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductDetails};
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};
use super::outbox;

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn create(&self, details: ProductDetails) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row: ProductRow = diesel::insert_into(products::table)
                .values(&NewProductRow {
                    id: Uuid::new_v4(),
                    name: details.name,
                    design_number: details.design_number,
                    price: details.price,
                    sizes: details.sizes,
                })
                .returning(ProductRow::as_returning())
                .get_result(conn)?;

            let product = Product::from(row);
            outbox::record(
                conn,
                ChangeEvent::created(Aggregate::Product, product.id, &product)?,
            )?;
            Ok(product)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let row: Option<ProductRow> = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<ProductRow> = products::table
            .select(ProductRow::as_select())
            .order(products::created_at.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn update(&self, id: Uuid, details: ProductDetails) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row: ProductRow = diesel::update(products::table.find(id))
                .set((
                    products::name.eq(details.name),
                    products::design_number.eq(details.design_number),
                    products::price.eq(details.price),
                    products::sizes.eq(details.sizes),
                    products::updated_at.eq(diesel::dsl::now),
                ))
                .returning(ProductRow::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Product"))?;

            let product = Product::from(row);
            outbox::record(conn, ChangeEvent::updated(Aggregate::Product, id, &product)?)?;
            Ok(product)
        })
    }

    /// Invoices keep their own copy of product data, so nothing else changes.
    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let deleted = diesel::delete(products::table.find(id)).execute(conn)?;
            if deleted == 0 {
                return Err(DomainError::NotFound("Product"));
            }
            outbox::record(conn, ChangeEvent::deleted(Aggregate::Product, id))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::DieselProductRepository;
    use crate::domain::ports::ProductRepository;
    use crate::domain::product::ProductDetails;
    use crate::infrastructure::test_support::setup_db;

    #[tokio::test]
    #[ignore = "requires a container runtime for Postgres"]
    async fn sizes_and_price_roundtrip() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let product = repo
            .create(ProductDetails {
                name: "Sherwani".to_string(),
                design_number: "SW-12".to_string(),
                price: BigDecimal::from_str("4999.99").expect("valid decimal"),
                sizes: vec!["38".to_string(), "40".to_string(), "42".to_string()],
            })
            .expect("create failed");

        let found = repo
            .find_by_id(product.id)
            .expect("find failed")
            .expect("product should exist");
        assert_eq!(found.sizes, vec!["38", "40", "42"]);
        assert_eq!(found.price, BigDecimal::from_str("4999.99").unwrap());
        assert_eq!(repo.list().expect("list failed").len(), 1);
    }
}
