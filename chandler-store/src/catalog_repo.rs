use async_trait::async_trait;
use chandler_core::DomainError;
use std::sync::Arc;
use uuid::Uuid;

use chandler_catalog::product::{Product, SupplierProduct};
use chandler_catalog::repository::CatalogRepository;

use crate::database::Database;

pub struct StoreCatalogRepository {
    db: Arc<Database>,
}

impl StoreCatalogRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for StoreCatalogRepository {
    async fn create_product(&self, product: Product) -> Result<Product, DomainError> {
        let mut products = self.db.products.write().await;
        if let Some(code) = &product.impa_code {
            if products
                .values()
                .any(|p| p.impa_code.as_deref() == Some(code.as_str()))
            {
                return Err(DomainError::conflict(format!(
                    "a product with IMPA code {code} already exists"
                )));
            }
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.db.products.read().await.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let products = self.db.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update_product(&self, product: Product) -> Result<Product, DomainError> {
        let mut products = self.db.products.write().await;
        let stored = products
            .get(&product.id)
            .ok_or_else(|| DomainError::not_found(format!("product {}", product.id)))?;
        if product.version < stored.version {
            return Err(DomainError::VersionConflict {
                expected: product.version,
                found: stored.version,
            });
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        let mut products = self.db.products.write().await;
        let listings = self.db.supplier_products.read().await;
        if listings.values().any(|l| l.product_id == id) {
            return Err(DomainError::conflict(
                "product has supplier listings and cannot be deleted",
            ));
        }
        products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    async fn create_supplier_product(
        &self,
        listing: SupplierProduct,
    ) -> Result<SupplierProduct, DomainError> {
        let products = self.db.products.read().await;
        if !products.contains_key(&listing.product_id) {
            return Err(DomainError::not_found(format!("product {}", listing.product_id)));
        }
        drop(products);

        let mut listings = self.db.supplier_products.write().await;
        if listings.values().any(|l| {
            l.supplier_organization_id == listing.supplier_organization_id
                && l.product_id == listing.product_id
        }) {
            return Err(DomainError::conflict(
                "supplier already lists this product; update the listing instead",
            ));
        }
        listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn list_supplier_products(
        &self,
        supplier_organization_id: Uuid,
    ) -> Result<Vec<SupplierProduct>, DomainError> {
        let listings = self.db.supplier_products.read().await;
        let mut matched: Vec<SupplierProduct> = listings
            .values()
            .filter(|l| l.supplier_organization_id == supplier_organization_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }

    async fn update_supplier_product(
        &self,
        listing: SupplierProduct,
    ) -> Result<SupplierProduct, DomainError> {
        let mut listings = self.db.supplier_products.write().await;
        let stored = listings
            .get(&listing.id)
            .ok_or_else(|| DomainError::not_found(format!("supplier product {}", listing.id)))?;
        if listing.version < stored.version {
            return Err(DomainError::VersionConflict {
                expected: listing.version,
                found: stored.version,
            });
        }
        listings.insert(listing.id, listing.clone());
        Ok(listing)
    }
}
