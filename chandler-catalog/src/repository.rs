use async_trait::async_trait;
use chandler_core::DomainError;
use uuid::Uuid;

use crate::product::{Product, SupplierProduct};

/// Repository trait for catalog data access.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_product(&self, product: Product) -> Result<Product, DomainError>;

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;

    async fn list_products(&self) -> Result<Vec<Product>, DomainError>;

    /// Replace a product; the store enforces the CAS version check.
    async fn update_product(&self, product: Product) -> Result<Product, DomainError>;

    async fn delete_product(&self, id: Uuid) -> Result<(), DomainError>;

    async fn create_supplier_product(
        &self,
        listing: SupplierProduct,
    ) -> Result<SupplierProduct, DomainError>;

    async fn list_supplier_products(
        &self,
        supplier_organization_id: Uuid,
    ) -> Result<Vec<SupplierProduct>, DomainError>;

    async fn update_supplier_product(
        &self,
        listing: SupplierProduct,
    ) -> Result<SupplierProduct, DomainError>;
}
