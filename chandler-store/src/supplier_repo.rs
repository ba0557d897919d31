use async_trait::async_trait;
use chandler_core::supplier::{SupplierProfile, SupplierProfileRepository};
use chandler_core::DomainError;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::Database;

pub struct StoreSupplierRepository {
    db: Arc<Database>,
}

impl StoreSupplierRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SupplierProfileRepository for StoreSupplierRepository {
    async fn get_profile(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<SupplierProfile>, DomainError> {
        Ok(self
            .db
            .supplier_profiles
            .read()
            .await
            .get(&organization_id)
            .cloned())
    }

    async fn save_profile(&self, profile: SupplierProfile) -> Result<(), DomainError> {
        let mut profiles = self.db.supplier_profiles.write().await;
        profiles.insert(profile.organization_id, profile);
        Ok(())
    }
}
