use chandler_core::DomainError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog product. Matching and search live outside this core; RFQ line
/// items may reference a product by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Standardized 6-digit maritime product identifier.
    pub impa_code: Option<String>,
    pub unit_of_measure: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: String,
        description: Option<String>,
        impa_code: Option<String>,
        unit_of_measure: String,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name", "product name must not be empty"));
        }
        if let Some(code) = &impa_code {
            validate_impa_code(code)?;
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            impa_code,
            unit_of_measure,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update read at `expected_version`.
    pub fn apply_update(
        &mut self,
        expected_version: i64,
        name: Option<String>,
        description: Option<Option<String>>,
        impa_code: Option<Option<String>>,
        unit_of_measure: Option<String>,
    ) -> Result<(), DomainError> {
        chandler_core::version::ensure_version(expected_version, self.version)?;
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name", "product name must not be empty"));
            }
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(impa_code) = impa_code {
            if let Some(code) = &impa_code {
                validate_impa_code(code)?;
            }
            self.impa_code = impa_code;
        }
        if let Some(unit) = unit_of_measure {
            self.unit_of_measure = unit;
        }
        self.version += 1;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A supplier organization's listing of a product with its asking price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierProduct {
    pub id: Uuid,
    pub supplier_organization_id: Uuid,
    pub product_id: Uuid,
    pub unit_price: Decimal,
    pub currency: String,
    pub lead_time_days: Option<u32>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupplierProduct {
    pub fn new(
        supplier_organization_id: Uuid,
        product_id: Uuid,
        unit_price: Decimal,
        currency: String,
        lead_time_days: Option<u32>,
    ) -> Result<Self, DomainError> {
        if unit_price < Decimal::ZERO {
            return Err(DomainError::validation(
                "unit_price",
                "unit price must not be negative",
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            supplier_organization_id,
            product_id,
            unit_price,
            currency,
            lead_time_days,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn reprice(
        &mut self,
        expected_version: i64,
        unit_price: Decimal,
        lead_time_days: Option<u32>,
    ) -> Result<(), DomainError> {
        chandler_core::version::ensure_version(expected_version, self.version)?;
        if unit_price < Decimal::ZERO {
            return Err(DomainError::validation(
                "unit_price",
                "unit price must not be negative",
            ));
        }
        self.unit_price = unit_price;
        if lead_time_days.is_some() {
            self.lead_time_days = lead_time_days;
        }
        self.version += 1;
        self.updated_at = Utc::now();
        Ok(())
    }
}

pub fn validate_impa_code(code: &str) -> Result<(), DomainError> {
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::validation(
            "impa_code",
            "IMPA code must be exactly 6 digits",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impa_code_validation() {
        assert!(validate_impa_code("170101").is_ok());
        assert!(validate_impa_code("17010").is_err());
        assert!(validate_impa_code("17010A").is_err());
        assert!(validate_impa_code("1701011").is_err());
    }

    #[test]
    fn test_product_update_bumps_version() {
        let mut product = Product::new(
            "Manila rope 24mm".to_string(),
            None,
            Some("211503".to_string()),
            "m".to_string(),
        )
        .unwrap();
        product
            .apply_update(1, Some("Manila rope 26mm".to_string()), None, None, None)
            .unwrap();
        assert_eq!(product.version, 2);
        assert_eq!(product.name, "Manila rope 26mm");
    }

    #[test]
    fn test_stale_product_update_is_rejected() {
        let mut product =
            Product::new("Shackle".to_string(), None, None, "pc".to_string()).unwrap();
        product.apply_update(1, None, None, None, Some("pcs".to_string())).unwrap();
        let err = product
            .apply_update(1, None, None, None, Some("box".to_string()))
            .unwrap_err();
        assert!(matches!(err, DomainError::VersionConflict { expected: 1, found: 2 }));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = SupplierProduct::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Decimal::new(-100, 2),
            "USD".to_string(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
