//! Catalog Data

use serde::Deserialize;

use crate::domain::catalog::errors::CatalogServiceError;

/// Raw product attributes as submitted by a caller, prior to validation.
///
/// Numeric fields arrive as strings (they come off admin-console form fields)
/// and are parsed during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
}

impl ProductDraft {
    /// Validate and normalize the draft into typed attributes.
    ///
    /// Required fields must be non-empty after trimming; `price` must parse
    /// to a non-negative float and `stock` to a non-negative integer.
    /// Optional fields are trimmed, with empty values normalized to absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<ProductAttrs, CatalogServiceError> {
        let name = require(&self.name, "name")?;
        let category = require(&self.category, "category")?;

        let price: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| CatalogServiceError::validation("price", "must be a number"))?;

        if !price.is_finite() || price < 0.0 {
            return Err(CatalogServiceError::validation(
                "price",
                "must be non-negative",
            ));
        }

        let stock: u32 = self
            .stock
            .trim()
            .parse()
            .map_err(|_| CatalogServiceError::validation("stock", "must be a non-negative integer"))?;

        Ok(ProductAttrs {
            name,
            category,
            price,
            stock,
            image: normalize(self.image.as_deref()),
            description: normalize(self.description.as_deref()),
            unit: normalize(self.unit.as_deref()),
        })
    }
}

fn require(value: &str, field: &'static str) -> Result<String, CatalogServiceError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(CatalogServiceError::validation(field, "is required"));
    }

    Ok(trimmed.to_string())
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Validated, normalized product attributes ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAttrs {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: u32,
    pub image: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
}

/// Inbound write request, field names as the admin console sends them.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductWriteRequest {
    pub name: String,

    #[serde(rename = "categoria")]
    pub category: String,

    #[serde(rename = "precio")]
    pub price: String,

    pub stock: String,

    #[serde(rename = "imagen")]
    pub image: Option<String>,

    #[serde(rename = "descripcion")]
    pub description: Option<String>,

    #[serde(rename = "unidad")]
    pub unit: Option<String>,

    /// When present and different from `name`, the request is a rename.
    #[serde(rename = "nombreOriginal")]
    pub original_name: Option<String>,
}

/// A write request resolved into the operation it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteIntent {
    CreateOrUpdate(ProductDraft),
    UpdateByIdentity {
        previous_name: String,
        draft: ProductDraft,
    },
}

impl From<ProductWriteRequest> for WriteIntent {
    fn from(request: ProductWriteRequest) -> Self {
        let draft = ProductDraft {
            name: request.name.clone(),
            category: request.category,
            price: request.price,
            stock: request.stock,
            image: request.image,
            description: request.description,
            unit: request.unit,
        };

        match request.original_name {
            Some(previous_name) if previous_name != request.name => Self::UpdateByIdentity {
                previous_name,
                draft,
            },
            _ => Self::CreateOrUpdate(draft),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Arroz 5kg".to_string(),
            category: "Granos".to_string(),
            price: "12.50".to_string(),
            stock: "40".to_string(),
            image: None,
            description: None,
            unit: Some("bolsa".to_string()),
        }
    }

    #[test]
    fn validate_parses_numeric_fields() -> TestResult {
        let attrs = draft().validate()?;

        assert_eq!(attrs.price, 12.5);
        assert_eq!(attrs.stock, 40);
        assert_eq!(attrs.unit.as_deref(), Some("bolsa"));

        Ok(())
    }

    #[test]
    fn validate_rejects_blank_name() {
        let result = ProductDraft {
            name: "   ".to_string(),
            ..draft()
        }
        .validate();

        assert!(
            matches!(result, Err(CatalogServiceError::Validation { field: "name", .. })),
            "expected validation error on name, got {result:?}"
        );
    }

    #[test]
    fn validate_rejects_negative_price() {
        let result = ProductDraft {
            price: "-1".to_string(),
            ..draft()
        }
        .validate();

        assert!(
            matches!(result, Err(CatalogServiceError::Validation { field: "price", .. })),
            "expected validation error on price, got {result:?}"
        );
    }

    #[test]
    fn validate_rejects_non_integer_stock() {
        let result = ProductDraft {
            stock: "3.5".to_string(),
            ..draft()
        }
        .validate();

        assert!(
            matches!(result, Err(CatalogServiceError::Validation { field: "stock", .. })),
            "expected validation error on stock, got {result:?}"
        );
    }

    #[test]
    fn validate_normalizes_blank_optionals_to_absent() -> TestResult {
        let attrs = ProductDraft {
            image: Some("   ".to_string()),
            description: Some(String::new()),
            ..draft()
        }
        .validate()?;

        assert_eq!(attrs.image, None);
        assert_eq!(attrs.description, None);

        Ok(())
    }

    #[test]
    fn request_with_changed_original_name_is_a_rename() -> TestResult {
        let request: ProductWriteRequest = serde_json::from_value(serde_json::json!({
            "name": "Arroz 5kg",
            "categoria": "Granos",
            "precio": "12.50",
            "stock": "40",
            "nombreOriginal": "Aroz 5kg",
        }))?;

        let intent = WriteIntent::from(request);

        assert!(
            matches!(
                intent,
                WriteIntent::UpdateByIdentity { ref previous_name, .. }
                    if previous_name == "Aroz 5kg"
            ),
            "expected rename intent, got {intent:?}"
        );

        Ok(())
    }

    #[test]
    fn request_with_matching_original_name_is_create_or_update() -> TestResult {
        let request: ProductWriteRequest = serde_json::from_value(serde_json::json!({
            "name": "Arroz 5kg",
            "categoria": "Granos",
            "precio": "12.50",
            "stock": "40",
            "nombreOriginal": "Arroz 5kg",
            "imagen": "https://images.example.com/arroz.webp",
        }))?;

        let intent = WriteIntent::from(request);

        assert!(
            matches!(intent, WriteIntent::CreateOrUpdate(_)),
            "expected create-or-update intent, got {intent:?}"
        );

        Ok(())
    }
}
