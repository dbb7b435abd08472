//! Catalog entities and write models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use shared_types::{
    CategoryId, CollectionId, Money, ProductId, ProductSnapshot, ValidationError,
};

/// Default stock level at which a low-stock alert fires.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 3;

/// Maximum product name length.
pub const MAX_NAME_LEN: usize = 200;

/// A sellable piece of jewelry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Money,
    /// "Was" price shown struck through; always above `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub collection_ids: Vec<CollectionId>,
    /// Image URLs, first is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemstone: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    /// Projection of the inventory ledger. Written only by stock events.
    pub stock: i64,
    pub low_stock_threshold: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The pricing snapshot used by checkout.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            sku: self.sku.clone(),
            unit_price: self.price.clone(),
            is_active: self.is_active,
            image: self.images.first().cloned(),
        }
    }

    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A category in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    /// Sort key among siblings.
    #[serde(default)]
    pub position: i32,
}

/// A curated, merchandised group of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_active: bool,
}

// =============================================================================
// WRITE MODELS
// =============================================================================

fn default_true() -> bool {
    true
}

/// Input for `create_product`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub compare_at_price: Option<Money>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub collection_ids: Vec<CollectionId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub gemstone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
}

impl NewProduct {
    /// Minimal product with defaults, handy for seeding.
    #[must_use]
    pub fn named(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            slug: None,
            description: String::new(),
            price,
            compare_at_price: None,
            sku: None,
            category_id: None,
            collection_ids: Vec::new(),
            images: Vec::new(),
            material: None,
            gemstone: None,
            is_active: true,
            is_featured: false,
            low_stock_threshold: None,
        }
    }
}

/// Partial update for a product. Absent fields are left unchanged; nullable
/// fields accept an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Option<Money>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub sku: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(default)]
    pub collection_ids: Option<Vec<CollectionId>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub material: Option<Option<String>>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub gemstone: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
}

/// Input for `create_category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<CategoryId>>,
    #[serde(default)]
    pub position: Option<i32>,
}

/// Input for `create_collection`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCollection {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "double_option", skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

// =============================================================================
// VALIDATION
// =============================================================================

pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required("name"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name",
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

pub(crate) fn validate_pricing(
    price: &Money,
    compare_at: Option<&Money>,
) -> Result<(), ValidationError> {
    if price.amount_cents <= 0 {
        return Err(ValidationError::Invalid(
            "price must be greater than zero".into(),
        ));
    }
    if let Some(compare_at) = compare_at {
        if compare_at.currency != price.currency {
            return Err(ValidationError::Invalid(
                "compare_at_price must use the product currency".into(),
            ));
        }
        if compare_at.amount_cents <= price.amount_cents {
            return Err(ValidationError::Invalid(
                "compare_at_price must be greater than price".into(),
            ));
        }
    }
    Ok(())
}

pub(crate) fn validate_threshold(threshold: i64) -> Result<(), ValidationError> {
    if threshold < 0 {
        return Err(ValidationError::OutOfRange {
            field: "low_stock_threshold",
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Normalize an optional text attribute: trimmed, empty becomes `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
