//! Product browsing and search

use super::entities::Product;
use serde::{Deserialize, Serialize};
use shared_types::{CategoryId, CollectionId, Page, PageRequest};

/// Listing order for products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

/// Caller-facing product query, deserialized from the storefront query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Category slug.
    #[serde(default)]
    pub category: Option<String>,
    /// Collection slug.
    #[serde(default)]
    pub collection: Option<String>,
    /// Free-text search over name, description and sku.
    #[serde(default)]
    pub q: Option<String>,
    /// Inclusive bounds, in minor units.
    #[serde(default)]
    pub min_price: Option<i64>,
    #[serde(default)]
    pub max_price: Option<i64>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub featured: bool,
    /// Admin listings only.
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub sort: ProductSort,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// A query with slugs resolved to ids, as handed to the repository.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub collection_id: Option<CollectionId>,
    /// Lowercased search needle.
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Lowercased material.
    pub material: Option<String>,
    pub featured_only: bool,
    pub include_inactive: bool,
    pub sort: ProductSort,
    pub page: PageRequest,
}

impl ProductFilter {
    /// Build from a query once its slugs are resolved.
    #[must_use]
    pub fn from_query(
        query: &ProductQuery,
        category_id: Option<CategoryId>,
        collection_id: Option<CollectionId>,
    ) -> Self {
        let lowered = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
        };
        Self {
            category_id,
            collection_id,
            search: lowered(&query.q),
            min_price: query.min_price,
            max_price: query.max_price,
            material: lowered(&query.material),
            featured_only: query.featured,
            include_inactive: query.include_inactive,
            sort: query.sort,
            page: PageRequest::new(query.page, query.per_page),
        }
    }

    /// True when `product` passes every predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_inactive && !product.is_active {
            return false;
        }
        if self.featured_only && !product.is_featured {
            return false;
        }
        if let Some(category) = self.category_id {
            if product.category_id != Some(category) {
                return false;
            }
        }
        if let Some(collection) = self.collection_id {
            if !product.collection_ids.contains(&collection) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price.amount_cents < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price.amount_cents > max {
                return false;
            }
        }
        if let Some(material) = &self.material {
            let matches = product
                .material
                .as_deref()
                .is_some_and(|m| m.to_lowercase() == *material);
            if !matches {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let hit = product.name.to_lowercase().contains(needle)
                || product.description.to_lowercase().contains(needle)
                || product
                    .sku
                    .as_deref()
                    .is_some_and(|sku| sku.to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }
        true
    }

    /// Sort in place. Ties fall back to name, then id, so pages are stable.
    pub fn sort(&self, products: &mut [Product]) {
        products.sort_by(|a, b| {
            let primary = match self.sort {
                ProductSort::Newest => b.created_at.cmp(&a.created_at),
                ProductSort::PriceAsc => a.price.amount_cents.cmp(&b.price.amount_cents),
                ProductSort::PriceDesc => b.price.amount_cents.cmp(&a.price.amount_cents),
                ProductSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            };
            primary
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    /// Filter, sort and paginate an in-memory product list.
    #[must_use]
    pub fn apply(&self, products: impl IntoIterator<Item = Product>) -> Page<Product> {
        let mut matching: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        self.sort(&mut matching);
        self.page.paginate(matching)
    }
}
