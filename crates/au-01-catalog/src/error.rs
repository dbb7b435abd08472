//! Error types for the Catalog subsystem

use shared_types::{CategoryId, CollectionId, ProductId, ValidationError};
use thiserror::Error;

/// Catalog subsystem errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Product not found: {0}")]
    ProductSlugNotFound(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("SKU already in use: {0}")]
    DuplicateSku(String),

    #[error("Slug already in use: {0}")]
    DuplicateSlug(String),

    /// Category still referenced by products or child categories
    #[error("Category {id} is in use by {products} products and {children} subcategories")]
    CategoryInUse {
        id: CategoryId,
        products: u64,
        children: u64,
    },

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CatalogError {
    pub(crate) fn collection(id: CollectionId) -> Self {
        Self::CollectionNotFound(id.to_string())
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
