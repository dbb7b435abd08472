//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::{Category, Collection, Product, ProductFilter};
use crate::error::CatalogResult;
use async_trait::async_trait;
use shared_types::{CategoryId, CollectionId, Page, ProductId};

/// Persistence for products, categories and collections.
///
/// Implementations do no validation; uniqueness and referential checks live
/// in the service.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // --- products -----------------------------------------------------------
    async fn insert_product(&self, product: &Product) -> CatalogResult<()>;
    async fn update_product(&self, product: &Product) -> CatalogResult<()>;
    /// Returns false when the product did not exist.
    async fn delete_product(&self, id: ProductId) -> CatalogResult<bool>;
    async fn get_product(&self, id: ProductId) -> CatalogResult<Option<Product>>;
    async fn get_product_by_slug(&self, slug: &str) -> CatalogResult<Option<Product>>;
    async fn get_product_by_sku(&self, sku: &str) -> CatalogResult<Option<Product>>;
    async fn products_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>>;
    async fn search_products(&self, filter: &ProductFilter) -> CatalogResult<Page<Product>>;
    /// Products in a category, active or not.
    async fn count_products_in_category(&self, id: CategoryId) -> CatalogResult<u64>;
    /// Write the stock projection. Returns false when the product is unknown.
    async fn set_product_stock(&self, id: ProductId, level: i64) -> CatalogResult<bool>;

    // --- categories ---------------------------------------------------------
    async fn insert_category(&self, category: &Category) -> CatalogResult<()>;
    async fn update_category(&self, category: &Category) -> CatalogResult<()>;
    async fn delete_category(&self, id: CategoryId) -> CatalogResult<bool>;
    async fn get_category(&self, id: CategoryId) -> CatalogResult<Option<Category>>;
    async fn get_category_by_slug(&self, slug: &str) -> CatalogResult<Option<Category>>;
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    // --- collections --------------------------------------------------------
    async fn insert_collection(&self, collection: &Collection) -> CatalogResult<()>;
    async fn update_collection(&self, collection: &Collection) -> CatalogResult<()>;
    async fn delete_collection(&self, id: CollectionId) -> CatalogResult<bool>;
    async fn get_collection(&self, id: CollectionId) -> CatalogResult<Option<Collection>>;
    async fn get_collection_by_slug(&self, slug: &str) -> CatalogResult<Option<Collection>>;
    async fn list_collections(&self) -> CatalogResult<Vec<Collection>>;
}
