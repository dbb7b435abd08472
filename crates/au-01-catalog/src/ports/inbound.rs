//! Driving Ports (API - Inbound)

use crate::domain::{
    Category, CategoryPatch, Collection, CollectionPatch, NewCategory, NewCollection, NewProduct,
    Product, ProductPatch, ProductQuery,
};
use crate::error::CatalogResult;
use async_trait::async_trait;
use shared_types::{CategoryId, CollectionId, Page, ProductId};

/// Who is asking. Storefront callers never see inactive products or
/// collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Admin,
}

/// Primary Catalog API
#[async_trait]
pub trait CatalogApi: Send + Sync {
    // --- browsing -----------------------------------------------------------

    /// List products. `include_inactive` is honored only for `Visibility::Admin`.
    async fn list_products(
        &self,
        query: ProductQuery,
        visibility: Visibility,
    ) -> CatalogResult<Page<Product>>;

    async fn get_product(&self, id: ProductId, visibility: Visibility) -> CatalogResult<Product>;

    async fn get_product_by_slug(&self, slug: &str, visibility: Visibility)
        -> CatalogResult<Product>;

    /// Every requested product that exists, active or not, in no particular order.
    async fn products_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>>;

    // --- product admin ------------------------------------------------------

    async fn create_product(&self, input: NewProduct) -> CatalogResult<Product>;

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> CatalogResult<Product>;

    /// Archive (`is_active = false`) or hard-delete a product.
    async fn delete_product(&self, id: ProductId, archive: bool) -> CatalogResult<()>;

    /// Stock projection update driven by inventory events.
    async fn set_product_stock(&self, id: ProductId, level: i64) -> CatalogResult<()>;

    // --- categories ---------------------------------------------------------

    /// Ordered by `position`, then name.
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    async fn create_category(&self, input: NewCategory) -> CatalogResult<Category>;

    async fn update_category(&self, id: CategoryId, patch: CategoryPatch)
        -> CatalogResult<Category>;

    /// Refused with `CategoryInUse` while products or subcategories reference it.
    async fn delete_category(&self, id: CategoryId) -> CatalogResult<()>;

    // --- collections --------------------------------------------------------

    async fn list_collections(&self, visibility: Visibility) -> CatalogResult<Vec<Collection>>;

    async fn get_collection_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> CatalogResult<Collection>;

    async fn create_collection(&self, input: NewCollection) -> CatalogResult<Collection>;

    async fn update_collection(
        &self,
        id: CollectionId,
        patch: CollectionPatch,
    ) -> CatalogResult<Collection>;

    /// Deletes the collection and detaches its products.
    async fn delete_collection(&self, id: CollectionId) -> CatalogResult<()>;

    async fn add_product_to_collection(
        &self,
        collection_id: CollectionId,
        product_id: ProductId,
    ) -> CatalogResult<Product>;

    async fn remove_product_from_collection(
        &self,
        collection_id: CollectionId,
        product_id: ProductId,
    ) -> CatalogResult<Product>;
}
