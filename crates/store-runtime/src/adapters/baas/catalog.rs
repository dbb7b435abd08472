//! `CatalogRepository` over the `products`, `categories` and `collections`
//! tables.

use super::client::{BaasClient, BaasError, Query};
use async_trait::async_trait;
use au_01_catalog::{
    CatalogError, CatalogRepository, CatalogResult, Category, Collection, Product, ProductFilter,
};
use serde::Serialize;
use shared_types::{CategoryId, CollectionId, Page, ProductId};
use std::sync::Arc;

const PRODUCTS: &str = "products";
const CATEGORIES: &str = "categories";
const COLLECTIONS: &str = "collections";

impl From<BaasError> for CatalogError {
    fn from(err: BaasError) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

#[derive(Serialize)]
struct StockPatch {
    stock: i64,
}

pub struct BaasCatalogRepository {
    client: Arc<BaasClient>,
}

impl BaasCatalogRepository {
    pub fn new(client: Arc<BaasClient>) -> Self {
        Self { client }
    }

    async fn replace<T: Serialize + Sync>(&self, table: &str, id: String, row: &T) -> CatalogResult<()> {
        let updated: Vec<serde_json::Value> = self
            .client
            .update(table, &Query::new().eq("id", &id), row)
            .await?;
        if updated.is_empty() {
            return Err(CatalogError::Storage(format!("{table} row {id} vanished")));
        }
        Ok(())
    }
}

/// Narrow the scan with the filters PostgREST can evaluate; the rest of the
/// filter (search, price range, sorting, paging) runs on the result.
pub(crate) fn product_scan(filter: &ProductFilter) -> Query {
    let mut query = Query::new();
    if !filter.include_inactive {
        query = query.eq("is_active", true);
    }
    if filter.featured_only {
        query = query.eq("is_featured", true);
    }
    if let Some(category) = filter.category_id {
        query = query.eq("category_id", category);
    }
    if let Some(collection) = filter.collection_id {
        query = query.contains_json("collection_ids", &serde_json::json!([collection]));
    }
    query
}

#[async_trait]
impl CatalogRepository for BaasCatalogRepository {
    async fn insert_product(&self, product: &Product) -> CatalogResult<()> {
        let _: Vec<serde_json::Value> = self.client.insert(PRODUCTS, product).await?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> CatalogResult<()> {
        self.replace(PRODUCTS, product.id.to_string(), product).await
    }

    async fn delete_product(&self, id: ProductId) -> CatalogResult<bool> {
        Ok(self.client.delete(PRODUCTS, &Query::new().eq("id", id)).await? > 0)
    }

    async fn get_product(&self, id: ProductId) -> CatalogResult<Option<Product>> {
        Ok(self
            .client
            .select_one(PRODUCTS, Query::new().eq("id", id))
            .await?)
    }

    async fn get_product_by_slug(&self, slug: &str) -> CatalogResult<Option<Product>> {
        Ok(self
            .client
            .select_one(PRODUCTS, Query::new().eq("slug", slug))
            .await?)
    }

    async fn get_product_by_sku(&self, sku: &str) -> CatalogResult<Option<Product>> {
        Ok(self
            .client
            .select_one(PRODUCTS, Query::new().eq("sku", sku))
            .await?)
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .client
            .select(PRODUCTS, &Query::new().in_list("id", ids))
            .await?)
    }

    async fn search_products(&self, filter: &ProductFilter) -> CatalogResult<Page<Product>> {
        let candidates: Vec<Product> = self.client.select(PRODUCTS, &product_scan(filter)).await?;
        Ok(filter.apply(candidates))
    }

    async fn count_products_in_category(&self, id: CategoryId) -> CatalogResult<u64> {
        Ok(self
            .client
            .count(PRODUCTS, Query::new().eq("category_id", id))
            .await?)
    }

    async fn set_product_stock(&self, id: ProductId, level: i64) -> CatalogResult<bool> {
        let updated: Vec<serde_json::Value> = self
            .client
            .update(PRODUCTS, &Query::new().eq("id", id), &StockPatch { stock: level })
            .await?;
        Ok(!updated.is_empty())
    }

    async fn insert_category(&self, category: &Category) -> CatalogResult<()> {
        let _: Vec<serde_json::Value> = self.client.insert(CATEGORIES, category).await?;
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> CatalogResult<()> {
        self.replace(CATEGORIES, category.id.to_string(), category).await
    }

    async fn delete_category(&self, id: CategoryId) -> CatalogResult<bool> {
        Ok(self.client.delete(CATEGORIES, &Query::new().eq("id", id)).await? > 0)
    }

    async fn get_category(&self, id: CategoryId) -> CatalogResult<Option<Category>> {
        Ok(self
            .client
            .select_one(CATEGORIES, Query::new().eq("id", id))
            .await?)
    }

    async fn get_category_by_slug(&self, slug: &str) -> CatalogResult<Option<Category>> {
        Ok(self
            .client
            .select_one(CATEGORIES, Query::new().eq("slug", slug))
            .await?)
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        Ok(self
            .client
            .select(CATEGORIES, &Query::new().order("position.asc,name.asc"))
            .await?)
    }

    async fn insert_collection(&self, collection: &Collection) -> CatalogResult<()> {
        let _: Vec<serde_json::Value> = self.client.insert(COLLECTIONS, collection).await?;
        Ok(())
    }

    async fn update_collection(&self, collection: &Collection) -> CatalogResult<()> {
        self.replace(COLLECTIONS, collection.id.to_string(), collection)
            .await
    }

    async fn delete_collection(&self, id: CollectionId) -> CatalogResult<bool> {
        Ok(self
            .client
            .delete(COLLECTIONS, &Query::new().eq("id", id))
            .await?
            > 0)
    }

    async fn get_collection(&self, id: CollectionId) -> CatalogResult<Option<Collection>> {
        Ok(self
            .client
            .select_one(COLLECTIONS, Query::new().eq("id", id))
            .await?)
    }

    async fn get_collection_by_slug(&self, slug: &str) -> CatalogResult<Option<Collection>> {
        Ok(self
            .client
            .select_one(COLLECTIONS, Query::new().eq("slug", slug))
            .await?)
    }

    async fn list_collections(&self) -> CatalogResult<Vec<Collection>> {
        Ok(self
            .client
            .select(COLLECTIONS, &Query::new().order("name.asc"))
            .await?)
    }
}
