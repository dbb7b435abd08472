//! In-memory catalog repository
//!
//! Backs the dev runtime and tests. All maps sit behind one lock so
//! multi-table reads are consistent.

use crate::domain::{Category, Collection, Product, ProductFilter};
use crate::error::CatalogResult;
use crate::ports::outbound::CatalogRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{CategoryId, CollectionId, Page, ProductId};
use std::collections::HashMap;

#[derive(Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    categories: HashMap<CategoryId, Category>,
    collections: HashMap<CollectionId, Collection>,
}

/// `CatalogRepository` over hash maps.
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product_count(&self) -> usize {
        self.tables.read().products.len()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn insert_product(&self, product: &Product) -> CatalogResult<()> {
        self.tables
            .write()
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> CatalogResult<()> {
        self.tables
            .write()
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> CatalogResult<bool> {
        Ok(self.tables.write().products.remove(&id).is_some())
    }

    async fn get_product(&self, id: ProductId) -> CatalogResult<Option<Product>> {
        Ok(self.tables.read().products.get(&id).cloned())
    }

    async fn get_product_by_slug(&self, slug: &str) -> CatalogResult<Option<Product>> {
        Ok(self
            .tables
            .read()
            .products
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn get_product_by_sku(&self, sku: &str) -> CatalogResult<Option<Product>> {
        Ok(self
            .tables
            .read()
            .products
            .values()
            .find(|p| p.sku.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(sku)))
            .cloned())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.products.get(id).cloned())
            .collect())
    }

    async fn search_products(&self, filter: &ProductFilter) -> CatalogResult<Page<Product>> {
        let products: Vec<Product> = self.tables.read().products.values().cloned().collect();
        Ok(filter.apply(products))
    }

    async fn count_products_in_category(&self, id: CategoryId) -> CatalogResult<u64> {
        Ok(self
            .tables
            .read()
            .products
            .values()
            .filter(|p| p.category_id == Some(id))
            .count() as u64)
    }

    async fn set_product_stock(&self, id: ProductId, level: i64) -> CatalogResult<bool> {
        let mut tables = self.tables.write();
        match tables.products.get_mut(&id) {
            Some(product) => {
                product.stock = level;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_category(&self, category: &Category) -> CatalogResult<()> {
        self.tables
            .write()
            .categories
            .insert(category.id, category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> CatalogResult<()> {
        self.insert_category(category).await
    }

    async fn delete_category(&self, id: CategoryId) -> CatalogResult<bool> {
        Ok(self.tables.write().categories.remove(&id).is_some())
    }

    async fn get_category(&self, id: CategoryId) -> CatalogResult<Option<Category>> {
        Ok(self.tables.read().categories.get(&id).cloned())
    }

    async fn get_category_by_slug(&self, slug: &str) -> CatalogResult<Option<Category>> {
        Ok(self
            .tables
            .read()
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        Ok(self.tables.read().categories.values().cloned().collect())
    }

    async fn insert_collection(&self, collection: &Collection) -> CatalogResult<()> {
        self.tables
            .write()
            .collections
            .insert(collection.id, collection.clone());
        Ok(())
    }

    async fn update_collection(&self, collection: &Collection) -> CatalogResult<()> {
        self.insert_collection(collection).await
    }

    async fn delete_collection(&self, id: CollectionId) -> CatalogResult<bool> {
        Ok(self.tables.write().collections.remove(&id).is_some())
    }

    async fn get_collection(&self, id: CollectionId) -> CatalogResult<Option<Collection>> {
        Ok(self.tables.read().collections.get(&id).cloned())
    }

    async fn get_collection_by_slug(&self, slug: &str) -> CatalogResult<Option<Collection>> {
        Ok(self
            .tables
            .read()
            .collections
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_collections(&self) -> CatalogResult<Vec<Collection>> {
        Ok(self.tables.read().collections.values().cloned().collect())
    }
}
