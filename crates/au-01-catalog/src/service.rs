//! Catalog Service - Core business logic

use crate::domain::entities::{clean, validate_name, validate_pricing, validate_threshold};
use crate::domain::{
    Category, CategoryPatch, Collection, CollectionPatch, NewCategory, NewCollection, NewProduct,
    Product, ProductFilter, ProductPatch, ProductQuery, DEFAULT_LOW_STOCK_THRESHOLD,
};
use crate::error::{CatalogError, CatalogResult};
use crate::ports::inbound::{CatalogApi, Visibility};
use crate::ports::outbound::CatalogRepository;
use async_trait::async_trait;
use chrono::Utc;
use shared_types::{
    slugify, CategoryId, CollectionId, Page, PageRequest, ProductId, ValidationError, MAX_PER_PAGE,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Upper bound on `-N` suffixes tried for a generated slug.
const MAX_SLUG_SUFFIX: u32 = 1000;

/// Catalog Service implementation
pub struct CatalogService<R: CatalogRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: CatalogRepository + ?Sized> CatalogService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn load_product(&self, id: ProductId) -> CatalogResult<Product> {
        self.repo
            .get_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    async fn load_category(&self, id: CategoryId) -> CatalogResult<Category> {
        self.repo
            .get_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    async fn load_collection(&self, id: CollectionId) -> CatalogResult<Collection> {
        self.repo
            .get_collection(id)
            .await?
            .ok_or_else(|| CatalogError::collection(id))
    }

    /// Slug for a product. An explicit slug must be free; one derived from
    /// the name gets `-2`, `-3`, ... until it is.
    async fn product_slug(
        &self,
        explicit: Option<&str>,
        name: &str,
        exclude: Option<ProductId>,
    ) -> CatalogResult<String> {
        let taken = |found: Option<Product>| found.is_some_and(|p| Some(p.id) != exclude);

        if let Some(explicit) = explicit {
            let slug = slugify(explicit);
            if slug.is_empty() {
                return Err(ValidationError::Required("slug").into());
            }
            if taken(self.repo.get_product_by_slug(&slug).await?) {
                return Err(CatalogError::DuplicateSlug(slug));
            }
            return Ok(slug);
        }

        let base = slugify(name);
        if base.is_empty() {
            return Err(ValidationError::Invalid("name must contain letters or digits".into()).into());
        }
        if !taken(self.repo.get_product_by_slug(&base).await?) {
            return Ok(base);
        }
        for n in 2..=MAX_SLUG_SUFFIX {
            let candidate = format!("{base}-{n}");
            if !taken(self.repo.get_product_by_slug(&candidate).await?) {
                return Ok(candidate);
            }
        }
        Err(CatalogError::DuplicateSlug(base))
    }

    async fn ensure_sku_free(&self, sku: &str, exclude: Option<ProductId>) -> CatalogResult<()> {
        if let Some(existing) = self.repo.get_product_by_sku(sku).await? {
            if Some(existing.id) != exclude {
                return Err(CatalogError::DuplicateSku(sku.to_string()));
            }
        }
        Ok(())
    }

    async fn ensure_references(
        &self,
        category_id: Option<CategoryId>,
        collection_ids: &[CollectionId],
    ) -> CatalogResult<()> {
        if let Some(category_id) = category_id {
            self.load_category(category_id).await?;
        }
        for id in collection_ids {
            self.load_collection(*id).await?;
        }
        Ok(())
    }

    async fn category_slug(
        &self,
        explicit: Option<&str>,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> CatalogResult<String> {
        let slug = slugify(explicit.unwrap_or(name));
        if slug.is_empty() {
            return Err(ValidationError::Required("slug").into());
        }
        if let Some(existing) = self.repo.get_category_by_slug(&slug).await? {
            if Some(existing.id) != exclude {
                return Err(CatalogError::DuplicateSlug(slug));
            }
        }
        Ok(slug)
    }

    async fn collection_slug(
        &self,
        explicit: Option<&str>,
        name: &str,
        exclude: Option<CollectionId>,
    ) -> CatalogResult<String> {
        let slug = slugify(explicit.unwrap_or(name));
        if slug.is_empty() {
            return Err(ValidationError::Required("slug").into());
        }
        if let Some(existing) = self.repo.get_collection_by_slug(&slug).await? {
            if Some(existing.id) != exclude {
                return Err(CatalogError::DuplicateSlug(slug));
            }
        }
        Ok(slug)
    }

    /// Reject a parent that is the category itself or one of its descendants.
    async fn ensure_no_cycle(&self, id: CategoryId, parent: CategoryId) -> CatalogResult<()> {
        let parents: HashMap<CategoryId, Option<CategoryId>> = self
            .repo
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.parent_id))
            .collect();

        let mut cursor = Some(parent);
        let mut steps = 0usize;
        while let Some(current) = cursor {
            if current == id || steps > parents.len() {
                return Err(ValidationError::Invalid(
                    "category cannot be its own ancestor".into(),
                )
                .into());
            }
            cursor = parents.get(&current).copied().flatten();
            steps += 1;
        }
        Ok(())
    }

    /// Every product attached to a collection, including inactive ones.
    async fn products_in_collection(&self, id: CollectionId) -> CatalogResult<Vec<Product>> {
        let mut found = Vec::new();
        let mut page = 1;
        loop {
            let filter = ProductFilter {
                collection_id: Some(id),
                include_inactive: true,
                page: PageRequest::new(Some(page), Some(MAX_PER_PAGE)),
                ..ProductFilter::default()
            };
            let batch = self.repo.search_products(&filter).await?;
            let exhausted = u64::from(page) >= batch.total_pages();
            found.extend(batch.items);
            if exhausted {
                return Ok(found);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl<R: CatalogRepository + ?Sized> CatalogApi for CatalogService<R> {
    async fn list_products(
        &self,
        mut query: ProductQuery,
        visibility: Visibility,
    ) -> CatalogResult<Page<Product>> {
        if visibility == Visibility::Public {
            query.include_inactive = false;
        }
        let page = PageRequest::new(query.page, query.per_page);

        // Unknown slug: empty page, not an error.
        let category_id = match query.category.as_deref() {
            Some(slug) => match self.repo.get_category_by_slug(slug).await? {
                Some(category) => Some(category.id),
                None => return Ok(Page::empty(page)),
            },
            None => None,
        };
        let collection_id = match query.collection.as_deref() {
            Some(slug) => match self.repo.get_collection_by_slug(slug).await? {
                Some(c) if c.is_active || visibility == Visibility::Admin => Some(c.id),
                _ => return Ok(Page::empty(page)),
            },
            None => None,
        };

        let filter = ProductFilter::from_query(&query, category_id, collection_id);
        let result = self.repo.search_products(&filter).await?;
        debug!(total = result.total, page = result.page, "[au-01] Product listing");
        Ok(result)
    }

    async fn get_product(&self, id: ProductId, visibility: Visibility) -> CatalogResult<Product> {
        let product = self.load_product(id).await?;
        if visibility == Visibility::Public && !product.is_active {
            return Err(CatalogError::ProductNotFound(id));
        }
        Ok(product)
    }

    async fn get_product_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> CatalogResult<Product> {
        match self.repo.get_product_by_slug(slug).await? {
            Some(p) if p.is_active || visibility == Visibility::Admin => Ok(p),
            _ => Err(CatalogError::ProductSlugNotFound(slug.to_string())),
        }
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>> {
        self.repo.products_by_ids(ids).await
    }

    async fn create_product(&self, input: NewProduct) -> CatalogResult<Product> {
        validate_name(&input.name)?;
        validate_pricing(&input.price, input.compare_at_price.as_ref())?;
        let threshold = input
            .low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        validate_threshold(threshold)?;

        let sku = clean(input.sku);
        if let Some(sku) = &sku {
            self.ensure_sku_free(sku, None).await?;
        }
        self.ensure_references(input.category_id, &input.collection_ids)
            .await?;
        let slug = self
            .product_slug(input.slug.as_deref(), &input.name, None)
            .await?;

        let mut collection_ids = input.collection_ids;
        collection_ids.sort();
        collection_ids.dedup();

        let now = Utc::now();
        let product = Product {
            id: ProductId::new(),
            name: input.name.trim().to_string(),
            slug,
            description: input.description,
            price: input.price,
            compare_at_price: input.compare_at_price,
            sku,
            category_id: input.category_id,
            collection_ids,
            images: input.images,
            material: clean(input.material),
            gemstone: clean(input.gemstone),
            is_active: input.is_active,
            is_featured: input.is_featured,
            stock: 0,
            low_stock_threshold: threshold,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert_product(&product).await?;

        info!(product_id = %product.id, slug = %product.slug, "[au-01] Product created");
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> CatalogResult<Product> {
        let mut product = self.load_product(id).await?;

        if let Some(name) = patch.name {
            validate_name(&name)?;
            product.name = name.trim().to_string();
        }
        if let Some(slug) = patch.slug.as_deref() {
            product.slug = self.product_slug(Some(slug), &product.name, Some(id)).await?;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(compare_at) = patch.compare_at_price {
            product.compare_at_price = compare_at;
        }
        validate_pricing(&product.price, product.compare_at_price.as_ref())?;

        if let Some(sku) = patch.sku {
            let sku = clean(sku);
            if let Some(sku) = &sku {
                self.ensure_sku_free(sku, Some(id)).await?;
            }
            product.sku = sku;
        }
        if let Some(category_id) = patch.category_id {
            self.ensure_references(category_id, &[]).await?;
            product.category_id = category_id;
        }
        if let Some(mut collection_ids) = patch.collection_ids {
            self.ensure_references(None, &collection_ids).await?;
            collection_ids.sort();
            collection_ids.dedup();
            product.collection_ids = collection_ids;
        }
        if let Some(images) = patch.images {
            product.images = images;
        }
        if let Some(material) = patch.material {
            product.material = clean(material);
        }
        if let Some(gemstone) = patch.gemstone {
            product.gemstone = clean(gemstone);
        }
        if let Some(is_active) = patch.is_active {
            product.is_active = is_active;
        }
        if let Some(is_featured) = patch.is_featured {
            product.is_featured = is_featured;
        }
        if let Some(threshold) = patch.low_stock_threshold {
            validate_threshold(threshold)?;
            product.low_stock_threshold = threshold;
        }

        product.updated_at = Utc::now();
        self.repo.update_product(&product).await?;

        info!(product_id = %id, "[au-01] Product updated");
        Ok(product)
    }

    async fn delete_product(&self, id: ProductId, archive: bool) -> CatalogResult<()> {
        if archive {
            let mut product = self.load_product(id).await?;
            product.is_active = false;
            product.updated_at = Utc::now();
            self.repo.update_product(&product).await?;
            info!(product_id = %id, "[au-01] Product archived");
            return Ok(());
        }

        if !self.repo.delete_product(id).await? {
            return Err(CatalogError::ProductNotFound(id));
        }
        info!(product_id = %id, "[au-01] Product deleted");
        Ok(())
    }

    async fn set_product_stock(&self, id: ProductId, level: i64) -> CatalogResult<()> {
        if !self.repo.set_product_stock(id, level).await? {
            return Err(CatalogError::ProductNotFound(id));
        }
        debug!(product_id = %id, level, "[au-01] Stock projection updated");
        Ok(())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let mut categories = self.repo.list_categories().await?;
        categories.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn create_category(&self, input: NewCategory) -> CatalogResult<Category> {
        validate_name(&input.name)?;
        let slug = self
            .category_slug(input.slug.as_deref(), &input.name, None)
            .await?;
        if let Some(parent) = input.parent_id {
            self.load_category(parent).await?;
        }

        let category = Category {
            id: CategoryId::new(),
            name: input.name.trim().to_string(),
            slug,
            description: input.description,
            parent_id: input.parent_id,
            position: input.position,
        };
        self.repo.insert_category(&category).await?;

        info!(category_id = %category.id, slug = %category.slug, "[au-01] Category created");
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> CatalogResult<Category> {
        let mut category = self.load_category(id).await?;

        if let Some(name) = patch.name {
            validate_name(&name)?;
            category.name = name.trim().to_string();
        }
        if let Some(slug) = patch.slug.as_deref() {
            category.slug = self.category_slug(Some(slug), &category.name, Some(id)).await?;
        }
        if let Some(description) = patch.description {
            category.description = description;
        }
        if let Some(parent_id) = patch.parent_id {
            if let Some(parent) = parent_id {
                self.load_category(parent).await?;
                self.ensure_no_cycle(id, parent).await?;
            }
            category.parent_id = parent_id;
        }
        if let Some(position) = patch.position {
            category.position = position;
        }

        self.repo.update_category(&category).await?;
        Ok(category)
    }

    async fn delete_category(&self, id: CategoryId) -> CatalogResult<()> {
        self.load_category(id).await?;

        let products = self.repo.count_products_in_category(id).await?;
        let children = self
            .repo
            .list_categories()
            .await?
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .count() as u64;
        if products > 0 || children > 0 {
            return Err(CatalogError::CategoryInUse {
                id,
                products,
                children,
            });
        }

        self.repo.delete_category(id).await?;
        info!(category_id = %id, "[au-01] Category deleted");
        Ok(())
    }

    async fn list_collections(&self, visibility: Visibility) -> CatalogResult<Vec<Collection>> {
        let mut collections: Vec<Collection> = self
            .repo
            .list_collections()
            .await?
            .into_iter()
            .filter(|c| c.is_active || visibility == Visibility::Admin)
            .collect();
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    async fn get_collection_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> CatalogResult<Collection> {
        match self.repo.get_collection_by_slug(slug).await? {
            Some(c) if c.is_active || visibility == Visibility::Admin => Ok(c),
            _ => Err(CatalogError::CollectionNotFound(slug.to_string())),
        }
    }

    async fn create_collection(&self, input: NewCollection) -> CatalogResult<Collection> {
        validate_name(&input.name)?;
        let slug = self
            .collection_slug(input.slug.as_deref(), &input.name, None)
            .await?;

        let collection = Collection {
            id: CollectionId::new(),
            name: input.name.trim().to_string(),
            slug,
            description: input.description,
            image: clean(input.image),
            is_active: input.is_active,
        };
        self.repo.insert_collection(&collection).await?;

        info!(collection_id = %collection.id, slug = %collection.slug, "[au-01] Collection created");
        Ok(collection)
    }

    async fn update_collection(
        &self,
        id: CollectionId,
        patch: CollectionPatch,
    ) -> CatalogResult<Collection> {
        let mut collection = self.load_collection(id).await?;

        if let Some(name) = patch.name {
            validate_name(&name)?;
            collection.name = name.trim().to_string();
        }
        if let Some(slug) = patch.slug.as_deref() {
            collection.slug = self
                .collection_slug(Some(slug), &collection.name, Some(id))
                .await?;
        }
        if let Some(description) = patch.description {
            collection.description = description;
        }
        if let Some(image) = patch.image {
            collection.image = clean(image);
        }
        if let Some(is_active) = patch.is_active {
            collection.is_active = is_active;
        }

        self.repo.update_collection(&collection).await?;
        Ok(collection)
    }

    async fn delete_collection(&self, id: CollectionId) -> CatalogResult<()> {
        self.load_collection(id).await?;

        let members = self.products_in_collection(id).await?;
        let detached = members.len();
        for mut product in members {
            product.collection_ids.retain(|c| *c != id);
            product.updated_at = Utc::now();
            self.repo.update_product(&product).await?;
        }

        self.repo.delete_collection(id).await?;
        info!(collection_id = %id, detached, "[au-01] Collection deleted");
        Ok(())
    }

    async fn add_product_to_collection(
        &self,
        collection_id: CollectionId,
        product_id: ProductId,
    ) -> CatalogResult<Product> {
        self.load_collection(collection_id).await?;
        let mut product = self.load_product(product_id).await?;

        if !product.collection_ids.contains(&collection_id) {
            product.collection_ids.push(collection_id);
            product.updated_at = Utc::now();
            self.repo.update_product(&product).await?;
        }
        Ok(product)
    }

    async fn remove_product_from_collection(
        &self,
        collection_id: CollectionId,
        product_id: ProductId,
    ) -> CatalogResult<Product> {
        self.load_collection(collection_id).await?;
        let mut product = self.load_product(product_id).await?;

        if product.collection_ids.contains(&collection_id) {
            product.collection_ids.retain(|c| *c != collection_id);
            product.updated_at = Utc::now();
            self.repo.update_product(&product).await?;
        }
        Ok(product)
    }
}
