//! Product Service - Business logic layer

use database::scoped;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, FlatProduct, Pagination, Product, ProductImage, UpdateProduct};
use crate::repository::{ProductRepository, ProductTransaction, TransactionSource};

/// Product access service
///
/// Validates input, shapes results and owns the transaction boundary of
/// image replacement. All state lives behind the repository.
pub struct ProductService<R, S> {
    repository: Arc<R>,
    transactions: Arc<S>,
}

impl<R, S> Clone for ProductService<R, S> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            transactions: self.transactions.clone(),
        }
    }
}

/// A term is looked up by id only in the hyphenated 8-4-4-4-12 form
fn parse_uuid(term: &str) -> Option<Uuid> {
    if term.len() != 36 {
        return None;
    }
    Uuid::try_parse(term).ok()
}

impl<R, S> ProductService<R, S>
where
    R: ProductRepository,
    S: TransactionSource,
{
    pub fn new(repository: R, transactions: S) -> Self {
        Self {
            repository: Arc::new(repository),
            transactions: Arc::new(transactions),
        }
    }

    /// Create a product together with its images
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateProduct) -> ProductResult<FlatProduct> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let product = self.repository.save(Product::new(input)).await?;

        tracing::info!(product_id = %product.id, slug = %product.slug, "Created product");
        Ok(product.into())
    }

    /// One page of products, flattened
    #[instrument(skip(self))]
    pub async fn find_all(&self, pagination: Pagination) -> ProductResult<Vec<FlatProduct>> {
        let products = self.repository.list(pagination).await?;
        Ok(products.into_iter().map(FlatProduct::from).collect())
    }

    /// Look a product up by id, title (case-insensitive) or slug
    #[instrument(skip(self))]
    pub async fn find_one(&self, term: &str) -> ProductResult<Product> {
        let found = match parse_uuid(term) {
            Some(id) => self.repository.find_by_id(id).await?,
            None => {
                self.repository
                    .find_by_slug_or_title(&term.to_uppercase(), &term.to_lowercase())
                    .await?
            }
        };

        found.ok_or_else(|| ProductError::NotFound(term.to_string()))
    }

    pub async fn find_one_plain(&self, term: &str) -> ProductResult<FlatProduct> {
        self.find_one(term).await.map(FlatProduct::from)
    }

    /// Merge `input` onto the stored product.
    ///
    /// A supplied image list replaces every stored image of the product inside
    /// one transaction.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<FlatProduct> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let mut product = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))?;

        let images = input.images.clone();
        product.apply_update(input);

        match images {
            Some(urls) => {
                product.images = urls.into_iter().map(ProductImage::new).collect();

                let txn = self.transactions.begin().await?;
                scoped::<_, _, ProductError, _>(txn, |txn| {
                    Box::pin(async move {
                        let removed = txn.delete_images_by_product_id(id).await?;
                        tracing::debug!(product_id = %id, removed, "Replacing product images");
                        txn.save(product).await
                    })
                })
                .await?;
            }
            None => {
                self.repository.save(product).await?;
            }
        }

        tracing::info!(product_id = %id, "Updated product");
        self.find_one_plain(&id.to_string()).await
    }

    /// Delete a product; its images go with it
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) -> ProductResult<()> {
        let product = self.find_one(&id.to_string()).await?;
        self.repository.delete(product.id).await?;

        tracing::info!(product_id = %product.id, "Removed product");
        Ok(())
    }

    /// Delete every product, returning how many were removed
    #[instrument(skip(self))]
    pub async fn delete_all_products(&self) -> ProductResult<u64> {
        let removed = self.repository.delete_all().await?;

        tracing::info!(removed, "Deleted all products");
        Ok(removed)
    }
}
