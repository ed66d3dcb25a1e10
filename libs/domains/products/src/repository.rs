use async_trait::async_trait;
use database::Transaction;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Pagination, Product, ProductImage};

/// Repository trait for Product persistence
///
/// Every method loads or writes the product together with its images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Get a product by ID
    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Match `UPPER(title) = title` or `slug = slug`; callers pass pre-cased values
    async fn find_by_slug_or_title(&self, title: &str, slug: &str)
    -> ProductResult<Option<Product>>;

    /// One page of products in store order
    async fn list(&self, pagination: Pagination) -> ProductResult<Vec<Product>>;

    /// Insert or update the product row, then insert images not stored yet
    async fn save(&self, product: Product) -> ProductResult<Product>;

    /// Delete a product by ID; images cascade
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Delete every product, returning the number of rows removed
    async fn delete_all(&self) -> ProductResult<u64>;
}

/// Writes that must happen atomically with each other
#[async_trait]
pub trait ProductTransaction: Transaction<Error = ProductError> {
    async fn delete_images_by_product_id(&self, product_id: Uuid) -> ProductResult<u64>;

    async fn save(&self, product: Product) -> ProductResult<Product>;
}

/// Opens product transactions
#[async_trait]
pub trait TransactionSource: Send + Sync {
    type Transaction: ProductTransaction;

    async fn begin(&self) -> ProductResult<Self::Transaction>;
}

#[derive(Debug, Clone)]
struct ImageRow {
    product_id: Uuid,
    image: ProductImage,
}

/// Product and image tables; products keep their images list empty
#[derive(Debug, Default, Clone)]
struct Tables {
    // v7 ids keep BTreeMap order equal to insertion order
    products: BTreeMap<Uuid, Product>,
    images: Vec<ImageRow>,
}

impl Tables {
    fn assemble(&self, row: &Product) -> Product {
        let mut product = row.clone();
        product.images = self
            .images
            .iter()
            .filter(|row| row.product_id == product.id)
            .map(|row| row.image.clone())
            .collect();
        product
    }

    fn find_by_id(&self, id: Uuid) -> Option<Product> {
        self.products.get(&id).map(|row| self.assemble(row))
    }

    fn find_by_slug_or_title(&self, title: &str, slug: &str) -> Option<Product> {
        self.products
            .values()
            .find(|p| p.title.to_uppercase() == title || p.slug == slug)
            .map(|row| self.assemble(row))
    }

    fn list(&self, pagination: Pagination) -> Vec<Product> {
        self.products
            .values()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .map(|row| self.assemble(row))
            .collect()
    }

    fn save(&mut self, product: Product) -> ProductResult<Product> {
        let slug_taken = self
            .products
            .values()
            .any(|p| p.id != product.id && p.slug == product.slug);

        if slug_taken {
            return Err(ProductError::Conflict(format!(
                "Key (slug)=({}) already exists.",
                product.slug
            )));
        }

        let mut row = product.clone();
        row.images = Vec::new();
        self.products.insert(row.id, row.clone());

        for image in &product.images {
            if !self.images.iter().any(|stored| stored.image.id == image.id) {
                self.images.push(ImageRow {
                    product_id: row.id,
                    image: image.clone(),
                });
            }
        }

        Ok(self.assemble(&row))
    }

    fn delete_images(&mut self, product_id: Uuid) -> u64 {
        let before = self.images.len();
        self.images.retain(|row| row.product_id != product_id);
        (before - self.images.len()) as u64
    }

    fn delete(&mut self, id: Uuid) -> bool {
        if self.products.remove(&id).is_some() {
            self.delete_images(id);
            true
        } else {
            false
        }
    }

    fn delete_all(&mut self) -> u64 {
        let removed = self.products.len() as u64;
        self.products.clear();
        self.images.clear();
        removed
    }
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    tables: Arc<RwLock<Tables>>,
    fail_next_save: Arc<AtomicBool>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `save`, transactional or not, fail with an internal error
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }

    fn check_injected_failure(flag: &AtomicBool) -> ProductResult<()> {
        if flag.swap(false, Ordering::SeqCst) {
            return Err(ProductError::internal("injected save failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.tables.read().await.find_by_id(id))
    }

    async fn find_by_slug_or_title(
        &self,
        title: &str,
        slug: &str,
    ) -> ProductResult<Option<Product>> {
        Ok(self.tables.read().await.find_by_slug_or_title(title, slug))
    }

    async fn list(&self, pagination: Pagination) -> ProductResult<Vec<Product>> {
        Ok(self.tables.read().await.list(pagination))
    }

    async fn save(&self, product: Product) -> ProductResult<Product> {
        Self::check_injected_failure(&self.fail_next_save)?;
        self.tables.write().await.save(product)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        Ok(self.tables.write().await.delete(id))
    }

    async fn delete_all(&self) -> ProductResult<u64> {
        Ok(self.tables.write().await.delete_all())
    }
}

#[async_trait]
impl TransactionSource for InMemoryProductRepository {
    type Transaction = InMemoryProductTransaction;

    async fn begin(&self) -> ProductResult<InMemoryProductTransaction> {
        let view = self.tables.read().await.clone();

        Ok(InMemoryProductTransaction {
            target: self.tables.clone(),
            staged: Mutex::new(Staged {
                view,
                writes: Vec::new(),
            }),
            fail_next_save: self.fail_next_save.clone(),
        })
    }
}

#[derive(Debug)]
enum StagedWrite {
    DeleteImages(Uuid),
    Save(Product),
}

#[derive(Debug)]
struct Staged {
    /// Tables as seen from inside the transaction
    view: Tables,
    writes: Vec<StagedWrite>,
}

/// Writes are checked against a private view and logged.
///
/// Commit replays the log onto the shared tables as they are at that moment,
/// so writes made outside the transaction survive. A replayed save that now
/// conflicts fails the commit and leaves the shared tables untouched.
#[derive(Debug)]
pub struct InMemoryProductTransaction {
    target: Arc<RwLock<Tables>>,
    staged: Mutex<Staged>,
    fail_next_save: Arc<AtomicBool>,
}

#[async_trait]
impl Transaction for InMemoryProductTransaction {
    type Error = ProductError;

    async fn commit(self) -> ProductResult<()> {
        let writes = self.staged.into_inner().writes;
        let mut tables = self.target.write().await;

        let mut next = tables.clone();
        for write in writes {
            match write {
                StagedWrite::DeleteImages(product_id) => {
                    next.delete_images(product_id);
                }
                StagedWrite::Save(product) => {
                    next.save(product)?;
                }
            }
        }

        *tables = next;
        Ok(())
    }

    async fn rollback(self) -> ProductResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ProductTransaction for InMemoryProductTransaction {
    async fn delete_images_by_product_id(&self, product_id: Uuid) -> ProductResult<u64> {
        let mut staged = self.staged.lock().await;
        let removed = staged.view.delete_images(product_id);
        staged.writes.push(StagedWrite::DeleteImages(product_id));
        Ok(removed)
    }

    async fn save(&self, product: Product) -> ProductResult<Product> {
        InMemoryProductRepository::check_injected_failure(&self.fail_next_save)?;

        let mut staged = self.staged.lock().await;
        let saved = staged.view.save(product.clone())?;
        staged.writes.push(StagedWrite::Save(product));
        Ok(saved)
    }
}
