use async_trait::async_trait;
use database::Transaction;
use database::transaction::with_transaction;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    entity::{product_images, products},
    error::{ProductError, ProductResult},
    models::{Pagination, Product},
    repository::{ProductRepository, ProductTransaction, TransactionSource},
};

/// Attach image rows to each product row, preserving the row order
async fn with_images<C: ConnectionTrait>(
    db: &C,
    rows: Vec<products::Model>,
) -> ProductResult<Vec<Product>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut images = product_images::Entity::find()
        .filter(product_images::Column::ProductId.is_in(ids))
        .order_by_asc(product_images::Column::Position)
        .all(db)
        .await?;

    rows.into_iter()
        .map(|row| {
            let (owned, rest): (Vec<_>, Vec<_>) = images
                .drain(..)
                .partition(|image| image.product_id == row.id);
            images = rest;
            row.into_product(owned)
        })
        .collect()
}

async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> ProductResult<Option<Product>> {
    let Some(row) = products::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    Ok(with_images(db, vec![row]).await?.pop())
}

async fn save<C: ConnectionTrait>(db: &C, product: Product) -> ProductResult<Product> {
    let active: products::ActiveModel = (&product).into();

    if products::Entity::find_by_id(product.id).one(db).await?.is_some() {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }

    let stored: HashSet<Uuid> = product_images::Entity::find()
        .filter(product_images::Column::ProductId.eq(product.id))
        .all(db)
        .await?
        .into_iter()
        .map(|image| image.id)
        .collect();

    for (position, image) in product.images.iter().enumerate() {
        if !stored.contains(&image.id) {
            product_images::active_model(product.id, position, image)
                .insert(db)
                .await?;
        }
    }

    find_by_id(db, product.id)
        .await?
        .ok_or_else(|| ProductError::NotFound(product.id.to_string()))
}

#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        find_by_id(&self.db, id).await
    }

    async fn find_by_slug_or_title(
        &self,
        title: &str,
        slug: &str,
    ) -> ProductResult<Option<Product>> {
        let condition = Condition::any()
            .add(Expr::cust_with_values(
                r#"UPPER("products"."title") = ?"#,
                [title.to_string()],
            ))
            .add(products::Column::Slug.eq(slug));

        let Some(row) = products::Entity::find()
            .filter(condition)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        Ok(with_images(&self.db, vec![row]).await?.pop())
    }

    async fn list(&self, pagination: Pagination) -> ProductResult<Vec<Product>> {
        let rows = products::Entity::find()
            .limit(pagination.limit)
            .offset(pagination.offset)
            .all(&self.db)
            .await?;

        with_images(&self.db, rows).await
    }

    async fn save(&self, product: Product) -> ProductResult<Product> {
        let id = product.id;
        let saved = with_transaction(&self.db, |txn| Box::pin(save(txn, product))).await?;

        tracing::info!(product_id = %id, "Saved product");
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = products::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_all(&self) -> ProductResult<u64> {
        let result = products::Entity::delete_many().exec(&self.db).await?;

        tracing::info!(rows = result.rows_affected, "Deleted all products");
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl TransactionSource for PgProductRepository {
    type Transaction = PgProductTransaction;

    async fn begin(&self) -> ProductResult<PgProductTransaction> {
        let txn = database::transaction::begin(&self.db).await?;
        Ok(PgProductTransaction { txn })
    }
}

pub struct PgProductTransaction {
    txn: DatabaseTransaction,
}

#[async_trait]
impl Transaction for PgProductTransaction {
    type Error = ProductError;

    async fn commit(self) -> ProductResult<()> {
        self.txn.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> ProductResult<()> {
        self.txn.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl ProductTransaction for PgProductTransaction {
    async fn delete_images_by_product_id(&self, product_id: Uuid) -> ProductResult<u64> {
        let result = product_images::Entity::delete_many()
            .filter(product_images::Column::ProductId.eq(product_id))
            .exec(&self.txn)
            .await?;

        Ok(result.rows_affected)
    }

    async fn save(&self, product: Product) -> ProductResult<Product> {
        save(&self.txn, product).await
    }
}
