//! Products Domain
//!
//! Data access for the product catalog: products with an ordered set of owned
//! images, stored in PostgreSQL through SeaORM.
//!
//! ```text
//! ProductService   ← validation, lookup rules, image replacement transaction
//!       │
//! ProductRepository / TransactionSource   ← Postgres or in-memory
//!       │
//! entity (products, product_images)
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{CreateProduct, PgProductRepository, ProductService};
//!
//! # async fn example(db: sea_orm::DatabaseConnection) -> Result<(), domain_products::ProductError> {
//! let repository = PgProductRepository::new(db);
//! let service = ProductService::new(repository.clone(), repository);
//!
//! let shirt = service
//!     .create(CreateProduct {
//!         title: "Shirt".to_string(),
//!         images: vec!["a.jpg".to_string()],
//!         ..Default::default()
//!     })
//!     .await?;
//! let found = service.find_one_plain("shirt").await?;
//! assert_eq!(shirt.id, found.id);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use models::{
    CreateProduct, FlatProduct, Gender, Pagination, Product, ProductImage, UpdateProduct,
    normalize_slug,
};
pub use postgres::{PgProductRepository, PgProductTransaction};
pub use repository::{
    InMemoryProductRepository, InMemoryProductTransaction, ProductRepository, ProductTransaction,
    TransactionSource,
};
pub use service::ProductService;
