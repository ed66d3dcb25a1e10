use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Rejects input that normalizes to an empty slug, e.g. `'''`
fn validate_slug_source(raw: &str) -> Result<(), validator::ValidationError> {
    if normalize_slug(raw).is_empty() {
        return Err(validator::ValidationError::new("empty_slug"));
    }
    Ok(())
}

/// Target audience of a product
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "product_gender")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    #[sea_orm(string_value = "men")]
    Men,
    #[sea_orm(string_value = "women")]
    Women,
    #[sea_orm(string_value = "kid")]
    Kid,
    #[default]
    #[sea_orm(string_value = "unisex")]
    Unisex,
}

/// Image owned by exactly one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: Uuid,
    pub url: String,
}

impl ProductImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            url: url.into(),
        }
    }
}

/// Product entity with its ordered image collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    /// Unique, normalised human-readable key
    pub slug: String,
    pub price: f64,
    pub stock: i32,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    pub images: Vec<ProductImage>,
}

/// Product whose images are plain URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatProduct {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub price: f64,
    pub stock: i32,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1), custom(function = "validate_slug_source"))]
    pub title: String,
    #[validate(length(min = 1), custom(function = "validate_slug_source"))]
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Image URLs, in display order
    #[serde(default)]
    pub images: Vec<String>,
}

/// DTO for a partial update; `images`, when present, replaces the whole set
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1), custom(function = "validate_slug_source"))]
    pub slug: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub gender: Option<Gender>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

/// Page selector for listing products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }
}

/// Lower-case the slug, turn spaces into underscores and drop apostrophes
pub fn normalize_slug(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "_").replace('\'', "")
}

impl Product {
    /// Build a new product (and its images) from a CreateProduct DTO
    pub fn new(input: CreateProduct) -> Self {
        let slug = normalize_slug(input.slug.as_deref().unwrap_or(&input.title));

        Self {
            id: Uuid::now_v7(),
            title: input.title,
            slug,
            price: input.price,
            stock: input.stock,
            description: input.description,
            sizes: input.sizes,
            gender: input.gender,
            tags: input.tags,
            images: input.images.into_iter().map(ProductImage::new).collect(),
        }
    }

    /// Merge the scalar fields of an update; `images` is handled by the caller
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(slug) = update.slug {
            self.slug = normalize_slug(&slug);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(sizes) = update.sizes {
            self.sizes = sizes;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
    }

    pub fn image_urls(&self) -> Vec<String> {
        self.images.iter().map(|image| image.url.clone()).collect()
    }
}

impl From<Product> for FlatProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            slug: product.slug,
            price: product.price,
            stock: product.stock,
            description: product.description,
            sizes: product.sizes,
            gender: product.gender,
            tags: product.tags,
            images: product.images.into_iter().map(|image| image.url).collect(),
        }
    }
}
