use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductImage};

// ===== Products Entity =====

pub mod products {
    use super::*;
    use crate::models::Gender;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "Text")]
        pub title: String,
        #[sea_orm(column_type = "Text", unique)]
        pub slug: String,
        pub price: f64,
        pub stock: i32,
        #[sea_orm(column_type = "Text", nullable)]
        pub description: Option<String>,
        pub sizes: Json,
        pub gender: Gender,
        pub tags: Json,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::product_images::Entity")]
        Images,
    }

    impl Related<super::product_images::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Images.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        /// Assemble the domain product from its row and image rows.
        ///
        /// A `sizes` or `tags` column that is not a string array is an error.
        pub fn into_product(
            self,
            mut images: Vec<super::product_images::Model>,
        ) -> ProductResult<Product> {
            images.sort_by_key(|image| image.position);

            Ok(Product {
                id: self.id,
                title: self.title,
                slug: self.slug,
                price: self.price,
                stock: self.stock,
                description: self.description,
                sizes: string_list(self.id, "sizes", self.sizes)?,
                gender: self.gender,
                tags: string_list(self.id, "tags", self.tags)?,
                images: images.into_iter().map(Into::into).collect(),
            })
        }
    }

    fn string_list(id: Uuid, column: &str, value: Json) -> ProductResult<Vec<String>> {
        serde_json::from_value(value).map_err(|e| {
            ProductError::internal(format!("product {id} has a malformed {column} column: {e}"))
        })
    }

    impl From<&Product> for ActiveModel {
        fn from(product: &Product) -> Self {
            ActiveModel {
                id: Set(product.id),
                title: Set(product.title.clone()),
                slug: Set(product.slug.clone()),
                price: Set(product.price),
                stock: Set(product.stock),
                description: Set(product.description.clone()),
                sizes: Set(Json::from(product.sizes.clone())),
                gender: Set(product.gender),
                tags: Set(Json::from(product.tags.clone())),
            }
        }
    }
}

// ===== Product Images Entity =====

pub mod product_images {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "product_images")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(column_type = "Text")]
        pub url: String,
        /// Index within the owning product's image list
        pub position: i32,
        pub product_id: Uuid,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::products::Entity",
            from = "Column::ProductId",
            to = "super::products::Column::Id",
            on_delete = "Cascade"
        )]
        Product,
    }

    impl Related<super::products::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Product.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for ProductImage {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                url: model.url,
            }
        }
    }

    /// Row for `image` at `position` of product `product_id`
    pub fn active_model(product_id: Uuid, position: usize, image: &ProductImage) -> ActiveModel {
        ActiveModel {
            id: Set(image.id),
            url: Set(image.url.clone()),
            position: Set(position as i32),
            product_id: Set(product_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProduct, Gender};

    #[test]
    fn test_model_round_trip_orders_images_by_position() {
        let product_id = Uuid::now_v7();
        let row = products::Model {
            id: product_id,
            title: "Shirt".to_string(),
            slug: "shirt".to_string(),
            price: 12.5,
            stock: 3,
            description: None,
            sizes: Json::from(vec!["M".to_string(), "L".to_string()]),
            gender: Gender::Men,
            tags: Json::from(vec!["summer".to_string()]),
        };
        let images = vec![
            product_images::Model {
                id: Uuid::now_v7(),
                url: "second.jpg".to_string(),
                position: 1,
                product_id,
            },
            product_images::Model {
                id: Uuid::now_v7(),
                url: "first.jpg".to_string(),
                position: 0,
                product_id,
            },
        ];

        let product = row.into_product(images).unwrap();

        assert_eq!(product.image_urls(), vec!["first.jpg", "second.jpg"]);
        assert_eq!(product.sizes, vec!["M", "L"]);
        assert_eq!(product.tags, vec!["summer"]);
    }

    #[test]
    fn test_malformed_json_column_is_an_error() {
        let row = products::Model {
            id: Uuid::now_v7(),
            title: "Shirt".to_string(),
            slug: "shirt".to_string(),
            price: 12.5,
            stock: 3,
            description: None,
            sizes: serde_json::json!({ "size": "M" }),
            gender: Gender::Men,
            tags: Json::from(Vec::<String>::new()),
        };

        let result = row.into_product(Vec::new());
        assert!(matches!(result, Err(ProductError::Internal)));
    }

    #[test]
    fn test_active_model_from_product() {
        let product = Product::new(CreateProduct {
            title: "Shirt".to_string(),
            tags: vec!["a".to_string()],
            ..Default::default()
        });

        let active: products::ActiveModel = (&product).into();
        assert_eq!(active.slug, Set("shirt".to_string()));
        assert_eq!(active.tags, Set(serde_json::json!(["a"])));
    }
}
