//! Integration tests for the Products domain
//!
//! These run against a real PostgreSQL (testcontainers) with the catalog
//! migrations applied, so they exercise:
//! - the slug unique constraint and its error classification
//! - image ordering and the cascading foreign key
//! - commit and rollback of the image replacement transaction

use domain_products::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

type PgService = ProductService<PgProductRepository, PgProductRepository>;

fn service(db: &TestDatabase) -> PgService {
    let repository = PgProductRepository::new(db.connection());
    ProductService::new(repository.clone(), repository)
}

fn shirt(builder: &TestDataBuilder, images: usize) -> CreateProduct {
    CreateProduct {
        title: builder.title("Shirt"),
        price: 19.99,
        stock: 5,
        sizes: vec!["M".to_string(), "L".to_string()],
        gender: Gender::Men,
        tags: vec!["shirt".to_string()],
        images: builder.image_urls(images),
        ..Default::default()
    }
}

// ============================================================================
// Create / Read
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_find_by_every_key() {
    let db = TestDatabase::new().await;
    let service = service(&db);
    let builder = TestDataBuilder::from_test_name("create_and_find");
    let input = shirt(&builder, 3);

    let created = service.create(input.clone()).await.unwrap();
    assert_eq!(created.images, input.images);
    assert_eq!(created.slug, normalize_slug(&input.title));

    let by_id = service.find_one(&created.id.to_string()).await.unwrap();
    assert_uuid_eq(by_id.id, created.id, "lookup by id");
    assert_eq!(by_id.image_urls(), input.images);
    assert_eq!(by_id.gender, Gender::Men);
    assert_eq!(by_id.sizes, vec!["M", "L"]);

    let by_title = service.find_one(&input.title.to_lowercase()).await.unwrap();
    assert_uuid_eq(by_title.id, created.id, "lookup by title");

    let by_slug = service
        .find_one(&created.slug.to_uppercase())
        .await
        .unwrap();
    assert_uuid_eq(by_slug.id, created.id, "lookup by slug");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unknown_terms_are_not_found() {
    let db = TestDatabase::new().await;
    let service = service(&db);
    let builder = TestDataBuilder::from_test_name("unknown_terms");

    let missing_id = builder.unknown_id().to_string();
    let result = service.find_one(&missing_id).await;
    assert!(matches!(result, Err(ProductError::NotFound(term)) if term == missing_id));

    let result = service.find_one("no-such-product").await;
    assert!(matches!(result, Err(ProductError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_slug_is_conflict_with_store_detail() {
    let db = TestDatabase::new().await;
    let service = service(&db);
    let builder = TestDataBuilder::from_test_name("duplicate_slug");

    service.create(shirt(&builder, 0)).await.unwrap();
    let result = service.create(shirt(&builder, 0)).await;

    match result {
        Err(ProductError::Conflict(detail)) => {
            assert!(detail.starts_with("Key (slug)="), "{detail}");
            assert!(detail.ends_with("already exists."), "{detail}");
        }
        other => panic!("Expected Conflict error, got {:?}", other),
    }
    assert_eq!(db.count_rows("products").await, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_all_pages() {
    let db = TestDatabase::new().await;
    let service = service(&db);

    for n in 0..3 {
        let builder = TestDataBuilder::new(n);
        service.create(shirt(&builder, 2)).await.unwrap();
    }

    let first = service.find_all(Pagination::new(1, 0)).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].images.len(), 2);

    let rest = service.find_all(Pagination::new(10, 1)).await.unwrap();
    assert_eq!(rest.len(), 2);

    let all = service.find_all(Pagination::default()).await.unwrap();
    assert_eq!(all.len(), 3);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_replaces_image_rows() {
    let db = TestDatabase::new().await;
    let service = service(&db);
    let builder = TestDataBuilder::from_test_name("update_images");

    let created = service.create(shirt(&builder, 3)).await.unwrap();
    let replacement = vec!["https://cdn.test/new.jpg".to_string()];

    let updated = service
        .update(
            created.id,
            UpdateProduct {
                stock: Some(0),
                images: Some(replacement.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.images, replacement);
    assert_eq!(updated.stock, 0);
    assert_eq!(db.count_rows("product_images").await, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_conflict_rolls_back_image_delete() {
    let db = TestDatabase::new().await;
    let service = service(&db);

    let taken = service
        .create(shirt(&TestDataBuilder::new(1), 0))
        .await
        .unwrap();
    let created = service
        .create(shirt(&TestDataBuilder::new(2), 2))
        .await
        .unwrap();

    let result = service
        .update(
            created.id,
            UpdateProduct {
                slug: Some(taken.slug.clone()),
                images: Some(vec!["https://cdn.test/new.jpg".to_string()]),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(ProductError::Conflict(_))));

    let stored = service
        .find_one_plain(&created.id.to_string())
        .await
        .unwrap();
    assert_eq!(stored.images, created.images);
    assert_eq!(stored.slug, created.slug);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_fields_only_keeps_images() {
    let db = TestDatabase::new().await;
    let service = service(&db);
    let builder = TestDataBuilder::from_test_name("update_fields");

    let created = service.create(shirt(&builder, 2)).await.unwrap();

    let updated = service
        .update(
            created.id,
            UpdateProduct {
                description: Some("Cotton".to_string()),
                gender: Some(Gender::Unisex),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.description.as_deref(), Some("Cotton"));
    assert_eq!(updated.gender, Gender::Unisex);
    assert_eq!(updated.images, created.images);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_remove_cascades_to_images() {
    let db = TestDatabase::new().await;
    let service = service(&db);
    let builder = TestDataBuilder::from_test_name("remove");

    let created = service.create(shirt(&builder, 2)).await.unwrap();
    service.remove(created.id).await.unwrap();

    let result = service.find_one(&created.id.to_string()).await;
    assert!(matches!(result, Err(ProductError::NotFound(_))));
    assert_eq!(db.count_rows("product_images").await, 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_all_products() {
    let db = TestDatabase::new().await;
    let service = service(&db);

    for n in 0..4 {
        service
            .create(shirt(&TestDataBuilder::new(n), 1))
            .await
            .unwrap();
    }

    assert_eq!(service.delete_all_products().await.unwrap(), 4);
    assert_eq!(db.count_rows("products").await, 0);
    assert_eq!(db.count_rows("product_images").await, 0);
}
