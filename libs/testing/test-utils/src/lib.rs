//! Shared test utilities for the catalog crates
//!
//! - `TestDatabase`: migrated PostgreSQL container with automatic cleanup (feature: "postgres")
//! - `TestDataBuilder`: deterministic product data derived from the test name
//! - `assertions`: assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let title = builder.title("shirt");
//!     let images = builder.image_urls(2);
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Seeded test data, so parallel tests sharing a database never collide on slugs
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A v4-shaped UUID derived from the seed; never produced by the store
    pub fn unknown_id(&self) -> Uuid {
        uuid::Builder::from_random_bytes(u128::from(self.seed).to_le_bytes()).into_uuid()
    }

    /// Title unique to this builder, e.g. `Test Shirt 1234`
    pub fn title(&self, name: &str) -> String {
        format!("Test {} {}", name, self.seed)
    }

    /// `count` image URLs, numbered in order
    pub fn image_urls(&self, count: usize) -> Vec<String> {
        (0..count)
            .map(|n| format!("https://cdn.test/{}/{}.jpg", self.seed, n))
            .collect()
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
