use domain_products::{CreateProduct, ProductRepository, ProductService, TransactionSource};
use eyre::WrapErr;
use tracing::info;

const SEED_PRODUCTS: &str = include_str!("seed.json");

/// Products loaded by the seeder, in insertion order
pub fn seed_products() -> eyre::Result<Vec<CreateProduct>> {
    serde_json::from_str(SEED_PRODUCTS).wrap_err("Invalid seed catalog")
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub removed: u64,
    pub created: usize,
}

/// Optionally wipe the catalog, then create every seed product
pub async fn run<R, S>(
    service: &ProductService<R, S>,
    products: Vec<CreateProduct>,
    keep_existing: bool,
) -> eyre::Result<SeedReport>
where
    R: ProductRepository,
    S: TransactionSource,
{
    let mut report = SeedReport::default();

    if !keep_existing {
        report.removed = service.delete_all_products().await?;
        info!(removed = report.removed, "Cleared product catalog");
    }

    for input in products {
        let title = input.title.clone();
        service
            .create(input)
            .await
            .wrap_err_with(|| format!("Failed to seed product {title:?}"))?;
        report.created += 1;
    }

    Ok(report)
}
