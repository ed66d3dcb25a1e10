//! Catalog Seeder
//!
//! Connects to the catalog database, applies migrations and replaces the
//! product catalog with the bundled seed products.

use clap::Parser;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_products::{PgProductRepository, ProductService};
use eyre::Result;
use tracing::info;

mod config;
mod seed;

use config::Config;

#[derive(Parser)]
#[command(name = "catalog-seed")]
#[command(about = "Wipe the product catalog and load the seed products")]
struct Cli {
    /// Do not run pending migrations before seeding
    #[arg(long)]
    skip_migrations: bool,

    /// Keep existing products instead of deleting them first
    #[arg(long)]
    keep_existing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to database...");
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("Database connection failed: {}", e))?;

    database::postgres::check_health(&db).await?;

    if !cli.skip_migrations {
        database::postgres::run_migrations::<migration::Migrator>(&db, "catalog_seed").await?;
    }

    let repository = PgProductRepository::new(db);
    let service = ProductService::new(repository.clone(), repository);

    let products = seed::seed_products()?;
    let report = seed::run(&service, products, cli.keep_existing).await?;

    info!(
        removed = report.removed,
        created = report.created,
        "Seed complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["catalog-seed", "--skip-migrations", "--keep-existing"]);
        assert!(cli.skip_migrations);
        assert!(cli.keep_existing);

        let cli = Cli::parse_from(["catalog-seed"]);
        assert!(!cli.skip_migrations);
        assert!(!cli.keep_existing);
    }
}
