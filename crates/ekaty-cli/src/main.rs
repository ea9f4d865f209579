mod spin;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::spin::SpinArgs;

#[derive(Debug, Parser)]
#[command(name = "ekaty-cli")]
#[command(about = "eKaty restaurant directory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Upsert restaurants from a YAML seed file
    Seed {
        /// Seed file path; defaults to `EKATY_SEED_PATH`
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Spin Grub Roulette against the database
    Spin(SpinArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("ekaty-cli: run with --help to list commands");
        return Ok(());
    };

    let config = ekaty_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = ekaty_db::PoolConfig::from_app_config(&config);
    let pool = ekaty_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => {
            let applied = ekaty_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Seed { file } => {
            let path = file.unwrap_or_else(|| config.seed_path.clone());
            let count = run_seed(&pool, &path).await?;
            println!("seeded {count} restaurant(s) from {}", path.display());
        }
        Commands::Spin(args) => {
            let result = spin::run_spin(&pool, &config, &args).await?;
            println!("{}", result.summary(args.dry_run));
            if let Some(address) = &result.restaurant.address {
                println!("  {address}");
            }
        }
    }

    Ok(())
}

/// Load, validate, and upsert the restaurant seed file.
///
/// # Errors
///
/// Returns an error if the file is invalid or any upsert fails; a failed
/// upsert rolls back the whole batch.
async fn run_seed(pool: &sqlx::PgPool, path: &std::path::Path) -> anyhow::Result<usize> {
    let file = ekaty_core::load_restaurant_seeds(path)?;
    tracing::info!(path = %path.display(), count = file.restaurants.len(), "loaded seed file");
    let count = ekaty_db::seed_restaurants(pool, &file.restaurants).await?;
    Ok(count)
}
