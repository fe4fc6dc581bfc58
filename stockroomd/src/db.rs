//! Database CLI subcommands for stockroomd.
//!
//! Provides `db migrate`, `db status`, and `db seed` commands.

use anyhow::{anyhow, Result};
use std::env;
use tracing::info;

use stockroom_db::{migrate, seed_demo_data, status};

const DEFAULT_SEED_AMOUNT: i32 = 20;

/// Run database CLI subcommands.
///
/// Supported commands:
/// - `stockroomd db migrate` - Run pending migrations
/// - `stockroomd db status` - Check migration status
/// - `stockroomd db seed [--amount N]` - Seed a product, a warehouse and an open order
pub async fn run_db_command(args: Vec<String>) -> Result<()> {
    if args.len() < 3 {
        return Err(anyhow!("Usage: stockroomd db <migrate|status|seed> [options]"));
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow!("DATABASE_URL environment variable is required for db commands"))?;

    let pool = sqlx::PgPool::connect(&database_url).await?;

    match args[2].as_str() {
        "migrate" => {
            migrate(&pool).await?;
        },
        "status" => {
            status(&pool).await?;
        },
        "seed" => {
            let amount = parse_seed_amount(&args[3..])?;
            let summary = seed_demo_data(&pool, amount).await?;
            info!(
                "Seeded: product_id={}, warehouse_id={}, order_id={}, amount={}",
                summary.product_id, summary.warehouse_id, summary.order_id, summary.amount
            );
        },
        _ => {
            return Err(anyhow!("Unknown db command: {}. Use migrate, status, or seed", args[2]));
        },
    }

    Ok(())
}

fn parse_seed_amount(options: &[String]) -> Result<i32> {
    let mut amount = DEFAULT_SEED_AMOUNT;

    let mut i = 0;
    while i < options.len() {
        match options[i].as_str() {
            "--amount" => {
                let value = options
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--amount requires a value"))?;
                amount = value.parse()?;
                i += 2;
            },
            other => {
                return Err(anyhow!("Unknown option: {}", other));
            },
        }
    }

    Ok(amount)
}
