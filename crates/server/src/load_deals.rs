use std::{env, path::PathBuf};

use anyhow::Context;
use dealfeed::store::{PgStore, memory::load_seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = PgStore::connect(&database_url, 5).await?;

    println!("Connected to database!");

    // First argument, then SEED_PATH, then the bundled seed.
    let path = env::args()
        .nth(1)
        .or_else(|| env::var("SEED_PATH").ok())
        .map(PathBuf::from);
    let deals = load_seed(path.as_deref())?;

    let mut count = 0;
    let mut skipped = 0;

    for deal in &deals {
        if db.import_deal(deal).await? {
            count += 1;
            println!("✓ Loaded: {}", deal.title);
        } else {
            skipped += 1;
            println!("⊘ Skipped (duplicate): {}", deal.title);
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Successfully loaded {} new deals!", count);
    if skipped > 0 {
        println!("⊘ Skipped {} duplicate deals", skipped);
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    Ok(())
}
