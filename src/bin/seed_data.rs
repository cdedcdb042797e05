//! Seed data script - populates the database with demo clients and lockers
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates, on empty tables only:
//! - 3 clients
//! - 5 lockers across two blocks
//! - the bootstrap operator, if missing

use lockersys_api::{config, db, seed};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("=== LockerSys Seed Data ===");

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&pool).await?;

    let created =
        seed::ensure_admin_user(&pool, &cfg.admin_email, &cfg.admin_password, &cfg.admin_name)
            .await?;
    if created {
        info!("  Created operator {}", cfg.admin_email);
    }

    let summary = seed::seed_sample_data(&pool).await?;
    info!("  Created {} clients", summary.clients);
    info!("  Created {} lockers", summary.lockers);

    info!("=== Seed Data Complete ===");
    info!("Try: curl http://{}:{}/api/health", cfg.host, cfg.port);

    Ok(())
}
