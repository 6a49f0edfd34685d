use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use study_materials::config::Config;
use study_materials::controller::MaterialController;
use study_materials::server;
use study_materials::storage::{DiskStore, JsonUserDirectory};
use tracing::info;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    tracing_subscriber::fmt::init();

    let data_dir = config.data_dir();
    let store = DiskStore::new(&data_dir)
        .await
        .with_context(|| format!("failed to open material store at {}", data_dir.display()))?
        .with_cache(config.cache_size);
    let users = JsonUserDirectory::load(config.users_file())
        .await
        .context("failed to load users file")?;

    let controller = MaterialController::new(Arc::new(store), Arc::new(users));

    let figment = rocket::Config::figment()
        .merge(("address", config.address))
        .merge(("port", config.port))
        .merge(("log_level", "critical"));

    info!("Serving materials on {}:{}{}", config.address, config.port, config.mount_path);
    server::mount(rocket::custom(figment), controller, &config.mount_path)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    Ok(())
}
