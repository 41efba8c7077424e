mod api;
mod config;
mod server;
mod state;

use std::sync::Arc;

use taskdeck_core::storage::local::LocalStorage;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = config::default_config_path();
    let config = config::load_config(&config_path);
    if !config_path.exists() {
        if let Err(e) = config::save_config(&config_path, &config) {
            log::warn!(
                "[taskdeck.main] Could not write default config {}: {}",
                config_path.display(),
                e
            );
        }
    }
    let data_dir = config.resolved_data_dir();

    let storage = match LocalStorage::open(&data_dir) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            log::error!(
                "[taskdeck.main] Could not open data dir {:?}: {}",
                data_dir,
                e
            );
            std::process::exit(1);
        }
    };

    let state = AppState::new(storage, config.port, config.bind_address.clone());
    if let Err(e) = server::run_server(state).await {
        log::error!("[taskdeck.main] Server exited with error: {}", e);
        std::process::exit(1);
    }
}
