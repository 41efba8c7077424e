/// Shared application state passed to axum handlers.

use std::sync::Arc;
use taskdeck_core::storage::local::LocalStorage;
use taskdeck_core::storage::ChangeEvent;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<LocalStorage>,
    pub event_tx: broadcast::Sender<ChangeEvent>,
    pub port: u16,
    pub bind_address: String,
}

impl AppState {
    pub fn new(storage: Arc<LocalStorage>, port: u16, bind_address: String) -> Self {
        let event_tx = storage.event_sender();
        Self {
            storage,
            event_tx,
            port,
            bind_address,
        }
    }
}
