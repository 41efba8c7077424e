/// HTTP server: binds the listener and serves the API router.
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::api_router;
use crate::state::AppState;

pub async fn run_server(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = state.bind_address.clone();
    let port = state.port;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app: Router = api_router().layer(cors).with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port)).await?;
    let actual_port = listener.local_addr()?.port();

    log::info!(
        "HTTP server listening on http://{}:{}",
        bind_addr,
        actual_port
    );

    axum::serve(listener, app).await?;
    Ok(())
}
