//! Binary entry point: serve the matching engine's REST/WebSocket API.

use matchbook::api;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let state = api::create_app_state();
    let app = api::create_router_with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("bind");
    info!("listening on http://{}", addr);
    axum::serve(listener, app).await.expect("serve");
}
