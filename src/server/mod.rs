mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::lookup::CepResolver;

pub fn build_router(resolver: CepResolver) -> Router {
    let state = Arc::new(AppState { resolver });

    Router::new()
        .route("/api/cep/{cep}", get(handlers::lookup))
        .route("/api/providers", get(handlers::providers))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, resolver: CepResolver) -> std::io::Result<()> {
    let app = build_router(resolver);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("CEP server listening on http://{}", addr);
    axum::serve(listener, app).await
}
