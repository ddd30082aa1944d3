use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::api::routes::{
    add_card, buckets, hint, next_day, practice, progress, update, AppState,
};
use leitner_core::StateStore;

pub fn router(store: Arc<dyn StateStore>) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/api/practice", get(practice))
        .route("/api/update", post(update))
        .route("/api/hint", get(hint))
        .route("/api/progress", get(progress))
        .route("/api/buckets", get(buckets))
        .route("/api/day/next", post(next_day))
        .route("/api/cards", post(add_card))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run(store: Arc<dyn StateStore>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(store.clone());
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, day = store.current_day().await?, "HTTP server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
