pub mod health;

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::catalog::handlers::handle_list_cards;
use crate::reading::handlers::handle_create_reading;
use crate::state::AppState;

/// API routes, artwork under `public_path` served from `cards_dir`, and the
/// trace / panic / CORS stack.
pub fn build_router(state: AppState, cards_dir: &Path, public_path: &str) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_handler))
        // Catalog
        .route("/", get(handle_list_cards))
        .route("/api/v1/cards", get(handle_list_cards))
        // Readings
        .route("/api/v1/readings", post(handle_create_reading))
        .with_state(state);

    let public_path = public_path.trim_end_matches('/');
    if public_path.starts_with('/') {
        router = router.nest_service(public_path, ServeDir::new(cards_dir));
    }

    with_layers(router)
}

fn with_layers(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::new())
            .layer(CorsLayer::permissive()),
    )
}
