//! HTTP API router.
//!
//! Returns a composable `Router` with all endpoints nested under
//! `/api/`, mirroring the paths the mobile client calls.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the application router.
///
/// The service is bound to loopback and consumed by a local client, so
/// CORS stays permissive.
pub fn api_router(ctx: ApiContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/", get(endpoints::health::root))
        .route("/health", get(endpoints::health::check))
        .route(
            "/drugs",
            post(endpoints::drugs::create).get(endpoints::drugs::list),
        )
        .route(
            "/drugs/:id",
            get(endpoints::drugs::detail)
                .put(endpoints::drugs::update)
                .delete(endpoints::drugs::remove),
        )
        .route(
            "/medications",
            post(endpoints::medications::create).get(endpoints::medications::list),
        )
        .route(
            "/medications/:id",
            get(endpoints::medications::detail)
                .put(endpoints::medications::update)
                .delete(endpoints::medications::remove),
        )
        .route(
            "/doses",
            post(endpoints::doses::create).get(endpoints::doses::list),
        )
        .route(
            "/doses/:id",
            get(endpoints::doses::detail).put(endpoints::doses::update),
        )
        .route("/doses/:id/take", post(endpoints::doses::take))
        .route("/progress", get(endpoints::progress::report))
        .with_state(ctx);

    Router::new()
        // `nest` maps the inner `/` route to `/api` without the trailing
        // slash, so the documented `/api/` banner path needs its own entry.
        .route("/api/", get(endpoints::health::root))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
