use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that skip the authorization gate entirely: the login exchange
/// and the read-only article/comment surface. List and show handlers serve
/// the same data to anonymous and authenticated callers.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness endpoint for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /access_tokens
        // Exchanges an authorization code for a bearer token. This is the
        // only way a client obtains credentials; the endpoint itself is open.
        .route("/access_tokens", post(handlers::create_access_token))
        // GET /articles?page=...&per_page=...
        // Paginated listing, newest first.
        .route("/articles", get(handlers::list_articles))
        // GET /articles/{id}
        // Single article lookup; a missing id is a plain 404 here since the
        // resource is public.
        .route("/articles/{id}", get(handlers::get_article))
        // GET /articles/{article_id}/comments?page=...&per_page=...
        // Comments for one article in creation order.
        .route(
            "/articles/{article_id}/comments",
            get(handlers::list_comments),
        )
}
