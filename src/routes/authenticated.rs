use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, patch, post},
};

/// Authenticated Router Module
///
/// Every mutation in the system lives here. The router is wrapped by the
/// gate layer in `create_router`, so each handler receives a validated
/// `CurrentUser` and scopes its repository calls to that user. Ownership
/// failures and missing ids share one 403 response.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /articles
        // Creates an article owned by the caller.
        .route("/articles", post(handlers::create_article))
        // PATCH/DELETE /articles/{id}
        // Partial update and delete of the caller's own article. The
        // (id, owner) scoping happens inside the repository query.
        .route(
            "/articles/{id}",
            patch(handlers::update_article).delete(handlers::delete_article),
        )
        // POST /articles/{article_id}/comments
        // Adds a comment authored by the caller.
        .route(
            "/articles/{article_id}/comments",
            post(handlers::create_comment),
        )
}
