use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod serializer;

// Routing segregation (public vs. authenticated).
pub mod routes;
use auth::CurrentUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// Core state types used by the entry point and the test harnesses.
pub use config::AppConfig;
pub use identity::{IdentityState, MockIdentityProvider, OAuthIdentityProvider};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates the OpenAPI documentation for every handler and schema carrying
/// utoipa annotations. The generated JSON is served at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_access_token,
        handlers::list_articles,
        handlers::get_article,
        handlers::create_article,
        handlers::update_article,
        handlers::delete_article,
        handlers::list_comments,
        handlers::create_comment,
    ),
    components(
        schemas(
            models::Article, models::Comment, models::AccessToken, models::User,
            models::NewArticle, models::ArticleChanges, models::NewComment,
            models::ExchangeCode,
            serializer::ResourceDocument, serializer::CollectionDocument,
            serializer::ErrorDocument, serializer::Resource,
            serializer::Relationship, serializer::ResourceIdentifier,
            serializer::ErrorObject, serializer::ErrorSource,
        )
    ),
    tags(
        (name = "blog-api", description = "JSON:API article backend")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container holding every service a request can need,
/// shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: persistence behind the `Repository` trait.
    pub repo: RepositoryState,
    /// Identity layer: the external code-exchange collaborator.
    pub identity: IdentityState,
    /// Loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors pull individual components out of the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// The authorization gate for the authenticated router. `CurrentUser` runs as
/// an extractor; when it rejects, the structured 403 response is emitted here
/// and the handler (and everything behind it) never runs.
async fn auth_middleware(_current_user: CurrentUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the full routing structure, applies the gate to the
/// authenticated subset, and layers observability over everything.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no gate.
        .merge(public::public_routes())
        // Authenticated routes: gated by the CurrentUser extractor layer.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // Observability and correlation layers, outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: the whole lifecycle inside one span that
                // carries the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Return the generated id to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span with method, URI, and the `x-request-id`
/// header so every log line of one request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
