use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{CurrentUser, UserAuthenticator},
    error::ApiError,
    models::{ArticleChanges, Document, ExchangeCode, NewArticle, NewComment},
    pagination::Page,
    serializer::{self, CollectionDocument, ErrorDocument, ResourceDocument},
};

// --- Query Parameters ---

/// ListQuery
///
/// Accepted query parameters for the paginated list endpoints. Both values
/// arrive as raw strings so malformed input normalizes to the defaults
/// instead of rejecting the request.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// 1-based page number; defaults to 1.
    pub page: Option<String>,
    /// Window size; defaults to 25.
    pub per_page: Option<String>,
}

impl ListQuery {
    fn page(&self) -> Page {
        Page::from_query(self.page.as_deref(), self.per_page.as_deref())
    }
}

// --- Handlers ---

/// create_access_token
///
/// [Public Route] Exchanges an authorization code for an access token.
/// An invalid code yields the 401 authentication error and no token row.
#[utoipa::path(
    post,
    path = "/access_tokens",
    request_body = ExchangeCode,
    responses(
        (status = 201, description = "Token minted", body = ResourceDocument),
        (status = 401, description = "Invalid code", body = ErrorDocument)
    )
)]
pub async fn create_access_token(
    State(state): State<AppState>,
    Json(payload): Json<ExchangeCode>,
) -> Result<(StatusCode, Json<ResourceDocument>), ApiError> {
    let authenticator = UserAuthenticator::new(state.identity.clone(), state.repo.clone());
    let access_token = authenticator.perform(&payload.code).await?;
    Ok((StatusCode::CREATED, Json(serializer::document(&access_token))))
}

/// list_articles
///
/// [Public Route] Paginated article listing, newest first.
#[utoipa::path(
    get,
    path = "/articles",
    params(ListQuery),
    responses((status = 200, description = "Articles", body = CollectionDocument))
)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<CollectionDocument> {
    let articles = state.repo.list_articles(query.page()).await;
    Json(serializer::collection(&articles))
}

/// get_article
///
/// [Public Route] Single article by id; 404 when absent.
#[utoipa::path(
    get,
    path = "/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = ResourceDocument),
        (status = 404, description = "Absent", body = ErrorDocument)
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceDocument>, ApiError> {
    match state.repo.get_article(id).await {
        Some(article) => Ok(Json(serializer::document(&article))),
        None => Err(ApiError::NotFound),
    }
}

/// create_article
///
/// [Authenticated Route] Creates an article owned by the requesting user.
/// Attributes are validated before the repository runs; a duplicate slug
/// comes back as a field violation.
#[utoipa::path(
    post,
    path = "/articles",
    request_body = NewArticle,
    responses(
        (status = 201, description = "Created", body = ResourceDocument),
        (status = 422, description = "Invalid attributes", body = ErrorDocument)
    )
)]
pub async fn create_article(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<Document<NewArticle>>,
) -> Result<(StatusCode, Json<ResourceDocument>), ApiError> {
    let attributes = payload.into_attributes();
    attributes.validate()?;
    let article = state.repo.create_article(current_user.id, attributes).await?;
    Ok((StatusCode::CREATED, Json(serializer::document(&article))))
}

/// update_article
///
/// [Authenticated Route] Partial update of the caller's own article.
/// An id that is absent or owned by someone else produces the same 403; the
/// response never reveals which.
#[utoipa::path(
    patch,
    path = "/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = ArticleChanges,
    responses(
        (status = 200, description = "Updated", body = ResourceDocument),
        (status = 403, description = "Absent or not owned", body = ErrorDocument),
        (status = 422, description = "Invalid attributes", body = ErrorDocument)
    )
)]
pub async fn update_article(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Document<ArticleChanges>>,
) -> Result<Json<ResourceDocument>, ApiError> {
    let changes = payload.into_attributes();
    changes.validate()?;
    match state.repo.update_article(id, current_user.id, changes).await? {
        Some(article) => Ok(Json(serializer::document(&article))),
        None => Err(ApiError::Forbidden),
    }
}

/// delete_article
///
/// [Authenticated Route] Deletes the caller's own article; its comments go
/// with it. Same 403 contract as update for absent-or-not-owned ids.
#[utoipa::path(
    delete,
    path = "/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Absent or not owned", body = ErrorDocument)
    )
)]
pub async fn delete_article(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete_article(id, current_user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::Forbidden)
    }
}

/// list_comments
///
/// [Public Route] Paginated comments for one article, in creation order.
#[utoipa::path(
    get,
    path = "/articles/{article_id}/comments",
    params(("article_id" = Uuid, Path, description = "Article ID"), ListQuery),
    responses(
        (status = 200, description = "Comments", body = CollectionDocument),
        (status = 404, description = "Unknown article", body = ErrorDocument)
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CollectionDocument>, ApiError> {
    if state.repo.get_article(article_id).await.is_none() {
        return Err(ApiError::NotFound);
    }
    let comments = state.repo.list_comments(article_id, query.page()).await;
    Ok(Json(serializer::collection(&comments)))
}

/// create_comment
///
/// [Authenticated Route] Posts a comment on an article. Blank content is a
/// 422 with pointer `/data/attributes/content`; an unknown article is a 404.
#[utoipa::path(
    post,
    path = "/articles/{article_id}/comments",
    params(("article_id" = Uuid, Path, description = "Article ID")),
    request_body = NewComment,
    responses(
        (status = 201, description = "Created", body = ResourceDocument),
        (status = 404, description = "Unknown article", body = ErrorDocument),
        (status = 422, description = "Invalid attributes", body = ErrorDocument)
    )
)]
pub async fn create_comment(
    current_user: CurrentUser,
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Json(payload): Json<Document<NewComment>>,
) -> Result<(StatusCode, Json<ResourceDocument>), ApiError> {
    let attributes = payload.into_attributes();
    attributes.validate()?;
    if state.repo.get_article(article_id).await.is_none() {
        return Err(ApiError::NotFound);
    }
    let comment = state
        .repo
        .create_comment(article_id, current_user.id, attributes.content)
        .await?;
    Ok((StatusCode::CREATED, Json(serializer::document(&comment))))
}
