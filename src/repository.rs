use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{AccessToken, Article, ArticleChanges, Comment, NewArticle, User};
use crate::pagination::Page;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers
/// and the authorization gate never touch the concrete database driver. Every
/// ownership-scoped mutation filters by `(id, user_id)` jointly in the query
/// itself: an id that exists but belongs to someone else is indistinguishable
/// from a missing one.
///
/// **Send + Sync + async_trait** are required so the trait object
/// (`Arc<dyn Repository>`) can be shared across axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Articles ---
    // Public listing, newest first, windowed by the caller's page.
    async fn list_articles(&self, page: Page) -> Vec<Article>;
    async fn get_article(&self, id: Uuid) -> Option<Article>;
    // Attributes are validated before this is called; the slug uniqueness
    // constraint is enforced here and surfaced as a field violation.
    async fn create_article(&self, user_id: Uuid, new: NewArticle) -> Result<Article, ApiError>;
    // Partial update scoped to the owner. Ok(None) means absent-or-not-owned.
    async fn update_article(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: ArticleChanges,
    ) -> Result<Option<Article>, ApiError>;
    // Scoped delete. Ok(false) means absent-or-not-owned. Comments cascade.
    async fn delete_article(&self, id: Uuid, user_id: Uuid) -> Result<bool, ApiError>;

    // --- Comments ---
    // Listing in creation order, scoped to one article.
    async fn list_comments(&self, article_id: Uuid, page: Page) -> Vec<Comment>;
    async fn create_comment(
        &self,
        article_id: Uuid,
        user_id: Uuid,
        content: String,
    ) -> Result<Comment, ApiError>;

    // --- Users & Tokens ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    // Gate lookup: resolves the user behind an opaque bearer token.
    async fn find_user_by_token(&self, token: &str) -> Option<User>;
    // Authenticator upsert keyed on the provider login.
    async fn find_or_create_user(
        &self,
        login: String,
        name: Option<String>,
    ) -> Result<User, ApiError>;
    // Per-user upsert: a user holds at most one active token.
    async fn create_access_token(
        &self,
        user_id: Uuid,
        token: String,
    ) -> Result<AccessToken, ApiError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ARTICLE_COLUMNS: &str = "id, user_id, title, content, slug, created_at, updated_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
    )
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation)
    )
}

#[async_trait]
impl Repository for PostgresRepository {
    /// Newest-first window over all articles. The ordering is applied before
    /// the window; out-of-range pages come back empty.
    async fn list_articles(&self, page: Page) -> Vec<Article> {
        let query = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        match sqlx::query_as::<_, Article>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
        {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!("list_articles error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_article(&self, id: Uuid) -> Option<Article> {
        let query = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_article error: {:?}", e);
                None
            })
    }

    async fn create_article(&self, user_id: Uuid, new: NewArticle) -> Result<Article, ApiError> {
        let query = format!(
            "INSERT INTO articles (id, user_id, title, content, slug, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {ARTICLE_COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(new.title)
            .bind(new.content)
            .bind(new.slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ApiError::validation("slug", "has already been taken")
                } else {
                    ApiError::Database(e)
                }
            })
    }

    /// COALESCE keeps columns whose field in `changes` is `None` untouched.
    /// The `(id, user_id)` filter makes not-found and not-owned one outcome.
    async fn update_article(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: ArticleChanges,
    ) -> Result<Option<Article>, ApiError> {
        let query = format!(
            "UPDATE articles \
             SET title = COALESCE($3, title), \
                 content = COALESCE($4, content), \
                 slug = COALESCE($5, slug), \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {ARTICLE_COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(user_id)
            .bind(changes.title)
            .bind(changes.content)
            .bind(changes.slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ApiError::validation("slug", "has already been taken")
                } else {
                    ApiError::Database(e)
                }
            })
    }

    async fn delete_article(&self, id: Uuid, user_id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Creation-order window over one article's comments.
    async fn list_comments(&self, article_id: Uuid, page: Page) -> Vec<Comment> {
        match sqlx::query_as::<_, Comment>(
            "SELECT id, article_id, user_id, content, created_at FROM comments \
             WHERE article_id = $1 \
             ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(article_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        {
            Ok(comments) => comments,
            Err(e) => {
                tracing::error!("list_comments error: {:?}", e);
                vec![]
            }
        }
    }

    async fn create_comment(
        &self,
        article_id: Uuid,
        user_id: Uuid,
        content: String,
    ) -> Result<Comment, ApiError> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (article_id, user_id, content, created_at) \
             VALUES ($1, $2, $3, NOW()) \
             RETURNING id, article_id, user_id, content, created_at",
        )
        .bind(article_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The article can vanish between the handler's existence check and
            // this insert; the FK violation closes that window.
            if is_foreign_key_violation(&e) {
                ApiError::NotFound
            } else {
                ApiError::Database(e)
            }
        })
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, login, name, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or(None)
    }

    async fn find_user_by_token(&self, token: &str) -> Option<User> {
        sqlx::query_as::<_, User>(
            "SELECT u.id, u.login, u.name, u.created_at \
             FROM users u JOIN access_tokens t ON t.user_id = u.id \
             WHERE t.token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_user_by_token error: {:?}", e);
            None
        })
    }

    async fn find_or_create_user(
        &self,
        login: String,
        name: Option<String>,
    ) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, login, name, created_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (login) DO UPDATE SET name = COALESCE(EXCLUDED.name, users.name) \
             RETURNING id, login, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(login)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_access_token(
        &self,
        user_id: Uuid,
        token: String,
    ) -> Result<AccessToken, ApiError> {
        let access_token = sqlx::query_as::<_, AccessToken>(
            "INSERT INTO access_tokens (user_id, token, created_at) \
             VALUES ($1, $2, NOW()) \
             ON CONFLICT (user_id) DO UPDATE SET token = EXCLUDED.token, created_at = NOW() \
             RETURNING id, user_id, token, created_at",
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(&self.pool)
        .await?;
        Ok(access_token)
    }
}
