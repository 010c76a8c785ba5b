use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, FieldViolation};

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity record stored in the `users` table. A user owns
/// articles and comments; the `login` comes from the external identity
/// provider and is unique.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    // Provider-assigned handle, unique across the table.
    pub login: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// AccessToken
///
/// An opaque bearer credential tied to exactly one user. The `user_id` column
/// is unique, so minting a new token replaces the previous one and a user
/// holds at most one active token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct AccessToken {
    pub id: i64,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Article
///
/// A published piece owned by exactly one user. `slug` is unique across the
/// table; uniqueness violations surface as field validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Article {
    pub id: Uuid,
    // FK to users.id (owner). Mutations are scoped by (id, user_id).
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment
///
/// Belongs to exactly one article and one user (the author). Deleting the
/// article cascades to its comments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Comment {
    pub id: i64,
    pub article_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// Document
///
/// The typed request envelope `{ "data": { "attributes": { ... } } }`. Request
/// bodies are validated against a concrete attribute schema at the boundary
/// before any domain logic runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Document<T> {
    pub data: Primary<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Primary<T> {
    pub attributes: T,
}

impl<T> Document<T> {
    pub fn into_attributes(self) -> T {
        self.data.attributes
    }
}

/// NewArticle
///
/// Attributes accepted when creating an article (POST /articles).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub slug: String,
}

impl NewArticle {
    /// Presence validation for all required fields. Violations carry the field
    /// name so the response can point at `/data/attributes/<field>`.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Vec::new();
        for (field, value) in [
            ("title", &self.title),
            ("content", &self.content),
            ("slug", &self.slug),
        ] {
            if is_blank(value) {
                violations.push(FieldViolation::blank(field));
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(violations))
        }
    }
}

/// ArticleChanges
///
/// Partial update payload for PATCH /articles/{id}. Absent fields are left
/// untouched by the repository's COALESCE update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ArticleChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl ArticleChanges {
    /// A field that is present but blank is a validation error; a field that
    /// is absent is simply not updated.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Vec::new();
        for (field, value) in [
            ("title", &self.title),
            ("content", &self.content),
            ("slug", &self.slug),
        ] {
            if value.as_deref().is_some_and(is_blank) {
                violations.push(FieldViolation::blank(field));
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(violations))
        }
    }
}

/// NewComment
///
/// Attributes accepted when commenting on an article.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct NewComment {
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), ApiError> {
        if is_blank(&self.content) {
            return Err(ApiError::Validation(vec![FieldViolation::blank("content")]));
        }
        Ok(())
    }
}

/// ExchangeCode
///
/// Input payload for the login endpoint (POST /access_tokens).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ExchangeCode {
    pub code: String,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
