use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::serializer::{ErrorDocument, ErrorObject, ErrorSource};

/// ApiError
///
/// The application's failure taxonomy. Every handler and repository error
/// funnels into one of these variants, and `IntoResponse` translates each into
/// a JSON:API error document with the matching status code. Nothing escapes to
/// the transport layer as an unhandled fault.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The authorization code could not be exchanged for an identity.
    #[error("authentication failed")]
    Authentication,

    /// Missing/invalid bearer token, or a mutation on a resource the caller
    /// does not own. The two cases share one response so resource existence is
    /// never revealed.
    #[error("forbidden")]
    Forbidden,

    /// A genuinely public lookup found nothing.
    #[error("not found")]
    NotFound,

    /// One or more request attributes violated a field constraint.
    #[error("validation failed")]
    Validation(Vec<FieldViolation>),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The identity provider was unreachable or returned garbage. Distinct
    /// from `Authentication`, which means the provider rejected the code.
    #[error("identity provider error: {0}")]
    Identity(String),
}

/// FieldViolation
///
/// A single field-level constraint violation, serialized with a pointer of
/// `/data/attributes/<field>`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub detail: String,
}

impl FieldViolation {
    pub fn new(field: &str, detail: &str) -> Self {
        Self {
            field: field.to_string(),
            detail: detail.to_string(),
        }
    }

    /// The presence violation, worded exactly as clients expect it.
    pub fn blank(field: &str) -> Self {
        Self::new(field, "can't be blank")
    }

    pub fn pointer(&self) -> String {
        format!("/data/attributes/{}", self.field)
    }
}

impl ApiError {
    /// Convenience constructor for a single-field validation failure.
    pub fn validation(field: &str, detail: &str) -> Self {
        Self::Validation(vec![FieldViolation::new(field, detail)])
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Identity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_objects(&self) -> Vec<ErrorObject> {
        match self {
            Self::Authentication => vec![ErrorObject {
                status: Some("401".to_string()),
                source: Some(ErrorSource {
                    pointer: "/code".to_string(),
                }),
                detail: "Authorization code is invalid or has expired.".to_string(),
            }],
            Self::Forbidden => vec![ErrorObject {
                status: Some("403".to_string()),
                source: Some(ErrorSource {
                    pointer: "/headers/authorization".to_string(),
                }),
                detail: "You have no right to access this resource.".to_string(),
            }],
            Self::NotFound => vec![ErrorObject {
                status: Some("404".to_string()),
                source: None,
                detail: "The requested resource could not be found.".to_string(),
            }],
            Self::Validation(violations) => violations
                .iter()
                .map(|violation| ErrorObject {
                    status: None,
                    source: Some(ErrorSource {
                        pointer: violation.pointer(),
                    }),
                    detail: violation.detail.clone(),
                })
                .collect(),
            Self::Database(_) | Self::Identity(_) => vec![ErrorObject {
                status: Some("500".to_string()),
                source: None,
                detail: "Internal server error.".to_string(),
            }],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Collaborator faults are logged with detail; the response body stays
        // generic.
        match &self {
            Self::Database(e) => tracing::error!("database failure: {:?}", e),
            Self::Identity(msg) => tracing::error!("identity provider failure: {}", msg),
            _ => {}
        }

        let body = ErrorDocument {
            errors: self.error_objects(),
        };
        (self.status(), Json(body)).into_response()
    }
}
