use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::models::{AccessToken, Article, Comment};

// --- JSON:API Envelope Types ---

/// ResourceIdentifier
///
/// A typed reference to a resource: `{ "id": "...", "type": "..." }`. Ids are
/// always serialized as strings, whatever their storage type.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Relationship
///
/// A reference-only relationship entry: `{ "data": { "id", "type" } }`.
/// Related resources are never embedded, keeping payload size bounded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Relationship {
    pub data: ResourceIdentifier,
}

/// Resource
///
/// One serialized entity in the `data` position of a document.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Resource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(value_type = Object)]
    pub attributes: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<BTreeMap<String, Relationship>>,
}

/// Top-level document for a single resource.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResourceDocument {
    pub data: Resource,
}

/// Top-level document for a collection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CollectionDocument {
    pub data: Vec<Resource>,
}

/// Top-level document for failures: `{ "errors": [ ... ] }`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

/// ErrorObject
///
/// One entry in an error document. `source.pointer` references the JSON path
/// of the invalid input (`/data/attributes/<field>`) or the offending request
/// part (`/headers/authorization`, `/code`).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorSource {
    pub pointer: String,
}

// --- Serialization Contract ---

/// JsonApiResource
///
/// Implemented by every entity the API exposes. The serializer only ever sees
/// this contract, so handlers build documents the same way for all types.
pub trait JsonApiResource {
    const TYPE: &'static str;

    fn resource_id(&self) -> String;
    fn attributes(&self) -> Value;
    fn relationships(&self) -> Option<BTreeMap<String, Relationship>> {
        None
    }
}

pub fn resource<T: JsonApiResource>(entity: &T) -> Resource {
    Resource {
        id: entity.resource_id(),
        kind: T::TYPE.to_string(),
        attributes: entity.attributes(),
        relationships: entity.relationships(),
    }
}

pub fn document<T: JsonApiResource>(entity: &T) -> ResourceDocument {
    ResourceDocument {
        data: resource(entity),
    }
}

pub fn collection<T: JsonApiResource>(entities: &[T]) -> CollectionDocument {
    CollectionDocument {
        data: entities.iter().map(resource).collect(),
    }
}

fn reference(kind: &str, id: String) -> Relationship {
    Relationship {
        data: ResourceIdentifier {
            id,
            kind: kind.to_string(),
        },
    }
}

// --- Entity Implementations ---

impl JsonApiResource for Article {
    const TYPE: &'static str = "articles";

    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self) -> Value {
        json!({
            "title": self.title,
            "content": self.content,
            "slug": self.slug,
        })
    }
}

impl JsonApiResource for Comment {
    const TYPE: &'static str = "comments";

    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    fn attributes(&self) -> Value {
        json!({ "content": self.content })
    }

    fn relationships(&self) -> Option<BTreeMap<String, Relationship>> {
        let mut map = BTreeMap::new();
        map.insert(
            "article".to_string(),
            reference(Article::TYPE, self.article_id.to_string()),
        );
        map.insert(
            "user".to_string(),
            reference("users", self.user_id.to_string()),
        );
        Some(map)
    }
}

impl JsonApiResource for AccessToken {
    const TYPE: &'static str = "access_tokens";

    fn resource_id(&self) -> String {
        self.id.to_string()
    }

    // The bearer string is the only attribute a client needs back.
    fn attributes(&self) -> Value {
        json!({ "token": self.token })
    }
}
