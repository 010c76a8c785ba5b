mod common;

use common::{article_exists, count_comments, seed_article, seed_comment, seed_token, seed_user, spawn_app};
use uuid::Uuid;

fn article_body(title: &str, content: &str, slug: &str) -> serde_json::Value {
    serde_json::json!({
        "data": { "attributes": { "title": title, "content": content, "slug": slug } }
    })
}

// --- Public Listing ---

#[tokio::test]
async fn test_list_orders_newest_first() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;

    let older = seed_article(&app.pool, user.id, "Older piece", 20).await;
    let newer = seed_article(&app.pool, user.id, "Newer piece", 10).await;

    let response = client
        .get(format!("{}/articles?per_page=200", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let json: serde_json::Value = response.json().await.unwrap();
    let data = json["data"].as_array().unwrap();

    let position = |id: &Uuid| {
        data.iter()
            .position(|resource| resource["id"] == id.to_string())
            .unwrap_or_else(|| panic!("article {} missing from listing", id))
    };
    assert!(position(&newer.id) < position(&older.id));
}

#[tokio::test]
async fn test_list_never_exceeds_per_page() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    for age in [1, 2, 3] {
        seed_article(&app.pool, user.id, "Window filler", age).await;
    }

    let response = client
        .get(format!("{}/articles?per_page=2", app.address))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = response.json().await.unwrap();
    assert!(json["data"].as_array().unwrap().len() <= 2);
}

#[tokio::test]
async fn test_list_with_out_of_range_page_is_empty_not_an_error() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/articles?page=999999&per_page=25", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_list_normalizes_malformed_page_params() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/articles?page=abc&per_page=-2", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let json: serde_json::Value = response.json().await.unwrap();
    // Falls back to the default window instead of erroring.
    assert!(json["data"].as_array().unwrap().len() <= 25);
}

// --- Public Show ---

#[tokio::test]
async fn test_show_returns_attributes() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let article = seed_article(&app.pool, user.id, "Readable", 5).await;

    let response = client
        .get(format!("{}/articles/{}", app.address, article.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["data"]["id"], article.id.to_string());
    assert_eq!(json["data"]["attributes"]["title"], "Readable");
    assert_eq!(json["data"]["attributes"]["slug"], article.slug);
}

#[tokio::test]
async fn test_show_missing_article_is_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/articles/{}", app.address, Uuid::new_v4()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["errors"][0]["status"], "404");
}

// --- Create ---

#[tokio::test]
async fn test_create_without_token_is_forbidden() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/articles", app.address))
        .json(&article_body("Nope", "Nope", "nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        json["errors"][0]["detail"],
        "You have no right to access this resource."
    );
}

#[tokio::test]
async fn test_create_with_blank_attributes_lists_every_violation() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let token = seed_token(&app.pool, user.id).await;

    let response = client
        .post(format!("{}/articles", app.address))
        .bearer_auth(&token)
        .json(&article_body("", "", ""))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let json: serde_json::Value = response.json().await.unwrap();
    let pointers: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["source"]["pointer"].as_str().unwrap())
        .collect();
    assert_eq!(
        pointers,
        vec![
            "/data/attributes/title",
            "/data/attributes/content",
            "/data/attributes/slug"
        ]
    );
    for error in json["errors"].as_array().unwrap() {
        assert_eq!(error["detail"], "can't be blank");
    }
}

#[tokio::test]
async fn test_create_with_duplicate_slug_is_a_field_violation() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let token = seed_token(&app.pool, user.id).await;
    let slug = format!("taken-{}", Uuid::new_v4().simple());

    let response = client
        .post(format!("{}/articles", app.address))
        .bearer_auth(&token)
        .json(&article_body("First claim", "Body", &slug))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/articles", app.address))
        .bearer_auth(&token)
        .json(&article_body("Second claim", "Body", &slug))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["errors"][0]["source"]["pointer"], "/data/attributes/slug");
    assert_eq!(json["errors"][0]["detail"], "has already been taken");
}

// --- Update & Delete (ownership) ---

#[tokio::test]
async fn test_update_other_users_article_matches_missing_id() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let owner = seed_user(&app.pool).await;
    let intruder = seed_user(&app.pool).await;
    let intruder_token = seed_token(&app.pool, intruder.id).await;
    let article = seed_article(&app.pool, owner.id, "Guarded", 5).await;

    let patch = serde_json::json!({ "data": { "attributes": { "title": "Hijacked" } } });

    let foreign = client
        .patch(format!("{}/articles/{}", app.address, article.id))
        .bearer_auth(&intruder_token)
        .json(&patch)
        .send()
        .await
        .unwrap();
    let missing = client
        .patch(format!("{}/articles/{}", app.address, Uuid::new_v4()))
        .bearer_auth(&intruder_token)
        .json(&patch)
        .send()
        .await
        .unwrap();

    // The two cases are indistinguishable: same status, same body.
    assert_eq!(foreign.status(), 403);
    assert_eq!(missing.status(), 403);
    let foreign_body: serde_json::Value = foreign.json().await.unwrap();
    let missing_body: serde_json::Value = missing.json().await.unwrap();
    assert_eq!(foreign_body, missing_body);
}

#[tokio::test]
async fn test_update_with_blank_title_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let token = seed_token(&app.pool, user.id).await;
    let article = seed_article(&app.pool, user.id, "Valid so far", 5).await;

    let response = client
        .patch(format!("{}/articles/{}", app.address, article.id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "data": { "attributes": { "title": " " } } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["errors"][0]["source"]["pointer"], "/data/attributes/title");
}

#[tokio::test]
async fn test_delete_other_users_article_is_forbidden_and_keeps_row() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let owner = seed_user(&app.pool).await;
    let intruder = seed_user(&app.pool).await;
    let intruder_token = seed_token(&app.pool, intruder.id).await;
    let article = seed_article(&app.pool, owner.id, "Still here", 5).await;

    let response = client
        .delete(format!("{}/articles/{}", app.address, article.id))
        .bearer_auth(&intruder_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    assert!(article_exists(&app.pool, article.id).await);
}

#[tokio::test]
async fn test_delete_cascades_to_comments() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let token = seed_token(&app.pool, user.id).await;
    let article = seed_article(&app.pool, user.id, "Doomed", 5).await;
    seed_comment(&app.pool, article.id, user.id, "first").await;
    seed_comment(&app.pool, article.id, user.id, "second").await;
    assert_eq!(count_comments(&app.pool, article.id).await, 2);

    let response = client
        .delete(format!("{}/articles/{}", app.address, article.id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    assert!(!article_exists(&app.pool, article.id).await);
    assert_eq!(count_comments(&app.pool, article.id).await, 0);
}
