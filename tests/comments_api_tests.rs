mod common;

use common::{count_comments, seed_article, seed_comment, seed_token, seed_user, spawn_app};
use uuid::Uuid;

fn comment_body(content: &str) -> serde_json::Value {
    serde_json::json!({ "data": { "attributes": { "content": content } } })
}

// --- Index ---

#[tokio::test]
async fn test_index_renders_a_successful_response() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let article = seed_article(&app.pool, user.id, "Discussed", 5).await;

    let response = client
        .get(format!("{}/articles/{}/comments", app.address, article.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_index_returns_only_comments_of_that_article() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let article = seed_article(&app.pool, user.id, "Mine", 5).await;
    let other_article = seed_article(&app.pool, user.id, "Elsewhere", 5).await;

    let comment = seed_comment(&app.pool, article.id, user.id, "on topic").await;
    seed_comment(&app.pool, other_article.id, user.id, "off topic").await;

    let response = client
        .get(format!("{}/articles/{}/comments", app.address, article.id))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = response.json().await.unwrap();
    let data = json["data"].as_array().unwrap();

    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], comment.id.to_string());
}

#[tokio::test]
async fn test_index_paginates_results() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let article = seed_article(&app.pool, user.id, "Busy thread", 5).await;

    let _first = seed_comment(&app.pool, article.id, user.id, "first").await;
    let second = seed_comment(&app.pool, article.id, user.id, "second").await;
    let _third = seed_comment(&app.pool, article.id, user.id, "third").await;

    let response = client
        .get(format!(
            "{}/articles/{}/comments?per_page=1&page=2",
            app.address, article.id
        ))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = response.json().await.unwrap();
    let data = json["data"].as_array().unwrap();

    // Exactly the second comment by creation order.
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], second.id.to_string());
}

#[tokio::test]
async fn test_index_has_proper_json_body() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let article = seed_article(&app.pool, user.id, "Quoted", 5).await;
    let comment = seed_comment(&app.pool, article.id, user.id, "A comment for this article.").await;

    let response = client
        .get(format!("{}/articles/{}/comments", app.address, article.id))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = response.json().await.unwrap();
    let data = json["data"].as_array().unwrap();

    assert_eq!(data[0]["type"], "comments");
    assert_eq!(data[0]["id"], comment.id.to_string());
    assert_eq!(
        data[0]["attributes"],
        serde_json::json!({ "content": "A comment for this article." })
    );
}

#[tokio::test]
async fn test_index_has_related_objects_information() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let author = seed_user(&app.pool).await;
    let article = seed_article(&app.pool, author.id, "Related", 5).await;
    seed_comment(&app.pool, article.id, author.id, "with references").await;

    let response = client
        .get(format!("{}/articles/{}/comments", app.address, article.id))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = response.json().await.unwrap();
    let relationships = &json["data"][0]["relationships"];

    assert_eq!(relationships["article"]["data"]["id"], article.id.to_string());
    assert_eq!(relationships["article"]["data"]["type"], "articles");
    assert_eq!(relationships["user"]["data"]["id"], author.id.to_string());
    assert_eq!(relationships["user"]["data"]["type"], "users");
}

#[tokio::test]
async fn test_index_for_unknown_article_is_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!(
            "{}/articles/{}/comments",
            app.address,
            Uuid::new_v4()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

// --- Create ---

#[tokio::test]
async fn test_create_when_not_authorized_is_forbidden() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let article = seed_article(&app.pool, user.id, "Locked thread", 5).await;

    let response = client
        .post(format!("{}/articles/{}/comments", app.address, article.id))
        .json(&comment_body("anonymous drive-by"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        json["errors"][0]["source"]["pointer"],
        "/headers/authorization"
    );
    assert_eq!(count_comments(&app.pool, article.id).await, 0);
}

#[tokio::test]
async fn test_create_with_valid_parameters() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let token = seed_token(&app.pool, user.id).await;
    let article = seed_article(&app.pool, user.id, "Open thread", 5).await;

    let response = client
        .post(format!("{}/articles/{}/comments", app.address, article.id))
        .bearer_auth(&token)
        .json(&comment_body("A comment for this article."))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        json["data"]["attributes"],
        serde_json::json!({ "content": "A comment for this article." })
    );
    assert_eq!(json["data"]["relationships"]["user"]["data"]["id"], user.id.to_string());
    assert_eq!(count_comments(&app.pool, article.id).await, 1);
}

#[tokio::test]
async fn test_create_with_blank_content_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let token = seed_token(&app.pool, user.id).await;
    let article = seed_article(&app.pool, user.id, "Strict thread", 5).await;

    let response = client
        .post(format!("{}/articles/{}/comments", app.address, article.id))
        .bearer_auth(&token)
        .json(&comment_body(""))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        json["errors"][0]["source"]["pointer"],
        "/data/attributes/content"
    );
    assert_eq!(json["errors"][0]["detail"], "can't be blank");
    // No comment row was created.
    assert_eq!(count_comments(&app.pool, article.id).await, 0);
}

#[tokio::test]
async fn test_create_on_unknown_article_is_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = seed_user(&app.pool).await;
    let token = seed_token(&app.pool, user.id).await;

    let response = client
        .post(format!(
            "{}/articles/{}/comments",
            app.address,
            Uuid::new_v4()
        ))
        .bearer_auth(&token)
        .json(&comment_body("shouting into the void"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}
