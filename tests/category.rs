mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use common::spawn_app;

#[tokio::test]
async fn test_category() {
    let app = spawn_app().await;

    let (status, body) = app.get_json("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));

    let admin = app.admin().await;
    let shoes = app.create_category(&admin, "Shoes").await;

    let (status, body) = app.get_json(&format!("/api/categories/{shoes}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Shoes");
    assert_eq!(body["parent_id"], Value::Null);
}

#[tokio::test]
async fn test_category_parent_rules() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let shoes = app.create_category(&admin, "Shoes").await;

    let response = app
        .client
        .post(app.url("/api/admin/categories"))
        .headers(admin.clone())
        .json(&json!({ "name": "Sneakers", "parent_id": shoes }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .client
        .post(app.url("/api/admin/categories"))
        .headers(admin.clone())
        .json(&json!({ "name": "Orphans", "parent_id": 999 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .put(app.url(&format!("/api/admin/categories/{shoes}")))
        .headers(admin)
        .json(&json!({ "name": "Shoes", "parent_id": shoes }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response
        .json::<Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body["kind"], "invalid_input");
}

#[tokio::test]
async fn test_delete_category_hides_it() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    let shoes = app.create_category(&admin, "Shoes").await;

    let response = app
        .client
        .delete(app.url(&format!("/api/admin/categories/{shoes}")))
        .headers(admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = app.get_json(&format!("/api/categories/{shoes}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "category_not_found");

    let (_, body) = app.get_json("/api/categories").await;
    assert_eq!(body, Value::Array(vec![]));
}
