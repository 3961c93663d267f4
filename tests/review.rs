mod common;

use reqwest::{header::HeaderMap, StatusCode};
use serde_json::{json, Value};

use common::{product_json, spawn_app, TestApp};

async fn post_review(app: &TestApp, author: &HeaderMap, payload: Value) -> reqwest::Response {
    app.client
        .post(app.url("/api/reviews"))
        .headers(author.clone())
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request")
}

async fn rating(app: &TestApp, product_id: i64) -> f64 {
    let (status, body) = app.get_json(&format!("/api/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    body["rating"].as_f64().expect("rating missing")
}

async fn reviewed_product(app: &TestApp) -> i64 {
    let admin = app.admin().await;
    let seller = app.sign_up("seller@catalog.test", "seller").await;
    let shoes = app.create_category(&admin, "Shoes").await;
    let product = app
        .create_product(&seller, product_json("Trail runner", shoes, 120.0, 3))
        .await;
    product["id"].as_i64().expect("id missing")
}

#[tokio::test]
async fn test_rating_follows_reviews() {
    let app = spawn_app().await;
    let product_id = reviewed_product(&app).await;
    assert_eq!(rating(&app, product_id).await, 0.0);

    let mut review_ids = Vec::new();
    for (email, grade) in [
        ("first@catalog.test", 4),
        ("second@catalog.test", 5),
        ("third@catalog.test", 3),
    ] {
        let buyer = app.sign_up(email, "buyer").await;
        let response = post_review(
            &app,
            &buyer,
            json!({ "product_id": product_id, "grade": grade, "comment": "Fits well" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse response JSON");
        assert_eq!(body["grade"], grade);
        review_ids.push(body["id"].as_i64().expect("id missing"));
    }
    assert_eq!(rating(&app, product_id).await, 4.0);

    let (_, listed) = app
        .get_json(&format!("/api/products/{product_id}/reviews"))
        .await;
    assert_eq!(listed.as_array().map(Vec::len), Some(3));

    let response = app
        .client
        .delete(app.url(&format!("/api/reviews/{}", review_ids[2])))
        .headers(app.admin().await)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(rating(&app, product_id).await, 4.5);

    let (_, listed) = app.get_json("/api/reviews").await;
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_grade_defaults_to_five() {
    let app = spawn_app().await;
    let product_id = reviewed_product(&app).await;
    let buyer = app.sign_up("buyer@catalog.test", "buyer").await;

    let response = post_review(&app, &buyer, json!({ "product_id": product_id })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(rating(&app, product_id).await, 5.0);
}

#[tokio::test]
async fn test_duplicate_review() {
    let app = spawn_app().await;
    let product_id = reviewed_product(&app).await;
    let buyer = app.sign_up("buyer@catalog.test", "buyer").await;

    let response = post_review(&app, &buyer, json!({ "product_id": product_id, "grade": 2 })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_review(&app, &buyer, json!({ "product_id": product_id, "grade": 5 })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response
        .json::<Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body["kind"], "duplicate_review");
    assert_eq!(rating(&app, product_id).await, 2.0);
}

#[tokio::test]
async fn test_review_preconditions() {
    let app = spawn_app().await;
    let product_id = reviewed_product(&app).await;
    let buyer = app.sign_up("buyer@catalog.test", "buyer").await;
    let seller = app.sign_up("other-seller@catalog.test", "seller").await;

    let response = post_review(&app, &buyer, json!({ "product_id": product_id, "grade": 6 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_review(&app, &buyer, json!({ "product_id": 999, "grade": 4 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_review(&app, &seller, json!({ "product_id": product_id, "grade": 4 })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_review(&app, &buyer, json!({ "product_id": product_id, "grade": 4 })).await;
    let review = response
        .json::<Value>()
        .await
        .expect("Failed to parse response JSON");

    let response = app
        .client
        .delete(app.url(&format!("/api/reviews/{}", review["id"])))
        .headers(buyer)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client
        .delete(app.url("/api/reviews/999"))
        .headers(app.admin().await)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(rating(&app, product_id).await, 4.0);
}
