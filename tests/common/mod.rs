#![allow(dead_code)]

use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use rust_catalog::entities::{seed_admin, setup_schema};
use rust_catalog::middleware::auth::TokenKeys;
use rust_catalog::{build_app, connect};

pub const ADMIN_EMAIL: &str = "admin@catalog.test";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub address: String,
    pub client: Client,
}

/// Boots the full router on an ephemeral port over a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    setup_schema(&db).await.expect("Failed to create schema");
    seed_admin(&db, ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("Failed to seed admin");

    let app = build_app(db, TokenKeys::new("integration-secret", 1));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });

    TestApp {
        address: format!("http://{addr}"),
        client: Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, email: &str, role: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/register"))
            .json(&json!({
                "email": email,
                "password": "password123",
                "role": role
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
        response
            .json::<Value>()
            .await
            .expect("Failed to parse response JSON")
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::OK);
        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse response JSON");
        body["token"]
            .as_str()
            .expect("Token missing from login response")
            .to_owned()
    }

    /// Registers `email` with `role` and returns a bearer header map.
    pub async fn sign_up(&self, email: &str, role: &str) -> header::HeaderMap {
        self.register(email, role).await;
        bearer(&self.login(email, "password123").await)
    }

    pub async fn admin(&self) -> header::HeaderMap {
        bearer(&self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await)
    }

    pub async fn create_category(&self, admin: &header::HeaderMap, name: &str) -> i64 {
        let response = self
            .client
            .post(self.url("/api/admin/categories"))
            .headers(admin.clone())
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse response JSON");
        body["id"].as_i64().expect("Category id missing")
    }

    pub async fn create_product(&self, seller: &header::HeaderMap, payload: Value) -> Value {
        let response = self
            .client
            .post(self.url("/api/products"))
            .headers(seller.clone())
            .json(&payload)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
        response
            .json::<Value>()
            .await
            .expect("Failed to parse response JSON")
    }

    pub async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse response JSON");
        (status, body)
    }
}

pub fn bearer(token: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token))
            .expect("Failed to insert header"),
    );
    headers
}

pub fn product_json(name: &str, category_id: i64, price: f64, stock: i32) -> Value {
    json!({
        "name": name,
        "description": format!("{name} for everyday use"),
        "price": price,
        "stock": stock,
        "category_id": category_id
    })
}
