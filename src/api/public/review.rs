use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::{auth_state, respond, respond_message};
use crate::catalog::reviews::{self, ReviewPayload};
use crate::catalog::Principal;
use crate::middleware::auth::{auth_middleware, TokenKeys};

pub fn review_router(db: Arc<DatabaseConnection>, keys: Arc<TokenKeys>) -> Router {
    let guard = from_fn_with_state(auth_state(&db, &keys, None), auth_middleware);

    Router::new()
        .route(
            "/reviews",
            get(get_reviews).merge(post(create_review).route_layer(guard.clone())),
        )
        .route("/reviews/:id", delete(delete_review).route_layer(guard))
        .layer(Extension(db))
}

async fn get_reviews(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    respond(StatusCode::OK, reviews::list_reviews(&db).await)
}

async fn create_review(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<Principal>,
    Json(payload): Json<ReviewPayload>,
) -> Response {
    respond(
        StatusCode::CREATED,
        reviews::create_review(&db, &caller, payload).await,
    )
}

async fn delete_review(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<Principal>,
) -> Response {
    respond_message(
        reviews::delete_review(&db, &caller, id).await,
        "Review deleted",
    )
}
