use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::{respond, respond_message};
use crate::catalog::categories::{self, CategoryPayload};
use crate::catalog::Principal;

//ROUTERS
pub fn admin_category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/:id",
            put(update_category).delete(delete_category),
        )
        .layer(Extension(db))
}

//ROUTES
async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<Principal>,
    Json(payload): Json<CategoryPayload>,
) -> Response {
    respond(
        StatusCode::CREATED,
        categories::create_category(&db, &caller, payload).await,
    )
}

async fn update_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<Principal>,
    Json(payload): Json<CategoryPayload>,
) -> Response {
    respond(
        StatusCode::OK,
        categories::update_category(&db, &caller, id, payload).await,
    )
}

async fn delete_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<Principal>,
) -> Response {
    respond_message(
        categories::delete_category(&db, &caller, id).await,
        "Category marked as inactive",
    )
}
