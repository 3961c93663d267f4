use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::respond;
use crate::catalog::categories;

pub fn category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/:id", get(get_category))
        .layer(Extension(db))
}

async fn get_categories(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    respond(StatusCode::OK, categories::list_categories(&db).await)
}

async fn get_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    respond(StatusCode::OK, categories::get_category(&db, id).await)
}
