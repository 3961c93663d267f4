use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{auth_state, respond, respond_message};
use crate::catalog::products::{self, ProductPayload, ProductQuery};
use crate::catalog::reviews;
use crate::catalog::{PageRequest, Principal, ProductFilter};
use crate::middleware::auth::{auth_middleware, TokenKeys};

//ROUTERS
pub fn product_router(db: Arc<DatabaseConnection>, keys: Arc<TokenKeys>) -> Router {
    let guard = from_fn_with_state(auth_state(&db, &keys, None), auth_middleware);

    Router::new()
        .route(
            "/products",
            get(get_products).merge(post(create_product).route_layer(guard.clone())),
        )
        .route("/products/category/:id", get(get_products_by_category))
        .route(
            "/products/:id",
            get(get_product).merge(
                put(update_product)
                    .merge(delete(delete_product))
                    .route_layer(guard),
            ),
        )
        .route("/products/:id/reviews", get(get_product_reviews))
        .layer(Extension(db))
}

//ROUTES
async fn get_products(
    Query(params): Query<GetProductsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let query = params.into_query();
    respond(StatusCode::OK, products::list_products(&db, &query).await)
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    respond(StatusCode::OK, products::get_product(&db, id).await)
}

async fn get_products_by_category(
    Path(category_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    respond(
        StatusCode::OK,
        products::products_by_category(&db, category_id).await,
    )
}

async fn get_product_reviews(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    respond(StatusCode::OK, reviews::product_reviews(&db, id).await)
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<Principal>,
    Json(payload): Json<ProductPayload>,
) -> Response {
    respond(
        StatusCode::CREATED,
        products::create_product(&db, &caller, payload).await,
    )
}

async fn update_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<Principal>,
    Json(payload): Json<ProductPayload>,
) -> Response {
    respond(
        StatusCode::OK,
        products::update_product(&db, &caller, id, payload).await,
    )
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<Principal>,
) -> Response {
    respond_message(
        products::delete_product(&db, &caller, id).await,
        "Product marked as inactive",
    )
}

//Structs
#[derive(Deserialize)]
struct GetProductsQuery {
    page: Option<i64>,
    page_size: Option<i64>,
    category_id: Option<i32>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    in_stock: Option<bool>,
    seller_id: Option<i32>,
    search: Option<String>,
}

impl GetProductsQuery {
    fn into_query(self) -> ProductQuery {
        ProductQuery {
            filter: ProductFilter {
                category_id: self.category_id,
                min_price: self.min_price,
                max_price: self.max_price,
                in_stock: self.in_stock,
                seller_id: self.seller_id,
            },
            search: self.search,
            page: PageRequest::new(self.page, self.page_size),
        }
    }
}
