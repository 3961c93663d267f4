use axum::{extract::Extension, http::StatusCode, response::Response, routing::post, Json, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{fmt, str::FromStr, sync::Arc};
use tracing::info;
use validator::Validate;

use crate::api::error_body;
use crate::catalog::ErrorKind;
use crate::entities::hash_password;
use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::auth::{generate_token, TokenKeys, UNAUTHORIZED_KIND};
use crate::middleware::logging::{to_response, ApiError};

static SELF_SERVICE_ROLE: Lazy<Regex> = Lazy::new(|| Regex::new("^(buyer|seller)$").unwrap());

pub fn auth_router(db: Arc<DatabaseConnection>, keys: Arc<TokenKeys>) -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .layer(Extension(db))
        .layer(Extension(keys))
}

async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateUser>,
) -> Response {
    if let Err(err) = payload.validate() {
        return failure(
            StatusCode::BAD_REQUEST,
            ErrorKind::InvalidInput,
            err.to_string(),
            ApiError::ValidationFail(err.to_string()),
        );
    }

    match UserEntity::find()
        .filter(user::Column::Email.eq(payload.email.as_str()))
        .one(&*db)
        .await
    {
        Ok(Some(_)) => return email_taken(&payload.email),
        Ok(None) => {}
        Err(err) => return internal(ApiError::DbError(err.to_string())),
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(err) => return internal(ApiError::PasswordHashFailed(err.to_string())),
    };
    // The regex above only admits the self-service roles.
    let role = Role::from_str(&payload.role).unwrap_or(Role::Buyer);

    let new_user = user::ActiveModel {
        email: Set(payload.email.clone()),
        password: Set(password_hash),
        role: Set(role),
        is_active: Set(true),
        ..Default::default()
    };

    match new_user.insert(&*db).await {
        Ok(created) => {
            info!(user_id = created.id, role = %created.role, "Registered user");
            to_response((StatusCode::CREATED, Json(UserResponse::new(created))), Ok(()))
        }
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => email_taken(&payload.email),
            _ => internal(ApiError::DbError(err.to_string())),
        },
    }
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(keys): Extension<Arc<TokenKeys>>,
    Json(payload): Json<LoginUser>,
) -> Response {
    let found = UserEntity::find()
        .filter(user::Column::Email.eq(payload.email.as_str()))
        .filter(user::Column::IsActive.eq(true))
        .one(&*db)
        .await;

    let account = match found {
        Ok(Some(account)) => account,
        Ok(None) => return bad_credentials(),
        Err(err) => return internal(ApiError::DbError(err.to_string())),
    };

    if account.check_hash(&payload.password).is_err() {
        return bad_credentials();
    }

    match generate_token(&keys, account.id, account.role) {
        Ok(token) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "token": token,
                    "token_type": "bearer"
                })),
            ),
            Ok(()),
        ),
        Err(err) => internal(ApiError::TokenGenerationFailed(err.to_string())),
    }
}

fn failure(status: StatusCode, kind: impl fmt::Display, message: String, ext: ApiError) -> Response {
    to_response((status, error_body(kind, &message)), Err(ext))
}

fn internal(ext: ApiError) -> Response {
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::StoreUnavailable,
        "Internal server error".to_string(),
        ext,
    )
}

fn email_taken(email: &str) -> Response {
    let message = format!("Email {email} is already registered");
    failure(
        StatusCode::CONFLICT,
        "email_taken",
        message.clone(),
        ApiError::Conflict(message),
    )
}

fn bad_credentials() -> Response {
    let message = "Incorrect email or password".to_string();
    failure(
        StatusCode::UNAUTHORIZED,
        UNAUTHORIZED_KIND,
        message.clone(),
        ApiError::Unauthorized(message),
    )
}

//Structs
fn default_role() -> String {
    "buyer".to_string()
}

#[derive(Deserialize, Clone, Debug, Validate)]
struct CreateUser {
    #[validate(email(message = "email must be a valid address"))]
    email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    password: String,
    #[serde(default = "default_role")]
    #[validate(regex(path = *SELF_SERVICE_ROLE, message = "role must be 'buyer' or 'seller'"))]
    role: String,
}

#[derive(Deserialize)]
struct LoginUser {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct UserResponse {
    id: i32,
    email: String,
    role: Role,
    is_active: bool,
}

impl UserResponse {
    fn new(value: user::Model) -> UserResponse {
        UserResponse {
            id: value.id,
            email: value.email,
            role: value.role,
            is_active: value.is_active,
        }
    }
}
