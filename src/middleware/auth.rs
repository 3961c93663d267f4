use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use thiserror::Error;

use crate::api::error_body;
use crate::catalog::{ErrorKind, Principal};
use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::logging::{to_response, ApiError};

/// Resolves the bearer token into a [`Principal`] request extension.
///
/// With `role` set, the caller must also hold exactly that role.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return reject(AuthMiddlewareError::MissingToken),
    };

    let principal = match validate_token(&state.db, &state.keys, token).await {
        Ok(principal) => principal,
        Err(err) => return reject(err),
    };

    if let Some(required) = state.role {
        if principal.role != required {
            return reject(AuthMiddlewareError::WrongRole(required));
        }
    }

    req.extensions_mut().insert(principal);
    next.run(req).await
}

/// Failure kind for requests without a valid identity.
pub const UNAUTHORIZED_KIND: &str = "unauthorized";

fn reject(err: AuthMiddlewareError) -> Response {
    let (status, kind) = match err {
        AuthMiddlewareError::WrongRole(_) => {
            (StatusCode::FORBIDDEN, ErrorKind::ForbiddenRole.to_string())
        }
        AuthMiddlewareError::InternalServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::StoreUnavailable.to_string(),
        ),
        _ => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_KIND.to_string()),
    };
    to_response(
        (status, error_body(kind, &err.to_string())),
        Err(ApiError::Unauthorized(err.to_string())),
    )
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: String,
    pub exp: usize,
}

/// Signing secret and token lifetime.
#[derive(Clone, Debug)]
pub struct TokenKeys {
    pub secret: String,
    pub ttl_hours: i64,
}

impl TokenKeys {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub keys: Arc<TokenKeys>,
    pub role: Option<Role>,
}

pub fn generate_token(keys: &TokenKeys, user_id: i32, role: Role) -> Result<String, AuthMiddlewareError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(keys.ttl_hours))
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims {
        user_id,
        role: role.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(keys.secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

/// Checks the signature and expiry, then that the user still exists, is
/// active and still holds the role the token was issued for.
pub async fn validate_token(
    db: &DatabaseConnection,
    keys: &TokenKeys,
    token: &str,
) -> Result<Principal, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(keys.secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::TokenExpired)?
    .claims;

    let role = Role::from_str(&claims.role).map_err(|_| AuthMiddlewareError::ValidationFail)?;

    match UserEntity::find_by_id(claims.user_id)
        .filter(user::Column::Role.eq(role))
        .filter(user::Column::IsActive.eq(true))
        .one(db)
        .await
    {
        Ok(Some(_)) => Ok(Principal::new(claims.user_id, role)),
        Ok(None) => Err(AuthMiddlewareError::InvalidUserOrRole),
        Err(_) => Err(AuthMiddlewareError::InternalServerError),
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid user id or role")]
    InvalidUserOrRole,
    #[error("Token expired")]
    TokenExpired,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Requires the {0} role")]
    WrongRole(Role),
    #[error("Internal server error")]
    InternalServerError,
}
