use actix_web::{post, web, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::auth::create_jwt;
use crate::errors::ApiError;
use crate::models::{AuthResponse, User, UserResponse};
use crate::validate;
use crate::AppState;

#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    validate::register(&body)?;
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    // bcrypt is deliberately slow; this is the one intentional latency in
    // the pipeline.
    let password_hash =
        hash(password, DEFAULT_COST).map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = state
        .db
        .insert_user(User {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: Utc::now(),
        })
        .await?;

    let token = create_jwt(user.id, &state.config.jwt_secret)?;
    info!(user_id = %user.id, "user registered");

    Ok(HttpResponse::Created().json(AuthResponse {
        user: UserResponse::from(&user),
        token,
    }))
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    validate::login(&body)?;
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    // Unknown username and wrong password take the same exit so the
    // response never reveals which usernames exist.
    let user = state
        .db
        .find_user_by_username(username)
        .await
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify(password, &user.password_hash).unwrap_or(false) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_jwt(user.id, &state.config.jwt_secret)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: UserResponse::from(&user),
        token,
    }))
}
