use std::future::{ready, Ready};

use actix_web::dev::{Payload, ServiceRequest};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::warn;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{Claims, User};
use crate::AppState;

/// Mint a token bound to `user_id`. Every call issues a fresh token; old
/// ones stay valid since there is no revocation.
pub fn create_jwt(user_id: Uuid, secret: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id.to_string(),
        iat: chrono::Utc::now().timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Tokens carry no `exp`; a matching signature is the whole check.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
}

/// Bearer gate for the loan routes. Verifies the token, resolves its subject
/// to a stored user, and stashes the user in the request extensions for the
/// [`AuthedUser`] extractor. Any failure is a 401; a verified token whose
/// subject no longer resolves must not pass through as anonymous.
pub async fn validator(
    req: ServiceRequest,
    credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(credentials) = credentials else {
        return Err((ApiError::Unauthenticated.into(), req));
    };

    let state = match req.app_data::<web::Data<AppState>>() {
        Some(state) => state.clone(),
        None => {
            return Err((
                ApiError::Internal("application state missing".into()).into(),
                req,
            ))
        }
    };

    let claims = match validate_jwt(credentials.token(), &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(_) => return Err((ApiError::Unauthenticated.into(), req)),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return Err((ApiError::Unauthenticated.into(), req)),
    };

    match state.db.find_user_by_id(user_id).await {
        Some(user) => {
            req.extensions_mut().insert(user);
            Ok(req)
        }
        None => {
            warn!(%user_id, "valid token for unknown user");
            Err((ApiError::Unauthenticated.into(), req))
        }
    }
}

/// The authenticated user, as resolved by [`validator`].
pub struct AuthedUser(pub User);

impl FromRequest for AuthedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<User>()
                .cloned()
                .map(AuthedUser)
                .ok_or(ApiError::Unauthenticated),
        )
    }
}
