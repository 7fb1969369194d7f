use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::AppState;

/// HS256 token claims; `sub` is the username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| Error::Unauthorized(format!("invalid token: {}", e)))
}

pub fn issue_token(username: &str, secret: &str, ttl: chrono::Duration) -> Result<String> {
    let exp = (chrono::Utc::now() + ttl).timestamp();
    let claims = Claims {
        sub: username.to_string(),
        exp: usize::try_from(exp).map_err(|_| Error::Internal("token expiry overflow".to_string()))?,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))
}

fn bearer_token(req: &Request) -> Result<&str> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthorized("missing authorization header".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| Error::Unauthorized("bad authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("unsupported authorization scheme".to_string()))
}

/// Verifies the bearer token and puts the requester's `UserProfile` into the
/// request extensions.
pub async fn require_bearer_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let claims = match bearer_token(&req).and_then(|token| decode_token(token, &state.jwt_secret)) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    let profile = match state.user_service.get_profile(&claims.sub).await {
        Ok(profile) => profile,
        Err(Error::NotFound(_)) => {
            return Error::Unauthorized("unknown user".to_string()).into_response()
        }
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(profile);
    next.run(req).await
}
