//! Bearer-token authentication and the per-user source address check.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use opsboard_core::{BoardError, BoardResult};
use opsboard_domain::{access, User, UserId};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use super::error::ApiError;
use super::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, placed in request extensions by [`authenticate`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub fn issue_token(secret: &str, user_id: UserId, ttl: Duration) -> BoardResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| BoardError::Internal(format!("token signing failed: {}", e)))
}

pub fn verify_token(secret: &str, token: &str) -> BoardResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!(error = ?e, "rejected bearer token");
        BoardError::Unauthorized("Invalid or expired token".to_string())
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Source address of the request. With `trust_forwarded_for` the first
/// `X-Forwarded-For` entry wins over the socket peer.
pub fn client_ip(req: &Request, trust_forwarded_for: bool) -> Option<IpAddr> {
    if trust_forwarded_for {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| BoardError::Unauthorized("Missing bearer token".to_string()))?;
    let claims = verify_token(&state.config.jwt_secret, token)?;

    let user = state
        .workspace
        .read(|s| Ok(s.user(claims.sub).cloned()))
        .await?
        .ok_or_else(|| BoardError::Unauthorized("Unknown user".to_string()))?;

    let ip = client_ip(&req, state.config.trust_forwarded_for);
    if let Err(e) = access::check_source_ip(&user, ip) {
        tracing::warn!(
            user_id = %user.id,
            ip = ?ip,
            "request from address outside the user's allow-list"
        );
        return Err(e.into());
    }

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
