use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use cinemaspot_core::identity::User;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims of the token returned by login and register.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    ValidateEmail,
    ResetPassword,
}

/// Claims of the single-purpose tokens mailed to users.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmailClaims {
    pub email: String,
    pub purpose: TokenPurpose,
    pub exp: usize,
}

fn expiry(hours: i64) -> usize {
    (Utc::now() + Duration::hours(hours)).timestamp() as usize
}

fn sign<T: Serialize>(auth: &AuthConfig, claims: &T) -> Result<String, AppError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

pub fn issue_session_token(auth: &AuthConfig, user_id: Uuid) -> Result<String, AppError> {
    sign(auth, &SessionClaims { sub: user_id, exp: expiry(auth.session_hours) })
}

pub fn issue_email_token(
    auth: &AuthConfig,
    email: &str,
    purpose: TokenPurpose,
) -> Result<String, AppError> {
    let hours = match purpose {
        TokenPurpose::ValidateEmail => auth.email_hours,
        TokenPurpose::ResetPassword => auth.reset_hours,
    };
    sign(auth, &EmailClaims { email: email.to_string(), purpose, exp: expiry(hours) })
}

pub fn verify_session_token(auth: &AuthConfig, token: &str) -> Result<SessionClaims, AppError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::AuthenticationError("Invalid token".into()))
}

/// Returns the email the token was issued for.
pub fn verify_email_token(
    auth: &AuthConfig,
    token: &str,
    purpose: TokenPurpose,
) -> Result<String, AppError> {
    let claims = decode::<EmailClaims>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::AuthenticationError("Invalid token".into()))?;

    if claims.purpose != purpose {
        return Err(AppError::AuthenticationError("Invalid token".into()));
    }
    Ok(claims.email)
}

// ============================================================================
// Request authentication
// ============================================================================

/// Resolves the bearer token on the request to a stored user.
pub async fn authenticate(parts: &mut Parts, state: &AppState) -> Result<User, AppError> {
    // 1. Extract token from Authorization header
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    AppError::AuthenticationError("No token provided".into())
                } else {
                    AppError::AuthenticationError("Invalid bearer token".into())
                }
            })?;

    // 2. Decode and validate JWT
    let claims = verify_session_token(&state.auth, bearer.token())?;

    // 3. The account must still exist
    state
        .users
        .find(claims.sub)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("User not found".into()))
}

/// Authenticated caller. Reuses the user resolved by `require_admin` when
/// the route is behind it.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(current) = parts.extensions.get::<CurrentUser>() {
            return Ok(current.clone());
        }
        let user = authenticate(parts, state).await?;
        parts.extensions.insert(CurrentUser(user.clone()));
        Ok(CurrentUser(user))
    }
}

impl CurrentUser {
    /// Admins may act on any account, everyone else only on their own.
    pub fn ensure_self_or_admin(&self, owner: Uuid) -> Result<(), AppError> {
        if self.0.is_admin() || self.0.id == owner {
            Ok(())
        } else {
            Err(AppError::AuthorizationError("Access denied".into()))
        }
    }
}

// ============================================================================
// Admin Authentication Middleware
// ============================================================================

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    // 1. Authenticate
    let user = authenticate(&mut parts, &state).await?;

    // 2. Check role is ADMIN
    if !user.is_admin() {
        return Err(AppError::AuthorizationError("User is not an admin".into()));
    }

    // 3. Inject the user for handlers
    parts.extensions.insert(CurrentUser(user));

    Ok(next.run(Request::from_parts(parts, body)).await)
}
