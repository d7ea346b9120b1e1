use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use cinemaspot_core::email::{password_reset_email, validation_email};
use cinemaspot_core::identity::{
    ForgotPassword, LoginUser, NewUser, RegisterUser, ResetPassword, Session, User, USER_ROLE,
};
use cinemaspot_core::password::{hash_password, verify_password};
use cinemaspot_core::validation::{normalize_email, validate};
use cinemaspot_shared::pii::redact_email;
use serde::Serialize;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::auth::{
    issue_email_token, issue_session_token, verify_email_token, CurrentUser, TokenPurpose,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self { message: message.into() })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/validate-email/{token}", get(validate_email))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", get(reset_password_form).post(reset_password))
        .route("/reset-password-success", get(reset_password_success))
        .route("/me", get(me))
}

// bcrypt is CPU bound; keep it off the async workers.
pub(crate) async fn hash_blocking(plain: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

async fn verify_blocking(plain: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(|e| AppError::InternalServerError(format!("verify task failed: {}", e)))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginUser>,
) -> Result<Json<Session>, AppError> {
    validate(&req)?;
    let email = normalize_email(req.email.expose());

    let record = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("User not found".into()))?;

    let matches = verify_blocking(
        req.password.into_inner(),
        record.password_hash.into_inner(),
    )
    .await?;
    if !matches {
        tracing::info!(email = %redact_email(&email), "Rejected login");
        return Err(AppError::AuthenticationError("Invalid email or password".into()));
    }

    let token = issue_session_token(&state.auth, record.user.id)?;
    Ok(Json(Session { user: record.user, token }))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterUser>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    validate(&req)?;
    let email = normalize_email(req.email.expose());

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::ConflictError("User already exists".into()));
    }

    let password_hash = hash_blocking(req.password.into_inner()).await?;
    let user = state
        .users
        .create(&NewUser {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            email: email.clone(),
            password_hash,
            role: USER_ROLE.to_string(),
            email_validated: false,
        })
        .await?;

    let email_token = issue_email_token(&state.auth, &email, TokenPurpose::ValidateEmail)?;
    let link = format!("{}/api/auth/validate-email/{}", state.app_url, email_token);
    state.email.send(&validation_email(&link, &email)).await?;
    tracing::info!(user_id = %user.id, email = %redact_email(&email), "User registered");

    let token = issue_session_token(&state.auth, user.id)?;
    Ok((StatusCode::CREATED, Json(Session { user, token })))
}

/// GET /api/auth/validate-email/{token}
async fn validate_email(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = verify_email_token(&state.auth, &token, TokenPurpose::ValidateEmail)?;
    state.users.mark_email_validated(&email).await?;
    tracing::info!(email = %redact_email(&email), "Email validated");
    Ok(MessageResponse::new("Email validated"))
}

/// POST /api/auth/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ForgotPassword>,
) -> Result<Json<MessageResponse>, AppError> {
    validate(&req)?;
    let email = normalize_email(req.email.expose());

    if state.users.find_by_email(&email).await?.is_none() {
        return Err(AppError::NotFoundError("User not found".into()));
    }

    let token = issue_email_token(&state.auth, &email, TokenPurpose::ResetPassword)?;
    let link = format!("{}/api/auth/reset-password/{}", state.app_url, token);
    state.email.send(&password_reset_email(&link, &email)).await?;

    Ok(MessageResponse::new("Password reset email sent"))
}

/// GET /api/auth/reset-password/{token}
async fn reset_password_form(ApiPath(token): ApiPath<String>) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Reset password</title></head>
<body style="font-family: Arial, sans-serif;">
  <h1>Choose a new password</h1>
  <form id="reset-form">
    <input type="password" id="password" name="password" minlength="6" required placeholder="New password">
    <button type="submit">Reset password</button>
  </form>
  <p id="error" style="color: #b00020;"></p>
  <script>
    document.getElementById("reset-form").addEventListener("submit", async (event) => {{
      event.preventDefault();
      const response = await fetch("/api/auth/reset-password/{token}", {{
        method: "POST",
        headers: {{ "Content-Type": "application/json" }},
        body: JSON.stringify({{ password: document.getElementById("password").value }})
      }});
      if (response.ok) {{
        window.location.href = "/api/auth/reset-password-success";
      }} else {{
        const body = await response.json();
        document.getElementById("error").textContent = body.error;
      }}
    }});
  </script>
</body>
</html>"#
    ))
}

/// POST /api/auth/reset-password/{token}
async fn reset_password(
    State(state): State<AppState>,
    ApiPath(token): ApiPath<String>,
    ApiJson(req): ApiJson<ResetPassword>,
) -> Result<Json<MessageResponse>, AppError> {
    validate(&req)?;
    let email = verify_email_token(&state.auth, &token, TokenPurpose::ResetPassword)?;

    let password_hash = hash_blocking(req.password.into_inner()).await?;
    state.users.update_password(&email, &password_hash).await?;
    tracing::info!(email = %redact_email(&email), "Password reset");

    Ok(MessageResponse::new("Password updated"))
}

/// GET /api/auth/reset-password-success
async fn reset_password_success() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Password updated</title></head>
<body style="font-family: Arial, sans-serif;">
  <h1>Your password has been updated</h1>
  <p>You can now sign in to CinemaSpot with your new password.</p>
</body>
</html>"#,
    )
}

/// GET /api/auth/me
async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
