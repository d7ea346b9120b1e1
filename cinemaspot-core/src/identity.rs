use chrono::{DateTime, Utc};
use cinemaspot_shared::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{email_rule, not_blank, password_rule};

pub const ADMIN_ROLE: &str = "ADMIN";
pub const USER_ROLE: &str = "USER";

// ============================================================================
// Roles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoleInput {
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub name: String,
    pub description: Option<String>,
}

impl RoleInput {
    /// Role names are stored uppercase, as in `ADMIN`.
    pub fn normalized_name(&self) -> String {
        self.name.trim().to_uppercase()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignRole {
    pub user_id: Uuid,
    #[validate(custom(function = "not_blank"))]
    pub role: String,
}

// ============================================================================
// Users
// ============================================================================

/// User row including the password hash. Never serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: Masked<String>,
}

/// Public user representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub email_validated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Fields written when a user row is inserted. `role` is a role name.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub email_validated: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(custom(function = "email_rule"))]
    pub email: Masked<String>,
    #[validate(custom(function = "password_rule"))]
    pub password: Masked<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(custom(function = "email_rule"))]
    pub email: Masked<String>,
    #[validate(custom(function = "password_rule"))]
    pub password: Masked<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPassword {
    #[validate(custom(function = "email_rule"))]
    pub email: Masked<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPassword {
    #[validate(custom(function = "password_rule"))]
    pub password: Masked<String>,
}

/// Admin-side user creation; `role` defaults to `USER`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(custom(function = "email_rule"))]
    pub email: Masked<String>,
    #[validate(custom(function = "password_rule"))]
    pub password: Masked<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub email_validated: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(custom(function = "not_blank"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "email_rule"))]
    pub email: Option<Masked<String>>,
    pub email_validated: Option<bool>,
}

impl UpdateUser {
    pub fn apply(self, user: User) -> User {
        User {
            first_name: self.first_name.unwrap_or(user.first_name),
            last_name: self.last_name.unwrap_or(user.last_name),
            email: self
                .email
                .map(|e| crate::validation::normalize_email(e.expose()))
                .unwrap_or(user.email),
            email_validated: self.email_validated.unwrap_or(user.email_validated),
            ..user
        }
    }
}

/// Body returned by login and register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}
