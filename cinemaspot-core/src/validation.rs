use std::borrow::Cow;

use cinemaspot_shared::Masked;
use validator::{
    Validate, ValidateEmail, ValidationError, ValidationErrors, ValidationErrorsKind,
};

use crate::{CoreError, CoreResult};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Runs the derived validators and folds the first failure into a `CoreError`.
pub fn validate<T: Validate>(value: &T) -> CoreResult<()> {
    value
        .validate()
        .map_err(|errors| CoreError::Validation(describe(&errors)))
}

/// One human readable line for a set of validation errors, `field: message`.
/// Fields are visited in name order so the output is stable.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect(errors, None, &mut messages);
    messages.sort();
    messages
        .into_iter()
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    out.push(render(&path, error));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, Some(&format!("{}[{}]", path, index)), out);
                }
            }
        }
    }
}

fn render(path: &str, error: &ValidationError) -> String {
    let message = error
        .message
        .clone()
        .unwrap_or_else(|| Cow::Owned(format!("failed {} check", error.code)));
    if path == "__all__" {
        message.into_owned()
    } else {
        format!("{}: {}", path, message)
    }
}

pub fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(failure("blank", "must not be blank"));
    }
    Ok(())
}

pub fn password_rule(password: &Masked<String>) -> Result<(), ValidationError> {
    if password.expose().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(failure("password", "password too short"));
    }
    Ok(())
}

pub fn email_rule(email: &Masked<String>) -> Result<(), ValidationError> {
    if !email.expose().validate_email() {
        return Err(failure("email", "email is not valid"));
    }
    Ok(())
}

/// Emails are compared case-insensitively and stored lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
