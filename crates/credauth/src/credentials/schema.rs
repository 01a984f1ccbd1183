// Input validation for the sign-in request body.
//
// Validation runs before anything else in the flow and has no side effects.
// Error messages name the offending field but never echo submitted values.

use serde_json::Value;

/// A field-level validation failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Pluggable request-body schema.
///
/// The concrete validator is selected at plugin-construction time. `parse`
/// returns the validated body as a JSON object; the flow reads `email`,
/// `password`, and `rememberMe` from it when present.
pub trait InputSchema: Send + Sync {
    fn parse(&self, body: &Value) -> Result<Value, ValidationError>;
}

/// Default schema: `{email, password, rememberMe?}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCredentialsSchema;

impl InputSchema for DefaultCredentialsSchema {
    fn parse(&self, body: &Value) -> Result<Value, ValidationError> {
        let obj = body
            .as_object()
            .ok_or_else(|| ValidationError::new("body", "expected a JSON object"))?;

        let email = require_string(obj, "email")?;
        if !is_valid_email(email) {
            return Err(ValidationError::new("email", "invalid email address"));
        }
        let password = require_string(obj, "password")?;

        let mut parsed = serde_json::Map::new();
        parsed.insert("email".to_string(), Value::String(email.to_string()));
        parsed.insert("password".to_string(), Value::String(password.to_string()));
        if let Some(remember) = obj.get("rememberMe") {
            match remember {
                Value::Bool(b) => {
                    parsed.insert("rememberMe".to_string(), Value::Bool(*b));
                }
                Value::Null => {}
                _ => return Err(ValidationError::new("rememberMe", "expected a boolean")),
            }
        }
        Ok(Value::Object(parsed))
    }
}

pub(crate) fn require_string<'a>(
    obj: &'a serde_json::Map<String, Value>,
    field: &str,
) -> Result<&'a str, ValidationError> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) => Err(ValidationError::new(field, "must not be empty")),
        Some(_) => Err(ValidationError::new(field, "expected a string")),
        None => Err(ValidationError::new(field, "is required")),
    }
}

/// Minimal structural email check: one `@`, non-empty local part, domain
/// with at least one dot, no whitespace.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_body() {
        let parsed = DefaultCredentialsSchema
            .parse(&serde_json::json!({
                "email": "a@x.com", "password": "pw", "rememberMe": false,
            }))
            .unwrap();
        assert_eq!(parsed["email"], "a@x.com");
        assert_eq!(parsed["rememberMe"], false);
    }

    #[test]
    fn remember_me_optional() {
        let parsed = DefaultCredentialsSchema
            .parse(&serde_json::json!({"email": "a@x.com", "password": "pw"}))
            .unwrap();
        assert!(parsed.get("rememberMe").is_none());
    }

    #[test]
    fn rejects_missing_and_empty_fields() {
        let missing = DefaultCredentialsSchema
            .parse(&serde_json::json!({"email": "a@x.com"}))
            .unwrap_err();
        assert_eq!(missing.field, "password");

        let empty = DefaultCredentialsSchema
            .parse(&serde_json::json!({"email": "a@x.com", "password": ""}))
            .unwrap_err();
        assert_eq!(empty.field, "password");
    }

    #[test]
    fn rejects_bad_email() {
        for email in ["", "no-at-sign", "@x.com", "a@", "a@nodot", "a b@x.com", "a@.com"] {
            let err = DefaultCredentialsSchema
                .parse(&serde_json::json!({"email": email, "password": "pw"}))
                .unwrap_err();
            assert_eq!(err.field, "email", "email {email:?} should be rejected");
        }
    }

    #[test]
    fn rejects_non_boolean_remember_me() {
        let err = DefaultCredentialsSchema
            .parse(&serde_json::json!({
                "email": "a@x.com", "password": "pw", "rememberMe": "yes",
            }))
            .unwrap_err();
        assert_eq!(err.field, "rememberMe");
    }

    #[test]
    fn error_message_never_echoes_values() {
        let err = DefaultCredentialsSchema
            .parse(&serde_json::json!({"email": "hunter2@", "password": "hunter2"}))
            .unwrap_err();
        assert!(!err.to_string().contains("hunter2"));
    }
}
