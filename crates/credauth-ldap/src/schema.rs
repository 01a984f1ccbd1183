// Request body schema for the LDAP sign-in endpoint:
// `{username, password, rememberMe?}`.

use std::sync::Arc;

use serde_json::Value;

use credauth::credentials::{InputSchema, ValidationError};

/// Pluggable username check. Returns false to reject.
pub type UsernameValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Default username rule: 3–32 characters from `[A-Za-z0-9_-]`.
pub fn default_username_validator(username: &str) -> bool {
    (3..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub struct LdapSignInSchema {
    validator: UsernameValidator,
}

impl LdapSignInSchema {
    pub fn new(validator: UsernameValidator) -> Self {
        Self { validator }
    }
}

impl Default for LdapSignInSchema {
    fn default() -> Self {
        Self::new(Arc::new(default_username_validator))
    }
}

impl std::fmt::Debug for LdapSignInSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapSignInSchema").finish()
    }
}

impl InputSchema for LdapSignInSchema {
    fn parse(&self, body: &Value) -> Result<Value, ValidationError> {
        let obj = body
            .as_object()
            .ok_or_else(|| ValidationError::new("body", "expected a JSON object"))?;

        let username = match obj.get("username") {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::String(_)) => {
                return Err(ValidationError::new("username", "must not be empty"));
            }
            Some(_) => return Err(ValidationError::new("username", "expected a string")),
            None => return Err(ValidationError::new("username", "is required")),
        };
        if !(self.validator)(username) {
            return Err(ValidationError::new("username", "invalid username"));
        }

        let password = match obj.get("password") {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::String(_)) => {
                return Err(ValidationError::new("password", "must not be empty"));
            }
            Some(_) => return Err(ValidationError::new("password", "expected a string")),
            None => return Err(ValidationError::new("password", "is required")),
        };

        let mut parsed = serde_json::Map::new();
        parsed.insert("username".to_string(), Value::String(username.clone()));
        parsed.insert("password".to_string(), Value::String(password.clone()));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validator_rules() {
        assert!(default_username_validator("jdoe"));
        assert!(default_username_validator("j_doe-42"));
        assert!(!default_username_validator("jd"));
        assert!(!default_username_validator(&"x".repeat(33)));
        assert!(!default_username_validator("j doe"));
        assert!(!default_username_validator("jdoe)(uid=*"));
    }

    #[test]
    fn parses_valid_body() {
        let parsed = LdapSignInSchema::default()
            .parse(&serde_json::json!({
                "username": "jdoe", "password": "pw", "rememberMe": true,
            }))
            .unwrap();
        assert_eq!(parsed["username"], "jdoe");
        assert_eq!(parsed["rememberMe"], true);
        assert!(parsed.get("email").is_none());
    }

    #[test]
    fn rejects_invalid_username() {
        let err = LdapSignInSchema::default()
            .parse(&serde_json::json!({"username": "a b", "password": "pw"}))
            .unwrap_err();
        assert_eq!(err.field, "username");
        // submitted value never echoed back
        assert!(!err.to_string().contains("a b"));
    }

    #[test]
    fn custom_validator_is_honored() {
        let schema = LdapSignInSchema::new(Arc::new(|u: &str| u.starts_with("emp-")));
        assert!(schema
            .parse(&serde_json::json!({"username": "emp-1", "password": "pw"}))
            .is_ok());
        assert!(schema
            .parse(&serde_json::json!({"username": "jdoe", "password": "pw"}))
            .is_err());
    }
}
