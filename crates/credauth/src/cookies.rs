// Session cookie issuance with HMAC-SHA256 signed values.
//
// Cookie values are signed as `value.signature` where the signature is the
// base64-encoded HMAC-SHA256 of the value under the host secret. Verification
// uses constant-time comparison.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use credauth_core::error::{CoreError, Result};
use credauth_core::options::AuthOptions;

type HmacSha256 = Hmac<Sha256>;

/// SameSite cookie attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// Attributes for a single Set-Cookie header.
#[derive(Debug, Clone)]
pub struct CookieAttributes {
    pub value: String,
    /// None produces a browser-session cookie (no Max-Age).
    pub max_age: Option<i64>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            value: String::new(),
            max_age: None,
            path: Some("/".to_string()),
            secure: false,
            http_only: true,
            same_site: Some(SameSite::Lax),
        }
    }
}

/// Serialize a cookie name + attributes into a Set-Cookie header value.
pub fn serialize_cookie(name: &str, attrs: &CookieAttributes) -> String {
    let mut parts = vec![format!("{}={}", name, attrs.value)];
    if let Some(max_age) = attrs.max_age {
        parts.push(format!("Max-Age={max_age}"));
    }
    if let Some(path) = &attrs.path {
        parts.push(format!("Path={path}"));
    }
    if attrs.http_only {
        parts.push("HttpOnly".to_string());
    }
    if attrs.secure {
        parts.push("Secure".to_string());
    }
    if let Some(same_site) = attrs.same_site {
        parts.push(format!("SameSite={same_site}"));
    }
    parts.join("; ")
}

/// HMAC-SHA256 signature of a value, base64-encoded.
pub fn make_signature(value: &str, secret: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::Other(format!("HMAC init failed: {e}")))?;
    mac.update(value.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Create an HMAC-signed cookie value. Format: `value.signature`.
pub fn sign_cookie_value(value: &str, secret: &str) -> Result<String> {
    let signature = make_signature(value, secret)?;
    Ok(format!("{value}.{signature}"))
}

/// Verify and extract the value from a signed cookie.
///
/// Returns `None` if the signature doesn't match.
pub fn verify_signed_cookie(cookie_value: &str, secret: &str) -> Option<String> {
    // Signature follows the last dot
    let dot_pos = cookie_value.rfind('.')?;
    let (value, signature) = cookie_value.split_at(dot_pos);
    let signature = &signature[1..];

    let expected = make_signature(value, secret).ok()?;
    if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
        Some(value.to_string())
    } else {
        None
    }
}

/// Build the Set-Cookie header for a freshly issued session token.
///
/// A remembered session gets Max-Age matching the session TTL; with
/// `dont_remember` the cookie has no Max-Age and dies with the browser
/// session.
pub fn session_cookie_header(
    options: &AuthOptions,
    token: &str,
    dont_remember: bool,
) -> Result<String> {
    let signed = sign_cookie_value(token, &options.secret)?;
    let attrs = CookieAttributes {
        value: signed,
        max_age: if dont_remember {
            None
        } else {
            Some(options.session.expires_in as i64)
        },
        ..Default::default()
    };
    Ok(serialize_cookie(&options.session.cookie_name, &attrs))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-at-least-32-characters!!";

    #[test]
    fn sign_and_verify_roundtrip() {
        let signed = sign_cookie_value("session-token-abc", SECRET).unwrap();
        assert!(signed.starts_with("session-token-abc."));
        let value = verify_signed_cookie(&signed, SECRET).unwrap();
        assert_eq!(value, "session-token-abc");
    }

    #[test]
    fn tampered_value_fails_verification() {
        let signed = sign_cookie_value("session-token-abc", SECRET).unwrap();
        let tampered = signed.replacen("abc", "abd", 1);
        assert!(verify_signed_cookie(&tampered, SECRET).is_none());
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let signed = sign_cookie_value("session-token-abc", SECRET).unwrap();
        assert!(verify_signed_cookie(&signed, "other-secret").is_none());
    }

    #[test]
    fn remembered_session_has_max_age() {
        let options = AuthOptions::new(SECRET);
        let header = session_cookie_header(&options, "tok", false).unwrap();
        assert!(header.starts_with("credauth.session_token=tok."));
        assert!(header.contains("Max-Age=604800"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
    }

    #[test]
    fn dont_remember_omits_max_age() {
        let options = AuthOptions::new(SECRET);
        let header = session_cookie_header(&options, "tok", true).unwrap();
        assert!(!header.contains("Max-Age"));
    }
}
