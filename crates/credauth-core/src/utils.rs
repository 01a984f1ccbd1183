// Id and token generation helpers.

use rand::Rng;

/// Character set for session tokens: a-z, A-Z, 0-9, -, _
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-_";

/// Generate a nanoid-based record id (21 characters).
pub fn generate_id() -> String {
    nanoid::nanoid!()
}

/// Generate a random session token of the given length.
pub fn generate_random_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_CHARSET.len());
            TOKEN_CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_length_and_uniqueness() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), 21);
        assert_ne!(a, b);
    }

    #[test]
    fn token_charset() {
        let token = generate_random_string(256);
        assert_eq!(token.len(), 256);
        for c in token.chars() {
            assert!(c.is_ascii_alphanumeric() || c == '-' || c == '_');
        }
    }
}
