//! Index keys for stored URLs.

use sha2::{Digest, Sha256};

/// Compute the fixed-width index key for a URL.
///
/// The URL is hashed exactly as given, so two URLs differing only in case or
/// a trailing slash get different keys.
pub fn url_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        assert_eq!(url_key("evil.example/login"), url_key("evil.example/login"));
    }

    #[test]
    fn test_key_is_exact() {
        assert_ne!(url_key("evil.example/login"), url_key("evil.example/login/"));
        assert_ne!(url_key("evil.example/login"), url_key("EVIL.example/login"));
        assert_ne!(url_key("http://evil.example"), url_key("https://evil.example"));
    }

    #[test]
    fn test_key_format() {
        let key = url_key("evil.example");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
