use sha2::{Digest, Sha256};

const RESET_TOKEN_PREFIX: &str = "reset_token:";
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

/// Key for a redeemed reset token. The jti is hashed so raw token material
/// never lands in Redis.
pub fn reset_token_key(jti: &str) -> String {
    format!("{}{:x}", RESET_TOKEN_PREFIX, Sha256::digest(jti.as_bytes()))
}

pub fn rate_limit_key(client: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_key_is_hashed_and_stable() {
        let key = reset_token_key("abc");
        assert!(key.starts_with(RESET_TOKEN_PREFIX));
        assert!(!key.contains("abc"));
        assert_eq!(key.len(), RESET_TOKEN_PREFIX.len() + 64);
        assert_eq!(key, reset_token_key("abc"));
    }
}
