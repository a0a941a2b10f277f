//! Refresh token caching using system keyring

use keyring::Entry;

use super::error::AuthError;

/// Service name for keyring storage
const SERVICE_NAME: &str = "lectern";
/// Entry name for the refresh token
const REFRESH_TOKEN_ENTRY: &str = "firebase-refresh-token";

/// Keeps the identity provider's refresh token between runs
pub struct CredentialCache;

impl CredentialCache {
    fn entry() -> Result<Entry, AuthError> {
        Entry::new(SERVICE_NAME, REFRESH_TOKEN_ENTRY).map_err(|e| AuthError::KeyringError(e.to_string()))
    }

    /// Get the cached refresh token
    pub fn refresh_token() -> Result<String, AuthError> {
        Self::entry()?.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => AuthError::NoCachedSession,
            _ => AuthError::KeyringError(e.to_string()),
        })
    }

    /// Store a refresh token, replacing any earlier one
    pub fn store_refresh_token(token: &str) -> Result<(), AuthError> {
        Self::entry()?.set_password(token).map_err(|e| AuthError::KeyringError(e.to_string()))
    }

    /// Forget the cached refresh token. Succeeds if none was cached.
    pub fn clear() -> Result<(), AuthError> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AuthError::KeyringError(e.to_string())),
        }
    }
}

/// Mask a token for display (show first 8 and last 4 chars)
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 || !token.is_ascii() {
        return "*".repeat(token.chars().count());
    }
    let prefix = &token[..8];
    let suffix = &token[token.len() - 4..];
    format!("{}...{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_long_token() {
        let masked = mask_token("eyJhbGciOiJSUzI1NiIsImtpZCI6IjEifQ.payload.sig-wxyz");
        assert!(masked.starts_with("eyJhbGci"));
        assert!(masked.ends_with("wxyz"));
        assert!(masked.contains("..."));
    }

    #[test]
    fn mask_short_token_entirely() {
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token(""), "");
    }
}
