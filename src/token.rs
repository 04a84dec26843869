use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;

/// Number of random bytes in a generated token (256 bits).
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Fewest random bytes a generated token may carry (128 bits).
pub const MIN_TOKEN_BYTES: usize = 16;

/// An opaque anti-forgery token.
///
/// Tokens are never parsed, only compared byte for byte through
/// [`CsrfToken::matches`]. `Debug` output is redacted so tokens do not end up
/// in logs by accident; `Display` yields the raw value for embedding in forms
/// and cookies.
///
/// # Examples
///
/// ```
/// use csrf_core::CsrfToken;
///
/// let token = CsrfToken::generate();
/// assert!(token.as_str().len() >= 43);
/// assert_eq!(format!("{:?}", token), "CsrfToken(\"***\")");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Generates a fresh token from the operating system's CSPRNG.
    pub fn generate() -> Self {
        Self::generate_with_len(DEFAULT_TOKEN_BYTES)
    }

    /// Generates a token from `len` random bytes, URL-safe base64 encoded.
    ///
    /// `len` is raised to [`MIN_TOKEN_BYTES`] when smaller.
    pub fn generate_with_len(len: usize) -> Self {
        let mut bytes = vec![0u8; len.max(MIN_TOKEN_BYTES)];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(&bytes))
    }

    /// Wraps an existing token value, e.g. one read from a cookie or session.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Compares against a supplied value in constant time.
    pub fn matches(&self, supplied: &str) -> bool {
        constant_time_eq(self.as_str(), supplied)
    }
}

/// Compares two strings without short-circuiting on the first differing byte.
///
/// Only the lengths influence timing. Unequal lengths return `false`.
pub fn constant_time_eq(expected: &str, supplied: &str) -> bool {
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"***").finish()
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CsrfToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for CsrfToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl AsRef<str> for CsrfToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
