use std::fmt;

use http::StatusCode;

/// Errors raised by token and origin checks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The crate was wired up incorrectly. Never retried.
    #[error("CSRF configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The supplied token was missing or did not match.
    #[error("Bad CSRF token: {0}")]
    BadCsrfToken(Violation),

    /// The declared origin was missing, insecure or untrusted.
    #[error("Bad CSRF origin: {0}")]
    BadCsrfOrigin(Violation),
}

impl Error {
    /// Returns the violation behind a rejected check, if this is one.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Error::BadCsrfToken(v) | Error::BadCsrfOrigin(v) => Some(v),
            Error::Config(_) => None,
        }
    }

    /// HTTP status a server should answer with.
    ///
    /// Rejections map to `403 Forbidden`; wiring mistakes are server errors.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadCsrfToken(_) | Error::BadCsrfOrigin(_) => StatusCode::FORBIDDEN,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Violation> for Error {
    fn from(v: Violation) -> Self {
        match v.kind {
            ViolationKind::BadToken => Error::BadCsrfToken(v),
            _ => Error::BadCsrfOrigin(v),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Misconfiguration detected at check time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No policy was handed to the request context.
    #[error("no CSRF policy is configured for this request")]
    NoPolicy,

    /// A session-backed policy is active but the request carries no session.
    #[error("SessionCsrf requires a session, but none is attached to the request")]
    NoSession,

    /// Settings could not be loaded.
    #[error("invalid CSRF settings: {0}")]
    Settings(String),
}

/// A failed check with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The kind of violation that occurred
    pub kind: ViolationKind,
    /// Human-readable message explaining the violation
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Violation {}

/// Why a check rejected the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Supplied token missing or different from the expected one
    BadToken,
    /// Neither `Origin` nor `Referer` was sent
    NoOrigin,
    /// The declared origin is plaintext while the request is encrypted
    InsecureReferer,
    /// The declared origin is not in the trusted set
    UntrustedOrigin,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::BadToken => write!(f, "bad token"),
            ViolationKind::NoOrigin => write!(f, "no origin"),
            ViolationKind::InsecureReferer => write!(f, "insecure referer"),
            ViolationKind::UntrustedOrigin => write!(f, "untrusted origin"),
        }
    }
}

/// What a check does when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    /// Return an [`Error`]
    #[default]
    Raise,
    /// Return `Ok(false)`
    Return,
}

impl OnFailure {
    /// Converts a violation into the outcome this mode asks for.
    pub(crate) fn fail(self, violation: Violation) -> Result<bool> {
        match self {
            OnFailure::Raise => Err(violation.into()),
            OnFailure::Return => Ok(false),
        }
    }
}

impl From<bool> for OnFailure {
    fn from(raises: bool) -> Self {
        if raises {
            OnFailure::Raise
        } else {
            OnFailure::Return
        }
    }
}
