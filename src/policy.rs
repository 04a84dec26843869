//! Token policies: where the expected token lives.
//!
//! This module provides:
//! - `CsrfPolicy`: the two-operation capability every policy implements
//! - `SessionCsrf`: tokens kept by the session facility
//! - `CookieCsrf`: tokens kept in a cookie readable by client-side script
//!
//! Exactly one policy is active per application. It is chosen at startup
//! (see [`CsrfSettings::build_policy`](crate::CsrfSettings::build_policy)) and
//! handed to each [`RequestContext`].

mod cookie;
mod session;

pub use cookie::{CookieCsrf, CookieCsrfConfig, DEFAULT_COOKIE_NAME};
pub use session::SessionCsrf;

use crate::context::RequestContext;
use crate::error::Result;
use crate::token::CsrfToken;

/// A strategy for issuing and retrieving the expected CSRF token.
///
/// Implementations hold no per-request state; anything that must persist
/// across the request goes through the [`RequestContext`]. They are shared
/// between concurrently handled requests, hence `Send + Sync`.
///
/// # Contract
///
/// - `new_token` followed by `get_token` on the same context returns the
///   value `new_token` produced.
/// - Two `get_token` calls without a `new_token` in between agree.
pub trait CsrfPolicy: Send + Sync {
    /// Returns the current token, creating one if none exists yet.
    fn get_token(&self, ctx: &mut RequestContext<'_>) -> Result<CsrfToken>;

    /// Creates and persists a fresh token, invalidating the previous one.
    fn new_token(&self, ctx: &mut RequestContext<'_>) -> Result<CsrfToken>;
}
