use crate::context::RequestContext;
use crate::error::Result;
use crate::token::CsrfToken;

use super::CsrfPolicy;

/// Keeps the token in the session.
///
/// Both operations are forwarded to the request's
/// [`CsrfSession`](crate::CsrfSession). A context without a session fails
/// with [`ConfigError::NoSession`](crate::ConfigError::NoSession).
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCsrf;

impl SessionCsrf {
    /// Creates the session-backed policy.
    pub fn new() -> Self {
        Self
    }
}

impl CsrfPolicy for SessionCsrf {
    fn get_token(&self, ctx: &mut RequestContext<'_>) -> Result<CsrfToken> {
        Ok(ctx.session()?.get_csrf_token())
    }

    fn new_token(&self, ctx: &mut RequestContext<'_>) -> Result<CsrfToken> {
        let token = ctx.session()?.new_csrf_token();
        tracing::debug!(request_id = %ctx.request_id(), "rotated session CSRF token");
        Ok(token)
    }
}
