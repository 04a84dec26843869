use std::time::Duration;

use cookie::SameSite;

use crate::context::RequestContext;
use crate::error::Result;
use crate::response::CookieWrite;
use crate::token::{CsrfToken, DEFAULT_TOKEN_BYTES};

use super::CsrfPolicy;

/// Cookie name used when none is configured.
pub const DEFAULT_COOKIE_NAME: &str = "csrf_token";

/// Settings for [`CookieCsrf`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieCsrfConfig {
    /// Name of the cookie holding the token.
    /// Default: "csrf_token"
    pub cookie_name: String,

    /// `Domain` attribute.
    /// Default: None
    pub domain: Option<String>,

    /// `Path` attribute.
    /// Default: "/"
    pub path: String,

    /// `Max-Age` attribute. `None` issues a browser-session cookie.
    /// Default: None
    pub max_age: Option<Duration>,

    /// `SameSite` attribute.
    /// Default: None
    pub same_site: Option<SameSite>,

    /// Random bytes per generated token. Values below
    /// [`MIN_TOKEN_BYTES`](crate::MIN_TOKEN_BYTES) are raised to it.
    /// Default: 32
    pub token_length: usize,
}

impl Default for CookieCsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            domain: None,
            path: "/".to_string(),
            max_age: None,
            same_site: None,
            token_length: DEFAULT_TOKEN_BYTES,
        }
    }
}

impl CookieCsrfConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie name.
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the cookie domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the cookie path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie lifetime.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Set the SameSite attribute.
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Set the number of random bytes per token.
    pub fn token_length(mut self, len: usize) -> Self {
        self.token_length = len;
        self
    }
}

/// Keeps the token in a cookie.
///
/// The cookie is deliberately not `HttpOnly`: client-side script reads it and
/// echoes it back in the `X-CSRF-Token` header. It is marked `Secure` whenever
/// the request itself arrived over HTTPS.
///
/// Writes are never applied to a response directly. The policy registers a
/// callback on the [`RequestContext`], which the response-building stage runs
/// through [`RequestContext::apply_response_callbacks`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use csrf_core::{CookieCsrf, CookieCsrfConfig, RequestContext, web::RequestAdapter};
///
/// let policy = CookieCsrf::new(CookieCsrfConfig::new().cookie_name("xsrf"));
///
/// let mut request = RequestAdapter::new("req-1", "https", "example.com", 443);
/// request.add_cookie("xsrf", "e6f325fee5974f3da4315a8ccf4513d2");
///
/// let mut ctx = RequestContext::new(request).with_policy(Arc::new(policy));
/// let token = ctx.get_token().unwrap();
///
/// assert_eq!(token.as_str(), "e6f325fee5974f3da4315a8ccf4513d2");
/// assert_eq!(ctx.pending_callbacks(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CookieCsrf {
    config: CookieCsrfConfig,
}

impl CookieCsrf {
    /// Creates a cookie-backed policy.
    pub fn new(config: CookieCsrfConfig) -> Self {
        Self { config }
    }

    /// Returns the policy's configuration.
    pub fn config(&self) -> &CookieCsrfConfig {
        &self.config
    }

    fn cookie_write(&self, ctx: &RequestContext<'_>, token: &CsrfToken) -> CookieWrite {
        CookieWrite {
            name: self.config.cookie_name.clone(),
            value: token.as_str().to_string(),
            secure: ctx.request().is_secure(),
            http_only: false,
            domain: self.config.domain.clone(),
            path: self.config.path.clone(),
            max_age: self.config.max_age,
            same_site: self.config.same_site,
            overwrite: true,
        }
    }
}

impl CsrfPolicy for CookieCsrf {
    fn get_token(&self, ctx: &mut RequestContext<'_>) -> Result<CsrfToken> {
        if let Some(token) = ctx.issued_token(&self.config.cookie_name) {
            return Ok(token.clone());
        }
        let inbound = ctx
            .request()
            .cookie(&self.config.cookie_name)
            .filter(|value| !value.is_empty());
        if let Some(value) = inbound {
            return Ok(CsrfToken::new(value));
        }
        self.new_token(ctx)
    }

    fn new_token(&self, ctx: &mut RequestContext<'_>) -> Result<CsrfToken> {
        let token = CsrfToken::generate_with_len(self.config.token_length);
        let write = self.cookie_write(ctx, &token);

        ctx.remember_issued(&self.config.cookie_name, token.clone());
        ctx.add_response_callback(move |response| response.set_cookie(&write));

        tracing::debug!(
            request_id = %ctx.request_id(),
            cookie = %self.config.cookie_name,
            "issued CSRF cookie"
        );
        Ok(token)
    }
}
