use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::policy::CsrfPolicy;
use crate::request::RequestView;
use crate::response::{CookieSink, ResponseCallback};
use crate::session::CsrfSession;
use crate::settings::CsrfSettings;
use crate::token::CsrfToken;

/// Per-request state the CSRF operations work against.
///
/// `RequestContext` is built once per inbound request and carries:
/// - the read-only [`RequestView`]
/// - the active [`CsrfPolicy`], resolved once at startup and shared
/// - the optional session facility used by [`SessionCsrf`](crate::SessionCsrf)
/// - the settings (trusted origins)
/// - callbacks to run once the response exists
///
/// There is no global lookup: whatever policy the context is built with is the
/// one every operation uses.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use csrf_core::{CookieCsrf, RequestContext, web::RequestAdapter};
///
/// let request = RequestAdapter::new("req-1", "https", "example.com", 443);
/// let mut ctx = RequestContext::new(request).with_policy(Arc::new(CookieCsrf::default()));
///
/// let token = ctx.get_token().unwrap();
/// assert_eq!(ctx.get_token().unwrap(), token);
/// assert_eq!(ctx.pending_callbacks(), 1);
/// ```
pub struct RequestContext<'s> {
    request_id: String,
    request: Box<dyn RequestView + 's>,
    policy: Option<Arc<dyn CsrfPolicy>>,
    session: Option<&'s mut dyn CsrfSession>,
    settings: Arc<CsrfSettings>,
    issued: HashMap<String, CsrfToken>,
    callbacks: Vec<ResponseCallback>,
}

impl<'s> RequestContext<'s> {
    /// Creates a context for the given request with default settings and no policy.
    ///
    /// The request id is taken from the request view.
    pub fn new<R>(request: R) -> Self
    where
        R: RequestView + 's,
    {
        Self {
            request_id: request.request_id().to_string(),
            request: Box::new(request),
            policy: None,
            session: None,
            settings: Arc::new(CsrfSettings::default()),
            issued: HashMap::new(),
            callbacks: Vec::new(),
        }
    }

    /// Attaches the active policy.
    pub fn with_policy(mut self, policy: Arc<dyn CsrfPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Attaches the session facility for session-backed tokens.
    pub fn with_session(mut self, session: &'s mut dyn CsrfSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Attaches shared settings.
    pub fn with_settings(mut self, settings: Arc<CsrfSettings>) -> Self {
        self.settings = settings;
        self
    }

    /// Overrides the request id included in log records.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Returns the request ID for this context.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the inbound request.
    pub fn request(&self) -> &dyn RequestView {
        self.request.as_ref()
    }

    /// Returns the settings in effect.
    pub fn settings(&self) -> &CsrfSettings {
        &self.settings
    }

    /// Returns the active policy, if one was configured.
    pub fn policy(&self) -> Option<&Arc<dyn CsrfPolicy>> {
        self.policy.as_ref()
    }

    /// Returns the session facility.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSession`] when no session is attached.
    pub fn session(&mut self) -> Result<&mut (dyn CsrfSession + 's)> {
        match self.session.as_mut() {
            Some(session) => Ok(&mut **session),
            None => Err(ConfigError::NoSession.into()),
        }
    }

    /// Returns the current token, creating one through the active policy if needed.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoPolicy`] when the context has no policy, or whatever
    /// the policy itself reports.
    pub fn get_token(&mut self) -> Result<CsrfToken> {
        let policy = self.active_policy()?;
        policy.get_token(self)
    }

    /// Rotates the token through the active policy.
    ///
    /// # Errors
    ///
    /// Same as [`get_token`](Self::get_token).
    pub fn new_token(&mut self) -> Result<CsrfToken> {
        let policy = self.active_policy()?;
        policy.new_token(self)
    }

    fn active_policy(&self) -> Result<Arc<dyn CsrfPolicy>> {
        self.policy.clone().ok_or_else(|| ConfigError::NoPolicy.into())
    }

    /// Token issued earlier in this request under the given cookie name.
    pub(crate) fn issued_token(&self, name: &str) -> Option<&CsrfToken> {
        self.issued.get(name)
    }

    pub(crate) fn remember_issued(&mut self, name: &str, token: CsrfToken) {
        self.issued.insert(name.to_string(), token);
    }

    /// Registers a callback to run once the response exists.
    pub fn add_response_callback<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut dyn CookieSink) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Number of callbacks not yet run.
    pub fn pending_callbacks(&self) -> usize {
        self.callbacks.len()
    }

    /// Runs every pending callback against the response, in registration order.
    ///
    /// Callbacks are drained, so a second call does nothing.
    pub fn apply_response_callbacks(&mut self, response: &mut dyn CookieSink) {
        for callback in self.callbacks.drain(..) {
            callback(&mut *response);
        }
    }
}

/// Returns the current token for the request, creating one if needed.
///
/// Shorthand for [`RequestContext::get_token`].
///
/// # Errors
///
/// [`ConfigError::NoPolicy`] when no policy is active, or the policy's own error.
pub fn get_token(ctx: &mut RequestContext<'_>) -> Result<CsrfToken> {
    ctx.get_token()
}

/// Rotates the token for the request.
///
/// Shorthand for [`RequestContext::new_token`].
///
/// # Errors
///
/// Same as [`get_token`].
pub fn new_token(ctx: &mut RequestContext<'_>) -> Result<CsrfToken> {
    ctx.new_token()
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("has_policy", &self.policy.is_some())
            .field("has_session", &self.session.is_some())
            .field("pending_callbacks", &self.callbacks.len())
            .finish()
    }
}
