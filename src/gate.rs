use http::Method;

use crate::check::{check_token, DEFAULT_HEADER_NAME, DEFAULT_TOKEN_FIELD};
use crate::context::RequestContext;
use crate::error::{OnFailure, Result};
use crate::origin::check_origin_with;

/// Options for automatic CSRF checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfOptions {
    /// Check unsafe requests at all. Default: true
    pub require_csrf: bool,
    /// Form field searched for the token; `None` disables it. Default: "csrf_token"
    pub token_field: Option<String>,
    /// Header searched for the token; `None` disables it. Default: "X-CSRF-Token"
    pub header_name: Option<String>,
    /// Methods that never need a token. Default: GET, HEAD, OPTIONS, TRACE
    pub safe_methods: Vec<Method>,
    /// Run the origin check before the token check. Default: true
    pub check_origin: bool,
    /// Let requests lacking both Origin and Referer pass the origin check. Default: false
    pub allow_no_origin: bool,
}

impl Default for CsrfOptions {
    fn default() -> Self {
        Self {
            require_csrf: true,
            token_field: Some(DEFAULT_TOKEN_FIELD.to_string()),
            header_name: Some(DEFAULT_HEADER_NAME.to_string()),
            safe_methods: vec![Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE],
            check_origin: true,
            allow_no_origin: false,
        }
    }
}

/// The automatic CSRF gate run before a state-changing handler.
///
/// For an unsafe method the gate runs the origin check (when enabled) and
/// then the token check, both in raising mode. Safe methods pass untouched,
/// as does everything when `require_csrf` is off.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use csrf_core::{CookieCsrf, CsrfGate, CsrfOptions, Error, RequestContext};
/// use csrf_core::web::RequestAdapter;
/// use http::Method;
///
/// let mut request = RequestAdapter::new("req-1", "https", "example.com", 443);
/// request.add_header("Origin", "https://example.com");
/// request.add_cookie("csrf_token", "t0k3n");
/// request.add_form_field("csrf_token", "t0k3n");
///
/// let mut ctx = RequestContext::new(request).with_policy(Arc::new(CookieCsrf::default()));
/// let gate = CsrfGate::new(CsrfOptions::default());
///
/// gate.check(&mut ctx, &Method::POST).expect("token and origin are valid");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsrfGate {
    options: CsrfOptions,
    trusted_origins: Option<Vec<String>>,
}

impl CsrfGate {
    /// Creates a gate with the given options.
    pub fn new(options: CsrfOptions) -> Self {
        Self {
            options,
            trusted_origins: None,
        }
    }

    /// Overrides the trusted origins instead of reading them from settings.
    pub fn trusted_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trusted_origins = Some(origins.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the gate's options.
    pub fn options(&self) -> &CsrfOptions {
        &self.options
    }

    /// Whether a request with this method is checked at all.
    pub fn requires_check(&self, method: &Method) -> bool {
        self.options.require_csrf && !self.options.safe_methods.contains(method)
    }

    /// Runs the automatic check for a request.
    ///
    /// # Errors
    ///
    /// [`Error::BadCsrfOrigin`](crate::Error::BadCsrfOrigin) or
    /// [`Error::BadCsrfToken`](crate::Error::BadCsrfToken) on rejection, and
    /// [`Error::Config`](crate::Error::Config) when the context cannot
    /// produce a token.
    pub fn check(&self, ctx: &mut RequestContext<'_>, method: &Method) -> Result<()> {
        if !self.requires_check(method) {
            return Ok(());
        }

        if self.options.check_origin {
            check_origin_with(
                ctx,
                self.trusted_origins.as_deref(),
                self.options.allow_no_origin,
                OnFailure::Raise,
            )?;
        }

        check_token(
            ctx,
            self.options.token_field.as_deref(),
            self.options.header_name.as_deref(),
            OnFailure::Raise,
        )?;

        tracing::debug!(request_id = %ctx.request_id(), %method, "CSRF checks passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ViolationKind};
    use crate::test_utils::{http_request, https_request, MemorySession};
    use crate::SessionCsrf;
    use std::sync::Arc;

    fn run(gate: &CsrfGate, request: crate::web::RequestAdapter, method: Method) -> Result<()> {
        let mut session = MemorySession::with_token("X");
        let mut ctx = RequestContext::new(request)
            .with_policy(Arc::new(SessionCsrf::new()))
            .with_session(&mut session);
        gate.check(&mut ctx, &method)
    }

    #[test]
    fn safe_methods_skip_checks() {
        let gate = CsrfGate::default();
        for method in [Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE] {
            assert!(run(&gate, https_request(), method).is_ok());
        }
    }

    #[test]
    fn unsafe_method_without_token_is_rejected() {
        let gate = CsrfGate::new(CsrfOptions::default());
        let mut request = https_request();
        request.add_header("Origin", "https://example.com");

        let err = run(&gate, request, Method::POST).unwrap_err();
        assert!(matches!(err, Error::BadCsrfToken(_)));
    }

    #[test]
    fn origin_is_checked_before_token() {
        let gate = CsrfGate::new(CsrfOptions::default());
        let mut request = https_request();
        request.add_header("Origin", "https://evil.com");
        request.add_header("X-CSRF-Token", "X");

        let err = run(&gate, request, Method::DELETE).unwrap_err();
        assert_eq!(err.violation().unwrap().kind, ViolationKind::UntrustedOrigin);
    }

    #[test]
    fn valid_request_passes() {
        let gate = CsrfGate::new(CsrfOptions::default());
        let mut request = https_request();
        request.add_header("Referer", "https://example.com/form");
        request.add_form_field("csrf_token", "X");

        assert!(run(&gate, request, Method::POST).is_ok());
    }

    #[test]
    fn origin_check_can_be_disabled() {
        let gate = CsrfGate::new(CsrfOptions {
            check_origin: false,
            ..CsrfOptions::default()
        });
        let mut request = https_request();
        request.add_header("X-CSRF-Token", "X");

        assert!(run(&gate, request, Method::PUT).is_ok());
    }

    #[test]
    fn allow_no_origin_lets_headerless_requests_through() {
        let gate = CsrfGate::new(CsrfOptions {
            allow_no_origin: true,
            ..CsrfOptions::default()
        });
        let mut request = https_request();
        request.add_header("X-CSRF-Token", "X");

        assert!(run(&gate, request, Method::PATCH).is_ok());
    }

    #[test]
    fn plaintext_skips_origin_but_not_token() {
        let gate = CsrfGate::default();
        let err = run(&gate, http_request(), Method::POST).unwrap_err();
        assert!(matches!(err, Error::BadCsrfToken(_)));
    }

    #[test]
    fn require_csrf_off_disables_gate() {
        let gate = CsrfGate::new(CsrfOptions {
            require_csrf: false,
            ..CsrfOptions::default()
        });
        assert!(!gate.requires_check(&Method::POST));
        assert!(run(&gate, https_request(), Method::POST).is_ok());
    }

    #[test]
    fn custom_safe_methods() {
        let gate = CsrfGate::new(CsrfOptions {
            safe_methods: vec![Method::GET],
            ..CsrfOptions::default()
        });
        assert!(gate.requires_check(&Method::OPTIONS));
        assert!(!gate.requires_check(&Method::GET));
    }

    #[test]
    fn explicit_trusted_origins() {
        let gate = CsrfGate::default().trusted_origins(["partner.com"]);
        let mut request = https_request();
        request.add_header("Origin", "https://partner.com");
        request.add_header("X-CSRF-Token", "X");

        assert!(run(&gate, request, Method::POST).is_ok());
    }
}
