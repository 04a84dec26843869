//! Origin and Referer validation.
//!
//! This is a second layer next to the token check. It only runs for requests
//! that arrived over HTTPS: for plaintext requests an active network attacker
//! can forge any header, so there is nothing meaningful to check.
//!
//! Under HTTPS the declared origin must itself be HTTPS (a plaintext page on
//! the same host is treated as hostile) and must name a trusted host. The
//! request's own host is always trusted.

use url::Url;

use crate::context::RequestContext;
use crate::error::{OnFailure, Result, Violation, ViolationKind};
use crate::request::RequestView;

const REASON_NO_ORIGIN: &str = "Origin checking failed - no Origin or Referer.";
const REASON_INSECURE_REFERER: &str =
    "Referer checking failed - Referer is insecure while host is secure.";

/// Checks the request's `Origin` (or `Referer`) against the trusted origins.
///
/// `trusted_origins` lists `host` or `host:port` entries; `None` reads them
/// from the context's [`CsrfSettings`](crate::CsrfSettings). The request's
/// own host is appended on every call.
///
/// # Errors
///
/// [`Error::BadCsrfOrigin`](crate::Error::BadCsrfOrigin) when the check
/// fails and `on_failure` is [`OnFailure::Raise`].
///
/// # Examples
///
/// ```
/// use csrf_core::{check_origin, OnFailure, RequestContext};
/// use csrf_core::web::RequestAdapter;
///
/// let mut request = RequestAdapter::new("req-1", "https", "example.com", 443);
/// request.add_header("Origin", "https://evil.com");
///
/// let ctx = RequestContext::new(request);
/// let trusted = vec!["example.com".to_string()];
/// assert!(!check_origin(&ctx, Some(trusted.as_slice()), OnFailure::Return).unwrap());
/// ```
pub fn check_origin(
    ctx: &RequestContext<'_>,
    trusted_origins: Option<&[String]>,
    on_failure: OnFailure,
) -> Result<bool> {
    check_origin_with(ctx, trusted_origins, false, on_failure)
}

/// [`check_origin`] with control over requests that carry neither header.
///
/// With `allow_no_origin`, a request lacking both `Origin` and `Referer`
/// passes. Other failures are unaffected.
///
/// # Errors
///
/// See [`check_origin`].
pub fn check_origin_with(
    ctx: &RequestContext<'_>,
    trusted_origins: Option<&[String]>,
    allow_no_origin: bool,
    on_failure: OnFailure,
) -> Result<bool> {
    let request = ctx.request();
    if !request.is_secure() {
        return Ok(true);
    }

    let configured = ctx.settings().trusted_origins.as_slice();
    let trusted = trusted_origins.unwrap_or(configured);

    match evaluate(request, trusted, allow_no_origin) {
        Ok(()) => Ok(true),
        Err(violation) => {
            tracing::warn!(
                request_id = %ctx.request_id(),
                kind = %violation.kind,
                reason = %violation.message,
                "CSRF origin check failed"
            );
            on_failure.fail(violation)
        }
    }
}

fn evaluate(
    request: &dyn RequestView,
    trusted_origins: &[String],
    allow_no_origin: bool,
) -> Result<(), Violation> {
    // A present but empty Origin does not fall back to Referer.
    let declared = request
        .header("Origin")
        .or_else(|| request.header("Referer"))
        .filter(|origin| !origin.is_empty());

    let Some(declared) = declared else {
        if allow_no_origin {
            return Ok(());
        }
        return Err(Violation::new(ViolationKind::NoOrigin, REASON_NO_ORIGIN));
    };

    let netloc = match Url::parse(declared) {
        Ok(url) if url.scheme() == "https" => netloc(&url),
        _ => {
            return Err(Violation::new(
                ViolationKind::InsecureReferer,
                REASON_INSECURE_REFERER,
            ))
        }
    };

    let own_host = request.host();
    let trusted = trusted_origins
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(own_host.as_str()));

    for pattern in trusted {
        if is_same_domain(&netloc, pattern) {
            return Ok(());
        }
    }

    Err(Violation::new(
        ViolationKind::UntrustedOrigin,
        format!(
            "Referer checking failed - {} does not match any trusted origins.",
            declared
        ),
    ))
}

/// `host[:port]` of a parsed origin. The port is omitted when it is the
/// scheme's default.
fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Whether `host` matches the trusted `pattern`, ignoring ASCII case.
///
/// A plain pattern matches only the identical `host[:port]`. A pattern with a
/// leading dot matches the bare domain and every subdomain of it:
/// `.example.com` matches `example.com` and `api.example.com`, but not
/// `badexample.com`. Empty patterns match nothing.
///
/// # Examples
///
/// ```
/// use csrf_core::is_same_domain;
///
/// assert!(is_same_domain("Example.com", "example.com"));
/// assert!(!is_same_domain("api.example.com", "example.com"));
/// assert!(is_same_domain("api.example.com", ".example.com"));
/// assert!(!is_same_domain("example.com:8080", "example.com"));
/// ```
pub fn is_same_domain(host: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    let host = host.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();

    match pattern.strip_prefix('.') {
        Some(bare) => host.ends_with(&pattern) || host == bare,
        None => host == pattern,
    }
}
