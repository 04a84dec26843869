//! Token validation.

use crate::context::RequestContext;
use crate::error::{OnFailure, Result, Violation, ViolationKind};

/// Form field searched for a submitted token by default.
pub const DEFAULT_TOKEN_FIELD: &str = "csrf_token";

/// Header searched for a submitted token by default.
pub const DEFAULT_HEADER_NAME: &str = "X-CSRF-Token";

/// Checks the submitted token against the active policy's token.
///
/// The token is looked up in the form body field `token_field` first, then
/// in the header `header_name`. Either source can be disabled with `None`.
/// The query string is never consulted: tokens in URLs leak through logs and
/// `Referer` headers. With both sources disabled the submitted value is empty
/// and the check fails closed.
///
/// Comparison is constant-time.
///
/// # Errors
///
/// - [`Error::BadCsrfToken`](crate::Error::BadCsrfToken) on mismatch when
///   `on_failure` is [`OnFailure::Raise`]
/// - [`Error::Config`](crate::Error::Config) when the policy cannot produce
///   a token; this is returned regardless of `on_failure`
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use csrf_core::{check_token, CookieCsrf, OnFailure, RequestContext};
/// use csrf_core::web::RequestAdapter;
///
/// let mut request = RequestAdapter::new("req-1", "https", "example.com", 443);
/// request.add_cookie("csrf_token", "X");
/// request.add_header("X-CSRF-Token", "X");
///
/// let mut ctx = RequestContext::new(request).with_policy(Arc::new(CookieCsrf::default()));
/// assert!(check_token(&mut ctx, Some("csrf_token"), Some("X-CSRF-Token"), OnFailure::Raise).unwrap());
/// ```
pub fn check_token(
    ctx: &mut RequestContext<'_>,
    token_field: Option<&str>,
    header_name: Option<&str>,
    on_failure: OnFailure,
) -> Result<bool> {
    let supplied = supplied_token(ctx, token_field, header_name);
    let expected = ctx.get_token()?;

    // An empty expected token would accept an empty submission.
    if !expected.as_str().is_empty() && expected.matches(&supplied) {
        return Ok(true);
    }

    tracing::warn!(
        request_id = %ctx.request_id(),
        supplied = !supplied.is_empty(),
        "CSRF token check failed"
    );
    on_failure.fail(Violation::new(
        ViolationKind::BadToken,
        "check_csrf_token(): Invalid token",
    ))
}

/// Checks the token with the default field and header names.
///
/// # Errors
///
/// See [`check_token`].
pub fn check_token_default(ctx: &mut RequestContext<'_>, on_failure: OnFailure) -> Result<bool> {
    check_token(
        ctx,
        Some(DEFAULT_TOKEN_FIELD),
        Some(DEFAULT_HEADER_NAME),
        on_failure,
    )
}

fn supplied_token(
    ctx: &RequestContext<'_>,
    token_field: Option<&str>,
    header_name: Option<&str>,
) -> String {
    let request = ctx.request();

    let from_body = token_field
        .and_then(|field| request.form_field(field))
        .unwrap_or_default();
    if !from_body.is_empty() {
        return from_body.to_string();
    }

    header_name
        .and_then(|name| request.header(name))
        .unwrap_or_default()
        .to_string()
}
