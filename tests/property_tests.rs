//! Property tests for csrf-core.
//!
//! These tests validate invariants that must hold for any token value,
//! host name or trusted-origin list.

use std::sync::Arc;

use csrf_core::web::RequestAdapter;
use csrf_core::{
    check_origin, check_token, constant_time_eq, get_token, is_same_domain, new_token,
    CookieCsrf, CsrfPolicy, CsrfToken, OnFailure, RequestContext,
};
use proptest::prelude::*;

// Strategy: lowercase DNS labels joined by dots
fn arb_domain() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9]{0,8}", 1..4).prop_map(|labels| labels.join("."))
}

// Strategy: token-like strings from the URL-safe alphabet
fn arb_token() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_-]{8,48}").unwrap()
}

fn cookie_context(request: RequestAdapter) -> RequestContext<'static> {
    let policy: Arc<dyn CsrfPolicy> = Arc::new(CookieCsrf::default());
    RequestContext::new(request).with_policy(policy)
}

proptest! {
    /// Property: get_token is idempotent within a request
    #[test]
    fn proptest_get_token_is_idempotent(existing in prop::option::of(arb_token())) {
        let mut request = RequestAdapter::new("req-prop", "https", "example.com", 443);
        if let Some(value) = &existing {
            request.add_cookie("csrf_token", value);
        }
        let mut ctx = cookie_context(request);

        let first = get_token(&mut ctx).unwrap();
        let second = get_token(&mut ctx).unwrap();
        prop_assert_eq!(&first, &second);
        if let Some(value) = existing {
            prop_assert_eq!(first.as_str(), value.as_str());
            prop_assert_eq!(ctx.pending_callbacks(), 0);
        }
    }

    /// Property: a rotated token is what the rest of the request observes
    #[test]
    fn proptest_new_then_get_identity(existing in arb_token()) {
        let mut request = RequestAdapter::new("req-prop", "https", "example.com", 443);
        request.add_cookie("csrf_token", &existing);
        let mut ctx = cookie_context(request);

        let rotated = new_token(&mut ctx).unwrap();
        prop_assert_eq!(get_token(&mut ctx).unwrap(), rotated);
        prop_assert_eq!(ctx.pending_callbacks(), 1);
    }

    /// Property: only the exact expected token passes the check
    #[test]
    fn proptest_token_check_accepts_only_exact_match(
        expected in arb_token(),
        supplied in arb_token(),
    ) {
        let mut request = RequestAdapter::new("req-prop", "https", "example.com", 443);
        request.add_cookie("csrf_token", &expected);
        request.add_header("X-CSRF-Token", &supplied);
        let mut ctx = cookie_context(request);

        let passed = check_token(&mut ctx, Some("csrf_token"), Some("X-CSRF-Token"), OnFailure::Return)
            .unwrap();
        prop_assert_eq!(passed, expected == supplied);
        prop_assert_eq!(constant_time_eq(&expected, &supplied), expected == supplied);
    }

    /// Property: domain matching ignores ASCII case
    #[test]
    fn proptest_is_same_domain_case_insensitive(domain in arb_domain()) {
        prop_assert!(is_same_domain(&domain, &domain.to_ascii_uppercase()));
        prop_assert!(is_same_domain(&domain.to_ascii_uppercase(), &domain));
    }

    /// Property: a leading-dot pattern covers every subdomain
    #[test]
    fn proptest_leading_dot_matches_subdomains(
        sub in "[a-z][a-z0-9]{0,8}",
        domain in arb_domain(),
    ) {
        let pattern = format!(".{domain}");
        prop_assert!(is_same_domain(&domain, &pattern));
        let subdomain = format!("{sub}.{domain}");
        prop_assert!(is_same_domain(&subdomain, &pattern));
        prop_assert!(!is_same_domain(&subdomain, &domain));
    }

    /// Property: the request's own host is always trusted
    #[test]
    fn proptest_own_host_is_trusted(
        domain in arb_domain(),
        port in prop_oneof![Just(443u16), 1024u16..65535],
        others in prop::collection::vec(arb_domain(), 0..3),
    ) {
        let origin = if port == 443 {
            format!("https://{domain}")
        } else {
            format!("https://{domain}:{port}")
        };
        let mut request = RequestAdapter::new("req-prop", "https", domain.as_str(), port);
        request.add_header("Origin", &origin);
        let ctx = RequestContext::new(request);

        prop_assert!(check_origin(&ctx, Some(others.as_slice()), OnFailure::Return).unwrap());
    }

    /// Property: plaintext requests skip origin checking entirely
    #[test]
    fn proptest_plaintext_never_rejected(origin in prop::option::of(arb_domain())) {
        let mut request = RequestAdapter::new("req-prop", "http", "example.com", 80);
        if let Some(origin) = origin {
            request.add_header("Origin", &format!("http://{origin}"));
        }
        let ctx = RequestContext::new(request);

        prop_assert!(check_origin(&ctx, None, OnFailure::Raise).unwrap());
    }

    /// Property: generated tokens are never reused
    #[test]
    fn proptest_generated_tokens_differ(_seed in 0u8..16) {
        prop_assert_ne!(CsrfToken::generate(), CsrfToken::generate());
    }
}
