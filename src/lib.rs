//! Cross-Site Request Forgery defense for server-handled HTTP requests.
//!
//! This crate provides two independent gates:
//! - **Token checks**: an anti-forgery token issued by a pluggable policy is
//!   compared, in constant time, against the value submitted in the form body
//!   or a header
//! - **Origin checks**: for HTTPS requests, the `Origin` (or `Referer`)
//!   header must be secure and name a trusted host
//!
//! # Core Types
//!
//! - [`CsrfPolicy`]: where the expected token lives ([`SessionCsrf`], [`CookieCsrf`], or your own)
//! - [`RequestContext`]: per-request state carrying the active policy and deferred cookie writes
//! - [`RequestView`]: the read-only request projection the checks consume
//! - [`CsrfGate`]: automatic checking of unsafe methods
//! - [`CsrfSettings`]: configuration resolved once at startup
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use csrf_core::{check_origin, check_token, CookieCsrf, OnFailure, RequestContext};
//! use csrf_core::web::RequestAdapter;
//!
//! let mut request = RequestAdapter::new("req-123", "https", "example.com", 443);
//! request.add_header("Origin", "https://example.com");
//! request.add_cookie("csrf_token", "e6f325fee5974f3da4315a8ccf4513d2");
//! request.add_header("X-CSRF-Token", "e6f325fee5974f3da4315a8ccf4513d2");
//!
//! let mut ctx = RequestContext::new(request).with_policy(Arc::new(CookieCsrf::default()));
//!
//! assert!(check_origin(&ctx, None, OnFailure::Raise).unwrap());
//! assert!(check_token(&mut ctx, Some("csrf_token"), Some("X-CSRF-Token"), OnFailure::Raise).unwrap());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod context;
mod error;
mod gate;
mod origin;
mod policy;
pub mod render;
mod request;
pub mod response;
mod session;
mod settings;
mod token;
pub mod web;

#[cfg(test)]
mod test_utils;

pub use check::{check_token, check_token_default, DEFAULT_HEADER_NAME, DEFAULT_TOKEN_FIELD};
pub use context::{get_token, new_token, RequestContext};
pub use error::{ConfigError, Error, OnFailure, Result, Violation, ViolationKind};
pub use gate::{CsrfGate, CsrfOptions};
pub use origin::{check_origin, check_origin_with, is_same_domain};
pub use policy::{CookieCsrf, CookieCsrfConfig, CsrfPolicy, SessionCsrf, DEFAULT_COOKIE_NAME};
pub use request::RequestView;
pub use response::{CookieSink, CookieWrite};
pub use session::CsrfSession;
pub use settings::{parse_origin_list, CsrfSettings, PolicyKind, SameSiteSetting};
pub use token::{constant_time_eq, CsrfToken, DEFAULT_TOKEN_BYTES, MIN_TOKEN_BYTES};
