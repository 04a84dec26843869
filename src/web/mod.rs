//! Web framework integration surface.
//!
//! This module provides the boundary between HTTP frameworks and csrf-core's
//! checks. It handles:
//! - Mapping HTTP requests to a [`RequestView`](crate::RequestView)
//! - Parsing cookies, form-encoded and multipart bodies at the boundary
//! - Request-ID propagation for log correlation
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: Only the `http` crate types are used.
//!    Framework-specific code converts into them or implements
//!    `RequestView` itself.
//!
//! 2. **Body, Not Query**: Form fields come from the request body. The query
//!    string is not read at all.
//!
//! 3. **Explicit Context**: No global state. The active policy travels in the
//!    [`RequestContext`](crate::RequestContext).
//!
//! # Example Flow
//!
//! ```
//! use std::sync::Arc;
//! use csrf_core::{CookieCsrf, CsrfGate, CsrfOptions, RequestContext};
//! use csrf_core::web::RequestAdapter;
//!
//! // 1. Map the inbound request
//! let request = http::Request::builder()
//!     .method("GET")
//!     .uri("/form")
//!     .header("Host", "example.com")
//!     .body(Vec::new())
//!     .unwrap();
//! let adapter = RequestAdapter::from_http_request(&request, Some("https"));
//!
//! // 2. Build the request context with the policy chosen at startup
//! let mut ctx = RequestContext::new(adapter).with_policy(Arc::new(CookieCsrf::default()));
//!
//! // 3. Run the automatic check (GET is safe, so it passes)
//! CsrfGate::new(CsrfOptions::default())
//!     .check(&mut ctx, request.method())
//!     .unwrap();
//!
//! // 4. Render a token and let the policy set its cookie on the response
//! let token = ctx.get_token().unwrap();
//! let mut response = http::Response::new(format!("<input value=\"{}\">", token));
//! ctx.apply_response_callbacks(&mut response);
//! assert!(response.headers().contains_key(http::header::SET_COOKIE));
//! ```

mod adapter;
mod multipart;

pub use adapter::RequestAdapter;
