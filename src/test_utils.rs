//! Shared fixtures for unit tests.

use crate::response::{CookieSink, CookieWrite};
use crate::session::CsrfSession;
use crate::token::CsrfToken;
use crate::web::RequestAdapter;

/// `https://example.com` on the default port.
pub(crate) fn https_request() -> RequestAdapter {
    RequestAdapter::new("req-test", "https", "example.com", 443)
}

/// `http://example.com` on the default port.
pub(crate) fn http_request() -> RequestAdapter {
    RequestAdapter::new("req-test", "http", "example.com", 80)
}

/// Session holding a single token in memory.
#[derive(Debug, Default)]
pub(crate) struct MemorySession {
    token: Option<CsrfToken>,
}

impl MemorySession {
    pub(crate) fn with_token(token: &str) -> Self {
        Self {
            token: Some(CsrfToken::new(token)),
        }
    }
}

impl CsrfSession for MemorySession {
    fn get_csrf_token(&mut self) -> CsrfToken {
        self.token.get_or_insert_with(CsrfToken::generate).clone()
    }

    fn new_csrf_token(&mut self) -> CsrfToken {
        let token = CsrfToken::generate();
        self.token = Some(token.clone());
        token
    }
}

/// Response stand-in that records every cookie write.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) writes: Vec<CookieWrite>,
}

impl CookieSink for RecordingSink {
    fn set_cookie(&mut self, cookie: &CookieWrite) {
        self.writes.push(cookie.clone());
    }
}
