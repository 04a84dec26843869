//! Deferred cookie writes and the response side they land on.

use std::time::Duration;

use cookie::{Cookie, SameSite};
use http::{header, HeaderMap, HeaderValue, Response};

/// A cookie the response must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieWrite {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Only send over HTTPS
    pub secure: bool,
    /// Hide from client-side script
    pub http_only: bool,
    /// `Domain` attribute, unset by default
    pub domain: Option<String>,
    /// `Path` attribute
    pub path: String,
    /// `Max-Age`; unset means a browser-session cookie
    pub max_age: Option<Duration>,
    /// `SameSite` attribute
    pub same_site: Option<SameSite>,
    /// Replace any cookie of the same name already on the response
    pub overwrite: bool,
}

impl CookieWrite {
    /// Renders the write as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> Option<HeaderValue> {
        let mut builder = Cookie::build((self.name.clone(), self.value.clone()))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only);

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(max_age) = self.max_age {
            let secs = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
            builder = builder.max_age(cookie::time::Duration::seconds(secs));
        }
        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site);
        }

        HeaderValue::from_str(&builder.build().to_string()).ok()
    }
}

/// Anything that can receive a cookie once the response exists.
pub trait CookieSink {
    /// Sets a cookie, honoring [`CookieWrite::overwrite`].
    fn set_cookie(&mut self, cookie: &CookieWrite);
}

impl CookieSink for HeaderMap {
    fn set_cookie(&mut self, cookie: &CookieWrite) {
        let Some(value) = cookie.to_header_value() else {
            tracing::warn!(cookie = %cookie.name, "cookie is not a valid header value; dropped");
            return;
        };

        if cookie.overwrite {
            let kept: Vec<HeaderValue> = self
                .get_all(header::SET_COOKIE)
                .iter()
                .filter(|existing| set_cookie_name(existing) != Some(cookie.name.as_str()))
                .cloned()
                .collect();
            self.remove(header::SET_COOKIE);
            for existing in kept {
                self.append(header::SET_COOKIE, existing);
            }
        }

        self.append(header::SET_COOKIE, value);
    }
}

impl<B> CookieSink for Response<B> {
    fn set_cookie(&mut self, cookie: &CookieWrite) {
        self.headers_mut().set_cookie(cookie);
    }
}

fn set_cookie_name(value: &HeaderValue) -> Option<&str> {
    let raw = value.to_str().ok()?;
    let (name, _) = raw.split_once('=')?;
    Some(name.trim())
}

/// Callback run once a response object exists.
pub type ResponseCallback = Box<dyn FnOnce(&mut dyn CookieSink) + Send>;
