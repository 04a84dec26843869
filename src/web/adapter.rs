//! Request adapter for mapping HTTP requests to the CSRF request view.

use std::collections::HashMap;

use cookie::Cookie;
use http::header::{self, HeaderName, HeaderValue};
use http::uri::Authority;
use http::{HeaderMap, Request};
use mime::Mime;

use super::multipart;
use crate::request::RequestView;

/// Owned, framework-agnostic [`RequestView`].
///
/// `RequestAdapter` is the primary integration point between web frameworks
/// and csrf-core. It holds simple owned data so it does not couple to any
/// framework's request type. Build it field by field, or from an
/// [`http::Request`] with [`from_http_request`](Self::from_http_request).
///
/// Only body fields are kept: the query string is never a source for a
/// submitted token, so the adapter does not carry it.
///
/// # Examples
///
/// ```
/// use csrf_core::web::RequestAdapter;
/// use csrf_core::RequestView;
///
/// let mut adapter = RequestAdapter::new("req-12345", "https", "example.com", 8443);
/// adapter.add_header("Origin", "https://example.com:8443");
/// adapter.add_form_field("csrf_token", "abc");
///
/// assert_eq!(adapter.host(), "example.com:8443");
/// assert_eq!(adapter.header("origin"), Some("https://example.com:8443"));
/// assert_eq!(adapter.form_field("csrf_token"), Some("abc"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    /// Request identifier for log correlation
    request_id: String,
    scheme: String,
    domain: String,
    port: u16,
    headers: HeaderMap,
    cookies: HashMap<String, String>,
    /// Fields of a form-encoded or multipart body
    form_fields: HashMap<String, String>,
}

impl RequestAdapter {
    /// Creates an adapter with no headers, cookies or body fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use csrf_core::web::RequestAdapter;
    ///
    /// let adapter = RequestAdapter::new("req-001", "http", "localhost", 8080);
    /// assert_eq!(adapter.request_id(), "req-001");
    /// ```
    pub fn new(
        request_id: impl Into<String>,
        scheme: impl Into<String>,
        domain: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            scheme: scheme.into(),
            domain: domain.into(),
            port,
            headers: HeaderMap::new(),
            cookies: HashMap::new(),
            form_fields: HashMap::new(),
        }
    }

    /// Builds an adapter from an [`http::Request`] whose body is already buffered.
    ///
    /// `scheme` should come from the connection (or a trusted proxy header);
    /// when `None`, the URI's scheme is used, falling back to `http`. Behind
    /// TLS termination an origin-form URI carries no scheme, so pass it
    /// explicitly there or the origin check is skipped. Host and port come
    /// from the URI authority or the `Host` header. Cookies are split from
    /// every `Cookie` header. The body is parsed as form fields when its
    /// content type is `application/x-www-form-urlencoded` or
    /// `multipart/form-data`; file parts are ignored.
    pub fn from_http_request<B>(request: &Request<B>, scheme: Option<&str>) -> Self
    where
        B: AsRef<[u8]>,
    {
        let scheme = match scheme.or_else(|| request.uri().scheme_str()) {
            Some(scheme) => scheme.to_ascii_lowercase(),
            None => {
                tracing::debug!(
                    uri = %request.uri(),
                    "no scheme given or in URI; assuming http, origin checks will be skipped"
                );
                "http".to_string()
            }
        };
        let default_port = if scheme == "https" { 443 } else { 80 };

        let authority = request.uri().authority().cloned().or_else(|| {
            request
                .headers()
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.parse::<Authority>().ok())
        });
        let (domain, port) = match &authority {
            Some(authority) => (
                authority.host().to_string(),
                authority.port_u16().unwrap_or(default_port),
            ),
            None => (String::new(), default_port),
        };

        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let mut adapter = Self::new(request_id, scheme, domain, port);
        adapter.headers = request.headers().clone();

        for cookie in request
            .headers()
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
        {
            match cookie {
                Ok(cookie) => adapter.add_cookie(cookie.name(), cookie.value()),
                Err(error) => tracing::debug!(?error, "failed to parse cookie"),
            }
        }

        match body_kind(request.headers()) {
            Some(BodyKind::UrlEncoded) => {
                for (key, value) in url::form_urlencoded::parse(request.body().as_ref()) {
                    adapter.add_form_field(&key, &value);
                }
            }
            Some(BodyKind::Multipart(boundary)) => {
                for (key, value) in multipart::text_fields(request.body().as_ref(), &boundary) {
                    adapter.add_form_field(&key, &value);
                }
            }
            None => {}
        }

        adapter
    }

    /// Adds a header. Names and values that are not valid HTTP are dropped.
    pub fn add_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::debug!(header = %name, "ignoring invalid header"),
        }
    }

    /// Adds an inbound cookie. The first cookie with a given name wins.
    pub fn add_cookie(&mut self, name: &str, value: &str) {
        self.cookies
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }

    /// Adds a form-body field.
    pub fn add_form_field(&mut self, name: &str, value: &str) {
        self.form_fields
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }

    /// Returns a reference to the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl RequestView for RequestAdapter {
    fn request_id(&self) -> &str {
        &self.request_id
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn form_field(&self, name: &str) -> Option<&str> {
        self.form_fields.get(name).map(String::as_str)
    }
}

enum BodyKind {
    UrlEncoded,
    Multipart(String),
}

fn body_kind(headers: &HeaderMap) -> Option<BodyKind> {
    let content_type: Mime = headers
        .get(header::CONTENT_TYPE)?
        .to_str()
        .ok()?
        .parse()
        .ok()?;

    if content_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        return Some(BodyKind::UrlEncoded);
    }
    if content_type.essence_str() == mime::MULTIPART_FORM_DATA.essence_str() {
        let boundary = content_type.get_param(mime::BOUNDARY)?;
        return Some(BodyKind::Multipart(boundary.as_str().to_string()));
    }
    None
}
