use http::HeaderMap;

/// Read-only projection of an inbound request.
///
/// This is the only view of the request the checks need. Framework
/// integrations implement it directly or build a
/// [`RequestAdapter`](crate::web::RequestAdapter).
pub trait RequestView {
    /// Identifier used to correlate log records. Empty when unknown.
    fn request_id(&self) -> &str {
        ""
    }

    /// URL scheme, `"http"` or `"https"`.
    fn scheme(&self) -> &str;

    /// Host name without the port.
    fn domain(&self) -> &str;

    /// Port the request was addressed to.
    fn port(&self) -> u16;

    /// Request headers. Lookups through [`HeaderMap`] are case-insensitive.
    fn headers(&self) -> &HeaderMap;

    /// Value of the named inbound cookie.
    fn cookie(&self, name: &str) -> Option<&str>;

    /// Value of a field from a form-encoded request body.
    ///
    /// Implementations must not fall back to the query string.
    fn form_field(&self, name: &str) -> Option<&str>;

    /// Whether the request arrived over an encrypted transport.
    fn is_secure(&self) -> bool {
        self.scheme().eq_ignore_ascii_case("https")
    }

    /// `host:port`, or the bare host when the port is 80 or 443.
    fn host(&self) -> String {
        match self.port() {
            80 | 443 => self.domain().to_string(),
            port => format!("{}:{}", self.domain(), port),
        }
    }

    /// Header value as a string, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }
}
