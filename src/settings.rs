//! Application-wide CSRF settings.

use std::sync::Arc;
use std::time::Duration;

use cookie::SameSite;
use serde::{Deserialize, Deserializer};

use crate::check::{DEFAULT_HEADER_NAME, DEFAULT_TOKEN_FIELD};
use crate::error::ConfigError;
use crate::gate::CsrfOptions;
use crate::policy::{CookieCsrf, CookieCsrfConfig, CsrfPolicy, SessionCsrf, DEFAULT_COOKIE_NAME};

/// Which built-in policy to activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// [`SessionCsrf`]
    #[default]
    Session,
    /// [`CookieCsrf`]
    Cookie,
}

/// `SameSite` values accepted in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSiteSetting {
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=Lax`
    Lax,
    /// `SameSite=None`
    None,
}

impl From<SameSiteSetting> for SameSite {
    fn from(value: SameSiteSetting) -> Self {
        match value {
            SameSiteSetting::Strict => SameSite::Strict,
            SameSiteSetting::Lax => SameSite::Lax,
            SameSiteSetting::None => SameSite::None,
        }
    }
}

/// CSRF settings, loaded once at startup.
///
/// Every field has a default, so an empty document deserializes to
/// [`CsrfSettings::default`].
///
/// # Examples
///
/// ```
/// use csrf_core::{CsrfSettings, PolicyKind};
///
/// let settings = CsrfSettings::from_vars([
///     ("CSRF_POLICY".to_string(), "cookie".to_string()),
///     ("CSRF_TRUSTED_ORIGINS".to_string(), "example.com,dev.example.com:8080".to_string()),
/// ])
/// .unwrap();
///
/// assert_eq!(settings.policy, PolicyKind::Cookie);
/// assert_eq!(settings.trusted_origins, vec!["example.com", "dev.example.com:8080"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CsrfSettings {
    /// Extra trusted origins (`host` or `host:port`).
    /// Accepts a list or a whitespace/comma separated string.
    #[serde(deserialize_with = "deserialize_origin_list")]
    pub trusted_origins: Vec<String>,

    /// Active policy.
    pub policy: PolicyKind,

    /// Cookie name for [`CookieCsrf`].
    pub cookie_name: String,

    /// Cookie `Domain` for [`CookieCsrf`].
    pub cookie_domain: Option<String>,

    /// Cookie `Path` for [`CookieCsrf`].
    pub cookie_path: String,

    /// Cookie `Max-Age` in seconds for [`CookieCsrf`].
    pub cookie_max_age_secs: Option<u64>,

    /// Cookie `SameSite` for [`CookieCsrf`].
    pub cookie_same_site: Option<SameSiteSetting>,

    /// Form field holding the submitted token; empty disables body lookup.
    pub token_field: String,

    /// Header holding the submitted token; empty disables header lookup.
    pub header_name: String,

    /// Check unsafe requests automatically.
    pub require_csrf: bool,

    /// Run the origin check during automatic checks.
    pub check_origin: bool,

    /// Let requests without Origin and Referer through the origin check.
    pub allow_no_origin: bool,
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            trusted_origins: Vec::new(),
            policy: PolicyKind::default(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_domain: None,
            cookie_path: "/".to_string(),
            cookie_max_age_secs: None,
            cookie_same_site: None,
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
            header_name: DEFAULT_HEADER_NAME.to_string(),
            require_csrf: true,
            check_origin: true,
            allow_no_origin: false,
        }
    }
}

impl CsrfSettings {
    /// Loads settings from `CSRF_*` environment variables.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Settings`] when a variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        envy::prefixed("CSRF_")
            .from_env()
            .map_err(|e| ConfigError::Settings(e.to_string()))
    }

    /// Loads settings from `CSRF_*` key/value pairs.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Settings`] when a value cannot be parsed.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("CSRF_")
            .from_iter(vars)
            .map_err(|e| ConfigError::Settings(e.to_string()))
    }

    /// Builds the cookie policy configuration described by these settings.
    pub fn cookie_config(&self) -> CookieCsrfConfig {
        CookieCsrfConfig {
            cookie_name: self.cookie_name.clone(),
            domain: self.cookie_domain.clone(),
            path: self.cookie_path.clone(),
            max_age: self.cookie_max_age_secs.map(Duration::from_secs),
            same_site: self.cookie_same_site.map(SameSite::from),
            ..CookieCsrfConfig::default()
        }
    }

    /// Resolves the active policy. Call once at startup and share the result.
    pub fn build_policy(&self) -> Arc<dyn CsrfPolicy> {
        match self.policy {
            PolicyKind::Session => Arc::new(SessionCsrf::new()),
            PolicyKind::Cookie => Arc::new(CookieCsrf::new(self.cookie_config())),
        }
    }

    /// Options for [`CsrfGate`](crate::CsrfGate) derived from these settings.
    pub fn options(&self) -> CsrfOptions {
        CsrfOptions {
            require_csrf: self.require_csrf,
            token_field: non_empty(&self.token_field),
            header_name: non_empty(&self.header_name),
            check_origin: self.check_origin,
            allow_no_origin: self.allow_no_origin,
            ..CsrfOptions::default()
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Splits a setting value into origins on whitespace and commas.
///
/// # Examples
///
/// ```
/// use csrf_core::parse_origin_list;
///
/// assert_eq!(
///     parse_origin_list("example.com dev.example.com:8080,\n  other.org"),
///     vec!["example.com", "dev.example.com:8080", "other.org"],
/// );
/// ```
pub fn parse_origin_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn deserialize_origin_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OriginList {
        Text(String),
        List(Vec<String>),
    }

    Ok(match OriginList::deserialize(deserializer)? {
        OriginList::Text(text) => parse_origin_list(&text),
        OriginList::List(list) => list.iter().flat_map(|s| parse_origin_list(s)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let settings = CsrfSettings::default();
        assert!(settings.trusted_origins.is_empty());
        assert_eq!(settings.policy, PolicyKind::Session);
        assert_eq!(settings.cookie_name, "csrf_token");
        assert_eq!(settings.token_field, "csrf_token");
        assert_eq!(settings.header_name, "X-CSRF-Token");
        assert!(settings.require_csrf);
        assert!(settings.check_origin);
        assert!(!settings.allow_no_origin);
    }

    #[test]
    fn empty_env_yields_defaults() {
        let settings = CsrfSettings::from_vars(Vec::new()).unwrap();
        assert_eq!(settings, CsrfSettings::default());
    }

    #[test]
    fn env_overrides() {
        let settings = CsrfSettings::from_vars(vars(&[
            ("CSRF_POLICY", "cookie"),
            ("CSRF_COOKIE_NAME", "xsrf"),
            ("CSRF_COOKIE_DOMAIN", "example.com"),
            ("CSRF_COOKIE_MAX_AGE_SECS", "3600"),
            ("CSRF_COOKIE_SAME_SITE", "strict"),
            ("CSRF_TRUSTED_ORIGINS", "a.com b.com:8443"),
            ("CSRF_ALLOW_NO_ORIGIN", "true"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();

        assert_eq!(settings.policy, PolicyKind::Cookie);
        assert_eq!(settings.cookie_name, "xsrf");
        assert_eq!(settings.trusted_origins, vec!["a.com", "b.com:8443"]);
        assert!(settings.allow_no_origin);

        let config = settings.cookie_config();
        assert_eq!(config.domain.as_deref(), Some("example.com"));
        assert_eq!(config.max_age, Some(Duration::from_secs(3600)));
        assert_eq!(config.same_site, Some(SameSite::Strict));
    }

    #[test]
    fn bad_value_is_settings_error() {
        let err = CsrfSettings::from_vars(vars(&[("CSRF_POLICY", "database")])).unwrap_err();
        assert!(matches!(err, ConfigError::Settings(_)));
    }

    #[test]
    fn json_accepts_list_or_string() {
        let from_list: CsrfSettings =
            serde_json::from_str(r#"{"trusted_origins": ["a.com", "b.com"]}"#).unwrap();
        let from_text: CsrfSettings =
            serde_json::from_str(r#"{"trusted_origins": "a.com\nb.com"}"#).unwrap();
        assert_eq!(from_list.trusted_origins, from_text.trusted_origins);
    }

    #[test]
    fn empty_names_disable_sources() {
        let settings = CsrfSettings {
            token_field: String::new(),
            header_name: String::new(),
            ..CsrfSettings::default()
        };
        let options = settings.options();
        assert_eq!(options.token_field, None);
        assert_eq!(options.header_name, None);
    }

    #[test]
    fn parse_origin_list_drops_blanks() {
        assert!(parse_origin_list("  , \n").is_empty());
    }
}
