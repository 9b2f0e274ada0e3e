use std::fmt;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "hicd-records";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Landing page fetched before login to obtain session cookies.
pub const DEFAULT_LANDING_URL: &str =
    "https://hicd-hospub.sesau.ro.gov.br/prontuario/frontend/index.php";

/// Endpoint receiving the login (and logout) form.
pub const DEFAULT_LOGIN_URL: &str =
    "https://hicd-hospub.sesau.ro.gov.br/prontuario/frontend/controller/loginController.php";

/// Base URL of the patient resource API (`/pacientes/{id}/...`).
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// The login endpoint answers `ok|...` on success; anything else is a rejection.
pub const LOGIN_SUCCESS_MARKER: &str = "ok";

/// Source tag stamped on every extracted record.
pub const SOURCE_TAG: &str = "HICD";

/// Schema version of the evolution record layout.
pub const SCHEMA_VERSION: &str = "1.0";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "hicd_records=info,reqwest=warn"
}

/// Endpoints and transport settings for one HICD backend.
#[derive(Clone, PartialEq, Eq)]
pub struct HicdConfig {
    pub landing_url: String,
    pub login_url: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Optional bearer token for API gateways sitting in front of the backend.
    pub api_token: Option<String>,
}

impl Default for HicdConfig {
    fn default() -> Self {
        Self {
            landing_url: DEFAULT_LANDING_URL.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            api_token: None,
        }
    }
}

impl fmt::Debug for HicdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HicdConfig")
            .field("landing_url", &self.landing_url)
            .field("login_url", &self.login_url)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HicdConfig {
    /// Defaults overridden by `HICD_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("HICD_LANDING_URL") {
            config.landing_url = url;
        }
        if let Some(url) = non_empty("HICD_LOGIN_URL") {
            config.login_url = url;
        }
        if let Some(url) = non_empty("HICD_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(raw) = non_empty("HICD_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "Ignoring invalid HICD_TIMEOUT_SECS"),
            }
        }
        config.api_token = non_empty("HICD_API_TOKEN");
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API base without trailing slash, ready for path joining.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_hicd_frontend() {
        let config = HicdConfig::default();
        assert!(config.landing_url.ends_with("/index.php"));
        assert!(config.login_url.ends_with("/loginController.php"));
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn env_overrides_applied() {
        let config = HicdConfig::from_lookup(lookup_from(&[
            ("HICD_API_BASE_URL", "https://gateway.local/api/"),
            ("HICD_TIMEOUT_SECS", "5"),
            ("HICD_API_TOKEN", "secret"),
        ]));
        assert_eq!(config.api_base(), "https://gateway.local/api");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.landing_url, DEFAULT_LANDING_URL);
    }

    #[test]
    fn invalid_timeout_keeps_default() {
        let config = HicdConfig::from_lookup(lookup_from(&[("HICD_TIMEOUT_SECS", "abc")]));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let config = HicdConfig::from_lookup(lookup_from(&[("HICD_TIMEOUT_SECS", "0")]));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn blank_values_ignored() {
        let config = HicdConfig::from_lookup(lookup_from(&[
            ("HICD_LOGIN_URL", "  "),
            ("HICD_API_TOKEN", ""),
        ]));
        assert_eq!(config.login_url, DEFAULT_LOGIN_URL);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn debug_redacts_api_token() {
        let config = HicdConfig {
            api_token: Some("gateway-secret".into()),
            ..HicdConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("gateway-secret"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("landing_url"));
    }
}
