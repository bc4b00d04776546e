//! Engine configuration.
//!
//! Loaded from TOML. Every section is optional and falls back to defaults,
//! except `api.base_url` when a client is built from the configuration.
//!
//! ```toml
//! [api]
//! base_url = "https://cabinet.example.com/api"
//! token_env = "CABINET_API_TOKEN"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [currency]
//! symbol = "₽"
//! symbol_position = "suffix"
//! thousands_separator = " "
//! decimal_separator = ","
//! hide_zero_minor = true
//!
//! [servers]
//! trial_marker = "trial"
//! ```

use std::{path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::{
    error::{PricingError, Result},
    money::{CurrencyFormat, MoneyFormatter},
    purchase::DEFAULT_TRIAL_SERVER_MARKER,
};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CabinetConfig {
    /// Cabinet backend connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Currency display conventions.
    #[serde(default)]
    pub currency: CurrencyFormat,

    /// Server filtering.
    #[serde(default)]
    pub servers: ServersConfig,
}

impl CabinetConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Config`] if the document does not parse or
    /// fails [`validate`](Self::validate).
    ///
    /// # Examples
    ///
    /// ```
    /// use cabinet_pricing::config::CabinetConfig;
    ///
    /// let config = CabinetConfig::from_toml_str(r#"
    ///     [api]
    ///     base_url = "https://cabinet.example.com/api"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.api.timeout_secs, 30);
    /// assert_eq!(config.servers.trial_marker, "trial");
    /// ```
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document)
            .map_err(|e| PricingError::Config(format!("failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Config`] if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            PricingError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&document)
    }

    /// Validates all sections.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.servers.validate()?;
        Ok(())
    }

    /// Formatter for the configured currency.
    #[must_use]
    pub fn formatter(&self) -> MoneyFormatter {
        MoneyFormatter::new(self.currency.clone())
    }
}

/// Cabinet backend connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the cabinet API; empty when only offline pricing is used.
    #[serde(default)]
    pub base_url: String,

    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Validates the connection settings.
    ///
    /// - `base_url`, when set, must be an `http` or `https` URL with a host
    /// - `timeout_secs` must be 1-300 seconds
    /// - `connect_timeout_secs` must be 1-60 seconds
    /// - `token_env` must be a valid environment variable name
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Config`] if any value is invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.is_empty() {
            self.parsed_base_url()?;
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(PricingError::Config("timeout_secs must be between 1 and 300".to_owned()));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(PricingError::Config(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        validate_env_var_name(&self.token_env)
    }

    /// Parses `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Config`] if the URL is missing, malformed, has
    /// no host or uses a scheme other than `http`/`https`.
    pub fn parsed_base_url(&self) -> Result<Url> {
        if self.base_url.is_empty() {
            return Err(PricingError::Config("api.base_url is not set".to_owned()));
        }
        let url = Url::parse(&self.base_url).map_err(|e| {
            PricingError::Config(format!("invalid base_url '{}': {e}", self.base_url))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PricingError::Config(format!(
                "base_url must use http or https, got: {}",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(PricingError::Config(format!("base_url has no host: {}", self.base_url)));
        }

        Ok(url)
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_token_env() -> String {
    "CABINET_API_TOKEN".to_owned()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

/// Server filtering settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServersConfig {
    /// Case-insensitive name marker of servers hidden from trial purchases.
    #[serde(default = "default_trial_marker")]
    pub trial_marker: String,
}

impl Default for ServersConfig {
    fn default() -> Self {
        Self { trial_marker: default_trial_marker() }
    }
}

impl ServersConfig {
    /// Validates the server settings.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Config`] if the marker is blank.
    pub fn validate(&self) -> Result<()> {
        if self.trial_marker.trim().is_empty() {
            return Err(PricingError::Config("servers.trial_marker cannot be empty".to_owned()));
        }
        Ok(())
    }
}

fn default_trial_marker() -> String {
    DEFAULT_TRIAL_SERVER_MARKER.to_owned()
}

fn validate_env_var_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(PricingError::Config("token_env cannot be empty".to_owned()));
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(PricingError::Config(format!(
            "token_env must start with letter or underscore: {name}"
        )));
    }
    if let Some(ch) = chars.find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(PricingError::Config(format!(
            "token_env contains invalid character '{ch}': {name}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Kopeks, SymbolPosition};

    #[test]
    fn test_default_config_is_valid() {
        let config = CabinetConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.api.base_url.is_empty());
        assert_eq!(config.api.token_env, "CABINET_API_TOKEN");
    }

    #[test]
    fn test_empty_document() {
        let config = CabinetConfig::from_toml_str("").unwrap();
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.api.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_complete_config() {
        let toml = r#"
            [api]
            base_url = "https://cabinet.example.com/api"
            token_env = "MY_TOKEN"
            timeout_secs = 15
            connect_timeout_secs = 5

            [currency]
            symbol = "$"
            symbol_position = "prefix"
            thousands_separator = ","
            decimal_separator = "."
            hide_zero_minor = false

            [servers]
            trial_marker = "demo"
        "#;

        let config = CabinetConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.api.parsed_base_url().unwrap().host_str(), Some("cabinet.example.com"));
        assert_eq!(config.currency.symbol_position, SymbolPosition::Prefix);
        assert_eq!(config.servers.trial_marker, "demo");
        assert_eq!(config.formatter().format(Kopeks::new(123_456)), "$1,234.56");
    }

    #[test]
    fn test_plain_http_allowed() {
        let config = CabinetConfig::from_toml_str(
            r#"
            [api]
            base_url = "http://127.0.0.1:8080"
        "#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        let err = CabinetConfig::from_toml_str(
            r#"
            [api]
            base_url = "ftp://cabinet.example.com"
        "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_malformed_url_rejected() {
        let result = CabinetConfig::from_toml_str(
            r#"
            [api]
            base_url = "not a url"
        "#,
        );
        assert!(matches!(result, Err(PricingError::Config(_))));
    }

    #[test]
    fn test_missing_base_url_when_required() {
        let err = ApiConfig::default().parsed_base_url().unwrap_err();
        assert!(err.to_string().contains("not set"));
    }

    #[test]
    fn test_timeout_bounds() {
        let api = ApiConfig { timeout_secs: 0, ..ApiConfig::default() };
        assert!(api.validate().is_err());

        let api = ApiConfig { connect_timeout_secs: 61, ..ApiConfig::default() };
        assert!(api.validate().is_err());
    }

    #[test]
    fn test_token_env_validated() {
        for invalid in ["", "1TOKEN", "MY-TOKEN"] {
            let api = ApiConfig { token_env: invalid.to_owned(), ..ApiConfig::default() };
            assert!(api.validate().is_err(), "{invalid:?} should be rejected");
        }
    }

    #[test]
    fn test_blank_trial_marker_rejected() {
        let result = CabinetConfig::from_toml_str(
            r#"
            [servers]
            trial_marker = "  "
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_syntax() {
        let result = CabinetConfig::from_toml_str("[api\nbase_url = ");
        assert!(matches!(result, Err(PricingError::Config(_))));
    }
}
