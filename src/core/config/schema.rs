//! core::config::schema
//!
//! Settings file schema.
//!
//! # Validation
//!
//! Values are validated after parsing. Plain HTTP for API calls must be
//! allowed explicitly; a file asking for `http` without the allowance is
//! rejected rather than silently downgraded.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Tool settings.
///
/// # Example
///
/// ```toml
/// [api]
/// scheme = "https"
///
/// [browser]
/// command = "firefox --new-tab"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// API transport policy
    pub api: ApiSettings,

    /// Web browser used by browse and compare
    pub browser: BrowserSettings,
}

impl Settings {
    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.browser.validate()
    }
}

/// URL scheme for API requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiScheme {
    /// TLS (default)
    #[default]
    Https,
    /// Plain HTTP, only with `allow_insecure_http`
    Http,
}

impl ApiScheme {
    /// The scheme as it appears in a URL.
    pub fn as_str(self) -> &'static str {
        match self {
            ApiScheme::Https => "https",
            ApiScheme::Http => "http",
        }
    }
}

/// `[api]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSettings {
    /// Scheme used to reach the API
    pub scheme: ApiScheme,

    /// Permit `scheme = "http"`
    pub allow_insecure_http: bool,
}

impl ApiSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheme == ApiScheme::Http && !self.allow_insecure_http {
            return Err(ConfigError::InvalidValue(
                "api.scheme = \"http\" requires api.allow_insecure_http = true".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[browser]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserSettings {
    /// Launcher command; may include arguments
    pub command: Option<String>,
}

impl BrowserSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(command) = &self.command {
            if command.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "browser.command cannot be empty".to_string(),
                ));
            }
            shell_words::split(command).map_err(|e| {
                ConfigError::InvalidValue(format!("browser.command is not a valid command: {e}"))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_secure() {
        let settings = Settings::default();
        assert_eq!(settings.api.scheme, ApiScheme::Https);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn http_needs_allowance() {
        let settings: Settings = toml::from_str("[api]\nscheme = \"http\"\n").unwrap();
        assert!(settings.validate().is_err());

        let settings: Settings =
            toml::from_str("[api]\nscheme = \"http\"\nallow_insecure_http = true\n").unwrap();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<Settings, _> = toml::from_str("colour = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn browser_command_must_split() {
        let settings: Settings = toml::from_str("[browser]\ncommand = \"open 'x\"\n").unwrap();
        assert!(settings.validate().is_err());
    }
}
