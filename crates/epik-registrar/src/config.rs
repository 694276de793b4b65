//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{API_VERSION, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HOST, PORT};
use crate::error::{EpikError, Result};
use crate::params::CaseNormalization;
use crate::validation::ValidationMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Https,
    Http,
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Https => write!(f, "https"),
            Self::Http => write!(f, "http"),
        }
    }
}

impl std::str::FromStr for Scheme {
    type Err = EpikError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "https" => Ok(Self::Https),
            "http" => Ok(Self::Http),
            other => Err(EpikError::ConfigError(format!("unknown scheme '{}'", other))),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Pre-shared signature sent with every request.
    pub signature: String,
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub api_version: String,
    /// Whole-request timeout in seconds. `None` leaves it to reqwest.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
    pub validation: ValidationMode,
    pub case_normalization: CaseNormalization,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signature: String::new(),
            scheme: Scheme::Https,
            host: HOST.to_string(),
            port: PORT,
            api_version: API_VERSION.to_string(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            validation: ValidationMode::Advisory,
            case_normalization: CaseNormalization::PerField,
        }
    }
}

// Keep the signature out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("signature", &"***")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("validation", &self.validation)
            .field("case_normalization", &self.case_normalization)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn strict(mut self) -> Self {
        self.validation = ValidationMode::Strict;
        self
    }

    /// Load from `EPIK_*` environment variables. `EPIK_SIGNATURE` is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signature = lookup("EPIK_SIGNATURE")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| EpikError::ConfigError("EPIK_SIGNATURE is not set".to_string()))?;
        let mut config = Self::new(signature.trim());

        if let Some(host) = lookup("EPIK_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("EPIK_PORT") {
            config.port = port
                .parse()
                .map_err(|_| EpikError::ConfigError(format!("invalid EPIK_PORT '{}'", port)))?;
        }
        if let Some(scheme) = lookup("EPIK_SCHEME") {
            config.scheme = scheme.parse()?;
        }
        if let Some(version) = lookup("EPIK_API_VERSION") {
            config.api_version = version;
        }
        if let Some(timeout) = lookup("EPIK_TIMEOUT_SECS") {
            let secs: u64 = timeout.parse().map_err(|_| {
                EpikError::ConfigError(format!("invalid EPIK_TIMEOUT_SECS '{}'", timeout))
            })?;
            config.timeout_secs = if secs == 0 { None } else { Some(secs) };
        }
        if let Some(mode) = lookup("EPIK_VALIDATION") {
            config.validation = mode.parse()?;
        }
        if let Some(case) = lookup("EPIK_CASE") {
            config.case_normalization = case.parse()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_target_production_api() {
        let config = ClientConfig::new("0000-0000-0000-0000");
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.host, "userapi.epik.com");
        assert_eq!(config.port, 443);
        assert_eq!(config.api_version, "1");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.validation, ValidationMode::Advisory);
        assert_eq!(config.case_normalization, CaseNormalization::PerField);
    }

    #[test]
    fn loads_overrides_from_environment() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("EPIK_SIGNATURE", " abc "),
            ("EPIK_HOST", "sandbox.example"),
            ("EPIK_PORT", "8443"),
            ("EPIK_SCHEME", "http"),
            ("EPIK_TIMEOUT_SECS", "0"),
            ("EPIK_VALIDATION", "strict"),
            ("EPIK_CASE", "whole-query"),
        ]))
        .expect("config");
        assert_eq!(config.signature, "abc");
        assert_eq!(config.host, "sandbox.example");
        assert_eq!(config.port, 8443);
        assert_eq!(config.scheme, Scheme::Http);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.case_normalization, CaseNormalization::WholeQuery);
    }

    #[test]
    fn missing_signature_or_bad_values_fail() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[])),
            Err(EpikError::ConfigError(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("EPIK_SIGNATURE", "s"), ("EPIK_PORT", "https")])),
            Err(EpikError::ConfigError(_))
        ));
    }

    #[test]
    fn debug_hides_signature() {
        let rendered = format!("{:?}", ClientConfig::new("very-secret"));
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("userapi.epik.com"));
    }

    #[test]
    fn deserializes_partial_config() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"signature":"s","validation":"strict"}"#).expect("json");
        assert_eq!(config.signature, "s");
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.port, 443);
    }
}
