//! Input validation.
//!
//! The predicates work on `serde_json::Value` so they can check the dynamic
//! parts of a call (WHOIS field maps, raw period values) the same way they
//! check plain strings. Failures are reported through [`warn`]; whether a
//! failure also stops the call is decided by [`ValidationMode`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::WARNING_CODE;
use crate::error::{EpikError, Result};

/// What happens when a check fails.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Warn and send the request anyway.
    #[default]
    Advisory,
    /// Warn and return [`EpikError::InvalidInput`] without sending anything.
    Strict,
}

impl std::str::FromStr for ValidationMode {
    type Err = EpikError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "strict" => Ok(Self::Strict),
            other => Err(EpikError::ConfigError(format!(
                "unknown validation mode '{}'",
                other
            ))),
        }
    }
}

pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

/// True only for `""`. Non-strings are not "empty strings".
pub fn is_string_empty(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

pub fn is_non_empty_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if !s.trim().is_empty())
}

/// Numbers, and strings holding a finite number.
pub fn is_number(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s.parse::<f64>().map(f64::is_finite).unwrap_or(false)
        }
        _ => false,
    }
}

pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

/// Plain objects only; arrays are not objects here.
pub fn is_object(value: &Value) -> bool {
    value.is_object()
}

/// Emit a non-fatal warning. Always returns `true`.
pub fn warn(title: &str, detail: &str) -> bool {
    tracing::warn!(code = WARNING_CODE, title, detail, "{}", title);
    true
}

/// Applies a [`ValidationMode`] to individual checks.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    mode: ValidationMode,
}

impl Validator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Passes when `ok` holds. Otherwise warns, and in strict mode fails.
    pub fn check(&self, ok: bool, title: &str, detail: impl Into<String>) -> Result<()> {
        if ok {
            return Ok(());
        }
        let detail = detail.into();
        warn(title, &detail);
        match self.mode {
            ValidationMode::Advisory => Ok(()),
            ValidationMode::Strict => Err(EpikError::InvalidInput {
                title: title.to_string(),
                detail,
            }),
        }
    }

    pub fn domain(&self, domain: &str) -> Result<()> {
        self.check(
            is_non_empty_string(&Value::from(domain)),
            "Invalid domain",
            format!("domain must be a non-empty string, got {:?}", domain),
        )
    }

    pub fn domains(&self, domains: &[String]) -> Result<()> {
        self.check(
            !domains.is_empty(),
            "Invalid domains",
            "at least one domain is required",
        )?;
        for domain in domains {
            self.domain(domain)?;
        }
        Ok(())
    }
}
