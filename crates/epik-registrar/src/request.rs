//! Request construction.
//!
//! Every call goes to the root path. The operation, signature and version
//! ride in the query string ahead of the encoded parameter bag:
//!
//! `/?METHOD=lock&SIGNATURE=…&VERSION=1&DOMAINS%5B0%5D=EXAMPLE.COM`

use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, Scheme};
use crate::constants::{ACCEPTED_METHODS, ROOT_PATH};
use crate::error::{EpikError, Result};
use crate::params::{encode_component, CaseNormalization, Params};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = EpikError;

    /// Case-insensitive; only the methods in `ACCEPTED_METHODS` parse.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            m if m == ACCEPTED_METHODS[0] => Ok(Self::Get),
            m if m == ACCEPTED_METHODS[1] => Ok(Self::Post),
            _ => Err(EpikError::UnsupportedMethod(upper)),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Everything needed to issue one call. Built fresh for each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Operation name, kept for logging.
    pub operation: String,
}

impl RequestDescriptor {
    pub fn url(&self) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }

    /// The path with the signature value masked.
    pub fn redacted_path(&self) -> String {
        let Some(start) = self.path.find("SIGNATURE=") else {
            return self.path.clone();
        };
        let value_start = start + "SIGNATURE=".len();
        let value_end = self.path[value_start..]
            .find('&')
            .map(|i| value_start + i)
            .unwrap_or(self.path.len());
        format!("{}***{}", &self.path[..value_start], &self.path[value_end..])
    }
}

/// Assemble the root path and query for one operation.
pub fn build_path(
    operation: &str,
    params: &Params,
    signature: &str,
    api_version: &str,
    case: CaseNormalization,
) -> String {
    format!(
        "{}?METHOD={}&SIGNATURE={}&VERSION={}&{}",
        ROOT_PATH,
        encode_component(operation),
        encode_component(signature),
        encode_component(api_version),
        params.encode(case),
    )
}

pub fn build_request(
    config: &ClientConfig,
    method: HttpMethod,
    operation: &str,
    params: &Params,
) -> RequestDescriptor {
    RequestDescriptor {
        method,
        scheme: config.scheme,
        host: config.host.clone(),
        port: config.port,
        path: build_path(
            operation,
            params,
            &config.signature,
            &config.api_version,
            config.case_normalization,
        ),
        operation: operation.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HOST, PORT};

    #[test]
    fn lock_path_carries_method_signature_version_and_domain() {
        let params = Params::new().with("domains", vec!["a.com"]);
        let path = build_path("lock", &params, "SIG123", "1", CaseNormalization::PerField);
        assert_eq!(path, "/?METHOD=lock&SIGNATURE=SIG123&VERSION=1&DOMAINS%5B0%5D=A.COM");
        assert!(path.contains("METHOD=lock"));
        assert!(path.contains("SIGNATURE=SIG123"));
        assert!(path.contains("VERSION=1"));
    }

    #[test]
    fn empty_bag_leaves_trailing_separator() {
        let path = build_path("check", &Params::new(), "S", "1", CaseNormalization::WholeQuery);
        assert_eq!(path, "/?METHOD=check&SIGNATURE=S&VERSION=1&");
    }

    #[test]
    fn methods_parse_case_insensitively() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!(" Get ".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        let err = "delete".parse::<HttpMethod>().unwrap_err();
        assert!(matches!(err, EpikError::UnsupportedMethod(ref m) if m == "DELETE"));
    }

    #[test]
    fn descriptor_targets_configured_host() {
        let config = ClientConfig::new("0000-0000-0000-0000");
        let params = Params::new().with("domains", vec!["giraffecookie.com"]);
        let request = build_request(&config, HttpMethod::Post, "lock", &params);
        assert_eq!(request.host, HOST);
        assert_eq!(request.port, PORT);
        assert_eq!(request.operation, "lock");
        assert_eq!(
            request.url(),
            "https://userapi.epik.com:443/?METHOD=lock&SIGNATURE=0000-0000-0000-0000&VERSION=1&DOMAINS%5B0%5D=GIRAFFECOOKIE.COM"
        );
    }

    #[test]
    fn redacts_signature() {
        let config = ClientConfig::new("secret-token");
        let request = build_request(&config, HttpMethod::Get, "check", &Params::new());
        assert_eq!(request.redacted_path(), "/?METHOD=check&SIGNATURE=***&VERSION=1&");
        assert!(!request.redacted_path().contains("secret-token"));
    }
}
