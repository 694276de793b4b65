//! Argument types for the domain operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{ParamValue, Params};
use crate::request::HttpMethod;
use crate::validation::is_number;

/// API operations, sent as the `METHOD` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Lock,
    Unlock,
    SetAuthCode,
    SetNameServers,
    SetWhoIsInfo,
    Check,
    Create,
    SetHostRecords,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::SetAuthCode => "setAuthCode",
            Self::SetNameServers => "setNameServers",
            Self::SetWhoIsInfo => "setWhoIsInfo",
            Self::Check => "check",
            Self::Create => "create",
            Self::SetHostRecords => "setHostRecords",
        }
    }

    /// Lookups use GET; everything that changes state is a POST with an
    /// empty body.
    pub fn http_method(&self) -> HttpMethod {
        match self {
            Self::Check => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Registration period, one to ten years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Period {
    OneYear = 1,
    TwoYears = 2,
    ThreeYears = 3,
    FourYears = 4,
    FiveYears = 5,
    SixYears = 6,
    SevenYears = 7,
    EightYears = 8,
    NineYears = 9,
    TenYears = 10,
}

impl Period {
    pub const ALL: [Period; 10] = [
        Period::OneYear,
        Period::TwoYears,
        Period::ThreeYears,
        Period::FourYears,
        Period::FiveYears,
        Period::SixYears,
        Period::SevenYears,
        Period::EightYears,
        Period::NineYears,
        Period::TenYears,
    ];

    pub fn years(self) -> u32 {
        self as u32
    }

    pub fn from_years(years: u32) -> Option<Period> {
        Self::ALL.iter().copied().find(|p| p.years() == years)
    }

    /// Accepts numbers and numeric strings holding a whole year count.
    pub fn from_value(value: &Value) -> Option<Period> {
        if !is_number(value) {
            return None;
        }
        let years = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        }?;
        u32::try_from(years).ok().and_then(Self::from_years)
    }
}

impl TryFrom<u32> for Period {
    type Error = String;

    fn try_from(years: u32) -> Result<Self, Self::Error> {
        Period::from_years(years)
            .ok_or_else(|| format!("registration period must be 1-10 years, got {}", years))
    }
}

impl From<Period> for u32 {
    fn from(period: Period) -> u32 {
        period.years()
    }
}

/// One or more domain names. A single name converts into a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainList(Vec<String>);

impl DomainList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for DomainList {
    fn from(domain: &str) -> Self {
        DomainList(vec![domain.to_string()])
    }
}

impl From<String> for DomainList {
    fn from(domain: String) -> Self {
        DomainList(vec![domain])
    }
}

impl From<&String> for DomainList {
    fn from(domain: &String) -> Self {
        DomainList(vec![domain.clone()])
    }
}

impl From<Vec<String>> for DomainList {
    fn from(domains: Vec<String>) -> Self {
        DomainList(domains)
    }
}

impl From<Vec<&str>> for DomainList {
    fn from(domains: Vec<&str>) -> Self {
        DomainList(domains.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for DomainList {
    fn from(domains: &[&str]) -> Self {
        DomainList(domains.iter().map(|d| d.to_string()).collect())
    }
}

impl From<&[String]> for DomainList {
    fn from(domains: &[String]) -> Self {
        DomainList(domains.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for DomainList {
    fn from(domains: [&str; N]) -> Self {
        DomainList(domains.iter().map(|d| d.to_string()).collect())
    }
}

/// A DNS host record as accepted by `setHostRecords`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub host: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub data: String,
    pub ttl: u32,
    /// Priority for MX and SRV records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux: Option<u32>,
}

impl HostRecord {
    pub fn new(host: &str, record_type: &str, data: &str, ttl: u32) -> Self {
        Self {
            host: host.to_string(),
            record_type: record_type.to_string(),
            data: data.to_string(),
            ttl,
            aux: None,
        }
    }

    pub fn with_aux(mut self, aux: u32) -> Self {
        self.aux = Some(aux);
        self
    }

    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty()
            && !self.record_type.trim().is_empty()
            && !self.data.trim().is_empty()
    }
}

impl From<&HostRecord> for ParamValue {
    fn from(record: &HostRecord) -> Self {
        let mut params = Params::new()
            .with("host", record.host.as_str())
            .with("type", record.record_type.as_str())
            .with("data", record.data.as_str())
            .with("ttl", record.ttl);
        if let Some(aux) = record.aux {
            params.insert("aux", aux);
        }
        ParamValue::Map(params)
    }
}
