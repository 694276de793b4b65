//! Parameter bags and their query-string encoding.
//!
//! Parameters are flattened the way the API expects: nested keys go in
//! brackets and arrays use their index, so
//! `domains: {"example.com": ["ns1", "ns2"]}` becomes
//! `DOMAINS[EXAMPLE.COM][0]=NS1&DOMAINS[EXAMPLE.COM][1]=NS2`
//! (with the brackets percent-encoded).

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EpikError, Result};

/// Everything except the RFC 3986 unreserved characters.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// How far upper-casing reaches when a bag is encoded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CaseNormalization {
    /// Keys and ordinary values are upper-cased; [`ParamValue::Exact`]
    /// values are sent as given.
    #[default]
    PerField,
    /// The whole encoded string is upper-cased, `Exact` values included.
    /// This is how the API has historically been called.
    WholeQuery,
}

impl std::str::FromStr for CaseNormalization {
    type Err = EpikError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-field" | "per_field" | "perfield" => Ok(Self::PerField),
            "whole-query" | "whole_query" | "wholequery" | "legacy" => Ok(Self::WholeQuery),
            other => Err(EpikError::ConfigError(format!(
                "unknown case normalization '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    /// Case-sensitive text such as an auth code.
    Exact(String),
    Number(i64),
    List(Vec<ParamValue>),
    Map(Params),
}

impl ParamValue {
    pub fn exact(value: impl Into<String>) -> Self {
        ParamValue::Exact(value.into())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Number(i64::from(value))
    }
}

impl From<Params> for ParamValue {
    fn from(value: Params) -> Self {
        ParamValue::Map(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<&Value> for ParamValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ParamValue::Text(String::new()),
            Value::Bool(b) => ParamValue::Text(b.to_string()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Number(i),
                None => ParamValue::Text(n.to_string()),
            },
            Value::String(s) => ParamValue::Text(s.clone()),
            Value::Array(items) => ParamValue::List(items.iter().map(ParamValue::from).collect()),
            Value::Object(map) => {
                let mut params = Params::new();
                for (key, item) in map {
                    params.insert(key.as_str(), ParamValue::from(item));
                }
                ParamValue::Map(params)
            }
        }
    }
}

/// Ordered parameter bag. Encoding follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into `(bracketed key, value)` pairs, before any case change
    /// or percent-encoding.
    pub fn flatten(&self) -> Vec<(String, FlatValue<'_>)> {
        let mut out = Vec::new();
        for (key, value) in &self.entries {
            flatten_into(key.clone(), value, &mut out);
        }
        out
    }

    /// Encode as a query string.
    pub fn encode(&self, case: CaseNormalization) -> String {
        let pairs: Vec<String> = self
            .flatten()
            .into_iter()
            .map(|(key, value)| {
                let key = key.to_uppercase();
                let value = match value {
                    FlatValue::Text(s) => s.to_uppercase(),
                    FlatValue::Exact(s) => s.to_string(),
                    FlatValue::Number(n) => n.to_string(),
                };
                format!("{}={}", encode_component(&key), encode_component(&value))
            })
            .collect();
        let query = pairs.join("&");
        match case {
            CaseNormalization::PerField => query,
            CaseNormalization::WholeQuery => query.to_uppercase(),
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// A leaf of a flattened bag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlatValue<'a> {
    Text(&'a str),
    Exact(&'a str),
    Number(i64),
}

fn flatten_into<'a>(prefix: String, value: &'a ParamValue, out: &mut Vec<(String, FlatValue<'a>)>) {
    match value {
        ParamValue::Text(s) => out.push((prefix, FlatValue::Text(s))),
        ParamValue::Exact(s) => out.push((prefix, FlatValue::Exact(s))),
        ParamValue::Number(n) => out.push((prefix, FlatValue::Number(*n))),
        ParamValue::List(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", prefix, index), item, out);
            }
        }
        ParamValue::Map(params) => {
            for (key, item) in &params.entries {
                flatten_into(format!("{}[{}]", prefix, key), item, out);
            }
        }
    }
}

pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_COMPONENT).to_string()
}
