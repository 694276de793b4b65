//! Epik API client.
//!
//! [`EpikClient`] owns the configuration and transport. Both sit behind
//! `Arc`s, so clones are cheap and every request works from the
//! configuration it started with. Domain operations are reached through
//! [`EpikClient::domains`].

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::envelope::ResultEnvelope;
use crate::error::Result;
use crate::params::{ParamValue, Params};
use crate::request::{build_request, HttpMethod, RequestDescriptor};
use crate::transport::{HttpTransport, Transport};
use crate::types::{DomainList, HostRecord, Operation, Period};
use crate::validation::{is_non_empty_string, is_number, is_object, Validator};

/// Key every domain operation nests its arguments under.
const DOMAINS_KEY: &str = "domains";

#[derive(Clone)]
pub struct EpikClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for EpikClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpikClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EpikClient {
    /// Client for the production API with default settings.
    pub fn new(signature: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(signature))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn signature(&self) -> &str {
        &self.config.signature
    }

    /// Replace the signature for requests issued after this call.
    pub fn set_signature(&mut self, signature: &str) {
        Arc::make_mut(&mut self.config).signature = signature.to_string();
    }

    /// A copy of this client using another signature. The transport is shared.
    pub fn with_signature(&self, signature: &str) -> Self {
        let mut client = self.clone();
        client.set_signature(signature);
        client
    }

    pub fn domains(&self) -> Domains<'_> {
        Domains { client: self }
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.config.validation)
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        operation: &str,
        params: &Params,
    ) -> RequestDescriptor {
        build_request(&self.config, method, operation, params)
    }

    /// Send a prepared request. `Err` means the request never got an HTTP
    /// response; vendor errors come back inside the envelope.
    #[instrument(skip(self, request), fields(operation = %request.operation))]
    pub async fn execute(&self, request: RequestDescriptor) -> Result<ResultEnvelope> {
        tracing::debug!(
            method = %request.method,
            path = %request.redacted_path(),
            "sending request"
        );
        let raw = self.transport.send(&request).await?;
        let envelope = raw.into_envelope();
        tracing::debug!(
            status = envelope.status_code,
            success = envelope.success,
            "response received"
        );
        Ok(envelope)
    }

    pub async fn call(&self, operation: Operation, params: &Params) -> Result<ResultEnvelope> {
        let request = self.build_request(operation.http_method(), operation.name(), params);
        self.execute(request).await
    }
}

/// Domain operations.
pub struct Domains<'a> {
    client: &'a EpikClient,
}

impl Domains<'_> {
    pub async fn lock(&self, domains: impl Into<DomainList>) -> Result<ResultEnvelope> {
        let domains = domains.into();
        self.client.validator().domains(domains.as_slice())?;
        self.client
            .call(Operation::Lock, &domain_list(domains))
            .await
    }

    pub async fn unlock(&self, domains: impl Into<DomainList>) -> Result<ResultEnvelope> {
        let domains = domains.into();
        self.client.validator().domains(domains.as_slice())?;
        self.client
            .call(Operation::Unlock, &domain_list(domains))
            .await
    }

    /// The auth code is sent with its case intact unless the client is set
    /// to upper-case the whole query.
    pub async fn set_auth_code(&self, domain: &str, auth_code: &str) -> Result<ResultEnvelope> {
        let validator = self.client.validator();
        validator.domain(domain)?;
        validator.check(
            is_non_empty_string(&Value::from(auth_code)),
            "Invalid auth code",
            "auth code must be a non-empty string",
        )?;
        self.client
            .call(
                Operation::SetAuthCode,
                &per_domain(domain, ParamValue::exact(auth_code)),
            )
            .await
    }

    pub async fn set_name_servers(
        &self,
        domain: &str,
        name_servers: impl Into<DomainList>,
    ) -> Result<ResultEnvelope> {
        let name_servers = name_servers.into().into_inner();
        let validator = self.client.validator();
        validator.domain(domain)?;
        validator.check(
            !name_servers.is_empty(),
            "Invalid name servers",
            "at least one name server is required",
        )?;
        for ns in &name_servers {
            validator.check(
                is_non_empty_string(&Value::from(ns.as_str())),
                "Invalid name server",
                format!("name server must be a non-empty string, got {:?}", ns),
            )?;
        }
        self.client
            .call(Operation::SetNameServers, &per_domain(domain, name_servers))
            .await
    }

    /// `info` is a map of WHOIS fields, e.g. `{"PRIVATE": 0, "AORGANIZATION": "Wood Co."}`.
    pub async fn set_whois_info(&self, domain: &str, info: &Value) -> Result<ResultEnvelope> {
        let validator = self.client.validator();
        validator.domain(domain)?;
        validator.check(
            is_object(info),
            "Invalid WHOIS info",
            "WHOIS info must be an object of field names to values",
        )?;
        self.client
            .call(Operation::SetWhoIsInfo, &per_domain(domain, ParamValue::from(info)))
            .await
    }

    pub async fn check_availability(
        &self,
        domains: impl Into<DomainList>,
    ) -> Result<ResultEnvelope> {
        let domains = domains.into();
        self.client.validator().domains(domains.as_slice())?;
        self.client
            .call(Operation::Check, &domain_list(domains))
            .await
    }

    pub async fn register(&self, domain: &str, period: Period) -> Result<ResultEnvelope> {
        self.client.validator().domain(domain)?;
        self.client
            .call(Operation::Create, &registration(domain, period.years()))
            .await
    }

    /// Register with an unchecked year count, e.g. one read from user input.
    /// Anything other than 1 to 10 years fails validation.
    pub async fn register_years(
        &self,
        domain: &str,
        years: impl Into<Value>,
    ) -> Result<ResultEnvelope> {
        let years = years.into();
        let validator = self.client.validator();
        validator.domain(domain)?;
        validator.check(
            is_number(&years) && Period::from_value(&years).is_some(),
            "Invalid registration period",
            format!("period must be a whole number of years from 1 to 10, got {}", years),
        )?;
        self.client
            .call(Operation::Create, &registration(domain, ParamValue::from(&years)))
            .await
    }

    pub async fn set_host_records(
        &self,
        domain: &str,
        records: &[HostRecord],
    ) -> Result<ResultEnvelope> {
        let validator = self.client.validator();
        validator.domain(domain)?;
        validator.check(
            !records.is_empty(),
            "Invalid host records",
            "at least one host record is required",
        )?;
        for record in records {
            validator.check(
                record.is_complete(),
                "Invalid host record",
                format!("host, type and data are required, got {:?}", record),
            )?;
        }
        let records: Vec<ParamValue> = records.iter().map(ParamValue::from).collect();
        self.client
            .call(Operation::SetHostRecords, &per_domain(domain, records))
            .await
    }
}

/// `domains[0]=a.com&domains[1]=b.com`
fn domain_list(domains: DomainList) -> Params {
    Params::new().with(DOMAINS_KEY, domains.into_inner())
}

/// `domains[<domain>]…=value`
fn per_domain(domain: &str, value: impl Into<ParamValue>) -> Params {
    Params::new().with(DOMAINS_KEY, Params::new().with(domain, value))
}

fn registration(domain: &str, period: impl Into<ParamValue>) -> Params {
    per_domain(domain, Params::new().with("period", period))
}
