//! HTTP transport.
//!
//! [`Transport`] is the seam between request building and the network. The
//! default implementation is [`HttpTransport`] over reqwest; tests plug in
//! canned responses.

use reqwest::Client;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::envelope::ResultEnvelope;
use crate::error::{EpikError, Result};
use crate::request::RequestDescriptor;
use crate::response::{decode, is_html_document};
use crate::validation::warn;

/// Status line and fully buffered body of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    pub status_message: String,
    pub body: String,
}

impl RawResponse {
    /// Decode the body and wrap it with the status. An HTML page in place of
    /// XML means the API could not read the request; that is reported as a
    /// warning and decoding still goes ahead.
    pub fn into_envelope(self) -> ResultEnvelope {
        let html = is_html_document(&self.body);
        if html {
            warn(
                "Malformed request",
                "the API answered with an HTML page instead of XML; check the request parameters",
            );
        }
        let decoded = decode(&self.body);
        let mut envelope = ResultEnvelope::new(self.status_code, self.status_message, decoded);
        envelope.html_error_page = html;
        envelope
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Issue the request and buffer the response. Errors only for
    /// transport-level failures; any HTTP status is a response.
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EpikError::ConfigError(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(operation = %request.operation, method = %request.method))]
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let response = self
            .client
            .request(request.method.into(), request.url())
            .send()
            .await
            .map_err(|e| EpikError::HttpError(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EpikError::HttpError(e.to_string()))?;

        Ok(RawResponse {
            status_code: status.as_u16(),
            status_message: status.canonical_reason().unwrap_or_default().to_string(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::DecodeOutcome;
    use serde_json::json;
    use tracing_test::traced_test;

    fn raw(status_code: u16, status_message: &str, body: &str) -> RawResponse {
        RawResponse {
            status_code,
            status_message: status_message.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn ok_response_becomes_successful_envelope() {
        let envelope = raw(200, "OK", "<response><test>1</test></response>").into_envelope();
        assert!(envelope.success);
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.status_message, "OK");
        assert_eq!(envelope.body, json!({"test": 1}));
        assert!(!envelope.html_error_page);
    }

    #[test]
    fn not_found_is_unsuccessful_whatever_the_body() {
        for body in ["", "<response><test>1</test></response>", "garbage"] {
            let envelope = raw(404, "Not Found", body).into_envelope();
            assert!(!envelope.success);
            assert_eq!(envelope.status_code, 404);
        }
    }

    #[test]
    #[traced_test]
    fn html_page_warns_and_decodes_to_empty_body() {
        let page = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>Error</body></html>";
        let envelope = raw(200, "OK", page).into_envelope();
        assert!(envelope.success);
        assert!(envelope.html_error_page);
        assert_eq!(envelope.body, json!({}));
        assert!(matches!(envelope.decode, DecodeOutcome::Failed(_)));
        assert!(logs_contain("Malformed request"));
    }

    #[test]
    fn builds_client_from_config() {
        let mut config = ClientConfig::new("sig");
        config.timeout_secs = None;
        assert!(HttpTransport::new(&config).is_ok());
    }
}
