//! The uniform result of every API call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::response::{DecodeOutcome, DecodedBody};

/// `{success, statusMessage, statusCode, body}`.
///
/// `success` depends only on the status code. The decode outcome and the
/// HTML flag are kept alongside but are not part of the serialized shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub success: bool,
    pub status_message: String,
    pub status_code: u16,
    pub body: Value,
    #[serde(skip)]
    pub decode: DecodeOutcome,
    #[serde(skip)]
    pub html_error_page: bool,
}

impl ResultEnvelope {
    pub fn new(status_code: u16, status_message: impl Into<String>, decoded: DecodedBody) -> Self {
        Self {
            success: is_success(status_code),
            status_message: status_message.into(),
            status_code,
            body: Value::Object(decoded.body),
            decode: decoded.outcome,
            html_error_page: false,
        }
    }

    pub fn body_map(&self) -> Option<&Map<String, Value>> {
        self.body.as_object()
    }

    /// Split into the accepted body or the vendor's rejection.
    pub fn into_result(self) -> Result<Value, VendorRejection> {
        if self.success {
            Ok(self.body)
        } else {
            Err(VendorRejection {
                status_code: self.status_code,
                status_message: self.status_message,
                body: self.body,
            })
        }
    }
}

pub fn is_success(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

/// A call the API answered with a status outside `[200, 300)`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Epik API rejected the request: {status_code} {status_message}")]
pub struct VendorRejection {
    pub status_code: u16,
    pub status_message: String,
    pub body: Value,
}
