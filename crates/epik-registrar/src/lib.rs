//! Async client for the Epik.com registrar API.
//!
//! Every operation is a single HTTPS call to the API root. The operation
//! name, signature, version and a bracket-encoded parameter bag travel in
//! the query string, and the XML answer is decoded into a
//! [`ResultEnvelope`]:
//!
//! ```no_run
//! use epik_registrar::{EpikClient, Period};
//!
//! # async fn example() -> epik_registrar::Result<()> {
//! let client = EpikClient::new("0000-0000-0000-0000")?;
//!
//! let envelope = client.domains().check_availability("giraffecookie.com").await?;
//! if envelope.success {
//!     println!("{}", envelope.body);
//! }
//!
//! client.domains().register("giraffecookie.com", Period::OneYear).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Two kinds of failure are kept apart. A call that never got an HTTP
//! response returns `Err(EpikError)`. A call the API answered with an
//! error status returns `Ok` with `success == false`; use
//! [`ResultEnvelope::into_result`] to turn that into an error.
//!
//! Invalid arguments are logged as warnings through `tracing` and, by
//! default, sent anyway. Set [`ValidationMode::Strict`] to reject them
//! before any request is made.

pub mod client;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::{Domains, EpikClient};
pub use config::{ClientConfig, Scheme};
pub use envelope::{ResultEnvelope, VendorRejection};
pub use error::{EpikError, Result};
pub use params::{CaseNormalization, ParamValue, Params};
pub use request::{build_path, build_request, HttpMethod, RequestDescriptor};
pub use response::{decode, DecodeOutcome, DecodedBody};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::{DomainList, HostRecord, Operation, Period};
pub use validation::{ValidationMode, Validator};
