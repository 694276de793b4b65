//! Fixed values of the Epik.com user API.

/// Base URL of the API. Every operation is a query on the root path.
pub const BASE_URL: &str = "https://userapi.epik.com/";

pub const HOST: &str = "userapi.epik.com";

pub const PORT: u16 = 443;

pub const ROOT_PATH: &str = "/";

/// API version sent as `VERSION` on every request.
pub const API_VERSION: &str = "1";

/// HTTP methods the API accepts.
pub const ACCEPTED_METHODS: [&str; 2] = ["GET", "POST"];

/// Name of the conventional wrapper element around response payloads.
pub const RESPONSE_WRAPPER: &str = "response";

/// `code` field attached to every warning this crate emits.
pub const WARNING_CODE: &str = "Epik";

pub const DEFAULT_USER_AGENT: &str = concat!("epik-registrar/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
