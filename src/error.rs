use thiserror::Error;

use crate::query::FormError;

pub const NO_RESULTS_MESSAGE: &str = "No flights found. Please try different search criteria.";
pub const SEARCH_FAILED_MESSAGE: &str =
    "Failed to search flights. Please check your inputs and try again.";

#[derive(Debug, Error)]
pub enum FlightError {
    #[error(
        "request timed out — the FlyHigh API may be slow or unreachable. \
         Try increasing api.timeout or check that the backend is running"
    )]
    Timeout,

    #[error("connection failed — check that the backend is running ({0})")]
    ConnectionFailed(String),

    #[error("DNS resolution failed for {0} — check api.base_url")]
    DnsResolution(String),

    #[error("proxy error — check your api.proxy URL is correct ({0})")]
    ProxyError(String),

    #[error("TLS/SSL error — connection to the API failed ({0})")]
    TlsError(String),

    #[error("unexpected HTTP status {0} from the FlyHigh API")]
    HttpStatus(u16),

    #[error("{}", message.as_deref().unwrap_or("the FlyHigh API rejected the request"))]
    Api { status: u16, message: Option<String> },

    #[error("failed to decode API response — {0}")]
    Decode(String),

    #[error("{}", NO_RESULTS_MESSAGE)]
    NoResults,

    #[error("{}", SEARCH_FAILED_MESSAGE)]
    SearchFailed,

    #[error("invalid airport code \"{0}\" — must be exactly 3 letters (e.g. CGK, DPS, SIN)")]
    InvalidAirport(String),

    #[error("invalid date \"{0}\" — must be YYYY-MM-DD format (e.g. 2025-12-20)")]
    InvalidDate(String),

    #[error("{0}")]
    Form(#[from] FormError),

    #[error("{0}")]
    Validation(String),

    #[error("trip storage error — {0}")]
    Storage(String),

    #[error("configuration error — {0}")]
    Config(#[from] config::ConfigError),
}

impl FlightError {
    /// The message the server attached to a failed response, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Server message when present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

pub fn from_http_error(err: wreq::Error) -> FlightError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return FlightError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return FlightError::DnsResolution(msg);
        }
        return FlightError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return FlightError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return FlightError::TlsError(msg);
    }

    if lower.contains("builder error") && lower.contains("uri") {
        return FlightError::ProxyError(msg);
    }

    FlightError::ConnectionFailed(msg)
}

pub fn from_io_error(err: std::io::Error) -> FlightError {
    FlightError::Storage(err.to_string())
}
