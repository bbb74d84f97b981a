//! Blocking Horizons API client
//!
//! One GET per body. Failures are never retried: a missing body invalidates
//! the kernel group it belongs to.

use std::time::Duration;

use serde_json::Value;

use super::query::EphemerisQuery;
use crate::errors::{CometKernelError, Result};

/// Public Horizons API endpoint
pub const HORIZONS_URL: &str = "https://ssd.jpl.nasa.gov/api/horizons.api";

/// Default request timeout; long windows at small steps take a while to render
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Anything that can answer an [`EphemerisQuery`] with the raw report text
pub trait EphemerisSource {
    /// Fetch the full text report for a query
    fn fetch(&self, query: &EphemerisQuery) -> Result<String>;
}

/// Horizons API client backed by a blocking reqwest client
pub struct HorizonsClient {
    url: String,
    client: reqwest::blocking::Client,
}

impl HorizonsClient {
    /// Create a client for the public endpoint with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_endpoint(HORIZONS_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client for a specific endpoint and timeout
    pub fn with_endpoint(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                CometKernelError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Endpoint this client talks to
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EphemerisSource for HorizonsClient {
    fn fetch(&self, query: &EphemerisQuery) -> Result<String> {
        query.validate()?;

        log::info!(
            "Requesting Horizons vectors for {} ({} .. {}, step {})",
            query.designation,
            query.start_time,
            query.stop_time,
            query.step_size
        );

        let response = self
            .client
            .get(&self.url)
            .query(&query.params())
            .send()
            .map_err(|e| CometKernelError::Transport(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CometKernelError::Transport(format!(
                "Horizons returned status {} for {}",
                response.status(),
                query.designation
            )));
        }

        let body = response
            .text()
            .map_err(|e| CometKernelError::Transport(format!("Failed to read response: {}", e)))?;

        log::debug!("Received {} bytes for {}", body.len(), query.designation);

        result_text(&body)
    }
}

/// Pull the `result` report out of a Horizons JSON envelope
pub fn result_text(body: &str) -> Result<String> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| CometKernelError::Transport(format!("Malformed JSON envelope: {}", e)))?;

    let object = payload.as_object().ok_or_else(|| {
        CometKernelError::Transport("Malformed JSON envelope: not an object".to_string())
    })?;

    match object.get("result").and_then(Value::as_str) {
        Some(text) => Ok(text.to_string()),
        None => Err(CometKernelError::Envelope {
            keys: object.keys().cloned().collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_text() {
        let body = r#"{"signature":{"version":"1.2"},"result":"$$SOE\n$$EOE\n"}"#;
        assert_eq!(result_text(body).unwrap(), "$$SOE\n$$EOE\n");
    }

    #[test]
    fn test_missing_result_is_envelope_error() {
        let body = r#"{"signature":{"version":"1.2"},"error":"no match"}"#;
        match result_text(body) {
            Err(CometKernelError::Envelope { keys }) => {
                assert_eq!(keys, vec!["error".to_string(), "signature".to_string()]);
            }
            other => panic!("expected envelope error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_envelope_is_transport_error() {
        assert!(matches!(
            result_text("<html>502 Bad Gateway</html>"),
            Err(CometKernelError::Transport(_))
        ));
        assert!(matches!(
            result_text("[1, 2, 3]"),
            Err(CometKernelError::Transport(_))
        ));
    }

    #[test]
    fn test_invalid_query_fails_before_request() {
        // Unroutable endpoint: reaching the network would be a transport error
        let client =
            HorizonsClient::with_endpoint("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();
        let query = EphemerisQuery::new("1P", "2050-01-01", "1950-01-01", "5 d");
        assert!(matches!(
            client.fetch(&query),
            Err(CometKernelError::InvalidQuery(_))
        ));
    }
}
