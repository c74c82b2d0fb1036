// src/xmlrpc/transport.rs

//! HTTP transport for XML-RPC calls
//!
//! Wraps a blocking reqwest client. Connection failures are retried with a
//! linear back-off; HTTP status errors are returned immediately.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default timeout for HTTP requests (30 seconds)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts for a call whose connection fails
pub const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 1000;

/// Something that can carry an encoded XML-RPC request to a server
pub trait RpcTransport {
    /// Address the requests are sent to
    fn endpoint(&self) -> &str;

    /// Send a request document and return the response document
    fn post(&self, body: &str) -> Result<String>;
}

/// XML-RPC over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    max_retries: u32,
}

impl HttpTransport {
    /// Create a transport with the default timeout and retry budget
    pub fn new(url: &str) -> Result<Self> {
        Self::with_options(url, HTTP_TIMEOUT, MAX_RETRIES)
    }

    /// Create a transport with an explicit timeout and retry budget
    pub fn with_options(url: &str, timeout: Duration, max_retries: u32) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(Error::InitError("XML-RPC endpoint is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pypi-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
            max_retries: max_retries.max(1),
        })
    }
}

impl RpcTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.url
    }

    fn post(&self, body: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = self
                .client
                .post(&self.url)
                .header(CONTENT_TYPE, "text/xml")
                .body(body.to_string());

            match request.send() {
                Ok(response) => {
                    if !response.status().is_success() {
                        return Err(Error::DownloadError(format!(
                            "HTTP {} from {}",
                            response.status(),
                            self.url
                        )));
                    }

                    let text = response.text().map_err(|e| {
                        Error::DownloadError(format!("Failed to read response: {e}"))
                    })?;
                    debug!("Received {} bytes from {}", text.len(), self.url);
                    return Ok(text);
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "XML-RPC call to {} failed after {attempt} attempts: {e}",
                            self.url
                        )));
                    }
                    warn!("XML-RPC attempt {} failed: {}, retrying...", attempt, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }
}
