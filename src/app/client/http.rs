//! Core HTTP operations with retry logic
//!
//! Transport errors, HTTP 429 and HTTP 503 are retried with exponential
//! backoff plus a little jitter. Every other status is returned to the caller
//! and mapped by [`HttpHandler::check_status`].

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use url::Url;

use super::config::ClientConfig;
use crate::constants::limits;
use crate::errors::{DownloadError, DownloadResult};

/// HTTP operations handler with retry handling
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
    max_retries: u32,
    retry_base_delay: Duration,
    request_timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler from a client configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> DownloadResult<Self> {
        Ok(Self {
            client: config.build_http_client()?,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
            request_timeout: config.request_timeout,
        })
    }

    /// Delay before retry number `attempt` (1-based)
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.retry_base_delay.as_millis() as u64 * 2_u64.pow(attempt.min(16));
        let jitter = (base as f64 * limits::BACKOFF_JITTER_FACTOR * fastrand::f64()) as u64;
        Duration::from_millis(base + jitter)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> DownloadError {
        if error.is_timeout() {
            DownloadError::Timeout {
                seconds: self.request_timeout.as_secs(),
            }
        } else {
            DownloadError::Http(error)
        }
    }

    /// Fetches the HTTP response with retry logic
    ///
    /// The raw response is returned for streaming; the status is not checked
    /// beyond the retryable codes.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the request still fails after retries
    pub async fn get_response(&self, url: &Url) -> DownloadResult<Response> {
        let mut retries = 0;
        loop {
            match self.client.get(url.as_str()).send().await {
                Ok(response) => {
                    let status = response.status();
                    let retryable = status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::SERVICE_UNAVAILABLE;

                    if !retryable {
                        tracing::debug!("Fetched response {} from {}", status, url);
                        return Ok(response);
                    }

                    if retries >= self.max_retries {
                        return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                            DownloadError::RateLimitExceeded
                        } else {
                            DownloadError::ServerOverloaded
                        });
                    }

                    retries += 1;
                    let delay = self.backoff_delay(retries);
                    tracing::warn!(
                        "Server responded {} for {}. Backing off for {}ms",
                        status.as_u16(),
                        url,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if retries < self.max_retries => {
                    retries += 1;
                    let delay = self.backoff_delay(retries);
                    tracing::warn!(
                        "Request to {} failed (attempt {}/{}): {}. Retrying in {}ms",
                        url,
                        retries,
                        self.max_retries,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if self.max_retries == 0 {
                        return Err(self.map_transport_error(e));
                    }
                    tracing::error!(
                        "Request to {} failed after {} retries: {}",
                        url,
                        self.max_retries,
                        e
                    );
                    return Err(DownloadError::MaxRetriesExceeded {
                        max_retries: self.max_retries,
                        last_error: e.to_string(),
                    });
                }
            }
        }
    }

    /// Map a non-success status to a download error
    pub fn check_status(response: Response, url: &Url) -> DownloadResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            404 => Err(DownloadError::NotFound {
                url: url.to_string(),
            }),
            403 => Err(DownloadError::Forbidden {
                url: url.to_string(),
            }),
            status => Err(DownloadError::ServerError { status }),
        }
    }

    /// Fetch a whole body into memory (manifests, small JSON documents)
    pub async fn get_bytes(&self, url: &Url) -> DownloadResult<Vec<u8>> {
        let response = Self::check_status(self.get_response(url).await?, url)?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        Ok(bytes.to_vec())
    }

    /// Map a body streaming error the same way as request errors
    pub fn stream_error(&self, error: reqwest::Error) -> DownloadError {
        self.map_transport_error(error)
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_handler(max_retries: u32) -> HttpHandler {
        let config = ClientConfig::default()
            .with_max_retries(max_retries)
            .with_retry_base_delay(Duration::from_millis(1));
        HttpHandler::new(&config).unwrap()
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let handler = HttpHandler::new(
            &ClientConfig::default().with_retry_base_delay(Duration::from_millis(100)),
        )
        .unwrap();

        let first = handler.backoff_delay(1).as_millis();
        let third = handler.backoff_delay(3).as_millis();
        assert!((200..=220).contains(&first));
        assert!((800..=880).contains(&third));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let handler = fast_handler(0);
        let missing = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        assert!(matches!(
            handler.get_bytes(&missing).await,
            Err(DownloadError::NotFound { .. })
        ));

        let forbidden = Url::parse(&format!("{}/forbidden", server.uri())).unwrap();
        assert!(matches!(
            handler.get_bytes(&forbidden).await,
            Err(DownloadError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_overload_is_retried_then_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/busy"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let handler = fast_handler(2);
        let url = Url::parse(&format!("{}/busy", server.uri())).unwrap();
        assert!(matches!(
            handler.get_response(&url).await,
            Err(DownloadError::ServerOverloaded)
        ));
    }

    #[tokio::test]
    async fn test_get_bytes_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let handler = fast_handler(0);
        let url = Url::parse(&format!("{}/doc.json", server.uri())).unwrap();
        assert_eq!(handler.get_bytes(&url).await.unwrap(), b"{}");
    }
}
