//! JSON over HTTP with a caller-driven retry loop
//!
//! Every request yields an [`HttpReply`] (status + raw body) rather than a
//! decoded value, so callers decide per status code what the body means.

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failures
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl HttpError {
    /// The peer could not be reached (refused, unroutable, DNS)
    pub fn is_connect(&self) -> bool {
        matches!(self, HttpError::Transport(e) if e.is_connect())
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Bytes,
}

impl HttpReply {
    /// Body as text, lossy for non UTF-8 payloads
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Map the reply through a status-aware handler
    pub fn handle_response<T, E>(
        self,
        handler: impl FnOnce(&[u8], u16) -> Result<T, E>,
    ) -> Result<T, E> {
        handler(&self.body, self.status)
    }
}

pub type RetryPredicate = Arc<dyn Fn(Result<&HttpReply, &HttpError>) -> bool + Send + Sync>;

/// How many times to send a request and when to try again
#[derive(Clone)]
pub struct RetryOptions {
    pub attempts: u32,
    pub wait: Duration,
    retry_if: RetryPredicate,
}

impl RetryOptions {
    pub fn new<F>(attempts: u32, wait: Duration, retry_if: F) -> Self
    where
        F: Fn(Result<&HttpReply, &HttpError>) -> bool + Send + Sync + 'static,
    {
        Self {
            attempts,
            wait,
            retry_if: Arc::new(retry_if),
        }
    }

    /// Single attempt, never retried
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, |_| false)
    }

    fn should_retry(&self, outcome: Result<&HttpReply, &HttpError>) -> bool {
        (self.retry_if)(outcome)
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("attempts", &self.attempts)
            .field("wait", &self.wait)
            .finish()
    }
}

/// HTTP client speaking JSON
#[derive(Debug, Clone)]
pub struct HttpJson {
    client: reqwest::Client,
    retry: RetryOptions,
}

impl Default for HttpJson {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpJson {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            retry: RetryOptions::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    pub async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<HttpReply, HttpError> {
        self.send(Method::GET, url, None, timeout).await
    }

    pub async fn delete(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<HttpReply, HttpError> {
        self.send(Method::DELETE, url, None, timeout).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<HttpReply, HttpError> {
        let body = serde_json::to_vec(body)?;
        self.send(Method::POST, url, Some(body), timeout).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<HttpReply, HttpError> {
        let body = serde_json::to_vec(body)?;
        self.send(Method::PUT, url, Some(body), timeout).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Result<HttpReply, HttpError> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = self.send_once(method.clone(), url, body.clone(), timeout).await;

            match &outcome {
                Ok(reply) => tracing::debug!(
                    %method,
                    url,
                    attempt,
                    status = reply.status,
                    "request completed"
                ),
                Err(e) => tracing::debug!(%method, url, attempt, error = %e, "request failed"),
            }

            if attempt >= attempts || !self.retry.should_retry(outcome.as_ref()) {
                return outcome;
            }

            tokio::time::sleep(self.retry.wait).await;
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Result<HttpReply, HttpError> {
        let mut request = self.client.request(method, url);

        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_retries_until_predicate_is_satisfied() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let http = HttpJson::new().with_retry(RetryOptions::new(
            3,
            Duration::from_millis(10),
            |outcome| !matches!(outcome, Ok(reply) if reply.status == 200),
        ));

        let reply = http
            .get(&format!("{}/status", mock_server.uri()), None)
            .await
            .unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.text(), "ok");
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_returns_last_outcome_when_attempts_exhausted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let http = HttpJson::new().with_retry(RetryOptions::new(
            2,
            Duration::from_millis(5),
            move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                true
            },
        ));

        let reply = http.get(&mock_server.uri(), None).await.unwrap();

        assert_eq!(reply.status, 500);
        assert_eq!(reply.text(), "boom");
        // The predicate is not consulted after the final attempt.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/objects"))
            .and(wiremock::matchers::body_json(serde_json::json!({"name": "a"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reply = HttpJson::new()
            .post(
                &format!("{}/objects", mock_server.uri()),
                &serde_json::json!({"name": "a"}),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        assert_eq!(reply.status, 201);
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        // Bind and drop a listener so the port is known to be closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = HttpJson::new()
            .get(&format!("http://127.0.0.1:{port}/"), Some(Duration::from_secs(2)))
            .await
            .unwrap_err();

        assert!(err.is_connect());
    }

    #[test]
    fn test_handle_response_passes_status_and_body() {
        let reply = HttpReply {
            status: 404,
            body: Bytes::from_static(b"missing"),
        };

        let result: Result<(), String> = reply.handle_response(|body, status| {
            Err(format!("{status}:{}", String::from_utf8_lossy(body)))
        });

        assert_eq!(result.unwrap_err(), "404:missing");
    }
}
