//! Probe and send transport for the playground API.
//!
//! One probe is one round trip to one endpoint: elapsed time on success,
//! uniform failure otherwise. Timeouts, non-success statuses, and transport
//! errors are all the same failure; retry policy belongs to the caller's
//! periodic re-invocation, never to an individual probe.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a single transport operation.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status: {status}")]
    Status { status: u16 },
}

pub type ProbeFuture = Pin<Box<dyn Future<Output = Result<Duration, ProbeError>> + Send>>;

/// Performs a single round trip to one channel endpoint.
pub trait ProbeTransport: Send + Sync {
    /// Probe the named channel once. No retries.
    fn probe(&self, id: &str) -> ProbeFuture;
}

pub type MessageFuture = Pin<Box<dyn Future<Output = Result<FeedMessage, ProbeError>> + Send>>;

/// Produces feed messages for the message buffer.
pub trait MessageSource: Send + Sync {
    fn fetch(&self) -> MessageFuture;
}

/// Echo returned by the send operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendReceipt {
    pub id: String,
    pub echo: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    id: &'a str,
    message: &'a str,
}

/// One message pulled from the mock-message endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMessage {
    pub id: String,
    pub message: String,
}

/// HTTP implementation of the transport contract.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url`.
    ///
    /// The request timeout bounds every operation, so a hung endpoint
    /// surfaces as an ordinary probe failure.
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send one message through the named channel; echoes it back on success.
    pub async fn send(&self, id: &str, message: &str) -> Result<SendReceipt, ProbeError> {
        let url = format!("{}/api/send", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&SendRequest { id, message })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ProbeError::Status {
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json().await?)
    }
}

impl ProbeTransport for HttpTransport {
    fn probe(&self, id: &str) -> ProbeFuture {
        let client = self.client.clone();
        let url = format!("{}/api/ping/{}", self.base_url, id);
        Box::pin(async move {
            let started = Instant::now();
            let resp = client.get(&url).send().await?;
            if !resp.status().is_success() {
                return Err(ProbeError::Status {
                    status: resp.status().as_u16(),
                });
            }
            Ok(started.elapsed())
        })
    }
}

impl MessageSource for HttpTransport {
    fn fetch(&self) -> MessageFuture {
        let client = self.client.clone();
        let url = format!("{}/api/mock-message", self.base_url);
        Box::pin(async move {
            let resp = client.get(&url).send().await?;
            if !resp.status().is_success() {
                return Err(ProbeError::Status {
                    status: resp.status().as_u16(),
                });
            }
            Ok(resp.json().await?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new(
            "http://127.0.0.1:9/",
            Duration::from_millis(100),
            Duration::from_millis(100),
        )
        .unwrap();
        assert_eq!(transport.base_url, "http://127.0.0.1:9");
    }
}
