//! Shared rate-limited HTTP fetcher.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::{JSON_USER_AGENT, MEDIA_USER_AGENT};
use crate::rate_gate::RateGate;

/// Total per-request timeout, connect through body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Idle connections kept per host to exploit keep-alive across workers.
const POOL_MAX_IDLE_PER_HOST: usize = 200;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} for {url}")]
    Status { status: StatusCode, url: String },
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Shared HTTP client behind the global rate gate.
///
/// Clones share the same connection pool and rate gate.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    gate: Arc<RateGate>,
}

impl Fetcher {
    /// Build the shared client.
    ///
    /// # Errors
    ///
    /// Returns an error if client initialization fails.
    pub fn new(gate: Arc<RateGate>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(JSON_USER_AGENT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, gate })
    }

    /// GET `url` and decode the body as a string-keyed JSON map.
    ///
    /// Acquires one rate-gate permit first. A non-200 response drains the
    /// body and returns [`FetchError::Status`].
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status, or a body
    /// that is not a JSON object.
    pub async fn fetch_json(&self, url: &str) -> Result<Map<String, Value>, FetchError> {
        self.gate.acquire().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            Self::drain(response).await;
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// GET a media blob, returning the streaming response.
    ///
    /// Uses the dedicated media User-Agent. The caller sinks the body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-200 status.
    pub async fn get_media(&self, url: &str) -> Result<Response, FetchError> {
        self.gate.acquire().await;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, MEDIA_USER_AGENT)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            Self::drain(response).await;
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// Discard a response body so the connection can return to the pool.
    async fn drain(response: Response) {
        let _ = response.bytes().await;
    }
}
