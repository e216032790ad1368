//! Search backend abstraction and implementations.
//!
//! Defines the [`SearchBackend`] trait used by the uploader and two
//! implementations:
//! - **[`ElasticsearchBackend`]**: blocking REST client with retry and backoff.
//! - **[`MemoryBackend`]**: in-process indexes, for tests and embedding.
//!
//! # Retry Strategy
//!
//! Each Elasticsearch request is retried on transient failures:
//! - HTTP 429 (too many requests) and 5xx → retry
//! - Network errors (refused, reset, timeout) → retry
//! - HTTP 401/403 → [`BackendError::Auth`], no retry
//! - Any other 4xx → [`BackendError::Rejected`], no retry
//! - Backoff: `backoff`, 2×, 4×, … capped at 32× the base delay
//!
//! A create that answers "already exists" after a retry is taken as
//! success, since the failed attempt may have created the index.

use reqwest::blocking::Client;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ElasticsearchConfig;
use crate::error::BackendError;

/// Index lifecycle and document writes against a search store.
///
/// Calls are blocking and made strictly one at a time.
pub trait SearchBackend {
    /// Delete `index`. Returns `false` when it did not exist, which is not
    /// an error.
    fn delete_index(&mut self, index: &str) -> Result<bool, BackendError>;

    /// Create `index` with the given body (mappings).
    fn create_index(&mut self, index: &str, body: &Value) -> Result<(), BackendError>;

    /// Store `doc` under `id`, replacing any previous document with that id.
    fn put_document(&mut self, index: &str, id: &str, doc: &Value) -> Result<(), BackendError>;
}

// ============ Elasticsearch ============

/// Basic-auth credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Error type Elasticsearch reports when creating an index that exists.
const ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Non-2xx answers a request treats as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accept {
    Success,
    /// 404, for deletes.
    NotFound,
    /// "Already exists" on a retried create.
    ExistingAfterRetry,
}

pub struct ElasticsearchBackend {
    client: Client,
    base: Url,
    auth: Option<Credentials>,
    max_retries: u32,
    backoff: Duration,
}

impl ElasticsearchBackend {
    /// Build a client for `host` (`host:port` or a full URL).
    pub fn new(
        host: &str,
        auth: Option<Credentials>,
        config: &ElasticsearchConfig,
    ) -> Result<Self, BackendError> {
        let base = base_url(host)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Connection {
                url: base.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base,
            auth,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Connection {
                url: self.base.to_string(),
                message: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request, retrying transient failures. Returns the final
    /// status; non-2xx answers count as success only as `accept` allows.
    fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        accept: Accept,
    ) -> Result<StatusCode, BackendError> {
        let mut last_err = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.backoff, attempt);
                debug!(%url, attempt, ?delay, "retrying");
                std::thread::sleep(delay);
            }

            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(auth) = &self.auth {
                request = request.basic_auth(&auth.user, Some(&auth.password));
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success()
                        || (accept == Accept::NotFound && status == StatusCode::NOT_FOUND)
                    {
                        return Ok(status);
                    }

                    let text = response.text().unwrap_or_default();

                    // An earlier attempt may have created the index before failing.
                    if accept == Accept::ExistingAfterRetry
                        && attempt > 0
                        && status == StatusCode::BAD_REQUEST
                        && text.contains(ALREADY_EXISTS)
                    {
                        debug!(%url, "index created by an earlier attempt");
                        return Ok(status);
                    }

                    // Throttled or server error, retry
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        warn!(%url, %status, "transient backend error");
                        last_err = format!("HTTP {}: {}", status, text);
                        continue;
                    }

                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        return Err(BackendError::Auth {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    return Err(BackendError::Rejected {
                        url: url.to_string(),
                        status: status.as_u16(),
                        body: text,
                    });
                }
                Err(e) if e.is_builder() => {
                    return Err(BackendError::Connection {
                        url: url.to_string(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!(%url, "request failed: {}", e);
                    last_err = e.to_string();
                }
            }
        }

        Err(BackendError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.max_retries + 1,
            last: last_err,
        })
    }
}

impl SearchBackend for ElasticsearchBackend {
    fn delete_index(&mut self, index: &str) -> Result<bool, BackendError> {
        let url = self.url(&[index])?;
        let status = self.execute(Method::DELETE, url, None, Accept::NotFound)?;
        Ok(status != StatusCode::NOT_FOUND)
    }

    fn create_index(&mut self, index: &str, body: &Value) -> Result<(), BackendError> {
        let url = self.url(&[index])?;
        self.execute(Method::PUT, url, Some(body), Accept::ExistingAfterRetry)?;
        Ok(())
    }

    fn put_document(&mut self, index: &str, id: &str, doc: &Value) -> Result<(), BackendError> {
        let url = self.url(&[index, "_doc", id])?;
        self.execute(Method::PUT, url, Some(doc), Accept::Success)?;
        Ok(())
    }
}

/// Parse `host`, defaulting the scheme to `http`.
pub fn base_url(host: &str) -> Result<Url, BackendError> {
    let host = host.trim();
    let with_scheme = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    Url::parse(&with_scheme).map_err(|e| BackendError::Connection {
        url: host.to_string(),
        message: format!("invalid address: {}", e),
    })
}

/// Delay before retry number `attempt` (1-based). Falls back to `base`
/// when the scaled delay does not fit a `Duration`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(1u32 << attempt.saturating_sub(1).min(5))
        .unwrap_or(base)
}

// ============ In-memory ============

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryIndex {
    pub body: Value,
    pub documents: BTreeMap<String, Value>,
}

/// Keeps indexes in memory and counts every call made against it.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub indexes: BTreeMap<String, MemoryIndex>,
    calls: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trait calls received so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn document(&self, index: &str, id: &str) -> Option<&Value> {
        self.indexes.get(index)?.documents.get(id)
    }

    pub fn document_count(&self, index: &str) -> usize {
        self.indexes.get(index).map_or(0, |i| i.documents.len())
    }
}

impl SearchBackend for MemoryBackend {
    fn delete_index(&mut self, index: &str) -> Result<bool, BackendError> {
        self.calls += 1;
        Ok(self.indexes.remove(index).is_some())
    }

    fn create_index(&mut self, index: &str, body: &Value) -> Result<(), BackendError> {
        self.calls += 1;
        if self.indexes.contains_key(index) {
            return Err(BackendError::Rejected {
                url: format!("memory://{}", index),
                status: 400,
                body: "resource_already_exists_exception".to_string(),
            });
        }
        self.indexes.insert(
            index.to_string(),
            MemoryIndex {
                body: body.clone(),
                documents: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn put_document(&mut self, index: &str, id: &str, doc: &Value) -> Result<(), BackendError> {
        self.calls += 1;
        // Writing into a missing index creates it, as Elasticsearch does.
        self.indexes
            .entry(index.to_string())
            .or_default()
            .documents
            .insert(id.to_string(), doc.clone());
        Ok(())
    }
}
