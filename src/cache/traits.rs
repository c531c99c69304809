//! Core request/response types and ports for the caching system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// How a request reaches the app: a top-level document load or a subresource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
  /// Top-level document request; eligible for the cached-root fallback
  Navigation,
  /// Any other request (script, stylesheet, data)
  Resource,
}

/// An outgoing request as seen by the cache controller.
#[derive(Debug, Clone)]
pub struct Request {
  pub method: String,
  pub url: String,
  pub mode: RequestMode,
}

impl Request {
  /// A plain GET for a subresource.
  pub fn get(url: impl Into<String>) -> Self {
    Self {
      method: "GET".to_string(),
      url: url.into(),
      mode: RequestMode::Resource,
    }
  }

  /// A top-level document request.
  pub fn navigation(url: impl Into<String>) -> Self {
    Self {
      method: "GET".to_string(),
      url: url.into(),
      mode: RequestMode::Navigation,
    }
  }

  /// Stable storage key derived from the request identity (method + URL).
  ///
  /// SHA256 hash for stable, fixed-length keys.
  pub fn cache_key(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.method.as_bytes());
    hasher.update(b" ");
    hasher.update(self.url.as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// A response payload with its headers, as stored and served by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl Response {
  /// Build a 200 response carrying `value` as a JSON body.
  pub fn json<T: Serialize>(value: &T) -> Self {
    Self {
      status: 200,
      headers: vec![("Content-Type".to_string(), "application/json".to_string())],
      body: serde_json::to_vec(value).unwrap_or_default(),
    }
  }

  /// Whether the status code is in the success range.
  pub fn is_ok(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Look up a header value, case-insensitively.
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }
}

/// Indicates where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeSource {
  /// Fresh response from network
  Network,
  /// Response replayed from the cache store
  Cache,
  /// Static substitute payload - network and cache both unavailable
  Fallback,
}

/// A response handed back to the caller, tagged with its origin.
#[derive(Debug, Clone)]
pub struct Served {
  /// The actual response
  pub response: Response,
  /// Where the response came from
  pub source: ServeSource,
  /// When the response was cached (if replayed from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl Served {
  /// A fresh response straight from the network.
  pub fn from_network(response: Response) -> Self {
    Self {
      response,
      source: ServeSource::Network,
      cached_at: None,
    }
  }

  /// A response replayed from the cache store.
  pub fn from_cache(response: Response, cached_at: DateTime<Utc>) -> Self {
    Self {
      response,
      source: ServeSource::Cache,
      cached_at: Some(cached_at),
    }
  }

  /// The static fallback payload.
  pub fn from_fallback(response: Response) -> Self {
    Self {
      response,
      source: ServeSource::Fallback,
      cached_at: None,
    }
  }

  /// True when the response did not come from a live fetch.
  pub fn is_offline(&self) -> bool {
    self.source != ServeSource::Network
  }
}

/// Network fetch port. Implementations perform a single attempt with no
/// retry layer; transport failures surface as errors.
#[async_trait]
pub trait Fetch: Send + Sync {
  async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Supplies a substitute payload when both network and cache miss.
pub trait FallbackProvider: Send + Sync {
  fn fallback(&self) -> Response;
}
