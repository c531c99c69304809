//! Cached internship catalog service.
//!
//! Wraps the cache controller with a typed API: callers get decoded
//! listings plus a flag telling them whether the data came from a live
//! fetch or an offline source.

use color_eyre::{eyre::eyre, Result};
use url::Url;

use crate::cache::{
  CacheController, CacheStorage, Fetch, Request, ServeSource, SqliteStorage, DATA_ROUTE_MARKER,
};
use crate::config::Config;

use super::client::HttpFetcher;
use super::fallback::OfflineCatalog;
use super::recommend;
use super::types::{Internship, UserProfile};

/// A decoded catalog snapshot, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct Catalog {
  pub internships: Vec<Internship>,
  pub source: ServeSource,
}

impl Catalog {
  /// True when the snapshot did not come from a live fetch.
  pub fn is_offline(&self) -> bool {
    self.source != ServeSource::Network
  }
}

/// Catalog access with transparent caching and offline fallback.
pub struct InternshipService<S: CacheStorage, F: Fetch> {
  controller: CacheController<S, F, OfflineCatalog>,
  data_url: String,
}

impl InternshipService<SqliteStorage, HttpFetcher> {
  /// Wire the service against the configured API with on-disk caching.
  pub fn new(config: &Config) -> Result<Self> {
    let origin = Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid api.url {}: {}", config.api.url, e))?;
    let storage = SqliteStorage::open()?;
    Ok(Self::with_parts(storage, HttpFetcher::new(), origin))
  }
}

impl<S: CacheStorage, F: Fetch> InternshipService<S, F> {
  /// Assemble a service from explicit ports. Tests inject in-memory
  /// storage and a scripted fetcher here.
  pub fn with_parts(storage: S, network: F, origin: Url) -> Self {
    let data_url = format!(
      "{}{}",
      origin.as_str().trim_end_matches('/'),
      DATA_ROUTE_MARKER
    );
    let controller = CacheController::new(storage, network, OfflineCatalog, origin);
    Self {
      controller,
      data_url,
    }
  }

  /// Prime the offline cache and prune stale generations.
  /// Returns (assets installed, generations removed).
  pub async fn sync(&self) -> Result<(usize, usize)> {
    let installed = self.controller.install().await?;
    let removed = self.controller.activate().await?;
    Ok((installed, removed))
  }

  /// Prune stale cache generations. Run on startup before serving.
  pub async fn activate(&self) -> Result<usize> {
    self.controller.activate().await
  }

  /// Fetch the catalog through the cache controller. Always yields a
  /// snapshot: live when the network cooperates, cached or bundled
  /// fallback data otherwise.
  pub async fn list(&self) -> Result<Catalog> {
    let request = Request::get(&self.data_url);
    let served = self
      .controller
      .handle(&request)
      .await?
      .ok_or_else(|| eyre!("Catalog request yielded no response"))?;

    let internships: Vec<Internship> = serde_json::from_slice(&served.response.body)
      .map_err(|e| eyre!("Failed to decode catalog payload: {}", e))?;

    Ok(Catalog {
      internships,
      source: served.source,
    })
  }

  /// Personalized recommendations for a profile, computed over whatever
  /// catalog snapshot is currently reachable.
  pub async fn recommendations(&self, profile: &UserProfile) -> Result<Catalog> {
    let catalog = self.list().await?;
    Ok(Catalog {
      internships: recommend::recommend(&catalog.internships, profile),
      source: catalog.source,
    })
  }
}
