//! Cache controller that routes requests between network and cache.

use color_eyre::{eyre::eyre, Result};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::storage::CacheStorage;
use super::traits::{FallbackProvider, Fetch, Request, RequestMode, Served};

/// Name of the cache generation this build reads and writes. Any other
/// generation found in the store is stale and removed on activation.
pub const CACHE_GENERATION: &str = "internconnect-v1";

/// Path segment identifying catalog data requests.
pub const DATA_ROUTE_MARKER: &str = "/api/internships";

/// App-shell paths fetched and stored at install time.
pub const PRECACHE_PATHS: &[&str] = &[
  "/",
  "/static/js/bundle.js",
  "/static/css/main.css",
  "/manifest.json",
];

/// Decides, per request, whether to serve from cache or network, and keeps
/// the cache store consistent.
///
/// Catalog data requests are network-first: live responses are cached as
/// they pass through, and on network failure the controller falls back to
/// the cache, then to the static fallback payload. Everything else is
/// cache-first: a hit is served without touching the network.
pub struct CacheController<S, F, P>
where
  S: CacheStorage,
  F: Fetch,
  P: FallbackProvider,
{
  storage: Arc<S>,
  network: Arc<F>,
  fallback: P,
  /// Origin the app shell is served from; gates asset caching
  origin: Url,
  generation: String,
}

impl<S, F, P> CacheController<S, F, P>
where
  S: CacheStorage,
  F: Fetch,
  P: FallbackProvider,
{
  /// Create a controller over the given storage and network ports.
  pub fn new(storage: S, network: F, fallback: P, origin: Url) -> Self {
    Self {
      storage: Arc::new(storage),
      network: Arc::new(network),
      fallback,
      origin,
      generation: CACHE_GENERATION.to_string(),
    }
  }

  /// Override the generation name this controller writes to.
  pub fn with_generation(mut self, generation: impl Into<String>) -> Self {
    self.generation = generation.into();
    self
  }

  /// Fetch every precache path and store the successes into the current
  /// generation. Best-effort: individual failures are logged and skipped,
  /// entries that succeed are kept.
  pub async fn install(&self) -> Result<usize> {
    let fetches = PRECACHE_PATHS.iter().map(|path| async move {
      let url = self
        .origin
        .join(path)
        .map_err(|e| eyre!("Invalid precache path {}: {}", path, e))?;
      let request = Request::get(url.as_str());

      let response = self.network.fetch(&request).await?;
      if !response.is_ok() {
        return Err(eyre!("{} responded with status {}", path, response.status));
      }

      self
        .storage
        .put(&self.generation, &request.cache_key(), &response)?;
      Ok::<_, color_eyre::Report>(())
    });

    let mut installed = 0;
    for (path, result) in PRECACHE_PATHS.iter().zip(join_all(fetches).await) {
      match result {
        Ok(()) => installed += 1,
        Err(err) => warn!(path = %path, error = %err, "failed to precache asset"),
      }
    }

    debug!(
      installed,
      total = PRECACHE_PATHS.len(),
      generation = %self.generation,
      "install finished"
    );
    Ok(installed)
  }

  /// Remove every generation whose name differs from the current one.
  /// Returns the number of generations deleted.
  pub async fn activate(&self) -> Result<usize> {
    let mut removed = 0;
    for name in self.storage.list_generations()? {
      if name != self.generation {
        debug!(generation = %name, "deleting stale cache generation");
        self.storage.delete_generation(&name)?;
        removed += 1;
      }
    }
    Ok(removed)
  }

  /// Route a request through the appropriate strategy.
  ///
  /// Catalog data requests always resolve to a response. For other requests
  /// `None` means both cache and network failed and no navigation fallback
  /// applied; the caller must handle absence.
  pub async fn handle(&self, request: &Request) -> Result<Option<Served>> {
    if request.url.contains(DATA_ROUTE_MARKER) {
      self.network_first(request).await.map(Some)
    } else {
      self.cache_first(request).await
    }
  }

  /// Network-first strategy for catalog data.
  ///
  /// 1. Attempt a live fetch; on success, store a copy and return it
  /// 2. On network failure, look the request up in the cache
  /// 3. On a cache miss, serve the static fallback payload
  async fn network_first(&self, request: &Request) -> Result<Served> {
    match self.network.fetch(request).await {
      Ok(response) => {
        self
          .storage
          .put(&self.generation, &request.cache_key(), &response)?;
        Ok(Served::from_network(response))
      }
      Err(err) => {
        debug!(url = %request.url, error = %err, "network fetch failed, trying cache");
        match self.storage.get(&self.generation, &request.cache_key())? {
          Some(entry) => Ok(Served::from_cache(entry.response, entry.cached_at)),
          None => Ok(Served::from_fallback(self.fallback.fallback())),
        }
      }
    }
  }

  /// Cache-first strategy for app-shell assets and navigations.
  ///
  /// 1. A cache hit is returned immediately, no network attempt
  /// 2. On a miss, fetch from network; successful same-origin responses
  ///    are stored as they pass through
  /// 3. On network failure, navigations get the cached root document;
  ///    anything else yields `None`
  async fn cache_first(&self, request: &Request) -> Result<Option<Served>> {
    if let Some(entry) = self.storage.get(&self.generation, &request.cache_key())? {
      return Ok(Some(Served::from_cache(entry.response, entry.cached_at)));
    }

    match self.network.fetch(request).await {
      Ok(response) => {
        if response.is_ok() && self.same_origin(&request.url) {
          self
            .storage
            .put(&self.generation, &request.cache_key(), &response)?;
        }
        Ok(Some(Served::from_network(response)))
      }
      Err(err) => {
        debug!(url = %request.url, error = %err, "network fetch failed");
        if request.mode == RequestMode::Navigation {
          if let Some(entry) = self.cached_root_document()? {
            return Ok(Some(Served::from_cache(entry.response, entry.cached_at)));
          }
        }
        Ok(None)
      }
    }
  }

  fn cached_root_document(&self) -> Result<Option<super::storage::CachedEntry>> {
    let root = self
      .origin
      .join("/")
      .map_err(|e| eyre!("Invalid origin: {}", e))?;
    let request = Request::get(root.as_str());
    self.storage.get(&self.generation, &request.cache_key())
  }

  fn same_origin(&self, raw: &str) -> bool {
    Url::parse(raw)
      .map(|url| {
        url.scheme() == self.origin.scheme()
          && url.host_str() == self.origin.host_str()
          && url.port_or_known_default() == self.origin.port_or_known_default()
      })
      .unwrap_or(false)
  }
}

impl<S, F, P> Clone for CacheController<S, F, P>
where
  S: CacheStorage,
  F: Fetch,
  P: FallbackProvider + Clone,
{
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      network: Arc::clone(&self.network),
      fallback: self.fallback.clone(),
      origin: self.origin.clone(),
      generation: self.generation.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStorage;
  use crate::cache::traits::{Response, ServeSource};
  use async_trait::async_trait;
  use std::collections::HashMap;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;

  const ORIGIN: &str = "https://internconnect.example";

  /// Scripted fetcher: serves canned responses per URL, or fails every
  /// request when switched offline. Counts fetch attempts.
  struct FakeFetch {
    responses: Mutex<HashMap<String, Response>>,
    offline: std::sync::atomic::AtomicBool,
    calls: AtomicUsize,
  }

  impl FakeFetch {
    fn new() -> Self {
      Self {
        responses: Mutex::new(HashMap::new()),
        offline: std::sync::atomic::AtomicBool::new(false),
        calls: AtomicUsize::new(0),
      }
    }

    fn respond(self, url: &str, response: Response) -> Self {
      self
        .responses
        .lock()
        .unwrap()
        .insert(url.to_string(), response);
      self
    }

    fn set_offline(&self, offline: bool) {
      self.offline.store(offline, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }
  }

  #[async_trait]
  impl Fetch for Arc<FakeFetch> {
    async fn fetch(&self, request: &Request) -> Result<Response> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.offline.load(Ordering::SeqCst) {
        return Err(eyre!("network unreachable"));
      }
      self
        .responses
        .lock()
        .unwrap()
        .get(&request.url)
        .cloned()
        .ok_or_else(|| eyre!("no route to {}", request.url))
    }
  }

  struct StaticFallback;

  impl FallbackProvider for StaticFallback {
    fn fallback(&self) -> Response {
      Response::json(&vec!["fallback"])
    }
  }

  fn html(body: &str) -> Response {
    Response {
      status: 200,
      headers: vec![("Content-Type".to_string(), "text/html".to_string())],
      body: body.as_bytes().to_vec(),
    }
  }

  fn controller(
    fetch: Arc<FakeFetch>,
  ) -> CacheController<MemoryStorage, Arc<FakeFetch>, StaticFallback> {
    CacheController::new(
      MemoryStorage::new(),
      fetch,
      StaticFallback,
      Url::parse(ORIGIN).unwrap(),
    )
  }

  fn data_url() -> String {
    format!("{}{}", ORIGIN, "/api/internships")
  }

  #[tokio::test]
  async fn test_data_route_network_success_updates_cache() {
    let fetch = Arc::new(FakeFetch::new().respond(&data_url(), Response::json(&vec!["live"])));
    let controller = controller(Arc::clone(&fetch));
    let request = Request::get(data_url());

    let served = controller.handle(&request).await.unwrap().unwrap();
    assert_eq!(served.source, ServeSource::Network);
    assert_eq!(served.response.body, br#"["live"]"#.to_vec());

    // The live response is now in the cache: kill the network and ask again
    fetch.set_offline(true);
    let served = controller.handle(&request).await.unwrap().unwrap();
    assert_eq!(served.source, ServeSource::Cache);
    assert_eq!(served.response.body, br#"["live"]"#.to_vec());
  }

  #[tokio::test]
  async fn test_data_route_offline_without_cache_serves_fallback() {
    let fetch = Arc::new(FakeFetch::new());
    fetch.set_offline(true);
    let controller = controller(Arc::clone(&fetch));

    let served = controller
      .handle(&Request::get(data_url()))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(served.source, ServeSource::Fallback);
    assert_eq!(
      served.response.header("content-type"),
      Some("application/json")
    );
    assert_eq!(served.response.body, br#"["fallback"]"#.to_vec());
  }

  #[tokio::test]
  async fn test_cache_first_hit_skips_network() {
    let url = format!("{}/static/css/main.css", ORIGIN);
    let fetch = Arc::new(FakeFetch::new().respond(&url, html("body{}")));
    let controller = controller(Arc::clone(&fetch));
    let request = Request::get(&url);

    let first = controller.handle(&request).await.unwrap().unwrap();
    assert_eq!(first.source, ServeSource::Network);
    assert_eq!(fetch.calls(), 1);

    let second = controller.handle(&request).await.unwrap().unwrap();
    assert_eq!(second.source, ServeSource::Cache);
    assert_eq!(second.response, first.response);
    // No further network attempt for the hit
    assert_eq!(fetch.calls(), 1);
  }

  #[tokio::test]
  async fn test_cross_origin_asset_served_but_not_cached() {
    let url = "https://cdn.example/lib.js";
    let fetch = Arc::new(FakeFetch::new().respond(url, html("lib")));
    let controller = controller(Arc::clone(&fetch));
    let request = Request::get(url);

    let served = controller.handle(&request).await.unwrap().unwrap();
    assert_eq!(served.source, ServeSource::Network);

    // Not stored: going offline loses it
    fetch.set_offline(true);
    assert!(controller.handle(&request).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_error_status_not_cached() {
    let url = format!("{}/missing.css", ORIGIN);
    let fetch = Arc::new(FakeFetch::new().respond(
      &url,
      Response {
        status: 404,
        headers: Vec::new(),
        body: Vec::new(),
      },
    ));
    let controller = controller(Arc::clone(&fetch));
    let request = Request::get(&url);

    let served = controller.handle(&request).await.unwrap().unwrap();
    assert_eq!(served.response.status, 404);

    fetch.set_offline(true);
    assert!(controller.handle(&request).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_offline_navigation_falls_back_to_cached_root() {
    let root = format!("{}/", ORIGIN);
    let fetch = Arc::new(FakeFetch::new().respond(&root, html("<app/>")));
    let controller = controller(Arc::clone(&fetch));

    // Warm the root document, then go offline
    controller.handle(&Request::get(&root)).await.unwrap();
    fetch.set_offline(true);

    let request = Request::navigation(format!("{}/recommendations", ORIGIN));
    let served = controller.handle(&request).await.unwrap().unwrap();
    assert_eq!(served.source, ServeSource::Cache);
    assert_eq!(served.response.body, b"<app/>".to_vec());
  }

  #[tokio::test]
  async fn test_offline_subresource_miss_yields_none() {
    let fetch = Arc::new(FakeFetch::new());
    fetch.set_offline(true);
    let controller = controller(Arc::clone(&fetch));

    let request = Request::get(format!("{}/static/js/bundle.js", ORIGIN));
    assert!(controller.handle(&request).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_install_precaches_listed_assets() {
    let mut fetch = FakeFetch::new();
    for path in PRECACHE_PATHS {
      fetch = fetch.respond(&format!("{}{}", ORIGIN, path), html(path));
    }
    let fetch = Arc::new(fetch);
    let controller = controller(Arc::clone(&fetch));

    let installed = controller.install().await.unwrap();
    assert_eq!(installed, PRECACHE_PATHS.len());

    // Everything is servable offline now
    fetch.set_offline(true);
    for path in PRECACHE_PATHS {
      let request = Request::get(format!("{}{}", ORIGIN, path));
      let served = controller.handle(&request).await.unwrap().unwrap();
      assert_eq!(served.source, ServeSource::Cache);
    }
  }

  #[tokio::test]
  async fn test_install_keeps_going_past_failures() {
    // Only the root document resolves; the rest fail
    let fetch = Arc::new(FakeFetch::new().respond(&format!("{}/", ORIGIN), html("<app/>")));
    let controller = controller(Arc::clone(&fetch));

    let installed = controller.install().await.unwrap();
    assert_eq!(installed, 1);

    fetch.set_offline(true);
    let served = controller
      .handle(&Request::get(format!("{}/", ORIGIN)))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(served.source, ServeSource::Cache);
  }

  #[tokio::test]
  async fn test_activate_removes_stale_generations() {
    let storage = MemoryStorage::new();
    storage.put("internconnect-v0", "old", &html("old")).unwrap();
    storage.put("other-app-v3", "x", &html("x")).unwrap();
    storage
      .put(CACHE_GENERATION, "current", &html("current"))
      .unwrap();

    let controller = CacheController::new(
      storage,
      Arc::new(FakeFetch::new()),
      StaticFallback,
      Url::parse(ORIGIN).unwrap(),
    );

    let removed = controller.activate().await.unwrap();
    assert_eq!(removed, 2);

    // The current generation is untouched
    let served = controller.storage.get(CACHE_GENERATION, "current").unwrap();
    assert!(served.is_some());
    assert_eq!(
      controller.storage.list_generations().unwrap(),
      vec![CACHE_GENERATION.to_string()]
    );
  }
}
