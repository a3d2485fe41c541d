//! Offline cache worker.
//!
//! A cache-first strategy for the app shell:
//!
//! - **install** fetches a fixed asset list and stores it under the current
//!   versioned cache name.
//! - **activate** drops caches left behind by earlier versions and takes
//!   control of open pages.
//! - **fetch** answers GET requests from the cache and forwards misses to the
//!   network untouched.
//!
//! The controller only talks to the platform through the traits below so the
//! same logic runs against `web-sys` in the service worker ([`web`]) and
//! against in-memory fakes in tests ([`memory`]).

pub mod memory;
pub mod web;

use crate::config::{CACHE_NAME, CACHE_PREFIX, INSTALL_TIMEOUT_MS, PRECACHE_ASSETS};
use crate::error::{CacheError, FetchError, InstallError};
use async_trait::async_trait;
use futures::future::{self, Either, LocalBoxFuture};
use log::{debug, info, warn};
use std::rc::Rc;

/// What the controller needs to know about a request.
pub trait RequestInfo {
    fn url(&self) -> String;
    fn method(&self) -> String;
}

/// What the controller needs to know about a response.
pub trait ResponseInfo {
    fn status(&self) -> u16;

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }
}

#[async_trait(?Send)]
pub trait Network {
    type Request: RequestInfo;
    type Response: ResponseInfo;

    /// Build a GET request for an asset path relative to the worker scope.
    fn request_for(&self, path: &str) -> Result<Self::Request, FetchError>;

    async fn fetch(&self, request: &Self::Request) -> Result<Self::Response, FetchError>;
}

/// Named response caches, keyed by request URL.
#[async_trait(?Send)]
pub trait CacheStorage {
    type Request;
    type Response;

    /// Store every entry in `cache_name`, creating the cache if needed.
    async fn put_all(
        &self,
        cache_name: &str,
        entries: Vec<(Self::Request, Self::Response)>,
    ) -> Result<(), CacheError>;

    /// Find a response for the request's exact URL in any cache.
    async fn lookup(&self, request: &Self::Request) -> Result<Option<Self::Response>, CacheError>;

    async fn cache_names(&self) -> Result<Vec<String>, CacheError>;

    /// Returns whether a cache by that name existed.
    async fn delete(&self, cache_name: &str) -> Result<bool, CacheError>;
}

/// Shared storage, e.g. one browser cache seen by consecutive worker versions.
#[async_trait(?Send)]
impl<C: CacheStorage + ?Sized> CacheStorage for Rc<C> {
    type Request = C::Request;
    type Response = C::Response;

    async fn put_all(
        &self,
        cache_name: &str,
        entries: Vec<(Self::Request, Self::Response)>,
    ) -> Result<(), CacheError> {
        (**self).put_all(cache_name, entries).await
    }

    async fn lookup(&self, request: &Self::Request) -> Result<Option<Self::Response>, CacheError> {
        (**self).lookup(request).await
    }

    async fn cache_names(&self) -> Result<Vec<String>, CacheError> {
        (**self).cache_names().await
    }

    async fn delete(&self, cache_name: &str) -> Result<bool, CacheError> {
        (**self).delete(cache_name).await
    }
}

/// Lifecycle hooks of the worker itself.
#[async_trait(?Send)]
pub trait WorkerScope {
    async fn skip_waiting(&self) -> Result<(), CacheError>;
    async fn claim_clients(&self) -> Result<(), CacheError>;
}

pub trait Timer {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;
}

/// How install treats an asset that cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssetPolicy {
    /// Any failure aborts install and nothing is stored.
    #[default]
    Strict,
    /// Store what could be fetched and report the rest.
    BestEffort,
}

/// Configuration for the cache controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Cache written by this version.
    pub cache_name: String,
    /// Prefix shared by every version's cache name.
    pub cache_prefix: String,
    /// Paths fetched and stored on install.
    pub assets: Vec<String>,
    /// Upper bound for install; `None` waits indefinitely.
    pub install_timeout_ms: Option<u32>,
    pub policy: AssetPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            cache_prefix: CACHE_PREFIX.to_string(),
            assets: PRECACHE_ASSETS.iter().map(|s| s.to_string()).collect(),
            install_timeout_ms: Some(INSTALL_TIMEOUT_MS),
            policy: AssetPolicy::Strict,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = name.into();
        self
    }

    #[must_use]
    pub fn with_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets = assets.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_install_timeout_ms(mut self, timeout: Option<u32>) -> Self {
        self.install_timeout_ms = timeout;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AssetPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Outcome of a completed install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// URLs now in the cache.
    pub cached: Vec<String>,
    /// Paths left out under [`AssetPolicy::BestEffort`].
    pub skipped: Vec<String>,
}

/// Outcome of activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
    pub claimed: bool,
}

/// Cache-first controller driving install, activate and fetch.
pub struct CacheController<S, N, W, T> {
    storage: S,
    network: N,
    scope: W,
    timer: T,
    config: CacheConfig,
}

impl<S, N, W, T> CacheController<S, N, W, T>
where
    N: Network,
    S: CacheStorage<Request = N::Request, Response = N::Response>,
    W: WorkerScope,
    T: Timer,
{
    pub fn new(storage: S, network: N, scope: W, timer: T, config: CacheConfig) -> Self {
        Self {
            storage,
            network,
            scope,
            timer,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Populate the versioned cache with the configured assets.
    ///
    /// On success the worker asks to skip the waiting phase so it activates
    /// without waiting for old pages to close.
    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        info!(
            "Installing: caching {} assets into '{}'",
            self.config.assets.len(),
            self.config.cache_name
        );

        let preexisting = self.cache_exists().await;
        let populated = match self.config.install_timeout_ms {
            None => self.populate().await,
            Some(ms) => {
                let population = Box::pin(self.populate());
                match future::select(population, self.timer.sleep(ms)).await {
                    Either::Left((result, _)) => result,
                    Either::Right(_) => {
                        warn!("Install did not finish within {} ms", ms);
                        Err(InstallError::TimedOut(ms))
                    }
                }
            }
        };
        let report = match populated {
            Ok(report) => report,
            Err(e) => {
                if !preexisting {
                    self.discard_partial_cache().await;
                }
                return Err(e);
            }
        };

        if let Err(e) = self.scope.skip_waiting().await {
            warn!("skipWaiting failed: {}", e);
        }
        info!(
            "Install complete: {} cached, {} skipped",
            report.cached.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Whether the versioned cache was already there before install started.
    /// An unreadable storage counts as present so install never deletes it.
    async fn cache_exists(&self) -> bool {
        match self.storage.cache_names().await {
            Ok(names) => names.contains(&self.config.cache_name),
            Err(e) => {
                warn!("Could not list caches before install: {}", e);
                true
            }
        }
    }

    /// Drop whatever a failed or interrupted write left in the versioned cache.
    async fn discard_partial_cache(&self) {
        match self.storage.delete(&self.config.cache_name).await {
            Ok(true) => info!("Discarded partial cache '{}'", self.config.cache_name),
            Ok(false) => {}
            Err(e) => warn!(
                "Could not discard partial cache '{}': {}",
                self.config.cache_name, e
            ),
        }
    }

    async fn populate(&self) -> Result<InstallReport, InstallError> {
        let mut requests = Vec::with_capacity(self.config.assets.len());
        for path in &self.config.assets {
            requests.push((path.as_str(), self.network.request_for(path)?));
        }

        let mut report = InstallReport::default();
        let mut entries = Vec::with_capacity(requests.len());

        match self.config.policy {
            AssetPolicy::Strict => {
                let responses = future::try_join_all(requests.iter().map(|(_, req)| async move {
                    let resp = self.network.fetch(req).await?;
                    if !resp.is_success() {
                        return Err(InstallError::BadStatus {
                            url: req.url(),
                            status: resp.status(),
                        });
                    }
                    Ok::<_, InstallError>(resp)
                }))
                .await?;
                for ((_, req), resp) in requests.into_iter().zip(responses) {
                    report.cached.push(req.url());
                    entries.push((req, resp));
                }
            }
            AssetPolicy::BestEffort => {
                let results =
                    future::join_all(requests.iter().map(|(_, req)| self.network.fetch(req))).await;
                for ((path, req), result) in requests.into_iter().zip(results) {
                    match result {
                        Ok(resp) if resp.is_success() => {
                            report.cached.push(req.url());
                            entries.push((req, resp));
                        }
                        Ok(resp) => {
                            warn!("Skipping {}: status {}", path, resp.status());
                            report.skipped.push(path.to_string());
                        }
                        Err(e) => {
                            warn!("Skipping {}: {}", path, e);
                            report.skipped.push(path.to_string());
                        }
                    }
                }
            }
        }

        self.storage.put_all(&self.config.cache_name, entries).await?;
        Ok(report)
    }

    /// Delete caches from previous versions, then take control of open pages.
    pub async fn activate(&self) -> ActivateReport {
        let mut report = ActivateReport::default();

        match self.storage.cache_names().await {
            Ok(names) => {
                for name in names {
                    if !self.is_stale(&name) {
                        continue;
                    }
                    match self.storage.delete(&name).await {
                        Ok(_) => {
                            info!("Deleted stale cache '{}'", name);
                            report.deleted.push(name);
                        }
                        Err(e) => warn!("Could not delete stale cache '{}': {}", name, e),
                    }
                }
            }
            Err(e) => warn!("Could not list caches, skipping cleanup: {}", e),
        }

        match self.scope.claim_clients().await {
            Ok(()) => report.claimed = true,
            Err(e) => warn!("clients.claim failed: {}", e),
        }
        info!("Activated '{}'", self.config.cache_name);
        report
    }

    fn is_stale(&self, name: &str) -> bool {
        name.starts_with(&self.config.cache_prefix) && name != self.config.cache_name
    }

    /// Serve a request cache-first.
    ///
    /// Misses and non-GET requests go to the network as-is; a network
    /// failure is returned to the caller unchanged.
    pub async fn handle_fetch(&self, request: &N::Request) -> Result<N::Response, FetchError> {
        if !request.method().eq_ignore_ascii_case("GET") {
            return self.network.fetch(request).await;
        }

        match self.storage.lookup(request).await {
            Ok(Some(cached)) => {
                debug!("Cache hit: {}", request.url());
                return Ok(cached);
            }
            Ok(None) => debug!("Cache miss: {}", request.url()),
            Err(e) => warn!("Cache lookup failed for {}: {}", request.url(), e),
        }
        self.network.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::memory::*;
    use super::*;
    use futures::executor::block_on;

    const ORIGIN: &str = "https://calc.example";

    type TestController =
        CacheController<MemoryCacheStorage, MemoryNetwork, MemoryScope, NeverTimer>;

    fn serving_network() -> MemoryNetwork {
        let network = MemoryNetwork::new(ORIGIN);
        network.route("/", MemoryResponse::ok("<html>shell</html>"));
        network.route("/index.html", MemoryResponse::ok("<html>shell</html>"));
        network.route("/logo-white.png", MemoryResponse::ok("PNG"));
        network
    }

    fn controller(network: MemoryNetwork, config: CacheConfig) -> TestController {
        CacheController::new(
            MemoryCacheStorage::new(),
            network,
            MemoryScope::new(),
            NeverTimer,
            config,
        )
    }

    #[test]
    fn default_config_uses_app_constants() {
        let config = CacheConfig::default();
        assert_eq!(config.cache_name, CACHE_NAME);
        assert_eq!(config.assets, vec!["/", "/index.html", "/logo-white.png"]);
        assert_eq!(config.policy, AssetPolicy::Strict);
        assert_eq!(config.install_timeout_ms, Some(INSTALL_TIMEOUT_MS));
    }

    #[test]
    fn install_caches_every_asset_and_skips_waiting() {
        let ctl = controller(serving_network(), CacheConfig::default());
        let report = block_on(ctl.install()).unwrap();

        assert_eq!(report.cached.len(), 3);
        assert!(report.skipped.is_empty());
        assert_eq!(ctl.storage().entry_count(CACHE_NAME), 3);
        assert!(ctl.scope.skipped_waiting());
    }

    #[test]
    fn strict_install_stores_nothing_on_failure() {
        let network = serving_network();
        network.unroute("/logo-white.png");
        let ctl = controller(network, CacheConfig::default());

        let err = block_on(ctl.install()).unwrap_err();
        assert!(matches!(err, InstallError::BadStatus { status: 404, .. }));
        assert!(block_on(ctl.storage().cache_names()).unwrap().is_empty());
        assert!(!ctl.scope.skipped_waiting());
    }

    #[test]
    fn strict_install_fails_when_offline() {
        let network = serving_network();
        network.set_online(false);
        let ctl = controller(network, CacheConfig::default());
        assert!(matches!(
            block_on(ctl.install()),
            Err(InstallError::Fetch(FetchError::Network { .. }))
        ));
    }

    #[test]
    fn best_effort_install_keeps_what_it_can() {
        let network = serving_network();
        network.unroute("/logo-white.png");
        let ctl = controller(
            network,
            CacheConfig::default().with_policy(AssetPolicy::BestEffort),
        );

        let report = block_on(ctl.install()).unwrap();
        assert_eq!(report.cached.len(), 2);
        assert_eq!(report.skipped, vec!["/logo-white.png".to_string()]);
        assert_eq!(ctl.storage().entry_count(CACHE_NAME), 2);
    }

    #[test]
    fn install_times_out() {
        let network = serving_network();
        network.set_stalled(true);
        let ctl = CacheController::new(
            MemoryCacheStorage::new(),
            network,
            MemoryScope::new(),
            InstantTimer,
            CacheConfig::default().with_install_timeout_ms(Some(50)),
        );
        assert_eq!(block_on(ctl.install()), Err(InstallError::TimedOut(50)));
    }

    #[test]
    fn failed_write_discards_partial_cache() {
        let ctl = controller(serving_network(), CacheConfig::default());
        ctl.storage().interrupt_puts_after(1, PutFault::Fail);

        let err = block_on(ctl.install()).unwrap_err();
        assert!(matches!(err, InstallError::Cache(CacheError::Operation(_))));
        assert!(block_on(ctl.storage().cache_names()).unwrap().is_empty());

        // Nothing half-written may answer a request afterwards.
        ctl.network().set_online(false);
        let req = MemoryRequest::get(format!("{ORIGIN}/"));
        assert!(block_on(ctl.handle_fetch(&req)).is_err());
    }

    #[test]
    fn timeout_during_write_discards_partial_cache() {
        let ctl = CacheController::new(
            MemoryCacheStorage::new(),
            serving_network(),
            MemoryScope::new(),
            InstantTimer,
            CacheConfig::default().with_install_timeout_ms(Some(50)),
        );
        ctl.storage().interrupt_puts_after(2, PutFault::Stall);

        assert_eq!(block_on(ctl.install()), Err(InstallError::TimedOut(50)));
        assert_eq!(ctl.storage().entry_count(CACHE_NAME), 0);
        assert!(block_on(ctl.storage().cache_names()).unwrap().is_empty());
        assert!(!ctl.scope.skipped_waiting());
    }

    #[test]
    fn failed_reinstall_keeps_existing_cache() {
        let ctl = controller(serving_network(), CacheConfig::default());
        block_on(ctl.install()).unwrap();
        ctl.storage().interrupt_puts_after(0, PutFault::Fail);

        assert!(block_on(ctl.install()).is_err());
        assert_eq!(ctl.storage().entry_count(CACHE_NAME), 3);
    }

    #[test]
    fn failed_delete_does_not_stop_activation() {
        let ctl = controller(serving_network(), CacheConfig::default());
        ctl.storage().create_cache("pixel-calc-v0");
        block_on(ctl.install()).unwrap();
        ctl.storage().break_deletes(true);

        let report = block_on(ctl.activate());
        assert!(report.deleted.is_empty());
        assert!(report.claimed);
        assert!(ctl.scope.claimed());
    }

    #[test]
    fn lookup_error_falls_back_to_network() {
        let ctl = controller(serving_network(), CacheConfig::default());
        block_on(ctl.install()).unwrap();
        ctl.storage().break_lookups(true);
        let before = ctl.network().fetch_count();

        let req = MemoryRequest::get(format!("{ORIGIN}/index.html"));
        let resp = block_on(ctl.handle_fetch(&req)).unwrap();
        assert_eq!(resp.body(), b"<html>shell</html>");
        assert_eq!(ctl.network().fetch_count(), before + 1);
    }

    #[test]
    fn activate_removes_only_stale_versions() {
        let ctl = controller(serving_network(), CacheConfig::default());
        ctl.storage().create_cache("pixel-calc-v0");
        ctl.storage().create_cache("another-app-v3");
        block_on(ctl.install()).unwrap();

        let report = block_on(ctl.activate());
        assert_eq!(report.deleted, vec!["pixel-calc-v0".to_string()]);
        assert!(report.claimed);

        let mut remaining = block_on(ctl.storage().cache_names()).unwrap();
        remaining.sort();
        assert_eq!(remaining, vec!["another-app-v3".to_string(), CACHE_NAME.to_string()]);
    }

    #[test]
    fn fetch_prefers_cache() {
        let ctl = controller(serving_network(), CacheConfig::default());
        block_on(ctl.install()).unwrap();
        let before = ctl.network().fetch_count();

        let req = MemoryRequest::get(format!("{ORIGIN}/index.html"));
        let resp = block_on(ctl.handle_fetch(&req)).unwrap();
        assert_eq!(resp.body(), b"<html>shell</html>");
        assert_eq!(ctl.network().fetch_count(), before);
    }

    #[test]
    fn fetch_miss_goes_to_network() {
        let network = serving_network();
        network.route("/app.js", MemoryResponse::ok("js"));
        let ctl = controller(network, CacheConfig::default());
        block_on(ctl.install()).unwrap();

        let req = MemoryRequest::get(format!("{ORIGIN}/app.js"));
        assert_eq!(block_on(ctl.handle_fetch(&req)).unwrap().body(), b"js");
        // misses are not written back
        assert_eq!(ctl.storage().entry_count(CACHE_NAME), 3);
    }

    #[test]
    fn lookup_key_is_exact_url() {
        let ctl = controller(serving_network(), CacheConfig::default());
        block_on(ctl.install()).unwrap();
        ctl.network().set_online(false);

        let req = MemoryRequest::get(format!("{ORIGIN}/index.html?v=2"));
        assert!(block_on(ctl.handle_fetch(&req)).is_err());
    }

    #[test]
    fn non_get_requests_bypass_cache() {
        let ctl = controller(serving_network(), CacheConfig::default());
        block_on(ctl.install()).unwrap();
        ctl.network().set_online(false);

        let req = MemoryRequest::new("POST", format!("{ORIGIN}/index.html"));
        assert!(matches!(
            block_on(ctl.handle_fetch(&req)),
            Err(FetchError::Network { .. })
        ));
    }
}
