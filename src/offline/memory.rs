//! In-memory stand-ins for the browser cache, network and worker scope.

use super::{CacheStorage, Network, RequestInfo, ResponseInfo, Timer, WorkerScope};
use crate::error::{CacheError, FetchError};
use async_trait::async_trait;
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRequest {
    method: String,
    url: String,
}

impl MemoryRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }
}

impl RequestInfo for MemoryRequest {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn method(&self) -> String {
        self.method.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryResponse {
    status: u16,
    body: Vec<u8>,
}

impl MemoryResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn not_found() -> Self {
        Self::new(404, Vec::new())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl ResponseInfo for MemoryResponse {
    fn status(&self) -> u16 {
        self.status
    }
}

/// How a write is cut short after some entries were stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutFault {
    /// Reject the remaining entries, like a quota error.
    Fail,
    /// Never complete, like a write still pending when install times out.
    Stall,
}

/// Named caches kept in creation order, matching `caches.match` lookup order.
///
/// Entries are written one by one, so an injected [`PutFault`] leaves the
/// same partial cache a browser would.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: RefCell<Vec<(String, HashMap<String, MemoryResponse>)>>,
    put_fault: Cell<Option<(usize, PutFault)>>,
    broken_lookups: Cell<bool>,
    broken_deletes: Cell<bool>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interrupt every `put_all` after `stored` entries.
    pub fn interrupt_puts_after(&self, stored: usize, fault: PutFault) {
        self.put_fault.set(Some((stored, fault)));
    }

    pub fn break_lookups(&self, broken: bool) {
        self.broken_lookups.set(broken);
    }

    pub fn break_deletes(&self, broken: bool) {
        self.broken_deletes.set(broken);
    }

    /// Create an empty cache, as an earlier worker version would have left it.
    pub fn create_cache(&self, name: &str) {
        let mut caches = self.caches.borrow_mut();
        if !caches.iter().any(|(n, _)| n == name) {
            caches.push((name.to_string(), HashMap::new()));
        }
    }

    pub fn entry_count(&self, name: &str) -> usize {
        self.caches
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.len())
            .unwrap_or(0)
    }
}

#[async_trait(?Send)]
impl CacheStorage for MemoryCacheStorage {
    type Request = MemoryRequest;
    type Response = MemoryResponse;

    async fn put_all(
        &self,
        cache_name: &str,
        entries: Vec<(MemoryRequest, MemoryResponse)>,
    ) -> Result<(), CacheError> {
        self.create_cache(cache_name);
        for (stored, (request, response)) in entries.into_iter().enumerate() {
            match self.put_fault.get() {
                Some((limit, PutFault::Fail)) if stored >= limit => {
                    return Err(CacheError::Operation(format!(
                        "put {}: quota exceeded",
                        request.url
                    )));
                }
                Some((limit, PutFault::Stall)) if stored >= limit => {
                    future::pending::<()>().await;
                }
                _ => {}
            }
            let mut caches = self.caches.borrow_mut();
            let (_, cache) = caches
                .iter_mut()
                .find(|(n, _)| n == cache_name)
                .ok_or_else(|| CacheError::Operation(format!("cache '{cache_name}' vanished")))?;
            cache.insert(request.url, response);
        }
        Ok(())
    }

    async fn lookup(&self, request: &MemoryRequest) -> Result<Option<MemoryResponse>, CacheError> {
        if self.broken_lookups.get() {
            return Err(CacheError::Operation(format!("match {}: storage error", request.url)));
        }
        Ok(self
            .caches
            .borrow()
            .iter()
            .find_map(|(_, entries)| entries.get(&request.url).cloned()))
    }

    async fn cache_names(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.caches.borrow().iter().map(|(n, _)| n.clone()).collect())
    }

    async fn delete(&self, cache_name: &str) -> Result<bool, CacheError> {
        if self.broken_deletes.get() {
            return Err(CacheError::Operation(format!("delete '{cache_name}': storage error")));
        }
        let mut caches = self.caches.borrow_mut();
        let before = caches.len();
        caches.retain(|(n, _)| n != cache_name);
        Ok(caches.len() != before)
    }
}

/// Scripted network: routes by path, can be switched offline or stalled.
#[derive(Debug)]
pub struct MemoryNetwork {
    origin: String,
    routes: RefCell<HashMap<String, MemoryResponse>>,
    online: Cell<bool>,
    stalled: Cell<bool>,
    fetches: Cell<usize>,
}

impl MemoryNetwork {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            routes: RefCell::new(HashMap::new()),
            online: Cell::new(true),
            stalled: Cell::new(false),
            fetches: Cell::new(0),
        }
    }

    pub fn route(&self, path: &str, response: MemoryResponse) {
        self.routes
            .borrow_mut()
            .insert(format!("{}{}", self.origin, path), response);
    }

    pub fn unroute(&self, path: &str) {
        self.routes
            .borrow_mut()
            .remove(&format!("{}{}", self.origin, path));
    }

    pub fn set_online(&self, online: bool) {
        self.online.set(online);
    }

    /// Make every fetch hang forever.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.set(stalled);
    }

    /// Number of fetches that reached the network.
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

#[async_trait(?Send)]
impl Network for MemoryNetwork {
    type Request = MemoryRequest;
    type Response = MemoryResponse;

    fn request_for(&self, path: &str) -> Result<MemoryRequest, FetchError> {
        if !path.starts_with('/') {
            return Err(FetchError::InvalidRequest(path.to_string()));
        }
        Ok(MemoryRequest::get(format!("{}{}", self.origin, path)))
    }

    async fn fetch(&self, request: &MemoryRequest) -> Result<MemoryResponse, FetchError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.stalled.get() {
            future::pending::<()>().await;
        }
        if !self.online.get() {
            return Err(FetchError::Network {
                url: request.url.clone(),
                reason: "offline".to_string(),
            });
        }
        Ok(self
            .routes
            .borrow()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(MemoryResponse::not_found))
    }
}

/// Records lifecycle calls instead of performing them.
#[derive(Debug, Default)]
pub struct MemoryScope {
    skipped_waiting: Cell<bool>,
    claimed: Cell<bool>,
}

impl MemoryScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skipped_waiting(&self) -> bool {
        self.skipped_waiting.get()
    }

    pub fn claimed(&self) -> bool {
        self.claimed.get()
    }
}

#[async_trait(?Send)]
impl WorkerScope for MemoryScope {
    async fn skip_waiting(&self) -> Result<(), CacheError> {
        self.skipped_waiting.set(true);
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), CacheError> {
        self.claimed.set(true);
        Ok(())
    }
}

/// A timer that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverTimer;

impl Timer for NeverTimer {
    fn sleep(&self, _ms: u32) -> LocalBoxFuture<'static, ()> {
        future::pending().boxed_local()
    }
}

/// A timer that fires as soon as it is polled.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantTimer;

impl Timer for InstantTimer {
    fn sleep(&self, _ms: u32) -> LocalBoxFuture<'static, ()> {
        future::ready(()).boxed_local()
    }
}
