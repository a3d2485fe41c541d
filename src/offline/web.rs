//! `web-sys` bindings for the cache controller, used inside the service worker.

use super::{
    CacheConfig, CacheController, CacheStorage, Network, RequestInfo, ResponseInfo, Timer,
    WorkerScope,
};
use crate::error::{CacheError, FetchError};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Cache, Request, Response, ServiceWorkerGlobalScope};

pub type WebCacheController = CacheController<WebCacheStorage, WebNetwork, WebScope, GlooTimer>;

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// The global scope of the running service worker.
pub fn worker_scope() -> Result<ServiceWorkerGlobalScope, CacheError> {
    js_sys::global()
        .dyn_into::<ServiceWorkerGlobalScope>()
        .map_err(|_| CacheError::Unavailable("not running in a service worker".to_string()))
}

/// Wire the controller to the current service worker with the default configuration.
pub fn service_worker_controller() -> Result<WebCacheController, CacheError> {
    let scope = worker_scope()?;
    Ok(CacheController::new(
        WebCacheStorage::from_scope(&scope)?,
        WebNetwork::new(scope.clone()),
        WebScope::new(scope),
        GlooTimer,
        CacheConfig::default(),
    ))
}

impl RequestInfo for Request {
    fn url(&self) -> String {
        Request::url(self)
    }

    fn method(&self) -> String {
        Request::method(self)
    }
}

impl ResponseInfo for Response {
    fn status(&self) -> u16 {
        Response::status(self)
    }
}

pub struct WebCacheStorage {
    caches: web_sys::CacheStorage,
}

impl WebCacheStorage {
    pub fn from_scope(scope: &ServiceWorkerGlobalScope) -> Result<Self, CacheError> {
        let caches = scope
            .caches()
            .map_err(|e| CacheError::Unavailable(describe(&e)))?;
        Ok(Self { caches })
    }

    async fn open(&self, cache_name: &str) -> Result<Cache, CacheError> {
        let opened = JsFuture::from(self.caches.open(cache_name))
            .await
            .map_err(|e| CacheError::Operation(describe(&e)))?;
        opened
            .dyn_into::<Cache>()
            .map_err(|_| CacheError::Operation(format!("caches.open('{cache_name}') returned a non-Cache")))
    }
}

#[async_trait(?Send)]
impl CacheStorage for WebCacheStorage {
    type Request = Request;
    type Response = Response;

    async fn put_all(
        &self,
        cache_name: &str,
        entries: Vec<(Request, Response)>,
    ) -> Result<(), CacheError> {
        let cache = self.open(cache_name).await?;
        for (request, response) in entries {
            JsFuture::from(cache.put_with_request(&request, &response))
                .await
                .map_err(|e| CacheError::Operation(format!("put {}: {}", request.url(), describe(&e))))?;
        }
        Ok(())
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        let found = JsFuture::from(self.caches.match_with_request(request))
            .await
            .map_err(|e| CacheError::Operation(describe(&e)))?;
        if found.is_undefined() {
            return Ok(None);
        }
        found
            .dyn_into::<Response>()
            .map(Some)
            .map_err(|_| CacheError::Operation("caches.match returned a non-Response".to_string()))
    }

    async fn cache_names(&self) -> Result<Vec<String>, CacheError> {
        let keys = JsFuture::from(self.caches.keys())
            .await
            .map_err(|e| CacheError::Operation(describe(&e)))?;
        let keys: js_sys::Array = keys
            .dyn_into()
            .map_err(|_| CacheError::Operation("caches.keys returned a non-Array".to_string()))?;
        Ok(keys.iter().filter_map(|k| k.as_string()).collect())
    }

    async fn delete(&self, cache_name: &str) -> Result<bool, CacheError> {
        let deleted = JsFuture::from(self.caches.delete(cache_name))
            .await
            .map_err(|e| CacheError::Operation(describe(&e)))?;
        Ok(deleted.as_bool().unwrap_or(false))
    }
}

pub struct WebNetwork {
    scope: ServiceWorkerGlobalScope,
}

impl WebNetwork {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

#[async_trait(?Send)]
impl Network for WebNetwork {
    type Request = Request;
    type Response = Response;

    fn request_for(&self, path: &str) -> Result<Request, FetchError> {
        // Relative paths resolve against the worker script URL.
        Request::new_with_str(path).map_err(|_| FetchError::InvalidRequest(path.to_string()))
    }

    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let network_error = |e: JsValue| FetchError::Network {
            url: request.url(),
            reason: describe(&e),
        };
        let response = JsFuture::from(self.scope.fetch_with_request(request))
            .await
            .map_err(network_error)?;
        response.dyn_into::<Response>().map_err(network_error)
    }
}

pub struct WebScope {
    scope: ServiceWorkerGlobalScope,
}

impl WebScope {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

#[async_trait(?Send)]
impl WorkerScope for WebScope {
    async fn skip_waiting(&self) -> Result<(), CacheError> {
        let promise = self
            .scope
            .skip_waiting()
            .map_err(|e| CacheError::Operation(describe(&e)))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| CacheError::Operation(describe(&e)))?;
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), CacheError> {
        JsFuture::from(self.scope.clients().claim())
            .await
            .map_err(|e| CacheError::Operation(describe(&e)))?;
        Ok(())
    }
}

/// Browser timer backed by `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimer;

impl Timer for GlooTimer {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        TimeoutFuture::new(ms).boxed_local()
    }
}
