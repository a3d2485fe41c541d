//! Offline behaviour of the cache worker, driven through its full lifecycle
//! against the in-memory platform.

use futures::executor::block_on;
use pixel_price_calculator::config::{CACHE_NAME, PRECACHE_ASSETS};
use pixel_price_calculator::error::{FetchError, InstallError};
use pixel_price_calculator::manifest::WebManifest;
use pixel_price_calculator::offline::memory::{
    MemoryCacheStorage, MemoryNetwork, MemoryRequest, MemoryResponse, MemoryScope, NeverTimer,
};
use pixel_price_calculator::offline::{CacheConfig, CacheController, CacheStorage, ResponseInfo};
use std::rc::Rc;

const ORIGIN: &str = "https://pixel.example";
const SHELL: &str = "<!doctype html><title>Pixel Price Calculator</title>";

fn network() -> MemoryNetwork {
    let network = MemoryNetwork::new(ORIGIN);
    network.route("/", MemoryResponse::ok(SHELL));
    network.route("/index.html", MemoryResponse::ok(SHELL));
    network.route("/logo-white.png", MemoryResponse::ok(vec![0x89, b'P', b'N', b'G']));
    network.route("/pixel-price-calculator_bg.wasm", MemoryResponse::ok("wasm"));
    network
}

fn installed_worker(
    config: CacheConfig,
) -> CacheController<MemoryCacheStorage, MemoryNetwork, MemoryScope, NeverTimer> {
    let ctl = CacheController::new(
        MemoryCacheStorage::new(),
        network(),
        MemoryScope::new(),
        NeverTimer,
        config,
    );
    block_on(ctl.install()).expect("install");
    block_on(ctl.activate());
    ctl
}

fn get(path: &str) -> MemoryRequest {
    MemoryRequest::get(format!("{ORIGIN}{path}"))
}

#[test]
fn precached_assets_are_served_without_network() {
    let ctl = installed_worker(CacheConfig::default());
    ctl.network().set_online(false);

    for path in PRECACHE_ASSETS {
        let resp = block_on(ctl.handle_fetch(&get(path)))
            .unwrap_or_else(|e| panic!("{path} not served offline: {e}"));
        assert!(resp.is_success());
    }
}

#[test]
fn start_url_renders_shell_offline() {
    let ctl = installed_worker(CacheConfig::default());
    ctl.network().set_online(false);

    let manifest = WebManifest::bundled().unwrap();
    let resp = block_on(ctl.handle_fetch(&get(&manifest.start_url))).unwrap();
    assert_eq!(resp.body(), SHELL.as_bytes());
}

#[test]
fn uncached_request_fails_when_offline() {
    let ctl = installed_worker(CacheConfig::default());
    ctl.network().set_online(false);

    let err = block_on(ctl.handle_fetch(&get("/pixel-price-calculator_bg.wasm"))).unwrap_err();
    assert_eq!(
        err,
        FetchError::Network {
            url: format!("{ORIGIN}/pixel-price-calculator_bg.wasm"),
            reason: "offline".to_string(),
        }
    );
}

#[test]
fn uncached_request_uses_network_when_online() {
    let ctl = installed_worker(CacheConfig::default());
    let resp = block_on(ctl.handle_fetch(&get("/pixel-price-calculator_bg.wasm"))).unwrap();
    assert_eq!(resp.body(), b"wasm");

    let missing = block_on(ctl.handle_fetch(&get("/nope.js"))).unwrap();
    assert_eq!(missing.status(), 404);
}

#[test]
fn new_version_replaces_old_cache() {
    let storage = Rc::new(MemoryCacheStorage::new());
    let worker = |name: &str| {
        CacheController::new(
            storage.clone(),
            network(),
            MemoryScope::new(),
            NeverTimer,
            CacheConfig::default().with_cache_name(name),
        )
    };

    let old = worker("pixel-calc-v0");
    block_on(old.install()).unwrap();
    block_on(old.activate());

    let new = worker(CACHE_NAME);
    block_on(new.install()).unwrap();
    // Until the new worker activates both versions coexist.
    assert_eq!(block_on(storage.cache_names()).unwrap().len(), 2);

    let report = block_on(new.activate());
    assert_eq!(report.deleted, vec!["pixel-calc-v0".to_string()]);
    assert_eq!(block_on(storage.cache_names()).unwrap(), vec![CACHE_NAME.to_string()]);

    new.network().set_online(false);
    assert!(block_on(new.handle_fetch(&get("/"))).is_ok());
}

#[test]
fn failed_install_leaves_no_partial_cache() {
    let net = network();
    net.unroute("/index.html");
    let ctl = CacheController::new(
        MemoryCacheStorage::new(),
        net,
        MemoryScope::new(),
        NeverTimer,
        CacheConfig::default(),
    );

    assert!(matches!(
        block_on(ctl.install()),
        Err(InstallError::BadStatus { status: 404, .. })
    ));
    assert_eq!(ctl.storage().entry_count(CACHE_NAME), 0);
    assert!(block_on(ctl.storage().cache_names()).unwrap().is_empty());
}
