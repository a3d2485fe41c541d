//! Registers the offline cache worker from the page.
//!
//! Registration is best effort: a failure is logged and the app keeps
//! running online-only. Nothing is retried.

use crate::config::SERVICE_WORKER_SCRIPT;
use log::{error, info, warn};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Whether the browser exposes `navigator.serviceWorker`.
pub fn is_supported() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    js_sys::Reflect::has(&window.navigator(), &JsValue::from_str("serviceWorker")).unwrap_or(false)
}

/// Whether an active worker already controls this page.
pub fn is_controlled() -> bool {
    web_sys::window()
        .filter(|_| is_supported())
        .map(|w| w.navigator().service_worker().controller().is_some())
        .unwrap_or(false)
}

/// Register `script_url` and wait for the browser to accept it.
pub async fn register(script_url: &str) -> Result<web_sys::ServiceWorkerRegistration, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let container = window.navigator().service_worker();
    let registration = JsFuture::from(container.register(script_url)).await?;
    Ok(registration.into())
}

/// Fire-and-forget registration of the app's worker at page load.
pub fn register_offline_worker() {
    if !is_supported() {
        info!("Service workers are not supported; running online only");
        return;
    }
    wasm_bindgen_futures::spawn_local(async {
        match register(SERVICE_WORKER_SCRIPT).await {
            Ok(reg) => info!("Offline worker registered (scope {})", reg.scope()),
            Err(e) => error!("Offline worker registration failed: {:?}", e),
        }
    });
}

/// A `controllerchange` listener that stays attached until dropped.
pub struct ControllerWatch {
    container: web_sys::ServiceWorkerContainer,
    listener: Closure<dyn FnMut()>,
}

impl Drop for ControllerWatch {
    fn drop(&mut self) {
        let _ = self.container.remove_event_listener_with_callback(
            "controllerchange",
            self.listener.as_ref().unchecked_ref(),
        );
    }
}

/// Call `on_change` whenever a worker starts (or stops) controlling the page,
/// e.g. right after the first install claims it.
pub fn watch_controller(on_change: impl Fn() + 'static) -> Option<ControllerWatch> {
    if !is_supported() {
        return None;
    }
    let container = web_sys::window()?.navigator().service_worker();
    let listener = Closure::<dyn FnMut()>::new(on_change);
    if let Err(e) = container
        .add_event_listener_with_callback("controllerchange", listener.as_ref().unchecked_ref())
    {
        warn!("Could not watch for controllerchange: {:?}", e);
        return None;
    }
    Some(ControllerWatch { container, listener })
}
