//! Offline cache worker entry points.
//!
//! `public/service-worker.js` registers the install/activate/fetch listeners
//! synchronously, loads this module and forwards each event here.

use log::{error, info};
use pixel_price_calculator::config::LOG_LEVEL;
use pixel_price_calculator::logging;
use pixel_price_calculator::offline::web::{service_worker_controller, WebCacheController};
use wasm_bindgen::prelude::*;
use web_sys::{Request, Response};

fn controller() -> Result<WebCacheController, JsValue> {
    service_worker_controller().map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Install step; a rejection keeps the worker from activating.
#[wasm_bindgen]
pub async fn sw_install() -> Result<(), JsValue> {
    let report = controller()?.install().await.map_err(|e| {
        error!("Install failed: {}", e);
        JsValue::from_str(&e.to_string())
    })?;
    info!("Precached: {}", report.cached.join(", "));
    Ok(())
}

#[wasm_bindgen]
pub async fn sw_activate() -> Result<(), JsValue> {
    controller()?.activate().await;
    Ok(())
}

/// Cache-first response for an intercepted request.
#[wasm_bindgen]
pub async fn sw_fetch(request: Request) -> Result<Response, JsValue> {
    controller()?
        .handle_fetch(&request)
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn main() {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();
    logging::init(LOG_LEVEL);
}
