//! Application-level configuration constants.

// Branding
pub const APP_NAME: &str = "Pixel Price Calculator";
pub const BRAND_COLOR: &str = "#022073";
pub const LOGO_PATH: &str = "/logo-white.png";

// Offline cache worker
pub const SERVICE_WORKER_SCRIPT: &str = "/service-worker.js";
pub const CACHE_PREFIX: &str = "pixel-calc-";
pub const CACHE_NAME: &str = "pixel-calc-v1";
pub const PRECACHE_ASSETS: &[&str] = &["/", "/index.html", LOGO_PATH];
pub const INSTALL_TIMEOUT_MS: u32 = 15_000;

// Persisted preference keys
pub const THEME_KEY: &str = "theme";
pub const LANGUAGE_KEY: &str = "lang";

// Default values for input fields
pub const DEFAULT_QUANTITY: u32 = 1;
pub const DEFAULT_WIDTH_CM: f64 = 100.0;
pub const DEFAULT_HEIGHT_CM: f64 = 50.0;
pub const DEFAULT_DISCOUNT_PCT: f64 = 0.0;

// Min/Max limits for input fields
pub const MIN_DIMENSION_CM: f64 = 1.0;
pub const MAX_DIMENSION_CM: f64 = 10_000.0;
pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 100_000;
pub const MAX_UNIT_PRICE: f64 = 1_000_000.0;
pub const MAX_DISCOUNT_PCT: f64 = 100.0;

// Logging
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
