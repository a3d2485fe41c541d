//! Error types shared across the calculator and the offline worker.

use thiserror::Error;

/// Validation and lookup failures while computing a price.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    /// A required field was absent or blank.
    #[error("{field} cannot be empty")]
    Missing { field: &'static str },

    /// A field could not be read as a number.
    #[error("{field} must be a valid number (got '{value}')")]
    Invalid { field: &'static str, value: String },

    /// A field parsed but fell outside its accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    /// The selected material is not on the rate card.
    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    /// The embedded rate card could not be read.
    #[error("Rate card error: {0}")]
    RateCard(String),
}

/// Failures reading or writing persisted preferences.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The browser exposes no storage (private mode, disabled, worker context).
    #[error("Storage is not available")]
    Unavailable,

    /// The storage rejected the write (quota, security error).
    #[error("Failed to write '{key}': {reason}")]
    WriteFailed { key: String, reason: String },
}

/// Failures talking to the cache storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache storage is not available: {0}")]
    Unavailable(String),

    #[error("Cache operation failed: {0}")]
    Operation(String),
}

/// Failures fetching a resource over the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not be constructed.
    #[error("Invalid request for {0}")]
    InvalidRequest(String),

    /// The network was unreachable or the fetch was rejected.
    #[error("Network request to {url} failed: {reason}")]
    Network { url: String, reason: String },
}

/// Reasons the install step did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("Failed to fetch asset: {0}")]
    Fetch(#[from] FetchError),

    #[error("Asset {url} responded with status {status}")]
    BadStatus { url: String, status: u16 },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Install timed out after {0} ms")]
    TimedOut(u32),
}

/// Problems found in the web app manifest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Manifest is not valid JSON: {0}")]
    Parse(String),

    #[error("Manifest field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Expected icons {expected:?}, found {found:?}")]
    IconSizes {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Icon {src} has type '{found}', expected image/png")]
    IconType { src: String, found: String },

    #[error("start_url '{0}' is not part of the built output")]
    UnreachableStartUrl(String),

    #[error("Unsupported display mode '{0}'")]
    DisplayMode(String),

    #[error("Field '{field}' is not a #rrggbb colour: {value}")]
    Color { field: &'static str, value: String },
}
