//! `log` backend that forwards records to the browser console.
//!
//! Both the page and the service worker call [`init`] once at startup. On
//! non-wasm targets it does nothing so native test runs stay quiet.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record.level(), record.target(), &record.args().to_string());
        emit(record.level(), &line);
    }

    fn flush(&self) {}
}

fn format_record(level: Level, target: &str, message: &str) -> String {
    format!("[{level}] {target}: {message}")
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, _line: &str) {}

/// Install the console logger with the given maximum level.
///
/// Calling it twice is harmless; the second registration is ignored.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_format_includes_level_and_target() {
        let line = format_record(Level::Warn, "pixel_price_calculator::offline", "cache miss");
        assert_eq!(line, "[WARN] pixel_price_calculator::offline: cache miss");
    }

    #[test]
    fn init_is_idempotent() {
        init(LevelFilter::Debug);
        init(LevelFilter::Error);
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }
}
