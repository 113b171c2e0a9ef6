//! Shared helpers for WASM API operations
//!
//! Console logging macros, serialization to JS values, and access to the
//! loaded playback session.

use std::sync::{Mutex, MutexGuard};

use lazy_static::lazy_static;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::playback::PlaybackSession;

/// Returned by numeric API calls that cannot produce a value
pub const NOT_FOUND: i64 = -1;

// WASM-owned session storage; `None` until a file is loaded
lazy_static! {
    static ref SESSION: Mutex<Option<PlaybackSession>> = Mutex::new(None);
}

// ============================================================================
// Console Logging Functions
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn warn(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

// ============================================================================
// Logging Macros
// ============================================================================

/// Log a debug message with [WASM] prefix
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Log an info message with [WASM] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log a warning message with [WASM] ⚠️ prefix
#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

/// Log an error message with [WASM] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

pub fn log_debug(msg: &str) {
    log(&format!("[WASM] {}", msg));
}

pub fn log_info(msg: &str) {
    info(&format!("[WASM] {}", msg));
}

pub fn log_warn(msg: &str) {
    warn(&format!("[WASM] ⚠️ {}", msg));
}

pub fn log_error(msg: &str) {
    error(&format!("[WASM] ❌ {}", msg));
}

// ============================================================================
// Serialization
// ============================================================================

/// Serialize a value to JavaScript with automatic error handling
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

// ============================================================================
// Session Access
// ============================================================================

pub fn lock_session() -> Result<MutexGuard<'static, Option<PlaybackSession>>, JsValue> {
    SESSION.lock().map_err(|e| {
        let msg = format!("Session lock poisoned: {}", e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Run `f` against the loaded session, or return `fallback` when none is loaded
/// (or the lock is poisoned)
pub fn with_session<R>(fallback: R, f: impl FnOnce(&mut PlaybackSession) -> R) -> R {
    match lock_session() {
        Ok(mut guard) => match guard.as_mut() {
            Some(session) => f(session),
            None => {
                log_debug("No MIDI content loaded");
                fallback
            }
        },
        Err(_) => fallback,
    }
}

/// Milliseconds from the page's performance clock, if available
pub fn now_millis() -> Option<f64> {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
}

pub(crate) fn install_session(session: Option<PlaybackSession>) -> Result<(), JsValue> {
    *lock_session()? = session;
    Ok(())
}
