//! WASM API for MIDI playback and measure navigation
//!
//! All functions act on the single session held in WASM memory. Numeric
//! queries return `-1` when there is no answer (nothing loaded, no measure
//! grid, malformed label).

use wasm_bindgen::prelude::*;

use crate::api::helpers::{install_session, lock_session, now_millis, serialize, with_session, NOT_FOUND};
use crate::playback::{format_clock, PlaybackSession};
use crate::{wasm_error, wasm_info, wasm_log, wasm_warn};

/// Load a Standard MIDI File, replacing any loaded session
///
/// # Returns
/// Content summary (`ContentInfo`) as a JS object
#[wasm_bindgen(js_name = loadMidi)]
pub fn load_midi(bytes: &[u8]) -> Result<JsValue, JsValue> {
    wasm_info!("loadMidi called with {} bytes", bytes.len());
    let started = now_millis();

    let session = PlaybackSession::load(bytes).map_err(|e| {
        wasm_error!("MIDI load error: {}", e);
        JsValue::from_str(&format!("MIDI load error: {}", e))
    })?;
    let info = session.content_info();

    match info.measure_count {
        Some(count) => {
            wasm_log!("  {} measures in {} signature regions", count, info.regions.len());
            if let Ok(json) = session.grid_json() {
                wasm_log!("  Measure grid: {}", json);
            }
        }
        None => wasm_warn!("  No time signature data, measure display disabled"),
    }
    install_session(Some(session))?;

    if let (Some(start), Some(end)) = (started, now_millis()) {
        wasm_info!("loadMidi completed in {:.1} ms", end - start);
    }
    serialize(&info, "Failed to serialize content info")
}

#[wasm_bindgen(js_name = unloadMidi)]
pub fn unload_midi() -> Result<(), JsValue> {
    wasm_info!("unloadMidi called");
    install_session(None)
}

#[wasm_bindgen(js_name = getContentInfo)]
pub fn get_content_info() -> Result<JsValue, JsValue> {
    let guard = lock_session()?;
    match guard.as_ref() {
        Some(session) => serialize(&session.content_info(), "Failed to serialize content info"),
        None => Ok(JsValue::NULL),
    }
}

/// Set the pickup (`"1/4"`, or empty for none). Pauses playback.
///
/// # Returns
/// Whether a measure grid is available afterwards. False when nothing is
/// loaded, the file has no time signatures, or the rebuild failed.
#[wasm_bindgen(js_name = setPartial)]
pub fn set_partial(partial_text: &str) -> bool {
    wasm_log!("setPartial called with '{}'", partial_text);
    with_session(false, |session| {
        if let Err(e) = session.set_partial(partial_text) {
            wasm_warn!("Measure grid unavailable after pickup change: {}", e);
        }
        session.mapper().grid().is_valid()
    })
}

/// Measure containing `clock` (µs), or -1 without a measure grid
#[wasm_bindgen(js_name = clockToMeasure)]
pub fn clock_to_measure(clock: f64) -> i64 {
    with_session(NOT_FOUND, |session| {
        session
            .clock_to_measure(clock as i64)
            .map_or(NOT_FOUND, |bar| bar as i64)
    })
}

/// Start time (µs) of the measure named by `label`, or -1
#[wasm_bindgen(js_name = measureLabelToClockTime)]
pub fn measure_label_to_clock_time(label: &str) -> i64 {
    with_session(NOT_FOUND, |session| {
        session.measure_label_to_clock_time(label).unwrap_or_else(|e| {
            wasm_log!("Measure label '{}' not resolved: {}", label, e);
            NOT_FOUND
        })
    })
}

/// Seek to the measure named by `label`. Returns the new position (µs) or -1.
#[wasm_bindgen(js_name = jumpToMeasure)]
pub fn jump_to_measure(label: &str) -> i64 {
    wasm_log!("jumpToMeasure called with '{}'", label);
    with_session(NOT_FOUND, |session| {
        session.jump_to_label(label).unwrap_or_else(|e| {
            wasm_warn!("Cannot jump to '{}': {}", label, e);
            NOT_FOUND
        })
    })
}

#[wasm_bindgen(js_name = seekClock)]
pub fn seek_clock(clock: f64) -> i64 {
    with_session(NOT_FOUND, |session| {
        session.seek(clock as i64);
        session.position_micros()
    })
}

#[wasm_bindgen(js_name = setTempoFactor)]
pub fn set_tempo_factor(factor: f64) -> Result<(), JsValue> {
    wasm_log!("setTempoFactor called with {}", factor);
    with_session(Ok(()), |session| {
        session.set_tempo_factor(factor).map_err(|e| {
            wasm_error!("{}", e);
            JsValue::from_str(&e.to_string())
        })
    })
}

/// Measure grid as a JS object (`{ startTick, boundaries }`), or `null`
#[wasm_bindgen(js_name = getMeasureGrid)]
pub fn get_measure_grid() -> Result<JsValue, JsValue> {
    let guard = lock_session()?;
    match guard.as_ref().and_then(|session| session.mapper().grid().valid()) {
        Some(grid) => serialize(grid, "Failed to serialize measure grid"),
        None => Ok(JsValue::NULL),
    }
}

/// Measure start times (µs) as a Float64Array; empty without a grid
#[wasm_bindgen(js_name = getMeasureBoundaries)]
pub fn get_measure_boundaries() -> Result<js_sys::Float64Array, JsValue> {
    let guard = lock_session()?;
    let boundaries: Vec<f64> = guard
        .as_ref()
        .and_then(|session| session.mapper().grid().valid())
        .map(|grid| grid.boundaries().iter().map(|&b| b as f64).collect())
        .unwrap_or_default();

    let array = js_sys::Float64Array::new_with_length(boundaries.len() as u32);
    array.copy_from(&boundaries);
    Ok(array)
}

#[wasm_bindgen(js_name = formatClock)]
pub fn format_clock_js(clock: f64) -> String {
    format_clock(clock as i64)
}

/// Refresh the position display for `clock` (µs)
///
/// # Returns
/// `{ position, measure }`: the `m:ss/m:ss` text and the measure field text
#[wasm_bindgen(js_name = updateMeasureField)]
pub fn update_measure_field(clock: f64) -> Result<JsValue, JsValue> {
    let mut guard = lock_session()?;
    let Some(session) = guard.as_mut() else {
        return Ok(JsValue::NULL);
    };
    let position = session.update_display(clock as i64);
    let display = DisplayText {
        position,
        measure: session.field().text().to_string(),
    };
    serialize(&display, "Failed to serialize display text")
}

/// User typed into the measure field. Returns false if it is locked.
#[wasm_bindgen(js_name = editMeasureField)]
pub fn edit_measure_field(text: &str) -> bool {
    with_session(false, |session| session.edit_measure_field(text))
}

/// User submitted the measure field. Returns the new position (µs) or -1.
#[wasm_bindgen(js_name = submitMeasureField)]
pub fn submit_measure_field() -> i64 {
    with_session(NOT_FOUND, |session| {
        session.submit_measure_field().unwrap_or(NOT_FOUND)
    })
}

#[wasm_bindgen(js_name = playbackPlay)]
pub fn playback_play() -> bool {
    with_session(false, |session| {
        session.play();
        true
    })
}

#[wasm_bindgen(js_name = playbackPause)]
pub fn playback_pause() -> bool {
    with_session(false, |session| {
        session.pause();
        true
    })
}

#[derive(serde::Serialize)]
struct DisplayText {
    position: String,
    measure: String,
}
