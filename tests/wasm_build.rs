//! WASM build test
//!
//! Exercises the JavaScript-facing API against a small in-memory MIDI file.

use measure_map_wasm::api::*;
use measure_map_wasm::converters::midi::{sequence_to_smf, DEFAULT_TPQ};
use measure_map_wasm::models::{Sequence, SequenceEvent};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

/// Four bars of 4/4 at 120 BPM (2 s per bar)
fn four_bars() -> Vec<u8> {
    let mut seq = Sequence::empty(DEFAULT_TPQ);
    seq.push(SequenceEvent::time_signature(0, 4, 2));
    seq.tick_length = 7680;
    sequence_to_smf(&seq).unwrap()
}

#[wasm_bindgen_test]
fn test_nothing_loaded() {
    unload_midi().unwrap();
    assert_eq!(clock_to_measure(0.0), -1);
    assert_eq!(measure_label_to_clock_time("1"), -1);
    assert!(get_measure_grid().unwrap().is_null());
    assert_eq!(get_measure_boundaries().unwrap().length(), 0);
    assert!(!playback_play());
}

#[wasm_bindgen_test]
fn test_load_and_navigate() {
    let info = load_midi(&four_bars()).unwrap();
    assert!(info.is_object());

    assert_eq!(clock_to_measure(3_000_000.0), 2);
    assert_eq!(measure_label_to_clock_time("3"), 4_000_000);
    assert_eq!(measure_label_to_clock_time("9"), 8_000_000);
    assert_eq!(measure_label_to_clock_time("bogus"), -1);
    assert_eq!(jump_to_measure("2"), 2_000_000);
    assert!(get_measure_grid().unwrap().is_object());
    assert_eq!(
        get_measure_boundaries().unwrap().to_vec(),
        vec![0.0, 2_000_000.0, 4_000_000.0, 6_000_000.0]
    );
}

#[wasm_bindgen_test]
fn test_partial_and_field() {
    load_midi(&four_bars()).unwrap();
    assert!(set_partial("1/2"));
    assert_eq!(measure_label_to_clock_time("1"), 1_000_000);
    assert_eq!(clock_to_measure(500_000.0), 0);
    // A plain bar keeps the pickup
    assert_eq!(measure_label_to_clock_time("2"), 3_000_000);

    assert!(edit_measure_field("2"));
    assert_eq!(submit_measure_field(), 3_000_000);
    assert!(playback_play());
    assert!(!edit_measure_field("1"));
    assert!(playback_pause());
}

#[wasm_bindgen_test]
fn test_tempo_factor_validation() {
    load_midi(&four_bars()).unwrap();
    assert!(set_tempo_factor(1.5).is_ok());
    assert!(set_tempo_factor(0.0).is_err());
    assert_eq!(format_clock_js(65_000_000.0), "1:05");
}

#[wasm_bindgen_test]
fn test_bad_bytes_rejected() {
    let result: Result<JsValue, JsValue> = load_midi(&[0, 1, 2, 3]);
    assert!(result.is_err());
}
