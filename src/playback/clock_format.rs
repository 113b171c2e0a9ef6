//! Clock text for the position display

const MICROS_PER_SECOND: i64 = 1_000_000;
const SECONDS_PER_MINUTE: i64 = 60;

/// `m:ss` (minutes unpadded); negative times show as `0:00`
pub fn format_clock(micros: i64) -> String {
    let seconds = micros.max(0) / MICROS_PER_SECOND;
    format!("{}:{:02}", seconds / SECONDS_PER_MINUTE, seconds % SECONDS_PER_MINUTE)
}

/// `position/length`, e.g. `1:05/3:20`
pub fn format_position(micros: i64, length_micros: i64) -> String {
    format!("{}/{}", format_clock(micros), format_clock(length_micros))
}
