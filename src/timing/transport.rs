//! Tick/clock transport contract
//!
//! The transport's position cursor is shared with playback. Grid construction
//! borrows it through [`CursorGuard`], which puts the cursor back where it was
//! when the guard is dropped, whichever way the build ends.

use crate::timing::error::{MeasureMapError, TransportError};

/// Stateful tick -> clock conversion backed by a position cursor
pub trait Transport {
    /// Current cursor position in ticks
    fn position(&self) -> u64;

    /// Move the cursor to `tick`
    fn set_position(&mut self, tick: u64) -> Result<(), TransportError>;

    /// Elapsed microseconds at the cursor position
    fn clock_micros(&self) -> Result<i64, TransportError>;

    /// Elapsed microseconds at the end of the content
    fn total_clock_micros(&self) -> i64;
}

/// Exclusive use of a transport cursor, restored on drop
pub struct CursorGuard<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    saved: u64,
}

impl<'a, T: Transport + ?Sized> CursorGuard<'a, T> {
    pub fn acquire(transport: &'a mut T) -> Self {
        let saved = transport.position();
        Self { transport, saved }
    }

    /// Move the cursor to `tick` and read the clock there
    pub fn sample(&mut self, tick: u64) -> Result<i64, MeasureMapError> {
        self.transport.set_position(tick)?;
        Ok(self.transport.clock_micros()?)
    }

    pub fn saved_position(&self) -> u64 {
        self.saved
    }
}

impl<T: Transport + ?Sized> Drop for CursorGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.transport.set_position(self.saved) {
            log::warn!("Failed to restore transport position {}: {}", self.saved, e);
        }
    }
}
