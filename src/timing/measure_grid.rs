//! Measure boundary clock times
//!
//! The grid is built by walking measure boundaries tick by tick and asking the
//! transport what clock time each boundary falls on. The tempo map lives in the
//! transport, so this is the only way to get the times.
//!
//! Entries are samples: if the transport's tempo changes after a build, the
//! grid keeps describing the old tempo until it is rebuilt.

use serde::Serialize;

use crate::timing::error::{MeasureMapError, Result};
use crate::timing::signature_timeline::SignatureTimeline;
use crate::timing::transport::{CursorGuard, Transport};

/// Clock time (µs) of every measure boundary from the start tick onwards.
///
/// Index 0 is the start tick (the pickup offset, or tick 0). The last entry is
/// the first boundary at or past the end of the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureGrid {
    start_tick: u64,
    boundaries: Vec<i64>,
}

impl MeasureGrid {
    /// Walk boundaries from `start_tick` until one reaches `total_ticks`.
    ///
    /// The transport cursor is moved through every boundary and put back where
    /// it was before returning, on success and on failure.
    pub fn build<T: Transport + ?Sized>(
        timeline: &SignatureTimeline,
        start_tick: u64,
        total_ticks: u64,
        transport: &mut T,
    ) -> Result<Self> {
        let mut cursor = CursorGuard::acquire(transport);
        let mut boundaries: Vec<i64> = Vec::new();
        let mut tick = start_tick;

        loop {
            let clock = cursor.sample(tick)?;
            if let Some(&previous) = boundaries.last() {
                if clock < previous {
                    return Err(MeasureMapError::NonMonotonicClock {
                        tick,
                        previous,
                        current: clock,
                    });
                }
            }
            boundaries.push(clock);

            tick = timeline.next_boundary(tick);
            if tick >= total_ticks {
                break;
            }
        }

        log::debug!(
            "Built measure grid: {} boundaries from tick {} to {} ({} regions)",
            boundaries.len(),
            start_tick,
            total_ticks,
            timeline.regions().len()
        );

        Ok(Self {
            start_tick,
            boundaries,
        })
    }

    pub fn start_tick(&self) -> u64 {
        self.start_tick
    }

    pub fn boundaries(&self) -> &[i64] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.boundaries.get(index).copied()
    }

    /// Index of the first boundary later than `clock`, or `len()` when `clock`
    /// is at or past the last boundary.
    pub fn measure_at(&self, clock: i64) -> usize {
        // Boundaries never decrease, so this is the first `b > clock`
        self.boundaries.partition_point(|&b| b <= clock)
    }
}

/// Whether a usable grid exists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GridState {
    /// Nothing loaded, no signature data, or the last build failed
    #[default]
    Absent,
    Valid(MeasureGrid),
}

impl GridState {
    pub fn from_build(result: Result<MeasureGrid>) -> Self {
        match result {
            Ok(grid) if !grid.is_empty() => GridState::Valid(grid),
            _ => GridState::Absent,
        }
    }

    pub fn valid(&self) -> Option<&MeasureGrid> {
        match self {
            GridState::Valid(grid) => Some(grid),
            GridState::Absent => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, GridState::Valid(_))
    }
}
