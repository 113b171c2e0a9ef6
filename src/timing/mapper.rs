//! Clock time <-> measure label conversion for one loaded piece
//!
//! The mapper owns the signature timeline, the cached measure grid and the
//! active pickup. Changing the pickup goes through [`MeasureTimeMapper::apply_partial`],
//! the only place a rebuild is decided.
//!
//! ```text
//! Absent --(signature data found)--> Valid
//! Valid  --(pickup changed)--------> Valid' | Absent (rebuild failed)
//! any    --(unload)----------------> Absent
//! ```
//!
//! Rebuilding moves the transport cursor; do not rebuild while the transport
//! is playing.

use crate::models::{PartialOffset, SequenceEvent, SignatureRegion};
use crate::timing::error::{MeasureMapError, Result};
use crate::timing::measure_grid::{GridState, MeasureGrid};
use crate::timing::position_codec::{self, partial_offset_ticks};
use crate::timing::signature_timeline::SignatureTimeline;
use crate::timing::transport::Transport;

#[derive(Debug, Clone)]
struct Content {
    ticks_per_quarter: u16,
    total_ticks: u64,
    /// `Err` when the content has no usable signature data
    timeline: Result<SignatureTimeline>,
}

#[derive(Debug, Clone, Default)]
pub struct MeasureTimeMapper {
    content: Option<Content>,
    partial: Option<PartialOffset>,
    grid: GridState,
}

impl MeasureTimeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take new content and build its grid from tick 0.
    ///
    /// Any previous pickup is forgotten. `NoSignatureData` leaves the grid
    /// absent; the content stays loaded so playback without measures works.
    pub fn load_content<T: Transport + ?Sized>(
        &mut self,
        events: &[SequenceEvent],
        ticks_per_quarter: u16,
        total_ticks: u64,
        transport: &mut T,
    ) -> Result<()> {
        self.partial = None;
        self.content = Some(Content {
            ticks_per_quarter,
            total_ticks,
            timeline: SignatureTimeline::scan(events, ticks_per_quarter),
        });
        self.rebuild(transport)
    }

    /// Drop the content; the grid becomes absent
    pub fn unload(&mut self) {
        self.content = None;
        self.partial = None;
        self.grid = GridState::Absent;
    }

    /// Set the pickup from partial text (`"1/4"`, or empty for none).
    ///
    /// Malformed text clears the pickup. Returns whether the grid was rebuilt.
    pub fn set_partial<T: Transport + ?Sized>(
        &mut self,
        partial_text: &str,
        transport: &mut T,
    ) -> Result<bool> {
        self.apply_partial(position_codec::partial_or_none(partial_text), transport)
    }

    /// Switch to `partial`, rebuilding only when it differs from the current one
    pub fn apply_partial<T: Transport + ?Sized>(
        &mut self,
        partial: Option<PartialOffset>,
        transport: &mut T,
    ) -> Result<bool> {
        if partial == self.partial {
            return Ok(false);
        }
        log::debug!(
            "Pickup changed from {:?} to {:?}, rebuilding measure grid",
            self.partial.map(|p| p.to_string()),
            partial.map(|p| p.to_string())
        );
        self.partial = partial;
        self.rebuild(transport)?;
        Ok(true)
    }

    fn rebuild<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        // Never leave the previous grid around if this build fails
        self.grid = GridState::Absent;

        let Some(content) = &self.content else {
            return Err(MeasureMapError::GridAbsent);
        };
        let timeline = content.timeline.as_ref().map_err(Clone::clone)?;
        let start_tick = partial_offset_ticks(self.partial, content.ticks_per_quarter);

        let result = MeasureGrid::build(timeline, start_tick, content.total_ticks, transport);
        if let Err(e) = &result {
            log::warn!("Measure grid build failed: {}", e);
        }
        let error = result.as_ref().err().cloned();
        self.grid = GridState::from_build(result);
        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Measure containing `clock`: the index of the first boundary later than
    /// `clock`, `grid.len()` past the last boundary, or `None` without a grid.
    ///
    /// With a pickup, 0 means "inside the pickup measure".
    pub fn clock_to_measure(&self, clock: i64) -> Option<usize> {
        self.grid.valid().map(|grid| grid.measure_at(clock))
    }

    /// Clock time at which the measure named by `label` starts.
    ///
    /// A label with a `:partial` part switches the pickup to it (and rebuilds)
    /// first; a malformed partial there clears the pickup. A plain bar keeps
    /// the current pickup. Bar 0 with a pickup is always clock 0. Bars past the
    /// end of the grid clamp to `total_duration`. Without a grid every label
    /// fails.
    pub fn measure_label_to_clock_time<T: Transport + ?Sized>(
        &mut self,
        label: &str,
        total_duration: i64,
        transport: &mut T,
    ) -> Result<i64> {
        let has_partial_part = position_codec::split_label(label).1.is_some();
        let label = position_codec::parse_label(label)?;
        if self.content.is_none() {
            return Err(MeasureMapError::GridAbsent);
        }

        let rebuilt = if has_partial_part {
            self.apply_partial(label.partial, transport).map(|_| ())
        } else {
            Ok(())
        };

        let Some(grid) = self.grid.valid() else {
            return Err(rebuilt.err().unwrap_or_else(|| self.absent_reason()));
        };

        if label.bar == 0 {
            if self.partial.is_some() {
                return Ok(0);
            }
            return Err(MeasureMapError::MalformedLabel(
                "measure 0 requires a pickup".to_string(),
            ));
        }
        let bar_index = (label.bar - 1) as usize;
        Ok(grid.get(bar_index).unwrap_or(total_duration))
    }

    /// Why there is no grid: the content's scan error if it had one
    fn absent_reason(&self) -> MeasureMapError {
        match &self.content {
            Some(Content { timeline: Err(e), .. }) => e.clone(),
            _ => MeasureMapError::GridAbsent,
        }
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn partial(&self) -> Option<PartialOffset> {
        self.partial
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Signature regions of the loaded content, empty without signature data
    pub fn regions(&self) -> &[SignatureRegion] {
        match &self.content {
            Some(Content { timeline: Ok(timeline), .. }) => timeline.regions(),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::transport::mock::LinearTransport;

    const TOTAL_DURATION: i64 = 4_000_000;

    fn common_time() -> Vec<SequenceEvent> {
        vec![SequenceEvent::time_signature(0, 4, 2)]
    }

    fn loaded() -> (MeasureTimeMapper, LinearTransport) {
        let mut transport = LinearTransport::new(1000, 4000);
        let mut mapper = MeasureTimeMapper::new();
        mapper
            .load_content(&common_time(), 480, 4000, &mut transport)
            .expect("load should succeed");
        (mapper, transport)
    }

    #[test]
    fn test_load_builds_grid_from_zero() {
        let (mapper, _) = loaded();
        let grid = mapper.grid().valid().unwrap();
        assert_eq!(grid.boundaries(), &[0, 1_920_000, 3_840_000]);
        assert!(mapper.partial().is_none());
    }

    #[test]
    fn test_clock_to_measure() {
        let (mapper, _) = loaded();
        assert_eq!(mapper.clock_to_measure(500_000), Some(1));
        assert_eq!(mapper.clock_to_measure(2_000_000), Some(2));
        assert_eq!(mapper.clock_to_measure(3_999_999), Some(3));
    }

    #[test]
    fn test_label_to_clock() {
        let (mut mapper, mut transport) = loaded();
        assert_eq!(mapper.measure_label_to_clock_time("1", TOTAL_DURATION, &mut transport), Ok(0));
        assert_eq!(
            mapper.measure_label_to_clock_time("2", TOTAL_DURATION, &mut transport),
            Ok(1_920_000)
        );
        assert_eq!(
            mapper.measure_label_to_clock_time("3", TOTAL_DURATION, &mut transport),
            Ok(3_840_000)
        );
        // Past the end clamps to the content length
        assert_eq!(
            mapper.measure_label_to_clock_time("4", TOTAL_DURATION, &mut transport),
            Ok(TOTAL_DURATION)
        );
        assert_eq!(
            mapper.measure_label_to_clock_time("400", TOTAL_DURATION, &mut transport),
            Ok(TOTAL_DURATION)
        );
    }

    #[test]
    fn test_malformed_label_leaves_state_unchanged() {
        let (mut mapper, mut transport) = loaded();
        mapper.set_partial("1/4", &mut transport).unwrap();
        let before = mapper.grid().clone();
        let moves = transport.moves.len();

        assert!(matches!(
            mapper.measure_label_to_clock_time("x:1/8", TOTAL_DURATION, &mut transport),
            Err(MeasureMapError::MalformedLabel(_))
        ));
        assert_eq!(mapper.grid(), &before);
        assert_eq!(mapper.partial(), PartialOffset::new(1, 4));
        assert_eq!(transport.moves.len(), moves);
    }

    #[test]
    fn test_pickup_label_is_clock_zero() {
        let (mut mapper, mut transport) = loaded();
        assert_eq!(
            mapper.measure_label_to_clock_time("0:1/4", TOTAL_DURATION, &mut transport),
            Ok(0)
        );
        assert_eq!(mapper.partial(), PartialOffset::new(1, 4));
        // Grid now starts at the 480-tick pickup
        let grid = mapper.grid().valid().unwrap();
        assert_eq!(grid.boundaries(), &[480_000, 2_400_000]);
        assert_eq!(
            mapper.measure_label_to_clock_time("1:1/4", TOTAL_DURATION, &mut transport),
            Ok(480_000)
        );
    }

    #[test]
    fn test_bar_zero_without_pickup_rejected() {
        let (mut mapper, mut transport) = loaded();
        assert!(matches!(
            mapper.measure_label_to_clock_time("0", TOTAL_DURATION, &mut transport),
            Err(MeasureMapError::MalformedLabel(_))
        ));
    }

    #[test]
    fn test_plain_label_keeps_pickup() {
        let (mut mapper, mut transport) = loaded();
        mapper.set_partial("1/4", &mut transport).unwrap();
        let moves = transport.moves.len();

        assert_eq!(
            mapper.measure_label_to_clock_time("2", TOTAL_DURATION, &mut transport),
            Ok(2_400_000)
        );
        assert_eq!(
            mapper.measure_label_to_clock_time("0", TOTAL_DURATION, &mut transport),
            Ok(0)
        );
        assert_eq!(mapper.partial(), PartialOffset::new(1, 4));
        assert_eq!(transport.moves.len(), moves);
    }

    #[test]
    fn test_label_partial_replaces_pickup() {
        let (mut mapper, mut transport) = loaded();
        mapper.set_partial("1/4", &mut transport).unwrap();

        // Half-bar pickup: 960 ticks
        assert_eq!(
            mapper.measure_label_to_clock_time("1:1/2", TOTAL_DURATION, &mut transport),
            Ok(960_000)
        );
        assert_eq!(mapper.partial(), PartialOffset::new(1, 2));

        // Malformed partial part clears the pickup, like set_partial
        assert_eq!(
            mapper.measure_label_to_clock_time("2:1/", TOTAL_DURATION, &mut transport),
            Ok(1_920_000)
        );
        assert!(mapper.partial().is_none());
        assert!(matches!(
            mapper.measure_label_to_clock_time("0", TOTAL_DURATION, &mut transport),
            Err(MeasureMapError::MalformedLabel(_))
        ));
    }

    #[test]
    fn test_pickup_label_without_grid_fails() {
        let mut transport = LinearTransport::new(1000, 4000);
        let mut mapper = MeasureTimeMapper::new();
        assert_eq!(
            mapper.measure_label_to_clock_time("0:1/4", TOTAL_DURATION, &mut transport),
            Err(MeasureMapError::GridAbsent)
        );
        assert!(mapper.partial().is_none());

        let events = vec![SequenceEvent::tempo(0, 500_000)];
        let _ = mapper.load_content(&events, 480, 4000, &mut transport);
        assert_eq!(
            mapper.measure_label_to_clock_time("0:1/4", TOTAL_DURATION, &mut transport),
            Err(MeasureMapError::NoSignatureData)
        );
    }

    #[test]
    fn test_pickup_label_after_failed_rebuild_fails() {
        let (mut mapper, mut transport) = loaded();
        transport.fail_at = Some(480);
        assert!(matches!(
            mapper.measure_label_to_clock_time("0:1/4", TOTAL_DURATION, &mut transport),
            Err(MeasureMapError::Transport(_))
        ));
        assert_eq!(mapper.grid(), &GridState::Absent);
    }

    #[test]
    fn test_pickup_queries() {
        let (mut mapper, mut transport) = loaded();
        mapper.set_partial("1/4", &mut transport).unwrap();
        // Before the first full measure: inside the pickup
        assert_eq!(mapper.clock_to_measure(100_000), Some(0));
        assert_eq!(mapper.clock_to_measure(480_000), Some(1));
        assert_eq!(mapper.clock_to_measure(2_400_000), Some(2));
    }

    #[test]
    fn test_same_partial_does_not_rebuild() {
        let (mut mapper, mut transport) = loaded();
        assert_eq!(mapper.set_partial("1/4", &mut transport), Ok(true));
        let moves = transport.moves.len();

        assert_eq!(mapper.set_partial("1/4", &mut transport), Ok(false));
        assert_eq!(mapper.set_partial(" 2/8 ", &mut transport), Ok(false));
        assert_eq!(transport.moves.len(), moves);
    }

    #[test]
    fn test_invalid_partial_clears_pickup() {
        let (mut mapper, mut transport) = loaded();
        mapper.set_partial("1/4", &mut transport).unwrap();

        assert_eq!(mapper.set_partial("1/", &mut transport), Ok(true));
        assert!(mapper.partial().is_none());
        assert_eq!(
            mapper.grid().valid().unwrap().boundaries(),
            &[0, 1_920_000, 3_840_000]
        );
        // Still none: nothing to rebuild
        assert_eq!(mapper.set_partial("garbage", &mut transport), Ok(false));
    }

    #[test]
    fn test_no_signature_data() {
        let mut transport = LinearTransport::new(1000, 4000);
        let mut mapper = MeasureTimeMapper::new();
        let events = vec![SequenceEvent::tempo(0, 500_000)];

        assert_eq!(
            mapper.load_content(&events, 480, 4000, &mut transport),
            Err(MeasureMapError::NoSignatureData)
        );
        assert!(mapper.has_content());
        assert_eq!(mapper.grid(), &GridState::Absent);
        assert_eq!(mapper.clock_to_measure(500_000), None);
        assert_eq!(
            mapper.measure_label_to_clock_time("1", TOTAL_DURATION, &mut transport),
            Err(MeasureMapError::NoSignatureData)
        );
        assert!(mapper.regions().is_empty());
    }

    #[test]
    fn test_failed_rebuild_discards_previous_grid() {
        let (mut mapper, mut transport) = loaded();
        transport.fail_at = Some(480);

        assert!(matches!(
            mapper.set_partial("1/4", &mut transport),
            Err(MeasureMapError::Transport(_))
        ));
        assert_eq!(mapper.grid(), &GridState::Absent);
        assert_eq!(mapper.clock_to_measure(0), None);

        // Fixing the cause and retrying is up to the caller
        transport.fail_at = None;
        assert_eq!(mapper.set_partial("", &mut transport), Ok(true));
        assert!(mapper.grid().is_valid());
    }

    #[test]
    fn test_reload_resets_pickup() {
        let (mut mapper, mut transport) = loaded();
        mapper.set_partial("1/4", &mut transport).unwrap();
        mapper.load_content(&common_time(), 480, 4000, &mut transport).unwrap();
        assert!(mapper.partial().is_none());
        assert_eq!(mapper.grid().valid().unwrap().start_tick(), 0);
    }

    #[test]
    fn test_unload() {
        let (mut mapper, mut transport) = loaded();
        mapper.unload();
        assert!(!mapper.has_content());
        assert_eq!(mapper.clock_to_measure(0), None);
        assert_eq!(
            mapper.measure_label_to_clock_time("1", TOTAL_DURATION, &mut transport),
            Err(MeasureMapError::GridAbsent)
        );
    }

    #[test]
    fn test_round_trip_across_signature_changes() {
        // 4/4, 3/4 from bar 3, 6/8 from bar 5, irregular change mid-bar at 9000
        let events = vec![
            SequenceEvent::time_signature(0, 4, 2),
            SequenceEvent::time_signature(3840, 3, 2),
            SequenceEvent::time_signature(6720, 6, 3),
            SequenceEvent::time_signature(9000, 5, 3),
        ];
        let mut transport = LinearTransport::new(250, 20_000);
        let mut mapper = MeasureTimeMapper::new();
        mapper.load_content(&events, 480, 20_000, &mut transport).unwrap();

        let len = mapper.grid().valid().unwrap().len();
        for bar in 1..=len {
            let clock = mapper
                .measure_label_to_clock_time(&bar.to_string(), 5_000_000, &mut transport)
                .unwrap();
            assert_eq!(mapper.clock_to_measure(clock), Some(bar), "bar {}", bar);
        }
    }
}
