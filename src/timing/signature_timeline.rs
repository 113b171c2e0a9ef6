//! Signature regions derived from time signature meta events

use crate::models::{SequenceEvent, SignatureRegion, TIME_SIGNATURE_META};
use crate::timing::error::{MeasureMapError, Result};

/// Time signature changes of one piece, ordered by start tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureTimeline {
    regions: Vec<SignatureRegion>,
}

impl SignatureTimeline {
    /// Scan every event for signature changes.
    ///
    /// Events from different tracks may arrive out of order; regions are sorted
    /// by tick, and when several changes share a tick the last one scanned wins.
    /// Payloads shorter than two bytes are skipped.
    pub fn scan(events: &[SequenceEvent], ticks_per_quarter: u16) -> Result<Self> {
        let mut regions: Vec<SignatureRegion> = Vec::new();

        for event in events {
            let Some(data) = event.meta_payload(TIME_SIGNATURE_META) else {
                continue;
            };
            let &[numerator, denominator_exponent, ..] = data else {
                log::warn!("Skipping truncated time signature at tick {}", event.tick);
                continue;
            };
            let region =
                SignatureRegion::new(event.tick, numerator, denominator_exponent, ticks_per_quarter)
                    .ok_or(MeasureMapError::InvalidSignature {
                        tick: event.tick,
                        numerator,
                        denominator_exponent,
                    })?;
            regions.push(region);
        }

        if regions.is_empty() {
            return Err(MeasureMapError::NoSignatureData);
        }

        regions.sort_by_key(|r| r.start_tick);
        // Keep the last of each run of equal ticks
        regions.reverse();
        regions.dedup_by_key(|r| r.start_tick);
        regions.reverse();

        Ok(Self { regions })
    }

    pub fn regions(&self) -> &[SignatureRegion] {
        &self.regions
    }

    /// Region governing `tick`: the one with the greatest start tick not after
    /// `tick`. Ticks before the first change belong to the first region.
    pub fn region_at(&self, tick: u64) -> &SignatureRegion {
        let index = self.regions.partition_point(|r| r.start_tick <= tick);
        &self.regions[index.saturating_sub(1)]
    }

    /// Tick of the measure boundary following `tick`.
    ///
    /// A signature change always starts a new measure, so a boundary that
    /// would land past the next change is pulled back onto it. A single
    /// region is never searched.
    pub fn next_boundary(&self, tick: u64) -> u64 {
        if let [only] = self.regions.as_slice() {
            return only.next_measure_tick(tick);
        }

        // First region starting strictly after `tick`
        let upcoming = self.regions.partition_point(|r| r.start_tick <= tick);
        let active = &self.regions[upcoming.saturating_sub(1)];
        let boundary = active.next_measure_tick(tick);

        match self.regions.get(upcoming) {
            Some(next) if next.start_tick < boundary => next.start_tick,
            _ => boundary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(changes: &[(u64, u8, u8)]) -> SignatureTimeline {
        let events: Vec<SequenceEvent> = changes
            .iter()
            .map(|&(tick, num, exp)| SequenceEvent::time_signature(tick, num, exp))
            .collect();
        SignatureTimeline::scan(&events, 480).expect("scan should succeed")
    }

    #[test]
    fn test_no_signature_events() {
        let events = vec![SequenceEvent::tempo(0, 500_000)];
        assert_eq!(
            SignatureTimeline::scan(&events, 480),
            Err(MeasureMapError::NoSignatureData)
        );
        assert_eq!(SignatureTimeline::scan(&[], 480), Err(MeasureMapError::NoSignatureData));
    }

    #[test]
    fn test_single_region() {
        let tl = timeline(&[(0, 4, 2)]);
        assert_eq!(tl.regions().len(), 1);
        assert_eq!(tl.regions()[0].ticks_per_measure, 1920);
        assert_eq!(tl.next_boundary(0), 1920);
        assert_eq!(tl.next_boundary(480), 2400);
    }

    #[test]
    fn test_change_clamps_boundary() {
        let tl = timeline(&[(0, 4, 2), (1000, 3, 2)]);
        assert_eq!(tl.next_boundary(0), 1000);
        assert_eq!(tl.next_boundary(1000), 2440);
    }

    #[test]
    fn test_most_recent_change_wins() {
        // 4/4, then 3/4 at 1920, then 6/8 at 3360
        let tl = timeline(&[(0, 4, 2), (1920, 3, 2), (3360, 6, 3)]);
        assert_eq!(tl.region_at(0).numerator, 4);
        assert_eq!(tl.region_at(1919).numerator, 4);
        assert_eq!(tl.region_at(1920).numerator, 3);
        assert_eq!(tl.region_at(3359).numerator, 3);
        assert_eq!(tl.region_at(3360).numerator, 6);
        assert_eq!(tl.region_at(1_000_000).numerator, 6);

        // A backwards tie-break would use 4/4 at 1920 and land on 3840
        assert_eq!(tl.next_boundary(1920), 3360);
        assert_eq!(tl.next_boundary(3360), 4800);
    }

    #[test]
    fn test_unsorted_input_and_duplicate_ticks() {
        let tl = timeline(&[(1920, 3, 2), (0, 2, 2), (0, 4, 2)]);
        let starts: Vec<u64> = tl.regions().iter().map(|r| r.start_tick).collect();
        assert_eq!(starts, vec![0, 1920]);
        // Later 4/4 at tick 0 replaced the 2/4
        assert_eq!(tl.regions()[0].numerator, 4);
    }

    #[test]
    fn test_ticks_before_first_change() {
        let tl = timeline(&[(500, 4, 2), (2420, 3, 2)]);
        assert_eq!(tl.region_at(0).start_tick, 500);
        // Break forced at the first change
        assert_eq!(tl.next_boundary(0), 500);
    }

    #[test]
    fn test_invalid_signature_fails_scan() {
        let events = vec![SequenceEvent::time_signature(0, 0, 2)];
        assert!(matches!(
            SignatureTimeline::scan(&events, 480),
            Err(MeasureMapError::InvalidSignature { tick: 0, .. })
        ));
    }

    #[test]
    fn test_truncated_payload_skipped() {
        let events = vec![
            SequenceEvent::meta(0, TIME_SIGNATURE_META, vec![4]),
            SequenceEvent::time_signature(0, 3, 2),
        ];
        let tl = SignatureTimeline::scan(&events, 480).unwrap();
        assert_eq!(tl.regions()[0].numerator, 3);
    }
}
