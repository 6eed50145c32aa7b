//! Viewport-driven data cache.
//!
//! The cache remembers the viewport it was fetched for; a track compares
//! that snapshot with the live viewport each frame to decide between a
//! cheap translate and a full rebuild. Fetches run on a worker thread and
//! are folded in by [`CacheController::poll`]; until then the previous
//! cache stays consistent with its own snapshot, so the old frame keeps
//! projecting correctly.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, warn};

use crate::data::{FeatureSource, FetchError};
use crate::feature::FeatureRecord;
use crate::viewport::{Brush, Viewport};

/// The viewport state a cache's data was fetched against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheSnapshot {
    pub brush: Brush,
    pub factor: f64,
}

impl CacheSnapshot {
    pub fn of(viewport: &Viewport) -> Self {
        Self {
            brush: viewport.brush,
            factor: viewport.factor,
        }
    }
}

/// Inclusive basepair range handed to the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRange {
    pub start_index: u64,
    pub end_index: u64,
}

/// Fetched records plus the viewport they belong to.
#[derive(Debug, Clone, Default)]
pub struct TrackCache {
    pub data: Vec<FeatureRecord>,
    /// Snapshot of the viewport at fetch time; `None` until the first
    /// fetch completes.
    pub viewport: Option<CacheSnapshot>,
    /// Genomic range the data actually covers (brush plus padding).
    pub data_viewport: Option<FetchRange>,
    /// Set by [`CacheController::invalidate`]; forces a refetch on the
    /// next update even if the brush is unchanged.
    pub invalid: bool,
    /// True from the poll that installed this cache until the first
    /// rebuild consumes it.
    pub is_new: bool,
}

impl TrackCache {
    /// Whether `brush` matches the snapshot this cache was fetched for.
    pub fn covers_brush(&self, brush: &Brush) -> bool {
        self.viewport
            .is_some_and(|snapshot| snapshot.brush == *brush)
    }
}

struct PendingFetch {
    receiver: Receiver<Result<Vec<FeatureRecord>, FetchError>>,
    snapshot: CacheSnapshot,
    range: FetchRange,
}

/// Decides when to refetch and swaps completed fetches into the cache.
pub struct CacheController {
    cache: TrackCache,
    source: Arc<dyn FeatureSource>,
    /// Tracks that collapse introns fetch each covered sub-range instead
    /// of one padded window.
    supports_intron_shortening: bool,
    pending: Option<PendingFetch>,
}

impl CacheController {
    pub fn new(source: Arc<dyn FeatureSource>, supports_intron_shortening: bool) -> Self {
        Self {
            cache: TrackCache::default(),
            source,
            supports_intron_shortening,
            pending: None,
        }
    }

    pub fn cache(&self) -> &TrackCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TrackCache {
        &mut self.cache
    }

    /// Mark the cache stale so the next update refetches. An in-flight
    /// fetch is abandoned; it may predate whatever prompted this.
    pub fn invalidate(&mut self) {
        self.cache.invalid = true;
        self.pending = None;
    }

    pub fn has_pending_fetch(&self) -> bool {
        self.pending.is_some()
    }

    /// Kick off a background fetch if the live viewport is no longer the
    /// one the cache was fetched for. Returns whether a fetch started.
    pub fn get_new_cache(&mut self, viewport: &Viewport) -> bool {
        if viewport.factor <= 0.0 {
            return false;
        }
        // an equivalent request already in flight is left to finish
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.snapshot == CacheSnapshot::of(viewport))
        {
            return false;
        }
        if !self.cache.invalid && self.cache.covers_brush(&viewport.brush) {
            return false;
        }
        self.begin_fetch(viewport);
        true
    }

    /// Padded fetch window(s) for `viewport`: half a brush width on each
    /// side, clamped to the chromosome. In intron-shortening mode each
    /// covered sub-range is fetched as-is.
    pub fn fetch_ranges(&self, viewport: &Viewport) -> Vec<FetchRange> {
        if self.supports_intron_shortening
            && let Some(model) = &viewport.shortened_introns
        {
            return model
                .covered_ranges()
                .iter()
                .map(|range| FetchRange {
                    start_index: range.start.max(1.0).round() as u64,
                    end_index: range.end.min(viewport.chromosome_size as f64).round() as u64,
                })
                .collect();
        }
        let brush_size = viewport.brush.size();
        let start = (viewport.brush.start - brush_size / 2.0).max(1.0).round();
        let end = (viewport.brush.end + brush_size / 2.0)
            .min(viewport.chromosome_size as f64)
            .round();
        vec![FetchRange {
            start_index: start as u64,
            end_index: end as u64,
        }]
    }

    fn begin_fetch(&mut self, viewport: &Viewport) {
        let ranges = self.fetch_ranges(viewport);
        let Some(&first) = ranges.first() else {
            return;
        };
        let range = FetchRange {
            start_index: first.start_index,
            end_index: ranges.last().map_or(first.end_index, |r| r.end_index),
        };
        let snapshot = CacheSnapshot::of(viewport);
        let source = Arc::clone(&self.source);
        let factor = viewport.factor;
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut data = Vec::new();
            let mut result = Ok(());
            for fetch_range in ranges {
                match source.fetch(fetch_range.start_index, fetch_range.end_index, factor) {
                    Ok(records) => data.extend(records),
                    Err(err) => {
                        result = Err(err);
                        break;
                    }
                }
            }
            // the receiver may have been replaced by a newer request
            let _ = sender.send(result.map(|_| data));
        });
        debug!(
            "fetching {}-{} at factor {factor:.4}",
            range.start_index, range.end_index
        );
        // last request wins: an in-flight older fetch is abandoned
        self.pending = Some(PendingFetch {
            receiver,
            snapshot,
            range,
        });
    }

    /// Fold a completed fetch into the cache. Returns true when a new
    /// cache was installed. A failed fetch keeps the previous cache.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };
        match pending.receiver.try_recv() {
            Ok(Ok(data)) => {
                let Some(pending) = self.pending.take() else {
                    return false;
                };
                self.cache = TrackCache {
                    data,
                    viewport: Some(pending.snapshot),
                    data_viewport: Some(pending.range),
                    invalid: false,
                    is_new: true,
                };
                true
            }
            Ok(Err(err)) => {
                warn!("fetch failed, keeping previous data: {err}");
                self.pending = None;
                false
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                warn!("fetch worker dropped without answering");
                self.pending = None;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryFeatureSource;
    use crate::viewport::ShortenedIntronsModel;
    use std::time::Duration;

    fn record(start: u64, end: u64) -> FeatureRecord {
        FeatureRecord {
            start_index: start,
            end_index: end,
            feature: Some("gene".into()),
            ..Default::default()
        }
    }

    fn controller(records: Vec<FeatureRecord>) -> CacheController {
        CacheController::new(Arc::new(InMemoryFeatureSource::new(records)), false)
    }

    fn poll_until_done(controller: &mut CacheController) {
        for _ in 0..200 {
            if controller.poll() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("fetch never completed");
    }

    #[test]
    fn test_fetch_range_padded_by_half_brush() {
        let controller = controller(vec![]);
        let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
        let ranges = controller.fetch_ranges(&vp);
        assert_eq!(
            ranges,
            vec![FetchRange {
                start_index: 500,
                end_index: 2500
            }]
        );
    }

    #[test]
    fn test_fetch_range_clamped_to_chromosome() {
        let controller = controller(vec![]);
        let vp = Viewport::new(Brush::new(1.0, 1000.0), 500.0, 1200);
        let ranges = controller.fetch_ranges(&vp);
        assert_eq!(
            ranges,
            vec![FetchRange {
                start_index: 1,
                end_index: 1200
            }]
        );
    }

    #[test]
    fn test_fetch_ranges_shortened_introns() {
        let source = Arc::new(InMemoryFeatureSource::new(vec![]));
        let controller = CacheController::new(source, true);
        let mut vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
        vp.shortened_introns = Some(ShortenedIntronsModel::new(vec![
            Brush::new(1000.0, 1200.0),
            Brush::new(1800.0, 2000.0),
        ]));
        let ranges = controller.fetch_ranges(&vp);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start_index, 1000);
        assert_eq!(ranges[1].end_index, 2000);
    }

    #[test]
    fn test_no_fetch_for_degenerate_viewport() {
        let mut controller = controller(vec![]);
        let vp = Viewport::new(Brush::new(500.0, 500.0), 500.0, 1000);
        assert!(!controller.get_new_cache(&vp));
    }

    #[test]
    fn test_fetch_installs_new_cache() {
        let mut controller = controller(vec![record(1200, 1300)]);
        let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
        assert!(controller.get_new_cache(&vp));
        poll_until_done(&mut controller);
        let cache = controller.cache();
        assert!(cache.is_new);
        assert!(!cache.invalid);
        assert_eq!(cache.data.len(), 1);
        assert!(cache.covers_brush(&vp.brush));
    }

    #[test]
    fn test_identical_brush_does_not_refetch() {
        let mut controller = controller(vec![record(1200, 1300)]);
        let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
        assert!(controller.get_new_cache(&vp));
        poll_until_done(&mut controller);
        assert!(!controller.get_new_cache(&vp));
    }

    #[test]
    fn test_pending_fetch_not_restarted() {
        let source = Arc::new(
            InMemoryFeatureSource::new(vec![record(1200, 1300)])
                .with_latency(Duration::from_millis(50)),
        );
        let mut controller = CacheController::new(source, false);
        let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
        assert!(controller.get_new_cache(&vp));
        assert!(!controller.get_new_cache(&vp));
        poll_until_done(&mut controller);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let mut controller = controller(vec![record(1200, 1300)]);
        let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
        controller.get_new_cache(&vp);
        poll_until_done(&mut controller);
        controller.invalidate();
        assert!(controller.get_new_cache(&vp));
    }

    #[test]
    fn test_old_cache_survives_until_poll() {
        let source = Arc::new(
            InMemoryFeatureSource::new(vec![record(1200, 1300)])
                .with_latency(Duration::from_millis(30)),
        );
        let mut controller = CacheController::new(source, false);
        let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
        controller.get_new_cache(&vp);
        poll_until_done(&mut controller);

        // pan; until the new fetch lands the old snapshot stays in place
        let panned = vp.panned(500.0);
        controller.get_new_cache(&panned);
        assert!(controller.cache().covers_brush(&vp.brush));
        poll_until_done(&mut controller);
        assert!(controller.cache().covers_brush(&panned.brush));
    }

    #[test]
    fn test_failed_fetch_keeps_previous_cache() {
        struct FailingSource;
        impl FeatureSource for FailingSource {
            fn fetch(
                &self,
                _start: u64,
                _end: u64,
                _factor: f64,
            ) -> Result<Vec<FeatureRecord>, FetchError> {
                Err(FetchError::Source("backend down".into()))
            }
        }
        let mut controller = CacheController::new(Arc::new(FailingSource), false);
        let vp = Viewport::new(Brush::new(1000.0, 2000.0), 500.0, 100_000);
        controller.get_new_cache(&vp);
        for _ in 0..200 {
            if !controller.has_pending_fetch() {
                break;
            }
            controller.poll();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(controller.cache().viewport.is_none());
        assert!(controller.cache().data.is_empty());
    }
}
