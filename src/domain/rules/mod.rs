// Domain rules - Trim range clamping and handle hit-testing

use tracing::{debug, warn};

use crate::domain::model::*;

/// Trim range with its clamping rules.
///
/// Every mutator is inert until the clip duration is known, and silently
/// ignores non-finite input. The range always satisfies
/// `0 <= start < end <= duration` and `end - start >= span`, where the span
/// is `minimum_span` capped by the duration itself.
#[derive(Debug, Clone)]
pub struct TrimRangeModel {
    range: TrimRange,
    duration: Option<f64>,
    minimum_span: f64,
}

impl TrimRangeModel {
    pub fn new(minimum_span: f64) -> Self {
        let minimum_span = if minimum_span.is_finite() && minimum_span > 0.0 {
            minimum_span
        } else {
            MINIMUM_SPAN
        };
        Self {
            range: TrimRange::new(0.0, 0.0),
            duration: None,
            minimum_span,
        }
    }

    /// Accept the decoded duration and select the whole clip.
    pub fn set_duration(&mut self, duration: f64) -> bool {
        if !duration.is_finite() || duration <= 0.0 {
            warn!(duration, "Ignoring unusable clip duration");
            return false;
        }
        self.duration = Some(duration);
        self.range = TrimRange::full(duration);
        true
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Current range, or `None` while the duration is unknown.
    pub fn range(&self) -> Option<TrimRange> {
        self.duration.map(|_| self.range)
    }

    pub fn minimum_span(&self) -> f64 {
        self.minimum_span
    }

    fn span_for(&self, duration: f64) -> f64 {
        self.minimum_span.min(duration)
    }

    /// Move the start bound, clamped to `[0, end - span]`.
    pub fn set_start(&mut self, t: f64) -> bool {
        let Some(duration) = self.duration else {
            return false;
        };
        if !t.is_finite() {
            return false;
        }
        let upper = self.range.end - self.span_for(duration);
        let start = t.min(upper).max(0.0);
        if !start.is_finite() {
            return false;
        }
        let changed = start != self.range.start;
        self.range.start = start;
        changed
    }

    /// Move the end bound, clamped to `[start + span, duration]`.
    pub fn set_end(&mut self, t: f64) -> bool {
        let Some(duration) = self.duration else {
            return false;
        };
        if !t.is_finite() {
            return false;
        }
        let lower = self.range.start + self.span_for(duration);
        let end = t.max(lower).min(duration);
        if !end.is_finite() {
            return false;
        }
        let changed = end != self.range.end;
        self.range.end = end;
        changed
    }

    /// Route a bound update to the matching setter.
    pub fn set_bound(&mut self, handle: TrimHandle, t: f64) -> bool {
        match handle {
            TrimHandle::Start => self.set_start(t),
            TrimHandle::End => self.set_end(t),
        }
    }

    /// Quick-trim: drop `seconds` off the front of the current range.
    pub fn remove_from_start(&mut self, seconds: f64) -> bool {
        let start = self.range.start;
        self.set_start(start + seconds)
    }

    /// Quick-trim: drop `seconds` off the back of the current range.
    pub fn remove_from_end(&mut self, seconds: f64) -> bool {
        let end = self.range.end;
        self.set_end(end - seconds)
    }

    /// Select the whole clip again.
    pub fn reset(&mut self) -> bool {
        let Some(duration) = self.duration else {
            return false;
        };
        let full = TrimRange::full(duration);
        let changed = full != self.range;
        self.range = full;
        changed
    }

    /// Apply a history snapshot. Out-of-range snapshots are clamped through
    /// the regular setters so the invariant still holds.
    pub fn restore(&mut self, entry: HistoryEntry) -> bool {
        let Some(duration) = self.duration else {
            return false;
        };
        let before = self.range;
        self.range = TrimRange::full(duration);
        self.set_end(entry.end);
        self.set_start(entry.start);
        debug!(from = %before, to = %self.range, "Restored trim range");
        before != self.range
    }
}

/// Time under pixel `x`, if it lies inside a clip of `duration` seconds.
pub fn time_at(viewport: &TimelineViewport, track: &TrackGeometry, x: f64, duration: f64) -> Option<f64> {
    let t = viewport.x_to_time(x, track);
    (t.is_finite() && (0.0..=duration).contains(&t)).then_some(t)
}

/// Hit-test pixel `x` against the two handle hot-zones.
///
/// `hot_zone_px` is the half-width of each zone. When the zones overlap the
/// handle nearest to `x` wins; an exact tie goes to the start handle.
pub fn hit_test_handle(
    x: f64,
    range: &TrimRange,
    viewport: &TimelineViewport,
    track: &TrackGeometry,
    hot_zone_px: f64,
) -> Option<TrimHandle> {
    let start_x = viewport.time_to_x(range.start, track);
    let end_x = viewport.time_to_x(range.end, track);
    let start_dist = (x - start_x).abs();
    let end_dist = (x - end_x).abs();

    let over_start = start_dist <= hot_zone_px;
    let over_end = end_dist <= hot_zone_px;

    match (over_start, over_end) {
        (true, true) if end_dist < start_dist => Some(TrimHandle::End),
        (true, _) => Some(TrimHandle::Start),
        (false, true) => Some(TrimHandle::End),
        (false, false) => None,
    }
}

/// Whether `x` falls on the track itself.
pub fn is_on_track(x: f64, track: &TrackGeometry) -> bool {
    x >= track.left && x <= track.left + track.width
}
