//! Ping-pong timeline math.
//!
//! A timeline has a forward phase of `duration_ms`; the full cycle is twice that. Progress rises
//! linearly 0→1 over the forward phase and is reflected (not reset) over the second half, which
//! makes the motion palindromic (A→B→A).

use crate::animation::ease::Ease;
use crate::foundation::error::{SpindleError, SpindleResult};

/// Forward-phase length used when nothing else is configured.
pub const DEFAULT_DURATION_MS: f64 = 6000.0;

/// Reject clock readings that cannot be placed on the timeline.
pub(crate) fn check_reading(now_ms: f64) -> SpindleResult<()> {
    if now_ms.is_finite() {
        Ok(())
    } else {
        Err(SpindleError::validation(format!(
            "clock reading must be finite, got {now_ms}"
        )))
    }
}

/// Stateless ping-pong timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeline {
    duration_ms: f64,
}

impl Timeline {
    /// Create a timeline with a forward phase of `duration_ms`.
    pub fn new(duration_ms: f64) -> SpindleResult<Self> {
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            return Err(SpindleError::validation(format!(
                "duration_ms must be finite and > 0, got {duration_ms}"
            )));
        }
        Ok(Self { duration_ms })
    }

    /// Forward-phase length.
    pub fn duration_ms(self) -> f64 {
        self.duration_ms
    }

    /// Full A→B→A cycle length.
    pub fn cycle_ms(self) -> f64 {
        self.duration_ms * 2.0
    }

    /// Position inside the current cycle, in `[0, cycle_ms)`.
    ///
    /// Uses Euclidean remainder so readings before the origin wrap instead of going negative.
    pub fn elapsed(self, since_origin_ms: f64) -> f64 {
        let e = since_origin_ms.rem_euclid(self.cycle_ms());
        // rem_euclid can round up to the divisor for tiny negative inputs.
        if e >= self.cycle_ms() { 0.0 } else { e }
    }

    /// Unreflected progress `elapsed / duration`, in `[0, 2)`.
    pub fn raw_progress(self, since_origin_ms: f64) -> f64 {
        self.elapsed(since_origin_ms) / self.duration_ms
    }

    /// Triangular ping-pong progress in `[0, 1]`.
    pub fn pingpong(self, since_origin_ms: f64) -> f64 {
        let p = self.raw_progress(since_origin_ms);
        if p > 1.0 { 2.0 - p } else { p }
    }

    /// Ping-pong progress passed through `ease`.
    pub fn eased(self, since_origin_ms: f64, ease: Ease) -> f64 {
        ease.apply(self.pingpong(since_origin_ms))
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
        }
    }
}

/// Timeline anchored to a clock origin that is set exactly once.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationClock {
    timeline: Timeline,
    origin_ms: Option<f64>,
}

impl AnimationClock {
    /// Create an unstarted clock.
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            origin_ms: None,
        }
    }

    /// Anchor the clock. A second call is rejected so the origin can never move.
    pub fn start(&mut self, origin_ms: f64) -> SpindleResult<()> {
        if !origin_ms.is_finite() {
            return Err(SpindleError::validation("clock origin must be finite"));
        }
        if self.origin_ms.is_some() {
            return Err(SpindleError::validation("animation clock already started"));
        }
        self.origin_ms = Some(origin_ms);
        Ok(())
    }

    /// Return `true` once [`AnimationClock::start`] has succeeded.
    pub fn is_started(&self) -> bool {
        self.origin_ms.is_some()
    }

    /// Clock origin, if started.
    pub fn origin_ms(&self) -> Option<f64> {
        self.origin_ms
    }

    /// Underlying timeline.
    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    /// Time since origin for a clock reading.
    pub fn since_origin(&self, now_ms: f64) -> SpindleResult<f64> {
        let origin = self
            .origin_ms
            .ok_or_else(|| SpindleError::validation("animation clock not started"))?;
        Ok(now_ms - origin)
    }

    /// Eased ping-pong progress for a clock reading.
    pub fn progress_at(&self, now_ms: f64, ease: Ease) -> SpindleResult<f64> {
        Ok(self.timeline.eased(self.since_origin(now_ms)?, ease))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clock.rs"]
mod tests;
