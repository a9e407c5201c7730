use crate::foundation::core::Fps;
use crate::foundation::error::{SpindleError, SpindleResult};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Per-frame callback. Receives a monotonic reading in milliseconds.
pub type FrameCallback = Box<dyn FnMut(f64) -> ControlFlow<()> + Send>;

/// Cooperative frame scheduler.
///
/// Callbacks run strictly one after another; a callback returning [`ControlFlow::Break`] ends the
/// run just like [`FrameScheduler::stop`].
pub trait FrameScheduler {
    /// Begin invoking `callback` once per frame. Errors if already running.
    fn start(&mut self, callback: FrameCallback) -> SpindleResult<()>;
    /// Request that no further callbacks run.
    fn stop(&mut self);
    /// Whether a run is in progress.
    fn is_running(&self) -> bool;
}

/// Fixed-rate scheduler on a dedicated thread.
///
/// Ticks are timed against an `Instant` epoch taken at `start`, so a slow callback delays the
/// next tick instead of accumulating drift. Ticks that fall entirely behind are skipped and
/// counted.
pub struct IntervalScheduler {
    interval: Duration,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl IntervalScheduler {
    /// Create a scheduler ticking at `fps`.
    pub fn new(fps: Fps) -> SpindleResult<Self> {
        fps.validate()?;
        Ok(Self {
            interval: Duration::from_nanos(1_000_000_000 * u64::from(fps.den) / u64::from(fps.num)),
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        })
    }

    /// Tick period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the run to finish. Returns the number of skipped ticks.
    pub fn join(&mut self) -> SpindleResult<u64> {
        match self.handle.take() {
            Some(h) => h
                .join()
                .map_err(|_| SpindleError::Other(anyhow::anyhow!("scheduler thread panicked"))),
            None => Ok(0),
        }
    }
}

impl FrameScheduler for IntervalScheduler {
    fn start(&mut self, mut callback: FrameCallback) -> SpindleResult<()> {
        if self.is_running() {
            return Err(SpindleError::validation("scheduler is already running"));
        }
        // Reap a finished run before starting a new one.
        self.join()?;
        self.stop.store(false, Ordering::SeqCst);

        let stop = self.stop.clone();
        let interval = self.interval;
        let handle = std::thread::Builder::new()
            .name("spindle-frames".to_owned())
            .spawn(move || {
                let epoch = Instant::now();
                let mut tick: u32 = 0;
                let mut skipped = 0u64;
                while !stop.load(Ordering::SeqCst) {
                    let now = epoch.elapsed();
                    if callback(now.as_secs_f64() * 1000.0).is_break() {
                        break;
                    }
                    tick = tick.saturating_add(1);
                    let after = epoch.elapsed();
                    let mut due = interval.saturating_mul(tick);
                    if after > due {
                        let behind = ticks_behind(after - due, interval);
                        if behind > 0 {
                            tracing::warn!(dropped = behind, "frame callback overran; skipping ticks");
                            skipped += u64::from(behind);
                            tick = tick.saturating_add(behind);
                            due = interval.saturating_mul(tick);
                        }
                    }
                    if let Some(wait) = due.checked_sub(epoch.elapsed()) {
                        std::thread::sleep(wait);
                    }
                }
                stop.store(true, Ordering::SeqCst);
                skipped
            })
            .map_err(|e| SpindleError::Other(anyhow::anyhow!("spawn scheduler thread: {e}")))?;
        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished()) && !self.stop.load(Ordering::SeqCst)
    }
}

/// Whole ticks of `interval` contained in `lag`, saturating at `u32::MAX`.
fn ticks_behind(lag: Duration, interval: Duration) -> u32 {
    u32::try_from(lag.as_nanos() / interval.as_nanos().max(1)).unwrap_or(u32::MAX)
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.stop();
        let _ = self.join();
    }
}

/// Deterministic scheduler stepped by the caller.
///
/// Each [`advance`](ManualScheduler::advance) invokes the callback with readings
/// `0, step, 2*step, ...` continuing from the previous call.
pub struct ManualScheduler {
    step_ms: f64,
    now_ms: f64,
    callback: Option<FrameCallback>,
}

impl ManualScheduler {
    /// Create a scheduler whose clock moves `step_ms` per tick.
    pub fn new(step_ms: f64) -> SpindleResult<Self> {
        if !step_ms.is_finite() || step_ms <= 0.0 {
            return Err(SpindleError::validation(
                "manual scheduler step must be finite and > 0",
            ));
        }
        Ok(Self {
            step_ms,
            now_ms: 0.0,
            callback: None,
        })
    }

    /// Scheduler stepping one frame of `fps` per tick.
    pub fn from_fps(fps: Fps) -> SpindleResult<Self> {
        fps.validate()?;
        Self::new(fps.frame_duration_ms())
    }

    /// Reading passed to the next tick.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Run up to `n` ticks. Returns how many ran before the run ended.
    pub fn advance(&mut self, n: u64) -> u64 {
        let mut ran = 0;
        while ran < n {
            let Some(cb) = self.callback.as_mut() else {
                break;
            };
            let flow = cb(self.now_ms);
            self.now_ms += self.step_ms;
            ran += 1;
            if flow.is_break() {
                self.callback = None;
            }
        }
        ran
    }
}

impl FrameScheduler for ManualScheduler {
    fn start(&mut self, callback: FrameCallback) -> SpindleResult<()> {
        if self.callback.is_some() {
            return Err(SpindleError::validation("scheduler is already running"));
        }
        self.callback = Some(callback);
        Ok(())
    }

    fn stop(&mut self) {
        self.callback = None;
    }

    fn is_running(&self) -> bool {
        self.callback.is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/scheduler.rs"]
mod tests;
