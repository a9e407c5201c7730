use crate::assets::decode::decode_source;
use crate::assets::{ASSET_COUNT, AssetSet, PreparedImage};
use crate::foundation::error::{SpindleError, SpindleResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

/// Load state of one asset slot.
#[derive(Clone, Debug)]
pub enum SlotState {
    /// Not reported yet.
    Pending,
    /// Decoded and ready to draw.
    Ready(Arc<PreparedImage>),
    /// Read or decode failed.
    Failed(String),
}

/// Completion signal for one slot.
#[derive(Debug)]
pub struct LoadEvent {
    /// Slot index (0-based).
    pub index: usize,
    /// Decoded image or failure reason.
    pub result: Result<PreparedImage, String>,
}

/// Aggregate barrier state.
#[derive(Debug)]
pub enum BarrierStatus {
    /// At least one slot is still pending and none failed.
    Waiting {
        /// Number of pending slots.
        pending: usize,
    },
    /// Every slot is ready.
    Ready(AssetSet),
    /// A slot failed; the lowest failing index is reported.
    Failed(SpindleError),
}

/// All-must-complete join over the three asset slots.
///
/// Completion order is irrelevant. A slot settles once; later events for it are ignored.
#[derive(Debug)]
pub struct LoadBarrier {
    paths: [PathBuf; ASSET_COUNT],
    slots: [SlotState; ASSET_COUNT],
}

impl LoadBarrier {
    /// Create a barrier with every slot pending.
    pub fn new(paths: [PathBuf; ASSET_COUNT]) -> Self {
        Self {
            paths,
            slots: std::array::from_fn(|_| SlotState::Pending),
        }
    }

    /// Record a completion signal.
    pub fn record(&mut self, event: LoadEvent) {
        let Some(slot) = self.slots.get_mut(event.index) else {
            tracing::warn!(index = event.index, "ignoring load event for unknown slot");
            return;
        };
        if !matches!(slot, SlotState::Pending) {
            tracing::debug!(index = event.index, "slot already settled");
            return;
        }
        *slot = match event.result {
            Ok(img) => {
                tracing::debug!(
                    index = event.index,
                    width = img.width,
                    height = img.height,
                    "asset ready"
                );
                SlotState::Ready(Arc::new(img))
            }
            Err(reason) => {
                tracing::warn!(index = event.index, %reason, "asset failed");
                SlotState::Failed(reason)
            }
        };
    }

    /// Per-slot state.
    pub fn slots(&self) -> &[SlotState; ASSET_COUNT] {
        &self.slots
    }

    /// Number of slots without a completion signal.
    pub fn pending(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, SlotState::Pending))
            .count()
    }

    /// Current aggregate state. A failure wins over pending slots.
    pub fn status(&self) -> BarrierStatus {
        for (i, slot) in self.slots.iter().enumerate() {
            if let SlotState::Failed(reason) = slot {
                return BarrierStatus::Failed(SpindleError::asset_load(
                    i,
                    self.paths[i].clone(),
                    reason.clone(),
                ));
            }
        }

        let ready: Vec<Arc<PreparedImage>> = self
            .slots
            .iter()
            .filter_map(|s| match s {
                SlotState::Ready(img) => Some(img.clone()),
                _ => None,
            })
            .collect();
        match <[Arc<PreparedImage>; ASSET_COUNT]>::try_from(ready) {
            Ok(images) => BarrierStatus::Ready(AssetSet::new(images)),
            Err(_) => BarrierStatus::Waiting {
                pending: self.pending(),
            },
        }
    }

    fn first_pending(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, SlotState::Pending))
    }
}

/// In-flight load of the three scene assets.
///
/// Each asset is read and decoded as an independent job on the rayon pool. Completion signals
/// arrive over a channel and are joined by a [`LoadBarrier`]; waiting is bounded by `timeout`.
pub struct AssetLoad {
    barrier: LoadBarrier,
    rx: Receiver<LoadEvent>,
    started: Instant,
    timeout: Duration,
}

impl AssetLoad {
    /// Start loading `paths` in the background.
    #[tracing::instrument(skip_all, fields(timeout_ms = timeout.as_millis() as u64))]
    pub fn spawn(paths: [PathBuf; ASSET_COUNT], timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        for (index, path) in paths.iter().cloned().enumerate() {
            let tx = tx.clone();
            rayon::spawn(move || {
                let result = std::fs::read(&path)
                    .map_err(|e| format!("read failed: {e}"))
                    .and_then(|bytes| decode_source(&path, &bytes).map_err(|e| format!("{e:#}")));
                // The receiver may be gone if the load was abandoned.
                let _ = tx.send(LoadEvent { index, result });
            });
        }
        Self {
            barrier: LoadBarrier::new(paths),
            rx,
            started: Instant::now(),
            timeout,
        }
    }

    /// Borrow the barrier (for progress reporting).
    pub fn barrier(&self) -> &LoadBarrier {
        &self.barrier
    }

    /// Drain completed loads without blocking.
    ///
    /// Returns `Ok(None)` while waiting, the asset set once all three are ready, and an error on
    /// the first failure or once the timeout has passed.
    pub fn poll(&mut self) -> SpindleResult<Option<AssetSet>> {
        loop {
            match self.rx.try_recv() {
                Ok(ev) => self.barrier.record(ev),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return self.settle_disconnected().map(Some),
            }
        }
        match self.barrier.status() {
            BarrierStatus::Ready(set) => Ok(Some(set)),
            BarrierStatus::Failed(err) => Err(err),
            BarrierStatus::Waiting { pending } => {
                let waited = self.started.elapsed();
                if waited >= self.timeout {
                    return Err(SpindleError::AssetTimeout {
                        waited_ms: waited.as_millis() as u64,
                        pending,
                    });
                }
                Ok(None)
            }
        }
    }

    /// Block until all assets are ready, one fails, or the timeout passes.
    pub fn wait(mut self) -> SpindleResult<AssetSet> {
        loop {
            if let Some(set) = self.poll()? {
                return Ok(set);
            }
            let remaining = self.timeout.saturating_sub(self.started.elapsed());
            match self.rx.recv_timeout(remaining) {
                Ok(ev) => self.barrier.record(ev),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return self.settle_disconnected(),
            }
        }
    }

    fn settle_disconnected(&mut self) -> SpindleResult<AssetSet> {
        match self.barrier.status() {
            BarrierStatus::Ready(set) => Ok(set),
            BarrierStatus::Failed(err) => Err(err),
            BarrierStatus::Waiting { .. } => {
                let i = self.barrier.first_pending().unwrap_or(0);
                Err(SpindleError::asset_load(
                    i,
                    self.barrier.paths[i].clone(),
                    "loader exited without reporting",
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
