//! Live driving: frame scheduling and the asset-gated player state machine.

/// Asset-gated player state machine.
pub mod player;
/// Frame schedulers.
pub mod scheduler;
