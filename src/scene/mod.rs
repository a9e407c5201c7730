//! Scene configuration and per-frame scene derivation.

/// JSON-facing scene configuration.
pub mod config;
/// Pure frame composition.
pub mod frame;
