//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order and are used by `RenderSession::render_range`
//! and the live player loop.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// PNG sequence sink.
pub mod png;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
