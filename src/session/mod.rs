/// Offline frame-range rendering.
pub mod render_session;
