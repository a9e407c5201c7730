//! Frame rasterization.

/// Rendered frame type and backend trait.
pub mod backend;
/// `vello_cpu` raster backend.
pub mod cpu;
/// Backend-agnostic draw commands.
pub mod display_list;
