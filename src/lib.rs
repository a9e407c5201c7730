//! Spindle renders a ping-pong rotation effect: three images spin about the canvas center over a
//! disc, multiply-blended, easing forward for one phase and back for the next.
//!
//! The render function is pure: [`compose_frame`] maps a time reading and an immutable
//! [`FrameContext`] to a [`DisplayList`], which a [`RenderBackend`] turns into pixels.
//!
//! - Offline: build a [`RenderSession`], render single frames or stream a range into a
//!   [`FrameSink`]
//! - Live: drive a [`Player`] from a [`FrameScheduler`]; it waits for assets, then animates
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
/// Asset decoding and loading.
pub mod assets;
/// Encoding sinks.
pub mod encode;
/// Rendering backend(s).
pub mod render;
/// Live scheduling and the player state machine.
pub mod runtime;
/// Scene configuration and the pure frame function.
pub mod scene;
/// Session-oriented offline rendering API.
pub mod session;

pub use crate::animation::clock::{AnimationClock, DEFAULT_DURATION_MS, Timeline};
pub use crate::animation::ease::Ease;
pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, MAX_CANVAS_DIM, Point, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{SpindleError, SpindleResult};

pub use crate::assets::loader::{AssetLoad, BarrierStatus, LoadBarrier, LoadEvent, SlotState};
pub use crate::assets::{ASSET_COUNT, AssetSet, PreparedImage};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::display_list::{BlendMode, DisplayList, DrawCommand};
pub use crate::runtime::player::{Player, PlayerState};
pub use crate::runtime::scheduler::{
    FrameCallback, FrameScheduler, IntervalScheduler, ManualScheduler,
};
pub use crate::scene::config::SceneConfig;
pub use crate::scene::frame::{FrameContext, SpinAngles, compose_frame, rotated_about_center};
pub use crate::session::render_session::{RenderSession, RenderSessionOpts, RenderStats};
