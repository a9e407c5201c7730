//! The per-frame render function.
//!
//! [`compose_frame`] is pure: a clock reading and an immutable [`FrameContext`] go in, a
//! [`DisplayList`] comes out. Rasterization is a separate step (see [`crate::render`]), so the
//! timing and layout logic can be tested without a surface.

use crate::animation::clock::{AnimationClock, Timeline};
use crate::animation::ease::Ease;
use crate::assets::{ASSET_COUNT, AssetSet};
use crate::foundation::core::{Affine, Canvas, Point, Rgba8Premul, Vec2};
use crate::foundation::error::{SpindleError, SpindleResult};
use crate::render::display_list::{BlendMode, DisplayList, DrawCommand};
use crate::scene::config::SceneConfig;
use std::f64::consts::PI;

/// Rotation of each asset, in radians (positive is clockwise on a y-down surface).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinAngles(pub [f64; ASSET_COUNT]);

impl SpinAngles {
    /// Angles for eased progress `p` with `spins` expressed in half-turns.
    pub fn from_progress(p: f64, spins: [f64; ASSET_COUNT]) -> Self {
        Self(spins.map(|s| p * PI * s))
    }
}

/// Everything a frame needs besides the clock reading.
///
/// Only constructible from a started clock and a fully loaded asset set, so a frame can never be
/// composed before its preconditions hold.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameContext {
    canvas: Canvas,
    timeline: Timeline,
    origin_ms: f64,
    ease: Ease,
    spins: [f64; ASSET_COUNT],
    background: Rgba8Premul,
    disc: Rgba8Premul,
    blend: BlendMode,
    asset_sizes: [(u32, u32); ASSET_COUNT],
}

impl FrameContext {
    /// Build the context for a validated config.
    pub fn new(
        config: &SceneConfig,
        clock: &AnimationClock,
        assets: &AssetSet,
    ) -> SpindleResult<Self> {
        config.validate()?;
        let origin_ms = clock
            .origin_ms()
            .ok_or_else(|| SpindleError::validation("frame context needs a started clock"))?;
        Ok(Self {
            canvas: config.canvas,
            timeline: clock.timeline(),
            origin_ms,
            ease: config.ease,
            spins: config.spins,
            background: config.background_premul(),
            disc: config.disc_premul(),
            blend: config.blend,
            asset_sizes: assets.sizes(),
        })
    }

    /// Output surface size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Timeline the context animates on.
    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    /// Clock origin.
    pub fn origin_ms(&self) -> f64 {
        self.origin_ms
    }

    /// Disc radius: half the smaller side of the first asset.
    pub fn disc_radius(&self) -> f64 {
        let (w, h) = self.asset_sizes[0];
        f64::from(w.min(h)) / 2.0
    }

    /// Eased ping-pong progress for a clock reading.
    pub fn progress_at(&self, now_ms: f64) -> f64 {
        self.timeline.eased(now_ms - self.origin_ms, self.ease)
    }

    /// Per-asset rotation for a clock reading.
    pub fn angles_at(&self, now_ms: f64) -> SpinAngles {
        SpinAngles::from_progress(self.progress_at(now_ms), self.spins)
    }
}

/// Transform that draws a `w`x`h` image centered on `pivot`, rotated by `angle` about its center.
pub fn rotated_about_center(w: u32, h: u32, pivot: Point, angle: f64) -> Affine {
    Affine::translate(pivot.to_vec2())
        * Affine::rotate(angle)
        * Affine::translate(Vec2::new(-f64::from(w) / 2.0, -f64::from(h) / 2.0))
}

/// Compose one frame: background, disc, then the three assets under the configured blend.
pub fn compose_frame(now_ms: f64, ctx: &FrameContext) -> DisplayList {
    let center = ctx.canvas.center();
    let SpinAngles(angles) = ctx.angles_at(now_ms);

    let mut commands = Vec::with_capacity(4 + ASSET_COUNT);
    commands.push(DrawCommand::Clear {
        color: ctx.background,
    });
    commands.push(DrawCommand::FillCircle {
        center,
        radius: ctx.disc_radius(),
        color: ctx.disc,
    });
    commands.push(DrawCommand::SetBlend(ctx.blend));
    for (slot, (&(w, h), &angle)) in ctx.asset_sizes.iter().zip(angles.iter()).enumerate() {
        commands.push(DrawCommand::DrawImage {
            slot,
            transform: rotated_about_center(w, h, center, angle),
        });
    }
    commands.push(DrawCommand::SetBlend(BlendMode::Normal));

    DisplayList {
        canvas: ctx.canvas,
        commands,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/frame.rs"]
mod tests;
