use crate::animation::clock::{AnimationClock, check_reading};
use crate::assets::AssetSet;
use crate::assets::loader::AssetLoad;
use crate::foundation::error::SpindleResult;
use crate::render::backend::{BackendKind, FrameRGBA, RenderBackend, create_backend};
use crate::scene::config::SceneConfig;
use crate::scene::frame::{FrameContext, compose_frame};
use std::path::Path;

/// Observable player state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    /// Assets are still loading; ticks render nothing.
    WaitingForAssets,
    /// All assets are ready and the clock is running. Terminal.
    Animating,
}

enum Phase {
    Waiting(AssetLoad),
    Animating { assets: AssetSet, ctx: FrameContext },
}

/// Live effect driver.
///
/// Starts in [`PlayerState::WaitingForAssets`]. The first tick that observes all three assets
/// ready starts the animation clock at that tick's reading and moves to
/// [`PlayerState::Animating`]; every tick from then on renders one frame.
pub struct Player {
    config: SceneConfig,
    clock: AnimationClock,
    phase: Phase,
    backend: Box<dyn RenderBackend>,
}

impl Player {
    /// Validate `config` and begin loading its assets relative to `assets_root`.
    pub fn new(config: SceneConfig, assets_root: &Path) -> SpindleResult<Self> {
        config.validate()?;
        let load = AssetLoad::spawn(config.resolve_assets(assets_root), config.load_timeout());
        Self::with_load(config, load)
    }

    /// Drive an already started load.
    pub fn with_load(config: SceneConfig, load: AssetLoad) -> SpindleResult<Self> {
        config.validate()?;
        let clock = AnimationClock::new(config.timeline()?);
        Ok(Self {
            config,
            clock,
            phase: Phase::Waiting(load),
            backend: create_backend(BackendKind::Cpu),
        })
    }

    /// Current state.
    pub fn state(&self) -> PlayerState {
        match self.phase {
            Phase::Waiting(_) => PlayerState::WaitingForAssets,
            Phase::Animating { .. } => PlayerState::Animating,
        }
    }

    /// Scene configuration.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Frame context, once animating.
    pub fn frame_context(&self) -> Option<&FrameContext> {
        match &self.phase {
            Phase::Waiting(_) => None,
            Phase::Animating { ctx, .. } => Some(ctx),
        }
    }

    /// Advance to `now_ms`.
    ///
    /// Returns `Ok(None)` while waiting for assets and the rendered frame once animating. A load
    /// failure or timeout is returned as an error and leaves the player waiting. A non-finite
    /// reading is rejected.
    pub fn tick(&mut self, now_ms: f64) -> SpindleResult<Option<FrameRGBA>> {
        check_reading(now_ms)?;
        if let Phase::Waiting(load) = &mut self.phase {
            let Some(assets) = load.poll()? else {
                return Ok(None);
            };
            self.clock.start(now_ms)?;
            let ctx = FrameContext::new(&self.config, &self.clock, &assets)?;
            tracing::debug!(origin_ms = now_ms, "assets ready; animating");
            self.phase = Phase::Animating { assets, ctx };
        }

        match &self.phase {
            Phase::Animating { assets, ctx } => {
                let list = compose_frame(now_ms, ctx);
                self.backend.execute(&list, assets).map(Some)
            }
            Phase::Waiting(_) => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/player.rs"]
mod tests;
