use crate::animation::clock::{DEFAULT_DURATION_MS, Timeline};
use crate::animation::ease::Ease;
use crate::assets::ASSET_COUNT;
use crate::foundation::core::{Canvas, Fps, Rgba8Premul};
use crate::foundation::error::{SpindleError, SpindleResult};
use crate::render::display_list::BlendMode;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scene description loaded from JSON.
///
/// Every field is optional; the defaults give the classic effect: three images spinning
/// half a turn, a quarter turn clockwise and a quarter turn counter-clockwise over a white disc on
/// black, multiply-blended, 6 s each way with a cubic ease.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Output surface size.
    pub canvas: Canvas,
    /// Output frame rate for offline and live rendering.
    pub fps: Fps,
    /// Asset sources, relative to the config file directory (or absolute).
    pub assets: [String; ASSET_COUNT],
    /// Forward-phase length in milliseconds. The full cycle is twice this.
    pub duration_ms: f64,
    /// Easing applied to the ping-pong progress.
    pub ease: Ease,
    /// Rotation of each asset at full progress, in half-turns (1.0 = 180°, negative = CCW).
    pub spins: [f64; ASSET_COUNT],
    /// Background color (straight RGBA8).
    pub background: [u8; 4],
    /// Disc color (straight RGBA8).
    pub disc: [u8; 4],
    /// Blend mode used while drawing the assets.
    pub blend: BlendMode,
    /// Upper bound on waiting for all assets, in milliseconds.
    pub load_timeout_ms: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1280,
                height: 720,
            },
            fps: Fps { num: 60, den: 1 },
            assets: [
                "images/1.png".to_owned(),
                "images/2.png".to_owned(),
                "images/3.png".to_owned(),
            ],
            duration_ms: DEFAULT_DURATION_MS,
            ease: Ease::InOutCubic,
            spins: [1.0, 0.5, -0.5],
            background: [0, 0, 0, 255],
            disc: [255, 255, 255, 255],
            blend: BlendMode::Multiply,
            load_timeout_ms: 10_000,
        }
    }
}

impl SceneConfig {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SpindleResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| SpindleError::validation(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SpindleResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SpindleError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every field before anything is allocated or loaded.
    pub fn validate(&self) -> SpindleResult<()> {
        self.canvas.validate()?;
        self.fps.validate()?;
        self.timeline()?;
        for (i, src) in self.assets.iter().enumerate() {
            if src.trim().is_empty() {
                return Err(SpindleError::validation(format!(
                    "assets[{i}] must be a non-empty path"
                )));
            }
        }
        if let Some(i) = self.spins.iter().position(|s| !s.is_finite()) {
            return Err(SpindleError::validation(format!("spins[{i}] must be finite")));
        }
        if self.load_timeout_ms == 0 {
            return Err(SpindleError::validation("load_timeout_ms must be > 0"));
        }
        Ok(())
    }

    /// Ping-pong timeline for the configured duration.
    pub fn timeline(&self) -> SpindleResult<Timeline> {
        Timeline::new(self.duration_ms)
    }

    /// Load barrier bound.
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Background as premultiplied color.
    pub fn background_premul(&self) -> Rgba8Premul {
        let [r, g, b, a] = self.background;
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }

    /// Disc as premultiplied color.
    pub fn disc_premul(&self) -> Rgba8Premul {
        let [r, g, b, a] = self.disc;
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }

    /// Resolve asset sources against `root`. Absolute sources are kept as-is.
    pub fn resolve_assets(&self, root: &Path) -> [PathBuf; ASSET_COUNT] {
        std::array::from_fn(|i| root.join(&self.assets[i]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
