use crate::foundation::core::{Affine, Canvas, Point, Rgba8Premul};

/// Per-draw compositing mode.
///
/// Separable blend modes are applied with Porter-Duff source-over, the same model a 2D canvas uses
/// for `globalCompositeOperation`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Plain source-over.
    #[default]
    Normal,
    /// Per-channel product; darkens overlaps.
    Multiply,
    /// Inverse of multiply on inverted channels; lightens overlaps.
    Screen,
    /// Per-channel minimum.
    Darken,
    /// Per-channel maximum.
    Lighten,
}

/// One drawing instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Replace every pixel of the surface with `color`.
    Clear {
        /// Fill color.
        color: Rgba8Premul,
    },
    /// Fill a circle using the current blend mode.
    FillCircle {
        /// Circle center in canvas pixels.
        center: Point,
        /// Radius in canvas pixels.
        radius: f64,
        /// Fill color.
        color: Rgba8Premul,
    },
    /// Switch the blend mode used by subsequent draws.
    SetBlend(BlendMode),
    /// Draw an asset with a full image-to-canvas transform.
    ///
    /// The transform maps the asset's pixel space `[0,w]x[0,h]` onto the canvas; each command owns
    /// its transform so nothing carries over between draws.
    DrawImage {
        /// Asset slot (0-based).
        slot: usize,
        /// Image-to-canvas transform.
        transform: Affine,
    },
}

/// Ordered draw commands for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayList {
    /// Target surface size.
    pub canvas: Canvas,
    /// Commands in paint order.
    pub commands: Vec<DrawCommand>,
}
