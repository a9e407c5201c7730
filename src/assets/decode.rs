use crate::assets::PreparedImage;
use crate::foundation::core::MAX_CANVAS_DIM;
use crate::foundation::error::{SpindleError, SpindleResult};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

/// Decode an asset by file extension: `.svg` is rasterized, everything else goes through `image`.
pub fn decode_source(path: &Path, bytes: &[u8]) -> SpindleResult<PreparedImage> {
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        decode_svg(bytes)
    } else {
        decode_image(bytes)
    }
}

/// Decode encoded raster bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> SpindleResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(SpindleError::validation("decoded image is empty"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes and rasterize once at the document's intrinsic size.
pub fn decode_svg(bytes: &[u8]) -> SpindleResult<PreparedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let (width, height) = svg_intrinsic_px(&tree)?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SpindleError::render("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.take()),
    })
}

fn svg_intrinsic_px(tree: &usvg::Tree) -> SpindleResult<(u32, u32)> {
    fn to_px(v: f32) -> SpindleResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(SpindleError::validation("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let w = to_px(size.width())?;
    let h = to_px(size.height())?;
    if w > MAX_CANVAS_DIM || h > MAX_CANVAS_DIM {
        return Err(SpindleError::validation(format!(
            "svg raster size too large: {w}x{h} (max {MAX_CANVAS_DIM}x{MAX_CANVAS_DIM})"
        )));
    }
    Ok((w, h))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
