use crate::assets::{AssetSet, PreparedImage};
use crate::foundation::core::{Affine, Canvas, Rgba8Premul};
use crate::foundation::error::{SpindleError, SpindleResult};
use crate::foundation::math::{mul_div255_u8, unpremultiply_px};
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::display_list::{BlendMode, DisplayList, DrawCommand};
use std::sync::Arc;
use vello_cpu::kurbo::Shape;

/// Flattening tolerance for the disc outline, in pixels.
const CIRCLE_TOLERANCE: f64 = 0.1;

#[derive(Clone)]
struct ImagePaint {
    source: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// CPU backend powered by `vello_cpu`.
///
/// Every draw command is rasterized into a transparent scratch layer and then composited onto the
/// frame with the blend mode in effect, so blending applies per draw call like a 2D canvas.
#[derive(Default)]
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
    layer: Option<vello_cpu::Pixmap>,
    image_cache: Vec<Option<ImagePaint>>,
}

impl CpuBackend {
    /// Create a backend with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let out = f(&mut ctx);
        self.ctx = Some(ctx);
        out
    }

    fn take_layer(&mut self, width: u16, height: u16) -> vello_cpu::Pixmap {
        match self.layer.take() {
            Some(pm) if pm.width() == width && pm.height() == height => pm,
            _ => vello_cpu::Pixmap::new(width, height),
        }
    }

    fn image_paint_for(&mut self, slot: usize, assets: &AssetSet) -> SpindleResult<ImagePaint> {
        let img = assets
            .get(slot)
            .ok_or_else(|| SpindleError::render(format!("no asset in slot {slot}")))?;
        if let Some(Some(cached)) = self.image_cache.get(slot)
            && Arc::ptr_eq(&cached.source, &img.rgba8_premul)
        {
            return Ok(cached.clone());
        }

        let paint = image_paint(img)?;
        if self.image_cache.len() <= slot {
            self.image_cache.resize_with(slot + 1, || None);
        }
        self.image_cache[slot] = Some(paint.clone());
        Ok(paint)
    }

    /// Rasterize one command into `layer`, replacing its previous contents.
    fn rasterize(
        &mut self,
        layer: &mut vello_cpu::Pixmap,
        draw: impl FnOnce(&mut vello_cpu::RenderContext),
    ) {
        clear_pixmap_to_transparent(layer);
        self.with_ctx_mut(layer.width(), layer.height(), |ctx| {
            draw(ctx);
            ctx.flush();
            ctx.render_to_pixmap(layer);
        });
    }
}

impl RenderBackend for CpuBackend {
    fn execute(&mut self, list: &DisplayList, assets: &AssetSet) -> SpindleResult<FrameRGBA> {
        let (w, h) = surface_dims(list.canvas)?;
        let mut target = vello_cpu::Pixmap::new(w, h);
        let mut layer = self.take_layer(w, h);
        let mut blend = BlendMode::Normal;

        for cmd in &list.commands {
            match cmd {
                DrawCommand::Clear { color } => clear_pixmap(&mut target, color.to_array()),
                DrawCommand::SetBlend(mode) => blend = *mode,
                DrawCommand::FillCircle {
                    center,
                    radius,
                    color,
                } => {
                    if !radius.is_finite() || *radius <= 0.0 {
                        continue;
                    }
                    let circle = vello_cpu::kurbo::Circle::new(
                        vello_cpu::kurbo::Point::new(center.x, center.y),
                        *radius,
                    );
                    let paint = paint_color(*color);
                    self.rasterize(&mut layer, |ctx| {
                        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                        ctx.set_paint(paint);
                        ctx.fill_path(&circle.to_path(CIRCLE_TOLERANCE));
                    });
                    composite_over_rgba8_premul(
                        target.data_as_u8_slice_mut(),
                        layer.data_as_u8_slice(),
                        blend,
                    )?;
                }
                DrawCommand::DrawImage { slot, transform } => {
                    let p = self.image_paint_for(*slot, assets)?;
                    let tr = affine_to_cpu(*transform);
                    self.rasterize(&mut layer, |ctx| {
                        ctx.set_transform(tr);
                        ctx.set_paint(p.paint);
                        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                            0.0,
                            0.0,
                            f64::from(p.w),
                            f64::from(p.h),
                        ));
                    });
                    composite_over_rgba8_premul(
                        target.data_as_u8_slice_mut(),
                        layer.data_as_u8_slice(),
                        blend,
                    )?;
                }
            }
        }

        self.layer = Some(layer);
        Ok(FrameRGBA {
            width: list.canvas.width,
            height: list.canvas.height,
            data: target.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn surface_dims(canvas: Canvas) -> SpindleResult<(u16, u16)> {
    canvas.validate()?;
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| SpindleError::render("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| SpindleError::render("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn paint_color(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    // peniko colors are straight alpha.
    let [r, g, b, a] = unpremultiply_px(c.to_array());
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn image_paint(img: &PreparedImage) -> SpindleResult<ImagePaint> {
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    Ok(ImagePaint {
        source: img.rgba8_premul.clone(),
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        w: img.width,
        h: img.height,
    })
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba_premul: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba_premul);
    }
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SpindleResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SpindleError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SpindleError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(SpindleError::render("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let may_have_opacities = bytes.chunks_exact(4).any(|px| px[3] != 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Composite premultiplied `src` over `dst` in place with a separable blend mode.
pub(crate) fn composite_over_rgba8_premul(
    dst: &mut [u8],
    src: &[u8],
    blend: BlendMode,
) -> SpindleResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SpindleError::render(
            "composite expects equal-length rgba8 buffers",
        ));
    }
    // Dispatch once per layer; each arm monomorphizes its own kernel.
    match blend {
        BlendMode::Normal => premul_over_in_place(dst, src),
        BlendMode::Multiply => composite_blend_in_place(dst, src, |s, d| s * d),
        BlendMode::Screen => composite_blend_in_place(dst, src, |s, d| s + d - s * d),
        BlendMode::Darken => composite_blend_in_place(dst, src, |s, d| s.min(d)),
        BlendMode::Lighten => composite_blend_in_place(dst, src, |s, d| s.max(d)),
    }
    Ok(())
}

fn premul_over_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3] as u16;
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - sa;
        d[3] = s[3].saturating_add(mul_div255_u8(d[3] as u16, inv));
        for c in 0..3 {
            d[c] = s[c].saturating_add(mul_div255_u8(d[c] as u16, inv));
        }
    }
}

#[inline(always)]
fn composite_blend_in_place<F>(dst: &mut [u8], src: &[u8], blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        // Source-over with the blend applied to unpremultiplied channels:
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = s[3] as f32 / 255.0;
        let da = d[3] as f32 / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

        for c in 0..3 {
            let sp = s[c] as f32 / 255.0;
            let dp = d[c] as f32 / 255.0;
            let sc = (sp / sa).clamp(0.0, 1.0);
            let dc = if da > 0.0 { (dp / da).clamp(0.0, 1.0) } else { 0.0 };
            let b = blend_fn(sc, dc).clamp(0.0, 1.0);
            let out = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, 1.0);
            d[c] = (out * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
