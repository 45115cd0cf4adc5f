//! Caption layout: canvas sizing, border stamping and frame placement.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use tracing::debug;

use super::{RenderSpec, RenderedCaption};
use crate::core::captions::{CaptionGroup, Color};
use crate::core::text::{FontFace, GlyphMask, TextRasterizer};
use crate::core::{CoreError, CoreResult, Placement};

/// Renders caption groups with one font and one [`RenderSpec`].
///
/// Rendering a group depends only on the group and the spec, so a renderer
/// can be shared across threads.
#[derive(Clone)]
pub struct CaptionRenderer {
    spec: RenderSpec,
    rasterizer: Arc<dyn TextRasterizer>,
}

impl std::fmt::Debug for CaptionRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionRenderer")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl CaptionRenderer {
    pub fn new(spec: RenderSpec, rasterizer: Arc<dyn TextRasterizer>) -> Self {
        Self { spec, rasterizer }
    }

    /// Loads the spec's font, falling back to the system default face
    pub fn with_font(spec: RenderSpec) -> CoreResult<Self> {
        let face = FontFace::load_or_default(spec.font.as_deref())?;
        Ok(Self::new(spec, Arc::new(face)))
    }

    pub fn spec(&self) -> &RenderSpec {
        &self.spec
    }

    /// Shared handle to the rasterizer, usable as a measurer for segmentation
    pub fn rasterizer(&self) -> Arc<dyn TextRasterizer> {
        Arc::clone(&self.rasterizer)
    }

    /// Renders one group into a positioned bitmap
    pub fn render(&self, group: &CaptionGroup) -> CoreResult<RenderedCaption> {
        let spec = &self.spec;
        spec.validate()
            .map_err(|e| CoreError::RenderFailed(format!("{:?}: {}", group.text, e)))?;
        let mask = self
            .rasterizer
            .rasterize(&group.text, spec.font_size as f32)?;

        let border = spec.border_size;
        let width = border
            .checked_mul(2)
            .and_then(|b| mask.width.checked_add(b))
            .ok_or_else(|| {
                CoreError::RenderFailed(format!(
                    "{:?}: {}px text with a {}px border overflows the canvas",
                    group.text, mask.width, border
                ))
            })?
            .max(1);
        let height = spec.canvas_height().max(1);

        let mut bitmap = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

        let origin_x = (width as i64 - mask.width as i64).div_euclid(2);
        let origin_y = (height as i64 - mask.height as i64).div_euclid(2);

        // Full square neighborhood, not just the outline ring.
        let reach = border as i64;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                stamp(&mut bitmap, &mask, origin_x + dx, origin_y + dy, spec.border_color);
            }
        }
        stamp(&mut bitmap, &mask, origin_x, origin_y, spec.text_color);

        let placement = Placement::centered(spec.frame, width, height);
        debug!(
            "Rendered {:?}: {}x{} at ({}, {})",
            group.text, width, height, placement.x, placement.y
        );

        Ok(RenderedCaption {
            bitmap,
            width,
            height,
            placement,
            group: group.clone(),
        })
    }

    /// Renders every group in order
    pub fn render_all(&self, groups: &[CaptionGroup]) -> CoreResult<Vec<RenderedCaption>> {
        groups.iter().map(|g| self.render(g)).collect()
    }
}

/// Composites `color` through `mask` onto `canvas` at (ox, oy), source-over
fn stamp(canvas: &mut RgbaImage, mask: &GlyphMask, ox: i64, oy: i64, color: Color) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    for my in 0..mask.height {
        let y = oy + my as i64;
        if y < 0 || y >= ch {
            continue;
        }
        for mx in 0..mask.width {
            let coverage = mask.get(mx, my);
            if coverage == 0 {
                continue;
            }
            let x = ox + mx as i64;
            if x < 0 || x >= cw {
                continue;
            }
            let pixel = canvas.get_pixel_mut(x as u32, y as u32);
            blend_over(pixel, color, coverage);
        }
    }
}

fn blend_over(dst: &mut Rgba<u8>, color: Color, coverage: u8) {
    let sa = (color.a as f32 / 255.0) * (coverage as f32 / 255.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let src = [color.r, color.g, color.b];
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::WordTiming;
    use crate::core::render::MAX_BORDER_SIZE;
    use crate::core::text::testing::BlockFont;
    use crate::core::FrameSize;

    fn group(text: &str) -> CaptionGroup {
        let words: Vec<_> = text
            .split(' ')
            .enumerate()
            .map(|(i, w)| WordTiming::new(w, i as f64 * 0.3, i as f64 * 0.3 + 0.25))
            .collect();
        CaptionGroup::from_words(&words).unwrap()
    }

    fn renderer(border: u32) -> CaptionRenderer {
        let spec = RenderSpec::new(FrameSize::new(1080, 1920), 40)
            .with_border(border, Color::black());
        CaptionRenderer::new(spec, Arc::new(BlockFont::new(20)))
    }

    #[test]
    fn test_canvas_dimensions() {
        let rendered = renderer(8).render(&group("hi there")).unwrap();
        // 8 chars × 20px + 2×8
        assert_eq!(rendered.width, 176);
        // 120 + 16 + 20
        assert_eq!(rendered.height, 156);
        assert_eq!(rendered.bitmap.dimensions(), (176, 156));
        assert_eq!(rendered.group.text, "hi there");
    }

    #[test]
    fn test_background_is_transparent() {
        let rendered = renderer(8).render(&group("a")).unwrap();
        assert_eq!(rendered.bitmap.get_pixel(0, 0)[3], 0);
        assert_eq!(rendered.bitmap.get_pixel(0, rendered.height - 1)[3], 0);
    }

    #[test]
    fn test_text_centered_with_border_around() {
        let rendered = renderer(4).render(&group("a")).unwrap();
        // canvas 28 × (120 + 8 + 20) = 148; text 20×40 at (4, 54)
        let (w, h) = (rendered.width, rendered.height);
        assert_eq!((w, h), (28, 148));

        let center = rendered.bitmap.get_pixel(14, 74);
        assert_eq!(*center, Rgba([255, 255, 255, 255]));

        // Border band left of the glyph and above it.
        assert_eq!(*rendered.bitmap.get_pixel(1, 74), Rgba([0, 0, 0, 255]));
        assert_eq!(*rendered.bitmap.get_pixel(14, 51), Rgba([0, 0, 0, 255]));

        // Outside the border reach stays transparent.
        assert_eq!(rendered.bitmap.get_pixel(14, 49)[3], 0);
    }

    #[test]
    fn test_border_fills_square_corners() {
        let rendered = renderer(4).render(&group("a")).unwrap();
        // Glyph spans x 4..24, y 54..94. Diagonal corner offset (-4, -4)
        // is only covered by a full square neighborhood.
        assert_eq!(*rendered.bitmap.get_pixel(0, 50), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_zero_border() {
        let rendered = renderer(0).render(&group("ab")).unwrap();
        assert_eq!(rendered.width, 40);
        assert!(rendered
            .bitmap
            .pixels()
            .all(|p| p[3] == 0 || *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_oversized_border_fails_without_panicking() {
        let err = renderer(u32::MAX).render(&group("hi")).unwrap_err();
        assert!(matches!(err, CoreError::RenderFailed(_)));

        let err = renderer(MAX_BORDER_SIZE + 1).render(&group("hi")).unwrap_err();
        assert!(matches!(err, CoreError::RenderFailed(_)));
    }

    #[test]
    fn test_largest_border_renders() {
        let rendered = renderer(MAX_BORDER_SIZE).render(&group("a")).unwrap();
        assert_eq!(rendered.width, 20 + 2 * MAX_BORDER_SIZE);
        assert_eq!(rendered.height, 120 + 2 * MAX_BORDER_SIZE + 20);
    }

    #[test]
    fn test_placement_centered_on_frame() {
        let rendered = renderer(8).render(&group("hi there")).unwrap();
        assert_eq!(rendered.placement.x, (1080 - 176) / 2);
        assert_eq!(rendered.placement.y, 960 - 78);
        assert_eq!(rendered.placement.width, rendered.width);
    }

    #[test]
    fn test_render_all_preserves_order() {
        let groups = vec![group("one"), group("two three")];
        let rendered = renderer(2).render_all(&groups).unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[1].group.text, "two three");
    }

    #[test]
    fn test_blend_over_transparent_destination() {
        let mut px = Rgba([0, 0, 0, 0]);
        blend_over(&mut px, Color::rgb(200, 100, 50), 255);
        assert_eq!(px, Rgba([200, 100, 50, 255]));

        let mut half = Rgba([0, 0, 0, 0]);
        blend_over(&mut half, Color::white(), 128);
        assert_eq!(half, Rgba([255, 255, 255, 128]));
    }

    #[test]
    fn test_png_encoding() {
        let rendered = renderer(2).render(&group("ok")).unwrap();
        let bytes = rendered.encode_png().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caption.png");
        rendered.write_png(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }
}
