//! Software renderer using tiny-skia and cosmic-text
//!
//! Everything is drawn on the CPU straight into the platform's RGBA pixel
//! buffer. Shapes are free functions over a [`Surface`]; text needs the
//! font system and a shaping cache, so it lives on [`Renderer`].

use std::collections::HashMap;

use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, LayoutGlyph, Metrics, Shaping,
    SwashCache, Weight,
};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, PixmapMut, Rect, Stroke,
    Transform,
};

use crate::utils::Bounds;

/// Shaped strings kept between frames. The readout cycles through one new
/// string per second, so the cache is simply dropped when it fills up.
const SHAPE_CACHE_LIMIT: usize = 64;

/// Line height relative to the font size
const LINE_HEIGHT: f32 = 1.2;

/// Text weight used by the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    fn cosmic(self) -> Weight {
        match self {
            FontWeight::Normal => Weight::NORMAL,
            FontWeight::Bold => Weight::BOLD,
        }
    }
}

/// Font size in tenths of a pixel, so scaled sizes hash stably
fn size_key(font_size: f32) -> u32 {
    (font_size * 10.0).round() as u32
}

/// Borrowed RGBA pixel buffer of a known size
pub struct Surface<'a> {
    pub data: &'a mut [u8],
    pub width: u32,
    pub height: u32,
}

impl<'a> Surface<'a> {
    pub fn new(data: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    fn pixmap(&mut self) -> Option<PixmapMut<'_>> {
        PixmapMut::from_bytes(self.data, self.width, self.height)
    }
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

// ─────────────────────────────────────────────────────────────────────────────
// Shapes
// ─────────────────────────────────────────────────────────────────────────────

pub fn clear(surface: &mut Surface, color: Color) {
    if let Some(mut pixmap) = surface.pixmap() {
        pixmap.fill(color);
    }
}

pub fn fill_rect(surface: &mut Surface, area: Bounds, color: Color) {
    let (Some(mut pixmap), Some(rect)) = (
        surface.pixmap(),
        Rect::from_xywh(area.x, area.y, area.w, area.h),
    ) else {
        return;
    };
    pixmap.fill_rect(rect, &solid(color), Transform::identity(), None);
}

pub fn fill_rounded_rect(surface: &mut Surface, area: Bounds, radius: f32, color: Color) {
    let (Some(mut pixmap), Some(path)) = (surface.pixmap(), rounded_rect_path(area, radius))
    else {
        return;
    };
    pixmap.fill_path(
        &path,
        &solid(color),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
}

pub fn stroke_rounded_rect(
    surface: &mut Surface,
    area: Bounds,
    radius: f32,
    line_width: f32,
    color: Color,
) {
    let (Some(mut pixmap), Some(path)) = (surface.pixmap(), rounded_rect_path(area, radius))
    else {
        return;
    };
    let stroke = Stroke {
        width: line_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
}

/// Rectangle with quadratic corners; the radius is capped at half the
/// shorter side
fn rounded_rect_path(area: Bounds, radius: f32) -> Option<Path> {
    let Bounds { x, y, w, h } = area;
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    let (right, bottom) = (x + w, y + h);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.quad_to(right, y, right, y + r);
    pb.line_to(right, bottom - r);
    pb.quad_to(right, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.quad_to(x, bottom, x, bottom - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

// ─────────────────────────────────────────────────────────────────────────────
// Text
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ShapeKey {
    text: String,
    size: u32,
    weight: FontWeight,
}

struct ShapedText {
    glyphs: Vec<LayoutGlyph>,
    width: f32,
    height: f32,
}

/// Text shaping and glyph rasterization
pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    shaped: HashMap<ShapeKey, ShapedText>,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            shaped: HashMap::new(),
        }
    }

    fn shape(&mut self, text: &str, font_size: f32, weight: FontWeight) -> &ShapedText {
        let key = ShapeKey {
            text: text.to_string(),
            size: size_key(font_size),
            weight,
        };
        if !self.shaped.contains_key(&key) && self.shaped.len() >= SHAPE_CACHE_LIMIT {
            self.shaped.clear();
        }

        let font_system = &mut self.font_system;
        self.shaped.entry(key).or_insert_with(|| {
            let metrics = Metrics::new(font_size, font_size * LINE_HEIGHT);
            let mut buffer = Buffer::new(font_system, metrics);
            let attrs = Attrs::new()
                .family(Family::SansSerif)
                .weight(weight.cosmic());
            buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
            buffer.shape_until_scroll(font_system, false);

            let mut shaped = ShapedText {
                glyphs: Vec::new(),
                width: 0.0,
                height: 0.0,
            };
            for run in buffer.layout_runs() {
                shaped.width = shaped.width.max(run.line_w);
                shaped.height += run.line_height;
                shaped.glyphs.extend(run.glyphs.iter().cloned());
            }
            shaped
        })
    }

    /// Width and line height of `text`
    pub fn measure_text(&mut self, text: &str, font_size: f32, weight: FontWeight) -> (f32, f32) {
        let shaped = self.shape(text, font_size, weight);
        (shaped.width, shaped.height)
    }

    /// Draw `text` with its baseline at `y`
    pub fn draw_text(
        &mut self,
        surface: &mut Surface,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        weight: FontWeight,
        color: Color,
    ) {
        // Cloned out because rasterizing borrows the font system mutably
        let glyphs = self.shape(text, font_size, weight).glyphs.clone();
        let Some(mut pixmap) = surface.pixmap() else {
            return;
        };
        let ink = color.to_color_u8();
        let ink = CosmicColor::rgba(ink.red(), ink.green(), ink.blue(), ink.alpha());

        for glyph in &glyphs {
            let physical = glyph.physical((x, y), 1.0);
            let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical.cache_key)
            else {
                continue;
            };
            let mask = GlyphMask {
                coverage: &image.data,
                width: image.placement.width,
                height: image.placement.height,
            };
            mask.blend(
                &mut pixmap,
                physical.x + image.placement.left,
                physical.y - image.placement.top,
                ink,
            );
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// 8-bit coverage bitmap for one glyph
struct GlyphMask<'a> {
    coverage: &'a [u8],
    width: u32,
    height: u32,
}

impl GlyphMask<'_> {
    /// Source-over blend at (`left`, `top`), clipped to the pixmap
    fn blend(&self, pixmap: &mut PixmapMut, left: i32, top: i32, ink: CosmicColor) {
        let (pw, ph) = (pixmap.width() as i32, pixmap.height() as i32);
        let data = pixmap.data_mut();
        let ink_rgb = [ink.r(), ink.g(), ink.b()];

        for row in 0..self.height as i32 {
            let py = top + row;
            if !(0..ph).contains(&py) {
                continue;
            }
            for col in 0..self.width as i32 {
                let px = left + col;
                if !(0..pw).contains(&px) {
                    continue;
                }
                let Some(&cov) = self.coverage.get((row * self.width as i32 + col) as usize)
                else {
                    continue;
                };
                if cov == 0 {
                    continue;
                }

                let at = ((py * pw + px) * 4) as usize;
                let Some(pixel) = data.get_mut(at..at + 4) else {
                    continue;
                };
                let alpha = u32::from(cov) * u32::from(ink.a()) / 255;
                let keep = 255 - alpha;
                for (dst, src) in pixel.iter_mut().zip(ink_rgb) {
                    *dst = ((u32::from(src) * alpha + u32::from(*dst) * keep) / 255) as u8;
                }
                pixel[3] = (alpha + u32::from(pixel[3]) * keep / 255) as u8;
            }
        }
    }
}
