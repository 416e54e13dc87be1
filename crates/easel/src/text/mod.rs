//! Font loading, glyph rasterization and text tessellation.
//!
//! Glyph coverage lives in a CPU-side R8 atlas; the renderer uploads it when
//! the dirty flag is set. Texel (0,0) region is solid white so untextured
//! geometry can share the atlas pipeline by sampling `WHITE_UV`.
//!
//! Two rasterization paths: TTF/OTF fonts via fontdue, and a built-in 8x8
//! bitmap font so [`FontId::BUILTIN`] works with no files on disk.

mod builtin;

use std::collections::HashMap;
use std::path::Path;

use easel_core::{Color, DrawBuffer, FontId, Vec2, Vertex};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::images::AssetError;

pub(crate) const ATLAS_SIZE: u32 = 1024;
const GLYPH_PADDING: u32 = 1;
/// Side of the solid-white block at the atlas origin.
const WHITE_BLOCK: u32 = 4;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
enum GlyphKey {
    Builtin(u8),
    Ttf { font: usize, glyph: u16, px: u32 },
}

#[derive(Debug, Copy, Clone)]
struct CachedGlyph {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
}

/// Shelf-packed R8 coverage atlas kept in main memory.
pub(crate) struct GlyphAtlas {
    pixels: Vec<u8>,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
    dirty: bool,
    cache: HashMap<GlyphKey, CachedGlyph>,
}

impl GlyphAtlas {
    fn new() -> Self {
        let mut atlas = Self {
            pixels: vec![0; (ATLAS_SIZE * ATLAS_SIZE) as usize],
            cursor_x: WHITE_BLOCK + GLYPH_PADDING,
            cursor_y: 0,
            row_height: WHITE_BLOCK,
            full: false,
            dirty: true,
            cache: HashMap::new(),
        };
        for y in 0..WHITE_BLOCK {
            for x in 0..WHITE_BLOCK {
                atlas.pixels[(y * ATLAS_SIZE + x) as usize] = 0xFF;
            }
        }
        atlas
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Clears and returns the dirty flag; the renderer re-uploads when true.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Copies `bitmap` (w*h coverage bytes) into the next free slot.
    fn place(&mut self, bitmap: &[u8], w: u32, h: u32) -> Option<([f32; 2], [f32; 2])> {
        if self.full || w == 0 || h == 0 {
            return None;
        }
        if self.cursor_x + w + GLYPH_PADDING > ATLAS_SIZE {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = 0;
            self.row_height = 0;
        }
        if self.cursor_y + h + GLYPH_PADDING > ATLAS_SIZE {
            log::warn!("glyph atlas is full ({ATLAS_SIZE}x{ATLAS_SIZE}); some glyphs will not render");
            self.full = true;
            return None;
        }

        let (gx, gy) = (self.cursor_x, self.cursor_y);
        for row in 0..h {
            let src = (row * w) as usize;
            let dst = ((gy + row) * ATLAS_SIZE + gx) as usize;
            self.pixels[dst..dst + w as usize]
                .copy_from_slice(&bitmap[src..src + w as usize]);
        }
        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        self.dirty = true;

        let size = ATLAS_SIZE as f32;
        Some((
            [gx as f32 / size, gy as f32 / size],
            [(gx + w) as f32 / size, (gy + h) as f32 / size],
        ))
    }
}

/// Loaded fonts plus the shared glyph atlas.
///
/// Slot 0 is reserved for the built-in bitmap font and never holds a
/// fontdue font.
pub(crate) struct TextEngine {
    fonts: Vec<Option<fontdue::Font>>,
    by_path: HashMap<String, FontId>,
    pub atlas: GlyphAtlas,
}

impl TextEngine {
    pub fn new() -> Self {
        Self {
            fonts: vec![None],
            by_path: HashMap::new(),
            atlas: GlyphAtlas::new(),
        }
    }

    /// Loads a TTF/OTF file, or returns [`FontId::BUILTIN`] for an empty
    /// path. Loading the same path twice returns the same id.
    pub fn load_font(&mut self, path: &str) -> Result<FontId, AssetError> {
        if path.is_empty() {
            return Ok(FontId::BUILTIN);
        }
        if let Some(&id) = self.by_path.get(path) {
            return Ok(id);
        }
        let bytes = std::fs::read(Path::new(path))
            .map_err(|source| AssetError::Io { path: path.to_string(), source })?;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|msg| AssetError::Font { path: path.to_string(), msg: msg.to_string() })?;
        let id = FontId(self.fonts.len());
        self.fonts.push(Some(font));
        self.by_path.insert(path.to_string(), id);
        Ok(id)
    }

    fn font(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0).and_then(|f| f.as_ref())
    }

    /// Width of `text` at `height` logical pixels, before any x scaling.
    pub fn measure_width(&self, text: &str, font: FontId, height: f32) -> f32 {
        match self.font(font) {
            None => text.chars().count() as f32 * height,
            Some(font) => {
                let px = height.max(1.0);
                let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
                layout.reset(&LayoutSettings::default());
                layout.append(std::slice::from_ref(font), &TextStyle::new(text, px, 0));
                layout
                    .glyphs()
                    .iter()
                    .map(|g| {
                        let m = font.metrics_indexed(g.key.glyph_index, px);
                        g.x - m.xmin as f32 + m.advance_width
                    })
                    .fold(0.0_f32, f32::max)
            }
        }
    }

    /// Tessellates `text` into `out` with its top-left at `(x, y)`.
    ///
    /// `x_scale` stretches glyph placement horizontally around `x`; it is 1.0
    /// everywhere except fit-to-rectangle text.
    pub fn tessellate(
        &mut self,
        out: &mut DrawBuffer,
        text: &str,
        x: f32,
        y: f32,
        height: f32,
        x_scale: f32,
        color: Color,
        font: FontId,
    ) {
        if text.is_empty() || height <= 0.0 || x_scale <= 0.0 {
            return;
        }
        if self.font(font).is_some() {
            self.tessellate_ttf(out, text, x, y, height, x_scale, color, font);
        } else {
            if font != FontId::BUILTIN {
                log::error!("unknown font id {}; using the built-in font", font.0);
            }
            self.tessellate_builtin(out, text, x, y, height, x_scale, color);
        }
    }

    fn tessellate_builtin(
        &mut self,
        out: &mut DrawBuffer,
        text: &str,
        x: f32,
        y: f32,
        height: f32,
        x_scale: f32,
        color: Color,
    ) {
        let cell = height;
        let mut pen_x = x;
        for c in text.chars() {
            if c != ' ' {
                let cached = match self.cache_builtin(c) {
                    Some(g) => g,
                    None => {
                        pen_x += cell * x_scale;
                        continue;
                    }
                };
                push_glyph_quad(
                    out,
                    pen_x,
                    y,
                    cell * x_scale,
                    cell,
                    cached.uv_min,
                    cached.uv_max,
                    color,
                );
            }
            pen_x += cell * x_scale;
        }
    }

    fn cache_builtin(&mut self, c: char) -> Option<CachedGlyph> {
        let byte = match u8::try_from(c as u32) {
            Ok(b) if (builtin::FIRST_CHAR..=builtin::LAST_CHAR).contains(&b) => b,
            _ => b'?',
        };
        let key = GlyphKey::Builtin(byte);
        if let Some(&g) = self.atlas.cache.get(&key) {
            return Some(g);
        }
        // Expand the 1-bit rows to coverage bytes.
        let rows = builtin::glyph_rows(byte as char);
        let side = builtin::GLYPH_SIZE as u32;
        let mut bitmap = [0u8; builtin::GLYPH_SIZE * builtin::GLYPH_SIZE];
        for (ry, &row) in rows.iter().enumerate() {
            for bit in 0..8 {
                if row & (0x80 >> bit) != 0 {
                    bitmap[ry * 8 + bit] = 0xFF;
                }
            }
        }
        let (uv_min, uv_max) = self.atlas.place(&bitmap, side, side)?;
        let glyph = CachedGlyph { uv_min, uv_max };
        self.atlas.cache.insert(key, glyph);
        Some(glyph)
    }

    fn tessellate_ttf(
        &mut self,
        out: &mut DrawBuffer,
        text: &str,
        x: f32,
        y: f32,
        height: f32,
        x_scale: f32,
        color: Color,
        font_id: FontId,
    ) {
        let px = height.max(1.0);

        // Snapshot placement first so the layout borrow ends before the
        // atlas is mutated.
        let placements: Vec<(u16, f32, f32, f32, f32)> = {
            let Some(font) = self.font(font_id) else { return };
            let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
            layout.reset(&LayoutSettings { x, y, ..LayoutSettings::default() });
            layout.append(std::slice::from_ref(font), &TextStyle::new(text, px, 0));
            layout
                .glyphs()
                .iter()
                .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
                .map(|g| (g.key.glyph_index, g.x, g.y, g.width as f32, g.height as f32))
                .collect()
        };

        for (glyph_index, gx, gy, gw, gh) in placements {
            let key = GlyphKey::Ttf {
                font: font_id.0,
                glyph: glyph_index,
                px: px.round() as u32,
            };
            let cached = match self.atlas.cache.get(&key) {
                Some(&g) => g,
                None => {
                    let Some(font) = self.font(font_id) else { return };
                    let (metrics, bitmap) = font.rasterize_indexed(glyph_index, px);
                    if metrics.width == 0 || metrics.height == 0 {
                        continue;
                    }
                    let Some((uv_min, uv_max)) =
                        self.atlas.place(&bitmap, metrics.width as u32, metrics.height as u32)
                    else {
                        continue;
                    };
                    let glyph = CachedGlyph { uv_min, uv_max };
                    self.atlas.cache.insert(key, glyph);
                    glyph
                }
            };
            // Layout already positioned the bitmap; apply the x stretch
            // around the text origin.
            let qx = x + (gx - x) * x_scale;
            push_glyph_quad(out, qx, gy, gw * x_scale, gh, cached.uv_min, cached.uv_max, color);
        }
    }
}

fn push_glyph_quad(
    out: &mut DrawBuffer,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: Color,
) {
    let tl = Vertex { pos: Vec2::new(x, y), uv: uv_min, color };
    let tr = Vertex { pos: Vec2::new(x + w, y), uv: [uv_max[0], uv_min[1]], color };
    let br = Vertex { pos: Vec2::new(x + w, y + h), uv: uv_max, color };
    let bl = Vertex { pos: Vec2::new(x, y + h), uv: [uv_min[0], uv_max[1]], color };
    out.push(None, &[tl, tr, br, tl, br, bl]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{color, WHITE_UV};

    #[test]
    fn atlas_starts_with_white_block() {
        let atlas = GlyphAtlas::new();
        // WHITE_UV samples inside the solid block at the origin.
        let px = (WHITE_UV[0] * ATLAS_SIZE as f32) as usize;
        let py = (WHITE_UV[1] * ATLAS_SIZE as f32) as usize;
        assert_eq!(atlas.pixels[py * ATLAS_SIZE as usize + px], 0xFF);
    }

    #[test]
    fn atlas_upload_flag_is_one_shot() {
        let mut atlas = GlyphAtlas::new();
        assert!(atlas.take_dirty());
        assert!(!atlas.take_dirty());
        atlas.place(&[0xFF; 4], 2, 2).unwrap();
        assert!(atlas.take_dirty());
    }

    #[test]
    fn empty_path_maps_to_builtin_font() {
        let mut engine = TextEngine::new();
        assert_eq!(engine.load_font("").unwrap(), FontId::BUILTIN);
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let mut engine = TextEngine::new();
        assert!(engine.load_font("/no/such/font.ttf").is_err());
    }

    #[test]
    fn builtin_text_produces_two_triangles_per_visible_char() {
        let mut engine = TextEngine::new();
        let mut buf = DrawBuffer::default();
        engine.tessellate(&mut buf, "ab c", 0.0, 0.0, 20.0, 1.0, color::BLACK, FontId::BUILTIN);
        // Spaces do not emit geometry.
        assert_eq!(buf.triangle_count(), 6);
    }

    #[test]
    fn builtin_measure_is_monospace() {
        let engine = TextEngine::new();
        assert_eq!(engine.measure_width("abcd", FontId::BUILTIN, 10.0), 40.0);
    }

    #[test]
    fn empty_text_is_a_no_op() {
        let mut engine = TextEngine::new();
        let mut buf = DrawBuffer::default();
        engine.tessellate(&mut buf, "", 5.0, 5.0, 20.0, 1.0, color::BLACK, FontId::BUILTIN);
        engine.tessellate(&mut buf, "x", 5.0, 5.0, 0.0, 1.0, color::BLACK, FontId::BUILTIN);
        assert_eq!(buf.triangle_count(), 0);
    }
}
