//! Font provider seam and the fontdue-backed implementation.

use std::collections::HashMap;

use mullion_graphics::{ImageData, UiRect};

/// One glyph: destination rectangle relative to the run origin and the
/// source rectangle inside the atlas, both in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphQuad {
    pub dst: UiRect,
    pub src: UiRect,
}

/// The product of shaping one string: the atlas holding every referenced
/// glyph and the quads to draw. The atlas image identity changes whenever
/// new glyphs were rasterized, so texture caches pick up the new pixels.
#[derive(Clone, Debug)]
pub struct GlyphRun {
    pub atlas: ImageData,
    pub glyphs: Vec<GlyphQuad>,
}

/// Turns strings into positioned glyph quads. Consumed by the text
/// packet path at record time.
pub trait FontProvider {
    fn render_text(&mut self, text: &str) -> GlyphRun;
}

impl<P: FontProvider + ?Sized> FontProvider for Box<P> {
    fn render_text(&mut self, text: &str) -> GlyphRun {
        (**self).render_text(text)
    }
}

/// Provider used when no font was configured: every run comes back
/// empty, so text packets draw nothing.
pub struct NullFonts {
    empty_atlas: ImageData,
}

impl NullFonts {
    pub fn new() -> Self {
        Self {
            empty_atlas: ImageData::solid(1, 1, [0, 0, 0, 0]),
        }
    }
}

impl Default for NullFonts {
    fn default() -> Self {
        Self::new()
    }
}

impl FontProvider for NullFonts {
    fn render_text(&mut self, _text: &str) -> GlyphRun {
        GlyphRun {
            atlas: self.empty_atlas.clone(),
            glyphs: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum FontError {
    Parse { message: &'static str },
}

impl std::fmt::Display for FontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontError::Parse { message } => write!(f, "font parse failed: {message}"),
        }
    }
}

impl std::error::Error for FontError {}

#[derive(Clone, Copy)]
struct CachedGlyph {
    src: UiRect,
    xmin: i32,
    ymin: i32,
    advance: f32,
}

/// Rasterizes glyphs with fontdue into a shelf-packed RGBA atlas,
/// caching per character. The atlas starts small and doubles in height
/// when a shelf no longer fits.
pub struct FontLibrary {
    font: fontdue::Font,
    px: f32,
    ascent: i32,
    cache: HashMap<char, CachedGlyph>,
    atlas_width: u32,
    atlas_height: u32,
    atlas_pixels: Vec<u8>,
    shelf_x: u32,
    shelf_y: u32,
    shelf_height: u32,
    image: Option<ImageData>,
}

const ATLAS_START: u32 = 256;
const GLYPH_PAD: u32 = 1;

impl FontLibrary {
    pub fn from_bytes(bytes: &[u8], px: f32) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|message| FontError::Parse { message })?;
        let ascent = font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent.round() as i32)
            .unwrap_or_else(|| px.round() as i32);
        Ok(Self {
            font,
            px,
            ascent,
            cache: HashMap::new(),
            atlas_width: ATLAS_START,
            atlas_height: ATLAS_START,
            atlas_pixels: vec![0; (ATLAS_START * ATLAS_START * 4) as usize],
            shelf_x: 0,
            shelf_y: 0,
            shelf_height: 0,
            image: None,
        })
    }

    pub fn line_height(&self) -> i32 {
        self.font
            .horizontal_line_metrics(self.px)
            .map(|m| m.new_line_size.round() as i32)
            .unwrap_or_else(|| self.px.round() as i32)
    }

    fn grow_atlas(&mut self) {
        let new_height = self.atlas_height * 2;
        self.atlas_pixels
            .resize((self.atlas_width * new_height * 4) as usize, 0);
        self.atlas_height = new_height;
    }

    /// Claims an atlas slot for a glyph bitmap and blits the coverage in
    /// as white-with-alpha pixels.
    fn pack(&mut self, width: u32, height: u32, coverage: &[u8]) -> UiRect {
        if self.shelf_x + width + GLYPH_PAD > self.atlas_width {
            self.shelf_y += self.shelf_height + GLYPH_PAD;
            self.shelf_x = 0;
            self.shelf_height = 0;
        }
        while self.shelf_y + height + GLYPH_PAD > self.atlas_height {
            self.grow_atlas();
        }

        let x = self.shelf_x;
        let y = self.shelf_y;
        self.shelf_x += width + GLYPH_PAD;
        self.shelf_height = self.shelf_height.max(height);

        for row in 0..height {
            for col in 0..width {
                let alpha = coverage[(row * width + col) as usize];
                let offset = (((y + row) * self.atlas_width + x + col) * 4) as usize;
                self.atlas_pixels[offset] = 255;
                self.atlas_pixels[offset + 1] = 255;
                self.atlas_pixels[offset + 2] = 255;
                self.atlas_pixels[offset + 3] = alpha;
            }
        }
        UiRect::new(x as i32, y as i32, width as i32, height as i32)
    }

    fn glyph(&mut self, ch: char) -> CachedGlyph {
        if let Some(cached) = self.cache.get(&ch) {
            return *cached;
        }
        let (metrics, coverage) = self.font.rasterize(ch, self.px);
        let src = if metrics.width == 0 || metrics.height == 0 {
            UiRect::ZERO
        } else {
            self.image = None;
            self.pack(metrics.width as u32, metrics.height as u32, &coverage)
        };
        let cached = CachedGlyph {
            src,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            advance: metrics.advance_width,
        };
        self.cache.insert(ch, cached);
        cached
    }

    fn atlas_image(&mut self) -> ImageData {
        if let Some(image) = &self.image {
            return image.clone();
        }
        let image = ImageData::from_rgba8(
            self.atlas_width,
            self.atlas_height,
            self.atlas_pixels.clone(),
        );
        self.image = Some(image.clone());
        image
    }
}

impl FontProvider for FontLibrary {
    fn render_text(&mut self, text: &str) -> GlyphRun {
        let mut glyphs = Vec::with_capacity(text.len());
        let mut pen_x = 0.0f32;
        let baseline = self.ascent;
        for ch in text.chars() {
            let glyph = self.glyph(ch);
            if !glyph.src.is_empty() {
                let x = pen_x.round() as i32 + glyph.xmin;
                let y = baseline - glyph.ymin - glyph.src.height;
                glyphs.push(GlyphQuad {
                    dst: UiRect::new(x, y, glyph.src.width, glyph.src.height),
                    src: glyph.src,
                });
            }
            pen_x += glyph.advance;
        }
        GlyphRun {
            atlas: self.atlas_image(),
            glyphs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_fonts_shape_to_an_empty_run() {
        let mut fonts = NullFonts::new();
        let run = fonts.render_text("anything at all");
        assert!(run.glyphs.is_empty());
        // the atlas identity is stable, no texture churn frame to frame
        assert_eq!(run.atlas.id(), fonts.render_text("more").atlas.id());
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let error = FontLibrary::from_bytes(&[0, 1, 2, 3], 14.0).err();
        assert!(matches!(error, Some(FontError::Parse { .. })));
    }
}
