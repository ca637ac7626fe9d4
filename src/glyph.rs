//! Glyph rasterization with a silent font fallback chain.
//!
//! A TTF/OTF face is loaded from an explicit path or from a short list of
//! well-known system font locations. When nothing loads, a built-in 5×7
//! bitmap face is used instead so generation always succeeds.

use rusttype::{point, Font, Scale};
use std::fs;
use std::path::{Path, PathBuf};

/// System font locations probed when no font path is given, in order.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A typeface the generator can rasterize text with.
pub enum Face {
    Truetype(Font<'static>),
    Builtin,
}

impl Face {
    /// Load a typeface, trying the custom path first, then the system font
    /// list. Every failure is swallowed; the built-in bitmap face is the
    /// final fallback.
    pub fn load(custom: Option<&Path>) -> Face {
        let candidates = custom
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONT_PATHS.iter().map(PathBuf::from));

        for path in candidates {
            if let Ok(data) = fs::read(&path) {
                if let Some(font) = Font::try_from_vec(data) {
                    return Face::Truetype(font);
                }
            }
        }

        Face::Builtin
    }

    /// Rasterize `text` at roughly `px` pixels tall into a coverage map
    /// cropped to the inked bounding box.
    pub fn raster(&self, text: &str, px: f32) -> Raster {
        match self {
            Face::Truetype(font) => raster_truetype(font, text, px),
            Face::Builtin => raster_builtin(text, px),
        }
    }
}

/// Grayscale coverage map of a rasterized piece of text.
pub struct Raster {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl Raster {
    fn new(width: u32, height: u32) -> Raster {
        Raster {
            width,
            height,
            coverage: vec![0; (width * height) as usize],
        }
    }

    fn empty() -> Raster {
        Raster::new(0, 0)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        self.coverage[(y * self.width + x) as usize]
    }
}

fn raster_truetype(font: &Font<'static>, text: &str, px: f32) -> Raster {
    let scale = Scale::uniform(px);
    let ascent = font.v_metrics(scale).ascent;
    let glyphs: Vec<_> = font.layout(text, scale, point(0.0, ascent)).collect();

    // Inked bounding box across all glyphs; whitespace-only text has none.
    let boxes: Vec<_> = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .collect();
    let Some(first) = boxes.first() else {
        return Raster::empty();
    };
    let mut min = first.min;
    let mut max = first.max;
    for b in &boxes {
        min.x = min.x.min(b.min.x);
        min.y = min.y.min(b.min.y);
        max.x = max.x.max(b.max.x);
        max.y = max.y.max(b.max.y);
    }

    let width = (max.x - min.x) as u32;
    let height = (max.y - min.y) as u32;
    let mut raster = Raster::new(width, height);

    for g in &glyphs {
        if let Some(bb) = g.pixel_bounding_box() {
            g.draw(|gx, gy, v| {
                let x = gx as i32 + bb.min.x - min.x;
                let y = gy as i32 + bb.min.y - min.y;
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    let idx = (y as u32 * width + x as u32) as usize;
                    let level = (v * 255.0) as u8;
                    raster.coverage[idx] = raster.coverage[idx].max(level);
                }
            });
        }
    }

    raster
}

fn raster_builtin(text: &str, px: f32) -> Raster {
    // Integer upscaling of the 5×7 cells; a cell is 8px tall in the original
    // design grid, so the glyph ends up close to the requested height.
    let scale = ((px / 8.0) as u32).max(1);
    let cells: Vec<[u8; 7]> = text.chars().map(builtin_rows).collect();
    if cells.is_empty() {
        return Raster::empty();
    }

    // 5 columns per cell plus one column of spacing, no trailing space.
    let width = (cells.len() as u32 * 6 - 1) * scale;
    let height = 7 * scale;
    let mut raster = Raster::new(width, height);

    for (i, rows) in cells.iter().enumerate() {
        let left = i as u32 * 6 * scale;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..5u32 {
                if bits & (0b10000 >> col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = left + col * scale + dx;
                        let y = row as u32 * scale + dy;
                        raster.coverage[(y * width + x) as usize] = 255;
                    }
                }
            }
        }
    }

    raster
}

/// Row bitmaps of the built-in face. Letters are case-folded; anything
/// outside A-Z, 0-9 and space renders as a filled block.
fn builtin_rows(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        ' ' => [0; 7],
        c @ 'A'..='Z' => LETTER_ROWS[(c as u8 - b'A') as usize],
        c @ '0'..='9' => DIGIT_ROWS[(c as u8 - b'0') as usize],
        _ => [0b11111; 7],
    }
}

#[rustfmt::skip]
const LETTER_ROWS: [[u8; 7]; 26] = [
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // B
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // C
    [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110], // D
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // F
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110], // G
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // M
    [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // W
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // X
    [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // Z
];

#[rustfmt::skip]
const DIGIT_ROWS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // 2
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // 3
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // 5
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // 7
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // 9
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_raster_has_expected_dimensions() {
        let raster = Face::Builtin.raster("F", 16.0);
        // 16px -> scale 2, one 5-column cell
        assert_eq!(raster.width(), 10);
        assert_eq!(raster.height(), 14);
    }

    #[test]
    fn builtin_raster_is_not_blank() {
        let raster = Face::Builtin.raster("F", 64.0);
        let inked = (0..raster.height())
            .flat_map(|y| (0..raster.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| raster.coverage_at(x, y) > 0)
            .count();
        assert!(inked > 0, "built-in 'F' should produce inked pixels");
    }

    #[test]
    fn builtin_face_is_case_insensitive() {
        assert_eq!(builtin_rows('f'), builtin_rows('F'));
    }

    #[test]
    fn unknown_characters_render_as_blocks() {
        assert_eq!(builtin_rows('ß'), [0b11111; 7]);
    }

    #[test]
    fn multi_character_text_widens_the_raster() {
        let single = Face::Builtin.raster("A", 32.0);
        let double = Face::Builtin.raster("AB", 32.0);
        assert!(double.width() > single.width());
        assert_eq!(double.height(), single.height());
    }

    #[test]
    fn empty_text_yields_empty_raster() {
        let raster = Face::Builtin.raster("", 32.0);
        assert_eq!(raster.width(), 0);
        assert_eq!(raster.height(), 0);
    }

    #[test]
    fn missing_font_path_falls_back_silently() {
        let face = Face::load(Some(Path::new("/nonexistent/font.ttf")));
        // Depending on the host either a system font or the built-in face
        // loads; either way a raster must come back non-panicking.
        let raster = face.raster("F", 32.0);
        assert!(raster.width() > 0);
    }
}
