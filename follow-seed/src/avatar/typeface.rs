use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

/// Pixel size the numeral is set at with a real font
pub const PREFERRED_SIZE: f32 = 80.0;

/// Bold sans faces commonly installed on Linux, macOS and Windows
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Built-in face: 5x7 cells per digit, each cell `FALLBACK_SCALE` pixels square
const GLYPH_COLUMNS: u32 = 5;
const GLYPH_ROWS: u32 = 7;
pub const FALLBACK_SCALE: u32 = 8;

// One byte per row, low five bits, MSB on the left
const DIGIT_GLYPHS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

/// Face used for the avatar numeral.
///
/// Resolution is an explicit capability check: the first candidate font that
/// exists and parses becomes `Preferred`, otherwise the built-in bitmap face
/// is used. A missing font never fails the run.
pub enum Typeface {
    Preferred { font: FontVec, source: PathBuf },
    Fallback,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::Preferred { source, .. } => {
                f.debug_struct("Preferred").field("source", source).finish()
            }
            Typeface::Fallback => f.write_str("Fallback"),
        }
    }
}

impl Typeface {
    /// Configured font first, then the well-known system locations
    pub fn candidates(configured: Option<&Path>) -> Vec<PathBuf> {
        configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from))
            .collect()
    }

    pub fn resolve(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            if !path.is_file() {
                tracing::debug!("Font candidate not present: {}", path.display());
                continue;
            }

            let data = match std::fs::read(path) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("Skipping unreadable font {}: {}", path.display(), e);
                    continue;
                }
            };

            match FontVec::try_from_vec(data) {
                Ok(font) => {
                    tracing::info!("Using font {}", path.display());
                    return Typeface::Preferred {
                        font,
                        source: path.clone(),
                    };
                }
                Err(e) => {
                    tracing::warn!("Skipping unparseable font {}: {}", path.display(), e);
                }
            }
        }

        tracing::warn!("No usable font found, falling back to the built-in digit face");
        Typeface::Fallback
    }

    pub fn describe(&self) -> String {
        match self {
            Typeface::Preferred { source, .. } => format!("{} @ {}px", source.display(), PREFERRED_SIZE),
            Typeface::Fallback => format!("built-in 5x7 digits x{}", FALLBACK_SCALE),
        }
    }

    /// Rendered width and height of `text`
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            Typeface::Preferred { font, .. } => text_size(PxScale::from(PREFERRED_SIZE), font, text),
            Typeface::Fallback => {
                let chars = text.chars().count() as u32;
                if chars == 0 {
                    return (0, 0);
                }
                // One blank column between characters
                let width = (chars * GLYPH_COLUMNS + (chars - 1)) * FALLBACK_SCALE;
                (width, GLYPH_ROWS * FALLBACK_SCALE)
            }
        }
    }

    /// Draw `text` with its top-left at (x, y)
    pub fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, text: &str) {
        match self {
            Typeface::Preferred { font, .. } => {
                draw_text_mut(canvas, color, x, y, PxScale::from(PREFERRED_SIZE), font, text);
            }
            Typeface::Fallback => draw_bitmap_text(canvas, x, y, color, text),
        }
    }
}

fn draw_bitmap_text(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, text: &str) {
    let cell = FALLBACK_SCALE as i32;
    let advance = (GLYPH_COLUMNS as i32 + 1) * cell;

    for (position, ch) in text.chars().enumerate() {
        // Non-digits advance as blanks
        let Some(glyph) = ch.to_digit(10).map(|d| &DIGIT_GLYPHS[d as usize]) else {
            continue;
        };
        let origin_x = x + position as i32 * advance;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_COLUMNS {
                if bits & (1 << (GLYPH_COLUMNS - 1 - col)) == 0 {
                    continue;
                }
                let rect = Rect::at(origin_x + col as i32 * cell, y + row as i32 * cell)
                    .of_size(FALLBACK_SCALE, FALLBACK_SCALE);
                draw_filled_rect_mut(canvas, rect, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_candidates_fall_back() {
        let candidates = vec![
            PathBuf::from("/definitely/not/here.ttf"),
            PathBuf::from("/also/missing.otf"),
        ];
        let face = Typeface::resolve(&candidates);
        assert!(matches!(face, Typeface::Fallback));
    }

    #[test]
    fn test_unparseable_font_is_skipped() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").expect("Failed to write bogus font");

        let face = Typeface::resolve(&[bogus]);
        assert!(matches!(face, Typeface::Fallback));
    }

    #[test]
    fn test_configured_font_is_tried_first() {
        let configured = PathBuf::from("/opt/fonts/custom.ttf");
        let candidates = Typeface::candidates(Some(&configured));
        assert_eq!(candidates[0], configured);
        assert_eq!(candidates.len(), SYSTEM_FONT_CANDIDATES.len() + 1);

        assert_eq!(Typeface::candidates(None).len(), SYSTEM_FONT_CANDIDATES.len());
    }

    #[test]
    fn test_fallback_measure() {
        let face = Typeface::Fallback;
        assert_eq!(face.measure(""), (0, 0));
        assert_eq!(face.measure("7"), (40, 56));
        // 4 glyphs of 5 columns plus 3 gaps, 8px cells
        assert_eq!(face.measure("1000"), (184, 56));
    }

    #[test]
    fn test_fallback_draws_digit_cells() {
        let mut canvas = RgbaImage::from_pixel(60, 60, Rgba([0, 0, 0, 255]));
        let white = Rgba([255, 255, 255, 255]);
        Typeface::Fallback.draw(&mut canvas, 0, 0, white, "1");

        // Top row of "1" is 00100: only the middle cell is set
        assert_eq!(*canvas.get_pixel(2 * 8 + 3, 3), white);
        assert_eq!(*canvas.get_pixel(3, 3), Rgba([0, 0, 0, 255]));
        // Bottom row is 01110
        assert_eq!(*canvas.get_pixel(8 + 3, 6 * 8 + 3), white);
    }

    #[test]
    fn test_system_font_measures_and_draws() {
        let face = Typeface::resolve(&Typeface::candidates(None));
        let Typeface::Preferred { source, .. } = &face else {
            eprintln!("no system font installed, skipping");
            return;
        };

        let (width, height) = face.measure("1000");
        assert!(width > 0 && height > 0, "{} measured empty", source.display());
        assert!(width < 400 && height < 120);

        let background = Rgba([0, 0, 0, 255]);
        let mut canvas = RgbaImage::from_pixel(400, 120, background);
        face.draw(&mut canvas, 0, 0, Rgba([255, 255, 255, 255]), "1000");
        assert!(canvas.pixels().any(|p| p[0] > 128), "{} drew nothing", source.display());
        assert!(face.describe().contains("80px"));
    }

    #[test]
    fn test_fallback_clips_at_canvas_edge() {
        let mut canvas = RgbaImage::new(10, 10);
        Typeface::Fallback.draw(&mut canvas, -20, -20, Rgba([255, 0, 0, 255]), "88");
    }
}
