//! Deterministic placeholder avatars.
//!
//! Every avatar is a pure function of its index: a golden-angle background,
//! a motif picked by `index % 3`, and the index itself drawn in the middle.

pub mod color;
pub mod motif;
pub mod typeface;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use color::{background_rgb, hue_degrees};
pub use motif::{Motif, Shape};
pub use typeface::Typeface;

/// Avatars are square, this many pixels per side
pub const AVATAR_SIZE: u32 = 200;

/// Alpha the motif is composited with
pub const MOTIF_ALPHA: u8 = 180;

pub const JPEG_QUALITY: u8 = 75;

/// Offsets of the dark copies drawn beneath the numeral
const OUTLINE_OFFSETS: [(i32, i32); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];

#[derive(Error, Debug)]
pub enum AvatarError {
    #[error("Failed to write avatar {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode avatar {index}: {source}")]
    Encode {
        index: u32,
        #[source]
        source: image::ImageError,
    },

    #[error("Avatar index must be at least 1, got {0}")]
    IndexOutOfRange(u32),
}

pub type AvatarResult<T> = Result<T, AvatarError>;

/// File name for the avatar of `index`
pub fn avatar_file_name(index: u32) -> String {
    format!("{}.jpg", index)
}

pub struct AvatarRenderer {
    typeface: Typeface,
}

impl AvatarRenderer {
    pub fn new(typeface: Typeface) -> Self {
        Self { typeface }
    }

    pub fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// Render the avatar for `index` in memory
    pub fn render(&self, index: u32) -> AvatarResult<RgbImage> {
        if index == 0 {
            return Err(AvatarError::IndexOutOfRange(index));
        }

        let [r, g, b] = background_rgb(index);
        let mut canvas = RgbaImage::from_pixel(AVATAR_SIZE, AVATAR_SIZE, Rgba([r, g, b, 255]));

        let motif = Motif::for_index(index);
        let mut mask = GrayImage::new(AVATAR_SIZE, AVATAR_SIZE);
        for shape in motif.shapes(index) {
            shape.fill(&mut mask);
        }
        composite_white(&mut canvas, &mask, MOTIF_ALPHA);

        self.draw_numeral(&mut canvas, index);

        Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }

    fn draw_numeral(&self, canvas: &mut RgbaImage, index: u32) {
        let text = index.to_string();
        let (width, height) = self.typeface.measure(&text);
        let x = (AVATAR_SIZE as i32 - width as i32) / 2;
        let y = (AVATAR_SIZE as i32 - height as i32) / 2;

        let black = Rgba([0, 0, 0, 255]);
        for (dx, dy) in OUTLINE_OFFSETS {
            self.typeface.draw(canvas, x + dx, y + dy, black, &text);
        }
        self.typeface.draw(canvas, x, y, Rgba([255, 255, 255, 255]), &text);
    }

    /// Render and JPEG-encode the avatar for `index`
    pub fn render_jpeg(&self, index: u32) -> AvatarResult<Vec<u8>> {
        let image = self.render(index)?;
        encode_jpeg(&image).map_err(|source| AvatarError::Encode { index, source })
    }

    /// Write `{index}.jpg` into `dir`, creating the directory and replacing
    /// any existing file
    pub fn write_avatar(&self, dir: &Path, index: u32) -> AvatarResult<PathBuf> {
        let bytes = self.render_jpeg(index)?;

        fs::create_dir_all(dir).map_err(|source| AvatarError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(avatar_file_name(index));
        fs::write(&path, bytes).map_err(|source| AvatarError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Blend white over `canvas` wherever `mask` is set
fn composite_white(canvas: &mut RgbaImage, mask: &GrayImage, alpha: u8) {
    let alpha = u16::from(alpha);
    for (x, y, coverage) in mask.enumerate_pixels() {
        if coverage[0] == 0 {
            continue;
        }
        let pixel = canvas.get_pixel_mut(x, y);
        for channel in pixel.0.iter_mut().take(3) {
            let blended = (u16::from(*channel) * (255 - alpha) + 255 * alpha) / 255;
            *channel = blended as u8;
        }
    }
}

pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    encoder.encode_image(image)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use proptest::prelude::*;

    fn renderer() -> AvatarRenderer {
        AvatarRenderer::new(Typeface::Fallback)
    }

    #[test]
    fn test_render_dimensions_and_background() {
        let image = renderer().render(144).expect("Failed to render");

        assert_eq!(image.dimensions(), (AVATAR_SIZE, AVATAR_SIZE));
        assert_eq!(*image.get_pixel(0, 0), Rgb([228, 103, 103]));
        assert_eq!(*image.get_pixel(199, 199), Rgb(background_rgb(144)));
    }

    #[test]
    fn test_motif_is_blended_not_opaque() {
        // Index 1 draws a square from (110, 50) to (150, 90); its top-right
        // corner sits clear of the centred numeral
        let image = renderer().render(1).expect("Failed to render");
        let [r, g, b] = background_rgb(1);
        let expected = |c: u8| ((u16::from(c) * 75 + 255 * 180) / 255) as u8;

        assert_eq!(*image.get_pixel(148, 52), Rgb([expected(r), expected(g), expected(b)]));
    }

    #[test]
    fn test_numeral_has_white_fill_and_dark_outline() {
        let image = renderer().render(1).expect("Failed to render");
        // "1" is 40x56 centred at (80, 72); top row cell of the stem spans x 96..104
        assert_eq!(*image.get_pixel(100, 75), Rgb([255, 255, 255]));
        // Two pixels left of the stem's top cell is outline
        assert_eq!(*image.get_pixel(95, 75), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = renderer();
        for index in [1, 2, 3, 20, 999, 1000] {
            let first = renderer.render_jpeg(index).expect("Failed to render");
            let second = renderer.render_jpeg(index).expect("Failed to render");
            assert_eq!(first, second, "avatar {} differs between renders", index);
        }
    }

    #[test]
    fn test_system_font_render_is_deterministic() {
        let typeface = Typeface::resolve(&Typeface::candidates(None));
        if matches!(typeface, Typeface::Fallback) {
            return;
        }
        let renderer = AvatarRenderer::new(typeface);
        for index in [1, 20, 1000] {
            let first = renderer.render_jpeg(index).expect("Failed to render");
            let second = renderer.render_jpeg(index).expect("Failed to render");
            assert_eq!(first, second, "avatar {} differs between renders", index);
        }
    }

    proptest! {
        #[test]
        fn prop_render_is_deterministic(index in 1u32..=1000) {
            let renderer = renderer();
            let first = renderer.render_jpeg(index).expect("Failed to render");
            let second = renderer.render_jpeg(index).expect("Failed to render");
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn test_different_indices_differ() {
        let renderer = renderer();
        let a = renderer.render(10).expect("Failed to render");
        let b = renderer.render(11).expect("Failed to render");
        assert_ne!(a, b);
    }

    #[test]
    fn test_index_zero_rejected() {
        assert!(matches!(renderer().render(0), Err(AvatarError::IndexOutOfRange(0))));
    }

    #[test]
    fn test_write_avatar_overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let target = dir.path().join("nested").join("avatars");
        let renderer = renderer();

        std::fs::create_dir_all(&target).expect("Failed to create dir");
        std::fs::write(target.join("5.jpg"), b"stale").expect("Failed to write stale file");

        let path = renderer.write_avatar(&target, 5).expect("Failed to write avatar");
        assert_eq!(path, target.join("5.jpg"));

        let decoded = image::open(&path).expect("Failed to decode avatar");
        assert_eq!(decoded.width(), AVATAR_SIZE);
        assert_eq!(decoded.height(), AVATAR_SIZE);
        assert!(decoded.as_rgb8().is_some());
    }

    #[test]
    fn test_write_avatar_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let target = dir.path().join("static").join("avatars");

        renderer().write_avatar(&target, 12).expect("Failed to write avatar");
        assert!(target.join("12.jpg").is_file());
    }

    #[test]
    fn test_write_avatar_into_file_path_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").expect("Failed to write blocker");

        let result = renderer().write_avatar(&blocker, 1);
        assert!(matches!(result, Err(AvatarError::Io { .. })));
    }
}
