//! Card backgrounds.
//!
//! Every formatter has a procedural background so the service works without
//! any asset files. An image named `<generator>.png` or `<generator>.jpg` in
//! the configured template directory replaces it; it is decoded once at
//! startup and resized to the card dimensions.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use tracing::{debug, info};

use crate::error::{Error, Result};

const TEMPLATE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Colours for a procedural background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Paper colour at the top edge.
    pub paper_top: Rgb<u8>,
    /// Paper colour at the bottom edge.
    pub paper_bottom: Rgb<u8>,
    /// Frame and divider colour.
    pub frame: Rgb<u8>,
    /// Fill for the header and footer bands.
    pub band: Rgb<u8>,
}

/// A rectangular region of a template, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub y: u32,
    pub height: u32,
}

/// A decoded, read-only card background.
#[derive(Debug, Clone)]
pub struct CardTemplate {
    background: RgbImage,
    source: Option<PathBuf>,
}

impl CardTemplate {
    /// Paint a parchment-style background with a double frame and shaded
    /// header/footer bands.
    pub fn procedural(width: u32, height: u32, palette: Palette, bands: &[Band]) -> Self {
        let mut background = RgbImage::new(width, height);
        let span = height.saturating_sub(1).max(1) as f32;
        for (_, y, pixel) in background.enumerate_pixels_mut() {
            let t = y as f32 / span;
            *pixel = lerp(palette.paper_top, palette.paper_bottom, t);
        }

        let margin = (width / 40).max(4);
        for band in bands {
            for y in band.y..(band.y + band.height).min(height) {
                for x in margin..width.saturating_sub(margin) {
                    background.put_pixel(x, y, palette.band);
                }
            }
        }

        let outer = (width / 100).max(2);
        frame(&mut background, margin / 2, outer, palette.frame);
        frame(&mut background, margin, 1, palette.frame);

        Self {
            background,
            source: None,
        }
    }

    /// Decode an image file and resize it to `width` x `height`.
    pub fn from_file(path: &Path, width: u32, height: u32) -> Result<Self> {
        let decoded = image::open(path).map_err(|e| Error::TemplateLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let background = if decoded.width() == width && decoded.height() == height {
            decoded.to_rgb8()
        } else {
            decoded
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgb8()
        };
        Ok(Self {
            background,
            source: Some(path.to_path_buf()),
        })
    }

    /// Resolve the template for `generator`, preferring a file in `dir`.
    pub fn resolve(
        dir: Option<&Path>,
        generator: &str,
        width: u32,
        height: u32,
        fallback: impl FnOnce() -> CardTemplate,
    ) -> Result<Self> {
        if let Some(path) = dir.and_then(|dir| find_template_file(dir, generator)) {
            info!(generator, path = %path.display(), "loading card template");
            return Self::from_file(&path, width, height);
        }
        debug!(generator, "using procedural card template");
        Ok(fallback())
    }

    pub fn width(&self) -> u32 {
        self.background.width()
    }

    pub fn height(&self) -> u32 {
        self.background.height()
    }

    /// Path of the template file, or `None` for a procedural background.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// A fresh copy of the background to draw on.
    pub fn background(&self) -> RgbImage {
        self.background.clone()
    }
}

fn find_template_file(dir: &Path, generator: &str) -> Option<PathBuf> {
    TEMPLATE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", generator, ext)))
        .find(|candidate| candidate.is_file())
}

fn frame(image: &mut RgbImage, inset: u32, thickness: u32, color: Rgb<u8>) {
    let (width, height) = image.dimensions();
    if width <= inset * 2 || height <= inset * 2 {
        return;
    }
    for y in inset..height - inset {
        for x in inset..width - inset {
            let near_x = x < inset + thickness || x >= width - inset - thickness;
            let near_y = y < inset + thickness || y >= height - inset - thickness;
            if near_x || near_y {
                image.put_pixel(x, y, color);
            }
        }
    }
}

fn lerp(a: Rgb<u8>, b: Rgb<u8>, t: f32) -> Rgb<u8> {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PALETTE: Palette = Palette {
        paper_top: Rgb([240, 230, 200]),
        paper_bottom: Rgb([220, 200, 160]),
        frame: Rgb([90, 60, 30]),
        band: Rgb([200, 180, 140]),
    };

    #[test]
    fn procedural_template_has_requested_size() {
        let template = CardTemplate::procedural(100, 140, PALETTE, &[]);
        assert_eq!((template.width(), template.height()), (100, 140));
        assert!(template.source().is_none());
    }

    #[test]
    fn procedural_template_draws_frame() {
        let template = CardTemplate::procedural(100, 140, PALETTE, &[]);
        let background = template.background();
        // margin = 4, outer inset = 2
        assert_eq!(*background.get_pixel(2, 70), PALETTE.frame);
        assert_eq!(
            *background.get_pixel(50, 70),
            lerp(PALETTE.paper_top, PALETTE.paper_bottom, 70.0 / 139.0)
        );
    }

    #[test]
    fn resolve_prefers_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        RgbImage::from_pixel(20, 28, Rgb([1, 2, 3])).save(&path).unwrap();

        let template = CardTemplate::resolve(Some(dir.path()), "plain", 40, 56, || {
            CardTemplate::procedural(40, 56, PALETTE, &[])
        })
        .unwrap();
        assert_eq!(template.source(), Some(path.as_path()));
        assert_eq!((template.width(), template.height()), (40, 56));
    }

    #[test]
    fn resolve_falls_back_when_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let template = CardTemplate::resolve(Some(dir.path()), "plain", 40, 56, || {
            CardTemplate::procedural(40, 56, PALETTE, &[])
        })
        .unwrap();
        assert!(template.source().is_none());
    }

    #[test]
    fn unreadable_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain.jpg"), b"not an image").unwrap();
        let err = CardTemplate::resolve(Some(dir.path()), "plain", 40, 56, || {
            CardTemplate::procedural(40, 56, PALETTE, &[])
        })
        .unwrap_err();
        assert!(matches!(err, Error::TemplateLoad { .. }));
    }
}
