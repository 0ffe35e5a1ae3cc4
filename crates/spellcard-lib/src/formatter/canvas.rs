//! Minimal drawing surface used by the built-in formatters.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

use super::font::{self, ADVANCE, GLYPH_HEIGHT};
use crate::error::{Error, Result};

/// JPEG quality used for every card.
pub const JPEG_QUALITY: u8 = 90;

const ELLIPSIS: &str = "...";

/// How a run of text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub scale: u32,
    pub color: Rgb<u8>,
    pub bold: bool,
}

impl TextStyle {
    pub const fn new(scale: u32, color: Rgb<u8>) -> Self {
        Self {
            scale,
            color,
            bold: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Pixel width of `text` in this style.
    pub fn width(&self, text: &str) -> u32 {
        let width = font::text_width(text, self.scale);
        if self.bold && width > 0 {
            width + 1
        } else {
            width
        }
    }

    /// Glyph height in pixels.
    pub fn height(&self) -> u32 {
        GLYPH_HEIGHT * self.scale
    }
}

/// An RGB image with text and rectangle primitives.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Fill an axis-aligned rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
        let x_end = x.saturating_add(width).min(self.width());
        let y_end = y.saturating_add(height).min(self.height());
        for py in y..y_end {
            for px in x..x_end {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, style: TextStyle) {
        self.draw_run(x, y, text, style);
        if style.bold {
            self.draw_run(x + 1, y, text, style);
        }
    }

    /// Draw `text` centred horizontally in the slot `[slot_x, slot_x + slot_width)`.
    ///
    /// Text wider than the slot is truncated with an ellipsis first.
    pub fn draw_centered(
        &mut self,
        text: &str,
        style: TextStyle,
        y: u32,
        slot_x: u32,
        slot_width: u32,
    ) {
        let fitted = fit_to_width(text, slot_width, style);
        let width = style.width(&fitted);
        let x = slot_x + slot_width.saturating_sub(width) / 2;
        self.draw_text(x, y, &fitted, style);
    }

    fn draw_run(&mut self, x: u32, y: u32, text: &str, style: TextStyle) {
        let scale = style.scale.max(1);
        let mut cursor = x;
        for ch in text.chars() {
            for (col, bits) in font::glyph(ch).iter().enumerate() {
                for row in 0..GLYPH_HEIGHT {
                    if bits & (1 << row) == 0 {
                        continue;
                    }
                    let px = cursor + col as u32 * scale;
                    let py = y + row * scale;
                    self.fill_rect(px, py, scale, scale, style.color);
                }
            }
            cursor += ADVANCE * scale;
        }
    }

    /// Encode the canvas as JPEG bytes.
    pub fn encode_jpeg(&self, generator: &str) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
            .encode_image(&self.image)
            .map_err(|e| Error::render(generator, format!("JPEG encoding failed: {}", e)))?;
        Ok(buffer.into_inner())
    }
}

/// Truncate `text` with `...` until it fits in `max_width` pixels.
pub fn fit_to_width(text: &str, max_width: u32, style: TextStyle) -> String {
    if style.width(text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>().trim_end().to_string() + ELLIPSIS;
        if style.width(&candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Words longer than a full line are split across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Keep at most `max_lines` lines, marking the last kept line with `...`
/// when anything was dropped.
pub fn clamp_lines(mut lines: Vec<String>, max_lines: usize, width: usize) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let keep = width.saturating_sub(ELLIPSIS.len());
        let mut shortened: String = last.chars().take(keep).collect();
        shortened = shortened.trim_end().to_string();
        shortened.push_str(ELLIPSIS);
        *last = shortened;
    }
    lines
}
