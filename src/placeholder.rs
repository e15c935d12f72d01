//! Generated title card, the terminal image tier.
//!
//! Text is drawn with the public-domain 8x8 bitmap glyphs from `font8x8`,
//! scaled up by an integer factor. Glyphs are monospaced, so the rendered
//! width of a line is simply `chars * 8 * scale`.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

pub const CARD_WIDTH: u32 = 1200;
pub const CARD_HEIGHT: u32 = 675;
pub const MARGIN: u32 = 60;
pub const LINE_SPACING: u32 = 10;
pub const FOOTER_TEXT: &str = "Health & Longevity Daily";

const GLYPH_SIZE: u32 = 8;
const TITLE_SCALE: u32 = 3;
const FOOTER_SCALE: u32 = 2;
const FOOTER_RIGHT_INSET: u32 = 16;
const FOOTER_BOTTOM_INSET: u32 = 12;

/// Title lines that fit between a third and two thirds of the card height.
const MAX_TITLE_LINES: usize =
    ((CARD_HEIGHT / 3 + LINE_SPACING) / (GLYPH_SIZE * TITLE_SCALE + LINE_SPACING)) as usize;
/// The bitmap font has no U+2026, so the card marks cut titles with dots.
const CARD_ELLIPSIS: &str = "...";

const BACKGROUND: Rgb<u8> = Rgb([240, 247, 245]);
const TITLE_COLOUR: Rgb<u8> = Rgb([30, 45, 40]);
const FOOTER_COLOUR: Rgb<u8> = Rgb([80, 100, 95]);

/// Rendered width in pixels of `text` at the given scale.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

fn text_height(scale: u32) -> u32 {
    GLYPH_SIZE * scale
}

/// Greedy word wrap: words are packed onto a line while `measure` stays
/// within `max_width`. A word that alone exceeds the width gets its own line.
pub fn wrap_words<F>(text: &str, max_width: u32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> u32,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if measure(&candidate) <= max_width {
            line = candidate;
        } else {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            line = word.to_string();
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Keep at most `max_lines`; a cut last line ends with [`CARD_ELLIPSIS`]
/// and still fits `max_width`.
pub fn cap_lines<F>(mut lines: Vec<String>, max_lines: usize, max_width: u32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> u32,
{
    if lines.len() <= max_lines || max_lines == 0 {
        lines.truncate(max_lines);
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let mut kept = last.trim_end().to_string();
        while !kept.is_empty() && measure(&format!("{kept}{CARD_ELLIPSIS}")) > max_width {
            kept.pop();
            kept.truncate(kept.trim_end().len());
        }
        *last = format!("{kept}{CARD_ELLIPSIS}");
    }
    lines
}

/// Render the fallback card for `title`.
pub fn render_card(title: &str) -> RgbImage {
    let mut img = RgbImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, BACKGROUND);
    let max_width = CARD_WIDTH - 2 * MARGIN;

    let measure = |s: &str| text_width(s, TITLE_SCALE);
    let lines = cap_lines(
        wrap_words(title, max_width, measure),
        MAX_TITLE_LINES,
        max_width,
        measure,
    );
    let mut y = CARD_HEIGHT / 3;
    for line in &lines {
        let w = text_width(line, TITLE_SCALE);
        let x = CARD_WIDTH.saturating_sub(w) / 2;
        draw_text(&mut img, line, x, y, TITLE_SCALE, TITLE_COLOUR);
        y += text_height(TITLE_SCALE) + LINE_SPACING;
    }

    let fw = text_width(FOOTER_TEXT, FOOTER_SCALE);
    let fh = text_height(FOOTER_SCALE);
    draw_text(
        &mut img,
        FOOTER_TEXT,
        CARD_WIDTH.saturating_sub(fw + FOOTER_RIGHT_INSET),
        CARD_HEIGHT.saturating_sub(fh + FOOTER_BOTTOM_INSET),
        FOOTER_SCALE,
        FOOTER_COLOUR,
    );
    img
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Draw `text` with its top-left corner at `(x, y)`. Pixels off the canvas are clipped.
fn draw_text(img: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, colour: Rgb<u8>) {
    let (width, height) = img.dimensions();
    let advance = GLYPH_SIZE * scale;
    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as u32 * advance;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // bit 0 is the leftmost pixel
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = origin_x + col * scale;
                let py = y + row as u32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        if px + dx < width && py + dy < height {
                            img.put_pixel(px + dx, py + dy, colour);
                        }
                    }
                }
            }
        }
    }
}
