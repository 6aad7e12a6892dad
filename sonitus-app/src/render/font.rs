//! 5x7 bitmap font for chart annotations.
//!
//! Keeps the renderer free of a text-shaping dependency: every glyph is a
//! tiny row-major bit pattern filled as scaled rectangles. Lowercase
//! input is drawn with the uppercase glyph; anything without a pattern
//! renders as a blank cell.

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

/// Advance per character at `pixel_size`, including 1px inter-glyph gap.
pub(crate) fn char_advance(pixel_size: f32) -> f32 {
    6.0 * pixel_size
}

/// Glyph height at `pixel_size`.
pub(crate) fn char_height(pixel_size: f32) -> f32 {
    7.0 * pixel_size
}

/// Width of `text` at `pixel_size`.
pub(crate) fn text_width(text: &str, pixel_size: f32) -> f32 {
    text.chars().count() as f32 * char_advance(pixel_size)
}

/// Draw `text` left-aligned with its top-left corner at `(x, y)`.
pub(crate) fn draw_text(
    pixmap: &mut Pixmap,
    text: &str,
    x: f32,
    y: f32,
    pixel_size: f32,
    paint: &Paint,
) {
    for (i, ch) in text.chars().enumerate() {
        draw_char(pixmap, ch, x + i as f32 * char_advance(pixel_size), y, pixel_size, paint);
    }
}

/// Draw `text` stacked vertically, one character per row, top at `(x, y)`.
pub(crate) fn draw_text_vertical(
    pixmap: &mut Pixmap,
    text: &str,
    x: f32,
    y: f32,
    pixel_size: f32,
    paint: &Paint,
) {
    let step = char_height(pixel_size) + pixel_size;
    for (i, ch) in text.chars().enumerate() {
        draw_char(pixmap, ch, x, y + i as f32 * step, pixel_size, paint);
    }
}

fn draw_char(pixmap: &mut Pixmap, ch: char, x: f32, y: f32, pixel_size: f32, paint: &Paint) {
    let pattern = glyph(ch.to_ascii_uppercase());
    for (row, &bits) in pattern.iter().enumerate() {
        for col in 0..5 {
            if (bits >> (4 - col)) & 1 == 1 {
                let px = x + col as f32 * pixel_size;
                let py = y + row as f32 * pixel_size;
                if let Some(rect) = Rect::from_xywh(px, py, pixel_size, pixel_size) {
                    let path = PathBuilder::from_rect(rect);
                    pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
                }
            }
        }
    }
}

/// 5x7 bit patterns, one row per byte, most significant bit leftmost.
pub(crate) fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10011, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'J' => [0b00001, 0b00001, 0b00001, 0b00001, 0b10001, 0b10001, 0b01110],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '\'' => [0b00110, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '/' => [0b00001, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        _ => [0; 7],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_digits_have_patterns() {
        for ch in ('A'..='Z').chain('0'..='9') {
            assert!(glyph(ch).iter().any(|&row| row != 0), "blank glyph for {ch}");
        }
    }

    #[test]
    fn unknown_characters_are_blank() {
        assert_eq!(glyph('#'), [0; 7]);
        assert_eq!(glyph(' '), [0; 7]);
    }

    #[test]
    fn width_scales_with_text_and_size() {
        assert_eq!(text_width("ABC", 2.0), 36.0);
        assert_eq!(text_width("", 2.0), 0.0);
        assert!(char_height(2.0) > char_height(1.0));
    }
}
