//! Embedded 5x7 pixel glyph atlas for the watermark label.
//!
//! Rows are 5-bit masks with the most significant of the low five bits as the
//! leftmost column, so the literals below read like the glyph they draw.

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance between glyph origins, in atlas pixels.
pub const GLYPH_ADVANCE: u32 = 6;

type GlyphRows = [u8; GLYPH_HEIGHT as usize];

/// Looks up the row masks for a label character. Only the characters used by
/// the watermark label are present; anything else renders as blank space.
pub fn glyph(character: char) -> Option<&'static GlyphRows> {
    let rows: &'static GlyphRows = match character {
        'A' => &[
            0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001,
        ],
        'B' => &[
            0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110,
        ],
        'D' => &[
            0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110,
        ],
        'E' => &[
            0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111,
        ],
        'G' => &[
            0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111,
        ],
        'I' => &[
            0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111,
        ],
        'M' => &[
            0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001,
        ],
        'N' => &[
            0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001,
        ],
        'O' => &[
            0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110,
        ],
        'P' => &[
            0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000,
        ],
        'R' => &[
            0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001,
        ],
        'T' => &[
            0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100,
        ],
        'V' => &[
            0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100,
        ],
        'W' => &[
            0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001,
        ],
        '9' => &[
            0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100,
        ],
        '/' => &[
            0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000,
        ],
        '\u{2022}' => &[
            0b00000, 0b00000, 0b01100, 0b01100, 0b00000, 0b00000, 0b00000,
        ],
        _ => return None,
    };
    Some(rows)
}

/// True when the glyph for `character` has an on-pixel at `(x, y)`.
pub fn sample(character: char, x: u32, y: u32) -> bool {
    if x >= GLYPH_WIDTH || y >= GLYPH_HEIGHT {
        return false;
    }
    match glyph(character) {
        Some(rows) => (rows[y as usize] >> (GLYPH_WIDTH - 1 - x)) & 1 == 1,
        None => false,
    }
}

/// Label width in atlas pixels, before scaling.
pub fn text_advance(text: &str) -> u32 {
    text.chars().count() as u32 * GLYPH_ADVANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_letter_has_visible_pixels() {
        for character in "ANIME VIDEO GENERATOR \u{2022} WEBM/VP9".chars() {
            if character == ' ' {
                continue;
            }
            let visible = (0..GLYPH_HEIGHT)
                .any(|y| (0..GLYPH_WIDTH).any(|x| sample(character, x, y)));
            assert!(visible, "glyph {character:?} is blank");
        }
    }

    #[test]
    fn space_and_unknown_characters_are_blank() {
        for character in [' ', 'q', '~'] {
            let visible = (0..GLYPH_HEIGHT)
                .any(|y| (0..GLYPH_WIDTH).any(|x| sample(character, x, y)));
            assert!(!visible, "glyph {character:?} should be blank");
        }
    }

    #[test]
    fn out_of_bounds_samples_are_off() {
        assert!(!sample('A', GLYPH_WIDTH, 0));
        assert!(!sample('A', 0, GLYPH_HEIGHT));
    }
}
