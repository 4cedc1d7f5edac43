//! Text measurement for the standard PDF fonts used on the cards.

/// Font faces used by the card renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

/// Width of a string when set in `font` at `size` points.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font: Font, size: f32) -> f32;
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn text_width(&self, text: &str, font: Font, size: f32) -> f32 {
        (**self).text_width(text, font, size)
    }
}

/// Advance widths of the base-14 Helvetica faces (1/1000 em), matching what a
/// PDF viewer uses for the unembedded built-in fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

/// Width used for characters outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

impl TextMeasure for Helvetica {
    fn text_width(&self, text: &str, font: Font, size: f32) -> f32 {
        let table = match font {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        };
        let units: u32 = text
            .chars()
            .map(|ch| {
                let code = ch as u32;
                if (0x20..0x7f).contains(&code) {
                    table[(code - 0x20) as usize] as u32
                } else {
                    FALLBACK_WIDTH as u32
                }
            })
            .sum();
        units as f32 * size / 1000.0
    }
}

// Indexed from U+0020 (space) through U+007E (tilde).
#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015,                                             // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // 'N'..'Z'
    278, 278, 278, 469, 556, 333,                                                   // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // 'n'..'z'
    334, 260, 334, 584,                                                             // '{'..'~'
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];
