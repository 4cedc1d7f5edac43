//! Page geometry and text fitting for card decks.

mod fit;
mod grid;

pub use fit::{
    ELLIPSIS, MIN_TRUNCATED_CHARS, PlacedLine, TRUNCATE_THRESHOLD, TextStyle, VerticalAnchor,
    block_start_y, center_lines, fit_text, limit_lines, truncate_with_ellipsis, wrap_words,
};
pub use grid::{CardRect, PageGrid, card_rect, mirror_index};
