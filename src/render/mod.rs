//! Drawing surfaces and per-card rendering.

mod canvas;
mod card;
mod pdf;

pub use canvas::{Canvas, Dash, DrawOp, RecordingCanvas, Stroke};
pub use card::{
    ARTIST_LINE_HEIGHT, ARTIST_OFFSET, ARTIST_STYLE, CODE_SCALE, CORNER_INSET, CORNER_LENGTH,
    CardRenderer, InfoLayout, TITLE_LINE_HEIGHT, TITLE_STYLE, YEAR_OFFSET, YEAR_STYLE,
    draw_corner_marks, draw_cutting_guides,
};
pub use pdf::PdfCanvas;
