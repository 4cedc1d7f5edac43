use image::GrayImage;

use crate::color::RgbColor;
use crate::layout::CardRect;
use crate::metrics::Font;

/// Dash pattern for stroked lines, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub on: f32,
    pub off: f32,
}

/// Stroke parameters applied to a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: RgbColor,
    pub width: f32,
    pub dash: Option<Dash>,
}

/// Page-oriented drawing surface in PDF user space (points, origin bottom-left).
///
/// Pages are appended strictly in order: everything drawn before
/// [`Canvas::finish_page`] belongs to the current page.
pub trait Canvas {
    fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke);

    /// Draw `text` with its left baseline point at `(x, y)`.
    fn text(&mut self, text: &str, font: Font, size: f32, x: f32, y: f32, fill: RgbColor);

    /// Place `image` scaled to fill `rect`.
    fn image(&mut self, image: &GrayImage, rect: CardRect);

    fn finish_page(&mut self);
}

/// A single drawing operation captured by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        from: (f32, f32),
        to: (f32, f32),
        stroke: Stroke,
    },
    Text {
        text: String,
        font: Font,
        size: f32,
        x: f32,
        y: f32,
        fill: RgbColor,
    },
    Image {
        rect: CardRect,
        pixels: (u32, u32),
    },
}

/// Canvas that keeps every operation in memory, grouped by page.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pages: Vec<Vec<DrawOp>>,
    current: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished pages in emission order.
    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    /// Operations drawn since the last finished page.
    pub fn pending(&self) -> &[DrawOp] {
        &self.current
    }

    /// Text operations of `page` in drawing order.
    pub fn texts(&self, page: usize) -> Vec<&DrawOp> {
        self.pages
            .get(page)
            .map(|ops| {
                ops.iter()
                    .filter(|op| matches!(op, DrawOp::Text { .. }))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rectangles of every image placed on `page`.
    pub fn image_rects(&self, page: usize) -> Vec<CardRect> {
        self.pages
            .get(page)
            .map(|ops| {
                ops.iter()
                    .filter_map(|op| match op {
                        DrawOp::Image { rect, .. } => Some(*rect),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Canvas for RecordingCanvas {
    fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke) {
        self.current.push(DrawOp::Line { from, to, stroke });
    }

    fn text(&mut self, text: &str, font: Font, size: f32, x: f32, y: f32, fill: RgbColor) {
        self.current.push(DrawOp::Text {
            text: text.to_string(),
            font,
            size,
            x,
            y,
            fill,
        });
    }

    fn image(&mut self, image: &GrayImage, rect: CardRect) {
        self.current.push(DrawOp::Image {
            rect,
            pixels: image.dimensions(),
        });
    }

    fn finish_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
    }
}
