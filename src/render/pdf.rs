use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::GrayImage;
use log::info;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, LineDashPattern, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Pt, Px, Rgb,
};

use super::canvas::{Canvas, Stroke};
use crate::color::RgbColor;
use crate::error::DeckError;
use crate::layout::CardRect;
use crate::metrics::Font;

const LAYER_NAME: &str = "Cards";

/// Multi-page PDF built on the standard Helvetica faces.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    page_size: (f32, f32),
    pages: usize,
    page_open: bool,
    stroke: Option<Stroke>,
    fill: Option<RgbColor>,
}

impl PdfCanvas {
    /// Start a document whose pages measure `page_size` points.
    pub fn new(title: &str, page_size: (f32, f32)) -> Result<Self, DeckError> {
        let (doc, page, layer) =
            PdfDocument::new(title, pt(page_size.0), pt(page_size.1), LAYER_NAME);
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| DeckError::Pdf(err.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| DeckError::Pdf(err.to_string()))?;
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            page_size,
            pages: 1,
            page_open: true,
            stroke: None,
            fill: None,
        })
    }

    /// Pages started so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    pub fn save(self, path: &Path) -> Result<(), DeckError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save(&mut writer)
            .map_err(|err| DeckError::Pdf(err.to_string()))?;
        info!("saved {} page(s) to {}", self.pages, path.display());
        Ok(())
    }

    fn ensure_page(&mut self) {
        if self.page_open {
            return;
        }
        let (page, layer) =
            self.doc
                .add_page(pt(self.page_size.0), pt(self.page_size.1), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.page_open = true;
        // graphics state does not carry over to a new content stream
        self.stroke = None;
        self.fill = None;
    }

    fn apply_stroke(&mut self, stroke: Stroke) {
        if self.stroke == Some(stroke) {
            return;
        }
        self.layer.set_outline_color(pdf_color(stroke.color));
        self.layer.set_outline_thickness(stroke.width);
        let pattern = match stroke.dash {
            Some(dash) => LineDashPattern {
                dash_1: Some(dash.on.round() as i64),
                gap_1: Some(dash.off.round() as i64),
                ..LineDashPattern::default()
            },
            None => LineDashPattern::default(),
        };
        self.layer.set_line_dash_pattern(pattern);
        self.stroke = Some(stroke);
    }

    fn apply_fill(&mut self, fill: RgbColor) {
        if self.fill == Some(fill) {
            return;
        }
        self.layer.set_fill_color(pdf_color(fill));
        self.fill = Some(fill);
    }
}

impl Canvas for PdfCanvas {
    fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke) {
        self.ensure_page();
        self.apply_stroke(stroke);
        self.layer.add_line(Line {
            points: vec![(point(from), false), (point(to), false)],
            is_closed: false,
        });
    }

    fn text(&mut self, text: &str, font: Font, size: f32, x: f32, y: f32, fill: RgbColor) {
        self.ensure_page();
        self.apply_fill(fill);
        let font = match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        };
        self.layer.use_text(text, size, pt(x), pt(y), font);
    }

    fn image(&mut self, image: &GrayImage, rect: CardRect) {
        self.ensure_page();
        let (width_px, height_px) = image.dimensions();
        if width_px == 0 || height_px == 0 || rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        // printpdf sizes images by DPI: points = pixels / dpi * 72
        let dpi = width_px as f32 * 72.0 / rect.w;
        let natural_height = height_px as f32 * 72.0 / dpi;
        let xobject = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Greyscale,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: image.as_raw().clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });
        xobject.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(pt(rect.x)),
                translate_y: Some(pt(rect.y)),
                dpi: Some(dpi),
                scale_y: Some(rect.h / natural_height),
                ..Default::default()
            },
        );
    }

    fn finish_page(&mut self) {
        self.page_open = false;
    }
}

fn pt(value: f32) -> Mm {
    Mm::from(Pt(value))
}

fn point((x, y): (f32, f32)) -> Point {
    Point::new(pt(x), pt(y))
}

fn pdf_color(color: RgbColor) -> Color {
    Color::Rgb(Rgb::new(color.r, color.g, color.b, None))
}
