use crate::color::{RgbColor, color_for_year};
use crate::error::DeckError;
use crate::layout::{
    CardRect, PlacedLine, TextStyle, VerticalAnchor, block_start_y, center_lines, fit_text,
    limit_lines,
};
use crate::metrics::{Font, TextMeasure};
use crate::qr::CodeImageProducer;
use crate::track::TrackRecord;

use super::canvas::{Canvas, Dash, Stroke};

/// Share of the card's shorter side covered by the code image.
pub const CODE_SCALE: f32 = 0.85;
/// Distance from the card edge to the corner marks.
pub const CORNER_INSET: f32 = 8.0;
pub const CORNER_LENGTH: f32 = 12.0;
/// Horizontal room lost to the cut margin on each side of the info text.
pub const TEXT_PADDING: f32 = 8.0;

const CORNER_STROKE: Stroke = Stroke {
    color: RgbColor::gray(0.5),
    width: 1.5,
    dash: None,
};
const GUIDE_STROKE: Stroke = Stroke {
    color: RgbColor::gray(0.7),
    width: 0.5,
    dash: Some(Dash { on: 3.0, off: 3.0 }),
};

pub const YEAR_STYLE: TextStyle = TextStyle::new(Font::Bold, 40.0);
pub const TITLE_STYLE: TextStyle = TextStyle::new(Font::Bold, 20.0);
pub const ARTIST_STYLE: TextStyle = TextStyle::new(Font::Regular, 16.0);
pub const TITLE_LINE_HEIGHT: f32 = 24.0;
pub const ARTIST_LINE_HEIGHT: f32 = 19.0;
/// Year baseline above the card center.
pub const YEAR_OFFSET: f32 = 45.0;
/// First artist baseline below the card center.
pub const ARTIST_OFFSET: f32 = 44.0;
/// Longest title block that fits between the year and the artists.
pub const MAX_TITLE_LINES: usize = 3;
pub const MAX_ARTIST_LINES: usize = 2;

const TITLE_COLOR: RgbColor = RgbColor::BLACK;
const ARTIST_COLOR: RgbColor = RgbColor::gray(0.2);

/// Positioned text of an info card, computed before drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoLayout {
    pub year: PlacedLine,
    pub year_color: RgbColor,
    pub title: Vec<PlacedLine>,
    pub artists: Vec<PlacedLine>,
}

/// Draws the code side and the info side of individual cards.
pub struct CardRenderer<M> {
    measure: M,
    codes: CodeImageProducer,
}

impl<M: TextMeasure> CardRenderer<M> {
    pub fn new(measure: M, codes: CodeImageProducer) -> Self {
        Self { measure, codes }
    }

    pub fn measure(&self) -> &M {
        &self.measure
    }

    /// Code image centered in the card, plus corner marks and cut guides.
    pub fn draw_code_card<C: Canvas>(
        &self,
        canvas: &mut C,
        track: &TrackRecord,
        rect: CardRect,
    ) -> Result<(), DeckError> {
        let image = self.codes.produce(&track.url)?;
        let side = rect.min_side() * CODE_SCALE;
        let placed = CardRect {
            x: rect.x + (rect.w - side) / 2.0,
            y: rect.y + (rect.h - side) / 2.0,
            w: side,
            h: side,
        };
        canvas.image(&image, placed);
        draw_corner_marks(canvas, rect);
        draw_cutting_guides(canvas, rect);
        Ok(())
    }

    /// Year, title and artists stacked around the card center.
    pub fn draw_info_card<C: Canvas>(&self, canvas: &mut C, track: &TrackRecord, rect: CardRect) {
        let layout = self.info_layout(track, rect);
        let year = &layout.year;
        canvas.text(
            &year.text,
            YEAR_STYLE.font,
            YEAR_STYLE.size,
            year.x,
            year.y,
            layout.year_color,
        );
        for line in &layout.title {
            canvas.text(
                &line.text,
                TITLE_STYLE.font,
                TITLE_STYLE.size,
                line.x,
                line.y,
                TITLE_COLOR,
            );
        }
        for line in &layout.artists {
            canvas.text(
                &line.text,
                ARTIST_STYLE.font,
                ARTIST_STYLE.size,
                line.x,
                line.y,
                ARTIST_COLOR,
            );
        }
        draw_corner_marks(canvas, rect);
        draw_cutting_guides(canvas, rect);
    }

    pub fn info_layout(&self, track: &TrackRecord, rect: CardRect) -> InfoLayout {
        let (center_x, center_y) = rect.center();
        let max_width = rect.w - 2.0 * TEXT_PADDING;

        let year_width = self
            .measure
            .text_width(&track.year, YEAR_STYLE.font, YEAR_STYLE.size);
        let year = PlacedLine {
            text: track.year.clone(),
            x: center_x - year_width / 2.0,
            y: center_y + YEAR_OFFSET,
        };

        let title_lines = limit_lines(
            &self.measure,
            fit_text(&self.measure, &track.title, TITLE_STYLE, max_width),
            TITLE_STYLE,
            max_width,
            MAX_TITLE_LINES,
        );
        let title_start = block_start_y(
            title_lines.len(),
            TITLE_LINE_HEIGHT,
            center_y,
            VerticalAnchor::Center,
        );
        let title = center_lines(
            &self.measure,
            &title_lines,
            TITLE_STYLE,
            center_x,
            title_start,
            TITLE_LINE_HEIGHT,
        );

        let artist_lines = limit_lines(
            &self.measure,
            fit_text(&self.measure, &track.artists, ARTIST_STYLE, max_width),
            ARTIST_STYLE,
            max_width,
            MAX_ARTIST_LINES,
        );
        let artist_start = block_start_y(
            artist_lines.len(),
            ARTIST_LINE_HEIGHT,
            center_y - ARTIST_OFFSET,
            VerticalAnchor::Top,
        );
        let artists = center_lines(
            &self.measure,
            &artist_lines,
            ARTIST_STYLE,
            center_x,
            artist_start,
            ARTIST_LINE_HEIGHT,
        );

        InfoLayout {
            year,
            year_color: color_for_year(Some(&track.year)),
            title,
            artists,
        }
    }
}

/// L-shaped marks inset from each corner of `rect`.
pub fn draw_corner_marks<C: Canvas>(canvas: &mut C, rect: CardRect) {
    let CardRect { x, y, w, h } = rect;
    let (i, l) = (CORNER_INSET, CORNER_LENGTH);
    let (left, right) = (x + i, x + w - i);
    let (bottom, top) = (y + i, y + h - i);

    canvas.line((left, bottom), (left + l, bottom), CORNER_STROKE);
    canvas.line((left, bottom), (left, bottom + l), CORNER_STROKE);

    canvas.line((right - l, bottom), (right, bottom), CORNER_STROKE);
    canvas.line((right, bottom), (right, bottom + l), CORNER_STROKE);

    canvas.line((left, top - l), (left, top), CORNER_STROKE);
    canvas.line((left, top), (left + l, top), CORNER_STROKE);

    canvas.line((right, top - l), (right, top), CORNER_STROKE);
    canvas.line((right - l, top), (right, top), CORNER_STROKE);
}

/// Dashed lines joining the corner marks of `rect`.
pub fn draw_cutting_guides<C: Canvas>(canvas: &mut C, rect: CardRect) {
    let CardRect { x, y, w, h } = rect;
    let (i, l) = (CORNER_INSET, CORNER_LENGTH);

    canvas.line((x + i + l, y + i), (x + w - i - l, y + i), GUIDE_STROKE);
    canvas.line((x + w - i, y + i + l), (x + w - i, y + h - i - l), GUIDE_STROKE);
    canvas.line((x + w - i - l, y + h - i), (x + i + l, y + h - i), GUIDE_STROKE);
    canvas.line((x + i, y + h - i - l), (x + i, y + i + l), GUIDE_STROKE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeckConfig;
    use crate::layout::ELLIPSIS;
    use crate::metrics::Helvetica;
    use crate::render::canvas::{DrawOp, RecordingCanvas};
    use pretty_assertions::assert_eq;

    // Approximate Helvetica cap height and descender, as fractions of the size.
    const CAP: f32 = 0.72;
    const DESCENT: f32 = 0.21;

    fn renderer() -> CardRenderer<Helvetica> {
        CardRenderer::new(Helvetica, CodeImageProducer::new(64))
    }

    fn rect() -> CardRect {
        CardRect { x: 18.0, y: 522.0, w: 288.0, h: 252.0 }
    }

    fn track(title: &str, artists: &str, year: &str) -> TrackRecord {
        TrackRecord::new(title, artists, year, "https://open.spotify.com/track/abc")
    }

    #[test]
    fn corner_marks_stay_within_card() {
        let mut canvas = RecordingCanvas::new();
        let rect = CardRect { x: 100.0, y: 200.0, w: 50.0, h: 80.0 };
        draw_corner_marks(&mut canvas, rect);
        draw_cutting_guides(&mut canvas, rect);
        assert_eq!(canvas.pending().len(), 12);
        for op in canvas.pending() {
            let DrawOp::Line { from, to, .. } = op else {
                panic!("unexpected {op:?}");
            };
            for (px, py) in [from, to] {
                assert!(*px >= rect.x + CORNER_INSET && *px <= rect.x + rect.w - CORNER_INSET);
                assert!(*py >= rect.y + CORNER_INSET && *py <= rect.y + rect.h - CORNER_INSET);
            }
        }
    }

    #[test]
    fn guides_are_dashed_and_marks_solid() {
        let mut canvas = RecordingCanvas::new();
        draw_corner_marks(&mut canvas, rect());
        draw_cutting_guides(&mut canvas, rect());
        let dashed: Vec<bool> = canvas
            .pending()
            .iter()
            .map(|op| matches!(op, DrawOp::Line { stroke, .. } if stroke.dash.is_some()))
            .collect();
        assert_eq!(dashed, [vec![false; 8], vec![true; 4]].concat());
    }

    #[test]
    fn code_is_centered_at_85_percent() -> anyhow::Result<()> {
        let mut canvas = RecordingCanvas::new();
        renderer().draw_code_card(&mut canvas, &track("T", "A", "1999"), rect())?;
        canvas.finish_page();
        let images = canvas.image_rects(0);
        assert_eq!(images.len(), 1);
        let side = 252.0 * CODE_SCALE;
        assert!((images[0].w - side).abs() < 1e-3);
        let (cx, cy) = images[0].center();
        assert!((cx - 162.0).abs() < 1e-3);
        assert!((cy - 648.0).abs() < 1e-3);
        Ok(())
    }

    #[test]
    fn code_card_propagates_encoding_errors() {
        let mut canvas = RecordingCanvas::new();
        let mut bad = track("T", "A", "1999");
        bad.url.clear();
        let result = renderer().draw_code_card(&mut canvas, &bad, rect());
        assert!(matches!(result, Err(DeckError::Encoding { .. })));
    }

    #[test]
    fn unknown_year_is_black() {
        let layout = renderer().info_layout(&track("Song", "Band", "Unknown"), rect());
        assert_eq!(layout.year_color, RgbColor::BLACK);
        assert_eq!(layout.year.text, "Unknown");
    }

    #[test]
    fn long_title_is_single_ellipsized_line() {
        let title = "A".repeat(30) + " " + &"b".repeat(29);
        assert_eq!(title.chars().count(), 60);
        let layout = renderer().info_layout(&track(&title, "Band", "2001"), rect());
        assert_eq!(layout.title.len(), 1);
        assert!(layout.title[0].text.ends_with(ELLIPSIS));
    }

    #[test]
    fn info_draws_year_title_artist_in_order() {
        let mut canvas = RecordingCanvas::new();
        renderer().draw_info_card(&mut canvas, &track("Heroes", "David Bowie", "1977"), rect());
        let texts: Vec<&str> = canvas
            .pending()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["1977", "Heroes", "David Bowie"]);
    }

    #[test]
    fn worst_case_blocks_do_not_overlap() {
        let rect = DeckConfig::default().grid().expect("default grid").card_rect(0).expect("slot");
        let title = "MMMMM MMMMM MMMMM MMMMM MMMMM MMMMM MMMMM";
        let artists = "Mmmm Wwww, Mmmm Wwww, Mmmm Wwww, Mmmm Wwww";
        let layout = renderer().info_layout(&track(title, artists, "2024"), rect);
        assert_eq!(layout.title.len(), 3);
        assert_eq!(layout.artists.len(), 2);

        let year_bottom = layout.year.y;
        let title_top = layout.title[0].y + CAP * TITLE_STYLE.size;
        let title_bottom = layout.title[2].y - DESCENT * TITLE_STYLE.size;
        let artist_top = layout.artists[0].y + CAP * ARTIST_STYLE.size;
        let artist_bottom = layout.artists[1].y - DESCENT * ARTIST_STYLE.size;
        let year_top = layout.year.y + CAP * YEAR_STYLE.size;

        assert!(title_top < year_bottom);
        assert!(artist_top < title_bottom);
        assert!(year_top < rect.y + rect.h - CORNER_INSET);
        assert!(artist_bottom > rect.y + CORNER_INSET);
    }

    #[test]
    fn wide_word_titles_stay_below_the_year() -> anyhow::Result<()> {
        let grid = DeckConfig {
            cols: 3,
            rows: 4,
            ..DeckConfig::default()
        }
        .grid()?;
        let rect = grid.card_rect(0)?;
        let title = ["WWWWWWW"; 6].join(" ");
        assert!(title.chars().count() <= 50);
        let artists = ["Wwwwww Mmmmmm"; 3].join(", ");
        assert!(artists.chars().count() <= 50);
        let layout = renderer().info_layout(&track(&title, &artists, "1985"), rect);

        assert_eq!(layout.title.len(), MAX_TITLE_LINES);
        assert!(layout.title[2].text.ends_with(ELLIPSIS));
        assert_eq!(layout.artists.len(), MAX_ARTIST_LINES);

        let title_top = layout.title[0].y + CAP * TITLE_STYLE.size;
        let title_bottom = layout.title[2].y - DESCENT * TITLE_STYLE.size;
        let artist_top = layout.artists[0].y + CAP * ARTIST_STYLE.size;
        let artist_bottom = layout.artists[1].y - DESCENT * ARTIST_STYLE.size;
        assert!(title_top < layout.year.y);
        assert!(artist_top < title_bottom);
        assert!(artist_bottom > rect.y + CORNER_INSET);
        Ok(())
    }
}
