//! Core library for printable duplex song-card decks.

pub mod color;
pub mod compose;
pub mod config;
pub mod error;
pub mod layout;
pub mod library;
pub mod metrics;
pub mod qr;
pub mod render;
pub mod source;
pub mod track;

pub use color::{RgbColor, color_for_year};
pub use compose::{DeckCompositor, DeckSummary, Placement, Sheet, plan_sheets};
pub use config::{AppConfig, Credentials, DeckConfig, FetchConfig};
pub use error::{DeckError, FetchError};
pub use layout::{CardRect, PageGrid, mirror_index};
pub use library::LikedTrack;
pub use metrics::{Font, Helvetica, TextMeasure};
pub use qr::CodeImageProducer;
pub use render::{Canvas, CardRenderer, PdfCanvas, RecordingCanvas};
pub use source::{SpotifyClient, TrackSource, UserAuth, fetch_playlists};
pub use track::{TrackList, TrackRecord};

use std::path::Path;

/// Title stored in the PDF metadata of generated decks.
pub const DOCUMENT_TITLE: &str = "Song Cards";

/// Build the standard compositor (Helvetica metrics) for `config`.
pub fn deck_compositor(config: &DeckConfig) -> Result<DeckCompositor<Helvetica>, DeckError> {
    let grid = config.grid()?;
    let renderer = CardRenderer::new(Helvetica, CodeImageProducer::new(config.code_pixels));
    Ok(DeckCompositor::new(grid, renderer))
}

/// Lay out `records` and write the finished deck as a PDF at `output`.
pub fn render_deck_pdf(
    records: &[TrackRecord],
    config: &DeckConfig,
    output: &Path,
) -> Result<DeckSummary, DeckError> {
    let compositor = deck_compositor(config)?;
    let mut canvas = PdfCanvas::new(DOCUMENT_TITLE, compositor.grid().page_size())?;
    let summary = compositor.compose(records, &mut canvas)?;
    canvas.save(output)?;
    Ok(summary)
}
