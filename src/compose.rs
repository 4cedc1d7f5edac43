//! Pagination of track records into duplex front/back sheets.

use log::info;

use crate::error::DeckError;
use crate::layout::PageGrid;
use crate::metrics::TextMeasure;
use crate::render::{Canvas, CardRenderer};
use crate::track::TrackRecord;

/// Which face of the printed sheet a page carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Codes,
    Info,
}

/// Record `record` drawn into card slot `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub record: usize,
    pub slot: usize,
}

/// One physical sheet: the code page and the info page printed on its back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub front: Vec<Placement>,
    pub back: Vec<Placement>,
}

/// Split `record_count` records into sheets of `grid.cards_per_page()` cards.
///
/// Back placements reuse the record order of the front but sit in the
/// mirrored slot, so each code backs onto its own info after a long-edge flip.
pub fn plan_sheets(record_count: usize, grid: &PageGrid) -> Result<Vec<Sheet>, DeckError> {
    if record_count == 0 {
        return Err(DeckError::layout("no tracks to lay out"));
    }
    let per_page = grid.cards_per_page();
    let mut sheets = Vec::with_capacity(record_count.div_ceil(per_page));
    for start in (0..record_count).step_by(per_page) {
        let end = (start + per_page).min(record_count);
        let mut front = Vec::with_capacity(end - start);
        let mut back = Vec::with_capacity(end - start);
        for (slot, record) in (start..end).enumerate() {
            front.push(Placement { record, slot });
            back.push(Placement {
                record,
                slot: grid.mirror_index(slot)?,
            });
        }
        sheets.push(Sheet { front, back });
    }
    Ok(sheets)
}

/// Result of composing a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckSummary {
    pub cards: usize,
    pub pages: usize,
}

/// Drives the card renderer page by page.
pub struct DeckCompositor<M> {
    grid: PageGrid,
    renderer: CardRenderer<M>,
}

impl<M: TextMeasure> DeckCompositor<M> {
    pub fn new(grid: PageGrid, renderer: CardRenderer<M>) -> Self {
        Self { grid, renderer }
    }

    pub fn grid(&self) -> &PageGrid {
        &self.grid
    }

    /// Emit front page 1, back page 1, front page 2, ... onto `canvas`.
    pub fn compose<C: Canvas>(
        &self,
        records: &[TrackRecord],
        canvas: &mut C,
    ) -> Result<DeckSummary, DeckError> {
        let sheets = plan_sheets(records.len(), &self.grid)?;
        let total_pages = sheets.len() * 2;
        info!(
            "composing {} card(s) on {} page(s) ({} front, {} back)",
            records.len(),
            total_pages,
            sheets.len(),
            sheets.len()
        );

        for (sheet_idx, sheet) in sheets.iter().enumerate() {
            let page = sheet_idx * 2 + 1;
            self.draw_side(records, &sheet.front, Side::Codes, page, total_pages, canvas)?;
            self.draw_side(records, &sheet.back, Side::Info, page + 1, total_pages, canvas)?;
        }

        Ok(DeckSummary {
            cards: records.len(),
            pages: total_pages,
        })
    }

    fn draw_side<C: Canvas>(
        &self,
        records: &[TrackRecord],
        placements: &[Placement],
        side: Side,
        page: usize,
        total_pages: usize,
        canvas: &mut C,
    ) -> Result<(), DeckError> {
        let label = match side {
            Side::Codes => "codes",
            Side::Info => "track info",
        };
        info!("creating page {page}/{total_pages} ({label})");
        for placement in placements {
            let record = &records[placement.record];
            let rect = self.grid.card_rect(placement.slot)?;
            match side {
                Side::Codes => self.renderer.draw_code_card(canvas, record, rect)?,
                Side::Info => self.renderer.draw_info_card(canvas, record, rect),
            }
        }
        canvas.finish_page();
        Ok(())
    }
}
