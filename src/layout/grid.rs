use crate::error::DeckError;

/// Rectangle in PDF user space: origin bottom-left, `y` grows upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl CardRect {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn min_side(&self) -> f32 {
        self.w.min(self.h)
    }
}

/// Equal `cols × rows` partition of a page inset by a uniform margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGrid {
    page_width: f32,
    page_height: f32,
    margin: f32,
    cols: usize,
    rows: usize,
    cell_width: f32,
    cell_height: f32,
}

impl PageGrid {
    pub fn new(
        page_width: f32,
        page_height: f32,
        margin: f32,
        cols: usize,
        rows: usize,
    ) -> Result<Self, DeckError> {
        if cols == 0 || rows == 0 {
            return Err(DeckError::layout(format!(
                "grid must have at least one column and row (got {cols}x{rows})"
            )));
        }
        if !(margin >= 0.0) {
            return Err(DeckError::layout(format!("margin must be non-negative (got {margin})")));
        }
        let cell_width = (page_width - 2.0 * margin) / cols as f32;
        let cell_height = (page_height - 2.0 * margin) / rows as f32;
        if !(cell_width > 0.0 && cell_height > 0.0) {
            return Err(DeckError::layout(format!(
                "cards would be {cell_width}x{cell_height}pt on a {page_width}x{page_height}pt page \
                 with {margin}pt margins"
            )));
        }
        Ok(Self {
            page_width,
            page_height,
            margin,
            cols,
            rows,
            cell_width,
            cell_height,
        })
    }

    pub fn page_size(&self) -> (f32, f32) {
        (self.page_width, self.page_height)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cards_per_page(&self) -> usize {
        self.cols * self.rows
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// Rectangle of slot `index`; slot 0 is the top-left card.
    pub fn card_rect(&self, index: usize) -> Result<CardRect, DeckError> {
        self.check_slot(index)?;
        let row = index / self.cols;
        let col = index % self.cols;
        Ok(CardRect {
            x: self.margin + col as f32 * self.cell_width,
            y: self.page_height - self.margin - (row + 1) as f32 * self.cell_height,
            w: self.cell_width,
            h: self.cell_height,
        })
    }

    /// Slot on the reverse side that backs onto `index` after a long-edge flip.
    pub fn mirror_index(&self, index: usize) -> Result<usize, DeckError> {
        self.check_slot(index)?;
        mirror_index(index, self.cols)
    }

    fn check_slot(&self, index: usize) -> Result<(), DeckError> {
        if index >= self.cards_per_page() {
            return Err(DeckError::layout(format!(
                "card slot {} out of range 0..{}",
                index,
                self.cards_per_page()
            )));
        }
        Ok(())
    }
}

/// Reverse the column of `index` within its row.
pub fn mirror_index(index: usize, cols: usize) -> Result<usize, DeckError> {
    if cols == 0 {
        return Err(DeckError::layout("cannot mirror a slot in a grid with no columns"));
    }
    Ok((index / cols) * cols + (cols - 1 - index % cols))
}

/// Stateless form of [`PageGrid::card_rect`].
pub fn card_rect(
    index: usize,
    page_width: f32,
    page_height: f32,
    margin: f32,
    cols: usize,
    rows: usize,
) -> Result<CardRect, DeckError> {
    PageGrid::new(page_width, page_height, margin, cols, rows)?.card_rect(index)
}
