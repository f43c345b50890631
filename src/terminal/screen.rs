use super::cell::Cell;
use super::color::Color;

/// Minimal dirty coverage over the flat cell array since the last snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Contiguous `[lo, hi)` index range; `lo == hi` means clean.
    Range { lo: usize, hi: usize },
    /// Dimensions changed or both buffers were touched; the consumer must
    /// do a full upload.
    Full,
}

impl Damage {
    pub fn clean() -> Self {
        Damage::Range { lo: 0, hi: 0 }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Damage::Range { lo, hi } if lo == hi)
    }

    /// Grow the range to include a single flat index.
    pub fn add(&mut self, idx: usize) {
        self.add_span(idx, idx + 1);
    }

    /// Grow the range to include `[span_lo, span_hi)`.
    pub fn add_span(&mut self, span_lo: usize, span_hi: usize) {
        if span_lo >= span_hi {
            return;
        }
        match self {
            Damage::Full => {}
            Damage::Range { lo, hi } => {
                if *lo == *hi {
                    *lo = span_lo;
                    *hi = span_hi;
                } else {
                    *lo = (*lo).min(span_lo);
                    *hi = (*hi).max(span_hi);
                }
            }
        }
    }

    pub fn all(&mut self) {
        *self = Damage::Full;
    }
}

/// One cell matrix: a single contiguous row-major array addressed as
/// `row * cols + col`. The terminal owns two of these (primary and
/// alternate); scrollback lives outside, attached to the primary only.
#[derive(Debug, Clone)]
pub struct Screen {
    cells: Vec<Cell>,
    rows: u16,
    cols: u16,
}

impl Screen {
    pub fn new(rows: u16, cols: u16) -> Self {
        let mut screen = Self {
            cells: Vec::new(),
            rows,
            cols,
        };
        screen.rebuild_blank();
        screen
    }

    fn rebuild_blank(&mut self) {
        let count = self.rows as usize * self.cols as usize;
        self.cells.clear();
        self.cells.reserve_exact(count);
        for idx in 0..count {
            let row = (idx / self.cols.max(1) as usize) as u16;
            let col = (idx % self.cols.max(1) as usize) as u16;
            self.cells.push(Cell::blank(row, col));
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn index(&self, row: u16, col: u16) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            Some(&self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, row: u16, col: u16) -> Option<&mut Cell> {
        if row < self.rows && col < self.cols {
            let idx = self.index(row, col);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    pub fn row_slice(&self, row: u16) -> &[Cell] {
        let start = self.index(row, 0);
        &self.cells[start..start + self.cols as usize]
    }

    pub fn row_slice_mut(&mut self, row: u16) -> &mut [Cell] {
        let start = self.index(row, 0);
        let cols = self.cols as usize;
        &mut self.cells[start..start + cols]
    }

    /// Write a cell, stamping its redundant position fields.
    pub fn put(&mut self, row: u16, col: u16, mut cell: Cell) {
        if row < self.rows && col < self.cols {
            cell.row = row;
            cell.col = col;
            let idx = self.index(row, col);
            self.cells[idx] = cell;
        }
    }

    /// Erase `[start_col, end_col)` of a row with the given background.
    pub fn erase_span(&mut self, row: u16, start_col: u16, end_col: u16, bg: Color) {
        if row >= self.rows {
            return;
        }
        let end = end_col.min(self.cols);
        for col in start_col..end {
            let idx = self.index(row, col);
            self.cells[idx].erase(bg);
        }
    }

    pub fn erase_row(&mut self, row: u16, bg: Color) {
        self.erase_span(row, 0, self.cols, bg);
    }

    /// Blank every cell back to the never-written state.
    pub fn clear_all(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Fill every cell with a plain character (DECALN).
    pub fn fill_with(&mut self, ch: char) {
        for cell in &mut self.cells {
            let (row, col) = (cell.row, cell.col);
            *cell = Cell::blank(row, col);
            cell.ch = ch;
        }
    }

    /// Scroll rows `[top, bottom]` up by one line, blanking the bottom row.
    /// Returns a copy of the evicted top row so the caller can decide
    /// whether it belongs in scrollback.
    pub fn scroll_up_region(&mut self, top: u16, bottom: u16) -> Option<Box<[Cell]>> {
        if top > bottom || bottom >= self.rows || self.cols == 0 {
            return None;
        }
        let evicted: Box<[Cell]> = self.row_slice(top).into();

        let cols = self.cols as usize;
        let start = self.index(top, 0);
        let end = self.index(bottom, 0) + cols;
        self.cells.copy_within(start + cols..end, start);
        for row in top..bottom {
            // Restamp moved rows; the bridge relies on accurate positions.
            for cell in self.row_slice_mut(row) {
                cell.row = row;
            }
        }
        for cell in self.row_slice_mut(bottom) {
            let col = cell.col;
            *cell = Cell::blank(bottom, col);
        }
        Some(evicted)
    }

    /// Scroll rows `[top, bottom]` down by one line, blanking the top row.
    pub fn scroll_down_region(&mut self, top: u16, bottom: u16) {
        if top > bottom || bottom >= self.rows || self.cols == 0 {
            return;
        }
        let cols = self.cols as usize;
        let start = self.index(top, 0);
        let end = self.index(bottom, 0) + cols;
        self.cells.copy_within(start..end - cols, start + cols);
        for row in (top + 1)..=bottom {
            for cell in self.row_slice_mut(row) {
                cell.row = row;
            }
        }
        for cell in self.row_slice_mut(top) {
            let col = cell.col;
            *cell = Cell::blank(top, col);
        }
    }

    /// Insert blank cells at (row, col), evicting cells off the right edge.
    pub fn insert_cells(&mut self, row: u16, col: u16, count: u16) {
        if row >= self.rows || col >= self.cols || count == 0 {
            return;
        }
        let cols = self.cols as usize;
        let col = col as usize;
        let count = (count as usize).min(cols - col);
        let slice = self.row_slice_mut(row);
        slice.copy_within(col..cols - count, col + count);
        for (i, cell) in slice.iter_mut().enumerate().skip(col) {
            cell.col = i as u16;
            if i < col + count {
                let (r, c) = (cell.row, cell.col);
                *cell = Cell::blank(r, c);
            }
        }
    }

    /// Delete cells at (row, col), pulling the remainder left and filling
    /// the right edge with erased cells in the given background.
    pub fn delete_cells(&mut self, row: u16, col: u16, count: u16, bg: Color) {
        if row >= self.rows || col >= self.cols || count == 0 {
            return;
        }
        let cols = self.cols as usize;
        let col = col as usize;
        let count = (count as usize).min(cols - col);
        let slice = self.row_slice_mut(row);
        slice.copy_within(col + count..cols, col);
        for (i, cell) in slice.iter_mut().enumerate().skip(col) {
            cell.col = i as u16;
            if i >= cols - count {
                cell.erase(bg);
            }
        }
    }

    /// Resize, preserving the overlapping region and blanking new space.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        if rows == self.rows && cols == self.cols {
            return;
        }
        let mut next = Screen::new(rows, cols);
        let copy_rows = rows.min(self.rows);
        let copy_cols = cols.min(self.cols);
        for row in 0..copy_rows {
            for col in 0..copy_cols {
                let idx = self.index(row, col);
                next.put(row, col, self.cells[idx]);
            }
        }
        *self = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_char(screen: &mut Screen, row: u16, col: u16, ch: char) {
        let mut cell = Cell::blank(row, col);
        cell.ch = ch;
        screen.put(row, col, cell);
    }

    fn row_text(screen: &Screen, row: u16) -> String {
        screen
            .row_slice(row)
            .iter()
            .map(|c| if c.ch == '\0' { ' ' } else { c.ch })
            .collect()
    }

    #[test]
    fn scroll_up_evicts_top_row() {
        let mut screen = Screen::new(3, 4);
        put_char(&mut screen, 0, 0, 'a');
        put_char(&mut screen, 1, 0, 'b');
        put_char(&mut screen, 2, 0, 'c');

        let evicted = screen.scroll_up_region(0, 2).unwrap();
        assert_eq!(evicted[0].ch, 'a');
        assert_eq!(row_text(&screen, 0), "b   ");
        assert_eq!(row_text(&screen, 1), "c   ");
        assert_eq!(row_text(&screen, 2), "    ");
        // Positions were restamped.
        assert_eq!(screen.cell(0, 0).unwrap().row, 0);
    }

    #[test]
    fn scroll_down_blanks_top() {
        let mut screen = Screen::new(3, 2);
        put_char(&mut screen, 0, 0, 'a');
        put_char(&mut screen, 1, 0, 'b');
        put_char(&mut screen, 2, 0, 'c');
        screen.scroll_down_region(0, 2);
        assert_eq!(row_text(&screen, 0), "  ");
        assert_eq!(row_text(&screen, 1), "a ");
        assert_eq!(row_text(&screen, 2), "b ");
    }

    #[test]
    fn region_scroll_leaves_outside_rows() {
        let mut screen = Screen::new(4, 2);
        for (row, ch) in ['a', 'b', 'c', 'd'].into_iter().enumerate() {
            put_char(&mut screen, row as u16, 0, ch);
        }
        screen.scroll_up_region(1, 2);
        assert_eq!(row_text(&screen, 0), "a ");
        assert_eq!(row_text(&screen, 1), "c ");
        assert_eq!(row_text(&screen, 2), "  ");
        assert_eq!(row_text(&screen, 3), "d ");
    }

    #[test]
    fn insert_and_delete_cells() {
        let mut screen = Screen::new(1, 5);
        for (col, ch) in "abcde".chars().enumerate() {
            put_char(&mut screen, 0, col as u16, ch);
        }
        screen.insert_cells(0, 1, 2);
        assert_eq!(row_text(&screen, 0), "a  bc");
        screen.delete_cells(0, 0, 3, Color::Default);
        assert_eq!(row_text(&screen, 0), "bc   ");
    }

    #[test]
    fn resize_preserves_overlap() {
        let mut screen = Screen::new(2, 3);
        put_char(&mut screen, 0, 0, 'x');
        put_char(&mut screen, 1, 2, 'y');
        screen.resize(3, 2);
        assert_eq!(screen.cell(0, 0).unwrap().ch, 'x');
        assert_eq!(screen.cell(1, 1).unwrap().ch, '\0');
        assert_eq!(screen.cell_count(), 6);
    }

    #[test]
    fn zero_size_is_inert() {
        let mut screen = Screen::new(0, 0);
        assert_eq!(screen.cell_count(), 0);
        screen.erase_row(0, Color::Default);
        screen.insert_cells(0, 0, 3);
        assert!(screen.scroll_up_region(0, 0).is_none());
    }

    #[test]
    fn damage_range_accumulates() {
        let mut damage = Damage::clean();
        assert!(damage.is_clean());
        damage.add(5);
        damage.add_span(10, 12);
        assert_eq!(damage, Damage::Range { lo: 5, hi: 12 });
        damage.add(2);
        assert_eq!(damage, Damage::Range { lo: 2, hi: 12 });
        damage.all();
        damage.add(40);
        assert_eq!(damage, Damage::Full);
    }
}
