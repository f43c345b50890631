//! CPU to GPU cell-buffer bridge.
//!
//! Two equally sized flat arrays of packed [`CellInstance`] records: the
//! GPU samples the read buffer while the CPU rewrites the write buffer,
//! then the roles swap. Callers follow the serial discipline
//! `update → swap → read_buffer`.

use crate::terminal::cell::{Cell, CellAttrs, UnderlineStyle};
use crate::terminal::snapshot::GridSnapshot;

/// Glyph slot value meaning "draw nothing": empty cells and wide-char
/// continuations. Index 0 stays usable for a real glyph because empty
/// cells never sample atlas (0,0).
pub const GLYPH_NONE: u32 = u32::MAX;

/// Minimum instance-buffer capacity.
const MIN_CAPACITY: usize = 256;

/// Bit offset of the underline-style field inside [`CellInstance::attrs`].
const UNDERLINE_STYLE_SHIFT: u32 = 16;

/// One GPU instance record per cell. Field order and the attribute bit
/// layout are shared with the renderer; do not reorder.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellInstance {
    /// Atlas glyph index, or [`GLYPH_NONE`].
    pub glyph: u32,
    /// Low 16 bits: [`CellAttrs`] bits. Bits 16-18: underline style.
    pub attrs: u32,
    pub fg: [u8; 4],
    pub bg: [u8; 4],
    pub row: u16,
    pub col: u16,
}

impl Default for CellInstance {
    fn default() -> Self {
        Self {
            glyph: GLYPH_NONE,
            attrs: 0,
            fg: [0; 4],
            bg: [0; 4],
            row: 0,
            col: 0,
        }
    }
}

/// Double-buffered instance arrays with partial (dirty-range) updates.
pub struct CellBridge {
    buffers: [Vec<CellInstance>; 2],
    write: usize,
    rows: u16,
    cols: u16,
}

impl Default for CellBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl CellBridge {
    pub fn new() -> Self {
        Self {
            buffers: [Vec::new(), Vec::new()],
            write: 0,
            rows: 0,
            cols: 0,
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Rebuild the write buffer from a snapshot.
    ///
    /// With an unchanged grid size and a dirty range in the snapshot, the
    /// read buffer is first copied over as the baseline — without that,
    /// cells untouched for exactly one frame would resurface stale after
    /// the swap — and only the dirty slice is reconverted.
    pub fn update<F>(&mut self, snapshot: &GridSnapshot, mut glyph_of: F)
    where
        F: FnMut(&Cell) -> u32,
    {
        let needed = snapshot.cell_count();
        let capacity = needed.next_power_of_two().max(MIN_CAPACITY);
        let mut reallocated = false;
        for buffer in &mut self.buffers {
            if buffer.len() < capacity {
                buffer.resize(capacity, CellInstance::default());
                reallocated = true;
            }
        }
        let dims_changed = self.rows != snapshot.rows || self.cols != snapshot.cols;
        self.rows = snapshot.rows;
        self.cols = snapshot.cols;

        let range = match snapshot.damage.clone() {
            Some(damage) if !reallocated && !dims_changed => {
                let (read, write) = self.split_buffers();
                write[..needed].copy_from_slice(&read[..needed]);
                damage.start.min(needed)..damage.end.min(needed)
            }
            // No damage range, a fresh allocation, or new dimensions: the
            // whole buffer converts.
            _ => 0..needed,
        };

        for idx in range {
            let instance = convert_cell(snapshot, idx, &mut glyph_of);
            self.buffers[self.write][idx] = instance;
        }
    }

    /// Exchange the read and write roles. The previous read buffer
    /// reference becomes invalid for the consumer.
    pub fn swap(&mut self) {
        self.write = 1 - self.write;
    }

    /// The buffer the GPU should sample this frame.
    pub fn read_buffer(&self) -> &[CellInstance] {
        let count = self.rows as usize * self.cols as usize;
        &self.buffers[1 - self.write][..count]
    }

    fn split_buffers(&mut self) -> (&[CellInstance], &mut [CellInstance]) {
        let (a, b) = self.buffers.split_at_mut(1);
        if self.write == 0 {
            (&b[0], &mut a[0])
        } else {
            (&a[0], &mut b[0])
        }
    }
}

fn convert_cell<F>(snapshot: &GridSnapshot, idx: usize, glyph_of: &mut F) -> CellInstance
where
    F: FnMut(&Cell) -> u32,
{
    let cell = &snapshot.cells[idx];
    let cols = snapshot.cols as usize;

    // Continuation cell: the previous cell on the same row is a wide
    // primary. Mirror its colors and draw no glyph.
    let continuation = cols > 0
        && idx % cols != 0
        && snapshot.cells[idx - 1]
            .attrs
            .contains(CellAttrs::WIDE_CHAR);
    if continuation {
        let primary = &snapshot.cells[idx - 1];
        let (fg, bg) = resolve_colors(snapshot, primary);
        return CellInstance {
            glyph: GLYPH_NONE,
            attrs: pack_attrs(cell.attrs, cell.underline_style),
            fg,
            bg,
            row: cell.row,
            col: cell.col,
        };
    }

    let glyph = if cell.ch == '\0' {
        GLYPH_NONE
    } else {
        glyph_of(cell)
    };
    let (fg, bg) = resolve_colors(snapshot, cell);
    CellInstance {
        glyph,
        attrs: pack_attrs(cell.attrs, cell.underline_style),
        fg,
        bg,
        row: cell.row,
        col: cell.col,
    }
}

fn resolve_colors(snapshot: &GridSnapshot, cell: &Cell) -> ([u8; 4], [u8; 4]) {
    let bold = cell.attrs.contains(CellAttrs::BOLD);
    let (fr, fg_, fb) = snapshot
        .palette
        .resolve_fg(cell.fg, bold, snapshot.bold_is_bright);
    let (br, bg_, bb) = snapshot.palette.resolve_bg(cell.bg);
    ([fr, fg_, fb, 0xFF], [br, bg_, bb, 0xFF])
}

fn pack_attrs(attrs: CellAttrs, style: UnderlineStyle) -> u32 {
    let style_bits = match style {
        UnderlineStyle::Single => 0u32,
        UnderlineStyle::Double => 1,
        UnderlineStyle::Curly => 2,
        UnderlineStyle::Dotted => 3,
        UnderlineStyle::Dashed => 4,
    };
    attrs.bits() as u32 | (style_bits << UNDERLINE_STYLE_SHIFT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::Terminal;

    fn glyph_lookup(cell: &Cell) -> u32 {
        cell.ch as u32
    }

    #[test]
    fn full_conversion_then_partial_update() {
        let mut term = Terminal::new(8, 2);
        term.feed(b"ab");
        let snap = term.snapshot();
        let mut bridge = CellBridge::new();
        bridge.update(&snap, glyph_lookup);
        bridge.swap();
        let read = bridge.read_buffer();
        assert_eq!(read.len(), 16);
        assert_eq!(read[0].glyph, 'a' as u32);
        assert_eq!(read[1].glyph, 'b' as u32);
        assert_eq!(read[2].glyph, GLYPH_NONE);
        assert_eq!((read[1].row, read[1].col), (0, 1));

        // Frame 2: only 'c' lands; the partial update must inherit the
        // baseline so 'a' and 'b' survive the next swap too.
        term.feed(b"c");
        let snap = term.snapshot();
        assert!(snap.damage.is_some());
        bridge.update(&snap, glyph_lookup);
        bridge.swap();
        let read = bridge.read_buffer();
        assert_eq!(read[0].glyph, 'a' as u32);
        assert_eq!(read[2].glyph, 'c' as u32);

        // Frame 3: nothing changed; both buffers already agree.
        let snap = term.snapshot();
        bridge.update(&snap, glyph_lookup);
        bridge.swap();
        let read = bridge.read_buffer();
        assert_eq!(read[0].glyph, 'a' as u32);
        assert_eq!(read[1].glyph, 'b' as u32);
        assert_eq!(read[2].glyph, 'c' as u32);
    }

    #[test]
    fn resize_forces_full_conversion() {
        let mut term = Terminal::new(4, 2);
        term.feed(b"xy");
        let mut bridge = CellBridge::new();
        bridge.update(&term.snapshot(), glyph_lookup);
        bridge.swap();
        term.resize(6, 3);
        let snap = term.snapshot();
        assert!(snap.damage.is_none());
        bridge.update(&snap, glyph_lookup);
        bridge.swap();
        let read = bridge.read_buffer();
        assert_eq!(read.len(), 18);
        assert_eq!(read[0].glyph, 'x' as u32);
    }

    #[test]
    fn wide_continuation_gets_no_glyph_and_primary_colors() {
        let mut term = Terminal::new(8, 2);
        term.feed(b"\x1b[31m");
        term.feed("漢".as_bytes());
        let snap = term.snapshot();
        let mut bridge = CellBridge::new();
        bridge.update(&snap, glyph_lookup);
        bridge.swap();
        let read = bridge.read_buffer();
        assert_eq!(read[0].glyph, '漢' as u32);
        assert_eq!(read[1].glyph, GLYPH_NONE);
        assert_eq!(read[1].fg, read[0].fg);
        assert_eq!(read[1].bg, read[0].bg);
    }

    #[test]
    fn empty_cells_never_sample_glyph_zero() {
        let mut term = Terminal::new(4, 1);
        let snap = term.snapshot();
        let mut bridge = CellBridge::new();
        // A lookup that claims index 0 for everything.
        bridge.update(&snap, |_| 0);
        bridge.swap();
        for instance in bridge.read_buffer() {
            assert_eq!(instance.glyph, GLYPH_NONE);
        }
    }

    #[test]
    fn capacity_rounds_to_power_of_two_min_256() {
        let mut term = Terminal::new(80, 24);
        let snap = term.snapshot();
        let mut bridge = CellBridge::new();
        bridge.update(&snap, glyph_lookup);
        bridge.swap();
        assert_eq!(bridge.read_buffer().len(), 80 * 24);
        // 1920 cells round up to 2048 internally; a tiny grid floors at 256.
        let mut small = Terminal::new(2, 2);
        let mut bridge = CellBridge::new();
        bridge.update(&small.snapshot(), glyph_lookup);
        bridge.swap();
        assert_eq!(bridge.read_buffer().len(), 4);
        let _ = small.snapshot();
    }

    #[test]
    fn bold_is_bright_applies_at_conversion() {
        let mut term = Terminal::new(4, 1);
        term.feed(b"\x1b[1;31mA");
        let snap = term.snapshot();
        assert!(snap.bold_is_bright);
        let mut bridge = CellBridge::new();
        bridge.update(&snap, glyph_lookup);
        bridge.swap();
        let bright = snap.palette.get(9);
        assert_eq!(bridge.read_buffer()[0].fg, [bright.0, bright.1, bright.2, 0xFF]);
        // The stored cell still carries index 1.
        assert_eq!(
            snap.cell(0, 0).unwrap().fg,
            crate::terminal::color::Color::Indexed(1)
        );
    }
}
