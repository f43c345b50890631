use bitflags::bitflags;

use super::color::Color;

bitflags! {
    /// Cell text attributes as a compact bitflag set.
    ///
    /// The bit positions are part of the snapshot/bridge contract: the GPU
    /// renderer indexes these exact bits, so they must never be reordered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellAttrs: u16 {
        const BOLD             = 1 << 0;
        const DIM              = 1 << 1;
        const ITALIC           = 1 << 2;
        const UNDERLINE        = 1 << 3;
        const DOUBLE_UNDERLINE = 1 << 4;
        const BLINK            = 1 << 5;
        const REVERSE          = 1 << 6;
        const HIDDEN           = 1 << 7;
        const STRIKETHROUGH    = 1 << 8;
        const OVERLINE         = 1 << 9;
        /// This cell holds a wide (2-column) character.
        const WIDE_CHAR        = 1 << 10;
        /// DECSCA protected cell; selective erase leaves it alone.
        const PROTECTED        = 1 << 11;
        /// A hyperlink id is attached to this cell.
        const HYPERLINK        = 1 << 12;
    }
}

/// Underline rendering style selected by SGR `4:n`.
///
/// Only meaningful while `CellAttrs::UNDERLINE` (or `DOUBLE_UNDERLINE`) is
/// set; a plain SGR 4 selects `Single`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum UnderlineStyle {
    #[default]
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

/// A single terminal cell.
///
/// `ch == '\0'` marks an empty cell: a never-written cell or the trailing
/// half of a wide character. Row and column are stored redundantly because
/// the cell bridge consumes cells as a flat slice without positional
/// context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub underline_color: Color,
    pub attrs: CellAttrs,
    pub underline_style: UnderlineStyle,
    /// 1-based id into the terminal's hyperlink table; 0 when none.
    pub hyperlink: u16,
    pub row: u16,
    pub col: u16,
}

impl Cell {
    /// A blank cell at the given position.
    pub fn blank(row: u16, col: u16) -> Self {
        Self {
            ch: '\0',
            fg: Color::Default,
            bg: Color::Default,
            underline_color: Color::Default,
            attrs: CellAttrs::empty(),
            underline_style: UnderlineStyle::Single,
            hyperlink: 0,
            row,
            col,
        }
    }

    /// The trailing spacer for a wide character. Colors mirror the primary
    /// cell; the wide-char bit is clear and the glyph slot is empty.
    pub fn wide_spacer(primary: &Cell, row: u16, col: u16) -> Self {
        Self {
            ch: '\0',
            fg: primary.fg,
            bg: primary.bg,
            underline_color: primary.underline_color,
            attrs: primary.attrs - CellAttrs::WIDE_CHAR,
            underline_style: primary.underline_style,
            hyperlink: primary.hyperlink,
            row,
            col,
        }
    }

    /// True for cells with no glyph (blank or wide-spacer).
    pub fn is_empty(&self) -> bool {
        self.ch == '\0'
    }

    /// Erase this cell using the given background color (per ECMA-48,
    /// erased cells keep the erasing background).
    pub fn erase(&mut self, bg: Color) {
        self.ch = ' ';
        self.fg = Color::Default;
        self.bg = bg;
        self.underline_color = Color::Default;
        self.attrs = CellAttrs::empty();
        self.underline_style = UnderlineStyle::Single;
        self.hyperlink = 0;
    }

    /// Reset to the never-written blank state, keeping position.
    pub fn clear(&mut self) {
        let (row, col) = (self.row, self.col);
        *self = Cell::blank(row, col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_spacer_mirrors_primary_colors() {
        let mut primary = Cell::blank(3, 7);
        primary.ch = '漢';
        primary.fg = Color::Indexed(2);
        primary.bg = Color::Rgb(1, 2, 3);
        primary.attrs = CellAttrs::BOLD | CellAttrs::WIDE_CHAR;

        let spacer = Cell::wide_spacer(&primary, 3, 8);
        assert!(spacer.is_empty());
        assert_eq!(spacer.fg, primary.fg);
        assert_eq!(spacer.bg, primary.bg);
        assert!(!spacer.attrs.contains(CellAttrs::WIDE_CHAR));
        assert!(spacer.attrs.contains(CellAttrs::BOLD));
        assert_eq!((spacer.row, spacer.col), (3, 8));
    }

    #[test]
    fn erase_keeps_background() {
        let mut cell = Cell::blank(0, 0);
        cell.ch = 'x';
        cell.attrs = CellAttrs::ITALIC;
        cell.erase(Color::Indexed(4));
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.bg, Color::Indexed(4));
        assert!(cell.attrs.is_empty());
    }
}
