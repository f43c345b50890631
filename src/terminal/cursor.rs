use super::cell::{CellAttrs, UnderlineStyle};
use super::charset::Charsets;
use super::color::Color;

/// Cursor shape for rendering, selected by DECSCUSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Block,
    Underline,
    Bar,
}

/// Cursor position plus the working SGR state ("pen") that every newly
/// printed character inherits.
///
/// `col` may equal the column count: that is the pre-wrap sentinel, and the
/// next printable write wraps first when auto-wrap is enabled.
#[derive(Debug, Clone)]
pub struct CursorState {
    pub row: u16,
    pub col: u16,
    pub fg: Color,
    pub bg: Color,
    pub underline_color: Color,
    pub attrs: CellAttrs,
    pub underline_style: UnderlineStyle,
    pub shape: CursorShape,
    pub blinking: bool,
    pub visible: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            fg: Color::Default,
            bg: Color::Default,
            underline_color: Color::Default,
            attrs: CellAttrs::empty(),
            underline_style: UnderlineStyle::Single,
            shape: CursorShape::Block,
            blinking: true,
            visible: true,
        }
    }
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// SGR 0: drop every attribute and color back to defaults.
    pub fn reset_pen(&mut self) {
        self.fg = Color::Default;
        self.bg = Color::Default;
        self.underline_color = Color::Default;
        self.attrs = CellAttrs::empty();
        self.underline_style = UnderlineStyle::Single;
    }
}

/// Saved cursor context for DECSC/DECRC and CSI s/u: position, pen, and
/// charset designation state.
#[derive(Debug, Clone)]
pub struct SavedContext {
    pub row: u16,
    pub col: u16,
    pub fg: Color,
    pub bg: Color,
    pub underline_color: Color,
    pub attrs: CellAttrs,
    pub underline_style: UnderlineStyle,
    pub charsets: Charsets,
    pub origin: bool,
}

impl SavedContext {
    pub fn capture(cursor: &CursorState, charsets: Charsets, origin: bool) -> Self {
        Self {
            row: cursor.row,
            col: cursor.col,
            fg: cursor.fg,
            bg: cursor.bg,
            underline_color: cursor.underline_color,
            attrs: cursor.attrs,
            underline_style: cursor.underline_style,
            charsets,
            origin,
        }
    }

    pub fn restore_into(&self, cursor: &mut CursorState) {
        cursor.row = self.row;
        cursor.col = self.col;
        cursor.fg = self.fg;
        cursor.bg = self.bg;
        cursor.underline_color = self.underline_color;
        cursor.attrs = self.attrs;
        cursor.underline_style = self.underline_style;
    }
}
