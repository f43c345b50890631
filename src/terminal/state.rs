use std::collections::VecDeque;

use unicode_width::UnicodeWidthChar;

use crate::config::Config;
use crate::parser::{Params, Perform};

use super::cell::{Cell, CellAttrs};
use super::charset::Charsets;
use super::color::Palette;
use super::cursor::{CursorState, SavedContext};
use super::modes::TerminalModes;
use super::screen::{Damage, Screen};
use super::snapshot::{CursorView, GridSnapshot};
use super::{csi, dcs, esc, osc};

/// DCS passthrough payload cap in bytes.
const MAX_DCS_LEN: usize = 4096;

/// REP repeats beyond this are dropped.
const MAX_REPEAT: u16 = 2048;

/// Cap on distinct hyperlink URIs interned per terminal.
const MAX_HYPERLINKS: usize = 4096;

type ByteSink = Box<dyn FnMut(&[u8]) + Send>;

/// Full terminal state: both cell matrices, scrollback, cursor, modes, and
/// the working SGR/charset/hyperlink context. Implements [`Perform`] to
/// process escape sequences.
///
/// All operations are total. Malformed or unknown sequences are consumed
/// silently; the only observable failure mode is the absence of an effect.
pub struct TerminalState {
    pub cursor: CursorState,
    pub modes: TerminalModes,
    pub charsets: Charsets,
    pub(crate) palette: Palette,
    pub title: String,
    pub icon_title: String,

    screen: Screen,
    alt_screen: Screen,
    alt_active: bool,
    /// Ring of rows that scrolled off the primary buffer's top.
    scrollback: VecDeque<Box<[Cell]>>,
    scrollback_limit: usize,
    rows: u16,
    cols: u16,
    scroll_top: u16,
    scroll_bottom: u16,
    tab_stops: Vec<bool>,
    tab_interval: u16,
    working_dir: Option<String>,
    bell_count: u64,
    /// Interned OSC 8 URIs; cells store 1-based ids into this table.
    hyperlinks: Vec<String>,
    active_hyperlink: u16,
    /// Last character passed through `print()`, used by CSI REP (`b`).
    last_printed: char,
    saved: Option<SavedContext>,
    /// Cursor context saved by DECSET 1049 across the alt-screen switch.
    alt_saved: Option<SavedContext>,
    damage: Damage,
    /// Responses queued when no sink is registered.
    pending_responses: Vec<Vec<u8>>,
    response_sink: Option<ByteSink>,
    clipboard_sink: Option<ByteSink>,
    bold_is_bright: bool,

    dcs_buffer: Vec<u8>,
    dcs_intermediates: Vec<u8>,
    dcs_action: Option<char>,
}

impl TerminalState {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self::with_config(cols, rows, &Config::default())
    }

    pub fn with_config(cols: u16, rows: u16, config: &Config) -> Self {
        Self {
            cursor: CursorState::new(),
            modes: TerminalModes::default(),
            charsets: Charsets::default(),
            palette: Palette::default(),
            title: String::new(),
            icon_title: String::new(),
            screen: Screen::new(rows, cols),
            alt_screen: Screen::new(rows, cols),
            alt_active: false,
            scrollback: VecDeque::new(),
            scrollback_limit: config.scrollback_lines,
            rows,
            cols,
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            tab_stops: build_tab_stops(cols, config.tab_interval),
            tab_interval: config.tab_interval,
            working_dir: None,
            bell_count: 0,
            hyperlinks: Vec::new(),
            active_hyperlink: 0,
            last_printed: ' ',
            saved: None,
            alt_saved: None,
            damage: Damage::Full,
            pending_responses: Vec::new(),
            response_sink: None,
            clipboard_sink: None,
            bold_is_bright: config.bold_is_bright,
            dcs_buffer: Vec::new(),
            dcs_intermediates: Vec::new(),
            dcs_action: None,
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn scroll_top(&self) -> u16 {
        self.scroll_top
    }

    pub fn scroll_bottom(&self) -> u16 {
        self.scroll_bottom
    }

    pub fn bell_count(&self) -> u64 {
        self.bell_count
    }

    pub fn working_dir(&self) -> Option<&str> {
        self.working_dir.as_deref()
    }

    pub fn alt_screen_active(&self) -> bool {
        self.alt_active
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    pub fn scrollback_line(&self, idx: usize) -> Option<&[Cell]> {
        self.scrollback.get(idx).map(|l| l.as_ref())
    }

    pub fn hyperlink_uri(&self, id: u16) -> Option<&str> {
        if id == 0 {
            None
        } else {
            self.hyperlinks.get(id as usize - 1).map(|s| s.as_str())
        }
    }

    /// Register the writer that carries response bytes back upstream.
    /// Responses queued before registration stay queued.
    pub fn set_response_sink(&mut self, sink: ByteSink) {
        self.response_sink = Some(sink);
    }

    /// Register the OSC 52 clipboard-write target. Reads are always
    /// denied, so there is no read hook.
    pub fn set_clipboard_write(&mut self, sink: ByteSink) {
        self.clipboard_sink = Some(sink);
    }

    /// Drain queued response bytes for sink-less embeddings.
    pub fn take_pending_responses(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.pending_responses)
    }

    pub(crate) fn respond(&mut self, bytes: &[u8]) {
        match &mut self.response_sink {
            Some(sink) => sink(bytes),
            None => self.pending_responses.push(bytes.to_vec()),
        }
    }

    pub(crate) fn clipboard_write(&mut self, bytes: &[u8]) {
        if let Some(sink) = &mut self.clipboard_sink {
            sink(bytes);
        }
    }

    // ------------------------------------------------------------------
    // Screen plumbing
    // ------------------------------------------------------------------

    fn active_screen(&self) -> &Screen {
        if self.alt_active {
            &self.alt_screen
        } else {
            &self.screen
        }
    }

    fn active_screen_mut(&mut self) -> &mut Screen {
        if self.alt_active {
            &mut self.alt_screen
        } else {
            &mut self.screen
        }
    }

    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        self.active_screen().cell(row, col)
    }

    fn touch(&mut self, row: u16, col: u16) {
        if row < self.rows && col < self.cols {
            let idx = row as usize * self.cols as usize + col as usize;
            self.damage.add(idx);
        }
    }

    /// Mark rows `[top, bottom]` dirty.
    fn touch_rows(&mut self, top: u16, bottom: u16) {
        if self.rows == 0 || self.cols == 0 {
            return;
        }
        let bottom = bottom.min(self.rows - 1);
        if top > bottom {
            return;
        }
        let cols = self.cols as usize;
        self.damage
            .add_span(top as usize * cols, (bottom as usize + 1) * cols);
    }

    fn touch_span(&mut self, row: u16, col_lo: u16, col_hi: u16) {
        if self.rows == 0 || self.cols == 0 || row >= self.rows {
            return;
        }
        let cols = self.cols as usize;
        let lo = row as usize * cols + (col_lo.min(self.cols)) as usize;
        let hi = row as usize * cols + (col_hi.min(self.cols)) as usize;
        self.damage.add_span(lo, hi);
    }

    fn touch_all(&mut self) {
        self.damage.all();
    }

    // ------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------

    /// Immutable per-frame view of the active screen. Taking a snapshot
    /// atomically resets dirty tracking; with no intervening mutation the
    /// next snapshot reports an empty dirty range.
    pub fn take_snapshot(&mut self) -> GridSnapshot {
        let damage = match self.damage {
            Damage::Full => None,
            Damage::Range { lo, hi } => Some(lo..hi),
        };
        self.damage = Damage::clean();
        GridSnapshot {
            cells: self.active_screen().cells().to_vec(),
            rows: self.rows,
            cols: self.cols,
            cursor: CursorView {
                row: self.cursor.row,
                col: self.cursor.col,
                shape: self.cursor.shape,
                blinking: self.cursor.blinking,
                visible: self.cursor.visible,
            },
            damage,
            palette: self.palette.clone(),
            bold_is_bright: self.bold_is_bright,
            hyperlinks: self.hyperlinks.clone(),
        }
    }

    /// Grid resize: surviving cells are preserved, the rest truncated or
    /// padded; cursor and scroll region are re-clamped. Idempotent when
    /// the size is unchanged.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if cols == self.cols && rows == self.rows {
            return;
        }
        tracing::info!(cols, rows, "terminal resize");
        self.screen.resize(rows, cols);
        // Alt-screen content is disposable: full-screen apps repaint from
        // scratch on resize, matching xterm behavior.
        self.alt_screen = Screen::new(rows, cols);
        self.rows = rows;
        self.cols = cols;
        self.scroll_top = 0;
        self.scroll_bottom = rows.saturating_sub(1);
        self.tab_stops = build_tab_stops(cols, self.tab_interval);
        self.cursor.row = self.cursor.row.min(rows.saturating_sub(1));
        self.cursor.col = self.cursor.col.min(cols.saturating_sub(1));
        // Column truncation may have cut a wide pair at the new edge.
        if cols > 0 {
            for row in 0..rows {
                self.clear_wide_primary_at(row, cols - 1);
            }
        }
        self.touch_all();
    }

    // ------------------------------------------------------------------
    // Cursor movement and control functions
    // ------------------------------------------------------------------

    pub(crate) fn carriage_return(&mut self) {
        self.cursor.col = 0;
    }

    pub(crate) fn linefeed(&mut self) {
        if self.rows == 0 {
            return;
        }
        if self.cursor.row == self.scroll_bottom {
            self.scroll_up_once();
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
        }
    }

    pub(crate) fn reverse_index(&mut self) {
        if self.cursor.row == self.scroll_top {
            self.scroll_down_once();
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    fn scroll_up_once(&mut self) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        // Only lines leaving the top of the primary buffer become history.
        let feed = top == 0 && !self.alt_active;
        let evicted = self.active_screen_mut().scroll_up_region(top, bottom);
        if feed {
            if let Some(line) = evicted {
                self.push_scrollback(line);
            }
        }
        self.touch_rows(top, bottom);
    }

    fn scroll_down_once(&mut self) {
        let (top, bottom) = (self.scroll_top, self.scroll_bottom);
        self.active_screen_mut().scroll_down_region(top, bottom);
        self.touch_rows(top, bottom);
    }

    fn push_scrollback(&mut self, line: Box<[Cell]>) {
        if self.scrollback_limit == 0 {
            return;
        }
        if self.scrollback.len() == self.scrollback_limit {
            self.scrollback.pop_front();
        }
        self.scrollback.push_back(line);
    }

    pub(crate) fn backspace(&mut self) {
        if self.cursor.col >= self.cols {
            // Clear the pre-wrap sentinel; lands on the last column.
            self.cursor.col = self.cols.saturating_sub(1);
        } else {
            self.cursor.col = self.cursor.col.saturating_sub(1);
        }
    }

    fn tab(&mut self) {
        if self.cols == 0 {
            return;
        }
        let start = self.cursor.col.min(self.cols - 1) as usize + 1;
        for col in start..self.cols as usize {
            if self.tab_stops.get(col).copied().unwrap_or(false) {
                self.cursor.col = col as u16;
                return;
            }
        }
        self.cursor.col = self.cols - 1;
    }

    pub(crate) fn tab_forward(&mut self, n: u16) {
        for _ in 0..n {
            self.tab();
        }
    }

    pub(crate) fn tab_backward(&mut self, n: u16) {
        if self.cols == 0 {
            return;
        }
        for _ in 0..n {
            let mut col = self.cursor.col.min(self.cols - 1);
            while col > 0 {
                col -= 1;
                if self.tab_stops.get(col as usize).copied().unwrap_or(false) {
                    break;
                }
            }
            self.cursor.col = col;
        }
    }

    pub(crate) fn set_tab_stop(&mut self) {
        let col = self.cursor.col as usize;
        if col < self.tab_stops.len() {
            self.tab_stops[col] = true;
        }
    }

    pub(crate) fn clear_tab_stop(&mut self, mode: u16) {
        match mode {
            0 => {
                let col = self.cursor.col as usize;
                if col < self.tab_stops.len() {
                    self.tab_stops[col] = false;
                }
            }
            3 => self.tab_stops.iter_mut().for_each(|t| *t = false),
            _ => {}
        }
    }

    pub(crate) fn cursor_up(&mut self, n: u16) {
        let min_row = if self.cursor.row >= self.scroll_top && self.cursor.row <= self.scroll_bottom
        {
            self.scroll_top
        } else {
            0
        };
        self.cursor.row = self.cursor.row.saturating_sub(n).max(min_row);
    }

    pub(crate) fn cursor_down(&mut self, n: u16) {
        let max_row = if self.cursor.row >= self.scroll_top && self.cursor.row <= self.scroll_bottom
        {
            self.scroll_bottom
        } else {
            self.rows.saturating_sub(1)
        };
        self.cursor.row = self.cursor.row.saturating_add(n).min(max_row);
    }

    pub(crate) fn cursor_forward(&mut self, n: u16) {
        self.cursor.col = self
            .cursor
            .col
            .saturating_add(n)
            .min(self.cols.saturating_sub(1));
    }

    pub(crate) fn cursor_backward(&mut self, n: u16) {
        // A pending wrap is cancelled before moving.
        self.cursor.col = self.cursor.col.min(self.cols.saturating_sub(1));
        self.cursor.col = self.cursor.col.saturating_sub(n);
    }

    /// CUP/VPA target; honors origin mode, where addressing is relative to
    /// the scroll region.
    pub(crate) fn goto_origin(&mut self, row: u16, col: u16) {
        if self.modes.origin {
            self.cursor.row = self
                .scroll_top
                .saturating_add(row)
                .min(self.scroll_bottom);
        } else {
            self.cursor.row = row.min(self.rows.saturating_sub(1));
        }
        self.cursor.col = col.min(self.cols.saturating_sub(1));
    }

    pub(crate) fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        let bottom = bottom.min(self.rows.saturating_sub(1));
        if top >= bottom {
            return;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        self.goto_origin(0, 0);
    }

    // ------------------------------------------------------------------
    // Erase / insert / delete
    // ------------------------------------------------------------------

    /// Erase `[start, end)` of a row. A wide primary whose spacer falls
    /// inside the range is erased along with it so no half-pair survives.
    fn erase_span_in_row(&mut self, row: u16, start: u16, end: u16) {
        let bg = self.cursor.bg;
        let mut start = start.min(self.cols);
        let end = end.min(self.cols);
        if start >= end {
            return;
        }
        if start > 0
            && self
                .active_screen()
                .cell(row, start - 1)
                .is_some_and(|c| c.attrs.contains(CellAttrs::WIDE_CHAR))
        {
            start -= 1;
        }
        self.active_screen_mut().erase_span(row, start, end, bg);
        self.touch_span(row, start, end);
    }

    /// Blank a wide primary orphaned by a row mutation at its spacer.
    fn clear_wide_primary_at(&mut self, row: u16, col: u16) {
        let is_wide = self
            .active_screen()
            .cell(row, col)
            .is_some_and(|c| c.attrs.contains(CellAttrs::WIDE_CHAR));
        if is_wide {
            if let Some(cell) = self.active_screen_mut().cell_mut(row, col) {
                cell.clear();
            }
            self.touch(row, col);
        }
    }

    pub(crate) fn erase_display(&mut self, mode: u16) {
        let (crow, ccol) = (self.cursor.row, self.cursor.col);
        let (rows, cols) = (self.rows, self.cols);
        let bg = self.cursor.bg;
        match mode {
            0 => {
                self.erase_span_in_row(crow, ccol, cols);
                for row in (crow + 1)..rows {
                    self.active_screen_mut().erase_row(row, bg);
                }
                if crow + 1 < rows {
                    self.touch_rows(crow + 1, rows - 1);
                }
            }
            1 => {
                for row in 0..crow {
                    self.active_screen_mut().erase_row(row, bg);
                }
                if crow > 0 {
                    self.touch_rows(0, crow - 1);
                }
                self.erase_span_in_row(crow, 0, ccol.saturating_add(1));
            }
            2 => {
                for row in 0..rows {
                    self.active_screen_mut().erase_row(row, bg);
                }
                self.touch_all();
            }
            3 => {
                // xterm extension: clear the scrollback, not the screen.
                self.scrollback.clear();
            }
            _ => {}
        }
    }

    pub(crate) fn erase_line(&mut self, mode: u16) {
        let (crow, ccol) = (self.cursor.row, self.cursor.col);
        let cols = self.cols;
        let bg = self.cursor.bg;
        match mode {
            0 => self.erase_span_in_row(crow, ccol, cols),
            1 => self.erase_span_in_row(crow, 0, ccol.saturating_add(1)),
            2 => {
                self.active_screen_mut().erase_row(crow, bg);
                self.touch_span(crow, 0, cols);
            }
            _ => {}
        }
    }

    pub(crate) fn erase_chars(&mut self, n: u16) {
        let (crow, ccol) = (self.cursor.row, self.cursor.col);
        let end = ccol.saturating_add(n);
        self.erase_span_in_row(crow, ccol, end);
    }

    pub(crate) fn insert_lines(&mut self, n: u16) {
        if self.cursor.row < self.scroll_top || self.cursor.row > self.scroll_bottom {
            return;
        }
        let (crow, bottom) = (self.cursor.row, self.scroll_bottom);
        for _ in 0..n.min(self.rows) {
            self.active_screen_mut().scroll_down_region(crow, bottom);
        }
        self.touch_rows(crow, bottom);
        self.cursor.col = 0;
    }

    pub(crate) fn delete_lines(&mut self, n: u16) {
        if self.cursor.row < self.scroll_top || self.cursor.row > self.scroll_bottom {
            return;
        }
        let (crow, bottom) = (self.cursor.row, self.scroll_bottom);
        for _ in 0..n.min(self.rows) {
            // Deleted lines are dropped, never scrolled into history.
            self.active_screen_mut().scroll_up_region(crow, bottom);
        }
        self.touch_rows(crow, bottom);
        self.cursor.col = 0;
    }

    pub(crate) fn insert_chars(&mut self, n: u16) {
        let (crow, ccol) = (self.cursor.row, self.cursor.col);
        let cols = self.cols;
        if ccol > 0 {
            // The spacer at the insertion point shifts away from its
            // primary.
            self.clear_wide_primary_at(crow, ccol - 1);
        }
        self.active_screen_mut().insert_cells(crow, ccol, n);
        // A shifted pair may have lost its spacer off the right edge.
        if cols > 0 {
            self.clear_wide_primary_at(crow, cols - 1);
        }
        self.touch_span(crow, ccol.saturating_sub(1), cols);
    }

    pub(crate) fn delete_chars(&mut self, n: u16) {
        let (crow, ccol) = (self.cursor.row, self.cursor.col);
        let cols = self.cols;
        let bg = self.cursor.bg;
        if ccol > 0 {
            self.clear_wide_primary_at(crow, ccol - 1);
        }
        self.active_screen_mut().delete_cells(crow, ccol, n, bg);
        self.touch_span(crow, ccol.saturating_sub(1), cols);
    }

    pub(crate) fn scroll_up_n(&mut self, n: u16) {
        for _ in 0..n.min(self.rows) {
            self.scroll_up_once();
        }
    }

    pub(crate) fn scroll_down_n(&mut self, n: u16) {
        for _ in 0..n.min(self.rows) {
            self.scroll_down_once();
        }
    }

    // ------------------------------------------------------------------
    // Save/restore, alt screen, resets
    // ------------------------------------------------------------------

    pub(crate) fn save_cursor(&mut self) {
        self.saved = Some(SavedContext::capture(
            &self.cursor,
            self.charsets,
            self.modes.origin,
        ));
    }

    pub(crate) fn restore_cursor(&mut self) {
        if let Some(saved) = self.saved.clone() {
            saved.restore_into(&mut self.cursor);
            self.charsets = saved.charsets;
            self.modes.origin = saved.origin;
            self.cursor.row = self.cursor.row.min(self.rows.saturating_sub(1));
            self.cursor.col = self.cursor.col.min(self.cols);
        }
    }

    fn enter_alt_screen(&mut self) {
        if !self.alt_active {
            self.alt_active = true;
            self.modes.alt_screen = true;
            self.touch_all();
        }
    }

    fn exit_alt_screen(&mut self) {
        if self.alt_active {
            self.alt_active = false;
            self.modes.alt_screen = false;
            // The alternate buffer is discarded on exit.
            self.alt_screen.clear_all();
            self.touch_all();
        }
    }

    fn clear_active_screen(&mut self) {
        self.active_screen_mut().clear_all();
        self.touch_all();
    }

    /// DECSTR: soft reset. Bracketed paste deliberately survives, so a
    /// reset inside a paste-aware shell does not break the next paste.
    pub(crate) fn soft_reset(&mut self) {
        let bracketed_paste = self.modes.bracketed_paste;
        self.modes = TerminalModes {
            bracketed_paste,
            alt_screen: self.alt_active,
            ..TerminalModes::default()
        };
        self.cursor.reset_pen();
        self.cursor.visible = true;
        self.charsets = Charsets::default();
        self.scroll_top = 0;
        self.scroll_bottom = self.rows.saturating_sub(1);
        self.saved = None;
    }

    /// RIS: full reset. Scrollback is preserved (only ED 3 clears it);
    /// sinks and configuration knobs survive.
    pub(crate) fn full_reset(&mut self) {
        tracing::info!("full terminal reset");
        self.cursor = CursorState::new();
        self.modes = TerminalModes::default();
        self.charsets = Charsets::default();
        self.palette.reset();
        self.screen.clear_all();
        self.alt_screen.clear_all();
        self.alt_active = false;
        self.scroll_top = 0;
        self.scroll_bottom = self.rows.saturating_sub(1);
        self.tab_stops = build_tab_stops(self.cols, self.tab_interval);
        self.working_dir = None;
        self.hyperlinks.clear();
        self.active_hyperlink = 0;
        self.last_printed = ' ';
        self.saved = None;
        self.alt_saved = None;
        self.dcs_buffer.clear();
        self.dcs_intermediates.clear();
        self.dcs_action = None;
        self.touch_all();
    }

    /// DECALN: fill the screen with `E` and reset margins.
    pub(crate) fn screen_alignment_fill(&mut self) {
        self.active_screen_mut().fill_with('E');
        self.scroll_top = 0;
        self.scroll_bottom = self.rows.saturating_sub(1);
        self.cursor.row = 0;
        self.cursor.col = 0;
        self.touch_all();
    }

    pub(crate) fn repeat_last(&mut self, n: u16) {
        let ch = self.last_printed;
        for _ in 0..n.min(MAX_REPEAT) {
            self.print_cell(ch);
        }
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    pub(crate) fn set_ansi_modes(&mut self, params: &Params, enable: bool) {
        for group in params.iter() {
            match group.first().copied().unwrap_or(0) {
                4 => self.modes.insert = enable,
                20 => self.modes.linefeed_newline = enable,
                _ => {}
            }
        }
    }

    pub(crate) fn set_dec_modes(&mut self, params: &Params, enable: bool) {
        for group in params.iter() {
            let mode = group.first().copied().unwrap_or(0);
            self.set_dec_mode(mode, enable);
        }
    }

    fn set_dec_mode(&mut self, mode: u16, enable: bool) {
        match mode {
            1 => self.modes.cursor_keys_application = enable,
            3 => {
                // DECCOLM: the 80/132-column switch is not performed, but
                // the documented side effects are: clear, home, reset
                // margins.
                self.modes.deccolm = enable;
                self.clear_active_screen();
                self.scroll_top = 0;
                self.scroll_bottom = self.rows.saturating_sub(1);
                self.cursor.row = 0;
                self.cursor.col = 0;
            }
            5 => {
                if self.modes.reverse_video != enable {
                    self.modes.reverse_video = enable;
                    self.touch_all();
                }
            }
            6 => {
                self.modes.origin = enable;
                self.goto_origin(0, 0);
            }
            7 => self.modes.autowrap = enable,
            12 => self.cursor.blinking = enable,
            25 => self.cursor.visible = enable,
            47 => {
                if enable {
                    self.enter_alt_screen();
                } else {
                    self.exit_alt_screen();
                }
            }
            1000 => self.modes.mouse_click = enable,
            1002 => self.modes.mouse_motion = enable,
            1003 => self.modes.mouse_any = enable,
            1004 => self.modes.focus_events = enable,
            1005 => self.modes.mouse_utf8 = enable,
            1006 => self.modes.mouse_sgr = enable,
            1007 => self.modes.alternate_scroll = enable,
            1047 => {
                if enable {
                    self.enter_alt_screen();
                    self.clear_active_screen();
                } else {
                    self.exit_alt_screen();
                }
            }
            1048 => {
                if enable {
                    self.save_cursor();
                } else {
                    self.restore_cursor();
                }
            }
            1049 => {
                if enable {
                    self.alt_saved = Some(SavedContext::capture(
                        &self.cursor,
                        self.charsets,
                        self.modes.origin,
                    ));
                    self.enter_alt_screen();
                    self.clear_active_screen();
                } else {
                    self.exit_alt_screen();
                    if let Some(saved) = self.alt_saved.take() {
                        saved.restore_into(&mut self.cursor);
                        self.charsets = saved.charsets;
                        self.modes.origin = saved.origin;
                        self.cursor.row = self.cursor.row.min(self.rows.saturating_sub(1));
                        self.cursor.col = self.cursor.col.min(self.cols);
                    }
                }
            }
            2004 => self.modes.bracketed_paste = enable,
            2026 => self.modes.synchronized_output = enable,
            _ => {
                tracing::debug!(mode, enable, "ignored DEC private mode");
            }
        }
    }

    fn dec_mode_state(&self, mode: u16) -> Option<bool> {
        match mode {
            1 => Some(self.modes.cursor_keys_application),
            3 => Some(self.modes.deccolm),
            5 => Some(self.modes.reverse_video),
            6 => Some(self.modes.origin),
            7 => Some(self.modes.autowrap),
            12 => Some(self.cursor.blinking),
            25 => Some(self.cursor.visible),
            47 | 1047 | 1049 => Some(self.alt_active),
            1000 => Some(self.modes.mouse_click),
            1002 => Some(self.modes.mouse_motion),
            1003 => Some(self.modes.mouse_any),
            1004 => Some(self.modes.focus_events),
            1005 => Some(self.modes.mouse_utf8),
            1006 => Some(self.modes.mouse_sgr),
            1007 => Some(self.modes.alternate_scroll),
            2004 => Some(self.modes.bracketed_paste),
            2026 => Some(self.modes.synchronized_output),
            _ => None,
        }
    }

    fn ansi_mode_state(&self, mode: u16) -> Option<bool> {
        match mode {
            4 => Some(self.modes.insert),
            20 => Some(self.modes.linefeed_newline),
            _ => None,
        }
    }

    fn report_mode_state(&mut self, mode: u16, set: Option<bool>, dec_private: bool) {
        let pm = match set {
            Some(true) => 1,
            Some(false) => 2,
            None => 0,
        };
        let prefix = if dec_private { "?" } else { "" };
        let reply = format!("\x1b[{prefix}{mode};{pm}$y");
        self.respond(reply.as_bytes());
    }

    pub(crate) fn report_dec_modes(&mut self, params: &Params) {
        if params.is_empty() {
            self.report_mode_state(0, None, true);
            return;
        }
        for group in params.iter() {
            let mode = group.first().copied().unwrap_or(0);
            self.report_mode_state(mode, self.dec_mode_state(mode), true);
        }
    }

    pub(crate) fn report_ansi_modes(&mut self, params: &Params) {
        if params.is_empty() {
            self.report_mode_state(0, None, false);
            return;
        }
        for group in params.iter() {
            let mode = group.first().copied().unwrap_or(0);
            self.report_mode_state(mode, self.ansi_mode_state(mode), false);
        }
    }

    // ------------------------------------------------------------------
    // OSC side effects
    // ------------------------------------------------------------------

    pub(crate) fn set_working_dir_uri(&mut self, uri: &str) {
        if let Some(rest) = uri.strip_prefix("file://") {
            // Skip the host component.
            if let Some(slash) = rest.find('/') {
                self.working_dir = Some(osc::percent_decode(&rest[slash..]));
            }
        } else {
            self.working_dir = Some(uri.to_string());
        }
    }

    pub(crate) fn set_hyperlink(&mut self, uri: Option<String>) {
        match uri {
            None => self.active_hyperlink = 0,
            Some(uri) => {
                if let Some(pos) = self.hyperlinks.iter().position(|u| *u == uri) {
                    self.active_hyperlink = pos as u16 + 1;
                } else if self.hyperlinks.len() < MAX_HYPERLINKS {
                    self.hyperlinks.push(uri);
                    self.active_hyperlink = self.hyperlinks.len() as u16;
                } else {
                    self.active_hyperlink = 0;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Printing
    // ------------------------------------------------------------------

    fn make_cell(&self, ch: char, wide: bool) -> Cell {
        let mut attrs = self.cursor.attrs;
        if wide {
            attrs.insert(CellAttrs::WIDE_CHAR);
        }
        if self.active_hyperlink != 0 {
            attrs.insert(CellAttrs::HYPERLINK);
        }
        Cell {
            ch,
            fg: self.cursor.fg,
            bg: self.cursor.bg,
            underline_color: self.cursor.underline_color,
            attrs,
            underline_style: self.cursor.underline_style,
            hyperlink: self.active_hyperlink,
            row: 0,
            col: 0,
        }
    }

    /// Blank halves of wide characters that a write at (row, col) with the
    /// given width would orphan, keeping the continuation invariant.
    fn fix_wide_overlap(&mut self, row: u16, col: u16, width: u16) {
        let wide_left = col > 0
            && self
                .active_screen()
                .cell(row, col - 1)
                .is_some_and(|c| c.attrs.contains(CellAttrs::WIDE_CHAR));
        if wide_left {
            if let Some(cell) = self.active_screen_mut().cell_mut(row, col - 1) {
                cell.clear();
            }
            self.touch(row, col - 1);
        }
        let last = col + width - 1;
        let wide_at_end = self
            .active_screen()
            .cell(row, last)
            .is_some_and(|c| c.attrs.contains(CellAttrs::WIDE_CHAR));
        if wide_at_end && last + 1 < self.cols {
            if let Some(cell) = self.active_screen_mut().cell_mut(row, last + 1) {
                cell.clear();
            }
            self.touch(row, last + 1);
        }
    }

    fn print_cell(&mut self, ch: char) {
        if self.rows == 0 || self.cols == 0 {
            return;
        }
        let width = UnicodeWidthChar::width(ch).unwrap_or(1).min(2) as u16;
        if width == 0 {
            // Combining marks are not composed into cells.
            return;
        }
        if width == 2 && self.cols < 2 {
            return;
        }
        let cols = self.cols;

        if self.cursor.col >= cols {
            if self.modes.autowrap {
                self.carriage_return();
                self.linefeed();
            } else {
                self.cursor.col = cols - 1;
            }
        }

        // A wide primary may not occupy the last column.
        if width == 2 && self.cursor.col == cols - 1 {
            if self.modes.autowrap {
                let (row, col) = (self.cursor.row, self.cursor.col);
                let bg = self.cursor.bg;
                self.active_screen_mut().erase_span(row, col, col + 1, bg);
                self.touch(row, col);
                self.carriage_return();
                self.linefeed();
            } else {
                self.cursor.col = cols - 2;
            }
        }

        if self.modes.insert {
            let (row, col) = (self.cursor.row, self.cursor.col);
            self.active_screen_mut().insert_cells(row, col, width);
            self.touch_span(row, col, cols);
        }

        let (row, col) = (self.cursor.row, self.cursor.col);
        let cell = self.make_cell(ch, width == 2);
        self.fix_wide_overlap(row, col, width);
        self.active_screen_mut().put(row, col, cell);
        self.touch(row, col);
        if width == 2 {
            let spacer = Cell::wide_spacer(&cell, row, col + 1);
            self.active_screen_mut().put(row, col + 1, spacer);
            self.touch(row, col + 1);
        }

        self.cursor.col = (col + width).min(cols);
        self.last_printed = ch;
    }
}

impl Perform for TerminalState {
    fn print(&mut self, ch: char) {
        let ch = self.charsets.map(ch);
        self.print_cell(ch);
    }

    /// Bulk ASCII path: whole row segments are written directly into the
    /// cell array. Falls back to per-character printing whenever insert
    /// mode or a non-passthrough charset is active.
    fn print_run(&mut self, bytes: &[u8]) {
        if self.modes.insert
            || !self.charsets.is_passthrough()
            || self.rows == 0
            || self.cols == 0
        {
            for &b in bytes {
                match b {
                    0x0A | 0x0D => self.execute(b),
                    _ => self.print(b as char),
                }
            }
            return;
        }

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                0x0A => {
                    self.linefeed();
                    if self.modes.linefeed_newline {
                        self.carriage_return();
                    }
                    i += 1;
                }
                0x0D => {
                    self.carriage_return();
                    i += 1;
                }
                _ => {
                    let cols = self.cols;
                    if self.cursor.col >= cols {
                        if self.modes.autowrap {
                            self.carriage_return();
                            self.linefeed();
                        } else {
                            self.cursor.col = cols - 1;
                        }
                    }
                    let (row, col) = (self.cursor.row, self.cursor.col);
                    let avail = (cols - col) as usize;
                    let mut n = 0;
                    while n < avail
                        && i + n < bytes.len()
                        && !matches!(bytes[i + n], 0x0A | 0x0D)
                    {
                        n += 1;
                    }

                    self.fix_wide_overlap(row, col, n as u16);
                    let template = self.make_cell(' ', false);
                    {
                        let screen = self.active_screen_mut();
                        let start = col as usize;
                        let slice = &mut screen.row_slice_mut(row)[start..start + n];
                        for (k, target) in slice.iter_mut().enumerate() {
                            let mut cell = template;
                            cell.ch = bytes[i + k] as char;
                            cell.row = row;
                            cell.col = col + k as u16;
                            *target = cell;
                        }
                    }
                    self.touch_span(row, col, col + n as u16);
                    self.cursor.col = col + n as u16;
                    self.last_printed = bytes[i + n - 1] as char;
                    i += n;
                }
            }
        }
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x07 => self.bell_count += 1,
            0x08 => self.backspace(),
            0x09 => self.tab(),
            0x0A | 0x0B | 0x0C => {
                self.linefeed();
                if self.modes.linefeed_newline {
                    self.carriage_return();
                }
            }
            0x0D => self.carriage_return(),
            // SO / SI: invoke G1 / G0.
            0x0E => self.charsets.active = 1,
            0x0F => self.charsets.active = 0,
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], private: u8, action: char) {
        csi::dispatch(self, params, intermediates, private, action);
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], byte: u8) {
        esc::dispatch(self, intermediates, byte);
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        osc::dispatch(self, params);
    }

    fn hook(&mut self, _params: &Params, intermediates: &[u8], _private: u8, action: char) {
        self.dcs_buffer.clear();
        self.dcs_intermediates.clear();
        self.dcs_intermediates.extend_from_slice(intermediates);
        self.dcs_action = Some(action);
    }

    fn put(&mut self, byte: u8) {
        if self.dcs_buffer.len() < MAX_DCS_LEN {
            self.dcs_buffer.push(byte);
        }
    }

    fn unhook(&mut self) {
        let data = std::mem::take(&mut self.dcs_buffer);
        let intermediates = std::mem::take(&mut self.dcs_intermediates);
        let action = self.dcs_action.take();
        dcs::dispatch(self, action, &intermediates, &data);
    }
}

fn build_tab_stops(cols: u16, interval: u16) -> Vec<bool> {
    let mut stops = vec![false; cols as usize];
    if interval > 0 {
        for col in (0..cols as usize).step_by(interval as usize) {
            stops[col] = true;
        }
    }
    stops
}
