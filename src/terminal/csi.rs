//! CSI sequence dispatch.
//!
//! Wire coordinates are 1-based; everything internal is 0-based. Private
//! markers other than `?` (and `>` on DA2) must be ignored wholesale:
//! without that guard, `CSI > 1 u` (kitty keyboard) would mis-dispatch as
//! RCP and `CSI > 4 ; 1 m` (xterm modifyOtherKeys) would corrupt SGR.

use crate::parser::Params;

use super::cursor::CursorShape;
use super::sgr;
use super::state::TerminalState;

pub(crate) fn dispatch(
    term: &mut TerminalState,
    params: &Params,
    intermediates: &[u8],
    private: u8,
    action: char,
) {
    match private {
        0 => {}
        b'?' => {
            dispatch_dec_private(term, params, intermediates, action);
            return;
        }
        b'>' => {
            // Secondary Device Attributes is the only `>` sequence we
            // answer; the rest (xterm resource tweaks, kitty keyboard
            // pushes) are consumed silently.
            if action == 'c' && params.first(0) == 0 {
                term.respond(b"\x1b[>0;279;0c");
            } else {
                tracing::debug!(%action, "ignored CSI > sequence");
            }
            return;
        }
        _ => {
            tracing::debug!(private, %action, "ignored private CSI sequence");
            return;
        }
    }

    match (action, intermediates) {
        ('A', []) => term.cursor_up(params.first_or(0, 1)),
        ('B', []) => term.cursor_down(params.first_or(0, 1)),
        ('C', []) => term.cursor_forward(params.first_or(0, 1)),
        ('D', []) => term.cursor_backward(params.first_or(0, 1)),
        ('E', []) => {
            term.cursor.col = 0;
            term.cursor_down(params.first_or(0, 1));
        }
        ('F', []) => {
            term.cursor.col = 0;
            term.cursor_up(params.first_or(0, 1));
        }
        ('G', []) => {
            let col = params.first_or(0, 1) - 1;
            term.cursor.col = col.min(term.cols().saturating_sub(1));
        }
        ('H' | 'f', []) => {
            let row = params.first_or(0, 1) - 1;
            let col = params.first_or(1, 1) - 1;
            term.goto_origin(row, col);
        }
        ('I', []) => term.tab_forward(params.first_or(0, 1)),
        ('J', []) => term.erase_display(params.first(0)),
        ('K', []) => term.erase_line(params.first(0)),
        ('L', []) => term.insert_lines(params.first_or(0, 1)),
        ('M', []) => term.delete_lines(params.first_or(0, 1)),
        ('P', []) => term.delete_chars(params.first_or(0, 1)),
        ('S', []) => term.scroll_up_n(params.first_or(0, 1)),
        ('T', []) => term.scroll_down_n(params.first_or(0, 1)),
        ('X', []) => term.erase_chars(params.first_or(0, 1)),
        ('Z', []) => term.tab_backward(params.first_or(0, 1)),
        ('@', []) => term.insert_chars(params.first_or(0, 1)),
        ('b', []) => term.repeat_last(params.first_or(0, 1)),
        ('c', []) => {
            // Primary Device Attributes: VT220 with sixel-less feature set.
            if params.first(0) == 0 {
                term.respond(b"\x1b[?62;22c");
            }
        }
        ('d', []) => {
            let row = params.first_or(0, 1) - 1;
            let col = term.cursor.col;
            term.goto_origin(row, col);
        }
        ('g', []) => term.clear_tab_stop(params.first(0)),
        ('h', []) => term.set_ansi_modes(params, true),
        ('l', []) => term.set_ansi_modes(params, false),
        ('m', []) => sgr::apply(term, params),
        ('n', []) => match params.first(0) {
            5 => term.respond(b"\x1b[0n"),
            6 => {
                let reply = format!("\x1b[{};{}R", term.cursor.row + 1, term.cursor.col + 1);
                term.respond(reply.as_bytes());
            }
            _ => {}
        },
        ('p', [b'$']) => term.report_ansi_modes(params),
        ('p', [b'!']) => term.soft_reset(),
        ('q', [b' ']) => {
            let (shape, blinking) = match params.first(0) {
                0 | 1 => (CursorShape::Block, true),
                2 => (CursorShape::Block, false),
                3 => (CursorShape::Underline, true),
                4 => (CursorShape::Underline, false),
                5 => (CursorShape::Bar, true),
                6 => (CursorShape::Bar, false),
                _ => return,
            };
            term.cursor.shape = shape;
            term.cursor.blinking = blinking;
        }
        ('r', []) => {
            let top = params.first_or(0, 1) - 1;
            let bottom = params.first_or(1, term.rows().max(1)) - 1;
            term.set_scroll_region(top, bottom);
        }
        ('s', []) => term.save_cursor(),
        ('u', []) => term.restore_cursor(),
        _ => {
            tracing::debug!(%action, ?intermediates, "unhandled CSI sequence");
        }
    }
}

fn dispatch_dec_private(
    term: &mut TerminalState,
    params: &Params,
    intermediates: &[u8],
    action: char,
) {
    match (action, intermediates) {
        ('h', []) => term.set_dec_modes(params, true),
        ('l', []) => term.set_dec_modes(params, false),
        ('p', [b'$']) => term.report_dec_modes(params),
        _ => {
            tracing::debug!(%action, "unhandled DEC private sequence");
        }
    }
}
