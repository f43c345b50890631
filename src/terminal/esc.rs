//! Plain escape sequence dispatch (non-CSI/OSC/DCS).

use super::charset::CharsetId;
use super::state::TerminalState;

pub(crate) fn dispatch(term: &mut TerminalState, intermediates: &[u8], byte: u8) {
    match (byte, intermediates) {
        // IND
        (b'D', []) => term.linefeed(),
        // NEL
        (b'E', []) => {
            term.carriage_return();
            term.linefeed();
        }
        // HTS
        (b'H', []) => term.set_tab_stop(),
        // RI
        (b'M', []) => term.reverse_index(),
        // DECSC / DECRC
        (b'7', []) => term.save_cursor(),
        (b'8', []) => term.restore_cursor(),
        // DECKPAM / DECKPNM
        (b'=', []) => term.modes.application_keypad = true,
        (b'>', []) => term.modes.application_keypad = false,
        // RIS
        (b'c', []) => term.full_reset(),
        // DECALN
        (b'8', [b'#']) => term.screen_alignment_fill(),
        // SCS: G0/G1 designation
        (b'B' | b'0' | b'A', [b'(']) => {
            term.charsets.designate(0, CharsetId::from_final(byte));
        }
        (b'B' | b'0' | b'A', [b')']) => {
            term.charsets.designate(1, CharsetId::from_final(byte));
        }
        // ST for a string that already ended at the ESC.
        (b'\\', _) => {}
        _ => {
            tracing::debug!(byte, ?intermediates, "unhandled ESC sequence");
        }
    }
}
