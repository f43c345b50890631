/// Terminal mode flags tracking various DEC and ANSI modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalModes {
    /// DECCKM: cursor key mode (application vs normal)
    pub cursor_keys_application: bool,
    /// DECKPAM/DECKPNM: application keypad
    pub application_keypad: bool,
    /// DECCOLM: 132-column mode flag. Tracked for DECRQM round-trips; the
    /// column count itself is not changed.
    pub deccolm: bool,
    /// DECSCNM: reverse video
    pub reverse_video: bool,
    /// DECOM: origin mode
    pub origin: bool,
    /// DECAWM: auto-wrap mode
    pub autowrap: bool,
    /// IRM: insert mode
    pub insert: bool,
    /// LNM: line feed / new line mode
    pub linefeed_newline: bool,
    /// Mouse click tracking (mode 1000)
    pub mouse_click: bool,
    /// Mouse button-motion tracking (mode 1002)
    pub mouse_motion: bool,
    /// Mouse all-motion tracking (mode 1003)
    pub mouse_any: bool,
    /// UTF-8 mouse coordinates (mode 1005)
    pub mouse_utf8: bool,
    /// SGR mouse coordinates (mode 1006)
    pub mouse_sgr: bool,
    /// Focus in/out reporting (mode 1004)
    pub focus_events: bool,
    /// Alternate scroll mode (mode 1007)
    pub alternate_scroll: bool,
    /// Bracketed paste (mode 2004)
    pub bracketed_paste: bool,
    /// Synchronized output (mode 2026)
    pub synchronized_output: bool,
    /// Alternate screen active (modes 47/1047/1049)
    pub alt_screen: bool,
}

impl Default for TerminalModes {
    fn default() -> Self {
        Self {
            cursor_keys_application: false,
            application_keypad: false,
            deccolm: false,
            reverse_video: false,
            origin: false,
            autowrap: true,
            insert: false,
            linefeed_newline: false,
            mouse_click: false,
            mouse_motion: false,
            mouse_any: false,
            mouse_utf8: false,
            mouse_sgr: false,
            focus_events: false,
            alternate_scroll: false,
            bracketed_paste: false,
            synchronized_output: false,
            alt_screen: false,
        }
    }
}

impl TerminalModes {
    /// Effective mouse tracking level. The most permissive enabled mode
    /// wins, matching xterm precedence.
    pub fn mouse_tracking(&self) -> MouseTracking {
        if self.mouse_any {
            MouseTracking::Any
        } else if self.mouse_motion {
            MouseTracking::Button
        } else if self.mouse_click {
            MouseTracking::X10
        } else {
            MouseTracking::None
        }
    }

    /// Effective mouse coordinate encoding. SGR beats UTF-8 beats legacy.
    pub fn mouse_encoding(&self) -> MouseEncoding {
        if self.mouse_sgr {
            MouseEncoding::Sgr
        } else if self.mouse_utf8 {
            MouseEncoding::Utf8
        } else {
            MouseEncoding::X10
        }
    }
}

/// Which mouse events get reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseTracking {
    #[default]
    None,
    /// Mode 1000: presses and wheel only.
    X10,
    /// Mode 1002: presses, releases, wheel, and drag motion.
    Button,
    /// Mode 1003: everything including bare motion.
    Any,
}

/// How mouse coordinates are encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseEncoding {
    /// Legacy 6-byte form, coordinates clamped to 223.
    #[default]
    X10,
    /// Mode 1005: coordinates as UTF-8 code points.
    Utf8,
    /// Mode 1006: `CSI < b ; x ; y M/m`.
    Sgr,
}

/// Immutable snapshot of the mode flags the key/mouse/paste encoders need.
/// Always equals the values most recently set by SM/RM/DECSET/DECRST or
/// reset by DECSTR/RIS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputModes {
    pub application_cursor_keys: bool,
    /// LNM: Enter sends CR LF instead of CR.
    pub newline_mode: bool,
    pub bracketed_paste: bool,
    pub mouse_tracking: MouseTracking,
    pub mouse_encoding: MouseEncoding,
    pub focus_events: bool,
    /// Host option: Backspace sends 0x08 instead of DEL.
    pub backspace_sends_backspace: bool,
}

impl Default for InputModes {
    fn default() -> Self {
        Self {
            application_cursor_keys: false,
            newline_mode: false,
            bracketed_paste: false,
            mouse_tracking: MouseTracking::None,
            mouse_encoding: MouseEncoding::X10,
            focus_events: false,
            backspace_sends_backspace: false,
        }
    }
}

impl InputModes {
    /// Build the encoder snapshot from the live mode flags.
    pub fn from_modes(modes: &TerminalModes, backspace_sends_backspace: bool) -> Self {
        Self {
            application_cursor_keys: modes.cursor_keys_application,
            newline_mode: modes.linefeed_newline,
            bracketed_paste: modes.bracketed_paste,
            mouse_tracking: modes.mouse_tracking(),
            mouse_encoding: modes.mouse_encoding(),
            focus_events: modes.focus_events,
            backspace_sends_backspace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_precedence() {
        let mut modes = TerminalModes::default();
        assert_eq!(modes.mouse_tracking(), MouseTracking::None);
        modes.mouse_click = true;
        assert_eq!(modes.mouse_tracking(), MouseTracking::X10);
        modes.mouse_motion = true;
        assert_eq!(modes.mouse_tracking(), MouseTracking::Button);
        modes.mouse_any = true;
        assert_eq!(modes.mouse_tracking(), MouseTracking::Any);

        assert_eq!(modes.mouse_encoding(), MouseEncoding::X10);
        modes.mouse_utf8 = true;
        assert_eq!(modes.mouse_encoding(), MouseEncoding::Utf8);
        modes.mouse_sgr = true;
        assert_eq!(modes.mouse_encoding(), MouseEncoding::Sgr);
    }
}
