//! DCS (Device Control String) dispatch.
//!
//! The passthrough payload is buffered by the terminal state (bounded);
//! this module interprets it at unhook time. DECRQSS and XTGETTCAP get
//! replies; every other selector (SIXEL, DECUDK, tmux control mode) is
//! accepted and discarded.

use super::cursor::CursorShape;
use super::sgr;
use super::state::TerminalState;

pub(crate) fn dispatch(
    term: &mut TerminalState,
    action: Option<char>,
    intermediates: &[u8],
    data: &[u8],
) {
    match (action, intermediates) {
        // DECRQSS: DCS $ q Pt ST
        (Some('q'), [b'$']) => handle_decrqss(term, data),
        // XTGETTCAP: DCS + q Pt ST
        (Some('q'), [b'+']) => handle_xtgettcap(term, data),
        _ => {
            tracing::debug!(?action, ?intermediates, len = data.len(), "discarded DCS stream");
        }
    }
}

/// Request Status String. The reply reconstructs the queried setting in
/// standard form: `DCS 1 $ r <value> ST`, or `DCS 0 $ r ST` when unknown.
fn handle_decrqss(term: &mut TerminalState, data: &[u8]) {
    let status = match data {
        b"m" => Some(format!("{}m", sgr::pen_report(term))),
        b"r" => Some(format!(
            "{};{}r",
            term.scroll_top() + 1,
            term.scroll_bottom() + 1
        )),
        b" q" => {
            let code = match term.cursor.shape {
                CursorShape::Block => 2,
                CursorShape::Underline => 4,
                CursorShape::Bar => 6,
            };
            Some(format!("{code} q"))
        }
        _ => None,
    };

    match status {
        Some(pt) => {
            let reply = format!("\x1bP1$r{pt}\x1b\\");
            term.respond(reply.as_bytes());
        }
        None => term.respond(b"\x1bP0$r\x1b\\"),
    }
}

/// XTGETTCAP: hex-encoded capability names, answered from a minimal set
/// used by tmux and modern TUIs.
fn handle_xtgettcap(term: &mut TerminalState, data: &[u8]) {
    let raw = String::from_utf8_lossy(data);
    if raw.trim().is_empty() {
        term.respond(b"\x1bP0+r\x1b\\");
        return;
    }

    let mut pairs: Vec<String> = Vec::new();
    for item in raw.split(';') {
        if item.is_empty() {
            continue;
        }
        let Some(name) = decode_hex_ascii(item) else {
            term.respond(b"\x1bP0+r\x1b\\");
            return;
        };
        let Some(value) = tcap_capability_value(&name) else {
            term.respond(b"\x1bP0+r\x1b\\");
            return;
        };
        pairs.push(format!(
            "{}={}",
            encode_hex_ascii(&name),
            encode_hex_ascii(value)
        ));
    }

    if pairs.is_empty() {
        term.respond(b"\x1bP0+r\x1b\\");
        return;
    }
    let reply = format!("\x1bP1+r{}\x1b\\", pairs.join(";"));
    term.respond(reply.as_bytes());
}

fn decode_hex_ascii(input: &str) -> Option<String> {
    if input.len() % 2 != 0 {
        return None;
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 2);
    let mut i = 0;
    while i + 1 < bytes.len() {
        let hi = (bytes[i] as char).to_digit(16)?;
        let lo = (bytes[i + 1] as char).to_digit(16)?;
        out.push((hi * 16 + lo) as u8);
        i += 2;
    }
    String::from_utf8(out).ok()
}

fn encode_hex_ascii(input: &str) -> String {
    input.as_bytes().iter().map(|b| format!("{b:02x}")).collect()
}

/// Capability set needed by tmux and modern TUIs.
fn tcap_capability_value(name: &str) -> Option<&'static str> {
    match name {
        "TN" | "name" => Some("xterm-256color"),
        "Co" | "colors" => Some("256"),
        "RGB" | "Tc" => Some("8"),
        // OSC 52 clipboard capability (terminfo "Ms")
        "Ms" => Some("\x1b]52;%p1%s;%p2%s\x07"),
        // Cursor style: DECSCUSR set and reset
        "Ss" => Some("\x1b[%p1%d q"),
        "Se" => Some("\x1b[2 q"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        assert_eq!(encode_hex_ascii("TN"), "544e");
        assert_eq!(decode_hex_ascii("544e").as_deref(), Some("TN"));
        assert_eq!(decode_hex_ascii("54e"), None);
        assert_eq!(decode_hex_ascii("zz"), None);
    }

    #[test]
    fn known_capabilities() {
        assert_eq!(tcap_capability_value("Co"), Some("256"));
        assert!(tcap_capability_value("bogus").is_none());
    }
}
