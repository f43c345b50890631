//! OSC (Operating System Command) dispatch.
//!
//! The payload arrives already split on `;`. Color queries reply in the
//! X11 doubled-hex form; OSC 52 clipboard reads are always denied with an
//! empty reply so a hostile remote cannot exfiltrate clipboard contents.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

use super::color::{parse_color_spec, x11_color_string};
use super::state::TerminalState;

pub(crate) fn dispatch(term: &mut TerminalState, params: &[&[u8]]) {
    if params.is_empty() {
        return;
    }

    let code = std::str::from_utf8(params[0]).unwrap_or("");
    match code {
        "0" => {
            if params.len() >= 2 {
                let title = String::from_utf8_lossy(params[1]).into_owned();
                term.icon_title = title.clone();
                term.title = title;
            }
        }
        "1" => {
            if params.len() >= 2 {
                term.icon_title = String::from_utf8_lossy(params[1]).into_owned();
            }
        }
        "2" => {
            if params.len() >= 2 {
                term.title = String::from_utf8_lossy(params[1]).into_owned();
            }
        }
        "4" => handle_palette(term, &params[1..]),
        "7" => {
            if params.len() >= 2 {
                let uri = String::from_utf8_lossy(params[1]).into_owned();
                term.set_working_dir_uri(&uri);
            }
        }
        "8" => handle_hyperlink(term, params),
        "10" | "11" | "12" => handle_dynamic_color(term, code, params),
        "52" => handle_clipboard(term, params),
        "104" => handle_palette_reset(term, &params[1..]),
        "112" => term.palette.cursor = None,
        // Semantic prompt markers; reserved, accepted silently.
        "133" => {}
        _ => {
            tracing::debug!(code, "ignored OSC command");
        }
    }
}

/// OSC 4: `idx;spec` pairs. A `?` spec queries; anything else parses as an
/// X11 color and updates the palette.
fn handle_palette(term: &mut TerminalState, pairs: &[&[u8]]) {
    for pair in pairs.chunks(2) {
        if pair.len() < 2 {
            return;
        }
        let Some(index) = std::str::from_utf8(pair[0])
            .ok()
            .and_then(|s| s.parse::<u8>().ok())
        else {
            continue;
        };
        let spec = std::str::from_utf8(pair[1]).unwrap_or("");
        if spec == "?" {
            let reply = format!(
                "\x1b]4;{};{}\x1b\\",
                index,
                x11_color_string(term.palette.get(index))
            );
            term.respond(reply.as_bytes());
        } else if let Some(rgb) = parse_color_spec(spec) {
            term.palette.set(index, rgb);
        }
    }
}

/// OSC 104: reset listed palette entries, or everything when bare.
fn handle_palette_reset(term: &mut TerminalState, indices: &[&[u8]]) {
    if indices.is_empty() {
        for i in 0..=255u8 {
            term.palette.reset_entry(i);
        }
        return;
    }
    for raw in indices {
        if let Some(index) = std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse::<u8>().ok())
        {
            term.palette.reset_entry(index);
        }
    }
}

/// OSC 8: `params;uri`. An empty URI closes the active hyperlink; URIs may
/// themselves contain `;`, so the tail is rejoined.
fn handle_hyperlink(term: &mut TerminalState, params: &[&[u8]]) {
    if params.len() < 3 {
        term.set_hyperlink(None);
        return;
    }
    let uri = params[2..]
        .iter()
        .map(|p| String::from_utf8_lossy(p))
        .collect::<Vec<_>>()
        .join(";");
    if uri.is_empty() {
        term.set_hyperlink(None);
    } else {
        term.set_hyperlink(Some(uri));
    }
}

/// OSC 10/11/12: dynamic foreground/background/cursor color, settable and
/// queryable.
fn handle_dynamic_color(term: &mut TerminalState, code: &str, params: &[&[u8]]) {
    if params.len() < 2 {
        return;
    }
    let body = std::str::from_utf8(params[1]).unwrap_or("");
    if body == "?" {
        let rgb = match code {
            "10" => term.palette.foreground,
            "11" => term.palette.background,
            _ => term.palette.cursor.unwrap_or(term.palette.foreground),
        };
        let reply = format!("\x1b]{};{}\x1b\\", code, x11_color_string(rgb));
        term.respond(reply.as_bytes());
        return;
    }
    if let Some(rgb) = parse_color_spec(body) {
        match code {
            "10" => term.palette.foreground = rgb,
            "11" => term.palette.background = rgb,
            _ => term.palette.cursor = Some(rgb),
        }
    }
}

/// OSC 52: clipboard. Writes go through the injected hook; reads are
/// denied with the empty reply regardless of clipboard state.
fn handle_clipboard(term: &mut TerminalState, params: &[&[u8]]) {
    if params.len() < 3 {
        return;
    }
    let payload = params[2];
    if payload == b"?" {
        term.respond(b"\x1b]52;;\x1b\\");
        return;
    }
    if let Ok(decoded) = BASE64_STANDARD.decode(payload) {
        term.clipboard_write(&decoded);
    }
}

/// Percent-decode a `file://` URI path component.
pub(crate) fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("/home/user/my%20dir"), "/home/user/my dir");
        assert_eq!(percent_decode("no-escapes"), "no-escapes");
        assert_eq!(percent_decode("bad%zz"), "bad%zz");
        assert_eq!(percent_decode("trail%2"), "trail%2");
    }
}
