//! Mouse event encoding.

use super::{InputModes, Modifiers, MouseButton, MouseEncoding, MouseEvent, MouseEventKind, MouseTracking};

/// Legacy encodings clamp 1-based coordinates here (223 + 32 = 255).
const X10_COORD_MAX: u16 = 223;
/// UTF-8 encoding caps at the two-byte code point range (2015 + 32 = 2047).
const UTF8_COORD_MAX: u16 = 2015;

/// Translate a mouse event into the report bytes, or `None` when the
/// active tracking mode does not report this event.
///
/// The x10 form is a raw byte string: `col + 32` can exceed 0x7F, which is
/// not valid UTF-8, so it must never round-trip through `String`.
pub fn encode_mouse(event: MouseEvent, modes: &InputModes) -> Option<Vec<u8>> {
    if !should_report(&event, modes.mouse_tracking) {
        return None;
    }

    let release = matches!(event.kind, MouseEventKind::Release(_));
    let code = button_code(&event.kind, modes.mouse_encoding) + modifier_bits(event.mods);

    // 1-based wire coordinates.
    let col = event.col.saturating_add(1);
    let row = event.row.saturating_add(1);

    match modes.mouse_encoding {
        MouseEncoding::Sgr => {
            let suffix = if release { 'm' } else { 'M' };
            Some(format!("\x1b[<{code};{col};{row}{suffix}").into_bytes())
        }
        MouseEncoding::X10 => {
            let col = col.min(X10_COORD_MAX) as u8;
            let row = row.min(X10_COORD_MAX) as u8;
            Some(vec![
                0x1B,
                b'[',
                b'M',
                32 + code as u8,
                32 + col,
                32 + row,
            ])
        }
        MouseEncoding::Utf8 => {
            let mut bytes = vec![0x1B, b'[', b'M'];
            push_utf8_coord(&mut bytes, 32 + code);
            push_utf8_coord(&mut bytes, 32 + col.min(UTF8_COORD_MAX));
            push_utf8_coord(&mut bytes, 32 + row.min(UTF8_COORD_MAX));
            Some(bytes)
        }
    }
}

fn should_report(event: &MouseEvent, tracking: MouseTracking) -> bool {
    match tracking {
        MouseTracking::None => false,
        MouseTracking::X10 => matches!(
            event.kind,
            MouseEventKind::Press(_) | MouseEventKind::WheelUp | MouseEventKind::WheelDown
        ),
        MouseTracking::Button => match event.kind {
            MouseEventKind::Moved(held) => held.is_some(),
            _ => true,
        },
        MouseTracking::Any => true,
    }
}

/// Base button code before modifier bits: press 0/1/2, release 3 in the
/// legacy encodings (SGR keeps the pressed code and flags release with a
/// final `m`), motion 32-35, wheel 64/65.
fn button_code(kind: &MouseEventKind, encoding: MouseEncoding) -> u16 {
    match kind {
        MouseEventKind::Press(b) => button_number(*b),
        MouseEventKind::Release(b) => {
            if encoding == MouseEncoding::Sgr {
                button_number(*b)
            } else {
                3
            }
        }
        MouseEventKind::Moved(held) => 32 + held.map_or(3, button_number),
        MouseEventKind::WheelUp => 64,
        MouseEventKind::WheelDown => 65,
    }
}

fn button_number(button: MouseButton) -> u16 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
    }
}

fn modifier_bits(mods: Modifiers) -> u16 {
    let mut bits = 0;
    if mods.contains(Modifiers::SHIFT) {
        bits += 4;
    }
    if mods.contains(Modifiers::ALT) {
        bits += 8;
    }
    if mods.contains(Modifiers::CTRL) {
        bits += 16;
    }
    bits
}

/// Encode one coordinate value as a UTF-8 code point (mode 1005).
fn push_utf8_coord(out: &mut Vec<u8>, value: u16) {
    let ch = char::from_u32(value as u32).unwrap_or(' ');
    let mut buf = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: MouseEventKind, col: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            col,
            row,
            mods: Modifiers::empty(),
        }
    }

    fn modes(tracking: MouseTracking, encoding: MouseEncoding) -> InputModes {
        InputModes {
            mouse_tracking: tracking,
            mouse_encoding: encoding,
            ..InputModes::default()
        }
    }

    #[test]
    fn tracking_none_reports_nothing() {
        let m = modes(MouseTracking::None, MouseEncoding::Sgr);
        assert!(encode_mouse(event(MouseEventKind::Press(MouseButton::Left), 0, 0), &m).is_none());
    }

    #[test]
    fn x10_mode_filters_events() {
        let m = modes(MouseTracking::X10, MouseEncoding::X10);
        assert!(encode_mouse(event(MouseEventKind::Press(MouseButton::Left), 0, 0), &m).is_some());
        assert!(encode_mouse(event(MouseEventKind::Release(MouseButton::Left), 0, 0), &m).is_none());
        assert!(encode_mouse(event(MouseEventKind::Moved(Some(MouseButton::Left)), 0, 0), &m).is_none());
        assert!(encode_mouse(event(MouseEventKind::WheelUp, 0, 0), &m).is_some());
    }

    #[test]
    fn button_mode_reports_drag_not_hover() {
        let m = modes(MouseTracking::Button, MouseEncoding::Sgr);
        assert!(encode_mouse(event(MouseEventKind::Moved(Some(MouseButton::Left)), 1, 1), &m).is_some());
        assert!(encode_mouse(event(MouseEventKind::Moved(None), 1, 1), &m).is_none());
        let m = modes(MouseTracking::Any, MouseEncoding::Sgr);
        assert!(encode_mouse(event(MouseEventKind::Moved(None), 1, 1), &m).is_some());
    }

    #[test]
    fn x10_bytes_exact() {
        let m = modes(MouseTracking::X10, MouseEncoding::X10);
        let bytes = encode_mouse(event(MouseEventKind::Press(MouseButton::Left), 0, 0), &m).unwrap();
        assert_eq!(bytes, vec![0x1B, b'[', b'M', 32, 33, 33]);
        // Coordinates clamp at 223 and may exceed 0x7F: raw bytes, not UTF-8.
        let bytes = encode_mouse(event(MouseEventKind::Press(MouseButton::Right), 500, 100), &m).unwrap();
        assert_eq!(bytes, vec![0x1B, b'[', b'M', 34, 32 + 223, 32 + 101]);
        assert!(std::str::from_utf8(&bytes).is_err());
    }

    #[test]
    fn sgr_press_release_suffixes() {
        let m = modes(MouseTracking::Button, MouseEncoding::Sgr);
        let press = encode_mouse(event(MouseEventKind::Press(MouseButton::Middle), 4, 9), &m).unwrap();
        assert_eq!(press, b"\x1b[<1;5;10M".to_vec());
        let release = encode_mouse(event(MouseEventKind::Release(MouseButton::Middle), 4, 9), &m).unwrap();
        assert_eq!(release, b"\x1b[<1;5;10m".to_vec());
        // No clamping in SGR mode.
        let far = encode_mouse(event(MouseEventKind::Press(MouseButton::Left), 499, 299), &m).unwrap();
        assert_eq!(far, b"\x1b[<0;500;300M".to_vec());
    }

    #[test]
    fn wheel_and_motion_codes() {
        let m = modes(MouseTracking::Any, MouseEncoding::Sgr);
        let up = encode_mouse(event(MouseEventKind::WheelUp, 0, 0), &m).unwrap();
        assert_eq!(up, b"\x1b[<64;1;1M".to_vec());
        let down = encode_mouse(event(MouseEventKind::WheelDown, 0, 0), &m).unwrap();
        assert_eq!(down, b"\x1b[<65;1;1M".to_vec());
        let drag = encode_mouse(event(MouseEventKind::Moved(Some(MouseButton::Left)), 2, 2), &m).unwrap();
        assert_eq!(drag, b"\x1b[<32;3;3M".to_vec());
        let hover = encode_mouse(event(MouseEventKind::Moved(None), 2, 2), &m).unwrap();
        assert_eq!(hover, b"\x1b[<35;3;3M".to_vec());
    }

    #[test]
    fn modifier_bits_add() {
        let m = modes(MouseTracking::Button, MouseEncoding::Sgr);
        let ev = MouseEvent {
            kind: MouseEventKind::Press(MouseButton::Left),
            col: 0,
            row: 0,
            mods: Modifiers::SHIFT | Modifiers::CTRL,
        };
        assert_eq!(encode_mouse(ev, &m).unwrap(), b"\x1b[<20;1;1M".to_vec());
    }

    #[test]
    fn utf8_encoding_two_byte_coords() {
        let m = modes(MouseTracking::Button, MouseEncoding::Utf8);
        let bytes = encode_mouse(event(MouseEventKind::Press(MouseButton::Left), 200, 0), &m).unwrap();
        // col wire value 201 + 32 = 233 -> two UTF-8 bytes.
        assert_eq!(&bytes[..3], &[0x1B, b'[', b'M']);
        assert_eq!(bytes[3], 32);
        let rest = std::str::from_utf8(&bytes[4..]).unwrap();
        let chars: Vec<char> = rest.chars().collect();
        assert_eq!(chars[0] as u32, 233);
        assert_eq!(chars[1] as u32, 33);
    }
}
