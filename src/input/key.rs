//! Keyboard event encoding.

use super::{InputModes, KeyCode, KeyEvent, Modifiers};

/// Translate one key event into the byte sequence to send upstream.
/// Returns an empty vector for keys that produce nothing.
pub fn encode_key(event: KeyEvent, modes: &InputModes) -> Vec<u8> {
    let mods = event.mods;
    let m = mods.param();

    match event.code {
        KeyCode::Up => arrow(b'A', m, modes),
        KeyCode::Down => arrow(b'B', m, modes),
        KeyCode::Right => arrow(b'C', m, modes),
        KeyCode::Left => arrow(b'D', m, modes),

        KeyCode::Home => home_end(b'H', m),
        KeyCode::End => home_end(b'F', m),
        KeyCode::Insert => tilde(2, m),
        KeyCode::Delete => tilde(3, m),
        KeyCode::PageUp => tilde(5, m),
        KeyCode::PageDown => tilde(6, m),

        KeyCode::F(n @ 1..=4) => {
            let final_byte = b'P' + (n - 1);
            if m == 1 {
                vec![0x1B, b'O', final_byte]
            } else {
                format!("\x1b[1;{}{}", m, final_byte as char).into_bytes()
            }
        }
        KeyCode::F(n @ 5..=12) => {
            let code = [15, 17, 18, 19, 20, 21, 23, 24][(n - 5) as usize];
            tilde(code, m)
        }
        KeyCode::F(_) => Vec::new(),

        KeyCode::Enter => {
            let bytes: &[u8] = if modes.newline_mode { b"\r\n" } else { b"\r" };
            alt_prefix(mods, bytes.to_vec())
        }
        KeyCode::Backspace => {
            let byte = if mods.contains(Modifiers::CTRL) {
                0x7F
            } else if modes.backspace_sends_backspace {
                0x08
            } else {
                0x7F
            };
            alt_prefix(mods, vec![byte])
        }
        KeyCode::Tab => {
            if mods.contains(Modifiers::SHIFT) {
                b"\x1b[Z".to_vec()
            } else {
                alt_prefix(mods, vec![0x09])
            }
        }
        KeyCode::Escape => alt_prefix(mods, vec![0x1B]),

        KeyCode::Char(c) => {
            if mods.contains(Modifiers::CTRL) {
                match ctrl_byte(c) {
                    Some(byte) => alt_prefix(mods, vec![byte]),
                    None => alt_prefix(mods, encode_utf8(c)),
                }
            } else {
                alt_prefix(mods, encode_utf8(c))
            }
        }
    }
}

fn arrow(final_byte: u8, m: u16, modes: &InputModes) -> Vec<u8> {
    if m == 1 {
        if modes.application_cursor_keys {
            vec![0x1B, b'O', final_byte]
        } else {
            vec![0x1B, b'[', final_byte]
        }
    } else {
        format!("\x1b[1;{}{}", m, final_byte as char).into_bytes()
    }
}

fn home_end(final_byte: u8, m: u16) -> Vec<u8> {
    if m == 1 {
        vec![0x1B, b'[', final_byte]
    } else {
        format!("\x1b[1;{}{}", m, final_byte as char).into_bytes()
    }
}

fn tilde(code: u16, m: u16) -> Vec<u8> {
    if m == 1 {
        format!("\x1b[{code}~").into_bytes()
    } else {
        format!("\x1b[{code};{m}~").into_bytes()
    }
}

/// Control-key mapping: letters to 1-26, the usual punctuation to the
/// remaining C0 slots, `?` to DEL.
fn ctrl_byte(c: char) -> Option<u8> {
    match c {
        'a'..='z' => Some(c as u8 - b'a' + 1),
        'A'..='Z' => Some(c as u8 - b'A' + 1),
        '@' | ' ' => Some(0),
        '[' => Some(27),
        '\\' => Some(28),
        ']' => Some(29),
        '^' => Some(30),
        '_' => Some(31),
        '?' => Some(0x7F),
        _ => None,
    }
}

fn encode_utf8(c: char) -> Vec<u8> {
    let mut buf = [0u8; 4];
    c.encode_utf8(&mut buf).as_bytes().to_vec()
}

/// Alt prefixes an ESC onto whatever bytes the key produced.
fn alt_prefix(mods: Modifiers, mut bytes: Vec<u8>) -> Vec<u8> {
    if mods.contains(Modifiers::ALT) && !bytes.is_empty() {
        bytes.insert(0, 0x1B);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modes() -> InputModes {
        InputModes::default()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    fn mod_key(code: KeyCode, mods: Modifiers) -> KeyEvent {
        KeyEvent::with_mods(code, mods)
    }

    #[test]
    fn arrows_normal_and_application() {
        let mut m = modes();
        assert_eq!(encode_key(key(KeyCode::Up), &m), b"\x1b[A");
        m.application_cursor_keys = true;
        assert_eq!(encode_key(key(KeyCode::Up), &m), b"\x1bOA");
        // Modifiers force the CSI form even in application mode.
        assert_eq!(
            encode_key(mod_key(KeyCode::Left, Modifiers::SHIFT | Modifiers::CTRL), &m),
            b"\x1b[1;6D"
        );
    }

    #[test]
    fn function_keys() {
        let m = modes();
        assert_eq!(encode_key(key(KeyCode::F(1)), &m), b"\x1bOP");
        assert_eq!(encode_key(key(KeyCode::F(4)), &m), b"\x1bOS");
        assert_eq!(
            encode_key(mod_key(KeyCode::F(2), Modifiers::CTRL), &m),
            b"\x1b[1;5Q"
        );
        assert_eq!(encode_key(key(KeyCode::F(5)), &m), b"\x1b[15~");
        assert_eq!(encode_key(key(KeyCode::F(12)), &m), b"\x1b[24~");
        assert_eq!(
            encode_key(mod_key(KeyCode::F(5), Modifiers::SHIFT), &m),
            b"\x1b[15;2~"
        );
    }

    #[test]
    fn editing_keys() {
        let m = modes();
        assert_eq!(encode_key(key(KeyCode::Home), &m), b"\x1b[H");
        assert_eq!(encode_key(key(KeyCode::End), &m), b"\x1b[F");
        assert_eq!(encode_key(key(KeyCode::Insert), &m), b"\x1b[2~");
        assert_eq!(encode_key(key(KeyCode::Delete), &m), b"\x1b[3~");
        assert_eq!(encode_key(key(KeyCode::PageUp), &m), b"\x1b[5~");
        assert_eq!(
            encode_key(mod_key(KeyCode::PageDown, Modifiers::ALT), &m),
            b"\x1b[6;3~"
        );
        assert_eq!(
            encode_key(mod_key(KeyCode::Home, Modifiers::SHIFT), &m),
            b"\x1b[1;2H"
        );
    }

    #[test]
    fn enter_and_newline_mode() {
        let mut m = modes();
        assert_eq!(encode_key(key(KeyCode::Enter), &m), b"\r");
        m.newline_mode = true;
        assert_eq!(encode_key(key(KeyCode::Enter), &m), b"\r\n");
    }

    #[test]
    fn backspace_variants() {
        let mut m = modes();
        assert_eq!(encode_key(key(KeyCode::Backspace), &m), vec![0x7F]);
        m.backspace_sends_backspace = true;
        assert_eq!(encode_key(key(KeyCode::Backspace), &m), vec![0x08]);
        // Ctrl+Backspace is DEL regardless.
        assert_eq!(
            encode_key(mod_key(KeyCode::Backspace, Modifiers::CTRL), &m),
            vec![0x7F]
        );
    }

    #[test]
    fn tab_and_backtab() {
        let m = modes();
        assert_eq!(encode_key(key(KeyCode::Tab), &m), vec![0x09]);
        assert_eq!(
            encode_key(mod_key(KeyCode::Tab, Modifiers::SHIFT), &m),
            b"\x1b[Z"
        );
    }

    #[test]
    fn ctrl_characters() {
        let m = modes();
        assert_eq!(
            encode_key(mod_key(KeyCode::Char('c'), Modifiers::CTRL), &m),
            vec![3]
        );
        assert_eq!(
            encode_key(mod_key(KeyCode::Char('Z'), Modifiers::CTRL), &m),
            vec![26]
        );
        assert_eq!(
            encode_key(mod_key(KeyCode::Char('@'), Modifiers::CTRL), &m),
            vec![0]
        );
        assert_eq!(
            encode_key(mod_key(KeyCode::Char('['), Modifiers::CTRL), &m),
            vec![27]
        );
        assert_eq!(
            encode_key(mod_key(KeyCode::Char('_'), Modifiers::CTRL), &m),
            vec![31]
        );
        assert_eq!(
            encode_key(mod_key(KeyCode::Char('?'), Modifiers::CTRL), &m),
            vec![0x7F]
        );
    }

    #[test]
    fn alt_prefixes_escape() {
        let m = modes();
        assert_eq!(
            encode_key(mod_key(KeyCode::Char('f'), Modifiers::ALT), &m),
            b"\x1bf"
        );
        assert_eq!(
            encode_key(mod_key(KeyCode::Char('b'), Modifiers::ALT | Modifiers::CTRL), &m),
            vec![0x1B, 2]
        );
    }

    #[test]
    fn non_ascii_goes_utf8() {
        let m = modes();
        assert_eq!(encode_key(key(KeyCode::Char('é')), &m), "é".as_bytes());
        assert_eq!(encode_key(key(KeyCode::Char('漢')), &m), "漢".as_bytes());
    }
}
