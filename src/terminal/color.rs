/// Terminal color representation supporting 16-color, 256-color, and
/// truecolor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

/// The 256-entry color table plus the dynamic defaults (OSC 10/11/12).
///
/// Indices 0-15 are the standard ANSI colors, 16-231 a 6x6x6 cube, 232-255 a
/// grayscale ramp. Individual entries are mutable at runtime via OSC 4 and
/// restored by OSC 104 or a full reset.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: [(u8, u8, u8); 256],
    /// Default foreground (OSC 10).
    pub foreground: (u8, u8, u8),
    /// Default background (OSC 11).
    pub background: (u8, u8, u8),
    /// Cursor color override (OSC 12); None renders the theme cursor.
    pub cursor: Option<(u8, u8, u8)>,
}

/// Compiled-in defaults matching the frontend theme.
const DEFAULT_FOREGROUND: (u8, u8, u8) = (0xd4, 0xd4, 0xd4);
const DEFAULT_BACKGROUND: (u8, u8, u8) = (0x0e, 0x0e, 0x0e);

impl Default for Palette {
    fn default() -> Self {
        let mut colors = [(0u8, 0u8, 0u8); 256];
        for (i, slot) in colors.iter_mut().enumerate() {
            *slot = default_indexed(i as u8);
        }
        Self {
            colors,
            foreground: DEFAULT_FOREGROUND,
            background: DEFAULT_BACKGROUND,
            cursor: None,
        }
    }
}

impl Palette {
    pub fn get(&self, index: u8) -> (u8, u8, u8) {
        self.colors[index as usize]
    }

    pub fn set(&mut self, index: u8, rgb: (u8, u8, u8)) {
        self.colors[index as usize] = rgb;
    }

    /// Restore a single entry to its compiled-in default.
    pub fn reset_entry(&mut self, index: u8) {
        self.colors[index as usize] = default_indexed(index);
    }

    /// Restore the whole table and the dynamic colors.
    pub fn reset(&mut self) {
        *self = Palette::default();
    }

    /// Resolve a foreground color to RGB. With `bold_is_bright`, a bold
    /// cell using indices 0-7 renders as the bright 8-15 variant; the
    /// stored color stays 0-7.
    pub fn resolve_fg(&self, color: Color, bold: bool, bold_is_bright: bool) -> (u8, u8, u8) {
        match color {
            Color::Default => self.foreground,
            Color::Indexed(i) if bold_is_bright && bold && i < 8 => self.get(i + 8),
            Color::Indexed(i) => self.get(i),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }

    /// Resolve a background color to RGB.
    pub fn resolve_bg(&self, color: Color) -> (u8, u8, u8) {
        match color {
            Color::Default => self.background,
            Color::Indexed(i) => self.get(i),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }
}

/// Compiled-in value of a 256-color index: xterm's standard 16, the
/// 6x6x6 cube, and the 24-step gray ramp.
pub fn default_indexed(index: u8) -> (u8, u8, u8) {
    match index {
        0 => (0x00, 0x00, 0x00),
        1 => (0xcd, 0x00, 0x00),
        2 => (0x00, 0xcd, 0x00),
        3 => (0xcd, 0xcd, 0x00),
        4 => (0x00, 0x00, 0xee),
        5 => (0xcd, 0x00, 0xcd),
        6 => (0x00, 0xcd, 0xcd),
        7 => (0xe5, 0xe5, 0xe5),
        8 => (0x7f, 0x7f, 0x7f),
        9 => (0xff, 0x00, 0x00),
        10 => (0x00, 0xff, 0x00),
        11 => (0xff, 0xff, 0x00),
        12 => (0x5c, 0x5c, 0xff),
        13 => (0xff, 0x00, 0xff),
        14 => (0x00, 0xff, 0xff),
        15 => (0xff, 0xff, 0xff),
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx % 36) / 6;
            let b = idx % 6;
            let to_val = |v: u8| if v == 0 { 0 } else { 55 + 40 * v };
            (to_val(r), to_val(g), to_val(b))
        }
        232..=255 => {
            let v = 8 + 10 * (index - 232);
            (v, v, v)
        }
    }
}

/// Parse an X11-style color specification: `rgb:R/G/B` with 1-4 hex digits
/// per component, `#RRGGBB`, or `#RGB`.
pub fn parse_color_spec(spec: &str) -> Option<(u8, u8, u8)> {
    if let Some(body) = spec.strip_prefix("rgb:") {
        let mut parts = body.split('/');
        let r = scale_component(parts.next()?)?;
        let g = scale_component(parts.next()?)?;
        let b = scale_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        return Some((r, g, b));
    }
    if let Some(hex) = spec.strip_prefix('#') {
        return match hex.len() {
            3 => {
                let v = u16::from_str_radix(hex, 16).ok()?;
                let r = ((v >> 8) & 0xf) as u8;
                let g = ((v >> 4) & 0xf) as u8;
                let b = (v & 0xf) as u8;
                Some((r * 17, g * 17, b * 17))
            }
            6 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                Some(((v >> 16) as u8, (v >> 8) as u8, v as u8))
            }
            _ => None,
        };
    }
    None
}

/// Scale a 1-4 hex digit X11 component to 8 bits.
fn scale_component(s: &str) -> Option<u8> {
    if s.is_empty() || s.len() > 4 {
        return None;
    }
    let v = u32::from_str_radix(s, 16).ok()?;
    let max = (1u32 << (4 * s.len() as u32)) - 1;
    Some(((v * 255 + max / 2) / max) as u8)
}

/// Format RGB as the X11 reply form with doubled hex pairs,
/// e.g. `rgb:ffff/5c5c/5757`.
pub fn x11_color_string(rgb: (u8, u8, u8)) -> String {
    let (r, g, b) = rgb;
    format!(
        "rgb:{:04x}/{:04x}/{:04x}",
        r as u16 * 0x0101,
        g as u16 * 0x0101,
        b as u16 * 0x0101
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_and_gray_ramp() {
        assert_eq!(default_indexed(16), (0, 0, 0));
        assert_eq!(default_indexed(231), (255, 255, 255));
        assert_eq!(default_indexed(232), (8, 8, 8));
        assert_eq!(default_indexed(255), (238, 238, 238));
    }

    #[test]
    fn parse_specs() {
        assert_eq!(parse_color_spec("rgb:ff/00/80"), Some((0xff, 0x00, 0x80)));
        assert_eq!(
            parse_color_spec("rgb:ffff/0000/8080"),
            Some((0xff, 0x00, 0x80))
        );
        assert_eq!(parse_color_spec("rgb:f/0/8"), Some((0xff, 0x00, 0x88)));
        assert_eq!(parse_color_spec("#ff0080"), Some((0xff, 0x00, 0x80)));
        assert_eq!(parse_color_spec("#f08"), Some((0xff, 0x00, 0x88)));
        assert_eq!(parse_color_spec("rgb:ff/00"), None);
        assert_eq!(parse_color_spec("bogus"), None);
    }

    #[test]
    fn x11_reply_doubles_hex_pairs() {
        assert_eq!(x11_color_string((0xff, 0x5c, 0x57)), "rgb:ffff/5c5c/5757");
    }

    #[test]
    fn bold_is_bright_resolution() {
        let palette = Palette::default();
        let dim = palette.resolve_fg(Color::Indexed(1), false, true);
        let bright = palette.resolve_fg(Color::Indexed(1), true, true);
        assert_eq!(dim, default_indexed(1));
        assert_eq!(bright, default_indexed(9));
        // Stored index above 7 is unaffected.
        assert_eq!(
            palette.resolve_fg(Color::Indexed(9), true, true),
            default_indexed(9)
        );
    }
}
