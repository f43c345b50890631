//! SGR (Select Graphic Rendition) handling.
//!
//! Operates on the full parameter groups so both the legacy semicolon
//! forms (`38;2;r;g;b`) and the colon subparameter forms (`38:2::r:g:b`,
//! `4:3`) are understood.

use crate::parser::Params;

use super::cell::{CellAttrs, UnderlineStyle};
use super::color::Color;
use super::state::TerminalState;

pub(crate) fn apply(term: &mut TerminalState, params: &Params) {
    if params.is_empty() {
        term.cursor.reset_pen();
        return;
    }

    let mut i = 0;
    while i < params.len() {
        let group = params.group(i).unwrap_or(&[]);
        if group.len() > 1 {
            apply_subparam_group(term, group);
            i += 1;
            continue;
        }

        let code = group.first().copied().unwrap_or(0);
        match code {
            0 => term.cursor.reset_pen(),
            1 => term.cursor.attrs.insert(CellAttrs::BOLD),
            2 => term.cursor.attrs.insert(CellAttrs::DIM),
            3 => term.cursor.attrs.insert(CellAttrs::ITALIC),
            4 => set_underline(term, UnderlineStyle::Single),
            5 | 6 => term.cursor.attrs.insert(CellAttrs::BLINK),
            7 => term.cursor.attrs.insert(CellAttrs::REVERSE),
            8 => term.cursor.attrs.insert(CellAttrs::HIDDEN),
            9 => term.cursor.attrs.insert(CellAttrs::STRIKETHROUGH),
            21 => {
                term.cursor.attrs.insert(CellAttrs::DOUBLE_UNDERLINE);
                term.cursor.underline_style = UnderlineStyle::Double;
            }
            22 => {
                term.cursor.attrs.remove(CellAttrs::BOLD);
                term.cursor.attrs.remove(CellAttrs::DIM);
            }
            23 => term.cursor.attrs.remove(CellAttrs::ITALIC),
            24 => {
                term.cursor.attrs.remove(CellAttrs::UNDERLINE);
                term.cursor.attrs.remove(CellAttrs::DOUBLE_UNDERLINE);
                term.cursor.underline_style = UnderlineStyle::Single;
            }
            25 => term.cursor.attrs.remove(CellAttrs::BLINK),
            27 => term.cursor.attrs.remove(CellAttrs::REVERSE),
            28 => term.cursor.attrs.remove(CellAttrs::HIDDEN),
            29 => term.cursor.attrs.remove(CellAttrs::STRIKETHROUGH),
            30..=37 => term.cursor.fg = Color::Indexed(code as u8 - 30),
            38 => {
                let (color, consumed) = parse_semicolon_color(params, i + 1);
                if let Some(c) = color {
                    term.cursor.fg = c;
                }
                i += consumed;
            }
            39 => term.cursor.fg = Color::Default,
            40..=47 => term.cursor.bg = Color::Indexed(code as u8 - 40),
            48 => {
                let (color, consumed) = parse_semicolon_color(params, i + 1);
                if let Some(c) = color {
                    term.cursor.bg = c;
                }
                i += consumed;
            }
            49 => term.cursor.bg = Color::Default,
            53 => term.cursor.attrs.insert(CellAttrs::OVERLINE),
            55 => term.cursor.attrs.remove(CellAttrs::OVERLINE),
            58 => {
                let (color, consumed) = parse_semicolon_color(params, i + 1);
                if let Some(c) = color {
                    term.cursor.underline_color = c;
                }
                i += consumed;
            }
            59 => term.cursor.underline_color = Color::Default,
            90..=97 => term.cursor.fg = Color::Indexed(code as u8 - 90 + 8),
            100..=107 => term.cursor.bg = Color::Indexed(code as u8 - 100 + 8),
            _ => {}
        }
        i += 1;
    }
}

/// One colon-joined group: `4:style`, `38:5:idx`, `38:2:cs:r:g:b`, or the
/// degenerate `38:2:r:g:b` without a colorspace.
fn apply_subparam_group(term: &mut TerminalState, group: &[u16]) {
    match group[0] {
        4 => match group[1] {
            0 => {
                term.cursor.attrs.remove(CellAttrs::UNDERLINE);
                term.cursor.attrs.remove(CellAttrs::DOUBLE_UNDERLINE);
                term.cursor.underline_style = UnderlineStyle::Single;
            }
            1 => set_underline(term, UnderlineStyle::Single),
            2 => {
                term.cursor.attrs.insert(CellAttrs::DOUBLE_UNDERLINE);
                term.cursor.underline_style = UnderlineStyle::Double;
            }
            3 => set_underline(term, UnderlineStyle::Curly),
            4 => set_underline(term, UnderlineStyle::Dotted),
            5 => set_underline(term, UnderlineStyle::Dashed),
            _ => {}
        },
        38 => {
            if let Some(c) = parse_colon_color(group) {
                term.cursor.fg = c;
            }
        }
        48 => {
            if let Some(c) = parse_colon_color(group) {
                term.cursor.bg = c;
            }
        }
        58 => {
            if let Some(c) = parse_colon_color(group) {
                term.cursor.underline_color = c;
            }
        }
        _ => {}
    }
}

fn set_underline(term: &mut TerminalState, style: UnderlineStyle) {
    term.cursor.attrs.insert(CellAttrs::UNDERLINE);
    term.cursor.underline_style = style;
}

/// Legacy extended color: the mode and components live in the following
/// top-level groups. Returns the color and how many groups were consumed.
fn parse_semicolon_color(params: &Params, start: usize) -> (Option<Color>, usize) {
    match params.first(start) {
        2 if start + 3 < params.len() => {
            let r = params.first(start + 1).min(255) as u8;
            let g = params.first(start + 2).min(255) as u8;
            let b = params.first(start + 3).min(255) as u8;
            (Some(Color::Rgb(r, g, b)), 4)
        }
        5 if start < params.len().saturating_sub(1) => {
            (Some(Color::Indexed(params.first(start + 1).min(255) as u8)), 2)
        }
        // Truncated form: swallow what is there so later parameters are
        // not misread as attributes.
        _ => (None, params.len().saturating_sub(start)),
    }
}

/// Colon subparameter color. A six-element group carries a colorspace id
/// at index 2 (possibly empty, recorded as 0); a five-element group omits
/// it entirely.
fn parse_colon_color(group: &[u16]) -> Option<Color> {
    match *group.get(1)? {
        5 => group.get(2).map(|&i| Color::Indexed(i.min(255) as u8)),
        2 => {
            let (r, g, b) = if group.len() >= 6 {
                (group[3], group[4], group[5])
            } else if group.len() == 5 {
                (group[2], group[3], group[4])
            } else {
                return None;
            };
            Some(Color::Rgb(
                r.min(255) as u8,
                g.min(255) as u8,
                b.min(255) as u8,
            ))
        }
        _ => None,
    }
}

/// Reconstruct the current pen as a standard SGR parameter string for the
/// DECRQSS `m` reply, e.g. `0;1;4;31;48;5;100`.
pub(crate) fn pen_report(term: &TerminalState) -> String {
    let cursor = &term.cursor;
    let mut codes: Vec<String> = vec!["0".into()];

    let attr_codes: [(CellAttrs, u16); 8] = [
        (CellAttrs::BOLD, 1),
        (CellAttrs::DIM, 2),
        (CellAttrs::ITALIC, 3),
        (CellAttrs::BLINK, 5),
        (CellAttrs::REVERSE, 7),
        (CellAttrs::HIDDEN, 8),
        (CellAttrs::STRIKETHROUGH, 9),
        (CellAttrs::OVERLINE, 53),
    ];
    for (attr, code) in attr_codes {
        if cursor.attrs.contains(attr) {
            codes.push(code.to_string());
        }
    }
    if cursor.attrs.contains(CellAttrs::DOUBLE_UNDERLINE) {
        codes.push("21".into());
    } else if cursor.attrs.contains(CellAttrs::UNDERLINE) {
        match cursor.underline_style {
            UnderlineStyle::Single => codes.push("4".into()),
            UnderlineStyle::Double => codes.push("4:2".into()),
            UnderlineStyle::Curly => codes.push("4:3".into()),
            UnderlineStyle::Dotted => codes.push("4:4".into()),
            UnderlineStyle::Dashed => codes.push("4:5".into()),
        }
    }

    match cursor.fg {
        Color::Default => {}
        Color::Indexed(i) if i < 8 => codes.push((30 + i as u16).to_string()),
        Color::Indexed(i) if i < 16 => codes.push((90 + i as u16 - 8).to_string()),
        Color::Indexed(i) => codes.push(format!("38;5;{i}")),
        Color::Rgb(r, g, b) => codes.push(format!("38;2;{r};{g};{b}")),
    }
    match cursor.bg {
        Color::Default => {}
        Color::Indexed(i) if i < 8 => codes.push((40 + i as u16).to_string()),
        Color::Indexed(i) if i < 16 => codes.push((100 + i as u16 - 8).to_string()),
        Color::Indexed(i) => codes.push(format!("48;5;{i}")),
        Color::Rgb(r, g, b) => codes.push(format!("48;2;{r};{g};{b}")),
    }
    match cursor.underline_color {
        Color::Default => {}
        Color::Indexed(i) => codes.push(format!("58;5;{i}")),
        Color::Rgb(r, g, b) => codes.push(format!("58;2;{r};{g};{b}")),
    }

    codes.join(";")
}
