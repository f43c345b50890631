//! Squall terminal emulator core.
//!
//! The engine room of an SSH client: raw bytes from the remote side go in,
//! a live cell grid and packed GPU instance buffers come out.
//!
//! ```text
//!  bytes ─► Parser ─► actions ─► TerminalState ─► GridSnapshot ─► CellBridge ─► GPU
//!                        │            ▲                                │
//!                        ▼            │                                ▼
//!                  CSI/OSC/DCS/ESC ───┘                           AtlasPacker
//!                        │
//!                        ▼
//!                 response bytes ─► caller sink
//! ```
//!
//! The crate is transport-agnostic: it consumes only bytes, a snapshot
//! (render-tick) call, a clipboard-write hook, and a response sink. SSH,
//! PTYs, windows, and shaders belong to the embedding application.

pub mod config;
pub mod input;
pub mod parser;
pub mod render;
pub mod session;
pub mod terminal;

pub use config::Config;
pub use input::{KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use parser::{Parser, Perform};
pub use render::{AtlasPacker, CellBridge, CellInstance, GLYPH_NONE};
pub use session::{Session, SharedTerminal};
pub use terminal::cell::{Cell, CellAttrs, UnderlineStyle};
pub use terminal::color::Color;
pub use terminal::modes::{InputModes, MouseEncoding, MouseTracking};
pub use terminal::snapshot::{CursorView, GridSnapshot};
pub use terminal::{FeedHandle, Terminal, TerminalState};
