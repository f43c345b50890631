//! Terminal emulator core: parser-driven grid with snapshot extraction.

pub mod cell;
pub mod charset;
pub mod color;
pub mod cursor;
pub mod modes;
pub mod screen;
pub mod snapshot;
pub mod state;

mod csi;
mod dcs;
mod esc;
mod osc;
mod sgr;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::input::{self, KeyEvent, MouseEvent};
use crate::parser::{Parser, State};

pub use state::TerminalState;

use modes::InputModes;
use snapshot::GridSnapshot;

/// The terminal core: a parser and the grid it drives, glued together with
/// a reentrancy-safe ingest queue.
///
/// Sequence handlers invoke the response sink mid-feed, and the sink may
/// hand bytes straight back (a shell answering a DA query, a test harness,
/// an SSH channel echo). A [`FeedHandle`] lets such callers enqueue input
/// at any time: chunks queued while a feed is active are drained by the
/// active feed in arrival order, so parser scratch is only ever touched by
/// one logical activation.
pub struct Terminal {
    parser: Parser,
    state: TerminalState,
    pending: Arc<Mutex<VecDeque<Vec<u8>>>>,
    feeding: Arc<AtomicBool>,
    backspace_sends_backspace: bool,
    paste_chunk_bytes: usize,
}

/// Cloneable handle for injecting input from a response sink or another
/// thread. Enqueued bytes are processed by the in-flight feed, or by the
/// next [`Terminal::feed`]/[`Terminal::pump`] call.
#[derive(Clone)]
pub struct FeedHandle {
    pending: Arc<Mutex<VecDeque<Vec<u8>>>>,
    feeding: Arc<AtomicBool>,
}

impl FeedHandle {
    /// Queue bytes for ingest. Returns true when an active feed will drain
    /// them before returning.
    pub fn feed(&self, bytes: &[u8]) -> bool {
        self.pending.lock().push_back(bytes.to_vec());
        self.feeding.load(Ordering::Acquire)
    }
}

impl Terminal {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self::with_config(cols, rows, &Config::default())
    }

    pub fn with_config(cols: u16, rows: u16, config: &Config) -> Self {
        Self {
            parser: Parser::new(),
            state: TerminalState::with_config(cols, rows, config),
            pending: Arc::new(Mutex::new(VecDeque::new())),
            feeding: Arc::new(AtomicBool::new(false)),
            backspace_sends_backspace: config.backspace_sends_backspace,
            paste_chunk_bytes: config.paste_chunk_bytes,
        }
    }

    /// Ingest a chunk of remote output. Reentrant: if a feed is already in
    /// progress (the response sink fed us back), the chunk queues and the
    /// active feed picks it up, preserving byte order end to end.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.lock().push_back(bytes.to_vec());
        if self.feeding.load(Ordering::Acquire) {
            return;
        }
        self.pump();
    }

    /// Drain every queued chunk through the parser.
    pub fn pump(&mut self) {
        self.feeding.store(true, Ordering::Release);
        loop {
            let chunk = self.pending.lock().pop_front();
            match chunk {
                Some(chunk) => self.parser.advance(&mut self.state, &chunk),
                None => break,
            }
        }
        self.feeding.store(false, Ordering::Release);
    }

    pub fn feed_handle(&self) -> FeedHandle {
        FeedHandle {
            pending: Arc::clone(&self.pending),
            feeding: Arc::clone(&self.feeding),
        }
    }

    /// Immutable view of the active screen; resets dirty tracking.
    pub fn snapshot(&mut self) -> GridSnapshot {
        self.state.take_snapshot()
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.state.resize(cols, rows);
    }

    /// Mode snapshot for the key/mouse/paste encoders.
    pub fn input_modes(&self) -> InputModes {
        InputModes::from_modes(&self.state.modes, self.backspace_sends_backspace)
    }

    pub fn encode_key(&self, event: KeyEvent) -> Vec<u8> {
        input::key::encode_key(event, &self.input_modes())
    }

    pub fn encode_mouse(&self, event: MouseEvent) -> Option<Vec<u8>> {
        input::mouse::encode_mouse(event, &self.input_modes())
    }

    pub fn encode_paste(&self, text: &str) -> Vec<Vec<u8>> {
        input::paste::encode_paste_chunked(text, &self.input_modes(), self.paste_chunk_bytes)
    }

    pub fn set_response_sink(&mut self, sink: Box<dyn FnMut(&[u8]) + Send>) {
        self.state.set_response_sink(sink);
    }

    pub fn set_clipboard_write(&mut self, sink: Box<dyn FnMut(&[u8]) + Send>) {
        self.state.set_clipboard_write(sink);
    }

    pub fn take_responses(&mut self) -> Vec<Vec<u8>> {
        self.state.take_pending_responses()
    }

    /// Parser state, exposed for diagnostics.
    pub fn parser_state(&self) -> State {
        self.parser.state()
    }

    pub fn state(&self) -> &TerminalState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TerminalState {
        &mut self.state
    }

    pub fn cols(&self) -> u16 {
        self.state.cols()
    }

    pub fn rows(&self) -> u16 {
        self.state.rows()
    }

    pub fn title(&self) -> &str {
        &self.state.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_then_snapshot() {
        let mut term = Terminal::new(20, 4);
        term.feed(b"hi");
        let snap = term.snapshot();
        assert_eq!(snap.row_text(0), "hi");
        assert_eq!((snap.cursor.row, snap.cursor.col), (0, 2));
    }

    #[test]
    fn reentrant_feed_from_response_sink() {
        let mut term = Terminal::new(20, 4);
        let handle = term.feed_handle();
        term.set_response_sink(Box::new(move |bytes| {
            // A DA response triggers an immediate reply from the "host".
            if bytes.starts_with(b"\x1b[?62") {
                handle.feed(b"Y");
            }
        }));
        term.feed(b"\x1b[cX");
        let snap = term.snapshot();
        assert_eq!(snap.row_text(0), "XY");
        assert_eq!((snap.cursor.row, snap.cursor.col), (0, 2));
    }

    #[test]
    fn reentrant_feed_matches_single_feed() {
        let run = |reentrant: bool| {
            let mut term = Terminal::new(20, 4);
            if reentrant {
                let handle = term.feed_handle();
                term.set_response_sink(Box::new(move |_| {
                    handle.feed(b"tail");
                }));
                term.feed(b"head\x1b[c");
            } else {
                term.set_response_sink(Box::new(|_| {}));
                term.feed(b"head\x1b[c");
                term.feed(b"tail");
            }
            term.snapshot().row_text(0)
        };
        assert_eq!(run(true), run(false));
    }

    #[test]
    fn handle_queues_when_idle() {
        let mut term = Terminal::new(20, 4);
        let handle = term.feed_handle();
        assert!(!handle.feed(b"queued"));
        // Nothing processed yet.
        assert_eq!(term.snapshot().row_text(0), "");
        term.pump();
        assert_eq!(term.snapshot().row_text(0), "queued");
    }
}
