//! Thread-safe embedding of a [`Terminal`].
//!
//! The I/O thread feeds bytes while the render thread takes snapshots, so
//! the terminal lives behind a mutex; responses flow out through an
//! unbounded channel in emission order, ready for the writer half of the
//! transport to drain.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::terminal::modes::InputModes;
use crate::terminal::snapshot::GridSnapshot;
use crate::terminal::Terminal;

/// Shared handle to a terminal guarded for cross-thread use.
pub type SharedTerminal = Arc<Mutex<Terminal>>;

/// A terminal wired for a reader/render thread pair.
pub struct Session {
    terminal: SharedTerminal,
    responses: Receiver<Vec<u8>>,
}

impl Session {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self::with_config(cols, rows, &Config::default())
    }

    pub fn with_config(cols: u16, rows: u16, config: &Config) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<Vec<u8>>();
        let mut terminal = Terminal::with_config(cols, rows, config);
        terminal.set_response_sink(response_sink(tx));
        Self {
            terminal: Arc::new(Mutex::new(terminal)),
            responses: rx,
        }
    }

    /// Clone the shared handle for another thread.
    pub fn terminal(&self) -> SharedTerminal {
        Arc::clone(&self.terminal)
    }

    /// Ingest remote output. Called from the reader thread.
    pub fn feed(&self, bytes: &[u8]) {
        self.terminal.lock().feed(bytes);
    }

    pub fn resize(&self, cols: u16, rows: u16) {
        self.terminal.lock().resize(cols, rows);
    }

    /// Extract a frame under a brief lock. Called from the render thread.
    pub fn snapshot(&self) -> GridSnapshot {
        self.terminal.lock().snapshot()
    }

    pub fn input_modes(&self) -> InputModes {
        self.terminal.lock().input_modes()
    }

    /// Response bytes to write back to the transport, in emission order.
    pub fn responses(&self) -> &Receiver<Vec<u8>> {
        &self.responses
    }
}

fn response_sink(tx: Sender<Vec<u8>>) -> Box<dyn FnMut(&[u8]) + Send> {
    Box::new(move |bytes| {
        // Fire-and-forget: a closed receiver just drops responses.
        let _ = tx.send(bytes.to_vec());
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_flow_through_channel() {
        let session = Session::new(80, 24);
        session.feed(b"\x1b[c\x1b[6n");
        let first = session.responses().try_recv().unwrap();
        let second = session.responses().try_recv().unwrap();
        assert_eq!(first, b"\x1b[?62;22c".to_vec());
        assert_eq!(second, b"\x1b[1;1R".to_vec());
        assert!(session.responses().try_recv().is_err());
    }

    #[test]
    fn feed_and_snapshot_from_threads() {
        let session = Session::new(20, 4);
        let shared = session.terminal();
        let writer = std::thread::spawn(move || {
            shared.lock().feed(b"threaded");
        });
        writer.join().unwrap();
        assert_eq!(session.snapshot().row_text(0), "threaded");
    }
}
