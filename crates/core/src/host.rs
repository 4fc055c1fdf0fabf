//! Host callback surface.
//!
//! This module defines the narrow interface between the engine/debugger and
//! whatever front-end embeds them. It provides:
//! 1. **Output Sink:** Line and raw text output.
//! 2. **Input Requests:** A blocking line read used by input syscalls and the debugger REPL.
//! 3. **Run Notifications:** A finished callback fired when the sentinel is reached.
//! 4. **Cancellation:** A shared token the engine checks between instructions.
//!
//! The core never references a UI toolkit; a graphical front-end runs the
//! interpret loop on its own thread and talks to it through [`ChannelHost`].

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{mpsc, Arc};

/// The callback surface consumed by the engine and the debugger.
///
/// All methods have console-appropriate semantics; implementations decide
/// where the text actually goes.
pub trait Host {
    /// Writes text without a trailing newline.
    fn write(&mut self, text: &str);

    /// Writes one line of text.
    fn write_line(&mut self, text: &str);

    /// Blocks until one line of input is available.
    ///
    /// Returns `None` when the input source is closed; callers treat that as
    /// a quit request rather than an error.
    fn read_line(&mut self) -> Option<String>;

    /// Called once when execution reaches the terminate sentinel.
    fn finished(&mut self) {}
}

/// Direct console I/O, the default host.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleHost;

impl Host for ConsoleHost {
    fn write(&mut self, text: &str) {
        print!("{text}");
        let _ = io::stdout().flush();
    }

    fn write_line(&mut self, text: &str) {
        println!("{text}");
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        }
    }
}

/// One event emitted by a [`ChannelHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// Text produced by the running program or the debugger.
    Output(String),
    /// The engine is blocked waiting for one line of input; reply on the
    /// input sender to release it.
    InputRequest,
    /// Execution reached the terminate sentinel.
    Finished,
}

/// A host that forwards everything over channels, for threaded front-ends.
///
/// The engine thread blocks inside [`Host::read_line`] on a rendezvous: it
/// sends [`HostEvent::InputRequest`] and waits for the front-end to send the
/// line back. This is the only concurrency surface in the simulator.
#[derive(Debug)]
pub struct ChannelHost {
    events: Sender<HostEvent>,
    input: Receiver<String>,
}

impl ChannelHost {
    /// Creates a channel host plus the front-end's two endpoints: the event
    /// receiver and the input-reply sender.
    pub fn new() -> (Self, Receiver<HostEvent>, Sender<String>) {
        let (event_tx, event_rx) = mpsc::channel();
        let (input_tx, input_rx) = mpsc::channel();
        (
            Self {
                events: event_tx,
                input: input_rx,
            },
            event_rx,
            input_tx,
        )
    }
}

impl Host for ChannelHost {
    fn write(&mut self, text: &str) {
        let _ = self.events.send(HostEvent::Output(text.to_string()));
    }

    fn write_line(&mut self, text: &str) {
        let _ = self.events.send(HostEvent::Output(format!("{text}\n")));
    }

    fn read_line(&mut self) -> Option<String> {
        self.events.send(HostEvent::InputRequest).ok()?;
        self.input.recv().ok()
    }

    fn finished(&mut self) {
        let _ = self.events.send(HostEvent::Finished);
    }
}

/// A shared cancellation token.
///
/// The host sets it; the engine checks it only at step boundaries, so a
/// cancelled run always stops between instructions with registers and memory
/// in a consistent state.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
