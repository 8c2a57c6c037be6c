//! User action sources.
//!
//! [`ScriptedActions`] replays a fixed queue (tests, demos).
//! [`ChannelActions`] drains an `mpsc` channel fed by another thread, e.g.
//! a stdin reader; see [`spawn_key_reader`].

use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use log::{debug, warn};

use crate::app::commands::Action;
use crate::app::ports::ActionSource;
use crate::control::ticker::spawn_named;

/// Replays queued actions, one per poll.
#[derive(Debug, Default)]
pub struct ScriptedActions {
    queue: VecDeque<Action>,
}

impl ScriptedActions {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            queue: actions.into_iter().collect(),
        }
    }

    pub fn push(&mut self, action: Action) {
        self.queue.push_back(action);
    }
}

impl ActionSource for ScriptedActions {
    fn poll(&mut self) -> Option<Action> {
        self.queue.pop_front()
    }
}

/// Receives actions sent from another thread.
pub struct ChannelActions {
    rx: Receiver<Action>,
    disconnected: bool,
}

impl ChannelActions {
    /// A connected sender / source pair.
    pub fn channel() -> (Sender<Action>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }

    pub fn new(rx: Receiver<Action>) -> Self {
        Self {
            rx,
            disconnected: false,
        }
    }
}

impl ActionSource for ChannelActions {
    fn poll(&mut self) -> Option<Action> {
        match self.rx.try_recv() {
            Ok(action) => Some(action),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.disconnected {
                    debug!("Action channel closed");
                    self.disconnected = true;
                }
                None
            }
        }
    }
}

/// Read panel keys line by line from `input` and forward the decoded
/// actions. Ends on EOF, on a read error, or when the receiver is gone.
pub fn spawn_key_reader<R>(input: R, tx: Sender<Action>) -> std::thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    spawn_named("key-reader", move || {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Input read failed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match Action::from_key(&line) {
                Some(action) => {
                    if tx.send(action).is_err() {
                        break;
                    }
                }
                None => warn!("Unknown key '{}'", line.trim()),
            }
        }
    })
}
