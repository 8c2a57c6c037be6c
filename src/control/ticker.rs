//! Fixed-interval control loops on dedicated threads.
//!
//! Every periodic component (magnetron modulator, cooling fan, light, the
//! slewed drives) runs its tick body through a [`TickLoop`]. The loop owns
//! the shutdown protocol so that all controllers behave the same way:
//!
//! ```text
//!   start()  ──▶ running ──┬─ body() -> Break ──────────────┐
//!                          ├─ stop()           (no join)    ├──▶ exited
//!                          └─ emergency_stop() (joins)  ────┘
//! ```
//!
//! * `stop()` is cooperative: it clears the run flag and returns at once;
//!   the thread notices on its next check.
//! * `emergency_stop()` also raises the emergency flag and joins, so once
//!   it returns no further tick of that loop can execute.
//!
//! Sleeping between ticks waits on a condition variable, so a stop request
//! cuts the current sleep short instead of waiting out the period.
//! A generation counter keeps a loop that is winding down from being
//! revived by a quick `stop()` → `start()` sequence.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, error};
use parking_lot::{Condvar, Mutex};

/// Spawn a named worker thread.
pub fn spawn_named(
    name: &'static str,
    f: impl FnOnce() + Send + 'static,
) -> JoinHandle<()> {
    debug!("Spawning '{}'", name);
    std::thread::Builder::new()
        .name(name.into())
        .spawn(f)
        .expect("spawn_named: thread creation failed")
}

/// Join `handle` unless it is the calling thread. Panics in the worker are
/// logged, not re-raised.
pub fn join_worker(name: &str, handle: JoinHandle<()>) {
    if handle.thread().id() == std::thread::current().id() {
        // A loop stopping itself; it exits when the body returns.
        return;
    }
    if handle.join().is_err() {
        error!("{}: worker thread panicked", name);
    }
}

#[derive(Debug, Default)]
struct Signals {
    running: bool,
    emergency: bool,
    generation: u64,
}

impl Signals {
    fn is_live(&self, generation: u64) -> bool {
        self.running && !self.emergency && self.generation == generation
    }
}

#[derive(Default)]
struct Shared {
    signals: Mutex<Signals>,
    wake: Condvar,
}

/// A periodic loop with a standard cancellation protocol.
pub struct TickLoop {
    name: &'static str,
    period: Duration,
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TickLoop {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            shared: Arc::new(Shared::default()),
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Spawn the loop running `body` once per period.
    ///
    /// Returns `false` without spawning if the loop is already running.
    /// The body returns [`ControlFlow::Break`] to end the loop on its own.
    pub fn start<F>(&self, body: F) -> bool
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let mut handle = self.handle.lock();

        let generation = {
            let mut s = self.shared.signals.lock();
            if s.running {
                return false;
            }
            s.running = true;
            s.emergency = false;
            s.generation = s.generation.wrapping_add(1);
            s.generation
        };
        // Wake a predecessor still sleeping out its last period.
        self.shared.wake.notify_all();

        if let Some(previous) = handle.take() {
            join_worker(self.name, previous);
        }

        let shared = Arc::clone(&self.shared);
        let period = self.period;
        let name = self.name;
        *handle = Some(spawn_named(name, move || {
            run(name, &shared, period, generation, body);
        }));
        true
    }

    /// Cooperative stop: clear the run flag and return immediately.
    pub fn stop(&self) {
        {
            let mut s = self.shared.signals.lock();
            s.running = false;
        }
        self.shared.wake.notify_all();
    }

    /// Raise the emergency flag and block until the loop thread has exited.
    pub fn emergency_stop(&self) {
        {
            let mut s = self.shared.signals.lock();
            s.emergency = true;
            s.running = false;
        }
        self.shared.wake.notify_all();
        self.join();
    }

    /// Block until the current loop thread (if any) has exited.
    pub fn join(&self) {
        let previous = self.handle.lock().take();
        if let Some(handle) = previous {
            join_worker(self.name, handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.signals.lock().running
    }

    /// `true` after an emergency stop until the next `start()`.
    pub fn is_halted(&self) -> bool {
        self.shared.signals.lock().emergency
    }
}

impl Drop for TickLoop {
    fn drop(&mut self) {
        self.emergency_stop();
    }
}

fn run<F>(name: &str, shared: &Shared, period: Duration, generation: u64, mut body: F)
where
    F: FnMut() -> ControlFlow<()>,
{
    debug!("{}: loop started", name);
    loop {
        if !shared.signals.lock().is_live(generation) {
            break;
        }
        if body().is_break() {
            break;
        }

        let deadline = Instant::now() + period;
        let mut s = shared.signals.lock();
        while s.is_live(generation) {
            if shared.wake.wait_until(&mut s, deadline).timed_out() {
                break;
            }
        }
    }

    let mut s = shared.signals.lock();
    if s.generation == generation {
        s.running = false;
    }
    debug!("{}: loop exited", name);
}
