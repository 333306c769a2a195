//! The PTY Reader task (spec.md §4.4), run as a dedicated OS thread.
//!
//! `spec.md` §5 allows threads, cooperative tasks, or a unified poll loop.
//! Unlike the teacher's compositor (which unifies PTY and IPC polling on
//! one `calloop::EventLoop` because both ends feed the same render loop),
//! the Control Server here handles one connection to completion before
//! accepting the next (spec.md §4.5) and gains nothing from sharing an
//! event loop with the Reader. A plain thread keeps `host::pty`'s
//! toggle-nonblocking read idiom simple to reuse directly, at a ~10ms
//! cadence comfortably under the spec's "≤~100ms" wakeup bound.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::session::SessionState;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub fn spawn(session: Arc<Mutex<SessionState>>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || loop {
        let keep_going = {
            let mut guard = session.lock().unwrap();
            guard.pump()
        };
        if !keep_going {
            tracing::debug!("reader thread stopping: shutdown requested");
            return;
        }
        std::thread::sleep(POLL_INTERVAL);
    })
}
