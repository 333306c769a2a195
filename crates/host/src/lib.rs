//! PTY child harness, session state, and the control-protocol server.
//!
//! `crates/terminal` is pure state; everything here touches a file
//! descriptor: opening the PTY, spawning the child, running the Reader
//! thread, and serving the control socket.

pub mod config;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod pty;
pub mod reader;
pub mod server;
pub mod session;
pub mod signal;

use std::os::unix::net::UnixListener;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub use config::{Config, EmulatorMode};
pub use error::HostError;
pub use pty::{Pty, PtyError, PtyReadOutcome};
pub use session::SessionState;

/// Spawn the child under a PTY and build the session state it runs in
/// (spec.md §4.3).
pub fn spawn_session(
    argv: &[String],
    config: &Config,
    socket_path: std::path::PathBuf,
    auto_generated: bool,
) -> Result<SessionState, HostError> {
    let tee = match &config.pty_dump {
        Some(path) => Some(
            std::fs::File::create(path)
                .map_err(HostError::Io)?,
        ),
        None => None,
    };
    let pty = Pty::spawn(argv, config.cols, config.rows, config.emulator.term_value())?;
    let screen = terminal::Screen::with_debug_capacity(
        config.rows as usize,
        config.cols as usize,
        config.debug_ring_capacity,
    );
    Ok(SessionState::new(pty, screen, socket_path, auto_generated, tee))
}

/// Run the Reader thread and the Control Server until shutdown, then clean
/// up the endpoint if it was auto-generated (spec.md §5 "Resource
/// lifetimes").
pub fn serve(session: SessionState, listener: UnixListener) {
    let socket_path = session.socket_path().to_path_buf();
    let auto_generated = session.auto_generated();
    let session = Arc::new(Mutex::new(session));

    let reader_handle = reader::spawn(session.clone());
    server::accept_loop(listener, session.clone());

    if let Err(e) = reader_handle.join() {
        tracing::warn!(?e, "reader thread panicked");
    }
    cleanup_endpoint(&socket_path, auto_generated);
}

fn cleanup_endpoint(socket_path: &Path, auto_generated: bool) {
    let _ = std::fs::remove_file(socket_path);
    if auto_generated {
        if let Some(parent) = socket_path.parent() {
            let _ = std::fs::remove_dir(parent);
        }
    }
}
