//! Session state: Screen + PTY harness + endpoint metadata + shutdown flag
//! (spec.md §3 "Session state").
//!
//! Generalizes the teacher's `Terminal::process_pty_with_count` (which fed
//! an `alacritty_terminal::Term` from a PTY in a loop) into `pump()`, a
//! single spec.md §4.4 Reader iteration: one bounded read, feed the Screen,
//! flush synthesized replies, poll for exit.

use std::io::Write;
use std::path::{Path, PathBuf};

use terminal::Screen;

use crate::pty::{Pty, PtyReadOutcome};

const READ_CHUNK: usize = 4096;

pub struct SessionState {
    pty: Pty,
    screen: Screen,
    exit_code: Option<i32>,
    shutdown: bool,
    pty_hungup: bool,
    socket_path: PathBuf,
    auto_generated: bool,
    tee: Option<std::fs::File>,
}

impl SessionState {
    pub fn new(
        pty: Pty,
        screen: Screen,
        socket_path: PathBuf,
        auto_generated: bool,
        tee: Option<std::fs::File>,
    ) -> Self {
        SessionState {
            pty,
            screen,
            exit_code: None,
            shutdown: false,
            pty_hungup: false,
            socket_path,
            auto_generated,
            tee,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn pty_mut(&mut self) -> &mut Pty {
        &mut self.pty
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn running(&self) -> bool {
        self.exit_code.is_none()
    }

    pub fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn auto_generated(&self) -> bool {
        self.auto_generated
    }

    /// Resize both the PTY's window and the Screen, per spec.md §3's
    /// "a RESIZE replaces the Screen with a freshly initialized one".
    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<(), crate::pty::PtyError> {
        self.pty.resize(cols, rows)?;
        self.screen = Screen::new(rows as usize, cols as usize);
        Ok(())
    }

    /// One Reader iteration (spec.md §4.4). Returns `false` once the
    /// session's shutdown flag is set, telling the Reader thread to stop;
    /// a PTY hangup or child exit alone do not stop the Reader; spec.md §3
    /// keeps the session (and therefore `OUTPUT`/`DEBUG`/`WAIT`) servable
    /// after exit until an explicit `STOP`, matching the CLI's foreground,
    /// non-daemonized `start` and letting an agent inspect the final screen
    /// after the child has already exited.
    pub fn pump(&mut self) -> bool {
        if !self.pty_hungup {
            let mut buf = [0u8; READ_CHUNK];
            match self.pty.read(&mut buf) {
                Ok(PtyReadOutcome::Data(n)) => {
                    self.screen.feed(&buf[..n]);
                    if let Some(tee) = self.tee.as_mut() {
                        if let Err(e) = tee.write_all(&buf[..n]) {
                            tracing::warn!(error = %e, "failed writing pty tee");
                        }
                    }
                }
                Ok(PtyReadOutcome::WouldBlock) => {}
                Ok(PtyReadOutcome::Eof) => {
                    tracing::debug!("pty hung up, entering tail state");
                    self.pty_hungup = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "pty read error, entering tail state");
                    self.pty_hungup = true;
                }
            }
        }

        self.flush_replies();

        if self.exit_code.is_none() {
            if let Some(code) = self.pty.reap() {
                self.exit_code = Some(code);
            }
        }

        !self.shutdown
    }

    fn flush_replies(&mut self) {
        for reply in self.screen.take_replies() {
            if let Err(e) = self.pty.write(&reply) {
                tracing::warn!(error = %e, "failed writing screen reply to pty");
            }
        }
    }
}
