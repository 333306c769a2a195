//! PTY pair creation and child process harness (spec.md §4.3).
//!
//! Adapted from the teacher's `crates/terminal/src/pty.rs`
//! (karlb-termstack): same openpt/grantpt/unlockpt/ptsname dance, same
//! `setsid`+`TIOCSCTTY` `pre_exec`, same non-blocking-toggle read/write.
//! Generalized from "spawn an interactive login shell" to "exec the given
//! argv directly", since the host spawns one fixed child command, not a
//! shell session.

use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::{AsFd, AsRawFd, FromRawFd, IntoRawFd, RawFd};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, Stdio};

use rustix::termios::{tcsetwinsize, Winsize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PtyError {
    #[error("failed to open PTY: {0}")]
    Open(std::io::Error),

    #[error("failed to spawn child: {0}")]
    Spawn(std::io::Error),

    #[error("failed to set window size: {0}")]
    Winsize(rustix::io::Errno),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one non-blocking read attempt, distinguishing "nothing to read
/// yet" from "the PTY hung up" — the teacher's `Pty::read` collapses both
/// into `Ok(0)`, which spec.md §4.4's Reader cannot act on (it needs to
/// enter a tail state on hangup specifically).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtyReadOutcome {
    Data(usize),
    WouldBlock,
    Eof,
}

pub struct Pty {
    master: File,
    child: Child,
    pid: i32,
    winsize: Winsize,
    exited: bool,
}

impl Pty {
    /// Open a PTY pair and exec `argv[0] argv[1..]` on the slave as a new
    /// session leader with the slave as its controlling terminal.
    pub fn spawn(argv: &[String], cols: u16, rows: u16, term_value: &str) -> Result<Self, PtyError> {
        if argv.is_empty() {
            return Err(PtyError::Spawn(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "argv must have at least one element",
            )));
        }
        let winsize = Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };

        let master_fd = rustix::pty::openpt(rustix::pty::OpenptFlags::RDWR | rustix::pty::OpenptFlags::NOCTTY)
            .map_err(|e| PtyError::Open(std::io::Error::from_raw_os_error(e.raw_os_error())))?;
        rustix::pty::grantpt(&master_fd)
            .map_err(|e| PtyError::Open(std::io::Error::from_raw_os_error(e.raw_os_error())))?;
        rustix::pty::unlockpt(&master_fd)
            .map_err(|e| PtyError::Open(std::io::Error::from_raw_os_error(e.raw_os_error())))?;

        let slave_name_buf = [0u8; 256];
        let slave_name = rustix::pty::ptsname(&master_fd, slave_name_buf)
            .map_err(|e| PtyError::Open(std::io::Error::from_raw_os_error(e.raw_os_error())))?;
        let slave_path = slave_name.to_str().map_err(|_| {
            PtyError::Open(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "invalid PTY slave name",
            ))
        })?;

        tcsetwinsize(&master_fd, winsize).map_err(PtyError::Winsize)?;

        let slave = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(slave_path)
            .map_err(PtyError::Open)?;
        let slave_fd = slave.into_raw_fd();

        let slave_fd_out = unsafe { libc::dup(slave_fd) };
        let slave_fd_err = unsafe { libc::dup(slave_fd) };
        if slave_fd_out < 0 || slave_fd_err < 0 {
            unsafe {
                libc::close(slave_fd);
                if slave_fd_out >= 0 {
                    libc::close(slave_fd_out);
                }
            }
            return Err(PtyError::Open(std::io::Error::last_os_error()));
        }

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]).env("TERM", term_value);

        let child = unsafe {
            cmd.stdin(Stdio::from_raw_fd(slave_fd))
                .stdout(Stdio::from_raw_fd(slave_fd_out))
                .stderr(Stdio::from_raw_fd(slave_fd_err))
                .pre_exec(move || {
                    libc::setsid();
                    libc::ioctl(slave_fd, libc::TIOCSCTTY, 0);
                    Ok(())
                })
                .spawn()
                .map_err(PtyError::Spawn)?
        };

        let master = unsafe { File::from_raw_fd(master_fd.as_raw_fd()) };
        std::mem::forget(master_fd);
        let pid = child.id() as i32;

        Ok(Self {
            master,
            child,
            pid,
            winsize,
            exited: false,
        })
    }

    /// Apply a new window size and notify the child with `SIGWINCH`
    /// (spec.md §4.6.7 `RESIZE`).
    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<(), PtyError> {
        self.winsize = Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        tcsetwinsize(self.master.as_fd(), self.winsize).map_err(PtyError::Winsize)?;
        unsafe {
            libc::kill(self.pid, libc::SIGWINCH);
        }
        Ok(())
    }

    /// Non-blocking read of up to `buf.len()` bytes (spec.md §4.4).
    pub fn read(&mut self, buf: &mut [u8]) -> Result<PtyReadOutcome, PtyError> {
        let flags = rustix::fs::fcntl_getfl(self.master.as_fd())
            .map_err(|e| std::io::Error::from_raw_os_error(e.raw_os_error()))?;
        rustix::fs::fcntl_setfl(self.master.as_fd(), flags | rustix::fs::OFlags::NONBLOCK)
            .map_err(|e| std::io::Error::from_raw_os_error(e.raw_os_error()))?;

        let result = self.master.read(buf);

        rustix::fs::fcntl_setfl(self.master.as_fd(), flags)
            .map_err(|e| std::io::Error::from_raw_os_error(e.raw_os_error()))?;

        match result {
            Ok(0) => Ok(PtyReadOutcome::Eof),
            Ok(n) => Ok(PtyReadOutcome::Data(n)),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(PtyReadOutcome::WouldBlock),
            // Linux surfaces "slave closed, no process holds it open" as EIO.
            Err(e) if e.raw_os_error() == Some(libc::EIO) => Ok(PtyReadOutcome::Eof),
            Err(e) => Err(PtyError::Io(e)),
        }
    }

    /// Non-blocking write; returns bytes written, 0 if the PTY buffer is full.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, PtyError> {
        let flags = rustix::fs::fcntl_getfl(self.master.as_fd())
            .map_err(|e| std::io::Error::from_raw_os_error(e.raw_os_error()))?;
        rustix::fs::fcntl_setfl(self.master.as_fd(), flags | rustix::fs::OFlags::NONBLOCK)
            .map_err(|e| std::io::Error::from_raw_os_error(e.raw_os_error()))?;

        let result = self.master.write(data);

        rustix::fs::fcntl_setfl(self.master.as_fd(), flags)
            .map_err(|e| std::io::Error::from_raw_os_error(e.raw_os_error()))?;

        match result {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(PtyError::Io(e)),
        }
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn winsize(&self) -> (u16, u16) {
        (self.winsize.ws_col, self.winsize.ws_row)
    }

    /// Non-blocking reap (spec.md §4.3). Returns the exit code (or
    /// `128 + signal` if signaled) the first time the child is observed to
    /// have exited, `None` otherwise or on subsequent calls.
    pub fn reap(&mut self) -> Option<i32> {
        if self.exited {
            return None;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.exited = true;
                let code = status
                    .code()
                    .or_else(|| status.signal().map(|s| 128 + s))
                    .unwrap_or(-1);
                tracing::debug!(pid = self.pid, code, "child exited");
                Some(code)
            }
            Ok(None) => None,
            Err(e) => {
                self.exited = true;
                tracing::warn!(pid = self.pid, error = %e, "error reaping child");
                Some(-1)
            }
        }
    }

    /// Send a signal already resolved to its platform number (spec.md §4.6.6).
    pub fn send_signal(&self, signal: i32) {
        unsafe {
            libc::kill(self.pid, signal);
        }
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        if self.exited {
            return;
        }
        unsafe {
            libc::kill(self.pid, libc::SIGHUP);
        }
        let start = std::time::Instant::now();
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => {
                    if start.elapsed() > std::time::Duration::from_millis(500) {
                        break;
                    }
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip_in_ci() -> bool {
        std::env::var("CI").is_ok()
    }

    #[test]
    fn can_spawn_and_read_output() {
        if skip_in_ci() {
            return;
        }
        let argv = vec!["printf".to_string(), "hello\\n".to_string()];
        let mut pty = Pty::spawn(&argv, 80, 24, "xterm-256color").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(100));
        let mut buf = [0u8; 256];
        let mut out = Vec::new();
        for _ in 0..20 {
            match pty.read(&mut buf) {
                Ok(PtyReadOutcome::Data(n)) => out.extend_from_slice(&buf[..n]),
                Ok(PtyReadOutcome::WouldBlock) => {
                    std::thread::sleep(std::time::Duration::from_millis(20))
                }
                Ok(PtyReadOutcome::Eof) => break,
                Err(_) => break,
            }
        }
        assert!(String::from_utf8_lossy(&out).contains("hello"));
    }

    #[test]
    fn resize_updates_winsize() {
        if skip_in_ci() {
            return;
        }
        let argv = vec!["sleep".to_string(), "1".to_string()];
        let mut pty = Pty::spawn(&argv, 80, 24, "ansi").unwrap();
        assert_eq!(pty.winsize(), (80, 24));
        pty.resize(100, 42).unwrap();
        assert_eq!(pty.winsize(), (100, 42));
    }

    #[test]
    fn reap_reports_exit_code_once() {
        if skip_in_ci() {
            return;
        }
        let argv = vec!["sh".to_string(), "-c".to_string(), "exit 7".to_string()];
        let mut pty = Pty::spawn(&argv, 80, 24, "ansi").unwrap();
        let mut code = None;
        for _ in 0..50 {
            if let Some(c) = pty.reap() {
                code = Some(c);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert_eq!(code, Some(7));
        assert_eq!(pty.reap(), None);
    }

    #[test]
    fn reap_reports_128_plus_signal_when_killed() {
        if skip_in_ci() {
            return;
        }
        let argv = vec!["sleep".to_string(), "10".to_string()];
        let mut pty = Pty::spawn(&argv, 80, 24, "ansi").unwrap();
        pty.send_signal(libc::SIGTERM);
        let mut code = None;
        for _ in 0..50 {
            if let Some(c) = pty.reap() {
                code = Some(c);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert_eq!(code, Some(128 + libc::SIGTERM));
    }

    #[test]
    fn rejects_empty_argv() {
        assert!(matches!(Pty::spawn(&[], 80, 24, "ansi"), Err(PtyError::Spawn(_))));
    }
}
