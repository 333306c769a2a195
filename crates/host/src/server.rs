//! Control Server: single-threaded accept loop (spec.md §4.5).
//!
//! Grounded in the teacher's `crates/compositor/src/compositor_main.rs`
//! (nonblocking `UnixListener`, `WouldBlock`-tolerant accept loop) and
//! `crates/compositor/src/ipc.rs` (`read_ipc_request`'s one-line-per-
//! connection parse). Unlike the teacher, which inserts the listener into
//! a `calloop` source, this loop runs on its own thread (see `reader.rs`
//! for why) with the same "nonblocking accept + short sleep" idiom spec.md
//! §4.5 explicitly names as acceptable.

use std::io::{BufRead, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::handlers;
use crate::protocol::{Request, Response};
use crate::session::SessionState;

const IDLE_SLEEP: Duration = Duration::from_millis(10);

pub fn accept_loop(listener: UnixListener, session: Arc<Mutex<SessionState>>) {
    if let Err(e) = listener.set_nonblocking(true) {
        tracing::error!(error = %e, "failed to set control socket nonblocking");
        return;
    }
    loop {
        if session.lock().unwrap().shutdown_requested() {
            break;
        }
        match listener.accept() {
            Ok((stream, _addr)) => handle_connection(stream, &session),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(IDLE_SLEEP);
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                std::thread::sleep(IDLE_SLEEP);
            }
        }
    }
}

fn handle_connection(mut stream: UnixStream, session: &Arc<Mutex<SessionState>>) {
    let mut line = String::new();
    {
        let mut reader = std::io::BufReader::new(&stream);
        match reader.read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed reading request line");
                return;
            }
        }
    }

    let request: Request = match serde_json::from_str(line.trim_end()) {
        Ok(req) => req,
        Err(e) => {
            write_response(&mut stream, &Response::err(format!("malformed request: {e}")));
            return;
        }
    };

    let response = handlers::dispatch(request, session, &mut stream);
    write_response(&mut stream, &response);
}

fn write_response(stream: &mut UnixStream, response: &Response) {
    if let Err(e) = stream.write_all(response.to_line().as_bytes()) {
        tracing::debug!(error = %e, "failed writing response, client likely gone");
    }
}
