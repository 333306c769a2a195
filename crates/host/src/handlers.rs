//! The eight request handlers (spec.md §4.6).

use std::io::Read;
use std::os::unix::net::UnixStream;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use crate::protocol::{
    DebugPayload, InputPayload, KillPayload, Request, ResizePayload, Response, WaitPayload,
};
use crate::session::SessionState;
use crate::signal;

pub fn dispatch(
    request: Request,
    session: &Arc<Mutex<SessionState>>,
    stream: &mut UnixStream,
) -> Response {
    match request {
        Request::Output { format } => handle_output(session, format),
        Request::Input { data } => handle_input(session, data),
        Request::Status { activity } => handle_status(session, activity),
        Request::Stop {} => handle_stop(session),
        Request::Wait { data } => handle_wait(session, data, stream),
        Request::Kill { data } => handle_kill(session, data),
        Request::Resize { data } => handle_resize(session, data),
        Request::Debug { data } => handle_debug(session, data),
    }
}

fn handle_output(session: &Arc<Mutex<SessionState>>, format: Option<String>) -> Response {
    let fmt = format.as_deref().unwrap_or("ascii");
    let mut guard = session.lock().unwrap();
    let screen = guard.screen_mut();
    let rendered = match fmt {
        "ansi" => terminal::render_ansi(screen),
        _ => terminal::render_ascii(screen),
    };
    let cursor = screen.cursor();
    let (rows, cols) = screen.dimensions();
    Response::ok(json!({
        "screen": rendered,
        "cursor": {"row": cursor.row, "col": cursor.col},
        "size": {"rows": rows, "cols": cols},
    }))
}

fn handle_input(session: &Arc<Mutex<SessionState>>, data: InputPayload) -> Response {
    let mut guard = session.lock().unwrap();
    match guard.pty_mut().write(data.data.as_bytes()) {
        Ok(_) => Response::ok(json!({"message": "Input sent"})),
        Err(e) => Response::err(e.to_string()),
    }
}

fn handle_status(session: &Arc<Mutex<SessionState>>, activity: Option<bool>) -> Response {
    let mut guard = session.lock().unwrap();
    let running = guard.running();
    let mut obj = serde_json::Map::new();
    obj.insert("running".into(), json!(running));
    if let Some(code) = guard.exit_code() {
        obj.insert("exit_code".into(), json!(code));
    }
    if activity.unwrap_or(false) {
        let was_active = guard.screen_mut().take_activity();
        obj.insert("activity".into(), json!(was_active));
    }
    Response::ok(serde_json::Value::Object(obj))
}

fn handle_stop(session: &Arc<Mutex<SessionState>>) -> Response {
    let mut guard = session.lock().unwrap();
    if guard.running() {
        guard.pty_mut().send_signal(libc::SIGTERM);
    }
    guard.request_shutdown();
    Response::ok(json!({"message": "Shutting down"}))
}

fn handle_kill(session: &Arc<Mutex<SessionState>>, data: KillPayload) -> Response {
    let sig_str = data.signal.unwrap_or_else(|| "TERM".to_string());
    match signal::resolve(&sig_str) {
        Ok(sig) => {
            let mut guard = session.lock().unwrap();
            guard.pty_mut().send_signal(sig);
            Response::ok(json!({"message": format!("Signal {sig_str} sent")}))
        }
        Err(e) => Response::err(e.to_string()),
    }
}

fn handle_resize(session: &Arc<Mutex<SessionState>>, data: ResizePayload) -> Response {
    let mut guard = session.lock().unwrap();
    match guard.resize(data.cols, data.rows) {
        Ok(()) => Response::ok(json!({"message": format!("Resized to {}x{}", data.cols, data.rows)})),
        Err(e) => Response::err(e.to_string()),
    }
}

fn handle_debug(session: &Arc<Mutex<SessionState>>, data: Option<DebugPayload>) -> Response {
    let clear = data.and_then(|d| d.clear).unwrap_or(false);
    let mut guard = session.lock().unwrap();
    let (entries, dropped) = guard.screen_mut().debug_drain(clear);
    let unhandled: Vec<_> = entries
        .into_iter()
        .map(|e| json!({"sequence": e.sequence, "raw_hex": e.raw_hex}))
        .collect();
    Response::ok(json!({"unhandled": unhandled, "dropped": dropped}))
}

/// The long-lived handler (spec.md §4.6.5). Polls at a ~50ms cadence
/// (well under the spec's "≤~100ms" bound) and probes the connection for
/// client disconnect on every tick by attempting a non-blocking read:
/// a `0`-byte read is EOF (client gone), any error other than a timeout
/// also means we give up rather than hold the server hostage.
fn handle_wait(
    session: &Arc<Mutex<SessionState>>,
    data: Option<WaitPayload>,
    stream: &mut UnixStream,
) -> Response {
    let activity_mode = data.and_then(|d| d.activity).unwrap_or(false);
    if stream
        .set_read_timeout(Some(Duration::from_millis(50)))
        .is_err()
    {
        return Response::err("failed to configure wait polling");
    }
    let mut probe = [0u8; 1];
    loop {
        {
            let mut guard = session.lock().unwrap();
            if activity_mode {
                let active = guard.screen_mut().take_activity();
                let exited = !guard.running();
                if active || exited {
                    return Response::ok(json!({"activity": active, "exited": exited}));
                }
            } else if !guard.running() {
                return Response::ok(json!({"exit_code": guard.exit_code().unwrap()}));
            }
        }
        match stream.read(&mut probe) {
            Ok(0) => return Response::err("client disconnected during wait"),
            Ok(_) => {
                // Unexpected data on an otherwise write-only connection; ignore.
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(_) => return Response::err("client disconnected during wait"),
        }
    }
}
