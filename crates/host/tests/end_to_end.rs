//! Literal end-to-end scenarios from spec.md §8, exercised against a real
//! PTY-spawned child and the request handlers directly (no socket plumbing
//! needed — `handlers::dispatch` takes the session lock the same way the
//! Control Server would).

use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use host::protocol::{DebugPayload, InputPayload, KillPayload, Request, WaitPayload};
use host::{handlers, Config, EmulatorMode};

fn skip_in_ci() -> bool {
    std::env::var("CI").is_ok()
}

fn spawn(argv: &[&str], cols: u16, rows: u16) -> Arc<Mutex<host::SessionState>> {
    let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
    let config = Config {
        cols,
        rows,
        emulator: EmulatorMode::Xterm,
        debug_ring_capacity: 10,
        pty_dump: None,
    };
    let session = host::spawn_session(&argv, &config, PathBuf::from("/tmp/unused.sock"), false)
        .expect("failed to spawn session");
    Arc::new(Mutex::new(session))
}

fn pump_until(session: &Arc<Mutex<host::SessionState>>, timeout: Duration, mut done: impl FnMut(&host::SessionState) -> bool) {
    let start = Instant::now();
    loop {
        {
            let mut guard = session.lock().unwrap();
            guard.pump();
            if done(&guard) {
                return;
            }
        }
        if start.elapsed() > timeout {
            panic!("timed out waiting for condition");
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn stream_pair() -> UnixStream {
    UnixStream::pair().unwrap().0
}

#[test]
fn spawn_and_greet() {
    if skip_in_ci() {
        return;
    }
    let session = spawn(&["printf", "hello\\n"], 80, 24);
    pump_until(&session, Duration::from_secs(2), |s| s.exit_code().is_some());

    let mut stream = stream_pair();
    let response = handlers::dispatch(Request::Output { format: None }, &session, &mut stream);
    let data = match response {
        host::protocol::Response::Ok { data, .. } => data,
        other => panic!("expected ok, got {other:?}"),
    };
    let screen = data["screen"].as_str().unwrap();
    let first_row: &str = screen.lines().next().unwrap();
    assert!(first_row.starts_with("hello"));
    assert_eq!(first_row.len(), 80);
    assert_eq!(data["cursor"]["row"].as_u64(), Some(1));
    assert_eq!(data["cursor"]["col"].as_u64(), Some(0));

    let response = handlers::dispatch(
        Request::Wait {
            data: Some(WaitPayload { activity: Some(false) }),
        },
        &session,
        &mut stream,
    );
    match response {
        host::protocol::Response::Ok { data, .. } => {
            assert_eq!(data["exit_code"].as_i64(), Some(0));
        }
        other => panic!("expected ok, got {other:?}"),
    }
}

#[test]
fn password_prompt() {
    if skip_in_ci() {
        return;
    }
    let session = spawn(&["sh", "-c", "stty -echo; read p; echo got:$p"], 80, 24);
    // Give the shell time to reach the read before writing the secret.
    std::thread::sleep(Duration::from_millis(200));

    let mut stream = stream_pair();
    let response = handlers::dispatch(
        Request::Input {
            data: InputPayload {
                data: "secret\r".to_string(),
            },
        },
        &session,
        &mut stream,
    );
    assert!(matches!(response, host::protocol::Response::Ok { .. }));

    pump_until(&session, Duration::from_secs(2), |s| s.exit_code().is_some());

    let response = handlers::dispatch(Request::Output { format: None }, &session, &mut stream);
    let data = match response {
        host::protocol::Response::Ok { data, .. } => data,
        other => panic!("expected ok, got {other:?}"),
    };
    assert!(data["screen"].as_str().unwrap().contains("got:secret"));
}

#[test]
fn kill_reports_128_plus_signal_via_status() {
    if skip_in_ci() {
        return;
    }
    let session = spawn(&["sleep", "10"], 80, 24);
    let mut stream = stream_pair();

    let response = handlers::dispatch(
        Request::Kill {
            data: KillPayload {
                signal: Some("TERM".to_string()),
            },
        },
        &session,
        &mut stream,
    );
    assert!(matches!(response, host::protocol::Response::Ok { .. }));

    pump_until(&session, Duration::from_secs(2), |s| s.exit_code().is_some());
    let response = handlers::dispatch(
        Request::Wait {
            data: Some(WaitPayload { activity: Some(false) }),
        },
        &session,
        &mut stream,
    );
    match response {
        host::protocol::Response::Ok { data, .. } => {
            assert_eq!(data["exit_code"].as_i64(), Some(128 + libc::SIGTERM as i64));
        }
        other => panic!("expected ok, got {other:?}"),
    }
}

#[test]
fn debug_capture_private_mode_toggle() {
    if skip_in_ci() {
        return;
    }
    let session = spawn(&["cat"], 80, 24);
    {
        let mut guard = session.lock().unwrap();
        guard.screen_mut().feed(b"\x1b[?25l\x1b[?25h");
    }

    let mut stream = stream_pair();
    let response = handlers::dispatch(
        Request::Debug {
            data: Some(DebugPayload { clear: Some(true) }),
        },
        &session,
        &mut stream,
    );
    let data = match response {
        host::protocol::Response::Ok { data, .. } => data,
        other => panic!("expected ok, got {other:?}"),
    };
    let unhandled = data["unhandled"].as_array().unwrap();
    assert_eq!(unhandled.len(), 2);
    assert_eq!(unhandled[0]["sequence"].as_str(), Some("\\e[?25l"));
    assert_eq!(unhandled[1]["sequence"].as_str(), Some("\\e[?25h"));

    let response = handlers::dispatch(Request::Debug { data: None }, &session, &mut stream);
    match response {
        host::protocol::Response::Ok { data, .. } => {
            assert_eq!(data["unhandled"].as_array().unwrap().len(), 0);
            assert_eq!(data["dropped"].as_i64(), Some(0));
        }
        other => panic!("expected ok, got {other:?}"),
    }

    handlers::dispatch(
        Request::Kill {
            data: KillPayload { signal: Some("KILL".to_string()) },
        },
        &session,
        &mut stream,
    );
}
