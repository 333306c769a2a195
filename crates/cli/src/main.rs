//! Command-line wrapper around the control protocol (spec.md §6). Thin by
//! design: argument parsing, one `UnixStream` round-trip per invocation
//! (`start` excepted — it *is* the host), and client-side cursor rendering.
//! Manual flag parsing, no argument-parsing crate, matching the teacher's
//! `crates/termstack/src/main.rs`.

mod client;
mod config;
mod escape;

use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde_json::json;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    match run(args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(args: Vec<String>) -> Result<()> {
    let mut rest = args.into_iter();
    rest.next();
    let command = rest.next().context("usage: ptyhost <command> [flags]")?;
    let rest: Vec<String> = rest.collect();

    match command.as_str() {
        "start" => cmd_start(&rest),
        "output" => cmd_output(&rest),
        "input" => cmd_input(&rest),
        "status" => cmd_status(&rest),
        "stop" => cmd_stop(&rest),
        "wait" => cmd_wait(&rest),
        "kill" => cmd_kill(&rest),
        "resize" => cmd_resize(&rest),
        "debug" => cmd_debug(&rest),
        other => bail!("unknown command '{other}'"),
    }
}

// --- tiny flag-parsing helpers -------------------------------------------

fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn required_socket(args: &[String]) -> Result<PathBuf> {
    flag_value(args, "--socket")
        .map(PathBuf::from)
        .context("missing required --socket PATH")
}

fn parse_size(s: &str) -> Result<(u16, u16)> {
    let (cols, rows) = s
        .split_once('x')
        .with_context(|| format!("invalid --size '{s}', expected COLSxROWS"))?;
    Ok((
        cols.parse().context("invalid column count in --size")?,
        rows.parse().context("invalid row count in --size")?,
    ))
}

// --- start ----------------------------------------------------------------

fn cmd_start(args: &[String]) -> Result<()> {
    let file_config = config::Config::load();

    let (cols, rows) = flag_value(args, "--size")
        .or(file_config.size)
        .map(|s| parse_size(&s))
        .transpose()?
        .unwrap_or((terminal::DEFAULT_COLS as u16, terminal::DEFAULT_ROWS as u16));

    let emulator = match flag_value(args, "--emulator").or(file_config.emulator).as_deref() {
        Some("custom") => host::EmulatorMode::Custom,
        Some("xterm") | None => host::EmulatorMode::Xterm,
        Some(other) => bail!("unknown --emulator '{other}', expected xterm|custom"),
    };

    let pty_dump = flag_value(args, "--pty-dump").map(PathBuf::from);
    let _no_daemon = has_flag(args, "--no-daemon"); // daemonizing is out of scope; always attached.

    let config = host::Config {
        cols,
        rows,
        emulator,
        debug_ring_capacity: terminal::DEBUG_RING_CAPACITY,
        pty_dump,
    };

    let (socket_path, auto_generated) = match flag_value(args, "--socket") {
        Some(s) => (PathBuf::from(s), false),
        None => (auto_socket_path()?, true),
    };

    let argv: Vec<String> = flag_and_value_stripped_argv(args);
    if argv.is_empty() {
        bail!("start requires a trailing argv, e.g. `ptyhost start -- /bin/sh`");
    }

    let listener = UnixListener::bind(&socket_path)
        .with_context(|| format!("failed to bind control socket at {}", socket_path.display()))?;

    let mut session = host::spawn_session(&argv, &config, socket_path.clone(), auto_generated)
        .context("failed to spawn session")?;
    let pid = session.pty_mut().pid();

    println!("Socket: {}", socket_path.display());
    println!("PID: {pid}");
    println!("Auto-generated: {auto_generated}");
    std::io::stdout().flush().ok();

    host::serve(session, listener);
    Ok(())
}

/// Strip recognized `start` flags (and their values) out of `args`, treating
/// everything else — including a leading bare `--` separator — as the
/// child's argv.
fn flag_and_value_stripped_argv(args: &[String]) -> Vec<String> {
    const VALUE_FLAGS: &[&str] = &["--socket", "--size", "--emulator", "--pty-dump"];
    const BOOL_FLAGS: &[&str] = &["--no-daemon"];

    let mut argv = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let a = &args[i];
        if a == "--" {
            i += 1;
            argv.extend_from_slice(&args[i..]);
            break;
        }
        if VALUE_FLAGS.contains(&a.as_str()) {
            i += 2;
            continue;
        }
        if BOOL_FLAGS.contains(&a.as_str()) {
            i += 1;
            continue;
        }
        argv.extend_from_slice(&args[i..]);
        break;
    }
    argv
}

fn auto_socket_path() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("ptyhost-{}", std::process::id()));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir.join("control.sock"))
}

// --- output -----------------------------------------------------------------

fn cmd_output(args: &[String]) -> Result<()> {
    let socket = required_socket(args)?;
    let format = if has_flag(args, "--no-color") {
        "ascii"
    } else {
        "ansi"
    };
    let cursor_mode = flag_value(args, "--cursor").unwrap_or_else(|| "none".to_string());

    let response = client::send_request(&socket, &json!({"type": "OUTPUT", "format": format}))?;
    let data = client::unwrap_ok(response)?;

    let screen = data
        .get("screen")
        .and_then(|v| v.as_str())
        .context("malformed OUTPUT response: missing screen")?;
    let row = data["cursor"]["row"].as_u64().unwrap_or(0) as usize;
    let col = data["cursor"]["col"].as_u64().unwrap_or(0) as usize;

    match cursor_mode.as_str() {
        "none" => println!("{screen}"),
        "print" => {
            println!("Cursor: row {}, col {}", row + 1, col + 1);
            println!("{screen}");
        }
        "inverse" => println!("{}", apply_cursor_inverse(screen, row, col)),
        "both" => {
            println!("Cursor: row {}, col {}", row + 1, col + 1);
            println!("{}", apply_cursor_inverse(screen, row, col));
        }
        other => bail!("unknown --cursor '{other}', expected none|print|inverse|both"),
    }
    Ok(())
}

/// Wrap the character under the cursor in SGR reverse-video, grounded in
/// the Python prototype's `apply_cursor_inverse`: a cursor row or column
/// past the screen's current content is a no-op, not padding.
fn apply_cursor_inverse(screen: &str, row: usize, col: usize) -> String {
    let lines: Vec<&str> = screen.split('\n').collect();
    if row >= lines.len() {
        return screen.to_string();
    }
    let rendered: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if idx != row {
                return line.to_string();
            }
            let chars: Vec<char> = line.chars().collect();
            if col >= chars.len() {
                return line.to_string();
            }
            let mut out = String::new();
            for (i, ch) in chars.iter().enumerate() {
                if i == col {
                    out.push_str("\u{1b}[7m");
                    out.push(*ch);
                    out.push_str("\u{1b}[27m");
                } else {
                    out.push(*ch);
                }
            }
            out
        })
        .collect();
    rendered.join("\n")
}

// --- input ------------------------------------------------------------------

fn cmd_input(args: &[String]) -> Result<()> {
    let socket = required_socket(args)?;

    let text = if has_flag(args, "--password") {
        let mut input = read_password()?;
        input.push('\r');
        input
    } else if let Some(raw) = flag_value(args, "--text") {
        escape::unescape(&raw)
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    };

    let response =
        client::send_request(&socket, &json!({"type": "INPUT", "data": {"data": text}}))?;
    client::unwrap_ok(response)?;
    Ok(())
}

fn read_password() -> Result<String> {
    use std::fs::OpenOptions;
    use std::os::unix::io::AsRawFd;

    let tty = OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")
        .context("failed to open /dev/tty for --password")?;
    let fd = tty.as_raw_fd();

    let mut term = unsafe { std::mem::zeroed::<libc::termios>() };
    if unsafe { libc::tcgetattr(fd, &mut term) } != 0 {
        bail!("tcgetattr failed reading terminal attributes");
    }
    let original = term;
    term.c_lflag &= !(libc::ECHO as libc::tcflag_t);
    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, &term);
    }

    let mut line = String::new();
    let result = std::io::stdin().read_line(&mut line);

    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, &original);
    }
    println!();

    result.context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

// --- status / stop / wait / kill / resize / debug ---------------------------

fn cmd_status(args: &[String]) -> Result<()> {
    let socket = required_socket(args)?;
    let quiet = has_flag(args, "--quiet");
    let response = client::send_request(
        &socket,
        &json!({"type": "STATUS", "activity": !quiet}),
    )?;
    let data = client::unwrap_ok(response)?;
    println!("{}", serde_json::to_string_pretty(&data)?);

    let running = data.get("running").and_then(|v| v.as_bool()).unwrap_or(false);
    if quiet && !running {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_stop(args: &[String]) -> Result<()> {
    let socket = required_socket(args)?;
    let response = client::send_request(&socket, &json!({"type": "STOP"}))?;
    client::unwrap_ok(response)?;
    Ok(())
}

fn cmd_wait(args: &[String]) -> Result<()> {
    let socket = required_socket(args)?;
    let quiet = has_flag(args, "--quiet");
    let response = client::send_request(
        &socket,
        &json!({"type": "WAIT", "data": {"activity": !quiet}}),
    )?;
    let data = client::unwrap_ok(response)?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn cmd_kill(args: &[String]) -> Result<()> {
    let socket = required_socket(args)?;
    let signal = flag_value(args, "--signal").unwrap_or_else(|| "TERM".to_string());
    let response =
        client::send_request(&socket, &json!({"type": "KILL", "data": {"signal": signal}}))?;
    client::unwrap_ok(response)?;
    Ok(())
}

fn cmd_resize(args: &[String]) -> Result<()> {
    let socket = required_socket(args)?;
    let size = flag_value(args, "--size").context("resize requires --size COLSxROWS")?;
    let (cols, rows) = parse_size(&size)?;
    let response = client::send_request(
        &socket,
        &json!({"type": "RESIZE", "data": {"cols": cols, "rows": rows}}),
    )?;
    client::unwrap_ok(response)?;
    Ok(())
}

fn cmd_debug(args: &[String]) -> Result<()> {
    let socket = required_socket(args)?;
    let clear = has_flag(args, "--clear");
    let response =
        client::send_request(&socket, &json!({"type": "DEBUG", "data": {"clear": clear}}))?;
    let data = client::unwrap_ok(response)?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
