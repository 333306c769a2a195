//! One request/response round-trip over the control socket (spec.md §6).

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Connect to `socket`, send `request` as a single JSON line, and return the
/// parsed response line. One connection per request, matching the host's
/// "one request per connection" contract.
pub fn send_request(socket: &Path, request: &Value) -> Result<Value> {
    let mut stream = UnixStream::connect(socket)
        .with_context(|| format!("failed to connect to {}", socket.display()))?;

    let mut line = serde_json::to_string(request).context("failed to encode request")?;
    line.push('\n');
    stream
        .write_all(line.as_bytes())
        .context("failed to send request")?;

    let mut response_line = String::new();
    BufReader::new(&mut stream)
        .read_line(&mut response_line)
        .context("failed to read response")?;
    if response_line.is_empty() {
        bail!("host closed connection without a response");
    }

    serde_json::from_str(response_line.trim_end()).context("malformed response from host")
}

/// Unwrap a `{"status":"ok","data":...}` / `{"status":"error","error":...}`
/// envelope into the `data` payload, or an `Err` carrying the host's message.
pub fn unwrap_ok(response: Value) -> Result<Value> {
    match response.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(response.get("data").cloned().unwrap_or(Value::Null)),
        Some("error") => {
            let message = response
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            bail!("{message}")
        }
        _ => bail!("malformed response envelope: {response}"),
    }
}
