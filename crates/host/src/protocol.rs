//! Control protocol wire types (spec.md §4.6, §6).
//!
//! Newline-delimited JSON, one request/response pair per connection —
//! grounded in the teacher's `crates/compositor/src/ipc.rs` `IpcMessage`
//! (`#[serde(tag = "type")]`) and in
//! `other_examples/...claudatui__src-daemon-protocol.rs`'s `Request`/
//! `Response` enums for the response envelope shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "OUTPUT")]
    Output { format: Option<String> },
    #[serde(rename = "INPUT")]
    Input { data: InputPayload },
    #[serde(rename = "STATUS")]
    Status { activity: Option<bool> },
    #[serde(rename = "STOP")]
    Stop {},
    #[serde(rename = "WAIT")]
    Wait { data: Option<WaitPayload> },
    #[serde(rename = "KILL")]
    Kill { data: KillPayload },
    #[serde(rename = "RESIZE")]
    Resize { data: ResizePayload },
    #[serde(rename = "DEBUG")]
    Debug { data: Option<DebugPayload> },
}

#[derive(Debug, Deserialize)]
pub struct InputPayload {
    pub data: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct WaitPayload {
    pub activity: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct KillPayload {
    pub signal: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResizePayload {
    pub cols: u16,
    pub rows: u16,
}

#[derive(Debug, Deserialize, Default)]
pub struct DebugPayload {
    pub clear: Option<bool>,
}

/// `{status: "ok"|"error", data|error}` (spec.md §6).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ok { status: &'static str, data: serde_json::Value },
    Err { status: &'static str, error: String },
}

impl Response {
    pub fn ok(data: serde_json::Value) -> Self {
        Response::Ok { status: "ok", data }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Response::Err {
            status: "error",
            error: message.into(),
        }
    }

    pub fn to_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"status":"error","error":"failed to serialize response: {e}"}}"#)
        });
        line.push('\n');
        line
    }
}
