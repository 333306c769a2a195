use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error(transparent)]
    Pty(#[from] crate::pty::PtyError),

    #[error(transparent)]
    Signal(#[from] crate::signal::SignalError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed request: {0}")]
    Protocol(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl HostError {
    /// The string surfaced in a `{status:"error", error:<string>}` response
    /// (spec.md §7: handlers never crash the server, they report a string).
    pub fn as_response_message(&self) -> String {
        self.to_string()
    }
}
