use std::fmt;

/// Programmatic-API misuse the core can detect synchronously. Parse/decode
/// fallbacks and I/O failures never produce this — they are reported via
/// [`crate::event::CoreEvent`] and `tracing`, per the core's error-handling
/// policy: the hot path never returns a `Result` that would force a host to
/// unwind mid-frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A charset designation or a color index fell outside what the core
    /// models.
    InvalidCodeset(String),
    /// An operation that requires a live PTY was attempted after detach.
    DetachedPty,
    /// A bounded resource (chunk freelist, scrollback) could not grow to
    /// satisfy the request.
    ResourceExhausted(String),
    /// A resize or viewport request specified a non-positive dimension.
    InvalidSize { cols: u16, rows: u16 },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidCodeset(msg) => write!(f, "invalid codeset: {msg}"),
            CoreError::DetachedPty => write!(f, "operation requires an attached pty"),
            CoreError::ResourceExhausted(msg) => write!(f, "resource exhausted: {msg}"),
            CoreError::InvalidSize { cols, rows } => {
                write!(f, "invalid size: {cols}x{rows}")
            }
        }
    }
}

impl std::error::Error for CoreError {}
