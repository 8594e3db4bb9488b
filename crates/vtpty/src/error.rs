use std::fmt;

/// Errors a PTY operation can raise. Transient read/write failures are not
/// represented here — the I/O loop classifies those itself (see
/// `vtterm::error`) and retries or surfaces them as events rather than
/// propagating a `Result` out of the hot path.
#[derive(Debug)]
pub enum PtyError {
    OpenFailed(nix::Error),
    GrantFailed(nix::Error),
    UnlockFailed(nix::Error),
    SlaveNameFailed(nix::Error),
    SetSizeFailed(nix::Error),
    GetSizeFailed(nix::Error),
    SetNonBlockingFailed(nix::Error),
    InvalidSize { cols: u16, rows: u16 },
}

impl fmt::Display for PtyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PtyError::OpenFailed(e) => write!(f, "failed to open pty master: {e}"),
            PtyError::GrantFailed(e) => write!(f, "grantpt failed: {e}"),
            PtyError::UnlockFailed(e) => write!(f, "unlockpt failed: {e}"),
            PtyError::SlaveNameFailed(e) => write!(f, "ptsname failed: {e}"),
            PtyError::SetSizeFailed(e) => write!(f, "ioctl(TIOCSWINSZ) failed: {e}"),
            PtyError::GetSizeFailed(e) => write!(f, "ioctl(TIOCGWINSZ) failed: {e}"),
            PtyError::SetNonBlockingFailed(e) => write!(f, "fcntl(F_SETFL) failed: {e}"),
            PtyError::InvalidSize { cols, rows } => {
                write!(f, "invalid pty size: {cols}x{rows}")
            }
        }
    }
}

impl std::error::Error for PtyError {}
