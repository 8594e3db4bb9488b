//! PTY allocation, resize, and the `Scheduler` abstraction the I/O loop is
//! driven through. No runtime is bundled; a host supplies the
//! implementation of [`Scheduler`].

pub mod error;
pub mod pty;
pub mod scheduler;

pub use error::PtyError;
pub use pty::Pty;
pub use scheduler::{Scheduler, WatchId};
