//! The host-supplied cooperative scheduling surface. The core never owns an
//! event loop or a thread: it asks a `Scheduler` to notify it when a
//! watched descriptor becomes ready or a timeout elapses, and is driven
//! entirely by those callbacks.

use std::os::unix::io::RawFd;
use std::time::Duration;

/// An opaque handle to a registered watch or timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Four capabilities a host event loop must provide. Implementations are
/// free to be a thin wrapper over epoll/kqueue/an async runtime's reactor;
/// the core places no constraints on how readiness is actually observed.
pub trait Scheduler {
    /// Invoke `callback` the next time `fd` is readable. Returns a handle
    /// that can be passed to [`Scheduler::cancel`].
    fn watch_readable(&mut self, fd: RawFd, callback: Box<dyn FnMut() + 'static>) -> WatchId;

    /// Invoke `callback` the next time `fd` is writable.
    fn watch_writable(&mut self, fd: RawFd, callback: Box<dyn FnMut() + 'static>) -> WatchId;

    /// Invoke `callback` once after `delay`.
    fn timeout_once(&mut self, delay: Duration, callback: Box<dyn FnMut() + 'static>) -> WatchId;

    /// Invoke `callback` every `interval` until cancelled.
    fn timeout_repeating(&mut self, interval: Duration, callback: Box<dyn FnMut() + 'static>) -> WatchId;

    /// Cancel a previously registered watch or timer. Cancelling an id that
    /// already fired (for a one-shot timeout) is a no-op.
    fn cancel(&mut self, id: WatchId);
}
