//! Master/slave PTY pair management: allocation, resize, and the
//! read/write/nonblocking-flip contract the I/O loop drives.

use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::pty::{openpty, Winsize};

use crate::error::PtyError;

nix::ioctl_write_ptr_bad!(tiocswinsz, nix::libc::TIOCSWINSZ, Winsize);
nix::ioctl_read_bad!(tiocgwinsz, nix::libc::TIOCGWINSZ, Winsize);

/// A PTY master/slave pair. The master is kept in **blocking** mode until
/// [`Pty::attach`] is called, matching the upstream PTY allocator this is
/// modeled on: the descriptor is deliberately opened blocking (its own
/// comment calls this out as surprising), and only the component that is
/// about to drive it through a [`crate::Scheduler`] flips it nonblocking.
pub struct Pty {
    master: OwnedFd,
    slave: Option<OwnedFd>,
}

impl Pty {
    /// Allocate a new PTY pair sized to `cols`x`rows`.
    pub fn open(cols: u16, rows: u16) -> Result<Self, PtyError> {
        if cols == 0 || rows == 0 {
            return Err(PtyError::InvalidSize { cols, rows });
        }
        let winsize = Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        let result = openpty(&winsize, None).map_err(PtyError::OpenFailed)?;
        Ok(Pty { master: result.master, slave: Some(result.slave) })
    }

    #[must_use]
    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    /// Spawn `program` with the slave side wired to its stdio, consuming the
    /// slave descriptor (a PTY has exactly one slave-side consumer).
    pub fn spawn(&mut self, program: &str, args: &[String]) -> std::io::Result<Child> {
        let slave = self.slave.take().expect("spawn called more than once on the same Pty");
        let slave_fd = slave.as_raw_fd();
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::from(dup_owned(slave_fd)?))
            .stdout(Stdio::from(dup_owned(slave_fd)?))
            .stderr(Stdio::from(dup_owned(slave_fd)?));
        unsafe {
            command.pre_exec(move || {
                nix::unistd::setsid().map_err(std::io::Error::from)?;
                let ok = nix::libc::ioctl(slave_fd, nix::libc::TIOCSCTTY as _, 0);
                if ok != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
        command.spawn()
    }

    /// Flip the master descriptor to nonblocking. The I/O loop calls this
    /// once it has registered the descriptor with a [`crate::Scheduler`].
    pub fn attach(&mut self) -> Result<(), PtyError> {
        set_nonblocking(self.master.as_raw_fd(), true)
    }

    pub fn set_size(&mut self, cols: u16, rows: u16) -> Result<(), PtyError> {
        if cols == 0 || rows == 0 {
            tracing::warn!(cols, rows, "ignoring invalid pty resize request");
            return Ok(());
        }
        let winsize = Winsize { ws_row: rows, ws_col: cols, ws_xpixel: 0, ws_ypixel: 0 };
        unsafe { tiocswinsz(self.master.as_raw_fd(), &winsize) }
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!(error = %e, "ioctl(TIOCSWINSZ) failed, keeping previous size");
                PtyError::SetSizeFailed(e)
            })
    }

    pub fn get_size(&self) -> Result<(u16, u16), PtyError> {
        let mut winsize = Winsize { ws_row: 0, ws_col: 0, ws_xpixel: 0, ws_ypixel: 0 };
        unsafe { tiocgwinsz(self.master.as_raw_fd(), &mut winsize) }
            .map_err(PtyError::GetSizeFailed)?;
        Ok((winsize.ws_col, winsize.ws_row))
    }

    pub fn read(&self, buf: &mut [u8]) -> nix::Result<usize> {
        nix::unistd::read(self.master.as_raw_fd(), buf)
    }

    pub fn write(&self, buf: &[u8]) -> nix::Result<usize> {
        nix::unistd::write(&self.master, buf)
    }
}

fn dup_owned(fd: RawFd) -> std::io::Result<OwnedFd> {
    nix::unistd::dup(fd)
        .map(|raw| unsafe { OwnedFd::from_raw_fd(raw) })
        .map_err(std::io::Error::from)
}

fn set_nonblocking(fd: RawFd, on: bool) -> Result<(), PtyError> {
    let current =
        OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL).map_err(PtyError::SetNonBlockingFailed)?);
    let desired = if on { current | OFlag::O_NONBLOCK } else { current & !OFlag::O_NONBLOCK };
    fcntl(fd, FcntlArg::F_SETFL(desired)).map_err(PtyError::SetNonBlockingFailed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_zero_size() {
        assert!(matches!(Pty::open(0, 24), Err(PtyError::InvalidSize { .. })));
    }

    #[test]
    fn master_opens_blocking_until_attached() {
        let pty = Pty::open(80, 24).expect("pty allocation should succeed in a test sandbox");
        let flags = fcntl(pty.master_fd(), FcntlArg::F_GETFL).expect("fcntl");
        assert!(!OFlag::from_bits_truncate(flags).contains(OFlag::O_NONBLOCK));
    }

    #[test]
    fn attach_flips_to_nonblocking() {
        let mut pty = Pty::open(80, 24).expect("pty allocation should succeed in a test sandbox");
        pty.attach().expect("attach");
        let flags = fcntl(pty.master_fd(), FcntlArg::F_GETFL).expect("fcntl");
        assert!(OFlag::from_bits_truncate(flags).contains(OFlag::O_NONBLOCK));
    }

    #[test]
    fn resize_round_trips() {
        let mut pty = Pty::open(80, 24).expect("pty allocation should succeed in a test sandbox");
        pty.set_size(100, 40).expect("set_size");
        assert_eq!(pty.get_size().expect("get_size"), (100, 40));
    }

    #[test]
    fn write_then_read_echoes_through_slave() {
        let pty = Pty::open(80, 24).expect("pty allocation should succeed in a test sandbox");
        // Slave is still open (never spawned into a child); writing to the
        // master and reading back round-trips through the kernel line
        // discipline without needing a child process.
        pty.write(b"hi").expect("write");
        let mut buf = [0u8; 8];
        let n = pty.read(&mut buf).expect("read");
        assert_eq!(&buf[..n], b"hi");
    }
}
