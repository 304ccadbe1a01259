//! Signal handling and child-process bookkeeping for long-running scripts.
//!
//! Signal handlers only record what arrived; the main loop picks it up with
//! [`Daemon::poll_signal`] and decides what to do.
use std::{
    collections::BTreeSet,
    ffi::c_int,
    fs,
    io::{self, Write},
    path::Path,
    sync::atomic::{AtomicBool, AtomicI32, Ordering},
    thread,
};

use nix::{
    errno::Errno,
    sys::{
        signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal},
        wait::{WaitPidFlag, WaitStatus, waitpid},
    },
    unistd::Pid,
};
use tracing::{debug, info, warn};

use crate::{
    console::Console, constants::CHILD_POLL_INTERVAL, error::ConsoleError, metrics::format_bytes,
};

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);
static LAST_SIGNAL: AtomicI32 = AtomicI32::new(0);

extern "C" fn record_signal(signum: c_int) {
    LAST_SIGNAL.store(signum, Ordering::SeqCst);
    if signum == Signal::SIGTERM as c_int {
        STOP_REQUESTED.store(true, Ordering::SeqCst);
    }
}

/// Installs handlers for `SIGTERM` (requests a stop) and `SIGHUP` (recorded).
pub fn install_signal_handlers() -> Result<(), ConsoleError> {
    let action = SigAction::new(
        SigHandler::Handler(record_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for sig in [Signal::SIGTERM, Signal::SIGHUP] {
        // SAFETY: the handler only stores into atomics.
        unsafe { signal::sigaction(sig, &action) }?;
        debug!("Installed handler for {}", sig.as_str());
    }
    Ok(())
}

/// Whether a `SIGTERM` has been received since startup.
pub fn stop_requested() -> bool {
    STOP_REQUESTED.load(Ordering::SeqCst)
}

/// Writes the current process id into `pid_file`.
pub fn write_pid_file(pid_file: &Path) -> Result<(), ConsoleError> {
    let pid_error = |source| ConsoleError::PidFile {
        path: pid_file.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(pid_file).map_err(pid_error)?;
    writeln!(file, "{}", std::process::id()).map_err(pid_error)?;
    Ok(())
}

/// Checks whether the process recorded in `pid_file` is still alive.
///
/// A pid file pointing at a dead process (or holding garbage) is removed.
pub fn is_daemon_active(pid_file: &Path) -> Result<bool, ConsoleError> {
    let pid_error = |source| ConsoleError::PidFile {
        path: pid_file.to_path_buf(),
        source,
    };

    let content = match fs::read_to_string(pid_file) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(pid_error(err)),
    };

    let alive = match content.trim().parse::<i32>() {
        Ok(pid) if pid > 0 => match signal::kill(Pid::from_raw(pid), None) {
            Ok(()) | Err(Errno::EPERM) => true,
            Err(Errno::ESRCH) => false,
            Err(err) => return Err(err.into()),
        },
        _ => {
            warn!("Ignoring malformed pid file {}", pid_file.display());
            false
        }
    };

    if !alive {
        debug!("Removing stale pid file {}", pid_file.display());
        fs::remove_file(pid_file).map_err(pid_error)?;
    }
    Ok(alive)
}

/// Children forked by a daemon script, waited on before exit.
#[derive(Debug, Default)]
pub struct Daemon {
    children: BTreeSet<i32>,
}

impl Daemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_child(&mut self, pid: u32) {
        self.children.insert(pid as i32);
    }

    pub fn children(&self) -> impl Iterator<Item = u32> + '_ {
        self.children.iter().map(|pid| *pid as u32)
    }

    /// Reports the last signal received, if any, on `console`.
    pub fn poll_signal<W: Write>(
        &self,
        console: &mut Console<W>,
    ) -> Result<Option<Signal>, ConsoleError> {
        let signum = LAST_SIGNAL.swap(0, Ordering::SeqCst);
        if signum == 0 {
            return Ok(None);
        }
        let sig = Signal::try_from(signum)?;
        info!("Caught signal {}", sig.as_str());

        let put_to_log = console.log_file().is_some();
        console.drop_text(
            &format!("Caught signal {} ({signum})", sig.as_str()),
            None,
            put_to_log,
        )?;
        if sig == Signal::SIGTERM {
            console.drop_text("Setting exit flag.", None, false)?;
        }
        Ok(Some(sig))
    }

    /// Reaps every tracked child, polling until none is left.
    fn reap_children(&mut self) -> Result<(), ConsoleError> {
        while !self.children.is_empty() {
            let pending: Vec<i32> = self.children.iter().copied().collect();
            for pid in pending {
                match waitpid(Pid::from_raw(pid), Some(WaitPidFlag::WNOHANG)) {
                    Ok(WaitStatus::StillAlive) => {}
                    Ok(status) => {
                        debug!("Child {pid} finished: {status:?}");
                        self.children.remove(&pid);
                    }
                    Err(Errno::ECHILD) => {
                        self.children.remove(&pid);
                    }
                    Err(Errno::EINTR) => {}
                    Err(err) => return Err(err.into()),
                }
            }
            if !self.children.is_empty() {
                thread::sleep(CHILD_POLL_INTERVAL);
            }
        }
        Ok(())
    }

    /// Waits for all children, then reports completion and peak memory.
    pub fn graceful_exit<W: Write>(&mut self, console: &mut Console<W>) -> Result<(), ConsoleError> {
        let pid = std::process::id();
        console.drop_text(&format!("{pid}: Waiting for child processes"), None, false)?;
        self.reap_children()?;
        console.drop_text(&format!("{pid}: Script finished"), None, false)?;
        let peak = format_bytes(console.memory_usage().peak);
        console.drop_text(&format!("Peak memory usage: {peak}"), None, false)?;
        Ok(())
    }
}
