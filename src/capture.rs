//! Scoped output capture.
//!
//! [`OutputCapture`] points the process's standard output (file descriptor 1)
//! at the null device for as long as the guard lives, and puts the original
//! descriptor back when it is dropped, including during unwinding.
//!
//! The redirection is process-wide. The outermost hiding scope of a thread
//! holds a global lock so that two threads never interleave their
//! save/restore pairs; nested scopes on the same thread simply stack.
//!
//! Only unix targets redirect. Elsewhere [`OutputCapture::begin`] logs a
//! warning and the guard is a passthrough.

use std::cell::Cell;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(unix)]
const NULL_DEVICE: &str = "/dev/null";

static CAPTURE_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    static NESTING: Cell<usize> = const { Cell::new(0) };
}

/// Guard returned by [`OutputCapture::begin`].
#[must_use = "output is restored as soon as the guard is dropped"]
pub struct OutputCapture {
    saved: Option<SavedStdout>,
    _lock: Option<MutexGuard<'static, ()>>,
}

impl OutputCapture {
    /// Starts a capture scope. With `hide == false` this is a passthrough.
    pub fn begin(hide: bool) -> Self {
        if !hide {
            return Self {
                saved: None,
                _lock: None,
            };
        }

        let lock = if NESTING.with(Cell::get) == 0 {
            Some(CAPTURE_LOCK.lock().unwrap_or_else(PoisonError::into_inner))
        } else {
            None
        };

        match SavedStdout::redirect() {
            Ok(saved) => {
                NESTING.with(|n| n.set(n.get() + 1));
                Self {
                    saved: Some(saved),
                    _lock: lock,
                }
            }
            Err(err) => {
                tracing::warn!(%err, "could not redirect stdout, output will not be hidden");
                Self {
                    saved: None,
                    _lock: lock,
                }
            }
        }
    }

    /// True while standard output is actually redirected by this guard.
    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            saved.restore();
            NESTING.with(|n| n.set(n.get() - 1));
        }
    }
}

// =============================================================================
// PLATFORM
// =============================================================================

#[cfg(unix)]
struct SavedStdout(libc::c_int);

#[cfg(unix)]
impl SavedStdout {
    fn redirect() -> io::Result<Self> {
        use std::fs::OpenOptions;
        use std::os::fd::AsRawFd;

        // Anything buffered so far belongs to the real stdout.
        let _ = io::stdout().flush();
        let sink = OpenOptions::new().write(true).open(NULL_DEVICE)?;

        let saved = unsafe { libc::dup(libc::STDOUT_FILENO) };
        if saved < 0 {
            return Err(io::Error::last_os_error());
        }
        if unsafe { libc::dup2(sink.as_raw_fd(), libc::STDOUT_FILENO) } < 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(saved) };
            return Err(err);
        }
        Ok(Self(saved))
    }

    fn restore(self) {
        let _ = io::stdout().flush();
        unsafe {
            libc::dup2(self.0, libc::STDOUT_FILENO);
            libc::close(self.0);
        }
    }
}

#[cfg(not(unix))]
struct SavedStdout;

#[cfg(not(unix))]
impl SavedStdout {
    fn redirect() -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "stdout redirection is only implemented for unix targets",
        ))
    }

    fn restore(self) {}
}
