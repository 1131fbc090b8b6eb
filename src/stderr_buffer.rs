//! Holds back warnings while the TUI owns the terminal, so they do not
//! scribble over the alternate screen. The TUI drains and prints them after
//! the terminal is restored.

use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Start buffering. Until `drain()` is called, `warn()` stores messages.
pub fn activate() {
    *lock() = Some(Vec::new());
}

/// Stop buffering and return everything collected, oldest first.
pub fn drain() -> Vec<String> {
    lock().take().unwrap_or_default()
}

#[cfg(test)]
fn is_active() -> bool {
    lock().is_some()
}

/// Store the message when buffering, otherwise print it to stderr.
pub fn warn(msg: String) {
    let mut guard = lock();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// `eprintln!` that goes through the buffer while the TUI is running.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}
