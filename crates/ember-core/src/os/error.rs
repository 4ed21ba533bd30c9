//! OS-layer result taxonomy and the per-task last-error slot.

use std::cell::RefCell;

/// Result of an OS-layer operation.
pub type OsResult<T> = Result<T, OsError>;

/// The small, stable error taxonomy OS-layer operations report through.
///
/// Mirrors `reml_os_result_t` from the originating C header exactly
/// (`SUCCESS` is modeled as `Ok(_)` rather than a variant here, since Rust
/// has `Result` for that).
#[derive(Debug, Clone, thiserror::Error)]
pub enum OsError {
    /// A required argument was null, empty, or otherwise malformed.
    #[error("invalid argument")]
    InvalidArgument,
    /// The host system call failed; the underlying error is stashed in the
    /// thread-local last-error slot for retrieval via [`last_error_message`].
    #[error("system call failed")]
    SystemFailure,
    /// The operation is not implemented on this platform.
    #[error("operation not supported on this platform")]
    NotSupported,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Stashes a human-readable description of the most recent system failure
/// in the calling thread's last-error slot.
pub(crate) fn set_system_error(message: impl Into<String>) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message.into()));
}

/// Clears the calling thread's last-error slot.
pub fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Returns the calling thread's last captured system error message, if any.
pub fn last_error_message() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Renders the calling thread's last-error message into a caller-supplied
/// buffer, returning the number of bytes written (truncated to fit).
///
/// # Safety
///
/// `buffer` must point to at least `buffer_size` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn reml_os_last_error_message(buffer: *mut u8, buffer_size: usize) -> usize {
    if buffer.is_null() || buffer_size == 0 {
        return 0;
    }
    let message = last_error_message().unwrap_or_default();
    let bytes = message.as_bytes();
    let n = bytes.len().min(buffer_size);
    std::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer, n);
    n
}

/// `clear_last_error` exposed at the symbol name the compiled program links
/// against.
#[no_mangle]
pub extern "C" fn reml_os_clear_last_error() {
    clear_last_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear() {
        clear_last_error();
        assert!(last_error_message().is_none());
    }

    #[test]
    fn captures_and_clears() {
        set_system_error("disk on fire");
        assert_eq!(last_error_message().as_deref(), Some("disk on fire"));
        clear_last_error();
        assert!(last_error_message().is_none());
    }

    #[test]
    fn c_buffer_rendering_truncates() {
        clear_last_error();
        set_system_error("hello");
        let mut buf = [0u8; 3];
        let n = unsafe { reml_os_last_error_message(buf.as_mut_ptr(), buf.len()) };
        assert_eq!(n, 3);
        assert_eq!(&buf, b"hel");
        clear_last_error();
    }
}
