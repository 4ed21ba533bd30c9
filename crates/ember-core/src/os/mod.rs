//! Cross-platform OS abstraction: files, stdout/stderr, threads, and a
//! per-task last-error slot.
//!
//! # Architecture
//!
//! - [`error`]: the `{success, invalid_argument, system_failure,
//!   not_supported}` result taxonomy and the thread-local last-error slot.
//! - [`file`]: open-for-read/open-for-write/read/write/write_all/close plus
//!   the shared stdout/stderr handles.
//! - [`thread`]: `thread_start`/`thread_join` wrappers over `std::thread`.

mod error;
mod file;
mod thread;

pub use error::{clear_last_error, last_error_message, OsError, OsResult};
pub use file::OsFile;
pub use thread::{OsThread, ThreadEntry};

/// Prints a decimal `i64` followed by a newline to standard output.
///
/// A minimal debug-output primitive; full I/O belongs to the Language's
/// standard library, out of scope for this crate. This is also the symbol
/// name the compiled program links against, so it is exported as-is.
#[no_mangle]
pub extern "C" fn print_i64(value: i64) {
    let mut stdout = OsFile::stdout();
    let _ = stdout.write_all(format!("{value}\n").as_bytes());
}
