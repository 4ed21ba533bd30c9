//! Compile-time platform detection.
//!
//! The originating C runtime expressed this as a handful of preprocessor
//! macros (`REML_PLATFORM_WINDOWS`/`POSIX`, `REML_COMPILER_MSVC`/`CLANG`/
//! `GCC`, `REML_NORETURN`, `REML_THREAD_LOCAL`). Rust has first-class
//! equivalents for every one of them, so this module is mostly a thin,
//! documented pointer to those equivalents rather than a macro shim:
//!
//! - `REML_PLATFORM_WINDOWS` / `REML_PLATFORM_POSIX` → `cfg(windows)` /
//!   `cfg(unix)`, used directly at call sites in [`crate::os`].
//! - `REML_NORETURN` → the `!` never type, used as the return type of
//!   [`crate::panic::panic_`] and [`crate::panic::panic_at`].
//! - `REML_THREAD_LOCAL` → `std::thread_local!`, used by the OS layer's
//!   per-task last-error slot.

/// Returns `true` when compiled for a Windows target.
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns `true` when compiled for a POSIX-family target (Linux, macOS,
/// BSD, ...).
pub const fn is_posix() -> bool {
    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_family_is_reported() {
        // On every target this crate ships for, the two families are
        // mutually exclusive.
        assert_ne!(is_windows(), is_posix());
    }
}
