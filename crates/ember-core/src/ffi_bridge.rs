//! FFI borrow/transfer helpers, span &lt;-&gt; string conversion, and the
//! relaxed-atomic call-accounting metrics described in `SPEC_FULL.md` §4.7.

use crate::boxing::StringBox;
use crate::refcount::{release, retain};
use std::sync::atomic::{AtomicU64, Ordering};

/// A `{data, length}` view used for byte/element spans across the FFI
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Span {
    /// Pointer to the first element, or null.
    pub data: *const u8,
    /// Element count; forced to `0` when `data` is null.
    pub length: usize,
}

/// Outcome a caller reports through [`record_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// The FFI call completed successfully.
    Ok,
    /// The FFI call failed.
    Fail,
}

static TOTAL_CALLS: AtomicU64 = AtomicU64::new(0);
static SUCCESS_CALLS: AtomicU64 = AtomicU64::new(0);
static BORROWED_RESULTS: AtomicU64 = AtomicU64::new(0);
static TRANSFERRED_RESULTS: AtomicU64 = AtomicU64::new(0);
static NULL_RESULTS: AtomicU64 = AtomicU64::new(0);

/// A point-in-time snapshot of the five call-accounting counters.
///
/// Counters are read independently with relaxed loads, so the snapshot may
/// be slightly inconsistent across fields (never torn within one field),
/// matching `SPEC_FULL.md` §5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    /// Total calls recorded via [`record_status`].
    pub total_calls: u64,
    /// Calls recorded as [`CallStatus::Ok`].
    pub success_calls: u64,
    /// Non-null results reported through [`ffi_acquire_borrowed_result`].
    pub borrowed_results: u64,
    /// Non-null results reported through [`ffi_acquire_transferred_result`].
    pub transferred_results: u64,
    /// Null results reported through either `acquire_*_result` helper.
    pub null_results: u64,
}

/// Retains `v` and returns it unchanged; the callee must not release it.
/// Null passes through.
///
/// Exported as `ffi_acquire_borrowed`: `acquire_borrowed` alone would
/// collide with no symbol in this crate, but every bridge helper is
/// exported under an `ffi_`-prefixed name for a consistent C-visible
/// surface (`SPEC_FULL.md` §6, `ffi_*`).
///
/// # Safety
///
/// `v` must be null or a valid, unfreed payload pointer.
#[no_mangle]
pub unsafe extern "C" fn ffi_acquire_borrowed(v: *mut u8) -> *mut u8 {
    if !v.is_null() {
        retain(v);
    }
    v
}

/// Placeholder pass-through for a value whose ownership is transferred
/// across the call; a hook point for future auditing.
#[no_mangle]
pub extern "C" fn ffi_acquire_transferred(v: *mut u8) -> *mut u8 {
    v
}

/// Releases a previously transferred value. Must not be used on a value
/// that was only borrowed. Null passes through.
///
/// # Safety
///
/// `v` must be null or a valid, unfreed payload pointer the caller owns.
#[no_mangle]
pub unsafe extern "C" fn ffi_release_transferred(v: *mut u8) {
    if !v.is_null() {
        release(v);
    }
}

/// Builds a `{data, length}` span, forcing `length` to `0` when `data` is
/// null.
#[no_mangle]
pub extern "C" fn ffi_make_span(data: *const u8, length: usize) -> Span {
    Span {
        data,
        length: if data.is_null() { 0 } else { length },
    }
}

/// Packages a string box's view as a span. A null data pointer yields an
/// empty span.
///
/// Named `ffi_box_string` (rather than `box_string`) to avoid colliding
/// with [`crate::boxing::box_string`], which allocates a heap object
/// rather than building a borrowed span.
#[no_mangle]
pub extern "C" fn ffi_box_string(s: StringBox) -> Span {
    if s.data.is_null() {
        return ffi_make_span(std::ptr::null(), 0);
    }
    ffi_make_span(s.data, s.length.max(0) as usize)
}

/// Rebuilds a string view from a span, clamping an oversized length to
/// `i64::MAX`. A null span data pointer yields an empty string view.
#[no_mangle]
pub extern "C" fn ffi_unbox_span(span: Span) -> StringBox {
    if span.data.is_null() {
        return StringBox {
            data: std::ptr::null(),
            length: 0,
        };
    }
    StringBox {
        data: span.data,
        length: span.length.min(i64::MAX as usize) as i64,
    }
}

/// Records a borrowed result: increments `null_results` for a null value,
/// otherwise `borrowed_results`, and returns `value` unchanged.
#[no_mangle]
pub extern "C" fn ffi_acquire_borrowed_result(value: *mut u8) -> *mut u8 {
    if value.is_null() {
        NULL_RESULTS.fetch_add(1, Ordering::Relaxed);
    } else {
        BORROWED_RESULTS.fetch_add(1, Ordering::Relaxed);
    }
    value
}

/// Records a transferred result: increments `null_results` for a null
/// value, otherwise `transferred_results`, and returns `value` unchanged.
#[no_mangle]
pub extern "C" fn ffi_acquire_transferred_result(value: *mut u8) -> *mut u8 {
    if value.is_null() {
        NULL_RESULTS.fetch_add(1, Ordering::Relaxed);
    } else {
        TRANSFERRED_RESULTS.fetch_add(1, Ordering::Relaxed);
    }
    value
}

/// Records the outcome of one FFI call: always increments `total_calls`,
/// and `success_calls` when `status` is [`CallStatus::Ok`].
pub fn record_status(status: CallStatus) {
    TOTAL_CALLS.fetch_add(1, Ordering::Relaxed);
    if status == CallStatus::Ok {
        SUCCESS_CALLS.fetch_add(1, Ordering::Relaxed);
    }
}

/// `record_status` exposed at a C-callable boundary: `ok != 0` reports
/// [`CallStatus::Ok`], anything else reports [`CallStatus::Fail`].
#[no_mangle]
pub extern "C" fn ffi_record_status(ok: i32) {
    record_status(if ok != 0 { CallStatus::Ok } else { CallStatus::Fail });
}

/// Resets every counter to zero.
#[no_mangle]
pub extern "C" fn reset_metrics() {
    TOTAL_CALLS.store(0, Ordering::Relaxed);
    SUCCESS_CALLS.store(0, Ordering::Relaxed);
    BORROWED_RESULTS.store(0, Ordering::Relaxed);
    TRANSFERRED_RESULTS.store(0, Ordering::Relaxed);
    NULL_RESULTS.store(0, Ordering::Relaxed);
}

/// Returns a snapshot of every counter.
pub fn metrics() -> Metrics {
    Metrics {
        total_calls: TOTAL_CALLS.load(Ordering::Relaxed),
        success_calls: SUCCESS_CALLS.load(Ordering::Relaxed),
        borrowed_results: BORROWED_RESULTS.load(Ordering::Relaxed),
        transferred_results: TRANSFERRED_RESULTS.load(Ordering::Relaxed),
        null_results: NULL_RESULTS.load(Ordering::Relaxed),
    }
}

/// Returns `success_calls / total_calls`, or `1.0` when no calls have been
/// recorded.
///
/// Exported under the exact name `SPEC_FULL.md` §8's testable properties
/// use: `ffi_bridge_pass_rate()`.
#[no_mangle]
pub extern "C" fn ffi_bridge_pass_rate() -> f64 {
    let total = TOTAL_CALLS.load(Ordering::Relaxed);
    if total == 0 {
        return 1.0;
    }
    SUCCESS_CALLS.load(Ordering::Relaxed) as f64 / total as f64
}

/// Convenience alias kept for callers that prefer the shorter Rust-side
/// name; identical to [`ffi_bridge_pass_rate`].
pub fn pass_rate() -> f64 {
    ffi_bridge_pass_rate()
}
