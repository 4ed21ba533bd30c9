//! Embedding ABI for the Ember runtime.
//!
//! A thin `#[no_mangle] extern "C"` surface on top of `ember-core`, letting
//! a host process create a context, load a module, invoke a named
//! entrypoint, and tear the context down — the `reml_create_context` /
//! `reml_load_module` / `reml_run` / `reml_dispose_context` / `reml_last_error`
//! quintet described in `SPEC_FULL.md` §4.11 and §6.
//!
//! Module loading, parsing, and execution are black-boxed collaborators
//! this crate forwards to (`SPEC_FULL.md` §1): `load_module` validates
//! shape and records the bytes as staged, and `run` checks that a module
//! has been staged, without parsing or executing Language source itself.
//! The two contracts this crate *does* own are the ABI-version gate and
//! releasing every context-owned heap object on disposal.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod context;
mod error;

pub use context::EmberContext;
pub use error::{EmbedError, EmbedStatus};

use once_cell::sync::Lazy;
use std::ffi::{c_char, CStr};
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

/// The ABI version this runtime build implements. `create_context` rejects
/// any caller-declared version that does not equal this string exactly
/// (`SPEC_FULL.md` §9: "treat the ABI-version string as opaque and compare
/// by equality").
pub const ABI_VERSION: &str = "0.1.0";

/// Name of the environment variable that forces `create_context` to return
/// `unsupported_target`, preserved verbatim from the originating C
/// implementation's test hook.
pub const FORCE_UNSUPPORTED_ENV: &str = "REML_EMBED_FORCE_UNSUPPORTED";

static NEXT_CONTEXT_ID: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

fn force_unsupported() -> bool {
    std::env::var_os(FORCE_UNSUPPORTED_ENV).is_some_and(|v| !v.is_empty())
}

/// Creates a context after validating `abi_version` against
/// [`ABI_VERSION`]. On success, `*out_context` receives an owned handle the
/// caller must later pass to [`dispose_context`].
fn create_context_impl(abi_version: &str) -> Result<Box<EmberContext>, EmbedError> {
    if force_unsupported() {
        return Err(EmbedError::UnsupportedTarget(FORCE_UNSUPPORTED_ENV));
    }
    if abi_version != ABI_VERSION {
        return Err(EmbedError::AbiMismatch {
            requested: abi_version.to_string(),
            runtime: ABI_VERSION,
        });
    }
    let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
    #[cfg(debug_assertions)]
    eprintln!("[DEBUG] create_context: context {id} created (abi {abi_version})");
    let _ = id;
    Ok(EmberContext::new())
}

fn load_module_impl(ctx: &EmberContext, source: &[u8]) -> Result<(), EmbedError> {
    if source.is_empty() {
        return Err(EmbedError::InvalidArgument("module source is empty"));
    }
    ctx.record_module(source.to_vec());
    Ok(())
}

fn run_impl(ctx: &EmberContext, entrypoint: &str) -> Result<(), EmbedError> {
    if entrypoint.is_empty() {
        return Err(EmbedError::InvalidArgument("entrypoint name is empty"));
    }
    if !ctx.has_module() {
        return Err(EmbedError::NoModuleLoaded);
    }
    // Actual bytecode execution lives behind the black-boxed compiler/
    // engine collaborator (`SPEC_FULL.md` §1); this crate's contract ends
    // at confirming a module is staged for the requested entrypoint.
    Ok(())
}

fn status_of<T>(result: &Result<T, EmbedError>) -> EmbedStatus {
    match result {
        Ok(_) => EmbedStatus::Ok,
        Err(e) => e.status(),
    }
}

/// Validates `abi_version` and, on success, writes a fresh context handle
/// into `*out_context`.
///
/// # Safety
///
/// - `abi_version` must be a valid, null-terminated UTF-8 C string.
/// - `out_context` must be a valid, non-null pointer to a writable
///   `*mut EmberContext` slot.
/// - On any non-`Ok` status, `*out_context` is left unchanged (not
///   written to null).
///
/// # Example (C)
/// ```c
/// reml_embed_context_t* ctx = NULL;
/// if (reml_create_context("0.1.0", &ctx) != 0) { /* handle error */ }
/// ```
#[no_mangle]
pub unsafe extern "C" fn reml_create_context(
    abi_version: *const c_char,
    out_context: *mut *mut EmberContext,
) -> EmbedStatus {
    if abi_version.is_null() || out_context.is_null() {
        return EmbedStatus::InvalidArgument;
    }
    let version = match CStr::from_ptr(abi_version).to_str() {
        Ok(s) => s,
        Err(_) => return EmbedStatus::InvalidArgument,
    };

    match create_context_impl(version) {
        Ok(ctx) => {
            *out_context = Box::into_raw(ctx);
            EmbedStatus::Ok
        }
        Err(e) => {
            let status = e.status();
            #[cfg(debug_assertions)]
            eprintln!("[DEBUG] create_context failed: {e}");
            status
        }
    }
}

/// Accepts `length` bytes of raw module data and stages them as a loaded
/// module on `context`.
///
/// # Safety
///
/// - `context` must be a valid, non-disposed pointer returned by
///   [`reml_create_context`].
/// - `source` must be valid for reads of `length` bytes (or null, in which
///   case `length` is ignored and `invalid_argument` is returned).
#[no_mangle]
pub unsafe extern "C" fn reml_load_module(
    context: *mut EmberContext,
    source: *const u8,
    length: usize,
) -> EmbedStatus {
    if context.is_null() {
        return EmbedStatus::InvalidArgument;
    }
    let ctx = &*context;
    if source.is_null() {
        ctx.set_last_error("module source pointer is null");
        return EmbedStatus::InvalidArgument;
    }
    let bytes = std::slice::from_raw_parts(source, length);
    let result = load_module_impl(ctx, bytes);
    if let Err(ref e) = result {
        ctx.set_last_error(e.to_string());
    } else {
        ctx.clear_last_error();
    }
    status_of(&result)
}

/// Invokes the named entrypoint against `context`'s most recently loaded
/// module.
///
/// # Safety
///
/// - `context` must be a valid, non-disposed pointer returned by
///   [`reml_create_context`].
/// - `entrypoint` must be a valid, null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn reml_run(
    context: *mut EmberContext,
    entrypoint: *const c_char,
) -> EmbedStatus {
    if context.is_null() {
        return EmbedStatus::InvalidArgument;
    }
    let ctx = &*context;
    if entrypoint.is_null() {
        ctx.set_last_error("entrypoint pointer is null");
        return EmbedStatus::InvalidArgument;
    }
    let name = match CStr::from_ptr(entrypoint).to_str() {
        Ok(s) => s,
        Err(_) => {
            ctx.set_last_error("entrypoint name was not valid UTF-8");
            return EmbedStatus::InvalidArgument;
        }
    };

    let result = run_impl(ctx, name);
    if let Err(ref e) = result {
        ctx.set_last_error(e.to_string());
    } else {
        ctx.clear_last_error();
    }
    status_of(&result)
}

/// Builds `tuple_of`'s C-variadic-compatible counterpart: `count` elements
/// read from a contiguous `*mut u8` array, rather than a true C variadic
/// argument list (not expressible in stable `extern "C"` Rust — `SPEC_FULL.md`
/// §9 sanctions a slice/array-accepting overload for re-implementations
/// without C-style variadics). A small C-side variadic wrapper that packs
/// its `...` arguments into such an array before calling this is the
/// intended caller shape.
///
/// # Safety
///
/// - `items` must be valid for reads of `count` pointer-sized elements (or
///   null when `count <= 0`).
/// - `count < 0` panics.
#[no_mangle]
pub unsafe extern "C" fn reml_tuple_from(count: i64, items: *const *mut u8) -> *mut u8 {
    items_from_raw(count, items, ember_core::composite::tuple_of)
}

/// As [`reml_tuple_from`], for records (`SPEC_FULL.md` §4.4's
/// canonicalized field order is the caller's responsibility — this shim
/// only forwards the array).
///
/// # Safety
///
/// See [`reml_tuple_from`].
#[no_mangle]
pub unsafe extern "C" fn reml_record_from(count: i64, items: *const *mut u8) -> *mut u8 {
    items_from_raw(count, items, ember_core::composite::record_of)
}

/// As [`reml_tuple_from`], for arrays.
///
/// # Safety
///
/// See [`reml_tuple_from`].
#[no_mangle]
pub unsafe extern "C" fn reml_array_from(count: i64, items: *const *mut u8) -> *mut u8 {
    items_from_raw(count, items, ember_core::composite::array_of)
}

unsafe fn items_from_raw(
    count: i64,
    items: *const *mut u8,
    build: impl FnOnce(&[*mut u8]) -> *mut u8,
) -> *mut u8 {
    if count < 0 {
        ember_core::panic::panic_(Some("composite constructor element count is negative"));
    }
    if count == 0 || items.is_null() {
        return build(&[]);
    }
    let slice = std::slice::from_raw_parts(items, count as usize);
    build(slice)
}

/// Registers `ptr` as a heap object owned by `context`, so
/// [`reml_dispose_context`] releases it. Not part of the originating C
/// header's symbol table; this is the mechanism code generated against
/// this embedding layer uses to satisfy the "`dispose_context` releases
/// all context-owned heap objects" contract (`SPEC_FULL.md` §9).
///
/// # Safety
///
/// - `context` must be a valid, non-disposed pointer returned by
///   [`reml_create_context`].
/// - `ptr` must be null or a valid, unfreed payload pointer. Ownership
///   transfers to the context: the caller must not separately release
///   `ptr`.
#[no_mangle]
pub unsafe extern "C" fn reml_embed_track_object(context: *mut EmberContext, ptr: *mut u8) {
    if context.is_null() {
        return;
    }
    (&*context).track_object(ptr);
}

/// Releases every heap object `context` owns and frees the context itself.
///
/// # Safety
///
/// - `context` must be null or a valid pointer returned by
///   [`reml_create_context`] that has not already been disposed.
/// - `context` must not be used after this call.
#[no_mangle]
pub unsafe extern "C" fn reml_dispose_context(context: *mut EmberContext) -> EmbedStatus {
    if context.is_null() {
        return EmbedStatus::InvalidArgument;
    }
    let boxed = Box::from_raw(context);
    for p in boxed.take_owned_objects() {
        ember_core::refcount::release(p);
    }
    drop(boxed);
    EmbedStatus::Ok
}

/// Returns a pointer to a human-readable description of `context`'s most
/// recent failure, or null if none has been recorded.
///
/// # Safety
///
/// - `context` must be a valid, non-disposed pointer returned by
///   [`reml_create_context`].
/// - The returned pointer is valid only until the next call against this
///   same `context` that records or clears an error, or until the context
///   is disposed — see [`EmberContext`]'s last-error contract. Copy the
///   message out before making another ABI call on this context if it
///   must outlive that.
#[no_mangle]
pub unsafe extern "C" fn reml_last_error(context: *const EmberContext) -> *const c_char {
    if context.is_null() {
        return ptr::null();
    }
    (&*context).last_error_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::sync::RwLock;

    // `FORCE_UNSUPPORTED_ENV` is process-global state. Every test that
    // creates a context takes the read lock; the one test that flips the
    // env var takes the write lock, so it never overlaps a `create()` in
    // another thread that isn't expecting it to be set.
    static ENV_GUARD: RwLock<()> = RwLock::new(());

    unsafe fn create(version: &str) -> (EmbedStatus, *mut EmberContext) {
        let _guard = ENV_GUARD.read().unwrap();
        let c_version = CString::new(version).unwrap();
        let mut ctx: *mut EmberContext = ptr::null_mut();
        let status = reml_create_context(c_version.as_ptr(), &mut ctx);
        (status, ctx)
    }

    #[test]
    fn abi_mismatch_rejects_a_foreign_version() {
        unsafe {
            let (status, ctx) = create("9.9.9");
            assert_eq!(status, EmbedStatus::AbiMismatch);
            assert!(ctx.is_null());
        }
    }

    #[test]
    fn matching_abi_version_creates_a_context() {
        unsafe {
            let (status, ctx) = create(ABI_VERSION);
            assert_eq!(status, EmbedStatus::Ok);
            assert!(!ctx.is_null());
            assert_eq!(reml_dispose_context(ctx), EmbedStatus::Ok);
        }
    }

    #[test]
    fn null_out_param_is_invalid_argument() {
        unsafe {
            let c_version = CString::new(ABI_VERSION).unwrap();
            let status = reml_create_context(c_version.as_ptr(), ptr::null_mut());
            assert_eq!(status, EmbedStatus::InvalidArgument);
        }
    }

    #[test]
    fn force_unsupported_env_overrides_a_matching_version() {
        let _guard = ENV_GUARD.write().unwrap();
        unsafe {
            std::env::set_var(FORCE_UNSUPPORTED_ENV, "1");
            let c_version = CString::new(ABI_VERSION).unwrap();
            let mut ctx: *mut EmberContext = ptr::null_mut();
            let status = reml_create_context(c_version.as_ptr(), &mut ctx);
            std::env::remove_var(FORCE_UNSUPPORTED_ENV);
            assert_eq!(status, EmbedStatus::UnsupportedTarget);
            assert!(ctx.is_null());
        }
    }

    #[test]
    fn full_lifecycle_load_then_run_then_dispose() {
        unsafe {
            let (status, ctx) = create(ABI_VERSION);
            assert_eq!(status, EmbedStatus::Ok);

            let source = b"module Demo\nfn main() -> Int { 0 }\n";
            let load_status = reml_load_module(ctx, source.as_ptr(), source.len());
            assert_eq!(load_status, EmbedStatus::Ok);

            let entry = CString::new("main").unwrap();
            let run_status = reml_run(ctx, entry.as_ptr());
            assert_eq!(run_status, EmbedStatus::Ok);

            assert_eq!(reml_dispose_context(ctx), EmbedStatus::Ok);
        }
    }

    #[test]
    fn run_before_load_is_an_error() {
        unsafe {
            let (_, ctx) = create(ABI_VERSION);
            let entry = CString::new("main").unwrap();
            let run_status = reml_run(ctx, entry.as_ptr());
            assert_eq!(run_status, EmbedStatus::Error);

            let msg_ptr = reml_last_error(ctx);
            assert!(!msg_ptr.is_null());
            let msg = CStr::from_ptr(msg_ptr).to_str().unwrap();
            assert!(msg.contains("no module loaded"));

            reml_dispose_context(ctx);
        }
    }

    #[test]
    fn load_module_rejects_null_source() {
        unsafe {
            let (_, ctx) = create(ABI_VERSION);
            let status = reml_load_module(ctx, ptr::null(), 10);
            assert_eq!(status, EmbedStatus::InvalidArgument);
            reml_dispose_context(ctx);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    fn dispose_releases_tracked_heap_objects() {
        unsafe {
            let (_, ctx) = create(ABI_VERSION);
            let before = ember_core::alloc::debug_free_count();
            let obj = ember_core::boxing::box_i64(42);
            reml_embed_track_object(ctx, obj);
            assert_eq!(reml_dispose_context(ctx), EmbedStatus::Ok);
            assert_eq!(ember_core::alloc::debug_free_count(), before + 1);
        }
    }

    #[test]
    fn dispose_accepts_null() {
        unsafe {
            assert_eq!(reml_dispose_context(ptr::null_mut()), EmbedStatus::InvalidArgument);
        }
    }

    #[test]
    fn last_error_is_null_when_nothing_failed_yet() {
        unsafe {
            let (_, ctx) = create(ABI_VERSION);
            assert!(reml_last_error(ctx).is_null());
            reml_dispose_context(ctx);
        }
    }
}
