//! End-to-end embedding-ABI lifecycle scenarios, exercised the way a host
//! process would: across the public `reml_*` symbols rather than internal
//! crate details, mirroring `SPEC_FULL.md` §8 scenario 6.

use ember_abi::{reml_create_context, reml_dispose_context, reml_last_error, reml_load_module, reml_run};
use ember_abi::{reml_array_from, reml_record_from, reml_tuple_from};
use ember_abi::{EmbedStatus, EmberContext};
use std::ffi::{CStr, CString};
use std::ptr;

unsafe fn create(version: &str) -> (EmbedStatus, *mut EmberContext) {
    let c_version = CString::new(version).unwrap();
    let mut ctx: *mut EmberContext = ptr::null_mut();
    let status = reml_create_context(c_version.as_ptr(), &mut ctx);
    (status, ctx)
}

#[test]
fn abi_mismatch_then_successful_lifecycle() {
    unsafe {
        let (mismatch_status, mismatch_ctx) = create("9.9.9");
        assert_eq!(mismatch_status, EmbedStatus::AbiMismatch);
        assert!(mismatch_ctx.is_null());

        let (ok_status, ctx) = create(ember_abi::ABI_VERSION);
        assert_eq!(ok_status, EmbedStatus::Ok);
        assert!(!ctx.is_null());

        let source = b"module Lifecycle\nfn main() -> Str { \"embedded ok\" }\n";
        let load_status = reml_load_module(ctx, source.as_ptr(), source.len());
        assert_eq!(load_status, EmbedStatus::Ok);

        let entry = CString::new("main").unwrap();
        let run_status = reml_run(ctx, entry.as_ptr());
        assert_eq!(run_status, EmbedStatus::Ok);

        let dispose_status = reml_dispose_context(ctx);
        assert_eq!(dispose_status, EmbedStatus::Ok);
    }
}

#[test]
fn last_error_reports_why_run_failed() {
    unsafe {
        let (_, ctx) = create(ember_abi::ABI_VERSION);

        let entry = CString::new("main").unwrap();
        let run_status = reml_run(ctx, entry.as_ptr());
        assert_eq!(run_status, EmbedStatus::Error);

        let message = CStr::from_ptr(reml_last_error(ctx)).to_str().unwrap();
        assert!(message.contains("no module loaded"));

        reml_dispose_context(ctx);
    }
}

#[test]
fn empty_module_bytes_are_rejected() {
    unsafe {
        let (_, ctx) = create(ember_abi::ABI_VERSION);

        let status = reml_load_module(ctx, [].as_ptr(), 0);
        assert_eq!(status, EmbedStatus::InvalidArgument);

        reml_dispose_context(ctx);
    }
}

#[test]
fn dispose_accepts_a_null_context() {
    unsafe {
        assert_eq!(reml_dispose_context(ptr::null_mut()), EmbedStatus::InvalidArgument);
    }
}

#[test]
fn variadic_compatible_constructors_retain_every_element() {
    unsafe {
        let a = ember_core::boxing::box_i64(1);
        let b = ember_core::boxing::box_i64(2);
        let mut items = [a, b];

        let tuple = reml_tuple_from(2, items.as_mut_ptr());
        assert_eq!((*ember_core::header::header_of(a)).refcount, 2);
        ember_core::refcount::release(tuple);
        assert_eq!((*ember_core::header::header_of(a)).refcount, 1);

        let record = reml_record_from(2, items.as_mut_ptr());
        ember_core::refcount::release(record);

        let array = reml_array_from(0, ptr::null());
        ember_core::refcount::release(array);

        ember_core::refcount::release(a);
        ember_core::refcount::release(b);
    }
}
