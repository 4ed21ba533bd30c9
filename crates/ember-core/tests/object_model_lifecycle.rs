//! End-to-end heap-object-model scenarios against the public crate API,
//! mirroring the concrete scenarios in `SPEC_FULL.md` §8.

use ember_core::boxing::box_i64;
use ember_core::composite::{closure_env, closure_new, tuple_of};
use ember_core::header::header_of;
use ember_core::refcount::{release, retain};
use ember_core::set::{set_contains, set_insert, set_len, set_new};
use std::ptr;

#[test]
fn rc_roundtrip_matches_scenario_1() {
    unsafe {
        let p = ember_core::alloc::allocate(16);
        assert_eq!((*header_of(p)).refcount, 1);
        retain(p);
        assert_eq!((*header_of(p)).refcount, 2);
        release(p);
        assert_eq!((*header_of(p)).refcount, 1);
        release(p);
    }
}

#[test]
fn closure_retains_then_releases_its_environment() {
    unsafe {
        let env = box_i64(1);
        let c = closure_new(env, ptr::null());
        assert_eq!((*header_of(env)).refcount, 2);
        assert_eq!(closure_env(c), env);
        release(c);
        assert_eq!((*header_of(env)).refcount, 1);
        release(env);
    }
}

#[test]
fn tuple_destruction_returns_element_refcounts_to_one() {
    unsafe {
        let a = box_i64(10);
        let b = box_i64(20);
        retain(a);
        retain(b);
        assert_eq!((*header_of(a)).refcount, 2);
        assert_eq!((*header_of(b)).refcount, 2);

        let t = tuple_of(&[a, b]);
        release(t);

        assert_eq!((*header_of(a)).refcount, 1);
        assert_eq!((*header_of(b)).refcount, 1);
        release(a);
        release(b);
    }
}

#[test]
fn set_persistence_and_idempotence_matches_scenario_4() {
    unsafe {
        let a = box_i64(1);
        let b = box_i64(2);

        let s0 = set_new();
        assert_eq!(set_len(s0), 0);

        let s1 = set_insert(s0, a);
        assert_eq!(set_len(s1), 1);

        let s2 = set_insert(s1, b);
        assert_eq!(set_len(s2), 2);

        let s3 = set_insert(s2, a);
        assert_eq!(set_len(s3), 2);

        assert!(set_contains(s3, a));
        assert!(set_contains(s3, b));
        assert_ne!(s2, s3);

        release(s0);
        release(s1);
        release(s2);
        release(s3);
        release(a);
        release(b);
    }
}

#[test]
fn ffi_metrics_pass_rate_matches_scenario_5() {
    use ember_core::ffi_bridge::{ffi_acquire_borrowed_result, metrics, record_status, reset_metrics, CallStatus};

    reset_metrics();
    record_status(CallStatus::Ok);
    record_status(CallStatus::Fail);

    let snapshot = metrics();
    assert_eq!(snapshot.total_calls, 2);
    assert_eq!(snapshot.success_calls, 1);
    assert!((ember_core::ffi_bridge::pass_rate() - 0.5).abs() < f64::EPSILON);

    let boxed = box_i64(7);
    ffi_acquire_borrowed_result(boxed);
    ffi_acquire_borrowed_result(ptr::null_mut());

    let after = metrics();
    assert_eq!(after.borrowed_results, 1);
    assert_eq!(after.null_results, 1);

    unsafe { release(boxed) };
}
