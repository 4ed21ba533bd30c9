//! A persistent, pointer-identity-keyed set: the minimal ABI anchor
//! described in `SPEC_FULL.md` §4.6, to be replaced by a hashed or ordered
//! structure once the Language's equality/ordering type-classes land.

use crate::alloc::allocate;
use crate::header::set_type_tag;
use crate::panic::panic_;
use crate::refcount::{release, retain};
use crate::tag::TypeTag;
use std::mem::size_of;
use std::ptr;

#[repr(C)]
struct SetPayload {
    len: i64,
    capacity: i64,
    items: *mut *mut u8,
}

fn alloc_items(capacity: usize) -> *mut *mut u8 {
    if capacity == 0 {
        return ptr::null_mut();
    }
    let boxed: Box<[*mut u8]> = vec![ptr::null_mut(); capacity].into_boxed_slice();
    Box::into_raw(boxed) as *mut *mut u8
}

/// Allocates a fresh, empty set.
pub fn set_new() -> *mut u8 {
    let payload = allocate(size_of::<SetPayload>());
    unsafe {
        set_type_tag(payload, TypeTag::Set.as_u32());
        let set = payload as *mut SetPayload;
        (*set).len = 0;
        (*set).capacity = 0;
        (*set).items = ptr::null_mut();
    }
    payload
}

/// The symbol name `reml_set_new` the compiled program links against (§6).
#[no_mangle]
pub extern "C" fn reml_set_new() -> *mut u8 {
    set_new()
}

/// Returns `true` if a linear scan of `set` finds `value` by pointer
/// identity. Panics if `set` is null.
///
/// # Safety
///
/// `set` must be a valid, unfreed payload pointer tagged `SET`.
pub unsafe fn set_contains(set: *mut u8, value: *mut u8) -> bool {
    if set.is_null() {
        panic_(Some("set contains target is null"));
    }
    let set = set as *const SetPayload;
    for i in 0..(*set).len {
        if *(*set).items.add(i as usize) == value {
            return true;
        }
    }
    false
}

/// The symbol name `reml_set_contains` the compiled program links against
/// (§6).
///
/// # Safety
///
/// `set` must be a valid, unfreed payload pointer tagged `SET`.
#[no_mangle]
pub unsafe extern "C" fn reml_set_contains(set: *mut u8, value: *mut u8) -> i32 {
    set_contains(set, value) as i32
}

/// Returns the number of elements in `set`. Panics if `set` is null.
///
/// # Safety
///
/// `set` must be a valid, unfreed payload pointer tagged `SET`.
pub unsafe fn set_len(set: *mut u8) -> i64 {
    if set.is_null() {
        panic_(Some("set len target is null"));
    }
    (*(set as *const SetPayload)).len
}

/// The symbol name `reml_set_len` the compiled program links against (§6).
///
/// # Safety
///
/// `set` must be a valid, unfreed payload pointer tagged `SET`.
#[no_mangle]
pub unsafe extern "C" fn reml_set_len(set: *mut u8) -> i64 {
    set_len(set)
}

/// Returns a new set containing every element of `set` plus `value`
/// (deduplicated by pointer identity); `set` itself is left untouched, per
/// the persistence invariant in `SPEC_FULL.md` §3.
///
/// # Safety
///
/// `set` must be a valid, unfreed payload pointer tagged `SET`.
pub unsafe fn set_insert(set: *mut u8, value: *mut u8) -> *mut u8 {
    if set.is_null() {
        panic_(Some("set insert target is null"));
    }
    let source = set as *const SetPayload;
    let exists = set_contains(set, value);
    let new_len = (*source).len + if exists { 0 } else { 1 };

    let next_payload = allocate(size_of::<SetPayload>());
    set_type_tag(next_payload, TypeTag::Set.as_u32());
    let next = next_payload as *mut SetPayload;
    (*next).len = new_len;
    (*next).capacity = new_len;
    (*next).items = alloc_items(new_len as usize);

    for i in 0..(*source).len {
        let item = *(*source).items.add(i as usize);
        *(*next).items.add(i as usize) = item;
        retain(item);
    }
    if !exists {
        *(*next).items.add((*source).len as usize) = value;
        retain(value);
    }

    next_payload
}

/// The symbol name `reml_set_insert` the compiled program links against
/// (§6).
///
/// # Safety
///
/// `set` must be a valid, unfreed payload pointer tagged `SET`.
#[no_mangle]
pub unsafe extern "C" fn reml_set_insert(set: *mut u8, value: *mut u8) -> *mut u8 {
    set_insert(set, value)
}

/// Releases every element and frees the backing array. The payload struct
/// itself is freed by the caller (`release`'s dispatch).
///
/// # Safety
///
/// `ptr` must be a valid, unfreed payload pointer tagged `SET`.
pub(crate) unsafe fn destroy_set(ptr: *mut u8) {
    let set = ptr as *mut SetPayload;
    if !(*set).items.is_null() {
        for i in 0..(*set).len {
            release(*(*set).items.add(i as usize));
        }
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            (*set).items,
            (*set).len as usize,
        )));
        (*set).items = ptr::null_mut();
    }
}
