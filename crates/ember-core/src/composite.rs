//! Tuple, record, array, closure and ADT constructors and destructors.
//!
//! Tuple, record and array share one payload shape (`{len, items}`) and
//! one destructor body; they are kept as distinct type tags per
//! `SPEC_FULL.md` §3 so future specialization can diverge them.

use crate::alloc::allocate;
use crate::header::{get_type_tag, set_type_tag};
use crate::panic::panic_;
use crate::refcount::{release, retain};
use crate::tag::TypeTag;
use std::mem::size_of;
use std::ptr;

/// `{len, items}`: the shared payload shape for tuple, record and array.
#[repr(C)]
struct ItemsPayload {
    len: i64,
    items: *mut *mut u8,
}

/// `{env, code}`.
#[repr(C)]
struct ClosurePayload {
    env: *mut u8,
    code: *const (),
}

/// `{tag, payload}`.
#[repr(C)]
struct AdtPayload {
    tag: i32,
    payload: *mut u8,
}

fn alloc_items(len: usize) -> *mut *mut u8 {
    if len == 0 {
        return ptr::null_mut();
    }
    let boxed: Box<[*mut u8]> = vec![ptr::null_mut(); len].into_boxed_slice();
    Box::into_raw(boxed) as *mut *mut u8
}

/// # Safety
///
/// `items` must be null, or a pointer previously returned by [`alloc_items`]
/// with this exact `len`, not yet freed.
unsafe fn free_items(items: *mut *mut u8, len: usize) {
    if items.is_null() {
        return;
    }
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(items, len)));
}

fn build_items_container(tag: TypeTag, elements: &[*mut u8]) -> *mut u8 {
    let payload = allocate(size_of::<ItemsPayload>());
    unsafe {
        set_type_tag(payload, tag.as_u32());
        let container = payload as *mut ItemsPayload;
        (*container).len = elements.len() as i64;
        (*container).items = alloc_items(elements.len());
        for (i, &item) in elements.iter().enumerate() {
            *(*container).items.add(i) = item;
            if !item.is_null() {
                retain(item);
            }
        }
    }
    payload
}

/// Builds a tuple from `elements`, retaining each non-null element.
pub fn tuple_of(elements: &[*mut u8]) -> *mut u8 {
    build_items_container(TypeTag::Tuple, elements)
}

/// Builds a record from `values` (already in the compiler's canonicalized
/// field order), retaining each non-null value.
pub fn record_of(values: &[*mut u8]) -> *mut u8 {
    build_items_container(TypeTag::Record, values)
}

/// Builds an array from `elements`, retaining each non-null element.
pub fn array_of(elements: &[*mut u8]) -> *mut u8 {
    build_items_container(TypeTag::Array, elements)
}

/// Destroys the shared tuple/record/array payload shape: releases every
/// non-null slot and frees the element array.
///
/// # Safety
///
/// `ptr` must be a valid, unfreed payload pointer tagged `TUPLE`, `RECORD`
/// or `ARRAY`.
pub(crate) unsafe fn destroy_items_array(ptr: *mut u8) {
    let container = ptr as *mut ItemsPayload;
    let len = (*container).len;
    if !(*container).items.is_null() {
        for i in 0..len {
            let slot = *(*container).items.add(i as usize);
            if !slot.is_null() {
                release(slot);
            }
        }
        free_items((*container).items, len as usize);
        (*container).items = ptr::null_mut();
    }
}

/// Builds a closure from `env` (retained if non-null) and an opaque `code`
/// pointer.
pub fn closure_new(env: *mut u8, code: *const ()) -> *mut u8 {
    let payload = allocate(size_of::<ClosurePayload>());
    unsafe {
        set_type_tag(payload, TypeTag::Closure.as_u32());
        let closure = payload as *mut ClosurePayload;
        (*closure).env = env;
        (*closure).code = code;
        if !env.is_null() {
            retain(env);
        }
    }
    payload
}

/// The symbol name `reml_closure_new` the compiled program links against
/// (§6).
#[no_mangle]
pub extern "C" fn reml_closure_new(env: *mut u8, code: *const ()) -> *mut u8 {
    closure_new(env, code)
}

/// Returns a closure's environment pointer. Panics if `p` is null or not
/// tagged `CLOSURE`.
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
pub unsafe fn closure_env(p: *mut u8) -> *mut u8 {
    if p.is_null() {
        panic_(Some("closure env target is null"));
    }
    if get_type_tag(p) != TypeTag::Closure.as_u32() {
        panic_(Some("closure env type tag mismatch"));
    }
    (*(p as *const ClosurePayload)).env
}

/// The symbol name `reml_closure_env` the compiled program links against
/// (§6).
///
/// # Safety
///
/// See [`closure_env`].
#[no_mangle]
pub unsafe extern "C" fn reml_closure_env(p: *mut u8) -> *mut u8 {
    closure_env(p)
}

/// Returns a closure's code pointer. Panics if `p` is null or not tagged
/// `CLOSURE`.
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
pub unsafe fn closure_code(p: *mut u8) -> *const () {
    if p.is_null() {
        panic_(Some("closure code_ptr target is null"));
    }
    if get_type_tag(p) != TypeTag::Closure.as_u32() {
        panic_(Some("closure code_ptr type tag mismatch"));
    }
    (*(p as *const ClosurePayload)).code
}

/// `closure_code` exposed at the symbol name the compiled program links
/// against, `reml_closure_code_ptr` (`closure_code_ptr` in §6's indicative
/// table).
///
/// # Safety
///
/// See [`closure_code`].
#[no_mangle]
pub unsafe extern "C" fn reml_closure_code_ptr(p: *mut u8) -> *const () {
    closure_code(p)
}

/// # Safety
///
/// `ptr` must be a valid, unfreed payload pointer tagged `CLOSURE`.
pub(crate) unsafe fn destroy_closure(ptr: *mut u8) {
    let closure = ptr as *mut ClosurePayload;
    if !(*closure).env.is_null() {
        release((*closure).env);
    }
}

/// Builds an ADT value from a constructor tag and an optional single
/// pointer-sized payload (retained if non-null).
///
/// See `SPEC_FULL.md` §9: the payload is limited to one pointer slot until a
/// per-constructor layout descriptor is introduced.
pub fn adt_new(tag: i32, payload: *mut u8) -> *mut u8 {
    let object = allocate(size_of::<AdtPayload>());
    unsafe {
        set_type_tag(object, TypeTag::Adt.as_u32());
        let adt = object as *mut AdtPayload;
        (*adt).tag = tag;
        (*adt).payload = payload;
        if !payload.is_null() {
            retain(payload);
        }
    }
    object
}

/// The symbol name `reml_adt_new` the compiled program links against (§6).
/// No `adt.c` exists in the original; this follows the `reml_` convention
/// the original applies to every other composite-type constructor (tuple,
/// closure, set) for a consistent ABI surface.
#[no_mangle]
pub extern "C" fn reml_adt_new(tag: i32, payload: *mut u8) -> *mut u8 {
    adt_new(tag, payload)
}

/// Returns an ADT's constructor tag. Panics if `p` is null or not tagged
/// `ADT`.
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
pub unsafe fn adt_tag(p: *mut u8) -> i32 {
    if p.is_null() {
        panic_(Some("adt tag target is null"));
    }
    if get_type_tag(p) != TypeTag::Adt.as_u32() {
        panic_(Some("adt tag type tag mismatch"));
    }
    (*(p as *const AdtPayload)).tag
}

/// The symbol name `reml_adt_tag` the compiled program links against (§6).
///
/// # Safety
///
/// See [`adt_tag`].
#[no_mangle]
pub unsafe extern "C" fn reml_adt_tag(p: *mut u8) -> i32 {
    adt_tag(p)
}

/// Returns an ADT's payload pointer (may be null). Panics if `p` is null or
/// not tagged `ADT`.
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
pub unsafe fn adt_payload(p: *mut u8) -> *mut u8 {
    if p.is_null() {
        panic_(Some("adt payload target is null"));
    }
    if get_type_tag(p) != TypeTag::Adt.as_u32() {
        panic_(Some("adt payload type tag mismatch"));
    }
    (*(p as *const AdtPayload)).payload
}

/// The symbol name `reml_adt_payload` the compiled program links against
/// (§6).
///
/// # Safety
///
/// See [`adt_payload`].
#[no_mangle]
pub unsafe extern "C" fn reml_adt_payload(p: *mut u8) -> *mut u8 {
    adt_payload(p)
}

/// # Safety
///
/// `ptr` must be a valid, unfreed payload pointer tagged `ADT`.
pub(crate) unsafe fn destroy_adt(ptr: *mut u8) {
    let adt = ptr as *mut AdtPayload;
    if !(*adt).payload.is_null() {
        release((*adt).payload);
    }
}
