//! The `retain`/`release` protocol and type-tagged destructor dispatch.

use crate::alloc::free;
use crate::composite::{destroy_adt, destroy_closure, destroy_items_array};
use crate::header::header_of;
use crate::set::destroy_set;
use crate::tag::TypeTag;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(debug_assertions)]
static INC_REF_COUNT: AtomicUsize = AtomicUsize::new(0);
#[cfg(debug_assertions)]
static DEC_REF_COUNT: AtomicUsize = AtomicUsize::new(0);
#[cfg(debug_assertions)]
static DESTROY_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Increments `p`'s refcount. Null is a no-op.
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer returned by
/// [`crate::alloc::allocate`] or a boxing/composite constructor built on it.
pub unsafe fn retain(p: *mut u8) {
    if p.is_null() {
        return;
    }
    (*header_of(p)).refcount += 1;

    #[cfg(debug_assertions)]
    INC_REF_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Decrements `p`'s refcount; on reaching zero, dispatches to the
/// destructor keyed on the object's type tag and frees the payload. Null
/// is a no-op.
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer. The refcount
/// decrement this call performs must correspond to a prior `retain` or to
/// the implicit +1 a constructor handed out.
pub unsafe fn release(p: *mut u8) {
    if p.is_null() {
        return;
    }

    let header = header_of(p);
    (*header).refcount -= 1;

    #[cfg(debug_assertions)]
    DEC_REF_COUNT.fetch_add(1, Ordering::Relaxed);

    if (*header).refcount != 0 {
        return;
    }

    #[cfg(debug_assertions)]
    DESTROY_COUNT.fetch_add(1, Ordering::Relaxed);

    match TypeTag::try_from((*header).type_tag) {
        Ok(TypeTag::Int | TypeTag::Float | TypeTag::Bool | TypeTag::Char) => {}
        Ok(TypeTag::String) => {}
        Ok(TypeTag::Tuple | TypeTag::Record | TypeTag::Array) => destroy_items_array(p),
        Ok(TypeTag::Closure) => destroy_closure(p),
        Ok(TypeTag::Adt) => destroy_adt(p),
        Ok(TypeTag::Set) => destroy_set(p),
        Err(()) => {
            #[cfg(debug_assertions)]
            eprintln!(
                "[DEBUG] release: unknown type_tag={}, skipping destructor",
                (*header).type_tag
            );
        }
    }

    free(p);
}

/// Number of `retain` calls so far (debug builds only).
#[cfg(debug_assertions)]
pub fn debug_inc_ref_count() -> usize {
    INC_REF_COUNT.load(Ordering::Relaxed)
}

/// Number of `release` calls so far (debug builds only).
#[cfg(debug_assertions)]
pub fn debug_dec_ref_count() -> usize {
    DEC_REF_COUNT.load(Ordering::Relaxed)
}

/// Number of objects actually destroyed so far (debug builds only).
#[cfg(debug_assertions)]
pub fn debug_destroy_count() -> usize {
    DESTROY_COUNT.load(Ordering::Relaxed)
}

/// `retain` exposed at the symbol name the compiled program links against.
///
/// # Safety
///
/// See [`retain`].
#[no_mangle]
pub unsafe extern "C" fn inc_ref(ptr: *mut u8) {
    retain(ptr)
}

/// `release` exposed at the symbol name the compiled program links against.
///
/// # Safety
///
/// See [`release`].
#[no_mangle]
pub unsafe extern "C" fn dec_ref(ptr: *mut u8) {
    release(ptr)
}
