//! Fixed-header heap allocation with 8-byte payload alignment.

use crate::header::{header_of, ObjectHeader};
use std::alloc::{alloc, dealloc, Layout};
use std::mem::size_of;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Size of the hidden size-prefix word stored ahead of every header.
///
/// `std::alloc::dealloc` requires the exact `Layout` used at allocation
/// time, unlike C's `free`, which recovers the block size from its own
/// allocator bookkeeping. This prefix reproduces that bookkeeping inside
/// our own allocation so `free` needs nothing but the payload pointer,
/// matching the ABI contract in `mem_free(void*)`. It sits ahead of the
/// header, so `payload - size_of::<ObjectHeader>() == header` still holds.
const SIZE_PREFIX: usize = size_of::<u64>();

#[cfg(debug_assertions)]
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);
#[cfg(debug_assertions)]
static FREE_COUNT: AtomicUsize = AtomicUsize::new(0);

const DOUBLE_FREE_SENTINEL: u32 = 0xDEAD_BEEF;

#[inline]
const fn align_up_8(size: usize) -> usize {
    (size + 7) & !7
}

unsafe fn layout_for(aligned_payload: usize) -> Layout {
    let total = SIZE_PREFIX + size_of::<ObjectHeader>() + aligned_payload;
    Layout::from_size_align(total, 8).expect("allocation size overflow")
}

/// Allocates `size` bytes of zeroed payload behind a fresh header.
///
/// The returned pointer has `refcount == 1` and `type_tag == 0`; callers
/// (boxing and composite constructors) are expected to set the tag
/// immediately. Panics (via [`crate::panic::panic_`]) if the host allocator
/// cannot satisfy the request.
pub fn allocate(size: usize) -> *mut u8 {
    let aligned = align_up_8(size);
    unsafe {
        let layout = layout_for(aligned);
        let raw = alloc(layout);
        if raw.is_null() {
            crate::panic::panic_(Some("Memory allocation failed"));
        }

        *(raw as *mut u64) = aligned as u64;
        let header = raw.add(SIZE_PREFIX) as *mut ObjectHeader;
        (*header).refcount = 1;
        (*header).type_tag = 0;

        let payload = raw.add(SIZE_PREFIX + size_of::<ObjectHeader>());
        std::ptr::write_bytes(payload, 0, aligned);

        #[cfg(debug_assertions)]
        ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);

        payload
    }
}

/// Releases the memory backing a payload pointer. Null is accepted and
/// ignored.
///
/// # Safety
///
/// `payload` must be null or a pointer previously returned by [`allocate`]
/// that has not already been freed. The caller must have already released
/// (or never have held) any children referenced from the payload.
pub unsafe fn free(payload: *mut u8) {
    if payload.is_null() {
        return;
    }

    let header = header_of(payload);

    #[cfg(debug_assertions)]
    {
        if (*header).refcount == DOUBLE_FREE_SENTINEL {
            crate::panic::panic_(Some("Double free detected"));
        }
        (*header).refcount = DOUBLE_FREE_SENTINEL;
        FREE_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    let raw = (header as *mut u8).sub(SIZE_PREFIX);
    let aligned_payload = *(raw as *const u64) as usize;
    dealloc(raw, layout_for(aligned_payload));
}

/// Returns the number of successful `allocate` calls so far.
///
/// Only available in debug builds, mirroring the originating runtime's
/// `#ifdef DEBUG` allocation counters.
#[cfg(debug_assertions)]
pub fn debug_alloc_count() -> usize {
    ALLOC_COUNT.load(Ordering::Relaxed)
}

/// Returns the number of `free` calls so far.
#[cfg(debug_assertions)]
pub fn debug_free_count() -> usize {
    FREE_COUNT.load(Ordering::Relaxed)
}

/// `allocate` exposed at the symbol name the compiled program links against.
#[no_mangle]
pub extern "C" fn mem_alloc(size: usize) -> *mut u8 {
    allocate(size)
}

/// `free` exposed at the symbol name the compiled program links against.
///
/// # Safety
///
/// See [`free`].
#[no_mangle]
pub unsafe extern "C" fn mem_free(ptr: *mut u8) {
    free(ptr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_zero_fills_and_tags_fresh() {
        unsafe {
            let p = allocate(32);
            assert!(!p.is_null());
            assert_eq!((*header_of(p)).refcount, 1);
            assert_eq!((*header_of(p)).type_tag, 0);
            let slice = std::slice::from_raw_parts(p, 32);
            assert!(slice.iter().all(|&b| b == 0));
            free(p);
        }
    }

    #[test]
    fn allocate_rounds_up_to_8_bytes() {
        unsafe {
            let p = allocate(1);
            assert_eq!(p as usize % 8, 0);
            free(p);
        }
    }

    #[test]
    fn free_accepts_null() {
        unsafe {
            free(std::ptr::null_mut());
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    fn debug_counters_track_alloc_and_free() {
        let before_alloc = debug_alloc_count();
        let before_free = debug_free_count();
        unsafe {
            let p = allocate(8);
            assert_eq!(debug_alloc_count(), before_alloc + 1);
            free(p);
            assert_eq!(debug_free_count(), before_free + 1);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Double free detected")]
    fn double_free_is_fatal() {
        unsafe {
            let p = allocate(8);
            free(p);
            free(p);
        }
    }
}
