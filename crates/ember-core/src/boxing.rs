//! Heap-box and unbox for the five primitive kinds the Language boxes onto
//! the heap: `i64`, `bool`, `f64`, `char`, and `string`.

use crate::alloc::allocate;
use crate::header::{get_type_tag, set_type_tag};
use crate::panic::panic_;
use crate::tag::TypeTag;
use std::mem::size_of;

/// A boxed string's payload: a borrowed byte span, not owned by the runtime.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct StringBox {
    /// Pointer to the string's bytes. Never freed by [`crate::refcount::release`]
    /// (see `SPEC_FULL.md` §3, invariant 3).
    pub data: *const u8,
    /// Length in bytes.
    pub length: i64,
}

fn char_is_valid(value: u32) -> bool {
    value <= 0x10FFFF && !(0xD800..=0xDFFF).contains(&value)
}

macro_rules! scalar_box {
    ($box_fn:ident, $unbox_fn:ident, $reml_box_fn:ident, $reml_unbox_fn:ident, $ty:ty, $tag:expr, $kind:literal) => {
        #[doc = concat!("Boxes a `", stringify!($ty), "` onto the heap, tagged `", stringify!($tag), "`.")]
        pub fn $box_fn(value: $ty) -> *mut u8 {
            let payload = allocate(size_of::<$ty>());
            unsafe {
                set_type_tag(payload, $tag.as_u32());
                *(payload as *mut $ty) = value;
            }
            payload
        }

        #[doc = concat!("Unboxes a `", stringify!($ty), "`; panics if `p` is null or not tagged `", stringify!($tag), "`.")]
        ///
        /// # Safety
        ///
        /// `p` must be null or a valid, unfreed payload pointer.
        pub unsafe fn $unbox_fn(p: *mut u8) -> $ty {
            if p.is_null() {
                panic_(Some(concat!($kind, " unbox target is null")));
            }
            if get_type_tag(p) != $tag.as_u32() {
                panic_(Some(concat!($kind, " unbox type tag mismatch")));
            }
            *(p as *const $ty)
        }

        #[doc = concat!("The symbol name `", stringify!($reml_box_fn), "` the compiled program links against (§6).")]
        #[no_mangle]
        pub extern "C" fn $reml_box_fn(value: $ty) -> *mut u8 {
            $box_fn(value)
        }

        #[doc = concat!("The symbol name `", stringify!($reml_unbox_fn), "` the compiled program links against (§6).")]
        ///
        /// # Safety
        ///
        /// `p` must be null or a valid, unfreed payload pointer.
        #[no_mangle]
        pub unsafe extern "C" fn $reml_unbox_fn(p: *mut u8) -> $ty {
            $unbox_fn(p)
        }
    };
}

scalar_box!(box_i64, unbox_i64, reml_box_i64, reml_unbox_i64, i64, TypeTag::Int, "i64");
scalar_box!(box_float, unbox_float, reml_box_float, reml_unbox_float, f64, TypeTag::Float, "float");

/// Boxes a `bool` onto the heap as a single tagged byte.
pub fn box_bool(value: bool) -> *mut u8 {
    let payload = allocate(size_of::<u8>());
    unsafe {
        set_type_tag(payload, TypeTag::Bool.as_u32());
        *payload = value as u8;
    }
    payload
}

/// Unboxes a `bool`; panics if `p` is null or not tagged `BOOL`.
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
pub unsafe fn unbox_bool(p: *mut u8) -> bool {
    if p.is_null() {
        panic_(Some("bool unbox target is null"));
    }
    if get_type_tag(p) != TypeTag::Bool.as_u32() {
        panic_(Some("bool unbox type tag mismatch"));
    }
    *p != 0
}

/// The symbol name `reml_box_bool` the compiled program links against (§6).
#[no_mangle]
pub extern "C" fn reml_box_bool(value: bool) -> *mut u8 {
    box_bool(value)
}

/// The symbol name `reml_unbox_bool` the compiled program links against (§6).
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
#[no_mangle]
pub unsafe extern "C" fn reml_unbox_bool(p: *mut u8) -> bool {
    unbox_bool(p)
}

/// Boxes a Unicode scalar value onto the heap. Panics if `value` is outside
/// `U+0000..=U+10FFFF` or in the surrogate range `U+D800..=U+DFFF`.
pub fn box_char(value: u32) -> *mut u8 {
    if !char_is_valid(value) {
        panic_(Some("char scalar value out of range"));
    }
    let payload = allocate(size_of::<u32>());
    unsafe {
        set_type_tag(payload, TypeTag::Char.as_u32());
        *(payload as *mut u32) = value;
    }
    payload
}

/// Unboxes a Unicode scalar value; panics if `p` is null or not tagged `CHAR`.
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
pub unsafe fn unbox_char(p: *mut u8) -> u32 {
    if p.is_null() {
        panic_(Some("char unbox target is null"));
    }
    if get_type_tag(p) != TypeTag::Char.as_u32() {
        panic_(Some("char unbox type tag mismatch"));
    }
    *(p as *const u32)
}

/// The symbol name `reml_box_char` the compiled program links against (§6).
#[no_mangle]
pub extern "C" fn reml_box_char(value: u32) -> *mut u8 {
    box_char(value)
}

/// The symbol name `reml_unbox_char` the compiled program links against (§6).
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
#[no_mangle]
pub unsafe extern "C" fn reml_unbox_char(p: *mut u8) -> u32 {
    unbox_char(p)
}

/// Boxes a borrowed `{data, length}` string view onto the heap. The data
/// pointer is not copied or owned; see [`StringBox`].
pub fn box_string(value: StringBox) -> *mut u8 {
    let payload = allocate(size_of::<StringBox>());
    unsafe {
        set_type_tag(payload, TypeTag::String.as_u32());
        *(payload as *mut StringBox) = value;
    }
    payload
}

/// Unboxes a string view; panics if `p` is null or not tagged `STRING`.
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
pub unsafe fn unbox_string(p: *mut u8) -> StringBox {
    if p.is_null() {
        panic_(Some("string unbox target is null"));
    }
    if get_type_tag(p) != TypeTag::String.as_u32() {
        panic_(Some("string unbox type tag mismatch"));
    }
    *(p as *const StringBox)
}

/// The symbol name `reml_box_string` the compiled program links against (§6).
#[no_mangle]
pub extern "C" fn reml_box_string(value: StringBox) -> *mut u8 {
    box_string(value)
}

/// The symbol name `reml_unbox_string` the compiled program links against (§6).
///
/// # Safety
///
/// `p` must be null or a valid, unfreed payload pointer.
#[no_mangle]
pub unsafe extern "C" fn reml_unbox_string(p: *mut u8) -> StringBox {
    unbox_string(p)
}
