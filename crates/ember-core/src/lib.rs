//! Ember native runtime core
//!
//! This crate provides the heap object model that a compiled program built
//! by the Language's toolchain links against:
//! - fixed-header heap allocation and the `retain`/`release` protocol
//! - boxing/unboxing of `i64`, `bool`, `f64`, `char`, and string primitives
//! - tuple/record/array/closure/ADT construction and destruction
//! - a persistent, pointer-identity set
//! - the FFI borrow/transfer bridge and its call-accounting metrics
//! - a structured panic banner and a small cross-platform OS abstraction
//!
//! The embedding ABI that wraps this crate for host processes lives in the
//! sibling `ember-abi` crate.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod alloc;
pub mod boxing;
pub mod composite;
pub mod ffi_bridge;
pub mod header;
pub mod intrinsics;
pub mod os;
pub mod panic;
pub mod platform;
pub mod refcount;
pub mod set;
pub mod string_ops;
pub mod tag;

pub use boxing::StringBox;
pub use ffi_bridge::{CallStatus, Metrics, Span};
pub use header::ObjectHeader;
pub use tag::TypeTag;
