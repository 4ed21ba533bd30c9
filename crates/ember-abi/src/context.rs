//! Per-context state: loaded-module bookkeeping, context-owned heap
//! objects, and the last-error slot `reml_last_error` reads from.

use parking_lot::Mutex;
use std::ffi::{c_char, CString};
use std::ptr;

/// Opaque handle a caller receives from [`crate::create_context`] and must
/// eventually hand back to [`crate::dispose_context`].
///
/// Mirrors `reml_embed_context_t` from the originating C header: callers
/// only ever see a pointer to this type. All mutable state lives behind
/// `inner`, so a context may be touched from whatever thread the embedder
/// chooses, serialized the same way the teacher's own `VmContext` guards
/// its counters.
#[repr(C)]
pub struct EmberContext {
    inner: Mutex<ContextState>,
}

struct LoadedModule {
    #[allow(dead_code)] // shape-validated only; parsing is the black-boxed compiler's job
    bytes: Vec<u8>,
}

#[derive(Default)]
struct ContextState {
    modules: Vec<LoadedModule>,
    owned_objects: Vec<*mut u8>,
    last_error: Option<CString>,
}

// `*mut u8` entries are only ever passed to `ember_core::refcount::release`
// from `dispose_context`, which the caller has already synchronized with
// (it consumes the context). The pointers themselves are never dereferenced
// here.
unsafe impl Send for ContextState {}

impl EmberContext {
    pub(crate) fn new() -> Box<Self> {
        Box::new(EmberContext {
            inner: Mutex::new(ContextState::default()),
        })
    }

    /// Records `bytes` as a loaded module. Staging/parsing the bytes into
    /// an executable module graph is the black-boxed compiler's job
    /// (`SPEC_FULL.md` §1); this crate only validates shape and remembers
    /// that a module was loaded.
    pub(crate) fn record_module(&self, bytes: Vec<u8>) {
        self.inner.lock().modules.push(LoadedModule { bytes });
    }

    pub(crate) fn has_module(&self) -> bool {
        !self.inner.lock().modules.is_empty()
    }

    /// Registers a heap object as owned by this context, so
    /// `dispose_context` releases it.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a valid, unfreed payload pointer returned by
    /// `ember_core::alloc::allocate` (or a boxing/composite constructor
    /// built on it). Ownership transfers to the context: the caller must
    /// not release `ptr` itself afterwards.
    pub(crate) unsafe fn track_object(&self, ptr: *mut u8) {
        if !ptr.is_null() {
            self.inner.lock().owned_objects.push(ptr);
        }
    }

    /// Drains every heap object this context owns. Called once, from
    /// `dispose_context`.
    pub(crate) fn take_owned_objects(&self) -> Vec<*mut u8> {
        std::mem::take(&mut self.inner.lock().owned_objects)
    }

    pub(crate) fn set_last_error(&self, message: impl Into<String>) {
        let message = message.into();
        let c = CString::new(message).unwrap_or_else(|e| {
            let truncated: Vec<u8> = e.into_vec().into_iter().take_while(|&b| b != 0).collect();
            CString::new(truncated).unwrap_or_default()
        });
        self.inner.lock().last_error = Some(c);
    }

    pub(crate) fn clear_last_error(&self) {
        self.inner.lock().last_error = None;
    }

    /// Returns a pointer to the most recently recorded error message, or
    /// null if none has been recorded (or it was cleared by a subsequent
    /// successful call).
    ///
    /// # Safety
    ///
    /// The returned pointer is valid only until the next call that
    /// mutates this context's last-error slot (any `create_context`,
    /// `load_module`, or `run` call against this same context) or until
    /// the context is disposed, whichever comes first — the same
    /// single-buffer contract `errno`-style APIs use. Callers that need
    /// the message to outlive that must copy it out immediately.
    pub(crate) fn last_error_ptr(&self) -> *const c_char {
        match &self.inner.lock().last_error {
            Some(c) => c.as_ptr(),
            None => ptr::null(),
        }
    }
}
