//! Embedding-ABI error enum and its mapping onto the stable C-ABI status
//! taxonomy (`SPEC_FULL.md` §4.11/§6).

/// The 5-value status taxonomy every embedding entry point returns.
///
/// Stable across versions: new variants may only be appended, `Ok` stays 0,
/// and existing numbering is never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum EmbedStatus {
    /// The call completed successfully.
    Ok = 0,
    /// The call failed for a reason recorded in `last_error`.
    Error = 1,
    /// The caller's declared ABI version does not match this runtime's.
    AbiMismatch = 2,
    /// `REML_EMBED_FORCE_UNSUPPORTED` forced this target unsupported.
    UnsupportedTarget = 3,
    /// A required argument was null or otherwise malformed.
    InvalidArgument = 4,
}

/// A recoverable embedding-ABI failure, distinct from the fatal `panic`
/// path (`SPEC_FULL.md` §4.14, §7 "Reported" regime).
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbedError {
    /// The ABI version string the caller passed to `create_context` does
    /// not equal this runtime's [`crate::ABI_VERSION`].
    #[error("ABI version mismatch: runtime is {runtime}, caller requested {requested}")]
    AbiMismatch {
        /// The version string the caller passed in.
        requested: String,
        /// This runtime build's ABI version.
        runtime: &'static str,
    },
    /// `REML_EMBED_FORCE_UNSUPPORTED` is set in the environment.
    #[error("target forced unsupported via {0}")]
    UnsupportedTarget(&'static str),
    /// A required pointer or length argument was null, empty, or otherwise
    /// malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// `run` was invoked before any module was loaded into the context.
    #[error("no module loaded")]
    NoModuleLoaded,
    /// `run` was invoked with an entrypoint name the loaded module(s) do
    /// not recognize.
    #[error("unknown entrypoint: {0}")]
    UnknownEntrypoint(String),
    /// A C string argument was not valid UTF-8.
    #[error("{0} was not valid UTF-8")]
    InvalidEncoding(&'static str),
}

impl EmbedError {
    /// Maps this error onto the stable status taxonomy a C caller branches
    /// on.
    pub fn status(&self) -> EmbedStatus {
        match self {
            EmbedError::AbiMismatch { .. } => EmbedStatus::AbiMismatch,
            EmbedError::UnsupportedTarget(_) => EmbedStatus::UnsupportedTarget,
            EmbedError::InvalidArgument(_) | EmbedError::InvalidEncoding(_) => {
                EmbedStatus::InvalidArgument
            }
            EmbedError::NoModuleLoaded | EmbedError::UnknownEntrypoint(_) => EmbedStatus::Error,
        }
    }
}
