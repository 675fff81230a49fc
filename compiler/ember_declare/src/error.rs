//! Internal compiler errors raised during declaration.
//!
//! Inputs are validated by earlier phases, so every variant here is a
//! compiler defect. The driver reports it as an internal error and aborts.

use ember_backend::ModuleError;
use ember_types::AlreadyAssigned;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(
        "box-info table `{name}` has {declared} slots but was initialized with {provided} entries plus the sentinel"
    )]
    BoxInfoLength {
        name: String,
        declared: u32,
        provided: usize,
    },

    #[error("reification {index} of `{function}` has {found} type arguments, expected 0 or {expected}")]
    MalformedReification {
        function: String,
        index: usize,
        expected: u32,
        found: usize,
    },

    #[error("conflicting reification of `{function}`: {source}")]
    ConflictingReification {
        function: String,
        #[source]
        source: AlreadyAssigned,
    },

    #[error("leaf class `{class}` inherits from `{superclass}`, which has no dispatch table")]
    MissingSuperclassTable { class: String, superclass: String },

    #[error("`{method}` of `{class}` overrides slot {vti}, but the inherited table has {len} slots")]
    SlotOutOfRange {
        class: String,
        method: String,
        vti: u32,
        len: usize,
    },

    #[error("box-info table `{name}` cannot hold {entry_count} entries plus the sentinel")]
    BoxInfoOverflow { name: String, entry_count: u32 },
}
