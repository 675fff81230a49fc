//! Module-level consistency errors.
//!
//! These only arise when two declarations of the same symbol disagree or a
//! caller hands the module an ill-typed constant. Both are compiler defects,
//! never user errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("conflicting declaration of function `{name}`: declared as `{existing}`, redeclared as `{requested}`")]
    ConflictingFunction {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("conflicting declaration of global `{name}`: declared as `{existing}`, redeclared as `{requested}`")]
    ConflictingGlobal {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("`{name}` is not a function type: `{ty}`")]
    NotAFunctionType { name: String, ty: String },

    #[error("function `{name}` has {count} parameters, no parameter at index {index}")]
    ParamIndex { name: String, index: u32, count: usize },

    #[error("initializer of type `{found}` does not match global `{name}` of type `{expected}`")]
    InitializerType {
        name: String,
        expected: String,
        found: String,
    },

    #[error("global `{name}` already has a different initializer")]
    ConflictingInitializer { name: String },

    #[cfg(feature = "llvm")]
    #[error("LLVM emission failed: {0}")]
    Emit(String),
}
