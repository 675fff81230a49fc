//! Backend SDK for Ember declarations.
//!
//! Provides the primitive vocabulary the declaration stage needs: low-level
//! types, bodiless function declarations, globals, linkage, attributes and
//! constant initializers, all owned by one [`IrModule`] and addressed through
//! `Copy` ID handles ([`LlTypeId`], [`FunctionId`], [`GlobalId`]).
//!
//! # Two-phase codegen
//!
//! 1. **Declare** (this stage): every symbol the unit may reference is added
//!    to the module without a body.
//! 2. **Define** (downstream): bodies and remaining initializers are attached
//!    to the same module.
//!
//! With the `llvm` feature, [`llvm::emit`] lowers a declared module into an
//! inkwell `Module` for the define phase.

mod attrs;
mod constant;
mod error;
mod ids;
mod module;
mod print;
mod types;

#[cfg(feature = "llvm")]
pub mod llvm;

pub use attrs::{FnAttrs, ParamAttrs};
pub use constant::Constant;
pub use error::ModuleError;
pub use ids::{FunctionId, GlobalId, LlTypeId};
pub use module::{FunctionDecl, GlobalDecl, IrModule, Linkage};
pub use types::LlType;
