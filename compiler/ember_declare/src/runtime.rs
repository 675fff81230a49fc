//! Runtime ABI declarations.
//!
//! The fixed contract every generated program links against. Declared once
//! per compilation, when the [`Declarator`](crate::Declarator) is created.
//!
//! | Entry point | Signature | Attributes |
//! |-------------|-----------|------------|
//! | `Alloc` | `ptr (i64)` | `nounwind` |
//! | `Panic` | `void (ptr)` | `nounwind noreturn cold` |
//! | `InheritsFrom` | `i1 (ptr, ptr)` | `nounwind` |
//! | `FindProtocolConformance` | `ptr (ptr, ptr)` | `nounwind` |
//!
//! Each name carries the configured prefix (`emberAlloc` by default).

use ember_backend::{FnAttrs, FunctionId, IrModule, Linkage, LlTypeId};
use tracing::debug;

use crate::box_info::{declare_box_info, init_box_info, BoxInfoTable};
use crate::config::DeclareConfig;
use crate::error::InternalError;
use crate::layout::RuntimeTypes;

/// Handles to the declared runtime entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeAbi {
    /// Allocates `size` bytes.
    pub alloc: FunctionId,
    /// Aborts with a message. Never returns.
    pub panic: FunctionId,
    /// Whether the first class info inherits from the second.
    pub inherits_from: FunctionId,
    /// Conformance record of a boxed value for a protocol, null if none.
    pub find_protocol_conformance: FunctionId,
    /// Canonical box-info table for class objects: the sentinel only.
    pub objects_box_info: BoxInfoTable,
}

pub(crate) fn declare_runtime(
    module: &mut IrModule,
    types: RuntimeTypes,
    config: &DeclareConfig,
) -> Result<RuntimeAbi, InternalError> {
    let ptr = LlTypeId::PTR;

    let alloc = declare_runtime_function(
        module,
        &config.runtime_symbol("Alloc"),
        ptr,
        &[LlTypeId::I64],
        FnAttrs::NO_UNWIND,
    )?;
    // A program should panic rarely.
    let panic = declare_runtime_function(
        module,
        &config.runtime_symbol("Panic"),
        LlTypeId::VOID,
        &[ptr],
        FnAttrs::NO_UNWIND | FnAttrs::NO_RETURN | FnAttrs::COLD,
    )?;
    let inherits_from = declare_runtime_function(
        module,
        &config.runtime_symbol("InheritsFrom"),
        LlTypeId::I1,
        &[ptr, ptr],
        FnAttrs::NO_UNWIND,
    )?;
    let find_protocol_conformance = declare_runtime_function(
        module,
        &config.runtime_symbol("FindProtocolConformance"),
        ptr,
        &[ptr, ptr],
        FnAttrs::NO_UNWIND,
    )?;

    let table = declare_box_info(module, types.box_info, &config.objects_box_info, 0)?;
    let objects_box_info = init_box_info(module, types.box_info, table, Vec::new())?;

    debug!(prefix = %config.runtime_prefix, "declared runtime ABI");
    Ok(RuntimeAbi {
        alloc,
        panic,
        inherits_from,
        find_protocol_conformance,
        objects_box_info,
    })
}

fn declare_runtime_function(
    module: &mut IrModule,
    name: &str,
    ret: LlTypeId,
    params: &[LlTypeId],
    attrs: FnAttrs,
) -> Result<FunctionId, InternalError> {
    let ty = module.function_type(ret, params);
    Ok(module.declare_function_with_attrs(name, ty, Linkage::External, attrs, &[])?)
}
