//! Function declarations, one per reification.

use ember_backend::{FnAttrs, FunctionId, Linkage};
use ember_types::{AccessLevel, AlreadyAssigned, EntityStore, FnId, Function};
use tracing::trace;

use crate::attributes::parameter_attr_list;
use crate::declarator::Declarator;
use crate::error::InternalError;
use crate::layout::ReificationCtx;

/// Private linkage only for private functions not consumed externally.
pub fn linkage_for(function: &Function) -> Linkage {
    if function.access == AccessLevel::Private && !function.is_external {
        Linkage::Private
    } else {
        Linkage::External
    }
}

pub(crate) fn conflicting(function: &'static str) -> impl FnOnce(AlreadyAssigned) -> InternalError {
    move |source| InternalError::ConflictingReification {
        function: function.to_owned(),
        source,
    }
}

impl Declarator {
    /// Declare every reification of `function`.
    ///
    /// Each reification gets its own backend function, marked `nounwind`,
    /// with parameter attributes derived from ownership and mutability.
    /// Declaring an already declared function again is a no-op as long as
    /// signature, linkage and attributes agree.
    pub fn declare_function(&mut self, store: &mut EntityStore, function: FnId) -> Result<(), InternalError> {
        for index in 0..store.function(function).reifications().len() {
            let func = self.declare_reification(store, function, index)?;
            let ty = self.module.function(func).ty;
            let name = store.name(store.function(function).name);
            let entity = &mut store.function_mut(function).reification_mut(index).entity;
            entity.set_function_type(ty).map_err(conflicting(name))?;
            entity.set_function(func).map_err(conflicting(name))?;
        }
        Ok(())
    }

    fn declare_reification(&mut self, store: &EntityStore, function: FnId, index: usize) -> Result<FunctionId, InternalError> {
        let ctx = ReificationCtx::new(store, function, index)?;
        let ty = self.lowering.function_type(&mut self.module, store, &ctx);

        let f = store.function(function);
        let name = match &f.external_name {
            Some(name) => name.clone(),
            None => self.mangler.function_symbol(store, function, ctx.args),
        };

        let param_attrs = parameter_attr_list(store, f);
        let func = self.module.declare_function_with_attrs(
            &name,
            ty,
            linkage_for(f),
            FnAttrs::NO_UNWIND,
            &param_attrs,
        )?;
        trace!(symbol = %name, reification = index, "declared function");
        Ok(func)
    }
}
