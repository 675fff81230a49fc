//! Virtual and protocol dispatch.
//!
//! # Classes
//!
//! Each class gets a [`DispatchPlan`], chosen once from its `has_subclass`
//! fact and cached on the class:
//!
//! - **Build**: subclasses may override slots, so a fresh table is
//!   constructed. It starts from the superclass table, overriding methods
//!   replace the slot of the method they override, and new methods are
//!   appended.
//! - **Assign**: a leaf class references its superclass table directly. No
//!   slots are allocated; overriding methods take the overridden method's
//!   index and new methods are called directly.
//!
//! Generic methods are always called directly and never occupy a slot.
//!
//! # Protocols
//!
//! Slot indices are a flat counter per protocol, incremented once per
//! (method, reification) pair in declaration order, starting at 0. The
//! defining and the importing compilation must agree on this layout.

use ember_types::{ClassId, DispatchPlan, EntityStore, FnId, ProtocolId, TableId};
use tracing::{debug, trace};

use crate::declarator::Declarator;
use crate::error::InternalError;
use crate::layout::ReificationCtx;
use crate::signature::conflicting;

/// A class dispatch table: the most-derived method for each slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    /// The class that built the table.
    pub class: ClassId,
    pub slots: Vec<FnId>,
}

/// Every dispatch table built during this compilation.
#[derive(Debug, Default)]
pub struct DispatchTables {
    tables: Vec<DispatchTable>,
}

impl DispatchTables {
    pub fn get(&self, id: TableId) -> &DispatchTable {
        &self.tables[id.raw() as usize]
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "a compilation never builds u32::MAX tables"
    )]
    fn push(&mut self, table: DispatchTable) -> TableId {
        let id = TableId::new(self.tables.len() as u32);
        self.tables.push(table);
        id
    }
}

/// Decide how `class` obtains its table. The superclass must already be
/// planned.
pub fn plan_dispatch(store: &EntityStore, class: ClassId) -> DispatchPlan {
    let c = store.class(class);
    if c.has_subclass {
        DispatchPlan::Build { class }
    } else {
        DispatchPlan::Assign {
            class,
            source: c
                .superclass
                .and_then(|superclass| store.class(superclass).dispatch_table),
        }
    }
}

/// Table index of the first reification of `method`, if it has one.
fn slot_of(store: &EntityStore, method: FnId) -> Option<u32> {
    store
        .function(method)
        .reifications()
        .first()
        .and_then(|r| r.entity.vti())
}

fn set_slot(store: &mut EntityStore, method: FnId, vti: u32) -> Result<(), InternalError> {
    let name = store.name(store.function(method).name);
    store
        .function_mut(method)
        .reification_mut(0)
        .entity
        .set_vti(vti)
        .map_err(conflicting(name))
}

impl Declarator {
    /// Declare the methods of `class` and give it a dispatch table.
    ///
    /// Planning happens once per class; a class that already has a plan
    /// only has its methods re-declared. A superclass without a plan is
    /// planned first.
    pub fn declare_dispatch(&mut self, store: &mut EntityStore, class: ClassId) -> Result<DispatchPlan, InternalError> {
        if let Some(plan) = store.class(class).dispatch {
            self.declare_class_functions(store, class)?;
            return Ok(plan);
        }

        if let Some(superclass) = store.class(class).superclass {
            if store.class(superclass).dispatch.is_none() {
                self.declare_dispatch(store, superclass)?;
            }
        }

        let plan = plan_dispatch(store, class);
        match plan {
            DispatchPlan::Build { class } => self.build_table(store, class)?,
            DispatchPlan::Assign { class, source } => self.assign_table(store, class, source)?,
        }
        store.class_mut(class).dispatch = Some(plan);
        debug!(class = store.name(store.class(class).name), ?plan, "planned dispatch");
        Ok(plan)
    }

    fn declare_class_functions(&mut self, store: &mut EntityStore, class: ClassId) -> Result<(), InternalError> {
        let c = store.class(class);
        let functions: Vec<FnId> = c.methods.iter().chain(&c.initializers).copied().collect();
        for function in functions {
            self.declare_function(store, function)?;
        }
        Ok(())
    }

    fn build_table(&mut self, store: &mut EntityStore, class: ClassId) -> Result<(), InternalError> {
        let mut slots = store
            .class(class)
            .superclass
            .and_then(|superclass| store.class(superclass).dispatch_table)
            .map(|table| self.tables.get(table).slots.clone())
            .unwrap_or_default();

        self.declare_class_functions(store, class)?;
        for method in store.class(class).methods.clone() {
            let f = store.function(method);
            if f.is_generic() {
                continue;
            }
            let inherited = f.overrides.and_then(|overridden| slot_of(store, overridden));
            #[expect(
                clippy::cast_possible_truncation,
                reason = "tables never hold u32::MAX slots"
            )]
            let vti = match inherited {
                Some(vti) => {
                    let len = slots.len();
                    let Some(slot) = slots.get_mut(vti as usize) else {
                        return Err(InternalError::SlotOutOfRange {
                            class: store.name(store.class(class).name).to_owned(),
                            method: store.name(f.name).to_owned(),
                            vti,
                            len,
                        });
                    };
                    *slot = method;
                    vti
                }
                None => {
                    slots.push(method);
                    (slots.len() - 1) as u32
                }
            };
            set_slot(store, method, vti)?;
            trace!(method = store.name(store.function(method).name), vti, "assigned class slot");
        }

        let table = self.tables.push(DispatchTable { class, slots });
        store.class_mut(class).dispatch_table = Some(table);
        Ok(())
    }

    fn assign_table(&mut self, store: &mut EntityStore, class: ClassId, source: Option<TableId>) -> Result<(), InternalError> {
        if let (Some(superclass), None) = (store.class(class).superclass, source) {
            return Err(InternalError::MissingSuperclassTable {
                class: store.name(store.class(class).name).to_owned(),
                superclass: store.name(store.class(superclass).name).to_owned(),
            });
        }

        self.declare_class_functions(store, class)?;
        for method in store.class(class).methods.clone() {
            let f = store.function(method);
            if f.is_generic() {
                continue;
            }
            if let Some(vti) = f.overrides.and_then(|overridden| slot_of(store, overridden)) {
                set_slot(store, method, vti)?;
            }
        }
        store.class_mut(class).dispatch_table = source;
        Ok(())
    }

    /// Compute the type of every protocol method reification and hand out
    /// table indices. Returns the protocol's slot count.
    pub fn assign_protocol_slots(&mut self, store: &mut EntityStore, protocol: ProtocolId) -> Result<u32, InternalError> {
        let mut next = 0u32;
        for method in store.protocol(protocol).methods.clone() {
            store.function_mut(method).create_unspecific_reification();
            let name = store.name(store.function(method).name);
            for index in 0..store.function(method).reifications().len() {
                let ctx = ReificationCtx::new(store, method, index)?;
                let ty = self.lowering.function_type(&mut self.module, store, &ctx);

                let entity = &mut store.function_mut(method).reification_mut(index).entity;
                entity.set_function_type(ty).map_err(conflicting(name))?;
                entity.set_vti(next).map_err(conflicting(name))?;
                trace!(method = name, reification = index, vti = next, "assigned protocol slot");
                next += 1;
            }
        }
        store.protocol_mut(protocol).slot_count = next;
        debug!(protocol = store.name(store.protocol(protocol).name), slots = next, "assigned protocol slots");
        Ok(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
