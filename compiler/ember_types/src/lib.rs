//! Ember Types - the typed entity model consumed by declaration lowering.
//!
//! Types are interned in a [`Pool`] and referenced by [`Idx`]. Packages,
//! functions, classes, value types and protocols live in an
//! [`EntityStore`] and are referenced by copyable IDs.

mod entities;
mod function;
mod ids;
mod idx;
mod pool;
mod store;

pub use entities::{Class, DispatchPlan, Package, Protocol, ValueType};
pub use function::{
    AccessLevel, AlreadyAssigned, Function, FunctionKind, Owner, Ownership, Parameter,
    Reification, ReificationEntity, TypeArgs,
};
pub use ids::{ClassId, FnId, PackageId, ProtocolId, TableId, ValueTypeId};
pub use idx::Idx;
pub use pool::{Pool, TypeKind};
pub use store::EntityStore;
