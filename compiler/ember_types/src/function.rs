//! Functions, their parameters, and their reifications.
//!
//! A [`Function`] is created by earlier stages with all ownership and
//! mutability facts attached. Declaration never creates functions; it only
//! fills in the backend outputs of each [`Reification`].

use std::fmt;

use ember_backend::{FunctionId, LlTypeId};
use ember_ir::Name;
use smallvec::SmallVec;
use thiserror::Error;

use crate::ids::{ClassId, FnId, PackageId, ProtocolId, ValueTypeId};
use crate::idx::Idx;

/// Ownership classification for a parameter or receiver.
///
/// Produced by borrow inference. Borrowed values are never retained by the
/// callee past the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Ownership {
    /// The callee will not store or return the value.
    Borrowed,
    /// The callee may store, return, or pass the value on.
    Owned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessLevel {
    Public,
    Protected,
    Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// A free function.
    Function,
    /// An instance method with an implicit receiver.
    Method,
    /// A method on the type itself, no receiver.
    TypeMethod,
    /// Initializes the receiver.
    Initializer,
}

/// The type a method is declared on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    Class(ClassId),
    ValueType(ValueTypeId),
    Protocol(ProtocolId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: Name,
    pub ty: Idx,
    pub ownership: Ownership,
}

/// Concrete type arguments of one reification.
pub type TypeArgs = SmallVec<[Idx; 2]>;

/// A write-once slot was assigned a second, different value.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{field} already assigned {existing}, refusing {requested}")]
pub struct AlreadyAssigned {
    pub field: &'static str,
    pub existing: String,
    pub requested: String,
}

fn write_once<T: Copy + PartialEq + fmt::Debug>(
    slot: &mut Option<T>,
    value: T,
    field: &'static str,
) -> Result<(), AlreadyAssigned> {
    match *slot {
        None => {
            *slot = Some(value);
            Ok(())
        }
        Some(existing) if existing == value => Ok(()),
        Some(existing) => Err(AlreadyAssigned {
            field,
            existing: format!("{existing:?}"),
            requested: format!("{value:?}"),
        }),
    }
}

/// Backend outputs of one reification. Each field is assigned at most once;
/// assigning the same value again is accepted so repeated declaration of an
/// imported package stays idempotent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReificationEntity {
    function_type: Option<LlTypeId>,
    function: Option<FunctionId>,
    vti: Option<u32>,
}

impl ReificationEntity {
    pub fn function_type(&self) -> Option<LlTypeId> {
        self.function_type
    }

    pub fn function(&self) -> Option<FunctionId> {
        self.function
    }

    /// Dispatch table index, for protocol and virtual class methods.
    pub fn vti(&self) -> Option<u32> {
        self.vti
    }

    pub fn set_function_type(&mut self, ty: LlTypeId) -> Result<(), AlreadyAssigned> {
        write_once(&mut self.function_type, ty, "function type")
    }

    pub fn set_function(&mut self, function: FunctionId) -> Result<(), AlreadyAssigned> {
        write_once(&mut self.function, function, "backend function")
    }

    pub fn set_vti(&mut self, vti: u32) -> Result<(), AlreadyAssigned> {
        write_once(&mut self.vti, vti, "table index")
    }
}

/// One concrete instantiation of a function.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reification {
    /// Empty for the unspecific reification.
    pub args: TypeArgs,
    pub entity: ReificationEntity,
}

impl Reification {
    pub fn new(args: TypeArgs) -> Self {
        Self {
            args,
            entity: ReificationEntity::default(),
        }
    }

    pub fn is_unspecific(&self) -> bool {
        self.args.is_empty()
    }
}

/// A declared callable.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: Name,
    pub package: PackageId,
    pub owner: Option<Owner>,
    pub kind: FunctionKind,
    pub access: AccessLevel,
    /// Symbol override; `None` means the name is mangled.
    pub external_name: Option<String>,
    /// Implemented outside the language (runtime or native code).
    pub is_external: bool,
    pub params: Vec<Parameter>,
    pub return_type: Idx,
    /// Ownership of the implicit receiver; `None` when there is no receiver.
    pub receiver: Option<Ownership>,
    pub mutating: bool,
    pub generic_params: u32,
    /// The superclass method this class method overrides.
    pub overrides: Option<FnId>,
    reifications: Vec<Reification>,
}

impl Function {
    /// A public, non-generic function returning `Unit`, with its unspecific
    /// reification already present.
    pub fn new(name: Name, package: PackageId, kind: FunctionKind) -> Self {
        Self {
            name,
            package,
            owner: None,
            kind,
            access: AccessLevel::Public,
            external_name: None,
            is_external: false,
            params: Vec::new(),
            return_type: Idx::UNIT,
            receiver: match kind {
                FunctionKind::Method | FunctionKind::Initializer => Some(Ownership::Borrowed),
                FunctionKind::Function | FunctionKind::TypeMethod => None,
            },
            mutating: false,
            generic_params: 0,
            overrides: None,
            reifications: vec![Reification::default()],
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: Name, ty: Idx, ownership: Ownership) -> Self {
        self.params.push(Parameter {
            name,
            ty,
            ownership,
        });
        self
    }

    #[must_use]
    pub fn returning(mut self, ty: Idx) -> Self {
        self.return_type = ty;
        self
    }

    #[must_use]
    pub fn with_receiver(mut self, ownership: Ownership) -> Self {
        self.receiver = Some(ownership);
        self
    }

    #[must_use]
    pub fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: AccessLevel) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn with_external_name(mut self, name: &str) -> Self {
        self.external_name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn external(mut self) -> Self {
        self.is_external = true;
        self
    }

    #[must_use]
    pub fn overriding(mut self, method: FnId) -> Self {
        self.overrides = Some(method);
        self
    }

    /// Make the function generic over `count` parameters.
    ///
    /// Generic functions start without reifications; instantiations are
    /// added through [`reify`](Self::reify).
    #[must_use]
    pub fn generic(mut self, count: u32) -> Self {
        self.generic_params = count;
        self.reifications.clear();
        self
    }

    pub fn has_receiver(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn is_generic(&self) -> bool {
        self.generic_params > 0
    }

    /// Ensure the reification with no type arguments exists.
    pub fn create_unspecific_reification(&mut self) {
        if !self.reifications.iter().any(Reification::is_unspecific) {
            self.reifications.push(Reification::default());
        }
    }

    /// Add (or find) the reification for `args`, returning its index.
    pub fn reify(&mut self, args: &[Idx]) -> usize {
        if let Some(pos) = self.reifications.iter().position(|r| r.args.as_slice() == args) {
            return pos;
        }
        self.reifications.push(Reification::new(args.iter().copied().collect()));
        self.reifications.len() - 1
    }

    pub fn reifications(&self) -> &[Reification] {
        &self.reifications
    }

    pub fn reification(&self, index: usize) -> &Reification {
        &self.reifications[index]
    }

    pub fn reification_mut(&mut self, index: usize) -> &mut Reification {
        &mut self.reifications[index]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
