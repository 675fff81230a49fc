//! Packages and the type entities they own.

use ember_backend::GlobalId;
use ember_ir::Name;

use crate::ids::{ClassId, FnId, PackageId, ProtocolId, TableId, ValueTypeId};
use crate::idx::Idx;

/// How a class obtains its dispatch table.
///
/// Chosen once per class from the `has_subclass` fact and cached on the
/// class; never revisited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchPlan {
    /// The class has subclasses: build a fresh table whose slots descendants
    /// may override.
    Build { class: ClassId },
    /// The class is a leaf: share the superclass table. `source` is `None`
    /// for a root class without subclasses.
    Assign {
        class: ClassId,
        source: Option<TableId>,
    },
}

impl DispatchPlan {
    pub fn class(self) -> ClassId {
        match self {
            DispatchPlan::Build { class } | DispatchPlan::Assign { class, .. } => class,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Class {
    pub name: Name,
    pub package: PackageId,
    pub superclass: Option<ClassId>,
    pub methods: Vec<FnId>,
    pub initializers: Vec<FnId>,
    pub conformances: Vec<ProtocolId>,
    /// Computed by an earlier whole-program pass.
    pub has_subclass: bool,
    pub class_info: Option<GlobalId>,
    pub dispatch: Option<DispatchPlan>,
    pub dispatch_table: Option<TableId>,
}

impl Class {
    pub fn new(name: Name, package: PackageId) -> Self {
        Self {
            name,
            package,
            superclass: None,
            methods: Vec::new(),
            initializers: Vec::new(),
            conformances: Vec::new(),
            has_subclass: false,
            class_info: None,
            dispatch: None,
            dispatch_table: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Protocol {
    pub name: Name,
    pub package: PackageId,
    /// Declaration order; slot indices follow it.
    pub methods: Vec<FnId>,
    /// Number of slots handed out so far.
    pub slot_count: u32,
}

impl Protocol {
    pub fn new(name: Name, package: PackageId) -> Self {
        Self {
            name,
            package,
            methods: Vec::new(),
            slot_count: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ValueType {
    pub name: Name,
    pub package: PackageId,
    /// Stored field types, in layout order.
    pub fields: Vec<Idx>,
    pub methods: Vec<FnId>,
    pub initializers: Vec<FnId>,
    pub conformances: Vec<ProtocolId>,
}

impl ValueType {
    pub fn new(name: Name, package: PackageId) -> Self {
        Self {
            name,
            package,
            fields: Vec::new(),
            methods: Vec::new(),
            initializers: Vec::new(),
            conformances: Vec::new(),
        }
    }
}

/// A compilation unit. Collections keep declaration order.
#[derive(Clone, Debug)]
pub struct Package {
    pub name: Name,
    pub value_types: Vec<ValueTypeId>,
    pub protocols: Vec<ProtocolId>,
    pub classes: Vec<ClassId>,
    pub functions: Vec<FnId>,
}

impl Package {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            value_types: Vec::new(),
            protocols: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
        }
    }
}
