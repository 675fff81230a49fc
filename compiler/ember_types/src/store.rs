//! Arena storage for every typed entity.
//!
//! Entities reference each other through copyable IDs; the store owns the
//! data. Earlier compiler stages populate it, declaration lowering reads the
//! entities and writes back reification outputs and dispatch facts.

use ember_ir::{Name, StringInterner};

use crate::entities::{Class, Package, Protocol, ValueType};
use crate::function::{Function, FunctionKind, Owner};
use crate::ids::{ClassId, FnId, PackageId, ProtocolId, ValueTypeId};
use crate::idx::Idx;
use crate::pool::{Pool, TypeKind};

pub struct EntityStore {
    interner: StringInterner,
    pool: Pool,
    packages: Vec<Package>,
    functions: Vec<Function>,
    classes: Vec<Class>,
    value_types: Vec<ValueType>,
    protocols: Vec<Protocol>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            interner: StringInterner::new(),
            pool: Pool::new(),
            packages: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            value_types: Vec::new(),
            protocols: Vec::new(),
        }
    }

    // === Names and types ===

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool {
        &mut self.pool
    }

    /// Human-readable spelling of a type, e.g. `Int`, `Shape`, `?Shape`.
    pub fn type_name(&self, ty: Idx) -> String {
        match self.pool.kind(ty) {
            TypeKind::Class(id) => self.name(self.class(id).name).to_owned(),
            TypeKind::ValueType(id) => self.name(self.value_type(id).name).to_owned(),
            TypeKind::Protocol(id) => self.name(self.protocol(id).name).to_owned(),
            TypeKind::Optional(inner) => format!("?{}", self.type_name(inner)),
            TypeKind::GenericParam(index) => format!("T{index}"),
            _ => ty.name().unwrap_or("?").to_owned(),
        }
    }

    // === Construction ===

    pub fn add_package(&mut self, name: &str) -> PackageId {
        let id = PackageId::from_index(self.packages.len());
        self.packages.push(Package::new(self.interner.intern(name)));
        id
    }

    pub fn add_value_type(&mut self, package: PackageId, name: &str, fields: &[Idx]) -> ValueTypeId {
        let id = ValueTypeId::from_index(self.value_types.len());
        let mut value_type = ValueType::new(self.interner.intern(name), package);
        value_type.fields.extend_from_slice(fields);
        self.value_types.push(value_type);
        self.packages[package.index()].value_types.push(id);
        self.pool.value_type(id);
        id
    }

    pub fn add_protocol(&mut self, package: PackageId, name: &str) -> ProtocolId {
        let id = ProtocolId::from_index(self.protocols.len());
        self.protocols
            .push(Protocol::new(self.interner.intern(name), package));
        self.packages[package.index()].protocols.push(id);
        self.pool.protocol(id);
        id
    }

    /// Add a class. Registering a subclass marks its superclass as having
    /// one.
    pub fn add_class(&mut self, package: PackageId, name: &str, superclass: Option<ClassId>) -> ClassId {
        let id = ClassId::from_index(self.classes.len());
        let mut class = Class::new(self.interner.intern(name), package);
        class.superclass = superclass;
        self.classes.push(class);
        if let Some(parent) = superclass {
            self.classes[parent.index()].has_subclass = true;
        }
        self.packages[package.index()].classes.push(id);
        self.pool.class(id);
        id
    }

    /// Add a free function to its package.
    pub fn add_function(&mut self, function: Function) -> FnId {
        let id = FnId::from_index(self.functions.len());
        let package = function.package;
        self.functions.push(function);
        self.packages[package.index()].functions.push(id);
        id
    }

    /// Add a method, type method or initializer to `owner`.
    pub fn add_method(&mut self, owner: Owner, mut function: Function) -> FnId {
        let id = FnId::from_index(self.functions.len());
        let initializer = function.kind == FunctionKind::Initializer;
        function.owner = Some(owner);
        self.functions.push(function);
        match owner {
            Owner::Class(class) => {
                let class = &mut self.classes[class.index()];
                if initializer {
                    class.initializers.push(id);
                } else {
                    class.methods.push(id);
                }
            }
            Owner::ValueType(value_type) => {
                let value_type = &mut self.value_types[value_type.index()];
                if initializer {
                    value_type.initializers.push(id);
                } else {
                    value_type.methods.push(id);
                }
            }
            Owner::Protocol(protocol) => self.protocols[protocol.index()].methods.push(id),
        }
        id
    }

    pub fn add_class_conformance(&mut self, class: ClassId, protocol: ProtocolId) {
        self.classes[class.index()].conformances.push(protocol);
    }

    pub fn add_value_type_conformance(&mut self, value_type: ValueTypeId, protocol: ProtocolId) {
        self.value_types[value_type.index()]
            .conformances
            .push(protocol);
    }

    // === Access ===

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    pub fn function(&self, id: FnId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn function_mut(&mut self, id: FnId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.index()]
    }

    pub fn value_type(&self, id: ValueTypeId) -> &ValueType {
        &self.value_types[id.index()]
    }

    pub fn protocol(&self, id: ProtocolId) -> &Protocol {
        &self.protocols[id.index()]
    }

    pub fn protocol_mut(&mut self, id: ProtocolId) -> &mut Protocol {
        &mut self.protocols[id.index()]
    }

    /// Pool index of a class instance type.
    pub fn class_type(&mut self, id: ClassId) -> Idx {
        self.pool.class(id)
    }

    pub fn value_type_type(&mut self, id: ValueTypeId) -> Idx {
        self.pool.value_type(id)
    }

    pub fn protocol_type(&mut self, id: ProtocolId) -> Idx {
        self.pool.protocol(id)
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
