//! Imported metadata records: protocol conformances and class infos.
//!
//! Both are owned by the defining unit. The importing unit only declares
//! them as external constants so generated code can take their address.

use ember_backend::{GlobalId, Linkage};
use ember_types::{ClassId, EntityStore, Idx, PackageId, ProtocolId, ValueTypeId};
use tracing::trace;

use crate::declarator::Declarator;
use crate::error::InternalError;

/// A type that can conform to protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conformer {
    Class(ClassId),
    ValueType(ValueTypeId),
}

impl Conformer {
    /// Package, name, conformances and pool type of the conforming type.
    fn parts(self, store: &mut EntityStore) -> (PackageId, &'static str, Vec<ProtocolId>, Idx) {
        match self {
            Conformer::Class(id) => {
                let class = store.class(id);
                let (package, name) = (class.package, store.name(class.name));
                let protocols = class.conformances.clone();
                (package, name, protocols, store.class_type(id))
            }
            Conformer::ValueType(id) => {
                let value_type = store.value_type(id);
                let (package, name) = (value_type.package, store.name(value_type.name));
                let protocols = value_type.conformances.clone();
                (package, name, protocols, store.value_type_type(id))
            }
        }
    }
}

impl Declarator {
    /// Declare the conformance record of every protocol `conformer`
    /// conforms to.
    pub fn declare_conformances(&mut self, store: &mut EntityStore, conformer: Conformer) -> Result<Vec<GlobalId>, InternalError> {
        let (package, type_name, protocols, ty) = conformer.parts(store);
        let package = store.name(store.package(package).name);
        let record = self.lowering.runtime_types().conformance;

        let mut globals = Vec::with_capacity(protocols.len());
        for protocol in protocols {
            let protocol_name = store.name(store.protocol(protocol).name);
            let symbol = self
                .mangler
                .mangle_conformance(package, type_name, protocol_name);
            let global = self
                .module
                .declare_global(&symbol, record, Linkage::External, true)?;
            self.conformances.insert((ty, protocol), global);
            trace!(%symbol, "declared conformance");
            globals.push(global);
        }
        Ok(globals)
    }

    /// Declare the class-info record of an imported class.
    pub fn declare_class_info(&mut self, store: &mut EntityStore, class: ClassId) -> Result<GlobalId, InternalError> {
        let c = store.class(class);
        let package = store.name(store.package(c.package).name);
        let symbol = self.mangler.mangle_class_info(package, store.name(c.name));
        let record = self.lowering.runtime_types().class_info;
        let global = self
            .module
            .declare_global(&symbol, record, Linkage::External, true)?;
        store.class_mut(class).class_info = Some(global);
        trace!(%symbol, "declared class info");
        Ok(global)
    }
}
