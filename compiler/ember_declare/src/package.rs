//! Declaring the symbols of an imported package.

use ember_types::{EntityStore, FnId, PackageId};
use tracing::debug;

use crate::conformance::Conformer;
use crate::declarator::Declarator;
use crate::error::InternalError;

impl Declarator {
    /// Declare every symbol of an externally compiled package the current
    /// unit may reference, without bodies or initializers.
    ///
    /// Order matters:
    /// 1. value types: methods and initializers, then conformance records
    /// 2. protocols: method types and table indices
    /// 3. classes: dispatch tables, conformance records, class info
    /// 4. free functions
    ///
    /// Declaring the same package again leaves the module unchanged.
    pub fn declare_imported_package(&mut self, store: &mut EntityStore, package: PackageId) -> Result<(), InternalError> {
        let pkg = store.package(package).clone();
        let _span = tracing::debug_span!("declare_package", package = store.name(pkg.name)).entered();

        for value_type in pkg.value_types {
            let vt = store.value_type(value_type);
            let functions: Vec<FnId> = vt.methods.iter().chain(&vt.initializers).copied().collect();
            for function in functions {
                self.declare_function(store, function)?;
            }
            self.declare_conformances(store, Conformer::ValueType(value_type))?;
        }

        for protocol in pkg.protocols {
            self.assign_protocol_slots(store, protocol)?;
        }

        for class in pkg.classes {
            self.declare_dispatch(store, class)?;
            self.declare_conformances(store, Conformer::Class(class))?;
            self.declare_class_info(store, class)?;
        }

        for function in pkg.functions {
            self.declare_function(store, function)?;
        }

        debug!(
            functions = self.module.function_count(),
            globals = self.module.global_count(),
            "declared imported package"
        );
        if self.config.debug_decls {
            debug!(target: "ember_declare::dump", "\n{}", self.module);
        }
        Ok(())
    }
}
