//! The declaration context for one compilation.

use ember_backend::{Constant, GlobalId, IrModule};
use ember_types::{Idx, ProtocolId};
use rustc_hash::FxHashMap;

use crate::box_info::{self, BoxInfoTable};
use crate::config::DeclareConfig;
use crate::dispatch::DispatchTables;
use crate::error::InternalError;
use crate::layout::{RuntimeTypes, TypeLowering};
use crate::mangle::Mangler;
use crate::runtime::{declare_runtime, RuntimeAbi};

/// Owns the output module and everything declared into it.
///
/// Single-threaded: every declaration mutates the module through
/// `&mut self`. Entities are read from, and reification outputs written
/// back to, an [`EntityStore`](ember_types::EntityStore) passed per call.
pub struct Declarator {
    pub(crate) config: DeclareConfig,
    pub(crate) module: IrModule,
    pub(crate) lowering: TypeLowering,
    pub(crate) mangler: Mangler,
    pub(crate) runtime: RuntimeAbi,
    pub(crate) tables: DispatchTables,
    pub(crate) conformances: FxHashMap<(Idx, ProtocolId), GlobalId>,
}

impl Declarator {
    /// Create a declarator for a fresh module and declare the runtime ABI.
    pub fn new(module_name: &str, config: DeclareConfig) -> Result<Self, InternalError> {
        let mut module = IrModule::new(module_name);
        let lowering = TypeLowering::new(&mut module);
        let runtime = declare_runtime(&mut module, lowering.runtime_types(), &config)?;
        Ok(Self {
            config,
            module,
            lowering,
            mangler: Mangler::new(),
            runtime,
            tables: DispatchTables::default(),
            conformances: FxHashMap::default(),
        })
    }

    pub fn config(&self) -> &DeclareConfig {
        &self.config
    }

    pub fn module(&self) -> &IrModule {
        &self.module
    }

    /// Hand the module to the body-generating stage.
    pub fn into_module(self) -> IrModule {
        self.module
    }

    pub fn runtime(&self) -> &RuntimeAbi {
        &self.runtime
    }

    pub fn tables(&self) -> &DispatchTables {
        &self.tables
    }

    /// Named runtime record types registered in the module.
    pub fn runtime_types(&self) -> RuntimeTypes {
        self.lowering.runtime_types()
    }

    /// Type lowering together with the module it interns into, for the
    /// body-generating stage.
    pub fn lowering_mut(&mut self) -> (&mut TypeLowering, &mut IrModule) {
        (&mut self.lowering, &mut self.module)
    }

    pub fn mangler(&self) -> &Mangler {
        &self.mangler
    }

    /// Conformance record declared for `ty` conforming to `protocol`.
    pub fn conformance(&self, ty: Idx, protocol: ProtocolId) -> Option<GlobalId> {
        self.conformances.get(&(ty, protocol)).copied()
    }

    /// Declare a box-info table with room for `entry_count` entries plus the
    /// sentinel.
    pub fn declare_box_info(&mut self, name: &str, entry_count: u32) -> Result<BoxInfoTable, InternalError> {
        let box_info = self.lowering.runtime_types().box_info;
        box_info::declare_box_info(&mut self.module, box_info, name, entry_count)
    }

    /// Initialize `table` with `entries` followed by the sentinel.
    pub fn init_box_info(&mut self, table: BoxInfoTable, entries: Vec<Constant>) -> Result<BoxInfoTable, InternalError> {
        let box_info = self.lowering.runtime_types().box_info;
        box_info::init_box_info(&mut self.module, box_info, table, entries)
    }
}
