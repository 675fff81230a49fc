//! Ember Declare - declaration and ABI lowering.
//!
//! Turns typed entities (classes, protocols, value types, generic functions)
//! into bodiless backend declarations: function signatures with attributes,
//! metadata globals, and dispatch tables. The body-generating stage attaches
//! definitions to the same module later.
//!
//! # Architecture
//!
//! - [`Declarator`]: owns the output [`IrModule`](ember_backend::IrModule)
//!   and declares the runtime ABI on construction
//! - [`TypeLowering`]: semantic to backend types under an explicit
//!   [`ReificationCtx`]
//! - [`attributes_for`]: `nocapture` / `readonly` from ownership facts
//! - [`DispatchPlan`](ember_types::DispatchPlan): build or share a class
//!   dispatch table
//! - [`Mangler`]: linker names
//!
//! # Usage
//!
//! ```ignore
//! let mut declarator = Declarator::new("main", DeclareConfig::from_env())?;
//! for package in imports {
//!     declarator.declare_imported_package(&mut store, package)?;
//! }
//! let module = declarator.into_module();
//! ```
//!
//! Every [`InternalError`] is a compiler defect; the driver aborts on it.

mod attributes;
mod box_info;
mod config;
mod conformance;
mod declarator;
mod dispatch;
mod error;
mod layout;
mod mangle;
mod package;
mod runtime;
mod signature;

pub use attributes::{attributes_for, parameter_attr_list, parameter_attributes, parameter_facts, ParamFacts};
pub use box_info::BoxInfoTable;
pub use config::{DeclareConfig, DEFAULT_RUNTIME_PREFIX, OBJECTS_BOX_INFO};
pub use conformance::Conformer;
pub use declarator::Declarator;
pub use dispatch::{plan_dispatch, DispatchTable, DispatchTables};
pub use error::InternalError;
pub use layout::{ReificationCtx, RuntimeTypes, TypeLowering};
pub use mangle::{demangle, Mangler, MANGLE_PREFIX};
pub use runtime::RuntimeAbi;
pub use signature::linkage_for;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=ember_declare=debug`,
/// or `RUST_LOG=ember_declare=trace` to log every declared symbol.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
