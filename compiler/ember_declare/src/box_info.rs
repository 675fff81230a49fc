//! Box-info tables.
//!
//! A box-info table describes how a value is represented when boxed into an
//! existential container. The emitted array ends with an all-zero sentinel
//! entry, so the runtime walks it without a separate count. During
//! construction the table carries its length explicitly.

use ember_backend::{Constant, GlobalId, IrModule, Linkage, LlTypeId};
use tracing::trace;

use crate::error::InternalError;

/// A declared box-info table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxInfoTable {
    global: GlobalId,
    /// Element count including the sentinel, never zero.
    len: u32,
}

impl BoxInfoTable {
    pub fn global(self) -> GlobalId {
        self.global
    }

    /// Element count including the sentinel.
    pub fn len(self) -> u32 {
        self.len
    }

    /// Never true: the sentinel is always present.
    pub fn is_empty(self) -> bool {
        false
    }

    /// Number of payload entries, excluding the sentinel.
    pub fn entry_count(self) -> u32 {
        self.len.saturating_sub(1)
    }
}

/// Declare `name` as a `linkonce` constant array of `entry_count + 1`
/// entries of `box_info`. Identical tables from several units collapse to one.
pub(crate) fn declare_box_info(
    module: &mut IrModule,
    box_info: LlTypeId,
    name: &str,
    entry_count: u32,
) -> Result<BoxInfoTable, InternalError> {
    let len = entry_count
        .checked_add(1)
        .ok_or_else(|| InternalError::BoxInfoOverflow {
            name: name.to_owned(),
            entry_count,
        })?;
    let ty = module.array_type(box_info, len);
    let global = module.declare_global(name, ty, Linkage::LinkOnceAny, true)?;
    trace!(name, len, "declared box info");
    Ok(BoxInfoTable { global, len })
}

/// Append the sentinel to `entries` and install them as the initializer.
pub(crate) fn init_box_info(
    module: &mut IrModule,
    box_info: LlTypeId,
    table: BoxInfoTable,
    mut entries: Vec<Constant>,
) -> Result<BoxInfoTable, InternalError> {
    if entries.len() != table.entry_count() as usize {
        return Err(InternalError::BoxInfoLength {
            name: module.global(table.global).name.clone(),
            declared: table.len,
            provided: entries.len(),
        });
    }
    entries.push(Constant::Null(box_info));
    let ty = module.global(table.global).ty;
    module.set_initializer(
        table.global,
        Constant::Array {
            ty,
            elements: entries,
        },
    )?;
    Ok(table)
}
