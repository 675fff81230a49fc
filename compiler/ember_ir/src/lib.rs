//! Ember IR - shared identifier types.
//!
//! Every later stage refers to declared entities by interned [`Name`]s
//! rather than owned strings. Identifiers become `Name(u32)` with O(1) equality, usable as map keys and
//! in serialized incremental-compilation caches (feature `cache`).

mod interner;
mod name;

pub use interner::{InternError, StringInterner};
pub use name::Name;
