//! String interner for entity and package names.
//!
//! Names are interned once while earlier stages build the entity store and
//! looked up many times while mangling symbols. Strings are leaked so
//! lookups hand out `&'static str` without holding the lock.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::Name;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternError {
    #[error("string interner is full: {count} names already interned")]
    Full { count: usize },
}

#[derive(Default)]
struct Table {
    ids: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
///
/// Declaration itself is single-threaded; the lock lets the store be shared
/// with later stages that are not.
pub struct StringInterner {
    table: RwLock<Table>,
}

impl StringInterner {
    /// Create an interner holding only the empty string.
    pub fn new() -> Self {
        let mut table = Table::default();
        table.ids.insert("", Name::EMPTY);
        table.strings.push("");
        Self {
            table: RwLock::new(table),
        }
    }

    /// Intern `s`, failing only when the index space is exhausted.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(&name) = self.table.read().ids.get(s) {
            return Ok(name);
        }

        let mut table = self.table.write();
        // Another writer may have won the race for the lock.
        if let Some(&name) = table.ids.get(s) {
            return Ok(name);
        }
        let count = table.strings.len();
        let raw = u32::try_from(count).map_err(|_| InternError::Full { count })?;
        let name = Name::from_raw(raw);
        let leaked: &'static str = Box::leak(s.into());
        table.strings.push(leaked);
        table.ids.insert(leaked, name);
        Ok(name)
    }

    /// Intern `s`.
    ///
    /// # Panics
    /// Panics once more than `u32::MAX` names exist.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// The string behind `name`.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table.read().strings[name.index()]
    }

    /// Number of interned strings, the empty string included.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Never true: the empty string is always present.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
