//! Unified type index handle.
//!
//! All semantic types live in a [`Pool`](crate::Pool) and are referenced by
//! a 32-bit index. Primitive types have fixed indices so they can be named
//! without a pool.

use std::fmt;

/// A 32-bit index into the type pool.
///
/// Types are compared by index equality, not structural comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Primitive Types (indices 0-7) ===

    /// 64-bit signed integer.
    pub const INT: Self = Self(0);
    /// 64-bit floating point.
    pub const REAL: Self = Self(1);
    pub const BOOL: Self = Self(2);
    pub const BYTE: Self = Self(3);
    /// A single Unicode scalar.
    pub const SYMBOL: Self = Self(4);
    /// No value. Only meaningful as a return type.
    pub const UNIT: Self = Self(5);
    /// Any value, stored in a box.
    pub const SOMETHING: Self = Self(6);
    /// Any class instance.
    pub const SOMEOBJECT: Self = Self(7);

    /// Number of pre-interned primitive types.
    pub const PRIMITIVE_COUNT: u32 = 8;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    #[inline]
    pub const fn is_unit(self) -> bool {
        self.0 == Self::UNIT.0
    }

    /// Source-level name of a primitive, `None` for pool-allocated types.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("Int"),
            1 => Some("Real"),
            2 => Some("Bool"),
            3 => Some("Byte"),
            4 => Some("Symbol"),
            5 => Some("Unit"),
            6 => Some("Something"),
            7 => Some("Someobject"),
            _ => None,
        }
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Idx::{name}"),
            None => write!(f, "Idx({})", self.0),
        }
    }
}
