//! Opaque ID newtypes for entities stored in an [`IrModule`](crate::IrModule).
//!
//! Each ID is a `u32` index into the corresponding module table. Callers
//! only ever hold these `Copy` handles; the declarations themselves stay
//! inside the module.

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u32);

        impl $name {
            /// The raw index.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            #[expect(
                clippy::cast_possible_truncation,
                reason = "module tables never exceed u32::MAX entries"
            )]
            pub(crate) fn from_index(index: usize) -> Self {
                debug_assert!(
                    u32::try_from(index).is_ok(),
                    concat!(stringify!($name), " index overflow")
                );
                Self(index as u32)
            }

            #[inline]
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Handle to an interned low-level type.
    LlTypeId
);

define_id!(
    /// Handle to a declared function.
    FunctionId
);

define_id!(
    /// Handle to a declared global variable.
    GlobalId
);

// Types pre-interned by `IrModule::new`, in this order.
impl LlTypeId {
    pub const VOID: Self = Self(0);
    pub const I1: Self = Self(1);
    pub const I8: Self = Self(2);
    pub const I32: Self = Self(3);
    pub const I64: Self = Self(4);
    pub const F64: Self = Self(5);
    pub const PTR: Self = Self(6);
}
