//! Entity handles into the [`EntityStore`](crate::EntityStore) arenas.

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            #[expect(
                clippy::cast_possible_truncation,
                reason = "entity arenas never exceed u32::MAX entries"
            )]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            #[inline]
            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

entity_id!(
    /// A compilation unit.
    PackageId
);
entity_id!(
    /// A free function, method, type method or initializer.
    FnId
);
entity_id!(ClassId);
entity_id!(ValueTypeId);
entity_id!(ProtocolId);

/// A class dispatch table produced by declaration.
///
/// Created by the dispatch delegator; several leaf classes may share one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TableId(u32);

impl TableId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}
