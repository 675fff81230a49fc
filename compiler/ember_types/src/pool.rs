//! The semantic type pool.

use rustc_hash::FxHashMap;

use crate::ids::{ClassId, ProtocolId, ValueTypeId};
use crate::idx::Idx;

/// Structure of a semantic type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Int,
    Real,
    Bool,
    Byte,
    Symbol,
    Unit,
    Something,
    Someobject,
    Class(ClassId),
    ValueType(ValueTypeId),
    Protocol(ProtocolId),
    Optional(Idx),
    /// The n-th generic parameter of the function being reified.
    GenericParam(u32),
}

/// Interning pool: every distinct [`TypeKind`] has exactly one [`Idx`].
pub struct Pool {
    kinds: Vec<TypeKind>,
    lookup: FxHashMap<TypeKind, Idx>,
}

impl Pool {
    pub fn new() -> Self {
        let mut pool = Self {
            kinds: Vec::with_capacity(64),
            lookup: FxHashMap::default(),
        };
        // Must match the `Idx` primitive constants.
        for kind in [
            TypeKind::Int,
            TypeKind::Real,
            TypeKind::Bool,
            TypeKind::Byte,
            TypeKind::Symbol,
            TypeKind::Unit,
            TypeKind::Something,
            TypeKind::Someobject,
        ] {
            pool.intern(kind);
        }
        debug_assert_eq!(pool.kinds.len(), Idx::PRIMITIVE_COUNT as usize);
        pool
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "the pool never exceeds u32::MAX types"
    )]
    pub fn intern(&mut self, kind: TypeKind) -> Idx {
        if let Some(&idx) = self.lookup.get(&kind) {
            return idx;
        }
        let idx = Idx::from_raw(self.kinds.len() as u32);
        self.kinds.push(kind);
        self.lookup.insert(kind, idx);
        idx
    }

    pub fn kind(&self, idx: Idx) -> TypeKind {
        self.kinds[idx.raw() as usize]
    }

    pub fn class(&mut self, id: ClassId) -> Idx {
        self.intern(TypeKind::Class(id))
    }

    pub fn value_type(&mut self, id: ValueTypeId) -> Idx {
        self.intern(TypeKind::ValueType(id))
    }

    pub fn protocol(&mut self, id: ProtocolId) -> Idx {
        self.intern(TypeKind::Protocol(id))
    }

    pub fn optional(&mut self, inner: Idx) -> Idx {
        self.intern(TypeKind::Optional(inner))
    }

    pub fn generic_param(&mut self, index: u32) -> Idx {
        self.intern(TypeKind::GenericParam(index))
    }

    /// True for class instance types.
    pub fn is_class(&self, idx: Idx) -> bool {
        matches!(self.kind(idx), TypeKind::Class(_))
    }

    /// True for types whose values are heap references (classes, `Someobject`).
    pub fn is_reference(&self, idx: Idx) -> bool {
        matches!(self.kind(idx), TypeKind::Class(_) | TypeKind::Someobject)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}
