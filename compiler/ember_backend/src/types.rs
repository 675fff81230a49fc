//! Low-level type representation.
//!
//! Types are hash-consed: structurally equal types share one [`LlTypeId`],
//! so type equality is an index comparison. Named structs are the one
//! exception: they are keyed by name, like LLVM identified structs.

use rustc_hash::FxHashMap;

use crate::ids::LlTypeId;

/// A low-level (backend) type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LlType {
    Void,
    Int { bits: u32 },
    Double,
    /// Opaque pointer.
    Ptr,
    Struct {
        name: Option<String>,
        fields: Vec<LlTypeId>,
    },
    Array { element: LlTypeId, len: u32 },
    Function {
        ret: LlTypeId,
        params: Vec<LlTypeId>,
    },
}

/// Hash-consing table owned by the module.
pub(crate) struct TypeTable {
    types: Vec<LlType>,
    lookup: FxHashMap<LlType, LlTypeId>,
    named: FxHashMap<String, LlTypeId>,
}

impl TypeTable {
    pub(crate) fn new() -> Self {
        let mut table = Self {
            types: Vec::new(),
            lookup: FxHashMap::default(),
            named: FxHashMap::default(),
        };
        // Must match the `LlTypeId` constants.
        table.intern(LlType::Void);
        table.intern(LlType::Int { bits: 1 });
        table.intern(LlType::Int { bits: 8 });
        table.intern(LlType::Int { bits: 32 });
        table.intern(LlType::Int { bits: 64 });
        table.intern(LlType::Double);
        table.intern(LlType::Ptr);
        table
    }

    pub(crate) fn intern(&mut self, ty: LlType) -> LlTypeId {
        if let Some(&id) = self.lookup.get(&ty) {
            return id;
        }
        let id = LlTypeId::from_index(self.types.len());
        self.types.push(ty.clone());
        self.lookup.insert(ty, id);
        id
    }

    /// Get or create the identified struct `name`.
    ///
    /// The first registration fixes the body; later calls return the
    /// existing type unchanged.
    pub(crate) fn named_struct(&mut self, name: &str, fields: Vec<LlTypeId>) -> LlTypeId {
        if let Some(&id) = self.named.get(name) {
            return id;
        }
        let id = self.intern(LlType::Struct {
            name: Some(name.to_owned()),
            fields,
        });
        self.named.insert(name.to_owned(), id);
        id
    }

    pub(crate) fn get(&self, id: LlTypeId) -> &LlType {
        &self.types[id.index()]
    }

    pub(crate) fn len(&self) -> usize {
        self.types.len()
    }

    /// Render a type the way LLVM textual IR spells it.
    pub(crate) fn render(&self, id: LlTypeId) -> String {
        match self.get(id) {
            LlType::Void => "void".to_owned(),
            LlType::Int { bits } => format!("i{bits}"),
            LlType::Double => "double".to_owned(),
            LlType::Ptr => "ptr".to_owned(),
            LlType::Struct { name: Some(name), .. } => format!("%{name}"),
            LlType::Struct { name: None, fields } => {
                if fields.is_empty() {
                    return "{}".to_owned();
                }
                let fields: Vec<String> = fields.iter().map(|&f| self.render(f)).collect();
                format!("{{ {} }}", fields.join(", "))
            }
            LlType::Array { element, len } => format!("[{len} x {}]", self.render(*element)),
            LlType::Function { ret, params } => {
                let params: Vec<String> = params.iter().map(|&p| self.render(p)).collect();
                format!("{} ({})", self.render(*ret), params.join(", "))
            }
        }
    }
}
