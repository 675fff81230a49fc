//! Lowering semantic types to backend types.
//!
//! | Semantic type | Backend type |
//! |---------------|--------------|
//! | `Int` | `i64` |
//! | `Real` | `double` |
//! | `Bool` | `i1` |
//! | `Byte` | `i8` |
//! | `Symbol` | `i32` |
//! | `Unit` | `void` as a return type, `{}` elsewhere |
//! | class, `Someobject` | `ptr` |
//! | value type | named struct of its fields |
//! | protocol, `Something` | `%Box` |
//! | `?T` for a reference `T` | `ptr` (null is none) |
//! | `?T` otherwise | `{ i1, T }` |
//! | generic parameter | its reified argument, `%Box` when unreified |

use ember_backend::{IrModule, LlTypeId};
use ember_types::{EntityStore, FnId, FunctionKind, Idx, Owner, TypeKind, ValueTypeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::InternalError;

/// Payload words carried inline by a `%Box`.
const BOX_PAYLOAD_WORDS: u32 = 4;

/// Which function and reification a type computation is performed for.
///
/// Passed explicitly to every lowering call; generic parameters resolve
/// through `args`.
#[derive(Debug, Clone, Copy)]
pub struct ReificationCtx<'a> {
    pub function: FnId,
    pub reification: usize,
    pub args: &'a [Idx],
}

impl<'a> ReificationCtx<'a> {
    /// Context for reification `index` of `function`.
    ///
    /// A reification must carry either no arguments (the unspecific one) or
    /// exactly one per generic parameter.
    pub fn new(store: &'a EntityStore, function: FnId, index: usize) -> Result<Self, InternalError> {
        let f = store.function(function);
        let args = f.reification(index).args.as_slice();
        if !args.is_empty() && args.len() != f.generic_params as usize {
            return Err(InternalError::MalformedReification {
                function: store.name(f.name).to_owned(),
                index,
                expected: f.generic_params,
                found: args.len(),
            });
        }
        Ok(Self {
            function,
            reification: index,
            args,
        })
    }
}

/// Named record types shared with the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeTypes {
    /// `%ClassInfo = { ptr superclass, ptr dispatch_table, ptr protocol_table }`
    pub class_info: LlTypeId,
    /// `%BoxInfo = { ptr protocol_table, ptr release }`
    pub box_info: LlTypeId,
    /// `%ProtocolConformance = { ptr dispatch_table, ptr box_info, ptr protocol_id }`
    pub conformance: LlTypeId,
    /// `%Box = { ptr box_info, [4 x i64] }`
    pub boxed: LlTypeId,
}

/// Where a lowered type appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Return,
    Value,
}

pub struct TypeLowering {
    runtime: RuntimeTypes,
    value_types: FxHashMap<ValueTypeId, LlTypeId>,
}

impl TypeLowering {
    /// Register the runtime record types in `module`.
    pub fn new(module: &mut IrModule) -> Self {
        let ptr = LlTypeId::PTR;
        let payload = module.array_type(LlTypeId::I64, BOX_PAYLOAD_WORDS);
        let runtime = RuntimeTypes {
            class_info: module.named_struct("ClassInfo", &[ptr, ptr, ptr]),
            box_info: module.named_struct("BoxInfo", &[ptr, ptr]),
            conformance: module.named_struct("ProtocolConformance", &[ptr, ptr, ptr]),
            boxed: module.named_struct("Box", &[ptr, payload]),
        };
        Self {
            runtime,
            value_types: FxHashMap::default(),
        }
    }

    pub fn runtime_types(&self) -> RuntimeTypes {
        self.runtime
    }

    /// Lower a type in value position.
    pub fn lower(&mut self, module: &mut IrModule, store: &EntityStore, ty: Idx, ctx: &ReificationCtx<'_>) -> LlTypeId {
        self.lower_at(module, store, ty, ctx.args, Position::Value)
    }

    /// Backend signature of the reified function.
    ///
    /// The receiver, when present, is always passed as `ptr` at index 0.
    pub fn function_type(&mut self, module: &mut IrModule, store: &EntityStore, ctx: &ReificationCtx<'_>) -> LlTypeId {
        let f = store.function(ctx.function);
        let mut params: SmallVec<[LlTypeId; 8]> = SmallVec::new();
        if f.has_receiver() {
            params.push(LlTypeId::PTR);
        }
        for param in &f.params {
            params.push(self.lower_at(module, store, param.ty, ctx.args, Position::Value));
        }

        let ret = match (f.kind, f.owner) {
            (FunctionKind::Initializer, Some(Owner::Class(_))) => LlTypeId::PTR,
            (FunctionKind::Initializer, _) => LlTypeId::VOID,
            _ => self.lower_at(module, store, f.return_type, ctx.args, Position::Return),
        };
        module.function_type(ret, &params)
    }

    fn lower_at(
        &mut self,
        module: &mut IrModule,
        store: &EntityStore,
        ty: Idx,
        args: &[Idx],
        position: Position,
    ) -> LlTypeId {
        match store.pool().kind(ty) {
            TypeKind::Int => LlTypeId::I64,
            TypeKind::Real => LlTypeId::F64,
            TypeKind::Bool => LlTypeId::I1,
            TypeKind::Byte => LlTypeId::I8,
            TypeKind::Symbol => LlTypeId::I32,
            TypeKind::Unit => match position {
                Position::Return => LlTypeId::VOID,
                Position::Value => module.struct_type(&[]),
            },
            TypeKind::Class(_) | TypeKind::Someobject => LlTypeId::PTR,
            TypeKind::Something | TypeKind::Protocol(_) => self.runtime.boxed,
            TypeKind::ValueType(id) => self.value_type(module, store, id),
            TypeKind::Optional(inner) => {
                if store.pool().is_reference(inner) {
                    LlTypeId::PTR
                } else {
                    let inner = self.lower_at(module, store, inner, args, Position::Value);
                    module.struct_type(&[LlTypeId::I1, inner])
                }
            }
            TypeKind::GenericParam(index) => match args.get(index as usize) {
                Some(&arg) => self.lower_at(module, store, arg, &[], position),
                None => self.runtime.boxed,
            },
        }
    }

    fn value_type(&mut self, module: &mut IrModule, store: &EntityStore, id: ValueTypeId) -> LlTypeId {
        if let Some(&ty) = self.value_types.get(&id) {
            return ty;
        }
        let value_type = store.value_type(id);
        let fields: SmallVec<[LlTypeId; 8]> = value_type
            .fields
            .iter()
            .map(|&field| self.lower_at(module, store, field, &[], Position::Value))
            .collect();
        let package = store.name(store.package(value_type.package).name);
        let name = format!("{package}.{}", store.name(value_type.name));
        let ty = module.named_struct(&name, &fields);
        self.value_types.insert(id, ty);
        ty
    }
}
