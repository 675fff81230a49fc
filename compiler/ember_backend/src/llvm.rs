//! Emission of a declared [`IrModule`] into an LLVM module via inkwell.
//!
//! Only compiled with the `llvm` feature. The body-generating stage attaches
//! bodies to the emitted declarations afterwards; this pass never creates
//! basic blocks.

use inkwell::attributes::{Attribute, AttributeLoc};
use inkwell::context::Context;
use inkwell::module::{Linkage as LlvmLinkage, Module};
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType};
use inkwell::values::{BasicValueEnum, FunctionValue, GlobalValue};
use inkwell::AddressSpace;

use crate::attrs::ParamAttrs;
use crate::constant::Constant;
use crate::error::ModuleError;
use crate::ids::LlTypeId;
use crate::module::{IrModule, Linkage};
use crate::types::LlType;

#[derive(Clone, Copy)]
enum Lowered<'ctx> {
    Void,
    Basic(BasicTypeEnum<'ctx>),
    Function(FunctionType<'ctx>),
}

struct Emitter<'a, 'ctx> {
    context: &'ctx Context,
    source: &'a IrModule,
    types: Vec<Lowered<'ctx>>,
    functions: Vec<FunctionValue<'ctx>>,
    globals: Vec<GlobalValue<'ctx>>,
}

/// Emit every type, function and global of `source` into a new LLVM module.
pub fn emit<'ctx>(source: &IrModule, context: &'ctx Context) -> Result<Module<'ctx>, ModuleError> {
    let module = context.create_module(source.name());
    let mut emitter = Emitter {
        context,
        source,
        types: Vec::with_capacity(source.type_count()),
        functions: Vec::with_capacity(source.function_count()),
        globals: Vec::with_capacity(source.global_count()),
    };

    // Type ids are assigned bottom-up, so every operand precedes its user.
    for index in 0..source.type_count() {
        let lowered = emitter.lower_type(LlTypeId::from_index(index))?;
        emitter.types.push(lowered);
    }

    for (_, decl) in source.globals() {
        let ty = emitter.basic(decl.ty)?;
        let global = module.add_global(ty, Some(AddressSpace::default()), &decl.name);
        global.set_linkage(linkage(decl.linkage));
        global.set_constant(decl.constant);
        emitter.globals.push(global);
    }

    for (_, decl) in source.functions() {
        let Lowered::Function(fn_type) = emitter.types[decl.ty.index()] else {
            return Err(ModuleError::Emit(format!("`{}` has no function type", decl.name)));
        };
        let func = module.add_function(&decl.name, fn_type, Some(linkage(decl.linkage)));
        for name in decl.attrs.names() {
            func.add_attribute(AttributeLoc::Function, emitter.enum_attribute(name));
        }
        for (index, attrs) in decl.param_attrs.iter().enumerate() {
            emitter.add_param_attrs(func, index, *attrs);
        }
        emitter.functions.push(func);
    }

    // Initializers may reference any global or function, so they go last.
    for (id, decl) in source.globals() {
        if let Some(init) = &decl.initializer {
            let value = emitter.constant(init)?;
            emitter.globals[id.index()].set_initializer(&value);
        }
    }

    Ok(module)
}

fn linkage(linkage: Linkage) -> LlvmLinkage {
    match linkage {
        Linkage::External => LlvmLinkage::External,
        Linkage::Private => LlvmLinkage::Private,
        Linkage::LinkOnceAny => LlvmLinkage::LinkOnceAny,
    }
}

impl<'ctx> Emitter<'_, 'ctx> {
    fn lower_type(&self, id: LlTypeId) -> Result<Lowered<'ctx>, ModuleError> {
        let lowered = match self.source.ty(id) {
            LlType::Void => Lowered::Void,
            LlType::Int { bits } => Lowered::Basic(self.context.custom_width_int_type(*bits).into()),
            LlType::Double => Lowered::Basic(self.context.f64_type().into()),
            LlType::Ptr => Lowered::Basic(self.context.ptr_type(AddressSpace::default()).into()),
            LlType::Struct { name, fields } => {
                let fields = fields
                    .iter()
                    .map(|&f| self.basic(f))
                    .collect::<Result<Vec<_>, _>>()?;
                match name {
                    Some(name) => {
                        let st = self.context.opaque_struct_type(name);
                        st.set_body(&fields, false);
                        Lowered::Basic(st.into())
                    }
                    None => Lowered::Basic(self.context.struct_type(&fields, false).into()),
                }
            }
            LlType::Array { element, len } => Lowered::Basic(self.basic(*element)?.array_type(*len).into()),
            LlType::Function { ret, params } => {
                let params = params
                    .iter()
                    .map(|&p| self.basic(p).map(BasicMetadataTypeEnum::from))
                    .collect::<Result<Vec<_>, _>>()?;
                let fn_type = match self.types[ret.index()] {
                    Lowered::Void => self.context.void_type().fn_type(&params, false),
                    Lowered::Basic(ret) => ret.fn_type(&params, false),
                    Lowered::Function(_) => {
                        return Err(ModuleError::Emit("function returning a function".to_owned()))
                    }
                };
                Lowered::Function(fn_type)
            }
        };
        Ok(lowered)
    }

    fn basic(&self, id: LlTypeId) -> Result<BasicTypeEnum<'ctx>, ModuleError> {
        match self.types.get(id.index()) {
            Some(Lowered::Basic(ty)) => Ok(*ty),
            _ => Err(ModuleError::Emit(format!(
                "`{}` is not a first-class type",
                self.source.type_name(id)
            ))),
        }
    }

    fn enum_attribute(&self, name: &str) -> Attribute {
        let kind = Attribute::get_named_enum_kind_id(name);
        self.context.create_enum_attribute(kind, 0)
    }

    #[expect(clippy::cast_possible_truncation, reason = "parameter counts fit in u32")]
    fn add_param_attrs(&self, func: FunctionValue<'ctx>, index: usize, attrs: ParamAttrs) {
        for name in attrs.names() {
            func.add_attribute(AttributeLoc::Param(index as u32), self.enum_attribute(name));
        }
    }

    fn constant(&self, constant: &Constant) -> Result<BasicValueEnum<'ctx>, ModuleError> {
        let ty = self.basic(constant.ty())?;
        if constant.is_zero() {
            return Ok(ty.const_zero());
        }
        let value = match constant {
            Constant::Null(_) => ty.const_zero(),
            Constant::Int { value, .. } => ty.into_int_type().const_int(*value as u64, true).into(),
            Constant::Struct { fields, .. } => {
                let fields = fields
                    .iter()
                    .map(|f| self.constant(f))
                    .collect::<Result<Vec<_>, _>>()?;
                ty.into_struct_type().const_named_struct(&fields).into()
            }
            Constant::Array { elements, .. } => {
                let element_ty = ty.into_array_type().get_element_type();
                let values = elements
                    .iter()
                    .map(|e| self.constant(e))
                    .collect::<Result<Vec<_>, _>>()?;
                match element_ty {
                    BasicTypeEnum::StructType(st) => {
                        let values: Vec<_> = values.into_iter().map(BasicValueEnum::into_struct_value).collect();
                        st.const_array(&values).into()
                    }
                    BasicTypeEnum::PointerType(pt) => {
                        let values: Vec<_> = values.into_iter().map(BasicValueEnum::into_pointer_value).collect();
                        pt.const_array(&values).into()
                    }
                    BasicTypeEnum::IntType(it) => {
                        let values: Vec<_> = values.into_iter().map(BasicValueEnum::into_int_value).collect();
                        it.const_array(&values).into()
                    }
                    other => {
                        return Err(ModuleError::Emit(format!(
                            "unsupported array element type {other:?}"
                        )))
                    }
                }
            }
            Constant::Global(id) => self.globals[id.index()].as_pointer_value().into(),
            Constant::Function(id) => self.functions[id.index()]
                .as_global_value()
                .as_pointer_value()
                .into(),
        };
        Ok(value)
    }
}
