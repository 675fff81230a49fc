//! The output module: every declared type, function and global.
//!
//! `IrModule` is the single shared mutable resource of declaration. It is
//! owned by one compilation thread and mutated through `&mut self`.
//!
//! Declaration is idempotent: declaring a symbol that already exists with
//! the same type, linkage and attributes returns the existing handle.
//! Declaring it with any difference is a [`ModuleError`], since two
//! diverging declarations of one symbol would corrupt the binary contract.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::attrs::{FnAttrs, ParamAttrs};
use crate::constant::Constant;
use crate::error::ModuleError;
use crate::ids::{FunctionId, GlobalId, LlTypeId};
use crate::types::{LlType, TypeTable};

/// Symbol linkage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Linkage {
    /// Visible to and resolved by the linker.
    External,
    /// Local to this module.
    Private,
    /// Identical definitions from several modules collapse into one.
    LinkOnceAny,
}

impl Linkage {
    /// The LLVM textual keyword, empty for the default (`external`).
    pub fn keyword(self) -> &'static str {
        match self {
            Linkage::External => "",
            Linkage::Private => "private",
            Linkage::LinkOnceAny => "linkonce",
        }
    }
}

/// A bodiless function declaration.
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub name: String,
    /// Always an [`LlType::Function`].
    pub ty: LlTypeId,
    pub linkage: Linkage,
    pub attrs: FnAttrs,
    /// One entry per parameter position.
    pub param_attrs: Vec<ParamAttrs>,
}

/// A global variable declaration, optionally initialized.
#[derive(Clone, Debug)]
pub struct GlobalDecl {
    pub name: String,
    pub ty: LlTypeId,
    pub linkage: Linkage,
    pub constant: bool,
    pub initializer: Option<Constant>,
}

#[derive(Clone, Copy)]
enum Symbol {
    Function(FunctionId),
    Global(GlobalId),
}

/// In-memory module of declarations.
pub struct IrModule {
    name: String,
    types: TypeTable,
    functions: Vec<FunctionDecl>,
    globals: Vec<GlobalDecl>,
    symbols: FxHashMap<String, Symbol>,
}

impl IrModule {
    /// Create an empty module with the primitive types pre-interned.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            types: TypeTable::new(),
            functions: Vec::new(),
            globals: Vec::new(),
            symbols: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    /// Intern an arbitrary type.
    pub fn intern_type(&mut self, ty: LlType) -> LlTypeId {
        self.types.intern(ty)
    }

    /// Literal (anonymous) struct type.
    pub fn struct_type(&mut self, fields: &[LlTypeId]) -> LlTypeId {
        self.types.intern(LlType::Struct {
            name: None,
            fields: fields.to_vec(),
        })
    }

    /// Get or create an identified struct type.
    pub fn named_struct(&mut self, name: &str, fields: &[LlTypeId]) -> LlTypeId {
        self.types.named_struct(name, fields.to_vec())
    }

    pub fn array_type(&mut self, element: LlTypeId, len: u32) -> LlTypeId {
        self.types.intern(LlType::Array { element, len })
    }

    pub fn function_type(&mut self, ret: LlTypeId, params: &[LlTypeId]) -> LlTypeId {
        self.types.intern(LlType::Function {
            ret,
            params: params.to_vec(),
        })
    }

    pub fn ty(&self, id: LlTypeId) -> &LlType {
        self.types.get(id)
    }

    /// Textual rendering of a type (`ptr`, `[2 x %BoxInfo]`, ...).
    pub fn type_name(&self, id: LlTypeId) -> String {
        self.types.render(id)
    }

    /// Number of interned types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // -----------------------------------------------------------------------
    // Functions
    // -----------------------------------------------------------------------

    /// Declare a function without a body and without attributes.
    ///
    /// Shorthand for [`declare_function_with_attrs`](Self::declare_function_with_attrs)
    /// with empty attribute sets.
    pub fn declare_function(
        &mut self,
        name: &str,
        ty: LlTypeId,
        linkage: Linkage,
    ) -> Result<FunctionId, ModuleError> {
        self.declare_function_with_attrs(name, ty, linkage, FnAttrs::empty(), &[])
    }

    /// Declare a function without a body, together with its attributes.
    ///
    /// `param_attrs` may be shorter than the parameter list; missing
    /// positions get no attributes. Returns the existing declaration when
    /// `name` was already declared with the same type, linkage, function
    /// attributes and parameter attributes. Any difference is a
    /// [`ModuleError::ConflictingFunction`].
    pub fn declare_function_with_attrs(
        &mut self,
        name: &str,
        ty: LlTypeId,
        linkage: Linkage,
        attrs: FnAttrs,
        param_attrs: &[ParamAttrs],
    ) -> Result<FunctionId, ModuleError> {
        let LlType::Function { params, .. } = self.types.get(ty) else {
            return Err(ModuleError::NotAFunctionType {
                name: name.to_owned(),
                ty: self.type_name(ty),
            });
        };
        let param_count = params.len();
        if param_attrs.len() > param_count {
            return Err(ModuleError::ParamIndex {
                name: name.to_owned(),
                index: u32::try_from(param_count).unwrap_or(u32::MAX),
                count: param_count,
            });
        }
        let mut requested_params = param_attrs.to_vec();
        requested_params.resize(param_count, ParamAttrs::empty());

        match self.symbols.get(name) {
            Some(&Symbol::Function(existing)) => {
                let decl = &self.functions[existing.index()];
                if decl.ty == ty
                    && decl.linkage == linkage
                    && decl.attrs == attrs
                    && decl.param_attrs == requested_params
                {
                    trace!(name, "reusing existing function declaration");
                    return Ok(existing);
                }
                return Err(ModuleError::ConflictingFunction {
                    name: name.to_owned(),
                    existing: self.describe_function(decl.ty, decl.linkage, decl.attrs, &decl.param_attrs),
                    requested: self.describe_function(ty, linkage, attrs, &requested_params),
                });
            }
            Some(&Symbol::Global(existing)) => {
                let decl = &self.globals[existing.index()];
                return Err(ModuleError::ConflictingFunction {
                    name: name.to_owned(),
                    existing: format!("global {}", self.describe(decl.ty, decl.linkage)),
                    requested: self.describe_function(ty, linkage, attrs, &requested_params),
                });
            }
            None => {}
        }

        let id = FunctionId::from_index(self.functions.len());
        self.functions.push(FunctionDecl {
            name: name.to_owned(),
            ty,
            linkage,
            attrs,
            param_attrs: requested_params,
        });
        self.symbols.insert(name.to_owned(), Symbol::Function(id));
        trace!(name, ty = %self.type_name(ty), "declared function");
        Ok(id)
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        match self.symbols.get(name) {
            Some(&Symbol::Function(id)) => Some(id),
            _ => None,
        }
    }

    pub fn function(&self, id: FunctionId) -> &FunctionDecl {
        &self.functions[id.index()]
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &FunctionDecl)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, decl)| (FunctionId::from_index(i), decl))
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    // -----------------------------------------------------------------------
    // Globals
    // -----------------------------------------------------------------------

    /// Declare a global without an initializer.
    ///
    /// Same reuse rule as [`declare_function`](Self::declare_function):
    /// identical type, linkage and constness return the existing global.
    pub fn declare_global(
        &mut self,
        name: &str,
        ty: LlTypeId,
        linkage: Linkage,
        constant: bool,
    ) -> Result<GlobalId, ModuleError> {
        match self.symbols.get(name) {
            Some(&Symbol::Global(existing)) => {
                let decl = &self.globals[existing.index()];
                if decl.ty == ty && decl.linkage == linkage && decl.constant == constant {
                    trace!(name, "reusing existing global declaration");
                    return Ok(existing);
                }
                return Err(ModuleError::ConflictingGlobal {
                    name: name.to_owned(),
                    existing: self.describe(decl.ty, decl.linkage),
                    requested: self.describe(ty, linkage),
                });
            }
            Some(&Symbol::Function(existing)) => {
                let decl = &self.functions[existing.index()];
                return Err(ModuleError::ConflictingGlobal {
                    name: name.to_owned(),
                    existing: format!("function {}", self.describe(decl.ty, decl.linkage)),
                    requested: self.describe(ty, linkage),
                });
            }
            None => {}
        }

        let id = GlobalId::from_index(self.globals.len());
        self.globals.push(GlobalDecl {
            name: name.to_owned(),
            ty,
            linkage,
            constant,
            initializer: None,
        });
        self.symbols.insert(name.to_owned(), Symbol::Global(id));
        trace!(name, ty = %self.type_name(ty), "declared global");
        Ok(id)
    }

    pub fn get_global(&self, name: &str) -> Option<GlobalId> {
        match self.symbols.get(name) {
            Some(&Symbol::Global(id)) => Some(id),
            _ => None,
        }
    }

    pub fn global(&self, id: GlobalId) -> &GlobalDecl {
        &self.globals[id.index()]
    }

    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &GlobalDecl)> {
        self.globals
            .iter()
            .enumerate()
            .map(|(i, decl)| (GlobalId::from_index(i), decl))
    }

    pub fn global_count(&self) -> usize {
        self.globals.len()
    }

    /// Set a global's initializer.
    ///
    /// The constant's type must equal the global's type, and an array
    /// constant must have exactly the declared number of elements. Setting
    /// an identical initializer again is a no-op.
    pub fn set_initializer(&mut self, id: GlobalId, init: Constant) -> Result<(), ModuleError> {
        let decl = &self.globals[id.index()];
        if init.ty() != decl.ty || !self.array_len_matches(&init) {
            return Err(ModuleError::InitializerType {
                name: decl.name.clone(),
                expected: self.type_name(decl.ty),
                found: self.describe_constant(&init),
            });
        }
        match &decl.initializer {
            Some(existing) if *existing == init => return Ok(()),
            Some(_) => {
                return Err(ModuleError::ConflictingInitializer {
                    name: decl.name.clone(),
                })
            }
            None => {}
        }
        self.globals[id.index()].initializer = Some(init);
        Ok(())
    }

    fn array_len_matches(&self, init: &Constant) -> bool {
        match (init, self.types.get(init.ty())) {
            (Constant::Array { elements, .. }, LlType::Array { len, .. }) => {
                elements.len() == *len as usize
            }
            (Constant::Array { .. }, _) => false,
            _ => true,
        }
    }

    fn describe(&self, ty: LlTypeId, linkage: Linkage) -> String {
        match linkage.keyword() {
            "" => self.type_name(ty),
            keyword => format!("{keyword} {}", self.type_name(ty)),
        }
    }

    /// A parameter type followed by its attribute names, e.g. `ptr nocapture`.
    pub(crate) fn render_param(&self, ty: LlTypeId, attrs: ParamAttrs) -> String {
        let mut param = self.type_name(ty);
        for attr in attrs.names() {
            param.push(' ');
            param.push_str(attr);
        }
        param
    }

    fn describe_function(
        &self,
        ty: LlTypeId,
        linkage: Linkage,
        attrs: FnAttrs,
        param_attrs: &[ParamAttrs],
    ) -> String {
        let LlType::Function { ret, params } = self.types.get(ty) else {
            return self.describe(ty, linkage);
        };
        let params: Vec<String> = params
            .iter()
            .zip(param_attrs)
            .map(|(&p, &a)| self.render_param(p, a))
            .collect();
        let mut text = String::new();
        if !linkage.keyword().is_empty() {
            text.push_str(linkage.keyword());
            text.push(' ');
        }
        text.push_str(&self.type_name(*ret));
        text.push_str(" (");
        text.push_str(&params.join(", "));
        text.push(')');
        for attr in attrs.names() {
            text.push(' ');
            text.push_str(attr);
        }
        text
    }

    fn describe_constant(&self, init: &Constant) -> String {
        match init.elements() {
            Some(elements) => format!(
                "{} with {} elements",
                self.type_name(init.ty()),
                elements.len()
            ),
            None => self.type_name(init.ty()),
        }
    }
}
