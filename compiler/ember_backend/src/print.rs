//! Textual dump of a module in LLVM IR syntax.
//!
//! Used for debugging (`EMBER_DEBUG_DECLS`) and for readable test failures.
//! Only declarations exist at this stage, so the dump never contains bodies.

use std::fmt::{self, Write as _};

use crate::constant::Constant;
use crate::module::IrModule;
use crate::types::LlType;

impl IrModule {
    fn render_constant(&self, constant: &Constant) -> String {
        if constant.is_zero() {
            return match self.ty(constant.ty()) {
                LlType::Ptr => "null".to_owned(),
                LlType::Int { .. } => "0".to_owned(),
                _ => "zeroinitializer".to_owned(),
            };
        }
        match constant {
            Constant::Null(_) => "zeroinitializer".to_owned(),
            Constant::Int { value, .. } => value.to_string(),
            Constant::Struct { fields, .. } => {
                let fields: Vec<String> = fields.iter().map(|f| self.typed_constant(f)).collect();
                format!("{{ {} }}", fields.join(", "))
            }
            Constant::Array { elements, .. } => {
                let elements: Vec<String> =
                    elements.iter().map(|e| self.typed_constant(e)).collect();
                format!("[{}]", elements.join(", "))
            }
            Constant::Global(id) => format!("@{}", self.global(*id).name),
            Constant::Function(id) => format!("@{}", self.function(*id).name),
        }
    }

    fn typed_constant(&self, constant: &Constant) -> String {
        format!(
            "{} {}",
            self.type_name(constant.ty()),
            self.render_constant(constant)
        )
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name())?;

        for index in 0..self.type_count() {
            let id = crate::ids::LlTypeId::from_index(index);
            if let LlType::Struct {
                name: Some(name),
                fields,
            } = self.ty(id)
            {
                let fields: Vec<String> = fields.iter().map(|&t| self.type_name(t)).collect();
                writeln!(f, "%{name} = type {{ {} }}", fields.join(", "))?;
            }
        }

        for (_, global) in self.globals() {
            let mut line = format!("@{} = ", global.name);
            match (global.initializer.as_ref(), global.linkage.keyword()) {
                (None, "") => line.push_str("external "),
                (_, "") => {}
                (_, keyword) => {
                    line.push_str(keyword);
                    line.push(' ');
                }
            }
            line.push_str(if global.constant { "constant " } else { "global " });
            line.push_str(&self.type_name(global.ty));
            if let Some(init) = &global.initializer {
                let _ = write!(line, " {}", self.render_constant(init));
            }
            writeln!(f, "{line}")?;
        }

        for (_, func) in self.functions() {
            let LlType::Function { ret, params } = self.ty(func.ty) else {
                continue;
            };
            let params: Vec<String> = params
                .iter()
                .zip(&func.param_attrs)
                .map(|(&ty, &attrs)| self.render_param(ty, attrs))
                .collect();
            let mut line = String::from("declare ");
            if !func.linkage.keyword().is_empty() {
                line.push_str(func.linkage.keyword());
                line.push(' ');
            }
            let _ = write!(
                line,
                "{} @{}({})",
                self.type_name(*ret),
                func.name,
                params.join(", ")
            );
            for attr in func.attrs.names() {
                line.push(' ');
                line.push_str(attr);
            }
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::{Constant, FnAttrs, IrModule, Linkage, LlTypeId, ParamAttrs};

    #[test]
    fn prints_declarations_in_order() {
        let mut module = IrModule::new("demo");
        let info = module.named_struct("demo.Info", &[LlTypeId::PTR, LlTypeId::PTR]);
        let table_ty = module.array_type(info, 1);
        let table = module
            .declare_global("table", table_ty, Linkage::LinkOnceAny, true)
            .unwrap();
        module
            .set_initializer(
                table,
                Constant::Array {
                    ty: table_ty,
                    elements: vec![Constant::Null(info)],
                },
            )
            .unwrap();

        let fn_ty = module.function_type(LlTypeId::VOID, &[LlTypeId::PTR, LlTypeId::I64]);
        module
            .declare_function_with_attrs(
                "touch",
                fn_ty,
                Linkage::Private,
                FnAttrs::NO_UNWIND,
                &[ParamAttrs::NO_CAPTURE | ParamAttrs::READ_ONLY],
            )
            .unwrap();

        let text = module.to_string();
        let expected = "\
; ModuleID = 'demo'
%demo.Info = type { ptr, ptr }
@table = linkonce constant [1 x %demo.Info] zeroinitializer
declare private void @touch(ptr nocapture readonly, i64) nounwind
";
        pretty_assertions::assert_eq!(text, expected);
    }

    #[test]
    fn uninitialized_external_global() {
        let mut module = IrModule::new("demo");
        module
            .declare_global("class_info", LlTypeId::PTR, Linkage::External, true)
            .unwrap();
        assert!(module
            .to_string()
            .contains("@class_info = external constant ptr"));
    }
}
