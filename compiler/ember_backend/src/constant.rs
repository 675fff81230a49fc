//! Constant initializers for globals.

use crate::ids::{FunctionId, GlobalId, LlTypeId};

/// A constant value usable as a global initializer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constant {
    /// The all-zero value of a type (`zeroinitializer` / `null`).
    Null(LlTypeId),
    Int { ty: LlTypeId, value: i64 },
    Struct { ty: LlTypeId, fields: Vec<Constant> },
    Array { ty: LlTypeId, elements: Vec<Constant> },
    /// Address of a global.
    Global(GlobalId),
    /// Address of a function.
    Function(FunctionId),
}

impl Constant {
    /// The type of this constant.
    pub fn ty(&self) -> LlTypeId {
        match self {
            Constant::Null(ty)
            | Constant::Int { ty, .. }
            | Constant::Struct { ty, .. }
            | Constant::Array { ty, .. } => *ty,
            Constant::Global(_) | Constant::Function(_) => LlTypeId::PTR,
        }
    }

    /// True if every bit of this constant is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Constant::Null(_) => true,
            Constant::Int { value, .. } => *value == 0,
            Constant::Struct { fields: items, .. } | Constant::Array { elements: items, .. } => {
                items.iter().all(Constant::is_zero)
            }
            Constant::Global(_) | Constant::Function(_) => false,
        }
    }

    /// Elements of an array constant, `None` for other shapes.
    pub fn elements(&self) -> Option<&[Constant]> {
        match self {
            Constant::Array { elements, .. } => Some(elements),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_zero_detection() {
        let pair = LlTypeId::PTR;
        let zero = Constant::Struct {
            ty: pair,
            fields: vec![Constant::Null(LlTypeId::PTR), Constant::Int { ty: LlTypeId::I64, value: 0 }],
        };
        assert!(zero.is_zero());

        let non_zero = Constant::Struct {
            ty: pair,
            fields: vec![Constant::Null(LlTypeId::PTR), Constant::Int { ty: LlTypeId::I64, value: 3 }],
        };
        assert!(!non_zero.is_zero());
    }

    #[test]
    fn addresses_are_pointers() {
        assert_eq!(Constant::Global(GlobalId::from_index(0)).ty(), LlTypeId::PTR);
        assert!(!Constant::Function(FunctionId::from_index(2)).is_zero());
    }
}
