//! Parameter attributes derived from ownership and mutability facts.
//!
//! These hints are only sound if borrow inference and mutability checking
//! upstream are sound; a wrong fact here produces miscompiled code.

use ember_backend::ParamAttrs;
use ember_types::{EntityStore, Function, FunctionKind, Owner, Ownership};
use smallvec::SmallVec;

/// The facts about one backend parameter that decide its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamFacts {
    /// The implicit receiver.
    Receiver {
        ownership: Ownership,
        /// The receiver is a value type and the method does not mutate it.
        read_only: bool,
    },
    /// A declared parameter.
    Explicit {
        ownership: Ownership,
        /// The parameter's static type is a class.
        class_typed: bool,
    },
}

/// Attributes for a single parameter.
pub fn attributes_for(param: ParamFacts) -> ParamAttrs {
    match param {
        ParamFacts::Receiver {
            ownership,
            read_only,
        } => {
            let mut attrs = ParamAttrs::empty();
            if ownership == Ownership::Borrowed {
                attrs |= ParamAttrs::NO_CAPTURE;
            }
            if read_only {
                attrs |= ParamAttrs::READ_ONLY;
            }
            attrs
        }
        ParamFacts::Explicit {
            ownership: Ownership::Borrowed,
            class_typed: true,
        } => ParamAttrs::NO_CAPTURE,
        ParamFacts::Explicit { .. } => ParamAttrs::empty(),
    }
}

/// Facts for every backend parameter of `function`, in backend order.
///
/// The receiver occupies index 0 only when present; explicit parameters
/// follow it.
pub fn parameter_facts(store: &EntityStore, function: &Function) -> SmallVec<[ParamFacts; 6]> {
    let mut facts = SmallVec::new();
    if let Some(ownership) = function.receiver {
        let value_receiver = matches!(function.owner, Some(Owner::ValueType(_)));
        facts.push(ParamFacts::Receiver {
            ownership,
            read_only: value_receiver
                && !function.mutating
                && function.kind != FunctionKind::Initializer,
        });
    }
    for param in &function.params {
        facts.push(ParamFacts::Explicit {
            ownership: param.ownership,
            class_typed: store.pool().is_class(param.ty),
        });
    }
    facts
}

/// Attribute set of every backend parameter of `function`, in backend order.
pub fn parameter_attr_list(store: &EntityStore, function: &Function) -> SmallVec<[ParamAttrs; 6]> {
    parameter_facts(store, function)
        .into_iter()
        .map(attributes_for)
        .collect()
}

/// Non-empty attribute sets of `function`, keyed by backend parameter index.
#[expect(
    clippy::cast_possible_truncation,
    reason = "functions never have u32::MAX parameters"
)]
pub fn parameter_attributes(store: &EntityStore, function: &Function) -> SmallVec<[(u32, ParamAttrs); 4]> {
    parameter_attr_list(store, function)
        .into_iter()
        .enumerate()
        .map(|(index, attrs)| (index as u32, attrs))
        .filter(|(_, attrs)| !attrs.is_empty())
        .collect()
}
