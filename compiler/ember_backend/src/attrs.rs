//! Function and parameter attributes.

use bitflags::bitflags;

bitflags! {
    /// Attributes on the function itself.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FnAttrs: u8 {
        /// The function never unwinds.
        const NO_UNWIND = 1 << 0;
        /// The function never returns to its caller.
        const NO_RETURN = 1 << 1;
        /// The function is rarely called.
        const COLD = 1 << 2;
    }
}

bitflags! {
    /// Attributes on a single parameter position.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ParamAttrs: u8 {
        /// The callee does not retain the pointer past the call.
        const NO_CAPTURE = 1 << 0;
        /// The callee does not write through the pointer.
        const READ_ONLY = 1 << 1;
    }
}

impl FnAttrs {
    /// LLVM attribute names, in a stable order.
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::NO_UNWIND) {
            names.push("nounwind");
        }
        if self.contains(Self::NO_RETURN) {
            names.push("noreturn");
        }
        if self.contains(Self::COLD) {
            names.push("cold");
        }
        names
    }
}

impl ParamAttrs {
    /// LLVM attribute names, in a stable order.
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::NO_CAPTURE) {
            names.push("nocapture");
        }
        if self.contains(Self::READ_ONLY) {
            names.push("readonly");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_attr_names_are_ordered() {
        let attrs = FnAttrs::COLD | FnAttrs::NO_UNWIND | FnAttrs::NO_RETURN;
        assert_eq!(attrs.names(), vec!["nounwind", "noreturn", "cold"]);
    }

    #[test]
    fn empty_param_attrs_have_no_names() {
        assert!(ParamAttrs::empty().names().is_empty());
        assert_eq!(
            (ParamAttrs::READ_ONLY | ParamAttrs::NO_CAPTURE).names(),
            vec!["nocapture", "readonly"]
        );
    }
}
