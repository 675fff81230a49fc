//! Symbol mangling for declared entities.
//!
//! # Mangling Scheme
//!
//! ```text
//! _ember_<package>$<name>                       free function
//! _ember_<package>$<Type>$<name>                method
//! _ember_<package>$<Type>$T$<name>              type method
//! _ember_<package>$<Type>$I$<name>              initializer
//! <function>$$G$<arg>$<arg>                     reification
//! _ember_<package>$<Class>$$class_info          class info record
//! _ember_<package>$<Type>$$conf$<Protocol>      protocol conformance record
//! ```
//!
//! `$` only ever appears as a separator. Characters outside `[A-Za-z0-9_]`
//! are written as `_U<hex>_`, and so is a `_` followed by `U`, which keeps
//! `_U` reserved for escapes.
//!
//! Reification arguments name nominal types with their package
//! (`<package>.<Type>`), since two packages may declare the same type name.
//! Optionals are `opt-<arg>`, generic parameters `gen-<n>`. Neither `.` nor
//! `-` is produced by identifier escaping.
//!
//! | Entity | Mangled Name |
//! |--------|--------------|
//! | `main` in `app` | `_ember_app$main` |
//! | `Point.length` in `geo` | `_ember_geo$Point$length` |
//! | `id<Int>` in `util` | `_ember_util$id$$G$Int` |
//! | `id<?ui.Shape>` in `util` | `_ember_util$id$$G$opt-ui.Shape` |

use std::fmt::Write;

use ember_types::{EntityStore, FnId, FunctionKind, Idx, Owner, PackageId, TypeKind};

/// The prefix for all Ember mangled symbols.
pub const MANGLE_PREFIX: &str = "_ember_";

const SEP: char = '$';

/// Starts the metadata section (generics, class info, conformance).
const META_SEP: &str = "$$";

const INITIALIZER_MARKER: &str = "I";
const TYPE_METHOD_MARKER: &str = "T";

const OPTIONAL_MARKER: &str = "opt-";
const GENERIC_PARAM_MARKER: &str = "gen-";
const PACKAGE_SEP: char = '.';

#[derive(Debug, Clone)]
pub struct Mangler {
    prefix: String,
}

impl Default for Mangler {
    fn default() -> Self {
        Self {
            prefix: MANGLE_PREFIX.to_owned(),
        }
    }
}

impl Mangler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Linker name of one reification of `function`.
    pub fn function_symbol(&self, store: &EntityStore, function: FnId, args: &[Idx]) -> String {
        let f = store.function(function);
        let package = store.name(store.package(f.package).name);
        let name = store.name(f.name);

        let mut result = match f.owner {
            None => self.mangle_function(package, name),
            Some(owner) => {
                let marker = match f.kind {
                    FunctionKind::Initializer => Some(INITIALIZER_MARKER),
                    FunctionKind::TypeMethod => Some(TYPE_METHOD_MARKER),
                    FunctionKind::Function | FunctionKind::Method => None,
                };
                self.mangle_method(package, owner_name(store, owner), marker, name)
            }
        };

        if !args.is_empty() {
            result.push_str(META_SEP);
            result.push('G');
            for &arg in args {
                result.push(SEP);
                push_type_arg(&mut result, store, arg);
            }
        }
        result
    }

    #[must_use]
    pub fn mangle_function(&self, package: &str, name: &str) -> String {
        let mut result = self.start(package);
        result.push(SEP);
        encode_identifier(&mut result, name);
        result
    }

    /// `marker` distinguishes initializers (`I`) and type methods (`T`)
    /// from instance methods (`None`).
    #[must_use]
    pub fn mangle_method(&self, package: &str, type_name: &str, marker: Option<&str>, name: &str) -> String {
        let mut result = self.start(package);
        result.push(SEP);
        encode_identifier(&mut result, type_name);
        if let Some(marker) = marker {
            result.push(SEP);
            result.push_str(marker);
        }
        result.push(SEP);
        encode_identifier(&mut result, name);
        result
    }

    #[must_use]
    pub fn mangle_class_info(&self, package: &str, class: &str) -> String {
        let mut result = self.start(package);
        result.push(SEP);
        encode_identifier(&mut result, class);
        result.push_str(META_SEP);
        result.push_str("class_info");
        result
    }

    #[must_use]
    pub fn mangle_conformance(&self, package: &str, type_name: &str, protocol: &str) -> String {
        let mut result = self.start(package);
        result.push(SEP);
        encode_identifier(&mut result, type_name);
        result.push_str(META_SEP);
        result.push_str("conf");
        result.push(SEP);
        encode_identifier(&mut result, protocol);
        result
    }

    fn start(&self, package: &str) -> String {
        let mut result = String::with_capacity(64);
        result.push_str(&self.prefix);
        encode_identifier(&mut result, package);
        result
    }
}

fn owner_name(store: &EntityStore, owner: Owner) -> &'static str {
    let name = match owner {
        Owner::Class(id) => store.class(id).name,
        Owner::ValueType(id) => store.value_type(id).name,
        Owner::Protocol(id) => store.protocol(id).name,
    };
    store.name(name)
}

fn push_type_arg(out: &mut String, store: &EntityStore, ty: Idx) {
    match store.pool().kind(ty) {
        TypeKind::Class(id) => {
            let class = store.class(id);
            push_qualified(out, store, class.package, store.name(class.name));
        }
        TypeKind::ValueType(id) => {
            let value_type = store.value_type(id);
            push_qualified(out, store, value_type.package, store.name(value_type.name));
        }
        TypeKind::Protocol(id) => {
            let protocol = store.protocol(id);
            push_qualified(out, store, protocol.package, store.name(protocol.name));
        }
        TypeKind::Optional(inner) => {
            out.push_str(OPTIONAL_MARKER);
            push_type_arg(out, store, inner);
        }
        TypeKind::GenericParam(index) => {
            out.push_str(GENERIC_PARAM_MARKER);
            let _ = write!(out, "{index}");
        }
        _ => encode_identifier(out, ty.name().unwrap_or("?")),
    }
}

fn push_qualified(out: &mut String, store: &EntityStore, package: PackageId, name: &str) {
    encode_identifier(out, store.name(store.package(package).name));
    out.push(PACKAGE_SEP);
    encode_identifier(out, name);
}

fn encode_identifier(out: &mut String, name: &str) {
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        let reserved = c == '_' && chars.peek() == Some(&'U');
        if (c.is_ascii_alphanumeric() || c == '_') && !reserved {
            out.push(c);
        } else {
            let _ = write!(out, "_U{:x}_", c as u32);
        }
    }
}

fn decode_identifier(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut rest = encoded;
    while let Some(pos) = rest.find("_U") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 2..];
        let decoded = tail.split_once('_').and_then(|(hex, after)| {
            let c = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)?;
            Some((c, after))
        });
        match decoded {
            Some((c, after)) => {
                out.push(c);
                rest = after;
            }
            None => {
                out.push_str("_U");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Demangle an Ember symbol for diagnostics.
///
/// - `_ember_geo$Point$length` → `geo.Point.length`
/// - `_ember_geo$Point$T$make` → `geo.Point::make`
/// - `_ember_geo$Point$I$origin` → `geo.Point::init(origin)`
/// - `_ember_util$id$$G$Int$opt-ui.Shape` → `util.id<Int, ?ui.Shape>`
/// - `_ember_ui$Shape$$class_info` → `ui.Shape (class info)`
/// - `_ember_geo$Point$$conf$Drawable` → `geo.Point: Drawable (conformance)`
///
/// Returns `None` for symbols not produced by the [`Mangler`].
#[must_use]
pub fn demangle(mangled: &str) -> Option<String> {
    let rest = mangled.strip_prefix(MANGLE_PREFIX)?;
    let (path, meta) = match rest.split_once(META_SEP) {
        Some((path, meta)) => (path, Some(meta)),
        None => (rest, None),
    };

    let segments: Vec<String> = path.split(SEP).map(decode_identifier).collect();
    let base = match segments.as_slice() {
        [package, name] => format!("{package}.{name}"),
        [package, ty, name] => format!("{package}.{ty}.{name}"),
        [package, ty, marker, name] if marker == INITIALIZER_MARKER => {
            format!("{package}.{ty}::init({name})")
        }
        [package, ty, marker, name] if marker == TYPE_METHOD_MARKER => {
            format!("{package}.{ty}::{name}")
        }
        _ => return None,
    };

    let Some(meta) = meta else {
        return Some(base);
    };
    if meta == "class_info" {
        return Some(format!("{base} (class info)"));
    }
    if let Some(protocol) = meta.strip_prefix("conf$") {
        return Some(format!("{base}: {} (conformance)", decode_identifier(protocol)));
    }
    let args = meta.strip_prefix("G$")?;
    let args: Vec<String> = args.split(SEP).map(decode_type_arg).collect();
    Some(format!("{base}<{}>", args.join(", ")))
}

fn decode_type_arg(encoded: &str) -> String {
    if let Some(inner) = encoded.strip_prefix(OPTIONAL_MARKER) {
        return format!("?{}", decode_type_arg(inner));
    }
    if let Some(index) = encoded.strip_prefix(GENERIC_PARAM_MARKER) {
        return format!("T{index}");
    }
    match encoded.split_once(PACKAGE_SEP) {
        Some((package, name)) => format!("{}.{}", decode_identifier(package), decode_identifier(name)),
        None => decode_identifier(encoded),
    }
}
