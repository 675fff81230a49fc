#![allow(clippy::unwrap_used)]

//! End-to-end declaration of imported packages.

use ember_backend::{IrModule, Linkage, ParamAttrs};
use ember_declare::{DeclareConfig, Declarator, InternalError};
use ember_types::{
    ClassId, DispatchPlan, EntityStore, FnId, Function, FunctionKind, Idx, Owner, Ownership,
    PackageId,
};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

fn declarator() -> Declarator {
    Declarator::new("main", DeclareConfig::default()).unwrap()
}

/// Symbol name to declaration count; every count should be 1.
fn symbol_counts(module: &IrModule) -> FxHashMap<String, usize> {
    let mut counts = FxHashMap::default();
    for (_, f) in module.functions() {
        *counts.entry(f.name.clone()).or_insert(0) += 1;
    }
    for (_, g) in module.globals() {
        *counts.entry(g.name.clone()).or_insert(0) += 1;
    }
    counts
}

/// Value type `V` with a mutating `m(x: borrowed Node)` and protocol `P`
/// with two methods. No classes are declared in this package.
struct ValueScenario {
    store: EntityStore,
    package: PackageId,
    m: FnId,
    p_methods: [FnId; 2],
}

fn value_scenario() -> ValueScenario {
    let mut store = EntityStore::new();
    let other = store.add_package("nodes");
    let node = store.add_class(other, "Node", None);
    let node_ty = store.class_type(node);

    let package = store.add_package("values");
    let v = store.add_value_type(package, "V", &[Idx::INT]);
    let m = store.add_method(
        Owner::ValueType(v),
        Function::new(store.intern("m"), package, FunctionKind::Method)
            .with_receiver(Ownership::Borrowed)
            .with_param(store.intern("x"), node_ty, Ownership::Borrowed)
            .mutating(),
    );

    let p = store.add_protocol(package, "P");
    let first = store.add_method(
        Owner::Protocol(p),
        Function::new(store.intern("first"), package, FunctionKind::Method),
    );
    let second = store.add_method(
        Owner::Protocol(p),
        Function::new(store.intern("second"), package, FunctionKind::Method).returning(Idx::INT),
    );

    ValueScenario {
        store,
        package,
        m,
        p_methods: [first, second],
    }
}

#[test]
fn value_type_and_protocol_package() {
    let mut s = value_scenario();
    let mut declarator = declarator();
    let globals_before = declarator.module().global_count();
    declarator.declare_imported_package(&mut s.store, s.package).unwrap();

    let module = declarator.module();
    let m = s.store.function(s.m).reification(0).entity.function().unwrap();
    let decl = module.function(m);
    assert_eq!(decl.name, "_ember_values$V$m");
    assert_eq!(module.type_name(decl.ty), "void (ptr, ptr)");
    // Mutating: the receiver is non-escaping but not read-only.
    assert_eq!(decl.param_attrs, vec![ParamAttrs::NO_CAPTURE, ParamAttrs::NO_CAPTURE]);

    let slots: Vec<Option<u32>> = s
        .p_methods
        .iter()
        .map(|&f| s.store.function(f).reification(0).entity.vti())
        .collect();
    assert_eq!(slots, vec![Some(0), Some(1)]);

    // No class info, conformance or dispatch table declarations.
    assert_eq!(module.global_count(), globals_before);
    assert!(declarator.tables().is_empty());
}

#[test]
fn non_mutating_value_method_is_read_only() {
    let mut store = EntityStore::new();
    let package = store.add_package("values");
    let v = store.add_value_type(package, "V", &[Idx::INT]);
    let get = store.add_method(
        Owner::ValueType(v),
        Function::new(store.intern("get"), package, FunctionKind::Method).returning(Idx::INT),
    );

    let mut declarator = declarator();
    declarator.declare_imported_package(&mut store, package).unwrap();

    let func = store.function(get).reification(0).entity.function().unwrap();
    let receiver = declarator.module().function(func).param_attrs[0];
    assert!(receiver.contains(ParamAttrs::NO_CAPTURE));
    assert!(receiver.contains(ParamAttrs::READ_ONLY));
}

struct ClassScenario {
    store: EntityStore,
    base_package: PackageId,
    leaf_package: PackageId,
    base: ClassId,
    leaf: ClassId,
}

/// `Base` in one package, `Leaf: Base` in another.
fn class_scenario() -> ClassScenario {
    let mut store = EntityStore::new();
    let base_package = store.add_package("base");
    let base = store.add_class(base_package, "Base", None);
    let draw = store.add_method(
        Owner::Class(base),
        Function::new(store.intern("draw"), base_package, FunctionKind::Method),
    );
    store.add_method(
        Owner::Class(base),
        Function::new(store.intern("new"), base_package, FunctionKind::Initializer),
    );

    let leaf_package = store.add_package("leaf");
    let leaf = store.add_class(leaf_package, "Leaf", Some(base));
    store.add_method(
        Owner::Class(leaf),
        Function::new(store.intern("draw"), leaf_package, FunctionKind::Method).overriding(draw),
    );

    ClassScenario {
        store,
        base_package,
        leaf_package,
        base,
        leaf,
    }
}

#[test]
fn leaf_class_references_superclass_table() {
    let mut s = class_scenario();
    let mut declarator = declarator();
    declarator.declare_imported_package(&mut s.store, s.base_package).unwrap();
    let base_table = s.store.class(s.base).dispatch_table;
    assert!(base_table.is_some());
    let tables = declarator.tables().len();

    declarator.declare_imported_package(&mut s.store, s.leaf_package).unwrap();
    assert_eq!(s.store.class(s.leaf).dispatch_table, base_table);
    assert_eq!(
        s.store.class(s.leaf).dispatch,
        Some(DispatchPlan::Assign {
            class: s.leaf,
            source: base_table
        })
    );
    // Leaf has no subclasses, so nothing further is built.
    assert!(!s.store.class(s.leaf).has_subclass);
    assert_eq!(declarator.tables().len(), tables);

    let info = s.store.class(s.leaf).class_info.unwrap();
    let global = declarator.module().global(info);
    assert_eq!(global.name, "_ember_leaf$Leaf$$class_info");
    assert_eq!(global.linkage, Linkage::External);
    assert!(global.initializer.is_none());
}

#[test]
fn leaf_package_first_plans_superclass() {
    let mut s = class_scenario();
    let mut declarator = declarator();
    declarator.declare_imported_package(&mut s.store, s.leaf_package).unwrap();

    assert_eq!(s.store.class(s.base).dispatch, Some(DispatchPlan::Build { class: s.base }));
    assert_eq!(
        s.store.class(s.leaf).dispatch_table,
        s.store.class(s.base).dispatch_table
    );
    // Base's class info belongs to its own package.
    assert!(s.store.class(s.base).class_info.is_none());
}

#[test]
fn declaring_a_package_twice_is_idempotent() {
    let mut s = value_scenario();
    let mut declarator = declarator();
    declarator.declare_imported_package(&mut s.store, s.package).unwrap();
    let functions = declarator.module().function_count();
    let globals = declarator.module().global_count();

    declarator.declare_imported_package(&mut s.store, s.package).unwrap();
    assert_eq!(declarator.module().function_count(), functions);
    assert_eq!(declarator.module().global_count(), globals);
    assert!(symbol_counts(declarator.module()).values().all(|&n| n == 1));

    let mut c = class_scenario();
    let mut declarator = self::declarator();
    for _ in 0..2 {
        declarator.declare_imported_package(&mut c.store, c.base_package).unwrap();
        declarator.declare_imported_package(&mut c.store, c.leaf_package).unwrap();
    }
    assert_eq!(declarator.tables().len(), 1);
    assert!(symbol_counts(declarator.module()).values().all(|&n| n == 1));
}

#[test]
fn runtime_abi_is_declared_once() {
    let mut s = class_scenario();
    let mut declarator = declarator();
    declarator.declare_imported_package(&mut s.store, s.base_package).unwrap();
    declarator.declare_imported_package(&mut s.store, s.leaf_package).unwrap();

    let module = declarator.module();
    let counts = symbol_counts(module);
    for entry in [
        "emberAlloc",
        "emberPanic",
        "emberInheritsFrom",
        "emberFindProtocolConformance",
        "box_info_objects",
    ] {
        assert_eq!(counts.get(entry), Some(&1), "{entry}");
    }
    assert_eq!(module.get_function("emberAlloc"), Some(declarator.runtime().alloc));
}

#[test]
fn conflicting_imports_abort() {
    let mut store = EntityStore::new();
    let first = store.add_package("a");
    store.add_function(
        Function::new(store.intern("hook"), first, FunctionKind::Function).with_external_name("hook"),
    );
    let second = store.add_package("b");
    store.add_function(
        Function::new(store.intern("hook"), second, FunctionKind::Function)
            .returning(Idx::INT)
            .with_external_name("hook"),
    );

    let mut declarator = declarator();
    declarator.declare_imported_package(&mut store, first).unwrap();
    let err = declarator.declare_imported_package(&mut store, second).unwrap_err();
    assert!(matches!(err, InternalError::Module(_)), "{err}");
}

#[test]
fn printed_module_shows_declarations() {
    let mut s = value_scenario();
    let mut declarator = declarator();
    declarator.declare_imported_package(&mut s.store, s.package).unwrap();

    let text = declarator.module().to_string();
    assert!(text.contains("declare void @_ember_values$V$m(ptr nocapture, ptr nocapture) nounwind"), "{text}");
    assert!(text.contains("@box_info_objects = linkonce constant [1 x %BoxInfo]"), "{text}");
}
