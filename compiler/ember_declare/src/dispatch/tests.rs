use super::*;
use crate::config::DeclareConfig;
use ember_types::{Function, FunctionKind, Idx, Owner, Ownership, PackageId};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn declarator() -> Declarator {
    Declarator::new("test", DeclareConfig::default()).unwrap()
}

fn method(store: &mut EntityStore, class: ClassId, name: &str) -> FnId {
    let pkg = store.class(class).package;
    let f = Function::new(store.intern(name), pkg, FunctionKind::Method);
    store.add_method(Owner::Class(class), f)
}

fn overriding(store: &mut EntityStore, class: ClassId, name: &str, overridden: FnId) -> FnId {
    let pkg = store.class(class).package;
    let f = Function::new(store.intern(name), pkg, FunctionKind::Method).overriding(overridden);
    store.add_method(Owner::Class(class), f)
}

fn vti(store: &EntityStore, method: FnId) -> Option<u32> {
    store.function(method).reification(0).entity.vti()
}

/// `Base { area, name }` <- `Mid { area (override), scale }` <- `Leaf { name (override), extra }`
struct Hierarchy {
    store: EntityStore,
    base: ClassId,
    mid: ClassId,
    leaf: ClassId,
    base_area: FnId,
    base_name: FnId,
    mid_area: FnId,
    mid_scale: FnId,
    leaf_name: FnId,
    leaf_extra: FnId,
}

fn hierarchy() -> Hierarchy {
    let mut store = EntityStore::new();
    let pkg = store.add_package("shapes");
    let base = store.add_class(pkg, "Base", None);
    let mid = store.add_class(pkg, "Mid", Some(base));
    let leaf = store.add_class(pkg, "Leaf", Some(mid));

    let base_area = method(&mut store, base, "area");
    let base_name = method(&mut store, base, "name");
    let mid_area = overriding(&mut store, mid, "area", base_area);
    let mid_scale = method(&mut store, mid, "scale");
    let leaf_name = overriding(&mut store, leaf, "name", base_name);
    let leaf_extra = method(&mut store, leaf, "extra");

    Hierarchy {
        store,
        base,
        mid,
        leaf,
        base_area,
        base_name,
        mid_area,
        mid_scale,
        leaf_name,
        leaf_extra,
    }
}

#[test]
fn plan_follows_subclass_fact() {
    let mut h = hierarchy();
    assert_eq!(plan_dispatch(&h.store, h.base), DispatchPlan::Build { class: h.base });
    assert_eq!(
        plan_dispatch(&h.store, h.leaf),
        DispatchPlan::Assign {
            class: h.leaf,
            source: None
        }
    );

    let mut declarator = declarator();
    declarator.declare_dispatch(&mut h.store, h.mid).unwrap();
    let mid_table = h.store.class(h.mid).dispatch_table;
    assert!(mid_table.is_some());
    assert_eq!(
        plan_dispatch(&h.store, h.leaf),
        DispatchPlan::Assign {
            class: h.leaf,
            source: mid_table
        }
    );
}

#[test]
fn built_tables_cover_the_full_method_set() {
    let mut h = hierarchy();
    let mut declarator = declarator();
    declarator.declare_dispatch(&mut h.store, h.mid).unwrap();

    // Planning `Mid` planned `Base` first.
    let base_table = h.store.class(h.base).dispatch_table.unwrap();
    let mid_table = h.store.class(h.mid).dispatch_table.unwrap();
    assert_eq!(declarator.tables().get(base_table).slots, vec![h.base_area, h.base_name]);
    assert_eq!(
        declarator.tables().get(mid_table).slots,
        vec![h.mid_area, h.base_name, h.mid_scale]
    );

    assert_eq!(vti(&h.store, h.base_area), Some(0));
    assert_eq!(vti(&h.store, h.base_name), Some(1));
    assert_eq!(vti(&h.store, h.mid_area), Some(0));
    assert_eq!(vti(&h.store, h.mid_scale), Some(2));
}

#[test]
fn leaf_shares_superclass_table() {
    let mut h = hierarchy();
    let mut declarator = declarator();
    declarator.declare_dispatch(&mut h.store, h.mid).unwrap();
    let tables_before = declarator.tables().len();

    let plan = declarator.declare_dispatch(&mut h.store, h.leaf).unwrap();
    assert_eq!(
        plan,
        DispatchPlan::Assign {
            class: h.leaf,
            source: h.store.class(h.mid).dispatch_table
        }
    );
    assert_eq!(h.store.class(h.leaf).dispatch_table, h.store.class(h.mid).dispatch_table);
    assert_eq!(declarator.tables().len(), tables_before);

    // The override reuses the inherited slot; the new method has none.
    assert_eq!(vti(&h.store, h.leaf_name), Some(1));
    assert_eq!(vti(&h.store, h.leaf_extra), None);
    assert!(h.store.function(h.leaf_extra).reification(0).entity.function().is_some());
}

#[test]
fn plans_are_evaluated_once() {
    let mut h = hierarchy();
    let mut declarator = declarator();
    let first = declarator.declare_dispatch(&mut h.store, h.mid).unwrap();
    let tables = declarator.tables().len();
    let functions = declarator.module().function_count();

    let second = declarator.declare_dispatch(&mut h.store, h.mid).unwrap();
    assert_eq!(first, second);
    assert_eq!(declarator.tables().len(), tables);
    assert_eq!(declarator.module().function_count(), functions);
}

#[test]
fn root_leaf_has_no_table() {
    let mut store = EntityStore::new();
    let pkg = store.add_package("p");
    let lone = store.add_class(pkg, "Lone", None);
    let m = method(&mut store, lone, "run");

    let mut declarator = declarator();
    let plan = declarator.declare_dispatch(&mut store, lone).unwrap();
    assert_eq!(
        plan,
        DispatchPlan::Assign {
            class: lone,
            source: None
        }
    );
    assert_eq!(store.class(lone).dispatch_table, None);
    assert!(declarator.tables().is_empty());
    assert_eq!(vti(&store, m), None);
}

#[test]
fn generic_methods_take_no_slot() {
    let mut store = EntityStore::new();
    let pkg = store.add_package("p");
    let base = store.add_class(pkg, "Base", None);
    store.add_class(pkg, "Sub", Some(base));
    let plain = method(&mut store, base, "plain");
    let t = store.pool_mut().generic_param(0);
    let generic = Function::new(store.intern("map"), pkg, FunctionKind::Method)
        .with_param(store.intern("x"), t, Ownership::Owned)
        .generic(1);
    let generic = store.add_method(Owner::Class(base), generic);
    store.function_mut(generic).reify(&[Idx::INT]);

    let mut declarator = declarator();
    declarator.declare_dispatch(&mut store, base).unwrap();
    let table = store.class(base).dispatch_table.unwrap();
    assert_eq!(declarator.tables().get(table).slots, vec![plain]);
    assert_eq!(vti(&store, generic), None);
    assert!(store.function(generic).reification(0).entity.function().is_some());
}

#[test]
fn leaf_without_superclass_table_is_rejected() {
    let mut store = EntityStore::new();
    let pkg = store.add_package("p");
    let base = store.add_class(pkg, "Base", None);
    let leaf = store.add_class(pkg, "Leaf", Some(base));
    // Contradicts the subclass fact: `Base` is planned as a leaf.
    store.class_mut(base).has_subclass = false;

    let mut declarator = declarator();
    let err = declarator.declare_dispatch(&mut store, leaf).unwrap_err();
    assert_eq!(
        err,
        InternalError::MissingSuperclassTable {
            class: "Leaf".to_owned(),
            superclass: "Base".to_owned(),
        }
    );
}

#[test]
fn override_outside_the_inherited_table_is_rejected() {
    let mut store = EntityStore::new();
    let pkg = store.add_package("p");
    let other = store.add_class(pkg, "Other", None);
    store.add_class(pkg, "OtherChild", Some(other));
    for name in ["a", "b", "c"] {
        method(&mut store, other, name);
    }
    let unrelated = method(&mut store, other, "d");

    let base = store.add_class(pkg, "Base", None);
    let mid = store.add_class(pkg, "Mid", Some(base));
    store.add_class(pkg, "Leaf", Some(mid));
    method(&mut store, base, "area");
    // Overrides a method of a class that is not an ancestor.
    overriding(&mut store, mid, "d", unrelated);

    let mut declarator = declarator();
    declarator.declare_dispatch(&mut store, other).unwrap();
    assert_eq!(vti(&store, unrelated), Some(3));

    let err = declarator.declare_dispatch(&mut store, mid).unwrap_err();
    assert_eq!(
        err,
        InternalError::SlotOutOfRange {
            class: "Mid".to_owned(),
            method: "d".to_owned(),
            vti: 3,
            len: 1,
        }
    );
    assert_eq!(store.class(mid).dispatch_table, None);
}

fn protocol_with(store: &mut EntityStore, pkg: PackageId, shape: &[usize]) -> (ProtocolId, Vec<FnId>) {
    let protocol = store.add_protocol(pkg, "Proto");
    let t = store.pool_mut().generic_param(0);
    let mut methods = Vec::new();
    for (i, &reifications) in shape.iter().enumerate() {
        let mut f = Function::new(store.intern(&format!("m{i}")), pkg, FunctionKind::Method)
            .with_param(store.intern("x"), t, Ownership::Owned);
        if reifications > 0 {
            f = f.generic(1);
        }
        let id = store.add_method(Owner::Protocol(protocol), f);
        let args = [Idx::INT, Idx::REAL, Idx::BOOL, Idx::BYTE, Idx::SYMBOL];
        for arg in args.iter().take(reifications) {
            store.function_mut(id).reify(&[*arg]);
        }
        methods.push(id);
    }
    (protocol, methods)
}

#[test]
fn protocol_slots_are_flat_per_reification() {
    let mut store = EntityStore::new();
    let pkg = store.add_package("p");
    // m0 non-generic; m1 generic with two reifications plus the unspecific one.
    let (protocol, methods) = protocol_with(&mut store, pkg, &[0, 2]);

    let mut declarator = declarator();
    let count = declarator.assign_protocol_slots(&mut store, protocol).unwrap();
    assert_eq!(count, 4);
    assert_eq!(store.protocol(protocol).slot_count, 4);

    let m1: Vec<Option<u32>> = store
        .function(methods[1])
        .reifications()
        .iter()
        .map(|r| r.entity.vti())
        .collect();
    assert_eq!(vti(&store, methods[0]), Some(0));
    assert_eq!(m1, vec![Some(1), Some(2), Some(3)]);
    assert!(store.function(methods[1]).reification(2).is_unspecific());

    // Protocol methods get types but no backend functions.
    let entity = &store.function(methods[0]).reification(0).entity;
    assert!(entity.function_type().is_some());
    assert!(entity.function().is_none());
}

#[test]
fn protocol_slot_assignment_is_repeatable() {
    let mut store = EntityStore::new();
    let pkg = store.add_package("p");
    let (protocol, _) = protocol_with(&mut store, pkg, &[1, 0, 3]);

    let mut declarator = declarator();
    let first = declarator.assign_protocol_slots(&mut store, protocol).unwrap();
    let second = declarator.assign_protocol_slots(&mut store, protocol).unwrap();
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn protocol_slots_are_contiguous_from_zero(shape in prop::collection::vec(0usize..4, 0..6)) {
        let mut store = EntityStore::new();
        let pkg = store.add_package("p");
        let (protocol, methods) = protocol_with(&mut store, pkg, &shape);

        let mut declarator = declarator();
        let count = declarator.assign_protocol_slots(&mut store, protocol).unwrap();

        let slots: Vec<u32> = methods
            .iter()
            .flat_map(|&m| store.function(m).reifications().iter().map(|r| r.entity.vti()))
            .map(|vti| vti.unwrap())
            .collect();
        let expected: Vec<u32> = (0..count).collect();
        prop_assert_eq!(slots, expected);
    }
}
