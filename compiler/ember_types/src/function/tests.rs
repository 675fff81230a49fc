use super::*;
use ember_ir::StringInterner;
use pretty_assertions::assert_eq;

fn package() -> PackageId {
    PackageId::from_index(0)
}

#[test]
fn methods_default_to_borrowed_receiver() {
    let interner = StringInterner::new();
    let method = Function::new(interner.intern("size"), package(), FunctionKind::Method);
    assert_eq!(method.receiver, Some(Ownership::Borrowed));

    let free = Function::new(interner.intern("main"), package(), FunctionKind::Function);
    assert!(!free.has_receiver());

    let type_method = Function::new(interner.intern("make"), package(), FunctionKind::TypeMethod);
    assert!(!type_method.has_receiver());
}

#[test]
fn non_generic_functions_start_with_unspecific_reification() {
    let interner = StringInterner::new();
    let f = Function::new(interner.intern("f"), package(), FunctionKind::Function);
    assert_eq!(f.reifications().len(), 1);
    assert!(f.reification(0).is_unspecific());
}

#[test]
fn generic_functions_start_empty_and_dedupe_reifications() {
    let interner = StringInterner::new();
    let mut f = Function::new(interner.intern("id"), package(), FunctionKind::Function).generic(1);
    assert!(f.reifications().is_empty());

    assert_eq!(f.reify(&[Idx::INT]), 0);
    assert_eq!(f.reify(&[Idx::REAL]), 1);
    assert_eq!(f.reify(&[Idx::INT]), 0);

    f.create_unspecific_reification();
    f.create_unspecific_reification();
    assert_eq!(f.reifications().len(), 3);
    assert!(f.reification(2).is_unspecific());
}

#[test]
fn entity_slots_are_write_once() {
    let mut entity = ReificationEntity::default();
    entity.set_vti(3).unwrap();
    // Same value again is idempotent.
    entity.set_vti(3).unwrap();
    assert_eq!(entity.vti(), Some(3));

    let err = entity.set_vti(4).unwrap_err();
    assert_eq!(
        err,
        AlreadyAssigned {
            field: "table index",
            existing: "3".to_owned(),
            requested: "4".to_owned(),
        }
    );
    assert_eq!(entity.vti(), Some(3));
}
