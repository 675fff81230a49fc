use super::*;
use pretty_assertions::assert_eq;

#[test]
fn intern_is_stable() {
    let interner = StringInterner::new();
    let a = interner.intern("Counter");
    let b = interner.intern("Counter");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "Counter");
}

#[test]
fn distinct_strings_get_distinct_names() {
    let interner = StringInterner::new();
    let a = interner.intern("increment");
    let b = interner.intern("decrement");
    assert_ne!(a, b);
    assert_eq!(interner.lookup(b), "decrement");
}

#[test]
fn empty_string_is_pre_interned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn len_counts_new_strings_once() {
    let interner = StringInterner::new();
    let before = interner.len();
    interner.intern("fresh_identifier");
    interner.intern("fresh_identifier");
    assert_eq!(interner.len(), before + 1);
}

#[test]
fn new_interner_holds_only_the_empty_string() {
    let interner = StringInterner::new();
    assert_eq!(interner.len(), 1);
    assert_eq!(interner.intern("main").raw(), 1);
}
