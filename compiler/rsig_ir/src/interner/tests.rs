use super::*;

#[test]
fn interning_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("foo");
    let b = interner.intern("foo");
    let c = interner.intern("bar");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.lookup(a), "foo");
    assert_eq!(interner.lookup(c), "bar");
}

#[test]
fn empty_string_is_preinterned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert!(interner.is_empty());
    interner.intern("x");
    assert!(!interner.is_empty());
    assert_eq!(interner.len(), 2);
}

#[test]
fn get_does_not_insert() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    assert_eq!(interner.len(), 1);
    let name = interner.intern("present");
    assert_eq!(interner.get("present"), Some(name));
}

#[test]
fn foreign_name_resolves_to_empty() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(999)), "");
}

#[test]
fn concurrent_interning_agrees() {
    let interner = StringInterner::shared();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interner = Arc::clone(&interner);
            std::thread::spawn(move || {
                (0..100)
                    .map(|i| interner.intern(&format!("name{i}")))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<Name>> = handles
        .into_iter()
        .map(|h| h.join().unwrap_or_default())
        .collect();
    for other in &results[1..] {
        assert_eq!(&results[0], other);
    }
    assert_eq!(interner.len(), 101);
}
