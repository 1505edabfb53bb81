use std::rc::Rc;

use indexmap::IndexMap;

use pretty_assertions::assert_eq;

use super::prelude::{Environment, HashPair, Object, ObjectType, FALSE, NULL, TRUE};

#[test]
fn test_string_hash_key() {
    let hello1 = Object::string("Hello World");
    let hello2 = Object::string("Hello World");
    let diff1 = Object::string("My name is johnny");
    let diff2 = Object::string("My name is johnny");

    assert_eq!(hello1.hash_key(), hello2.hash_key());
    assert_eq!(diff1.hash_key(), diff2.hash_key());
    assert_ne!(hello1.hash_key(), diff1.hash_key());
}

#[test]
fn test_hash_key_types() {
    let one = Object::Integer { value: 1 };

    assert_eq!(one.hash_key().map(|key| key.value), Some(1));
    assert_eq!(TRUE.hash_key().map(|key| key.value), Some(1));
    assert_ne!(one.hash_key(), TRUE.hash_key());

    assert_eq!(Object::Integer { value: -1 }.hash_key().map(|key| key.value), Some(u64::MAX));
    assert_eq!(FALSE.hash_key().map(|key| key.value), Some(0));

    assert_eq!(NULL.hash_key(), None);
    assert_eq!(Object::array(vec![]).hash_key(), None);
}

#[test]
fn test_djb2_values() {
    let empty = Object::string("");
    let a = Object::string("a");

    assert_eq!(empty.hash_key().map(|key| key.value), Some(5381));
    assert_eq!(a.hash_key().map(|key| key.value), Some(5381 * 33 + 97));
}

#[test]
fn test_environment_scopes() {
    let outer = Environment::new();
    outer.borrow_mut().set("a", Object::Integer { value: 1 });
    outer.borrow_mut().set("b", Object::Integer { value: 2 });

    let inner = Environment::new_enclosed(outer.clone());
    inner.borrow_mut().set("a", Object::Integer { value: 10 });

    assert_eq!(inner.borrow().get("a"), Some(Object::Integer { value: 10 }));
    assert_eq!(inner.borrow().get("b"), Some(Object::Integer { value: 2 }));
    assert_eq!(inner.borrow().get("c"), None);

    // writes never leak outward
    assert_eq!(outer.borrow().get("a"), Some(Object::Integer { value: 1 }));

    let sibling = Environment::new_enclosed(outer.clone());
    assert_eq!(sibling.borrow().get("a"), Some(Object::Integer { value: 1 }));
}

#[test]
fn test_identity() {
    let array = Object::array(vec![Object::Integer { value: 1 }]);
    let same = array.clone();
    let equal = Object::array(vec![Object::Integer { value: 1 }]);

    assert!(array.is_identical(&same));
    assert!(!array.is_identical(&equal));
    assert_eq!(array, equal);

    assert!(TRUE.is_identical(&Object::from_bool(true)));
    assert!(!TRUE.is_identical(&FALSE));
    assert!(NULL.is_identical(&NULL));
    assert!(!NULL.is_identical(&FALSE));
}

#[test]
fn test_hash_inspect_keeps_insertion_order() {
    let mut pairs = IndexMap::new();

    for (name, value) in [("e", 5), ("a", 1), ("d", 4), ("b", 2), ("c", 3)] {
        let key = Object::string(name);
        pairs.insert(
            key.hash_key().unwrap(),
            HashPair { key, value: Object::Integer { value } }
        );
    }

    let hash = Object::Hash { pairs: Rc::new(pairs) };

    assert_eq!(hash.inspect(), "{e: 5, a: 1, d: 4, b: 2, c: 3}");
}

#[test]
fn test_truthiness() {
    assert!(TRUE.is_truthy());
    assert!(!FALSE.is_truthy());
    assert!(!NULL.is_truthy());
    assert!(Object::Integer { value: 0 }.is_truthy());
    assert!(Object::string("").is_truthy());
}

#[test]
fn test_inspect() {
    let key = Object::string("a");
    let mut pairs = IndexMap::new();
    pairs.insert(
        key.hash_key().unwrap(),
        HashPair { key, value: Object::Integer { value: 1 } }
    );

    let tests = [
        (Object::Integer { value: -5 }, "-5"),
        (Object::string("text"), "text"),
        (TRUE, "true"),
        (NULL, "null"),
        (Object::array(vec![Object::Integer { value: 1 }, Object::string("x")]), "[1, x]"),
        (Object::Hash { pairs: Rc::new(pairs) }, "{a: 1}"),
        (Object::error("boom"), "ERROR: boom"),
        (Object::ReturnValue { value: Box::new(Object::Integer { value: 3 }) }, "3"),
    ];

    for (object, expected) in tests {
        assert_eq!(object.inspect(), expected);
    }
}

#[test]
fn test_object_type_names() {
    assert_eq!(ObjectType::Integer.to_string(), "INTEGER");
    assert_eq!(ObjectType::ReturnValue.to_string(), "RETURN_VALUE");
    assert_eq!(Object::error("x")._type().to_string(), "ERROR");
    assert_eq!(Object::string("x")._type().to_string(), "STRING");
}
