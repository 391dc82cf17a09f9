use std::io::{Seek, SeekFrom, Write};

use memo_core::{hash, Column, ColumnKind, FileRef, Heap, Opaque, Table, Value};
use serde_json::json;

fn fp(v: impl Into<Value>) -> memo_core::Fingerprint {
    hash(&Heap::new(), &v.into())
}

#[test]
fn bool_and_int_never_collide() {
    assert_ne!(fp(true), fp(1));
    assert_ne!(fp(false), fp(0));
    assert_eq!(fp(true), fp(true));
}

#[test]
fn tuple_list_and_scalar_are_distinct() {
    assert_ne!(fp(Value::tuple([1, 2])), fp(Value::list([1, 2])));
    assert_ne!(fp(Value::list([1])), fp(1));
    assert_ne!(fp(Value::list([1])), fp(Value::set([1])));
    assert_ne!(fp(Value::str("a")), fp(Value::bytes(b"a".to_vec())));
}

#[test]
fn neighbouring_integers_differ() {
    for n in -300i64..300 {
        assert_ne!(fp(n), fp(n + 1), "n={n}");
    }
    for n in [127i128, 128, 255, 256, 32767, 32768, i64::MAX as i128, -129, -128] {
        assert_ne!(fp(n), fp(n + 1), "n={n}");
        assert_ne!(fp(n), fp(n - 1), "n={n}");
    }
    assert_ne!(fp(u64::MAX), fp(-1));
}

#[test]
fn close_floats_differ() {
    assert_ne!(fp(23.5234), fp(23.5235));
    assert_eq!(fp(0.1), fp(0.1));
    assert_ne!(fp(1.0), fp(1));
}

#[test]
fn map_order_is_irrelevant_but_list_order_is_not() {
    let ab = Value::map([("a", 1), ("b", 2)]);
    let ba = Value::map([("b", 2), ("a", 1)]);
    assert_eq!(fp(ab), fp(ba));
    assert_ne!(fp(Value::list([1, 2])), fp(Value::list([2, 1])));
    assert_ne!(fp(Value::map([("a", 1)])), fp(Value::map([("a", 2)])));
}

#[test]
fn sets_ignore_order_and_duplicates() {
    assert_eq!(fp(Value::set([3, 1, 2])), fp(Value::set([1, 2, 3])));
    assert_eq!(fp(Value::set([1, 1, 2])), fp(Value::set([2, 1])));
}

#[test]
fn nested_containers_compare_structurally() {
    let a = Value::list([Value::map([("k", Value::tuple([1, 2]))]), Value::str("x")]);
    let b = Value::list([Value::map([("k", Value::tuple([1, 2]))]), Value::str("x")]);
    let c = Value::list([Value::map([("k", Value::list([1, 2]))]), Value::str("x")]);
    assert_eq!(fp(a.clone()), fp(b));
    assert_ne!(fp(a), fp(c));
}

#[test]
fn json_objects_convert_and_hash_without_key_order() {
    let a = Value::from(json!({"b": [1, 2], "a": null}));
    let b = Value::from(json!({"a": null, "b": [1, 2]}));
    assert_eq!(fp(a), fp(b));
}

#[test]
fn tables_hash_schema_and_rows() {
    let cols = || vec![Column::new("id", ColumnKind::Int), Column::new("name", ColumnKind::Str)];
    let t1 = Table::new(cols()).with_row(vec![1.into(), "a".into()]).unwrap();
    let t2 = Table::new(cols()).with_row(vec![1.into(), "a".into()]).unwrap();
    let t3 = Table::new(cols()).with_row(vec![1.into(), "b".into()]).unwrap();
    let relabeled = vec![Column::new("id", ColumnKind::Int), Column::new("label", ColumnKind::Str)];
    let renamed = Table::new(relabeled).with_row(vec![1.into(), "a".into()]).unwrap();
    assert_eq!(fp(t1.clone()), fp(t2));
    assert_ne!(fp(t1.clone()), fp(t3));
    assert_ne!(fp(t1), fp(renamed));
}

#[test]
fn tables_reject_ragged_or_mistyped_rows() {
    let mut t = Table::new(vec![Column::new("id", ColumnKind::Int)]);
    assert!(t.push_row(vec![1.into(), 2.into()]).is_err());
    let cols = vec![(Column::new("a", ColumnKind::Int), vec![1.into(), 2.into()]), (Column::new("b", ColumnKind::Int), vec![1.into()])];
    assert!(Table::from_columns(cols).is_err());
    let mistyped = vec![(Column::new("a", ColumnKind::Float), vec![1.5.into(), "x".into()])];
    assert!(matches!(Table::from_columns(mistyped), Err(memo_core::CoreError::CellKind { ref column, .. }) if column == "a"));
}

#[test]
fn file_handles_hash_by_path_and_offset() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "first line").unwrap();
    writeln!(tmp, "second line").unwrap();
    tmp.flush().unwrap();
    tmp.as_file_mut().seek(SeekFrom::Start(0)).unwrap();

    let a = FileRef::open(tmp.path()).unwrap();
    let b = FileRef::open(tmp.path()).unwrap();
    assert_eq!(fp(a.clone()), fp(b.clone()));

    assert_eq!(a.read_line().unwrap(), "first line\n");
    assert_ne!(fp(a.clone()), fp(b.clone()));

    a.seek(SeekFrom::Start(0)).unwrap();
    assert_eq!(fp(a.clone()), fp(b.clone()));

    let other = tempfile::NamedTempFile::new().unwrap();
    let c = FileRef::open(other.path()).unwrap();
    assert_ne!(fp(a), fp(c));
}

#[test]
fn opaque_values_hash_by_identity() {
    let o = Opaque::new("socket");
    assert_eq!(fp(o.clone()), fp(o));
    assert_ne!(fp(Opaque::new("socket")), fp(Opaque::new("socket")));
}

#[test]
fn hashing_is_stable_across_calls() {
    let v = Value::map([("xs", Value::list([1.5, 2.5])), ("flag", Value::Bool(true))]);
    let first = fp(v.clone());
    for _ in 0..5 {
        assert_eq!(fp(v.clone()), first);
    }
    assert_eq!(first.to_hex().len(), 64);
}
