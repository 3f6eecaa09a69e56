use pretty_assertions::assert_eq;

use super::*;
use cm_value::{ClassDef, HostEvent, RefHost, Value};

#[test]
fn views_are_realized_once_per_path() {
    let mut host = RefHost::new();
    let mut scratch = Scratch::new();
    let root = AccessPath::new();
    let subject = Value::list(vec![Value::int(1), Value::int(2)]);

    let a = scratch.sequence_view(&mut host, &root, &subject).unwrap();
    let b = scratch.sequence_view(&mut host, &root, &subject).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(host.count(|e| matches!(e, HostEvent::SequenceView(_))), 1);
}

#[test]
fn distinct_paths_have_distinct_memos() {
    let mut host = RefHost::new();
    let mut scratch = Scratch::new();
    let inner = Value::list(vec![Value::int(1)]);
    let root = AccessPath::new();
    let nested = child(&root, PathStep::Index(0));

    scratch.sequence_view(&mut host, &root, &inner).unwrap();
    scratch.sequence_view(&mut host, &nested, &inner).unwrap();
    assert_eq!(host.count(|e| matches!(e, HostEvent::SequenceView(_))), 2);
    assert_eq!(scratch.len(), 2);
}

#[test]
fn mapping_view_indexes_keys() {
    let mut host = RefHost::new();
    let key = MapKey::Str(host.intern("x"));
    let mut scratch = Scratch::new();
    let subject = Value::dict(vec![(Value::string("x"), Value::int(1))]);
    let view = scratch
        .mapping_view(&mut host, &AccessPath::new(), &subject)
        .unwrap();
    assert_eq!(view.get(&key), Some(&Value::int(1)));
}

#[test]
fn attributes_memoize_absence_too() {
    let mut host = RefHost::new();
    let cls = host.define_class(ClassDef::new(host.intern("C"))).unwrap();
    let v = host.instance(cls, &[("a", Value::int(1))], vec![]);
    let a = host.intern("a");
    let missing = host.intern("missing");
    let mut scratch = Scratch::new();
    let root = AccessPath::new();

    for _ in 0..3 {
        assert_eq!(
            scratch.attribute(&mut host, &root, &v, a).unwrap(),
            Some(Value::int(1))
        );
        assert_eq!(scratch.attribute(&mut host, &root, &v, missing).unwrap(), None);
    }
    assert_eq!(host.count(|e| matches!(e, HostEvent::GetAttr { .. })), 2);
}

#[test]
fn declared_attrs_and_items_once() {
    let mut host = RefHost::new();
    let x = host.intern("x");
    let cls = host
        .define_class(ClassDef::new(host.intern("P")).with_match_args([x]))
        .unwrap();
    let v = host.instance(cls, &[], vec![Value::int(7)]);
    let mut scratch = Scratch::new();
    let root = AccessPath::new();

    for _ in 0..2 {
        assert_eq!(&*scratch.declared_attrs(&mut host, &root, &v).unwrap(), &[x]);
        assert_eq!(
            &*scratch.deconstructed_items(&mut host, &root, &v).unwrap(),
            &[Value::int(7)]
        );
    }
    assert_eq!(
        host.events(),
        &[HostEvent::MatchArgs(cls), HostEvent::Deconstruct(cls)]
    );
}

#[test]
fn host_errors_are_not_cached() {
    let mut host = RefHost::new();
    let mut scratch = Scratch::new();
    let root = AccessPath::new();
    assert!(scratch.sequence_view(&mut host, &root, &Value::int(1)).is_err());
    assert!(scratch.sequence_view(&mut host, &root, &Value::int(1)).is_err());
    assert_eq!(host.events().len(), 2);
}
