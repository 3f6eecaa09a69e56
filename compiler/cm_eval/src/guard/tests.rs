use pretty_assertions::assert_eq;

use super::*;
use cm_value::{Guard, HostEvent, RefHost, Value};

#[test]
fn missing_guard_passes_without_host_call() {
    let mut host = RefHost::new();
    assert!(check_guard(&mut host, None, &Bindings::new()).unwrap());
    assert!(host.events().is_empty());
}

#[test]
fn guard_sees_bindings() {
    let mut host = RefHost::new();
    let n = host.intern("n");
    let guard = host.add_guard(Guard::IntAbove { name: n, bound: 3 });

    let mut bindings = Bindings::new();
    bindings.bind(n, Value::int(5));
    assert!(check_guard(&mut host, Some(guard), &bindings).unwrap());

    bindings.clear();
    bindings.bind(n, Value::int(2));
    assert!(!check_guard(&mut host, Some(guard), &bindings).unwrap());
    assert_eq!(host.events(), &[HostEvent::Guard(guard), HostEvent::Guard(guard)]);
}

#[test]
fn raising_guard_is_a_host_error() {
    let mut host = RefHost::new();
    let guard = host.add_guard(Guard::Raise("nope".to_owned()));
    let err = check_guard(&mut host, Some(guard), &Bindings::new()).unwrap_err();
    assert!(err.is_host_error());
    assert_eq!(err.to_string(), "nope");
}
