use pretty_assertions::assert_eq;

use super::*;

fn n(raw: u32) -> Name {
    Name::from_raw(raw)
}

#[test]
fn singleton_literals() {
    assert!(Literal::None.is_singleton());
    assert!(Literal::Bool(false).is_singleton());
    assert!(!Literal::Int(0).is_singleton());
    assert!(!Literal::Str(n(1)).is_singleton());
}

#[test]
fn literal_keys_match_normalized_host_keys() {
    assert_eq!(Literal::Bool(true).map_key(), MapKey::Int(1));
    assert_eq!(Literal::float(2.0).map_key(), MapKey::Int(2));
    assert_eq!(Literal::Str(n(4)).map_key(), MapKey::Str(n(4)));
}

#[test]
fn irrefutability() {
    assert!(Pattern::Wildcard.is_irrefutable());
    assert!(Pattern::Capture(n(1)).is_irrefutable());
    assert!(Pattern::Capture(n(1)).as_name(n(2)).is_irrefutable());
    assert!(Pattern::Or(vec![Pattern::Literal(Literal::Int(1)), Pattern::Wildcard]).is_irrefutable());
    assert!(!Pattern::seq(vec![]).is_irrefutable());
    assert!(!Pattern::Literal(Literal::None).is_irrefutable());
}

#[test]
fn bound_names_in_binding_order() {
    // {"k": [a, *b], **rest} as whole
    let pattern = Pattern::mapping(
        vec![(
            Literal::Str(n(10)),
            Pattern::seq_with_star(vec![Pattern::Capture(n(1)), Pattern::Capture(n(2))], 1),
        )],
        Some(n(3)),
    )
    .as_name(n(4));
    assert_eq!(pattern.bound_names().as_slice(), &[n(1), n(2), n(3), n(4)]);
}

#[test]
fn class_names_positional_then_keyword() {
    let pattern = Pattern::class(
        TypeId::new(7),
        vec![Pattern::Capture(n(1))],
        vec![(n(20), Pattern::Capture(n(2)))],
    );
    assert_eq!(pattern.bound_names().as_slice(), &[n(1), n(2)]);
}

#[test]
fn clause_builder() {
    let clause = CaseClause::new(Pattern::Wildcard, BodyRef::new(3)).with_guard(GuardRef::new(1));
    assert_eq!(clause.guard, Some(GuardRef::new(1)));
    assert_eq!(clause.body, BodyRef::new(3));
}
