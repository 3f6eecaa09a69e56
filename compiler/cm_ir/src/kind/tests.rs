use pretty_assertions::assert_eq;

use super::*;

#[test]
fn undeclared_is_default_class_no_shape() {
    assert_eq!(MatchKind::default(), MatchKind::UNDECLARED);
    assert_eq!(MatchKind::UNDECLARED.shape, Shape::None);
    assert_eq!(MatchKind::UNDECLARED.class_mode, ClassMode::Default);
}

#[test]
fn conforming_declarations_decode() {
    let list = MatchKind::from_flags(KindFlags::SEQUENCE | KindFlags::SELF);
    assert_eq!(
        list,
        Ok(MatchKind::new(Shape::Sequence, ClassMode::SelfValue))
    );

    let record = MatchKind::from_flags(KindFlags::POSITIONAL);
    assert_eq!(record, Ok(MatchKind::new(Shape::None, ClassMode::Positional)));

    let bare_mapping = MatchKind::from_flags(KindFlags::MAPPING);
    assert_eq!(
        bare_mapping,
        Ok(MatchKind::new(Shape::Mapping, ClassMode::Opaque))
    );
}

#[test]
fn each_exclusivity_rule_is_reported() {
    let cases = [
        (
            KindFlags::SEQUENCE | KindFlags::MAPPING,
            KindConflict::SequenceAndMapping,
        ),
        (
            KindFlags::DEFAULT | KindFlags::POSITIONAL,
            KindConflict::DefaultAndPositional,
        ),
        (KindFlags::DEFAULT | KindFlags::SELF, KindConflict::DefaultAndSelf),
        (
            KindFlags::POSITIONAL | KindFlags::SELF,
            KindConflict::PositionalAndSelf,
        ),
    ];
    for (flags, expected) in cases {
        assert_eq!(MatchKind::from_flags(flags), Err(expected), "{flags:?}");
    }
}

#[test]
fn first_broken_rule_wins() {
    let flags = KindFlags::all();
    assert_eq!(
        MatchKind::from_flags(flags),
        Err(KindConflict::SequenceAndMapping)
    );
}

#[test]
fn lenient_precedence() {
    let kind = MatchKind::lenient(KindFlags::all());
    assert_eq!(kind, MatchKind::new(Shape::Sequence, ClassMode::Positional));

    let kind = MatchKind::lenient(KindFlags::DEFAULT | KindFlags::SELF);
    assert_eq!(kind.class_mode, ClassMode::SelfValue);
}

#[test]
fn flags_roundtrip_for_conforming_kinds() {
    let shapes = [Shape::None, Shape::Sequence, Shape::Mapping];
    let modes = [
        ClassMode::Opaque,
        ClassMode::Default,
        ClassMode::Positional,
        ClassMode::SelfValue,
    ];
    for shape in shapes {
        for mode in modes {
            let kind = MatchKind::new(shape, mode);
            assert_eq!(MatchKind::from_flags(kind.to_flags()), Ok(kind));
        }
    }
}
