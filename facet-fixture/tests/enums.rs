use std::collections::BTreeSet;

use eyre::Result;
use facet_fixture::{
    Constructor, Field, FieldAttribute, Fixture, FixtureErrorKind, Shape, ShapeRegistry,
    StructDef, TypeRef, Value,
};
use facet_fixture_testhelpers::{seed, test};

fn registry() -> ShapeRegistry {
    let mut registry = ShapeRegistry::new();
    registry
        .register(Shape::enumeration("Color", ["Red", "Green", "Blue"]))
        .register(Shape::enumeration("Nothing", Vec::<String>::new()))
        .register(Shape::record(
            "Paint",
            StructDef::new()
                .field(Field::parsed("color", "Color"))
                .field(Field::parsed("accent", "Option<Color>"))
                .field(Field::parsed("base", "Color").attribute(FieldAttribute::value("Green")))
                .constructor(Constructor::public()),
        ))
        .register(Shape::record(
            "BadPaint",
            StructDef::new()
                .field(Field::parsed("base", "Color").attribute(FieldAttribute::value("Purple")))
                .constructor(Constructor::public()),
        ));
    registry
}

#[test]
fn only_declared_constants() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let mut seen = BTreeSet::new();
    for _ in 0..60 {
        let color = fixture.manufacture(&TypeRef::named("Color"))?;
        assert_eq!(color.type_name(), Some("Color"));
        seen.insert(color.as_constant().unwrap().to_string());
    }
    assert!(seen.len() > 1, "{seen:?}");
    assert!(seen.iter().all(|c| ["Red", "Green", "Blue"].contains(&c.as_str())));
    Ok(())
}

#[test]
fn empty_enumeration_fails() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let err = fixture.manufacture(&TypeRef::named("Nothing")).unwrap_err();
    assert!(matches!(err.kind, FixtureErrorKind::EmptyEnumeration { .. }));
    insta::assert_snapshot!(err, @"Enumeration Nothing declares no constants (at Nothing)");
    Ok(())
}

#[test]
fn enum_fields_and_literals() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let paint = fixture.manufacture(&TypeRef::named("Paint"))?;
    assert!(paint.field("color").and_then(Value::as_constant).is_some());
    assert!(paint.field("accent").and_then(Value::as_constant).is_some());
    assert_eq!(
        paint.field("base"),
        Some(&Value::Enum {
            type_name: "Color".into(),
            constant: "Green".into(),
        })
    );

    let err = fixture.manufacture(&TypeRef::named("BadPaint")).unwrap_err();
    insta::assert_snapshot!(err, @r#"Invalid annotation value "Purple" for Color: not a declared constant (at BadPaint.base)"#);
    Ok(())
}
