use eyre::Result;
use facet_fixture::{
    Arguments, Constructor, Def, Field, FieldAttribute, FieldFlags, Fixture, FixtureConfig,
    FixtureErrorKind, Shape, ShapeRegistry, StructDef, TypeRef, Value, Visibility,
};
use facet_fixture_testhelpers::{seed, test};

fn tagged(via: &'static str) -> impl Fn(Arguments) -> Value + Send + Sync + 'static {
    move |args: Arguments| {
        let mut fields = args.values;
        fields.push(("via".to_string(), Value::from(via)));
        Value::Record {
            type_name: args.type_name,
            fields,
        }
    }
}

fn account_fields() -> [Field; 5] {
    [
        Field::parsed("id", "u64"),
        Field::parsed("owner", "String"),
        Field::parsed("balance", "i64"),
        Field::parsed("active", "bool"),
        Field::parsed("tags", "Vec<String>"),
    ]
}

fn at_least(min: &str) -> FieldAttribute {
    FieldAttribute::Range {
        min: Some(min.to_string()),
        max: None,
    }
}

fn registry() -> ShapeRegistry {
    let mut registry = ShapeRegistry::new();
    registry
        .register(Shape::record(
            "Account",
            StructDef::new()
                .fields(account_fields())
                .field(Field::parsed("via", "String").flags(FieldFlags::READ_ONLY))
                .constructor(Constructor::new(Visibility::Private).invoker(tagged("private")))
                .constructor(
                    Constructor::new(Visibility::Protected)
                        .params([Field::parsed("id", "u64"), Field::parsed("owner", "String")])
                        .invoker(tagged("protected")),
                )
                .constructor(
                    Constructor::public()
                        .params(account_fields())
                        .invoker(tagged("public")),
                ),
        ))
        .register(Shape::record(
            "Person",
            StructDef::new()
                .fields([
                    Field::parsed("name", "String").attribute(FieldAttribute::value("Ada")),
                    Field::parsed("code", "String").attribute(FieldAttribute::value("X")),
                    Field::parsed("age", "u8").attribute(FieldAttribute::range(18, 99)),
                    Field::parsed("id", "u32").flags(FieldFlags::READ_ONLY),
                    Field::parsed("secret", "String").flags(FieldFlags::EXCLUDED),
                ])
                .constructor(Constructor::public().param(Field::parsed("name", "String"))),
        ))
        .register(Shape::record(
            "Broken",
            StructDef::new()
                .field(Field::parsed("age", "i32").attribute(FieldAttribute::value("abc")))
                .constructor(Constructor::public()),
        ))
        .register(Shape::abstract_type("Animal"))
        .register(Shape::record(
            "Owner",
            StructDef::new()
                .field(Field::parsed("name", "String"))
                .field(Field::parsed("pet", "Animal").flags(FieldFlags::NULLABLE))
                .constructor(Constructor::public()),
        ))
        .register(Shape::record(
            "StrictOwner",
            StructDef::new()
                .field(Field::parsed("pet", "Animal"))
                .constructor(Constructor::public()),
        ))
        .register(Shape::record("Sealed", StructDef::new()))
        .register(Shape::record(
            "Needy",
            StructDef::new()
                .field(Field::parsed("sealed", "Sealed"))
                .constructor(Constructor::public().param(Field::parsed("sealed", "Sealed"))),
        ))
        .register(Shape::record(
            "Registry",
            StructDef::new()
                .field(Field::parsed("id", "u32"))
                .constructor(Constructor::new(Visibility::Private))
                .constructor(
                    Constructor::factory("getInstance", Visibility::Public)
                        .param(Field::parsed("id", "u32").attribute(FieldAttribute::value("7"))),
                ),
        ))
        .register(Shape::record(
            "Extremes",
            StructDef::new()
                .fields([
                    Field::parsed("wide", "f64").attribute(FieldAttribute::range("-1e308", "1e308")),
                    Field::parsed("huge", "f64").attribute(at_least("1e308")),
                    Field::parsed("narrow", "f32").attribute(at_least("3e38")),
                    Field::parsed("tiny", "BigDecimal")
                        .attribute(FieldAttribute::range("0.001", "0.009")),
                ])
                .constructor(Constructor::public()),
        ))
        .register(
            Shape::builder("Pair")
                .type_params(["A", "B"])
                .def(Def::Struct(
                    StructDef::new()
                        .fields([Field::parsed("left", "A"), Field::parsed("right", "Vec<B>")])
                        .constructor(Constructor::public()),
                ))
                .build(),
        );
    registry
}

#[test]
fn picks_the_public_constructor_with_most_parameters() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let account = fixture.manufacture(&TypeRef::named("Account"))?;
    assert_eq!(account.field("via"), Some(&Value::from("public")));
    for name in ["id", "owner", "balance"] {
        let value = account.field(name).unwrap();
        assert!(!value.is_zero_default(), "{name} = {value}");
    }
    assert!(matches!(account.field("active"), Some(Value::Bool(_))));
    assert_eq!(account.field("tags").and_then(Value::len), Some(5));
    Ok(())
}

#[test]
fn literals_hints_and_flags() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    for _ in 0..20 {
        let person = fixture.manufacture(&TypeRef::named("Person"))?;
        // the constructor parameter takes the attributes of its field
        assert_eq!(person.field("name"), Some(&Value::from("Ada")));
        assert_eq!(person.field("code"), Some(&Value::from("X")));
        let age = person.field("age").and_then(Value::as_i64).unwrap();
        assert!((18..=99).contains(&age), "{age}");
        assert_eq!(person.field("id"), Some(&Value::Null));
        assert_eq!(person.field("secret"), Some(&Value::Null));
    }
    Ok(())
}

#[test]
fn invalid_literal_fails_without_an_instance() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let err = fixture
        .manufacture(&TypeRef::named("Broken"))
        .unwrap_err();
    assert!(matches!(
        err.kind,
        FixtureErrorKind::InvalidAnnotationValue { .. }
    ));
    insta::assert_snapshot!(err, @r#"Invalid annotation value "abc" for i32: not a valid i32 (at Broken.age)"#);
    Ok(())
}

#[test]
fn unresolvable_fields_are_null_only_when_allowed() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let owner = fixture.manufacture(&TypeRef::named("Owner"))?;
    assert_eq!(owner.field("pet"), Some(&Value::Null));
    assert!(owner.field("name").and_then(Value::as_str).is_some());

    let err = fixture
        .manufacture(&TypeRef::named("StrictOwner"))
        .unwrap_err();
    insta::assert_snapshot!(err, @"Cannot resolve Animal: abstract type without a registered substitute (at StrictOwner.pet)");

    let mut lenient =
        Fixture::seeded(registry(), seed()).with_config(FixtureConfig::default().allow_nulls(true));
    let owner = lenient.manufacture(&TypeRef::named("StrictOwner"))?;
    assert_eq!(owner.field("pet"), Some(&Value::Null));
    Ok(())
}

#[test]
fn no_usable_constructor() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let err = fixture.manufacture(&TypeRef::named("Needy")).unwrap_err();
    insta::assert_snapshot!(err, @"None of the 1 construction candidates of Needy has resolvable parameters (at Needy)");

    let err = fixture.manufacture(&TypeRef::named("Sealed")).unwrap_err();
    assert!(matches!(err.kind, FixtureErrorKind::UnresolvableShape { .. }));
    Ok(())
}

#[test]
fn static_factory_outranks_private_constructor() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let instance = fixture.manufacture(&TypeRef::named("Registry"))?;
    assert_eq!(instance.field("id"), Some(&Value::U32(7)));
    Ok(())
}

#[test]
fn generic_records_bind_their_parameters() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let pair = fixture.manufacture_str("Pair<String, u8>")?;
    assert!(pair.field("left").and_then(Value::as_str).is_some());
    let right = pair.field("right").and_then(Value::as_list).unwrap();
    assert_eq!(right.len(), 5);
    assert!(right.iter().all(|v| matches!(v, Value::U8(n) if *n >= 1)));
    assert_eq!(pair.shape.as_ref().unwrap().type_identifier, "Pair");
    Ok(())
}

#[test]
fn extreme_ranges_stay_finite_and_inside() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    for _ in 0..50 {
        let extremes = fixture.manufacture(&TypeRef::named("Extremes"))?;
        let wide = extremes.field("wide").and_then(Value::as_f64).unwrap();
        assert!(wide.is_finite() && wide.abs() <= 1e308, "{wide}");
        let huge = extremes.field("huge").and_then(Value::as_f64).unwrap();
        assert!(huge.is_finite() && huge >= 1e308, "{huge}");
        let Some(Value::F32(narrow)) = extremes.field("narrow") else {
            panic!("expected an f32");
        };
        assert!(narrow.is_finite() && *narrow >= 3e38, "{narrow}");

        let Some(Value::BigDecimal(tiny)) = extremes.field("tiny") else {
            panic!("expected a decimal");
        };
        let (units, scale) = tiny.as_bigint_and_exponent();
        assert_eq!(scale, 3, "{tiny}");
        assert!((1..=9).contains(&units.to_string().parse::<i32>()?), "{tiny}");
    }
    Ok(())
}
