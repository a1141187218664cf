use eyre::Result;
use facet_fixture::{
    Constructor, Def, Field, Fixture, FixtureConfig, FixtureErrorKind, Shape, ShapeRegistry,
    StructDef, TypeRef, Value,
};
use facet_fixture_testhelpers::{seed, test};

fn record(name: &str, fields: &[(&str, &str)]) -> Shape {
    Shape::record(
        name,
        StructDef::new()
            .fields(fields.iter().map(|(name, ty)| Field::parsed(*name, ty)))
            .constructor(Constructor::public()),
    )
}

fn registry() -> ShapeRegistry {
    let mut registry = ShapeRegistry::new();
    registry
        .register(record("Node", &[("value", "i32"), ("next", "Node")]))
        .register(Shape::record(
            "Link",
            StructDef::new()
                .field(Field::parsed("next", "Link"))
                .constructor(Constructor::public().param(Field::parsed("next", "Link"))),
        ))
        .register(record("Tree", &[("label", "String"), ("children", "Vec<Tree>")]))
        .register(record("Parent", &[("child", "Child")]))
        .register(record("Child", &[("parent", "Box<Parent>"), ("name", "String")]))
        .register(record("Address", &[("street", "String"), ("zip", "u32")]))
        .register(record("Order", &[("billing", "Address"), ("shipping", "Address")]))
        .register(record("A", &[("b", "B")]))
        .register(record("B", &[("c", "C")]))
        .register(record("C", &[("d", "D")]))
        .register(record("D", &[("e", "E")]))
        .register(record("E", &[("x", "u8")]))
        .register(
            Shape::builder("Holder")
                .type_params(["T"])
                .def(Def::Struct(
                    StructDef::new()
                        .field(Field::parsed("value", "T"))
                        .constructor(Constructor::public()),
                ))
                .build(),
        )
        .register(record(
            "Holders",
            &[
                ("text", "Holder<String>"),
                ("number", "Holder<u32>"),
                ("again", "Holder<String>"),
                ("boxed", "Box<Address>"),
                ("plain", "Address"),
            ],
        ));

    // every level takes two of the level below as constructor arguments
    registry.register(record("Level0", &[("n", "u8")]));
    for level in 1..=LEVELS {
        let below = format!("Level{}", level - 1);
        registry.register(Shape::record(
            format!("Level{level}"),
            StructDef::new()
                .fields([Field::parsed("left", &below), Field::parsed("right", &below)])
                .constructor(Constructor::public().params([
                    Field::parsed("left", &below),
                    Field::parsed("right", &below),
                ])),
        ));
    }
    registry
}

const LEVELS: usize = 24;

#[test]
fn self_reference_terminates_with_placeholder() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let node = fixture.manufacture(&TypeRef::named("Node"))?;
    assert!(node.field("value").and_then(Value::as_i64).is_some());
    assert_eq!(node.field("next"), Some(&Value::Null));

    // through a constructor parameter, too
    let link = fixture.manufacture(&TypeRef::named("Link"))?;
    assert_eq!(link.field("next"), Some(&Value::Null));
    Ok(())
}

#[test]
fn self_referencing_collections_are_empty() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let tree = fixture.manufacture(&TypeRef::named("Tree"))?;
    assert_eq!(tree.field("children"), Some(&Value::List(vec![])));
    Ok(())
}

#[test]
fn mutual_reference() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed());

    let parent = fixture.manufacture(&TypeRef::named("Parent"))?;
    let child = parent.field("child").unwrap();
    assert_eq!(child.type_name(), Some("Child"));
    assert_eq!(child.field("parent"), Some(&Value::Null));
    assert!(child.field("name").and_then(Value::as_str).is_some());
    Ok(())
}

#[test]
fn memoization_reuses_records_within_one_call() -> Result<()> {
    let order = TypeRef::named("Order");

    let mut fixture = Fixture::seeded(registry(), seed());
    let fresh = fixture.manufacture(&order)?;
    assert_ne!(fresh.field("billing"), fresh.field("shipping"));

    let mut fixture = Fixture::seeded(registry(), seed())
        .with_config(FixtureConfig::default().memoization(true));
    let first = fixture.manufacture(&order)?;
    assert_eq!(first.field("billing"), first.field("shipping"));

    // a new call starts with an empty memo
    let second = fixture.manufacture(&order)?;
    assert_ne!(first.field("billing"), second.field("billing"));
    Ok(())
}

#[test]
fn memoization_keys_on_bound_types() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed())
        .with_config(FixtureConfig::default().memoization(true));

    let holders = fixture.manufacture(&TypeRef::named("Holders"))?;
    let value_of = |name: &str| holders.field(name).and_then(|h| h.field("value")).unwrap();
    assert!(matches!(value_of("text"), Value::String(_)));
    assert!(matches!(value_of("number"), Value::U32(_)));
    assert_eq!(holders.field("text"), holders.field("again"));

    // a pointer is built as its pointee, which is memoized on its own
    let boxed = holders.field("boxed").unwrap();
    assert_eq!(boxed.type_name(), Some("Address"));
    assert_eq!(holders.field("plain"), Some(boxed));
    Ok(())
}

#[test]
fn shared_arguments_do_not_blow_up() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed())
        .with_config(FixtureConfig::default().memoization(true));

    let top = fixture.manufacture_str(&format!("Level{LEVELS}"))?;
    let mut level = top.value();
    for _ in 0..LEVELS {
        assert_eq!(level.field("left"), level.field("right"));
        level = level.field("left").unwrap();
    }
    assert_eq!(level.type_name(), Some("Level0"));
    Ok(())
}

#[test]
fn depth_is_bounded() -> Result<()> {
    let mut fixture = Fixture::seeded(registry(), seed())
        .with_config(FixtureConfig::default().max_depth(3));

    let err = fixture.manufacture(&TypeRef::named("A")).unwrap_err();
    assert!(matches!(
        err.kind,
        FixtureErrorKind::MaxDepthExceeded { max_depth: 3, .. }
    ));
    insta::assert_snapshot!(err, @"Maximum depth 3 exceeded while manufacturing E (at A.b(B).c(C).d(D).e)");

    fixture.config_mut().max_depth = 5;
    let a = fixture.manufacture(&TypeRef::named("A"))?;
    let e = ["b", "c", "d", "e"]
        .iter()
        .try_fold(a.value(), |value, name| value.field(name))
        .unwrap();
    assert!(e.field("x").and_then(Value::as_i64).is_some());
    Ok(())
}
