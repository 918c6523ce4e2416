//! Integration tests for nested schemas, named references and recursion.

use serde_json::json;
use trellis::{
    global_registry, Error, Field, FieldView, Schema, SchemaErrors, SchemaOptions,
    SchemaRegistry,
};

fn unwrap_errors(error: Error) -> SchemaErrors {
    match error {
        Error::Validation(errors) => errors,
        other => panic!("expected validation errors, got {other:?}"),
    }
}

fn actor() -> Schema {
    Schema::builder("Actor")
        .field("first_name", Field::string().required())
        .field("last_name", Field::string().required())
        .build()
}

#[test]
fn test_nested_schema_validates_recursively() {
    let movie = Schema::builder("Movie")
        .field("title", Field::string().required())
        .field("director", Field::nested(actor()).required())
        .build();

    let out = movie
        .validate(&json!({
            "title": "Alien",
            "director": {"first_name": "Ridley", "last_name": "Scott"},
        }))
        .unwrap();
    assert_eq!(out["director"]["first_name"], json!("Ridley"));
}

#[test]
fn test_nested_errors_wrap_under_the_field_key() {
    let movie = Schema::builder("Movie")
        .field("director", Field::nested(actor()).required())
        .build();

    let errors = unwrap_errors(
        movie
            .validate(&json!({"director": {"first_name": "Ridley"}}))
            .unwrap_err(),
    );
    let director = errors.get("director").unwrap();
    assert_eq!(director.code, "invalid");
    assert_eq!(director.message, "Invalid Schema");
    assert_eq!(
        director.errors.as_ref().unwrap()["last_name"].code,
        "required"
    );
}

#[test]
fn test_non_mapping_value_for_nested_field() {
    let movie = Schema::builder("Movie")
        .field("director", Field::nested(actor()).required())
        .build();

    let errors = unwrap_errors(movie.validate(&json!({"director": "Ridley"})).unwrap_err());
    assert_eq!(errors.get("director").unwrap().code, "invalid_mapping");
}

#[test]
fn test_named_reference_resolves_through_global_registry() {
    // declared before the target schema exists
    let movie = Schema::builder("Movie")
        .field("director", Field::nested_named("nested_test::Director").required())
        .build();

    let pending = movie.validate(&json!({"director": {"name": "Ridley"}}));
    assert!(matches!(pending.unwrap_err(), Error::Registry(_)));

    global_registry().register(
        "nested_test::Director",
        Schema::builder("Director")
            .field("name", Field::string().required())
            .build(),
    );

    let out = movie.validate(&json!({"director": {"name": "Ridley"}})).unwrap();
    assert_eq!(out["director"]["name"], json!("Ridley"));
}

#[test]
fn test_named_reference_with_custom_registry() {
    let registry = SchemaRegistry::new();
    registry.register(
        "Director",
        Schema::builder("Director")
            .field("name", Field::string().required())
            .build(),
    );

    let movie = Schema::builder("Movie")
        .field(
            "director",
            Field::nested_named("Director").registry(registry).required(),
        )
        .build();

    let out = movie.validate(&json!({"director": {"name": "Ridley"}})).unwrap();
    assert_eq!(out["director"]["name"], json!("Ridley"));
}

#[test]
fn test_circular_references_between_schemas() {
    let registry = SchemaRegistry::new();
    registry.register(
        "Node",
        Schema::builder("Node")
            .field("value", Field::integer().required())
            .field(
                "next",
                Field::nested_named("Node").registry(registry.clone()),
            )
            .build(),
    );

    let node = registry.get("Node").unwrap();
    let out = node
        .validate(&json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}}))
        .unwrap();
    assert_eq!(out["next"]["next"]["value"], json!(3));
}

#[test]
fn test_self_reference() {
    let tree = Schema::builder("Tree")
        .field("value", Field::integer().required())
        .field("left", Field::self_ref())
        .field("right", Field::self_ref())
        .build();

    let out = tree
        .validate(&json!({
            "value": 1,
            "left": {"value": 2},
            "right": {"value": 3, "left": {"value": 4}},
        }))
        .unwrap();
    assert_eq!(out["right"]["left"]["value"], json!(4));

    let errors = unwrap_errors(
        tree.validate(&json!({"value": 1, "left": {"left": {}}}))
            .unwrap_err(),
    );
    let left = errors.get("left").unwrap();
    assert_eq!(left.code, "invalid");
    let inner = &left.errors.as_ref().unwrap()["left"];
    assert_eq!(inner.errors.as_ref().unwrap()["value"].code, "required");
}

#[test]
fn test_max_depth_guards_runaway_recursion() {
    let tree = Schema::builder("Tree")
        .options(SchemaOptions::new().max_depth(3))
        .field("value", Field::integer().required())
        .field("next", Field::self_ref())
        .build();

    let ok = json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}});
    assert!(tree.validate(&ok).is_ok());

    let too_deep = json!({
        "value": 1,
        "next": {"value": 2, "next": {"value": 3, "next": {"value": 4, "next": {"value": 5}}}},
    });
    let errors = unwrap_errors(tree.validate(&too_deep).unwrap_err());
    let mut error = errors.get("next").unwrap();
    while let Some(children) = error.errors.as_ref() {
        error = &children["next"];
    }
    assert_eq!(error.code, "max_depth");
    assert_eq!(error.message, "Maximum schema depth exceeded");
}

#[test]
fn test_field_view_restricts_the_sub_schema() {
    let movie = Schema::builder("Movie")
        .field(
            "director",
            Field::nested(actor())
                .view(FieldView {
                    whitelist: vec!["first_name".to_string()],
                    ..FieldView::default()
                })
                .required(),
        )
        .build();

    // last_name is outside the view: not required, not emitted
    let out = movie
        .validate(&json!({"director": {"first_name": "Ridley"}}))
        .unwrap();
    assert_eq!(out["director"], json!({"first_name": "Ridley"}));
}

#[test]
fn test_halt_on_error_propagates_into_sub_schemas() {
    let movie = Schema::builder("Movie")
        .field("director", Field::nested(actor()).required())
        .build();

    let errors = unwrap_errors(
        movie
            .validate_with(
                &json!({"director": {}}),
                trellis::CallOptions::new().halt_on_error(),
            )
            .unwrap_err(),
    );
    let children = errors.get("director").unwrap().errors.as_ref().unwrap();
    assert_eq!(children.len(), 1);
}

#[test]
fn test_nested_serialize_applies_sub_renames() {
    let sub = Schema::builder("Inner")
        .field("name", Field::string().rename("displayName"))
        .build();
    let outer = Schema::builder("Outer")
        .field("inner", Field::nested(sub).required())
        .build();

    let out = outer
        .serialize(&json!({"inner": {"name": "ciri"}}))
        .unwrap();
    assert_eq!(out["inner"], json!({"displayName": "ciri"}));
}

#[test]
fn test_nested_deserialize_produces_plain_maps() {
    let sub = Schema::builder("Inner")
        .field("name", Field::string().required().load("innerName"))
        .build();
    let outer = Schema::builder("Outer")
        .field("inner", Field::nested(sub).required())
        .build();

    let instance = outer
        .deserialize(&json!({"inner": {"innerName": "ciri"}}))
        .unwrap();
    assert_eq!(instance.get("inner"), Some(&json!({"name": "ciri"})));
}
