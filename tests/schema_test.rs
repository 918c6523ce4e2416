//! Integration tests for element selection (tags, whitelist, exclude),
//! aliases, serialization output and the encode pipeline.

use serde_json::json;
use trellis::{CallOptions, Error, Field, Schema, SchemaErrors};

fn unwrap_errors(error: Error) -> SchemaErrors {
    match error {
        Error::Validation(errors) => errors,
        other => panic!("expected validation errors, got {other:?}"),
    }
}

fn person() -> Schema {
    Schema::builder("Person")
        .field("id", Field::uuid().required().tag("identity"))
        .field("name", Field::string().required().tag("identity").tag("public"))
        .field("age", Field::integer().tag("public"))
        .field("secret", Field::string())
        .build()
}

// --- tags / whitelist / exclude ---

#[test]
fn test_tags_replace_the_element_set() {
    let schema = person();

    // only "public" fields are considered: the required id is not checked
    let out = schema
        .validate_with(
            &json!({"name": "yen", "age": 99, "secret": "s"}),
            CallOptions::new().tags(["public"]),
        )
        .unwrap();
    assert_eq!(out.len(), 2);
    assert!(out.contains_key("name"));
    assert!(out.contains_key("age"));
}

#[test]
fn test_tagged_required_fields_still_apply() {
    let schema = person();
    let errors = unwrap_errors(
        schema
            .validate_with(&json!({"age": 3}), CallOptions::new().tags(["identity"]))
            .unwrap_err(),
    );
    assert_eq!(errors.with_code("required"), vec!["id", "name"]);
}

#[test]
fn test_whitelist_restricts_exactly() {
    let schema = person();
    let out = schema
        .validate_with(
            &json!({"name": "yen", "age": 99}),
            CallOptions::new().whitelist(["age"]),
        )
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out["age"], json!(99));
}

#[test]
fn test_exclude_always_subtracts() {
    let schema = person();

    // excluding a required field suppresses its required error
    let out = schema
        .validate_with(
            &json!({"name": "yen"}),
            CallOptions::new().exclude(["id"]),
        )
        .unwrap();
    assert_eq!(out["name"], json!("yen"));

    // exclude applies after tags
    let out = schema
        .validate_with(
            &json!({"name": "yen", "age": 99}),
            CallOptions::new().tags(["public"]).exclude(["age"]),
        )
        .unwrap();
    assert_eq!(out.len(), 1);
}

// --- aliases ---

#[test]
fn test_load_alias_accepted_on_validate() {
    let schema = Schema::builder("User")
        .field("name", Field::string().required().load("userName"))
        .build();

    let out = schema.validate(&json!({"userName": "ciri"})).unwrap();
    assert_eq!(out["name"], json!("ciri"));

    // the declared key still works as a fallback
    let out = schema.validate(&json!({"name": "ciri"})).unwrap();
    assert_eq!(out["name"], json!("ciri"));
}

#[test]
fn test_rename_applies_on_serialize_only() {
    let schema = Schema::builder("User")
        .field("name", Field::string().required().rename("fullName"))
        .build();

    let validated = schema.validate(&json!({"name": "ciri"})).unwrap();
    assert_eq!(validated["name"], json!("ciri"));
    assert!(!validated.contains_key("fullName"));

    let serialized = schema.serialize(&json!({"name": "ciri"})).unwrap();
    assert_eq!(serialized["fullName"], json!("ciri"));
    assert!(!serialized.contains_key("name"));
}

#[test]
fn test_serialize_prefers_the_declared_key_over_the_alias() {
    let schema = Schema::builder("User")
        .field("name", Field::string().required().load("userName"))
        .build();

    // validate reads the alias first
    let out = schema
        .validate(&json!({"userName": "alias", "name": "declared"}))
        .unwrap();
    assert_eq!(out["name"], json!("alias"));

    // serialize reads by declared field name; the alias is only a fallback
    let out = schema
        .serialize(&json!({"userName": "alias", "name": "declared"}))
        .unwrap();
    assert_eq!(out["name"], json!("declared"));

    let out = schema.serialize(&json!({"userName": "alias"})).unwrap();
    assert_eq!(out["name"], json!("alias"));
}

#[test]
fn test_load_and_rename_roundtrip() {
    let schema = Schema::builder("User")
        .field(
            "name",
            Field::string().required().load("user_name").rename("displayName"),
        )
        .build();

    let serialized = schema.serialize(&json!({"user_name": "ciri"})).unwrap();
    assert_eq!(serialized["displayName"], json!("ciri"));

    let instance = schema.deserialize(&json!({"user_name": "ciri"})).unwrap();
    assert_eq!(instance.get("name"), Some(&json!("ciri")));
}

// --- serialize / deserialize ---

#[test]
fn test_serialize_validates_first() {
    let schema = Schema::builder("User")
        .field("age", Field::integer().required())
        .build();

    let err = schema.serialize(&json!({"age": "old"})).unwrap_err();
    let errors = unwrap_errors(err);
    assert_eq!(errors.get("age").unwrap().code, "invalid");
}

#[test]
fn test_serialize_skip_validation_trusts_input() {
    let schema = Schema::builder("User")
        .field("age", Field::integer().required())
        .build();

    let out = schema
        .serialize_with(&json!({"age": 30}), CallOptions::new().skip_validation())
        .unwrap();
    assert_eq!(out["age"], json!(30));
}

#[test]
fn test_serialize_emits_null_for_allowed_none() {
    let schema = Schema::builder("User")
        .field("nickname", Field::string().allow_none(true))
        .build();

    let out = schema.serialize(&json!({"nickname": null})).unwrap();
    assert_eq!(out["nickname"], json!(null));
}

#[test]
fn test_deserialize_returns_instance() {
    let schema = Schema::builder("User")
        .field("name", Field::string().required())
        .field("age", Field::integer().default_value(0))
        .build();

    let instance = schema.deserialize(&json!({"name": "ciri"})).unwrap();
    assert_eq!(instance.schema_name(), "User");
    assert_eq!(instance.get("name"), Some(&json!("ciri")));
    assert_eq!(instance.get("age"), Some(&json!(0)));

    // instances serialize flat and can be fed back into the schema
    let out = schema.serialize(&instance).unwrap();
    assert_eq!(out["name"], json!("ciri"));
}

// --- encode ---

#[test]
fn test_encode_produces_json_text() {
    let schema = Schema::builder("User")
        .field("name", Field::string().required().rename("fullName"))
        .build();

    let encoded = schema.encode(&json!({"name": "ciri"})).unwrap();
    assert_eq!(encoded, r#"{"fullName":"ciri"}"#);
}

#[test]
fn test_encode_validates_by_default() {
    let schema = Schema::builder("User")
        .field("name", Field::string().required())
        .build();

    assert!(schema.encode(&json!({})).is_err());
}

#[test]
fn test_encode_skip_serialization_emits_input_as_is() {
    let schema = Schema::builder("User")
        .field("name", Field::string().required())
        .build();

    let encoded = schema
        .encode_with(
            &json!({"name": "ciri"}),
            CallOptions::new().skip_serialization(),
        )
        .unwrap();
    assert_eq!(encoded, r#"{"name":"ciri"}"#);
}
