//! Integration tests for serialize/deserialize round trips.

use serde_json::{json, Value};
use trellis::{Field, Schema};

fn movie() -> Schema {
    let actor = Schema::builder("Actor")
        .field("first_name", Field::string().required())
        .field("last_name", Field::string().required())
        .build();
    Schema::builder("Movie")
        .field("title", Field::string().required())
        .field("released", Field::date().required())
        .field("cast", Field::list(Field::nested(actor)))
        .build()
}

#[test]
fn test_movie_serializes_to_the_expected_wire_shape() {
    let out = movie()
        .serialize(&json!({
            "title": "GWH",
            "released": "1998-01-09",
            "cast": [{"first_name": "Matt", "last_name": "Damon"}],
        }))
        .unwrap();

    assert_eq!(
        Value::Object(out),
        json!({
            "title": "GWH",
            "released": "1998-01-09",
            "cast": [{"first_name": "Matt", "last_name": "Damon"}],
        })
    );
}

#[test]
fn test_deserializing_serialized_output_is_idempotent() {
    let schema = Schema::builder("Session")
        .field("id", Field::uuid().required())
        .field("started", Field::datetime().required())
        .field("note", Field::string())
        .build();
    let input = json!({
        "id": "F81D4FAE-7DEC-11D0-A765-00A0C91E6BF6",
        "started": "2021-03-04T10:30:00",
        "note": "  first  ",
    });

    let first = schema.serialize(&input).unwrap();
    let second = schema
        .serialize(&schema.deserialize(&first).unwrap().into_values())
        .unwrap();

    // canonical forms are stable: lowercase uuid, normalized datetime
    assert_eq!(first["id"], json!("f81d4fae-7dec-11d0-a765-00a0c91e6bf6"));
    assert_eq!(first["started"], json!("2021-03-04T10:30:00"));
    assert_eq!(first, second);
}

#[test]
fn test_renamed_fields_survive_a_round_trip() {
    let schema = Schema::builder("Person")
        .field("name", Field::string().required().rename("fullName"))
        .build();

    let wire = schema.serialize(&json!({"name": "ciri"})).unwrap();
    assert_eq!(wire["fullName"], json!("ciri"));

    // serialized output feeds back in under the wire name
    let instance = schema.deserialize(&wire).unwrap();
    assert_eq!(instance.get("name"), Some(&json!("ciri")));

    let again = schema.serialize(&instance.into_values()).unwrap();
    assert_eq!(wire, again);
}

#[test]
fn test_date_canonicalization_is_stable_across_repeated_trips() {
    let schema = Schema::builder("Entry")
        .field("day", Field::date().required())
        .build();

    let mut data = json!({"day": "1998-01-09"});
    for _ in 0..3 {
        let out = schema
            .serialize(&schema.deserialize(&data).unwrap().into_values())
            .unwrap();
        assert_eq!(out["day"], json!("1998-01-09"));
        data = Value::Object(out);
    }
}
