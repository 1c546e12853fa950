//! # Domain Field Table
//!
//! Valid/invalid partitions for the fields the backend exposes. Identifiers
//! of existing resources cannot be known ahead of time, so their valid class
//! is a `{{variable}}` placeholder that the environment fills in at run time.

use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::generator::ParameterSpec;

pub type FieldSpec = ParameterSpec<Value>;

/// An identifier that must reference an existing resource. `variable` names
/// the placeholder holding a real id. The invalid class covers malformed
/// ids, UUIDs one character short or long, without hyphens or with reserved
/// characters, and the nil UUID last.
pub fn existing_id(variable: &str) -> FieldSpec {
    ParameterSpec::new(
        vec![json!(format!("{{{{{variable}}}}}"))],
        vec![
            json!("not-a-uuid"),
            json!("12345"),
            json!("e804b95aa3884751b24696fe97232d35"),
            json!("e804b95a-a388-4751-b246-96fe97232d3"),
            json!("e804b95a-a388-4751-b246-96fe97232d35X"),
            json!("e8|4b@5a-#388-4751-b246-96fe97232d35"),
            json!("00000000-0000-0000-0000-000000000000"),
        ],
    )
}

pub fn email() -> FieldSpec {
    ParameterSpec::new(
        vec![json!("user@example.com"), json!("first.last+tag@sub.example.org")],
        vec![
            json!("plainaddress"),
            json!("@missing-local.com"),
            json!("user@"),
            json!(""),
            Value::Null,
        ],
    )
}

pub fn membership_status() -> FieldSpec {
    ParameterSpec::new(
        vec![json!("ACTIVE"), json!("EXPIRED"), json!("CANCELLED")],
        vec![json!("active"), json!("PAUSED"), json!(""), json!(1)],
    )
}

pub fn plan_type() -> FieldSpec {
    ParameterSpec::new(
        vec![json!("MONTHLY"), json!("ANUAL")],
        vec![json!("WEEKLY"), json!("monthly"), json!(""), Value::Null],
    )
}

pub fn session_state() -> FieldSpec {
    ParameterSpec::new(
        vec![
            json!("SCHEDULED"),
            json!("ONGOING"),
            json!("COMPLETED"),
            json!("CANCELLED"),
            json!("RESCHEDULED"),
        ],
        vec![json!("PENDING"), json!("scheduled"), json!("")],
    )
}

pub fn reservation_state() -> FieldSpec {
    ParameterSpec::new(
        vec![
            json!("DONE"),
            json!("CONFIRMED"),
            json!("CANCELLED"),
            json!("ANULLED"),
        ],
        vec![json!("BOOKED"), json!("done"), json!("")],
    )
}

/// RFC 3339 timestamp.
pub fn timestamp() -> FieldSpec {
    ParameterSpec::new(
        vec![json!("2025-06-15T10:00:00Z"), json!("2025-06-15T10:00:00-05:00")],
        vec![
            json!("2025-13-01T00:00:00Z"),
            json!("15/06/2025"),
            json!("yesterday"),
            json!(""),
            json!(1718445600),
        ],
    )
}

pub fn start_date() -> FieldSpec {
    ParameterSpec::new(
        vec![json!("2025-01-01T00:00:00Z")],
        vec![json!("2025-02-30T00:00:00Z"), json!("not-a-date"), Value::Null],
    )
}

pub fn end_date() -> FieldSpec {
    ParameterSpec::new(
        vec![json!("2025-12-31T23:59:59Z")],
        vec![json!("2025-12-32T00:00:00Z"), json!("tomorrow"), Value::Null],
    )
}

pub fn fee() -> FieldSpec {
    ParameterSpec::new(
        vec![json!(0.0), json!(49.9), json!(120)],
        vec![json!(-1), json!("fifty"), Value::Null],
    )
}

pub fn capacity() -> FieldSpec {
    ParameterSpec::new(
        vec![json!(1), json!(30), json!(100)],
        vec![json!(0), json!(-5), json!("ten"), json!(2.5)],
    )
}

pub fn reservation_limit() -> FieldSpec {
    ParameterSpec::new(
        vec![json!(1), json!(10), Value::Null],
        vec![json!(-1), json!("many"), json!(true)],
    )
}

pub fn title() -> FieldSpec {
    ParameterSpec::new(
        vec![json!("Morning yoga"), json!("Pilates 101")],
        vec![json!(""), json!(42), json!({"text": "nested"})],
    )
}

pub fn description() -> FieldSpec {
    ParameterSpec::new(
        vec![json!("Monthly membership"), json!("")],
        vec![json!(42), json!(["not", "a", "string"])],
    )
}

pub type FieldBuilder = fn() -> FieldSpec;

/// Every field [`lookup`] accepts, with the builder for its partition.
pub const FIELDS: [(&str, FieldBuilder); 21] = [
    ("community_id", || existing_id("community_id")),
    ("plan_id", || existing_id("plan_id")),
    ("user_id", || existing_id("user_id")),
    ("membership_id", || existing_id("membership_id")),
    ("session_id", || existing_id("session_id")),
    ("reservation_id", || existing_id("reservation_id")),
    ("professional_id", || existing_id("professional_id")),
    ("local_id", || existing_id("local_id")),
    ("email", email),
    ("membership_status", membership_status),
    ("plan_type", plan_type),
    ("session_state", session_state),
    ("reservation_state", reservation_state),
    ("timestamp", timestamp),
    ("start_date", start_date),
    ("end_date", end_date),
    ("fee", fee),
    ("capacity", capacity),
    ("reservation_limit", reservation_limit),
    ("title", title),
    ("description", description),
];

pub fn field_names() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|(name, _)| *name)
}

/// Resolve a field by its table name.
pub fn lookup(name: &str) -> Result<FieldSpec> {
    FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, build)| build())
        .ok_or_else(|| Error::UnknownField(name.to_string()))
}
