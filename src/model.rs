//! The user resource and its wire-format validation.

use std::fmt;
use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A user's primary key: a 12-byte MongoDB ObjectId.
///
/// Rendered as 24 lowercase hex digits on the wire and stored as the native
/// `_id` of the user document.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct UserId(ObjectId);

impl UserId {
    /// A fresh, globally-unique id.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for UserId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid user id `{0}`: expected 24 hex digits")]
pub struct InvalidUserId(pub String);

impl FromStr for UserId {
    type Err = InvalidUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidUserId(s.to_owned()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A stored user, as returned to clients.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub location: String,
    pub title: String,
}

impl User {
    pub fn new(id: UserId, fields: UserFields) -> Self {
        let UserFields { name, location, title } = fields;
        Self { id, name, location, title }
    }
}

/// Request body for create and edit. Every field is optional here so that
/// a missing field is reported by [`UserInput::validate`] rather than as an
/// opaque decode error.
#[derive(Clone, Debug, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// The mutable fields of a user, all known to be present and non-empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserFields {
    pub name: String,
    pub location: String,
    pub title: String,
}

/// Names every required field that was absent, `null`, or empty.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing required field(s): {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl UserInput {
    pub fn validate(self) -> Result<UserFields, ValidationError> {
        let mut missing = Vec::new();
        let name = required("name", self.name, &mut missing);
        let location = required("location", self.location, &mut missing);
        let title = required("title", self.title, &mut missing);

        match (name, location, title) {
            (Some(name), Some(location), Some(title)) => Ok(UserFields { name, location, title }),
            _ => Err(ValidationError { missing }),
        }
    }
}

fn required(
    field: &'static str,
    value: Option<String>,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(field);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(json: &str) -> UserInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn complete_input_validates() {
        let fields = input(r#"{"name":"Ann","location":"NYC","title":"Eng"}"#)
            .validate()
            .unwrap();
        assert_eq!(fields.name, "Ann");
        assert_eq!(fields.location, "NYC");
        assert_eq!(fields.title, "Eng");
    }

    #[test]
    fn absent_null_and_empty_fields_are_all_reported() {
        let err = input(r#"{"name":"","location":null}"#).validate().unwrap_err();
        assert_eq!(err.missing, vec!["name", "location", "title"]);
        assert_eq!(err.to_string(), "missing required field(s): name, location, title");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let fields = input(r#"{"id":"x","name":"a","location":"b","title":"c"}"#).validate();
        assert!(fields.is_ok());
    }

    #[test]
    fn user_id_round_trips_through_hex() {
        let id = UserId::generate();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn malformed_user_ids_are_rejected() {
        for bad in ["", "123", "zzzzzzzzzzzzzzzzzzzzzzzz", "507f1f77bcf86cd79943901"] {
            assert_eq!(bad.parse::<UserId>(), Err(InvalidUserId(bad.to_owned())));
        }
    }

    #[test]
    fn user_serializes_id_as_hex_string() {
        let id: UserId = "507f1f77bcf86cd799439011".parse().unwrap();
        let user = User::new(id, UserFields {
            name: "Ann".into(),
            location: "NYC".into(),
            title: "Eng".into(),
        });
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "507f1f77bcf86cd799439011");
        assert_eq!(json["name"], "Ann");
    }
}
