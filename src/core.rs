//! # Core
//!
//! Serde helpers for JSON members that may take more than one shape.

use serde::{Deserialize, Serialize};

/// `Kind` allows serde to serialize/deserialize a string or an object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

/// `OneMany` allows serde to serialize/deserialize a single object or a set of
/// objects.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneMany<T> {
    /// Single object
    One(T),

    /// Set of objects
    Many(Vec<T>),
}

impl<T: Default> Default for OneMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T: PartialEq> OneMany<T> {
    /// Returns `true` if `item` is the single object or one of the set.
    pub fn contains(&self, item: &T) -> bool {
        match self {
            Self::One(one) => one == item,
            Self::Many(many) => many.contains(item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_or_many() {
        let one: OneMany<String> = serde_json::from_str(r#""OrgJson""#).expect("should deserialize");
        assert!(one.contains(&"OrgJson".to_string()));
        assert!(!one.contains(&"VerifiableCredential".to_string()));

        let many: OneMany<String> =
            serde_json::from_str(r#"["VerifiableCredential","OrgJson"]"#).expect("should deserialize");
        assert!(many.contains(&"OrgJson".to_string()));
        assert_eq!(many, OneMany::Many(vec!["VerifiableCredential".into(), "OrgJson".into()]));
    }

    #[test]
    fn string_or_object() {
        let kind: Kind<serde_json::Value> =
            serde_json::from_str(r#"{"id":"did:orgid:0x01"}"#).expect("should deserialize");
        assert!(matches!(kind, Kind::Object(_)));

        let kind: Kind<serde_json::Value> =
            serde_json::from_str(r#""did:orgid:0x01""#).expect("should deserialize");
        assert_eq!(kind, Kind::String("did:orgid:0x01".into()));
    }
}
