//! Deserializers for fields the API sends inconsistently.
//!
//! Labels such as milepost values or station references arrive as strings on
//! some rows and numbers on others. Blank strings are treated as absent, which
//! is what every view expects when it decides to print a placeholder. Values
//! that are not scalars at all (objects, arrays) read as absent so a single odd
//! row never fails the whole collection.

use serde::de::{Error, IgnoredAny};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Other(IgnoredAny),
}

pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|scalar| match scalar {
        Scalar::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Scalar::Int(n) => Some(n.to_string()),
        Scalar::Float(n) => Some(n.to_string()),
        Scalar::Bool(b) => Some(b.to_string()),
        Scalar::Other(_) => None,
    }))
}

/// Primary keys: an integer or a string holding one.
pub fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Int(n) => Ok(n),
        Scalar::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid id {text:?}"))),
        Scalar::Float(n) if n.fract() == 0.0 => Ok(n as i64),
        _ => Err(D::Error::custom("id must be an integer or a numeric string")),
    }
}

pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|scalar| match scalar {
        Scalar::Int(n) => Some(n),
        Scalar::Text(text) => text.trim().parse().ok(),
        Scalar::Float(n) if n.fract() == 0.0 => Some(n as i64),
        _ => None,
    }))
}

pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(|scalar| match scalar {
        Scalar::Int(n) => Some(n as f64),
        Scalar::Float(n) => Some(n),
        Scalar::Text(text) => text.trim().parse().ok(),
        Scalar::Bool(_) | Scalar::Other(_) => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "opt_text")]
        label: Option<String>,
        #[serde(default, deserialize_with = "opt_id")]
        id: Option<i64>,
    }

    #[test]
    fn accepts_strings_and_numbers() {
        let a: Row = serde_json::from_str(r#"{"label": 12, "id": "7"}"#).expect("parse");
        assert_eq!(a.label.as_deref(), Some("12"));
        assert_eq!(a.id, Some(7));

        let b: Row = serde_json::from_str(r#"{"label": "PK 12+300", "id": 9}"#).expect("parse");
        assert_eq!(b.label.as_deref(), Some("PK 12+300"));
        assert_eq!(b.id, Some(9));
    }

    #[test]
    fn blank_and_missing_are_absent() {
        let a: Row = serde_json::from_str(r#"{"label": "   ", "id": null}"#).expect("parse");
        assert_eq!(a.label, None);
        assert_eq!(a.id, None);

        let b: Row = serde_json::from_str("{}").expect("parse");
        assert_eq!(b.label, None);
    }

    #[test]
    fn structured_values_read_as_absent() {
        let row: Row = serde_json::from_str(
            r#"{"label": {"type": "Point", "coordinates": [-7.6, 33.5]}, "id": [1, 2]}"#,
        )
        .expect("parse");
        assert_eq!(row.label, None);
        assert_eq!(row.id, None);
    }

    #[derive(Deserialize)]
    struct Keyed {
        #[serde(deserialize_with = "id")]
        id: i64,
    }

    #[test]
    fn primary_keys_accept_numeric_strings() {
        let a: Keyed = serde_json::from_str(r#"{"id": " 42 "}"#).expect("parse");
        assert_eq!(a.id, 42);
        let b: Keyed = serde_json::from_str(r#"{"id": 7}"#).expect("parse");
        assert_eq!(b.id, 7);
        assert!(serde_json::from_str::<Keyed>(r#"{"id": "gare"}"#).is_err());
    }
}
