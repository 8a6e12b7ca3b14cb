//! Movie document model
//!
//! A [`MovieDocument`] is the stored document exactly as the store returned
//! it, plus a typed view ([`MovieFields`]) for display code. Serializing a
//! `MovieDocument` writes the stored document back unchanged; only the
//! view is lenient.
//!
//! Catalog exports are messy: years carry stray characters, ratings are
//! sometimes empty strings and dates come either as extended JSON or as
//! plain strings. In the view every field is optional (projections drop
//! fields) and anything that cannot be read as the expected type is absent.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::ops::Deref;

/// Document identifier as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MovieId {
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Text(String),
    Number(Number),
}

impl MovieId {
    /// Accepts `{"$oid": ..}`, non-empty strings and integers
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self::Number(n.clone())),
            Value::Object(map) if map.len() == 1 => match map.get("$oid") {
                Some(Value::String(oid)) => Some(Self::ObjectId { oid: oid.clone() }),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieId::ObjectId { oid } => write!(f, "{}", oid),
            MovieId::Text(s) => write!(f, "{}", s),
            MovieId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A movie as returned by queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieDocument {
    fields: MovieFields,
    raw: Map<String, Value>,
}

/// Typed, lenient view of a stored movie
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieFields {
    #[serde(rename = "_id", default, deserialize_with = "lenient::id")]
    pub id: Option<MovieId>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub plot: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub fullplot: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub genres: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub cast: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub countries: Option<Vec<String>>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub directors: Option<Vec<String>>,

    /// Minutes
    #[serde(default, deserialize_with = "lenient::integer")]
    pub runtime: Option<i64>,

    #[serde(default, deserialize_with = "lenient::date")]
    pub released: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub year: Option<i64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub rated: Option<String>,

    #[serde(default, deserialize_with = "lenient::object")]
    pub awards: Option<Awards>,

    #[serde(default, deserialize_with = "lenient::object")]
    pub imdb: Option<Imdb>,

    /// `movie` or `series`
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "lenient::object")]
    pub tomatoes: Option<Tomatoes>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub num_mflix_comments: Option<i64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub lastupdated: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Awards {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub wins: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub nominations: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Imdb {
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub votes: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Tomatoes {
    #[serde(default, deserialize_with = "lenient::object")]
    pub viewer: Option<TomatoesViewer>,
    #[serde(rename = "lastUpdated", default, deserialize_with = "lenient::date")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TomatoesViewer {
    #[serde(default, deserialize_with = "lenient::number")]
    pub rating: Option<f64>,
    #[serde(rename = "numReviews", default, deserialize_with = "lenient::integer")]
    pub num_reviews: Option<i64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub meter: Option<i64>,
}

impl Deref for MovieDocument {
    type Target = MovieFields;

    fn deref(&self) -> &MovieFields {
        &self.fields
    }
}

impl Serialize for MovieDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MovieDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let fields =
            MovieFields::deserialize(Value::Object(raw.clone())).map_err(D::Error::custom)?;
        Ok(Self { fields, raw })
    }
}

impl MovieDocument {
    /// Wrap a stored document. Only non-objects are rejected; the typed
    /// view never fails.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The document as stored
    pub fn as_value(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.raw)
    }

    /// Identifier as plain text (`$oid` unwrapped)
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(ToString::to_string)
    }

    /// Title, or a placeholder for projected-away titles
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    pub fn imdb_rating(&self) -> Option<f64> {
        self.imdb.as_ref().and_then(|imdb| imdb.rating)
    }
}

mod lenient {
    use crate::query::value::{as_date, as_number};
    use chrono::{DateTime, Utc};
    use lazy_static::lazy_static;
    use regex::Regex;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    lazy_static! {
        static ref LEADING_INT_RE: Regex = Regex::new(r"^\s*(-?\d+(?:\.\d+)?)").unwrap();
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<super::MovieId>, D::Error> {
        Ok(raw(d)?.as_ref().and_then(super::MovieId::from_value))
    }

    fn raw<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.filter(|v| !v.is_null()))
    }

    fn to_f64(value: &Value) -> Option<f64> {
        if let Some(n) = as_number(value) {
            return Some(n);
        }
        let s = value.as_str()?;
        LEADING_INT_RE
            .captures(s)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(raw(d)?.as_ref().and_then(to_f64).filter(|n| n.is_finite()))
    }

    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(number(d)?.map(|n| n.trunc() as i64))
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(raw(d)?.and_then(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }))
    }

    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
        Ok(raw(d)?.and_then(|v| match v {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::String(s) => Some(vec![s]),
            _ => None,
        }))
    }

    pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(raw(d)?.as_ref().and_then(as_date))
    }

    pub fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(raw(d)?
            .filter(Value::is_object)
            .and_then(|v| serde_json::from_value(v).ok()))
    }
}
