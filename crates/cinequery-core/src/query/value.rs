//! Value helpers shared by the filter, sort and projection stages
//!
//! Documents are plain `serde_json::Value`s. Extended JSON wrappers such as
//! `{"$oid": ..}`, `{"$date": ..}` and `{"$numberInt": ..}` are understood
//! here so that catalogs exported with `mongoexport` compare the way the
//! original store compared them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A JSON value seen through the store's type system
#[derive(Debug, Clone, Copy)]
enum Canonical<'a> {
    Null,
    Number(f64),
    String(&'a str),
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
    ObjectId(&'a str),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl Canonical<'_> {
    /// Cross-type sort order (null < numbers < strings < objects < arrays <
    /// object ids < booleans < dates)
    fn rank(&self) -> u8 {
        match self {
            Canonical::Null => 1,
            Canonical::Number(_) => 2,
            Canonical::String(_) => 3,
            Canonical::Object(_) => 4,
            Canonical::Array(_) => 5,
            Canonical::ObjectId(_) => 7,
            Canonical::Bool(_) => 8,
            Canonical::Date(_) => 9,
        }
    }
}

fn canonical(value: &Value) -> Canonical<'_> {
    match value {
        Value::Null => Canonical::Null,
        Value::Bool(b) => Canonical::Bool(*b),
        Value::Number(n) => Canonical::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Canonical::String(s),
        Value::Array(items) => Canonical::Array(items),
        Value::Object(map) => {
            if let Some(Value::String(oid)) = single_key(map, "$oid") {
                return Canonical::ObjectId(oid);
            }
            if single_key(map, "$date").is_some() {
                if let Some(date) = as_date(value) {
                    return Canonical::Date(date);
                }
            }
            if let Some(n) = extended_number(map) {
                return Canonical::Number(n);
            }
            Canonical::Object(map)
        }
    }
}

fn single_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if map.len() == 1 {
        map.get(key)
    } else {
        None
    }
}

fn extended_number(map: &Map<String, Value>) -> Option<f64> {
    if map.len() != 1 {
        return None;
    }
    let (key, inner) = map.iter().next()?;
    match key.as_str() {
        "$numberInt" | "$numberLong" | "$numberDouble" | "$numberDecimal" => match inner {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        },
        _ => None,
    }
}

/// Read a number, unwrapping extended JSON number wrappers
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => extended_number(map),
        _ => None,
    }
}

/// Read a date from `{"$date": ..}` or from an RFC 3339 / `YYYY-MM-DD` string
pub fn as_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Object(map) => match single_key(map, "$date")? {
            Value::String(s) => parse_date_str(s),
            Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            inner @ Value::Object(_) => as_number(inner)
                .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single()),
            _ => None,
        },
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Total order over JSON values following the store's cross-type ordering
pub fn compare(a: &Value, b: &Value) -> Ordering {
    compare_canonical(canonical(a), canonical(b))
}

fn compare_canonical(a: Canonical<'_>, b: Canonical<'_>) -> Ordering {
    match (a, b) {
        (Canonical::Null, Canonical::Null) => Ordering::Equal,
        (Canonical::Number(x), Canonical::Number(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Canonical::String(x), Canonical::String(y)) => x.cmp(y),
        (Canonical::ObjectId(x), Canonical::ObjectId(y)) => x.cmp(y),
        (Canonical::Bool(x), Canonical::Bool(y)) => x.cmp(&y),
        (Canonical::Date(x), Canonical::Date(y)) => x.cmp(&y),
        (Canonical::Array(x), Canonical::Array(y)) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ord = compare(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Canonical::Object(x), Canonical::Object(y)) => {
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk).then_with(|| compare(lv, rv));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (left, right) => left.rank().cmp(&right.rank()),
    }
}

/// Equality as the store defines it (`1 == 1.0`, wrapped and bare numbers
/// are the same value)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    compare(a, b) == Ordering::Equal
}

/// Whether two values belong to the same comparison bracket; range
/// operators never match across brackets
pub fn same_bracket(a: &Value, b: &Value) -> bool {
    canonical(a).rank() == canonical(b).rank()
}

/// Resolve a dotted path, fanning out over arrays of sub-documents.
///
/// Numeric segments index into arrays. A missing path yields no values.
pub fn resolve_path<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    resolve_segments(doc, &segments, &mut out);
    out
}

fn resolve_segments<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    let Some((head, rest)) = segments.split_first() else {
        out.push(value);
        return;
    };
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(*head) {
                resolve_segments(child, rest, out);
            }
        }
        Value::Array(items) => {
            if let Ok(index) = head.parse::<usize>() {
                if let Some(item) = items.get(index) {
                    resolve_segments(item, rest, out);
                }
            }
            for item in items.iter().filter(|item| item.is_object()) {
                resolve_segments(item, segments, out);
            }
        }
        _ => {}
    }
}

/// Candidates a condition is tested against: every resolved value, plus
/// the elements of resolved arrays
pub fn candidates<'a>(resolved: &[&'a Value]) -> Vec<&'a Value> {
    let mut out = Vec::with_capacity(resolved.len());
    for value in resolved {
        if let Value::Array(items) = value {
            out.extend(items.iter());
        }
        out.push(*value);
    }
    out
}

/// Short JSON type name used in error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_across_representations() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!({"$numberInt": "7"}), &json!(7)));
        assert_eq!(compare(&json!(2), &json!(10)), Ordering::Less);
    }

    #[test]
    fn test_cross_type_order() {
        assert_eq!(compare(&Value::Null, &json!(0)), Ordering::Less);
        assert_eq!(compare(&json!(99), &json!("a")), Ordering::Less);
        assert_eq!(compare(&json!("z"), &json!({"a": 1})), Ordering::Less);
        assert!(!same_bracket(&json!(1), &json!("1")));
    }

    #[test]
    fn test_dates() {
        let a = json!({"$date": "1999-03-31T00:00:00Z"});
        let b = json!({"$date": {"$numberLong": "954460800000"}});
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert!(as_date(&json!("2001-02-03")).is_some());
        assert!(as_date(&json!("not a date")).is_none());
    }

    #[test]
    fn test_resolve_nested_and_arrays() {
        let doc = json!({
            "imdb": {"rating": 8.7},
            "genres": ["Action", "Sci-Fi"],
            "awards": [{"wins": 1}, {"wins": 3}]
        });
        assert_eq!(resolve_path(&doc, "imdb.rating"), vec![&json!(8.7)]);
        assert_eq!(resolve_path(&doc, "genres.1"), vec![&json!("Sci-Fi")]);
        assert_eq!(resolve_path(&doc, "awards.wins"), vec![&json!(1), &json!(3)]);
        assert!(resolve_path(&doc, "tomatoes.viewer").is_empty());
    }
}
