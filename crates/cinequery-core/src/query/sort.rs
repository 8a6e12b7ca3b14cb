//! Multi-key stable sort

use super::value::{compare, resolve_path};
use crate::store::SortDirection;
use serde_json::Value;
use std::cmp::Ordering;

/// Sort documents in place by `keys`, earlier keys taking precedence.
///
/// Missing fields sort as null. Array fields sort by their smallest
/// element ascending and their largest element descending. Ties keep the
/// input order.
pub fn sort_documents(docs: &mut Vec<Value>, keys: &[(String, SortDirection)]) {
    if keys.is_empty() || docs.len() < 2 {
        return;
    }

    let mut keyed: Vec<(Vec<Value>, Value)> = docs
        .drain(..)
        .map(|doc| {
            let values = keys
                .iter()
                .map(|(path, direction)| sort_key(&doc, path, *direction))
                .collect();
            (values, doc)
        })
        .collect();

    keyed.sort_by(|(left, _), (right, _)| {
        for ((a, b), (_, direction)) in left.iter().zip(right.iter()).zip(keys.iter()) {
            let ord = match direction {
                SortDirection::Ascending => compare(a, b),
                SortDirection::Descending => compare(b, a),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    docs.extend(keyed.into_iter().map(|(_, doc)| doc));
}

fn sort_key(doc: &Value, path: &str, direction: SortDirection) -> Value {
    let mut flattened: Vec<&Value> = Vec::new();
    for value in resolve_path(doc, path) {
        match value {
            Value::Array(items) => flattened.extend(items.iter()),
            other => flattened.push(other),
        }
    }
    let pick = match direction {
        SortDirection::Ascending => flattened.into_iter().min_by(|a, b| compare(a, b)),
        SortDirection::Descending => flattened.into_iter().max_by(|a, b| compare(a, b)),
    };
    pick.cloned().unwrap_or(Value::Null)
}
