//! Field projection

use super::value::type_name;
use crate::error::ExecutionError;
use serde_json::{Map, Value};

/// Compiled projection
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Keep only the listed paths; `_id` is kept unless `keep_id` is false
    Include { paths: Vec<String>, keep_id: bool },
    /// Drop the listed paths
    Exclude { paths: Vec<String> },
}

impl Projection {
    /// Compile a projection document.
    ///
    /// Values may be `0`/`1` or booleans. Inclusion and exclusion cannot be
    /// mixed, except that `_id` may always be excluded. `{"_id": 1}` on its
    /// own keeps only `_id`.
    pub fn compile(spec: &Map<String, Value>) -> Result<Self, ExecutionError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        let mut keep_id = true;
        let mut id_only = false;

        for (path, flag) in spec {
            let on = match flag {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
                other => {
                    return Err(ExecutionError::Projection(format!(
                        "{} must be 0 or 1, got {}",
                        path,
                        type_name(other)
                    )))
                }
            };
            if path == "_id" {
                keep_id = on;
                id_only = on;
                continue;
            }
            if on {
                include.push(path.clone());
            } else {
                exclude.push(path.clone());
            }
        }

        match (include.is_empty(), exclude.is_empty()) {
            (false, false) => Err(ExecutionError::Projection(
                "cannot mix inclusion and exclusion".to_string(),
            )),
            (false, true) => Ok(Projection::Include {
                paths: include,
                keep_id,
            }),
            (true, true) if id_only => Ok(Projection::Include {
                paths: Vec::new(),
                keep_id: true,
            }),
            (true, _) => {
                if !keep_id {
                    exclude.push("_id".to_string());
                }
                Ok(Projection::Exclude { paths: exclude })
            }
        }
    }

    /// Apply the projection to one document
    pub fn apply(&self, doc: Value) -> Value {
        let Value::Object(map) = doc else {
            return doc;
        };
        match self {
            Projection::Include { paths, keep_id } => {
                let mut out = Map::new();
                if *keep_id {
                    if let Some(id) = map.get("_id") {
                        out.insert("_id".to_string(), id.clone());
                    }
                }
                let tree = PathTree::build(paths);
                include_into(&map, &tree, &mut out);
                Value::Object(out)
            }
            Projection::Exclude { paths } => {
                let mut map = map;
                for path in paths {
                    let segments: Vec<&str> = path.split('.').collect();
                    remove_path(&mut map, &segments);
                }
                Value::Object(map)
            }
        }
    }
}

/// Inclusion paths grouped by their first segment
#[derive(Debug, Default)]
struct PathTree {
    children: Vec<(String, PathTree)>,
    leaf: bool,
}

impl PathTree {
    fn build(paths: &[String]) -> Self {
        let mut root = PathTree::default();
        for path in paths {
            let mut node = &mut root;
            for segment in path.split('.') {
                let index = match node.children.iter().position(|(k, _)| k == segment) {
                    Some(i) => i,
                    None => {
                        node.children.push((segment.to_string(), PathTree::default()));
                        node.children.len() - 1
                    }
                };
                node = &mut node.children[index].1;
            }
            node.leaf = true;
        }
        root
    }
}

/// Copy included fields in document order
fn include_into(source: &Map<String, Value>, tree: &PathTree, out: &mut Map<String, Value>) {
    for (key, value) in source {
        let Some((_, node)) = tree.children.iter().find(|(k, _)| k == key) else {
            continue;
        };
        if node.leaf {
            out.insert(key.clone(), value.clone());
            continue;
        }
        if let Some(projected) = include_nested(value, node) {
            out.insert(key.clone(), projected);
        }
    }
}

fn include_nested(value: &Value, node: &PathTree) -> Option<Value> {
    match value {
        Value::Object(inner) => {
            let mut sub = Map::new();
            include_into(inner, node, &mut sub);
            Some(Value::Object(sub))
        }
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(_) => include_nested(item, node),
                    _ => None,
                })
                .collect(),
        )),
        _ => None,
    }
}

fn remove_path(map: &mut Map<String, Value>, segments: &[&str]) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        map.remove(*head);
        return;
    }
    match map.get_mut(*head) {
        Some(Value::Object(inner)) => remove_path(inner, rest),
        Some(Value::Array(items)) => {
            for item in items.iter_mut() {
                if let Value::Object(inner) = item {
                    remove_path(inner, rest);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(spec: Value) -> Result<Projection, ExecutionError> {
        Projection::compile(spec.as_object().unwrap())
    }

    fn movie() -> Value {
        json!({
            "_id": "m1",
            "title": "Alien",
            "year": 1979,
            "imdb": {"rating": 8.5, "votes": 700000},
            "genres": ["Horror", "Sci-Fi"]
        })
    }

    #[test]
    fn test_include_keeps_id_and_order() {
        let projection = compile(json!({"year": 1, "title": 1})).unwrap();
        let out = projection.apply(movie());
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["_id", "title", "year"]);
    }

    #[test]
    fn test_include_nested_path_and_drop_id() {
        let projection = compile(json!({"imdb.rating": 1, "_id": 0})).unwrap();
        assert_eq!(projection.apply(movie()), json!({"imdb": {"rating": 8.5}}));
    }

    #[test]
    fn test_exclude() {
        let projection = compile(json!({"genres": 0, "imdb.votes": false})).unwrap();
        assert_eq!(
            projection.apply(movie()),
            json!({"_id": "m1", "title": "Alien", "year": 1979, "imdb": {"rating": 8.5}})
        );
    }

    #[test]
    fn test_id_only_inclusion() {
        let projection = compile(json!({"_id": 1})).unwrap();
        assert_eq!(
            projection,
            Projection::Include {
                paths: vec![],
                keep_id: true
            }
        );
        assert_eq!(projection.apply(movie()), json!({"_id": "m1"}));

        let projection = compile(json!({"_id": true, "title": 0})).unwrap();
        assert_eq!(
            projection.apply(movie())["_id"],
            "m1",
            "explicit _id with exclusions stays an exclusion"
        );
        assert!(projection.apply(movie()).get("year").is_some());
    }

    #[test]
    fn test_mixed_projection_is_rejected() {
        assert!(compile(json!({"title": 1, "year": 0})).is_err());
        assert!(compile(json!({"title": "yes"})).is_err());
        assert!(compile(json!({"title": 1, "_id": 0})).is_ok());
    }
}
