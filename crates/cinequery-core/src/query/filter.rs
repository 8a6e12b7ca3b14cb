//! Filter compilation and matching
//!
//! A filter document is compiled once into a [`Filter`] tree and then
//! matched against every candidate document. Compilation is where unknown
//! operators and malformed operator arguments are rejected.

use super::value::{as_number, candidates, resolve_path, same_bracket, type_name, values_equal};
use crate::error::ExecutionError;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Compiled filter expression
#[derive(Debug, Clone)]
pub enum Filter {
    /// Every child must match (the empty conjunction matches everything)
    And(Vec<Filter>),
    /// At least one child must match
    Or(Vec<Filter>),
    /// No child may match
    Nor(Vec<Filter>),
    /// All operators must hold for the value(s) at `path`
    Field { path: String, ops: Vec<Operator> },
}

/// Field-level operator
#[derive(Debug, Clone)]
pub enum Operator {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Exists(bool),
    Regex(Regex),
    Size(usize),
    All(Vec<Value>),
    ElemMatch(ElemMatch),
    Not(Vec<Operator>),
}

/// `$elemMatch` either applies operators to scalar elements or a full
/// filter to sub-document elements
#[derive(Debug, Clone)]
pub enum ElemMatch {
    Value(Vec<Operator>),
    Document(Box<Filter>),
}

/// Extended JSON wrappers that stand for literal values, not operators
const LITERAL_WRAPPERS: &[&str] = &[
    "$oid",
    "$date",
    "$numberInt",
    "$numberLong",
    "$numberDouble",
    "$numberDecimal",
];

impl Filter {
    /// Compile a filter document
    pub fn compile(doc: &Map<String, Value>) -> Result<Self, ExecutionError> {
        let mut clauses = Vec::with_capacity(doc.len());
        for (key, value) in doc {
            match key.as_str() {
                "$and" => clauses.push(Filter::And(compile_clause_list(key, value)?)),
                "$or" => clauses.push(Filter::Or(compile_clause_list(key, value)?)),
                "$nor" => clauses.push(Filter::Nor(compile_clause_list(key, value)?)),
                "$comment" => {}
                other if other.starts_with('$') => {
                    return Err(ExecutionError::Filter(format!(
                        "unknown top level operator: {}",
                        other
                    )))
                }
                path => clauses.push(Filter::Field {
                    path: path.to_string(),
                    ops: compile_condition(value)?,
                }),
            }
        }
        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Filter::And(clauses))
        }
    }

    /// Test a document against this filter
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::And(children) => children.iter().all(|f| f.matches(doc)),
            Filter::Or(children) => children.iter().any(|f| f.matches(doc)),
            Filter::Nor(children) => !children.iter().any(|f| f.matches(doc)),
            Filter::Field { path, ops } => {
                let resolved = resolve_path(doc, path);
                ops.iter().all(|op| op.matches(&resolved))
            }
        }
    }
}

fn compile_clause_list(op: &str, value: &Value) -> Result<Vec<Filter>, ExecutionError> {
    let items = value
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ExecutionError::Filter(format!("{} must be a nonempty array", op)))?;
    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => Filter::compile(map),
            other => Err(ExecutionError::Filter(format!(
                "{} entries must be objects, got {}",
                op,
                type_name(other)
            ))),
        })
        .collect()
}

fn is_operator_document(map: &Map<String, Value>) -> bool {
    map.keys().next().is_some_and(|k| k.starts_with('$'))
        && !(map.len() == 1 && map.keys().all(|k| LITERAL_WRAPPERS.contains(&k.as_str())))
}

/// Compile the right-hand side of `{path: condition}`
fn compile_condition(value: &Value) -> Result<Vec<Operator>, ExecutionError> {
    match value {
        Value::Object(map) if is_operator_document(map) => compile_operators(map),
        other => Ok(vec![Operator::Eq(other.clone())]),
    }
}

fn compile_operators(map: &Map<String, Value>) -> Result<Vec<Operator>, ExecutionError> {
    let mut ops = Vec::with_capacity(map.len());
    let options = match map.get("$options") {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(other) => {
            return Err(ExecutionError::Filter(format!(
                "$options must be a string, got {}",
                type_name(other)
            )))
        }
        None => None,
    };
    if options.is_some() && !map.contains_key("$regex") {
        return Err(ExecutionError::Filter("$options needs a $regex".to_string()));
    }

    for (key, arg) in map {
        let op = match key.as_str() {
            "$eq" => Operator::Eq(arg.clone()),
            "$ne" => Operator::Ne(arg.clone()),
            "$gt" => Operator::Gt(arg.clone()),
            "$gte" => Operator::Gte(arg.clone()),
            "$lt" => Operator::Lt(arg.clone()),
            "$lte" => Operator::Lte(arg.clone()),
            "$in" => Operator::In(array_arg(key, arg)?),
            "$nin" => Operator::Nin(array_arg(key, arg)?),
            "$all" => Operator::All(array_arg(key, arg)?),
            "$exists" => Operator::Exists(truthy(arg)),
            "$size" => Operator::Size(size_arg(arg)?),
            "$regex" => Operator::Regex(regex_arg(arg, options)?),
            "$options" => continue,
            "$not" => Operator::Not(not_arg(arg)?),
            "$elemMatch" => Operator::ElemMatch(elem_match_arg(arg)?),
            other => {
                return Err(ExecutionError::Filter(format!(
                    "unknown operator: {}",
                    other
                )))
            }
        };
        ops.push(op);
    }
    Ok(ops)
}

fn array_arg(op: &str, arg: &Value) -> Result<Vec<Value>, ExecutionError> {
    match arg {
        Value::Array(items) => Ok(items.clone()),
        other => Err(ExecutionError::Filter(format!(
            "{} needs an array, got {}",
            op,
            type_name(other)
        ))),
    }
}

fn truthy(arg: &Value) -> bool {
    match arg {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

fn size_arg(arg: &Value) -> Result<usize, ExecutionError> {
    as_number(arg)
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as usize)
        .ok_or_else(|| ExecutionError::Filter("$size needs a non-negative integer".to_string()))
}

fn regex_arg(arg: &Value, options: Option<&str>) -> Result<Regex, ExecutionError> {
    let pattern = arg.as_str().ok_or_else(|| {
        ExecutionError::Filter(format!("$regex needs a string, got {}", type_name(arg)))
    })?;
    build_regex(pattern, options.unwrap_or(""))
}

/// Build a regex honouring the `i`, `m`, `s` and `x` option flags
pub fn build_regex(pattern: &str, options: &str) -> Result<Regex, ExecutionError> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in options.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => {
                return Err(ExecutionError::Filter(format!(
                    "unsupported regex option: {}",
                    other
                )))
            }
        };
    }
    Ok(builder.build()?)
}

fn not_arg(arg: &Value) -> Result<Vec<Operator>, ExecutionError> {
    match arg {
        Value::Object(map) if is_operator_document(map) => compile_operators(map),
        Value::String(pattern) => Ok(vec![Operator::Regex(build_regex(pattern, "")?)]),
        _ => Err(ExecutionError::Filter(
            "$not needs an operator document or a regex".to_string(),
        )),
    }
}

fn elem_match_arg(arg: &Value) -> Result<ElemMatch, ExecutionError> {
    match arg {
        Value::Object(map) if is_operator_document(map) && !map.keys().any(|k| is_logical(k)) => {
            Ok(ElemMatch::Value(compile_operators(map)?))
        }
        Value::Object(map) => Ok(ElemMatch::Document(Box::new(Filter::compile(map)?))),
        other => Err(ExecutionError::Filter(format!(
            "$elemMatch needs an object, got {}",
            type_name(other)
        ))),
    }
}

fn is_logical(key: &str) -> bool {
    matches!(key, "$and" | "$or" | "$nor")
}

impl Operator {
    /// Test the values resolved at a path
    fn matches(&self, resolved: &[&Value]) -> bool {
        match self {
            Operator::Eq(target) => eq_matches(resolved, target),
            Operator::Ne(target) => !eq_matches(resolved, target),
            Operator::Gt(target) => range_matches(resolved, target, |o| o == Ordering::Greater),
            Operator::Gte(target) => range_matches(resolved, target, |o| o != Ordering::Less),
            Operator::Lt(target) => range_matches(resolved, target, |o| o == Ordering::Less),
            Operator::Lte(target) => range_matches(resolved, target, |o| o != Ordering::Greater),
            Operator::In(targets) => targets.iter().any(|t| eq_matches(resolved, t)),
            Operator::Nin(targets) => !targets.iter().any(|t| eq_matches(resolved, t)),
            Operator::Exists(expected) => !resolved.is_empty() == *expected,
            Operator::Regex(re) => candidates(resolved)
                .iter()
                .any(|v| v.as_str().is_some_and(|s| re.is_match(s))),
            Operator::Size(n) => resolved
                .iter()
                .any(|v| v.as_array().is_some_and(|items| items.len() == *n)),
            Operator::All(targets) => {
                !targets.is_empty() && targets.iter().all(|t| eq_matches(resolved, t))
            }
            Operator::ElemMatch(elem) => resolved.iter().any(|v| match v.as_array() {
                Some(items) => items.iter().any(|item| elem.matches(item)),
                None => false,
            }),
            Operator::Not(ops) => !ops.iter().all(|op| op.matches(resolved)),
        }
    }
}

impl ElemMatch {
    fn matches(&self, element: &Value) -> bool {
        match self {
            ElemMatch::Value(ops) => ops.iter().all(|op| op.matches(&[element])),
            ElemMatch::Document(filter) => element.is_object() && filter.matches(element),
        }
    }
}

fn eq_matches(resolved: &[&Value], target: &Value) -> bool {
    if resolved.is_empty() {
        return target.is_null();
    }
    candidates(resolved)
        .iter()
        .any(|v| values_equal(v, target))
}

fn range_matches(resolved: &[&Value], target: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    candidates(resolved)
        .iter()
        .filter(|v| same_bracket(v, target))
        .any(|v| accept(super::value::compare(v, target)))
}
