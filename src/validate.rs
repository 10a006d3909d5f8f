//! Evaluates a subscription against an event record.

use serde_json::Value as Json;

use crate::ast::{format_number, parse_number, Condition, Field, Group, GroupOperator, Operator, Subscription, Value};
use crate::path;

/// Returns whether `event` matches `subscription`.
///
/// Fails closed: an unparseable subscription, or an event that is not a JSON
/// object (absent, `null`, a bare string, ...), never matches.
pub fn validate(subscription: &Subscription, event: &Json) -> bool {
    let group = match subscription {
        Subscription::Group(group) => group,
        Subscription::Error(cause) => {
            tracing::trace!(error = %cause, "skipping validation of unparseable subscription");
            return false;
        }
    };

    if !event.is_object() {
        return false;
    }

    matches_group(group, event)
}

/// Evaluates a single condition. `event` is expected to be a JSON object.
pub fn matches_condition(condition: &Condition, event: &Json) -> bool {
    match condition {
        Condition::Group(group) => matches_group(group, event),
        leaf => match leaf.leaf() {
            Some(leaf) => compare(leaf.operator, read_field(leaf.field, event), leaf.value),
            None => false,
        },
    }
}

fn matches_group(group: &Group, event: &Json) -> bool {
    match group.operator {
        GroupOperator::And => group.children.iter().all(|child| matches_condition(child, event)),
        GroupOperator::Or => group.children.iter().any(|child| matches_condition(child, event)),
    }
}

fn read_field<'e>(field: Field<'_>, event: &'e Json) -> Option<&'e Json> {
    match field {
        Field::EventType => event.get("type"),
        Field::Event => event.get("event"),
        Field::Name => event.get("name"),
        Field::UserId => event.get("userId"),
        Field::Property(name) => event.get("properties").and_then(|root| path::get(root, name)),
        Field::Trait(name) => event.get("traits").and_then(|root| path::get(root, name)),
        Field::Context(name) => event.get("context").and_then(|root| path::get(root, name)),
    }
}

/// Applies `operator` to the actual event value and the expected literal.
fn compare(operator: Operator, actual: Option<&Json>, expected: Option<&Value>) -> bool {
    match operator {
        Operator::Exists => !is_missing(actual),
        Operator::NotExists => is_missing(actual),
        Operator::IsTrue => matches!(actual, Some(Json::Bool(true))),
        Operator::IsFalse => matches!(actual, Some(Json::Bool(false))),
        Operator::Eq => equals(actual, expected),
        Operator::NotEq => !equals(actual, expected),
        Operator::Lt => ordered(actual, expected, |a, b| a < b),
        Operator::Lte => ordered(actual, expected, |a, b| a <= b),
        Operator::Gt => ordered(actual, expected, |a, b| a > b),
        Operator::Gte => ordered(actual, expected, |a, b| a >= b),
        Operator::Contains => text_match(actual, expected, |a, b| a.contains(b)),
        Operator::NotContains => text_match(actual, expected, |a, b| !a.contains(b)),
        Operator::StartsWith => text_match(actual, expected, |a, b| a.starts_with(b)),
        Operator::NotStartsWith => text_match(actual, expected, |a, b| !a.starts_with(b)),
        Operator::EndsWith => text_match(actual, expected, |a, b| a.ends_with(b)),
        Operator::NotEndsWith => text_match(actual, expected, |a, b| !a.ends_with(b)),
    }
}

fn is_missing(actual: Option<&Json>) -> bool {
    matches!(actual, None | Some(Json::Null))
}

/// Both sides compared as text. Missing values, objects and arrays never
/// equal anything.
fn equals(actual: Option<&Json>, expected: Option<&Value>) -> bool {
    match (actual.and_then(json_text), expected) {
        (Some(actual), Some(expected)) => actual == expected.to_text(),
        _ => false,
    }
}

fn ordered(actual: Option<&Json>, expected: Option<&Value>, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (actual.and_then(json_number), expected.and_then(Value::to_number)) {
        (Some(actual), Some(expected)) => cmp(actual, expected),
        _ => false,
    }
}

/// Only string actual values take part in text matching.
fn text_match(actual: Option<&Json>, expected: Option<&Value>, test: impl Fn(&str, &str) -> bool) -> bool {
    match (actual, expected) {
        (Some(Json::String(actual)), Some(expected)) => test(actual, &expected.to_text()),
        _ => false,
    }
}

fn json_text(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(u)) => u.to_string(),
            _ => format_number(n.as_f64()?),
        }),
        Json::Bool(b) => Some(b.to_string()),
        Json::Null => Some("null".to_string()),
        Json::Array(_) | Json::Object(_) => None,
    }
}

fn json_number(value: &Json) -> Option<f64> {
    match value {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => parse_number(s),
        _ => None,
    }
}
