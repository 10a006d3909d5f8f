//! Renders a condition tree back into canonical FQL text.

use crate::ast::{format_number, Condition, Field, Group, Leaf, Operator, Subscription, Value};
use crate::parser::ParseError;

/// Renders `subscription` as FQL.
///
/// Returns the parse error carried by an unparseable subscription, or an
/// error for a hand-built tree FQL cannot express (a suffix pattern that
/// itself ends in `*`).
pub fn generate_fql(subscription: &Subscription) -> Result<String, ParseError> {
    match subscription {
        Subscription::Group(group) => render_root(group),
        Subscription::Error(cause) => Err(cause.clone()),
    }
}

/// The root renders without parentheses. A root that only wraps another
/// group renders that group directly instead of as `( ... )`.
fn render_root(group: &Group) -> Result<String, ParseError> {
    match group.children.as_slice() {
        [Condition::Group(inner)] => render_group(inner),
        _ => render_group(group),
    }
}

fn render_group(group: &Group) -> Result<String, ParseError> {
    let separator = format!(" {} ", group.operator.as_str());
    let children = group
        .children
        .iter()
        .map(|child| match child {
            Condition::Group(inner) => render_group(inner).map(|text| format!("({text})")),
            leaf => render_condition(leaf),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(children.join(&separator))
}

/// Renders a single condition; groups render without outer parentheses.
pub fn render_condition(condition: &Condition) -> Result<String, ParseError> {
    match condition {
        Condition::Group(group) => render_group(group),
        leaf => leaf.leaf().map_or_else(|| Ok(String::new()), render_leaf),
    }
}

fn render_leaf(leaf: Leaf<'_>) -> Result<String, ParseError> {
    let path = leaf.field.to_string();
    let text = || leaf.value.map(Value::to_text).unwrap_or_default();

    let rendered = match leaf.operator {
        Operator::Exists => format!("{path} != null"),
        Operator::NotExists => format!("{path} = null"),
        Operator::IsTrue => format!("{path} = true"),
        Operator::IsFalse => format!("{path} = false"),
        Operator::Contains => format!("contains({path}, {})", quote(&text())),
        Operator::NotContains => format!("!contains({path}, {})", quote(&text())),
        Operator::StartsWith => format!("match({path}, {})", quote(&format!("{}*", text()))),
        Operator::NotStartsWith => format!("!match({path}, {})", quote(&format!("{}*", text()))),
        // `match()` reads a trailing `*` as a prefix pattern first.
        Operator::EndsWith | Operator::NotEndsWith if text().ends_with('*') => {
            return Err(ParseError::new(
                format!("Cannot express a suffix match on `{path}` ending with `*`"),
                None,
            ))
        }
        Operator::EndsWith => format!("match({path}, {})", quote(&format!("*{}", text()))),
        Operator::NotEndsWith => format!("!match({path}, {})", quote(&format!("*{}", text()))),
        Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
            let value = match leaf.value.and_then(Value::to_number) {
                Some(n) => format_number(n),
                None => render_value(leaf.field, leaf.value),
            };
            format!("{path} {} {value}", leaf.operator)
        }
        Operator::Eq | Operator::NotEq => {
            format!("{path} {} {}", leaf.operator, render_value(leaf.field, leaf.value))
        }
    };
    Ok(rendered)
}

/// Strings are quoted; numbers and booleans are bare. Top-level scalar
/// fields always hold text, so their values are always quoted.
fn render_value(field: Field<'_>, value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) if !field.is_scalar() => format_number(*n),
        Some(Value::Bool(b)) if !field.is_scalar() => b.to_string(),
        Some(value) => quote(&value.to_text()),
        None => quote(""),
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}
