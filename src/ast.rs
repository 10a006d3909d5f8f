//! FQL abstract syntax tree.
//!
//! The serde representation matches the JSON subscription AST: a `type`
//! discriminant (`group`, `event-type`, `event-property`, ...), operators in
//! their FQL spelling and `value` omitted when absent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::ParseError;

/// A parsed subscription: the root group, or the reason the text did not parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Subscription {
    Group(Group),
    Error(ParseError),
}

impl Subscription {
    pub fn is_error(&self) -> bool {
        matches!(self, Subscription::Error(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Subscription::Group(group) => Some(group),
            Subscription::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ParseError> {
        match self {
            Subscription::Group(_) => None,
            Subscription::Error(cause) => Some(cause),
        }
    }

    pub fn into_result(self) -> Result<Group, ParseError> {
        match self {
            Subscription::Group(group) => Ok(group),
            Subscription::Error(cause) => Err(cause),
        }
    }
}

impl From<Result<Group, ParseError>> for Subscription {
    fn from(result: Result<Group, ParseError>) -> Self {
        match result {
            Ok(group) => Subscription::Group(group),
            Err(cause) => Subscription::Error(cause),
        }
    }
}

/// Child conditions combined with one boolean operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub operator: GroupOperator,
    pub children: Vec<Condition>,
}

impl Group {
    pub fn new(operator: GroupOperator, children: Vec<Condition>) -> Self {
        Self { operator, children }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    And,
    Or,
}

impl GroupOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupOperator::And => "and",
            GroupOperator::Or => "or",
        }
    }
}

/// A node of the condition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Condition {
    #[serde(rename = "group")]
    Group(Group),
    /// Envelope type: `type = "track"`
    #[serde(rename = "event-type")]
    EventType {
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// Track event name: `event = "Order Completed"`
    #[serde(rename = "event")]
    Event {
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// Page or screen name: `name = "Home"`
    #[serde(rename = "name")]
    Name {
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    #[serde(rename = "userId")]
    UserId {
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// `properties.<name>`
    #[serde(rename = "event-property")]
    Property {
        name: String,
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// `traits.<name>`
    #[serde(rename = "event-trait")]
    Trait {
        name: String,
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// `context.<name>`
    #[serde(rename = "event-context")]
    Context {
        name: String,
        operator: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
}

/// The event field a leaf condition reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    EventType,
    Event,
    Name,
    UserId,
    Property(&'a str),
    Trait(&'a str),
    Context(&'a str),
}

impl<'a> Field<'a> {
    /// Resolves a dotted FQL path such as `properties.price` or `userId`.
    /// Bare `properties`/`traits`/`context` roots are not fields.
    pub fn from_path(path: &'a str) -> Option<Self> {
        let (root, rest) = match path.split_once('.') {
            Some((root, rest)) => (root, Some(rest)),
            None => (path, None),
        };
        match (root, rest) {
            ("type", None) => Some(Field::EventType),
            ("event", None) => Some(Field::Event),
            ("name", None) => Some(Field::Name),
            ("userId", None) => Some(Field::UserId),
            ("properties", Some(name)) if !name.is_empty() => Some(Field::Property(name)),
            ("traits", Some(name)) if !name.is_empty() => Some(Field::Trait(name)),
            ("context", Some(name)) if !name.is_empty() => Some(Field::Context(name)),
            _ => None,
        }
    }

    /// Whether `path` starts with one of the root keys.
    pub fn is_root_key(path: &str) -> bool {
        let root = path.split('.').next().unwrap_or(path);
        matches!(
            root,
            "type" | "event" | "name" | "userId" | "properties" | "traits" | "context"
        )
    }

    /// Top-level scalar fields always compare as strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Field::EventType | Field::Event | Field::Name | Field::UserId
        )
    }

    /// Builds the leaf condition reading this field.
    pub fn condition(self, operator: Operator, value: Option<Value>) -> Condition {
        match self {
            Field::EventType => Condition::EventType { operator, value },
            Field::Event => Condition::Event { operator, value },
            Field::Name => Condition::Name { operator, value },
            Field::UserId => Condition::UserId { operator, value },
            Field::Property(name) => Condition::Property { name: name.to_string(), operator, value },
            Field::Trait(name) => Condition::Trait { name: name.to_string(), operator, value },
            Field::Context(name) => Condition::Context { name: name.to_string(), operator, value },
        }
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::EventType => write!(f, "type"),
            Field::Event => write!(f, "event"),
            Field::Name => write!(f, "name"),
            Field::UserId => write!(f, "userId"),
            Field::Property(name) => write!(f, "properties.{name}"),
            Field::Trait(name) => write!(f, "traits.{name}"),
            Field::Context(name) => write!(f, "context.{name}"),
        }
    }
}

/// Borrowed view of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leaf<'a> {
    pub field: Field<'a>,
    pub operator: Operator,
    pub value: Option<&'a Value>,
}

impl Condition {
    /// Returns the leaf view, or `None` for groups.
    pub fn leaf(&self) -> Option<Leaf<'_>> {
        let (field, operator, value) = match self {
            Condition::Group(_) => return None,
            Condition::EventType { operator, value } => (Field::EventType, operator, value),
            Condition::Event { operator, value } => (Field::Event, operator, value),
            Condition::Name { operator, value } => (Field::Name, operator, value),
            Condition::UserId { operator, value } => (Field::UserId, operator, value),
            Condition::Property { name, operator, value } => (Field::Property(name), operator, value),
            Condition::Trait { name, operator, value } => (Field::Trait(name), operator, value),
            Condition::Context { name, operator, value } => (Field::Context(name), operator, value),
        };
        Some(Leaf {
            field,
            operator: *operator,
            value: value.as_ref(),
        })
    }
}

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not_contains")]
    NotContains,
    #[serde(rename = "starts_with")]
    StartsWith,
    #[serde(rename = "not_starts_with")]
    NotStartsWith,
    #[serde(rename = "ends_with")]
    EndsWith,
    #[serde(rename = "not_ends_with")]
    NotEndsWith,
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "not_exists")]
    NotExists,
    #[serde(rename = "is_true")]
    IsTrue,
    #[serde(rename = "is_false")]
    IsFalse,
}

impl Operator {
    /// Operators that never carry a value.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Operator::Exists | Operator::NotExists | Operator::IsTrue | Operator::IsFalse
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::NotStartsWith => "not_starts_with",
            Operator::EndsWith => "ends_with",
            Operator::NotEndsWith => "not_ends_with",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
            Operator::IsTrue => "is_true",
            Operator::IsFalse => "is_false",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal operand of a leaf condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
}

impl Value {
    /// String form used by equality and the text-matching operators.
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
        }
    }

    /// Numeric form used by the ordering operators.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => parse_number(s),
            Value::Bool(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Formats a number the way it is written in FQL: integral values without a
/// fractional part (`30`, not `30.0`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Parses a trimmed, non-empty decimal string.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
