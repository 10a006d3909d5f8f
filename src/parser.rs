//! FQL parser
//!
//! ## Parse flow
//!
//! ```text
//! parse_fql(text)
//!   └─ tokenize → normalize → Parser::parse()
//!        └─ parse_sequence()            one nesting level
//!             ├─ `and` / `or`           sets the level's operator
//!             └─ parse_condition()
//!                  ├─ root identifier   → parse_comparison()   type = "track"
//!                  ├─ contains / match  → parse_function()     contains(event, "Nike")
//!                  ├─ `!` + function    → parse_function()     negated form
//!                  └─ `(`               → parse_parenthesized()
//!                                          └─ sub-parser over the tokens up to the
//!                                             matching `)`, one level deeper
//! ```
//!
//! ## Grammar
//!
//! - **Comparison**: `<root>[.<path>] <op> <literal>`, roots `type`, `event`,
//!   `name`, `userId`, `properties`, `traits`, `context`
//! - **Functions**: `contains(<path>, "text")`, `match(<path>, "prefix*")`,
//!   `match(<path>, "*suffix")`, each optionally prefixed with `!`
//! - **Existence**: `<path> != null` (exists), `<path> = null` (not exists)
//! - **Grouping**: one `and`/`or` operator per level, `( ... )` to nest
//!
//! A level with a single child collapses to that child. [`parse_fql`] wraps
//! a bare leaf in a one-child `and` group so callers always get a group.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::{Condition, Field, Group, GroupOperator, Operator, Subscription, Value};
use crate::lexer::tokenize;
use crate::normalize::normalize;
use crate::token::{Span, Token, TokenKind};

/// Nesting limit applied when no explicit options are given.
pub const DEFAULT_MAX_DEPTH: usize = 16;

static EOS: Token<'static> = Token {
    kind: TokenKind::Eos,
    span: Span { start: 0, end: 0 },
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    pub fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    pub fn at_position(message: String, span: Span) -> Self {
        Self {
            message,
            span: Some(span),
        }
    }
}

/// What to do when `and` and `or` both appear at the same nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedConditionals {
    /// Fail the parse and ask for parentheses.
    #[default]
    Reject,
    /// The last keyword seen decides the operator for the whole level.
    LastWins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum number of nested parenthesized groups.
    pub max_depth: usize,
    pub mixed_conditionals: MixedConditionals,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            mixed_conditionals: MixedConditionals::default(),
        }
    }
}

/// Parses FQL text with the default options.
///
/// Never fails: unparseable input yields [`Subscription::Error`] so that one
/// broken subscription cannot take down evaluation of the others.
pub fn parse_fql(text: &str) -> Subscription {
    parse_fql_with(text, &ParseOptions::default())
}

pub fn parse_fql_with(text: &str, options: &ParseOptions) -> Subscription {
    let tokens = normalize(&tokenize(text));

    match Parser::with_options(&tokens, options).parse() {
        Ok(Condition::Group(group)) => Subscription::Group(group),
        Ok(leaf) => Subscription::Group(Group::new(GroupOperator::And, vec![leaf])),
        Err(err) => {
            tracing::debug!(fql = text, error = %err, span = ?err.span, "failed to parse subscription");
            Subscription::Error(err)
        }
    }
}

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
    /// Number of enclosing parenthesized groups.
    depth: usize,
    /// Span reported for the synthetic end of a sub-slice.
    eos_span: Span,
    options: &'a ParseOptions,
}

impl<'a> Parser<'a> {
    /// Creates a parser over a normalized token stream.
    pub fn with_options(tokens: &'a [Token<'a>], options: &'a ParseOptions) -> Self {
        let eos_span = tokens
            .last()
            .map(|t| Span::new(t.span.end, t.span.end))
            .unwrap_or_default();
        Self {
            tokens,
            position: 0,
            depth: 0,
            eos_span,
            options,
        }
    }

    /// Returns the current token without advancing. Past the end of the slice
    /// this is a synthetic end-of-stream token.
    fn peek(&self) -> &'a Token<'a> {
        let tokens = self.tokens;
        tokens.get(self.position).unwrap_or(&EOS)
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> &'a Token<'a> {
        let token = self.peek();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn span_of(&self, token: &Token<'_>) -> Span {
        match token.kind {
            TokenKind::Eos => self.eos_span,
            _ => token.span,
        }
    }

    /// Expects a token of the given kind and advances, or fails with `message`.
    fn expect(&mut self, expected: TokenKind<'static>, message: &str) -> Result<&'a Token<'a>, ParseError> {
        let token = self.peek();
        if std::mem::discriminant(&token.kind) == std::mem::discriminant(&expected) {
            Ok(self.advance())
        } else {
            Err(ParseError::at_position(
                format!("{message}, found {}", token.kind),
                self.span_of(token),
            ))
        }
    }

    pub fn parse(&mut self) -> Result<Condition, ParseError> {
        self.parse_sequence()
    }

    /// Parses conditions joined by `and`/`or` up to the end of the slice.
    fn parse_sequence(&mut self) -> Result<Condition, ParseError> {
        let mut children = Vec::new();
        let mut operator: Option<GroupOperator> = None;
        let mut dangling: Option<&Token<'a>> = None;

        loop {
            let token = self.peek();
            match &token.kind {
                TokenKind::Eos => break,
                TokenKind::And | TokenKind::Or => {
                    if children.is_empty() || dangling.is_some() {
                        return Err(ParseError::at_position(
                            format!("Expected a condition before {}", token.kind),
                            token.span,
                        ));
                    }
                    let next = if token.kind == TokenKind::And {
                        GroupOperator::And
                    } else {
                        GroupOperator::Or
                    };
                    if let Some(current) = operator {
                        if current != next && self.options.mixed_conditionals == MixedConditionals::Reject {
                            return Err(ParseError::at_position(
                                "Cannot mix `and` and `or` at the same level, use parentheses to group conditions"
                                    .to_string(),
                                token.span,
                            ));
                        }
                    }
                    operator = Some(next);
                    dangling = Some(token);
                    self.advance();
                }
                _ => {
                    if !children.is_empty() && dangling.is_none() {
                        return Err(ParseError::at_position(
                            format!("Expected `and` or `or`, found {}", token.kind),
                            token.span,
                        ));
                    }
                    children.push(self.parse_condition()?);
                    dangling = None;
                }
            }
        }

        if let Some(conditional) = dangling {
            return Err(ParseError::at_position(
                format!("Expected a condition after {}", conditional.kind),
                conditional.span,
            ));
        }

        match children.len() {
            0 if self.depth == 0 => Err(ParseError::new("Filter is empty".to_string(), None)),
            0 => Err(ParseError::at_position(
                "Empty parentheses".to_string(),
                self.eos_span,
            )),
            1 => Ok(children.remove(0)),
            _ => Ok(Condition::Group(Group::new(
                operator.unwrap_or(GroupOperator::And),
                children,
            ))),
        }
    }

    /// Parses a single condition: comparison, function form or parenthesized group.
    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Identifier(name) if is_function(name) => self.parse_function(false),
            TokenKind::Identifier(name) if Field::is_root_key(name) => self.parse_comparison(),
            TokenKind::Identifier(name) => Err(ParseError::at_position(
                format!("Unknown field `{name}`"),
                token.span,
            )),
            TokenKind::Bang => {
                self.advance();
                match &self.peek().kind {
                    TokenKind::Identifier(name) if is_function(name) => self.parse_function(true),
                    _ => Err(ParseError::at_position(
                        "`!` can only negate contains() or match()".to_string(),
                        token.span,
                    )),
                }
            }
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::RParen => Err(ParseError::at_position(
                "Unexpected `)` without matching `(`".to_string(),
                token.span,
            )),
            other => Err(ParseError::at_position(
                format!("Expected a condition, found {other}"),
                self.span_of(token),
            )),
        }
    }

    /// `<path> <op> <literal>`
    fn parse_comparison(&mut self) -> Result<Condition, ParseError> {
        let path_token = self.advance();
        let path = identifier(path_token);
        let field = resolve_field(path, path_token.span)?;

        let operator_token = self.advance();
        let operator = match operator_token.kind {
            TokenKind::Eq => Operator::Eq,
            TokenKind::NotEq => Operator::NotEq,
            TokenKind::Lt => Operator::Lt,
            TokenKind::Lte => Operator::Lte,
            TokenKind::Gt => Operator::Gt,
            TokenKind::Gte => Operator::Gte,
            TokenKind::Eos => {
                return Err(ParseError::at_position(
                    format!("Operator token is missing after `{path}`"),
                    self.eos_span,
                ))
            }
            ref other => {
                return Err(ParseError::at_position(
                    format!("Expected a comparison operator after `{path}`, found {other}"),
                    operator_token.span,
                ))
            }
        };

        let value_token = self.advance();
        if let TokenKind::Identifier(word) = &value_token.kind {
            match (&**word, operator) {
                ("null", Operator::NotEq) => return Ok(field.condition(Operator::Exists, None)),
                ("null", Operator::Eq) => return Ok(field.condition(Operator::NotExists, None)),
                ("null", _) => {
                    return Err(ParseError::at_position(
                        format!("`null` can only be compared with `=` or `!=`, found `{operator}`"),
                        value_token.span,
                    ))
                }
                ("true", Operator::Eq) if !matches_as_text(field) => {
                    return Ok(field.condition(Operator::IsTrue, None))
                }
                ("false", Operator::Eq) if !matches_as_text(field) => {
                    return Ok(field.condition(Operator::IsFalse, None))
                }
                _ => {}
            }
        }

        let value = self.literal(value_token, &format!("Value token is missing for `{path}`"))?;
        let value = if field.is_scalar() {
            Value::String(value.to_text())
        } else {
            value
        };

        Ok(field.condition(operator, Some(value)))
    }

    /// `contains(<path>, "text")` and `match(<path>, "pattern")`
    fn parse_function(&mut self, negate: bool) -> Result<Condition, ParseError> {
        let name_token = self.advance();
        let name = identifier(name_token);

        self.expect(TokenKind::LParen, &format!("Expected `(` after `{name}`"))?;

        let path_token = self.peek();
        if !path_token.kind.is_identifier() {
            return Err(ParseError::at_position(
                format!("{name}() is missing a 1st argument"),
                self.span_of(path_token),
            ));
        }
        self.advance();
        let path = identifier(path_token);
        let field = resolve_field(path, path_token.span)?;

        self.expect(TokenKind::Comma, &format!("{name}() is missing a 2nd argument"))?;

        let value_token = self.advance();
        let text = self
            .literal(value_token, &format!("{name}() is missing a 2nd argument"))?
            .to_text();

        self.expect(TokenKind::RParen, &format!("Expected `)` to close {name}()"))?;

        let (operator, value) = if name == "contains" {
            let operator = if negate { Operator::NotContains } else { Operator::Contains };
            (operator, text)
        } else if let Some(prefix) = text.strip_suffix('*') {
            let operator = if negate { Operator::NotStartsWith } else { Operator::StartsWith };
            (operator, prefix.to_string())
        } else if let Some(suffix) = text.strip_prefix('*') {
            let operator = if negate { Operator::NotEndsWith } else { Operator::EndsWith };
            (operator, suffix.to_string())
        } else {
            return Err(ParseError::at_position(
                format!("match() pattern \"{text}\" must start or end with `*`"),
                value_token.span,
            ));
        };

        Ok(field.condition(operator, Some(Value::String(value))))
    }

    /// `( ... )`: parses the tokens up to the matching `)` one level deeper.
    fn parse_parenthesized(&mut self) -> Result<Condition, ParseError> {
        let open = self.advance();
        let start = self.position;

        let mut depth = 0usize;
        let mut close = None;
        for (offset, token) in self.tokens[start..].iter().enumerate() {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen if depth == 0 => {
                    close = Some(start + offset);
                    break;
                }
                TokenKind::RParen => depth -= 1,
                TokenKind::Eos => break,
                _ => {}
            }
        }
        let Some(close) = close else {
            return Err(ParseError::at_position("Unclosed `(`".to_string(), open.span));
        };

        if self.depth + 1 > self.options.max_depth {
            return Err(ParseError::at_position(
                format!("Groups are nested deeper than {} levels", self.options.max_depth),
                open.span,
            ));
        }

        let mut inner = Parser {
            tokens: &self.tokens[start..close],
            position: 0,
            depth: self.depth + 1,
            eos_span: self.tokens[close].span,
            options: self.options,
        };
        let condition = inner.parse_sequence()?;
        self.position = close + 1;

        Ok(condition)
    }

    /// Converts a literal token into a value. Bare words other than
    /// `true`/`false` are taken as strings.
    fn literal(&self, token: &Token<'_>, missing: &str) -> Result<Value, ParseError> {
        match &token.kind {
            TokenKind::String(s) => Ok(Value::String(s.to_string())),
            TokenKind::Number(n) => Ok(Value::Number(*n)),
            TokenKind::Identifier(word) => Ok(match &**word {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                other => Value::String(other.to_string()),
            }),
            TokenKind::Eos | TokenKind::RParen | TokenKind::Comma => Err(ParseError::at_position(
                missing.to_string(),
                self.span_of(token),
            )),
            other => Err(ParseError::at_position(
                format!("Expected a literal value, found {other}"),
                token.span,
            )),
        }
    }
}

fn is_function(name: &str) -> bool {
    name == "contains" || name == "match"
}

/// `type`, `event` and `name` keep comparing `= true` as text.
fn matches_as_text(field: Field<'_>) -> bool {
    matches!(field, Field::EventType | Field::Event | Field::Name)
}

/// Only called on tokens already known to be identifiers.
fn identifier<'a>(token: &'a Token<'_>) -> &'a str {
    match &token.kind {
        TokenKind::Identifier(name) => name,
        _ => "",
    }
}

fn resolve_field(path: &str, span: Span) -> Result<Field<'_>, ParseError> {
    Field::from_path(path).ok_or_else(|| {
        let message = if matches!(path, "properties" | "traits" | "context") {
            format!("`{path}` must be followed by a field name, e.g. `{path}.name`")
        } else {
            format!("Unknown field `{path}`")
        };
        ParseError::at_position(message, span)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_string(input: &str) -> Result<Condition, ParseError> {
        parse_with(input, &ParseOptions::default())
    }

    fn parse_with(input: &str, options: &ParseOptions) -> Result<Condition, ParseError> {
        let tokens = normalize(&tokenize(input));
        Parser::with_options(&tokens, options).parse()
    }

    fn group(operator: GroupOperator, children: Vec<Condition>) -> Condition {
        Condition::Group(Group::new(operator, children))
    }

    fn event_type(value: &str) -> Condition {
        Condition::EventType {
            operator: Operator::Eq,
            value: Some(Value::from(value)),
        }
    }

    fn event(operator: Operator, value: &str) -> Condition {
        Condition::Event {
            operator,
            value: Some(Value::from(value)),
        }
    }

    fn property(name: &str, operator: Operator, value: Option<Value>) -> Condition {
        Condition::Property {
            name: name.to_string(),
            operator,
            value,
        }
    }

    #[test]
    fn test_simple_comparison() {
        assert_eq!(parse_string(r#"type = "track""#).unwrap(), event_type("track"));
    }

    #[test]
    fn test_parse_fql_wraps_bare_leaf() {
        assert_eq!(
            parse_fql(r#"type = "track""#),
            Subscription::Group(Group::new(GroupOperator::And, vec![event_type("track")]))
        );
    }

    #[test]
    fn test_or_group() {
        assert_eq!(
            parse_string(r#"type = "track" or type = "identify""#).unwrap(),
            group(GroupOperator::Or, vec![event_type("track"), event_type("identify")])
        );
    }

    #[test]
    fn test_typed_property_values() {
        let parsed = parse_string(
            r#"event = "Product Added" and properties.price >= 100 and properties.premium = "true""#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            group(
                GroupOperator::And,
                vec![
                    event(Operator::Eq, "Product Added"),
                    property("price", Operator::Gte, Some(Value::Number(100.0))),
                    property("premium", Operator::Eq, Some(Value::from("true"))),
                ]
            )
        );
    }

    #[test]
    fn test_scalar_fields_store_text() {
        assert_eq!(parse_string("event = 42").unwrap(), event(Operator::Eq, "42"));
        assert_eq!(
            parse_string("userId != 7").unwrap(),
            Condition::UserId {
                operator: Operator::NotEq,
                value: Some(Value::from("7")),
            }
        );
    }

    #[test]
    fn test_null_becomes_existence() {
        assert_eq!(
            parse_string("userId != null").unwrap(),
            Condition::UserId {
                operator: Operator::Exists,
                value: None
            }
        );
        assert_eq!(
            parse_string("traits.email = null").unwrap(),
            Condition::Trait {
                name: "email".to_string(),
                operator: Operator::NotExists,
                value: None
            }
        );
        assert_eq!(
            parse_string("name != null").unwrap(),
            Condition::Name {
                operator: Operator::Exists,
                value: None
            }
        );
        assert!(parse_string("properties.a > null").is_err());
    }

    #[test]
    fn test_boolean_literals() {
        assert_eq!(
            parse_string("properties.premium = true").unwrap(),
            property("premium", Operator::IsTrue, None)
        );
        assert_eq!(
            parse_string("context.active = false").unwrap(),
            Condition::Context {
                name: "active".to_string(),
                operator: Operator::IsFalse,
                value: None
            }
        );
        assert_eq!(
            parse_string("properties.premium != true").unwrap(),
            property("premium", Operator::NotEq, Some(Value::Bool(true)))
        );
        assert_eq!(parse_string("event = true").unwrap(), event(Operator::Eq, "true"));
    }

    #[test]
    fn test_deep_property_path() {
        assert_eq!(
            parse_string(r#"properties.address.city = "Paris""#).unwrap(),
            property("address.city", Operator::Eq, Some(Value::from("Paris")))
        );
    }

    #[test]
    fn test_contains_function() {
        assert_eq!(
            parse_string(r#"contains(event, "Nike")"#).unwrap(),
            event(Operator::Contains, "Nike")
        );
        assert_eq!(
            parse_string(r#"!contains(traits.name, "Nike")"#).unwrap(),
            Condition::Trait {
                name: "name".to_string(),
                operator: Operator::NotContains,
                value: Some(Value::from("Nike"))
            }
        );
    }

    #[test]
    fn test_match_function() {
        assert_eq!(
            parse_string(r#"match(event, "X*")"#).unwrap(),
            event(Operator::StartsWith, "X")
        );
        assert_eq!(
            parse_string(r#"!match(properties.name, "X*")"#).unwrap(),
            property("name", Operator::NotStartsWith, Some(Value::from("X")))
        );
        assert_eq!(
            parse_string(r#"match(name, "*X")"#).unwrap(),
            Condition::Name {
                operator: Operator::EndsWith,
                value: Some(Value::from("X"))
            }
        );
        assert_eq!(
            parse_string(r#"!match(context.page.path, "*/checkout")"#).unwrap(),
            Condition::Context {
                name: "page.path".to_string(),
                operator: Operator::NotEndsWith,
                value: Some(Value::from("/checkout"))
            }
        );
    }

    #[test]
    fn test_match_requires_wildcard() {
        let err = parse_string(r#"match(event, "X")"#).unwrap_err();
        assert!(err.message.contains("must start or end with `*`"));
    }

    #[test]
    fn test_nested_groups() {
        let parsed = parse_string(
            r#"(event = "Product Added" and properties.price >= 100) or (event = "Order Completed" and properties.total >= 500)"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            group(
                GroupOperator::Or,
                vec![
                    group(
                        GroupOperator::And,
                        vec![
                            event(Operator::Eq, "Product Added"),
                            property("price", Operator::Gte, Some(Value::Number(100.0))),
                        ]
                    ),
                    group(
                        GroupOperator::And,
                        vec![
                            event(Operator::Eq, "Order Completed"),
                            property("total", Operator::Gte, Some(Value::Number(500.0))),
                        ]
                    ),
                ]
            )
        );
    }

    #[test]
    fn test_balanced_nesting() {
        let parsed = parse_string(r#"type = "track" and (event = "A" or (event = "B" and userId != null))"#)
            .unwrap();
        assert_eq!(
            parsed,
            group(
                GroupOperator::And,
                vec![
                    event_type("track"),
                    group(
                        GroupOperator::Or,
                        vec![
                            event(Operator::Eq, "A"),
                            group(
                                GroupOperator::And,
                                vec![
                                    event(Operator::Eq, "B"),
                                    Condition::UserId {
                                        operator: Operator::Exists,
                                        value: None
                                    },
                                ]
                            ),
                        ]
                    ),
                ]
            )
        );
    }

    #[test]
    fn test_redundant_parentheses_collapse() {
        assert_eq!(parse_string(r#"((type = "track"))"#).unwrap(), event_type("track"));
    }

    #[test]
    fn test_mixed_conditionals_rejected_by_default() {
        let err = parse_string(r#"type = "a" and type = "b" or type = "c""#).unwrap_err();
        assert!(err.message.contains("Cannot mix"));
        assert_eq!(err.span, Some(Span::new(26, 28)));
    }

    #[test]
    fn test_mixed_conditionals_last_wins() {
        let options = ParseOptions {
            mixed_conditionals: MixedConditionals::LastWins,
            ..Default::default()
        };
        let parsed = parse_with(r#"type = "a" and type = "b" or type = "c""#, &options).unwrap();
        assert_eq!(
            parsed,
            group(
                GroupOperator::Or,
                vec![event_type("a"), event_type("b"), event_type("c")]
            )
        );
    }

    #[test]
    fn test_mixed_conditionals_in_separate_levels() {
        assert!(parse_string(r#"(type = "a" or type = "b") and userId != null"#).is_ok());
    }

    #[test]
    fn test_depth_limit() {
        let options = ParseOptions {
            max_depth: 2,
            ..Default::default()
        };
        assert!(parse_with(r#"((type = "track"))"#, &options).is_ok());
        let err = parse_with(r#"(((type = "track")))"#, &options).unwrap_err();
        assert!(err.message.contains("nested deeper than 2"));
        assert_eq!(err.span, Some(Span::new(2, 3)));
    }

    #[test]
    fn test_incomplete_inputs() {
        assert_eq!(parse_string("").unwrap_err().message, "Filter is empty");
        assert!(parse_string("type").unwrap_err().message.contains("Operator token is missing"));
        assert!(parse_string("type = ").unwrap_err().message.contains("Value token is missing"));
        assert!(parse_string(r#"type = "track" and"#)
            .unwrap_err()
            .message
            .contains("after `and`"));
        assert!(parse_string(r#"or type = "track""#).is_err());
        assert!(parse_string(r#"type = "a" type = "b""#)
            .unwrap_err()
            .message
            .contains("Expected `and` or `or`"));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(parse_string("typo").unwrap_err().message.contains("Unknown field `typo`"));
        assert!(parse_string(r#"type * "32456""#).is_err());
        assert!(parse_string(r#"properties = 1"#)
            .unwrap_err()
            .message
            .contains("must be followed by a field name"));
        assert!(parse_string(r#"!type = "track""#).is_err());
        assert!(parse_string(r#"type = "track")"#).is_err());
        assert!(parse_string("()").unwrap_err().message.contains("Empty parentheses"));
    }

    #[test]
    fn test_overflowing_number_is_rejected() {
        let fql = format!("properties.x < 1{}", "0".repeat(400));
        let err = parse_string(&fql).unwrap_err();
        assert!(err.message.contains("Expected a literal value"), "{}", err.message);
        assert_eq!(err.span, Some(Span::new(15, fql.len())));
        assert!(parse_fql(&fql).is_error());
    }

    #[test]
    fn test_unclosed_group() {
        let err = parse_string("(((").unwrap_err();
        assert_eq!(err.message, "Unclosed `(`");
        assert_eq!(err.span, Some(Span::new(0, 1)));
    }

    #[test]
    fn test_function_argument_errors() {
        assert!(parse_string("contains()")
            .unwrap_err()
            .message
            .contains("missing a 1st argument"));
        assert!(parse_string("contains(event)")
            .unwrap_err()
            .message
            .contains("missing a 2nd argument"));
        assert!(parse_string("match(event, )")
            .unwrap_err()
            .message
            .contains("missing a 2nd argument"));
        assert!(parse_string(r#"contains(event, "a""#).is_err());
        assert!(parse_string(r#"contains event, "a")"#).is_err());
    }

    #[test]
    fn test_parse_fql_converts_errors() {
        let subscription = parse_fql("typo");
        assert!(subscription.is_error());
        assert!(subscription.as_group().is_none());
        assert_eq!(subscription.error().unwrap().span, Some(Span::new(0, 4)));
    }
}
