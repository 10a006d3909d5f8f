//! FQL: a small filter language deciding whether an analytics event should be
//! forwarded to a destination action.
//!
//! ```text
//! text --tokenize--> tokens --normalize--> tokens --parse--> Subscription
//! Subscription + event --validate--> bool
//! Subscription --generate--> canonical text
//! ```

pub mod ast;
pub mod config;
pub mod dispatch;
pub mod generate;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod path;
pub mod token;
pub mod validate;

pub use ast::{Condition, Group, GroupOperator, Operator, Subscription, Value};
pub use config::{ConfigError, FqlConfig, SubscriptionConfig};
pub use dispatch::{Decision, SubscriptionSet, SubscriptionState};
pub use generate::generate_fql;
pub use parser::{parse_fql, parse_fql_with, MixedConditionals, ParseError, ParseOptions};
pub use path::{get, get_or};
pub use validate::validate;
