//! Routes events to subscribed destination actions.
//!
//! Each configured subscription is parsed once up front. Routing an event
//! produces one [`Decision`] per subscription, in configuration order. A
//! subscription with broken FQL is reported as [`SubscriptionState::Invalid`]
//! and never affects the decisions of the others.

use std::fmt;

use serde_json::Value as Json;

use crate::ast::Subscription;
use crate::config::SubscriptionConfig;
use crate::parser::{parse_fql_with, ParseOptions};
use crate::validate::validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionState {
    /// The event matches; the action should run.
    Subscribed,
    NotSubscribed,
    /// The subscription cannot be evaluated.
    Invalid(String),
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionState::Subscribed => write!(f, "subscribed"),
            SubscriptionState::NotSubscribed => write!(f, "not subscribed"),
            SubscriptionState::Invalid(reason) => write!(f, "invalid subscription: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision<'s> {
    pub name: &'s str,
    pub partner_action: &'s str,
    pub state: SubscriptionState,
}

impl Decision<'_> {
    pub fn is_subscribed(&self) -> bool {
        self.state == SubscriptionState::Subscribed
    }
}

#[derive(Debug)]
struct Entry {
    config: SubscriptionConfig,
    /// `None` when the subscription has no FQL text at all.
    parsed: Option<Subscription>,
}

/// Parsed subscriptions, immutable once built and shareable across threads.
#[derive(Debug)]
pub struct SubscriptionSet {
    entries: Vec<Entry>,
}

impl SubscriptionSet {
    pub fn new(subscriptions: Vec<SubscriptionConfig>, options: &ParseOptions) -> Self {
        let entries = subscriptions
            .into_iter()
            .map(|config| {
                let parsed = if config.subscribe.trim().is_empty() {
                    tracing::warn!(action = %config.partner_action, "subscription has no FQL");
                    None
                } else {
                    let parsed = parse_fql_with(&config.subscribe, options);
                    if let Some(cause) = parsed.error() {
                        tracing::warn!(
                            action = %config.partner_action,
                            fql = %config.subscribe,
                            error = %cause,
                            "invalid subscription"
                        );
                    }
                    Some(parsed)
                };
                Entry { config, parsed }
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of subscriptions that parsed successfully.
    pub fn valid_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(&entry.parsed, Some(s) if !s.is_error()))
            .count()
    }

    /// Decides every subscription for `event`.
    pub fn route(&self, event: &Json) -> Vec<Decision<'_>> {
        let decisions: Vec<_> = self
            .entries
            .iter()
            .map(|entry| Decision {
                name: entry.config.display_name(),
                partner_action: &entry.config.partner_action,
                state: decide(entry.parsed.as_ref(), event),
            })
            .collect();

        tracing::debug!(
            event_type = event.get("type").and_then(Json::as_str).unwrap_or("-"),
            subscribed = decisions.iter().filter(|d| d.is_subscribed()).count(),
            total = decisions.len(),
            "routed event"
        );
        decisions
    }

    /// Partner actions the event is subscribed to.
    pub fn subscribed_actions(&self, event: &Json) -> Vec<&str> {
        self.route(event)
            .into_iter()
            .filter(Decision::is_subscribed)
            .map(|decision| decision.partner_action)
            .collect()
    }
}

fn decide(parsed: Option<&Subscription>, event: &Json) -> SubscriptionState {
    match parsed {
        None => SubscriptionState::Invalid("missing FQL".to_string()),
        Some(Subscription::Error(cause)) => SubscriptionState::Invalid(cause.message.clone()),
        Some(subscription) if validate(subscription, event) => SubscriptionState::Subscribed,
        Some(_) => SubscriptionState::NotSubscribed,
    }
}
