//! Token stream normalization.
//!
//! The lexer emits `properties`, `.`, `price` as three tokens. Root-key
//! recognition in the parser needs the dotted path as a single identifier, so
//! every `identifier . identifier` run is merged before parsing.

use std::borrow::Cow;

use crate::token::{Token, TokenKind};

/// Merges `identifier, dot, identifier` triples into one dotted identifier.
///
/// A merged identifier can absorb further `. identifier` pairs, which keeps
/// deep paths such as `context.device.type` intact. Every other token is
/// passed through untouched and in order.
pub fn normalize<'a>(tokens: &[Token<'a>]) -> Vec<Token<'a>> {
    let mut normalized: Vec<Token<'a>> = Vec::with_capacity(tokens.len());
    let mut index = 0;

    while index < tokens.len() {
        let current = &tokens[index];

        if current.kind == TokenKind::Dot {
            if let (Some(previous), Some(next)) = (normalized.last_mut(), tokens.get(index + 1)) {
                if let (TokenKind::Identifier(head), TokenKind::Identifier(tail)) =
                    (&mut previous.kind, &next.kind)
                {
                    let merged = format!("{head}.{tail}");
                    *head = Cow::Owned(merged);
                    previous.span = previous.span.to(next.span);
                    index += 2;
                    continue;
                }
            }
        }

        normalized.push(current.clone());
        index += 1;
    }

    normalized
}
