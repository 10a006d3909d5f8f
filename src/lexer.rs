//! FQL tokenizer

use std::borrow::Cow;

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte offset into the input
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// Returns the current character without advancing
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Returns the character after the current one without advancing
    fn peek_next(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    /// Advances one character and returns it
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind<'a>, start: usize) -> Token<'a> {
        Token::new(kind, Span::new(start, self.position))
    }

    /// Reads `-?digits(.digits)?`; the leading character is already consumed.
    /// Literals that overflow `f64` are illegal.
    fn read_number(&mut self, start: usize) -> Token<'a> {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        match self.input[start..self.position].parse::<f64>().ok().filter(|n| n.is_finite()) {
            Some(value) => self.token(TokenKind::Number(value), start),
            None => self.token(TokenKind::Illegal, start),
        }
    }

    /// Reads a double-quoted string literal.
    /// The opening quote has already been consumed.
    fn read_string(&mut self, start: usize) -> Token<'a> {
        let content_start = self.position;
        // Stays borrowed until the first escape sequence.
        let mut owned: Option<String> = None;

        loop {
            let before = self.position;
            match self.bump() {
                None => return self.token(TokenKind::Illegal, start),
                Some('"') => {
                    let value = match owned {
                        Some(s) => Cow::Owned(s),
                        None => Cow::Borrowed(&self.input[content_start..before]),
                    };
                    return self.token(TokenKind::String(value), start);
                }
                Some('\\') => {
                    let Some(escaped) = self.bump() else {
                        return self.token(TokenKind::Illegal, start);
                    };
                    let buf = owned.get_or_insert_with(|| self.input[content_start..before].to_string());
                    match escaped {
                        'n' => buf.push('\n'),
                        't' => buf.push('\t'),
                        other => buf.push(other),
                    }
                }
                Some(c) => {
                    if let Some(buf) = owned.as_mut() {
                        buf.push(c);
                    }
                }
            }
        }
    }

    /// Reads an identifier or conditional keyword.
    /// Identifiers may contain letters, digits, `_`, `$` and `-`.
    fn read_identifier(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' || c == '-' {
                self.bump();
            } else {
                break;
            }
        }
        let literal = &self.input[start..self.position];
        let kind = match literal {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            _ => TokenKind::Identifier(Cow::Borrowed(literal)),
        };
        self.token(kind, start)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.position;

        let c = self.bump()?;

        let token = match c {
            '=' => self.token(TokenKind::Eq, start),
            '(' => self.token(TokenKind::LParen, start),
            ')' => self.token(TokenKind::RParen, start),
            '.' => self.token(TokenKind::Dot, start),
            ',' => self.token(TokenKind::Comma, start),
            '<' => {
                if self.peek() == Some('=') {
                    self.bump();
                    self.token(TokenKind::Lte, start)
                } else {
                    self.token(TokenKind::Lt, start)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.bump();
                    self.token(TokenKind::Gte, start)
                } else {
                    self.token(TokenKind::Gt, start)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.bump();
                    self.token(TokenKind::NotEq, start)
                } else {
                    self.token(TokenKind::Bang, start)
                }
            }
            '"' => self.read_string(start),
            '-' if matches!(self.peek(), Some(c) if c.is_ascii_digit()) => self.read_number(start),
            c if c.is_ascii_digit() => self.read_number(start),
            c if c.is_alphabetic() || c == '_' || c == '$' => self.read_identifier(start),
            _ => self.token(TokenKind::Illegal, start),
        };
        Some(token)
    }
}

/// Tokenizes the whole input; the result always ends with a single `Eos` token.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens: Vec<_> = Lexer::new(input).collect();
    tokens.push(Token::eos(input.len()));
    tokens
}
