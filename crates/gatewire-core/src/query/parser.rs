//! Path-query expression parser
//!
//! A small recursive descent parser over a JMESPath-style subset:
//! member access, quoted members, indices and projections.
//!
//! Copyright (c) 2025 Gatewire Team
//! Licensed under the Apache-2.0 license

use super::ast::{Query, Segment};
use super::error::QueryError;
use std::iter::Peekable;
use std::str::Chars;

type ParseResult<T> = std::result::Result<T, QueryError>;

/// Path-query expression parser
pub struct Parser<'a> {
    /// Input string being parsed
    input: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> ParseResult<Self> {
        if input.trim().is_empty() {
            return Err(QueryError::parse("Empty path query", 0, input));
        }

        Ok(Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        })
    }

    /// Parse the whole expression
    pub fn parse(mut self) -> ParseResult<Query> {
        let mut segments = Vec::new();

        self.skip_whitespace();
        self.parse_optional_root();
        self.parse_leading_segment(&mut segments)?;

        loop {
            self.skip_whitespace();
            match self.current_char() {
                None => break,
                Some('.') => {
                    self.advance();
                    self.skip_whitespace();
                    segments.push(self.parse_member()?);
                }
                Some('[') => segments.push(self.parse_bracket()?),
                Some(ch) => {
                    return Err(QueryError::syntax(
                        "Unexpected character after segment",
                        self.position,
                        self.input,
                        vec![".".to_string(), "[".to_string()],
                        ch.to_string(),
                    ))
                }
            }
        }

        Ok(Query::new(segments))
    }

    /// Accept and discard a JSONPath-style `$` or `$.` prefix
    fn parse_optional_root(&mut self) {
        if self.current_char() == Some('$') {
            self.advance();
            if self.current_char() == Some('.') {
                self.advance();
            }
        }
    }

    fn parse_leading_segment(&mut self, segments: &mut Vec<Segment>) -> ParseResult<()> {
        self.skip_whitespace();
        match self.current_char() {
            // Bare `$` selects the whole record
            None => Ok(()),
            Some('[') => {
                segments.push(self.parse_bracket()?);
                Ok(())
            }
            Some(_) => {
                segments.push(self.parse_member()?);
                Ok(())
            }
        }
    }

    /// Parse a member name, quoted member or `*`
    fn parse_member(&mut self) -> ParseResult<Segment> {
        match self.current_char() {
            Some('*') => {
                self.advance();
                Ok(Segment::ValueProjection)
            }
            Some('"') | Some('\'') => Ok(Segment::Field(self.parse_quoted_string()?)),
            _ => Ok(Segment::Field(self.parse_identifier()?)),
        }
    }

    /// Parse `[index]` or `[*]`
    fn parse_bracket(&mut self) -> ParseResult<Segment> {
        self.advance(); // consume '['
        self.skip_whitespace();

        if self.current_char() == Some('*') {
            self.advance();
            self.skip_whitespace();
            self.expect_char(']')?;
            return Ok(Segment::ListProjection);
        }

        let start = self.position;
        let mut digits = String::new();
        if self.current_char() == Some('-') {
            digits.push('-');
            self.advance();
        }
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let index: i64 = digits.parse().map_err(|_| {
            QueryError::parse(format!("Invalid index: '{}'", digits), start, self.input)
        })?;

        self.skip_whitespace();
        self.expect_char(']')?;
        Ok(Segment::Index(index))
    }

    /// Parse an unquoted identifier
    fn parse_identifier(&mut self) -> ParseResult<String> {
        let mut identifier = String::new();

        if !self.current_char().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false) {
            return Err(QueryError::syntax(
                "Expected identifier",
                self.position,
                self.input,
                vec!["letter or _".to_string()],
                self.found(),
            ));
        }

        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Ok(identifier)
    }

    /// Parse a quoted member name
    fn parse_quoted_string(&mut self) -> ParseResult<String> {
        let start = self.position;
        let quote_char = match self.advance() {
            Some(ch) => ch,
            None => return Err(QueryError::parse("Expected quote", start, self.input)),
        };

        let mut string = String::new();
        let mut escaped = false;

        while let Some(ch) = self.advance() {
            if escaped {
                match ch {
                    'n' => string.push('\n'),
                    't' => string.push('\t'),
                    '\\' | '\'' | '"' => string.push(ch),
                    _ => {
                        string.push('\\');
                        string.push(ch);
                    }
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                return Ok(string);
            } else {
                string.push(ch);
            }
        }

        Err(QueryError::parse("Unterminated quoted identifier", start, self.input))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn found(&mut self) -> String {
        self.current_char()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "EOF".to_string())
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn expect_char(&mut self, expected: char) -> ParseResult<()> {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            _ => {
                let found = self.found();
                Err(QueryError::syntax(
                    format!("Expected '{}'", expected),
                    self.position,
                    self.input,
                    vec![expected.to_string()],
                    found,
                ))
            }
        }
    }
}
