// MIT License
//
// Copyright (c) 2024 Jerome Johnson
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.


//! Tag content tokenization
//!
//! Splits the content of a tag into whitespace separated tokens:
//!
//! - Names: `user_id`, `int`, `include`
//! - String literals in single or double quotes: `'users.list'`, `"andrew"`
//! - Named parameters: `name='andrew'`, `id=user_id`
//!
//! String literals are kept verbatim; no escape sequences are processed, a
//! backslash only stops the following quote from closing the literal.
//!
//! # Examples
//!
//! ```ignore
//! let token = Token::first("include 'users.email' id=user_id").unwrap().unwrap();
//! assert_eq!(token.value, "include");
//! let path = token.next().unwrap().unwrap();
//! assert_eq!(path.token_type, TokenType::Literal);
//! assert_eq!(path.value, "users.email");
//! ```

use crate::parser::error::{ParseError, Result, rcap};

/// Types of tokens found in tag content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType<'a> {
    /// A bare word
    Name,
    /// A quoted string, the value excludes the quotes
    Literal,
    /// `key=value`, the token value is the raw right hand side
    Pair(&'a str),
}

/// A token parsed from tag content
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    /// The type of token
    pub token_type: TokenType<'a>,
    /// The token's value
    pub value: &'a str,
    /// The remaining content after this token
    pub tail: &'a str,
}

/// Returns the offset just past the closing quote of the literal opening `src`
fn find_end_of_string(src: &str) -> Result<usize> {
    let mut chars = src.char_indices();
    let Some((_, quote)) = chars.next() else {
        return Err(ParseError::message("expected a string"));
    };
    let mut escaped = false;
    for (i, c) in chars {
        match c {
            '\\' => escaped = !escaped,
            c if c == quote && !escaped => return Ok(i + c.len_utf8()),
            _ => escaped = false,
        }
    }
    Err(ParseError::message(format!(
        "unterminated string near \"{}\"",
        rcap(src)
    )))
}

/// Finds the end of a bare word: whitespace or `=`
fn find_end(src: &str) -> usize {
    src.find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(src.len())
}

fn is_quote(src: &str) -> bool {
    src.starts_with(['\'', '"'])
}

/// Offset of the end of the value opening `src`, quoted or bare
fn value_end(src: &str) -> Result<usize> {
    if is_quote(src) {
        find_end_of_string(src)
    } else {
        Ok(find_end(src))
    }
}

/// Parses a single token from the input string
fn parse(src: &str) -> Result<Option<Token<'_>>> {
    if src.is_empty() {
        return Ok(None);
    }
    let end = value_end(src)?;
    let rest = &src[end..];
    if is_quote(src) {
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Err(ParseError::message(format!(
                "expected whitespace after string near \"{}\"",
                rcap(src)
            )));
        }
        return Ok(Some(Token {
            token_type: TokenType::Literal,
            value: &src[1..end - 1],
            tail: rest.trim_start(),
        }));
    }
    let Some(rhs) = rest.strip_prefix('=') else {
        return Ok(Some(Token {
            token_type: TokenType::Name,
            value: &src[..end],
            tail: rest.trim_start(),
        }));
    };
    let key = &src[..end];
    if key.is_empty() || rhs.is_empty() || rhs.starts_with(char::is_whitespace) || rhs.starts_with('=') {
        return Err(ParseError::message(format!(
            "expected key=value near \"{}\"",
            rcap(src)
        )));
    }
    let end = value_end(rhs)?;
    Ok(Some(Token {
        token_type: TokenType::Pair(key),
        value: &rhs[..end],
        tail: rhs[end..].trim_start(),
    }))
}

impl<'a> Token<'a> {
    /// Parses the first token from a string
    pub fn first(src: &'a str) -> Result<Option<Self>> {
        parse(src.trim())
    }

    /// Parses the next token after this one
    pub fn next(&self) -> Result<Option<Self>> {
        parse(self.tail)
    }

    /// Collects this token and every token after it
    pub fn collect_rest(self) -> Result<Vec<Self>> {
        let mut tokens = vec![self];
        while let Some(token) = tokens[tokens.len() - 1].next()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Tokenizes all of `src`
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>> {
    match Token::first(src)? {
        Some(token) => token.collect_rest(),
        None => Ok(Vec::new()),
    }
}
