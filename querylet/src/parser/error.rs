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

//! Template syntax errors
//!
//! Every syntax problem found while scanning, tokenizing or building a template
//! ends up as a [`ParseError`]. The message quotes a short slice of the template
//! around the offending tag so it can be found in a large query file.

use thiserror::Error;

use crate::parser::scanner::Tag;

/// A template could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub(crate) message: String,
}

/// Returns at most the last 32 characters of a string for error context
pub(crate) fn rcap(src: &str) -> &str {
    const CAP_AT: usize = 32;

    match src.char_indices().rev().nth(CAP_AT - 1) {
        Some((pos, _)) => &src[pos..],
        None => src,
    }
}

impl ParseError {
    /// Creates a new parse error quoting the tag it was raised for
    pub(crate) fn new(message: &str, tag: &Tag<'_>) -> Self {
        Self {
            message: format!("{} near \"{}\"", message, tag.raw),
        }
    }

    /// Creates an error for tags or sections that are never closed
    pub(crate) fn unclosed(prefix: &str) -> Self {
        Self {
            message: format!("unclosed tag near \"{}\"", rcap(prefix)),
        }
    }

    /// Creates an error with a plain message and no template context
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human readable description of the problem
    pub fn as_str(&self) -> &str {
        &self.message
    }
}

/// Result type for template parsing operations
pub(crate) type Result<T> = std::result::Result<T, ParseError>;
