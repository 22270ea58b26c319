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


//! Template tag scanning
//!
//! Splits template source into the literal text before a tag, the tag itself and
//! the remaining source. Tags are delimited by `{{` and `}}`:
//!
//! - Variables and filters: `{{name}}`, `{{{name}}}`, `{{int name}}`
//! - Sections: `{{#if flag}}...{{/if}}`
//! - Partials: `{{> array 'users.list' id=user_id}}`
//! - Comments: `{{! comment }}` or `{{!-- comment with {{tags}} --}}`
//! - Escaped delimiters: `\{{` is emitted as a literal `{{`, while `\\{{`
//!   emits a single `\` followed by the tag
//!
//! A `~` directly inside a delimiter trims the whitespace on that side.
//!
//! # Examples
//!
//! ```ignore
//! let tag = Tag::from("WHERE id = {{int id}}").unwrap().unwrap();
//! assert_eq!(tag.kind, TagKind::Expression);
//! assert_eq!(tag.prefix, "WHERE id = ");
//! assert_eq!(tag.content, "int id");
//! ```

use crate::parser::error::{ParseError, Result};

/// Kinds of template tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `{{! comment }}`
    Comment,
    /// `{{name}}` or `{{{name}}}`
    Expression,
    /// `{{#name}}`
    Open,
    /// `{{/name}}`
    Close,
    /// `{{> kind 'path'}}`
    Partial,
    /// `\{{`, the content is the literal delimiter
    Escaped,
}

/// A tag found in template source
#[derive(Debug, Clone, Copy)]
pub struct Tag<'a> {
    pub kind: TagKind,
    /// Text before the tag
    pub prefix: &'a str,
    /// The tag content, without delimiters, markers or trim markers
    pub content: &'a str,
    /// Text after the tag
    pub postfix: &'a str,
    /// The complete tag including delimiters
    pub raw: &'a str,
}

impl<'a> Tag<'a> {
    /// Finds the closing delimiter of a tag whose content starts at `body`.
    /// `open` is the offset of the opening `{{` in `src`.
    fn close(kind: TagKind, src: &'a str, prefix: &'a str, open: usize, body: usize, end: &'static str) -> Result<Self> {
        let rest = &src[body..];
        let pos = rest.find(end).ok_or_else(|| ParseError::unclosed(&src[..body]))?;
        let raw = &src[open..body + pos + end.len()];
        let mut content = &rest[..pos];
        let mut postfix = &rest[pos + end.len()..];
        if let Some(trimmed) = content.strip_suffix('~') {
            content = trimmed;
            postfix = postfix.trim_start();
        }
        if content.trim().is_empty() && kind != TagKind::Comment {
            return Err(ParseError::message(format!("empty tag near \"{}\"", raw)));
        }
        Ok(Self { kind, prefix, content, postfix, raw })
    }

    /// Parses a comment, either `{{! ... }}` or `{{!-- ... --}}`. A long
    /// comment may end with `--~}}` to trim the whitespace after it.
    fn comment(src: &'a str, prefix: &'a str, open: usize, body: usize) -> Result<Self> {
        if !src[body..].starts_with("--") {
            return Self::close(TagKind::Comment, src, prefix, open, body, "}}");
        }
        let start = body + 2;
        let rest = &src[start..];
        let (pos, end) = ["--}}", "--~}}"]
            .into_iter()
            .filter_map(|end| rest.find(end).map(|pos| (pos, end)))
            .min_by_key(|(pos, _)| *pos)
            .ok_or_else(|| ParseError::unclosed(&src[..start]))?;
        let postfix = &rest[pos + end.len()..];
        Ok(Self {
            kind: TagKind::Comment,
            prefix,
            content: &rest[..pos],
            postfix: if end == "--~}}" { postfix.trim_start() } else { postfix },
            raw: &src[open..start + pos + end.len()],
        })
    }

    /// Finds the first tag in `src`
    pub fn from(src: &'a str) -> Result<Option<Self>> {
        let Some(open) = src.find("{{") else {
            return Ok(None);
        };
        let backslash = src[..open].ends_with('\\');
        if backslash && !src[..open - 1].ends_with('\\') {
            return Ok(Some(Self {
                kind: TagKind::Escaped,
                prefix: &src[..open - 1],
                content: "{{",
                postfix: &src[open + 2..],
                raw: &src[open - 1..open + 2],
            }));
        }
        // `\\{{` is a literal backslash followed by a real tag
        let mut prefix = if backslash { &src[..open - 1] } else { &src[..open] };
        let mut body = open + 2;
        if src[body..].starts_with('~') {
            prefix = prefix.trim_end();
            body += 1;
        }
        let tag = match src[body..].chars().next() {
            None => return Err(ParseError::unclosed(src)),
            Some('{') => {
                let mut raw_body = body + 1;
                if src[raw_body..].starts_with('~') {
                    prefix = prefix.trim_end();
                    raw_body += 1;
                }
                Self::close(TagKind::Expression, src, prefix, open, raw_body, "}}}")?
            }
            Some('!') => Self::comment(src, prefix, open, body + 1)?,
            Some('#') => Self::close(TagKind::Open, src, prefix, open, body + 1, "}}")?,
            Some('/') => Self::close(TagKind::Close, src, prefix, open, body + 1, "}}")?,
            Some('>') => Self::close(TagKind::Partial, src, prefix, open, body + 1, "}}")?,
            Some(_) => Self::close(TagKind::Expression, src, prefix, open, body, "}}")?,
        };
        Ok(Some(tag))
    }

    /// Finds the tag following this one
    pub fn next(&self) -> Result<Option<Self>> {
        Self::from(self.postfix)
    }

    /// Whether this is the `{{else}}` separator of a section
    pub fn is_else(&self) -> bool {
        self.kind == TagKind::Expression && self.content.trim() == "else"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(src: &str) -> Tag<'_> {
        Tag::from(src).unwrap().unwrap()
    }

    #[test]
    fn plain_text_has_no_tags() {
        assert!(Tag::from("SELECT 1").unwrap().is_none());
    }

    #[test]
    fn expression() {
        let tag = first("Hello {{name}}!");
        assert_eq!(tag.kind, TagKind::Expression);
        assert_eq!(tag.prefix, "Hello ");
        assert_eq!(tag.content, "name");
        assert_eq!(tag.postfix, "!");
        assert_eq!(tag.raw, "{{name}}");
    }

    #[test]
    fn triple_stash_is_an_expression() {
        let tag = first("{{{ name }}} rest");
        assert_eq!(tag.kind, TagKind::Expression);
        assert_eq!(tag.content, " name ");
        assert_eq!(tag.postfix, " rest");
    }

    #[test]
    fn markers() {
        assert_eq!(first("{{#if a}}").kind, TagKind::Open);
        assert_eq!(first("{{/if}}").kind, TagKind::Close);
        assert_eq!(first("{{> include 'a.b'}}").kind, TagKind::Partial);
        assert_eq!(first("{{> include 'a.b'}}").content, " include 'a.b'");
    }

    #[test]
    fn comments() {
        let tag = first("a{{! note }}b");
        assert_eq!(tag.kind, TagKind::Comment);
        assert_eq!(tag.postfix, "b");
        let tag = first("a{{!-- {{hidden}} --}}b");
        assert_eq!(tag.kind, TagKind::Comment);
        assert_eq!(tag.content, " {{hidden}} ");
        assert_eq!(tag.postfix, "b");
    }

    #[test]
    fn escaped_delimiter() {
        let tag = first(r"json \{{ not a tag");
        assert_eq!(tag.kind, TagKind::Escaped);
        assert_eq!(tag.prefix, "json ");
        assert_eq!(tag.content, "{{");
        assert_eq!(tag.postfix, " not a tag");
    }

    #[test]
    fn long_comment_with_trim_markers() {
        let tag = first("a {{~!-- x --~}} b");
        assert_eq!(tag.kind, TagKind::Comment);
        assert_eq!(tag.prefix, "a");
        assert_eq!(tag.content, " x ");
        assert_eq!(tag.postfix, "b");
        assert_eq!(tag.raw, "{{~!-- x --~}}");
    }

    #[test]
    fn escaped_backslash_keeps_the_tag() {
        let tag = first(r"a \\{{name}} b");
        assert_eq!(tag.kind, TagKind::Expression);
        assert_eq!(tag.prefix, r"a \");
        assert_eq!(tag.content, "name");
        assert_eq!(tag.postfix, " b");
    }

    #[test]
    fn trimming() {
        let tag = first("SELECT   {{~name~}}   FROM");
        assert_eq!(tag.prefix, "SELECT");
        assert_eq!(tag.content, "name");
        assert_eq!(tag.postfix, "FROM");
    }

    #[test]
    fn else_separator() {
        assert!(first("{{else}}").is_else());
        assert!(first("{{ else }}").is_else());
        assert!(!first("{{elsewhere}}").is_else());
    }

    #[test]
    fn unclosed_and_empty_tags() {
        assert!(Tag::from("SELECT {{name").is_err());
        assert!(Tag::from("SELECT {{").is_err());
        assert!(Tag::from("SELECT {{ }}").is_err());
    }

    #[test]
    fn next_walks_the_source() {
        let tag = first("{{a}} and {{b}}");
        let next = tag.next().unwrap().unwrap();
        assert_eq!(next.prefix, " and ");
        assert_eq!(next.content, "b");
        assert!(next.next().unwrap().is_none());
    }
}
