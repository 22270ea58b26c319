//! Template parser
//!
//! Turns template source into an untyped parse tree: literal text, expression
//! tags, partial tags and nested sections. Names inside tags are left as text;
//! [`crate::builder`] decides what they mean.
//!
//! # Module Structure
//!
//! - `scanner.rs`: finds tags and the text around them
//! - `tokenizer.rs`: splits tag content into tokens
//! - `error.rs`: syntax errors

pub(crate) mod error;
pub mod scanner;
pub mod tokenizer;

pub use error::ParseError;

use error::Result;
use scanner::{Tag, TagKind};

/// A node of the parse tree
#[derive(Debug, Clone)]
pub enum Tree<'a> {
    /// Literal template text
    Text(&'a str),
    /// `{{...}}`
    Expression(Tag<'a>),
    /// `{{> ...}}`
    Partial(Tag<'a>),
    /// `{{#name args}}body{{else}}else_body{{/name}}`
    Section {
        open: Tag<'a>,
        name: &'a str,
        args: &'a str,
        body: Vec<Tree<'a>>,
        else_body: Option<Vec<Tree<'a>>>,
    },
}

/// A section that has been opened but not closed yet
struct Frame<'a> {
    open: Tag<'a>,
    name: &'a str,
    args: &'a str,
    body: Vec<Tree<'a>>,
    else_body: Option<Vec<Tree<'a>>>,
}

impl<'a> Frame<'a> {
    /// Children go to the else body once `{{else}}` has been seen
    fn target(&mut self) -> &mut Vec<Tree<'a>> {
        match &mut self.else_body {
            Some(else_body) => else_body,
            None => &mut self.body,
        }
    }

    fn into_tree(self) -> Tree<'a> {
        Tree::Section {
            open: self.open,
            name: self.name,
            args: self.args,
            body: self.body,
            else_body: self.else_body,
        }
    }
}

fn target<'s, 'a>(stack: &'s mut [Frame<'a>], root: &'s mut Vec<Tree<'a>>) -> &'s mut Vec<Tree<'a>> {
    match stack.last_mut() {
        Some(frame) => frame.target(),
        None => root,
    }
}

/// Parses template source into a parse tree
pub fn parse(src: &str) -> Result<Vec<Tree<'_>>> {
    let mut root = Vec::new();
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut rest = src;
    let mut next = Tag::from(src)?;
    while let Some(tag) = next {
        if !tag.prefix.is_empty() {
            target(&mut stack, &mut root).push(Tree::Text(tag.prefix));
        }
        match tag.kind {
            TagKind::Comment => {}
            TagKind::Escaped => target(&mut stack, &mut root).push(Tree::Text(tag.content)),
            TagKind::Expression if tag.is_else() => {
                let frame = stack
                    .last_mut()
                    .ok_or_else(|| ParseError::new("else outside of a section", &tag))?;
                if frame.else_body.is_some() {
                    return Err(ParseError::new(
                        &format!("duplicate else in section {}", frame.name),
                        &tag,
                    ));
                }
                frame.else_body = Some(Vec::new());
            }
            TagKind::Expression => target(&mut stack, &mut root).push(Tree::Expression(tag)),
            TagKind::Partial => target(&mut stack, &mut root).push(Tree::Partial(tag)),
            TagKind::Open => {
                let content = tag.content.trim();
                let (name, args) = content
                    .split_once(char::is_whitespace)
                    .unwrap_or((content, ""));
                stack.push(Frame {
                    open: tag,
                    name,
                    args: args.trim(),
                    body: Vec::new(),
                    else_body: None,
                });
            }
            TagKind::Close => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| ParseError::new("close without a matching open", &tag))?;
                if tag.content.trim() != frame.name {
                    return Err(ParseError::new(
                        &format!("expected close of section {}", frame.name),
                        &tag,
                    ));
                }
                target(&mut stack, &mut root).push(frame.into_tree());
            }
        }
        rest = tag.postfix;
        next = tag.next()?;
    }
    if let Some(frame) = stack.last() {
        return Err(ParseError::new(
            &format!("unclosed section {}", frame.name),
            &frame.open,
        ));
    }
    if !rest.is_empty() {
        root.push(Tree::Text(rest));
    }
    Ok(root)
}
