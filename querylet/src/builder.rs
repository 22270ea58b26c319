//! Maps the parse tree onto the typed AST.
//!
//! Every kind name is resolved here, so an unknown filter, partial kind or
//! section name fails the compile before any data is bound.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{BlockKind, FilterKind, IfKind, Node, Parameter, PartialKind};
use crate::error::{Error, Result};
use crate::parser::scanner::Tag;
use crate::parser::tokenizer::{Token, TokenType, tokenize};
use crate::parser::{ParseError, Tree, parse};

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid name pattern"));

static DOT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_\-]+(\.[A-Za-z0-9_\-]+)*$").expect("valid dot path pattern")
});

/// Parses and builds template source in one step
pub fn compile(src: &str) -> Result<Node> {
    let trees = parse(src)?;
    build(&trees)
}

/// Builds the root sequence of a template from its parse tree
pub fn build(trees: &[Tree<'_>]) -> Result<Node> {
    Ok(Node::Sequence(build_all(trees)?))
}

fn build_all(trees: &[Tree<'_>]) -> Result<Vec<Node>> {
    trees.iter().map(build_tree).collect()
}

fn build_tree(tree: &Tree<'_>) -> Result<Node> {
    match tree {
        Tree::Text(text) => Ok(Node::Content(text.to_string())),
        Tree::Expression(tag) => build_expression(tag),
        Tree::Partial(tag) => build_partial(tag),
        Tree::Section {
            open,
            name,
            args,
            body,
            else_body,
        } => build_section(open, name, args, body, else_body.as_deref()),
    }
}

fn syntax(message: &str, tag: &Tag<'_>) -> Error {
    Error::Parse(ParseError::new(message, tag))
}

/// Checks that a token is a bare, valid identifier and returns it
fn name<'a>(token: &Token<'a>, tag: &Tag<'_>) -> Result<&'a str> {
    if token.token_type == TokenType::Name && NAME.is_match(token.value) {
        Ok(token.value)
    } else {
        Err(syntax(&format!("invalid name {}", token.value), tag))
    }
}

/// `{{name}}`, `{{'text'}}` or `{{filter name}}`
fn build_expression(tag: &Tag<'_>) -> Result<Node> {
    let tokens = tokenize(tag.content)?;
    match tokens.as_slice() {
        [] => Err(syntax("empty expression", tag)),
        [literal] if literal.token_type == TokenType::Literal => {
            Ok(Node::StringLiteral(literal.value.to_string()))
        }
        [variable] => Ok(Node::Variable(name(variable, tag)?.to_string())),
        [filter, variable] => {
            let kind: FilterKind = name(filter, tag)?.parse()?;
            Ok(Node::filter(kind, name(variable, tag)?))
        }
        _ => Err(syntax("too many arguments", tag)),
    }
}

/// The right hand side of a `key=value` partial parameter
fn build_parameter(value: &str, tag: &Tag<'_>) -> Result<Node> {
    let token = Token::first(value)?.ok_or_else(|| syntax("missing parameter value", tag))?;
    let parameter = match token.token_type {
        TokenType::Literal => Parameter::Node(Box::new(Node::StringLiteral(token.value.to_string()))),
        _ => Parameter::Name(name(&token, tag)?.to_string()),
    };
    Ok(Node::Parameter(parameter))
}

/// `{{> kind 'dot.path' key=value ...}}`
fn build_partial(tag: &Tag<'_>) -> Result<Node> {
    let tokens = tokenize(tag.content)?;
    let (kind, path, pairs) = match tokens.as_slice() {
        [kind, path, pairs @ ..] => (kind, path, pairs),
        _ => return Err(syntax("expected partial kind and path", tag)),
    };
    let kind: PartialKind = name(kind, tag)?.parse()?;
    if path.token_type != TokenType::Literal || !DOT_PATH.is_match(path.value) {
        return Err(syntax(&format!("invalid partial path {}", path.value), tag));
    }
    let params = pairs
        .iter()
        .map(|pair| match pair.token_type {
            TokenType::Pair(key) if NAME.is_match(key) => {
                Ok((key.to_string(), build_parameter(pair.value, tag)?))
            }
            _ => Err(syntax(&format!("expected key=value, found {}", pair.value), tag)),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Node::Partial {
        kind,
        path: path.value.to_string(),
        params,
    })
}

/// `{{#if name}}`, `{{#unless name}}` or one of the wrapping blocks
fn build_section(
    open: &Tag<'_>,
    section: &str,
    args: &str,
    body: &[Tree<'_>],
    else_body: Option<&[Tree<'_>]>,
) -> Result<Node> {
    let args = tokenize(args)?;
    if let Ok(kind) = section.parse::<IfKind>() {
        let condition = match args.as_slice() {
            [condition] => name(condition, open)?.to_string(),
            [] => return Err(syntax(&format!("expected variable after {}", section), open)),
            _ => return Err(syntax("too many arguments", open)),
        };
        let body = build_all(body)?;
        return Ok(match else_body {
            Some(else_body) => Node::IfElse {
                kind,
                condition,
                body,
                else_body: build_all(else_body)?,
            },
            None => Node::If {
                kind,
                condition,
                body,
            },
        });
    }
    let kind: BlockKind = section.parse()?;
    if !args.is_empty() {
        return Err(syntax(&format!("{} takes no arguments", kind), open));
    }
    if else_body.is_some() {
        return Err(syntax(&format!("unexpected else in {} block", kind), open));
    }
    Ok(Node::Block {
        kind,
        body: build_all(body)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(src: &str) -> Vec<Node> {
        match compile(src).unwrap() {
            Node::Sequence(items) => items,
            other => panic!("expected a sequence, got {:?}", other),
        }
    }

    #[test]
    fn content_and_variables() {
        assert_eq!(
            root("Hello {{name}}"),
            vec![Node::content("Hello "), Node::variable("name")]
        );
    }

    #[test]
    fn string_literal() {
        assert_eq!(root("{{'x'}}"), vec![Node::StringLiteral("x".into())]);
    }

    #[test]
    fn filters() {
        assert_eq!(
            root("{{int id}}{{ wild q }}"),
            vec![
                Node::filter(FilterKind::Int, "id"),
                Node::filter(FilterKind::Wild, "q")
            ]
        );
        assert!(matches!(
            compile("{{date id}}"),
            Err(Error::UnrecognizedFilter(name)) if name == "date"
        ));
    }

    #[test]
    fn partial_with_parameters() {
        assert_eq!(
            root("{{> include 'examples.include_with_params' name='andrew' id=user_id }}"),
            vec![Node::Partial {
                kind: PartialKind::Include,
                path: "examples.include_with_params".into(),
                params: vec![
                    (
                        "name".into(),
                        Node::Parameter(Parameter::Node(Box::new(Node::StringLiteral(
                            "andrew".into()
                        ))))
                    ),
                    ("id".into(), Node::Parameter(Parameter::Name("user_id".into()))),
                ],
            }]
        );
    }

    #[test]
    fn partial_errors() {
        assert!(matches!(
            compile("{{> list 'a.b'}}"),
            Err(Error::UnrecognizedPartialKind(kind)) if kind == "list"
        ));
        assert!(matches!(compile("{{> array a.b}}"), Err(Error::Parse(_))));
        assert!(matches!(compile("{{> array '../a'}}"), Err(Error::Parse(_))));
        assert!(matches!(compile("{{> array 'a' id}}"), Err(Error::Parse(_))));
        assert!(matches!(compile("{{> array}}"), Err(Error::Parse(_))));
    }

    #[test]
    fn sections() {
        assert_eq!(
            root("{{#unless flag}}a{{else}}b{{/unless}}{{#array}}SELECT 1{{/array}}"),
            vec![
                Node::IfElse {
                    kind: IfKind::Unless,
                    condition: "flag".into(),
                    body: vec![Node::content("a")],
                    else_body: vec![Node::content("b")],
                },
                Node::Block {
                    kind: BlockKind::Array,
                    body: vec![Node::content("SELECT 1")],
                },
            ]
        );
    }

    #[test]
    fn section_errors() {
        assert!(matches!(
            compile("{{#each rows}}x{{/each}}"),
            Err(Error::UnrecognizedBlockKind(kind)) if kind == "each"
        ));
        assert!(matches!(compile("{{#if}}x{{/if}}"), Err(Error::Parse(_))));
        assert!(matches!(compile("{{#if a b}}x{{/if}}"), Err(Error::Parse(_))));
        assert!(matches!(compile("{{#object x}}x{{/object}}"), Err(Error::Parse(_))));
        assert!(matches!(
            compile("{{#plain}}x{{else}}y{{/plain}}"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn invalid_names() {
        assert!(matches!(compile("{{user.name}}"), Err(Error::Parse(_))));
        assert!(matches!(compile("{{1abc}}"), Err(Error::Parse(_))));
        assert!(matches!(compile("{{a b c}}"), Err(Error::Parse(_))));
    }
}
