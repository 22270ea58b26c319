//! Typed template AST
//!
//! The parser produces an untyped tree of tags; [`crate::builder`] maps it onto
//! this closed set of nodes, resolving every kind name up front so that the
//! evaluator only ever matches on enums.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::Error;

/// A node of a compiled template
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal template text
    Content(String),
    /// `{{name}}`
    Variable(String),
    /// `{{'text'}}`, or a quoted partial parameter
    StringLiteral(String),
    /// The value bound to a partial parameter
    Parameter(Parameter),
    /// `{{> kind 'dot.path' key=value}}`
    Partial {
        kind: PartialKind,
        path: String,
        params: Vec<(String, Node)>,
    },
    /// `{{#if name}}...{{/if}}`
    If {
        kind: IfKind,
        condition: String,
        body: Vec<Node>,
    },
    /// `{{#if name}}...{{else}}...{{/if}}`
    IfElse {
        kind: IfKind,
        condition: String,
        body: Vec<Node>,
        else_body: Vec<Node>,
    },
    /// `{{int name}}`
    Filter { kind: FilterKind, variable: String },
    /// `{{#array}}...{{/array}}`
    Block { kind: BlockKind, body: Vec<Node> },
    /// Concatenation of the children, the root of every template
    Sequence(Vec<Node>),
}

/// Right hand side of a partial parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// A bare name, resolved exactly like a variable
    Name(String),
    /// A nested node, evaluated recursively
    Node(Box<Node>),
}

macro_rules! kind_enum {
    ($(#[$meta:meta])* $name:ident, $error:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Error> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(Error::$error(other.to_string())),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

kind_enum! {
    /// How the output of a partial is wrapped
    PartialKind, UnrecognizedPartialKind {
        Array => "array",
        Object => "object",
        Include => "include",
    }
}

kind_enum! {
    /// How the output of an inline block is wrapped
    BlockKind, UnrecognizedBlockKind {
        Array => "array",
        Object => "object",
        Plain => "plain",
    }
}

kind_enum! {
    IfKind, UnrecognizedBlockKind {
        If => "if",
        Unless => "unless",
    }
}

kind_enum! {
    /// Typed SQL literal encoders
    FilterKind, UnrecognizedFilter {
        Int => "int",
        Float => "float",
        Str => "str",
        Arr => "arr",
        Wild => "wild",
    }
}

impl IfKind {
    /// Whether the body is taken for a condition of the given truthiness
    pub fn takes_body(&self, truthy: bool) -> bool {
        match self {
            IfKind::If => truthy,
            IfKind::Unless => !truthy,
        }
    }
}

impl Node {
    /// Builds the root sequence of a template
    pub fn sequence(items: impl IntoIterator<Item = Node>) -> Node {
        Node::Sequence(items.into_iter().collect())
    }

    pub fn content(text: impl Into<String>) -> Node {
        Node::Content(text.into())
    }

    pub fn variable(name: impl Into<String>) -> Node {
        Node::Variable(name.into())
    }

    pub fn filter(kind: FilterKind, variable: impl Into<String>) -> Node {
        Node::Filter {
            kind,
            variable: variable.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        assert_eq!("array".parse::<PartialKind>().unwrap(), PartialKind::Array);
        assert_eq!("plain".parse::<BlockKind>().unwrap(), BlockKind::Plain);
        assert_eq!("wild".parse::<FilterKind>().unwrap().as_str(), "wild");
    }

    #[test]
    fn unknown_kinds_carry_the_offending_name() {
        assert!(matches!(
            "date".parse::<FilterKind>(),
            Err(Error::UnrecognizedFilter(name)) if name == "date"
        ));
        assert!(matches!(
            "list".parse::<PartialKind>(),
            Err(Error::UnrecognizedPartialKind(name)) if name == "list"
        ));
        assert!(matches!(
            "each".parse::<BlockKind>(),
            Err(Error::UnrecognizedBlockKind(name)) if name == "each"
        ));
    }

    #[test]
    fn unless_inverts_the_condition() {
        assert!(IfKind::If.takes_body(true));
        assert!(!IfKind::If.takes_body(false));
        assert!(IfKind::Unless.takes_body(false));
        assert!(!IfKind::Unless.takes_body(true));
    }
}
