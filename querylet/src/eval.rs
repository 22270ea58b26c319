//! Recursive template evaluation.
//!
//! [`evaluate`] walks a compiled template depth first and concatenates the
//! output of every node. It is pure: the same node and context always produce
//! the same text, and the context is never modified.

use crate::ast::{Node, Parameter};
use crate::context::Context;
use crate::error::Result;
use crate::value::{Data, Value};

/// Evaluates `node` against `ctx`, producing SQL text
pub fn evaluate(node: &Node, ctx: &Context<'_>) -> Result<String> {
    let mut out = String::new();
    write_node(node, ctx, &mut out)?;
    Ok(out)
}

fn write_all(nodes: &[Node], ctx: &Context<'_>, out: &mut String) -> Result<()> {
    nodes.iter().try_for_each(|node| write_node(node, ctx, out))
}

fn write_node(node: &Node, ctx: &Context<'_>, out: &mut String) -> Result<()> {
    match node {
        Node::Content(text) | Node::StringLiteral(text) => out.push_str(text),
        Node::Variable(name) => out.push_str(&ctx.get(name).to_string()),
        Node::Parameter(parameter) => out.push_str(&parameter_value(parameter, ctx)?.to_string()),
        Node::Partial { kind, path, params } => {
            let mut bound = Data::new();
            for (name, node) in params {
                bound.insert(name.as_str(), bound_value(node, ctx)?);
            }
            let content = ctx.get_partial(path, bound)?;
            out.push_str(&kind.wrap(content));
        }
        Node::If {
            kind,
            condition,
            body,
        } => {
            if kind.takes_body(ctx.get(condition).is_truthy()) {
                write_all(body, ctx, out)?;
            }
        }
        Node::IfElse {
            kind,
            condition,
            body,
            else_body,
        } => {
            if kind.takes_body(ctx.get(condition).is_truthy()) {
                write_all(body, ctx, out)?;
            } else {
                write_all(else_body, ctx, out)?;
            }
        }
        Node::Filter { kind, variable } => out.push_str(&kind.apply(variable, ctx.get(variable))?),
        Node::Block { kind, body } => {
            let mut content = String::new();
            write_all(body, ctx, &mut content)?;
            out.push_str(&kind.wrap(content));
        }
        Node::Sequence(items) => write_all(items, ctx, out)?,
    }
    Ok(())
}

/// A bare name keeps its raw value, a nested node becomes its text
fn parameter_value(parameter: &Parameter, ctx: &Context<'_>) -> Result<Value> {
    match parameter {
        Parameter::Name(name) => Ok(ctx.get(name).clone()),
        Parameter::Node(node) => Ok(Value::Text(evaluate(node, ctx)?)),
    }
}

/// The value a partial parameter binds in the child context
fn bound_value(node: &Node, ctx: &Context<'_>) -> Result<Value> {
    match node {
        Node::Parameter(parameter) => parameter_value(parameter, ctx),
        Node::Variable(name) => Ok(ctx.get(name).clone()),
        other => Ok(Value::Text(evaluate(other, ctx)?)),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::ast::{BlockKind, FilterKind, IfKind, PartialKind};
    use crate::error::Error;

    fn no_partials(path: &str, _: &Context<'_>) -> Result<String> {
        Err(Error::PartialNotFound(path.to_string()))
    }

    fn eval(node: &Node, data: Data) -> Result<String> {
        evaluate(node, &Context::new(data, &no_partials))
    }

    fn flag_if(kind: IfKind) -> Node {
        Node::If {
            kind,
            condition: "flag".into(),
            body: vec![Node::content("yes")],
        }
    }

    #[test]
    fn content_is_identity() {
        let node = Node::sequence([Node::content("SELECT "), Node::content("1")]);
        assert_eq!(eval(&node, Data::new()).unwrap(), "SELECT 1");
    }

    #[test]
    fn variables() {
        let node = Node::sequence([Node::content("Hello "), Node::variable("name")]);
        assert_eq!(
            eval(&node, Data::from([("name", "world")])).unwrap(),
            "Hello world"
        );
        assert_eq!(
            eval(&node, Data::from([("name", Value::Absent)])).unwrap(),
            "Hello "
        );
        assert_eq!(eval(&node, Data::new()).unwrap(), "Hello ");
    }

    #[test]
    fn filters_use_the_raw_value() {
        let node = Node::filter(FilterKind::Int, "x");
        assert_eq!(eval(&node, Data::from([("x", 5)])).unwrap(), "5");
        assert!(matches!(
            eval(&node, Data::from([("x", "5")])),
            Err(Error::FilterType { parameter, kind: FilterKind::Int }) if parameter == "x"
        ));

        let node = Node::filter(FilterKind::Arr, "ids");
        assert_eq!(
            eval(&node, Data::from([("ids", vec![1, 2, 3])])).unwrap(),
            "1,2,3"
        );
        assert_eq!(
            eval(&node, Data::from([("ids", vec!["a", "b"])])).unwrap(),
            "'a','b'"
        );
        let mixed = Value::Collection(vec![Value::from(1), Value::from("a")]);
        assert!(eval(&node, Data::from([("ids", mixed)])).is_err());
    }

    #[test]
    fn if_block() {
        let node = flag_if(IfKind::If);
        assert_eq!(eval(&node, Data::from([("flag", true)])).unwrap(), "yes");
        assert_eq!(eval(&node, Data::from([("flag", false)])).unwrap(), "");
        assert_eq!(eval(&node, Data::from([("flag", 0)])).unwrap(), "yes");
        assert_eq!(eval(&node, Data::from([("flag", "")])).unwrap(), "yes");
        assert_eq!(eval(&node, Data::new()).unwrap(), "");

        let node = flag_if(IfKind::Unless);
        assert_eq!(eval(&node, Data::from([("flag", true)])).unwrap(), "");
        assert_eq!(eval(&node, Data::new()).unwrap(), "yes");
    }

    #[test]
    fn if_else_block_takes_exactly_one_branch() {
        let node = Node::IfElse {
            kind: IfKind::If,
            condition: "flag".into(),
            body: vec![Node::content("yes")],
            else_body: vec![Node::content("no")],
        };
        assert_eq!(eval(&node, Data::from([("flag", true)])).unwrap(), "yes");
        assert_eq!(eval(&node, Data::from([("flag", false)])).unwrap(), "no");
    }

    #[test]
    fn blocks_wrap_their_body() {
        let node = Node::Block {
            kind: BlockKind::Object,
            body: vec![Node::content("SELECT "), Node::filter(FilterKind::Int, "id")],
        };
        assert_eq!(
            eval(&node, Data::from([("id", 3)])).unwrap(),
            "(SELECT COALESCE(row_to_json(object_row),'{}'::json) FROM (\nSELECT 3\n) object_row)"
        );
        let node = Node::Block {
            kind: BlockKind::Plain,
            body: vec![Node::content("SELECT 1")],
        };
        assert_eq!(eval(&node, Data::new()).unwrap(), "SELECT 1");
    }

    #[test]
    fn partial_array_wrap() {
        let resolver = |_: &str, _: &Context<'_>| -> Result<String> { Ok("SELECT 1".into()) };
        let node = Node::Partial {
            kind: PartialKind::Array,
            path: "rows".into(),
            params: vec![],
        };
        let out = evaluate(&node, &Context::new(Data::new(), &resolver)).unwrap();
        assert_eq!(
            out,
            "(SELECT COALESCE(array_to_json(array_agg(row_to_json(array_row))),'[]'::json) FROM (\nSELECT 1\n) array_row)"
        );
    }

    #[test]
    fn partial_parameters_override_and_last_one_wins() {
        let resolver = |path: &str, child: &Context<'_>| -> Result<String> {
            Ok(format!("{}:{}:{:?}", path, child.get("name"), child.get("ids")))
        };
        let literal = |text: &str| {
            Node::Parameter(Parameter::Node(Box::new(Node::StringLiteral(text.into()))))
        };
        let node = Node::Partial {
            kind: PartialKind::Include,
            path: "users.name".into(),
            params: vec![
                ("name".into(), literal("first")),
                ("name".into(), literal("andrew")),
                ("ids".into(), Node::Parameter(Parameter::Name("user_ids".into()))),
            ],
        };
        let data = Data::from([
            ("name", Value::from("caller")),
            ("user_ids", Value::from(vec![1, 2])),
        ]);
        let ctx = Context::new(data, &resolver);
        assert_eq!(
            evaluate(&node, &ctx).unwrap(),
            "users.name:andrew:Collection([Integer(1), Integer(2)])"
        );
        assert_eq!(ctx.get("name"), &Value::from("caller"));
    }

    #[test]
    fn failures_abort_evaluation() {
        let node = Node::sequence([
            Node::content("SELECT "),
            Node::filter(FilterKind::Str, "name"),
            Node::Partial {
                kind: PartialKind::Include,
                path: "missing".into(),
                params: vec![],
            },
        ]);
        assert!(matches!(
            eval(&node, Data::from([("name", "bob")])),
            Err(Error::PartialNotFound(path)) if path == "missing"
        ));
    }

    #[test]
    fn evaluation_is_pure() {
        let calls = Cell::new(0);
        let resolver = |_: &str, child: &Context<'_>| -> Result<String> {
            calls.set(calls.get() + 1);
            Ok(child.get("id").to_string())
        };
        let node = Node::sequence([
            Node::variable("id"),
            Node::Partial {
                kind: PartialKind::Include,
                path: "id".into(),
                params: vec![],
            },
        ]);
        let ctx = Context::new(Data::from([("id", 9)]), &resolver);
        let first = evaluate(&node, &ctx).unwrap();
        let second = evaluate(&node, &ctx).unwrap();
        assert_eq!(first, "99");
        assert_eq!(first, second);
        assert_eq!(calls.get(), 2);
    }
}
