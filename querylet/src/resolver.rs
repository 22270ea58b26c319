//! The contract between the evaluator and whatever stores partials.

use crate::context::Context;
use crate::error::Result;

/// Locates, parses and evaluates partials.
///
/// `context` is the child context already holding the caller's bindings and
/// the partial's parameters; implementations evaluate the partial against it
/// and hand back the resulting text. Failures are returned unchanged.
pub trait PartialResolver {
    fn resolve(&self, dot_path: &str, context: &Context<'_>) -> Result<String>;
}

impl<F> PartialResolver for F
where
    F: Fn(&str, &Context<'_>) -> Result<String>,
{
    fn resolve(&self, dot_path: &str, context: &Context<'_>) -> Result<String> {
        self(dot_path, context)
    }
}
