//! Variable scoping and partial dispatch.

use tracing::debug;

use crate::error::{Error, Result};
use crate::resolver::PartialResolver;
use crate::value::{Data, Value};

/// Partials may nest this deep unless configured otherwise
pub const DEFAULT_MAX_DEPTH: usize = 64;

static ABSENT: Value = Value::Absent;

/// The bindings a template is evaluated against.
///
/// `locals` overlays `data`. It is only filled while a partial's child
/// context is being assembled, never during evaluation.
pub struct Context<'r> {
    data: Data,
    locals: Data,
    resolver: &'r dyn PartialResolver,
    depth: usize,
    max_depth: usize,
}

impl<'r> Context<'r> {
    /// Creates a root context
    pub fn new(data: Data, resolver: &'r dyn PartialResolver) -> Self {
        Self {
            data,
            locals: Data::new(),
            resolver,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Looks `name` up in the locals, then in the data. Missing names are
    /// [`Value::Absent`], never an error.
    pub fn get(&self, name: &str) -> &Value {
        self.locals
            .get(name)
            .or_else(|| self.data.get(name))
            .unwrap_or(&ABSENT)
    }

    pub fn add_item(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.locals.insert(name, value);
    }

    pub fn add_items(&mut self, items: impl IntoIterator<Item = (String, Value)>) {
        self.locals.extend(items);
    }

    /// How many partials deep this context is, the root being 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Every binding visible from this context, locals winning
    pub fn bindings(&self) -> Data {
        let mut merged = self.data.clone();
        merged.extend(self.locals.clone());
        merged
    }

    /// Evaluates the partial at `dot_path` in a child context holding this
    /// context's bindings overlaid with `extra`.
    pub fn get_partial(&self, dot_path: &str, extra: Data) -> Result<String> {
        if self.depth >= self.max_depth {
            return Err(Error::RecursionLimitExceeded {
                path: dot_path.to_string(),
                limit: self.max_depth,
            });
        }
        let mut child = Context {
            data: self.bindings(),
            locals: Data::new(),
            resolver: self.resolver,
            depth: self.depth + 1,
            max_depth: self.max_depth,
        };
        child.add_items(extra);
        debug!(partial = dot_path, depth = child.depth, "resolving partial");
        self.resolver.resolve(dot_path, &child)
    }
}
