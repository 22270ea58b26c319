//! Compiling templates and resolving partials against a template [`Source`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::Node;
use crate::builder;
use crate::context::{Context, DEFAULT_MAX_DEPTH};
use crate::error::Result;
use crate::eval::evaluate;
use crate::resolver::PartialResolver;
use crate::source::{Directory, Source};
use crate::value::Data;

/// Compile time and evaluation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// How deep partials may include each other before evaluation fails
    pub max_depth: usize,
    /// Keep the compiled AST of every partial after its first use
    pub cache: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            cache: true,
        }
    }
}

/// Compiles templates and serves as the partial resolver while they are
/// evaluated.
///
/// ```no_run
/// use querylet::{Data, Querylet};
///
/// let querylet = Querylet::directory("queries")?;
/// let sql = querylet
///     .compile("({{> include 'users.email' }}) as email")?
///     .call(Data::from([("id", 100)]))?;
/// # Ok::<(), querylet::Error>(())
/// ```
pub struct Querylet<S> {
    source: S,
    options: Options,
    cache: RefCell<HashMap<String, Rc<Node>>>,
}

impl Querylet<Directory> {
    /// Serves partials from the `.sql` files below `root`
    pub fn directory(root: impl Into<std::path::PathBuf>) -> Result<Self> {
        Ok(Self::new(Directory::open(root)?))
    }
}

impl<S: Source> Querylet<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, Options::default())
    }

    pub fn with_options(source: S, options: Options) -> Self {
        Self {
            source,
            options,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Parses and builds `template`
    pub fn compile(&self, template: &str) -> Result<Template<'_, S>> {
        let root = builder::compile(template)?;
        debug!(bytes = template.len(), "compiled template");
        Ok(Template {
            querylet: self,
            root,
        })
    }

    /// Evaluates the stored template at `dot_path` against `data`
    pub fn render(&self, dot_path: &str, data: Data) -> Result<String> {
        let root = self.load(dot_path)?;
        evaluate(&root, &self.context(data))
    }

    /// Drops every cached partial
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    fn context(&self, data: Data) -> Context<'_> {
        Context::new(data, self).with_max_depth(self.options.max_depth)
    }

    /// Compiles the template at `dot_path`, reusing the cached AST if any
    fn load(&self, dot_path: &str) -> Result<Rc<Node>> {
        if let Some(root) = self.cache.borrow().get(dot_path) {
            trace!(partial = dot_path, "template cache hit");
            return Ok(Rc::clone(root));
        }
        let root = Rc::new(builder::compile(&self.source.source(dot_path)?)?);
        if self.options.cache {
            self.cache
                .borrow_mut()
                .insert(dot_path.to_string(), Rc::clone(&root));
        }
        Ok(root)
    }
}

impl<S: Source> PartialResolver for Querylet<S> {
    fn resolve(&self, dot_path: &str, context: &Context<'_>) -> Result<String> {
        let root = self.load(dot_path)?;
        evaluate(&root, context)
    }
}

/// A compiled template, ready to be called with data
pub struct Template<'q, S> {
    querylet: &'q Querylet<S>,
    root: Node,
}

impl<S: Source> Template<'_, S> {
    /// Evaluates the template in a fresh root context
    pub fn call(&self, data: Data) -> Result<String> {
        evaluate(&self.root, &self.querylet.context(data))
    }

    pub fn ast(&self) -> &Node {
        &self.root
    }
}
