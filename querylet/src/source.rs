//! Where template text comes from.
//!
//! Templates are addressed by dot path: `users/email.sql` under a template
//! root is `users.email`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Extension of template files unless configured otherwise
pub const DEFAULT_EXTENSION: &str = "sql";

/// Looks up the source text of a template by dot path
pub trait Source {
    fn source(&self, dot_path: &str) -> Result<Cow<'_, str>>;
}

/// Templates stored in a directory tree
#[derive(Debug, Clone)]
pub struct Directory {
    root: PathBuf,
    index: HashMap<String, PathBuf>,
}

static SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("valid segment pattern"));

/// The dot path of `path` relative to `root`, without its extension. Every
/// path segment must be a valid dot path segment, so no two files share a
/// dot path.
fn dot_path(root: &Path, path: &Path) -> Result<String> {
    let invalid = || Error::InvalidTemplatePath(path.to_path_buf());
    let relative = path
        .strip_prefix(root)
        .map_err(|_| invalid())?
        .with_extension("");
    let segments = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .filter(|segment| SEGMENT.is_match(segment))
                .ok_or_else(invalid)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(segments.join("."))
}

impl Directory {
    /// Indexes every `.sql` file below `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_extension(root, DEFAULT_EXTENSION)
    }

    /// Indexes every file below `root` with the given extension. Fails when
    /// a file name cannot be part of a dot path, such as `users.v2.sql`.
    pub fn with_extension(root: impl Into<PathBuf>, extension: &str) -> Result<Self> {
        let root = root.into();
        let mut index = HashMap::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != extension) {
                continue;
            }
            index.insert(dot_path(&root, path)?, path.to_path_buf());
        }
        debug!(root = %root.display(), templates = index.len(), "indexed template directory");
        Ok(Self { root, index })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Dot paths of every indexed template, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Source for Directory {
    fn source(&self, dot_path: &str) -> Result<Cow<'_, str>> {
        let path = self
            .index
            .get(dot_path)
            .ok_or_else(|| Error::PartialNotFound(dot_path.to_string()))?;
        debug!(partial = dot_path, path = %path.display(), "reading template");
        fs::read_to_string(path)
            .map(Cow::Owned)
            .map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })
    }
}

/// Templates compiled into the binary, see [`crate::directory!`]
#[derive(Debug, Clone, Copy)]
pub struct Embedded {
    templates: &'static [(&'static str, &'static str)],
}

impl Embedded {
    pub const fn new(templates: &'static [(&'static str, &'static str)]) -> Self {
        Self { templates }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.templates.iter().map(|(name, _)| *name)
    }
}

impl Source for Embedded {
    fn source(&self, dot_path: &str) -> Result<Cow<'_, str>> {
        self.templates
            .iter()
            .find(|(name, _)| *name == dot_path)
            .map(|(_, text)| Cow::Borrowed(*text))
            .ok_or_else(|| Error::PartialNotFound(dot_path.to_string()))
    }
}

impl Source for HashMap<String, String> {
    fn source(&self, dot_path: &str) -> Result<Cow<'_, str>> {
        self.get(dot_path)
            .map(|text| Cow::Borrowed(text.as_str()))
            .ok_or_else(|| Error::PartialNotFound(dot_path.to_string()))
    }
}
