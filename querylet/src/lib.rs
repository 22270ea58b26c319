//! Compose large, JSON-shaped SQL queries from Mustache-like templates.
//!
//! A template mixes literal SQL with tags:
//!
//! - `{{name}}` inserts a bound value as is
//! - `{{int id}}`, `{{float x}}`, `{{str name}}`, `{{arr ids}}`, `{{wild q}}`
//!   check the type of a bound value and encode it as a SQL literal
//! - `{{#if flag}}...{{else}}...{{/if}}` and `{{#unless flag}}...{{/unless}}`
//! - `{{> array 'users.list' id=user_id}}`, `{{> object ...}}` and
//!   `{{> include ...}}` evaluate another template, wrapping its rows in a JSON
//!   array, a JSON object, or nothing
//! - `{{#array}}...{{/array}}`, `{{#object}}...{{/object}}` and
//!   `{{#plain}}...{{/plain}}` wrap inline SQL the same way
//!
//! ```
//! use std::collections::HashMap;
//! use querylet::{Data, Querylet};
//!
//! let mut templates = HashMap::new();
//! templates.insert(
//!     "users.email".to_string(),
//!     "SELECT users.email FROM users WHERE users.id = {{int id}}".to_string(),
//! );
//! let querylet = Querylet::new(templates);
//! let sql = querylet
//!     .compile("({{> include 'users.email' }}) as email")?
//!     .call(Data::from([("id", 100)]))?;
//! assert_eq!(sql, "(SELECT users.email FROM users WHERE users.id = 100) as email");
//! # Ok::<(), querylet::Error>(())
//! ```

pub mod ast;
pub mod builder;
mod context;
mod error;
mod eval;
mod filter;
pub mod parser;
mod querylet;
mod resolver;
mod source;
mod value;
pub mod wrap;

pub use context::{Context, DEFAULT_MAX_DEPTH};
pub use error::{Error, Result};
pub use eval::evaluate;
pub use parser::ParseError;
pub use querylet::{Options, Querylet, Template};
pub use resolver::PartialResolver;
pub use source::{DEFAULT_EXTENSION, Directory, Embedded, Source};
pub use value::{Data, Value};

pub use querylet_macros::querylet_directory as directory;
