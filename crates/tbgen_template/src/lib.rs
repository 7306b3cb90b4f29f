//! A small template engine for generated testbench sources.
//!
//! Templates use a Jinja-compatible subset:
//!
//! - `{{ expr }}` output, with dotted/indexed access, literals, arithmetic
//!   (`+ - *`), string concatenation (`~`), comparisons, `and`/`or`/`not`,
//!   `in`, `is defined`, and filters (`{{ names | join(", ") }}`)
//! - `{% if %}` / `{% elif %}` / `{% else %}` / `{% endif %}`
//! - `{% for x in xs %}` / `{% for k, v in map %}` with `loop.index`,
//!   `loop.index0`, `loop.first`, `loop.last`, `loop.length`, and an optional
//!   `{% else %}` branch for empty sequences
//! - `{% set name = expr %}`
//! - `{# comments #}`
//! - `-` on either side of a delimiter strips adjacent whitespace
//!
//! Context values are [`serde_json::Value`]s. Printing an undefined value is a
//! render error; testing one in `{% if %}` is simply false.

#![warn(missing_docs)]

mod ast;
pub mod error;
mod filters;
mod lexer;
mod parser;
mod render;
mod value;

pub use error::TemplateError;

use serde_json::Value;

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<ast::Node>,
}

impl Template {
    /// Parses template source text.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let segments = lexer::segment(source)?;
        let nodes = parser::parse(segments)?;
        Ok(Self { nodes })
    }

    /// Renders the template against `context`, which should be a JSON object.
    pub fn render(&self, context: &Value) -> Result<String, TemplateError> {
        render::render(&self.nodes, context)
    }
}

/// Parses and renders `source` in one step.
pub fn render_str(source: &str, context: &Value) -> Result<String, TemplateError> {
    Template::parse(source)?.render(context)
}
