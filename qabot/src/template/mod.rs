//! Prompt template engine.
//!
//! A subset of Go `text/template` syntax, enough for prompt files:
//!
//! - `{{.Field}}`, `{{.A.B}}`, `{{.}}` on the current element
//! - `{{$}}`, `{{$.Field}}` on the root record, also inside `range`
//! - `{{range PIPE}} … {{else}} … {{end}}` (nestable)
//! - `{{- ` / ` -}}` trim markers and `{{/* comments */}}`
//!
//! Data is any `Serialize` value; field names are the serialized keys.
//! Templates are parsed once and can be rendered any number of times,
//! concurrently. Rendering is pure.
//!
//! ```
//! use qabot::template::PromptTemplate;
//! use serde_json::json;
//!
//! let t = PromptTemplate::parse("greet", "{{range .Names}}hi {{.}}{{else}}nobody{{end}}").unwrap();
//! assert_eq!(t.render(&json!({"Names": ["a", "b"]})).unwrap(), "hi ahi b");
//! assert_eq!(t.render(&json!({"Names": []})).unwrap(), "nobody");
//! ```

mod exec;
mod lex;
mod parse;

use serde::Serialize;
use thiserror::Error;

use parse::Node;

/// A parsed, reusable template.
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    name: String,
    nodes: Vec<Node>,
}

impl PromptTemplate {
    /// Parses `source`. `name` only appears in error messages.
    ///
    /// # Errors
    /// [`ParseError`] on malformed syntax, with the 1-based line of the
    /// offending action.
    pub fn parse(name: &str, source: &str) -> Result<Self, ParseError> {
        let items = lex::lex(name, source)?;
        let nodes = parse::parse(name, items)?;
        Ok(Self {
            name: name.to_string(),
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the template against `data`.
    ///
    /// # Errors
    /// [`ExecError`] when a field is missing, a non-list is ranged over,
    /// a list/object is printed, or `data` does not serialize.
    pub fn render<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, ExecError> {
        exec::render(&self.name, &self.nodes, data)
    }

    /// True if any action reads a field called `field` (at any depth).
    pub fn references_field(&self, field: &str) -> bool {
        parse::references_field(&self.nodes, field)
    }
}

/// Parses and renders in one step.
pub fn render<T: Serialize + ?Sized>(source: &str, data: &T) -> Result<String, TemplateError> {
    Ok(PromptTemplate::parse("template", source)?.render(data)?)
}

/// Either failure mode of the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Malformed template source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("template: {name}:{line}: {kind}")]
pub struct ParseError {
    pub name: String,
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unclosed action")]
    UnclosedAction,
    #[error("unclosed comment")]
    UnclosedComment,
    #[error("missing value for command")]
    EmptyAction,
    #[error("missing value for range")]
    EmptyRange,
    #[error("function {0:?} not defined")]
    UnknownIdentifier(String),
    #[error("unexpected {0:?} in command")]
    UnexpectedToken(String),
    #[error("unexpected {{{{{0}}}}}")]
    Unexpected(&'static str),
    #[error("unexpected EOF: missing {{{{end}}}}")]
    MissingEnd,
    #[error("bad field path {0:?}")]
    BadField(String),
}

/// Failure while rendering a well-formed template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("template: {name}: executing: {kind}")]
pub struct ExecError {
    pub name: String,
    pub kind: ExecErrorKind,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecErrorKind {
    #[error("can't evaluate field {0}: no such field")]
    MissingField(String),
    #[error("can't evaluate field {0} in a non-object value")]
    NotAnObject(String),
    #[error("range can't iterate over {0}")]
    RangeOverNonList(String),
    #[error("can't print {0}: value is a list or object")]
    PrintComposite(String),
    #[error("data is not a serializable record: {0}")]
    Data(String),
}
