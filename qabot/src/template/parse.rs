use super::lex::Item;
use super::{ParseError, ParseErrorKind};

/// Where a field path starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Scope {
    /// `.`: the current element.
    Dot,
    /// `$`: the root record.
    Root,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Pipe {
    pub scope: Scope,
    pub fields: Vec<String>,
}

impl Pipe {
    /// Source spelling, used in error messages.
    pub fn display(&self) -> String {
        let head = match self.scope {
            Scope::Dot => "",
            Scope::Root => "$",
        };
        if self.fields.is_empty() {
            return if head.is_empty() { ".".into() } else { head.into() };
        }
        format!("{head}.{}", self.fields.join("."))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Node {
    Text(String),
    Print(Pipe),
    Range {
        pipe: Pipe,
        body: Vec<Node>,
        else_body: Vec<Node>,
    },
}

enum Stop {
    Eof,
    End(usize),
    Else(usize),
}

struct Parser<'n> {
    name: &'n str,
    items: std::vec::IntoIter<Item>,
}

pub(super) fn parse(name: &str, items: Vec<Item>) -> Result<Vec<Node>, ParseError> {
    let mut p = Parser {
        name,
        items: items.into_iter(),
    };
    let (nodes, stop) = p.list()?;
    match stop {
        Stop::Eof => Ok(nodes),
        Stop::End(line) => Err(p.err(line, ParseErrorKind::Unexpected("end"))),
        Stop::Else(line) => Err(p.err(line, ParseErrorKind::Unexpected("else"))),
    }
}

impl Parser<'_> {
    fn err(&self, line: usize, kind: ParseErrorKind) -> ParseError {
        ParseError {
            name: self.name.to_string(),
            line,
            kind,
        }
    }

    fn list(&mut self) -> Result<(Vec<Node>, Stop), ParseError> {
        let mut nodes = Vec::new();
        while let Some(item) = self.items.next() {
            let (line, body) = match item {
                Item::Text(t) => {
                    nodes.push(Node::Text(t));
                    continue;
                }
                Item::Action { line, body } => (line, body),
            };

            let mut words = body.split_ascii_whitespace();
            match words.next() {
                None => return Err(self.err(line, ParseErrorKind::EmptyAction)),
                Some("end") => {
                    self.no_more(line, words)?;
                    return Ok((nodes, Stop::End(line)));
                }
                Some("else") => {
                    self.no_more(line, words)?;
                    return Ok((nodes, Stop::Else(line)));
                }
                Some("range") => {
                    let pipe = match words.next() {
                        Some(w) => self.pipe(line, w)?,
                        None => return Err(self.err(line, ParseErrorKind::EmptyRange)),
                    };
                    self.no_more(line, words)?;
                    nodes.push(self.range(line, pipe)?);
                }
                Some(word) => {
                    let pipe = self.pipe(line, word)?;
                    self.no_more(line, words)?;
                    nodes.push(Node::Print(pipe));
                }
            }
        }
        Ok((nodes, Stop::Eof))
    }

    fn range(&mut self, line: usize, pipe: Pipe) -> Result<Node, ParseError> {
        let (body, stop) = self.list()?;
        let else_body = match stop {
            Stop::End(_) => Vec::new(),
            Stop::Eof => return Err(self.err(line, ParseErrorKind::MissingEnd)),
            Stop::Else(_) => match self.list()? {
                (nodes, Stop::End(_)) => nodes,
                (_, Stop::Else(l)) => return Err(self.err(l, ParseErrorKind::Unexpected("else"))),
                (_, Stop::Eof) => return Err(self.err(line, ParseErrorKind::MissingEnd)),
            },
        };
        Ok(Node::Range {
            pipe,
            body,
            else_body,
        })
    }

    fn no_more<'w>(
        &self,
        line: usize,
        mut words: impl Iterator<Item = &'w str>,
    ) -> Result<(), ParseError> {
        match words.next() {
            Some(w) => Err(self.err(line, ParseErrorKind::UnexpectedToken(w.to_string()))),
            None => Ok(()),
        }
    }

    fn pipe(&self, line: usize, word: &str) -> Result<Pipe, ParseError> {
        let (scope, path) = match word {
            "." => return Ok(Pipe { scope: Scope::Dot, fields: vec![] }),
            "$" => return Ok(Pipe { scope: Scope::Root, fields: vec![] }),
            w if w.starts_with("$.") => (Scope::Root, &w[2..]),
            w if w.starts_with('.') => (Scope::Dot, &w[1..]),
            w => return Err(self.err(line, ParseErrorKind::UnknownIdentifier(w.to_string()))),
        };

        let fields: Vec<String> = path.split('.').map(str::to_string).collect();
        if fields.iter().any(|f| !is_identifier(f)) {
            return Err(self.err(line, ParseErrorKind::BadField(word.to_string())));
        }
        Ok(Pipe { scope, fields })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

pub(super) fn references_field(nodes: &[Node], field: &str) -> bool {
    nodes.iter().any(|n| match n {
        Node::Text(_) => false,
        Node::Print(p) => p.fields.iter().any(|f| f == field),
        Node::Range {
            pipe,
            body,
            else_body,
        } => {
            pipe.fields.iter().any(|f| f == field)
                || references_field(body, field)
                || references_field(else_body, field)
        }
    })
}
