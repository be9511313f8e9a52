use serde::Serialize;
use serde_json::Value;

use super::parse::{Node, Pipe, Scope};
use super::{ExecError, ExecErrorKind};

pub(super) fn render<T: Serialize + ?Sized>(
    name: &str,
    nodes: &[Node],
    data: &T,
) -> Result<String, ExecError> {
    let wrap = |kind| ExecError {
        name: name.to_string(),
        kind,
    };
    let root = serde_json::to_value(data).map_err(|e| wrap(ExecErrorKind::Data(e.to_string())))?;

    let mut out = String::new();
    walk(nodes, &root, &root, &mut out).map_err(wrap)?;
    Ok(out)
}

fn walk(nodes: &[Node], dot: &Value, root: &Value, out: &mut String) -> Result<(), ExecErrorKind> {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Print(pipe) => print(pipe, resolve(pipe, dot, root)?, out)?,
            Node::Range {
                pipe,
                body,
                else_body,
            } => match resolve(pipe, dot, root)? {
                Value::Array(items) if !items.is_empty() => {
                    for item in items {
                        walk(body, item, root, out)?;
                    }
                }
                Value::Array(_) | Value::Null => walk(else_body, dot, root, out)?,
                _ => return Err(ExecErrorKind::RangeOverNonList(pipe.display())),
            },
        }
    }
    Ok(())
}

fn resolve<'v>(pipe: &Pipe, dot: &'v Value, root: &'v Value) -> Result<&'v Value, ExecErrorKind> {
    let mut cur = match pipe.scope {
        Scope::Dot => dot,
        Scope::Root => root,
    };
    for field in &pipe.fields {
        cur = match cur {
            Value::Object(map) => map
                .get(field)
                .ok_or_else(|| ExecErrorKind::MissingField(pipe.display()))?,
            _ => return Err(ExecErrorKind::NotAnObject(pipe.display())),
        };
    }
    Ok(cur)
}

fn print(pipe: &Pipe, v: &Value, out: &mut String) -> Result<(), ExecErrorKind> {
    match v {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Array(_) | Value::Object(_) => {
            return Err(ExecErrorKind::PrintComposite(pipe.display()));
        }
    }
    Ok(())
}
