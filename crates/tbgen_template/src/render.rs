//! Tree-walking renderer.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::ast::{BinOp, Expr, Node};
use crate::error::TemplateError;
use crate::filters;
use crate::value::{compare, display, is_truthy, loose_eq, type_name};

pub(crate) fn render(nodes: &[Node], context: &Value) -> Result<String, TemplateError> {
    let mut renderer = Renderer {
        root: context,
        scopes: vec![Map::new()],
    };
    let mut out = String::new();
    renderer.render_nodes(nodes, &mut out)?;
    Ok(out)
}

struct Renderer<'a> {
    root: &'a Value,
    scopes: Vec<Map<String, Value>>,
}

impl Renderer<'_> {
    fn render_nodes(&mut self, nodes: &[Node], out: &mut String) -> Result<(), TemplateError> {
        for node in nodes {
            self.render_node(node, out)?;
        }
        Ok(())
    }

    fn render_node(&mut self, node: &Node, out: &mut String) -> Result<(), TemplateError> {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Output { expr, line } => match self.eval(expr, *line)? {
                Some(value) => out.push_str(&display(&value)),
                None => {
                    return Err(TemplateError::render(
                        *line,
                        format!("undefined value `{}`", expr.describe()),
                    ))
                }
            },
            Node::If {
                branches,
                otherwise,
                line,
            } => {
                for (cond, body) in branches {
                    if self.eval_truthy(cond, *line)? {
                        return self.render_nodes(body, out);
                    }
                }
                self.render_nodes(otherwise, out)?;
            }
            Node::For {
                targets,
                iter,
                body,
                otherwise,
                line,
            } => self.render_for(targets, iter, body, otherwise, *line, out)?,
            Node::Set { name, expr, line } => {
                let value = self.eval(expr, *line)?.ok_or_else(|| {
                    TemplateError::render(
                        *line,
                        format!("cannot set `{name}` to undefined value `{}`", expr.describe()),
                    )
                })?;
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.clone(), value);
                }
            }
        }
        Ok(())
    }

    fn render_for(
        &mut self,
        targets: &[String],
        iter: &Expr,
        body: &[Node],
        otherwise: &[Node],
        line: usize,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        let iterable = self.eval(iter, line)?.ok_or_else(|| {
            TemplateError::render(
                line,
                format!("cannot iterate undefined value `{}`", iter.describe()),
            )
        })?;

        let items: Vec<Value> = match iterable {
            Value::Array(items) => items,
            Value::Object(map) if targets.len() == 2 => map
                .into_iter()
                .map(|(k, v)| Value::Array(vec![Value::String(k), v]))
                .collect(),
            Value::Object(map) => map.into_iter().map(|(k, _)| Value::String(k)).collect(),
            Value::Null => Vec::new(),
            other => {
                return Err(TemplateError::render(
                    line,
                    format!(
                        "cannot iterate over {} `{}`",
                        type_name(&other),
                        iter.describe()
                    ),
                ))
            }
        };

        if items.is_empty() {
            return self.render_nodes(otherwise, out);
        }

        let length = items.len();
        for (index, item) in items.into_iter().enumerate() {
            let mut scope = Map::new();
            bind_targets(&mut scope, targets, item, line)?;
            scope.insert("loop".into(), filters::loop_object(index, length));
            self.scopes.push(scope);
            let result = self.render_nodes(body, out);
            self.scopes.pop();
            result?;
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.root.get(name))
            .cloned()
    }

    fn eval_truthy(&self, expr: &Expr, line: usize) -> Result<bool, TemplateError> {
        Ok(self.eval(expr, line)?.as_ref().is_some_and(is_truthy))
    }

    fn eval_defined(&self, expr: &Expr, line: usize) -> Result<Value, TemplateError> {
        self.eval(expr, line)?.ok_or_else(|| {
            TemplateError::render(line, format!("undefined value `{}`", expr.describe()))
        })
    }

    /// Evaluates an expression. `Ok(None)` means undefined.
    fn eval(&self, expr: &Expr, line: usize) -> Result<Option<Value>, TemplateError> {
        match expr {
            Expr::Var(name) => Ok(self.lookup(name)),
            Expr::Literal(value) => Ok(Some(value.clone())),
            Expr::List(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval_defined(item, line))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(Value::Array(values)))
            }
            Expr::Attr(base, attr) => Ok(self.eval(base, line)?.and_then(|value| match &value {
                Value::Object(map) => map.get(attr).cloned(),
                Value::Array(items) => attr
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i).cloned()),
                _ => None,
            })),
            Expr::Index(base, index) => {
                let Some(base) = self.eval(base, line)? else {
                    return Ok(None);
                };
                let index = self.eval_defined(index, line)?;
                Ok(match (&base, &index) {
                    (Value::Array(items), Value::Number(n)) => n.as_i64().and_then(|i| {
                        let len = items.len() as i64;
                        let i = if i < 0 { len + i } else { i };
                        usize::try_from(i).ok().and_then(|i| items.get(i).cloned())
                    }),
                    (Value::Object(map), Value::String(key)) => map.get(key).cloned(),
                    _ => None,
                })
            }
            Expr::Filter { expr, name, args } => {
                let input = self.eval(expr, line)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval_defined(arg, line))
                    .collect::<Result<Vec<_>, _>>()?;
                filters::apply(name, input, &args, line).map(Some)
            }
            Expr::Not(inner) => Ok(Some(Value::Bool(!self.eval_truthy(inner, line)?))),
            Expr::Neg(inner) => {
                let value = self.eval_defined(inner, line)?;
                arithmetic(BinOp::Sub, &Value::from(0), &value, line).map(Some)
            }
            Expr::Test {
                expr,
                name,
                negated,
            } => {
                let value = self.eval(expr, line)?;
                let result = match name.as_str() {
                    "defined" => value.is_some(),
                    "undefined" => value.is_none(),
                    "none" => matches!(value, Some(Value::Null)),
                    "string" => matches!(value, Some(Value::String(_))),
                    "number" => matches!(value, Some(Value::Number(_))),
                    "mapping" => matches!(value, Some(Value::Object(_))),
                    "sequence" => matches!(value, Some(Value::Array(_))),
                    other => {
                        return Err(TemplateError::render(line, format!("unknown test `{other}`")))
                    }
                };
                Ok(Some(Value::Bool(result != *negated)))
            }
            Expr::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs, line).map(Some),
        }
    }

    fn eval_binary(
        &self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        line: usize,
    ) -> Result<Value, TemplateError> {
        match op {
            BinOp::And => {
                let result = self.eval_truthy(lhs, line)? && self.eval_truthy(rhs, line)?;
                return Ok(Value::Bool(result));
            }
            BinOp::Or => {
                let result = self.eval_truthy(lhs, line)? || self.eval_truthy(rhs, line)?;
                return Ok(Value::Bool(result));
            }
            _ => {}
        }

        let a = self.eval_defined(lhs, line)?;
        let b = self.eval_defined(rhs, line)?;
        let ordered = |want: fn(Ordering) -> bool| -> Result<Value, TemplateError> {
            compare(&a, &b).map(|ord| Value::Bool(want(ord))).ok_or_else(|| {
                TemplateError::render(
                    line,
                    format!("cannot compare {} with {}", type_name(&a), type_name(&b)),
                )
            })
        };

        match op {
            BinOp::Eq => Ok(Value::Bool(loose_eq(&a, &b))),
            BinOp::Ne => Ok(Value::Bool(!loose_eq(&a, &b))),
            BinOp::Lt => ordered(Ordering::is_lt),
            BinOp::Le => ordered(Ordering::is_le),
            BinOp::Gt => ordered(Ordering::is_gt),
            BinOp::Ge => ordered(Ordering::is_ge),
            BinOp::In => contains(&b, &a, line).map(Value::Bool),
            BinOp::NotIn => contains(&b, &a, line).map(|found| Value::Bool(!found)),
            BinOp::Concat => Ok(Value::String(display(&a) + &display(&b))),
            BinOp::Add | BinOp::Sub | BinOp::Mul => arithmetic(op, &a, &b, line),
            BinOp::And | BinOp::Or => Ok(Value::Bool(false)),
        }
    }
}

fn bind_targets(
    scope: &mut Map<String, Value>,
    targets: &[String],
    item: Value,
    line: usize,
) -> Result<(), TemplateError> {
    match targets {
        [single] => {
            scope.insert(single.clone(), item);
        }
        [first, second] => match item {
            Value::Array(pair) if pair.len() == 2 => {
                let mut pair = pair.into_iter();
                scope.insert(first.clone(), pair.next().unwrap_or_default());
                scope.insert(second.clone(), pair.next().unwrap_or_default());
            }
            other => {
                return Err(TemplateError::render(
                    line,
                    format!("cannot unpack {} into two loop variables", type_name(&other)),
                ))
            }
        },
        _ => return Err(TemplateError::render(line, "invalid loop targets")),
    }
    Ok(())
}

fn contains(haystack: &Value, needle: &Value, line: usize) -> Result<bool, TemplateError> {
    match (haystack, needle) {
        (Value::Array(items), _) => Ok(items.iter().any(|item| loose_eq(item, needle))),
        (Value::Object(map), Value::String(key)) => Ok(map.contains_key(key)),
        (Value::String(text), Value::String(part)) => Ok(text.contains(part.as_str())),
        _ => Err(TemplateError::render(
            line,
            format!(
                "cannot test membership of {} in {}",
                type_name(needle),
                type_name(haystack)
            ),
        )),
    }
}

fn arithmetic(op: BinOp, a: &Value, b: &Value, line: usize) -> Result<Value, TemplateError> {
    if let (Value::String(x), Value::String(y), BinOp::Add) = (a, b, op) {
        return Ok(Value::String(format!("{x}{y}")));
    }
    let (Value::Number(x), Value::Number(y)) = (a, b) else {
        return Err(TemplateError::render(
            line,
            format!(
                "unsupported operand types {} and {}",
                type_name(a),
                type_name(b)
            ),
        ));
    };

    if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
        let result = match op {
            BinOp::Add => x.checked_add(y),
            BinOp::Sub => x.checked_sub(y),
            _ => x.checked_mul(y),
        };
        return result
            .map(Value::from)
            .ok_or_else(|| TemplateError::render(line, "integer overflow"));
    }

    let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
    let result = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        _ => x * y,
    };
    Ok(Value::from(result))
}
