//! Built-in filters.

use serde_json::{Map, Value};

use crate::error::TemplateError;
use crate::value::{display, type_name};

/// Applies filter `name` to `input`. `input` is `None` when undefined.
pub(crate) fn apply(
    name: &str,
    input: Option<Value>,
    args: &[Value],
    line: usize,
) -> Result<Value, TemplateError> {
    let fail = |message: String| TemplateError::render(line, message);

    if matches!(name, "default" | "d") {
        return Ok(match input {
            None | Some(Value::Null) => args.first().cloned().unwrap_or_default(),
            Some(value) => value,
        });
    }

    let Some(input) = input else {
        return Err(fail(format!("filter `{name}` applied to an undefined value")));
    };

    let string_arg = |idx: usize, default: &str| -> Result<String, TemplateError> {
        match args.get(idx) {
            None => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(fail(format!(
                "filter `{name}` expects a string argument, got {}",
                type_name(other)
            ))),
        }
    };

    match name {
        "join" => {
            let sep = string_arg(0, "")?;
            match &input {
                Value::Array(items) => Ok(Value::String(
                    items.iter().map(display).collect::<Vec<_>>().join(&sep),
                )),
                other => Err(expects(name, "a list", other, line)),
            }
        }
        "upper" => Ok(Value::String(display(&input).to_uppercase())),
        "lower" => Ok(Value::String(display(&input).to_lowercase())),
        "trim" => Ok(Value::String(display(&input).trim().to_string())),
        "string" => Ok(Value::String(display(&input))),
        "length" | "count" => match &input {
            Value::String(s) => Ok(Value::from(s.chars().count())),
            Value::Array(items) => Ok(Value::from(items.len())),
            Value::Object(map) => Ok(Value::from(map.len())),
            other => Err(expects(name, "a string, list or mapping", other, line)),
        },
        "first" | "last" => {
            let picked = match &input {
                Value::Array(items) if name == "first" => items.first().cloned(),
                Value::Array(items) => items.last().cloned(),
                Value::String(s) if name == "first" => {
                    s.chars().next().map(|c| Value::String(c.to_string()))
                }
                Value::String(s) => s.chars().last().map(|c| Value::String(c.to_string())),
                other => return Err(expects(name, "a list or string", other, line)),
            };
            Ok(picked.unwrap_or(Value::Null))
        }
        "replace" => {
            let from = string_arg(0, "")?;
            let to = string_arg(1, "")?;
            if from.is_empty() {
                return Err(fail("filter `replace` needs a non-empty search string".into()));
            }
            Ok(Value::String(display(&input).replace(&from, &to)))
        }
        "int" => match &input {
            Value::Number(n) => Ok(n
                .as_i64()
                .map(Value::from)
                .or_else(|| n.as_f64().map(|f| Value::from(f as i64)))
                .unwrap_or(Value::from(0))),
            Value::String(s) => Ok(Value::from(s.trim().parse::<i64>().unwrap_or(0))),
            Value::Bool(b) => Ok(Value::from(i64::from(*b))),
            other => Err(expects(name, "a number or string", other, line)),
        },
        "items" | "dictsort" => match input {
            Value::Object(map) => {
                let mut pairs: Vec<(String, Value)> = map.into_iter().collect();
                if name == "dictsort" {
                    pairs.sort_by(|a, b| a.0.cmp(&b.0));
                }
                Ok(Value::Array(
                    pairs
                        .into_iter()
                        .map(|(k, v)| Value::Array(vec![Value::String(k), v]))
                        .collect(),
                ))
            }
            other => Err(expects(name, "a mapping", &other, line)),
        },
        "keys" => match &input {
            Value::Object(map) => Ok(Value::Array(
                map.keys().cloned().map(Value::String).collect(),
            )),
            other => Err(expects(name, "a mapping", other, line)),
        },
        "unique" => match input {
            Value::Array(items) => {
                let mut seen: Vec<Value> = Vec::new();
                for item in items {
                    if !seen.contains(&item) {
                        seen.push(item);
                    }
                }
                Ok(Value::Array(seen))
            }
            other => Err(expects(name, "a list", &other, line)),
        },
        "attr" => {
            let key = string_arg(0, "")?;
            Ok(match &input {
                Value::Object(map) => map.get(&key).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            })
        }
        "map" => {
            let key = string_arg(0, "")?;
            match input {
                Value::Array(items) => Ok(Value::Array(
                    items
                        .iter()
                        .map(|item| item.get(&key).cloned().unwrap_or(Value::Null))
                        .collect(),
                )),
                other => Err(expects(name, "a list", &other, line)),
            }
        }
        "tojson" => Ok(Value::String(input.to_string())),
        "indent" => {
            let width = args.first().and_then(Value::as_u64).unwrap_or(4) as usize;
            let pad = " ".repeat(width);
            let text = display(&input);
            let indented: Vec<String> = text
                .lines()
                .enumerate()
                .map(|(i, l)| {
                    if i == 0 || l.is_empty() {
                        l.to_string()
                    } else {
                        format!("{pad}{l}")
                    }
                })
                .collect();
            Ok(Value::String(indented.join("\n")))
        }
        _ => Err(fail(format!("unknown filter `{name}`"))),
    }
}

fn expects(filter: &str, wanted: &str, got: &Value, line: usize) -> TemplateError {
    TemplateError::render(
        line,
        format!(
            "filter `{filter}` expects {wanted}, got {}",
            type_name(got)
        ),
    )
}

/// Builds the `loop` object exposed inside `{% for %}` bodies.
pub(crate) fn loop_object(index0: usize, length: usize) -> Value {
    let mut map = Map::new();
    map.insert("index".into(), Value::from(index0 + 1));
    map.insert("index0".into(), Value::from(index0));
    map.insert("revindex".into(), Value::from(length - index0));
    map.insert("revindex0".into(), Value::from(length - index0 - 1));
    map.insert("first".into(), Value::Bool(index0 == 0));
    map.insert("last".into(), Value::Bool(index0 + 1 == length));
    map.insert("length".into(), Value::from(length));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(name: &str, input: Value, args: &[Value]) -> Value {
        apply(name, Some(input), args, 1).unwrap()
    }

    #[test]
    fn join_displays_items() {
        assert_eq!(run("join", json!(["a", 1, true]), &[json!(" ")]), json!("a 1 true"));
        assert_eq!(run("join", json!(["a", "b"]), &[]), json!("ab"));
    }

    #[test]
    fn default_covers_undefined_and_null() {
        assert_eq!(apply("default", None, &[json!(5)], 1).unwrap(), json!(5));
        assert_eq!(run("default", json!(null), &[json!("x")]), json!("x"));
        assert_eq!(run("default", json!(0), &[json!(5)]), json!(0));
    }

    #[test]
    fn undefined_input_is_error_for_other_filters() {
        let err = apply("upper", None, &[], 7).unwrap_err();
        assert_eq!(err.line(), 7);
    }

    #[test]
    fn length_and_ends() {
        assert_eq!(run("length", json!([1, 2, 3]), &[]), json!(3));
        assert_eq!(run("length", json!("abcd"), &[]), json!(4));
        assert_eq!(run("first", json!(["apb", "axi"]), &[]), json!("apb"));
        assert_eq!(run("last", json!(["apb", "axi"]), &[]), json!("axi"));
        assert_eq!(run("first", json!([]), &[]), json!(null));
    }

    #[test]
    fn replace_and_case() {
        assert_eq!(
            run("replace", json!("a.b.c"), &[json!("."), json!("/")]),
            json!("a/b/c")
        );
        assert_eq!(run("upper", json!("apb"), &[]), json!("APB"));
        assert_eq!(run("trim", json!("  x \n"), &[]), json!("x"));
    }

    #[test]
    fn dictsort_orders_pairs() {
        assert_eq!(
            run("dictsort", json!({"b": 2, "a": 1}), &[]),
            json!([["a", 1], ["b", 2]])
        );
    }

    #[test]
    fn unique_keeps_first_occurrence() {
        assert_eq!(
            run("unique", json!(["apb", "axi", "apb"]), &[]),
            json!(["apb", "axi"])
        );
    }

    #[test]
    fn unknown_filter_is_error() {
        let err = apply("frobnicate", Some(json!(1)), &[], 2).unwrap_err();
        assert!(err.to_string().contains("unknown filter `frobnicate`"));
    }

    #[test]
    fn loop_object_flags() {
        let l = loop_object(2, 3);
        assert_eq!(l["index"], json!(3));
        assert_eq!(l["last"], json!(true));
        assert_eq!(l["first"], json!(false));
        assert_eq!(l["revindex0"], json!(0));
    }
}
