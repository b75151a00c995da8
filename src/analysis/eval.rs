//! Side-effect free evaluation of simple expressions against a frame.
//!
//! Only names, literals, subscripts, unary and arithmetic operators and
//! `len()` are understood. Anything else evaluates to `None`, which callers
//! treat as "value unknown".

use crate::parser::parse_expression;
use crate::snapshot::{Frame, Value};
use rustpython_parser::ast::{Constant, Expr, Operator, UnaryOp};

/// Builtin names that are classes rather than functions.
const BUILTIN_TYPES: &[&str] = &[
    "bool", "bytearray", "bytes", "complex", "dict", "float", "frozenset", "int", "list",
    "object", "range", "set", "slice", "str", "tuple", "type",
];

pub fn eval_expr(source: &str, frame: &Frame) -> Option<Value> {
    let expr = parse_expression(source.trim()).ok()?;
    eval_node(&expr, frame)
}

/// Value bound to `name` in the frame, builtins included.
pub fn lookup_name(name: &str, frame: &Frame) -> Option<Value> {
    if let Some(value) = frame.lookup(name) {
        return Some(value.clone());
    }
    if !frame.is_builtin(name) {
        return None;
    }
    Some(if BUILTIN_TYPES.contains(&name) {
        Value::class(name, &[])
    } else {
        Value::Function { name: name.to_string(), builtin: true, doc: None }
    })
}

pub fn eval_node(expr: &Expr, frame: &Frame) -> Option<Value> {
    match expr {
        Expr::Name(name) => lookup_name(name.id.as_str(), frame),
        Expr::Constant(constant) => constant_value(&constant.value),
        Expr::List(list) => Some(Value::list(eval_all(&list.elts, frame)?)),
        Expr::Tuple(tuple) => Some(Value::tuple(eval_all(&tuple.elts, frame)?)),
        Expr::Set(set) => Some(Value::Set { items: eval_all(&set.elts, frame)? }),
        Expr::Dict(dict) => {
            let mut entries = Vec::with_capacity(dict.values.len());
            for (key, value) in dict.keys.iter().zip(&dict.values) {
                let key = eval_node(key.as_ref()?, frame)?;
                entries.push((key, eval_node(value, frame)?));
            }
            Some(Value::dict(entries))
        }
        Expr::Subscript(subscript) => {
            let container = eval_node(&subscript.value, frame)?;
            let index = eval_node(&subscript.slice, frame)?;
            subscript_value(&container, &index)
        }
        Expr::UnaryOp(unary) => {
            let operand = eval_node(&unary.operand, frame)?;
            match (unary.op, operand) {
                (UnaryOp::USub, Value::Int { value }) => value.checked_neg().map(Value::int),
                (UnaryOp::USub, Value::Float { value }) => Some(Value::float(-value)),
                (UnaryOp::UAdd, value @ (Value::Int { .. } | Value::Float { .. })) => Some(value),
                (UnaryOp::Not, value) => Some(Value::Bool { value: !value.is_truthy() }),
                _ => None,
            }
        }
        Expr::BinOp(binop) => {
            let left = eval_node(&binop.left, frame)?;
            let right = eval_node(&binop.right, frame)?;
            binary_value(binop.op, &left, &right)
        }
        Expr::Call(call) if call.args.len() == 1 && call.keywords.is_empty() => {
            let Expr::Name(func) = call.func.as_ref() else {
                return None;
            };
            if func.id.as_str() != "len" || frame.lookup("len").is_some() {
                return None;
            }
            let length = eval_node(&call.args[0], frame)?.len()?;
            i64::try_from(length).ok().map(Value::int)
        }
        _ => None,
    }
}

fn eval_all(items: &[Expr], frame: &Frame) -> Option<Vec<Value>> {
    items.iter().map(|item| eval_node(item, frame)).collect()
}

fn constant_value(constant: &Constant) -> Option<Value> {
    Some(match constant {
        Constant::None => Value::None,
        Constant::Bool(value) => Value::Bool { value: *value },
        Constant::Int(value) => Value::int(value.to_string().parse().ok()?),
        Constant::Float(value) => Value::float(*value),
        Constant::Complex { real, imag } => Value::Complex { real: *real, imag: *imag },
        Constant::Str(value) => Value::str(value.clone()),
        Constant::Bytes(bytes) => Value::Bytes { value: String::from_utf8_lossy(bytes).into_owned() },
        Constant::Tuple(items) => Value::tuple(items.iter().map(constant_value).collect::<Option<_>>()?),
        _ => return None,
    })
}

fn subscript_value(container: &Value, index: &Value) -> Option<Value> {
    match container {
        Value::Dict { .. } => container.dict_get(index).cloned(),
        Value::Str { value } => {
            let chars: Vec<char> = value.chars().collect();
            let i = normalize_index(index.as_int()?, chars.len())?;
            Some(Value::str(chars[i].to_string()))
        }
        _ => container.get_item(index.as_int()?).cloned(),
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Float { value } => Some(*value),
        other => other.as_int().map(|i| i as f64),
    }
}

fn binary_value(op: Operator, left: &Value, right: &Value) -> Option<Value> {
    if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
        return match op {
            Operator::Add => a.checked_add(b).map(Value::int),
            Operator::Sub => a.checked_sub(b).map(Value::int),
            Operator::Mult => a.checked_mul(b).map(Value::int),
            Operator::FloorDiv if b != 0 => a.checked_div_euclid(b).map(|q| Value::int(q - adjust(a, b))),
            Operator::Mod if b != 0 => a.checked_rem_euclid(b).map(|r| Value::int(if b < 0 && r != 0 { r + b } else { r })),
            Operator::Div if b != 0 => Some(Value::float(a as f64 / b as f64)),
            _ => None,
        };
    }
    if matches!(left, Value::Float { .. }) || matches!(right, Value::Float { .. }) {
        let (a, b) = (as_float(left)?, as_float(right)?);
        return match op {
            Operator::Add => Some(Value::float(a + b)),
            Operator::Sub => Some(Value::float(a - b)),
            Operator::Mult => Some(Value::float(a * b)),
            Operator::Div if b != 0.0 => Some(Value::float(a / b)),
            Operator::FloorDiv if b != 0.0 => Some(Value::float((a / b).floor())),
            _ => None,
        };
    }
    match (op, left, right) {
        (Operator::Add, Value::Str { value: a }, Value::Str { value: b }) => Some(Value::str(format!("{}{}", a, b))),
        (Operator::Add, Value::List { items: a }, Value::List { items: b }) => {
            Some(Value::list(a.iter().chain(b).cloned().collect()))
        }
        (Operator::Mult, Value::Str { value }, count) => {
            let count = usize::try_from(count.as_int()?).unwrap_or(0);
            Some(Value::str(value.repeat(count)))
        }
        _ => None,
    }
}

/// Euclidean division rounds towards negative infinity only for a positive
/// divisor; Python always floors.
fn adjust(a: i64, b: i64) -> i64 {
    if b < 0 && a.checked_rem_euclid(b).is_some_and(|r| r != 0) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new("<test>", 1)
            .with_local("a", Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]))
            .with_local("x", Value::int(0))
            .with_global("d", Value::dict(vec![(Value::str("k"), Value::int(7))]))
    }

    #[test]
    fn test_names_and_subscripts() {
        let frame = frame();
        assert_eq!(eval_expr("a[-1]", &frame), Some(Value::int(3)));
        assert_eq!(eval_expr("d['k']", &frame), Some(Value::int(7)));
        assert_eq!(eval_expr("a[3]", &frame), None);
        assert_eq!(eval_expr("len(a)", &frame), Some(Value::int(3)));
        assert_eq!(eval_expr("unknown", &frame), None);
        assert!(matches!(eval_expr("len", &frame), Some(Value::Function { builtin: true, .. })));
    }

    #[test]
    fn test_arithmetic() {
        let frame = frame();
        assert_eq!(eval_expr("x + 2 * 3", &frame), Some(Value::int(6)));
        assert_eq!(eval_expr("-7 // 2", &frame), Some(Value::int(-4)));
        assert_eq!(eval_expr("7 // -2", &frame), Some(Value::int(-4)));
        assert_eq!(eval_expr("-7 % 3", &frame), Some(Value::int(2)));
        assert_eq!(eval_expr("7 % -3", &frame), Some(Value::int(-2)));
        assert_eq!(eval_expr("1 / x", &frame), None);
        assert_eq!(eval_expr("1 / 2", &frame), Some(Value::float(0.5)));
    }
}
