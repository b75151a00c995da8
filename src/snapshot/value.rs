//! Descriptions of Python objects captured with an exception.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

const STR_ATTRS: &[&str] = &[
    "__add__", "__class__", "__contains__", "__doc__", "__eq__", "__getitem__", "__iter__",
    "__len__", "__mul__", "capitalize", "casefold", "center", "count", "encode", "endswith",
    "expandtabs", "find", "format", "format_map", "index", "isalnum", "isalpha", "isascii",
    "isdecimal", "isdigit", "isidentifier", "islower", "isnumeric", "isprintable", "isspace",
    "istitle", "isupper", "join", "ljust", "lower", "lstrip", "maketrans", "partition",
    "removeprefix", "removesuffix", "replace", "rfind", "rindex", "rjust", "rpartition",
    "rsplit", "rstrip", "split", "splitlines", "startswith", "strip", "swapcase", "title",
    "translate", "upper", "zfill",
];
const LIST_ATTRS: &[&str] = &[
    "__add__", "__class__", "__contains__", "__delitem__", "__doc__", "__eq__", "__getitem__",
    "__iter__", "__len__", "__mul__", "__setitem__", "append", "clear", "copy", "count",
    "extend", "index", "insert", "pop", "remove", "reverse", "sort",
];
const TUPLE_ATTRS: &[&str] = &[
    "__add__", "__class__", "__contains__", "__doc__", "__eq__", "__getitem__", "__iter__",
    "__len__", "__mul__", "count", "index",
];
const DICT_ATTRS: &[&str] = &[
    "__class__", "__contains__", "__delitem__", "__doc__", "__eq__", "__getitem__", "__iter__",
    "__len__", "__setitem__", "clear", "copy", "fromkeys", "get", "items", "keys", "pop",
    "popitem", "setdefault", "update", "values",
];
const SET_ATTRS: &[&str] = &[
    "__class__", "__contains__", "__doc__", "__eq__", "__iter__", "__len__", "add", "clear",
    "copy", "difference", "difference_update", "discard", "intersection",
    "intersection_update", "isdisjoint", "issubset", "issuperset", "pop", "remove",
    "symmetric_difference", "symmetric_difference_update", "union", "update",
];
const INT_ATTRS: &[&str] = &[
    "__abs__", "__add__", "__class__", "__doc__", "__eq__", "__mul__", "as_integer_ratio",
    "bit_length", "conjugate", "denominator", "from_bytes", "imag", "numerator", "real",
    "to_bytes",
];
const FLOAT_ATTRS: &[&str] = &[
    "__abs__", "__add__", "__class__", "__doc__", "__eq__", "__mul__", "as_integer_ratio",
    "conjugate", "fromhex", "hex", "imag", "is_integer", "real",
];
const COMPLEX_ATTRS: &[&str] = &[
    "__abs__", "__add__", "__class__", "__doc__", "__eq__", "__mul__", "conjugate", "imag",
    "real",
];
const BYTES_ATTRS: &[&str] = &[
    "__add__", "__class__", "__contains__", "__doc__", "__eq__", "__getitem__", "__iter__",
    "__len__", "capitalize", "count", "decode", "endswith", "find", "hex", "index", "join",
    "lower", "replace", "split", "startswith", "strip", "upper",
];
const NONE_ATTRS: &[&str] = &["__bool__", "__class__", "__doc__", "__eq__", "__repr__"];
const FUNCTION_ATTRS: &[&str] = &[
    "__call__", "__class__", "__doc__", "__module__", "__name__", "__qualname__",
];

/// A Python object as seen when the exception was raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    None,
    Bool { value: bool },
    Int { value: i64 },
    Float { value: f64 },
    Complex { real: f64, imag: f64 },
    Str { value: String },
    Bytes { value: String },
    List { items: Vec<Value> },
    Tuple { items: Vec<Value> },
    Set { items: Vec<Value> },
    Dict { entries: Vec<(Value, Value)> },
    Function {
        name: String,
        #[serde(default)]
        builtin: bool,
        #[serde(default)]
        doc: Option<String>,
    },
    Class {
        name: String,
        #[serde(default)]
        attributes: Vec<String>,
    },
    Module {
        name: String,
        #[serde(default)]
        attributes: Vec<String>,
        #[serde(default)]
        file: Option<String>,
    },
    Object {
        type_name: String,
        #[serde(default)]
        repr: String,
        #[serde(default)]
        attributes: Vec<String>,
        #[serde(default)]
        length: Option<usize>,
        #[serde(default)]
        slots: bool,
    },
}

impl Value {
    pub fn int(value: i64) -> Self {
        Self::Int { value }
    }

    pub fn float(value: f64) -> Self {
        Self::Float { value }
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::Str { value: value.into() }
    }

    pub fn list(items: Vec<Value>) -> Self {
        Self::List { items }
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Self::Tuple { items }
    }

    pub fn dict(entries: Vec<(Value, Value)>) -> Self {
        Self::Dict { entries }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::Function { name: name.into(), builtin: false, doc: None }
    }

    pub fn class(name: impl Into<String>, attributes: &[&str]) -> Self {
        Self::Class {
            name: name.into(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn module(name: impl Into<String>, attributes: &[&str]) -> Self {
        Self::Module {
            name: name.into(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            file: None,
        }
    }

    pub fn object(type_name: impl Into<String>, attributes: &[&str]) -> Self {
        let type_name = type_name.into();
        Self::Object {
            repr: format!("<{} object>", type_name),
            type_name,
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            length: None,
            slots: false,
        }
    }

    /// Name of the object's class, as `type(obj).__name__` would give.
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "NoneType",
            Self::Bool { .. } => "bool",
            Self::Int { .. } => "int",
            Self::Float { .. } => "float",
            Self::Complex { .. } => "complex",
            Self::Str { .. } => "str",
            Self::Bytes { .. } => "bytes",
            Self::List { .. } => "list",
            Self::Tuple { .. } => "tuple",
            Self::Set { .. } => "set",
            Self::Dict { .. } => "dict",
            Self::Function { builtin: true, .. } => "builtin_function_or_method",
            Self::Function { .. } => "function",
            Self::Class { .. } => "type",
            Self::Module { .. } => "module",
            Self::Object { type_name, .. } => type_name,
        }
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str { value } => Some(value.chars().count()),
            Self::Bytes { value } => Some(value.len()),
            Self::List { items } | Self::Tuple { items } | Self::Set { items } => Some(items.len()),
            Self::Dict { entries } => Some(entries.len()),
            Self::Object { length, .. } => *length,
            _ => None,
        }
    }

    pub fn has_len(&self) -> bool {
        self.len().is_some()
    }

    /// `dir()`-like listing of attribute names.
    pub fn attributes(&self) -> Vec<String> {
        let builtin: &[&str] = match self {
            Self::None => NONE_ATTRS,
            Self::Bool { .. } | Self::Int { .. } => INT_ATTRS,
            Self::Float { .. } => FLOAT_ATTRS,
            Self::Complex { .. } => COMPLEX_ATTRS,
            Self::Str { .. } => STR_ATTRS,
            Self::Bytes { .. } => BYTES_ATTRS,
            Self::List { .. } => LIST_ATTRS,
            Self::Tuple { .. } => TUPLE_ATTRS,
            Self::Set { .. } => SET_ATTRS,
            Self::Dict { .. } => DICT_ATTRS,
            Self::Function { .. } => FUNCTION_ATTRS,
            Self::Class { attributes, .. }
            | Self::Module { attributes, .. }
            | Self::Object { attributes, .. } => return attributes.clone(),
        };
        builtin.iter().map(|a| a.to_string()).collect()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes().iter().any(|a| a == name)
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Self::Function { .. } | Self::Class { .. } => true,
            Self::Object { attributes, .. } => attributes.iter().any(|a| a == "__call__"),
            _ => false,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Self::Str { .. })
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int { value } => Some(*value),
            Self::Bool { value } => Some(i64::from(*value)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str { value } => Some(value),
            _ => None,
        }
    }

    /// Python truthiness; objects without a known length are true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool { value } => *value,
            Self::Int { value } => *value != 0,
            Self::Float { value } => *value != 0.0,
            Self::Complex { real, imag } => *real != 0.0 || *imag != 0.0,
            other => other.len().map(|n| n > 0).unwrap_or(true),
        }
    }

    /// Numeric value equal to zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Int { value } => *value == 0,
            Self::Bool { value } => !*value,
            Self::Float { value } => *value == 0.0,
            Self::Complex { real, imag } => *real == 0.0 && *imag == 0.0,
            _ => false,
        }
    }

    /// Item `index` of a sequence, with Python's negative indexing.
    pub fn get_item(&self, index: i64) -> Option<&Value> {
        let items = match self {
            Self::List { items } | Self::Tuple { items } => items,
            _ => return None,
        };
        let len = items.len() as i64;
        let index = if index < 0 { len + index } else { index };
        if (0..len).contains(&index) {
            items.get(index as usize)
        } else {
            None
        }
    }

    pub fn dict_get(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::Dict { entries } => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn dict_keys(&self) -> Vec<&Value> {
        match self {
            Self::Dict { entries } => entries.iter().map(|(k, _)| k).collect(),
            _ => Vec::new(),
        }
    }

    /// Python `str()`: strings unquoted, anything else as its `repr()`.
    pub fn py_str(&self) -> String {
        match self {
            Self::Str { value } => value.clone(),
            other => other.repr(),
        }
    }

    /// Python-style `repr()`.
    pub fn repr(&self) -> String {
        match self {
            Self::None => "None".to_string(),
            Self::Bool { value } => (if *value { "True" } else { "False" }).to_string(),
            Self::Int { value } => value.to_string(),
            Self::Float { value } => float_repr(*value),
            Self::Complex { real, imag } => {
                if *real == 0.0 {
                    format!("{}j", trim_float(*imag))
                } else {
                    let sign = if *imag < 0.0 { "-" } else { "+" };
                    format!("({}{}{}j)", trim_float(*real), sign, trim_float(imag.abs()))
                }
            }
            Self::Str { value } => str_repr(value),
            Self::Bytes { value } => format!("b{}", str_repr(value)),
            Self::List { items } => format!("[{}]", join_reprs(items)),
            Self::Tuple { items } if items.len() == 1 => format!("({},)", items[0].repr()),
            Self::Tuple { items } => format!("({})", join_reprs(items)),
            Self::Set { items } if items.is_empty() => "set()".to_string(),
            Self::Set { items } => format!("{{{}}}", join_reprs(items)),
            Self::Dict { entries } => {
                let parts: Vec<String> =
                    entries.iter().map(|(k, v)| format!("{}: {}", k.repr(), v.repr())).collect();
                format!("{{{}}}", parts.join(", "))
            }
            Self::Function { name, builtin: true, .. } => format!("<built-in function {}>", name),
            Self::Function { name, .. } => format!("<function {}>", name),
            Self::Class { name, .. } => format!("<class '{}'>", name),
            Self::Module { name, file: Some(file), .. } => format!("<module '{}' from '{}'>", name, file),
            Self::Module { name, .. } => format!("<module '{}' (built-in)>", name),
            Self::Object { repr, type_name, .. } => {
                if repr.is_empty() {
                    format!("<{} object>", type_name)
                } else {
                    repr.clone()
                }
            }
        }
    }
}

fn join_reprs(items: &[Value]) -> String {
    items.iter().map(Value::repr).collect::<Vec<_>>().join(", ")
}

fn trim_float(value: f64) -> String {
    let text = float_repr(value);
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}

/// `repr(float)`: shortest round-trip digits, Python exponent style.
pub fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return (if value > 0.0 { "inf" } else { "-inf" }).to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let text = format!("{:e}", value);
        let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }
    let text = format!("{}", value);
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// `repr(str)` with Python's quote selection.
pub fn str_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repr() {
        assert_eq!(Value::None.repr(), "None");
        assert_eq!(Value::float(1.0).repr(), "1.0");
        assert_eq!(Value::float(0.1).repr(), "0.1");
        assert_eq!(Value::float(1e20).repr(), "1e+20");
        assert_eq!(Value::float(1.5e-7).repr(), "1.5e-07");
        assert_eq!(Value::str("it's").repr(), "\"it's\"");
        assert_eq!(Value::str("a\nb").repr(), "'a\\nb'");
        assert_eq!(Value::tuple(vec![Value::int(1)]).repr(), "(1,)");
        assert_eq!(
            Value::dict(vec![(Value::str("a"), Value::int(1))]).repr(),
            "{'a': 1}"
        );
        assert_eq!(Value::Set { items: vec![] }.repr(), "set()");
        assert_eq!(Value::Complex { real: 0.0, imag: 2.0 }.repr(), "2j");
    }

    #[test]
    fn test_type_and_len() {
        let list = Value::list(vec![Value::int(1), Value::int(2)]);
        assert_eq!(list.type_name(), "list");
        assert_eq!(list.len(), Some(2));
        assert_eq!(Value::str("été").len(), Some(3));
        assert_eq!(Value::int(3).len(), None);
    }

    #[test]
    fn test_attributes() {
        assert!(Value::list(vec![]).has_attribute("append"));
        assert!(!Value::list(vec![]).has_attribute("push"));
        assert!(Value::str("").has_attribute("__len__"));
        let obj = Value::object("Dog", &["name", "bark"]);
        assert!(obj.has_attribute("bark"));
        assert_eq!(obj.type_name(), "Dog");
    }

    #[test]
    fn test_indexing() {
        let list = Value::list(vec![Value::int(1), Value::int(2)]);
        assert_eq!(list.get_item(-1), Some(&Value::int(2)));
        assert_eq!(list.get_item(2), None);
    }

    #[test]
    fn test_serde_tagging() {
        let json = r#"{"kind": "list", "items": [{"kind": "int", "value": 3}]}"#;
        let value: Value = serde_json::from_str(json).unwrap();
        assert_eq!(value, Value::list(vec![Value::int(3)]));
        let dict = r#"{"kind": "dict", "entries": [[{"kind": "str", "value": "a"}, {"kind": "none"}]]}"#;
        let value: Value = serde_json::from_str(dict).unwrap();
        assert_eq!(value.dict_get(&Value::str("a")), Some(&Value::None));
    }
}
