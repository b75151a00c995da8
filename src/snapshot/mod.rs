//! Execution-context snapshot
//!
//! Everything the explainer knows about an exception arrives through these
//! types: the exception itself, the chain of frames with their scopes, and
//! for syntax errors the position reported by the parser.

pub mod value;

pub use value::Value;

use crate::errors::Result;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Stand-in for an exception message whose `str()` raised.
pub const STR_FAILED: &str = "<exception str() failed>";

/// Names of the `builtins` module used when a frame does not list its own.
pub const BUILTIN_NAMES: &[&str] = &[
    "ArithmeticError", "AssertionError", "AttributeError", "BaseException", "BufferError",
    "BytesWarning", "DeprecationWarning", "EOFError", "Ellipsis", "EnvironmentError",
    "Exception", "False", "FileExistsError", "FileNotFoundError", "FloatingPointError",
    "FutureWarning", "GeneratorExit", "IOError", "ImportError", "ImportWarning",
    "IndentationError", "IndexError", "InterruptedError", "IsADirectoryError", "KeyError",
    "KeyboardInterrupt", "LookupError", "MemoryError", "ModuleNotFoundError", "NameError",
    "None", "NotADirectoryError", "NotImplemented", "NotImplementedError", "OSError",
    "OverflowError", "PendingDeprecationWarning", "PermissionError", "RecursionError",
    "ReferenceError", "ResourceWarning", "RuntimeError", "RuntimeWarning", "StopIteration",
    "SyntaxError", "SyntaxWarning", "SystemError", "SystemExit", "TabError", "TimeoutError",
    "True", "TypeError", "UnboundLocalError", "UnicodeDecodeError", "UnicodeEncodeError",
    "UnicodeError", "UserWarning", "ValueError", "Warning", "ZeroDivisionError", "abs", "all",
    "any", "ascii", "bin", "bool", "breakpoint", "bytearray", "bytes", "callable", "chr",
    "classmethod", "compile", "complex", "delattr", "dict", "dir", "divmod", "enumerate",
    "eval", "exec", "exit", "filter", "float", "format", "frozenset", "getattr", "globals",
    "hasattr", "hash", "help", "hex", "id", "input", "int", "isinstance", "issubclass", "iter",
    "len", "list", "locals", "map", "max", "memoryview", "min", "next", "object", "oct", "open",
    "ord", "pow", "print", "property", "quit", "range", "repr", "reversed", "round", "set",
    "setattr", "slice", "sorted", "staticmethod", "str", "sum", "super", "tuple", "type",
    "vars", "zip",
];

/// Name bindings in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope(Vec<(String, Value)>);

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Binds `name`, replacing an existing binding in place.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Scope {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (name, value) in iter {
            scope.insert(name, value);
        }
        scope
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct ScopeVisitor;

impl<'de> Visitor<'de> for ScopeVisitor {
    type Value = Scope;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Scope, A::Error> {
        let mut scope = Scope::new();
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            scope.insert(name, value);
        }
        Ok(scope)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ScopeVisitor)
    }
}

/// One entry of the call stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub filename: String,
    pub lineno: usize,
    #[serde(default = "module_function")]
    pub function: String,
    #[serde(default)]
    pub locals: Scope,
    #[serde(default)]
    pub nonlocals: Scope,
    #[serde(default)]
    pub globals: Scope,
    #[serde(default)]
    pub builtins: Vec<String>,
    /// Annotations recorded at module level (`__annotations__`)
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

fn module_function() -> String {
    "<module>".to_string()
}

impl Frame {
    pub fn new(filename: impl Into<String>, lineno: usize) -> Self {
        Self {
            filename: filename.into(),
            lineno,
            function: module_function(),
            ..Self::default()
        }
    }

    pub fn in_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    pub fn with_local(mut self, name: &str, value: Value) -> Self {
        self.locals.insert(name, value);
        self
    }

    pub fn with_nonlocal(mut self, name: &str, value: Value) -> Self {
        self.nonlocals.insert(name, value);
        self
    }

    pub fn with_global(mut self, name: &str, value: Value) -> Self {
        self.globals.insert(name, value);
        self
    }

    pub fn with_annotation(mut self, name: &str, annotation: &str) -> Self {
        self.annotations.insert(name.to_string(), annotation.to_string());
        self
    }

    pub fn is_module_level(&self) -> bool {
        self.function == "<module>"
    }

    /// Builtin names visible from the frame.
    pub fn builtin_names(&self) -> Vec<String> {
        if self.builtins.is_empty() {
            BUILTIN_NAMES.iter().map(|n| n.to_string()).collect()
        } else {
            self.builtins.clone()
        }
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        if self.builtins.is_empty() {
            BUILTIN_NAMES.contains(&name)
        } else {
            self.builtins.iter().any(|n| n == name)
        }
    }

    /// Locals, then enclosing scopes, then globals.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.locals
            .get(name)
            .or_else(|| self.nonlocals.get(name))
            .or_else(|| self.globals.get(name))
    }
}

/// Position information carried by a `SyntaxError`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxDetails {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub lineno: Option<usize>,
    /// 1-based column
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub end_lineno: Option<usize>,
    #[serde(default)]
    pub end_offset: Option<usize>,
    /// The offending source line
    #[serde(default)]
    pub text: Option<String>,
}

impl SyntaxDetails {
    pub fn new(filename: impl Into<String>, lineno: usize, offset: usize) -> Self {
        Self {
            filename: Some(filename.into()),
            lineno: Some(lineno),
            offset: Some(offset),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_end(mut self, end_lineno: usize, end_offset: usize) -> Self {
        self.end_lineno = Some(end_lineno);
        self.end_offset = Some(end_offset);
        self
    }
}

/// An exception together with the context it was raised in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExceptionSnapshot {
    pub type_name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub args: Vec<Value>,
    /// Base classes, nearest first
    #[serde(default)]
    pub bases: Vec<String>,
    /// Outermost frame first
    #[serde(default)]
    pub frames: Vec<Frame>,
    #[serde(default)]
    pub syntax: Option<SyntaxDetails>,
    /// Traceback text as printed by Python, when available
    #[serde(default)]
    pub traceback: Option<String>,
    /// Imported modules (`sys.modules`)
    #[serde(default)]
    pub modules: BTreeMap<String, Value>,
}

const SYNTAX_TYPES: &[&str] = &["SyntaxError", "IndentationError", "TabError"];

impl ExceptionSnapshot {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            type_name: type_name.into(),
            args: vec![Value::str(message.clone())],
            message,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_bases(mut self, bases: &[&str]) -> Self {
        self.bases = bases.iter().map(|b| b.to_string()).collect();
        self
    }

    pub fn with_syntax(mut self, details: SyntaxDetails) -> Self {
        self.syntax = Some(details);
        self
    }

    pub fn with_module(mut self, name: &str, module: Value) -> Self {
        self.modules.insert(name.to_string(), module);
        self
    }

    /// `SyntaxError` or one of its subclasses.
    pub fn is_syntax_error(&self) -> bool {
        SYNTAX_TYPES.contains(&self.type_name.as_str())
            || self.bases.iter().any(|b| b == "SyntaxError")
    }

    pub fn is_subclass_of(&self, name: &str) -> bool {
        self.type_name == name || self.bases.iter().any(|b| b == name)
    }

    /// Exceptions used for control flow; never explained.
    pub fn is_control_flow(&self) -> bool {
        matches!(self.type_name.as_str(), "SystemExit" | "KeyboardInterrupt")
    }

    /// Frame where the exception was raised.
    pub fn raised_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn str_failed(&self) -> bool {
        self.message == STR_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_keeps_order() {
        let json = r#"{"zeta": {"kind": "int", "value": 1}, "alpha": {"kind": "none"}}"#;
        let scope: Scope = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = scope.names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        let back = serde_json::to_string(&scope).unwrap();
        assert!(back.find("zeta").unwrap() < back.find("alpha").unwrap());
    }

    #[test]
    fn test_snapshot_from_json() {
        let json = r#"{
            "type_name": "NameError",
            "message": "name 'foo' is not defined",
            "frames": [{"filename": "<demo>", "lineno": 1,
                        "locals": {"foo2": {"kind": "int", "value": 3}}}]
        }"#;
        let snapshot = ExceptionSnapshot::from_json(json).unwrap();
        let frame = snapshot.raised_frame().unwrap();
        assert_eq!(frame.function, "<module>");
        assert_eq!(frame.lookup("foo2"), Some(&Value::int(3)));
        assert!(frame.is_builtin("len"));
    }

    #[test]
    fn test_syntax_subclasses() {
        assert!(ExceptionSnapshot::new("TabError", "").is_syntax_error());
        assert!(ExceptionSnapshot::new("MyError", "").with_bases(&["SyntaxError"]).is_syntax_error());
        assert!(!ExceptionSnapshot::new("ValueError", "").is_syntax_error());
        assert!(ExceptionSnapshot::new("SystemExit", "").is_control_flow());
    }
}
