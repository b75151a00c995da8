//! Objects named on the offending line
//!
//! Used both for the variable dump shown under a source excerpt and by
//! runtime analyzers that need to know which object caused an error.

use super::eval::{eval_expr, lookup_name};
use super::similar::{get_similar_words, ratio};
use crate::locale::Translator;
use crate::snapshot::{Frame, Value};
use crate::tokens::{get_significant_tokens, untokenize, Token};
use crate::tr;

pub const MAX_LENGTH: usize = 65;
const INDENT: &str = "        ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Local,
    Global,
    Builtin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoundObject {
    pub name: String,
    pub value: Value,
    pub scope: ScopeKind,
}

/// Descriptive phrase for a short type name, e.g. "an integer (`int`)".
pub fn convert_type(t: &Translator, short_form: &str) -> String {
    match short_form {
        "complex" => tr!(t, "a complex number"),
        "dict" => tr!(t, "a dictionary (`dict`)"),
        "float" => tr!(t, "a number (`float`)"),
        "int" => tr!(t, "an integer (`int`)"),
        "list" => tr!(t, "a `list`"),
        "NoneType" => tr!(t, "a variable equal to `None` (`NoneType`)"),
        "set" => tr!(t, "a `set`"),
        "str" => tr!(t, "a string (`str`)"),
        "tuple" => tr!(t, "a `tuple`"),
        "frozenset" => tr!(t, "a `frozenset`"),
        other => other.to_string(),
    }
}

fn scope_of(name: &str, frame: &Frame) -> Option<ScopeKind> {
    if frame.locals.contains(name) || frame.nonlocals.contains(name) {
        Some(ScopeKind::Local)
    } else if frame.globals.contains(name) {
        Some(ScopeKind::Global)
    } else if frame.is_builtin(name) {
        Some(ScopeKind::Builtin)
    } else {
        None
    }
}

/// Text of every `name[...]` subscript on the line, innermost brackets
/// included, in source order.
fn subscript_texts(tokens: &[Token]) -> Vec<String> {
    let mut texts = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        if !tok.is_identifier() || tokens.get(i + 1).map_or(true, |next| *next != "[") {
            continue;
        }
        let mut depth = 0usize;
        for (j, inner) in tokens.iter().enumerate().skip(i + 1) {
            if inner.is_opening_bracket() {
                depth += 1;
            } else if inner.is_closing_bracket() {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    texts.push(untokenize(&tokens[i..=j]).trim().to_string());
                    break;
                }
            }
        }
    }
    texts
}

/// Names and evaluable subscripts found on `line`, each
/// resolved once: locals, then globals, then builtins.
pub fn get_all_objects(line: &str, frame: &Frame) -> Vec<FoundObject> {
    let tokens = get_significant_tokens(line.trim());
    let mut found: Vec<FoundObject> = Vec::new();
    let push = |name: String, value: Value, scope: ScopeKind, found: &mut Vec<FoundObject>| {
        if !found.iter().any(|f| f.name == name) {
            found.push(FoundObject { name, value, scope });
        }
    };

    for (i, tok) in tokens.iter().enumerate() {
        // Attribute names after a dot are not variables.
        if !tok.is_identifier() || (i > 0 && tokens[i - 1] == ".") {
            continue;
        }
        if let (Some(scope), Some(value)) = (scope_of(&tok.text, frame), lookup_name(&tok.text, frame)) {
            push(tok.text.clone(), value, scope, &mut found);
        }
    }

    for text in subscript_texts(&tokens) {
        let root = text.split('[').next().unwrap_or_default().trim().to_string();
        let Some(scope) = scope_of(&root, frame) else { continue };
        if let Some(value) = eval_expr(&text, frame) {
            push(text, value, scope, &mut found);
        }
    }

    found
}

/// Dotted names such as `a.b` or `a.b.c` on `line`, without duplicates.
pub fn get_dotted_names(line: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut prev_identifier = false;
    let mut dot_found = false;
    for tok in get_significant_tokens(line) {
        if tok == "." {
            dot_found = true;
            continue;
        }
        if tok.is_identifier() {
            match names.last() {
                Some(previous) if prev_identifier && dot_found => {
                    let dotted = format!("{}.{}", previous, tok.text);
                    names.push(dotted);
                }
                _ => names.push(tok.text.clone()),
            }
            prev_identifier = true;
        } else {
            prev_identifier = false;
        }
        dot_found = false;
    }
    let mut dotted: Vec<String> = Vec::new();
    for name in names {
        if name.contains('.') && !dotted.contains(&name) {
            dotted.push(name);
        }
    }
    dotted
}

/// Strips memory addresses and quotes from reprs like `<function f at 0x...>`.
pub fn simplify_name(name: &str) -> String {
    let mut name = if let Some((head, _)) = name.split_once(" at ") {
        format!("{}>", head)
    } else if let Some((head, path)) = name.split_once(" from ") {
        let path = path.strip_suffix('>').unwrap_or(path);
        if head.chars().count() + path.chars().count() < MAX_LENGTH {
            format!("{}> from {}", head, path)
        } else {
            format!("{}>\n{}from {}", head, INDENT, path)
        }
    } else {
        name.to_string()
    };
    name = name.replace("built-in", "builtin");
    if name.starts_with('<') {
        name = name.replace('\'', "");
    }
    if let Some((file_name, obj_name)) = name.split_once(".<locals>.") {
        let start = if name.starts_with("<function ") {
            "<function "
        } else if name.starts_with("<class ") {
            "<class "
        } else {
            "<"
        };
        let file_name = file_name.replacen(start, "", 1);
        name = format!("{}{} from {}", start, obj_name, file_name);
    }
    if name.contains("__main__.") {
        name = format!("{} from __main__", name.replace("__main__.", ""));
    }
    name
}

/// `    [global ]name: repr`, with long reprs shortened and, when they are,
/// the object's length on a second line.
pub fn format_var_info(name: &str, obj: &Value, global: bool, max_length: usize) -> String {
    let mut value = obj.repr();
    if value.starts_with('<') && value.ends_with('>') {
        value = simplify_name(&value);
    }

    let mut length_info = None;
    if value.chars().count() > max_length && !value.starts_with('<') {
        let last = value.chars().last().unwrap_or(' ');
        let head = |n: usize| value.chars().take(n).collect::<String>();
        let mut shortened = String::new();
        if value.contains(',') {
            let mut length = 0;
            for part in value.split(", ") {
                let part_len = part.chars().count();
                if part_len + length > max_length {
                    break;
                }
                shortened.push_str(part);
                shortened.push_str(", ");
                length += part_len + 2;
            }
        }
        if shortened.is_empty() {
            shortened = head(max_length.saturating_sub(5));
        }
        value = format!("{}...{}", shortened, last);
        length_info = obj.len();
    }

    let prefix = if global { "global " } else { "" };
    let mut result = format!("    {}{}: {}", prefix, name, value);
    if let Some(length) = length_info {
        result.push_str(&format!("\n{}len({}): {}", INDENT, name, length));
    }
    result
}

/// Variable dump for `line`: locals first, then globals, then builtins.
pub fn get_var_info(line: &str, frame: &Frame, max_length: usize) -> String {
    let objects = get_all_objects(line, frame);
    let mut names_info = Vec::new();
    for scope in [ScopeKind::Local, ScopeKind::Global, ScopeKind::Builtin] {
        for obj in objects.iter().filter(|o| o.scope == scope) {
            names_info.push(format_var_info(&obj.name, &obj.value, scope == ScopeKind::Global, max_length));
        }
    }
    if names_info.is_empty() {
        return String::new();
    }
    names_info.push(String::new());
    names_info.join("\n")
}

/// `local`, `global` and/or `nonlocal`: the scopes defining `name`.
pub fn get_definition_scope(name: &str, frame: &Frame) -> Vec<&'static str> {
    let mut scopes = Vec::new();
    if frame.locals.contains(name) {
        scopes.push("local");
    }
    if frame.globals.contains(name) {
        scopes.push("global");
    }
    if frame.nonlocals.contains(name) && !frame.globals.contains(name) {
        scopes.push("nonlocal");
    }
    scopes
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarNames {
    pub locals: Vec<String>,
    pub globals: Vec<String>,
    pub builtins: Vec<String>,
    pub best: Option<String>,
}

impl SimilarNames {
    pub fn count(&self) -> usize {
        self.locals.len() + self.globals.len() + self.builtins.len()
    }
}

/// Similarity of `candidate` to `name`, also trying `name` in lower and
/// upper case as the scope searches do.
fn closeness(name: &str, candidate: &str) -> f64 {
    ratio(name, candidate)
        .max(ratio(&name.to_lowercase(), candidate))
        .max(ratio(&name.to_uppercase(), candidate))
}

/// Names close to `name` in each scope, with the closest overall.
pub fn get_similar_names(name: &str, frame: &Frame) -> SimilarNames {
    let local_names: Vec<&str> = frame.locals.names().chain(frame.nonlocals.names()).collect();
    let locals = get_similar_words(name, &local_names);

    let global_names: Vec<&str> = frame.globals.names().collect();
    let globals: Vec<String> = get_similar_words(name, &global_names)
        .into_iter()
        .filter(|n| !locals.contains(n))
        .collect();

    let builtins = get_similar_words(name, &frame.builtin_names());

    // Ties go to the innermost scope: locals, nonlocals, globals, builtins.
    let ranked = locals
        .iter()
        .map(|n| (if frame.locals.contains(n) { 0 } else { 1 }, n))
        .chain(globals.iter().map(|n| (2, n)))
        .chain(builtins.iter().map(|n| (3, n)));
    let mut best: Option<(f64, usize, &String)> = None;
    for (rank, candidate) in ranked {
        let score = closeness(name, candidate);
        let better = match best {
            None => true,
            Some((best_score, best_rank, _)) => score > best_score || (score == best_score && rank < best_rank),
        };
        if better {
            best = Some((score, rank, candidate));
        }
    }
    if let Some((_, _, candidate)) = best {
        let best = Some(candidate.clone());
        return SimilarNames { locals, globals, builtins, best };
    }
    if name == "length" || name == "lenght" {
        return SimilarNames { locals, globals, builtins: vec!["len".to_string()], best: Some("len".to_string()) };
    }
    SimilarNames { locals, globals, builtins, best: None }
}

/// Explanation when `name` has an annotation but no value, as happens when
/// `name : value` is written instead of `name = value`.
pub fn name_has_type_hint(t: &Translator, name: &str, frame: &Frame) -> Option<String> {
    let hint = frame.annotations.get(name)?;
    let scope = if frame.is_module_level() { tr!(t, "global") } else { tr!(t, "local") };
    Some(tr!(
        t,
        "A type hint found for `{name}` in the {scope} scope.\nPerhaps you had used a colon instead of an equal sign and wrote\n\n    {name} : {hint}\n\ninstead of\n\n    {name} = {hint}\n",
        name = name,
        scope = scope,
        hint = hint
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new("<test>", 3)
            .in_function("f")
            .with_local("a", Value::list((0..3).map(Value::int).collect()))
            .with_global("b", Value::str("hello"))
    }

    #[test]
    fn test_var_info_order() {
        let info = get_var_info("print(len(a), b, a[0])", &frame(), MAX_LENGTH);
        assert_eq!(
            info,
            "    a: [0, 1, 2]\n    a[0]: 0\n    global b: 'hello'\n    print: <builtin function print>\n    len: <builtin function len>\n"
        );
    }

    #[test]
    fn test_truncation_keeps_last_char() {
        let long = Value::list((0..40).map(Value::int).collect());
        let line = format_var_info("big", &long, false, MAX_LENGTH);
        let first = line.lines().next().unwrap();
        assert!(first.ends_with("...]"));
        assert!(line.ends_with("len(big): 40"));
    }

    #[test]
    fn test_dotted_names() {
        assert_eq!(get_dotted_names("x = a.b.c + d.e"), vec!["a.b", "a.b.c", "d.e"]);
    }

    #[test]
    fn test_simplify_name() {
        assert_eq!(simplify_name("<function f at 0x0000>"), "<function f>");
        assert_eq!(simplify_name("<built-in function len>"), "<builtin function len>");
        assert_eq!(simplify_name("<class '__main__.A'>"), "<class A> from __main__");
    }

    #[test]
    fn test_similar_names() {
        let frame = Frame::new("<test>", 1).with_local("foo2", Value::int(1));
        let similar = get_similar_names("foo", &frame);
        assert_eq!(similar.locals, vec!["foo2"]);
        assert_eq!(similar.best.as_deref(), Some("foo2"));
        assert_eq!(get_similar_names("lenght", &Frame::new("<test>", 1)).best.as_deref(), Some("len"));
    }

    #[test]
    fn test_similar_names_prefer_inner_scope_on_tie() {
        let frame = Frame::new("<test>", 1)
            .in_function("f")
            .with_global("foo2", Value::int(2))
            .with_local("foo1", Value::int(1));
        let similar = get_similar_names("foo", &frame);
        assert_eq!(similar.locals, vec!["foo1"]);
        assert_eq!(similar.globals, vec!["foo2"]);
        assert_eq!(similar.best.as_deref(), Some("foo1"));

        let frame = Frame::new("<test>", 1)
            .in_function("g")
            .with_nonlocal("bar1", Value::int(1))
            .with_local("bar2", Value::int(2));
        assert_eq!(get_similar_names("bar", &frame).best.as_deref(), Some("bar2"));

        let frame = Frame::new("<test>", 1).in_function("h").with_local("spam", Value::int(1)).with_global("spa", Value::int(2));
        assert_eq!(get_similar_names("spa_", &frame).best.as_deref(), Some("spa"));
    }

    #[test]
    fn test_convert_type() {
        let t = Translator::english();
        assert_eq!(convert_type(&t, "int"), "an integer (`int`)");
        assert_eq!(convert_type(&t, "Foo"), "Foo");
    }
}
