//! `IndexError`

use crate::analysis::eval::{eval_expr, lookup_name};
use crate::analysis::registry::Registry;
use crate::analysis::syntax::{cause, cause_with_hint};
use crate::analysis::variables::convert_type;
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::pattern::Pattern;
use crate::snapshot::Value;
use crate::tokens::{get_significant_tokens, untokenize};
use crate::tr;
use once_cell::sync::Lazy;
use tracing::debug;

static OUT_OF_RANGE: Lazy<Pattern> = Lazy::new(|| Pattern::new(r"(.*) index out of range"));

pub fn register(registry: &mut Registry) {
    registry.add_runtime("IndexError", "index_out_of_range", index_out_of_range);
}

/// A `name[index]` subscript found on the offending line.
struct Subscript {
    name: String,
    length: usize,
    /// `None` when the index cannot be evaluated safely
    index: Option<i64>,
}

impl Subscript {
    fn is_out_of_range(&self) -> bool {
        match self.index {
            Some(index) => {
                let length = self.length as i64;
                index >= length || index < -length
            }
            None => true,
        }
    }
}

/// Subscripts of sized objects, in source order.
fn find_subscripts(ctx: &RuntimeContext<'_>) -> Vec<Subscript> {
    let tokens = get_significant_tokens(ctx.bad_line);
    let mut found = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        if !tok.is_identifier() || tokens.get(i + 1).map_or(true, |next| *next != "[") {
            continue;
        }
        if i > 0 && tokens[i - 1] == "." {
            continue;
        }
        let Some(length) = lookup_name(&tok.text, ctx.frame).and_then(|value| value.len()) else {
            continue;
        };
        let mut depth = 0usize;
        let mut close = None;
        for (j, inner) in tokens.iter().enumerate().skip(i + 1) {
            if inner.is_opening_bracket() {
                depth += 1;
            } else if inner.is_closing_bracket() {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    close = Some(j);
                    break;
                }
            }
        }
        let Some(close) = close else { continue };
        let index_text = untokenize(&tokens[i + 2..close]);
        let index = eval_expr(&index_text, ctx.frame).as_ref().and_then(Value::as_int);
        found.push(Subscript { name: tok.text.clone(), length, index });
    }
    found
}

fn index_out_of_range(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = OUT_OF_RANGE.captures(ctx.message) else {
        return Ok(None);
    };
    let obj_type = match &caps[1] {
        "string" => "str",
        other => other,
    };
    let Some(subscript) = find_subscripts(ctx).into_iter().find(Subscript::is_out_of_range) else {
        debug!(line = ctx.bad_line, "cannot identify the indexed object");
        return Ok(None);
    };
    let obj_type = convert_type(t, obj_type);
    let Subscript { name, length, index } = subscript;

    let mut text = match index {
        Some(index) => tr!(
            t,
            "You have tried to get the item with index `{index}` of `{name}`,\n{obj_type} of length `{length}`.\n",
            index = index,
            name = name,
            obj_type = obj_type,
            length = length
        ),
        None => tr!(
            t,
            "You have tried to get an item from `{name}`,\n{obj_type} of length `{length}`, by using a value for the index\nthat I cannot determine but which is not allowed.\n",
            name = name,
            obj_type = obj_type,
            length = length
        ),
    };

    let off_by_one = index.map_or(true, |index| index == length as i64);
    if !off_by_one {
        return cause(text);
    }
    if length > 0 {
        text.push_str(&tr!(
            t,
            "The largest valid index of `{name}` is `{index}`.\n",
            name = name,
            index = length - 1
        ));
    }
    cause_with_hint(text, tr!(t, "Remember: the first item of {obj_type} is at index 0.\n", obj_type = obj_type))
}

#[cfg(test)]
mod tests {
    use super::super::testing::explain;
    use crate::snapshot::{Frame, Value};

    fn numbers() -> Value {
        Value::list(vec![Value::int(1), Value::int(2), Value::int(3)])
    }

    #[test]
    fn test_index_equal_to_length() {
        let frame = Frame::new("", 1).with_global("a", numbers());
        let (name, text, hint) = explain("IndexError", "list index out of range", "print(a[3])", frame);
        assert_eq!(name, Some("index_out_of_range"));
        assert_eq!(
            text,
            "You have tried to get the item with index `3` of `a`,\na `list` of length `3`.\nThe largest valid index of `a` is `2`.\n"
        );
        assert_eq!(hint.as_deref(), Some("Remember: the first item of a `list` is at index 0.\n"));
    }

    #[test]
    fn test_index_well_past_the_end() {
        let frame = Frame::new("", 1).with_global("a", numbers());
        let (_, text, hint) = explain("IndexError", "list index out of range", "a[10]", frame);
        assert!(text.starts_with("You have tried to get the item with index `10` of `a`"));
        assert!(hint.is_none());
    }

    #[test]
    fn test_computed_index() {
        let frame = Frame::new("", 1)
            .in_function("f")
            .with_local("word", Value::str("abc"))
            .with_local("i", Value::int(1));
        let (_, text, _) = explain("IndexError", "string index out of range", "word[i + 2]", frame);
        assert!(text.contains("index `3` of `word`,\na string (`str`) of length `3`."));
    }

    #[test]
    fn test_unknown_index() {
        let frame = Frame::new("", 1).with_global("a", numbers());
        let (_, text, hint) = explain("IndexError", "list index out of range", "a[f()]", frame);
        assert!(text.contains("that I cannot determine but which is not allowed.\n"));
        assert!(hint.is_some());
    }

    #[test]
    fn test_in_range_subscript_skipped() {
        let frame = Frame::new("", 1)
            .with_global("a", numbers())
            .with_global("b", Value::list(vec![]));
        let (_, text, _) = explain("IndexError", "list index out of range", "a[0] + b[0]", frame);
        assert!(text.contains("of `b`,\na `list` of length `0`."));
    }
}
