//! `KeyError`

use super::{calling_site, is_raise_statement};
use crate::analysis::eval::eval_expr;
use crate::analysis::registry::Registry;
use crate::analysis::similar::get_similar_words;
use crate::analysis::syntax::{cause, cause_with_hint};
use crate::analysis::variables::get_all_objects;
use crate::analysis::{AnalyzerResult, CauseEntry, RuntimeContext};
use crate::locale::{please_report, Translator};
use crate::snapshot::{Frame, Value};
use crate::tr;

const CHAIN_MAP_MISSING: &str = "Key not found in the first mapping: ";

pub fn register(registry: &mut Registry) {
    registry
        .add_runtime("KeyError", "popitem_from_empty_dict", popitem_from_empty_dict)
        .add_runtime("KeyError", "popitem_from_empty_chain_map", popitem_from_empty_chain_map)
        .add_runtime("KeyError", "missing_key_in_chain_map", missing_key_in_chain_map)
        .add_runtime("KeyError", "missing_key_in_dict", missing_key_in_dict)
        .add_runtime("KeyError", "missing_key_in_dict_like", missing_key_in_dict_like);
}

fn is_mapping(value: &Value) -> bool {
    matches!(value, Value::Dict { .. }) || value.has_attribute("keys")
}

fn find_empty_mapping(frame: &Frame, line: &str) -> Option<String> {
    get_all_objects(line, frame)
        .into_iter()
        .find(|found| is_mapping(&found.value) && found.value.len() == Some(0))
        .map(|found| found.name)
}

/// First mapping on the line that does not hold `key`. Mappings other than
/// `dict` cannot be inspected and are assumed not to.
fn find_missing_key_obj(key: &Value, frame: &Frame, line: &str) -> Option<(String, Value)> {
    get_all_objects(line, frame)
        .into_iter()
        .find(|found| match &found.value {
            Value::Dict { .. } => found.value.dict_get(key).is_none(),
            other => other.has_attribute("keys"),
        })
        .map(|found| (found.name, found.value))
}

fn popitem_from_empty_dict(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    if !ctx.message.contains("popitem(): dictionary is empty") {
        return Ok(None);
    }
    let Some(name) = find_empty_mapping(ctx.frame, ctx.bad_line) else {
        let text = tr!(
            t,
            "You tried to retrieve an item from an empty `dict`\nor a similar object which I cannot identify.\n"
        );
        return cause(text + &please_report(t));
    };
    cause_with_hint(
        tr!(t, "You tried to retrieve an item from `{name}` which is an empty `dict`.\n", name = name),
        tr!(t, "`{name}` is an empty `dict`.\n", name = name),
    )
}

/// Raised inside `collections`; the mapping is named on the calling line.
fn popitem_from_empty_chain_map(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    if !ctx.message.contains("No keys found in the first mapping.") {
        return Ok(None);
    }
    let name = calling_site(ctx).and_then(|(frame, line)| find_empty_mapping(frame, &line));
    let Some(name) = name else {
        let text = tr!(
            t,
            "You tried to retrieve an item from an empty ChainMap\nor similar object which I cannot identify.\n"
        );
        return cause(text + &please_report(t));
    };
    cause_with_hint(
        tr!(t, "You tried to retrieve an item from `{name}` which is an empty `ChainMap`.\n", name = name),
        tr!(t, "`{name}` is an empty `ChainMap`.\n", name = name),
    )
}

fn missing_key_in_chain_map(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(raw) = ctx.first_arg().and_then(Value::as_str).and_then(|arg| arg.strip_prefix(CHAIN_MAP_MISSING))
    else {
        return Ok(None);
    };
    let key = eval_expr(raw, &Frame::default()).unwrap_or_else(|| Value::str(raw));

    let site = if is_raise_statement(ctx.bad_line) {
        calling_site(ctx)
    } else {
        Some((ctx.frame, ctx.bad_line.to_string()))
    };
    if let Some((frame, line)) = site {
        if line.contains(&key.py_str()) {
            if let Some(entry) = analyze_missing_key(ctx.t, &key, frame, line.trim()) {
                return Ok(Some(entry));
            }
        }
    }
    cause(tr!(ctx.t, "Missing key `{key}` in a `ChainMap` or in a similar object.\n", key = key.py_str()))
}

fn missing_key_in_dict(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(key) = ctx.first_arg() else {
        return Ok(None);
    };
    if is_raise_statement(ctx.bad_line) || !ctx.bad_line.contains(&key.py_str()) {
        return Ok(None);
    }
    Ok(analyze_missing_key(ctx.t, key, ctx.frame, ctx.bad_line))
}

/// `raise KeyError(...)` inside a mapping class of the user's program.
fn missing_key_in_dict_like(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(key) = ctx.first_arg() else {
        return Ok(None);
    };
    if !is_raise_statement(ctx.bad_line) {
        return Ok(None);
    }
    let Some((frame, line)) = calling_site(ctx) else {
        return Ok(None);
    };
    if !line.contains(&key.py_str()) {
        return Ok(None);
    }
    Ok(analyze_missing_key(ctx.t, key, frame, &line))
}

fn analyze_missing_key(t: &Translator, key: &Value, frame: &Frame, line: &str) -> Option<CauseEntry> {
    let Some((name, obj)) = find_missing_key_obj(key, frame, line) else {
        return Some(CauseEntry::new(tr!(
            t,
            "A `dict` or a similar object which I cannot identify\ndoes not have `{key}` as a key.\n",
            key = key.py_str()
        )));
    };

    let key_repr = key.repr();
    let begin = if matches!(obj, Value::Dict { .. }) {
        tr!(t, "The key `{key}` cannot be found in the dict `{name}`.\n", key = key_repr, name = name)
    } else {
        tr!(
            t,
            "The key `{key}` cannot be found in `{name}`, an object of type `{obj_type}`.\n",
            key = key_repr,
            name = name,
            obj_type = obj.type_name()
        )
    };

    if let Some(text) = key.as_str() {
        if let Some(mut entry) = key_is_a_string(t, text, &name, &obj) {
            entry.cause = begin + &entry.cause;
            return Some(entry);
        }
    } else {
        let as_string = Value::str(key.py_str());
        if obj.dict_get(&as_string).is_some() {
            let key = key.py_str();
            let additional = tr!(
                t,
                "`{name}` contains a string key which is identical to `str({key})`.\nPerhaps you forgot to convert the key into a string.\n",
                name = name,
                key = key
            );
            let hint = tr!(t, "Did you forget to convert `{key}` into a string?\n", key = key);
            return Some(CauseEntry::with_hint(begin + &additional, hint));
        }
    }
    Some(CauseEntry::new(begin))
}

fn key_is_a_string(t: &Translator, key: &str, dict_name: &str, obj: &Value) -> Option<CauseEntry> {
    let keys = obj.dict_keys();
    let key_repr = Value::str(key).repr();
    if keys.iter().any(|k| k.py_str() == key) {
        return Some(CauseEntry::with_hint(
            tr!(
                t,
                "`{key}` is a string.\nThere is a key of `{name}` whose string representation\nis identical to `{key}`.\n",
                key = key_repr,
                name = dict_name
            ),
            tr!(t, "Did you convert `{key}` into a string by mistake?\n", key = key),
        ));
    }

    let string_keys: Vec<&str> = keys.iter().filter_map(|k| k.as_str()).collect();
    let similar: Vec<String> =
        get_similar_words(key, &string_keys).iter().map(|k| Value::str(k.as_str()).repr()).collect();
    let first = similar.first()?;
    let hint = tr!(t, "Did you mean `{name}`?\n", name = first);
    let additional = if similar.len() == 1 {
        tr!(
            t,
            "`{name}` is a key of `{dict_}` which is similar to `{key}`.\n",
            name = first,
            dict_ = dict_name,
            key = key_repr
        )
    } else {
        tr!(
            t,
            "`{name}` has some keys similar to `{key}` including:\n`{names}`.\n",
            name = dict_name,
            key = key_repr,
            names = similar.join(", ")
        )
    };
    Some(CauseEntry::with_hint(additional, hint))
}
