//! `AttributeError`

use crate::analysis::registry::Registry;
use crate::analysis::similar::{get_similar_words, list_to_string};
use crate::analysis::stdlib::is_stdlib_module;
use crate::analysis::syntax::{cause, cause_with_hint};
use crate::analysis::variables::{get_all_objects, FoundObject};
use crate::analysis::{AnalyzerResult, RuntimeContext};
use crate::locale::{please_report, Translator};
use crate::pattern::Pattern;
use crate::snapshot::Value;
use crate::tr;
use once_cell::sync::Lazy;

static PARTIALLY_INITIALIZED: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"partially initialized module '(.*)' has"));
static MODULE_ATTRIBUTE: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"module '(.*)' has no attribute '(.*)'"));
static TYPE_OBJECT_ATTRIBUTE: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"type object '(.*)' has no attribute '(.*)'"));
static OBJECT_ATTRIBUTE: Lazy<Pattern> =
    Lazy::new(|| Pattern::new(r"'(.*)' object has no attribute '(.*)'"));

/// Path fragments of modules installed with Python.
const INSTALLED_PATHS: &[&str] = &["lib/python", "Lib/", "Lib\\", "lib\\python", "site-packages", "dist-packages"];

const SYNONYMS: &[&[&str]] = &[
    &["add", "append", "extend", "insert", "push", "update", "union"],
    &["remove", "discard", "pop"],
];

pub fn register(registry: &mut Registry) {
    registry
        .add_runtime("AttributeError", "partially_initialized_module", partially_initialized_module)
        .add_runtime("AttributeError", "module_attribute", module_attribute)
        .add_runtime("AttributeError", "type_object_attribute", type_object_attribute)
        .add_runtime("AttributeError", "none_attribute", none_attribute)
        .add_runtime("AttributeError", "object_attribute", object_attribute);
}

fn partially_initialized_module(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = PARTIALLY_INITIALIZED.captures(ctx.message) else {
        return Ok(None);
    };
    let module = &caps[1];
    if is_stdlib_module(module) {
        return cause_with_hint(
            tr!(
                t,
                "I suspect that you used the name `{module}.py` for your program\nand that you also wanted to import a module with the same name\nfrom Python's standard library.\nIf so, you should use a different name for your program.\n",
                module = module
            ),
            tr!(t, "Did you give your program the same name as a Python module?\n"),
        );
    }
    let hint = if ctx.message.contains("circular import") {
        tr!(t, "You have a circular import.\n")
    } else {
        tr!(t, "You likely have a circular import.\n")
    };
    cause_with_hint(
        tr!(
            t,
            "Python indicated that the module `{module}` was not fully imported.\nThis can occur if, during the execution of the code in module `{module}`.\nsome other module is imported where an attempt to import\nand execute the code in `{module}` is made again!\n",
            module = module
        ),
        hint,
    )
}

fn module_attribute(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let Some(caps) = MODULE_ATTRIBUTE.captures(ctx.message) else {
        return Ok(None);
    };
    let (module, attribute) = (&caps[1], &caps[2]);
    let found = ctx
        .snapshot
        .modules
        .get(module)
        .or_else(|| ctx.frame.lookup(module).filter(|value| matches!(value, Value::Module { .. })));
    let Some(found) = found else {
        return cause(tr!(
            t,
            "This should not happen:\nPython tells us that module `{module}` does not have an attribute named `{attribute}`.\nHowever, it does not appear that module `{module}` was imported.\n",
            module = module,
            attribute = attribute
        ));
    };

    let similar = get_similar_words(attribute, &found.attributes());
    if let Some(first) = similar.first() {
        let hint = tr!(t, "Did you mean `{name}`?\n", name = first);
        let text = if similar.len() == 1 {
            tr!(
                t,
                "Perhaps you meant to write `{module}.{correct}` instead of `{module}.{typo}`\n",
                module = module,
                correct = first,
                typo = attribute
            )
        } else {
            tr!(
                t,
                "Instead of writing `{module}.{typo}`, perhaps you meant to write one of \nthe following names which are attributes of module `{module}`:\n`{names}`\n",
                module = module,
                typo = attribute,
                names = list_to_string(&similar, ", ")
            )
        };
        return cause_with_hint(text, hint);
    }

    if let Value::Module { file: Some(path), .. } = found {
        if is_stdlib_module(module) && !INSTALLED_PATHS.iter().any(|fragment| path.contains(fragment)) {
            return cause_with_hint(
                tr!(
                    t,
                    "You imported a module named `{module}` from `{mod_path}`.\nThere is also a module named `{module}` in Python's standard library.\nPerhaps you need to rename your module.\n",
                    module = module,
                    mod_path = path
                ),
                tr!(t, "Did you give your program the same name as a Python module?\n"),
            );
        }
    }

    // Other imported modules, visible from the frame, that do have the
    // attribute.
    let frame = ctx.frame;
    let possible: Vec<&str> = ctx
        .snapshot
        .modules
        .keys()
        .filter(|name| name.as_str() != module)
        .filter(|name| {
            frame
                .locals
                .get(name)
                .or_else(|| frame.globals.get(name))
                .is_some_and(|value| value.has_attribute(attribute))
        })
        .map(String::as_str)
        .collect();
    match possible.as_slice() {
        [] => cause(tr!(
            t,
            "Python tells us that no object with name `{attribute}` is\nfound in module `{module}`.\n",
            attribute = attribute,
            module = module
        )),
        [mod_name] => cause_with_hint(
            tr!(
                t,
                "Perhaps you meant to use the attribute `{attribute}` of \nmodule `{mod_name}` instead of module `{module}`.\n",
                attribute = attribute,
                mod_name = mod_name,
                module = module
            ),
            tr!(t, "Did you mean `{name}`?\n", name = mod_name),
        ),
        several => {
            let names = list_to_string(several, ", ");
            cause_with_hint(
                tr!(
                    t,
                    "Instead of the module `{module}`, perhaps you wanted to use\nthe attribute `{attribute}` of one of the following modules:\n`{names}`.\n",
                    module = module,
                    attribute = attribute,
                    names = names
                ),
                tr!(t, "Did you mean one of the following modules: `{names}`?\n", names = names),
            )
        }
    }
}

fn type_object_attribute(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(caps) = TYPE_OBJECT_ATTRIBUTE.captures(ctx.message) else {
        return Ok(None);
    };
    attribute_error_in_object(ctx, &caps[1], &caps[2])
}

fn none_attribute(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(caps) = OBJECT_ATTRIBUTE.captures(ctx.message) else {
        return Ok(None);
    };
    if &caps[1] != "NoneType" {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "You are attempting to access the attribute `{attr}`\nfor a variable whose value is `None`.\n",
        attr = &caps[2]
    ))
}

fn object_attribute(ctx: &RuntimeContext<'_>) -> AnalyzerResult {
    let Some(caps) = OBJECT_ATTRIBUTE.captures(ctx.message) else {
        return Ok(None);
    };
    attribute_error_in_object(ctx, &caps[1], &caps[2])
}

/// `obj_type` as reported by Python: the class itself for `type object`
/// messages, or the class of an instance.
fn is_of_type(value: &Value, obj_type: &str) -> bool {
    match value {
        Value::Class { name, .. } => name == obj_type,
        other => other.type_name() == obj_type,
    }
}

fn attribute_error_in_object(ctx: &RuntimeContext<'_>, obj_type: &str, attribute: &str) -> AnalyzerResult {
    let t = ctx.t;
    if obj_type == "builtin_function_or_method" {
        return builtin_function_attribute(ctx, attribute);
    }

    let candidates: Vec<FoundObject> = get_all_objects(ctx.bad_line, ctx.frame)
        .into_iter()
        .filter(|found| is_of_type(&found.value, obj_type) && !found.value.has_attribute(attribute))
        .collect();
    let accessed = format!(".{}", attribute);
    let direct = candidates
        .iter()
        .position(|found| ctx.bad_line.contains(&format!("{}{}", found.name, accessed)));
    let found = match (direct, candidates.len()) {
        (Some(index), _) => &candidates[index],
        (None, 0) => {
            let text = tr!(
                t,
                "An object of type `{obj_type}` has no attribute named `{attr}`.\nUnfortunately I cannot find such an object on the line where\nthe problem occurs.\n",
                obj_type = obj_type,
                attr = attribute
            );
            return cause(text + &please_report(t));
        }
        (None, 1) => &candidates[0],
        (None, _) => {
            let names: Vec<&str> = candidates.iter().map(|found| found.name.as_str()).collect();
            return cause(tr!(
                t,
                "An object of type `{obj_type}` has no attribute named `{attr}`.\n\nThe following objects might be the cause of the problem: \n{names}.\n",
                obj_type = obj_type,
                attr = attribute,
                names = names.join(", ")
            ));
        }
    };
    let (obj_name, instance) = (found.name.as_str(), &found.value);

    if let Some(found) = tuple_by_accident(t, instance, obj_name, attribute) {
        return found;
    }

    let known_attributes = instance.attributes();
    if let Some(builtin) = perhaps_builtin(attribute, &known_attributes) {
        return cause_with_hint(
            tr!(
                t,
                "The object `{obj_name}` has no attribute named `{attribute}`.\nPerhaps you can use the Python builtin function `{known_builtin}` instead:\n`{known_builtin}({obj_name})`.\n",
                obj_name = obj_name,
                attribute = attribute,
                known_builtin = builtin
            ),
            tr!(t, "Did you mean `{known_builtin}({obj_name})`?\n", known_builtin = builtin, obj_name = obj_name),
        );
    }

    let iterable = instance.has_attribute("__iter__")
        || (instance.has_attribute("__getitem__") && instance.has_attribute("__len__"));
    if attribute == "join" && iterable {
        return cause_with_hint(
            tr!(
                t,
                "The object `{obj_name}` has no attribute named `join`.\nPerhaps you wanted something like `'...'.join({obj_name})`.\n",
                obj_name = obj_name
            ),
            tr!(t, "Did you mean `'...'.join({obj_name})`?\n", obj_name = obj_name),
        );
    }

    // `this.that` where both are known names: `this, that`.
    if ctx.frame.globals.contains(attribute) || ctx.frame.locals.contains(attribute) {
        return cause_with_hint(
            tr!(
                t,
                "`{second}` is not an attribute of `{first}`.\nHowever, both `{first}` and `{second}` are known objects.\nPerhaps you wrote a period to separate these two objects, \ninstead of using a comma.\n",
                first = obj_name,
                second = attribute
            ),
            tr!(t, "Did you mean to separate object names by a comma?\n"),
        );
    }

    if let Some(synonyms) = perhaps_synonym(attribute, &known_attributes) {
        return use_synonym(t, obj_name, attribute, &synonyms);
    }

    let similar = get_similar_words(attribute, &known_attributes);
    if !similar.is_empty() {
        return attribute_typo(t, obj_name, attribute, &similar);
    }

    let mut text = tr!(t, "The object `{obj}` has no attribute named `{attr}`.\n", obj = obj_name, attr = attribute);
    if matches!(instance, Value::Object { slots: true, .. }) {
        text.push_str(&tr!(
            t,
            "Note that object `{obj}` uses `__slots__` which prevents\nthe creation of new attributes.\n",
            obj = obj_name
        ));
    }
    let mut public: Vec<&str> =
        known_attributes.iter().map(String::as_str).filter(|name| !name.contains("__")).collect();
    if public.len() > 10 {
        public.truncate(9);
        public.push("...");
    }
    if !public.is_empty() {
        text.push_str(&tr!(
            t,
            "The following are some of its known attributes:\n`{names}`.\n",
            names = public.join(", ")
        ));
    }
    cause(text)
}

/// `len.x` instead of `len(x)`.
fn builtin_function_attribute(ctx: &RuntimeContext<'_>, attribute: &str) -> AnalyzerResult {
    let t = ctx.t;
    let obj_name = ctx.bad_line.replace(&format!(".{}", attribute), "");
    let obj_name = obj_name.trim();
    if ctx.frame.is_builtin(obj_name) {
        return cause_with_hint(
            tr!(
                t,
                "`{obj_name}` is a function. Perhaps you meant to write\n`{obj_name}({attribute})`\n",
                obj_name = obj_name,
                attribute = attribute
            ),
            tr!(t, "Did you mean `{obj_name}({attribute})`?\n", obj_name = obj_name, attribute = attribute),
        );
    }
    cause(tr!(
        t,
        "`{obj_name}` is a Python built-in function or method\nwhich does not have an attribute named `{attribute}`.\n",
        obj_name = obj_name,
        attribute = attribute
    ))
}

/// `a = 1,` makes a one-item tuple whose item has the attribute.
fn tuple_by_accident(t: &Translator, obj: &Value, obj_name: &str, attribute: &str) -> Option<AnalyzerResult> {
    let Value::Tuple { items } = obj else {
        return None;
    };
    let [item] = items.as_slice() else {
        return None;
    };
    if !item.has_attribute(attribute) {
        return None;
    }
    Some(cause_with_hint(
        tr!(
            t,
            "`{obj_name}` is a tuple that contains a single item\nwhich does have `'{attribute}'` as an attribute.\nPerhaps you added a trailing comma by mistake at the end of the line\nwhere you defined `{obj_name}`.\n",
            obj_name = obj_name,
            attribute = attribute
        ),
        tr!(t, "Did you write a comma by mistake?\n"),
    ))
}

fn perhaps_builtin(attribute: &str, known_attributes: &[String]) -> Option<&'static str> {
    match attribute {
        "min" => Some("min"),
        "max" => Some("max"),
        "sorted" => Some("sorted"),
        "reversed" => Some("reversed"),
        "sum" => Some("sum"),
        "len" | "length" | "lenght" | "size" if known_attributes.iter().any(|a| a == "__len__") => Some("len"),
        _ => None,
    }
}

fn perhaps_synonym(attribute: &str, known_attributes: &[String]) -> Option<Vec<&'static str>> {
    let group = SYNONYMS.iter().find(|group| group.contains(&attribute))?;
    let present: Vec<&'static str> =
        group.iter().copied().filter(|syn| known_attributes.iter().any(|a| a == syn)).collect();
    (!present.is_empty()).then_some(present)
}

fn use_synonym(t: &Translator, obj_name: &str, attribute: &str, synonyms: &[&str]) -> AnalyzerResult {
    let mut text =
        tr!(t, "The object `{name}` has no attribute named `{attribute}`.\n", name = obj_name, attribute = attribute);
    if let [only] = synonyms {
        text.push_str(&tr!(
            t,
            "However, `{attr}` is an attribute of `{name}` with a similar meaning.\n",
            attr = only,
            name = obj_name
        ));
    } else {
        text.push_str(&tr!(
            t,
            "However, `{name}` has the following attributes with similar meanings:\n`{attributes}`.\n",
            name = obj_name,
            attributes = list_to_string(synonyms, ", ")
        ));
    }
    cause_with_hint(text, tr!(t, "Did you mean `{attr}`?\n", attr = synonyms[0]))
}

fn attribute_typo(t: &Translator, obj_name: &str, attribute: &str, similar: &[String]) -> AnalyzerResult {
    let mut text = tr!(
        t,
        "The object `{obj_name}` has no attribute named `{attribute}`.\n",
        obj_name = obj_name,
        attribute = attribute
    );
    let hint = if let [correct] = similar {
        text.push_str(&tr!(
            t,
            "Perhaps you meant to write `{obj}.{correct}` instead of `{obj}.{typo}`\n",
            obj = obj_name,
            correct = correct,
            typo = attribute
        ));
        tr!(t, "Did you mean `{name}`?\n", name = correct)
    } else {
        let names = list_to_string(similar, ", ");
        text.push_str(&tr!(
            t,
            "Instead of writing `{obj}.{typo}`, perhaps you meant to write one of \nthe following names which are attributes of object `{obj}`:\n`{names}`\n",
            obj = obj_name,
            typo = attribute,
            names = names
        ));
        tr!(t, "Did you mean one of the following: `{names}`?\n", names = names)
    };
    cause_with_hint(text, hint)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{explain, raised_on};
    use crate::analysis::registry::Registry;
    use crate::locale::Translator;
    use crate::snapshot::{Frame, Value};

    fn numbers() -> Value {
        Value::list(vec![Value::int(1), Value::int(2)])
    }

    #[test]
    fn test_list_typo() {
        let frame = Frame::new("", 1).with_global("a", numbers());
        let (name, text, hint) = explain("AttributeError", "'list' object has no attribute 'apend'", "a.apend(3)", frame);
        assert_eq!(name, Some("object_attribute"));
        assert_eq!(
            text,
            "The object `a` has no attribute named `apend`.\nPerhaps you meant to write `a.append` instead of `a.apend`\n"
        );
        assert_eq!(hint.as_deref(), Some("Did you mean `append`?\n"));
    }

    #[test]
    fn test_synonym() {
        let frame = Frame::new("", 1).with_global("a", numbers());
        let (_, text, hint) = explain("AttributeError", "'list' object has no attribute 'push'", "a.push(3)", frame);
        assert!(text.contains("has the following attributes with similar meanings:\n`append, extend, insert`.\n"));
        assert_eq!(hint.as_deref(), Some("Did you mean `append`?\n"));
    }

    #[test]
    fn test_single_synonym_names_the_attribute() {
        let frame = Frame::new("", 1).with_global("s", Value::object("Stack", &["push", "__len__"]));
        let (_, text, _) = explain("AttributeError", "'Stack' object has no attribute 'add'", "s.add(1)", frame);
        assert!(text.contains("However, `push` is an attribute of `s` with a similar meaning.\n"));
    }

    #[test]
    fn test_builtin_instead_of_method() {
        let frame = Frame::new("", 1).with_global("a", numbers());
        let (_, _, hint) = explain("AttributeError", "'list' object has no attribute 'length'", "n = a.length", frame);
        assert_eq!(hint.as_deref(), Some("Did you mean `len(a)`?\n"));
    }

    #[test]
    fn test_tuple_by_accident() {
        let frame = Frame::new("", 1).with_global("a", Value::tuple(vec![numbers()]));
        let (_, _, hint) = explain("AttributeError", "'tuple' object has no attribute 'append'", "a.append(3)", frame);
        assert_eq!(hint.as_deref(), Some("Did you write a comma by mistake?\n"));
    }

    #[test]
    fn test_period_instead_of_comma() {
        let frame = Frame::new("", 1).with_global("a", Value::int(1)).with_global("b", Value::int(2));
        let (_, text, hint) = explain("AttributeError", "'int' object has no attribute 'b'", "print(a.b)", frame);
        assert!(text.starts_with("`b` is not an attribute of `a`.\n"));
        assert_eq!(hint.as_deref(), Some("Did you mean to separate object names by a comma?\n"));
    }

    #[test]
    fn test_none_attribute() {
        let frame = Frame::new("", 1).with_global("a", Value::None);
        let (name, text, _) = explain("AttributeError", "'NoneType' object has no attribute 'x'", "a.x", frame);
        assert_eq!(name, Some("none_attribute"));
        assert!(text.ends_with("for a variable whose value is `None`.\n"));
    }

    #[test]
    fn test_builtin_function_attribute() {
        let message = "'builtin_function_or_method' object has no attribute 'a'";
        let (_, _, hint) = explain("AttributeError", message, "len.a", Frame::new("", 1));
        assert_eq!(hint.as_deref(), Some("Did you mean `len(a)`?\n"));
    }

    #[test]
    fn test_module_attribute_typo() {
        let frame = Frame::new("", 1).with_global("math", Value::module("math", &["pi", "tau"]));
        let (snapshot, cache) = raised_on("AttributeError", "module 'math' has no attribute 'pie'", "math.pie", frame);
        let snapshot = snapshot.with_module("math", Value::module("math", &["pi", "tau"]));
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert_eq!(diagnosis.analyzer, Some("module_attribute"));
        assert_eq!(diagnosis.entry.cause, "Perhaps you meant to write `math.pi` instead of `math.pie`\n");
    }

    #[test]
    fn test_shadowed_stdlib_module() {
        let module = Value::Module {
            name: "random".to_string(),
            attributes: vec!["my_function".to_string()],
            file: Some("/home/user/project/random.py".to_string()),
        };
        let frame = Frame::new("", 1).with_global("random", module.clone());
        let message = "module 'random' has no attribute 'randint'";
        let (snapshot, cache) = raised_on("AttributeError", message, "random.randint(1, 6)", frame);
        let snapshot = snapshot.with_module("random", module);
        let diagnosis = Registry::builtin().diagnose_with(&snapshot, &Translator::english(), &cache);
        assert!(diagnosis.entry.cause.starts_with("You imported a module named `random` from `/home/user/project/random.py`."));
    }

    #[test]
    fn test_stdlib_name_clash_while_importing() {
        let message = "partially initialized module 'turtle' has no attribute 'forward' (most likely due to a circular import)";
        let (_, _, hint) = explain("AttributeError", message, "turtle.forward(10)", Frame::new("", 1));
        assert_eq!(hint.as_deref(), Some("Did you give your program the same name as a Python module?\n"));
    }

    #[test]
    fn test_slots_noted() {
        let obj = Value::Object {
            type_name: "Point".to_string(),
            repr: "<Point>".to_string(),
            attributes: vec!["x".to_string(), "y".to_string()],
            length: None,
            slots: true,
        };
        let frame = Frame::new("", 1).with_global("p", obj);
        let (_, text, _) = explain("AttributeError", "'Point' object has no attribute 'zzz'", "p.zzz = 3", frame);
        assert!(text.contains("uses `__slots__`"));
        assert!(text.ends_with("The following are some of its known attributes:\n`x, y`.\n"));
    }
}
