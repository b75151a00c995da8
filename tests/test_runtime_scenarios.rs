use pyexplain::{
    Assembler, ExceptionSnapshot, ExplanationMap, Frame, Handled, Section, SourceCache, Translator, Value,
};

fn explain_with(cache: &SourceCache, snapshot: &ExceptionSnapshot) -> ExplanationMap {
    let t = Translator::english();
    match Assembler::new(&t, cache).explain(snapshot) {
        Handled::Explained(map) => map,
        Handled::Propagate(_) => panic!("{} should be explained", snapshot.type_name),
    }
}

#[test]
fn test_misspelled_name() {
    let cache = SourceCache::new();
    cache.add("<names>", "foo2 = 1\nprint(foo)\n");
    let snapshot = ExceptionSnapshot::new("NameError", "name 'foo' is not defined")
        .with_frame(Frame::new("<names>", 2).with_global("foo2", Value::int(1)));
    let map = explain_with(&cache, &snapshot);

    assert_eq!(map.get(Section::Message), Some("NameError: name 'foo' is not defined\n"));
    assert!(map
        .get(Section::Cause)
        .unwrap()
        .starts_with("In your program, no object with the name `foo` exists.\n"));
    assert_eq!(map.get(Section::Suggest), Some("Did you mean `foo2`?\n"));
    assert_eq!(
        map.get(Section::ExceptionRaisedHeader),
        Some("Exception raised on line 2 of file '<names>'.\n")
    );
    assert!(map.get(Section::ExceptionRaisedSource).unwrap().contains("-->2: print(foo)"));
}

#[test]
fn test_equally_close_names_suggest_the_local_one() {
    let cache = SourceCache::new();
    cache.add("<scopes>", "def f():\n    foo1 = 1\n    print(foo)\n");
    let snapshot = ExceptionSnapshot::new("NameError", "name 'foo' is not defined").with_frame(
        Frame::new("<scopes>", 3)
            .in_function("f")
            .with_local("foo1", Value::int(1))
            .with_global("foo2", Value::int(2)),
    );
    let map = explain_with(&cache, &snapshot);

    assert_eq!(map.get(Section::Suggest), Some("Did you mean `foo1`?\n"));
}

#[test]
fn test_literal_division_by_zero() {
    let cache = SourceCache::new();
    cache.add("<literal>", "1 / 0\n");
    let snapshot = ExceptionSnapshot::new("ZeroDivisionError", "division by zero").with_frame(Frame::new("<literal>", 1));
    let map = explain_with(&cache, &snapshot);

    assert_eq!(map.get(Section::Cause), Some("You are dividing by zero.\n"));
    assert!(!map.contains(Section::Suggest));
    assert!(!map.contains(Section::LastCallHeader));
}

#[test]
fn test_division_by_variable() {
    let cache = SourceCache::new();
    cache.add("<variable>", "x = 0\n1 / x\n");
    let snapshot = ExceptionSnapshot::new("ZeroDivisionError", "division by zero")
        .with_frame(Frame::new("<variable>", 2).with_global("x", Value::int(0)));
    let map = explain_with(&cache, &snapshot);

    assert_eq!(
        map.get(Section::Cause),
        Some("You are dividing by the following term\n\n    x\n\nwhich is equal to zero.\n")
    );
    assert_eq!(map.get(Section::ExceptionRaisedVariables), Some("    x: 0\n"));
}

#[test]
fn test_similar_dict_key() {
    let cache = SourceCache::new();
    cache.add("<ages>", "ages = {'Alice': 22}\nprint(ages['Alise'])\n");
    let ages = Value::dict(vec![(Value::str("Alice"), Value::int(22))]);
    let snapshot = ExceptionSnapshot::new("KeyError", "'Alise'")
        .with_args(vec![Value::str("Alise")])
        .with_frame(Frame::new("<ages>", 2).with_global("ages", ages));
    let map = explain_with(&cache, &snapshot);

    assert_eq!(map.get(Section::Suggest), Some("Did you mean `'Alice'`?\n"));
    assert!(map.get(Section::Cause).unwrap().contains("cannot be found in the dict `ages`"));
}

#[test]
fn test_snapshot_from_json() {
    let cache = SourceCache::new();
    cache.add("<json>", "foo2 = 1\nprint(foo)\n");
    let snapshot = ExceptionSnapshot::new("NameError", "name 'foo' is not defined")
        .with_frame(Frame::new("<json>", 2).with_global("foo2", Value::int(1)));
    let restored = ExceptionSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

    assert_eq!(restored, snapshot);
    assert_eq!(explain_with(&cache, &restored), explain_with(&cache, &snapshot));
}

#[test]
fn test_unknown_exception_type() {
    let cache = SourceCache::new();
    cache.add("<custom>", "raise Oops('no')\n");
    let snapshot = ExceptionSnapshot::new("Oops", "no").with_frame(Frame::new("<custom>", 1));
    let map = explain_with(&cache, &snapshot);

    assert!(map.get(Section::Generic).unwrap().contains("No information is known about this exception."));
    assert!(!map.contains(Section::CauseHeader));
}
