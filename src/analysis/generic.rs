//! What an exception type means, independently of the code that raised it.

use crate::locale::{no_information, Translator};
use crate::snapshot::ExceptionSnapshot;
use crate::tr;

fn describe(t: &Translator, type_name: &str) -> Option<String> {
    let text = match type_name {
        "ArithmeticError" => tr!(t, "`ArithmeticError` is the base class for those built-in exceptions\nthat are raised for various arithmetic errors.\nIt is unusual that you are seeing this exception;\nnormally, a more specific exception should have been raised.\n"),
        "AttributeError" => tr!(t, "An `AttributeError` occurs when the code contains something like\n    `object.x`\nand `x` is not a method or attribute (variable) belonging to `object`.\n"),
        "FileNotFoundError" => tr!(t, "A `FileNotFoundError` exception indicates that you\nare trying to open a file that cannot be found by Python.\nThis could be because you misspelled the name of the file.\n"),
        "ImportError" => tr!(t, "An `ImportError` exception indicates that a certain object could not\nbe imported from a module or package. Most often, this is\nbecause the name of the object is not spelled correctly.\n"),
        "IndentationError" => tr!(t, "An `IndentationError` occurs when a given line of code is\nnot indented (aligned vertically with other lines) as expected.\n"),
        "IndexError" => tr!(t, "An `IndexError` occurs when you are try to get an item from a list,\na tuple, or a similar object (sequence), by using an index which\ndoes not exists; typically, this is because the index you give\nis greater than the length of the sequence.\n"),
        "KeyError" => tr!(t, "A `KeyError` is raised when a value is not found as a\nkey in a Python dict.\n"),
        "LookupError" => tr!(t, "`LookupError` is the base class for the exceptions that are raised\nwhen a key or index used on a mapping or sequence is invalid.\nIt can also be raised directly by codecs.lookup().\n"),
        "ModuleNotFoundError" => tr!(t, "A `ModuleNotFoundError` exception indicates that you\nare trying to import a module that cannot be found by Python.\nThis could be because you misspelled the name of the module\nor because it is not installed on your computer.\n"),
        "NameError" => tr!(t, "A `NameError` exception indicates that a variable or\nfunction name is not known to Python.\nMost often, this is because there is a spelling mistake.\nHowever, sometimes it is because the name is used\nbefore being defined or given a value.\n"),
        "OverflowError" => tr!(t, "An `OverflowError` is raised when the result of an arithmetic operation\nis too large to be handled by the computer's processor.\n"),
        "RecursionError" => tr!(t, "A `RecursionError` is raised when a function calls itself,\ndirectly or indirectly, too many times.\nIt almost always indicates that you made an error in your code\nand that your program would never stop.\n"),
        "SyntaxError" => tr!(t, "A `SyntaxError` occurs when Python cannot understand your code.\n"),
        "TabError" => tr!(t, "A `TabError` indicates that you have used both spaces\nand tab characters to indent your code.\nThis is not allowed in Python.\nIndenting your code means to have block of codes aligned vertically\nby inserting either spaces or tab characters at the beginning of lines.\nPython's recommendation is to always use spaces to indent your code.\n"),
        "TypeError" => tr!(t, "A `TypeError` is usually caused by trying\nto combine two incompatible types of objects,\nby calling a function with the wrong type of object,\nor by trying to do an operation not allowed on a given type of object.\n"),
        "ValueError" => tr!(t, "A `ValueError` indicates that a function or an operation\nreceived an argument of the right type, but an inappropriate value.\n"),
        "UnboundLocalError" => tr!(t, "In Python, variables that are used inside a function are known as \nlocal variables. Before they are used, they must be assigned a value.\nA variable that is used before it is assigned a value is assumed to\nbe defined outside that function; it is known as a `global`\n(or sometimes `nonlocal`) variable. You cannot assign a value to such\na global variable inside a function without first indicating to\nPython that this is a global variable, otherwise you will see\nan `UnboundLocalError`.\n"),
        "ZeroDivisionError" => tr!(t, "A `ZeroDivisionError` occurs when you are attempting to divide a value\nby zero either directly or by using some other mathematical operation.\n"),
        _ => return None,
    };
    Some(text)
}

/// Generic description of the exception: its own type first, then the
/// nearest described base class.
pub fn generic_explanation(t: &Translator, snapshot: &ExceptionSnapshot) -> String {
    let lineage = std::iter::once(&snapshot.type_name).chain(&snapshot.bases);
    for type_name in lineage {
        if let Some(text) = describe(t, type_name) {
            return text;
        }
    }
    if snapshot.type_name.ends_with("Warning") {
        return tr!(t, "No information is available about this warning.\n");
    }
    no_information(t)
}
