//! `IndentationError` and `TabError`.

use super::cause;
use crate::analysis::registry::Registry;
use crate::analysis::{AnalyzerResult, SyntaxContext};
use crate::tokens::remove_meaningless_tokens;
use crate::tr;

pub fn register(registry: &mut Registry) {
    registry
        .add_indentation("tab_error", tab_error)
        .add_indentation("indentation_error", indentation_error);
}

fn tab_error(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    if ctx.type_name != "TabError" {
        return Ok(None);
    }
    cause(tr!(
        ctx.t,
        "The line identified above is indented with a mix of\ntab characters and spaces that does not match the lines before it.\n"
    ))
}

fn indentation_error(ctx: &SyntaxContext<'_>) -> AnalyzerResult {
    let t = ctx.t;
    let statement = ctx.statement;
    let mut this_case = if ctx.message.contains("unexpected indent") {
        tr!(t, "The line identified above is more indented than expected.\n")
    } else if ctx.message.contains("expected an indented block") {
        tr!(t, "The line identified above\nwas expected to begin a new indented block.\n")
    } else {
        tr!(t, "The line identified above is less indented than expected.\n")
    };

    let single_string = statement.tokens.len() == 1 && statement.tokens[0].is_string();
    if single_string && statement.all_statements.len() > 1 {
        let previous = remove_meaningless_tokens(&statement.all_statements[statement.all_statements.len() - 2]);
        if previous.len() == 1 && previous[0].is_string() {
            let number = statement.linenumber.unwrap_or_default();
            this_case.push('\n');
            this_case.push_str(&tr!(
                t,
                "However, line {number}, which is identified as having a problem,\nconsists of a single string which is also the case\nfor the preceding line.\nPerhaps you meant to include a continuation character, `\\`,\nat the end of line {preceding}.\n",
                number = number,
                preceding = number.saturating_sub(1)
            ));
        }
    }
    cause(this_case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Translator;
    use crate::snapshot::SyntaxDetails;
    use crate::statement::Statement;

    fn run(type_name: &str, message: &str, source: &str, line: usize) -> String {
        let t = Translator::english();
        let lines: Vec<String> = source.split_inclusive('\n').map(str::to_string).collect();
        let details = SyntaxDetails::new("<string>", line, 1);
        let bad_line = lines[line - 1].clone();
        let statement = Statement::new(&details, message, &bad_line, lines);
        let ctx = SyntaxContext { statement: &statement, message, type_name, t: &t };
        let mut registry = Registry::empty();
        register(&mut registry);
        registry.diagnose_syntax(&ctx).entry.cause
    }

    #[test]
    fn test_unexpected_indent() {
        let text = run("IndentationError", "unexpected indent", "x = 1\n    y = 2\n", 2);
        assert_eq!(text, "The line identified above is more indented than expected.\n");
    }

    #[test]
    fn test_expected_block() {
        let text = run("IndentationError", "expected an indented block", "if True:\npass\n", 2);
        assert!(text.contains("was expected to begin a new indented block"));
    }

    #[test]
    fn test_consecutive_strings() {
        let text = run("IndentationError", "unexpected indent", "\"first\"\n    \"second\"\n", 2);
        assert!(text.starts_with("The line identified above is more indented"));
        assert!(text.contains("consists of a single string"));
        assert!(text.ends_with("at the end of line 1.\n"));
    }

    #[test]
    fn test_tab_error() {
        let text = run("TabError", "inconsistent use of tabs and spaces in indentation", "if x:\n\ty\n", 2);
        assert!(text.contains("tab characters"));
    }
}
