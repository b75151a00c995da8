use crate::locale::Translator;
use crate::tokens::Token;
use crate::tr;

/// Number of tokens whose text is `text`.
pub fn count_char(tokens: &[Token], text: &str) -> usize {
    tokens.iter().filter(|tok| tok.text == text).count()
}

/// Every kind of opening bracket has as many closing counterparts.
pub fn no_unclosed_brackets(tokens: &[Token]) -> bool {
    [("(", ")"), ("[", "]"), ("{", "}")]
        .iter()
        .all(|(bra, ket)| count_char(tokens, bra) == count_char(tokens, ket))
}

pub fn matching_brackets(bra: &str, ket: &str) -> bool {
    matches!((bra, ket), ("(", ")") | ("[", "]") | ("{", "}"))
}

/// Closing bracket for `bra`.
pub fn closing_for(bra: &str) -> &'static str {
    match bra {
        "(" => ")",
        "[" => "]",
        _ => "}",
    }
}

/// Human name of a bracket, e.g. "square bracket `[`".
pub fn name_bracket(t: &Translator, bracket: &str) -> String {
    match bracket {
        "(" => tr!(t, "parenthesis `(`"),
        ")" => tr!(t, "parenthesis `)`"),
        "[" => tr!(t, "square bracket `[`"),
        "]" => tr!(t, "square bracket `]`"),
        "{" => tr!(t, "curly bracket `{`"),
        _ => tr!(t, "curly bracket `}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::tokenize;

    #[test]
    fn test_unclosed() {
        assert!(no_unclosed_brackets(&tokenize("f(a[1], {2: 3})")));
        assert!(!no_unclosed_brackets(&tokenize("f(a[1]")));
    }

    #[test]
    fn test_names() {
        let t = Translator::english();
        assert_eq!(name_bracket(&t, "["), "square bracket `[`");
        assert_eq!(name_bracket(&t, "}"), "curly bracket `}`");
        assert!(matching_brackets("{", "}"));
        assert!(!matching_brackets("(", "]"));
        assert_eq!(closing_for("["), "]");
    }
}
