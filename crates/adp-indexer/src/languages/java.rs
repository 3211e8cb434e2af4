//! Java: `//` line comments, `/* */` and `/** */` blocks

use std::sync::LazyLock;

use adp_core::CodeScope;

use super::{CommentGrammar, C_STYLE_BLOCKS};

const SCOPE_PATTERNS: &[(&str, CodeScope)] = &[
    (
        r"^\s*(?:@\w+(?:\([^)]*\))?\s+)*(?:(?:public|private|protected|static|abstract|final|sealed|strictfp)\s+)*(?:class|interface|enum|record|@interface)\s+(?P<name>\w+)",
        CodeScope::Class,
    ),
    (
        r"^\s*(?:(?:public|private|protected|static|final|abstract|synchronized|native|default|strictfp)\s+)*(?:<[^>]+>\s+)?[\w.\[\]<>?,]+\s+(?P<name>\w+)\s*\(",
        CodeScope::Method,
    ),
];

/// Statement keywords that can precede `name(`.
const REJECT: &[&str] = &[
    "return", "new", "throw", "else", "if", "for", "while", "switch", "catch", "case", "yield", "assert",
];

pub static GRAMMAR: LazyLock<CommentGrammar> =
    LazyLock::new(|| CommentGrammar::new("//", C_STYLE_BLOCKS, Some('*'), SCOPE_PATTERNS, REJECT));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_lines() {
        assert_eq!(GRAMMAR.scope_of_line("public final class Ledger {"), Some(CodeScope::Class));
        assert_eq!(GRAMMAR.scope_of_line("interface Store<T> {"), Some(CodeScope::Class));
        assert_eq!(
            GRAMMAR.scope_of_line("    public static List<String> names(int limit) {"),
            Some(CodeScope::Method)
        );
        assert_eq!(GRAMMAR.scope_of_line("    void run() {"), Some(CodeScope::Method));
    }

    #[test]
    fn test_statements_are_not_methods() {
        assert_eq!(GRAMMAR.scope_of_line("        return compute(x);"), None);
        assert_eq!(GRAMMAR.scope_of_line("        throw new IllegalStateException(msg);"), None);
        assert_eq!(GRAMMAR.scope_of_line("        int total = sum(values);"), None);
        assert_eq!(GRAMMAR.scope_of_line("        } else if (x) {"), None);
    }
}
