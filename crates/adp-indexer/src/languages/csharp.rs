//! C#: `//` and `///` line comments, `/* */` blocks

use std::sync::LazyLock;

use adp_core::CodeScope;

use super::{CommentGrammar, C_STYLE_BLOCKS};

const SCOPE_PATTERNS: &[(&str, CodeScope)] = &[
    (
        r"^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|abstract|sealed|partial|readonly|unsafe|new)\s+)*(?:record\s+)?(?:class|interface|enum|struct|record)\s+(?P<name>\w+)",
        CodeScope::Class,
    ),
    (
        r"^\s*(?:(?:public|private|protected|internal|static|virtual|override|abstract|sealed|async|extern|unsafe|new|partial)\s+)*[\w.\[\]<>?,]+\s+(?P<name>\w+)\s*(?:<[^>]+>)?\s*\(",
        CodeScope::Method,
    ),
];

const REJECT: &[&str] = &[
    "return", "new", "throw", "else", "if", "for", "foreach", "while", "switch", "catch", "case", "await",
    "using", "lock", "yield", "var",
];

pub static GRAMMAR: LazyLock<CommentGrammar> =
    LazyLock::new(|| CommentGrammar::new("//", C_STYLE_BLOCKS, Some('*'), SCOPE_PATTERNS, REJECT));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_lines() {
        assert_eq!(GRAMMAR.scope_of_line("public sealed partial class OrderService"), Some(CodeScope::Class));
        assert_eq!(GRAMMAR.scope_of_line("internal record struct Point(int X, int Y);"), Some(CodeScope::Class));
        assert_eq!(
            GRAMMAR.scope_of_line("    public async Task<Order> PlaceAsync(Cart cart)"),
            Some(CodeScope::Method)
        );
    }

    #[test]
    fn test_statements_are_not_methods() {
        assert_eq!(GRAMMAR.scope_of_line("        await client.SendAsync(request);"), None);
        assert_eq!(GRAMMAR.scope_of_line("        var order = Build(cart);"), None);
        assert_eq!(GRAMMAR.scope_of_line("        return Task.FromResult(x);"), None);
    }
}
