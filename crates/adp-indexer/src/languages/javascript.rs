//! JavaScript and TypeScript: `//` line comments, `/* */` blocks

use std::sync::LazyLock;

use adp_core::CodeScope;

use super::{CommentGrammar, StringQuote, C_STYLE_BLOCKS};

const SCOPE_PATTERNS: &[(&str, CodeScope)] = &[
    (
        r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(?P<name>\w+)",
        CodeScope::Class,
    ),
    (
        r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(?P<name>\w*)\s*(?:<[^>]*>)?\s*\(",
        CodeScope::Function,
    ),
    // const handler = async (req) => ...
    (
        r"^\s*(?:export\s+)?(?:const|let|var)\s+(?P<name>\w+)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]+)?=>|\w+\s*=>)",
        CodeScope::Function,
    ),
    (
        r"^\s*(?:(?:public|private|protected|static|async|readonly|override|abstract|get|set)\s+)*\*?(?P<name>\w+)\s*(?:<[^>]*>)?\s*\([^)]*\)\s*(?::\s*[^{]+)?\{",
        CodeScope::Method,
    ),
];

/// Control-flow keywords that look like `name(...) {`.
const REJECT: &[&str] = &["if", "for", "while", "switch", "catch", "return", "else", "do", "with"];

const STRINGS: &[StringQuote] = &[
    StringQuote { quote: '"', multiline: false },
    StringQuote { quote: '\'', multiline: false },
    StringQuote { quote: '`', multiline: true },
];

pub static GRAMMAR: LazyLock<CommentGrammar> = LazyLock::new(|| {
    CommentGrammar::new("//", C_STYLE_BLOCKS, Some('*'), SCOPE_PATTERNS, REJECT).with_strings(STRINGS)
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_lines() {
        assert_eq!(GRAMMAR.scope_of_line("export class Cart {"), Some(CodeScope::Class));
        assert_eq!(GRAMMAR.scope_of_line("export async function load(id) {"), Some(CodeScope::Function));
        assert_eq!(GRAMMAR.scope_of_line("const total = (items) => {"), Some(CodeScope::Function));
        assert_eq!(GRAMMAR.scope_of_line("export const pick = async x => x.id;"), Some(CodeScope::Function));
        assert_eq!(GRAMMAR.scope_of_line("  async checkout(cart: Cart): Promise<void> {"), Some(CodeScope::Method));
        assert_eq!(GRAMMAR.scope_of_line("  render() {"), Some(CodeScope::Method));
    }

    #[test]
    fn test_control_flow_is_not_a_method() {
        assert_eq!(GRAMMAR.scope_of_line("  if (ready) {"), None);
        assert_eq!(GRAMMAR.scope_of_line("  for (const x of xs) {"), None);
        assert_eq!(GRAMMAR.scope_of_line("  } catch (e) {"), None);
        assert_eq!(GRAMMAR.scope_of_line("const limit = 10;"), None);
    }
}
