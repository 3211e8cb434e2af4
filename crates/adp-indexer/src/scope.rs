//! Line-based scope inference for annotation blocks

use adp_core::CodeScope;

use crate::languages::CommentGrammar;

/// Annotations starting on one of the first lines describe the whole file.
pub const FILE_SCOPE_LINES: u32 = 5;

/// Scope of a block whose comment spans `comment_line..=end_line` (1-based).
///
/// Scans forward from the line after the comment for the first definition
/// line; reaching end of file means file scope.
pub fn infer_scope(lines: &[&str], comment_line: u32, end_line: u32, grammar: &CommentGrammar) -> CodeScope {
    if comment_line <= FILE_SCOPE_LINES {
        return CodeScope::File;
    }

    lines
        .iter()
        .skip(end_line as usize)
        .find_map(|line| grammar.scope_of_line(line))
        .unwrap_or(CodeScope::File)
}
