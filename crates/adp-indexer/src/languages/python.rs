//! Python: `#` line comments, `"""` / `'''` docstring blocks

use std::sync::LazyLock;

use adp_core::CodeScope;

use super::{BlockDelimiters, CommentGrammar};

const BLOCKS: &[BlockDelimiters] = &[
    BlockDelimiters { open: "\"\"\"", close: "\"\"\"" },
    BlockDelimiters { open: "'''", close: "'''" },
];

/// Checked in order; the first match wins.
const SCOPE_PATTERNS: &[(&str, CodeScope)] = &[
    (r"^\s*class\s+(?P<name>\w+)", CodeScope::Class),
    (r"^\s+(?:async\s+)?def\s+(?P<name>\w+)\s*\(\s*(?:self|cls)\b", CodeScope::Method),
    (r"^\s*(?:async\s+)?def\s+(?P<name>\w+)", CodeScope::Function),
];

pub static GRAMMAR: LazyLock<CommentGrammar> =
    LazyLock::new(|| CommentGrammar::new("#", BLOCKS, None, SCOPE_PATTERNS, &[]));
