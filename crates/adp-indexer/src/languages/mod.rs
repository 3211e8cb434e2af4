//! Comment grammars for the supported languages

pub mod csharp;
pub mod java;
pub mod javascript;
pub mod python;

use std::fmt;
use std::path::Path;

use adp_core::CodeScope;
use regex::Regex;

/// Tag that introduces an annotation payload inside a comment.
pub const METADATA_TAG: &str = "@ai-metadata";

/// Languages the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    CSharp,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::CSharp,
    ];

    /// Get the language for a file based on its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Language::Python),
            "js" | "jsx" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "java" => Some(Language::Java),
            "cs" => Some(Language::CSharp),
            _ => None,
        }
    }

    /// Resolve a short language tag such as `py` or `cs`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "py" | "python" => Some(Language::Python),
            "js" | "javascript" => Some(Language::JavaScript),
            "ts" | "typescript" => Some(Language::TypeScript),
            "java" => Some(Language::Java),
            "cs" | "csharp" | "c#" => Some(Language::CSharp),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::JavaScript => "js",
            Language::TypeScript => "ts",
            Language::Java => "java",
            Language::CSharp => "cs",
        }
    }

    pub fn grammar(&self) -> &'static CommentGrammar {
        match self {
            Language::Python => &*python::GRAMMAR,
            Language::JavaScript | Language::TypeScript => &*javascript::GRAMMAR,
            Language::Java => &*java::GRAMMAR,
            Language::CSharp => &*csharp::GRAMMAR,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Opening and closing token of a block comment.
#[derive(Debug, Clone, Copy)]
pub struct BlockDelimiters {
    pub open: &'static str,
    pub close: &'static str,
}

/// Quote character of a string literal.
#[derive(Debug, Clone, Copy)]
pub struct StringQuote {
    pub quote: char,
    /// Literal may continue past a newline (JS template strings).
    pub multiline: bool,
}

pub(crate) const PLAIN_STRINGS: &[StringQuote] = &[
    StringQuote { quote: '"', multiline: false },
    StringQuote { quote: '\'', multiline: false },
];

/// A definition-line pattern and the scope it marks.
#[derive(Debug)]
struct ScopeRule {
    pattern: Regex,
    scope: CodeScope,
}

/// Comment syntax and definition patterns of one language family.
#[derive(Debug)]
pub struct CommentGrammar {
    pub line_marker: &'static str,
    pub blocks: &'static [BlockDelimiters],
    /// Leading character of continuation lines in doc blocks (` * ...`).
    pub decoration: Option<char>,
    /// String literals whose content never opens a comment.
    pub strings: &'static [StringQuote],
    line_pattern: Regex,
    rules: Vec<ScopeRule>,
    reject: &'static [&'static str],
}

impl CommentGrammar {
    /// Patterns must contain a `name` group when `reject` is non-empty.
    pub(crate) fn new(
        line_marker: &'static str,
        blocks: &'static [BlockDelimiters],
        decoration: Option<char>,
        rules: &[(&str, CodeScope)],
        reject: &'static [&'static str],
    ) -> Self {
        let line_pattern = Regex::new(&format!(
            r"{}[ \t]*{}[ \t]*(\{{[^\r\n]*)",
            regex::escape(line_marker),
            regex::escape(METADATA_TAG)
        ))
        .expect("line comment pattern compiles");

        let rules = rules
            .iter()
            .map(|(pattern, scope)| ScopeRule {
                pattern: Regex::new(pattern).expect("scope pattern compiles"),
                scope: *scope,
            })
            .collect();

        CommentGrammar {
            line_marker,
            blocks,
            decoration,
            strings: PLAIN_STRINGS,
            line_pattern,
            rules,
            reject,
        }
    }

    pub(crate) fn with_strings(mut self, strings: &'static [StringQuote]) -> Self {
        self.strings = strings;
        self
    }

    /// `marker + tag + {...}` matches; group 1 is the payload through end of line.
    pub fn line_pattern(&self) -> &Regex {
        &self.line_pattern
    }

    /// Scope declared by a definition line, if the line is one.
    pub fn scope_of_line(&self, line: &str) -> Option<CodeScope> {
        let first_word = line
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .find(|w| !w.is_empty())?;
        if self.reject.contains(&first_word) {
            return None;
        }

        self.rules.iter().find_map(|rule| {
            let caps = rule.pattern.captures(line)?;
            match caps.name("name") {
                Some(name) if self.reject.contains(&name.as_str()) => None,
                _ => Some(rule.scope),
            }
        })
    }
}

pub(crate) const C_STYLE_BLOCKS: &[BlockDelimiters] = &[BlockDelimiters { open: "/*", close: "*/" }];

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_language_detection() {
        let cases = [
            ("lib.py", Some(Language::Python)),
            ("app.jsx", Some(Language::JavaScript)),
            ("index.tsx", Some(Language::TypeScript)),
            ("Main.java", Some(Language::Java)),
            ("Program.cs", Some(Language::CSharp)),
            ("Main.JAVA", Some(Language::Java)),
            ("Tool.PY", Some(Language::Python)),
            ("Widget.Tsx", Some(Language::TypeScript)),
            ("main.rs", None),
            ("Makefile", None),
        ];
        for (file, expected) in cases {
            assert_eq!(Language::from_path(&PathBuf::from(file)), expected, "{}", file);
        }
    }

    #[test]
    fn test_tags_round_trip() {
        for language in Language::ALL {
            assert_eq!(Language::from_tag(language.tag()), Some(language));
        }
        assert_eq!(Language::from_tag("rb"), None);
    }

    #[test]
    fn test_line_pattern_requires_tag() {
        let grammar = Language::Python.grammar();
        let caps = grammar
            .line_pattern()
            .captures("x = 1  # @ai-metadata {\"a\": 1} trailing")
            .unwrap();
        assert_eq!(&caps[1], "{\"a\": 1} trailing");
        assert!(grammar.line_pattern().captures("# ai-metadata {}").is_none());
    }
}
