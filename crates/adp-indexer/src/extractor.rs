//! Locates `@ai-metadata` payloads in source text

use std::ops::Range;

use adp_core::{CodeScope, Metadata};

use crate::languages::{CommentGrammar, Language, StringQuote, METADATA_TAG};
use crate::recovery;
use crate::scope::infer_scope;

/// One annotation recovered from a file's text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedBlock {
    pub metadata: Metadata,
    /// 1-based line of the comment start.
    pub line: u32,
    pub scope: CodeScope,
}

/// Byte span of one block comment.
#[derive(Debug, Clone)]
struct Region {
    start: usize,
    body: Range<usize>,
    end: usize,
}

impl Region {
    fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Raw payload text plus the byte span of the comment carrying it.
#[derive(Debug)]
struct Candidate {
    payload: String,
    start: usize,
    end: usize,
}

/// Extract annotations for a language tag (`py`, `js`, `ts`, `java`, `cs`).
///
/// Unknown tags yield nothing.
pub fn extract_metadata_for_tag(text: &str, tag: &str) -> Vec<ExtractedBlock> {
    match Language::from_tag(tag) {
        Some(language) => extract_metadata(text, language),
        None => {
            tracing::warn!("Unsupported language '{}', skipping metadata extraction", tag);
            Vec::new()
        }
    }
}

/// Extract every annotation in `text`.
///
/// Line-comment matches come first, then block-comment matches, each in
/// source order. Malformed payloads that cannot be recovered are dropped.
pub fn extract_metadata(text: &str, language: Language) -> Vec<ExtractedBlock> {
    let grammar = language.grammar();
    let regions = block_regions(text, grammar);

    let mut candidates = line_candidates(text, grammar, &regions);
    candidates.extend(block_candidates(text, grammar, &regions));
    if candidates.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = text.lines().collect();
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let line = line_of(text, candidate.start);
            let Some((metadata, step)) = recovery::recover(&candidate.payload) else {
                tracing::warn!("Dropping malformed {} payload at line {}", METADATA_TAG, line);
                return None;
            };
            if step != "strict" {
                tracing::debug!("Recovered payload at line {} ({})", line, step);
            }

            let scope = infer_scope(&lines, line, line_of(text, candidate.end), grammar);
            tracing::debug!("{} block at line {} has scope {}", language, line, scope);
            Some(ExtractedBlock { metadata, line, scope })
        })
        .collect()
}

fn line_of(text: &str, offset: usize) -> u32 {
    1 + text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() as u32
}

/// Pair block-comment openers with their closers in one forward pass.
///
/// Line comments and string literals are skipped, so openers inside them do
/// not start a block. An unterminated block runs to end of file.
fn block_regions(text: &str, grammar: &CommentGrammar) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        let rest = &text[pos..];
        if rest.starts_with(grammar.line_marker) {
            pos = text[pos..].find('\n').map_or(text.len(), |i| pos + i + 1);
            continue;
        }

        if let Some(delims) = grammar.blocks.iter().find(|d| rest.starts_with(d.open)) {
            let body_start = pos + delims.open.len();
            match text[body_start..].find(delims.close) {
                Some(i) => {
                    let body_end = body_start + i;
                    let end = body_end + delims.close.len();
                    regions.push(Region { start: pos, body: body_start..body_end, end });
                    pos = end;
                }
                None => {
                    regions.push(Region { start: pos, body: body_start..text.len(), end: text.len() });
                    break;
                }
            }
            continue;
        }

        pos += c.len_utf8();
        if let Some(quote) = grammar.strings.iter().find(|s| s.quote == c) {
            pos = skip_string(text, pos, quote);
        }
    }
    regions
}

/// Offset just past the literal whose content starts at `from`.
///
/// A single-line literal left open stops at the newline.
fn skip_string(text: &str, from: usize, quote: &StringQuote) -> usize {
    let mut escaped = false;
    for (i, c) in text[from..].char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote.quote {
            return from + i + c.len_utf8();
        } else if c == '\n' && !quote.multiline {
            return from + i;
        }
    }
    text.len()
}

fn line_candidates(text: &str, grammar: &CommentGrammar, regions: &[Region]) -> Vec<Candidate> {
    grammar
        .line_pattern()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if regions.iter().any(|r| r.contains(whole.start())) {
                tracing::debug!("Ignoring line annotation inside block comment at byte {}", whole.start());
                return None;
            }
            Some(Candidate {
                payload: cut_object(caps.get(1)?.as_str()).to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

fn block_candidates(text: &str, grammar: &CommentGrammar, regions: &[Region]) -> Vec<Candidate> {
    regions
        .iter()
        .filter_map(|region| {
            let body = &text[region.body.clone()];
            let tag = body.find(METADATA_TAG)?;
            let after = strip_decoration(&body[tag + METADATA_TAG.len()..], grammar.decoration);

            let trimmed = after.trim_start();
            if !trimmed.starts_with('{') {
                tracing::debug!("Tag without object payload in block at byte {}", region.start);
                return None;
            }
            Some(Candidate {
                payload: cut_object(trimmed).to_string(),
                start: region.start,
                end: region.end,
            })
        })
        .collect()
}

/// Drop the leading decoration character of every line after the first.
fn strip_decoration(text: &str, decoration: Option<char>) -> String {
    let Some(deco) = decoration else {
        return text.to_string();
    };
    text.split_inclusive('\n')
        .enumerate()
        .map(|(i, line)| {
            let trimmed = line.trim_start();
            match trimmed.strip_prefix(deco) {
                Some(rest) if i > 0 => rest,
                _ => line,
            }
        })
        .collect()
}

/// Cut the balanced `{...}` prefix of `text`, honouring quoted strings.
///
/// Unbalanced input is returned whole (trailing whitespace trimmed) so the
/// recovery chain can close it.
fn cut_object(text: &str) -> &str {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &text[..=i];
                }
            }
            _ => {}
        }
    }
    text.trim_end()
}
