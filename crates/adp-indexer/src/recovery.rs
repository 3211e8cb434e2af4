//! Tolerant parsing of annotation payloads
//!
//! Payloads are hand-written JSON and frequently malformed. Each step of
//! [`RECOVERY_CHAIN`] is a pure function from text to an optional object;
//! the first step that succeeds wins.

use std::sync::LazyLock;

use adp_core::Metadata;
use regex::Regex;
use serde_json::{Map, Value};

pub type RecoveryStep = fn(&str) -> Option<Metadata>;

pub const RECOVERY_CHAIN: &[(&str, RecoveryStep)] = &[
    ("strict", parse_strict),
    ("repaired", parse_repaired),
    ("scraped", scrape_known_keys),
];

/// Run the chain; returns the object and the name of the step that produced it.
pub fn recover(payload: &str) -> Option<(Metadata, &'static str)> {
    RECOVERY_CHAIN
        .iter()
        .find_map(|(step, parse)| parse(payload).map(|metadata| (metadata, *step)))
}

/// Well-formed JSON whose top level is an object.
pub fn parse_strict(payload: &str) -> Option<Metadata> {
    match serde_json::from_str(payload.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Fix quoting, trailing commas and unclosed brackets, then parse strictly.
pub fn parse_repaired(payload: &str) -> Option<Metadata> {
    parse_strict(&repair(payload))
}

const TYPOGRAPHIC_DOUBLE: &[char] = &['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}'];
const TYPOGRAPHIC_SINGLE: &[char] = &['\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}'];

#[derive(Clone, Copy, PartialEq)]
enum Quote {
    None,
    Double,
    Single,
}

/// String-aware repair pass over a JSON-ish object.
pub fn repair(payload: &str) -> String {
    let normalized: String = payload
        .trim()
        .chars()
        .map(|c| {
            if TYPOGRAPHIC_DOUBLE.contains(&c) {
                '"'
            } else if TYPOGRAPHIC_SINGLE.contains(&c) {
                '\''
            } else {
                c
            }
        })
        .collect();

    let mut out = String::with_capacity(normalized.len() + 4);
    let mut open: Vec<char> = Vec::new();
    let mut quote = Quote::None;
    let mut escaped = false;
    let mut chars = normalized.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Double => {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    quote = Quote::None;
                }
            }
            Quote::Single => {
                if escaped {
                    escaped = false;
                    // \' needs no escape once the string is double-quoted
                    if c != '\'' {
                        out.push('\\');
                    }
                    out.push(c);
                } else if c == '\\' {
                    escaped = true;
                } else if c == '\'' {
                    out.push('"');
                    quote = Quote::None;
                } else if c == '"' {
                    out.push_str("\\\"");
                } else {
                    out.push(c);
                }
            }
            Quote::None => match c {
                '"' => {
                    quote = Quote::Double;
                    out.push(c);
                }
                '\'' => {
                    quote = Quote::Single;
                    out.push('"');
                }
                '{' => {
                    open.push('}');
                    out.push(c);
                }
                '[' => {
                    open.push(']');
                    out.push(c);
                }
                '}' | ']' => {
                    if open.last() == Some(&c) {
                        open.pop();
                    }
                    out.push(c);
                }
                ',' => {
                    let mut rest = chars.clone();
                    let next = rest.find(|n| !n.is_whitespace());
                    if !matches!(next, Some('}') | Some(']') | None) {
                        out.push(c);
                    }
                }
                _ => out.push(c),
            },
        }
    }

    if quote != Quote::None {
        out.push('"');
    }
    while let Some(closer) = open.pop() {
        out.push(closer);
    }
    out
}

static KNOWN_KEYS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    ["domain", "name", "description", "service", "teamOwner"]
        .into_iter()
        .map(|key| {
            let pattern = format!(r#""{}"\s*:\s*"([^"]+)""#, key);
            (key, Regex::new(&pattern).expect("key pattern compiles"))
        })
        .collect()
});

/// Last resort: pull a few well-known string keys out with regexes.
///
/// `service` and `teamOwner` land under `serviceBoundary`.
pub fn scrape_known_keys(payload: &str) -> Option<Metadata> {
    let text = repair(payload);
    let mut metadata = Metadata::new();
    let mut boundary = Map::new();

    for (key, pattern) in KNOWN_KEYS.iter() {
        let Some(caps) = pattern.captures(&text) else { continue };
        let value = Value::String(caps[1].to_string());
        match *key {
            "service" | "teamOwner" => {
                boundary.insert(key.to_string(), value);
            }
            _ => {
                metadata.insert(key.to_string(), value);
            }
        }
    }

    if !boundary.is_empty() {
        metadata.insert("serviceBoundary".to_string(), Value::Object(boundary));
    }
    (!metadata.is_empty()).then_some(metadata)
}
