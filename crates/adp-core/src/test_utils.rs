//! Test fixtures for building parsed files by hand

use std::path::PathBuf;

use serde_json::Value;

use crate::model::{CodeScope, MetadataBlock, ParsedFile};

/// A block at `line` whose metadata is the given JSON object.
pub fn block(path: &str, line: u32, scope: CodeScope, metadata: Value) -> MetadataBlock {
    MetadataBlock {
        metadata: metadata.as_object().cloned().expect("fixture metadata must be an object"),
        source_file: PathBuf::from(path),
        line_number: line,
        scope,
    }
}

/// A parsed file with one block per `(line, scope, metadata)` entry.
pub fn parsed_file(path: &str, blocks: Vec<(u32, CodeScope, Value)>) -> ParsedFile {
    let blocks = blocks
        .into_iter()
        .map(|(line, scope, metadata)| block(path, line, scope, metadata))
        .collect();
    ParsedFile::new(path, blocks)
}
