//! Parses source files and directories into [`ParsedFile`]s

use std::fs;
use std::path::Path;
use std::sync::Arc;

use adp_core::{MetadataBlock, ParsedFile, Schema, SchemaError, SchemaRegistry};
use globset::GlobSet;
use ignore::WalkBuilder;

use crate::config::{ConfigError, IndexerConfig};
use crate::extractor::extract_metadata;
use crate::languages::Language;

pub struct MetadataParser {
    schema: Arc<Schema>,
    config: IndexerConfig,
    excludes: GlobSet,
}

impl MetadataParser {
    /// Parser validating against a registry schema; `None` selects the active one.
    pub fn new(registry: &SchemaRegistry, schema: Option<&str>) -> Result<Self, SchemaError> {
        Ok(MetadataParser {
            schema: registry.get(schema)?,
            config: IndexerConfig::default(),
            excludes: GlobSet::empty(),
        })
    }

    pub fn with_config(mut self, config: IndexerConfig) -> Result<Self, ConfigError> {
        self.excludes = config.exclude_set()?;
        self.config = config;
        Ok(self)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Parse one file. Unsupported or unreadable files yield an empty result.
    pub fn parse_file(&self, path: &Path) -> ParsedFile {
        let Some(language) = Language::from_path(path) else {
            tracing::debug!("Skipping unsupported file {}", path.display());
            return ParsedFile::empty(path);
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return ParsedFile::empty(path);
            }
        };

        let blocks: Vec<MetadataBlock> = extract_metadata(&content, language)
            .into_iter()
            .map(|block| MetadataBlock {
                metadata: block.metadata,
                source_file: path.to_path_buf(),
                line_number: block.line,
                scope: block.scope,
            })
            .collect();

        if !blocks.is_empty() {
            tracing::debug!("Found {} metadata blocks in {}", blocks.len(), path.display());
        }
        ParsedFile::new(path, blocks)
    }

    /// Parse every supported file under `dir` in file-name order.
    ///
    /// Only files with at least one metadata block are returned.
    pub fn parse_directory(&self, dir: &Path, recursive: bool) -> Vec<ParsedFile> {
        let mut builder = WalkBuilder::new(dir);
        builder
            .hidden(!self.config.include_hidden)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .ignore(self.config.respect_gitignore)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        if !recursive {
            builder.max_depth(Some(1));
        }

        let mut scanned = 0usize;
        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to walk {}: {}", dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(dir).unwrap_or(path);
            if self.excludes.is_match(relative) {
                tracing::debug!("Excluded {}", relative.display());
                continue;
            }
            if Language::from_path(path).is_none() {
                continue;
            }

            scanned += 1;
            let parsed = self.parse_file(path);
            if parsed.has_metadata() {
                files.push(parsed);
            }
        }

        tracing::info!(
            "Scanned {} source files under {}, {} with metadata",
            scanned,
            dir.display(),
            files.len()
        );
        files
    }

    pub fn validate(&self, block: &MetadataBlock) -> bool {
        self.schema.validate(&block.metadata)
    }

    pub fn validation_errors(&self, block: &MetadataBlock) -> Vec<String> {
        self.schema.errors(&block.metadata)
    }
}
