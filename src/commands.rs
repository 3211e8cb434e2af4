//! CLI command implementations

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use adp_core::{CodeScope, GraphBuilder, MetadataBlock, ParsedFile, SchemaRegistry};
use adp_indexer::{IndexerConfig, MetadataParser, CONFIG_FILE_NAME};
use anyhow::Context;
use serde::Serialize;

#[derive(Serialize)]
struct ScanReport<'a> {
    summary: ScanSummary,
    files: Vec<FileReport<'a>>,
}

#[derive(Serialize)]
struct ScanSummary {
    files: usize,
    blocks: usize,
    scopes: BTreeMap<CodeScope, usize>,
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: &'a Path,
    blocks: &'a [MetadataBlock],
}

pub fn scan(path: &Path, recursive: bool, output: Option<&Path>, schema: Option<&str>) -> anyhow::Result<()> {
    let files = parse_path(path, recursive, schema)?;

    let mut scopes: BTreeMap<CodeScope, usize> = BTreeMap::new();
    for block in files.iter().flat_map(|f| &f.metadata_blocks) {
        *scopes.entry(block.scope).or_insert(0) += 1;
    }
    let blocks: usize = scopes.values().sum();

    println!("Found {} metadata blocks in {} files", blocks, files.len());
    for (scope, count) in &scopes {
        println!("  {:<10} {}", scope.as_str(), count);
    }

    if let Some(output) = output {
        let report = ScanReport {
            summary: ScanSummary { files: files.len(), blocks, scopes },
            files: files
                .iter()
                .map(|f| FileReport { path: &f.path, blocks: &f.metadata_blocks })
                .collect(),
        };
        let writer = BufWriter::new(
            File::create(output).with_context(|| format!("Failed to create {}", output.display()))?,
        );
        serde_json::to_writer_pretty(writer, &report)?;
        println!("Report written to {}", output.display());
    }
    Ok(())
}

pub fn validate(file: &Path, schema: Option<&str>) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let (registry, config) = load_registry(config_root(file), schema)?;
    let parser = MetadataParser::new(&registry, None)?.with_config(config)?;
    let parsed = parser.parse_file(file);

    if !parsed.has_metadata() {
        println!("No metadata found in {}", file.display());
        return Ok(());
    }

    let mut invalid = 0;
    for block in &parsed.metadata_blocks {
        let errors = parser.validation_errors(block);
        if errors.is_empty() {
            println!("line {} ({}): valid", block.line_number, block.scope);
        } else {
            invalid += 1;
            println!("line {} ({}): invalid", block.line_number, block.scope);
            for error in errors {
                println!("    {}", error);
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!(
            "{} of {} metadata blocks failed validation against schema '{}'",
            invalid,
            parsed.metadata_blocks.len(),
            parser.schema().name()
        );
    }
    Ok(())
}

pub fn graph(path: &Path, output: &Path, recursive: bool, schema: Option<&str>) -> anyhow::Result<()> {
    let (registry, config) = load_registry(config_root(path), schema)?;
    let files = parse_with(path, recursive && config.recursive, &registry, config)?;

    let mut builder = GraphBuilder::from_registry(&registry, None)?;
    let graph = builder.build_from_parsed_files(&files);

    let writer = BufWriter::new(
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?,
    );
    graph.write_json(writer)?;

    println!(
        "Graph with {} nodes and {} edges written to {}",
        graph.node_count(),
        graph.edge_count(),
        output.display()
    );
    for (kind, count) in graph.kind_counts() {
        println!("  {:<12} {}", kind, count);
    }
    if !graph.custom_node_kinds().is_empty() {
        let custom: Vec<&str> = graph.custom_node_kinds().iter().map(String::as_str).collect();
        println!("Custom node kinds: {}", custom.join(", "));
    }
    Ok(())
}

pub fn init(dir: &Path, force: bool) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Directory not found: {}", dir.display());
    }
    let target = dir.join(CONFIG_FILE_NAME);
    if target.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", target.display());
    }
    std::fs::write(&target, IndexerConfig::default_config_string())
        .with_context(|| format!("Failed to write {}", target.display()))?;
    println!("Wrote {}", target.display());
    Ok(())
}

fn parse_path(path: &Path, recursive: bool, schema: Option<&str>) -> anyhow::Result<Vec<ParsedFile>> {
    let (registry, config) = load_registry(config_root(path), schema)?;
    let recursive = recursive && config.recursive;
    parse_with(path, recursive, &registry, config)
}

fn parse_with(
    path: &Path,
    recursive: bool,
    registry: &SchemaRegistry,
    config: IndexerConfig,
) -> anyhow::Result<Vec<ParsedFile>> {
    let parser = MetadataParser::new(registry, None)?.with_config(config)?;
    if path.is_dir() {
        Ok(parser.parse_directory(path, recursive))
    } else if path.is_file() {
        let parsed = parser.parse_file(path);
        Ok(if parsed.has_metadata() { vec![parsed] } else { Vec::new() })
    } else {
        anyhow::bail!("Path does not exist: {}", path.display())
    }
}

/// Directory whose `.adp.toml` applies to `path`.
fn config_root(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

/// Registry with configured schemas loaded and the selected one active.
///
/// `schema` is a registered name or a path to a definition file; it takes
/// precedence over the config file.
fn load_registry(root: PathBuf, schema: Option<&str>) -> anyhow::Result<(SchemaRegistry, IndexerConfig)> {
    let config = IndexerConfig::load(&root)
        .with_context(|| format!("Failed to load config from {}", root.display()))?;

    let mut registry = SchemaRegistry::new();
    for path in &config.schemas {
        let loaded = registry
            .load(path)
            .with_context(|| format!("Failed to load schema {}", path.display()))?;
        tracing::info!("Registered schema '{}' from {}", loaded.name(), path.display());
    }

    let selected = match schema {
        Some(arg) if Path::new(arg).is_file() => Some(registry.load(arg)?.name().to_string()),
        Some(name) => Some(name.to_string()),
        None => config.active_schema.clone(),
    };
    if let Some(name) = selected {
        registry.set_active(&name)?;
        tracing::info!("Using schema '{}'", name);
    }

    Ok((registry, config))
}
