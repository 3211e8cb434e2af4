//! Integration tests for ADP
//!
//! These tests verify that extraction, graph building and the CLI work together.

use std::fs;
use std::path::Path;
use std::process::Command;

use adp_core::{GraphBuilder, NodeId, NodeKind, SchemaRegistry};
use adp_indexer::{IndexerConfig, MetadataParser};
use serde_json::Value;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A small polyglot project sharing one domain and one service.
fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "billing/invoice.py",
        r#"# @ai-metadata {"name": "invoice", "domain": "billing"}
import decimal




"""
@ai-metadata {
    "name": "Invoice",
    "extends": "Document",
    "serviceBoundary": {"service": "payments", "teamOwner": "ledger-team"}
}
"""
class Invoice:
    def total(self):
        return 0
"#,
    );
    write(
        root,
        "web/checkout.ts",
        r#"import { api } from "./api";




/**
 * @ai-metadata {
 *   "name": "checkout",
 *   "domain": "billing",
 *   "service": "payments",
 *   "calls": ["charge"],
 *   "performance": {"max-latency": "200ms", "hot-path": true}
 * }
 */
export async function checkout(cart) {
  return api.charge(cart);
}
"#,
    );
    write(
        root,
        "jobs/Reconcile.java",
        r#"package jobs;




public class Reconcile {
    // @ai-metadata {"name": "run", "dependencies": ["billing.invoice", "ledger"]}
    public void run() {
    }
}
"#,
    );
    write(root, "README.md", "# @ai-metadata {\"name\": \"docs\"}\n");
    dir
}

fn adp(args: &[&str], cwd: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_adp"))
        .args(args)
        .current_dir(cwd)
        .env_remove("ADP_SCHEMA")
        .env_remove("ADP_RECURSIVE")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute adp")
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let dir = TempDir::new().unwrap();
    let output = adp(&["--help"], dir.path());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("@ai-metadata"));
    assert!(stdout.contains("scan"));
    assert!(stdout.contains("graph"));
}

/// Test end-to-end parsing and graph building across languages
#[test]
fn test_end_to_end_graph() {
    let project = sample_project();
    let registry = SchemaRegistry::new();
    let parser = MetadataParser::new(&registry, None).unwrap();

    let files = parser.parse_directory(project.path(), true);
    assert_eq!(files.len(), 3);
    let blocks: usize = files.iter().map(|f| f.metadata_blocks.len()).sum();
    assert_eq!(blocks, 4);

    let mut builder = GraphBuilder::from_registry(&registry, None).unwrap();
    let graph = builder.build_from_parsed_files(&files);

    assert_eq!(graph.nodes_of_kind(&NodeKind::DOMAIN).count(), 1);
    assert_eq!(graph.edges_to(&NodeId::from("domain:billing")).len(), 2);

    let service = NodeId::from("service:payments");
    assert_eq!(graph.nodes_of_kind(&NodeKind::SERVICE).count(), 1);
    assert!(graph.has_edge_between(
        &service,
        &NodeId::from("team:ledger-team"),
        &adp_core::EdgeKind::OWNED_BY
    ));
    assert!(graph.contains_node(&NodeId::from("class:Document")));
    assert!(graph.contains_node(&NodeId::from("function:charge")));
    assert!(graph.contains_node(&NodeId::from("module:billing.invoice")));
    assert!(graph.contains_node(&NodeId::from("file:ledger")));
    assert_eq!(graph.nodes_of_kind(&NodeKind::PERFORMANCE).count(), 1);

    let export = graph.to_export();
    assert_eq!(export.nodes.len(), graph.node_count());
    assert_eq!(export.edges.len(), graph.edge_count());
}

/// Test that the graph command writes the portable export
#[test]
fn test_graph_command() {
    let project = sample_project();
    let out = project.path().join("graph.json");
    let output = adp(&["graph", ".", "-o", "graph.json"], project.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let export: Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    let nodes = export["nodes"].as_array().unwrap();
    assert!(nodes.iter().any(|n| n["id"] == "domain:billing"));
    assert!(nodes.iter().all(|n| n.get("shortLabel").is_some()));
    assert!(export["edges"].as_array().unwrap().iter().any(|e| e["kind"] == "owned_by"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("nodes"));
}

/// Test the scan report and non-recursive scanning
#[test]
fn test_scan_command_report() {
    let project = sample_project();
    write(project.path(), "top.py", "# @ai-metadata {\"name\": \"top\"}\n");

    let output = adp(&["scan", ".", "--no-recursive", "-o", "report.json"], project.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: Value =
        serde_json::from_str(&fs::read_to_string(project.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(report["summary"]["files"], 1);
    assert_eq!(report["summary"]["scopes"]["file"], 1);
    assert_eq!(report["files"][0]["blocks"][0]["metadata"]["name"], "top");
}

/// Test validation exit status
#[test]
fn test_validate_command() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ok.py", "# @ai-metadata {\"name\": \"ok\", \"thread-safety\": true}\n");
    write(dir.path(), "bad.py", "# @ai-metadata {\"name\": \"bad\", \"thread-safety\": \"maybe\"}\n");

    assert!(adp(&["validate", "ok.py"], dir.path()).status.success());

    let output = adp(&["validate", "bad.py"], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("/thread-safety"));
}

/// Test that init writes a loadable default config once
#[test]
fn test_init_command() {
    let dir = TempDir::new().unwrap();

    assert!(adp(&["init"], dir.path()).status.success());
    let config = IndexerConfig::from_file(dir.path().join(".adp.toml")).unwrap();
    assert_eq!(config, IndexerConfig::default());

    assert!(!adp(&["init"], dir.path()).status.success());
    assert!(adp(&["init", "--force"], dir.path()).status.success());
}

/// Test configuration loading with a custom schema
#[test]
fn test_configuration_with_custom_schema() {
    let project = sample_project();
    write(
        project.path(),
        "schemas/risk.json",
        r#"{
  "name": "risk",
  "version": "1.1.0",
  "schema": {"type": "object", "properties": {"riskOwner": {"type": "object"}}}
}"#,
    );
    write(
        project.path(),
        ".adp.toml",
        "schemas = [\"schemas/risk.json\"]\nactive_schema = \"risk\"\nexclude = [\"jobs/**\"]\n",
    );
    write(
        project.path(),
        "risk/audit.py",
        "# @ai-metadata {\"name\": \"audit\", \"riskOwner\": {\"name\": \"Alice\"}}\n",
    );

    let config = IndexerConfig::load(project.path()).unwrap();
    assert_eq!(config.active_schema.as_deref(), Some("risk"));

    let output = adp(&["graph", ".", "-o", "graph.json"], project.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let export: Value =
        serde_json::from_str(&fs::read_to_string(project.path().join("graph.json")).unwrap()).unwrap();
    let nodes = export["nodes"].as_array().unwrap();
    assert!(nodes.iter().any(|n| n["id"] == "riskOwner:Alice" && n["kind"] == "riskOwner"));
    assert!(!nodes.iter().any(|n| n["id"] == "module:billing.invoice"));
    assert!(export["edges"].as_array().unwrap().iter().any(|e| e["kind"] == "has_riskOwner"));
}
