//! Graph construction properties across files

use crate::test_utils::parsed_file;
use crate::*;
use serde_json::json;

fn default_builder() -> GraphBuilder {
    GraphBuilder::new(SchemaRegistry::new().default_schema())
}

fn sample_files() -> Vec<ParsedFile> {
    vec![
        parsed_file(
            "svc/billing.py",
            vec![
                (1, CodeScope::File, json!({"name": "billing", "domain": "billing"})),
                (
                    12,
                    CodeScope::Class,
                    json!({
                        "name": "Invoice",
                        "extends": "Document",
                        "service": {"name": "payments", "owner": "team-a"}
                    }),
                ),
            ],
        ),
        parsed_file(
            "svc/refunds.py",
            vec![(
                20,
                CodeScope::Function,
                json!({
                    "name": "refund",
                    "domain": "billing",
                    "calls": ["charge"],
                    "tech-debt": {"severity": "high", "type": "duplication"}
                }),
            )],
        ),
    ]
}

#[test]
fn test_add_file_is_idempotent() {
    let files = sample_files();
    let mut builder = default_builder();
    builder.add_file(&files[0]);
    let nodes = builder.graph().node_count();
    let edges = builder.graph().edge_count();

    builder.add_file(&files[0]);
    assert_eq!(builder.graph().node_count(), nodes);
    assert_eq!(builder.graph().edge_count(), edges);
    assert_eq!(builder.processed_files().len(), 1);
}

#[test]
fn test_build_is_deterministic() {
    let files = sample_files();
    let first = default_builder().build_from_parsed_files(&files).to_export();
    let second = default_builder().build_from_parsed_files(&files).to_export();
    assert_eq!(first, second);
}

#[test]
fn test_domain_merges_across_files() {
    let files = sample_files();
    let mut builder = default_builder();
    let graph = builder.build_from_parsed_files(&files);

    let domain = NodeId::new(&NodeKind::DOMAIN, "billing");
    assert_eq!(graph.nodes_of_kind(&NodeKind::DOMAIN).count(), 1);
    let related: Vec<_> = graph
        .edges_to(&domain)
        .into_iter()
        .filter(|e| e.kind == EdgeKind::RELATED_TO)
        .collect();
    assert_eq!(related.len(), 2);
}

#[test]
fn test_custom_field_promotion() {
    let mut registry = SchemaRegistry::new();
    registry
        .register(json!({
            "name": "risk",
            "schema": {"type": "object", "properties": {"riskOwner": {"type": "object"}}}
        }))
        .unwrap();

    let mut builder = GraphBuilder::from_registry(&registry, Some("risk")).unwrap();
    builder.add_file(&parsed_file(
        "risk.py",
        vec![(30, CodeScope::Function, json!({"riskOwner": {"name": "Alice"}}))],
    ));
    let graph = builder.into_graph();

    let owner = graph.node(&NodeId::from("riskOwner:Alice")).unwrap();
    assert_eq!(owner.kind, NodeKind::custom("riskOwner"));
    assert!(graph.custom_node_kinds().contains("riskOwner"));
    assert!(graph.custom_edge_kinds().contains("has_riskOwner"));
    assert!(graph.has_edge_between(
        &NodeId::from("function:file:risk.py:30"),
        &owner.id,
        &EdgeKind::custom("has_riskOwner")
    ));
}

#[test]
fn test_promotion_needs_schema_field() {
    let mut builder = default_builder();
    builder.add_file(&parsed_file(
        "risk.py",
        vec![(30, CodeScope::Function, json!({"riskOwner": {"name": "Alice"}}))],
    ));
    assert!(!builder.graph().contains_node(&NodeId::from("riskOwner:Alice")));
    assert!(builder.graph().custom_node_kinds().is_empty());
}

#[test]
fn test_identical_dependencies_share_one_node() {
    let deps: Vec<String> = vec!["core.util".to_string(); 1000];
    let mut builder = default_builder();
    builder.add_file(&parsed_file(
        "big.py",
        vec![(40, CodeScope::Function, json!({"dependencies": deps}))],
    ));
    let graph = builder.graph();

    assert_eq!(graph.nodes_of_kind(&NodeKind::MODULE).count(), 1);
    let source = NodeId::from("function:file:big.py:40");
    assert_eq!(graph.edges_from(&source).iter().filter(|e| e.kind == EdgeKind::DEPENDS_ON).count(), 1000);
}

#[test]
fn test_category_list_ids_are_indexed() {
    let mut builder = default_builder();
    builder.add_file(&parsed_file(
        "data.py",
        vec![(
            50,
            CodeScope::Method,
            json!({"data_handling": [{"dataType": "email"}, {"dataType": "phone"}]}),
        )],
    ));
    let graph = builder.graph();

    let parent = NodeId::from("method:file:data.py:50");
    let labels: Vec<_> = graph
        .edges_from(&parent)
        .into_iter()
        .filter(|e| e.kind == EdgeKind::PROCESSES_DATA)
        .map(|e| graph.node(&e.target).unwrap().label.clone())
        .collect();
    assert_eq!(labels, vec!["email", "phone"]);
    assert!(graph.contains_node(&NodeId::from("method:file:data.py:50:data:1")));
}

#[test]
fn test_shared_service_created_once() {
    let mut builder = default_builder();
    builder.build_from_parsed_files(&[
        parsed_file("a.py", vec![(10, CodeScope::Class, json!({"service": "payments"}))]),
        parsed_file(
            "b.py",
            vec![(10, CodeScope::Class, json!({"service-boundary": {"service": "payments", "team": "ops"}}))],
        ),
    ]);
    let graph = builder.graph();

    assert_eq!(graph.nodes_of_kind(&NodeKind::SERVICE).count(), 1);
    assert_eq!(graph.edges_to(&NodeId::from("service:payments")).len(), 2);
    // first writer wins for referenced entities
    assert!(graph.node(&NodeId::from("service:payments")).unwrap().attributes.is_empty());
    assert!(graph.contains_node(&NodeId::from("team:ops")));
}

#[test]
fn test_kind_counts() {
    let files = sample_files();
    let mut builder = default_builder();
    let counts = builder.build_from_parsed_files(&files).kind_counts();

    assert_eq!(counts["file"], 3);
    assert_eq!(counts["class"], 2);
    assert_eq!(counts["function"], 2);
    assert_eq!(counts["tech_debt"], 1);
}
