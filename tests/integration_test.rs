// Integration tests for kbnpath
use kbnpath::prelude::*;
use kbnpath::{random_graph, read_nodes, RandomGraphConfig, WindowShape};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

fn ids(nodes: &[Node]) -> BTreeSet<NodeId> {
    nodes.iter().map(|n| n.id.clone()).collect()
}

#[test]
fn test_regional_score_example() {
    let nodes = vec![
        Node::new(0, 0.0, 0.0, 0.0),
        Node::new(1, 1.0, 0.0, 10.0),
        Node::new(2, 2.0, 0.0, 20.0),
    ];
    let graph = SpatialGraph::build(nodes, &GraphConfig::default()).unwrap();

    assert_eq!(graph.max_cost(), 2.0);
    assert_eq!(graph.get_node_regional_score(&NodeId::from(1), 1).unwrap(), 10.0);
}

#[test]
fn test_group_search_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"id": "a", "x": 0.0, "y": 0.0, "score": 100, "cat": "A"}},
            {{"id": "b", "x": 0.0, "y": 2.0, "score": 100, "cat": "A"}},
            {{"id": "c", "x": 2.0, "y": 0.0, "score": 100, "cat": "B"}},
            {{"id": "d", "x": 10.0, "y": 0.0, "score": 10, "cat": "A"}},
            {{"id": "e", "x": 10.5, "y": 0.0, "score": 10, "cat": "B"}},
            {{"id": "f", "x": 11.0, "y": 0.0, "score": 10, "cat": "A"}}
        ]"#
    )
    .unwrap();
    file.flush().unwrap();

    let nodes = read_nodes(file.path()).unwrap();
    assert_eq!(nodes.len(), 6);

    let config = GraphConfig {
        max_cost: Some(1.5),
        ..Default::default()
    };
    let mut graph = SpatialGraph::build(nodes, &config).unwrap();

    let objectives: BTreeMap<String, f64> =
        [("A".to_string(), 0.67), ("B".to_string(), 0.33)].into();
    let ratio = CategoricalRatioConstraint::new(
        CategoricalRatioConfig {
            property: "cat".to_string(),
            objectives,
            k: 3,
        },
        &graph,
    )
    .unwrap();
    let mut constraints = ConstraintSet::new().with(ratio);

    let search = GroupSearchConfig::new(3, 1).with_window(WindowConfig {
        shape: Some(WindowShape::new(3.0, 3.0)),
        overlap: 0.0,
        ..Default::default()
    });
    let groups = get_groups_of_k_best_nodes(&mut graph, &search, &mut constraints).unwrap();

    // The rich isolated nodes rank first but cannot form a chain
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0][0].id, NodeId::from("d"));
    let expected: BTreeSet<NodeId> = ["d", "e", "f"].into_iter().map(NodeId::from).collect();
    assert_eq!(ids(&groups[0]), expected);

    assert_eq!(graph.node_count(), 3);
    for id in ["a", "b", "c"] {
        assert!(graph.contains_node(&NodeId::from(id)));
    }
}

#[test]
fn test_read_nodes_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_nodes(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_repeated_chains_consume_the_graph() {
    let mut graph = random_graph(&RandomGraphConfig {
        n: 60,
        seed: Some(2024),
        ..Default::default()
    })
    .unwrap();
    let mut constraints = ConstraintSet::new();
    let mut seen = BTreeSet::new();

    while !graph.is_empty() {
        let chain = get_k_best_nodes_from_max_score(&mut graph, 4, &mut constraints).unwrap();
        assert!(!chain.is_empty() && chain.len() <= 4);
        for node in &chain {
            assert!(seen.insert(node.id.clone()), "{} selected twice", node.id);
        }
    }
    assert_eq!(seen.len(), 60);
    assert_eq!(graph.deactivated_count(), 60);
}

#[test]
fn test_reactivating_a_chain_restores_the_graph() {
    let mut graph = random_graph(&RandomGraphConfig {
        n: 80,
        seed: Some(31),
        ..Default::default()
    })
    .unwrap();
    let (nodes, edges) = (graph.node_count(), graph.edge_count());

    let chain = get_k_best_nodes_from_max_score(&mut graph, 6, &mut ConstraintSet::new()).unwrap();
    assert_eq!(graph.node_count(), nodes - chain.len());

    for node in &chain {
        graph.reactivate_node(&node.id).unwrap();
    }
    assert_eq!(graph.node_count(), nodes);
    assert_eq!(graph.edge_count(), edges);
    assert_eq!(graph.deactivated_count(), 0);
}

#[test]
fn test_haversine_graph() {
    let nodes = vec![
        Node::new("louvre", 2.3376, 48.8606, 95.0),
        Node::new("notre-dame", 2.3499, 48.8530, 90.0),
        Node::new("eiffel", 2.2945, 48.8584, 99.0),
    ];
    let config = GraphConfig {
        distance: "haversine".to_string(),
        max_cost: Some(2.0),
        ..Default::default()
    };
    let graph = SpatialGraph::build(nodes, &config).unwrap();

    assert_eq!(graph.edge_count(), 1);
    let edge = graph.edges().next().unwrap();
    assert!(edge.cost > 1.0 && edge.cost < 1.5, "cost was {}", edge.cost);
    assert!(graph.neighborhood(&NodeId::from("eiffel")).unwrap().is_empty());
}

#[test]
fn test_closest_start_strategy() {
    let mut graph = random_graph(&RandomGraphConfig {
        n: 120,
        max_cost: Some(0.6),
        seed: Some(12),
        ..Default::default()
    })
    .unwrap();
    let config = GroupSearchConfig::new(4, 2).with_init(InitStrategy::ClosestTo { x: 0.5, y: 0.5 });
    let groups =
        get_groups_of_k_best_nodes(&mut graph, &config, &mut ConstraintSet::new()).unwrap();

    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g.len() == 2));
    assert_eq!(graph.node_count(), 116);
}
