use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::graph::Graph;
use super::notable::{NotablePerson, Notables};

pub fn parse_graph(raw: &str) -> Result<Graph> {
    let graph: Graph = serde_json::from_str(raw).context("invalid genealogy graph JSON")?;

    if graph.number_of_nodes != 0 && graph.number_of_nodes != graph.nodes.len() {
        warn!(
            declared = graph.number_of_nodes,
            actual = graph.nodes.len(),
            "graph node count does not match its header"
        );
    }
    if graph.number_of_edges != 0 && graph.number_of_edges != graph.edges.len() {
        warn!(
            declared = graph.number_of_edges,
            actual = graph.edges.len(),
            "graph edge count does not match its header"
        );
    }

    graph
        .validate()
        .context("genealogy graph failed integrity checks")?;

    Ok(graph)
}

pub fn load_graph(path: &Path) -> Result<Graph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    let graph = parse_graph(&raw).with_context(|| format!("failed to load {}", path.display()))?;

    info!(
        path = %path.display(),
        base = graph.base,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "loaded genealogy graph"
    );
    Ok(graph)
}

pub fn load_notables(path: &Path) -> Result<Notables> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read notable persons file {}", path.display()))?;
    let people: Vec<NotablePerson> =
        serde_json::from_str(&raw).context("invalid notable persons JSON")?;

    info!(count = people.len(), "loaded notable persons");
    Ok(Notables::new(people))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_service_payload() {
        let raw = json!({
            "base": 74313,
            "generationsUp": 2,
            "generationsDown": 0,
            "numberOfNodes": 2,
            "numberOfEdges": 1,
            "nodes": [
                {
                    "id": 74313,
                    "name": "John McCarthy",
                    "dissertations": [{
                        "nodeId": 74313,
                        "nodeName": "John McCarthy",
                        "phdprefix": "Ph.D.",
                        "university": "Imperial College London",
                        "yearofcompletion": "2022",
                        "dissertationtitle": "Moduli spaces",
                        "mscnumber": null,
                        "advisors": [
                            {"advisorId": 1, "advisorName": "Advisor", "advisorNumber": 1}
                        ]
                    }],
                    "students": null,
                    "numberofdescendents": 0
                },
                {"id": 1, "name": "Advisor", "dissertations": null, "students": [{"id": 74313, "name": "John McCarthy"}], "numberofdescendents": 1}
            ],
            "edges": [{"fromNodeId": 1, "toNodeId": 74313}]
        })
        .to_string();

        let graph = parse_graph(&raw).expect("payload parses");
        assert_eq!(graph.base, 74313);
        assert_eq!(graph.generations_up, 2);
        assert_eq!(graph.edges[0].from_node_id, 1);
        let dissertation = &graph.nodes[0].dissertations.as_ref().expect("has dissertations")[0];
        assert_eq!(dissertation.university.as_deref(), Some("Imperial College London"));
        assert_eq!(dissertation.advisors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn rejects_dangling_edge() {
        let raw = json!({
            "base": 1,
            "nodes": [{"id": 1, "name": "A"}],
            "edges": [{"fromNodeId": 1, "toNodeId": 2}]
        })
        .to_string();

        let error = parse_graph(&raw).expect_err("dangling edge must fail");
        assert!(format!("{error:#}").contains("missing node 2"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_graph("{\"base\": 1").is_err());
    }
}
