use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::GraphIntegrityError;

/// Identifier of a person in the genealogy.
pub type NodeId = i64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenealogyAdvisor {
    pub advisor_id: NodeId,
    pub advisor_name: String,
    pub advisor_number: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenealogyNodeDissertation {
    #[serde(rename = "nodeId")]
    pub node_id: NodeId,
    #[serde(rename = "nodeName")]
    pub node_name: String,
    #[serde(default)]
    pub phdprefix: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub yearofcompletion: Option<String>,
    #[serde(default)]
    pub dissertationtitle: Option<String>,
    #[serde(default)]
    pub mscnumber: Option<String>,
    #[serde(default)]
    pub advisors: Option<Vec<GenealogyAdvisor>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenealogyNodeStudent {
    pub id: NodeId,
    pub name: String,
}

/// One person. Everything except `id` is metadata for the detail panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenealogyNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub dissertations: Option<Vec<GenealogyNodeDissertation>>,
    #[serde(default)]
    pub students: Option<Vec<GenealogyNodeStudent>>,
    #[serde(default)]
    pub numberofdescendents: u64,
}

/// Advisor → student relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenealogyEdge {
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
}

/// Immutable graph snapshot. The layout engine copies what it needs and never
/// writes back into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub base: NodeId,
    #[serde(default)]
    pub generations_up: u32,
    #[serde(default)]
    pub generations_down: u32,
    #[serde(default)]
    pub number_of_nodes: usize,
    #[serde(default)]
    pub number_of_edges: usize,
    pub nodes: Vec<GenealogyNode>,
    pub edges: Vec<GenealogyEdge>,
}

impl Graph {
    pub fn node(&self, id: NodeId) -> Option<&GenealogyNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn base_node(&self) -> Option<&GenealogyNode> {
        self.node(self.base)
    }

    /// Checks that node ids are unique and every edge endpoint exists.
    pub fn validate(&self) -> Result<(), GraphIntegrityError> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(node.id) {
                return Err(GraphIntegrityError::DuplicateNode { id: node.id });
            }
        }

        for edge in &self.edges {
            for endpoint in [edge.from_node_id, edge.to_node_id] {
                if !ids.contains(&endpoint) {
                    return Err(GraphIntegrityError::DanglingEdge {
                        from: edge.from_node_id,
                        to: edge.to_node_id,
                        missing: endpoint,
                    });
                }
            }
        }

        Ok(())
    }
}
