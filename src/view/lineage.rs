use std::collections::{HashSet, VecDeque};

use crate::layout::SimEdge;

/// What to emphasise around a selected node: the shortest chain of
/// advisor/student links back to the base, plus its immediate neighbours.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lineage {
    pub selected: usize,
    /// Node indices from the base to the selection, inclusive. Empty when the
    /// selection is unreachable or there is no base.
    pub path: Vec<usize>,
    pub path_nodes: HashSet<usize>,
    /// Unordered `(min, max)` index pairs along `path`.
    pub path_links: HashSet<(usize, usize)>,
    pub direct_nodes: HashSet<usize>,
    /// Indices into the edge array.
    pub direct_edges: HashSet<usize>,
}

impl Lineage {
    pub fn build(
        node_count: usize,
        edges: &[SimEdge],
        base: Option<usize>,
        selected: usize,
    ) -> Option<Self> {
        if selected >= node_count {
            return None;
        }

        let mut lineage = Self {
            selected,
            ..Self::default()
        };
        for (index, edge) in edges.iter().enumerate() {
            if edge.source == selected || edge.target == selected {
                lineage.direct_edges.insert(index);
                lineage.direct_nodes.insert(edge.source);
                lineage.direct_nodes.insert(edge.target);
            }
        }
        lineage.direct_nodes.remove(&selected);

        if let Some(base) = base.filter(|&base| base < node_count) {
            lineage.path = shortest_path(node_count, edges, base, selected);
            lineage.path_nodes = lineage.path.iter().copied().collect();
            lineage.path_links = lineage
                .path
                .windows(2)
                .map(|pair| (pair[0].min(pair[1]), pair[0].max(pair[1])))
                .collect();
        }

        Some(lineage)
    }

    pub fn edge_on_path(&self, edge: &SimEdge) -> bool {
        self.path_links
            .contains(&(edge.source.min(edge.target), edge.source.max(edge.target)))
    }
}

/// Breadth-first search ignoring edge direction, so ancestors and
/// descendants of the base are both reachable.
fn shortest_path(node_count: usize, edges: &[SimEdge], from: usize, to: usize) -> Vec<usize> {
    if from == to {
        return vec![from];
    }

    let mut neighbours = vec![Vec::new(); node_count];
    for edge in edges {
        neighbours[edge.source].push(edge.target);
        neighbours[edge.target].push(edge.source);
    }

    let mut queue = VecDeque::from([from]);
    let mut visited = vec![false; node_count];
    let mut parent = vec![usize::MAX; node_count];
    visited[from] = true;

    while let Some(node) = queue.pop_front() {
        if node == to {
            break;
        }
        for &next in &neighbours[node] {
            if !visited[next] {
                visited[next] = true;
                parent[next] = node;
                queue.push_back(next);
            }
        }
    }

    if !visited[to] {
        return Vec::new();
    }

    let mut path = vec![to];
    let mut cursor = to;
    while cursor != from {
        cursor = parent[cursor];
        path.push(cursor);
    }
    path.reverse();
    path
}
