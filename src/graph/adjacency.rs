//! Shared undirected adjacency-list construction.
//!
//! Connectivity, path finding, analysis and recommendations all need the
//! same neighbor bookkeeping, so it is built in one place. Every edge
//! contributes both directions regardless of its semantic orientation.

use std::collections::{HashMap, HashSet};

use super::model::{GraphEdge, GraphNode, NodeId};

/// Undirected adjacency list keyed by node id.
///
/// Neighbor lists preserve edge insertion order, which keeps every
/// traversal built on top of them deterministic for a fixed input.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyList {
	neighbors: HashMap<NodeId, Vec<(NodeId, f64)>>,
}

/// Build the adjacency list for a node/edge listing. Nodes without edges
/// still get an (empty) entry so degree lookups cover every node.
pub fn build(nodes: &[GraphNode], edges: &[GraphEdge]) -> AdjacencyList {
	let mut neighbors: HashMap<NodeId, Vec<(NodeId, f64)>> = HashMap::with_capacity(nodes.len());
	for node in nodes {
		neighbors.entry(node.id).or_default();
	}
	for edge in edges {
		let cost = edge.cost();
		neighbors.entry(edge.source).or_default().push((edge.target, cost));
		neighbors.entry(edge.target).or_default().push((edge.source, cost));
	}
	AdjacencyList { neighbors }
}

impl AdjacencyList {
	/// Neighbors of `id` with the traversal cost of the connecting edge.
	pub fn neighbors(&self, id: NodeId) -> &[(NodeId, f64)] {
		self.neighbors.get(&id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Number of edges incident to `id`.
	pub fn degree(&self, id: NodeId) -> usize {
		self.neighbors(id).len()
	}

	/// Distinct neighbor ids of `id`, without costs or duplicates.
	pub fn neighbor_set(&self, id: NodeId) -> HashSet<NodeId> {
		self.neighbors(id).iter().map(|&(n, _)| n).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::super::model::tests::{club, connection, snapshot};
	use super::*;

	#[test]
	fn both_directions_and_isolated_entries() {
		let snap = snapshot(
			&[club(1, "A", "L1", "X"), club(2, "B", "L1", "Y"), club(3, "C", "L2", "Z")],
			&[connection(1, 2, 80.0)],
		);
		let adjacency = build(&snap.nodes, &snap.edges);
		assert_eq!(adjacency.degree(1), 1);
		assert_eq!(adjacency.degree(2), 1);
		assert_eq!(adjacency.degree(3), 0);
		assert_eq!(adjacency.neighbors(1), &[(2, 20.0)]);
		assert_eq!(adjacency.neighbors(2), &[(1, 20.0)]);
	}

	#[test]
	fn degree_sum_counts_each_edge_twice() {
		let snap = snapshot(
			&[club(1, "A", "L1", "X"), club(2, "B", "L1", "Y"), club(3, "C", "L2", "Z")],
			&[connection(1, 2, 50.0), connection(2, 3, 50.0)],
		);
		let adjacency = build(&snap.nodes, &snap.edges);
		let degree_sum: usize = snap.nodes.iter().map(|n| adjacency.degree(n.id)).sum();
		assert_eq!(degree_sum, 2 * snap.edges.len());
	}
}
