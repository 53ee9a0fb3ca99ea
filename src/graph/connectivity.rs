//! Connected-component analysis.
//!
//! Partitions the node set into components via depth-first traversal over
//! the undirected adjacency list. Used for graph-wide metadata and for the
//! "largest component only" filter.

use std::collections::HashSet;

use super::adjacency;
use super::model::{GraphEdge, GraphNode, NodeId};

/// Partition node ids into connected components.
///
/// Each component is the set of nodes mutually reachable ignoring edge
/// direction. Components come out in first-root order and each component
/// lists nodes in visit order, so the partition is deterministic for a
/// fixed node/edge ordering. An empty node set yields an empty partition.
pub fn connected_components(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<Vec<NodeId>> {
	let adjacency = adjacency::build(nodes, edges);
	let mut visited: HashSet<NodeId> = HashSet::with_capacity(nodes.len());
	let mut components = Vec::new();

	for node in nodes {
		if visited.contains(&node.id) {
			continue;
		}
		// Iterative DFS; an explicit stack keeps deep chains off the call stack.
		let mut component = Vec::new();
		let mut stack = vec![node.id];
		visited.insert(node.id);
		while let Some(current) = stack.pop() {
			component.push(current);
			for &(next, _) in adjacency.neighbors(current) {
				if visited.insert(next) {
					stack.push(next);
				}
			}
		}
		components.push(component);
	}

	components
}

/// The largest component of the partition; ties go to the first one found.
pub fn largest_component(components: &[Vec<NodeId>]) -> Option<&Vec<NodeId>> {
	components.iter().reduce(|best, candidate| {
		if candidate.len() > best.len() {
			candidate
		} else {
			best
		}
	})
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::super::model::tests::{club, connection, snapshot};
	use super::*;

	#[test]
	fn empty_graph_has_no_components() {
		assert!(connected_components(&[], &[]).is_empty());
	}

	#[test]
	fn partitions_into_reachable_sets() {
		let snap = snapshot(
			&[
				club(1, "A", "L1", "X"),
				club(2, "B", "L1", "Y"),
				club(3, "C", "L2", "Z"),
				club(4, "D", "L2", "W"),
				club(5, "E", "L3", "V"),
			],
			&[connection(1, 2, 50.0), connection(2, 3, 50.0), connection(4, 5, 50.0)],
		);
		let components = connected_components(&snap.nodes, &snap.edges);
		assert_eq!(components.len(), 2);

		let sets: Vec<HashSet<NodeId>> =
			components.iter().map(|c| c.iter().copied().collect()).collect();
		assert!(sets.contains(&HashSet::from([1, 2, 3])));
		assert!(sets.contains(&HashSet::from([4, 5])));
	}

	#[test]
	fn partition_covers_every_node_exactly_once() {
		let snap = snapshot(
			&[
				club(1, "A", "L1", "X"),
				club(2, "B", "L1", "Y"),
				club(3, "C", "L2", "Z"),
				club(4, "Isolated", "L3", "W"),
			],
			&[connection(1, 2, 50.0)],
		);
		let components = connected_components(&snap.nodes, &snap.edges);
		let mut seen = HashSet::new();
		for component in &components {
			for &id in component {
				assert!(seen.insert(id), "node {id} appears in two components");
			}
		}
		let all: HashSet<NodeId> = snap.nodes.iter().map(|n| n.id).collect();
		assert_eq!(seen, all);
	}

	#[test]
	fn isolated_nodes_form_singleton_components() {
		let snap = snapshot(&[club(1, "A", "L1", "X"), club(2, "B", "L1", "Y")], &[]);
		let components = connected_components(&snap.nodes, &snap.edges);
		assert_eq!(components.len(), 2);
		assert!(components.iter().all(|c| c.len() == 1));
	}

	#[test]
	fn largest_component_breaks_ties_first_found() {
		let components = vec![vec![1, 2], vec![3, 4], vec![5]];
		assert_eq!(largest_component(&components), Some(&vec![1, 2]));
	}
}
