//! Weighted shortest path between two clubs.
//!
//! Classic Dijkstra over the undirected adjacency list, with the twist
//! that an edge's traversal cost is `100 − weight`: strongly related
//! clubs are close in network distance.

use std::collections::{HashMap, HashSet};

use super::adjacency;
use super::model::{GraphSnapshot, NodeId};

/// Result of a shortest-path query.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
	/// Node ids from source to target inclusive; empty when no path exists.
	pub path: Vec<NodeId>,
	/// Sum of `100 − weight` over the path's edges.
	pub total_cost: f64,
	pub exists: bool,
}

impl PathResult {
	fn none() -> Self {
		Self {
			path: Vec::new(),
			total_cost: 0.0,
			exists: false,
		}
	}
}

/// Weighted shortest path from `source` to `target`.
///
/// Unknown ids and disconnected endpoints resolve to "no path" rather than
/// an error, and `source == target` is a trivial single-node path of cost
/// zero. The unvisited minimum is found by linear scan (first minimum
/// wins); that tie-break is deterministic here but not promised stable
/// across implementations. The scan is O(V²), fine up to a few thousand
/// nodes.
pub fn shortest_path(snapshot: &GraphSnapshot, source: NodeId, target: NodeId) -> PathResult {
	if !snapshot.contains_node(source) || !snapshot.contains_node(target) {
		return PathResult::none();
	}
	if source == target {
		return PathResult {
			path: vec![source],
			total_cost: 0.0,
			exists: true,
		};
	}

	let adjacency = adjacency::build(&snapshot.nodes, &snapshot.edges);
	let mut distance: HashMap<NodeId, f64> = HashMap::with_capacity(snapshot.nodes.len());
	let mut previous: HashMap<NodeId, NodeId> = HashMap::new();
	let mut unvisited: HashSet<NodeId> = HashSet::with_capacity(snapshot.nodes.len());

	for node in &snapshot.nodes {
		distance.insert(node.id, f64::INFINITY);
		unvisited.insert(node.id);
	}
	distance.insert(source, 0.0);

	while !unvisited.is_empty() {
		// Scan node order so the first minimum encountered wins ties.
		let mut current = None;
		let mut best = f64::INFINITY;
		for node in &snapshot.nodes {
			if !unvisited.contains(&node.id) {
				continue;
			}
			let d = distance[&node.id];
			if d < best {
				best = d;
				current = Some(node.id);
			}
		}

		// Only unreachable nodes remain.
		let Some(current) = current else {
			break;
		};
		if current == target {
			break;
		}
		unvisited.remove(&current);

		for &(neighbor, cost) in adjacency.neighbors(current) {
			if !unvisited.contains(&neighbor) {
				continue;
			}
			let candidate = distance[&current] + cost;
			if candidate < distance[&neighbor] {
				distance.insert(neighbor, candidate);
				previous.insert(neighbor, current);
			}
		}
	}

	let total_cost = distance[&target];
	if !total_cost.is_finite() {
		return PathResult::none();
	}

	let mut path = vec![target];
	let mut cursor = target;
	while let Some(&prior) = previous.get(&cursor) {
		path.push(prior);
		cursor = prior;
	}
	path.reverse();

	PathResult {
		path,
		total_cost,
		exists: true,
	}
}
