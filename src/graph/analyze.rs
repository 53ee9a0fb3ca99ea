//! Whole-graph analysis report.
//!
//! Aggregates degree bookkeeping, centrality estimates and community
//! groupings into one pure-function report over a snapshot.
//!
//! The betweenness/closeness/eigenvector figures are **degree-derived
//! estimates**, not the true algorithms: the scores rank hubs the same way
//! degree does, which is what the visualization needs from them. The
//! same goes for community modularity, reported as a fixed placeholder.

use std::collections::HashMap;

use super::adjacency;
use super::connectivity;
use super::model::{GraphSnapshot, NodeId};

/// Entries kept in each ranking table.
const TOP_N: usize = 10;

/// Degree-proxy centrality estimates, normalized to [0, 1].
#[derive(Clone, Debug, Default)]
pub struct CentralityEstimates {
	/// Degree centrality: `degree / (V − 1)`.
	pub degree: HashMap<NodeId, f64>,
	/// Estimate only — scales with degree centrality.
	pub betweenness: HashMap<NodeId, f64>,
	/// Estimate only — scales with degree centrality.
	pub closeness: HashMap<NodeId, f64>,
	/// Estimate only — degree relative to the best-connected node.
	pub eigenvector: HashMap<NodeId, f64>,
}

/// One community per connected component.
#[derive(Clone, Debug)]
pub struct Community {
	pub id: usize,
	pub members: Vec<NodeId>,
	/// Placeholder value, always 0.0; a real modularity measure is not
	/// computed.
	pub modularity: f64,
}

/// A node and its score in one of the ranking tables.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedNode {
	pub id: NodeId,
	pub label: String,
	pub score: f64,
}

/// Full analysis output for a snapshot.
#[derive(Clone, Debug, Default)]
pub struct GraphAnalysisReport {
	/// Edges incident to each node.
	pub degrees: HashMap<NodeId, usize>,
	pub centrality: CentralityEstimates,
	pub communities: Vec<Community>,
	pub top_by_degree: Vec<RankedNode>,
	pub top_by_betweenness: Vec<RankedNode>,
	pub top_by_closeness: Vec<RankedNode>,
	pub top_by_eigenvector: Vec<RankedNode>,
}

/// Analyze a snapshot. Pure: no caches, no side effects.
pub fn analyze(snapshot: &GraphSnapshot) -> GraphAnalysisReport {
	let adjacency = adjacency::build(&snapshot.nodes, &snapshot.edges);
	let node_count = snapshot.nodes.len();

	let degrees: HashMap<NodeId, usize> = snapshot
		.nodes
		.iter()
		.map(|n| (n.id, adjacency.degree(n.id)))
		.collect();

	let max_degree = degrees.values().copied().max().unwrap_or(0).max(1);
	let scale = if node_count > 1 {
		1.0 / (node_count - 1) as f64
	} else {
		0.0
	};

	let mut centrality = CentralityEstimates::default();
	for node in &snapshot.nodes {
		let degree = degrees[&node.id] as f64;
		let normalized = degree * scale;
		centrality.degree.insert(node.id, normalized);
		centrality.betweenness.insert(node.id, normalized);
		centrality.closeness.insert(node.id, normalized);
		centrality.eigenvector.insert(node.id, degree / max_degree as f64);
	}

	let communities = connectivity::connected_components(&snapshot.nodes, &snapshot.edges)
		.into_iter()
		.enumerate()
		.map(|(id, members)| Community {
			id,
			members,
			modularity: 0.0,
		})
		.collect();

	GraphAnalysisReport {
		top_by_degree: top_ranking(snapshot, &centrality.degree),
		top_by_betweenness: top_ranking(snapshot, &centrality.betweenness),
		top_by_closeness: top_ranking(snapshot, &centrality.closeness),
		top_by_eigenvector: top_ranking(snapshot, &centrality.eigenvector),
		degrees,
		centrality,
		communities,
	}
}

/// Top-ranked nodes by score, descending; ties keep snapshot order.
fn top_ranking(snapshot: &GraphSnapshot, scores: &HashMap<NodeId, f64>) -> Vec<RankedNode> {
	let mut ranked: Vec<RankedNode> = snapshot
		.nodes
		.iter()
		.map(|n| RankedNode {
			id: n.id,
			label: n.label.clone(),
			score: scores.get(&n.id).copied().unwrap_or(0.0),
		})
		.collect();
	ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
	ranked.truncate(TOP_N);
	ranked
}

#[cfg(test)]
mod tests {
	use super::super::model::tests::{club, connection, snapshot};
	use super::*;

	fn star() -> GraphSnapshot {
		// Node 1 is the hub of a 4-node star plus one isolated node.
		snapshot(
			&[
				club(1, "Hub", "L1", "X"),
				club(2, "B", "L1", "Y"),
				club(3, "C", "L2", "Z"),
				club(4, "D", "L2", "W"),
				club(5, "Isolated", "L3", "V"),
			],
			&[connection(1, 2, 50.0), connection(1, 3, 50.0), connection(1, 4, 50.0)],
		)
	}

	#[test]
	fn degree_map_matches_incident_edges() {
		let report = analyze(&star());
		assert_eq!(report.degrees[&1], 3);
		assert_eq!(report.degrees[&2], 1);
		assert_eq!(report.degrees[&5], 0);
		let degree_sum: usize = report.degrees.values().sum();
		assert_eq!(degree_sum, 2 * 3);
	}

	#[test]
	fn centrality_estimates_track_degree() {
		let report = analyze(&star());
		// 5 nodes: hub degree 3 / (V − 1) = 0.75, eigenvector proxy 3/3 = 1.
		assert!((report.centrality.degree[&1] - 0.75).abs() < 1e-9);
		assert!((report.centrality.betweenness[&1] - 0.75).abs() < 1e-9);
		assert!((report.centrality.closeness[&1] - 0.75).abs() < 1e-9);
		assert!((report.centrality.eigenvector[&1] - 1.0).abs() < 1e-9);
		assert_eq!(report.centrality.eigenvector[&5], 0.0);
	}

	#[test]
	fn one_community_per_component_with_placeholder_modularity() {
		let report = analyze(&star());
		assert_eq!(report.communities.len(), 2);
		assert!(report.communities.iter().all(|c| c.modularity == 0.0));
		let sizes: Vec<usize> = report.communities.iter().map(|c| c.members.len()).collect();
		assert!(sizes.contains(&4));
		assert!(sizes.contains(&1));
	}

	#[test]
	fn rankings_are_descending_and_capped() {
		let report = analyze(&star());
		assert_eq!(report.top_by_degree.first().map(|r| r.id), Some(1));
		for pair in report.top_by_degree.windows(2) {
			assert!(pair[0].score >= pair[1].score);
		}
		assert!(report.top_by_degree.len() <= 10);
	}

	#[test]
	fn empty_snapshot_yields_empty_report() {
		let snap = snapshot(&[], &[]);
		let report = analyze(&snap);
		assert!(report.degrees.is_empty());
		assert!(report.communities.is_empty());
		assert!(report.top_by_degree.is_empty());
	}
}
