//! Non-destructive graph filtering.
//!
//! [`apply_filters`] derives a new snapshot from the current one; the
//! source is never mutated. Node and edge predicates are independent of
//! each other, a post-pass drops edges whose endpoints were filtered out,
//! and the layout passes run last.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::adjacency;
use super::connectivity;
use super::model::{
	ConnectionStrength, ConnectionType, GraphEdge, GraphMetadata, GraphNode, GraphSnapshot,
	ValidationError,
};

/// Edges below this weight are dropped by "hide weak connections".
const WEAK_EDGE_THRESHOLD: f64 = 30.0;

/// Optional inclusive bounds over an ordered attribute.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter<T> {
	pub min: Option<T>,
	pub max: Option<T>,
}

impl<T: PartialOrd> RangeFilter<T> {
	/// Whether `value` satisfies the configured bounds.
	pub fn contains(&self, value: &T) -> bool {
		if let Some(min) = &self.min {
			if value < min {
				return false;
			}
		}
		if let Some(max) = &self.max {
			if value > max {
				return false;
			}
		}
		true
	}

	fn is_well_formed(&self) -> bool {
		match (&self.min, &self.max) {
			(Some(min), Some(max)) => min <= max,
			_ => true,
		}
	}
}

/// Predicates over node (club) attributes. Empty collections mean
/// "no restriction".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeFilters {
	pub leagues: Vec<String>,
	pub cities: Vec<String>,
	pub founded: RangeFilter<i32>,
	/// Keep only clubs with geographic coordinates.
	pub requires_coordinates: bool,
	/// Degree measured on the unfiltered source snapshot.
	pub degree: RangeFilter<usize>,
}

/// Predicates over edge (connection) attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeFilters {
	pub types: Vec<ConnectionType>,
	pub strengths: Vec<ConnectionStrength>,
	pub weight: RangeFilter<f64>,
	/// `Some(true)` keeps only active edges, `Some(false)` only inactive.
	pub active: Option<bool>,
	/// `Some(true)` keeps only ended connections, `Some(false)` only open ones.
	pub has_end_date: Option<bool>,
}

/// Whole-layout toggles applied after the attribute predicates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutFilters {
	pub hide_isolated_nodes: bool,
	pub hide_weak_connections: bool,
	pub largest_component_only: bool,
}

/// Complete filter configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
	pub node: NodeFilters,
	pub edge: EdgeFilters,
	pub layout: LayoutFilters,
}

impl FilterCriteria {
	/// Check every configured range, reporting all malformed ones at once.
	pub fn validate(&self) -> Vec<ValidationError> {
		let mut errors = Vec::new();
		if !self.node.founded.is_well_formed() {
			errors.push(ValidationError::InvalidRange { field: "founded" });
		}
		if !self.node.degree.is_well_formed() {
			errors.push(ValidationError::InvalidRange { field: "degree" });
		}
		if !self.edge.weight.is_well_formed() {
			errors.push(ValidationError::InvalidRange { field: "weight" });
		}
		errors
	}
}

/// Apply `criteria` to `snapshot`, producing a new filtered snapshot.
///
/// Pass order: node predicates and edge predicates independently, then
/// the endpoint post-pass, then the layout toggles (isolated nodes are
/// judged on post-predicate degree; weak edges use the fixed threshold of
/// 30; the largest component is recomputed on the already-filtered
/// graph). Metadata is recomputed from what survived, not copied.
pub fn apply_filters(snapshot: &GraphSnapshot, criteria: &FilterCriteria) -> GraphSnapshot {
	let source_adjacency = adjacency::build(&snapshot.nodes, &snapshot.edges);

	let mut nodes: Vec<_> = snapshot
		.nodes
		.iter()
		.filter(|node| {
			let club = &node.club;
			(criteria.node.leagues.is_empty() || criteria.node.leagues.contains(&club.league))
				&& (criteria.node.cities.is_empty() || criteria.node.cities.contains(&club.city))
				&& criteria.node.founded.contains(&club.founded)
				&& (!criteria.node.requires_coordinates || club.coordinates().is_some())
				&& criteria.node.degree.contains(&source_adjacency.degree(node.id))
		})
		.cloned()
		.collect();

	let mut edges: Vec<_> = snapshot
		.edges
		.iter()
		.filter(|edge| {
			(criteria.edge.types.is_empty() || criteria.edge.types.contains(&edge.connection_type))
				&& (criteria.edge.strengths.is_empty()
					|| criteria.edge.strengths.contains(&edge.strength))
				&& criteria.edge.weight.contains(&edge.weight)
				&& criteria.edge.active.map_or(true, |want| edge.active == want)
				&& criteria
					.edge
					.has_end_date
					.map_or(true, |want| edge.end_date.is_some() == want)
		})
		.cloned()
		.collect();

	// Post-pass: an edge only survives if both endpoints did.
	retain_consistent_edges(&mut edges, &nodes);

	if criteria.layout.hide_isolated_nodes {
		let filtered_adjacency = adjacency::build(&nodes, &edges);
		nodes.retain(|node| filtered_adjacency.degree(node.id) > 0);
	}

	if criteria.layout.hide_weak_connections {
		edges.retain(|edge| edge.weight >= WEAK_EDGE_THRESHOLD);
	}

	if criteria.layout.largest_component_only {
		let components = connectivity::connected_components(&nodes, &edges);
		if let Some(keep) = connectivity::largest_component(&components) {
			let keep: HashSet<_> = keep.iter().copied().collect();
			nodes.retain(|node| keep.contains(&node.id));
		}
	}

	// Layout passes can remove nodes; re-establish endpoint consistency.
	retain_consistent_edges(&mut edges, &nodes);

	let metadata = GraphMetadata::compute(&nodes, &edges, snapshot.metadata.generated_at);
	GraphSnapshot {
		nodes,
		edges,
		metadata,
	}
}

fn retain_consistent_edges(edges: &mut Vec<GraphEdge>, nodes: &[GraphNode]) {
	let ids: HashSet<_> = nodes.iter().map(|n| n.id).collect();
	edges.retain(|edge| ids.contains(&edge.source) && ids.contains(&edge.target));
}

#[cfg(test)]
mod tests {
	use super::super::model::tests::{club, connection, snapshot};
	use super::super::model::ConnectionRecord;
	use super::*;

	fn weighted(source: u32, target: u32, weight: f64) -> ConnectionRecord {
		connection(source, target, weight)
	}

	fn fixture() -> GraphSnapshot {
		snapshot(
			&[
				club(1, "A", "L1", "X"),
				club(2, "B", "L1", "Y"),
				club(3, "C", "L2", "X"),
				club(4, "D", "L2", "Z"),
				club(5, "E", "L3", "W"),
			],
			&[
				weighted(1, 2, 80.0),
				weighted(2, 3, 20.0),
				weighted(3, 4, 60.0),
			],
		)
	}

	#[test]
	fn league_filter_drops_dangling_edges() {
		let criteria = FilterCriteria {
			node: NodeFilters {
				leagues: vec!["L1".to_string()],
				..Default::default()
			},
			..Default::default()
		};
		let filtered = apply_filters(&fixture(), &criteria);
		assert_eq!(filtered.nodes.len(), 2);
		assert_eq!(filtered.edges.len(), 1);
		let ids: HashSet<_> = filtered.nodes.iter().map(|n| n.id).collect();
		for edge in &filtered.edges {
			assert!(ids.contains(&edge.source) && ids.contains(&edge.target));
		}
	}

	#[test]
	fn degree_sum_invariant_holds_after_filtering() {
		let criteria = FilterCriteria {
			edge: EdgeFilters {
				weight: RangeFilter {
					min: Some(50.0),
					max: None,
				},
				..Default::default()
			},
			..Default::default()
		};
		let filtered = apply_filters(&fixture(), &criteria);
		let adjacency = adjacency::build(&filtered.nodes, &filtered.edges);
		let degree_sum: usize = filtered.nodes.iter().map(|n| adjacency.degree(n.id)).sum();
		assert_eq!(degree_sum, 2 * filtered.edges.len());
	}

	#[test]
	fn hide_isolated_removes_degree_zero_after_edge_filtering() {
		let criteria = FilterCriteria {
			edge: EdgeFilters {
				weight: RangeFilter {
					min: Some(50.0),
					max: None,
				},
				..Default::default()
			},
			layout: LayoutFilters {
				hide_isolated_nodes: true,
				..Default::default()
			},
			..Default::default()
		};
		// Edge 2–3 (weight 20) is filtered; 1–2 and 3–4 remain, leaving
		// only the edgeless node 5 at degree 0.
		let filtered = apply_filters(&fixture(), &criteria);
		let ids: HashSet<_> = filtered.nodes.iter().map(|n| n.id).collect();
		assert_eq!(ids, HashSet::from([1, 2, 3, 4]));
	}

	#[test]
	fn hide_weak_uses_fixed_threshold() {
		let criteria = FilterCriteria {
			layout: LayoutFilters {
				hide_weak_connections: true,
				..Default::default()
			},
			..Default::default()
		};
		let filtered = apply_filters(&fixture(), &criteria);
		assert!(filtered.edges.iter().all(|e| e.weight >= 30.0));
		assert_eq!(filtered.edges.len(), 2);
		// Nodes are untouched by the edge-only pass.
		assert_eq!(filtered.nodes.len(), 5);
	}

	#[test]
	fn largest_component_only_keeps_the_biggest() {
		let snap = snapshot(
			&[
				club(1, "A", "L1", "X"),
				club(2, "B", "L1", "Y"),
				club(3, "C", "L2", "Z"),
				club(4, "D", "L2", "W"),
				club(5, "E", "L3", "V"),
			],
			&[weighted(1, 2, 50.0), weighted(2, 3, 50.0), weighted(4, 5, 50.0)],
		);
		let criteria = FilterCriteria {
			layout: LayoutFilters {
				largest_component_only: true,
				..Default::default()
			},
			..Default::default()
		};
		let filtered = apply_filters(&snap, &criteria);
		let ids: HashSet<_> = filtered.nodes.iter().map(|n| n.id).collect();
		assert_eq!(ids, HashSet::from([1, 2, 3]));
		assert_eq!(filtered.edges.len(), 2);
	}

	#[test]
	fn metadata_is_recomputed_not_copied() {
		let criteria = FilterCriteria {
			node: NodeFilters {
				leagues: vec!["L1".to_string()],
				..Default::default()
			},
			..Default::default()
		};
		let source = fixture();
		let filtered = apply_filters(&source, &criteria);
		assert_eq!(filtered.metadata.total_nodes, 2);
		assert_eq!(filtered.metadata.total_edges, 1);
		assert_eq!(filtered.metadata.component_count, 1);
		assert!(filtered.metadata.density > source.metadata.density);
		assert_eq!(filtered.metadata.generated_at, source.metadata.generated_at);
	}

	#[test]
	fn source_snapshot_is_untouched() {
		let source = fixture();
		let criteria = FilterCriteria {
			layout: LayoutFilters {
				hide_weak_connections: true,
				hide_isolated_nodes: true,
				..Default::default()
			},
			..Default::default()
		};
		let _ = apply_filters(&source, &criteria);
		assert_eq!(source.nodes.len(), 5);
		assert_eq!(source.edges.len(), 3);
	}

	#[test]
	fn malformed_ranges_are_reported_together() {
		let criteria = FilterCriteria {
			node: NodeFilters {
				founded: RangeFilter {
					min: Some(2000),
					max: Some(1900),
				},
				degree: RangeFilter {
					min: Some(5),
					max: Some(1),
				},
				..Default::default()
			},
			edge: EdgeFilters {
				weight: RangeFilter {
					min: Some(90.0),
					max: Some(10.0),
				},
				..Default::default()
			},
			..Default::default()
		};
		let errors = criteria.validate();
		assert_eq!(errors.len(), 3);
		assert!(errors.iter().all(|e| matches!(e, ValidationError::InvalidRange { .. })));
	}

	#[test]
	fn edge_attribute_filters_apply_independently() {
		let mut records = vec![weighted(1, 2, 80.0), weighted(2, 3, 80.0)];
		records[1].active = false;
		let snap = snapshot(
			&[club(1, "A", "L1", "X"), club(2, "B", "L1", "Y"), club(3, "C", "L1", "Z")],
			&records,
		);
		let criteria = FilterCriteria {
			edge: EdgeFilters {
				active: Some(true),
				..Default::default()
			},
			..Default::default()
		};
		let filtered = apply_filters(&snap, &criteria);
		assert_eq!(filtered.edges.len(), 1);
		assert!(filtered.edges[0].active);
		assert_eq!(filtered.nodes.len(), 3);
	}
}
