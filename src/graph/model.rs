//! Graph data model: club and connection records, nodes, edges, snapshots.
//!
//! Raw club/connection records are deserialized from the embedded data
//! payload and assembled into a [`GraphSnapshot`] by [`SnapshotBuilder`].
//! Snapshots are immutable by convention: any edit builds a whole new
//! snapshot, and a build that fails validation leaves the previous one
//! untouched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{adjacency, connectivity};

/// Stable integer identifier for a club node.
pub type NodeId = u32;

/// The kind of relationship a connection represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionType {
	Rivalry,
	Friendly,
	Geographic,
	Historical,
	Business,
	PlayerTransfer,
	CoachingStaff,
	Partnership,
	Transfer,
	Loan,
	YouthDevelopment,
	Management,
}

impl ConnectionType {
	/// Wire/display name, matching the serialized form.
	pub fn as_str(self) -> &'static str {
		match self {
			ConnectionType::Rivalry => "rivalry",
			ConnectionType::Friendly => "friendly",
			ConnectionType::Geographic => "geographic",
			ConnectionType::Historical => "historical",
			ConnectionType::Business => "business",
			ConnectionType::PlayerTransfer => "player-transfer",
			ConnectionType::CoachingStaff => "coaching-staff",
			ConnectionType::Partnership => "partnership",
			ConnectionType::Transfer => "transfer",
			ConnectionType::Loan => "loan",
			ConnectionType::YouthDevelopment => "youth-development",
			ConnectionType::Management => "management",
		}
	}
}

/// Coarse strength tag carried alongside the numeric weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStrength {
	Weak,
	Moderate,
	Strong,
}

impl ConnectionStrength {
	/// Wire/display name, matching the serialized form.
	pub fn as_str(self) -> &'static str {
		match self {
			ConnectionStrength::Weak => "weak",
			ConnectionStrength::Moderate => "moderate",
			ConnectionStrength::Strong => "strong",
		}
	}
}

/// A club as delivered by the data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClubRecord {
	/// Unique identifier, stable across reloads.
	pub id: NodeId,
	pub name: String,
	pub league: String,
	pub city: String,
	/// Founding year.
	pub founded: i32,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
}

impl ClubRecord {
	/// Geographic coordinates as (latitude, longitude), if both are present.
	pub fn coordinates(&self) -> Option<(f64, f64)> {
		match (self.latitude, self.longitude) {
			(Some(lat), Some(lon)) => Some((lat, lon)),
			_ => None,
		}
	}
}

/// An inter-club connection as delivered by the data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
	pub source: NodeId,
	pub target: NodeId,
	#[serde(rename = "type")]
	pub connection_type: ConnectionType,
	pub strength: ConnectionStrength,
	/// Relationship strength, 0–100.
	pub weight: f64,
	#[serde(default = "default_active")]
	pub active: bool,
	#[serde(default)]
	pub start_date: Option<NaiveDate>,
	#[serde(default)]
	pub end_date: Option<NaiveDate>,
}

fn default_active() -> bool {
	true
}

/// Shape used when drawing a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
	#[default]
	Circle,
	Square,
	Diamond,
}

/// Rendering attributes attached to a node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeVisual {
	/// Size multiplier (1.0 = normal, >1.0 = larger/more connected).
	pub size: f64,
	/// Optional CSS color override; when unset the theme derives a color
	/// from the club's league.
	pub color: Option<String>,
	pub shape: NodeShape,
	/// Optional fixed layout position, exempt from the force simulation.
	pub fixed_position: Option<(f64, f64)>,
}

impl Default for NodeVisual {
	fn default() -> Self {
		Self {
			size: 1.0,
			color: None,
			shape: NodeShape::Circle,
			fixed_position: None,
		}
	}
}

/// A node in the graph: one club plus its display attributes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: NodeId,
	pub label: String,
	pub club: ClubRecord,
	pub visual: NodeVisual,
}

/// An edge between two clubs.
///
/// Direction is meaningful for some connection types (a transfer has a
/// selling and a buying club) but every analysis treats edges as
/// undirected.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Derived identifier, unique within a snapshot.
	pub id: String,
	pub source: NodeId,
	pub target: NodeId,
	pub connection_type: ConnectionType,
	pub strength: ConnectionStrength,
	/// Relationship strength, 0–100. Strong relationships are cheap to
	/// traverse: path cost is `100 − weight`.
	pub weight: f64,
	pub active: bool,
	pub start_date: Option<NaiveDate>,
	pub end_date: Option<NaiveDate>,
}

impl GraphEdge {
	/// Traversal cost used by the path finder.
	pub fn cost(&self) -> f64 {
		(100.0 - self.weight).max(0.0)
	}

	/// Whether the edge touches the given node.
	pub fn touches(&self, id: NodeId) -> bool {
		self.source == id || self.target == id
	}

	/// The endpoint opposite `id`, if the edge touches it.
	pub fn other_endpoint(&self, id: NodeId) -> Option<NodeId> {
		if self.source == id {
			Some(self.target)
		} else if self.target == id {
			Some(self.source)
		} else {
			None
		}
	}

	fn derive_id(source: NodeId, target: NodeId, connection_type: ConnectionType) -> String {
		format!("{}-{}-{}", source, target, connection_type.as_str())
	}
}

/// Derived statistics for a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphMetadata {
	pub total_nodes: usize,
	pub total_edges: usize,
	/// Undirected density: `2E / (V * (V − 1))`, 0 for fewer than two nodes.
	pub density: f64,
	pub component_count: usize,
	pub average_degree: f64,
	pub min_degree: usize,
	pub max_degree: usize,
	pub generated_at: DateTime<Utc>,
}

impl GraphMetadata {
	/// Recompute all derived statistics from a node/edge listing.
	pub fn compute(nodes: &[GraphNode], edges: &[GraphEdge], generated_at: DateTime<Utc>) -> Self {
		let total_nodes = nodes.len();
		let total_edges = edges.len();
		let density = if total_nodes > 1 {
			2.0 * total_edges as f64 / (total_nodes as f64 * (total_nodes - 1) as f64)
		} else {
			0.0
		};

		let adjacency = adjacency::build(nodes, edges);
		let degrees: Vec<usize> = nodes.iter().map(|n| adjacency.degree(n.id)).collect();
		let min_degree = degrees.iter().copied().min().unwrap_or(0);
		let max_degree = degrees.iter().copied().max().unwrap_or(0);
		let average_degree = if total_nodes > 0 {
			degrees.iter().sum::<usize>() as f64 / total_nodes as f64
		} else {
			0.0
		};

		let component_count = connectivity::connected_components(nodes, edges).len();

		Self {
			total_nodes,
			total_edges,
			density,
			component_count,
			average_degree,
			min_degree,
			max_degree,
			generated_at,
		}
	}
}

/// An immutable-by-convention graph at a point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
	pub metadata: GraphMetadata,
}

impl GraphSnapshot {
	/// An empty snapshot, used as the fallback when loading fails.
	pub fn empty(generated_at: DateTime<Utc>) -> Self {
		Self {
			metadata: GraphMetadata::compute(&[], &[], generated_at),
			nodes: Vec::new(),
			edges: Vec::new(),
		}
	}

	/// Look up a node by id.
	pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Whether a node with the given id exists.
	pub fn contains_node(&self, id: NodeId) -> bool {
		self.node(id).is_some()
	}

	/// Look up an edge by its derived id.
	pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Whether the two nodes are directly connected, in either direction.
	pub fn has_edge_between(&self, a: NodeId, b: NodeId) -> bool {
		self.edges
			.iter()
			.any(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
	}
}

/// A single problem found while validating input data.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
	#[error("duplicate node id {id}")]
	DuplicateNodeId { id: NodeId },
	#[error("connection {source}->{target} is a self-loop")]
	SelfLoop { source: NodeId, target: NodeId },
	#[error("connection {edge_id} references unknown club {node}")]
	UnknownEndpoint { edge_id: String, node: NodeId },
	#[error("connection {edge_id} weight {weight} is outside 0–100")]
	WeightOutOfRange { edge_id: String, weight: f64 },
	#[error("filter range {field} has minimum greater than maximum")]
	InvalidRange { field: &'static str },
}

/// Assembles a validated [`GraphSnapshot`] from raw records.
///
/// Problems are collected rather than reported one at a time; `build`
/// fails with the full list so callers can surface every issue at once.
pub struct SnapshotBuilder {
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	errors: Vec<ValidationError>,
}

impl SnapshotBuilder {
	/// Start from raw club and connection records.
	pub fn from_records(clubs: &[ClubRecord], connections: &[ConnectionRecord]) -> Self {
		let mut builder = Self {
			nodes: Vec::with_capacity(clubs.len()),
			edges: Vec::with_capacity(connections.len()),
			errors: Vec::new(),
		};

		for club in clubs {
			builder.add_club(club.clone());
		}
		for connection in connections {
			builder.add_connection(connection);
		}
		builder.size_nodes_by_degree();
		builder
	}

	fn add_club(&mut self, club: ClubRecord) {
		if self.nodes.iter().any(|n| n.id == club.id) {
			self.errors.push(ValidationError::DuplicateNodeId { id: club.id });
			return;
		}
		self.nodes.push(GraphNode {
			id: club.id,
			label: club.name.clone(),
			club,
			visual: NodeVisual::default(),
		});
	}

	fn add_connection(&mut self, record: &ConnectionRecord) {
		let edge_id = GraphEdge::derive_id(record.source, record.target, record.connection_type);

		if record.source == record.target {
			self.errors.push(ValidationError::SelfLoop {
				source: record.source,
				target: record.target,
			});
			return;
		}
		let mut valid = true;
		for endpoint in [record.source, record.target] {
			if !self.nodes.iter().any(|n| n.id == endpoint) {
				self.errors.push(ValidationError::UnknownEndpoint {
					edge_id: edge_id.clone(),
					node: endpoint,
				});
				valid = false;
			}
		}
		if !(0.0..=100.0).contains(&record.weight) {
			self.errors.push(ValidationError::WeightOutOfRange {
				edge_id: edge_id.clone(),
				weight: record.weight,
			});
			valid = false;
		}
		if !valid {
			return;
		}

		self.edges.push(GraphEdge {
			id: edge_id,
			source: record.source,
			target: record.target,
			connection_type: record.connection_type,
			strength: record.strength,
			weight: record.weight,
			active: record.active,
			start_date: record.start_date,
			end_date: record.end_date,
		});
	}

	/// Scale node sizes by connectivity so hubs render larger, the same
	/// sqrt softening the canvas uses for label emphasis.
	fn size_nodes_by_degree(&mut self) {
		let adjacency = adjacency::build(&self.nodes, &self.edges);
		let max_degree = self
			.nodes
			.iter()
			.map(|n| adjacency.degree(n.id))
			.max()
			.unwrap_or(1)
			.max(1);

		for node in &mut self.nodes {
			let factor = (adjacency.degree(node.id) as f64 / max_degree as f64).sqrt();
			node.visual.size = 1.0 + 0.8 * factor;
		}
	}

	/// Finish the build: a snapshot if everything validated, otherwise the
	/// complete error list.
	pub fn build(self, generated_at: DateTime<Utc>) -> Result<GraphSnapshot, Vec<ValidationError>> {
		if !self.errors.is_empty() {
			return Err(self.errors);
		}
		let metadata = GraphMetadata::compute(&self.nodes, &self.edges, generated_at);
		Ok(GraphSnapshot {
			nodes: self.nodes,
			edges: self.edges,
			metadata,
		})
	}
}
