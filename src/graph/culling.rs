//! Viewport culling: hide off-screen and over-budget elements.
//!
//! Culling never touches the data model — it only computes visibility
//! flags the renderer consults. Recomputation is throttled to the frame
//! budget and works from current positions every time, so repeated calls
//! with the same inputs are idempotent.

use std::collections::HashSet;

use super::model::NodeId;

/// Culling activates once the graph crosses this node count.
const CULLING_NODE_THRESHOLD: usize = 1000;
/// Minimum interval between visibility recomputations (one 60 Hz frame).
const THROTTLE_MS: f64 = 16.0;
/// World-space margin so elements do not pop at the viewport border.
const VIEWPORT_PADDING: f64 = 50.0;

/// Axis-aligned visible rectangle in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportRect {
	pub left: f64,
	pub top: f64,
	pub right: f64,
	pub bottom: f64,
}

impl ViewportRect {
	/// The world-space rectangle a `width`×`height` canvas shows under a
	/// pan/zoom transform (screen = world * zoom + offset), padded so
	/// edge-of-screen nodes stay visible.
	pub fn from_transform(offset_x: f64, offset_y: f64, zoom: f64, width: f64, height: f64) -> Self {
		let zoom = zoom.max(f64::EPSILON);
		Self {
			left: (0.0 - offset_x) / zoom - VIEWPORT_PADDING,
			top: (0.0 - offset_y) / zoom - VIEWPORT_PADDING,
			right: (width - offset_x) / zoom + VIEWPORT_PADDING,
			bottom: (height - offset_y) / zoom + VIEWPORT_PADDING,
		}
	}

	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
	}
}

/// Visibility flags for the current viewport.
#[derive(Clone, Debug, Default)]
pub struct CullingState {
	/// Explicit on/off override; `None` defers to the node-count threshold.
	override_enabled: Option<bool>,
	active: bool,
	last_recompute_ms: Option<f64>,
	visible_nodes: HashSet<NodeId>,
	visible_edges: HashSet<usize>,
}

impl CullingState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Force culling on or off, or hand control back to the threshold.
	pub fn set_override(&mut self, enabled: Option<bool>) {
		self.override_enabled = enabled;
	}

	/// Re-evaluate activation for the current graph size. Deactivation
	/// clears the flags so everything renders again.
	pub fn sync_activation(&mut self, node_count: usize) -> bool {
		let active = self
			.override_enabled
			.unwrap_or(node_count > CULLING_NODE_THRESHOLD);
		if self.active && !active {
			self.visible_nodes.clear();
			self.visible_edges.clear();
			self.last_recompute_ms = None;
		}
		self.active = active;
		active
	}

	pub fn is_active(&self) -> bool {
		self.active
	}

	/// Recompute visibility for a viewport change.
	///
	/// `positions` pairs each node id with its current world position;
	/// `edges` lists endpoint pairs in edge order. In-bounds nodes beyond
	/// `max_visible_nodes` are hidden too (first-come in node order), and
	/// an edge is visible only when both endpoints are. Returns whether a
	/// recomputation actually ran: calls inside the throttle interval are
	/// skipped.
	pub fn update(
		&mut self,
		now_ms: f64,
		viewport: &ViewportRect,
		positions: &[(NodeId, f64, f64)],
		edges: &[(NodeId, NodeId)],
		max_visible_nodes: usize,
	) -> bool {
		if !self.active {
			return false;
		}
		if let Some(last) = self.last_recompute_ms {
			if now_ms - last < THROTTLE_MS {
				return false;
			}
		}
		self.last_recompute_ms = Some(now_ms);

		self.visible_nodes.clear();
		for &(id, x, y) in positions {
			if self.visible_nodes.len() >= max_visible_nodes {
				break;
			}
			if viewport.contains(x, y) {
				self.visible_nodes.insert(id);
			}
		}

		self.visible_edges.clear();
		for (index, &(source, target)) in edges.iter().enumerate() {
			if self.visible_nodes.contains(&source) && self.visible_nodes.contains(&target) {
				self.visible_edges.insert(index);
			}
		}
		true
	}

	/// Whether a node should be drawn. Everything is visible while
	/// culling is inactive.
	pub fn node_visible(&self, id: NodeId) -> bool {
		!self.active || self.visible_nodes.contains(&id)
	}

	/// Whether the edge at `index` should be drawn.
	pub fn edge_visible(&self, index: usize) -> bool {
		!self.active || self.visible_edges.contains(&index)
	}

	pub fn visible_node_count(&self) -> usize {
		self.visible_nodes.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// A threshold-crossing synthetic graph: nodes on a grid, a chain of
	/// edges between consecutive nodes.
	fn synthetic(count: usize) -> (Vec<(NodeId, f64, f64)>, Vec<(NodeId, NodeId)>) {
		let positions: Vec<(NodeId, f64, f64)> = (0..count)
			.map(|i| (i as NodeId, (i % 40) as f64 * 10.0, (i / 40) as f64 * 10.0))
			.collect();
		let edges: Vec<(NodeId, NodeId)> = (1..count)
			.map(|i| ((i - 1) as NodeId, i as NodeId))
			.collect();
		(positions, edges)
	}

	fn wide_open() -> ViewportRect {
		ViewportRect {
			left: -1e6,
			top: -1e6,
			right: 1e6,
			bottom: 1e6,
		}
	}

	#[test]
	fn inactive_below_threshold_and_everything_visible() {
		let mut culling = CullingState::new();
		assert!(!culling.sync_activation(1000));
		assert!(culling.node_visible(1));
		assert!(culling.edge_visible(0));
		assert!(culling.sync_activation(1001));
	}

	#[test]
	fn override_wins_over_threshold() {
		let mut culling = CullingState::new();
		culling.set_override(Some(true));
		assert!(culling.sync_activation(10));
		culling.set_override(Some(false));
		assert!(!culling.sync_activation(5000));
		culling.set_override(None);
		assert!(culling.sync_activation(5000));
	}

	#[test]
	fn caps_visible_nodes_and_keeps_edges_consistent() {
		let (positions, edges) = synthetic(1200);
		let mut culling = CullingState::new();
		culling.sync_activation(1200);

		assert!(culling.update(0.0, &wide_open(), &positions, &edges, 500));
		assert!(culling.visible_node_count() <= 500);
		for (index, &(source, target)) in edges.iter().enumerate() {
			if culling.edge_visible(index) {
				assert!(culling.node_visible(source) && culling.node_visible(target));
			}
		}
	}

	#[test]
	fn culls_nodes_outside_the_viewport() {
		let positions = vec![(0, 0.0, 0.0), (1, 2000.0, 2000.0), (2, 10.0, 10.0)];
		let edges = vec![(0, 1), (0, 2)];
		let viewport = ViewportRect {
			left: -100.0,
			top: -100.0,
			right: 100.0,
			bottom: 100.0,
		};
		let mut culling = CullingState::new();
		culling.set_override(Some(true));
		culling.sync_activation(3);
		culling.update(0.0, &viewport, &positions, &edges, 500);

		assert!(culling.node_visible(0) && culling.node_visible(2));
		assert!(!culling.node_visible(1));
		assert!(!culling.edge_visible(0), "edge to an off-screen node is hidden");
		assert!(culling.edge_visible(1));
	}

	#[test]
	fn recomputation_is_throttled_to_the_frame_budget() {
		let (positions, edges) = synthetic(1200);
		let mut culling = CullingState::new();
		culling.sync_activation(1200);

		assert!(culling.update(0.0, &wide_open(), &positions, &edges, 500));
		assert!(!culling.update(10.0, &wide_open(), &positions, &edges, 500));
		assert!(culling.update(16.0, &wide_open(), &positions, &edges, 500));
	}

	#[test]
	fn recomputation_is_idempotent() {
		let (positions, edges) = synthetic(1200);
		let mut culling = CullingState::new();
		culling.sync_activation(1200);
		culling.update(0.0, &wide_open(), &positions, &edges, 500);
		let first: Vec<bool> = positions.iter().map(|&(id, _, _)| culling.node_visible(id)).collect();
		culling.update(100.0, &wide_open(), &positions, &edges, 500);
		let second: Vec<bool> = positions.iter().map(|&(id, _, _)| culling.node_visible(id)).collect();
		assert_eq!(first, second);
	}

	#[test]
	fn deactivation_restores_full_visibility() {
		let (positions, edges) = synthetic(1200);
		let mut culling = CullingState::new();
		culling.sync_activation(1200);
		culling.update(0.0, &wide_open(), &positions, &edges, 500);
		assert!(!culling.node_visible(1100));

		culling.sync_activation(500);
		assert!(culling.node_visible(1100));
		assert!(culling.edge_visible(1150));
	}

	#[test]
	fn viewport_rect_follows_pan_and_zoom() {
		// Canvas 800×600, centered transform at 2× zoom.
		let rect = ViewportRect::from_transform(400.0, 300.0, 2.0, 800.0, 600.0);
		assert!(rect.contains(0.0, 0.0));
		assert!(rect.contains(-200.0, -150.0));
		assert!(!rect.contains(500.0, 0.0));
	}
}
