//! Graph simulation state and interaction tracking.
//!
//! Wraps the `force_graph` physics simulation with per-club metadata,
//! view transforms for pan/zoom, hover highlighting with smooth intensity
//! transitions, selection, shortest-path emphasis and the visibility
//! flags written by the culling pass.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::graph::culling::ViewportRect;
use crate::graph::model::{
	ConnectionStrength, ConnectionType, GraphSnapshot, NodeId, NodeShape,
};
use crate::graph::path::PathResult;
use crate::graph::store::GraphStore;

use super::scale::{ScaleConfig, ScaledValues};
use super::theme::Theme;

/// Per-club display metadata attached to each node in the simulation.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: NodeId,
	pub label: String,
	pub color: String,
	/// Size multiplier (1.0 = normal, >1.0 = better connected)
	pub size: f64,
	pub shape: NodeShape,
	/// Cleared by the culling pass when the node is off-screen or over
	/// the visible-node budget.
	pub visible: bool,
}

/// Styling and visibility for one rendered connection.
#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub a: DefaultNodeIdx,
	pub b: DefaultNodeIdx,
	pub source: NodeId,
	pub target: NodeId,
	pub connection_type: ConnectionType,
	pub strength: ConnectionStrength,
	pub weight: f64,
	pub active: bool,
	pub visible: bool,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Minimum time (seconds) a highlight is held before fading out, so the
/// mouse skirting a hover zone does not flash.
const MIN_HOLD_TIME: f64 = 0.12;

/// Hover highlighting with per-node intensity smoothing.
///
/// Each node carries its own intensity (0.0 to 1.0) animated with
/// exponential smoothing towards its target, giving ease-out transitions
/// instead of discrete highlight flips.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	/// Currently hovered node (if any)
	pub hovered_node: Option<DefaultNodeIdx>,
	/// Nodes that should be highlighted (hovered + neighbors)
	target_set: HashSet<DefaultNodeIdx>,
	/// Per-node highlight intensity; absent means 0.
	node_intensity: HashMap<DefaultNodeIdx, f64>,
	/// Per-node hold timer - time remaining before fade-out can begin
	hold_timer: HashMap<DefaultNodeIdx, f64>,
	/// Cached max intensity (updated each tick)
	cached_max: f64,
}

impl HighlightState {
	/// Update the hovered node and recompute the target highlight set
	/// from the edge list.
	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>, edges: &[EdgeInfo]) {
		if self.hovered_node == node {
			return;
		}

		self.hovered_node = node;
		self.target_set.clear();

		if let Some(idx) = node {
			self.target_set.insert(idx);
			for edge in edges {
				if edge.a == idx {
					self.target_set.insert(edge.b);
				} else if edge.b == idx {
					self.target_set.insert(edge.a);
				}
			}
			for &idx in &self.target_set {
				self.hold_timer.insert(idx, MIN_HOLD_TIME);
			}
		}
	}

	/// Animate intensities towards their targets with exponential
	/// smoothing: `value += (target − value) * (1 − e^(−speed·dt))`.
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 6.0;
		const FADE_OUT_SPEED: f64 = 4.0;

		let fade_in_factor = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out_decay = (-FADE_OUT_SPEED * dt).exp();

		for &idx in &self.target_set {
			let intensity = self.node_intensity.entry(idx).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in_factor;
		}

		self.hold_timer.retain(|idx, timer| {
			if self.target_set.contains(idx) {
				true
			} else {
				*timer -= dt;
				*timer > 0.0
			}
		});

		let mut new_max: f64 = 0.0;
		self.node_intensity.retain(|idx, intensity| {
			if self.target_set.contains(idx) {
				new_max = new_max.max(*intensity);
				true
			} else {
				let hold_remaining = self.hold_timer.get(idx).copied().unwrap_or(0.0);
				if hold_remaining <= 0.0 {
					*intensity *= fade_out_decay;
				}
				new_max = new_max.max(*intensity);
				*intensity > 0.005
			}
		});

		self.cached_max = new_max;
	}

	/// Smoothed highlight intensity for a node.
	pub fn node_intensity(&self, idx: DefaultNodeIdx) -> f64 {
		self.node_intensity.get(&idx).copied().unwrap_or(0.0)
	}

	/// Highlight intensity for an edge; geometric mean keeps edges from
	/// lagging behind their endpoints.
	pub fn edge_intensity(&self, idx1: DefaultNodeIdx, idx2: DefaultNodeIdx) -> f64 {
		(self.node_intensity(idx1) * self.node_intensity(idx2)).sqrt()
	}

	/// Maximum intensity of any node, for dimming everything else.
	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}
}

/// Core canvas state: physics simulation plus interaction, emphasis and
/// visibility tracking.
///
/// Created when the component mounts and rebuilt whenever the store's
/// visible snapshot changes; mutated each frame by the animation loop.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	/// Set on pan/zoom/resize; the frame loop recomputes culling when set.
	pub viewport_dirty: bool,
	edges: Vec<EdgeInfo>,
	index_of: HashMap<NodeId, DefaultNodeIdx>,
	selected: HashSet<NodeId>,
	path_nodes: HashSet<NodeId>,
	path_hops: HashSet<(NodeId, NodeId)>,
	frame_counter: u32,
}

impl ForceGraphState {
	pub fn new(snapshot: &GraphSnapshot, width: f64, height: f64, theme: &Theme) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut index_of = HashMap::new();
		let mut edges = Vec::new();

		// Palette fallback index per league, in first-seen order.
		let mut league_order: HashMap<&str, usize> = HashMap::new();
		for node in &snapshot.nodes {
			let next = league_order.len();
			league_order.entry(node.club.league.as_str()).or_insert(next);
		}

		for (i, node) in snapshot.nodes.iter().enumerate() {
			// Color precedence: explicit override > league color > palette.
			let color = node.visual.color.clone().unwrap_or_else(|| {
				theme
					.league_colors
					.get(&node.club.league)
					.cloned()
					.unwrap_or_else(|| {
						theme
							.palette
							.get(league_order[node.club.league.as_str()])
							.to_css_rgb()
					})
			});

			let (x, y, anchored) = match node.visual.fixed_position {
				Some((fx, fy)) => (fx as f32, fy as f32, true),
				None => {
					let angle = (i as f64) * 2.0 * PI / snapshot.nodes.len().max(1) as f64;
					(
						(width / 2.0 + 100.0 * angle.cos()) as f32,
						(height / 2.0 + 100.0 * angle.sin()) as f32,
						false,
					)
				}
			};

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: anchored,
				user_data: NodeInfo {
					id: node.id,
					label: node.label.clone(),
					color,
					size: node.visual.size,
					shape: node.visual.shape,
					visible: true,
				},
			});
			index_of.insert(node.id, idx);
		}

		for edge in &snapshot.edges {
			if let (Some(&a), Some(&b)) = (index_of.get(&edge.source), index_of.get(&edge.target))
			{
				graph.add_edge(a, b, EdgeData::default());
				edges.push(EdgeInfo {
					a,
					b,
					source: edge.source,
					target: edge.target,
					connection_type: edge.connection_type,
					strength: edge.strength,
					weight: edge.weight,
					active: edge.active,
					visible: true,
				});
			}
		}

		Self {
			graph,
			edges,
			index_of,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			viewport_dirty: true,
			selected: HashSet::new(),
			path_nodes: HashSet::new(),
			path_hops: HashSet::new(),
			frame_counter: 0,
		}
	}

	pub fn edges(&self) -> &[EdgeInfo] {
		&self.edges
	}

	pub fn node_index(&self, id: NodeId) -> Option<DefaultNodeIdx> {
		self.index_of.get(&id).copied()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// The world-space rectangle the canvas currently shows.
	pub fn viewport(&self) -> ViewportRect {
		ViewportRect::from_transform(
			self.transform.x,
			self.transform.y,
			self.transform.k,
			self.width,
			self.height,
		)
	}

	/// Hit-test for the topmost visible node under a screen position.
	pub fn node_at_position(
		&self,
		sx: f64,
		sy: f64,
		config: &ScaleConfig,
	) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if !node.data.user_data.visible {
				return;
			}
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let node_hit_radius = scale.hit_radius * node.data.user_data.size;
			if (dx * dx + dy * dy).sqrt() < node_hit_radius {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		self.highlight.set_hover(node, &self.edges);
	}

	/// Mirror the store's selection for ring rendering.
	pub fn set_selection(&mut self, ids: &[NodeId]) {
		self.selected = ids.iter().copied().collect();
	}

	pub fn is_selected(&self, id: NodeId) -> bool {
		self.selected.contains(&id)
	}

	/// Emphasize a shortest-path result on the canvas.
	pub fn highlight_path(&mut self, result: &PathResult) {
		self.path_nodes = result.path.iter().copied().collect();
		self.path_hops = result
			.path
			.windows(2)
			.map(|pair| normalize_hop(pair[0], pair[1]))
			.collect();
	}

	pub fn clear_path(&mut self) {
		self.path_nodes.clear();
		self.path_hops.clear();
	}

	pub fn on_path(&self, id: NodeId) -> bool {
		self.path_nodes.contains(&id)
	}

	pub fn on_path_hop(&self, source: NodeId, target: NodeId) -> bool {
		self.path_hops.contains(&normalize_hop(source, target))
	}

	/// Advance simulation and highlight animation. The physics step is
	/// skipped on frames the quality settings say to skip.
	pub fn tick(&mut self, dt: f32, simulation_every_frames: u32) {
		self.frame_counter = self.frame_counter.wrapping_add(1);
		if self.frame_counter % simulation_every_frames.max(1) == 0 {
			self.graph.update(dt);
		}
		self.flow_time += dt as f64;
		self.highlight.tick(dt as f64);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.viewport_dirty = true;
	}

	/// Run the store's culling pass against current layout positions and
	/// copy the resulting visibility flags onto nodes and edges. Called
	/// from the frame loop after viewport changes; the store throttles
	/// the actual recomputation.
	pub fn sync_visibility(&mut self, store: &mut GraphStore, now_ms: f64) {
		if !store.culling_active() {
			if !self.viewport_dirty {
				return;
			}
			self.graph
				.visit_nodes_mut(|node| node.data.user_data.visible = true);
			for edge in &mut self.edges {
				edge.visible = true;
			}
			self.viewport_dirty = false;
			return;
		}

		let mut positions = Vec::with_capacity(self.index_of.len());
		self.graph.visit_nodes(|node| {
			positions.push((node.data.user_data.id, node.x() as f64, node.y() as f64));
		});
		let endpoints: Vec<(NodeId, NodeId)> =
			self.edges.iter().map(|e| (e.source, e.target)).collect();

		let viewport = self.viewport();
		if store.update_culling(now_ms, &viewport, &positions, &endpoints) {
			self.graph.visit_nodes_mut(|node| {
				node.data.user_data.visible = store.node_visible(node.data.user_data.id);
			});
			for (index, edge) in self.edges.iter_mut().enumerate() {
				edge.visible = store.edge_visible(index);
			}
			self.viewport_dirty = false;
		}
	}
}

fn normalize_hop(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
	if a <= b { (a, b) } else { (b, a) }
}
