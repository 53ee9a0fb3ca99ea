//! Owned graph state and its narrow mutation API.
//!
//! `GraphStore` is the single owner of the current snapshot, the filtered
//! view, selection, configuration, history and the performance/culling
//! machinery. Collaborators read through accessors and mutate only
//! through the entry points here; changes fan out to subscribers as
//! [`GraphChange`] notifications instead of shared mutable fields.

use chrono::{DateTime, Utc};
use log::{info, warn};
use thiserror::Error;

use super::analyze::{self, GraphAnalysisReport};
use super::culling::{CullingState, ViewportRect};
use super::export::{self, ExportFormat};
use super::filter::{self, FilterCriteria};
use super::history::{GraphConfig, GraphState, StateHistory};
use super::model::{
	ClubRecord, ConnectionRecord, GraphSnapshot, NodeId, SnapshotBuilder, ValidationError,
};
use super::path::{self, PathResult};
use super::perf::{
	DeviceProfile, PerformanceController, PerformanceMode, QualityChange, QualitySettings,
	RenderHints,
};
use super::recommend::{self, Recommendation};

/// Why a data source could not deliver records.
#[derive(Debug, Error)]
pub enum DataSourceError {
	#[error("data payload not found: {0}")]
	Missing(String),
	#[error("malformed data payload: {0}")]
	Malformed(String),
}

/// Why a graph load failed. The store keeps a well-defined snapshot in
/// every case: the empty fallback for upstream failures, the previous
/// snapshot for validation failures.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("club data failed to load: {0}")]
	Clubs(#[source] DataSourceError),
	#[error("connection data failed to load: {0}")]
	Connections(#[source] DataSourceError),
	#[error("graph data failed validation ({0:?})")]
	Invalid(Vec<ValidationError>),
}

/// Bulk-snapshot access to the two upstream collections. Pagination and
/// caching live behind this boundary; the core sees eventually-consistent
/// full listings.
pub trait ClubDataSource {
	fn load_clubs(&self) -> Result<Vec<ClubRecord>, DataSourceError>;
	fn load_connections(&self) -> Result<Vec<ConnectionRecord>, DataSourceError>;
}

/// State-changed notification delivered to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphChange {
	DataLoaded { nodes: usize, edges: usize },
	LoadFailed,
	FiltersApplied,
	FiltersCleared,
	SelectionChanged,
	PerformanceModeChanged(PerformanceMode),
	CullingToggled(bool),
	StateRestored,
}

type Subscriber = Box<dyn Fn(&GraphChange)>;

/// Sole owner of the visualization's mutable state.
pub struct GraphStore {
	snapshot: GraphSnapshot,
	filtered: Option<GraphSnapshot>,
	criteria: FilterCriteria,
	config: GraphConfig,
	layout: String,
	selected_nodes: Vec<NodeId>,
	selected_edges: Vec<String>,
	history: StateHistory,
	perf: PerformanceController,
	culling: CullingState,
	subscribers: Vec<Subscriber>,
	loaded: bool,
}

impl GraphStore {
	pub fn new(device: DeviceProfile, now: DateTime<Utc>) -> Self {
		Self {
			snapshot: GraphSnapshot::empty(now),
			filtered: None,
			criteria: FilterCriteria::default(),
			config: GraphConfig::default(),
			layout: "force".to_string(),
			selected_nodes: Vec::new(),
			selected_edges: Vec::new(),
			history: StateHistory::new(),
			perf: PerformanceController::new(device),
			culling: CullingState::new(),
			subscribers: Vec::new(),
			loaded: false,
		}
	}

	/// Register a change observer. Subscribers see every notification for
	/// the lifetime of the store.
	pub fn subscribe(&mut self, subscriber: impl Fn(&GraphChange) + 'static) {
		self.subscribers.push(Box::new(subscriber));
	}

	fn notify(&self, change: GraphChange) {
		for subscriber in &self.subscribers {
			subscriber(&change);
		}
	}

	/// Combine both data sources into a fresh snapshot.
	///
	/// An already-loaded graph is reused unless `force_refresh`. A failing
	/// source leaves the empty fallback snapshot in place; records that
	/// fail validation leave the previous snapshot untouched. Either way
	/// no partially-mutated state is ever observable.
	pub fn load_graph_data(
		&mut self,
		source: &dyn ClubDataSource,
		force_refresh: bool,
		now: DateTime<Utc>,
	) -> Result<(), LoadError> {
		if self.loaded && !force_refresh {
			return Ok(());
		}

		let clubs = match source.load_clubs() {
			Ok(clubs) => clubs,
			Err(e) => return self.fail_load(LoadError::Clubs(e), now),
		};
		let connections = match source.load_connections() {
			Ok(connections) => connections,
			Err(e) => return self.fail_load(LoadError::Connections(e), now),
		};

		let snapshot = match SnapshotBuilder::from_records(&clubs, &connections).build(now) {
			Ok(snapshot) => snapshot,
			Err(errors) => {
				warn!(
					"club-graph: rejected graph data with {} validation problem(s)",
					errors.len()
				);
				return Err(LoadError::Invalid(errors));
			}
		};

		info!(
			"club-graph: loaded {} clubs, {} connections",
			snapshot.nodes.len(),
			snapshot.edges.len()
		);
		self.snapshot = snapshot;
		self.filtered = None;
		self.selected_nodes.clear();
		self.selected_edges.clear();
		self.loaded = true;
		self.sync_to_graph_size();
		self.notify(GraphChange::DataLoaded {
			nodes: self.snapshot.nodes.len(),
			edges: self.snapshot.edges.len(),
		});
		Ok(())
	}

	fn fail_load(&mut self, error: LoadError, now: DateTime<Utc>) -> Result<(), LoadError> {
		warn!("club-graph: {error}");
		self.snapshot = GraphSnapshot::empty(now);
		self.filtered = None;
		self.loaded = false;
		self.sync_to_graph_size();
		self.notify(GraphChange::LoadFailed);
		Err(error)
	}

	fn sync_to_graph_size(&mut self) {
		let count = self.visible_snapshot().nodes.len();
		self.perf.update_for_node_count(count);
		self.config.performance_mode = self.perf.mode();
		self.culling.sync_activation(count);
	}

	/// The full, unfiltered snapshot.
	pub fn snapshot(&self) -> &GraphSnapshot {
		&self.snapshot
	}

	/// The snapshot the renderer should show: the filtered view when
	/// filters are applied, the full snapshot otherwise.
	pub fn visible_snapshot(&self) -> &GraphSnapshot {
		self.filtered.as_ref().unwrap_or(&self.snapshot)
	}

	pub fn criteria(&self) -> &FilterCriteria {
		&self.criteria
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	pub fn selected_nodes(&self) -> &[NodeId] {
		&self.selected_nodes
	}

	pub fn selected_edges(&self) -> &[String] {
		&self.selected_edges
	}

	/// Derive a filtered view. The source snapshot is retained; malformed
	/// criteria are rejected whole with the complete problem list.
	pub fn apply_filters(&mut self, criteria: FilterCriteria) -> Result<(), Vec<ValidationError>> {
		let errors = criteria.validate();
		if !errors.is_empty() {
			return Err(errors);
		}
		self.filtered = Some(filter::apply_filters(&self.snapshot, &criteria));
		self.criteria = criteria;
		self.sync_to_graph_size();
		self.notify(GraphChange::FiltersApplied);
		Ok(())
	}

	/// Drop the filtered view and show the full snapshot again.
	pub fn clear_filters(&mut self) {
		self.filtered = None;
		self.criteria = FilterCriteria::default();
		self.sync_to_graph_size();
		self.notify(GraphChange::FiltersCleared);
	}

	/// Analysis report over the currently visible view.
	pub fn analyze(&self) -> GraphAnalysisReport {
		analyze::analyze(self.visible_snapshot())
	}

	/// Weighted shortest path over the currently visible view.
	pub fn find_shortest_path(&self, source: NodeId, target: NodeId) -> PathResult {
		path::shortest_path(self.visible_snapshot(), source, target)
	}

	/// Connection suggestions, computed on the full graph so filtered-out
	/// clubs still count as candidates.
	pub fn get_connection_recommendations(
		&self,
		node: NodeId,
		max_results: usize,
	) -> Vec<Recommendation> {
		recommend::recommend(&self.snapshot, node, max_results)
	}

	/// Replace the selection. Ids not present in the visible view are
	/// dropped silently so stale UI events cannot corrupt state.
	pub fn set_selection(&mut self, nodes: Vec<NodeId>, edges: Vec<String>) {
		let (nodes, edges) = {
			let visible = self.visible_snapshot();
			(
				nodes
					.into_iter()
					.filter(|&id| visible.contains_node(id))
					.collect(),
				edges
					.into_iter()
					.filter(|id| visible.edge(id).is_some())
					.collect(),
			)
		};
		self.selected_nodes = nodes;
		self.selected_edges = edges;
		self.notify(GraphChange::SelectionChanged);
	}

	/// Pin the performance mode, or hand it back to the node-count
	/// thresholds with `None`.
	pub fn set_performance_mode(&mut self, mode: Option<PerformanceMode>) {
		let count = self.visible_snapshot().nodes.len();
		match mode {
			Some(mode) => self.perf.set_mode(mode),
			None => {
				self.perf.clear_mode_override();
				self.perf.update_for_node_count(count);
			}
		}
		self.config.performance_mode = self.perf.mode();
		self.notify(GraphChange::PerformanceModeChanged(self.perf.mode()));
	}

	/// Force viewport culling on or off, or defer to the threshold.
	pub fn set_viewport_culling(&mut self, enabled: Option<bool>) {
		let count = self.visible_snapshot().nodes.len();
		self.culling.set_override(enabled);
		let active = self.culling.sync_activation(count);
		self.config.viewport_culling = enabled;
		self.notify(GraphChange::CullingToggled(active));
	}

	pub fn performance_mode(&self) -> PerformanceMode {
		self.perf.mode()
	}

	pub fn render_hints(&self) -> RenderHints {
		self.perf.render_hints()
	}

	pub fn quality_settings(&self) -> QualitySettings {
		self.perf.quality_settings()
	}

	/// Feed one rendered frame into the adaptive quality loop.
	pub fn record_frame(&mut self, now_ms: f64) -> Option<QualityChange> {
		self.perf.record_frame(now_ms)
	}

	/// Recompute culling visibility for a viewport change; throttled
	/// internally. `positions` and `edges` describe the rendered graph in
	/// its current layout.
	pub fn update_culling(
		&mut self,
		now_ms: f64,
		viewport: &ViewportRect,
		positions: &[(NodeId, f64, f64)],
		edges: &[(NodeId, NodeId)],
	) -> bool {
		let cap = self.perf.quality_settings().max_visible_nodes;
		self.culling.update(now_ms, viewport, positions, edges, cap)
	}

	pub fn culling_active(&self) -> bool {
		self.culling.is_active()
	}

	pub fn node_visible(&self, id: NodeId) -> bool {
		self.culling.node_visible(id)
	}

	pub fn edge_visible(&self, index: usize) -> bool {
		self.culling.edge_visible(index)
	}

	/// Export the currently visible view. Structural equivalence is the
	/// contract; exact text layout is not.
	pub fn export(&self, format: ExportFormat) -> serde_json::Result<String> {
		export::export(self.visible_snapshot(), format)
	}

	/// Capture the current configuration/selection/filter state. Call
	/// after every user-visible configuration change.
	pub fn save_state(&mut self, now: DateTime<Utc>) {
		self.history.save(GraphState {
			captured_at: now,
			config: self.config.clone(),
			selected_nodes: self.selected_nodes.clone(),
			selected_edges: self.selected_edges.clone(),
			filters: self.criteria.clone(),
			layout: self.layout.clone(),
		});
	}

	/// Step back in history and reapply that state. `false` at the oldest
	/// entry.
	pub fn undo(&mut self) -> bool {
		if !self.history.undo() {
			return false;
		}
		self.restore_current();
		true
	}

	/// Step forward in history and reapply that state. `false` at the
	/// newest entry.
	pub fn redo(&mut self) -> bool {
		if !self.history.redo() {
			return false;
		}
		self.restore_current();
		true
	}

	/// Reapply the state under the history cursor: configuration,
	/// selection and filters together, then a single notification so the
	/// renderer sees one atomic change.
	fn restore_current(&mut self) {
		let Some(state) = self.history.current().cloned() else {
			return;
		};

		self.perf.set_mode(state.config.performance_mode);
		self.culling.set_override(state.config.viewport_culling);
		self.config = state.config;
		self.selected_nodes = state.selected_nodes;
		self.selected_edges = state.selected_edges;
		self.layout = state.layout;
		self.filtered = if state.filters == FilterCriteria::default() {
			None
		} else {
			Some(filter::apply_filters(&self.snapshot, &state.filters))
		};
		self.criteria = state.filters;
		let count = self.visible_snapshot().nodes.len();
		self.culling.sync_activation(count);
		self.notify(GraphChange::StateRestored);
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::super::filter::{LayoutFilters, NodeFilters};
	use super::super::model::tests::{club, connection};
	use super::*;

	struct StubSource {
		clubs: Result<Vec<ClubRecord>, ()>,
		connections: Result<Vec<ConnectionRecord>, ()>,
	}

	impl ClubDataSource for StubSource {
		fn load_clubs(&self) -> Result<Vec<ClubRecord>, DataSourceError> {
			self.clubs
				.clone()
				.map_err(|()| DataSourceError::Missing("clubs".to_string()))
		}

		fn load_connections(&self) -> Result<Vec<ConnectionRecord>, DataSourceError> {
			self.connections
				.clone()
				.map_err(|()| DataSourceError::Missing("connections".to_string()))
		}
	}

	fn working_source() -> StubSource {
		StubSource {
			clubs: Ok(vec![
				club(1, "A", "L1", "X"),
				club(2, "B", "L1", "Y"),
				club(3, "C", "L2", "Z"),
			]),
			connections: Ok(vec![connection(1, 2, 80.0)]),
		}
	}

	fn loaded_store() -> GraphStore {
		let mut store = GraphStore::new(DeviceProfile::default(), Utc::now());
		store
			.load_graph_data(&working_source(), false, Utc::now())
			.unwrap();
		store
	}

	#[test]
	fn load_combines_both_sources() {
		let store = loaded_store();
		assert_eq!(store.snapshot().nodes.len(), 3);
		assert_eq!(store.snapshot().edges.len(), 1);
	}

	#[test]
	fn load_is_cached_until_forced() {
		let mut store = loaded_store();
		let broken = StubSource {
			clubs: Err(()),
			connections: Err(()),
		};
		// Cached: the broken source is never consulted.
		assert!(store.load_graph_data(&broken, false, Utc::now()).is_ok());
		assert_eq!(store.snapshot().nodes.len(), 3);
		// Forced: the failure surfaces and the fallback kicks in.
		assert!(store.load_graph_data(&broken, true, Utc::now()).is_err());
		assert!(store.snapshot().nodes.is_empty());
	}

	#[test]
	fn upstream_failure_leaves_empty_fallback() {
		let mut store = GraphStore::new(DeviceProfile::default(), Utc::now());
		let source = StubSource {
			clubs: Err(()),
			connections: Ok(vec![]),
		};
		let result = store.load_graph_data(&source, false, Utc::now());
		assert!(matches!(result, Err(LoadError::Clubs(_))));
		assert!(store.snapshot().nodes.is_empty());
		assert!(store.visible_snapshot().nodes.is_empty());
	}

	#[test]
	fn invalid_records_keep_previous_snapshot() {
		let mut store = loaded_store();
		let invalid = StubSource {
			clubs: Ok(vec![club(1, "A", "L1", "X")]),
			connections: Ok(vec![connection(1, 1, 50.0)]),
		};
		let result = store.load_graph_data(&invalid, true, Utc::now());
		assert!(matches!(result, Err(LoadError::Invalid(_))));
		// The previous, valid graph is still there.
		assert_eq!(store.snapshot().nodes.len(), 3);
	}

	#[test]
	fn filters_produce_a_derived_view_and_keep_the_source() {
		let mut store = loaded_store();
		let criteria = FilterCriteria {
			node: NodeFilters {
				leagues: vec!["L1".to_string()],
				..Default::default()
			},
			..Default::default()
		};
		store.apply_filters(criteria).unwrap();
		assert_eq!(store.visible_snapshot().nodes.len(), 2);
		assert_eq!(store.snapshot().nodes.len(), 3);

		store.clear_filters();
		assert_eq!(store.visible_snapshot().nodes.len(), 3);
	}

	#[test]
	fn selection_is_scoped_to_the_visible_view() {
		let mut store = loaded_store();
		store.set_selection(vec![1, 99], vec!["1-2-rivalry".to_string(), "nope".to_string()]);
		assert_eq!(store.selected_nodes(), &[1]);
		assert_eq!(store.selected_edges(), &["1-2-rivalry".to_string()]);
	}

	#[test]
	fn change_notifications_reach_subscribers() {
		let mut store = GraphStore::new(DeviceProfile::default(), Utc::now());
		let seen: Rc<RefCell<Vec<GraphChange>>> = Rc::default();
		let sink = seen.clone();
		store.subscribe(move |change| sink.borrow_mut().push(change.clone()));

		store
			.load_graph_data(&working_source(), false, Utc::now())
			.unwrap();
		store.set_performance_mode(Some(PerformanceMode::Ultra));

		let seen = seen.borrow();
		assert_eq!(seen[0], GraphChange::DataLoaded { nodes: 3, edges: 1 });
		assert_eq!(
			seen[1],
			GraphChange::PerformanceModeChanged(PerformanceMode::Ultra)
		);
	}

	#[test]
	fn undo_redo_roundtrip_restores_saved_state() {
		let mut store = loaded_store();
		store.save_state(Utc::now());

		store.set_selection(vec![1], vec![]);
		store
			.apply_filters(FilterCriteria {
				layout: LayoutFilters {
					hide_isolated_nodes: true,
					..Default::default()
				},
				..Default::default()
			})
			.unwrap();
		store.save_state(Utc::now());

		assert!(store.undo());
		assert!(store.selected_nodes().is_empty());
		assert_eq!(store.criteria(), &FilterCriteria::default());
		assert_eq!(store.visible_snapshot().nodes.len(), 3);

		assert!(store.redo());
		assert_eq!(store.selected_nodes(), &[1]);
		assert!(store.criteria().layout.hide_isolated_nodes);
		assert_eq!(store.visible_snapshot().nodes.len(), 2);

		assert!(!store.redo(), "newest state is the boundary");
	}

	#[test]
	fn export_reflects_the_filtered_view() {
		let mut store = loaded_store();
		store
			.apply_filters(FilterCriteria {
				node: NodeFilters {
					leagues: vec!["L1".to_string()],
					..Default::default()
				},
				..Default::default()
			})
			.unwrap();
		let csv = store.export(ExportFormat::Csv).unwrap();
		assert!(csv.contains("NODES"));
		assert!(csv.contains(",A,"));
		assert!(!csv.contains(",C,"), "filtered-out club must not be exported");
	}

	#[test]
	fn queries_never_fail_on_unknown_ids() {
		let store = loaded_store();
		assert!(!store.find_shortest_path(1, 42).exists);
		assert!(store.get_connection_recommendations(42, 5).is_empty());
	}
}
