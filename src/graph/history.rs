//! Bounded undo/redo history over captured graph state.
//!
//! A state capture bundles everything a user-visible configuration change
//! can touch; restoring one hands the whole capture back so the caller
//! reapplies configuration, selection and filters in one step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filter::FilterCriteria;
use super::model::NodeId;
use super::perf::PerformanceMode;

/// States retained before the oldest is evicted.
const CAPACITY: usize = 50;

/// User-adjustable visualization configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
	pub performance_mode: PerformanceMode,
	/// Explicit culling override; `None` leaves it to the node-count
	/// threshold.
	pub viewport_culling: Option<bool>,
	pub theme: String,
}

/// A timestamped capture of restorable state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphState {
	pub captured_at: DateTime<Utc>,
	pub config: GraphConfig,
	pub selected_nodes: Vec<NodeId>,
	pub selected_edges: Vec<String>,
	pub filters: FilterCriteria,
	pub layout: String,
}

/// Linear undo/redo stack with a bounded capacity.
#[derive(Clone, Debug, Default)]
pub struct StateHistory {
	states: Vec<GraphState>,
	cursor: usize,
}

impl StateHistory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Push a capture. Any "future" states beyond the cursor are discarded
	/// first (taking a new action forfeits redo), then the list is capped
	/// at the last 50 entries, oldest evicted.
	pub fn save(&mut self, state: GraphState) {
		if !self.states.is_empty() {
			self.states.truncate(self.cursor + 1);
		}
		self.states.push(state);
		if self.states.len() > CAPACITY {
			let excess = self.states.len() - CAPACITY;
			self.states.drain(..excess);
		}
		self.cursor = self.states.len() - 1;
	}

	/// Step back. Returns `false` at the oldest state (or empty history).
	pub fn undo(&mut self) -> bool {
		if self.states.is_empty() || self.cursor == 0 {
			return false;
		}
		self.cursor -= 1;
		true
	}

	/// Step forward. Returns `false` at the newest state.
	pub fn redo(&mut self) -> bool {
		if self.states.is_empty() || self.cursor + 1 >= self.states.len() {
			return false;
		}
		self.cursor += 1;
		true
	}

	/// The state the cursor points at, to be reapplied atomically.
	pub fn current(&self) -> Option<&GraphState> {
		self.states.get(self.cursor)
	}

	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn state(tag: u32) -> GraphState {
		GraphState {
			captured_at: Utc::now(),
			config: GraphConfig::default(),
			selected_nodes: vec![tag],
			selected_edges: vec![format!("edge-{tag}")],
			filters: FilterCriteria::default(),
			layout: format!("layout-{tag}"),
		}
	}

	#[test]
	fn undo_and_redo_move_between_saves() {
		let mut history = StateHistory::new();
		history.save(state(1));
		history.save(state(2));
		history.save(state(3));

		assert!(history.undo());
		assert_eq!(history.current().unwrap().selected_nodes, vec![2]);
		assert!(history.undo());
		assert_eq!(history.current().unwrap().selected_nodes, vec![1]);
		assert!(!history.undo(), "oldest state is the boundary");

		assert!(history.redo());
		assert!(history.redo());
		assert_eq!(history.current().unwrap().selected_nodes, vec![3]);
		assert!(!history.redo(), "newest state is the boundary");
	}

	#[test]
	fn undo_n_then_redo_n_restores_identical_state() {
		let mut history = StateHistory::new();
		let saved: Vec<GraphState> = (1..=5).map(state).collect();
		for s in &saved {
			history.save(s.clone());
		}
		for _ in 0..4 {
			assert!(history.undo());
		}
		for _ in 0..4 {
			assert!(history.redo());
		}
		assert_eq!(history.current(), Some(&saved[4]));
	}

	#[test]
	fn new_save_discards_redo_states() {
		let mut history = StateHistory::new();
		history.save(state(1));
		history.save(state(2));
		history.save(state(3));
		history.undo();
		history.undo();

		history.save(state(9));
		assert_eq!(history.len(), 2);
		assert_eq!(history.current().unwrap().selected_nodes, vec![9]);
		assert!(!history.redo());
	}

	#[test]
	fn capacity_evicts_oldest_first() {
		let mut history = StateHistory::new();
		for tag in 0..60 {
			history.save(state(tag));
		}
		assert_eq!(history.len(), 50);
		assert_eq!(history.current().unwrap().selected_nodes, vec![59]);

		// Walk all the way back; the oldest surviving save is tag 10.
		while history.undo() {}
		assert_eq!(history.current().unwrap().selected_nodes, vec![10]);
	}

	#[test]
	fn empty_history_rejects_both_directions() {
		let mut history = StateHistory::new();
		assert!(!history.undo());
		assert!(!history.redo());
		assert!(history.current().is_none());
	}
}
