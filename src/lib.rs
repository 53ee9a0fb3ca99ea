//! club-graph: Interactive network visualization and analysis for
//! football club relationships.
//!
//! This crate pairs a pure graph analysis core ([`graph`]) with a
//! WASM-based canvas component that renders the club network with
//! physics-based layout, pan/zoom, selection, shortest-path emphasis and
//! an adaptive rendering-performance loop.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod graph;

pub use components::force_graph::ClubGraphCanvas;
pub use graph::{ClubRecord, ConnectionRecord, GraphChange, GraphStore};

use graph::perf::DeviceProfile;
use graph::store::{ClubDataSource, DataSourceError};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("club-graph: logging initialized");
}

/// Data source backed by JSON embedded in the host page.
///
/// Clubs come from a script element with id="club-data", connections
/// from id="connection-data"; both hold plain JSON arrays. The two
/// collections load independently, matching the upstream API split.
struct DomDataSource;

impl ClubDataSource for DomDataSource {
	fn load_clubs(&self) -> Result<Vec<ClubRecord>, DataSourceError> {
		let text = script_text("club-data")
			.ok_or_else(|| DataSourceError::Missing("club-data".to_string()))?;
		serde_json::from_str(&text).map_err(|e| DataSourceError::Malformed(e.to_string()))
	}

	fn load_connections(&self) -> Result<Vec<ConnectionRecord>, DataSourceError> {
		let text = script_text("connection-data")
			.ok_or_else(|| DataSourceError::Missing("connection-data".to_string()))?;
		serde_json::from_str(&text).map_err(|e| DataSourceError::Malformed(e.to_string()))
	}
}

fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Main application component.
///
/// Builds the graph store, loads club data from the DOM and renders the
/// network canvas with a small metadata overlay. Snapshot-level store
/// changes bump the `refresh` signal so the canvas rebuilds its
/// simulation.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let store = Rc::new(RefCell::new(GraphStore::new(
		DeviceProfile::default(),
		Utc::now(),
	)));
	let (refresh, set_refresh) = signal(0u64);

	{
		let mut store = store.borrow_mut();
		store.subscribe(move |change| {
			if matches!(
				change,
				GraphChange::DataLoaded { .. }
					| GraphChange::LoadFailed
					| GraphChange::FiltersApplied
					| GraphChange::FiltersCleared
					| GraphChange::StateRestored
			) {
				set_refresh.update(|n| *n += 1);
			}
		});

		if let Err(e) = store.load_graph_data(&DomDataSource, false, Utc::now()) {
			warn!("club-graph: starting with an empty network: {e}");
		}
	}

	let store_summary = store.clone();
	let summary = move || {
		refresh.get();
		let store = store_summary.borrow();
		let meta = &store.visible_snapshot().metadata;
		format!(
			"{} clubs · {} connections · {} groups",
			meta.total_nodes, meta.total_edges, meta.component_count
		)
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Club Network" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ClubGraphCanvas store=store.clone() refresh=refresh fullscreen=true />
			<div class="graph-overlay">
				<h1>"Club Network"</h1>
				<p class="subtitle">
					"Click a club to select it. Double-click another to trace their strongest route. Scroll to zoom, drag the background to pan."
				</p>
				<p class="stats">{summary}</p>
			</div>
		</div>
	}
}
