//! Graph analysis and rendering-performance core.
//!
//! Everything in this module is pure Rust with no web dependencies: the
//! club/connection data model, connectivity and shortest-path analysis,
//! recommendations, filtering, undo/redo history, and the adaptive
//! performance/culling machinery. The canvas component consumes it
//! through [`store::GraphStore`]'s read-accessors and mutation entry
//! points; nothing here reaches back into rendering code.
//!
//! All analysis routines are synchronous pure functions of a
//! [`model::GraphSnapshot`], so they could move behind a worker boundary
//! without changing their contracts.

pub mod adjacency;
pub mod analyze;
pub mod connectivity;
pub mod culling;
pub mod export;
pub mod filter;
pub mod history;
pub mod model;
pub mod path;
pub mod perf;
pub mod recommend;
pub mod store;

pub use filter::FilterCriteria;
pub use model::{
	ClubRecord, ConnectionRecord, ConnectionStrength, ConnectionType, GraphSnapshot, NodeId,
};
pub use perf::PerformanceMode;
pub use store::{ClubDataSource, GraphChange, GraphStore};
