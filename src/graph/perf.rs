//! Adaptive rendering performance control.
//!
//! Two cooperating pieces: a discrete performance mode chosen from graph
//! size (or set explicitly), and a frame-rate-driven quality ladder that
//! degrades or improves one step per completed sampling window. Both are
//! pure state machines; the frame loop feeds them timestamps and applies
//! whatever hints and settings they currently report.

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Node count above which the mode escalates to high-performance.
const HIGH_PERFORMANCE_NODES: usize = 1000;
/// Node count above which the mode escalates to ultra.
const ULTRA_NODES: usize = 5000;

/// Rolling FPS window length.
const WINDOW_MS: f64 = 1000.0;
/// A gap this long means the frame loop was suspended (hidden tab,
/// teardown); the window restarts instead of reporting a bogus average.
const STALE_WINDOW_MS: f64 = 2000.0;
/// Sustained average below this degrades quality one step.
const DEGRADE_FPS: f64 = 30.0;
/// Sustained average above this improves quality one step.
const IMPROVE_FPS: f64 = 50.0;

/// Discrete renderer-quality tier chosen from graph size and measured
/// frame rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceMode {
	#[default]
	Standard,
	HighPerformance,
	Ultra,
}

impl PerformanceMode {
	/// The mode the node-count thresholds call for.
	pub fn for_node_count(count: usize) -> Self {
		if count > ULTRA_NODES {
			PerformanceMode::Ultra
		} else if count > HIGH_PERFORMANCE_NODES {
			PerformanceMode::HighPerformance
		} else {
			PerformanceMode::Standard
		}
	}

	/// The fixed renderer-hint bundle for this mode.
	pub fn render_hints(self) -> RenderHints {
		match self {
			PerformanceMode::Standard => RenderHints {
				texture_on_viewport: false,
				hide_edges_on_viewport: false,
				hide_labels_on_viewport: false,
				pixel_ratio: 2.0,
			},
			PerformanceMode::HighPerformance => RenderHints {
				texture_on_viewport: true,
				hide_edges_on_viewport: false,
				hide_labels_on_viewport: true,
				pixel_ratio: 1.5,
			},
			PerformanceMode::Ultra => RenderHints {
				texture_on_viewport: true,
				hide_edges_on_viewport: true,
				hide_labels_on_viewport: true,
				pixel_ratio: 1.0,
			},
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			PerformanceMode::Standard => "standard",
			PerformanceMode::HighPerformance => "high-performance",
			PerformanceMode::Ultra => "ultra",
		}
	}
}

/// Renderer hints derived from the performance mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderHints {
	/// Rasterize the viewport once and pan the texture instead of
	/// redrawing every element.
	pub texture_on_viewport: bool,
	/// Skip edge drawing while the viewport is moving.
	pub hide_edges_on_viewport: bool,
	/// Skip label drawing while the viewport is moving.
	pub hide_labels_on_viewport: bool,
	/// Canvas backing-store resolution multiplier.
	pub pixel_ratio: f64,
}

/// One rung of the frame-rate-driven quality ladder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum QualityLevel {
	Low,
	Medium,
	#[default]
	High,
}

impl QualityLevel {
	fn degraded(self) -> Self {
		match self {
			QualityLevel::High => QualityLevel::Medium,
			_ => QualityLevel::Low,
		}
	}

	fn improved(self) -> Self {
		match self {
			QualityLevel::Low => QualityLevel::Medium,
			_ => QualityLevel::High,
		}
	}

	/// The render settings this rung maps to.
	pub fn settings(self) -> QualitySettings {
		match self {
			QualityLevel::High => QualitySettings {
				simulation_every_frames: 1,
				max_visible_nodes: 500,
				animations_enabled: true,
				shadows_enabled: true,
			},
			QualityLevel::Medium => QualitySettings {
				simulation_every_frames: 2,
				max_visible_nodes: 400,
				animations_enabled: true,
				shadows_enabled: false,
			},
			QualityLevel::Low => QualitySettings {
				simulation_every_frames: 4,
				max_visible_nodes: 250,
				animations_enabled: false,
				shadows_enabled: false,
			},
		}
	}
}

/// Concrete knobs a quality rung sets on the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualitySettings {
	/// Advance the physics simulation every Nth frame.
	pub simulation_every_frames: u32,
	/// Hard cap on simultaneously visible nodes while culling.
	pub max_visible_nodes: usize,
	pub animations_enabled: bool,
	pub shadows_enabled: bool,
}

/// Device constraints that veto quality improvements.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeviceProfile {
	pub low_end: bool,
	pub low_power: bool,
}

/// Accumulates rendered-frame counts over rolling one-second windows.
///
/// Driven by the frame callback at whatever cadence the browser delivers;
/// a window closes once at least a second has elapsed, so irregular
/// invocation stretches the window rather than corrupting the average.
#[derive(Clone, Debug, Default)]
pub struct FpsSampler {
	window_start_ms: Option<f64>,
	frames: u32,
}

impl FpsSampler {
	/// Record one rendered frame. Returns the window's average FPS when a
	/// window completes, `None` otherwise.
	pub fn record_frame(&mut self, now_ms: f64) -> Option<f64> {
		let Some(start) = self.window_start_ms else {
			self.window_start_ms = Some(now_ms);
			self.frames = 1;
			return None;
		};

		let elapsed = now_ms - start;
		if elapsed > STALE_WINDOW_MS {
			self.window_start_ms = Some(now_ms);
			self.frames = 1;
			return None;
		}
		if elapsed < WINDOW_MS {
			self.frames += 1;
			return None;
		}

		let average = self.frames as f64 * 1000.0 / elapsed;
		self.window_start_ms = Some(now_ms);
		self.frames = 1;
		Some(average)
	}
}

/// How the controller reacted to a completed sampling window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualityChange {
	Degraded(QualityLevel),
	Improved(QualityLevel),
}

/// The adaptive control loop: performance mode plus quality ladder.
#[derive(Clone, Debug, Default)]
pub struct PerformanceController {
	mode: PerformanceMode,
	explicit_mode: Option<PerformanceMode>,
	quality: QualityLevel,
	sampler: FpsSampler,
	device: DeviceProfile,
}

impl PerformanceController {
	pub fn new(device: DeviceProfile) -> Self {
		Self {
			device,
			..Self::default()
		}
	}

	/// Re-evaluate the node-count thresholds. An explicit mode override
	/// wins until cleared.
	pub fn update_for_node_count(&mut self, count: usize) {
		if self.explicit_mode.is_some() {
			return;
		}
		let next = PerformanceMode::for_node_count(count);
		if next != self.mode {
			info!(
				"club-graph: performance mode {} -> {} ({count} nodes)",
				self.mode.as_str(),
				next.as_str()
			);
			self.mode = next;
		}
	}

	/// Pin the mode explicitly, overriding the thresholds.
	pub fn set_mode(&mut self, mode: PerformanceMode) {
		self.explicit_mode = Some(mode);
		self.mode = mode;
	}

	/// Return mode selection to the node-count thresholds.
	pub fn clear_mode_override(&mut self) {
		self.explicit_mode = None;
	}

	pub fn mode(&self) -> PerformanceMode {
		self.mode
	}

	pub fn quality(&self) -> QualityLevel {
		self.quality
	}

	pub fn render_hints(&self) -> RenderHints {
		self.mode.render_hints()
	}

	pub fn quality_settings(&self) -> QualitySettings {
		self.quality.settings()
	}

	/// Feed one rendered frame into the sampler and adapt quality when a
	/// window completes: one step down below 30 FPS, one step up above
	/// 50 FPS unless the device is low-end or in low-power mode.
	pub fn record_frame(&mut self, now_ms: f64) -> Option<QualityChange> {
		let average = self.sampler.record_frame(now_ms)?;

		if average < DEGRADE_FPS {
			let next = self.quality.degraded();
			if next != self.quality {
				debug!(
					"club-graph: {average:.0} fps sustained, degrading quality to {next:?}"
				);
				self.quality = next;
				return Some(QualityChange::Degraded(next));
			}
		} else if average > IMPROVE_FPS && !self.device.low_end && !self.device.low_power {
			let next = self.quality.improved();
			if next != self.quality {
				debug!(
					"club-graph: {average:.0} fps sustained, improving quality to {next:?}"
				);
				self.quality = next;
				return Some(QualityChange::Improved(next));
			}
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Drive `controller` through the window ending at `start_ms + 1s`,
	/// delivering frames at the given FPS. The first window needs a seed
	/// frame at its exact start (`record_frame(start_ms)`) beforehand;
	/// later windows chain off the previous close.
	fn run_window(
		controller: &mut PerformanceController,
		start_ms: f64,
		fps: usize,
	) -> Option<QualityChange> {
		let step = 1000.0 / fps as f64;
		let mut change = None;
		for i in 1..=fps {
			let now = start_ms + i as f64 * step;
			if let Some(c) = controller.record_frame(now) {
				change = Some(c);
			}
		}
		change
	}

	#[test]
	fn node_count_thresholds_escalate_modes() {
		assert_eq!(PerformanceMode::for_node_count(0), PerformanceMode::Standard);
		assert_eq!(PerformanceMode::for_node_count(1000), PerformanceMode::Standard);
		assert_eq!(PerformanceMode::for_node_count(1001), PerformanceMode::HighPerformance);
		assert_eq!(PerformanceMode::for_node_count(5000), PerformanceMode::HighPerformance);
		assert_eq!(PerformanceMode::for_node_count(5001), PerformanceMode::Ultra);
	}

	#[test]
	fn explicit_mode_overrides_thresholds() {
		let mut controller = PerformanceController::default();
		controller.set_mode(PerformanceMode::Ultra);
		controller.update_for_node_count(10);
		assert_eq!(controller.mode(), PerformanceMode::Ultra);

		controller.clear_mode_override();
		controller.update_for_node_count(10);
		assert_eq!(controller.mode(), PerformanceMode::Standard);
	}

	#[test]
	fn each_mode_has_fixed_hints() {
		let standard = PerformanceMode::Standard.render_hints();
		let ultra = PerformanceMode::Ultra.render_hints();
		assert!(!standard.hide_edges_on_viewport);
		assert!(ultra.hide_edges_on_viewport && ultra.hide_labels_on_viewport);
		assert!(standard.pixel_ratio > ultra.pixel_ratio);
	}

	#[test]
	fn sampler_averages_over_one_second_windows() {
		let mut sampler = FpsSampler::default();
		assert_eq!(sampler.record_frame(0.0), None);
		for i in 1..60 {
			assert_eq!(sampler.record_frame(i as f64 * 16.0), None);
		}
		// Frame at 1008 ms closes the window: 60 frames in 1.008 s.
		let average = sampler.record_frame(1008.0).unwrap();
		assert!((average - 59.5).abs() < 1.0, "average was {average}");
	}

	#[test]
	fn sustained_low_fps_degrades_one_step_per_window() {
		let mut controller = PerformanceController::default();
		controller.record_frame(0.0);
		let change = run_window(&mut controller, 0.0, 20);
		assert_eq!(change, Some(QualityChange::Degraded(QualityLevel::Medium)));
		let change = run_window(&mut controller, 1000.0, 20);
		assert_eq!(change, Some(QualityChange::Degraded(QualityLevel::Low)));
		// Already at the bottom rung.
		let change = run_window(&mut controller, 2000.0, 20);
		assert_eq!(change, None);
		assert!(!controller.quality_settings().animations_enabled);
	}

	#[test]
	fn high_fps_improves_unless_device_is_constrained() {
		let mut controller = PerformanceController::default();
		controller.record_frame(0.0);
		run_window(&mut controller, 0.0, 20);
		assert_eq!(controller.quality(), QualityLevel::Medium);
		let change = run_window(&mut controller, 1000.0, 60);
		assert_eq!(change, Some(QualityChange::Improved(QualityLevel::High)));

		let mut constrained = PerformanceController::new(DeviceProfile {
			low_end: true,
			low_power: false,
		});
		constrained.record_frame(0.0);
		run_window(&mut constrained, 0.0, 20);
		assert_eq!(constrained.quality(), QualityLevel::Medium);
		let change = run_window(&mut constrained, 1000.0, 60);
		assert_eq!(change, None, "low-end devices never improve");
	}

	#[test]
	fn middling_fps_changes_nothing() {
		let mut controller = PerformanceController::default();
		controller.record_frame(0.0);
		let change = run_window(&mut controller, 0.0, 40);
		assert_eq!(change, None);
		assert_eq!(controller.quality(), QualityLevel::High);
	}

	#[test]
	fn long_suspensions_restart_the_window() {
		let mut sampler = FpsSampler::default();
		sampler.record_frame(0.0);
		// Tab hidden for five seconds; no bogus 0-fps window is reported.
		assert_eq!(sampler.record_frame(5000.0), None);
		for i in 1..30 {
			assert_eq!(sampler.record_frame(5000.0 + i as f64 * 33.0), None);
		}
		let average = sampler.record_frame(6006.0).unwrap();
		assert!((average - 29.8).abs() < 1.0, "average was {average}");
	}

	#[test]
	fn quality_ladder_shrinks_the_node_cap() {
		assert!(
			QualityLevel::High.settings().max_visible_nodes
				> QualityLevel::Low.settings().max_visible_nodes
		);
		assert!(QualityLevel::High.settings().shadows_enabled);
		assert!(!QualityLevel::Low.settings().shadows_enabled);
	}
}
