//! Canvas rendering for the club network.
//!
//! Handles all drawing operations: background, connections, clubs, labels
//! and emphasis rings. Rendering uses multiple passes for correct
//! z-ordering:
//! 1. Background (screen space)
//! 2. Connections, path-emphasized connections on top (world space)
//! 3. Non-highlighted clubs, then highlighted/selected clubs with rings
//!
//! Elements hidden by the culling pass are skipped outright, and the
//! performance-mode hints can suppress whole passes while the viewport is
//! moving.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::graph::model::{ConnectionStrength, NodeShape};
use crate::graph::perf::{QualitySettings, RenderHints};

use super::scale::{ScaleConfig, ScaledValues};
use super::state::{EdgeInfo, ForceGraphState, NodeInfo};
use super::theme::{Color, Theme};

/// Smooth values that would otherwise cause abrupt visual changes.
fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete graph to the canvas.
///
/// `interacting` is true while the user pans or zooms; the
/// hide-on-viewport render hints apply only then.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
	hints: &RenderHints,
	quality: &QualitySettings,
	interacting: bool,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	if !(interacting && hints.hide_edges_on_viewport) {
		draw_edges(state, ctx, config, &scale, theme, quality);
	}
	let labels_suppressed = interacting && hints.hide_labels_on_viewport;
	draw_nodes(state, ctx, &scale, theme, quality, labels_suppressed);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

fn draw_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if theme.background.use_gradient {
		let gradient = ctx
			.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				(state.width.max(state.height)) * 0.8,
			)
			.unwrap();

		gradient
			.add_color_stop(0.0, &theme.background.color_secondary.to_css())
			.unwrap();
		gradient
			.add_color_stop(1.0, &theme.background.color.to_css())
			.unwrap();

		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.background.color.to_css());
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let gradient = ctx
		.create_radial_gradient(
			state.width / 2.0,
			state.height / 2.0,
			state.width.min(state.height) * 0.3,
			state.width / 2.0,
			state.height / 2.0,
			state.width.max(state.height) * 0.7,
		)
		.unwrap();

	gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)").unwrap();
	gradient
		.add_color_stop(
			1.0,
			&format!("rgba(0, 0, 0, {})", theme.background.vignette),
		)
		.unwrap();

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edges(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
	quality: &QualitySettings,
) {
	let dash_offset = scale.dash_offset(state.flow_time, config.edge.flow_speed);

	// One position pass up front; the edge loop is lookups only.
	let mut positions: HashMap<DefaultNodeIdx, (f64, f64)> = HashMap::new();
	state.graph.visit_nodes(|node| {
		positions.insert(node.index(), (node.x() as f64, node.y() as f64));
	});

	// Path-emphasized connections draw last so they sit on top.
	for pass_emphasized in [false, true] {
		for edge in state.edges() {
			if !edge.visible {
				continue;
			}
			let emphasized = state.on_path_hop(edge.source, edge.target);
			if emphasized != pass_emphasized {
				continue;
			}
			draw_edge(
				state,
				ctx,
				scale,
				theme,
				edge,
				&positions,
				emphasized,
				quality.animations_enabled,
				dash_offset,
			);
		}
	}

	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

#[allow(clippy::too_many_arguments)]
fn draw_edge(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	edge: &EdgeInfo,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	emphasized: bool,
	animate: bool,
	dash_offset: f64,
) {
	let (Some(&(x1, y1)), Some(&(x2, y2))) = (positions.get(&edge.a), positions.get(&edge.b))
	else {
		return;
	};
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}

	let edge_t = smooth_step(state.highlight.edge_intensity(edge.a, edge.b));
	let max_t = smooth_step(state.highlight.max_intensity());

	// Relationship strength reads as opacity; hovering boosts the
	// touched connections and dims the rest.
	let weight_alpha = 0.35 + 0.65 * (edge.weight / 100.0).clamp(0.0, 1.0);
	let hover_alpha = if edge_t > 0.01 {
		0.7 + 0.3 * edge_t
	} else if max_t > 0.01 {
		0.7 - 0.5 * max_t
	} else {
		0.7
	};

	let color = if emphasized {
		theme.node.path_color
	} else if edge.active {
		theme.edge.type_color(edge.connection_type)
	} else {
		theme.edge.inactive_color
	};
	let mut alpha = weight_alpha * hover_alpha * color.a;
	if !edge.active {
		alpha *= theme.edge.inactive_alpha;
	}

	let strength_mult = theme.edge.strength_width(edge.strength);
	let mut width = scale.edge_line_width * strength_mult * (1.0 + 0.4 * edge_t);
	if emphasized {
		width *= 1.8;
	}

	ctx.set_stroke_style_str(&format!(
		"rgba({}, {}, {}, {})",
		color.r, color.g, color.b, alpha
	));
	ctx.set_line_width(width);

	// Inactive ties render dashed; the dash fades to solid when zoomed
	// out, and animates along active strong ties as a flow cue.
	let effective_gap = scale.dash_pattern.1 * scale.dash_alpha;
	let dashed = !edge.active || (animate && edge.strength == ConnectionStrength::Strong);
	if dashed && effective_gap > 0.1 {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(scale.dash_pattern.0),
			&JsValue::from_f64(effective_gap),
		));
		ctx.set_line_dash_offset(if edge.active { dash_offset } else { 0.0 });
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	let (ux, uy) = (dx / dist, dy / dist);
	ctx.begin_path();
	ctx.move_to(x1 + ux * scale.node_radius, y1 + uy * scale.node_radius);
	ctx.line_to(x2 - ux * scale.node_radius, y2 - uy * scale.node_radius);
	ctx.stroke();
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	quality: &QualitySettings,
	labels_suppressed: bool,
) {
	let max_t = smooth_step(state.highlight.max_intensity());
	let has_highlight = max_t > 0.01;

	// Pass 1: clubs outside the highlight set
	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		if !info.visible {
			return;
		}
		let node_t = state.highlight.node_intensity(node.index());
		if node_t > 0.001 || state.is_selected(info.id) || state.on_path(info.id) {
			return;
		}
		let (alpha, radius_mult) = if has_highlight {
			(1.0 - 0.7 * max_t, 1.0 - 0.15 * max_t)
		} else {
			(1.0, 1.0)
		};
		let (x, y) = (node.x() as f64, node.y() as f64);
		draw_node(ctx, info, x, y, scale, theme, quality, alpha, radius_mult);
		if !labels_suppressed && info.size >= 1.25 {
			draw_label(ctx, info, x, y, scale, alpha * scale.label_alpha, radius_mult);
		}
	});

	// Pass 2: highlighted, selected and path clubs on top
	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		if !info.visible {
			return;
		}
		let idx = node.index();
		let node_t = state.highlight.node_intensity(idx);
		let selected = state.is_selected(info.id);
		let on_path = state.on_path(info.id);
		if node_t <= 0.001 && !selected && !on_path {
			return;
		}

		let eased_t = smooth_step(node_t);
		let (x, y) = (node.x() as f64, node.y() as f64);

		let dim_alpha = if has_highlight { 1.0 - 0.7 * max_t } else { 1.0 };
		// Selected and path clubs stay at full strength even while a
		// hover elsewhere dims the rest of the graph.
		let emphasis = if selected || on_path { 1.0 } else { eased_t };
		let alpha = dim_alpha + (1.0 - dim_alpha) * emphasis;
		let radius_mult = 1.0 + 0.4 * eased_t + if selected { 0.15 } else { 0.0 };

		draw_node(ctx, info, x, y, scale, theme, quality, alpha, radius_mult);

		let base_radius = scale.node_radius * radius_mult * info.size;
		if selected {
			draw_ring(ctx, x, y, base_radius + scale.ring_offset, scale.ring_width, theme.node.selection_color, 0.95);
		}
		if on_path {
			draw_ring(
				ctx,
				x,
				y,
				base_radius + scale.ring_offset * (if selected { 2.5 } else { 1.0 }),
				scale.ring_width,
				theme.node.path_color,
				0.9,
			);
		}
		if state.highlight.hovered_node == Some(idx) && eased_t > 0.01 {
			draw_ring(
				ctx,
				x,
				y,
				base_radius + scale.ring_offset,
				scale.ring_width,
				Color::rgb(255, 255, 255),
				0.8 * eased_t,
			);
		}

		if !labels_suppressed {
			draw_label(ctx, info, x, y, scale, (0.95 * alpha).max(0.6), radius_mult);
		}
	});
}

fn draw_ring(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	width: f64,
	color: Color,
	alpha: f64,
) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&color.with_alpha(color.a * alpha).to_css());
	ctx.set_line_width(width);
	ctx.stroke();
}

#[allow(clippy::too_many_arguments)]
fn draw_node(
	ctx: &CanvasRenderingContext2d,
	info: &NodeInfo,
	x: f64,
	y: f64,
	scale: &ScaledValues,
	theme: &Theme,
	quality: &QualitySettings,
	alpha: f64,
	radius_mult: f64,
) {
	let radius = scale.node_radius * radius_mult * info.size;

	ctx.set_global_alpha(alpha);
	trace_shape(ctx, info.shape, x, y, radius);

	// Gradient shading counts as a "shadow" for the quality ladder; the
	// low rung falls back to flat fills.
	if theme.node.use_gradient && quality.shadows_enabled {
		let gradient = ctx
			.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
			.unwrap();

		let base_color = parse_color(&info.color);
		let highlight = base_color.lighten(0.4);
		let shadow = base_color.darken(0.2);

		gradient.add_color_stop(0.0, &highlight.to_css()).unwrap();
		gradient.add_color_stop(0.7, &base_color.to_css()).unwrap();
		gradient.add_color_stop(1.0, &shadow.to_css()).unwrap();

		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&info.color);
	}
	ctx.fill();

	if theme.node.border_width > 0.0 {
		trace_shape(ctx, info.shape, x, y, radius);
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(theme.node.border_width / scale.k);
		ctx.stroke();
	}

	ctx.set_global_alpha(1.0);
}

/// Begin a path tracing the node's shape around its center.
fn trace_shape(ctx: &CanvasRenderingContext2d, shape: NodeShape, x: f64, y: f64, radius: f64) {
	ctx.begin_path();
	match shape {
		NodeShape::Circle => {
			let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		}
		NodeShape::Square => {
			let side = radius * 1.8;
			ctx.rect(x - side / 2.0, y - side / 2.0, side, side);
		}
		NodeShape::Diamond => {
			ctx.move_to(x, y - radius);
			ctx.line_to(x + radius, y);
			ctx.line_to(x, y + radius);
			ctx.line_to(x - radius, y);
			ctx.close_path();
		}
	}
}

fn draw_label(
	ctx: &CanvasRenderingContext2d,
	info: &NodeInfo,
	x: f64,
	y: f64,
	scale: &ScaledValues,
	alpha: f64,
	radius_mult: f64,
) {
	if alpha <= 0.05 {
		return;
	}
	let radius = scale.node_radius * radius_mult * info.size;
	ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", 0.9 * alpha));
	ctx.set_font(&scale.label_font);
	let _ = ctx.fill_text(&info.label, x + radius + 4.0, y + 3.0);
}

/// Parses a CSS color string into a [`Color`].
/// Supports hex (`#RRGGBB`) and `rgb()`/`rgba()` functional notation.
fn parse_color(color_str: &str) -> Color {
	if color_str.starts_with('#') && color_str.len() == 7 {
		let r = u8::from_str_radix(&color_str[1..3], 16).unwrap_or(128);
		let g = u8::from_str_radix(&color_str[3..5], 16).unwrap_or(128);
		let b = u8::from_str_radix(&color_str[5..7], 16).unwrap_or(128);
		Color::rgb(r, g, b)
	} else if color_str.starts_with("rgb") {
		let nums: Vec<&str> = color_str
			.trim_start_matches("rgba(")
			.trim_start_matches("rgb(")
			.trim_end_matches(')')
			.split(',')
			.collect();
		let r = nums
			.first()
			.and_then(|s| s.trim().parse().ok())
			.unwrap_or(128);
		let g = nums
			.get(1)
			.and_then(|s| s.trim().parse().ok())
			.unwrap_or(128);
		let b = nums
			.get(2)
			.and_then(|s| s.trim().parse().ok())
			.unwrap_or(128);
		let a = nums
			.get(3)
			.and_then(|s| s.trim().parse().ok())
			.unwrap_or(1.0);
		Color::rgba(r, g, b, a)
	} else {
		Color::rgb(128, 128, 128)
	}
}
