//! Visual theming for the club network canvas.
//!
//! Provides color handling, league-keyed node palettes and per-connection
//! edge styling.

use std::collections::HashMap;

use crate::graph::model::{ConnectionStrength, ConnectionType};

/// RGBA color representation.
#[derive(Clone, Copy, Debug)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	pub fn to_css_rgb(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

/// Fallback palette for leagues without an explicit color.
#[derive(Clone, Debug)]
pub struct NodePalette {
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Muted, harmonious palette - slate blues and teals (default)
	pub fn slate() -> Self {
		Self {
			colors: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(129, 161, 193), // Light steel
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(136, 160, 175), // Cadet blue
				Color::rgb(108, 142, 173), // Air force blue
				Color::rgb(119, 158, 165), // Desaturated cyan
				Color::rgb(143, 163, 180), // Cool gray
				Color::rgb(122, 153, 168), // Dusty blue
			],
		}
	}

	/// Pitch-side greens and kit accents
	pub fn pitch() -> Self {
		Self {
			colors: vec![
				Color::rgb(85, 140, 100),  // Turf green
				Color::rgb(120, 155, 110), // Sage
				Color::rgb(100, 145, 135), // Eucalyptus
				Color::rgb(150, 150, 95),  // Olive
				Color::rgb(95, 130, 120),  // Sea moss
				Color::rgb(135, 160, 120), // Fern
				Color::rgb(110, 150, 105), // Meadow
				Color::rgb(125, 145, 130), // Lichen
			],
		}
	}

	pub fn get(&self, index: usize) -> Color {
		self.colors[index % self.colors.len()]
	}
}

/// Colors for well-known leagues. Leagues not in this map fall back to
/// the theme palette in first-seen order.
pub fn default_league_colors() -> HashMap<String, String> {
	[
		("Premier League", "#7c3aed"),
		("La Liga", "#ef8733"),
		("Serie A", "#2d7dd2"),
		("Bundesliga", "#d64545"),
		("Ligue 1", "#3b9a6e"),
		("Eredivisie", "#e0993f"),
		("Primeira Liga", "#4d8f8c"),
	]
	.into_iter()
	.map(|(k, v)| (k.to_string(), v.to_string()))
	.collect()
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Fallback edge color when no type color applies
	pub color: Color,
	/// Color of inactive (historical) connections
	pub inactive_color: Color,
	/// Extra alpha applied to inactive connections
	pub inactive_alpha: f64,
}

impl EdgeStyle {
	/// Color for a connection type. Rivalries run hot, transfers cool,
	/// administrative ties stay neutral.
	pub fn type_color(&self, connection_type: ConnectionType) -> Color {
		match connection_type {
			ConnectionType::Rivalry => Color::rgba(200, 95, 90, self.color.a),
			ConnectionType::Friendly => Color::rgba(110, 165, 120, self.color.a),
			ConnectionType::Geographic => Color::rgba(150, 150, 110, self.color.a),
			ConnectionType::Historical => Color::rgba(160, 135, 170, self.color.a),
			ConnectionType::PlayerTransfer | ConnectionType::Transfer | ConnectionType::Loan => {
				Color::rgba(95, 140, 185, self.color.a)
			}
			ConnectionType::YouthDevelopment => Color::rgba(120, 170, 170, self.color.a),
			ConnectionType::Business
			| ConnectionType::Partnership
			| ConnectionType::CoachingStaff
			| ConnectionType::Management => self.color,
		}
	}

	/// Line-width multiplier for a strength tag.
	pub fn strength_width(&self, strength: ConnectionStrength) -> f64 {
		match strength {
			ConnectionStrength::Weak => 0.7,
			ConnectionStrength::Moderate => 1.0,
			ConnectionStrength::Strong => 1.6,
		}
	}
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Border/stroke width (0 = no border)
	pub border_width: f64,
	/// Border color
	pub border_color: Color,
	/// Ring color for selected nodes
	pub selection_color: Color,
	/// Emphasis color for nodes on a highlighted path
	pub path_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub palette: NodePalette,
	pub league_colors: HashMap<String, String>,
}

impl Theme {
	/// Clean dark theme (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
				vignette: 0.15,
			},
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.5),
				inactive_color: Color::rgba(120, 125, 135, 0.5),
				inactive_alpha: 0.45,
			},
			node: NodeStyle {
				use_gradient: true,
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				selection_color: Color::rgba(255, 215, 130, 0.95),
				path_color: Color::rgba(130, 220, 255, 0.9),
			},
			palette: NodePalette::slate(),
			league_colors: default_league_colors(),
		}
	}

	/// Matchday theme with pitch greens
	pub fn matchday() -> Self {
		Self {
			name: "matchday",
			background: BackgroundStyle {
				color: Color::rgb(18, 26, 21),
				color_secondary: Color::rgb(24, 34, 28),
				use_gradient: true,
				vignette: 0.2,
			},
			edge: EdgeStyle {
				color: Color::rgba(150, 170, 155, 0.45),
				inactive_color: Color::rgba(120, 130, 120, 0.5),
				inactive_alpha: 0.4,
			},
			node: NodeStyle {
				use_gradient: true,
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				selection_color: Color::rgba(255, 225, 140, 0.95),
				path_color: Color::rgba(150, 230, 190, 0.9),
			},
			palette: NodePalette::pitch(),
			league_colors: default_league_colors(),
		}
	}

	/// Minimal flat theme
	pub fn minimal() -> Self {
		Self {
			name: "minimal",
			background: BackgroundStyle {
				color: Color::rgb(25, 28, 35),
				color_secondary: Color::rgb(25, 28, 35),
				use_gradient: false,
				vignette: 0.0,
			},
			edge: EdgeStyle {
				color: Color::rgba(130, 145, 165, 0.4),
				inactive_color: Color::rgba(110, 115, 125, 0.4),
				inactive_alpha: 0.5,
			},
			node: NodeStyle {
				use_gradient: false,
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				selection_color: Color::rgba(255, 215, 130, 0.9),
				path_color: Color::rgba(130, 220, 255, 0.85),
			},
			palette: NodePalette::slate(),
			league_colors: default_league_colors(),
		}
	}

	/// Look up a theme by its configuration name, falling back to the
	/// default.
	pub fn by_name(name: &str) -> Self {
		match name {
			"matchday" => Self::matchday(),
			"minimal" => Self::minimal(),
			_ => Self::default_theme(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
