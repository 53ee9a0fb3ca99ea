//! Snapshot exporters.
//!
//! Renders a snapshot as JSON, CSV, GEXF or GraphML text. The contract
//! is structural (same nodes, same edges, same declared attributes), not
//! byte-exact formatting.

use super::model::GraphSnapshot;

/// Supported export formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
	Json,
	Csv,
	Gexf,
	GraphMl,
}

/// Render a snapshot in the requested format.
pub fn export(snapshot: &GraphSnapshot, format: ExportFormat) -> serde_json::Result<String> {
	Ok(match format {
		ExportFormat::Json => to_json(snapshot)?,
		ExportFormat::Csv => to_csv(snapshot),
		ExportFormat::Gexf => to_gexf(snapshot),
		ExportFormat::GraphMl => to_graphml(snapshot),
	})
}

/// JSON document with nodes, edges and metadata.
pub fn to_json(snapshot: &GraphSnapshot) -> serde_json::Result<String> {
	serde_json::to_string_pretty(snapshot)
}

/// CSV with two labeled sections, `NODES` then `EDGES`.
pub fn to_csv(snapshot: &GraphSnapshot) -> String {
	let mut out = String::new();
	out.push_str("NODES\n");
	out.push_str("id,name,league,city,founded,latitude,longitude\n");
	for node in &snapshot.nodes {
		let club = &node.club;
		out.push_str(&format!(
			"{},{},{},{},{},{},{}\n",
			node.id,
			csv_field(&club.name),
			csv_field(&club.league),
			csv_field(&club.city),
			club.founded,
			club.latitude.map(|v| v.to_string()).unwrap_or_default(),
			club.longitude.map(|v| v.to_string()).unwrap_or_default(),
		));
	}
	out.push_str("\nEDGES\n");
	out.push_str("id,source,target,type,strength,weight,active\n");
	for edge in &snapshot.edges {
		out.push_str(&format!(
			"{},{},{},{},{},{},{}\n",
			csv_field(&edge.id),
			edge.source,
			edge.target,
			edge.connection_type.as_str(),
			edge.strength.as_str(),
			edge.weight,
			edge.active,
		));
	}
	out
}

/// Minimal static undirected GEXF document: ids and labels only.
pub fn to_gexf(snapshot: &GraphSnapshot) -> String {
	let mut out = String::new();
	out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
	out.push_str("<gexf xmlns=\"http://gexf.net/1.3\" version=\"1.3\">\n");
	out.push_str("  <graph mode=\"static\" defaultedgetype=\"undirected\">\n");
	out.push_str("    <nodes>\n");
	for node in &snapshot.nodes {
		out.push_str(&format!(
			"      <node id=\"{}\" label=\"{}\" />\n",
			node.id,
			xml_escape(&node.label)
		));
	}
	out.push_str("    </nodes>\n    <edges>\n");
	for edge in &snapshot.edges {
		out.push_str(&format!(
			"      <edge id=\"{}\" source=\"{}\" target=\"{}\" />\n",
			xml_escape(&edge.id),
			edge.source,
			edge.target
		));
	}
	out.push_str("    </edges>\n  </graph>\n</gexf>\n");
	out
}

/// Minimal static undirected GraphML document: ids only.
pub fn to_graphml(snapshot: &GraphSnapshot) -> String {
	let mut out = String::new();
	out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
	out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");
	out.push_str("  <graph id=\"club-network\" edgedefault=\"undirected\">\n");
	for node in &snapshot.nodes {
		out.push_str(&format!("    <node id=\"n{}\" />\n", node.id));
	}
	for edge in &snapshot.edges {
		out.push_str(&format!(
			"    <edge id=\"{}\" source=\"n{}\" target=\"n{}\" />\n",
			xml_escape(&edge.id),
			edge.source,
			edge.target
		));
	}
	out.push_str("  </graph>\n</graphml>\n");
	out
}

/// Quote a CSV field when it needs it.
fn csv_field(value: &str) -> String {
	if value.contains([',', '"', '\n']) {
		format!("\"{}\"", value.replace('"', "\"\""))
	} else {
		value.to_string()
	}
}

fn xml_escape(value: &str) -> String {
	value
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}
