//! Connection recommendations.
//!
//! Scores non-connected club pairs by shared attributes and mutual
//! neighbors to suggest new edges. Recommendations are transient: created
//! on demand from the current snapshot, never stored.

use super::adjacency;
use super::model::{ConnectionStrength, ConnectionType, GraphSnapshot, NodeId};

const SAME_LEAGUE_BONUS: f64 = 30.0;
const SAME_CITY_BONUS: f64 = 25.0;
const NEARBY_BONUS: f64 = 20.0;
const MUTUAL_NEIGHBOR_BONUS: f64 = 5.0;
const NEARBY_KM: f64 = 50.0;
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A scored suggestion to connect two clubs.
#[derive(Clone, Debug)]
pub struct Recommendation {
	pub source: NodeId,
	pub target: NodeId,
	pub score: f64,
	/// Human-readable scoring reasons, in the order they applied.
	pub reasons: Vec<String>,
	pub suggested_type: ConnectionType,
	pub suggested_strength: ConnectionStrength,
	pub mutual_neighbors: usize,
	/// Great-circle distance, when both clubs have coordinates.
	pub distance_km: Option<f64>,
	pub same_league: bool,
	pub same_city: bool,
}

/// Recommend new connections for `node`, best first.
///
/// Candidates are every node that is not `node` and not already connected
/// to it. Scoring is additive: same league +30, same city +25, within
/// 50 km +20 (requires coordinates on both sides), +5 per mutual
/// neighbor. Candidates that score 0 are dropped. Ties keep snapshot
/// order (stable sort), so identical input yields identical output.
pub fn recommend(
	snapshot: &GraphSnapshot,
	node: NodeId,
	max_results: usize,
) -> Vec<Recommendation> {
	let Some(origin) = snapshot.node(node) else {
		return Vec::new();
	};
	let adjacency = adjacency::build(&snapshot.nodes, &snapshot.edges);
	let origin_neighbors = adjacency.neighbor_set(node);

	let mut recommendations = Vec::new();
	for candidate in &snapshot.nodes {
		if candidate.id == node || origin_neighbors.contains(&candidate.id) {
			continue;
		}
		if snapshot.has_edge_between(node, candidate.id) {
			// Covers connected pairs the neighbor set may miss (inactive
			// edges filtered upstream, etc.).
			continue;
		}

		let mut score = 0.0;
		let mut reasons = Vec::new();

		let same_league = origin.club.league == candidate.club.league;
		if same_league {
			score += SAME_LEAGUE_BONUS;
			reasons.push(format!("same league ({})", origin.club.league));
		}

		let same_city = origin.club.city == candidate.club.city;
		if same_city {
			score += SAME_CITY_BONUS;
			reasons.push(format!("same city ({})", origin.club.city));
		}

		let distance_km = match (origin.club.coordinates(), candidate.club.coordinates()) {
			(Some(a), Some(b)) => Some(haversine_km(a, b)),
			_ => None,
		};
		if let Some(km) = distance_km {
			if km < NEARBY_KM {
				score += NEARBY_BONUS;
				reasons.push(format!("within {NEARBY_KM:.0} km ({km:.1} km apart)"));
			}
		}

		let candidate_neighbors = adjacency.neighbor_set(candidate.id);
		let mutual_neighbors = origin_neighbors
			.iter()
			.filter(|&&n| n != candidate.id && candidate_neighbors.contains(&n))
			.count();
		if mutual_neighbors > 0 {
			score += MUTUAL_NEIGHBOR_BONUS * mutual_neighbors as f64;
			reasons.push(format!("{mutual_neighbors} mutual connection(s)"));
		}

		if score <= 0.0 {
			continue;
		}

		recommendations.push(Recommendation {
			source: node,
			target: candidate.id,
			score,
			reasons,
			suggested_type: suggest_type(same_city, same_league),
			suggested_strength: suggest_strength(score),
			mutual_neighbors,
			distance_km,
			same_league,
			same_city,
		});
	}

	recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
	recommendations.truncate(max_results);
	recommendations
}

fn suggest_type(same_city: bool, same_league: bool) -> ConnectionType {
	if same_city {
		ConnectionType::Geographic
	} else if same_league {
		ConnectionType::Friendly
	} else {
		ConnectionType::Partnership
	}
}

fn suggest_strength(score: f64) -> ConnectionStrength {
	if score > 50.0 {
		ConnectionStrength::Strong
	} else if score > 25.0 {
		ConnectionStrength::Moderate
	} else {
		ConnectionStrength::Weak
	}
}

/// Great-circle distance between two (latitude, longitude) points in
/// degrees, via the haversine formula.
fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
	let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
	let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
	let dlat = lat2 - lat1;
	let dlon = lon2 - lon1;

	let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
	2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
	use super::super::model::tests::{club, connection, snapshot};
	use super::super::model::ClubRecord;
	use super::*;

	fn coords(mut record: ClubRecord, lat: f64, lon: f64) -> ClubRecord {
		record.latitude = Some(lat);
		record.longitude = Some(lon);
		record
	}

	#[test]
	fn shared_league_outscores_strangers() {
		let snap = snapshot(
			&[club(1, "A", "L1", "X"), club(2, "B", "L1", "Y"), club(3, "C", "L2", "Z")],
			&[connection(1, 2, 80.0)],
		);
		// From node 2: node 1 is connected, so only node 3 remains and it
		// shares nothing — excluded at score 0.
		let for_two = recommend(&snap, 2, 10);
		assert!(for_two.is_empty());

		// From node 3 the same-league pair outranks the cross-league one.
		let snap = snapshot(
			&[club(1, "A", "L1", "X"), club(2, "B", "L1", "Y"), club(3, "C", "L1", "Z")],
			&[connection(1, 2, 80.0)],
		);
		let for_three = recommend(&snap, 3, 10);
		assert_eq!(for_three.len(), 2);
		assert!(for_three.iter().all(|r| (r.score - 30.0).abs() < 1e-9));
	}

	#[test]
	fn connected_pairs_are_never_recommended() {
		let snap = snapshot(
			&[club(1, "A", "L1", "X"), club(2, "B", "L1", "X"), club(3, "C", "L1", "Y")],
			&[connection(1, 2, 80.0)],
		);
		let recs = recommend(&snap, 1, 10);
		assert!(recs.iter().all(|r| r.target != 2));
		assert!(recs.iter().all(|r| !snap.has_edge_between(r.source, r.target)));
	}

	#[test]
	fn city_and_league_bonuses_stack() {
		let snap = snapshot(
			&[club(1, "A", "L1", "X"), club(2, "B", "L1", "X")],
			&[],
		);
		let recs = recommend(&snap, 1, 10);
		assert_eq!(recs.len(), 1);
		assert!((recs[0].score - 55.0).abs() < 1e-9);
		assert!(recs[0].same_league && recs[0].same_city);
		assert_eq!(recs[0].suggested_type, ConnectionType::Geographic);
		assert_eq!(recs[0].suggested_strength, ConnectionStrength::Strong);
	}

	#[test]
	fn mutual_neighbors_add_five_each() {
		// 1 and 4 share neighbors 2 and 3 but differ in league/city.
		let snap = snapshot(
			&[
				club(1, "A", "L1", "W"),
				club(2, "B", "L2", "X"),
				club(3, "C", "L3", "Y"),
				club(4, "D", "L4", "Z"),
			],
			&[
				connection(1, 2, 50.0),
				connection(1, 3, 50.0),
				connection(4, 2, 50.0),
				connection(4, 3, 50.0),
			],
		);
		let recs = recommend(&snap, 1, 10);
		assert_eq!(recs.len(), 1);
		assert_eq!(recs[0].target, 4);
		assert_eq!(recs[0].mutual_neighbors, 2);
		assert!((recs[0].score - 10.0).abs() < 1e-9);
		assert_eq!(recs[0].suggested_type, ConnectionType::Partnership);
		assert_eq!(recs[0].suggested_strength, ConnectionStrength::Weak);
	}

	#[test]
	fn nearby_clubs_get_the_distance_bonus() {
		// Manchester's two big clubs are a few km apart.
		let a = coords(club(1, "A", "L1", "ManA"), 53.483, -2.200);
		let b = coords(club(2, "B", "L2", "ManB"), 53.463, -2.291);
		let far = coords(club(3, "C", "L3", "London"), 51.507, -0.128);
		let snap = snapshot(&[a, b, far], &[]);

		let recs = recommend(&snap, 1, 10);
		assert_eq!(recs.len(), 1);
		assert_eq!(recs[0].target, 2);
		assert!((recs[0].score - 20.0).abs() < 1e-9);
		let km = recs[0].distance_km.unwrap();
		assert!(km > 1.0 && km < 10.0, "unexpected distance {km}");
	}

	#[test]
	fn results_sorted_best_first_with_stable_ties() {
		let snap = snapshot(
			&[
				club(1, "A", "L1", "W"),
				club(2, "Same league+city", "L1", "W"),
				club(3, "Tie one", "L1", "X"),
				club(4, "Tie two", "L1", "Y"),
			],
			&[],
		);
		let recs = recommend(&snap, 1, 10);
		assert_eq!(recs[0].target, 2);
		// 3 and 4 tie at 30; snapshot order decides.
		assert_eq!(recs[1].target, 3);
		assert_eq!(recs[2].target, 4);

		let capped = recommend(&snap, 1, 1);
		assert_eq!(capped.len(), 1);
		assert_eq!(capped[0].target, 2);
	}

	#[test]
	fn unknown_node_yields_nothing() {
		let snap = snapshot(&[club(1, "A", "L1", "X")], &[]);
		assert!(recommend(&snap, 42, 10).is_empty());
	}
}
