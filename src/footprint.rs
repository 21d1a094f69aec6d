//! Spatial footprint
//!
//! A participant's footprint is the convex hull of their landmarks, measured in
//! km² after projecting into the UTM zone of the landmarks' mean position.
//! Hull areas in raw degrees are not areas, hence the projection step.

use crate::projection::{mean_position, UtmZone};
use crate::schema::SessionDocument;
use crate::types::{HullPolygon, HullRow};
use geo::{Area, ConvexHull, MultiPoint, Point};
use std::collections::HashMap;

/// Minimum number of valid points for a hull with area
pub const MIN_HULL_POINTS: usize = 3;

const SQ_METRES_PER_SQ_KM: f64 = 1_000_000.0;

/// Convex hull area (km²) of `(longitude, latitude)` pairs
///
/// Pairs with a missing or non-finite coordinate are dropped first. Returns
/// `None` when fewer than [`MIN_HULL_POINTS`] remain. Collinear input gives a
/// degenerate hull with an area of (about) zero.
pub fn convex_hull_area_km2<I>(coords: I) -> Option<f64>
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let points: Vec<(f64, f64)> = coords
        .into_iter()
        .filter_map(|pair| match pair {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => Some((lon, lat)),
            _ => None,
        })
        .collect();
    hull_area_of_valid(&points)
}

fn hull_area_of_valid(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < MIN_HULL_POINTS {
        return None;
    }
    let (mean_lon, mean_lat) = mean_position(points)?;
    let zone = UtmZone::for_position(mean_lon, mean_lat);
    tracing::debug!(epsg = zone.epsg(), points = points.len(), "projecting landmarks");

    // Points 90° off the central meridian have no finite projection
    let projected: MultiPoint<f64> = points
        .iter()
        .map(|&(lon, lat)| zone.project(lon, lat))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(Point::from)
        .collect();
    if projected.0.len() < MIN_HULL_POINTS {
        tracing::debug!(
            epsg = zone.epsg(),
            kept = projected.0.len(),
            "too few projectable landmarks for a hull"
        );
        return None;
    }
    Some(projected.convex_hull().unsigned_area() / SQ_METRES_PER_SQ_KM)
}

/// Hull area for one document's landmarks
pub fn document_hull_area_km2(doc: &SessionDocument) -> Option<f64> {
    hull_area_of_valid(&doc.valid_coordinates())
}

/// Valid landmark coordinates pooled per user, in first-appearance order
fn pool_by_user(docs: &[SessionDocument]) -> Vec<(Option<String>, Vec<(f64, f64)>)> {
    let mut order: Vec<(Option<String>, Vec<(f64, f64)>)> = Vec::new();
    let mut index: HashMap<Option<String>, usize> = HashMap::new();

    for doc in docs {
        if doc.landmarks.is_empty() {
            continue;
        }
        let slot = *index
            .entry(doc.participant.user_id.clone())
            .or_insert_with(|| {
                order.push((doc.participant.user_id.clone(), Vec::new()));
                order.len() - 1
            });
        order[slot].1.extend(doc.valid_coordinates());
    }
    order
}

/// One footprint row per user across all documents
pub fn hull_table_rows(docs: &[SessionDocument]) -> Vec<HullRow> {
    pool_by_user(docs)
        .into_iter()
        .map(|(user_id, points)| HullRow {
            convex_hull_area_km2: hull_area_of_valid(&points),
            num_landmarks: points.len(),
            user_id,
        })
        .collect()
}

/// Geographic hull rings for map overlays
///
/// Only users whose hull is a proper polygon get a ring; collinear or
/// too-small point sets are skipped.
pub fn hull_polygons(docs: &[SessionDocument]) -> Vec<HullPolygon> {
    pool_by_user(docs)
        .into_iter()
        .filter(|(_, points)| points.len() >= MIN_HULL_POINTS)
        .filter_map(|(user_id, points)| {
            let hull = points
                .into_iter()
                .map(Point::from)
                .collect::<MultiPoint<f64>>()
                .convex_hull();
            if hull.unsigned_area() <= 0.0 {
                return None;
            }
            let polygon = hull.exterior().coords().map(|c| (c.x, c.y)).collect();
            Some(HullPolygon { user_id, polygon })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(points: &[(f64, f64)]) -> Vec<(Option<f64>, Option<f64>)> {
        points.iter().map(|&(lon, lat)| (Some(lon), Some(lat))).collect()
    }

    fn doc(user: &str, landmarks: &[(f64, f64)]) -> SessionDocument {
        let landmarks: Vec<_> = landmarks
            .iter()
            .map(|(lon, lat)| serde_json::json!({"longitude": lon, "latitude": lat}))
            .collect();
        SessionDocument::from_value(&serde_json::json!({
            "participantInfo": {"userID": user},
            "landmarks": landmarks,
        }))
    }

    #[test]
    fn test_too_few_points_is_none() {
        assert_eq!(convex_hull_area_km2(pairs(&[])), None);
        assert_eq!(convex_hull_area_km2(pairs(&[(3.0, 0.0), (3.01, 0.0)])), None);

        let mut with_null = pairs(&[(3.0, 0.0), (3.01, 0.0)]);
        with_null.push((None, Some(0.01)));
        with_null.push((Some(3.0), None));
        assert_eq!(convex_hull_area_km2(with_null), None);
    }

    #[test]
    fn test_collinear_points_have_zero_area() {
        // On the zone 31 central meridian every point projects to easting 500 km
        let area = convex_hull_area_km2(pairs(&[(3.0, 1.0), (3.0, 1.1), (3.0, 1.2)])).unwrap();
        assert!(area.abs() < 1e-9);
    }

    #[test]
    fn test_unprojectable_points_are_dropped() {
        // Zone 31 has its central meridian at 3°E, so -87° and 93° on the equator
        // fall a quarter turn away from it
        let area = convex_hull_area_km2(pairs(&[(-87.0, 0.0), (93.0, 0.0), (3.0, 1.0)]));
        assert_eq!(area, None);

        let area = convex_hull_area_km2(pairs(&[
            (-87.0, 0.0),
            (3.0, 0.0),
            (3.01, 0.0),
            (3.01, 0.01),
            (3.0, 0.01),
            (93.0, 0.0),
        ]))
        .unwrap();
        assert!(area.is_finite());
        assert!((area - 1.2299).abs() / 1.2299 < 0.005);
    }

    #[test]
    fn test_square_area() {
        // 0.01° square at the equator: ~1112.75 m x ~1105.30 m in zone 31
        let square = pairs(&[(3.0, 0.0), (3.01, 0.0), (3.01, 0.01), (3.0, 0.01)]);
        let area = convex_hull_area_km2(square).unwrap();
        assert!((area - 1.2299).abs() < 1.2299 * 0.005);
    }

    #[test]
    fn test_interior_and_duplicate_points_do_not_change_area() {
        let square = [(3.0, 0.0), (3.01, 0.0), (3.01, 0.01), (3.0, 0.01)];
        let base = convex_hull_area_km2(pairs(&square)).unwrap();

        let mut extra = square.to_vec();
        extra.push((3.005, 0.005));
        extra.push((3.0, 0.0));
        let with_extra = convex_hull_area_km2(pairs(&extra)).unwrap();
        // The interior point shifts the mean, not the zone
        assert!((base - with_extra).abs() < 1e-9);
    }

    #[test]
    fn test_hull_table_pools_users_across_documents() {
        let docs = vec![
            doc("A", &[(3.0, 0.0), (3.01, 0.0)]),
            doc("B", &[(10.0, 10.0)]),
            doc("A", &[(3.01, 0.01), (3.0, 0.01)]),
        ];
        let rows = hull_table_rows(&docs);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id.as_deref(), Some("A"));
        assert_eq!(rows[0].num_landmarks, 4);
        assert!(rows[0].convex_hull_area_km2.unwrap() > 1.2);
        assert_eq!(rows[1].user_id.as_deref(), Some("B"));
        assert_eq!(rows[1].num_landmarks, 1);
        assert_eq!(rows[1].convex_hull_area_km2, None);
    }

    #[test]
    fn test_hull_polygons_skip_degenerate() {
        let docs = vec![
            doc("A", &[(3.0, 0.0), (3.01, 0.0), (3.01, 0.01), (3.0, 0.01)]),
            doc("B", &[(3.0, 1.0), (3.0, 1.1), (3.0, 1.2)]),
        ];
        let polygons = hull_polygons(&docs);

        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].user_id.as_deref(), Some("A"));
        let ring = &polygons[0].polygon;
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }
}
