use geo::algorithm::chamberlain_duquette_area::ChamberlainDuquetteArea;
use geo::{Coord, LineString, Polygon};

pub const SQ_FEET_PER_SQ_METER: f64 = 10.7639;

/// Geodesic ground area of one traced ring, in whole square feet.
///
/// The ring is an ordered list of vertices (x = longitude, y = latitude),
/// implicitly closed. Rings with fewer than 3 points measure 0. The area is
/// computed on the sphere (Chamberlain-Duquette, the same great-circle
/// method the mapping widget uses), converted to square feet, and rounded
/// to the nearest foot.
///
/// Each ring rounds independently; totals over several rings are the sum of
/// the rounded per-ring values, not a rounding of the summed raw area.
pub fn ring_area_sq_ft(ring: &[Coord<f64>]) -> u64 {
    if ring.len() < 3 {
        return 0;
    }
    let polygon = Polygon::new(LineString::from(ring.to_vec()), vec![]);
    let sq_meters = polygon.chamberlain_duquette_unsigned_area();
    (sq_meters * SQ_FEET_PER_SQ_METER).round() as u64
}
