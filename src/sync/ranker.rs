use crate::data::quake::Quake;
use std::cmp::Ordering;

/// Orders quakes strongest first and keeps at most `limit` of them.
///
/// The sort is stable, so quakes of equal magnitude keep their fetch order.
/// A NaN magnitude sorts after every real one.
pub fn rank(mut entities: Vec<Quake>, limit: usize) -> Vec<Quake> {
    if limit == 0 {
        return Vec::new();
    }
    entities.sort_by(|a, b| by_magnitude_desc(a.magnitude, b.magnitude));
    entities.truncate(limit);
    entities
}

fn by_magnitude_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(&a),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}
