use crate::flyer::Flyer;

/// Calls `f` for each candidate (by index into `flyers`) lying strictly closer
/// than `max_dist` to `flyer`. Stops early when `f` returns `false`.
#[inline]
pub fn for_each_neighbor<F>(
    flyer: &Flyer,
    flyers: &[Flyer],
    candidates: &[usize],
    max_dist: f32,
    mut f: F,
) where
    F: FnMut(usize) -> bool,
{
    for &idx in candidates {
        match flyers.get(idx) {
            Some(other) => {
                if flyer.distance_to(other) < max_dist && !f(idx) {
                    return;
                }
            }
            None => log::error!("Neighbor index {} out of bounds ({} flyers).", idx, flyers.len()),
        }
    }
}

/// Returns the first candidate strictly closer than `max_dist`, if any.
pub fn find_first_neighbor(flyer: &Flyer, flyers: &[Flyer], candidates: &[usize], max_dist: f32) -> Option<usize> {
    let mut found = None;
    for_each_neighbor(flyer, flyers, candidates, max_dist, |idx| {
        found = Some(idx);
        false
    });
    found
}

/// All candidates strictly closer than `max_dist`, preserving candidate order.
pub fn neighbors_within(flyer: &Flyer, flyers: &[Flyer], candidates: &[usize], max_dist: f32) -> Vec<usize> {
    let mut nearby = Vec::new();
    for_each_neighbor(flyer, flyers, candidates, max_dist, |idx| {
        nearby.push(idx);
        true
    });
    nearby
}

/// Indices of every flyer except `index`.
pub fn other_indices(index: usize, count: usize) -> Vec<usize> {
    (0..count).filter(|&i| i != index).collect()
}

/// Borrows the flyers at `indices`.
pub fn gather<'a>(flyers: &'a [Flyer], indices: &[usize]) -> Vec<&'a Flyer> {
    indices.iter().filter_map(|&i| flyers.get(i)).collect()
}
