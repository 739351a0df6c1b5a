//! The Tour Solver: a multi-vehicle open TSP over a precomputed distance
//! matrix.
//!
//! Multi-vehicle open TSP: every vehicle departs from a shared `start` index
//! and arrives at a shared `end` index, every non-endpoint node is visited by
//! exactly one vehicle, and each vehicle's visit count is soft-capped at
//! `visit_cap`. The reference configuration (PATH_CHEAPEST_ARC +
//! GUIDED_LOCAL_SEARCH, 5s time limit) is substituted here by two backends
//! selected on instance size: [`exact::ExactAssignmentSolver`] for small
//! instances, [`annealing::SimulatedAnnealingSolver`] for larger ones.

pub mod annealing;
pub mod exact;

use std::time::Duration;

use picking_core::model::Tour;

/// The truncating-integer cost matrix the Metric Builder hands to the
/// solver.
pub type CostMatrix = Vec<Vec<i64>>;

/// The solver plug-point: any exact or heuristic solver that accepts (a) a
/// transit cost callback, (b) start/end indices shared by every vehicle,
/// (c) a per-vehicle soft visit cap, (d) a wall-clock limit. Concrete
/// backends live in [`exact`] and [`annealing`].
pub trait TourSolver {
    /// Returns exactly `num_vehicles` tours covering every index in
    /// `0..matrix.len()` except `start` and `end` exactly once, each
    /// beginning at `start` and ending at `end`. On total failure to find
    /// any feasible solution within `time_limit`, returns a single
    /// degenerate `Tour { nodes: vec![], optimal_value: 0 }` — callers check
    /// [`Tour::is_degenerate`] and decide whether to surface
    /// `PickingError::SolverTimeout`.
    fn solve(&self, matrix: &CostMatrix, start: usize, end: usize, num_vehicles: usize, time_limit: Duration) -> Vec<Tour>;
}

/// The soft per-vehicle visit cap: `ceil(n_visit / num_vehicles) + 1`.
///
/// `n_visit` is the count of non-endpoint nodes. Since the Metric Builder
/// always appends `start_id`/`dest_id` as the *last* two indices, index 0
/// is always an interior node in this repo's matrix layout, so counting
/// every node but the two endpoints is unambiguous here.
pub fn visit_cap(n_visit: usize, num_vehicles: usize) -> usize {
    if num_vehicles == 0 {
        return n_visit;
    }
    let n_visit = n_visit as f64;
    let num_vehicles = num_vehicles as f64;
    (n_visit / num_vehicles).ceil() as usize + 1
}

/// Every matrix index except `start` and `end`, in ascending order.
pub fn interior_indices(n: usize, start: usize, end: usize) -> Vec<usize> {
    (0..n).filter(|&i| i != start && i != end).collect()
}

/// Sum of `matrix[tour[i]][tour[i + 1]]` over a full node sequence.
pub fn tour_cost(matrix: &CostMatrix, nodes: &[usize]) -> i64 {
    nodes.windows(2).map(|pair| matrix[pair[0]][pair[1]]).sum()
}

/// A degenerate tour surfaced when a solver finds nothing at all.
pub fn degenerate_tour() -> Tour {
    Tour { nodes: Vec::new(), optimal_value: 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_cap_balances_two_vehicles_over_ten_interior_nodes() {
        // 10 interior nodes, 2 vehicles -> each tour holds 5 (+-1).
        assert_eq!(visit_cap(10, 2), 6);
    }

    #[test]
    fn visit_cap_single_vehicle_covers_everything() {
        assert_eq!(visit_cap(7, 1), 8);
    }

    #[test]
    fn interior_indices_excludes_only_the_endpoints() {
        assert_eq!(interior_indices(5, 3, 4), vec![0, 1, 2]);
        assert_eq!(interior_indices(5, 0, 4), vec![1, 2, 3]);
    }
}
