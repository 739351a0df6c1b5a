//! `ExactAssignmentSolver`: branch-and-bound over vehicle/node assignment
//! masks, with a bitmask-DP open-path TSP per assignment.
//!
//! `solve` recurses over vehicles, at each step iterating every submask of
//! the still-unassigned nodes, and resolves each submask's cost via a
//! memoization table keyed by the submask. A single shared `start`/`end`
//! is used for every vehicle's tour, one cost dimension drives the search,
//! and the soft visit cap is enforced as a hard branch-level constraint.
//!
//! Exactness here is local to a fixed node-to-vehicle partition: this is
//! simply the smallest case (bounded by `threshold`) where the exact method
//! and the heuristic substitute happen to coincide; global optimality across
//! partitions isn't attempted once the instance grows past that threshold.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use picking_core::model::Tour;

use crate::{degenerate_tour, interior_indices, visit_cap, CostMatrix, TourSolver};

/// Exact solver for small instances. `threshold` is advisory — it is what
/// `picking-service` checks before choosing this backend over
/// [`crate::annealing::SimulatedAnnealingSolver`]; this type itself will
/// simply take longer (and respect `time_limit`) on larger inputs.
pub struct ExactAssignmentSolver {
    pub threshold: usize,
}

impl Default for ExactAssignmentSolver {
    fn default() -> Self {
        Self { threshold: 12 }
    }
}

/// Held-Karp bitmask DP: minimum-cost path `start -> (all of `subset`, any
/// order) -> end`. Returns `(cost, [start, ...subset in order..., end])`.
fn solve_subset_tsp(matrix: &CostMatrix, start: usize, end: usize, subset: &[usize]) -> (i64, Vec<usize>) {
    let m = subset.len();
    if m == 0 {
        return (matrix[start][end], vec![start, end]);
    }

    let full = (1usize << m) - 1;
    let mut dp = vec![vec![i64::MAX; m]; 1 << m];
    let mut parent = vec![vec![usize::MAX; m]; 1 << m];

    for j in 0..m {
        dp[1 << j][j] = matrix[start][subset[j]];
    }

    for mask in 1..=full {
        for last in 0..m {
            if mask & (1 << last) == 0 || dp[mask][last] == i64::MAX {
                continue;
            }
            let current = dp[mask][last];
            for next in 0..m {
                if mask & (1 << next) != 0 {
                    continue;
                }
                let next_mask = mask | (1 << next);
                let candidate = current + matrix[subset[last]][subset[next]];
                if candidate < dp[next_mask][next] {
                    dp[next_mask][next] = candidate;
                    parent[next_mask][next] = last;
                }
            }
        }
    }

    let mut best_cost = i64::MAX;
    let mut best_last = 0usize;
    for last in 0..m {
        if dp[full][last] == i64::MAX {
            continue;
        }
        let total = dp[full][last] + matrix[subset[last]][end];
        if total < best_cost {
            best_cost = total;
            best_last = last;
        }
    }

    let mut order = Vec::with_capacity(m);
    let mut mask = full;
    let mut last = best_last;
    loop {
        order.push(subset[last]);
        let prev = parent[mask][last];
        mask &= !(1 << last);
        if prev == usize::MAX {
            break;
        }
        last = prev;
    }
    order.reverse();

    let mut nodes = Vec::with_capacity(m + 2);
    nodes.push(start);
    nodes.extend(order);
    nodes.push(end);
    (best_cost, nodes)
}

struct Search<'a> {
    matrix: &'a CostMatrix,
    start: usize,
    end: usize,
    interior: &'a [usize],
    cap: usize,
    num_vehicles: usize,
    deadline: Instant,
    memo: HashMap<usize, (i64, Vec<usize>)>,
    best_total: i64,
    best_masks: Option<Vec<usize>>,
    nodes_explored: u64,
}

impl<'a> Search<'a> {
    fn tsp_for_mask(&mut self, mask: usize) -> (i64, Vec<usize>) {
        if let Some(cached) = self.memo.get(&mask) {
            return cached.clone();
        }
        let subset: Vec<usize> = (0..self.interior.len())
            .filter(|&i| mask & (1 << i) != 0)
            .map(|i| self.interior[i])
            .collect();
        let result = solve_subset_tsp(self.matrix, self.start, self.end, &subset);
        self.memo.insert(mask, result.clone());
        result
    }

    fn timed_out(&mut self) -> bool {
        self.nodes_explored += 1;
        self.nodes_explored % 256 == 0 && Instant::now() >= self.deadline
    }

    fn recurse(&mut self, vehicle_idx: usize, remaining_mask: usize, assigned: &mut Vec<usize>, current_cost: i64) {
        if self.timed_out() || current_cost >= self.best_total {
            return;
        }

        if vehicle_idx + 1 == self.num_vehicles {
            if remaining_mask.count_ones() as usize > self.cap {
                return;
            }
            let (cost, _) = self.tsp_for_mask(remaining_mask);
            let total = current_cost + cost;
            if total < self.best_total {
                assigned[vehicle_idx] = remaining_mask;
                self.best_total = total;
                self.best_masks = Some(assigned.clone());
            }
            return;
        }

        let mut submask = remaining_mask;
        loop {
            if submask.count_ones() as usize <= self.cap {
                let (cost, _) = self.tsp_for_mask(submask);
                if current_cost + cost < self.best_total {
                    assigned[vehicle_idx] = submask;
                    self.recurse(vehicle_idx + 1, remaining_mask & !submask, assigned, current_cost + cost);
                }
            }
            if submask == 0 {
                break;
            }
            submask = (submask - 1) & remaining_mask;
        }
    }
}

impl TourSolver for ExactAssignmentSolver {
    fn solve(&self, matrix: &CostMatrix, start: usize, end: usize, num_vehicles: usize, time_limit: Duration) -> Vec<Tour> {
        if num_vehicles == 0 {
            return Vec::new();
        }

        let interior = interior_indices(matrix.len(), start, end);
        let m = interior.len();
        let cap = visit_cap(m, num_vehicles);
        let full_mask = if m == 0 { 0 } else { (1usize << m) - 1 };

        let mut search = Search {
            matrix,
            start,
            end,
            interior: &interior,
            cap,
            num_vehicles,
            deadline: Instant::now() + time_limit,
            memo: HashMap::new(),
            best_total: i64::MAX,
            best_masks: None,
            nodes_explored: 0,
        };

        let mut assigned = vec![0usize; num_vehicles];
        search.recurse(0, full_mask, &mut assigned, 0);

        match search.best_masks {
            Some(masks) => masks
                .into_iter()
                .map(|mask| {
                    let (cost, nodes) = search.tsp_for_mask(mask);
                    Tour { nodes, optimal_value: cost }
                })
                .collect(),
            None => {
                log::warn!("exact solver found no feasible assignment within the time limit");
                vec![degenerate_tour()]
            }
        }
    }
}
