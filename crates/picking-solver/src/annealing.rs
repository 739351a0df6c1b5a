//! `SimulatedAnnealingSolver`: the heuristic substitute for
//! PATH_CHEAPEST_ARC + GUIDED_LOCAL_SEARCH, used once an instance crosses
//! [`crate::exact::ExactAssignmentSolver::threshold`].
//!
//! Construction is a greedy nearest-arc walk per vehicle, assigned
//! round-robin under the visit cap (the PATH_CHEAPEST_ARC analogue).
//! Improvement is simulated annealing with 2-opt and relocate (or-opt)
//! neighborhoods across all vehicles' tours jointly, Metropolis acceptance of
//! worsening moves, and a geometric cooling schedule — run as several
//! independent restarts fanned in through `crossbeam-channel`, keeping the
//! cheapest total across all of them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use picking_core::model::Tour;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::{degenerate_tour, interior_indices, tour_cost, visit_cap, CostMatrix, TourSolver};

pub struct SimulatedAnnealingSolver {
    /// Independent parallel restarts fanned in via `crossbeam-channel`,
    /// keeping the best of all of them.
    pub restarts: usize,
    pub initial_temperature: f64,
    /// Multiplicative per-iteration cooling factor, `0 < cooling_rate < 1`.
    pub cooling_rate: f64,
}

impl Default for SimulatedAnnealingSolver {
    fn default() -> Self {
        Self {
            restarts: 4,
            initial_temperature: 50.0,
            cooling_rate: 0.999,
        }
    }
}

fn total_cost(tours: &[Tour]) -> i64 {
    tours.iter().map(|t| t.optimal_value).sum()
}

fn construct_greedy(
    matrix: &CostMatrix,
    start: usize,
    end: usize,
    num_vehicles: usize,
    cap: usize,
    interior: &[usize],
    rng: &mut impl Rng,
) -> Vec<Tour> {
    let mut unassigned = interior.to_vec();
    // Shuffle so nearest-arc tie-breaking varies across restarts (Fisher-Yates).
    for i in (1..unassigned.len()).rev() {
        let j = rng.gen_range(0..=i);
        unassigned.swap(i, j);
    }

    let mut per_vehicle: Vec<Vec<usize>> = vec![Vec::new(); num_vehicles];
    let mut v = 0;
    while !unassigned.is_empty() {
        if per_vehicle[v].len() >= cap {
            v = (v + 1) % num_vehicles;
            continue;
        }
        let tail = per_vehicle[v].last().copied().unwrap_or(start);
        let (pick, _) = unassigned
            .iter()
            .enumerate()
            .min_by_key(|&(_, &node)| matrix[tail][node])
            .expect("unassigned is non-empty here");
        let node = unassigned.remove(pick);
        per_vehicle[v].push(node);
        v = (v + 1) % num_vehicles;
    }

    per_vehicle
        .into_iter()
        .map(|nodes| {
            let mut sequence = Vec::with_capacity(nodes.len() + 2);
            sequence.push(start);
            sequence.extend(nodes);
            sequence.push(end);
            let cost = tour_cost(matrix, &sequence);
            Tour { nodes: sequence, optimal_value: cost }
        })
        .collect()
}

/// One neighborhood move: in-place 2-opt within a tour, or relocating a
/// single interior node across tours. Returns `None` when the chosen move
/// isn't applicable (tour too short, capacity would be exceeded).
fn propose_move(tours: &[Tour], matrix: &CostMatrix, cap: usize, rng: &mut impl Rng) -> Option<Vec<Tour>> {
    let num_vehicles = tours.len();
    if num_vehicles == 0 {
        return None;
    }
    let mut candidate = tours.to_vec();

    if num_vehicles == 1 || rng.gen_bool(0.5) {
        let v = rng.gen_range(0..num_vehicles);
        let len = candidate[v].nodes.len();
        if len < 4 {
            return None;
        }
        let i = rng.gen_range(1..len - 2);
        let j = rng.gen_range(i + 1..len - 1);
        candidate[v].nodes[i..=j].reverse();
        candidate[v].optimal_value = tour_cost(matrix, &candidate[v].nodes);
        Some(candidate)
    } else {
        let from = rng.gen_range(0..num_vehicles);
        let mut to = rng.gen_range(0..num_vehicles);
        if to == from {
            to = (to + 1) % num_vehicles;
        }
        if candidate[from].nodes.len() < 3 {
            return None;
        }
        if candidate[to].nodes.len().saturating_sub(1) > cap {
            return None;
        }

        let pos = rng.gen_range(1..candidate[from].nodes.len() - 1);
        let node = candidate[from].nodes.remove(pos);
        let insert_at = rng.gen_range(1..candidate[to].nodes.len());
        candidate[to].nodes.insert(insert_at, node);

        candidate[from].optimal_value = tour_cost(matrix, &candidate[from].nodes);
        candidate[to].optimal_value = tour_cost(matrix, &candidate[to].nodes);
        Some(candidate)
    }
}

#[allow(clippy::too_many_arguments)]
fn anneal_once(
    matrix: &CostMatrix,
    start: usize,
    end: usize,
    num_vehicles: usize,
    cap: usize,
    deadline: Instant,
    seed: u64,
    initial_temperature: f64,
    cooling_rate: f64,
) -> Vec<Tour> {
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    let interior = interior_indices(matrix.len(), start, end);

    let mut tours = construct_greedy(matrix, start, end, num_vehicles, cap, &interior, &mut rng);
    let mut current_cost = total_cost(&tours);
    let mut best = tours.clone();
    let mut best_cost = current_cost;
    let mut temperature = initial_temperature;

    while Instant::now() < deadline {
        if let Some(candidate) = propose_move(&tours, matrix, cap, &mut rng) {
            let candidate_cost = total_cost(&candidate);
            let delta = candidate_cost - current_cost;
            let accept = delta <= 0 || rng.gen::<f64>() < (-(delta as f64) / temperature.max(1e-9)).exp();
            if accept {
                tours = candidate;
                current_cost = candidate_cost;
                if current_cost < best_cost {
                    best_cost = current_cost;
                    best = tours.clone();
                }
            }
        }
        temperature = (temperature * cooling_rate).max(1e-6);
    }

    best
}

impl TourSolver for SimulatedAnnealingSolver {
    fn solve(&self, matrix: &CostMatrix, start: usize, end: usize, num_vehicles: usize, time_limit: Duration) -> Vec<Tour> {
        if num_vehicles == 0 {
            return Vec::new();
        }

        let interior = interior_indices(matrix.len(), start, end);
        if interior.is_empty() {
            let direct_cost = matrix[start][end];
            return (0..num_vehicles)
                .map(|_| Tour { nodes: vec![start, end], optimal_value: direct_cost })
                .collect();
        }

        let cap = visit_cap(interior.len(), num_vehicles);
        let deadline = Instant::now() + time_limit;
        let restarts = self.restarts.max(1);
        let matrix = Arc::new(matrix.clone());

        let (tx, rx) = crossbeam_channel::bounded(restarts);
        for i in 0..restarts {
            let tx = tx.clone();
            let matrix = Arc::clone(&matrix);
            let seed = 0x9E37_79B9_7F4A_7C15u64.wrapping_mul(i as u64 + 1).wrapping_add(interior.len() as u64);
            let initial_temperature = self.initial_temperature;
            let cooling_rate = self.cooling_rate;
            std::thread::spawn(move || {
                let result = anneal_once(&matrix, start, end, num_vehicles, cap, deadline, seed, initial_temperature, cooling_rate);
                let _ = tx.send(result);
            });
        }
        drop(tx);

        let best = rx.iter().min_by_key(|tours| total_cost(tours));
        match best {
            Some(tours) => tours,
            None => {
                log::warn!("simulated annealing solver produced no restarts within the time limit");
                vec![degenerate_tour()]
            }
        }
    }
}
