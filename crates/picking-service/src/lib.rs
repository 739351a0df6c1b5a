//! The Orchestrator: wires the Allocator, Metric Builder, Tour Solver, Path
//! Expander and Summarizer into one `optimize` call inside a single
//! conceptual read transaction, against an explicitly injected store rather
//! than a process-level global.

pub mod config;
mod timing;

use std::collections::HashMap;
use std::time::Duration;

use picking_core::error::PickingError;
use picking_core::graph::{GraphStore, GraphWriter, OrderSummaryEntry};
use picking_core::ids::NodeId;
use picking_core::model::{Demand, PickingSolution};
use picking_core::{allocate, expand, metrics, summary};
use picking_solver::annealing::SimulatedAnnealingSolver;
use picking_solver::exact::ExactAssignmentSolver;
use picking_solver::TourSolver;

pub use config::PickingConfig;

const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(5);
const DEFAULT_EXACT_THRESHOLD: usize = 12;

/// Owns an injected `store` (constructed once at startup, passed down —
/// never a process-level global) plus two tunables: the exact/heuristic
/// solver switchover point and the solver's wall-clock budget (default 5s).
pub struct PickingService<S> {
    store: S,
    exact_threshold: usize,
    time_limit: Duration,
}

impl<S> PickingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            exact_threshold: DEFAULT_EXACT_THRESHOLD,
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }

    pub fn with_exact_threshold(mut self, threshold: usize) -> Self {
        self.exact_threshold = threshold;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<S: GraphStore> PickingService<S> {
    /// Each stage is scoped under a [`timing::StageTimer`] when
    /// `config.is_testing`: offer check + allocate (with the
    /// `assert_route` post-condition) -> metric build -> tour solve ->
    /// per-tour expand + summarize.
    pub fn optimize(&self, demand: &Demand, config: &PickingConfig) -> Result<PickingSolution, PickingError> {
        if !config.is_testing && config.debug.is_some() {
            log::warn!("`debug` option is ignored outside testing mode");
        }

        let mut metrics_out: Option<HashMap<String, f64>> = config.is_testing.then(HashMap::new);
        let start_id = NodeId::from(config.start_id.clone());
        let dest_id = NodeId::from(config.dest_id.clone());
        let num_routes = config.num_routes.max(1);

        let allocations = {
            let _timer = timing::StageTimer::start("allocate", metrics_out.as_mut());
            let allocations = allocate::allocate(&self.store, &start_id, demand)?;
            allocate::assert_route(demand, &allocations)?;
            allocations
        };

        let distance_matrix = {
            let _timer = timing::StageTimer::start("metric_build", metrics_out.as_mut());
            metrics::build_distance_matrix(&self.store, &allocations, &start_id, &dest_id)?
        };

        let tours = {
            let _timer = timing::StageTimer::start("tour_solve", metrics_out.as_mut());
            let cost_matrix = distance_matrix.to_cost_matrix();
            let start_index = distance_matrix.index_of[&start_id];
            let dest_index = distance_matrix.index_of[&dest_id];
            let n_visit = distance_matrix.len().saturating_sub(2);

            let tours = if n_visit <= self.exact_threshold {
                ExactAssignmentSolver { threshold: self.exact_threshold }.solve(
                    &cost_matrix,
                    start_index,
                    dest_index,
                    num_routes,
                    self.time_limit,
                )
            } else {
                SimulatedAnnealingSolver::default().solve(&cost_matrix, start_index, dest_index, num_routes, self.time_limit)
            };

            if tours.iter().any(|tour| tour.is_degenerate()) {
                return Err(PickingError::SolverTimeout);
            }
            tours
        };

        let (paths, summaries) = {
            let _timer = timing::StageTimer::start("expand_and_summarize", metrics_out.as_mut());
            let mut paths = Vec::with_capacity(tours.len());
            let mut summaries = Vec::with_capacity(tours.len());
            for tour in &tours {
                paths.push(expand::expand_tour(&self.store, tour, &distance_matrix.ids));
                summaries.push(summary::summarize(tour, &distance_matrix.ids, &allocations));
            }
            (paths, summaries)
        };

        Ok(PickingSolution {
            paths,
            summaries,
            performance_metrics: metrics_out,
        })
    }
}

impl<S: GraphWriter> PickingService<S> {
    /// Decrements inventory via an optimistic-concurrency commit.
    /// Write-transaction surface, kept separate from `optimize`'s read-only
    /// path.
    pub fn process_order_summary(&mut self, summary: &[OrderSummaryEntry]) -> Result<(), PickingError> {
        self.store.commit(summary)
    }

    /// Idempotently undoes a commit.
    pub fn restore_order_summary(&mut self, summary: &[OrderSummaryEntry]) -> Result<(), PickingError> {
        self.store.restore(summary)
    }
}
