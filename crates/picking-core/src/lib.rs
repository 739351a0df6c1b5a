//! Shared types and the Graph Store contract for the warehouse picking
//! optimizer, plus the pipeline stages that only need that contract: the
//! Allocator, the Metric Builder, the Path Expander and the Summarizer.
//!
//! Concrete graph backends live in `picking-graph`; the Tour Solver lives
//! in `picking-solver`; wiring all of it into one `optimize` call lives in
//! `picking-service`.

pub mod allocate;
pub mod error;
pub mod expand;
pub mod graph;
pub mod ids;
pub mod metrics;
pub mod model;
pub mod summary;

pub use error::PickingError;
pub use graph::{GraphStore, GraphWriter, Located, Node, Position};
pub use ids::{NodeId, ProductId, StorageId};
pub use model::{Allocation, Demand, DistanceMatrix, Leg, PickEntry, PickSheet, PickingSolution, Tour};
