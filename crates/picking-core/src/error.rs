use std::collections::HashMap;

use thiserror::Error;

use crate::ids::{NodeId, ProductId};

/// A product's demand vs. what the store actually has available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OfferGap {
    pub need: u64,
    pub available: u64,
}

/// A product's demand vs. what the allocator actually managed to assign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemandGap {
    pub need: u64,
    pub took: u64,
}

/// A single commit mismatch: the quantity the caller expected to find at a
/// storage for a product, vs. what is actually recorded there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriftEntry {
    pub storage_id: NodeId,
    pub product_id: ProductId,
    pub expected_quantity: u64,
    pub actual_quantity: u64,
}

/// Every failure mode the picking pipeline can surface. All are fatal to
/// the current call; none are retried by the core itself.
#[derive(Debug, Error)]
pub enum PickingError {
    /// Demand references a product id the graph store has no record of at
    /// all (distinct from a known product with insufficient supply).
    #[error("unknown product ids: {0:?}")]
    UnknownProduct(Vec<ProductId>),

    /// Total available supply is below demand for at least one product.
    #[error("insufficient offer: {0:?}")]
    InsufficientOffer(HashMap<ProductId, OfferGap>),

    /// The allocator finished with a gap after the offer check passed —
    /// a defensive post-condition that should be unreachable in practice.
    #[error("unsatisfied demand: {0:?}")]
    UnsatisfiedDemand(HashMap<ProductId, DemandGap>),

    /// Two nodes that must be connected (within a requested node set) have
    /// no path between them in the warehouse graph.
    #[error("nodes unreachable from each other: {0} <-> {1}")]
    Unreachable(NodeId, NodeId),

    /// The tour solver returned no solution at all within its time limit.
    #[error("tour solver found no solution within the time limit")]
    SolverTimeout,

    /// A commit saw a quantity different from the one recorded at
    /// allocation time; the store is left unchanged.
    #[error("inventory drift detected: {0:?}")]
    InventoryDrift(Vec<DriftEntry>),
}
