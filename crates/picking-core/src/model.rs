use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::graph::{Node, PathLegRow};
use crate::ids::{NodeId, ProductId, StorageId};

/// The caller's requested `{product -> quantity}` bag. Every quantity is a
/// positive integer.
pub type Demand = HashMap<ProductId, u64>;

/// A decision to draw `take` units of a product from a specific storage
/// location. `take <= quantity_at_storage`, and for a given product the
/// `take` values across its Allocation records sum exactly to the demanded
/// quantity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub product_id: ProductId,
    pub storage_id: StorageId,
    pub quantity_at_storage: u64,
    pub take: u64,
}

/// A dense symmetric distance matrix over a node set, plus the id <-> index
/// bijection used to build it. `N = unique storages in allocations + 2`
/// (start, dest).
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    /// `matrix[i][j]` is the shortest-path distance between `ids[i]` and
    /// `ids[j]`. Symmetric, non-negative, zero diagonal.
    pub matrix: Vec<Vec<f64>>,
    pub index_of: HashMap<NodeId, usize>,
    pub ids: Vec<NodeId>,
}

impl DistanceMatrix {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Truncating integer cast of the distance matrix, for solvers that
    /// require an integer cost callback.
    pub fn to_cost_matrix(&self) -> Vec<Vec<i64>> {
        self.matrix
            .iter()
            .map(|row| row.iter().map(|&d| d as i64).collect())
            .collect()
    }
}

/// An ordered sequence of matrix indices assigned to one vehicle, beginning
/// at `start_index` and ending at `dest_index`. `optimal_value` is the
/// summed edge cost along the sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tour {
    pub nodes: Vec<usize>,
    pub optimal_value: i64,
}

impl Tour {
    pub fn is_degenerate(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One adjacent pair within a tour, expanded into an explicit walk through
/// the graph.
pub type Leg = PathLegRow;

/// Ordered breakdown of what to pick at each stop along a tour:
/// `storage_id -> product_id -> { quantity_at_storage, take }`, with outer
/// iteration order equal to the order storages appear in the tour.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PickSheet {
    order: Vec<StorageId>,
    entries: HashMap<StorageId, HashMap<ProductId, PickEntry>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickEntry {
    pub quantity_at_storage: u64,
    pub take: u64,
}

impl PickSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pick at `storage_id`, preserving visit order on first
    /// insertion. Overwrites an existing `(storage, product)` entry
    /// (last-write-wins; harmless since the allocator never emits two
    /// records for the same pair).
    pub fn record(&mut self, storage_id: StorageId, product_id: ProductId, entry: PickEntry) {
        let products = self.entries.entry(storage_id.clone()).or_insert_with(|| {
            self.order.push(storage_id.clone());
            HashMap::new()
        });
        products.insert(product_id, entry);
    }

    /// Iterate stops in visit order, yielding each storage id and its
    /// product breakdown.
    pub fn iter(&self) -> impl Iterator<Item = (&StorageId, &HashMap<ProductId, PickEntry>)> {
        self.order.iter().map(move |id| (id, &self.entries[id]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Final output of one `optimize` call.
#[derive(Clone, Debug, Default)]
pub struct PickingSolution {
    pub paths: Vec<Vec<Leg>>,
    pub summaries: Vec<PickSheet>,
    pub performance_metrics: Option<HashMap<String, f64>>,
}

/// Re-exported so callers building fixtures don't need a second `use`.
pub use crate::graph::{InventoryRow, OrderSummaryEntry};
pub type GraphNode = Node;
