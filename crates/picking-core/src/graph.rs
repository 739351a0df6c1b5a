use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, ProductId};

/// A node's position in the warehouse. Intersection, Hall and Origin nodes
/// always have `z == 0.0`; only Storage nodes carry a nonzero level height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_ground_level(&self) -> bool {
        self.z == 0.0
    }
}

/// Shared projection every node variant offers, regardless of kind. The
/// core never branches on node variant once it has this projection.
pub trait Located {
    fn id(&self) -> &NodeId;
    fn position(&self) -> Position;
}

/// A node of the warehouse graph, tagged by kind rather than modeled as an
/// inheritance hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Storage {
        id: NodeId,
        rack: String,
        index: u32,
        level: u32,
        position: Position,
    },
    Intersection {
        id: NodeId,
        row: u32,
        col: u32,
        position: Position,
    },
    Hall {
        id: NodeId,
        row: u32,
        col: u32,
        index: u32,
        position: Position,
    },
    Origin {
        id: NodeId,
        position: Position,
    },
}

impl Located for Node {
    fn id(&self) -> &NodeId {
        match self {
            Node::Storage { id, .. }
            | Node::Intersection { id, .. }
            | Node::Hall { id, .. }
            | Node::Origin { id, .. } => id,
        }
    }

    fn position(&self) -> Position {
        match self {
            Node::Storage { position, .. }
            | Node::Intersection { position, .. }
            | Node::Hall { position, .. }
            | Node::Origin { position, .. } => *position,
        }
    }
}

/// A directed `CONNECTED_TO` edge. The graph is not assumed symmetric:
/// Origin in/out edges exist in one direction only.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeight {
    pub distance: f64,
}

/// One row of a `sufficient_offer`/`inventory_of` style response: storage
/// `s` holds `quantity` units of `product`. Defined as a typed DTO at the
/// store boundary rather than parsed ad hoc at each call site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub product_id: ProductId,
    pub storage_id: NodeId,
    pub quantity: u64,
}

/// One row of a `shortest_distances` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceRow {
    pub from: NodeId,
    pub to: NodeId,
    pub distance: f64,
}

/// One row of an `expand_path` response: the leg from `from` to `to`, its
/// shortest-path distance, and the ground-level (`z == 0`) nodes visited
/// along the way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathLegRow {
    pub from: NodeId,
    pub to: NodeId,
    pub distance: f64,
    pub path: Vec<Node>,
}

/// The read-only contract the picking core requires from any warehouse
/// graph backend. Implementations are free to be a native graph database,
/// an in-memory graph, or anything else; the core never depends on how
/// these are computed.
pub trait GraphStore {
    /// Sum of all CONTAINS quantities per requested product id. A product id
    /// absent from the result means the store has no knowledge of it at
    /// all (used to distinguish `UnknownProduct` from `InsufficientOffer`).
    fn sufficient_offer(&self, product_ids: &[ProductId]) -> std::collections::HashMap<ProductId, u64>;

    /// Every `(product, storage, quantity)` row for the requested products,
    /// in unspecified order — the Allocator performs the proximity sort.
    fn inventory_of(&self, product_ids: &[ProductId]) -> Vec<InventoryRow>;

    /// The position of a node, if it exists.
    fn position(&self, id: &NodeId) -> Option<Position>;

    /// For every unordered pair within `node_ids`, the shortest-path
    /// distance treating `CONNECTED_TO` as traversable. Implementations may
    /// return only one direction per pair — the Metric Builder mirrors it.
    /// A pair with no path between them is simply absent from the result.
    fn shortest_distances(&self, node_ids: &[NodeId]) -> Vec<DistanceRow>;

    /// For each adjacent pair in `sorted_node_ids`, the shortest path's
    /// ground-level (`z == 0`) intermediate nodes and the leg distance.
    fn expand_path(&self, sorted_node_ids: &[NodeId]) -> Vec<PathLegRow>;
}

/// One flattened entry of an order summary, as consumed by
/// `GraphWriter::commit`/`restore`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderSummaryEntry {
    pub storage_id: NodeId,
    pub product_id: ProductId,
    pub quantity_at_storage: u64,
    pub take: u64,
}

/// The write contract for post-picking inventory mutation. Kept separate
/// from `GraphStore` because it requires a write transaction against the
/// single shared mutable resource, while reads are concurrent and
/// unsynchronized by the core.
pub trait GraphWriter {
    /// Decrement each entry's CONTAINS quantity by `take`, deleting the
    /// edge on reaching zero, *if and only if* the current quantity at that
    /// storage still equals `quantity_at_storage` (optimistic check).
    /// Leaves the store entirely unchanged if any entry fails the check.
    fn commit(&mut self, summary: &[OrderSummaryEntry]) -> Result<(), crate::error::PickingError>;

    /// Idempotently set each entry's CONTAINS quantity back to
    /// `quantity_at_storage`.
    fn restore(&mut self, summary: &[OrderSummaryEntry]) -> Result<(), crate::error::PickingError>;
}
