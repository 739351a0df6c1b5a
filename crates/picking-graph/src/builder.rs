use std::collections::HashMap;

use petgraph::graph::DiGraph;

use picking_core::graph::{Node, Position};
use picking_core::ids::{NodeId, ProductId};

use crate::InMemoryWarehouseGraph;

/// Builds an [`InMemoryWarehouseGraph`] node by node. Used by tests and by
/// anything seeding a demo warehouse; warehouse *layout generation* itself
/// (picking the rack grid, running the aisle-carving algorithm, …) is not
/// this builder's job — it only assembles whatever nodes/edges/stock the
/// caller already decided on.
#[derive(Default)]
pub struct WarehouseGraphBuilder {
    graph: InMemoryWarehouseGraph,
}

impl WarehouseGraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: InMemoryWarehouseGraph {
                nodes: HashMap::new(),
                graph: DiGraph::new(),
                index_of: HashMap::new(),
                inventory: HashMap::new(),
                known_products: Default::default(),
            },
        }
    }

    fn insert_node(&mut self, id: NodeId, node: Node) -> &mut Self {
        let index = self.graph.graph.add_node(id.clone());
        self.graph.index_of.insert(id.clone(), index);
        self.graph.nodes.insert(id, node);
        self
    }

    pub fn storage(
        &mut self,
        id: impl Into<String>,
        rack: impl Into<String>,
        index: u32,
        level: u32,
        x: f64,
        y: f64,
        z: f64,
    ) -> &mut Self {
        let id = NodeId::from(id.into());
        self.insert_node(
            id.clone(),
            Node::Storage {
                id,
                rack: rack.into(),
                index,
                level,
                position: Position::new(x, y, z),
            },
        )
    }

    pub fn intersection(&mut self, id: impl Into<String>, row: u32, col: u32, x: f64, y: f64) -> &mut Self {
        let id = NodeId::from(id.into());
        self.insert_node(
            id.clone(),
            Node::Intersection {
                id,
                row,
                col,
                position: Position::new(x, y, 0.0),
            },
        )
    }

    pub fn hall(&mut self, id: impl Into<String>, row: u32, col: u32, index: u32, x: f64, y: f64) -> &mut Self {
        let id = NodeId::from(id.into());
        self.insert_node(
            id.clone(),
            Node::Hall {
                id,
                row,
                col,
                index,
                position: Position::new(x, y, 0.0),
            },
        )
    }

    pub fn origin(&mut self, id: impl Into<String>, x: f64, y: f64) -> &mut Self {
        let id = NodeId::from(id.into());
        self.insert_node(
            id.clone(),
            Node::Origin {
                id,
                position: Position::new(x, y, 0.0),
            },
        )
    }

    /// One directed `CONNECTED_TO` edge. Origin in/out edges are created
    /// this way (one direction only).
    pub fn connect(&mut self, from: impl Into<String>, to: impl Into<String>, distance: f64) -> &mut Self {
        let from = NodeId::from(from.into());
        let to = NodeId::from(to.into());
        let &fi = self.graph.index_of.get(&from).expect("connect: unknown `from` node");
        let &ti = self.graph.index_of.get(&to).expect("connect: unknown `to` node");
        self.graph.graph.add_edge(fi, ti, distance);
        self
    }

    /// A pair of directed edges, one each way — how the layout seeds all
    /// structural (non-Origin) edges.
    pub fn connect_pair(&mut self, from: impl Into<String>, to: impl Into<String>, distance: f64) -> &mut Self {
        let from = from.into();
        let to = to.into();
        self.connect(from.clone(), to.clone(), distance);
        self.connect(to, from, distance)
    }

    /// Record `quantity` additional units of `product_id` at `storage_id`
    /// (the direct `Storage -> Product` shortcut). Additive across repeated
    /// calls for the same pair.
    pub fn stock(&mut self, storage_id: impl Into<String>, product_id: impl Into<String>, quantity: u64) -> &mut Self {
        let storage_id = NodeId::from(storage_id.into());
        let product_id = ProductId::from(product_id.into());
        self.graph.known_products.insert(product_id.clone());
        *self.graph.inventory.entry((storage_id, product_id)).or_insert(0) += quantity;
        self
    }

    pub fn build(&mut self) -> InMemoryWarehouseGraph {
        std::mem::take(&mut self.graph)
    }
}
