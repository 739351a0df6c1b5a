//! An in-memory, `petgraph`-backed warehouse graph implementing the
//! `GraphStore`/`GraphWriter` contracts from `picking-core`.
//!
//! Storage-to-product inventory uses the direct `Storage -> Product`
//! shortcut rather than a Pallet-mediated schema: inventory is tracked as a
//! flat `(storage, product) -> quantity` map rather than synthesizing
//! Pallet node ids.

mod builder;

use std::collections::HashMap;

use petgraph::algo::{astar, dijkstra};
use petgraph::graph::{DiGraph, NodeIndex};

use picking_core::graph::{DistanceRow, InventoryRow, Located, Node, OrderSummaryEntry, PathLegRow, Position};
use picking_core::ids::{NodeId, ProductId};
use picking_core::{GraphStore, GraphWriter, PickingError};

pub use builder::WarehouseGraphBuilder;

/// In-memory warehouse graph: nodes + `CONNECTED_TO` edges in a `petgraph`
/// `DiGraph`, plus the flat inventory map. Constructed via
/// [`WarehouseGraphBuilder`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryWarehouseGraph {
    nodes: HashMap<NodeId, Node>,
    graph: DiGraph<NodeId, f64>,
    index_of: HashMap<NodeId, NodeIndex>,
    inventory: HashMap<(NodeId, ProductId), u64>,
    known_products: std::collections::HashSet<ProductId>,
}

impl InMemoryWarehouseGraph {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn quantity(&self, storage_id: &NodeId, product_id: &ProductId) -> u64 {
        self.inventory
            .get(&(storage_id.clone(), product_id.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn set_quantity(&mut self, storage_id: &NodeId, product_id: &ProductId, quantity: u64) {
        let key = (storage_id.clone(), product_id.clone());
        if quantity == 0 {
            self.inventory.remove(&key);
        } else {
            self.inventory.insert(key, quantity);
        }
    }
}

impl GraphStore for InMemoryWarehouseGraph {
    fn sufficient_offer(&self, product_ids: &[ProductId]) -> HashMap<ProductId, u64> {
        product_ids
            .iter()
            .filter(|p| self.known_products.contains(p))
            .map(|p| {
                let total: u64 = self
                    .inventory
                    .iter()
                    .filter(|((_, product), _)| product == p)
                    .map(|(_, qty)| *qty)
                    .sum();
                (p.clone(), total)
            })
            .collect()
    }

    fn inventory_of(&self, product_ids: &[ProductId]) -> Vec<InventoryRow> {
        let wanted: std::collections::HashSet<&ProductId> = product_ids.iter().collect();
        self.inventory
            .iter()
            .filter(|((_, product), &qty)| wanted.contains(product) && qty > 0)
            .map(|((storage_id, product_id), &quantity)| InventoryRow {
                product_id: product_id.clone(),
                storage_id: storage_id.clone(),
                quantity,
            })
            .collect()
    }

    fn position(&self, id: &NodeId) -> Option<Position> {
        self.nodes.get(id).map(|node| node.position())
    }

    fn shortest_distances(&self, node_ids: &[NodeId]) -> Vec<DistanceRow> {
        let mut distances_from: HashMap<&NodeId, HashMap<NodeIndex, f64>> = HashMap::new();
        for id in node_ids {
            if let Some(&start) = self.index_of.get(id) {
                let reachable = dijkstra(&self.graph, start, None, |edge| *edge.weight());
                distances_from.insert(id, reachable);
            }
        }

        let mut rows = Vec::new();
        for i in 0..node_ids.len() {
            for j in (i + 1)..node_ids.len() {
                let (a, b) = (&node_ids[i], &node_ids[j]);
                let forward = self
                    .index_of
                    .get(b)
                    .and_then(|bi| distances_from.get(a).and_then(|m| m.get(bi)));
                let backward = self
                    .index_of
                    .get(a)
                    .and_then(|ai| distances_from.get(b).and_then(|m| m.get(ai)));
                if let Some(&distance) = forward.or(backward) {
                    rows.push(DistanceRow {
                        from: a.clone(),
                        to: b.clone(),
                        distance,
                    });
                }
            }
        }
        rows
    }

    fn expand_path(&self, sorted_node_ids: &[NodeId]) -> Vec<PathLegRow> {
        sorted_node_ids
            .windows(2)
            .filter_map(|pair| {
                let (from, to) = (&pair[0], &pair[1]);
                let start = *self.index_of.get(from)?;
                let goal = *self.index_of.get(to)?;
                let (distance, indices) =
                    astar(&self.graph, start, |n| n == goal, |edge| *edge.weight(), |_| 0.0)?;

                let path = indices
                    .iter()
                    .skip(1)
                    .take(indices.len().saturating_sub(2))
                    .filter_map(|idx| self.graph.node_weight(*idx))
                    .filter_map(|id| self.nodes.get(id))
                    .filter(|node| node.position().is_ground_level())
                    .cloned()
                    .collect();

                Some(PathLegRow {
                    from: from.clone(),
                    to: to.clone(),
                    distance,
                    path,
                })
            })
            .collect()
    }
}

impl GraphWriter for InMemoryWarehouseGraph {
    fn commit(&mut self, summary: &[OrderSummaryEntry]) -> Result<(), PickingError> {
        let mut drift = Vec::new();
        for entry in summary {
            let current = self.quantity(&entry.storage_id, &entry.product_id);
            if current != entry.quantity_at_storage {
                drift.push(picking_core::error::DriftEntry {
                    storage_id: entry.storage_id.clone(),
                    product_id: entry.product_id.clone(),
                    expected_quantity: entry.quantity_at_storage,
                    actual_quantity: current,
                });
            }
        }
        if !drift.is_empty() {
            log::warn!("inventory drift detected on commit: {drift:?}");
            return Err(PickingError::InventoryDrift(drift));
        }

        for entry in summary {
            let remaining = entry.quantity_at_storage - entry.take;
            self.set_quantity(&entry.storage_id, &entry.product_id, remaining);
        }
        Ok(())
    }

    fn restore(&mut self, summary: &[OrderSummaryEntry]) -> Result<(), PickingError> {
        for entry in summary {
            self.set_quantity(&entry.storage_id, &entry.product_id, entry.quantity_at_storage);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> InMemoryWarehouseGraph {
        WarehouseGraphBuilder::new()
            .origin("start", 0.0, 0.0)
            .storage("sigma", "R1", 0, 0, 10.0, 0.0, 0.0)
            .origin("dest", 20.0, 0.0)
            .connect_pair("start", "sigma", 10.0)
            .connect_pair("sigma", "dest", 10.0)
            .stock("sigma", "p1", 50)
            .build()
    }

    #[test]
    fn offer_reports_total_known_product_quantity() {
        let graph = small_graph();
        let offer = graph.sufficient_offer(&[ProductId::from("p1")]);
        assert_eq!(offer[&ProductId::from("p1")], 50);
    }

    #[test]
    fn unknown_product_is_absent_from_offer() {
        let graph = small_graph();
        let offer = graph.sufficient_offer(&[ProductId::from("ghost")]);
        assert!(!offer.contains_key(&ProductId::from("ghost")));
    }

    #[test]
    fn shortest_distances_covers_every_unordered_pair() {
        let graph = small_graph();
        let ids = vec![NodeId::from("start"), NodeId::from("sigma"), NodeId::from("dest")];
        let rows = graph.shortest_distances(&ids);
        assert_eq!(rows.len(), 3);
        let start_dest = rows
            .iter()
            .find(|r| (r.from.as_str(), r.to.as_str()) == ("start", "dest") || (r.to.as_str(), r.from.as_str()) == ("start", "dest"))
            .unwrap();
        assert_eq!(start_dest.distance, 20.0);
    }

    #[test]
    fn expand_path_returns_leg_distances_summing_to_the_direct_route() {
        let graph = small_graph();
        let legs = graph.expand_path(&[NodeId::from("start"), NodeId::from("sigma"), NodeId::from("dest")]);
        assert_eq!(legs.len(), 2);
        let total: f64 = legs.iter().map(|l| l.distance).sum();
        assert_eq!(total, 20.0);
    }

    #[test]
    fn commit_then_restore_is_idempotent() {
        let mut graph = small_graph();
        let summary = vec![OrderSummaryEntry {
            storage_id: NodeId::from("sigma"),
            product_id: ProductId::from("p1"),
            quantity_at_storage: 50,
            take: 20,
        }];

        graph.commit(&summary).unwrap();
        assert_eq!(graph.quantity(&NodeId::from("sigma"), &ProductId::from("p1")), 30);

        graph.restore(&summary).unwrap();
        let after_first = graph.quantity(&NodeId::from("sigma"), &ProductId::from("p1"));
        graph.restore(&summary).unwrap();
        let after_second = graph.quantity(&NodeId::from("sigma"), &ProductId::from("p1"));

        assert_eq!(after_first, 50);
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn commit_detects_drift_without_mutating() {
        let mut graph = small_graph();
        let summary = vec![OrderSummaryEntry {
            storage_id: NodeId::from("sigma"),
            product_id: ProductId::from("p1"),
            quantity_at_storage: 999,
            take: 20,
        }];

        let err = graph.commit(&summary).unwrap_err();
        assert!(matches!(err, PickingError::InventoryDrift(_)));
        assert_eq!(graph.quantity(&NodeId::from("sigma"), &ProductId::from("p1")), 50);
    }
}
