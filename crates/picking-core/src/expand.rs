//! The Path Expander: turns a tour (a sequence of storage ids) into the
//! concrete sequence of graph nodes a picker walks.

use crate::graph::{GraphStore, PathLegRow};
use crate::ids::NodeId;
use crate::model::Tour;

/// Turn a Tour (matrix index sequence) into the concrete per-leg walk a
/// picker follows, by delegating to `GraphStore::expand_path` on the
/// corresponding sorted node ids.
///
/// `sum(leg.distance for leg in result) == tour.optimal_value` up to the
/// truncation applied when the Metric Builder produced the cost matrix the
/// tour was solved over.
pub fn expand_tour(store: &dyn GraphStore, tour: &Tour, index_to_id: &[NodeId]) -> Vec<PathLegRow> {
    let sorted_nodes: Vec<NodeId> = tour
        .nodes
        .iter()
        .map(|&index| index_to_id[index].clone())
        .collect();

    store.expand_path(&sorted_nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DistanceRow, InventoryRow, Node, Position};
    use crate::ids::ProductId;

    struct FixedStore;

    impl GraphStore for FixedStore {
        fn sufficient_offer(
            &self,
            _product_ids: &[ProductId],
        ) -> std::collections::HashMap<ProductId, u64> {
            std::collections::HashMap::new()
        }

        fn inventory_of(&self, _product_ids: &[ProductId]) -> Vec<InventoryRow> {
            Vec::new()
        }

        fn position(&self, _id: &NodeId) -> Option<Position> {
            None
        }

        fn shortest_distances(&self, _node_ids: &[NodeId]) -> Vec<DistanceRow> {
            Vec::new()
        }

        fn expand_path(&self, sorted_node_ids: &[NodeId]) -> Vec<PathLegRow> {
            sorted_node_ids
                .windows(2)
                .map(|pair| PathLegRow {
                    from: pair[0].clone(),
                    to: pair[1].clone(),
                    distance: 1.0,
                    path: vec![Node::Intersection {
                        id: NodeId::from("mid"),
                        row: 0,
                        col: 0,
                        position: Position::new(0.0, 0.0, 0.0),
                    }],
                })
                .collect()
        }
    }

    #[test]
    fn expands_each_adjacent_pair_via_the_store() {
        let store = FixedStore;
        let index_to_id = vec![NodeId::from("start"), NodeId::from("sigma"), NodeId::from("dest")];
        let tour = Tour {
            nodes: vec![0, 1, 2],
            optimal_value: 2,
        };

        let legs = expand_tour(&store, &tour, &index_to_id);
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].from, NodeId::from("start"));
        assert_eq!(legs[0].to, NodeId::from("sigma"));
        assert_eq!(legs[1].from, NodeId::from("sigma"));
        assert_eq!(legs[1].to, NodeId::from("dest"));

        let total: f64 = legs.iter().map(|l| l.distance).sum();
        assert_eq!(total as i64, tour.optimal_value);
    }
}
