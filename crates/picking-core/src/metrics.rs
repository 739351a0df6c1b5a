//! The Metric Builder: turns a set of allocations plus the picking start
//! and destination into a dense pairwise distance matrix.

use std::collections::HashMap;

use crate::error::PickingError;
use crate::graph::GraphStore;
use crate::ids::NodeId;
use crate::model::{Allocation, DistanceMatrix};

/// Build the dense symmetric distance matrix over the node set
/// `unique(storage ids in allocations) ++ {start_id, dest_id}`.
///
/// Any off-diagonal cell left at zero after populating from
/// `shortest_distances` means the corresponding pair is disconnected in the
/// warehouse graph, which is reported as `Unreachable`.
pub fn build_distance_matrix(
    store: &dyn GraphStore,
    allocations: &[Allocation],
    start_id: &NodeId,
    dest_id: &NodeId,
) -> Result<DistanceMatrix, PickingError> {
    let mut ids: Vec<NodeId> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for allocation in allocations {
        if seen.insert(allocation.storage_id.clone()) {
            ids.push(allocation.storage_id.clone());
        }
    }
    for id in [start_id, dest_id] {
        if seen.insert(id.clone()) {
            ids.push(id.clone());
        }
    }

    let n = ids.len();
    let index_of: HashMap<NodeId, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), i))
        .collect();

    let mut matrix = vec![vec![0.0_f64; n]; n];
    for row in store.shortest_distances(&ids) {
        let &i = index_of
            .get(&row.from)
            .expect("shortest_distances returned an id outside the requested node set");
        let &j = index_of
            .get(&row.to)
            .expect("shortest_distances returned an id outside the requested node set");
        matrix[i][j] = row.distance;
        matrix[j][i] = row.distance;
    }

    for i in 0..n {
        for j in 0..n {
            if i != j && matrix[i][j] == 0.0 {
                return Err(PickingError::Unreachable(ids[i].clone(), ids[j].clone()));
            }
        }
    }

    Ok(DistanceMatrix {
        matrix,
        index_of,
        ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DistanceRow, InventoryRow, PathLegRow, Position};
    use crate::ids::ProductId;
    use crate::model::Allocation;

    struct FixedStore {
        distances: Vec<DistanceRow>,
    }

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
            self.distances.clone()
        }

        fn expand_path(&self, _sorted_node_ids: &[NodeId]) -> Vec<PathLegRow> {
            Vec::new()
        }
    }

    fn allocation(storage: &str) -> Allocation {
        Allocation {
            product_id: ProductId::from("p1"),
            storage_id: NodeId::from(storage),
            quantity_at_storage: 1,
            take: 1,
        }
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let store = FixedStore {
            distances: vec![
                DistanceRow {
                    from: NodeId::from("start"),
                    to: NodeId::from("sigma"),
                    distance: 4.0,
                },
                DistanceRow {
                    from: NodeId::from("sigma"),
                    to: NodeId::from("dest"),
                    distance: 6.0,
                },
                DistanceRow {
                    from: NodeId::from("start"),
                    to: NodeId::from("dest"),
                    distance: 9.0,
                },
            ],
        };

        let matrix = build_distance_matrix(
            &store,
            &[allocation("sigma")],
            &NodeId::from("start"),
            &NodeId::from("dest"),
        )
        .unwrap();

        assert_eq!(matrix.len(), 3);
        for i in 0..matrix.len() {
            assert_eq!(matrix.matrix[i][i], 0.0);
            for j in 0..matrix.len() {
                assert_eq!(matrix.matrix[i][j], matrix.matrix[j][i]);
            }
        }
        // triangle inequality sanity for this tiny instance
        let si = matrix.index_of[&NodeId::from("start")];
        let gi = matrix.index_of[&NodeId::from("sigma")];
        let di = matrix.index_of[&NodeId::from("dest")];
        assert!(matrix.matrix[si][di] <= matrix.matrix[si][gi] + matrix.matrix[gi][di]);
    }

    #[test]
    fn disconnected_pair_is_unreachable() {
        let store = FixedStore {
            distances: vec![DistanceRow {
                from: NodeId::from("start"),
                to: NodeId::from("dest"),
                distance: 9.0,
            }],
        };

        let err = build_distance_matrix(
            &store,
            &[allocation("sigma")],
            &NodeId::from("start"),
            &NodeId::from("dest"),
        )
        .unwrap_err();

        assert!(matches!(err, PickingError::Unreachable(_, _)));
    }

    #[test]
    fn truncating_cost_matrix_floors_fractional_distances() {
        let store = FixedStore {
            distances: vec![
                DistanceRow {
                    from: NodeId::from("start"),
                    to: NodeId::from("sigma"),
                    distance: 4.9,
                },
                DistanceRow {
                    from: NodeId::from("sigma"),
                    to: NodeId::from("dest"),
                    distance: 6.9,
                },
                DistanceRow {
                    from: NodeId::from("start"),
                    to: NodeId::from("dest"),
                    distance: 9.9,
                },
            ],
        };

        let matrix = build_distance_matrix(
            &store,
            &[allocation("sigma")],
            &NodeId::from("start"),
            &NodeId::from("dest"),
        )
        .unwrap();
        let cost = matrix.to_cost_matrix();
        let si = matrix.index_of[&NodeId::from("start")];
        let gi = matrix.index_of[&NodeId::from("sigma")];
        assert_eq!(cost[si][gi], 4);
    }
}
