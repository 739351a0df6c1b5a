//! The Summarizer: groups allocations by storage in visit order, producing
//! the pick sheet per tour.

use std::collections::HashMap;

use crate::ids::NodeId;
use crate::model::{Allocation, PickEntry, PickSheet, Tour};

/// Group allocations by storage in visit order, producing the pick sheet
/// for one tour. Storages not visited by this tour (because another
/// vehicle's tour covers them) are excluded.
pub fn summarize(tour: &Tour, index_to_id: &[NodeId], allocations: &[Allocation]) -> PickSheet {
    let visit_rank: HashMap<&NodeId, usize> = tour
        .nodes
        .iter()
        .enumerate()
        .map(|(rank, &index)| (&index_to_id[index], rank))
        .collect();

    let mut ranked: Vec<(usize, &Allocation)> = allocations
        .iter()
        .filter_map(|allocation| {
            visit_rank
                .get(&allocation.storage_id)
                .map(|&rank| (rank, allocation))
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);

    let mut sheet = PickSheet::new();
    for (_, allocation) in ranked {
        sheet.record(
            allocation.storage_id.clone(),
            allocation.product_id.clone(),
            PickEntry {
                quantity_at_storage: allocation.quantity_at_storage,
                take: allocation.take,
            },
        );
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;

    fn allocation(storage: &str, product: &str, qty: u64, take: u64) -> Allocation {
        Allocation {
            product_id: ProductId::from(product),
            storage_id: NodeId::from(storage),
            quantity_at_storage: qty,
            take,
        }
    }

    #[test]
    fn summary_order_matches_tour_visit_order() {
        let index_to_id = vec![
            NodeId::from("start"),
            NodeId::from("sigma_b"),
            NodeId::from("sigma_a"),
            NodeId::from("dest"),
        ];
        let tour = Tour {
            nodes: vec![0, 1, 2, 3],
            optimal_value: 0,
        };
        let allocations = vec![
            allocation("sigma_a", "p1", 100, 100),
            allocation("sigma_b", "p1", 200, 50),
        ];

        let sheet = summarize(&tour, &index_to_id, &allocations);
        let order: Vec<&NodeId> = sheet.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![&NodeId::from("sigma_b"), &NodeId::from("sigma_a")]);
    }

    #[test]
    fn storages_outside_this_tour_are_excluded() {
        let index_to_id = vec![NodeId::from("start"), NodeId::from("sigma_a"), NodeId::from("dest")];
        let tour = Tour {
            nodes: vec![0, 1, 2],
            optimal_value: 0,
        };
        let allocations = vec![
            allocation("sigma_a", "p1", 10, 10),
            allocation("sigma_b", "p2", 5, 5),
        ];

        let sheet = summarize(&tour, &index_to_id, &allocations);
        assert_eq!(sheet.len(), 1);
        let (id, products) = sheet.iter().next().unwrap();
        assert_eq!(id, &NodeId::from("sigma_a"));
        assert_eq!(products[&ProductId::from("p1")].take, 10);
    }
}
