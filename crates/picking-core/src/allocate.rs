//! The Allocator: chooses which storage locations supply which units of
//! which products for a given demand bag.

use std::collections::{HashMap, HashSet};

use crate::error::{DemandGap, OfferGap, PickingError};
use crate::graph::{GraphStore, Position};
use crate::ids::{NodeId, ProductId};
use crate::model::{Allocation, Demand};

/// Weighted-Manhattan ordering key used only to sort candidate storages
/// during allocation. Never a cost: the Tour Solver always uses true
/// shortest-path distance, never this key.
pub fn proximity_key(from: Position, to: Position) -> f64 {
    (from.x - to.x).abs() + (from.y - to.y).abs() + 100.0 * (from.z - to.z).abs()
}

/// Run the allocation algorithm for `demand` starting from `start_id`.
///
/// For each demanded product: enumerate holding storages, sort by
/// `(proximity key asc, quantity desc, storage id asc)`, then greedily take
/// `min(remaining quantity at storage, remaining demand)` walking the
/// sorted list, skipping zero-take records. The output is grouped by
/// product id, each product's block in proximity order.
pub fn allocate(
    store: &dyn GraphStore,
    start_id: &NodeId,
    demand: &Demand,
) -> Result<Vec<Allocation>, PickingError> {
    let product_ids: Vec<ProductId> = demand.keys().cloned().collect();
    let offer = store.sufficient_offer(&product_ids);

    let unknown: Vec<ProductId> = product_ids
        .iter()
        .filter(|p| !offer.contains_key(p))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(PickingError::UnknownProduct(unknown));
    }

    let mut insufficiencies = HashMap::new();
    for product_id in &product_ids {
        let need = demand[product_id];
        let available = offer.get(product_id).copied().unwrap_or(0);
        if available < need {
            insufficiencies.insert(
                product_id.clone(),
                OfferGap {
                    need,
                    available,
                },
            );
        }
    }
    if !insufficiencies.is_empty() {
        return Err(PickingError::InsufficientOffer(insufficiencies));
    }

    let start_position = store
        .position(start_id)
        .expect("start node must exist in the graph store");

    let rows = store.inventory_of(&product_ids);
    let mut by_product: HashMap<ProductId, Vec<(NodeId, u64, f64)>> = HashMap::new();
    for row in rows {
        let position = store
            .position(&row.storage_id)
            .expect("inventory row must reference a node present in the graph store");
        let key = proximity_key(start_position, position);
        by_product
            .entry(row.product_id)
            .or_default()
            .push((row.storage_id, row.quantity, key));
    }

    let mut allocations = Vec::new();
    let mut gaps = HashMap::new();

    for product_id in &product_ids {
        let need = demand[product_id];
        let mut candidates = by_product.remove(product_id).unwrap_or_default();
        candidates.sort_by(|a, b| {
            a.2.partial_cmp(&b.2)
                .unwrap()
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut previous_sum = 0u64;
        for (storage_id, quantity_at_storage, _key) in candidates {
            if previous_sum >= need {
                break;
            }
            let take = quantity_at_storage.min(need - previous_sum);
            if take == 0 {
                continue;
            }
            previous_sum += take;
            allocations.push(Allocation {
                product_id: product_id.clone(),
                storage_id,
                quantity_at_storage,
                take,
            });
        }

        if previous_sum < need {
            gaps.insert(
                product_id.clone(),
                DemandGap {
                    need,
                    took: previous_sum,
                },
            );
        }
    }

    if !gaps.is_empty() {
        return Err(PickingError::UnsatisfiedDemand(gaps));
    }

    Ok(allocations)
}

/// Defensive post-condition check: for every demanded product, the sum of
/// `take` across `allocations` equals the demanded quantity.
pub fn assert_route(demand: &Demand, allocations: &[Allocation]) -> Result<(), PickingError> {
    let mut took: HashMap<ProductId, u64> = HashMap::new();
    for allocation in allocations {
        *took.entry(allocation.product_id.clone()).or_insert(0) += allocation.take;
    }

    let mut gaps = HashMap::new();
    for (product_id, &need) in demand {
        let got = took.get(product_id).copied().unwrap_or(0);
        if got != need {
            gaps.insert(
                product_id.clone(),
                DemandGap {
                    need,
                    took: got,
                },
            );
        }
    }

    if gaps.is_empty() {
        Ok(())
    } else {
        Err(PickingError::UnsatisfiedDemand(gaps))
    }
}

/// Unique storage ids referenced by `allocations`, in first-seen order.
pub fn unique_storage_ids(allocations: &[Allocation]) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for allocation in allocations {
        if seen.insert(allocation.storage_id.clone()) {
            ids.push(allocation.storage_id.clone());
        }
    }
    ids
}
