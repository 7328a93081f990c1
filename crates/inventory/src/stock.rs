//! Stock movement planning.

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// A quantity of one product to take from (or give back to) stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl StockLine {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self { product_id, quantity }
    }
}

/// Signed stock change for one product: negative takes stock, positive returns it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockDelta {
    pub product_id: ProductId,
    pub delta: i64,
}

/// Net per-product stock change when a held line-item set `previous` is
/// replaced by `next`.
///
/// Products appear once, in order of first mention (`next` first, then
/// products only in `previous`). Products whose holding is unchanged are
/// omitted.
pub fn net_deltas(previous: &[StockLine], next: &[StockLine]) -> Vec<StockDelta> {
    let mut order: Vec<ProductId> = Vec::new();
    let mut totals: Vec<i64> = Vec::new();

    let mut add = |product_id: ProductId, amount: i64| {
        match order.iter().position(|p| *p == product_id) {
            Some(idx) => totals[idx] += amount,
            None => {
                order.push(product_id);
                totals.push(amount);
            }
        }
    };

    for line in next {
        add(line.product_id, -i64::from(line.quantity));
    }
    for line in previous {
        add(line.product_id, i64::from(line.quantity));
    }

    order
        .into_iter()
        .zip(totals)
        .filter(|(_, delta)| *delta != 0)
        .map(|(product_id, delta)| StockDelta { product_id, delta })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_set_takes_everything() {
        let p1 = ProductId::generate();
        let p2 = ProductId::generate();
        let deltas = net_deltas(&[], &[StockLine::new(p1, 3), StockLine::new(p2, 1)]);
        assert_eq!(
            deltas,
            vec![
                StockDelta { product_id: p1, delta: -3 },
                StockDelta { product_id: p2, delta: -1 },
            ]
        );
    }

    #[test]
    fn only_the_difference_moves() {
        let p1 = ProductId::generate();
        let deltas = net_deltas(&[StockLine::new(p1, 3)], &[StockLine::new(p1, 5)]);
        assert_eq!(deltas, vec![StockDelta { product_id: p1, delta: -2 }]);
    }

    #[test]
    fn dropped_products_are_returned() {
        let p1 = ProductId::generate();
        let p2 = ProductId::generate();
        let deltas = net_deltas(
            &[StockLine::new(p1, 3), StockLine::new(p2, 4)],
            &[StockLine::new(p1, 3)],
        );
        assert_eq!(deltas, vec![StockDelta { product_id: p2, delta: 4 }]);
    }

    #[test]
    fn repeated_products_are_merged() {
        let p1 = ProductId::generate();
        let deltas = net_deltas(&[], &[StockLine::new(p1, 1), StockLine::new(p1, 2)]);
        assert_eq!(deltas, vec![StockDelta { product_id: p1, delta: -3 }]);
    }

    #[test]
    fn identical_sets_move_nothing() {
        let p1 = ProductId::generate();
        let lines = [StockLine::new(p1, 2)];
        assert!(net_deltas(&lines, &lines).is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn lines(ids: &[ProductId]) -> impl Strategy<Value = Vec<StockLine>> + use<> {
            let ids = ids.to_vec();
            prop::collection::vec((0..ids.len(), 1u32..50), 0..8).prop_map(move |picks| {
                picks
                    .into_iter()
                    .map(|(i, q)| StockLine::new(ids[i], q))
                    .collect()
            })
        }

        proptest! {
            /// Property: the net plan moves exactly the difference in held units.
            #[test]
            fn net_plan_conserves_units(
                (previous, next) in {
                    let ids: Vec<ProductId> = (0..4).map(|_| ProductId::generate()).collect();
                    (lines(&ids), lines(&ids))
                }
            ) {
                let held: i64 = previous.iter().map(|l| i64::from(l.quantity)).sum();
                let wanted: i64 = next.iter().map(|l| i64::from(l.quantity)).sum();
                let moved: i64 = net_deltas(&previous, &next).iter().map(|d| d.delta).sum();
                prop_assert_eq!(moved, held - wanted);
            }
        }
    }
}
