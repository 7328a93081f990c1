//! Inventory ledger: the single choke point for stock mutation.
//!
//! Every change to a product's stock is a read/modify/compare-and-swap cycle
//! against the product's store version. A lost race re-reads and retries, so
//! two concurrent deductions can never both be computed from the same stock
//! value. Multi-line adjustments are all-or-nothing: when a line fails, the
//! lines already applied in the same call are compensated in reverse order
//! before the error is returned.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use salesdesk_core::{DomainError, ExpectedVersion};
use salesdesk_inventory::{net_deltas, Product, ProductId, StockDelta, StockLine};

use crate::store::{EntityStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("insufficient stock for '{product}': requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: u32,
        available: u32,
    },

    /// The optimistic retry budget ran out while other writers kept winning.
    #[error("stock of product {0} is under contention, retry later")]
    Contention(ProductId),

    #[error(transparent)]
    Invalid(DomainError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::InsufficientStock {
                product,
                requested,
                available,
            } => LedgerError::InsufficientStock {
                product,
                requested,
                available,
            },
            other => LedgerError::Invalid(other),
        }
    }
}

/// Ledger tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerOptions {
    /// Compare-and-swap attempts per product before a deduction gives up with
    /// `Contention`. Stock returns are not bounded by it.
    pub max_attempts: u32,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self { max_attempts: 64 }
    }
}

/// One priced line of a committed adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    /// Unit price snapshot taken when the stock was committed.
    pub unit_price: u64,
}

/// Result of a successful deduction or replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedAdjustment {
    lines: Vec<PricedLine>,
    total: u64,
}

impl CommittedAdjustment {
    fn priced(lines: Vec<PricedLine>) -> Result<Self, LedgerError> {
        let total = lines
            .iter()
            .try_fold(0u64, |acc, l| {
                l.unit_price
                    .checked_mul(u64::from(l.quantity))
                    .and_then(|line_total| acc.checked_add(line_total))
            })
            .ok_or_else(|| LedgerError::Invalid(DomainError::invariant("order total overflows")))?;
        Ok(Self { lines, total })
    }

    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    /// Σ unit_price × quantity, in smallest currency unit.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn stock_lines(&self) -> Vec<StockLine> {
        self.lines
            .iter()
            .map(|l| StockLine::new(l.product_id, l.quantity))
            .collect()
    }
}

/// Stock ledger over a product store.
#[derive(Debug, Clone)]
pub struct InventoryLedger<P> {
    products: P,
    options: LedgerOptions,
}

impl<P> InventoryLedger<P> {
    pub fn new(products: P) -> Self {
        Self::with_options(products, LedgerOptions::default())
    }

    pub fn with_options(products: P, options: LedgerOptions) -> Self {
        Self {
            products,
            options: LedgerOptions {
                max_attempts: options.max_attempts.max(1),
            },
        }
    }

    /// The underlying product store, for reads and catalogue edits.
    pub fn products(&self) -> &P {
        &self.products
    }

    pub fn options(&self) -> LedgerOptions {
        self.options
    }
}

impl<P> InventoryLedger<P>
where
    P: EntityStore<Product>,
{
    /// Deduct every line or none.
    ///
    /// Lines naming the same product are merged first, so a shortfall reports
    /// the full quantity asked of that product. Fails with `InsufficientStock`
    /// naming the first product that cannot cover its total; stock taken for
    /// earlier products is put back first.
    #[instrument(skip(self, lines), fields(line_count = lines.len()), err)]
    pub async fn reserve_and_deduct(&self, lines: &[StockLine]) -> Result<CommittedAdjustment, LedgerError> {
        let deltas = net_deltas(&[], lines);
        let mut applied: Vec<StockDelta> = Vec::with_capacity(deltas.len());
        let mut snapshots: HashMap<ProductId, Product> = HashMap::new();

        for delta in &deltas {
            match self.apply(*delta).await {
                Ok(product) => {
                    applied.push(*delta);
                    snapshots.insert(delta.product_id, product);
                }
                Err(err) => {
                    self.compensate(&applied).await;
                    return Err(err);
                }
            }
        }

        match self.price(lines, &mut snapshots).await {
            Ok(adjustment) => Ok(adjustment),
            Err(err) => {
                self.compensate(&applied).await;
                Err(err)
            }
        }
    }

    /// Give stock back for every line.
    ///
    /// Returns are never refused by the stock check, so they retry past the
    /// contention budget. Every line is attempted even if an earlier one
    /// fails; the first error is returned.
    #[instrument(skip(self, lines), fields(line_count = lines.len()), err)]
    pub async fn restore(&self, lines: &[StockLine]) -> Result<(), LedgerError> {
        let mut first_error = None;
        for line in lines {
            let delta = StockDelta {
                product_id: line.product_id,
                delta: i64::from(line.quantity),
            };
            if let Err(err) = self.credit(delta).await {
                warn!(product_id = %line.product_id, quantity = line.quantity, error = %err, "stock restore failed");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Take the extra stock `next` needs over `previous`, holding back the
    /// units `previous` frees until the swap is completed.
    ///
    /// Only the net per-product difference moves, so the stock check for
    /// `next` runs against current stock plus what `previous` held. On
    /// failure nothing stays taken and `previous` is still held in full.
    #[instrument(
        skip(self, previous, next),
        fields(previous_lines = previous.len(), next_lines = next.len()),
        err
    )]
    pub async fn begin_swap(&self, previous: &[StockLine], next: &[StockLine]) -> Result<PendingSwap, LedgerError> {
        let mut taken: Vec<StockDelta> = Vec::new();
        let mut returned: Vec<StockLine> = Vec::new();
        let mut snapshots: HashMap<ProductId, Product> = HashMap::new();

        for delta in net_deltas(previous, next) {
            if delta.delta > 0 {
                returned.push(StockLine::new(
                    delta.product_id,
                    u32::try_from(delta.delta).unwrap_or(u32::MAX),
                ));
                continue;
            }
            match self.apply(delta).await {
                Ok(product) => {
                    taken.push(delta);
                    snapshots.insert(delta.product_id, product);
                }
                Err(err) => {
                    self.compensate(&taken).await;
                    return Err(restate_shortfall(err, delta.product_id, previous, next));
                }
            }
        }

        match self.price(next, &mut snapshots).await {
            Ok(adjustment) => Ok(PendingSwap {
                adjustment,
                taken,
                returned,
            }),
            Err(err) => {
                self.compensate(&taken).await;
                Err(err)
            }
        }
    }

    /// Hand back the units the swapped-out line items no longer hold.
    pub async fn complete_swap(&self, swap: PendingSwap) -> Result<(), LedgerError> {
        self.restore(&swap.returned).await
    }

    /// Put back what the swap took. `previous` stays held as before.
    pub async fn abort_swap(&self, swap: PendingSwap) {
        self.compensate(&swap.taken).await;
    }

    /// Swap a held line-item set for another in one step.
    pub async fn replace(
        &self,
        previous: &[StockLine],
        next: &[StockLine],
    ) -> Result<CommittedAdjustment, LedgerError> {
        let swap = self.begin_swap(previous, next).await?;
        let adjustment = swap.adjustment.clone();
        self.complete_swap(swap).await?;
        Ok(adjustment)
    }

    /// Catalogue replenishment.
    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn restock(&self, product_id: ProductId, quantity: u32) -> Result<Product, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::Invalid(DomainError::validation(
                "cantidad",
                "restock quantity must be positive",
            )));
        }
        self.apply(StockDelta {
            product_id,
            delta: i64::from(quantity),
        })
        .await
    }

    /// Read/modify/compare-and-swap on one product, retried on version
    /// conflicts up to `max_attempts`.
    ///
    /// `change` runs against a fresh copy on every attempt.
    pub async fn modify<F>(&self, product_id: ProductId, change: F) -> Result<Product, LedgerError>
    where
        F: Fn(&mut Product) -> Result<(), DomainError> + Send + Sync,
    {
        self.compare_and_swap(product_id, &change, Some(self.options.max_attempts))
            .await
    }

    async fn compare_and_swap<F>(
        &self,
        product_id: ProductId,
        change: &F,
        budget: Option<u32>,
    ) -> Result<Product, LedgerError>
    where
        F: Fn(&mut Product) -> Result<(), DomainError> + Send + Sync,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            let stored = self
                .products
                .find_by_id(&product_id)
                .await
                .map_err(LedgerError::Store)?
                .ok_or(LedgerError::ProductNotFound(product_id))?;

            let mut product = stored.document;
            change(&mut product)?;

            match self
                .products
                .update(&product_id, ExpectedVersion::Exact(stored.version), product)
                .await
            {
                Ok(updated) => return Ok(updated.document),
                Err(StoreError::Concurrency { .. }) => {
                    if let Some(max_attempts) = budget.filter(|max| attempt >= *max) {
                        warn!(product_id = %product_id, max_attempts, "stock retry budget exhausted");
                        return Err(LedgerError::Contention(product_id));
                    }
                    debug!(product_id = %product_id, attempt, "stock write lost a race, retrying");
                    tokio::task::yield_now().await;
                }
                Err(StoreError::NotFound { .. }) => return Err(LedgerError::ProductNotFound(product_id)),
                Err(err) => return Err(LedgerError::Store(err)),
            }
        }
    }

    async fn apply(&self, delta: StockDelta) -> Result<Product, LedgerError> {
        self.modify(delta.product_id, |product| product.adjust_stock(delta.delta))
            .await
    }

    /// A stock increase; retried until it lands or the product is gone.
    async fn credit(&self, delta: StockDelta) -> Result<Product, LedgerError> {
        self.compare_and_swap(
            delta.product_id,
            &|product: &mut Product| product.adjust_stock(delta.delta),
            None,
        )
        .await
    }

    /// Price `lines` from the snapshots taken while moving stock, reading
    /// products that did not move.
    async fn price(
        &self,
        lines: &[StockLine],
        snapshots: &mut HashMap<ProductId, Product>,
    ) -> Result<CommittedAdjustment, LedgerError> {
        let mut priced = Vec::with_capacity(lines.len());
        for line in lines {
            let product = match snapshots.get(&line.product_id) {
                Some(p) => p.clone(),
                None => {
                    let product = self
                        .products
                        .find_by_id(&line.product_id)
                        .await
                        .map_err(LedgerError::Store)?
                        .ok_or(LedgerError::ProductNotFound(line.product_id))?
                        .document;
                    snapshots.insert(line.product_id, product.clone());
                    product
                }
            };
            priced.push(PricedLine {
                product_id: line.product_id,
                product_name: product.name,
                quantity: line.quantity,
                unit_price: product.price,
            });
        }
        CommittedAdjustment::priced(priced)
    }

    /// Undo `applied` in reverse order. Every undo is a stock increase, so it
    /// only fails when the product or the store is gone; those are logged.
    async fn compensate(&self, applied: &[StockDelta]) {
        for delta in applied.iter().rev() {
            let undo = StockDelta {
                product_id: delta.product_id,
                delta: -delta.delta,
            };
            if let Err(err) = self.credit(undo).await {
                error!(
                    product_id = %delta.product_id,
                    delta = undo.delta,
                    error = %err,
                    "stock compensation failed"
                );
            }
        }
    }
}

/// Stock taken by [`InventoryLedger::begin_swap`] while the order that holds
/// it is being written. Finish it with `complete_swap` once the write lands,
/// or `abort_swap` if it does not.
#[derive(Debug)]
#[must_use = "a pending swap must be completed or aborted"]
pub struct PendingSwap {
    adjustment: CommittedAdjustment,
    taken: Vec<StockDelta>,
    returned: Vec<StockLine>,
}

impl PendingSwap {
    pub fn adjustment(&self) -> &CommittedAdjustment {
        &self.adjustment
    }
}

/// Report a failed net deduction in terms of the new line items: what they ask
/// for against what is on hand plus what the old set held.
fn restate_shortfall(
    err: LedgerError,
    product_id: ProductId,
    previous: &[StockLine],
    next: &[StockLine],
) -> LedgerError {
    let sum = |lines: &[StockLine]| -> u64 {
        lines
            .iter()
            .filter(|l| l.product_id == product_id)
            .map(|l| u64::from(l.quantity))
            .sum()
    };
    let clamp = |v: u64| u32::try_from(v).unwrap_or(u32::MAX);

    match err {
        LedgerError::InsufficientStock { product, available, .. } => LedgerError::InsufficientStock {
            product,
            requested: clamp(sum(next)),
            available: clamp(u64::from(available) + sum(previous)),
        },
        other => other,
    }
}
