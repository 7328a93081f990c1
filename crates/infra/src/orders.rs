//! Order processing: creation, modification and deletion of orders.
//!
//! ```text
//! request (actor, input)
//!   ↓
//! 1. Validate input (line items present, quantities positive)
//!   ↓
//! 2. Load referenced documents (client, order)
//!   ↓
//! 3. Ownership checks (AuthorizationGuard)
//!   ↓
//! 4. All-or-nothing stock adjustment (InventoryLedger)
//!   ↓
//! 5. Persist the order; on failure, reverse step 4
//! ```
//!
//! Stock is only ever touched through the ledger, and every failure after a
//! successful adjustment compensates it before the error is returned.

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use salesdesk_auth::{authorize, Actor};
use salesdesk_core::{Entity, ExpectedVersion};
use salesdesk_inventory::{Product, StockLine};
use salesdesk_parties::{Client, ClientId};
use salesdesk_sales::{LineItem, NewOrder, Order, OrderFilter, OrderId, OrderPatch, OrderStatus};

use crate::error::{ServiceError, ServiceResult};
use crate::ledger::{InventoryLedger, LedgerError, PendingSwap};
use crate::store::{EntityStore, Stored};

/// What happens to held stock when an order is released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderPolicy {
    /// Return a PENDING order's stock when it is deleted or canceled.
    /// Off by default: orders consume stock permanently once created.
    pub restore_stock_on_release: bool,
}

#[derive(Debug)]
pub struct OrderProcessor<O, C, P> {
    orders: O,
    clients: C,
    ledger: InventoryLedger<P>,
    policy: OrderPolicy,
}

impl<O, C, P> OrderProcessor<O, C, P> {
    pub fn new(orders: O, clients: C, ledger: InventoryLedger<P>) -> Self {
        Self {
            orders,
            clients,
            ledger,
            policy: OrderPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OrderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }
}

impl<O, C, P> OrderProcessor<O, C, P>
where
    O: EntityStore<Order>,
    C: EntityStore<Client>,
    P: EntityStore<Product>,
{
    /// Place an order for one of the actor's clients.
    ///
    /// The order starts PENDING, owned by the actor, with its total priced from
    /// the stock snapshots taken during deduction.
    #[instrument(skip(self, actor, input), fields(actor = %actor.id(), client_id = %input.client), err)]
    pub async fn create_order(&self, actor: &Actor, input: NewOrder) -> ServiceResult<Order> {
        input.validate()?;

        let client = self.load_client(input.client).await?;
        authorize(actor, &client.salesperson())?;

        let lines: Vec<StockLine> = input.items.iter().map(LineItem::stock_line).collect();
        let adjustment = self.ledger.reserve_and_deduct(&lines).await?;

        let order = match Order::place(
            OrderId::generate(),
            client.id,
            actor.id(),
            input.items,
            adjustment.total(),
            Utc::now(),
        ) {
            Ok(order) => order,
            Err(err) => {
                self.give_back(&lines).await;
                return Err(err.into());
            }
        };

        match self.orders.insert(order).await {
            Ok(stored) => {
                let order = stored.document;
                info!(order_id = %order.id(), total = order.total(), "order created");
                Ok(order)
            }
            Err(err) => {
                self.give_back(&lines).await;
                Err(err.into())
            }
        }
    }

    /// Modify an order's client, line items and/or status.
    ///
    /// The actor must own both the order and the client it ends up attached
    /// to. New line items replace the old ones as a net stock swap: stock the
    /// new items need is taken before the write and given back if the write
    /// fails; stock the old items free is returned only after it succeeds.
    #[instrument(skip(self, actor, patch), fields(actor = %actor.id(), order_id = %id), err)]
    pub async fn update_order(&self, actor: &Actor, id: OrderId, patch: OrderPatch) -> ServiceResult<Order> {
        patch.validate()?;

        let Stored { document: order, version } = self.load_order(id).await?;
        authorize(actor, &order.salesperson())?;
        self.check_client_integrity(&order, patch.client.is_none_or(|c| c == order.client()))
            .await?;

        if let Some(client_id) = patch.client.filter(|c| *c != order.client()) {
            let client = self.load_client(client_id).await?;
            authorize(actor, &client.salesperson())?;
        }

        // Reject impossible edits before any stock moves.
        if patch.items.is_some() && !order.is_modifiable() {
            return Err(ServiceError::Validation {
                field: "estado",
                reason: format!("line items of a {} order cannot change", order.status()),
            });
        }
        if let Some(target) = patch.status {
            if !order.status().can_transition_to(target) {
                return Err(ServiceError::Validation {
                    field: "estado",
                    reason: format!("cannot move a {} order to {target}", order.status()),
                });
            }
        }

        let mut next = order.clone();
        if let Some(client_id) = patch.client {
            next.reassign_client(client_id);
        }

        // Extra stock for the new items is taken now; units the old items
        // free are only handed back once the order write lands.
        let previous_lines = order.stock_lines();
        let mut swap: Option<PendingSwap> = None;

        if let Some(items) = patch.items {
            let new_lines: Vec<StockLine> = items.iter().map(LineItem::stock_line).collect();
            let pending = self.ledger.begin_swap(&previous_lines, &new_lines).await?;
            if let Err(err) = next.replace_items(items, pending.adjustment().total()) {
                self.ledger.abort_swap(pending).await;
                return Err(err.into());
            }
            swap = Some(pending);
        }

        let mut releasing = false;
        if let Some(target) = patch.status {
            match next.transition_to(target) {
                Ok(changed) => {
                    releasing = changed
                        && target == OrderStatus::Canceled
                        && self.policy.restore_stock_on_release;
                }
                Err(err) => {
                    if let Some(pending) = swap {
                        self.ledger.abort_swap(pending).await;
                    }
                    return Err(err.into());
                }
            }
        }

        if next == order {
            if let Some(pending) = swap {
                self.settle(pending).await?;
            }
            return Ok(order);
        }

        let updated = match self
            .orders
            .update(&id, ExpectedVersion::Exact(version), next)
            .await
        {
            Ok(stored) => stored.document,
            Err(err) => {
                if let Some(pending) = swap {
                    self.ledger.abort_swap(pending).await;
                }
                return Err(err.into());
            }
        };

        if let Some(pending) = swap {
            self.settle(pending).await?;
        }
        if releasing {
            self.release(&updated.stock_lines()).await?;
        }

        info!(status = %updated.status(), total = updated.total(), "order updated");
        Ok(updated)
    }

    /// Remove one of the actor's orders.
    #[instrument(skip(self, actor), fields(actor = %actor.id(), order_id = %id), err)]
    pub async fn delete_order(&self, actor: &Actor, id: OrderId) -> ServiceResult<()> {
        let Stored { document: order, version } = self.load_order(id).await?;
        authorize(actor, &order.salesperson())?;

        if !self.orders.delete(&id, ExpectedVersion::Exact(version)).await? {
            return Err(ServiceError::not_found(Order::COLLECTION, id));
        }

        if self.policy.restore_stock_on_release && order.status() == OrderStatus::Pending {
            self.release(&order.stock_lines()).await?;
        }

        info!("order deleted");
        Ok(())
    }

    pub async fn get_order(&self, actor: &Actor, id: OrderId) -> ServiceResult<Order> {
        let order = self.load_order(id).await?.document;
        authorize(actor, &order.salesperson())?;
        Ok(order)
    }

    pub async fn list_orders_by_owner(&self, actor: &Actor) -> ServiceResult<Vec<Order>> {
        self.list(OrderFilter::owned_by(actor.id())).await
    }

    pub async fn list_orders_by_owner_and_status(
        &self,
        actor: &Actor,
        status: OrderStatus,
    ) -> ServiceResult<Vec<Order>> {
        self.list(OrderFilter::owned_by(actor.id()).with_status(status)).await
    }

    async fn list(&self, filter: OrderFilter) -> ServiceResult<Vec<Order>> {
        Ok(self
            .orders
            .find(&filter)
            .await?
            .into_iter()
            .map(Stored::into_document)
            .collect())
    }

    async fn load_order(&self, id: OrderId) -> ServiceResult<Stored<Order>> {
        self.orders
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Order::COLLECTION, id))
    }

    async fn load_client(&self, id: ClientId) -> ServiceResult<Client> {
        self.clients
            .find_by_id(&id)
            .await?
            .map(Stored::into_document)
            .ok_or_else(|| ServiceError::not_found(Client::COLLECTION, id))
    }

    /// The order's current client must belong to the order's owner. A missing
    /// client is only an error if the order stays attached to it.
    async fn check_client_integrity(&self, order: &Order, keeps_client: bool) -> ServiceResult<()> {
        match self.clients.find_by_id(&order.client()).await? {
            Some(current) if current.document.salesperson() != order.salesperson() => {
                error!(
                    order_id = %order.id(),
                    order_owner = %order.salesperson(),
                    client_id = %order.client(),
                    client_owner = %current.document.salesperson(),
                    "order and client owners disagree"
                );
                Err(ServiceError::IntegrityViolation(format!(
                    "order {} and its client {} have different owners",
                    order.id(),
                    order.client()
                )))
            }
            Some(_) => Ok(()),
            None if keeps_client => Err(ServiceError::not_found(Client::COLLECTION, order.client())),
            None => Ok(()),
        }
    }

    /// Return stock of a released order. Products deleted since are skipped.
    async fn release(&self, lines: &[StockLine]) -> ServiceResult<()> {
        match self.ledger.restore(lines).await {
            Ok(()) => Ok(()),
            Err(LedgerError::ProductNotFound(product_id)) => {
                warn!(product_id = %product_id, "released stock for a product that no longer exists");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn give_back(&self, lines: &[StockLine]) {
        if let Err(err) = self.ledger.restore(lines).await {
            error!(error = %err, "failed to restore stock after an aborted order");
        }
    }

    /// Hand back what a persisted swap freed. Products deleted since are skipped.
    async fn settle(&self, swap: PendingSwap) -> ServiceResult<()> {
        match self.ledger.complete_swap(swap).await {
            Ok(()) => Ok(()),
            Err(LedgerError::ProductNotFound(product_id)) => {
                warn!(product_id = %product_id, "freed stock for a product that no longer exists");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
