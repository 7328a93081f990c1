use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesdesk_core::{DocumentId, DomainError, DomainResult, Entity, SalespersonId};
use salesdesk_inventory::{ProductId, StockLine};
use salesdesk_parties::ClientId;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub DocumentId);

impl OrderId {
    pub fn new(id: DocumentId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(DocumentId::new())
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for OrderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Order status lifecycle.
///
/// `Pending` on creation; `Completed` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "PENDING", alias = "PENDIENTE")]
    Pending,
    #[serde(rename = "COMPLETADO", alias = "COMPLETED")]
    Completed,
    #[serde(rename = "CANCELADO", alias = "CANCELED")]
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Completed => "COMPLETADO",
            OrderStatus::Canceled => "CANCELADO",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Staying in the current status is always allowed.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        *self == target || *self == OrderStatus::Pending
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" | "PENDIENTE" => Ok(OrderStatus::Pending),
            "COMPLETADO" | "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELADO" | "CANCELED" => Ok(OrderStatus::Canceled),
            _ => Err(DomainError::validation(
                "estado",
                "must be one of: PENDING, COMPLETADO, CANCELADO",
            )),
        }
    }
}

/// Order line: product and quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
}

impl LineItem {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self { product_id, quantity }
    }

    pub fn stock_line(&self) -> StockLine {
        StockLine::new(self.product_id, self.quantity)
    }
}

/// Line items must be non-empty and every quantity positive.
pub fn validate_line_items(items: &[LineItem]) -> DomainResult<()> {
    if items.is_empty() {
        return Err(DomainError::validation("pedido", "an order needs at least one line item"));
    }
    if items.iter().any(|i| i.quantity == 0) {
        return Err(DomainError::validation("cantidad", "quantity must be positive"));
    }
    Ok(())
}

/// Stored order document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    #[serde(rename = "cliente")]
    client: ClientId,
    #[serde(rename = "vendedor")]
    salesperson: SalespersonId,
    #[serde(rename = "pedido")]
    items: Vec<LineItem>,
    /// Sum of unit price × quantity, in smallest currency unit.
    total: u64,
    #[serde(rename = "estado")]
    status: OrderStatus,
    #[serde(rename = "creado")]
    created_at: DateTime<Utc>,
}

impl Order {
    /// A freshly placed order. Always starts `Pending`.
    pub fn place(
        id: OrderId,
        client: ClientId,
        salesperson: SalespersonId,
        items: Vec<LineItem>,
        total: u64,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_line_items(&items)?;
        Ok(Self {
            id,
            client,
            salesperson,
            items,
            total,
            status: OrderStatus::Pending,
            created_at,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn salesperson(&self) -> SalespersonId {
        self.salesperson
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn stock_lines(&self) -> Vec<StockLine> {
        self.items.iter().map(LineItem::stock_line).collect()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_modifiable(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn reassign_client(&mut self, client: ClientId) {
        self.client = client;
    }

    pub fn replace_items(&mut self, items: Vec<LineItem>, total: u64) -> DomainResult<()> {
        if !self.is_modifiable() {
            return Err(DomainError::validation(
                "estado",
                format!("line items of a {} order cannot change", self.status),
            ));
        }
        validate_line_items(&items)?;
        self.items = items;
        self.total = total;
        Ok(())
    }

    /// Move to `target`. Returns whether the status actually changed.
    pub fn transition_to(&mut self, target: OrderStatus) -> DomainResult<bool> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::validation(
                "estado",
                format!("cannot move a {} order to {}", self.status, target),
            ));
        }
        let changed = self.status != target;
        self.status = target;
        Ok(changed)
    }
}

/// Payload for placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(alias = "cliente")]
    pub client: ClientId,
    #[serde(alias = "pedido")]
    pub items: Vec<LineItem>,
}

impl NewOrder {
    pub fn validate(&self) -> DomainResult<()> {
        validate_line_items(&self.items)
    }
}

/// Partial update of an order. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, alias = "cliente")]
    pub client: Option<ClientId>,
    #[serde(default, alias = "pedido")]
    pub items: Option<Vec<LineItem>>,
    #[serde(default, alias = "estado")]
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    pub fn validate(&self) -> DomainResult<()> {
        match &self.items {
            Some(items) => validate_line_items(items),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub salesperson: Option<SalespersonId>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn owned_by(salesperson: SalespersonId) -> Self {
        Self {
            salesperson: Some(salesperson),
            status: None,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl Entity for Order {
    type Id = OrderId;
    type Filter = OrderFilter;

    const COLLECTION: &'static str = "pedidos";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.salesperson.is_none_or(|s| s == self.salesperson)
            && filter.status.is_none_or(|s| s == self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order() -> Order {
        Order::place(
            OrderId::generate(),
            ClientId::generate(),
            SalespersonId::new(),
            vec![LineItem::new(ProductId::generate(), 3)],
            300,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn new_orders_are_pending() {
        assert_eq!(test_order().status(), OrderStatus::Pending);
    }

    #[test]
    fn empty_orders_are_rejected() {
        let err = validate_line_items(&[]).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "pedido", .. }));
    }

    #[test]
    fn zero_quantities_are_rejected() {
        let items = [LineItem::new(ProductId::generate(), 2), LineItem::new(ProductId::generate(), 0)];
        let err = validate_line_items(&items).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "cantidad", .. }));
    }

    #[test]
    fn pending_can_complete_or_cancel() {
        let mut order = test_order();
        assert_eq!(order.transition_to(OrderStatus::Completed), Ok(true));

        let mut order = test_order();
        assert_eq!(order.transition_to(OrderStatus::Canceled), Ok(true));
    }

    #[test]
    fn terminal_states_are_final() {
        let mut order = test_order();
        order.transition_to(OrderStatus::Completed).unwrap();

        assert!(order.transition_to(OrderStatus::Canceled).is_err());
        assert!(order.transition_to(OrderStatus::Pending).is_err());
        assert_eq!(order.transition_to(OrderStatus::Completed), Ok(false));
        assert_eq!(order.status(), OrderStatus::Completed);
    }

    #[test]
    fn terminal_orders_keep_their_items() {
        let mut order = test_order();
        order.transition_to(OrderStatus::Canceled).unwrap();

        let err = order
            .replace_items(vec![LineItem::new(ProductId::generate(), 1)], 10)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "estado", .. }));
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total(), 300);
    }

    #[test]
    fn status_parses_both_spellings() {
        assert_eq!("pendiente".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert_eq!("COMPLETADO".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        assert_eq!("canceled".parse::<OrderStatus>(), Ok(OrderStatus::Canceled));
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn persisted_shape_uses_spanish_keys() {
        let order = test_order();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["estado"], "PENDING");
        assert_eq!(json["vendedor"], order.salesperson().to_string());
        assert_eq!(json["cliente"], order.client().to_string());
        assert_eq!(json["pedido"][0]["cantidad"], 3);
        assert_eq!(json["total"], 300);
    }

    #[test]
    fn patch_accepts_spanish_payloads() {
        let product = ProductId::generate();
        let patch: OrderPatch = serde_json::from_value(serde_json::json!({
            "pedido": [{ "id": product.to_string(), "cantidad": 2 }],
            "estado": "COMPLETADO",
        }))
        .unwrap();
        assert_eq!(patch.items, Some(vec![LineItem::new(product, 2)]));
        assert_eq!(patch.status, Some(OrderStatus::Completed));
        assert_eq!(patch.client, None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn status() -> impl Strategy<Value = OrderStatus> {
            prop_oneof![
                Just(OrderStatus::Pending),
                Just(OrderStatus::Completed),
                Just(OrderStatus::Canceled),
            ]
        }

        proptest! {
            /// Property: once an order leaves `Pending` it never changes status again.
            #[test]
            fn first_terminal_status_sticks(targets in prop::collection::vec(status(), 1..20)) {
                let mut order = test_order();
                let mut settled: Option<OrderStatus> = None;

                for target in targets {
                    let _ = order.transition_to(target);
                    if let Some(s) = settled {
                        prop_assert_eq!(order.status(), s);
                    } else if order.status().is_terminal() {
                        settled = Some(order.status());
                    }
                }
            }
        }
    }
}
