use serde::{Deserialize, Serialize};

use salesdesk_core::{DocumentId, DomainError, DomainResult, Entity};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub DocumentId);

impl ProductId {
    pub fn new(id: DocumentId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(DocumentId::new())
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A sellable product and its on-hand stock.
///
/// `stock` is only ever changed through [`Product::adjust_stock`], which keeps
/// it non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "existencia")]
    pub stock: u32,
    /// Price in smallest currency unit (e.g., cents).
    #[serde(rename = "precio")]
    pub price: u64,
}

/// Payload for registering a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "existencia")]
    pub stock: u32,
    #[serde(alias = "precio")]
    pub price: u64,
}

/// Catalogue edits. Stock is deliberately absent: it moves through the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default, alias = "precio")]
    pub price: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub name: Option<String>,
}

impl Product {
    pub fn create(id: ProductId, input: NewProduct) -> DomainResult<Self> {
        let name = validate_name(input.name)?;
        Ok(Self {
            id,
            name,
            stock: input.stock,
            price: input.price,
        })
    }

    /// Apply a signed stock movement.
    ///
    /// Negative deltas fail with `InsufficientStock` instead of going below zero.
    pub fn adjust_stock(&mut self, delta: i64) -> DomainResult<()> {
        if delta < 0 {
            let requested = delta.unsigned_abs();
            if requested > u64::from(self.stock) {
                return Err(DomainError::InsufficientStock {
                    product: self.name.clone(),
                    requested: u32::try_from(requested).unwrap_or(u32::MAX),
                    available: self.stock,
                });
            }
            // requested <= stock, so it fits in u32
            self.stock -= requested as u32;
        } else if delta > 0 {
            self.stock = u32::try_from(delta)
                .ok()
                .and_then(|d| self.stock.checked_add(d))
                .ok_or_else(|| DomainError::invariant(format!("stock overflow for '{}'", self.name)))?;
        }
        Ok(())
    }

    pub fn apply_patch(&mut self, patch: ProductPatch) -> DomainResult<()> {
        if let Some(name) = patch.name {
            self.name = validate_name(name)?;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        Ok(())
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("nombre", "name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

impl Entity for Product {
    type Id = ProductId;
    type Filter = ProductFilter;

    const COLLECTION: &'static str = "productos";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.name.as_deref().is_none_or(|n| n == self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: u32) -> Product {
        Product::create(
            ProductId::generate(),
            NewProduct {
                name: "Laptop".to_string(),
                stock,
                price: 120_000,
            },
        )
        .unwrap()
    }

    #[test]
    fn deducts_within_stock() {
        let mut p = product(5);
        p.adjust_stock(-3).unwrap();
        assert_eq!(p.stock, 2);
    }

    #[test]
    fn deducting_everything_leaves_zero() {
        let mut p = product(5);
        p.adjust_stock(-5).unwrap();
        assert_eq!(p.stock, 0);
    }

    #[test]
    fn refuses_to_go_negative_and_names_the_product() {
        let mut p = product(2);
        let err = p.adjust_stock(-3).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                product: "Laptop".to_string(),
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(p.stock, 2);
    }

    #[test]
    fn replenishes() {
        let mut p = product(2);
        p.adjust_stock(4).unwrap();
        assert_eq!(p.stock, 6);
    }

    #[test]
    fn detects_overflow() {
        let mut p = product(u32::MAX);
        assert!(matches!(p.adjust_stock(1), Err(DomainError::InvariantViolation(_))));
        assert_eq!(p.stock, u32::MAX);
    }

    #[test]
    fn rejects_blank_names() {
        let err = Product::create(
            ProductId::generate(),
            NewProduct {
                name: "   ".to_string(),
                stock: 1,
                price: 1,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "nombre", .. }));
    }

    #[test]
    fn patch_never_touches_stock() {
        let mut p = product(7);
        p.apply_patch(ProductPatch {
            name: Some("Laptop Pro".to_string()),
            price: Some(150_000),
        })
        .unwrap();
        assert_eq!(p.name, "Laptop Pro");
        assert_eq!(p.price, 150_000);
        assert_eq!(p.stock, 7);
    }

    #[test]
    fn persists_with_spanish_field_names() {
        let p = product(3);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["nombre"], "Laptop");
        assert_eq!(json["existencia"], 3);
        assert_eq!(json["precio"], 120_000);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: no sequence of movements leaves stock negative, and a
            /// rejected movement leaves stock untouched.
            #[test]
            fn stock_never_goes_negative(
                initial in 0u32..1_000,
                deltas in prop::collection::vec(-500i64..500, 0..50)
            ) {
                let mut p = product(initial);
                let mut expected = i64::from(initial);

                for delta in deltas {
                    let before = p.stock;
                    match p.adjust_stock(delta) {
                        Ok(()) => expected += delta,
                        Err(_) => prop_assert_eq!(p.stock, before),
                    }
                    prop_assert!(expected >= 0);
                    prop_assert_eq!(i64::from(p.stock), expected);
                }
            }
        }
    }
}
