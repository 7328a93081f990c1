//! Product catalogue. Stock only moves through the ledger.

use tracing::{info, instrument};

use salesdesk_core::{Entity, ExpectedVersion};
use salesdesk_inventory::{NewProduct, Product, ProductFilter, ProductId, ProductPatch};

use crate::error::{ServiceError, ServiceResult};
use crate::ledger::{InventoryLedger, LedgerError};
use crate::store::{EntityStore, Stored};

#[derive(Debug)]
pub struct ProductCatalog<P> {
    ledger: InventoryLedger<P>,
}

impl<P> ProductCatalog<P> {
    pub fn new(ledger: InventoryLedger<P>) -> Self {
        Self { ledger }
    }
}

impl<P> ProductCatalog<P>
where
    P: EntityStore<Product>,
{
    #[instrument(skip(self, input), fields(name = %input.name), err)]
    pub async fn create_product(&self, input: NewProduct) -> ServiceResult<Product> {
        let product = Product::create(ProductId::generate(), input)?;
        let stored = self.ledger.products().insert(product).await?;
        info!(product_id = %stored.document.id, stock = stored.document.stock, "product created");
        Ok(stored.document)
    }

    pub async fn get_product(&self, id: ProductId) -> ServiceResult<Product> {
        self.ledger
            .products()
            .find_by_id(&id)
            .await?
            .map(Stored::into_document)
            .ok_or_else(|| ServiceError::not_found(Product::COLLECTION, id))
    }

    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self
            .ledger
            .products()
            .find(&ProductFilter::default())
            .await?
            .into_iter()
            .map(Stored::into_document)
            .collect())
    }

    /// Rename or reprice. Retries like a stock movement so that concurrent
    /// orders never make an edit fail.
    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> ServiceResult<Product> {
        let product = self
            .ledger
            .modify(id, |product| product.apply_patch(patch.clone()))
            .await?;
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn restock(&self, id: ProductId, quantity: u32) -> ServiceResult<Product> {
        let product = self.ledger.restock(id, quantity).await?;
        info!(stock = product.stock, "product restocked");
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete_product(&self, id: ProductId) -> ServiceResult<()> {
        if !self.ledger.products().delete(&id, ExpectedVersion::Any).await? {
            return Err(LedgerError::ProductNotFound(id).into());
        }
        info!("product deleted");
        Ok(())
    }
}
