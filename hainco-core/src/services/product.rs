//! Product service - catalogue reads and writes

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{Product, ProductInput};
use crate::ports::RecordStore;

/// Service for product operations
pub struct ProductService {
    store: Arc<dyn RecordStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All products; an empty catalogue is reported as not found
    pub async fn list(&self) -> Result<Vec<Product>> {
        let products = self.store.list_products().await?;
        if products.is_empty() {
            return Err(Error::not_found("No products exist"));
        }
        Ok(products)
    }

    pub async fn get(&self, product_code: &str) -> Result<Product> {
        self.store
            .find_product(product_code)
            .await?
            .ok_or_else(|| Error::not_found("Product does not exist."))
    }

    pub async fn create(&self, input: ProductInput) -> Result<Product> {
        input.validate().map_err(Error::validation)?;

        if self.store.find_product(&input.product_code).await?.is_some() {
            return Err(Error::conflict("Product code is already taken"));
        }

        let product = self.store.insert_product(&input).await?;
        tracing::info!(product_id = product.product_id, "product created");
        Ok(product)
    }

    /// Full replacement of the product identified by `current_code`
    pub async fn update(&self, current_code: &str, input: ProductInput) -> Result<Product> {
        input.validate().map_err(Error::validation)?;

        let existing = self
            .store
            .find_product(current_code)
            .await?
            .ok_or_else(|| Error::not_found("Product does not exist."))?;

        if input.product_code != current_code {
            if let Some(other) = self.store.find_product(&input.product_code).await? {
                if other.product_id != existing.product_id {
                    return Err(Error::conflict("Product code is already taken"));
                }
            }
        }

        let product = self
            .store
            .update_product(current_code, &input)
            .await?
            .ok_or_else(|| Error::not_found("Product does not exist."))?;
        tracing::info!(product_id = product.product_id, "product updated");
        Ok(product)
    }
}
