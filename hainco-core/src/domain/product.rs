//! Product domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Editable product fields, as sent by the client on create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub product_price: Decimal,
    #[serde(default)]
    pub product_image_link: Option<String>,
    #[serde(default)]
    pub product_stock: i32,
    #[serde(default)]
    pub product_description: Option<String>,
    pub product_type: String,
    #[serde(default = "default_active")]
    pub product_is_active: bool,
    /// Natural key
    pub product_code: String,
}

/// A product row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    #[serde(flatten)]
    pub details: ProductInput,
}

impl ProductInput {
    /// Validate product data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.product_code.trim().is_empty() {
            return Err("product code cannot be empty");
        }
        // Shadowed by the create route
        if self.product_code == "new_product" {
            return Err("product code new_product is reserved");
        }
        if self.product_name.trim().is_empty() {
            return Err("product name cannot be empty");
        }
        if self.product_price.is_sign_negative() {
            return Err("product price cannot be negative");
        }
        if !fits_money_column(self.product_price) {
            return Err("product price is too large");
        }
        if self.product_stock < 0 {
            return Err("product stock cannot be negative");
        }
        Ok(())
    }
}

impl Product {
    pub fn code(&self) -> &str {
        &self.details.product_code
    }
}

pub(crate) fn default_active() -> bool {
    true
}

/// Whether `value` survives the cast to `DECIMAL(12, 2)` once rounded to cents
pub(crate) fn fits_money_column(value: Decimal) -> bool {
    value.round_dp(2).abs() < Decimal::new(10_000_000_000, 0)
}
