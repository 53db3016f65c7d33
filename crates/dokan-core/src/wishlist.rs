//! Customer wishlists (the heart icon on product cards).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Saved products for one customer, most recently added first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub customer_id: String,
    pub product_ids: Vec<String>,
}

impl Wishlist {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Wishlist {
            customer_id: customer_id.into(),
            product_ids: Vec::new(),
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|id| id == product_id)
    }

    /// Adds the product if missing, removes it otherwise.
    /// Returns whether the product is saved afterwards.
    pub fn toggle(&mut self, product_id: &str) -> bool {
        if self.contains(product_id) {
            self.product_ids.retain(|id| id != product_id);
            false
        } else {
            self.product_ids.insert(0, product_id.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }
}
