use serde::{Deserialize, Serialize};

use crate::cart::repo_types::CartItem;

/// Body of the add/update endpoints; quantity defaults to 1.
#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: u64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: u64,
}

/// Cart contents priced at current catalog prices.
#[derive(Debug, Serialize, PartialEq)]
pub struct CartView {
    pub username: String,
    pub items: Vec<CartItem>,
    pub total: f64,
}
