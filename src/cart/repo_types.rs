use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: u64,
    pub quantity: u32,
}

/// One user's cart in `carts.json`. Emptied, never removed, by checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub username: String,
    #[serde(rename = "cart", default)]
    pub items: Vec<CartItem>,
}
