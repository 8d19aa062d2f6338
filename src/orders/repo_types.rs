use serde::{Deserialize, Serialize};
use time::Date;

use crate::dates::iso_date;

/// Line of a placed order; `price` is the unit price at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: u64,
    pub title: String,
    pub quantity: u32,
    pub price: f64,
}

/// Ledger entry in `orders.json`. Never modified once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub order_id: u64,
    pub username: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
}
