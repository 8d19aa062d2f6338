use serde::{Deserialize, Serialize};

use crate::orders::repo_types::Order;

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order: Order,
}
