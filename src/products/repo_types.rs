use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default = "default_review_rating")]
    pub rating: u8,
    pub comment: String,
    /// RFC 3339 timestamp.
    pub date: String,
    pub reviewer_name: String,
}

/// Catalog record in `products.json`. Key names follow the scraped listing
/// format (camelCase).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub discount_percentage: f64,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default = "default_warranty")]
    pub warranty_information: String,
    #[serde(default = "default_shipping")]
    pub shipping_information: String,
    #[serde(default = "default_availability")]
    pub availability_status: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default = "default_rating")]
    pub stars: f64,
    #[serde(default)]
    pub sold: u32,
}

pub const DEFAULT_STOCK: u32 = 50;

fn default_review_rating() -> u8 {
    5
}
pub(crate) fn default_rating() -> f64 {
    5.0
}
fn default_weight() -> f64 {
    2.0
}
fn default_warranty() -> String {
    "1 year warranty".into()
}
fn default_shipping() -> String {
    "Ships in 1 week".into()
}
fn default_availability() -> String {
    "In Stock".into()
}

impl Product {
    /// A fresh catalog entry carrying the creation defaults.
    pub fn new(id: u64, title: String, description: String, price: f64, brand: String) -> Self {
        Self {
            id,
            title,
            description,
            price,
            brand,
            category: None,
            discount_percentage: 0.0,
            rating: default_rating(),
            stock: DEFAULT_STOCK,
            weight: default_weight(),
            dimensions: Dimensions::default(),
            warranty_information: default_warranty(),
            shipping_information: default_shipping(),
            availability_status: default_availability(),
            reviews: Vec::new(),
            images: Vec::new(),
            thumbnail: String::new(),
            stars: default_rating(),
            sold: 0,
        }
    }
}
