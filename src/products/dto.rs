use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::products::repo_types::{Dimensions, Product};

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub q: String,
}

/// Body of `POST /admin/products`, and the shape of one scraped listing
/// record. Unknown keys (`specs`, `url`, a scraper-side `id`) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub discount_percentage: Option<f64>,
    pub rating: Option<f64>,
    pub stock: Option<u32>,
    pub weight: Option<f64>,
    pub dimensions: Option<Dimensions>,
    pub warranty_information: Option<String>,
    pub shipping_information: Option<String>,
    pub availability_status: Option<String>,
    pub images: Option<Vec<String>>,
    pub thumbnail: Option<String>,
    pub stars: Option<f64>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl NewProduct {
    pub fn validate(&self) -> AppResult<()> {
        for (field, ok) in [
            ("title", filled(&self.title)),
            ("description", filled(&self.description)),
            ("price", self.price.is_some()),
            ("brand", filled(&self.brand)),
        ] {
            if !ok {
                return Err(AppError::invalid(format!("{field} is required")));
            }
        }
        if self.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(AppError::invalid("price must be a non-negative number"));
        }
        Ok(())
    }

    /// Builds the catalog record; call [`NewProduct::validate`] first.
    pub fn into_product(self, id: u64) -> Product {
        let mut product = Product::new(
            id,
            self.title.unwrap_or_default().trim().to_string(),
            self.description.unwrap_or_default(),
            self.price.unwrap_or_default(),
            self.brand.unwrap_or_default().trim().to_string(),
        );
        product.category = self.category;
        if let Some(v) = self.discount_percentage {
            product.discount_percentage = v;
        }
        if let Some(v) = self.rating {
            product.rating = v;
        }
        if let Some(v) = self.stock {
            product.stock = v;
        }
        if let Some(v) = self.weight {
            product.weight = v;
        }
        if let Some(v) = self.dimensions {
            product.dimensions = v;
        }
        if let Some(v) = self.warranty_information {
            product.warranty_information = v;
        }
        if let Some(v) = self.shipping_information {
            product.shipping_information = v;
        }
        if let Some(v) = self.availability_status {
            product.availability_status = v;
        }
        if let Some(v) = self.images {
            product.images = v;
        }
        if let Some(v) = self.thumbnail {
            product.thumbnail = v;
        }
        if let Some(v) = self.stars {
            product.stars = v;
        }
        product
    }
}

/// Body of `PUT /admin/products/:id`. Only these fields are editable.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub brand: Option<String>,
    pub stock: Option<u32>,
    pub discount_percentage: Option<f64>,
    pub images: Option<Vec<String>>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub username: Option<String>,
    pub comment: Option<String>,
    pub rating: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub message: String,
    pub product: Product,
}
