use std::path::Path;

use anyhow::Context;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    db::{Collection, RecordStore},
    error::{AppError, AppResult},
    products::{
        dto::{NewProduct, ProductPatch, ReviewRequest},
        repo_types::{Product, Review},
    },
};

fn product_not_found() -> AppError {
    AppError::not_found("Product not found")
}

#[instrument(skip(store))]
pub async fn list(store: &RecordStore, query: &str) -> AppResult<Vec<Product>> {
    let products = Product::load_all(store).await?;
    Ok(Product::search(&products, query).into_iter().cloned().collect())
}

/// Product with its rating recomputed from reviews.
#[instrument(skip(store))]
pub async fn get(store: &RecordStore, id: u64) -> AppResult<Product> {
    let products = Product::load_all(store).await?;
    let mut product = Product::find(&products, id)
        .cloned()
        .ok_or_else(product_not_found)?;
    product.rating = product.computed_rating();
    Ok(product)
}

#[instrument(skip(store, req))]
pub async fn create(store: &RecordStore, req: NewProduct) -> AppResult<Product> {
    req.validate()?;

    let _lock = store.lock(&[Collection::Products, Collection::Sequences]).await;
    let mut products = Product::load_all(store).await?;
    let id = store
        .next_id(Collection::Products, Product::max_id(&products))
        .await?;
    let product = req.into_product(id);
    products.push(product.clone());
    Product::save_all(store, &products).await?;

    info!(product_id = id, title = %product.title, "product added");
    Ok(product)
}

#[instrument(skip(store, patch))]
pub async fn update(store: &RecordStore, id: u64, patch: ProductPatch) -> AppResult<Product> {
    if patch.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(AppError::invalid("price must be a non-negative number"));
    }

    let _lock = store.lock(&[Collection::Products]).await;
    let mut products = Product::load_all(store).await?;
    let product = Product::find_mut(&mut products, id).ok_or_else(product_not_found)?;

    if let Some(v) = patch.title {
        product.title = v;
    }
    if let Some(v) = patch.description {
        product.description = v;
    }
    if let Some(v) = patch.price {
        product.price = v;
    }
    if let Some(v) = patch.brand {
        product.brand = v;
    }
    if let Some(v) = patch.stock {
        product.stock = v;
    }
    if let Some(v) = patch.discount_percentage {
        product.discount_percentage = v;
    }
    if let Some(v) = patch.images {
        product.images = v;
    }
    if let Some(v) = patch.thumbnail {
        product.thumbnail = v;
    }
    let updated = product.clone();

    Product::save_all(store, &products).await?;
    info!(product_id = id, "product updated");
    Ok(updated)
}

/// Removing an unknown id is not an error.
#[instrument(skip(store))]
pub async fn delete(store: &RecordStore, id: u64) -> AppResult<()> {
    let _lock = store.lock(&[Collection::Products]).await;
    let mut products = Product::load_all(store).await?;
    let before = products.len();
    products.retain(|p| p.id != id);
    if products.len() != before {
        Product::save_all(store, &products).await?;
        info!(product_id = id, "product deleted");
    }
    Ok(())
}

#[instrument(skip(store, req))]
pub async fn add_review(store: &RecordStore, id: u64, req: ReviewRequest) -> AppResult<Review> {
    let username = req.username.as_deref().map(str::trim).unwrap_or_default();
    let comment = req.comment.as_deref().map(str::trim).unwrap_or_default();
    if username.is_empty() || comment.is_empty() {
        return Err(AppError::invalid("Username and comment required"));
    }
    let rating = req.rating.unwrap_or(5);
    if !(1..=5).contains(&rating) {
        return Err(AppError::invalid("Rating must be between 1 and 5"));
    }

    let _lock = store.lock(&[Collection::Products]).await;
    let mut products = Product::load_all(store).await?;
    let product = Product::find_mut(&mut products, id).ok_or_else(product_not_found)?;

    let review = Review {
        rating,
        comment: comment.to_string(),
        date: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("format review date")?,
        reviewer_name: username.to_string(),
    };
    product.reviews.push(review.clone());
    Product::save_all(store, &products).await?;

    info!(product_id = id, reviewer = %username, rating, "review added");
    Ok(review)
}

/// Imports a scraped listing file into an empty catalog. Returns how many
/// records were imported; a non-empty catalog is left untouched.
#[instrument(skip(store))]
pub async fn import_seed(store: &RecordStore, path: &Path) -> anyhow::Result<usize> {
    let _lock = store.lock(&[Collection::Products, Collection::Sequences]).await;
    let mut products = Product::load_all(store).await?;
    if !products.is_empty() {
        info!(existing = products.len(), "catalog not empty; seed skipped");
        return Ok(0);
    }

    let body = tokio::fs::read(path)
        .await
        .with_context(|| format!("read seed file {}", path.display()))?;
    let listing: Vec<NewProduct> =
        serde_json::from_slice(&body).context("decode seed listing")?;

    for (idx, record) in listing.into_iter().enumerate() {
        if let Err(e) = record.validate() {
            warn!(index = idx, reason = %e, "seed record skipped");
            continue;
        }
        let id = store
            .next_id(Collection::Products, Product::max_id(&products))
            .await?;
        products.push(record.into_product(id));
    }

    Product::save_all(store, &products).await?;
    info!(imported = products.len(), "catalog seeded");
    Ok(products.len())
}
