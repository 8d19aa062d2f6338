use tracing::{debug, info, instrument};

use crate::{
    cart::{
        dto::CartView,
        repo_types::{Cart, CartItem},
    },
    db::{Collection, RecordStore},
    error::{AppError, AppResult},
    products::repo_types::Product,
    users::repo_types::User,
};

pub(crate) fn checked_quantity(quantity: i64) -> AppResult<u32> {
    if quantity < 1 {
        return Err(AppError::invalid("Quantity must be at least 1"));
    }
    u32::try_from(quantity).map_err(|_| AppError::invalid("Quantity is too large"))
}

async fn ensure_user(store: &RecordStore, username: &str) -> AppResult<()> {
    match User::find_by_username(store, username).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("User not found")),
    }
}

/// Σ live price × quantity. Lines whose product is gone count as zero.
pub fn live_total(items: &[CartItem], products: &[Product]) -> f64 {
    items
        .iter()
        .filter_map(|item| {
            Product::find(products, item.product_id).map(|p| p.price * f64::from(item.quantity))
        })
        .sum()
}

#[instrument(skip(store))]
pub async fn add(
    store: &RecordStore,
    username: &str,
    product_id: u64,
    quantity: i64,
) -> AppResult<Cart> {
    let quantity = checked_quantity(quantity)?;
    ensure_user(store, username).await?;
    let products = Product::load_all(store).await?;
    if Product::find(&products, product_id).is_none() {
        return Err(AppError::not_found("Product not found"));
    }

    let _lock = store.lock(&[Collection::Carts]).await;
    let mut carts = Cart::load_all(store).await?;
    let cart = Cart::find_or_create(&mut carts, username);
    cart.add(product_id, quantity)?;
    let cart = cart.clone();
    Cart::save_all(store, &carts).await?;

    info!(%username, product_id, quantity, "item added to cart");
    Ok(cart)
}

/// Removing a product that is not in the cart is a no-op.
#[instrument(skip(store))]
pub async fn remove(store: &RecordStore, username: &str, product_id: u64) -> AppResult<()> {
    ensure_user(store, username).await?;

    let _lock = store.lock(&[Collection::Carts]).await;
    let mut carts = Cart::load_all(store).await?;
    let removed = Cart::find_mut(&mut carts, username).is_some_and(|c| c.remove(product_id));
    if removed {
        Cart::save_all(store, &carts).await?;
        info!(%username, product_id, "item removed from cart");
    } else {
        debug!(%username, product_id, "nothing to remove");
    }
    Ok(())
}

#[instrument(skip(store))]
pub async fn update(
    store: &RecordStore,
    username: &str,
    product_id: u64,
    quantity: i64,
) -> AppResult<()> {
    ensure_user(store, username).await?;
    let quantity = checked_quantity(quantity)?;

    let _lock = store.lock(&[Collection::Carts]).await;
    let mut carts = Cart::load_all(store).await?;
    let updated = Cart::find_mut(&mut carts, username)
        .is_some_and(|c| c.set_quantity(product_id, quantity));
    if !updated {
        return Err(AppError::not_found("Item not in cart"));
    }
    Cart::save_all(store, &carts).await?;

    info!(%username, product_id, quantity, "cart updated");
    Ok(())
}

#[instrument(skip(store))]
pub async fn view(store: &RecordStore, username: &str) -> AppResult<CartView> {
    ensure_user(store, username).await?;
    let carts = Cart::load_all(store).await?;
    let items = Cart::find(&carts, username)
        .map(|c| c.items.clone())
        .unwrap_or_default();
    let products = Product::load_all(store).await?;

    Ok(CartView {
        username: username.to_string(),
        total: live_total(&items, &products),
        items,
    })
}
