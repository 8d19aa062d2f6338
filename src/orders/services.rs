use std::collections::HashMap;

use tracing::{error, info, instrument, warn};

use crate::{
    cart::repo_types::{Cart, CartItem},
    dates::today,
    db::{Collection, RecordStore},
    error::{AppError, AppResult},
    orders::repo_types::{Order, OrderItem},
    products::repo_types::Product,
    users::repo_types::User,
};

/// Validates every cart line against the catalog, then applies the stock
/// movements. Nothing in `products` changes unless every line passes.
///
/// Lines are checked in cart order; a product listed on several lines is
/// checked against the sum of its quantities.
pub fn reconcile(
    products: &mut [Product],
    lines: &[CartItem],
) -> AppResult<(Vec<OrderItem>, f64)> {
    let mut demand: HashMap<u64, u64> = HashMap::new();
    for line in lines {
        *demand.entry(line.product_id).or_default() += u64::from(line.quantity);
    }

    let mut positions = Vec::with_capacity(lines.len());
    for line in lines {
        let pos = products
            .iter()
            .position(|p| p.id == line.product_id)
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", line.product_id)))?;
        let product = &products[pos];
        let wanted = demand
            .get(&line.product_id)
            .copied()
            .unwrap_or(u64::from(line.quantity));
        if u64::from(product.stock) < wanted {
            return Err(AppError::BusinessRule(format!(
                "Not enough stock for {}",
                product.title
            )));
        }
        positions.push(pos);
    }

    let mut items = Vec::with_capacity(lines.len());
    let mut total = 0.0;
    for (line, pos) in lines.iter().zip(positions) {
        let product = &mut products[pos];
        product.stock -= line.quantity;
        product.sold = product.sold.saturating_add(line.quantity);
        total += product.price * f64::from(line.quantity);
        items.push(OrderItem {
            product_id: product.id,
            title: product.title.clone(),
            quantity: line.quantity,
            price: product.price,
        });
    }
    Ok((items, total))
}

fn persist_failed<'a>(
    stage: &'static str,
    username: &'a str,
    order_id: u64,
) -> impl FnOnce(anyhow::Error) -> anyhow::Error + 'a {
    move |e| {
        error!(error = %e, stage, %username, order_id, "checkout write failed; collections may disagree");
        e
    }
}

/// Turns the user's cart into an order.
///
/// Holds the products, carts, orders and sequences locks for the whole
/// cycle. Writes happen in the order products, orders, cart; a failed write
/// part-way leaves the earlier ones in place.
#[instrument(skip(store))]
pub async fn checkout(store: &RecordStore, username: &str) -> AppResult<Order> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::invalid("Username required"));
    }

    let users = User::load_all(store).await?;
    if User::find(&users, username).is_none() {
        warn!(%username, "checkout for unknown user");
        return Err(AppError::not_found("User not found"));
    }

    let _lock = store
        .lock(&[
            Collection::Products,
            Collection::Carts,
            Collection::Orders,
            Collection::Sequences,
        ])
        .await;

    let mut carts = Cart::load_all(store).await?;
    let lines = match Cart::find(&carts, username) {
        Some(cart) if !cart.is_empty() => cart.items.clone(),
        _ => return Err(AppError::BusinessRule("Cart is empty".into())),
    };

    let mut products = Product::load_all(store).await?;
    let (items, total_price) = reconcile(&mut products, &lines).inspect_err(|e| {
        warn!(%username, reason = %e, "checkout rejected");
    })?;

    let order_id = Order::next_id(store).await?;
    let order = Order {
        order_id,
        username: username.to_string(),
        date: today(),
        items,
        total_price,
    };

    Product::save_all(store, &products)
        .await
        .map_err(persist_failed("products", username, order_id))?;
    Order::append(store, &order)
        .await
        .map_err(persist_failed("orders", username, order_id))?;
    if let Some(cart) = Cart::find_mut(&mut carts, username) {
        cart.clear();
    }
    Cart::save_all(store, &carts)
        .await
        .map_err(persist_failed("carts", username, order_id))?;

    info!(%username, order_id, total_price, lines = order.items.len(), "order placed");
    Ok(order)
}

#[instrument(skip(store))]
pub async fn for_user(store: &RecordStore, username: &str) -> AppResult<Vec<Order>> {
    if User::find_by_username(store, username).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }
    let orders = Order::load_all(store).await?;
    Ok(Order::by_user(&orders, username))
}

#[instrument(skip(store))]
pub async fn by_id(store: &RecordStore, order_id: u64) -> AppResult<Order> {
    let orders = Order::load_all(store).await?;
    Order::by_id(&orders, order_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Order not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::services as cart;
    use crate::products::services::tests::seed_product;
    use crate::state::AppState;
    use crate::users::services::{register, tests::register_request};

    fn product(id: u64, price: f64, stock: u32) -> Product {
        let mut p = Product::new(id, format!("Laptop {id}"), String::new(), price, "Acme".into());
        p.stock = stock;
        p
    }

    fn line(product_id: u64, quantity: u32) -> CartItem {
        CartItem {
            product_id,
            quantity,
        }
    }

    async fn stock_of(store: &RecordStore, id: u64) -> u32 {
        let products = Product::load_all(store).await.unwrap();
        Product::find(&products, id).unwrap().stock
    }

    #[test]
    fn reconcile_snapshots_prices_and_moves_stock() {
        let mut products = vec![product(1, 100.0, 5), product(2, 12.5, 10)];
        let (items, total) = reconcile(&mut products, &[line(1, 2), line(2, 4)]).unwrap();

        assert_eq!(total, 250.0);
        let summed: f64 = items.iter().map(|i| i.price * f64::from(i.quantity)).sum();
        assert_eq!(summed, total);
        assert_eq!(items[0].title, "Laptop 1");
        assert_eq!((products[0].stock, products[0].sold), (3, 2));
        assert_eq!((products[1].stock, products[1].sold), (6, 4));
    }

    #[test]
    fn reconcile_is_all_or_nothing() {
        let mut products = vec![product(1, 100.0, 5), product(2, 10.0, 1)];
        let before = products.clone();

        let err = reconcile(&mut products, &[line(1, 2), line(2, 2)]).unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == "Not enough stock for Laptop 2"));
        assert_eq!(products, before);

        let err = reconcile(&mut products, &[line(1, 1), line(99, 1)]).unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Product 99 not found"));
        assert_eq!(products, before);
    }

    #[test]
    fn reconcile_sums_repeated_lines() {
        let mut products = vec![product(1, 10.0, 3)];
        let err = reconcile(&mut products, &[line(1, 2), line(1, 2)]).unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
        assert_eq!(products[0].stock, 3);

        let (_, total) = reconcile(&mut products, &[line(1, 1), line(1, 2)]).unwrap();
        assert_eq!(total, 30.0);
        assert_eq!(products[0].stock, 0);
    }

    #[test]
    fn reconcile_demand_does_not_wrap_at_u32() {
        let mut products = vec![product(1, 1.0, u32::MAX)];
        let err = reconcile(&mut products, &[line(1, u32::MAX), line(1, 1)]).unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == "Not enough stock for Laptop 1"));
        assert_eq!(products[0].stock, u32::MAX);
    }

    #[tokio::test]
    async fn alice_checks_out() {
        let state = AppState::fake();
        register(&state.store, register_request("alice")).await.unwrap();
        let p = seed_product(&state.store, "Laptop", 100.0, 5).await;
        cart::add(&state.store, "alice", p.id, 2).await.unwrap();

        let order = checkout(&state.store, "alice").await.unwrap();
        assert_eq!(order.order_id, 1);
        assert_eq!(order.total_price, 200.0);
        assert_eq!(
            order.items,
            vec![OrderItem {
                product_id: p.id,
                title: "Laptop".into(),
                quantity: 2,
                price: 100.0,
            }]
        );
        assert_eq!(stock_of(&state.store, p.id).await, 3);
        assert!(cart::view(&state.store, "alice").await.unwrap().items.is_empty());

        // the cart is emptied, not dropped
        let carts = Cart::load_all(&state.store).await.unwrap();
        assert!(Cart::find(&carts, "alice").is_some());

        assert_eq!(for_user(&state.store, "alice").await.unwrap(), vec![order.clone()]);
        assert_eq!(by_id(&state.store, 1).await.unwrap(), order);
    }

    #[tokio::test]
    async fn insufficient_stock_changes_nothing() {
        let state = AppState::fake();
        register(&state.store, register_request("alice")).await.unwrap();
        let p = seed_product(&state.store, "Laptop", 100.0, 1).await;
        cart::add(&state.store, "alice", p.id, 2).await.unwrap();

        let err = checkout(&state.store, "alice").await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m.starts_with("Not enough stock")));
        assert_eq!(stock_of(&state.store, p.id).await, 1);
        assert!(Order::load_all(&state.store).await.unwrap().is_empty());
        assert_eq!(cart::view(&state.store, "alice").await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn empty_or_missing_cart_is_rejected() {
        let state = AppState::fake();
        register(&state.store, register_request("alice")).await.unwrap();
        let p = seed_product(&state.store, "Laptop", 100.0, 5).await;

        let err = checkout(&state.store, "alice").await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(ref m) if m == "Cart is empty"));

        cart::add(&state.store, "alice", p.id, 1).await.unwrap();
        cart::remove(&state.store, "alice", p.id).await.unwrap();
        let err = checkout(&state.store, "alice").await.unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));

        let err = checkout(&state.store, "ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = checkout(&state.store, "  ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        assert!(Order::load_all(&state.store).await.unwrap().is_empty());
        assert_eq!(stock_of(&state.store, p.id).await, 5);
    }

    #[tokio::test]
    async fn order_ids_increase_across_users() {
        let state = AppState::fake();
        register(&state.store, register_request("alice")).await.unwrap();
        register(&state.store, register_request("bob")).await.unwrap();
        let p = seed_product(&state.store, "Laptop", 10.0, 10).await;

        let mut ids = Vec::new();
        for user in ["alice", "bob", "alice"] {
            cart::add(&state.store, user, p.id, 1).await.unwrap();
            ids.push(checkout(&state.store, user).await.unwrap().order_id);
        }
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(stock_of(&state.store, p.id).await, 7);

        let alice: Vec<u64> = for_user(&state.store, "alice")
            .await
            .unwrap()
            .iter()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(alice, vec![1, 3]);
    }

    #[tokio::test]
    async fn concurrent_checkouts_do_not_oversell() {
        let state = AppState::fake();
        let p = seed_product(&state.store, "Last one", 10.0, 1).await;
        for user in ["alice", "bob"] {
            register(&state.store, register_request(user)).await.unwrap();
            cart::add(&state.store, user, p.id, 1).await.unwrap();
        }

        let (a, b) = tokio::join!(
            checkout(&state.store, "alice"),
            checkout(&state.store, "bob")
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert_eq!(stock_of(&state.store, p.id).await, 0);
        assert_eq!(Order::load_all(&state.store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lookups_report_missing_records() {
        let state = AppState::fake();
        assert!(matches!(
            for_user(&state.store, "ghost").await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            by_id(&state.store, 1).await.unwrap_err(),
            AppError::NotFound(ref m) if m == "Order not found"
        ));
    }
}
