use crate::db::{Collection, RecordStore};
use crate::orders::repo_types::Order;

// Append-only ledger: no update or delete.
impl Order {
    pub async fn load_all(store: &RecordStore) -> anyhow::Result<Vec<Order>> {
        store.load(Collection::Orders).await
    }

    /// Appends to the ledger. Callers must hold the orders lock.
    pub async fn append(store: &RecordStore, order: &Order) -> anyhow::Result<()> {
        let mut orders = Self::load_all(store).await?;
        orders.push(order.clone());
        store.save(Collection::Orders, &orders).await
    }

    /// Next order id. Callers must hold the orders and sequences locks.
    pub async fn next_id(store: &RecordStore) -> anyhow::Result<u64> {
        let orders = Self::load_all(store).await?;
        let current_max = orders.iter().map(|o| o.order_id).max().unwrap_or(0);
        store.next_id(Collection::Orders, current_max).await
    }

    /// Orders placed by `username`, in ledger order.
    pub fn by_user(orders: &[Order], username: &str) -> Vec<Order> {
        orders
            .iter()
            .filter(|o| o.username == username)
            .cloned()
            .collect()
    }

    pub fn by_id(orders: &[Order], order_id: u64) -> Option<&Order> {
        orders.iter().find(|o| o.order_id == order_id)
    }
}
