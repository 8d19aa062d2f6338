use crate::cart::repo_types::{Cart, CartItem};
use crate::db::{Collection, RecordStore};
use crate::error::{AppError, AppResult};

impl Cart {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            items: Vec::new(),
        }
    }

    pub async fn load_all(store: &RecordStore) -> anyhow::Result<Vec<Cart>> {
        store.load(Collection::Carts).await
    }

    pub async fn save_all(store: &RecordStore, carts: &[Cart]) -> anyhow::Result<()> {
        store.save(Collection::Carts, carts).await
    }

    pub fn find<'a>(carts: &'a [Cart], username: &str) -> Option<&'a Cart> {
        carts.iter().find(|c| c.username == username)
    }

    pub fn find_mut<'a>(carts: &'a mut [Cart], username: &str) -> Option<&'a mut Cart> {
        carts.iter_mut().find(|c| c.username == username)
    }

    /// The user's cart, appended to `carts` if it does not exist yet.
    pub fn find_or_create<'a>(carts: &'a mut Vec<Cart>, username: &str) -> &'a mut Cart {
        let idx = match carts.iter().position(|c| c.username == username) {
            Some(idx) => idx,
            None => {
                carts.push(Cart::new(username));
                carts.len() - 1
            }
        };
        &mut carts[idx]
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `quantity` to the product's line, creating the line if needed.
    /// The cart is unchanged when the merged quantity would overflow.
    pub fn add(&mut self, product_id: u64, quantity: u32) -> AppResult<()> {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| AppError::invalid("Quantity is too large"))?;
            }
            None => self.items.push(CartItem {
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    /// Returns whether a line was removed.
    pub fn remove(&mut self, product_id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    /// Overwrites the quantity of an existing line; `false` if there is none.
    pub fn set_quantity(&mut self, product_id: u64, quantity: u32) -> bool {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
