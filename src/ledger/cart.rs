use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product and how many units of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Client-side basket. Never persisted; checkout turns it into orders.
///
/// Lines are kept in insertion order and each product appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(product_id: Uuid, quantity: u32) -> Self {
        let mut cart = Self::new();
        cart.add(product_id, quantity);
        cart
    }

    /// Add units, merging with an existing line for the same product
    pub fn add(&mut self, product_id: Uuid, quantity: u32) {
        match self.lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine { product_id, quantity }),
        }
    }

    /// Setting zero removes the line
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        match self.lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(CartLine { product_id, quantity }),
        }
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

impl FromIterator<CartLine> for Cart {
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        let mut cart = Cart::new();
        for line in iter {
            cart.add(line.product_id, line.quantity);
        }
        cart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_same_product() {
        let ball = Uuid::new_v4();
        let sleeve = Uuid::new_v4();

        let mut cart = Cart::new();
        cart.add(ball, 1);
        cart.add(sleeve, 2);
        cart.add(ball, 2);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0], CartLine { product_id: ball, quantity: 3 });
        assert_eq!(cart.total_units(), 5);
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let ball = Uuid::new_v4();
        let mut cart = Cart::single(ball, 4);

        cart.set_quantity(ball, 1);
        assert_eq!(cart.lines()[0].quantity, 1);

        cart.set_quantity(ball, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_collect_merges_lines() {
        let ball = Uuid::new_v4();
        let cart: Cart = vec![
            CartLine { product_id: ball, quantity: 1 },
            CartLine { product_id: ball, quantity: 1 },
        ]
        .into_iter()
        .collect();

        assert_eq!(cart, Cart::single(ball, 2));
    }
}
