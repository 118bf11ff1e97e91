//! Cart and favorites collections.
//!
//! Both are insertion-ordered lists keyed by product id, with at most one
//! entry per id. They store copies of the product as it was when the shopper
//! acted on it; later catalog reloads do not touch them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId};

/// A cart line: product snapshot plus quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product`, appending a new line when needed.
    pub fn add(&mut self, product: &Product) {
        match self.lines.iter_mut().find(|line| line.id() == &product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                product: product.clone(),
                quantity: 1,
            }),
        }
    }

    /// Drop the line for `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id() != id);
        self.lines.len() != before
    }

    /// Set the quantity of an existing line.
    ///
    /// Does nothing when there is no line for `id`. A quantity of zero or
    /// less removes the line.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|line| line.id() == id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// The total in the store currency.
    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::brl(self.total())
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// A favorited product snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteEntry {
    pub product: Product,
}

/// The favorites list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    entries: Vec<FavoriteEntry>,
}

impl Favorites {
    #[must_use]
    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&FavoriteEntry> {
        self.entries.iter().find(|entry| &entry.product.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove the entry for `product` if present, otherwise append a
    /// snapshot of it. Returns whether the product is now a favorite.
    pub fn toggle(&mut self, product: &Product) -> bool {
        if self.remove(&product.id) {
            return false;
        }
        self.entries.push(FavoriteEntry {
            product: product.clone(),
        });
        true
    }

    /// Drop the entry for `id`. Returns whether an entry was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| &entry.product.id != id);
        self.entries.len() != before
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::CategoryId;

    fn product(id: &str, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            category_id: CategoryId::new("pel"),
            name: format!("Produto {id}"),
            description: String::new(),
            price,
            image_url: String::new(),
            available: true,
        }
    }

    #[test]
    fn test_add_same_product_twice() {
        let urso = product("1", Decimal::new(1050, 2));
        let mut cart = Cart::default();

        cart.add(&urso);
        cart.add(&urso);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total(), urso.price * Decimal::from(2));
        assert_eq!(cart.total_price().display(), "R$ 21,00");
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::default();
        cart.add(&product("b", Decimal::ONE));
        cart.add(&product("a", Decimal::ONE));
        cart.add(&product("b", Decimal::ONE));

        let ids: Vec<_> = cart.lines().iter().map(|l| l.id().as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::default();
        cart.add(&product("1", Decimal::ONE));

        assert!(!cart.remove(&ProductId::new("404")));
        assert!(cart.remove(&ProductId::new("1")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_is_absolute() {
        let mut cart = Cart::default();
        cart.add(&product("1", Decimal::ONE));

        cart.set_quantity(&ProductId::new("1"), 7);
        assert_eq!(cart.line(&ProductId::new("1")).unwrap().quantity, 7);
    }

    #[test]
    fn test_set_quantity_floor_removes_line() {
        for quantity in [0, -5] {
            let mut cart = Cart::default();
            cart.add(&product("1", Decimal::ONE));
            cart.set_quantity(&ProductId::new("1"), quantity);
            assert!(cart.is_empty(), "quantity {quantity} should remove the line");
        }
    }

    #[test]
    fn test_set_quantity_missing_line_is_noop() {
        let mut cart = Cart::default();
        cart.add(&product("1", Decimal::ONE));
        let before = cart.clone();

        cart.set_quantity(&ProductId::new("2"), 3);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_total_of_empty_cart() {
        assert_eq!(Cart::default().total(), Decimal::ZERO);
    }

    #[test]
    fn test_toggle_favorite_twice_restores() {
        let mut favorites = Favorites::default();
        favorites.toggle(&product("9", Decimal::ONE));
        let original = favorites.clone();
        let urso = product("1", Decimal::TEN);

        assert!(favorites.toggle(&urso));
        assert!(favorites.contains(&urso.id));
        assert!(!favorites.toggle(&urso));
        assert_eq!(favorites, original);
    }

    #[test]
    fn test_favorite_is_a_snapshot() {
        let mut favorites = Favorites::default();
        let mut urso = product("1", Decimal::TEN);
        favorites.toggle(&urso);

        urso.price = Decimal::ONE;
        assert_eq!(favorites.get(&urso.id).unwrap().product.price, Decimal::TEN);
    }

    #[test]
    fn test_cart_line_serializes_flat() {
        let mut cart = Cart::default();
        cart.add(&product("1", Decimal::new(1050, 2)));

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json[0]["id"], "1");
        assert_eq!(json[0]["quantity"], 1);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
