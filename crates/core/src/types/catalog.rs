//! Catalog entities decoded from the spreadsheet exports.
//!
//! Headers are matched in Portuguese first (the shop's spreadsheet) and in
//! English as a fallback:
//!
//! | Field | Columns |
//! |---|---|
//! | id | `id` |
//! | category | `categoria_id`, `category_id` |
//! | name | `nome`, `name` |
//! | description | `descricao`, `description` |
//! | price | `preco`, `price` |
//! | image | `imagem_url`, `image_url`, `image` |
//! | availability | `disponivel`, `available` |
//! | icon | `icone`, `icon` |

use std::collections::HashMap;
use std::hash::Hash;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::csv::{PRICE_COLUMNS, Record};
use crate::types::{CategoryId, Price, ProductId};

const ID: &[&str] = &["id"];
const CATEGORY_ID: &[&str] = &["categoria_id", "category_id"];
const NAME: &[&str] = &["nome", "name"];
const DESCRIPTION: &[&str] = &["descricao", "description"];
const IMAGE: &[&str] = &["imagem_url", "image_url", "image"];
const AVAILABLE: &[&str] = &["disponivel", "available"];
const ICON: &[&str] = &["icone", "icon"];

/// Cell values that mark a product as available.
const TRUTHY: &[&str] = &["sim", "s", "true", "1", "yes", "y", "x"];

/// A product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Decimal,
    /// Raw image reference as typed in the sheet.
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

impl Product {
    /// Build a product from a decoded row.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.text(ID).into(),
            category_id: record.text(CATEGORY_ID).into(),
            name: record.text(NAME),
            description: record.text(DESCRIPTION),
            price: record.number(PRICE_COLUMNS),
            image_url: record.text(IMAGE),
            available: parse_available(&record.text(AVAILABLE)),
        }
    }

    /// The price in the store currency.
    #[must_use]
    pub fn price(&self) -> Price {
        Price::brl(self.price)
    }
}

/// Empty means available; otherwise only the usual "yes" spellings count.
fn parse_available(raw: &str) -> bool {
    let value = raw.trim().to_lowercase();
    value.is_empty() || TRUTHY.contains(&value.as_str())
}

/// A category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Emoji shown before the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Category {
    /// Build a category from a decoded row.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        let icon = record.text(ICON);
        Self {
            id: record.text(ID).into(),
            name: record.text(NAME),
            icon: (!icon.is_empty()).then_some(icon),
        }
    }

    /// Button label, icon first when present.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.icon {
            Some(icon) => format!("{icon} {}", self.name),
            None => self.name.clone(),
        }
    }
}

/// The in-memory catalog: every product and category of the last load.
///
/// A catalog is immutable; reloading builds a new one and swaps it in whole.
/// Ids are unique within each collection: when rows repeat an id, the last
/// row wins and keeps its own position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog, resolving duplicate ids last-write-wins.
    #[must_use]
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            products: last_write_wins(products, |p| &p.id),
            categories: last_write_wins(categories, |c| &c.id),
        }
    }

    /// Build a catalog from decoded product and category rows.
    #[must_use]
    pub fn from_records(products: &[Record], categories: &[Record]) -> Self {
        Self::new(
            products.iter().map(Product::from_record).collect(),
            categories.iter().map(Category::from_record).collect(),
        )
    }

    /// Replace the products, keeping the categories.
    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        Self::new(products, self.categories)
    }

    /// Replace the categories, keeping the products.
    #[must_use]
    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        Self::new(self.products, categories)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Look up a category by id.
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Products in a category, or all of them when `category` is `None`.
    pub fn products_in<'a>(
        &'a self,
        category: Option<&'a CategoryId>,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        self.products
            .iter()
            .filter(move |p| category.is_none_or(|id| &p.category_id == id))
    }

    /// Whether both collections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty()
    }
}

fn last_write_wins<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> &K,
{
    let last_index: HashMap<&K, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (key(item), i))
        .collect();
    let keep: Vec<bool> = items
        .iter()
        .enumerate()
        .map(|(i, item)| last_index.get(key(item)) == Some(&i))
        .collect();

    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::csv::decode;

    const PRODUCTS: &str = "\
id,categoria_id,nome,descricao,preco,imagem_url,disponivel
1,pel,Urso,\"Macio, marrom\",\"10,50\",https://x.test/u.png,sim
2,pel,Coelho,,abc,,não
3,cha,Chaveiro,Metal,\"5,00\",,
";

    const CATEGORIES: &str = "id,nome,icone\npel,Pelúcias,🧸\ncha,Chaveiros,";

    fn catalog() -> Catalog {
        Catalog::from_records(&decode(PRODUCTS), &decode(CATEGORIES))
    }

    #[test]
    fn test_product_from_record() {
        let catalog = catalog();
        let urso = catalog.product(&ProductId::new("1")).unwrap();

        assert_eq!(urso.category_id.as_str(), "pel");
        assert_eq!(urso.name, "Urso");
        assert_eq!(urso.description, "Macio, marrom");
        assert_eq!(urso.price, Decimal::new(1050, 2));
        assert_eq!(urso.image_url, "https://x.test/u.png");
        assert!(urso.available);
    }

    #[test]
    fn test_availability_and_bad_price() {
        let catalog = catalog();
        let coelho = catalog.product(&ProductId::new("2")).unwrap();
        assert!(!coelho.available);
        assert_eq!(coelho.price, Decimal::ZERO);

        let chaveiro = catalog.product(&ProductId::new("3")).unwrap();
        assert!(chaveiro.available);
    }

    #[test]
    fn test_category_icon_and_label() {
        let catalog = catalog();
        let pel = catalog.category(&CategoryId::new("pel")).unwrap();
        assert_eq!(pel.label(), "🧸 Pelúcias");

        let cha = catalog.category(&CategoryId::new("cha")).unwrap();
        assert_eq!(cha.icon, None);
        assert_eq!(cha.label(), "Chaveiros");
    }

    #[test]
    fn test_english_headers() {
        let records = decode("id,category_id,name,price,image\n9,toys,Bear,\"1,25\",http://a/b.png");
        let product = Product::from_record(&records[0]);

        assert_eq!(product.name, "Bear");
        assert_eq!(product.category_id.as_str(), "toys");
        assert_eq!(product.price, Decimal::new(125, 2));
        assert_eq!(product.image_url, "http://a/b.png");
    }

    #[test]
    fn test_products_in_category() {
        let catalog = catalog();
        let pel = CategoryId::new("pel");

        assert_eq!(catalog.products_in(None).count(), 3);
        let names: Vec<_> = catalog.products_in(Some(&pel)).map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Urso", "Coelho"]);
        assert_eq!(catalog.products_in(Some(&CategoryId::new("zzz"))).count(), 0);
    }

    #[test]
    fn test_duplicate_ids_last_write_wins() {
        let records = decode("id,nome\n1,Velho\n2,Outro\n1,Novo");
        let catalog = Catalog::from_records(&records, &[]);

        assert_eq!(catalog.products().len(), 2);
        assert_eq!(catalog.products()[0].name, "Outro");
        assert_eq!(catalog.products()[1].name, "Novo");
        assert_eq!(catalog.product(&ProductId::new("1")).unwrap().name, "Novo");
    }

    #[test]
    fn test_product_json_round_trip() {
        let catalog = catalog();
        let json = serde_json::to_string(catalog.products()).unwrap();
        let back: Vec<Product> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog.products());
    }

    #[test]
    fn test_with_products_keeps_categories() {
        let catalog = catalog().with_products(Vec::new());
        assert!(catalog.products().is_empty());
        assert_eq!(catalog.categories().len(), 2);
        assert!(!catalog.is_empty());
    }
}
