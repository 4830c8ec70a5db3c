//! The four storefront collections

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use std::fmt;

/// Collection name for customer accounts
pub const USER_COLLECTION: &str = "users";
/// Collection name for products
pub const PRODUCT_COLLECTION: &str = "products";
/// Collection name for cart items
pub const CART_COLLECTION: &str = "carts";
/// Collection name for completed orders
pub const ORDER_COLLECTION: &str = "orders";

/// A storefront collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Products,
    Carts,
    Orders,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Products,
        Collection::Carts,
        Collection::Orders,
    ];

    /// Name of the collection in the database
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => USER_COLLECTION,
            Collection::Products => PRODUCT_COLLECTION,
            Collection::Carts => CART_COLLECTION,
            Collection::Orders => ORDER_COLLECTION,
        }
    }

    /// Lookup indexes created at startup. None of them are unique.
    pub fn indexes(&self) -> Vec<(Document, Option<IndexOptions>)> {
        let email = (
            doc! { "email": 1 },
            Some(
                IndexOptions::builder()
                    .name("email_index".to_string())
                    .build(),
            ),
        );
        let date = (
            doc! { "date": -1 },
            Some(
                IndexOptions::builder()
                    .name("date_desc_index".to_string())
                    .build(),
            ),
        );

        match self {
            Collection::Users => vec![email, date],
            Collection::Products => vec![],
            Collection::Carts => vec![email],
            Collection::Orders => vec![email, date],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        let names: Vec<&str> = Collection::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["users", "products", "carts", "orders"]);
    }

    #[test]
    fn test_index_keys() {
        let keys: Vec<Document> = Collection::Orders
            .indexes()
            .into_iter()
            .map(|(keys, _)| keys)
            .collect();
        assert_eq!(keys, vec![doc! { "email": 1 }, doc! { "date": -1 }]);
        assert!(Collection::Products.indexes().is_empty());
    }
}
