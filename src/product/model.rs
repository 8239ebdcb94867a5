use crate::persistence::Document;
use serde::{Deserialize, Serialize};

/// A stored product
///
/// `id` is the document identifier. An empty `id` means "not assigned yet";
/// [`ProductService::create`](super::ProductService::create) fills it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl Product {
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// The mutable part of this product
    pub fn changes(&self) -> ProductChanges {
        ProductChanges {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
        }
    }
}

impl Document for Product {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields an update may overwrite. The identifier is not one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductChanges {
    pub name: String,
    pub description: String,
    pub price: f64,
}
