use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product as the backend returns it from `GET /products` and `POST /product`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    #[serde(rename = "productName")]
    pub product_name: String,
    pub brand: String,
    pub weight: Decimal,
    pub status: bool,
    pub created_at: String,
}

/// Body of `POST /product`. Field order matches the wire contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(rename = "productName")]
    pub product_name: String,
    pub brand: String,
    pub weight: Decimal,
    pub status: bool,
}
