use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// One price observation for a product at a market.
///
/// `id` references the product; several records may share it (price history
/// per market). `product_rel_name` and `brand_rel_name` are copied from the
/// product when the backend stores the price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: ProductId,
    pub market: String,
    pub price: Decimal,
    pub created_at: String,
    #[serde(rename = "productRelName", default)]
    pub product_rel_name: String,
    #[serde(rename = "brandRelName", default)]
    pub brand_rel_name: String,
}

/// Body of `POST /price`. Field order matches the wire contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrice {
    pub price: Decimal,
    pub market: String,
    pub id: ProductId,
    #[serde(rename = "productName")]
    pub product_name: String,
}
