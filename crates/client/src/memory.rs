use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use pricebook_core::{
    CatalogBackend, NewPrice, NewProduct, PriceRecord, ProductId, ProductRecord, TransportError,
};

/// Backend that keeps the catalog in process memory, assigning ids and
/// timestamps the way the REST service does.
#[derive(Default)]
pub struct InMemoryCatalogBackend {
    products: RwLock<Vec<ProductRecord>>,
    prices: RwLock<Vec<PriceRecord>>,
}

impl InMemoryCatalogBackend {
    pub fn with_records(products: Vec<ProductRecord>, prices: Vec<PriceRecord>) -> Self {
        Self { products: RwLock::new(products), prices: RwLock::new(prices) }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl CatalogBackend for InMemoryCatalogBackend {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, TransportError> {
        Ok(self.products.read().await.clone())
    }

    async fn fetch_prices(&self) -> Result<Vec<PriceRecord>, TransportError> {
        Ok(self.prices.read().await.clone())
    }

    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, TransportError> {
        let record = ProductRecord {
            id: ProductId(Uuid::new_v4().to_string()),
            product_name: product.product_name,
            brand: product.brand,
            weight: product.weight,
            status: product.status,
            created_at: now(),
        };
        self.products.write().await.push(record.clone());
        Ok(record)
    }

    async fn create_price(&self, price: NewPrice) -> Result<PriceRecord, TransportError> {
        let brand = self
            .products
            .read()
            .await
            .iter()
            .find(|product| product.id == price.id)
            .map(|product| product.brand.clone())
            .unwrap_or_default();

        let record = PriceRecord {
            id: price.id,
            market: price.market,
            price: price.price,
            created_at: now(),
            product_rel_name: price.product_name,
            brand_rel_name: brand,
        };
        self.prices.write().await.push(record.clone());
        Ok(record)
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), TransportError> {
        self.products.write().await.retain(|product| &product.id != id);
        Ok(())
    }
}
