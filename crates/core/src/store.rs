use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::price::{NewPrice, PriceRecord};
use crate::domain::product::{NewProduct, ProductId, ProductRecord};
use crate::errors::{CatalogError, TransportError};
use crate::input::{parse_amount, required_text};

/// The REST collaborator behind the catalog.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, TransportError>;
    async fn fetch_prices(&self) -> Result<Vec<PriceRecord>, TransportError>;
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, TransportError>;
    async fn create_price(&self, price: NewPrice) -> Result<PriceRecord, TransportError>;
    async fn delete_product(&self, id: &ProductId) -> Result<(), TransportError>;
}

/// In-memory snapshot of the catalog.
///
/// Mutations take `&mut self` and only touch the snapshot after the backend
/// has answered, so a failed call leaves it exactly as it was.
pub struct CatalogStore {
    backend: Arc<dyn CatalogBackend>,
    products: Vec<ProductRecord>,
    prices: Vec<PriceRecord>,
}

impl CatalogStore {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self { backend, products: Vec::new(), prices: Vec::new() }
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn prices(&self) -> &[PriceRecord] {
        &self.prices
    }

    pub fn find_product(&self, id: &ProductId) -> Option<&ProductRecord> {
        self.products.iter().find(|product| &product.id == id)
    }

    pub async fn load(&mut self) -> Result<(), CatalogError> {
        let products = self.backend.fetch_products().await?;
        let prices = self.backend.fetch_prices().await?;

        info!(
            event_name = "catalog.store.loaded",
            products = products.len(),
            prices = prices.len(),
            "catalog snapshot replaced"
        );
        self.products = products;
        self.prices = prices;
        Ok(())
    }

    pub async fn create_product(
        &mut self,
        name: &str,
        brand: &str,
        weight: &str,
        active: bool,
    ) -> Result<ProductRecord, CatalogError> {
        let body = NewProduct {
            product_name: required_text("productName", name)?,
            brand: required_text("brand", brand)?,
            weight: parse_amount("weight", weight)?,
            status: active,
        };

        let created = self.backend.create_product(body).await?;
        info!(
            event_name = "catalog.store.product_created",
            product_id = %created.id,
            "product appended to catalog"
        );
        self.products.push(created.clone());
        Ok(created)
    }

    /// Registers a price; `Ok` tells the caller to close any open edit surface.
    pub async fn create_price(
        &mut self,
        product_id: &ProductId,
        product_name: &str,
        market: &str,
        price: &str,
    ) -> Result<PriceRecord, CatalogError> {
        let body = NewPrice {
            price: parse_amount("price", price)?,
            market: required_text("market", market)?,
            id: product_id.clone(),
            product_name: product_name.trim().to_string(),
        };

        let created = self.backend.create_price(body).await?;
        info!(
            event_name = "catalog.store.price_created",
            product_id = %created.id,
            market = %created.market,
            "price appended to catalog"
        );
        self.prices.push(created.clone());
        Ok(created)
    }

    /// Removes a product once the backend confirms. Unknown ids are a local no-op.
    pub async fn delete_product(&mut self, id: &ProductId) -> Result<(), CatalogError> {
        if let Err(error) = self.backend.delete_product(id).await {
            warn!(
                event_name = "catalog.store.delete_failed",
                product_id = %id,
                error = %error,
                "backend rejected product deletion; snapshot kept"
            );
            return Err(error.into());
        }

        let before = self.products.len();
        self.products.retain(|product| &product.id != id);
        info!(
            event_name = "catalog.store.product_deleted",
            product_id = %id,
            removed = before - self.products.len(),
            "product removed from catalog"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use super::{CatalogBackend, CatalogStore};
    use crate::domain::price::{NewPrice, PriceRecord};
    use crate::domain::product::{NewProduct, ProductId, ProductRecord};
    use crate::errors::{CatalogError, TransportError, ValidationError};

    /// Backend double that assigns ids in order and records every call.
    #[derive(Default)]
    pub(crate) struct ScriptedBackend {
        pub products: Mutex<Vec<ProductRecord>>,
        pub prices: Mutex<Vec<PriceRecord>>,
        pub calls: Mutex<Vec<String>>,
        pub failures: Mutex<VecDeque<TransportError>>,
        pub delays_ms: Mutex<VecDeque<u64>>,
        pub failing_calls: Mutex<Vec<(String, TransportError)>>,
    }

    impl ScriptedBackend {
        pub fn fail_next(&self, error: TransportError) {
            self.failures.lock().expect("lock").push_back(error);
        }

        /// Fails the first later call whose description starts with `call`.
        pub fn fail_call(&self, call: &str, error: TransportError) {
            self.failing_calls.lock().expect("lock").push((call.to_string(), error));
        }

        pub fn delay_next(&self, millis: u64) {
            self.delays_ms.lock().expect("lock").push_back(millis);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }

        async fn enter(&self, call: String) -> Result<(), TransportError> {
            let scripted = {
                let mut failing = self.failing_calls.lock().expect("lock");
                let position = failing.iter().position(|(prefix, _)| call.starts_with(prefix));
                position.map(|index| failing.remove(index).1)
            };
            self.calls.lock().expect("lock").push(call);
            if let Some(error) = scripted {
                return Err(error);
            }
            let delay = self.delays_ms.lock().expect("lock").pop_front();
            if let Some(millis) = delay {
                tokio::time::sleep(Duration::from_millis(millis)).await;
            }
            match self.failures.lock().expect("lock").pop_front() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }

        fn timestamp(&self, seq: usize) -> String {
            format!("2024-01-01T00:00:{seq:02}Z")
        }
    }

    #[async_trait]
    impl CatalogBackend for ScriptedBackend {
        async fn fetch_products(&self) -> Result<Vec<ProductRecord>, TransportError> {
            self.enter("GET /products".to_string()).await?;
            Ok(self.products.lock().expect("lock").clone())
        }

        async fn fetch_prices(&self) -> Result<Vec<PriceRecord>, TransportError> {
            self.enter("GET /prices".to_string()).await?;
            Ok(self.prices.lock().expect("lock").clone())
        }

        async fn create_product(
            &self,
            product: NewProduct,
        ) -> Result<ProductRecord, TransportError> {
            self.enter(format!("POST /product {}", product.product_name)).await?;
            let mut products = self.products.lock().expect("lock");
            let seq = products.len() + 1;
            let record = ProductRecord {
                id: ProductId(format!("p-{seq}")),
                product_name: product.product_name,
                brand: product.brand,
                weight: product.weight,
                status: product.status,
                created_at: self.timestamp(seq),
            };
            products.push(record.clone());
            Ok(record)
        }

        async fn create_price(&self, price: NewPrice) -> Result<PriceRecord, TransportError> {
            self.enter(format!("POST /price {}", price.market)).await?;
            let mut prices = self.prices.lock().expect("lock");
            let brand = self
                .products
                .lock()
                .expect("lock")
                .iter()
                .find(|product| product.id == price.id)
                .map(|product| product.brand.clone())
                .unwrap_or_default();
            let record = PriceRecord {
                id: price.id,
                market: price.market,
                price: price.price,
                created_at: self.timestamp(prices.len() + 1),
                product_rel_name: price.product_name,
                brand_rel_name: brand,
            };
            prices.push(record.clone());
            Ok(record)
        }

        async fn delete_product(&self, id: &ProductId) -> Result<(), TransportError> {
            self.enter(format!("DELETE /product {id}")).await?;
            self.products.lock().expect("lock").retain(|product| &product.id != id);
            Ok(())
        }
    }

    fn store() -> (Arc<ScriptedBackend>, CatalogStore) {
        let backend = Arc::new(ScriptedBackend::default());
        (backend.clone(), CatalogStore::new(backend))
    }

    fn offline() -> TransportError {
        TransportError::Request { path: "/products".to_string(), message: "offline".to_string() }
    }

    #[tokio::test]
    async fn load_replaces_snapshot_wholesale_and_is_repeatable() {
        let (backend, mut store) = store();
        backend.create_product(sample("Milk")).await.expect("seed");

        store.load().await.expect("first load");
        store.load().await.expect("second load");

        assert_eq!(store.products().len(), 1);
        assert!(store.prices().is_empty());
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_snapshot() {
        let (backend, mut store) = store();
        backend.create_product(sample("Milk")).await.expect("seed");
        store.load().await.expect("load");
        backend.create_product(sample("Rice")).await.expect("seed");

        backend.fail_next(offline());
        let error = store.load().await.expect_err("load should fail");

        assert!(matches!(error, CatalogError::Transport(_)));
        assert_eq!(store.products().len(), 1);
    }

    #[tokio::test]
    async fn load_with_failed_price_fetch_keeps_both_collections() {
        let (backend, mut store) = store();
        let milk = backend.create_product(sample("Milk")).await.expect("seed");
        backend
            .create_price(NewPrice {
                price: Decimal::new(499, 2),
                market: "Avenida".to_string(),
                id: milk.id.clone(),
                product_name: "Milk".to_string(),
            })
            .await
            .expect("seed");
        store.load().await.expect("load");
        let products_before = store.products().to_vec();
        let prices_before = store.prices().to_vec();

        backend.create_product(sample("Rice")).await.expect("seed");
        backend.prices.lock().expect("lock").clear();
        backend.fail_call("GET /prices", TransportError::Timeout { path: "/prices".to_string() });
        let error = store.load().await.expect_err("price fetch should fail");

        assert_eq!(
            error,
            CatalogError::Transport(TransportError::Timeout { path: "/prices".to_string() })
        );
        let calls = backend.calls();
        assert_eq!(calls[calls.len() - 2..], ["GET /products", "GET /prices"]);
        assert_eq!(store.products(), products_before.as_slice());
        assert_eq!(store.prices(), prices_before.as_slice());
    }

    #[tokio::test]
    async fn create_product_appends_canonical_record() {
        let (_backend, mut store) = store();

        let created = store.create_product(" Milk ", "Acme", "1,0", true).await.expect("create");

        assert_eq!(store.products().len(), 1);
        assert_eq!(created.id, ProductId("p-1".to_string()));
        assert_eq!(created.product_name, "Milk");
        assert_eq!(created.brand, "Acme");
        assert_eq!(created.weight, Decimal::new(10, 1));
        assert!(created.status);
        assert_eq!(store.products()[0], created);
    }

    #[tokio::test]
    async fn create_product_with_empty_name_never_calls_backend() {
        let (backend, mut store) = store();

        let error = store.create_product("   ", "Acme", "1", true).await.expect_err("invalid");

        assert_eq!(
            error,
            CatalogError::Validation(ValidationError::EmptyField { field: "productName" })
        );
        assert!(backend.calls().is_empty());
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn create_product_rejects_unparseable_weight() {
        let (backend, mut store) = store();

        let error = store.create_product("Milk", "Acme", "heavy", true).await.expect_err("invalid");

        assert!(matches!(
            error,
            CatalogError::Validation(ValidationError::InvalidNumber { field: "weight", .. })
        ));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn create_product_transport_failure_leaves_store_unchanged() {
        let (backend, mut store) = store();
        backend.fail_next(offline());

        let error = store.create_product("Milk", "Acme", "1", true).await.expect_err("fail");

        assert!(error.is_retryable());
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn create_price_normalizes_separator_and_appends() {
        let (_backend, mut store) = store();
        let product_id = store.create_product("Milk", "Acme", "1", true).await.expect("create").id;

        let price =
            store.create_price(&product_id, "Milk", "Atacadão", "4,99").await.expect("price");

        assert_eq!(price.price, Decimal::new(499, 2));
        assert_eq!(price.market, "Atacadão");
        assert_eq!(price.brand_rel_name, "Acme");
        assert_eq!(store.prices(), &[price]);
    }

    #[tokio::test]
    async fn create_price_transport_failure_leaves_prices_unchanged() {
        let (backend, mut store) = store();
        let product_id = store.create_product("Milk", "Acme", "1", true).await.expect("create").id;
        store.create_price(&product_id, "Milk", "Avenida", "5").await.expect("price");
        let prices_before = store.prices().to_vec();

        backend.fail_call("POST /price", offline());
        let error = store
            .create_price(&product_id, "Milk", "Atacadão", "4,99")
            .await
            .expect_err("create should fail");

        assert!(error.is_retryable());
        assert_eq!(store.prices(), prices_before.as_slice());
        assert_eq!(backend.calls().last().map(String::as_str), Some("POST /price Atacadão"));
    }

    #[tokio::test]
    async fn create_price_requires_market() {
        let (backend, mut store) = store();

        let error = store
            .create_price(&ProductId("p-1".to_string()), "Milk", "", "4,99")
            .await
            .expect_err("invalid");

        assert_eq!(error, CatalogError::Validation(ValidationError::EmptyField { field: "market" }));
        assert!(backend.calls().is_empty());
        assert!(store.prices().is_empty());
    }

    #[tokio::test]
    async fn delete_product_removes_after_confirmation() {
        let (_backend, mut store) = store();
        let id = store.create_product("Milk", "Acme", "1", true).await.expect("create").id;
        store.create_product("Rice", "Acme", "5", true).await.expect("create");

        store.delete_product(&id).await.expect("delete");

        assert_eq!(store.products().len(), 1);
        assert!(store.find_product(&id).is_none());
    }

    #[tokio::test]
    async fn delete_unknown_product_is_a_no_op() {
        let (_backend, mut store) = store();
        store.create_product("Milk", "Acme", "1", true).await.expect("create");
        let before = store.products().to_vec();

        store.delete_product(&ProductId("missing".to_string())).await.expect("no error");

        assert_eq!(store.products(), before.as_slice());
    }

    #[tokio::test]
    async fn delete_failure_is_reported_and_snapshot_kept() {
        let (backend, mut store) = store();
        let id = store.create_product("Milk", "Acme", "1", true).await.expect("create").id;
        backend.fail_next(TransportError::Status { path: "/product".to_string(), status: 500 });

        let error = store.delete_product(&id).await.expect_err("delete should fail");

        assert!(matches!(error, CatalogError::Transport(TransportError::Status { status: 500, .. })));
        assert!(store.find_product(&id).is_some());
    }

    fn sample(name: &str) -> NewProduct {
        NewProduct {
            product_name: name.to_string(),
            brand: "Acme".to_string(),
            weight: Decimal::ONE,
            status: true,
        }
    }
}
