//! `CatalogBackend` over the catalog REST API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use pricebook_core::config::BackendConfig;
use pricebook_core::{
    CatalogBackend, NewPrice, NewProduct, PriceRecord, ProductId, ProductRecord, TransportError,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const PRODUCTS_PATH: &str = "/products";
const PRICES_PATH: &str = "/prices";
const PRODUCT_PATH: &str = "/product";
const PRICE_PATH: &str = "/price";

#[derive(Clone, Debug)]
pub struct HttpCatalogBackend {
    base_url: String,
    client: Client,
}

impl HttpCatalogBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build().map_err(|error| {
            TransportError::Request { path: base_url.clone(), message: error.to_string() }
        })?;
        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, TransportError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{path}", self.base_url))
    }

    async fn send(
        &self,
        path: &'static str,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, TransportError> {
        let started = Instant::now();
        let response = request.send().await.map_err(|error| transport_error(path, &error))?;
        let status = response.status();

        debug!(
            event_name = "backend.http.request",
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog backend answered"
        );

        if !status.is_success() {
            warn!(
                event_name = "backend.http.rejected",
                path,
                status = status.as_u16(),
                "catalog backend returned an error status"
            );
            return Err(TransportError::Status { path: path.to_string(), status: status.as_u16() });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        path: &'static str,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = self.send(path, request).await?;
        response.json::<T>().await.map_err(|error| TransportError::Decode {
            path: path.to_string(),
            message: error.to_string(),
        })
    }
}

fn transport_error(path: &str, error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout { path: path.to_string() }
    } else {
        TransportError::Request { path: path.to_string(), message: error.to_string() }
    }
}

#[async_trait]
impl CatalogBackend for HttpCatalogBackend {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, TransportError> {
        self.send_json(PRODUCTS_PATH, self.request(Method::GET, PRODUCTS_PATH)).await
    }

    async fn fetch_prices(&self) -> Result<Vec<PriceRecord>, TransportError> {
        self.send_json(PRICES_PATH, self.request(Method::GET, PRICES_PATH)).await
    }

    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, TransportError> {
        self.send_json(PRODUCT_PATH, self.request(Method::POST, PRODUCT_PATH).json(&product)).await
    }

    async fn create_price(&self, price: NewPrice) -> Result<PriceRecord, TransportError> {
        self.send_json(PRICE_PATH, self.request(Method::POST, PRICE_PATH).json(&price)).await
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), TransportError> {
        let request = self.request(Method::DELETE, PRODUCT_PATH).query(&[("id", id.as_str())]);
        self.send(PRODUCT_PATH, request).await.map(|_| ())
    }
}
