//! Top-level view state: the catalog store plus everything the screen derives
//! from it (filters, ordering, the selected row, the edit surface and the last
//! message shown to the user).

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::price::PriceRecord;
use crate::domain::product::{ProductId, ProductRecord};
use crate::errors::{CatalogError, ValidationError};
use crate::projection::{project, FilterSpec, PriceSortField, ProductSortField, SortSpec};
use crate::store::{CatalogBackend, CatalogStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the user about the last action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub detail: Option<String>,
    pub retryable: bool,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into(), detail: None, retryable: false }
    }

    fn from_error(error: &CatalogError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: error.user_message().to_string(),
            detail: Some(error.to_string()),
            retryable: error.is_retryable(),
        }
    }
}

/// The row picked for editing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub product_id: ProductId,
    pub product_name: String,
}

pub struct Session {
    store: CatalogStore,
    pub product_filter: FilterSpec,
    pub price_filter: FilterSpec,
    pub product_sort: SortSpec<ProductSortField>,
    pub price_sort: SortSpec<PriceSortField>,
    selection: Option<Selection>,
    edit_open: bool,
    notice: Option<Notice>,
}

impl Session {
    pub fn new(backend: Arc<dyn CatalogBackend>) -> Self {
        Self {
            store: CatalogStore::new(backend),
            product_filter: FilterSpec::default(),
            price_filter: FilterSpec::default(),
            product_sort: SortSpec::default(),
            price_sort: SortSpec::default(),
            selection: None,
            edit_open: false,
            notice: None,
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_edit_open(&self) -> bool {
        self.edit_open
    }

    pub fn visible_products(&self) -> Vec<&ProductRecord> {
        project(self.store.products(), &self.product_filter, &self.product_sort)
    }

    pub fn visible_prices(&self) -> Vec<&PriceRecord> {
        project(self.store.prices(), &self.price_filter, &self.price_sort)
    }

    pub fn sort_products_by(&mut self, field: ProductSortField) {
        self.product_sort.select(field);
    }

    pub fn sort_prices_by(&mut self, field: PriceSortField) {
        self.price_sort.select(field);
    }

    pub async fn load(&mut self) -> Result<(), CatalogError> {
        let result = self.store.load().await;
        self.record(&result, || Notice::info("Catalog loaded."));
        result
    }

    pub async fn submit_product(
        &mut self,
        name: &str,
        brand: &str,
        weight: &str,
        active: bool,
    ) -> Result<ProductRecord, CatalogError> {
        let result = self.store.create_product(name, brand, weight, active).await;
        self.record(&result, || Notice::info("Product registered."));
        result
    }

    pub async fn submit_price(
        &mut self,
        product_id: &ProductId,
        market: &str,
        price: &str,
    ) -> Result<PriceRecord, CatalogError> {
        let product_name = match self.store.find_product(product_id) {
            Some(product) => product.product_name.clone(),
            None => return self.reject(ValidationError::UnknownProduct(product_id.to_string())),
        };

        let result = self.store.create_price(product_id, &product_name, market, price).await;
        self.record(&result, || Notice::info("Price registered."));
        if result.is_ok() {
            self.close_edit();
        }
        result
    }

    pub async fn delete_product(&mut self, id: &ProductId) -> Result<(), CatalogError> {
        let result = self.store.delete_product(id).await;
        self.record(&result, || Notice::info("Product removed."));
        let deleted_selection =
            self.selection.as_ref().is_some_and(|selected| &selected.product_id == id);
        if result.is_ok() && deleted_selection {
            self.close_edit();
            self.selection = None;
        }
        result
    }

    /// Picks a row of the current price projection and opens the edit surface.
    pub fn select_price(&mut self, row: usize) -> Result<&Selection, ValidationError> {
        let picked = self
            .visible_prices()
            .get(row)
            .map(|price| Selection {
                product_id: price.id.clone(),
                product_name: price.product_rel_name.clone(),
            })
            .ok_or(ValidationError::NoSelection)?;
        Ok(self.open_edit(picked))
    }

    pub fn select_product(&mut self, id: &ProductId) -> Result<&Selection, ValidationError> {
        let picked = self
            .store
            .find_product(id)
            .map(|product| Selection {
                product_id: product.id.clone(),
                product_name: product.product_name.clone(),
            })
            .ok_or_else(|| ValidationError::UnknownProduct(id.to_string()))?;
        Ok(self.open_edit(picked))
    }

    /// Registers a price against the selected product; closes the edit surface on success.
    pub async fn submit_price_for_selection(
        &mut self,
        market: &str,
        price: &str,
    ) -> Result<PriceRecord, CatalogError> {
        let Some(selected) = self.selection.clone() else {
            return self.reject(ValidationError::NoSelection);
        };

        let result = self
            .store
            .create_price(&selected.product_id, &selected.product_name, market, price)
            .await;
        self.record(&result, || Notice::info("Price registered."));
        if result.is_ok() {
            self.close_edit();
        }
        result
    }

    pub fn close_edit(&mut self) {
        self.edit_open = false;
    }

    fn open_edit(&mut self, picked: Selection) -> &Selection {
        debug!(
            event_name = "catalog.session.selected",
            product_id = %picked.product_id,
            "row selected for editing"
        );
        self.edit_open = true;
        self.selection.insert(picked)
    }

    fn reject<T>(&mut self, error: ValidationError) -> Result<T, CatalogError> {
        let error = CatalogError::from(error);
        self.fail(&error);
        Err(error)
    }

    fn record<T>(&mut self, result: &Result<T, CatalogError>, success: impl FnOnce() -> Notice) {
        match result {
            Ok(_) => self.notice = Some(success()),
            Err(error) => self.fail(error),
        }
    }

    fn fail(&mut self, error: &CatalogError) {
        warn!(
            event_name = "catalog.session.action_failed",
            error = %error,
            retryable = error.is_retryable(),
            "catalog action failed"
        );
        self.notice = Some(Notice::from_error(error));
    }
}

/// Cloneable handle that serializes every action on one session.
///
/// The lock is held across the backend call and `tokio::sync::Mutex` wakes
/// waiters in arrival order, so overlapping submissions apply in the order
/// they were issued.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self { inner: Arc::new(Mutex::new(session)) }
    }

    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, Session> {
        self.inner.lock().await
    }

    pub async fn submit_product(
        &self,
        name: &str,
        brand: &str,
        weight: &str,
        active: bool,
    ) -> Result<ProductRecord, CatalogError> {
        self.inner.lock().await.submit_product(name, brand, weight, active).await
    }

    pub async fn submit_price(
        &self,
        product_id: &ProductId,
        market: &str,
        price: &str,
    ) -> Result<PriceRecord, CatalogError> {
        self.inner.lock().await.submit_price(product_id, market, price).await
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogError> {
        self.inner.lock().await.delete_product(id).await
    }

    pub async fn load(&self) -> Result<(), CatalogError> {
        self.inner.lock().await.load().await
    }
}
