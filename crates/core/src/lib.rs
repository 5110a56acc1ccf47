pub mod config;
pub mod domain;
pub mod errors;
pub mod input;
pub mod markets;
pub mod projection;
pub mod session;
pub mod store;

pub use domain::price::{NewPrice, PriceRecord};
pub use domain::product::{NewProduct, ProductId, ProductRecord};
pub use errors::{CatalogError, TransportError, ValidationError};
pub use markets::known_markets;
pub use projection::{
    project, FilterSpec, PriceSortField, ProductSortField, Projectable, SortDirection, SortSpec,
};
pub use session::{Notice, NoticeLevel, Selection, Session, SharedSession};
pub use store::{CatalogBackend, CatalogStore};
