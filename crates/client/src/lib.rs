pub mod http;
pub mod memory;

pub use http::HttpCatalogBackend;
pub use memory::InMemoryCatalogBackend;
