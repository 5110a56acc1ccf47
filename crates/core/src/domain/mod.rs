pub mod price;
pub mod product;
pub mod timestamp;
