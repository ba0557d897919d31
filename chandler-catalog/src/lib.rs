pub mod product;
pub mod repository;

pub use product::{Product, SupplierProduct};
pub use repository::CatalogRepository;
