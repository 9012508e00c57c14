// Catalog adapters: CSV files validated once into typed records.

pub mod parts;
pub mod titles;

pub use parts::Catalog;
pub use titles::{normalize_title, TitleIndex};
