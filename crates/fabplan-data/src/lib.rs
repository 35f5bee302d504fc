//! Data file loading for fabplan.
//!
//! Items, recipes, and exclusion lists live in RON, JSON, or TOML files;
//! the loader deserializes them, resolves name references to catalog ids,
//! and produces a frozen [`fabplan_core::catalog::Catalog`].

pub mod loader;
pub mod schema;

pub use loader::{load_catalog, DataLoadError};
