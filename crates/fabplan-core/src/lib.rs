//! fabplan-core -- the production-requirement resolver for factory games.
//!
//! Given a target item and a desired output rate, the resolver expands the
//! demand through the recipe graph and reports the full bill of materials:
//! raw inputs, intermediate production steps, facility counts, byproducts,
//! and power draw needed to sustain that rate indefinitely.
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- Immutable registry of items and recipes
//!   (frozen at load time), with producer/consumer back-references and
//!   facility-type groupings.
//! - [`policy::Policy`] -- Mutable resolution settings: extraction
//!   utilization, facility-tier substitution, and selected recipe per
//!   choice point.
//! - [`requirement::Requirement`] -- Aggregated demand for one resolution
//!   level or a total: material rates, facility counts, byproducts, power.
//! - [`resolver::Resolver`] -- The expansion algorithm: a breadth-first
//!   worklist over demands with a depth guard against recipe cycles.
//!
//! # Example
//!
//! ```rust,ignore
//! let resolver = Resolver::new(&catalog);
//! let result = resolver.resolve(&policy, "Iron Ingot", 60.0)?;
//! for level in &result.levels {
//!     // one row per production depth
//! }
//! let totals = result.totals.last().unwrap();
//! ```

pub mod catalog;
pub mod display;
pub mod id;
pub mod policy;
pub mod requirement;
pub mod resolver;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
