//! Serde structs for the on-disk catalog format.
//!
//! Data files reference items by name; the loader resolves those names to
//! ids when it builds the catalog. Numeric attributes mirror the optional
//! fields of [`fabplan_core::catalog::Item`] one to one.

use fabplan_core::catalog::{Category, FacilityType, Item, PowerProfile, ThroughputProfile};
use serde::Deserialize;

// ===========================================================================
// Items
// ===========================================================================

/// An item definition in a data file. Everything except the name has a
/// sensible default, so plain goods can be written as `(name: "Iron Ore")`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default)]
    pub facility_type: Option<FacilityType>,

    // Power attributes, kilowatts.
    #[serde(default)]
    pub work_consumption: Option<f64>,
    #[serde(default)]
    pub idle_consumption: Option<f64>,
    #[serde(default)]
    pub generation: Option<f64>,
    #[serde(default)]
    pub input_power: Option<f64>,
    #[serde(default)]
    pub output_power: Option<f64>,
    #[serde(default)]
    pub basic_generation: Option<f64>,
    #[serde(default)]
    pub max_charging_power: Option<f64>,

    // Throughput attributes.
    #[serde(default)]
    pub production_speed: Option<f64>,
    #[serde(default)]
    pub transport_speed: Option<f64>,
    #[serde(default)]
    pub collection_speed: Option<f64>,
    #[serde(default)]
    pub cycle_speed: Option<f64>,
}

fn default_category() -> Category {
    Category::Component
}

impl ItemData {
    /// Convert into a catalog item. Exclusion flags are applied separately
    /// from the exclusion file, not from item definitions.
    pub fn into_item(self) -> Item {
        let mut item = Item::new(&self.name, self.category);
        item.icon = self.icon;
        item.facility_type = self.facility_type;
        item.power = PowerProfile {
            work_consumption: self.work_consumption,
            idle_consumption: self.idle_consumption,
            generation: self.generation,
            input_power: self.input_power,
            output_power: self.output_power,
            basic_generation: self.basic_generation,
            max_charging_power: self.max_charging_power,
        };
        item.throughput = ThroughputProfile {
            production_speed: self.production_speed,
            transport_speed: self.transport_speed,
            collection_speed: self.collection_speed,
            cycle_speed: self.cycle_speed,
        };
        item
    }
}

// ===========================================================================
// Recipes
// ===========================================================================

/// A recipe definition in a data file. Items are referenced by name.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    /// (product name, quantity per cycle) pairs.
    pub products: Vec<(String, f64)>,
    #[serde(default)]
    pub materials: Vec<(String, f64)>,
    /// Cycle time in seconds. Omitted for relations that never expand.
    #[serde(default)]
    pub time: Option<f64>,
    pub facility: String,
    #[serde(default)]
    pub recipe_of: Option<String>,
}

// ===========================================================================
// Exclusions
// ===========================================================================

/// The optional exclusion file: items never expanded by the resolver and
/// facilities whose recipes count as native (unexpandable, unsubstitutable).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeData {
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub origin_facilities: Vec<String>,
}
