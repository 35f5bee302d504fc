//! Static registry of items and recipes, built once from loaded game data.
//!
//! Follows a builder/frozen split: [`CatalogBuilder`] collects item and
//! recipe definitions in load order, validates cross-references, and
//! produces an immutable [`Catalog`]. The catalog additionally maintains
//! the back-reference indices the resolver and UI need: recipes producing
//! an item, recipes consuming an item, items grouped by facility type, and
//! the set of choice points (items producible by more than one recipe).

use crate::id::{ItemId, RecipeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Item model
// ---------------------------------------------------------------------------

/// Which table of the catalog an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Craftable/raw goods.
    Component,
    /// Buildings, including production facilities.
    Facility,
    /// Everything else (science matrices, upgrades, ...).
    Other,
}

/// Facility grouping tag. Substitution settings and the special-case
/// facility formulas key off this tag, never off concrete item names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacilityType {
    Assembler,
    Miner,
    Smelter,
    Pump,
    OilExtractor,
    Chemical,
    Refinery,
    Fractionator,
    Collider,
    Research,
}

/// How the resolver computes facility counts for a recipe run by a
/// facility of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacilityClass {
    /// Discrete extractor placement across resource veins (ore miners).
    Extraction,
    /// Continuous count, but throughput scales with extraction utilization.
    Pumping,
    /// Continuous count; eligible for tier substitution.
    Production,
}

impl FacilityType {
    /// Classify this facility type for the resolver's count formulas.
    pub fn class(self) -> FacilityClass {
        match self {
            FacilityType::Miner => FacilityClass::Extraction,
            FacilityType::Pump => FacilityClass::Pumping,
            _ => FacilityClass::Production,
        }
    }
}

/// Power attributes of an item, in kilowatts. All optional; most items
/// have none, facilities have a few.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerProfile {
    pub work_consumption: Option<f64>,
    pub idle_consumption: Option<f64>,
    pub generation: Option<f64>,
    pub input_power: Option<f64>,
    pub output_power: Option<f64>,
    pub basic_generation: Option<f64>,
    pub max_charging_power: Option<f64>,
}

/// Throughput attributes of an item. `production_speed` is the tier
/// multiplier used by facility substitution (1.0 = nominal speed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputProfile {
    pub production_speed: Option<f64>,
    pub transport_speed: Option<f64>,
    pub collection_speed: Option<f64>,
    pub cycle_speed: Option<f64>,
}

/// A catalog entry: raw resource, intermediate component, or facility.
/// Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique name; identity within the catalog.
    pub name: String,
    /// Opaque icon reference for the display layer.
    pub icon: String,
    pub category: Category,
    /// Set for facilities that run recipes.
    pub facility_type: Option<FacilityType>,
    pub power: PowerProfile,
    pub throughput: ThroughputProfile,
    /// Demand for this item is never expanded; it is reported as a raw
    /// leaf input even when a producing recipe exists.
    pub excluded: bool,
    /// Marks a native facility: recipes run by it are not expandable and
    /// it cannot be substituted.
    pub origin: bool,
}

impl Item {
    /// A plain item with no attributes set.
    pub fn new(name: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            icon: String::new(),
            category,
            facility_type: None,
            power: PowerProfile::default(),
            throughput: ThroughputProfile::default(),
            excluded: false,
            origin: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipe model
// ---------------------------------------------------------------------------

/// A transformation rule: materials consumed per cycle -> products made
/// per cycle, run by one facility, taking `time` seconds per cycle.
/// Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// (product, quantity per cycle) pairs. More than one entry means a
    /// multi-product recipe; the non-target entries become byproducts.
    pub products: Vec<(ItemId, f64)>,
    /// (material, quantity per cycle) pairs.
    pub materials: Vec<(ItemId, f64)>,
    /// Cycle time in seconds. `None` signals "no automatic expansion"
    /// (raw ore, upgrade relations).
    pub time: Option<f64>,
    /// The facility item that runs this recipe.
    pub facility: ItemId,
    /// Optional link target for recipes that model a relationship or
    /// upgrade path rather than direct production. The recipe registers
    /// as a producer of this item too.
    pub recipe_of: Option<ItemId>,
}

impl Recipe {
    /// Per-cycle quantity of `item` among this recipe's products.
    ///
    /// A `recipe_of` target that is absent from the products map resolves
    /// with an implicit quantity of 1 per cycle.
    pub fn product_quantity(&self, item: ItemId) -> Option<f64> {
        self.products
            .iter()
            .find(|(id, _)| *id == item)
            .map(|(_, qty)| *qty)
            .or_else(|| (self.recipe_of == Some(item)).then_some(1.0))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Unknown item name. A data-integrity fault: callers should report
    /// it, never substitute a default.
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("duplicate item name: {0}")]
    DuplicateName(String),
    #[error("recipe {recipe:?} references unknown item {item:?}")]
    InvalidItemRef { recipe: RecipeId, item: ItemId },
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects item and recipe definitions in load order, then freezes them
/// into a [`Catalog`]. Registration order matters: it determines default
/// recipe selection (index 0) and substitution defaults (first of type).
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    items: Vec<Item>,
    name_to_id: HashMap<String, ItemId>,
    recipes: Vec<Recipe>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item. Returns its id, or an error if the name is taken.
    pub fn add_item(&mut self, item: Item) -> Result<ItemId, CatalogError> {
        if self.name_to_id.contains_key(&item.name) {
            return Err(CatalogError::DuplicateName(item.name));
        }
        let id = ItemId(self.items.len() as u32);
        self.name_to_id.insert(item.name.clone(), id);
        self.items.push(item);
        Ok(id)
    }

    /// Register a recipe. Reference validation is deferred to [`build`].
    ///
    /// [`build`]: CatalogBuilder::build
    pub fn add_recipe(&mut self, recipe: Recipe) -> RecipeId {
        let id = RecipeId(self.recipes.len() as u32);
        self.recipes.push(recipe);
        id
    }

    /// Lookup an already-registered item id by name.
    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.name_to_id.get(name).copied()
    }

    /// Validate every recipe reference and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let item_count = self.items.len() as u32;
        let check = |recipe: RecipeId, item: ItemId| {
            if item.0 < item_count {
                Ok(())
            } else {
                Err(CatalogError::InvalidItemRef { recipe, item })
            }
        };

        let mut produced_by: HashMap<ItemId, Vec<RecipeId>> = HashMap::new();
        let mut consumed_by: HashMap<ItemId, Vec<RecipeId>> = HashMap::new();

        for (index, recipe) in self.recipes.iter().enumerate() {
            let rid = RecipeId(index as u32);
            check(rid, recipe.facility)?;
            for &(item, _) in &recipe.products {
                check(rid, item)?;
                produced_by.entry(item).or_default().push(rid);
            }
            for &(item, _) in &recipe.materials {
                check(rid, item)?;
                consumed_by.entry(item).or_default().push(rid);
            }
            if let Some(target) = recipe.recipe_of {
                check(rid, target)?;
                let producers = produced_by.entry(target).or_default();
                if !producers.contains(&rid) {
                    producers.push(rid);
                }
            }
        }

        let mut facility_groups: HashMap<FacilityType, Vec<ItemId>> = HashMap::new();
        for (index, item) in self.items.iter().enumerate() {
            if let Some(ty) = item.facility_type {
                facility_groups.entry(ty).or_default().push(ItemId(index as u32));
            }
        }

        Ok(Catalog {
            items: self.items,
            name_to_id: self.name_to_id,
            recipes: self.recipes,
            produced_by,
            consumed_by,
            facility_groups,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after build; thread-safe to share.
#[derive(Debug)]
pub struct Catalog {
    items: Vec<Item>,
    name_to_id: HashMap<String, ItemId>,
    recipes: Vec<Recipe>,
    produced_by: HashMap<ItemId, Vec<RecipeId>>,
    consumed_by: HashMap<ItemId, Vec<RecipeId>>,
    facility_groups: HashMap<FacilityType, Vec<ItemId>>,
}

impl Catalog {
    /// Exact-name lookup. A miss is a data-integrity error, not a default.
    pub fn get_item(&self, name: &str) -> Result<&Item, CatalogError> {
        self.item_id(name)
            .and_then(|id| self.item(id))
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.name_to_id.get(name).copied()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.0 as usize)
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(id.0 as usize)
    }

    /// The display name for an id, or a placeholder for a dangling id.
    pub fn item_name(&self, id: ItemId) -> &str {
        self.item(id).map_or("<unknown>", |item| item.name.as_str())
    }

    /// Recipes with `item` among their products, in load order.
    /// Index 0 is the default selection for choice points.
    pub fn recipes_producing(&self, item: ItemId) -> &[RecipeId] {
        self.produced_by.get(&item).map_or(&[], Vec::as_slice)
    }

    /// Recipes with `item` among their materials, in load order.
    pub fn recipes_consuming(&self, item: ItemId) -> &[RecipeId] {
        self.consumed_by.get(&item).map_or(&[], Vec::as_slice)
    }

    /// Items carrying this facility-type tag, in registration order.
    /// The first entry is the substitution default for the type.
    pub fn items_of_facility_type(&self, ty: FacilityType) -> &[ItemId] {
        self.facility_groups.get(&ty).map_or(&[], Vec::as_slice)
    }

    /// True iff more than one recipe produces this item.
    pub fn is_choice_point(&self, item: ItemId) -> bool {
        self.recipes_producing(item).len() > 1
    }

    /// All choice-point items in registration order. Drives the recipe
    /// selection surface of the settings UI.
    pub fn choice_points(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.items.len() as u32)
            .map(ItemId)
            .filter(|&id| self.is_choice_point(id))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}
