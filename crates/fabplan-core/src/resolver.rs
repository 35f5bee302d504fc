//! The production-requirement resolver.
//!
//! Given a target item and an output rate, [`Resolver::resolve`] expands
//! demand level by level through the currently selected recipes until only
//! raw (unexpandable) demands remain, producing:
//!
//! - one [`Requirement`] per expansion level (the detailed view), and
//! - one merged [`Requirement`] per distinct product plus a combined
//!   grand-total tail (the summary view).
//!
//! The expansion is an explicit worklist, not recursion: the frontier is a
//! map of item to demanded rate, and each level replaces it with the
//! material demands it generates. Leaf demands (excluded items, items
//! without a producing recipe, recipes run by origin facilities) pass
//! through unchanged and end up as the raw-material total. A depth guard
//! converts a true production cycle into [`ResolveError::UnresolvableCycle`]
//! instead of looping.

use crate::catalog::{Catalog, FacilityClass, FacilityType};
use crate::id::{ItemId, RecipeId};
use crate::policy::Policy;
use crate::requirement::Requirement;
use std::collections::{BTreeMap, HashMap};

/// Levels expanded before a resolution is declared cyclic. Far beyond any
/// real recipe chain; only reachable when the graph loops.
pub const MAX_DEPTH: usize = 1000;

/// Units per minute one resource vein supports for one extractor.
pub const EXTRACTION_NODE_RATE: f64 = 6.0;

/// Effective-rate divisor gained per mineral utilization level.
const UTILIZATION_STEP: f64 = 0.1;

// ---------------------------------------------------------------------------
// Errors and diagnostics
// ---------------------------------------------------------------------------

/// Aborts the whole resolution; partial results would be misleading.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("production cycle detected after {depth} levels; unresolved demand for {chain:?}")]
    UnresolvableCycle { depth: usize, chain: Vec<String> },
}

/// A recipe defect detected during expansion. Reported on the result and
/// degraded to a leaf demand, so the rest of the tree still resolves.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedRecipe {
    #[error("recipe {recipe:?} for {product}: non-positive product quantity {quantity}")]
    NonPositiveQuantity {
        recipe: RecipeId,
        product: String,
        quantity: f64,
    },
    #[error("facility {facility} has no usable production speed")]
    InvalidProductionSpeed { facility: String },
}

// ---------------------------------------------------------------------------
// Result shape
// ---------------------------------------------------------------------------

/// The two projections of one resolution, plus recoverable diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One Requirement per expansion level, in depth order. Each level's
    /// materials are the full remaining demand at that depth (leaf rates
    /// carry forward); `power` is the level's direct draw and `sum_power`
    /// the running total.
    pub levels: Vec<Requirement>,
    /// One Requirement per distinct product in first-encounter order,
    /// merged across levels, followed by the combined grand total. The
    /// per-product rows keep continuous facility counts, with `power`
    /// drawn from those counts and `sum_power` from their ceilings. The
    /// tail carries raw materials, ceiling-rounded facility counts merged
    /// by facility, all byproducts, and power from the rounded counts.
    pub totals: Vec<Requirement>,
    /// Recipe defects that were degraded to leaf demands.
    pub issues: Vec<MalformedRecipe>,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Expands demand through a frozen [`Catalog`] under a [`Policy`].
///
/// `resolve` is a pure function of (target, rate, policy, catalog); the
/// shared borrows it holds make concurrent read-only calls safe and rule
/// out policy mutation for the duration of a call.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve a target by name. See [`Resolver::resolve_item`].
    pub fn resolve(
        &self,
        policy: &Policy,
        target: &str,
        rate: f64,
    ) -> Result<Resolution, ResolveError> {
        let target = self
            .catalog
            .item_id(target)
            .ok_or_else(|| ResolveError::NotFound(target.to_string()))?;
        self.resolve_item(policy, target, rate)
    }

    /// Resolve the full requirement tree for producing `target` at `rate`
    /// units per minute.
    pub fn resolve_item(
        &self,
        policy: &Policy,
        target: ItemId,
        rate: f64,
    ) -> Result<Resolution, ResolveError> {
        let mut seed = Requirement::new();
        seed.seed(target, rate);
        let mut frontier = seed.materials;

        let mut levels: Vec<Requirement> = Vec::new();
        let mut issues: Vec<MalformedRecipe> = Vec::new();
        let mut product_order: Vec<ItemId> = Vec::new();
        let mut per_product: HashMap<ItemId, Requirement> = HashMap::new();
        let mut total_facilities: BTreeMap<ItemId, f64> = BTreeMap::new();
        let mut total_byproducts: BTreeMap<ItemId, f64> = BTreeMap::new();
        let mut total_power = 0.0;
        let mut running_power = 0.0;

        loop {
            if frontier.is_empty() {
                break;
            }
            if levels.len() >= MAX_DEPTH {
                return Err(ResolveError::UnresolvableCycle {
                    depth: levels.len(),
                    chain: frontier
                        .keys()
                        .map(|&id| self.catalog.item_name(id).to_string())
                        .collect(),
                });
            }

            let mut level = Requirement::new();
            let mut expanded = false;

            for (&item, &demand) in &frontier {
                match self.expand(policy, item, demand) {
                    Ok(Some(step)) => {
                        expanded = true;
                        for &(facility, count) in &step.facilities {
                            *total_facilities.entry(facility).or_insert(0.0) += count.ceil();
                        }
                        total_power += step.work_consumption(self.catalog, true);
                        for (&byproduct, &out_rate) in &step.byproducts {
                            *total_byproducts.entry(byproduct).or_insert(0.0) += out_rate;
                        }
                        match per_product.get_mut(&item) {
                            Some(existing) => *existing = existing.merge(&step, true),
                            None => {
                                product_order.push(item);
                                per_product.insert(item, step.clone());
                            }
                        }
                        level.accumulate(&step);
                    }
                    Ok(None) => level.add_material(item, demand),
                    Err(issue) => {
                        if !issues.contains(&issue) {
                            issues.push(issue);
                        }
                        level.add_material(item, demand);
                    }
                }
            }

            if !expanded {
                // Every remaining demand is a leaf: the frontier is the
                // final raw-material total.
                break;
            }

            level.power = level.work_consumption(self.catalog, false);
            running_power += level.power;
            level.sum_power = running_power;
            frontier = level.materials.clone();
            levels.push(level);
        }

        let mut totals: Vec<Requirement> = Vec::with_capacity(product_order.len() + 1);
        for item in product_order {
            if let Some(mut step) = per_product.remove(&item) {
                step.power = step.work_consumption(self.catalog, false);
                step.sum_power = step.work_consumption(self.catalog, true);
                totals.push(step);
            }
        }

        let mut tail = Requirement::new();
        tail.materials = frontier;
        tail.byproducts = total_byproducts;
        tail.facilities = total_facilities.into_iter().collect();
        tail.power = total_power;
        tail.sum_power = total_power;
        totals.push(tail);

        Ok(Resolution {
            levels,
            totals,
            issues,
        })
    }

    // -----------------------------------------------------------------------
    // Recipe expansion for a single (item, rate) demand
    // -----------------------------------------------------------------------

    /// Expand one demand through its selected recipe.
    ///
    /// `Ok(None)` marks a leaf: no producing recipe, invalid cycle time,
    /// excluded product, or an origin facility. `Err` marks recipe data
    /// the caller should report and then treat as a leaf.
    fn expand(
        &self,
        policy: &Policy,
        item: ItemId,
        rate: f64,
    ) -> Result<Option<Requirement>, MalformedRecipe> {
        let Some(item_def) = self.catalog.item(item) else {
            return Ok(None);
        };
        if item_def.excluded {
            return Ok(None);
        }
        let Some(recipe_id) = policy.selected_recipe(self.catalog, item) else {
            return Ok(None);
        };
        let Some(recipe) = self.catalog.recipe(recipe_id) else {
            return Ok(None);
        };
        let Some(time) = recipe.time.filter(|t| t.is_finite() && *t >= 0.0) else {
            return Ok(None);
        };
        let Some(facility_def) = self.catalog.item(recipe.facility) else {
            return Ok(None);
        };
        if facility_def.origin {
            return Ok(None);
        }

        let Some(product_num) = recipe.product_quantity(item) else {
            return Ok(None);
        };
        if product_num <= 0.0 || !product_num.is_finite() {
            return Err(MalformedRecipe::NonPositiveQuantity {
                recipe: recipe_id,
                product: item_def.name.clone(),
                quantity: product_num,
            });
        }

        let mut step = Requirement::new();
        step.product = Some(item);

        // Byproducts: the other products of a multi-product recipe, at the
        // nominal target rate.
        for &(product, quantity) in &recipe.products {
            if product != item {
                *step.byproducts.entry(product).or_insert(0.0) +=
                    rate * quantity / product_num;
            }
        }

        let class = facility_def
            .facility_type
            .map_or(FacilityClass::Production, FacilityType::class);
        let utilization = 1.0 + UTILIZATION_STEP * f64::from(policy.utilization_level());

        match class {
            FacilityClass::Extraction => {
                // Discrete extractor placement: utilization reduces the
                // effective demand, then each consumed material is split
                // into fixed-capacity veins, rounded half-up, at least one
                // node per demanded material.
                let effective = rate / utilization;
                let mut nodes = 0.0;
                for &(material, quantity) in &recipe.materials {
                    let material_rate = effective * quantity / product_num;
                    step.add_material(material, material_rate);
                    if material_rate > 0.0 {
                        nodes += (material_rate / EXTRACTION_NODE_RATE + 0.5).floor().max(1.0);
                    }
                }
                step.facilities.push((recipe.facility, nodes));
            }
            FacilityClass::Pumping => {
                for &(material, quantity) in &recipe.materials {
                    step.add_material(material, rate * quantity / product_num);
                }
                let effective = rate / utilization;
                step.facilities
                    .push((recipe.facility, effective * time / product_num / 60.0));
            }
            FacilityClass::Production => {
                for &(material, quantity) in &recipe.materials {
                    step.add_material(material, rate * quantity / product_num);
                }
                let base = rate * time / product_num / 60.0;
                let substituted = facility_def
                    .facility_type
                    .and_then(|ty| policy.substitution_override(ty))
                    .filter(|&sub| sub != recipe.facility);
                match substituted {
                    Some(sub) => {
                        let sub_speed = self
                            .catalog
                            .item(sub)
                            .and_then(|def| def.throughput.production_speed)
                            .filter(|s| s.is_finite() && *s > 0.0)
                            .ok_or_else(|| MalformedRecipe::InvalidProductionSpeed {
                                facility: self.catalog.item_name(sub).to_string(),
                            })?;
                        let nominal_speed = facility_def.throughput.production_speed.unwrap_or(1.0);
                        if !nominal_speed.is_finite() || nominal_speed <= 0.0 {
                            return Err(MalformedRecipe::InvalidProductionSpeed {
                                facility: facility_def.name.clone(),
                            });
                        }
                        step.facilities.push((sub, base * nominal_speed / sub_speed));
                    }
                    None => step.facilities.push((recipe.facility, base)),
                }
            }
        }

        Ok(Some(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, Category, Item, Recipe};

    const EPS: f64 = 1e-9;

    /// Iron Ore (raw) -> Iron Ingot via Arc Smelter, 1:1, 1s cycle.
    fn iron_catalog() -> Catalog {
        let mut b = CatalogBuilder::new();
        let ore = b.add_item(Item::new("Iron Ore", Category::Component)).unwrap();
        let ingot = b.add_item(Item::new("Iron Ingot", Category::Component)).unwrap();
        let mut smelter = Item::new("Arc Smelter", Category::Facility);
        smelter.facility_type = Some(crate::catalog::FacilityType::Smelter);
        smelter.power.work_consumption = Some(360.0);
        let smelter = b.add_item(smelter).unwrap();
        b.add_recipe(Recipe {
            products: vec![(ingot, 1.0)],
            materials: vec![(ore, 1.0)],
            time: Some(1.0),
            facility: smelter,
            recipe_of: None,
        });
        b.build().unwrap()
    }

    #[test]
    fn smelting_one_per_second_needs_one_smelter() {
        let catalog = iron_catalog();
        let resolver = Resolver::new(&catalog);
        let result = resolver.resolve(&Policy::new(), "Iron Ingot", 60.0).unwrap();

        let ore = catalog.item_id("Iron Ore").unwrap();
        let smelter = catalog.item_id("Arc Smelter").unwrap();

        assert_eq!(result.levels.len(), 1);
        let level = &result.levels[0];
        assert!((level.materials[&ore] - 60.0).abs() < EPS);
        assert_eq!(level.facilities, vec![(smelter, 1.0)]);
        assert!((level.power - 360.0).abs() < EPS);
        assert!((level.sum_power - 360.0).abs() < EPS);

        // Per-product entry plus the combined tail.
        assert_eq!(result.totals.len(), 2);
        let ingot = catalog.item_id("Iron Ingot").unwrap();
        assert_eq!(result.totals[0].product, Some(ingot));
        let tail = result.totals.last().unwrap();
        assert!((tail.materials[&ore] - 60.0).abs() < EPS);
        assert_eq!(tail.facilities, vec![(smelter, 1.0)]);
        assert!((tail.power - 360.0).abs() < EPS);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn unknown_target_is_not_found() {
        let catalog = iron_catalog();
        let resolver = Resolver::new(&catalog);
        let err = resolver.resolve(&Policy::new(), "Unobtainium", 60.0).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(name) if name == "Unobtainium"));
    }

    #[test]
    fn raw_target_resolves_to_bare_total() {
        let catalog = iron_catalog();
        let resolver = Resolver::new(&catalog);
        let result = resolver.resolve(&Policy::new(), "Iron Ore", 45.0).unwrap();

        let ore = catalog.item_id("Iron Ore").unwrap();
        assert!(result.levels.is_empty());
        assert_eq!(result.totals.len(), 1);
        let tail = &result.totals[0];
        assert!((tail.materials[&ore] - 45.0).abs() < EPS);
        assert!(tail.facilities.is_empty());
        assert!(tail.power.abs() < EPS);
    }

    #[test]
    fn multi_product_byproduct_rates() {
        // A x2 + B x1 from C x3 in 2s.
        let mut b = CatalogBuilder::new();
        let a = b.add_item(Item::new("A", Category::Component)).unwrap();
        let by = b.add_item(Item::new("B", Category::Component)).unwrap();
        let c = b.add_item(Item::new("C", Category::Component)).unwrap();
        let plant = b.add_item(Item::new("Plant", Category::Facility)).unwrap();
        b.add_recipe(Recipe {
            products: vec![(a, 2.0), (by, 1.0)],
            materials: vec![(c, 3.0)],
            time: Some(2.0),
            facility: plant,
            recipe_of: None,
        });
        let catalog = b.build().unwrap();
        let resolver = Resolver::new(&catalog);
        let result = resolver.resolve(&Policy::new(), "A", 120.0).unwrap();

        let level = &result.levels[0];
        assert_eq!(level.facilities, vec![(plant, 2.0)]);
        assert!((level.materials[&c] - 180.0).abs() < EPS);
        assert!((level.byproducts[&by] - 60.0).abs() < EPS);
    }

    #[test]
    fn excluded_item_passes_through_verbatim() {
        let mut b = CatalogBuilder::new();
        let ore = b.add_item(Item::new("Iron Ore", Category::Component)).unwrap();
        let mut ingot = Item::new("Iron Ingot", Category::Component);
        ingot.excluded = true;
        let ingot = b.add_item(ingot).unwrap();
        let smelter = b.add_item(Item::new("Arc Smelter", Category::Facility)).unwrap();
        b.add_recipe(Recipe {
            products: vec![(ingot, 1.0)],
            materials: vec![(ore, 1.0)],
            time: Some(1.0),
            facility: smelter,
            recipe_of: None,
        });
        let catalog = b.build().unwrap();
        let resolver = Resolver::new(&catalog);
        let result = resolver.resolve(&Policy::new(), "Iron Ingot", 90.0).unwrap();

        assert!(result.levels.is_empty());
        let tail = result.totals.last().unwrap();
        assert!((tail.materials[&ingot] - 90.0).abs() < EPS);
        assert!(tail.facilities.is_empty());
    }

    #[test]
    fn origin_facility_makes_recipe_unexpandable() {
        let mut b = CatalogBuilder::new();
        let ore = b.add_item(Item::new("Iron Ore", Category::Component)).unwrap();
        let ingot = b.add_item(Item::new("Iron Ingot", Category::Component)).unwrap();
        let mut hand = Item::new("Icarus", Category::Facility);
        hand.origin = true;
        let hand = b.add_item(hand).unwrap();
        b.add_recipe(Recipe {
            products: vec![(ingot, 1.0)],
            materials: vec![(ore, 1.0)],
            time: Some(1.0),
            facility: hand,
            recipe_of: None,
        });
        let catalog = b.build().unwrap();
        let resolver = Resolver::new(&catalog);
        let result = resolver.resolve(&Policy::new(), "Iron Ingot", 30.0).unwrap();

        assert!(result.levels.is_empty());
        let tail = result.totals.last().unwrap();
        assert!((tail.materials[&ingot] - 30.0).abs() < EPS);
    }

    #[test]
    fn cycle_reports_unresolvable() {
        let mut b = CatalogBuilder::new();
        let a = b.add_item(Item::new("A", Category::Component)).unwrap();
        let c = b.add_item(Item::new("B", Category::Component)).unwrap();
        let plant = b.add_item(Item::new("Plant", Category::Facility)).unwrap();
        b.add_recipe(Recipe {
            products: vec![(a, 1.0)],
            materials: vec![(c, 1.0)],
            time: Some(1.0),
            facility: plant,
            recipe_of: None,
        });
        b.add_recipe(Recipe {
            products: vec![(c, 1.0)],
            materials: vec![(a, 1.0)],
            time: Some(1.0),
            facility: plant,
            recipe_of: None,
        });
        let catalog = b.build().unwrap();
        let resolver = Resolver::new(&catalog);
        let err = resolver.resolve(&Policy::new(), "A", 60.0).unwrap_err();
        match err {
            ResolveError::UnresolvableCycle { depth, chain } => {
                assert_eq!(depth, MAX_DEPTH);
                assert!(chain.contains(&"A".to_string()) || chain.contains(&"B".to_string()));
            }
            other => panic!("expected UnresolvableCycle, got {other:?}"),
        }
    }

    #[test]
    fn malformed_quantity_degrades_to_leaf() {
        let mut b = CatalogBuilder::new();
        let ore = b.add_item(Item::new("Iron Ore", Category::Component)).unwrap();
        let ingot = b.add_item(Item::new("Iron Ingot", Category::Component)).unwrap();
        let smelter = b.add_item(Item::new("Arc Smelter", Category::Facility)).unwrap();
        b.add_recipe(Recipe {
            products: vec![(ingot, 0.0)],
            materials: vec![(ore, 1.0)],
            time: Some(1.0),
            facility: smelter,
            recipe_of: None,
        });
        let catalog = b.build().unwrap();
        let resolver = Resolver::new(&catalog);
        let result = resolver.resolve(&Policy::new(), "Iron Ingot", 60.0).unwrap();

        // No division happened; the demand surfaces as a raw leaf.
        let tail = result.totals.last().unwrap();
        assert!((tail.materials[&ingot] - 60.0).abs() < EPS);
        assert_eq!(result.issues.len(), 1);
        assert!(matches!(
            result.issues[0],
            MalformedRecipe::NonPositiveQuantity { quantity, .. } if quantity == 0.0
        ));
        // Nothing in the output is NaN or infinite.
        for req in result.levels.iter().chain(result.totals.iter()) {
            for rate in req.materials.values() {
                assert!(rate.is_finite());
            }
        }
    }
}
