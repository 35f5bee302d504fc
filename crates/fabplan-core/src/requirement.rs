//! The aggregation value object: material rates, facility counts,
//! byproduct rates, and power for one resolution level or for a total.
//!
//! Combining two Requirements is a pure merge producing a new value; the
//! only in-place operations are [`Requirement::add_material`] and
//! [`Requirement::accumulate`], used while one level is being expanded.
//! All rates are units per minute; facility counts are fractional until a
//! total rounds them up.

use crate::catalog::Catalog;
use crate::id::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated demand: what one production step (or a whole plan) needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// The target item this Requirement was expanded for, when it
    /// represents a single product's production step.
    pub product: Option<ItemId>,
    /// Demanded input rates, units per minute. BTreeMap keys iterate in
    /// id (registration) order, keeping output deterministic.
    pub materials: BTreeMap<ItemId, f64>,
    /// (facility, instance count) entries in expansion order. Deliberately
    /// not merged by name so distinct production steps stay distinct;
    /// totals merge them explicitly.
    pub facilities: Vec<(ItemId, f64)>,
    /// Byproduct output rates, units per minute.
    pub byproducts: BTreeMap<ItemId, f64>,
    /// This level's direct power draw, kilowatts.
    pub power: f64,
    /// Running power total across merges, kilowatts.
    pub sum_power: f64,
}

impl Requirement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to a single seeded demand. Starts a resolution for `item`.
    pub fn seed(&mut self, item: ItemId, rate: f64) {
        self.materials.clear();
        self.materials.insert(item, rate);
    }

    /// Accumulate a demanded rate in place.
    pub fn add_material(&mut self, item: ItemId, rate: f64) {
        *self.materials.entry(item).or_insert(0.0) += rate;
    }

    /// In-place accumulate of another Requirement, used while collecting
    /// the per-item expansions of a single level.
    pub fn accumulate(&mut self, other: &Requirement) {
        for (&item, &rate) in &other.materials {
            self.add_material(item, rate);
        }
        for (&item, &rate) in &other.byproducts {
            *self.byproducts.entry(item).or_insert(0.0) += rate;
        }
        self.facilities.extend_from_slice(&other.facilities);
        self.power += other.power;
        self.sum_power += other.sum_power;
    }

    /// Pure merge: returns a new Requirement summing material, byproduct,
    /// and power values. Facility lists concatenate, except when
    /// `merge_same_product` holds, both sides describe the same product,
    /// and each carries exactly one facility entry for the same facility:
    /// then the counts sum into a single entry.
    pub fn merge(&self, other: &Requirement, merge_same_product: bool) -> Requirement {
        let mut merged = self.clone();
        if merged.product != other.product {
            merged.product = None;
        }
        for (&item, &rate) in &other.materials {
            merged.add_material(item, rate);
        }
        for (&item, &rate) in &other.byproducts {
            *merged.byproducts.entry(item).or_insert(0.0) += rate;
        }

        let same_step = merge_same_product
            && self.product.is_some()
            && self.product == other.product
            && self.facilities.len() == 1
            && other.facilities.len() == 1
            && self.facilities[0].0 == other.facilities[0].0;
        if same_step {
            merged.facilities[0].1 += other.facilities[0].1;
        } else {
            merged.facilities.extend_from_slice(&other.facilities);
        }

        merged.power += other.power;
        merged.sum_power += other.sum_power;
        merged
    }

    /// Total work power draw of the listed facilities, kilowatts.
    ///
    /// With `round_up`, counts are ceiled first: partial facilities still
    /// draw full power. A facility with no work consumption attribute
    /// contributes 0, silently.
    pub fn work_consumption(&self, catalog: &Catalog, round_up: bool) -> f64 {
        self.facilities
            .iter()
            .map(|&(facility, count)| {
                let draw = catalog
                    .item(facility)
                    .and_then(|item| item.power.work_consumption)
                    .unwrap_or(0.0);
                let count = if round_up { count.ceil() } else { count };
                draw * count
            })
            .sum()
    }

    /// True when nothing has been demanded or produced.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.facilities.is_empty() && self.byproducts.is_empty()
    }
}
