//! Mutable resolution settings: extraction utilization, facility
//! substitution per facility type, and selected recipe per choice point.
//!
//! Policy values apply globally and are read fresh on every resolve call:
//! change a setting between two calls and the results differ accordingly.
//! During a single call the resolver holds a shared borrow, so mid-call
//! mutation is rejected by the compiler rather than by a runtime guard.
//!
//! Setters validate against the catalog and leave the previous value
//! untouched on rejection. Getters fall back to the documented defaults
//! (utilization 0, first registered facility of the type, recipe index 0).

use crate::catalog::{Catalog, FacilityType};
use crate::id::{ItemId, RecipeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A rejected policy mutation. The previous value is retained.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("{facility} is not a {facility_type:?} facility")]
    InvalidSubstitution {
        facility_type: FacilityType,
        facility: String,
    },
    #[error("recipe index {index} out of range for {item} ({count} producing recipes)")]
    InvalidRecipeIndex {
        item: String,
        index: usize,
        count: usize,
    },
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Process-wide resolution settings, mutated only by explicit user action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    utilization_level: u32,
    substitutions: HashMap<FacilityType, ItemId>,
    selected: HashMap<ItemId, usize>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Extraction utilization --

    /// Mineral utilization level. Each level reduces effective extraction
    /// demand by a further 10% of base.
    pub fn utilization_level(&self) -> u32 {
        self.utilization_level
    }

    /// Unsigned by construction, so any value is valid.
    pub fn set_utilization_level(&mut self, level: u32) {
        self.utilization_level = level;
    }

    // -- Facility substitution --

    /// The explicit substitution for a facility type, if one was set.
    /// The resolver keys off this: no entry means recipes run on their
    /// nominal facility.
    pub fn substitution_override(&self, ty: FacilityType) -> Option<ItemId> {
        self.substitutions.get(&ty).copied()
    }

    /// The effective substituted facility for a type: the explicit choice,
    /// or the first registered facility of that type. `None` only when the
    /// catalog has no facility of this type at all.
    pub fn substituted_facility(&self, catalog: &Catalog, ty: FacilityType) -> Option<ItemId> {
        self.substitution_override(ty)
            .or_else(|| catalog.items_of_facility_type(ty).first().copied())
    }

    /// Substitute all recipes of facility type `ty` onto `facility`.
    /// The facility must be a registered member of that type's group.
    pub fn set_substitution(
        &mut self,
        catalog: &Catalog,
        ty: FacilityType,
        facility: ItemId,
    ) -> Result<(), PolicyError> {
        if !catalog.items_of_facility_type(ty).contains(&facility) {
            return Err(PolicyError::InvalidSubstitution {
                facility_type: ty,
                facility: catalog.item_name(facility).to_string(),
            });
        }
        self.substitutions.insert(ty, facility);
        Ok(())
    }

    /// Revert a facility type to nominal facilities.
    pub fn clear_substitution(&mut self, ty: FacilityType) {
        self.substitutions.remove(&ty);
    }

    // -- Recipe selection --

    /// The selected recipe index for an item. Defaults to 0 (the first
    /// registered producing recipe) when unset.
    pub fn selected_recipe_index(&self, item: ItemId) -> usize {
        self.selected.get(&item).copied().unwrap_or(0)
    }

    /// The currently selected producing recipe for an item, or `None` for
    /// items nothing produces.
    pub fn selected_recipe(&self, catalog: &Catalog, item: ItemId) -> Option<RecipeId> {
        let producers = catalog.recipes_producing(item);
        producers.get(self.selected_recipe_index(item)).copied()
    }

    /// Select which producing recipe resolves `item`. The index must be in
    /// range for `recipes_producing(item)`.
    pub fn set_selected_recipe(
        &mut self,
        catalog: &Catalog,
        item: ItemId,
        index: usize,
    ) -> Result<(), PolicyError> {
        let count = catalog.recipes_producing(item).len();
        if index >= count {
            return Err(PolicyError::InvalidRecipeIndex {
                item: catalog.item_name(item).to_string(),
                index,
                count,
            });
        }
        self.selected.insert(item, index);
        Ok(())
    }
}
