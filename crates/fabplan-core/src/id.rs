use serde::{Serialize, Deserialize};

/// Identifies an item in the catalog. Cheap to copy and compare.
///
/// Ids are dense indices assigned in registration order, so `Ord` on ids
/// is registration order. That ordering is load-bearing: default recipe
/// selection and substitution defaults are "first registered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Identifies a recipe in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecipeId(pub u32);
