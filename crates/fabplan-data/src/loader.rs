//! File discovery, format detection, and catalog construction.
//!
//! A catalog directory holds `items` and `recipes` files (required) and an
//! `excludes` file (optional), each in RON, JSON, or TOML. Names are
//! resolved to ids in a second pass once every item is registered.

use crate::schema::{ExcludeData, ItemData, RecipeData};
use fabplan_core::catalog::{Catalog, CatalogBuilder, CatalogError, Recipe};
use fabplan_core::id::ItemId;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different extensions.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name in a data file does not match any registered item.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection and file discovery
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file from its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

/// Scan a directory for `{base_name}.{ron,toml,json}`. Returns `Ok(None)`
/// when no candidate exists and an error when more than one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }
    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its detected format.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. RON and JSON files hold a bare array;
/// TOML files hold an array-of-tables under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}'")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Catalog construction
// ===========================================================================

fn resolve_item(
    builder: &CatalogBuilder,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<ItemId, DataLoadError> {
    builder
        .item_id(name)
        .ok_or_else(|| DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
            expected_kind,
        })
}

/// Load a full catalog from a data directory.
///
/// Requires `items` and `recipes` files; an `excludes` file, when present,
/// marks items as never-expanded and facilities as native before the
/// catalog is frozen.
pub fn load_catalog(dir: &Path) -> Result<Catalog, DataLoadError> {
    let items_path = require_data_file(dir, "items")?;
    let recipes_path = require_data_file(dir, "recipes")?;
    let excludes_path = find_data_file(dir, "excludes")?;

    let items: Vec<ItemData> = deserialize_list(&items_path, "items")?;
    let recipes: Vec<RecipeData> = deserialize_list(&recipes_path, "recipes")?;
    let excludes: ExcludeData = match &excludes_path {
        Some(path) => deserialize_file(path)?,
        None => ExcludeData::default(),
    };

    let excluded: HashSet<&str> = excludes.products.iter().map(String::as_str).collect();
    let origin: HashSet<&str> = excludes
        .origin_facilities
        .iter()
        .map(String::as_str)
        .collect();

    let mut builder = CatalogBuilder::new();
    for data in items {
        let mut item = data.into_item();
        item.excluded = excluded.contains(item.name.as_str());
        item.origin = origin.contains(item.name.as_str());
        builder.add_item(item)?;
    }

    // A typo in the exclusion file would otherwise go unnoticed.
    if let Some(path) = &excludes_path {
        for name in excludes.products.iter().chain(&excludes.origin_facilities) {
            resolve_item(&builder, name, path, "item")?;
        }
    }

    for data in recipes {
        let mut recipe = Recipe {
            products: Vec::with_capacity(data.products.len()),
            materials: Vec::with_capacity(data.materials.len()),
            time: data.time,
            facility: resolve_item(&builder, &data.facility, &recipes_path, "facility")?,
            recipe_of: None,
        };
        for (name, quantity) in &data.products {
            let id = resolve_item(&builder, name, &recipes_path, "product")?;
            recipe.products.push((id, *quantity));
        }
        for (name, quantity) in &data.materials {
            let id = resolve_item(&builder, name, &recipes_path, "material")?;
            recipe.materials.push((id, *quantity));
        }
        if let Some(name) = &data.recipe_of {
            recipe.recipe_of = Some(resolve_item(&builder, name, &recipes_path, "item")?);
        }
        builder.add_recipe(recipe);
    }

    Ok(builder.build()?)
}

// ===========================================================================
// Tests
// ===========================================================================
