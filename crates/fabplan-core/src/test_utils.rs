//! Shared test fixtures for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::catalog::{
    Catalog, CatalogBuilder, Category, FacilityType, Item, Recipe,
};
use crate::id::ItemId;

// ===========================================================================
// Item constructors
// ===========================================================================

pub fn component(name: &str) -> Item {
    Item::new(name, Category::Component)
}

pub fn facility(name: &str, ty: FacilityType, work_kw: f64) -> Item {
    let mut item = Item::new(name, Category::Facility);
    item.facility_type = Some(ty);
    item.power.work_consumption = Some(work_kw);
    item
}

pub fn tiered_facility(name: &str, ty: FacilityType, work_kw: f64, speed: f64) -> Item {
    let mut item = facility(name, ty, work_kw);
    item.throughput.production_speed = Some(speed);
    item
}

// ===========================================================================
// Fixture catalogs
// ===========================================================================

/// A small early-game catalog with the shapes the resolver cares about:
/// a raw ore mined from veins, a smelting step, a three-tier assembler
/// group, a pumped fluid, and a two-recipe choice point.
///
/// Power draws and tier speeds match the usual early-game numbers:
/// miner 420 kW, smelter 360 kW, assemblers 270/380/780 kW at speed
/// 0.75/1.0/1.5, pump 300 kW.
pub fn early_game_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();

    let ore_vein = b.add_item(component("Iron Ore Vein")).unwrap();
    let ore = b.add_item(component("Iron Ore")).unwrap();
    let ingot = b.add_item(component("Iron Ingot")).unwrap();
    let gear = b.add_item(component("Gear")).unwrap();
    let water_source = b.add_item(component("Water Source")).unwrap();
    let water = b.add_item(component("Water")).unwrap();
    let magnet = b.add_item(component("Magnet")).unwrap();
    let motor = b.add_item(component("Motor")).unwrap();

    let miner = b
        .add_item(facility("Mining Machine", FacilityType::Miner, 420.0))
        .unwrap();
    let smelter = b
        .add_item(facility("Arc Smelter", FacilityType::Smelter, 360.0))
        .unwrap();
    b.add_item(tiered_facility(
        "Assembling Machine Mk.I",
        FacilityType::Assembler,
        270.0,
        0.75,
    ))
    .unwrap();
    let mk2 = b
        .add_item(tiered_facility(
            "Assembling Machine Mk.II",
            FacilityType::Assembler,
            380.0,
            1.0,
        ))
        .unwrap();
    b.add_item(tiered_facility(
        "Assembling Machine Mk.III",
        FacilityType::Assembler,
        780.0,
        1.5,
    ))
    .unwrap();
    let pump = b
        .add_item(facility("Water Pump", FacilityType::Pump, 300.0))
        .unwrap();

    // Mining: one ore per second out of the vein.
    b.add_recipe(Recipe {
        products: vec![(ore, 1.0)],
        materials: vec![(ore_vein, 1.0)],
        time: Some(1.0),
        facility: miner,
        recipe_of: None,
    });
    // Smelting: 1 ore -> 1 ingot, 1s.
    b.add_recipe(Recipe {
        products: vec![(ingot, 1.0)],
        materials: vec![(ore, 1.0)],
        time: Some(1.0),
        facility: smelter,
        recipe_of: None,
    });
    // Choice point: magnet from ore (default, 1.5s) or from ingot (1s).
    b.add_recipe(Recipe {
        products: vec![(magnet, 1.0)],
        materials: vec![(ore, 1.0)],
        time: Some(1.5),
        facility: smelter,
        recipe_of: None,
    });
    b.add_recipe(Recipe {
        products: vec![(magnet, 1.0)],
        materials: vec![(ingot, 1.0)],
        time: Some(1.0),
        facility: smelter,
        recipe_of: None,
    });
    // Gears on the nominal Mk.II assembler.
    b.add_recipe(Recipe {
        products: vec![(gear, 1.0)],
        materials: vec![(ingot, 1.0)],
        time: Some(1.0),
        facility: mk2,
        recipe_of: None,
    });
    // Motors consume both a smelted and an assembled part, so the ingot
    // demand shows up on two different expansion levels.
    b.add_recipe(Recipe {
        products: vec![(motor, 1.0)],
        materials: vec![(ingot, 2.0), (gear, 2.0)],
        time: Some(2.0),
        facility: mk2,
        recipe_of: None,
    });
    // Pumped water.
    b.add_recipe(Recipe {
        products: vec![(water, 1.0)],
        materials: vec![(water_source, 1.0)],
        time: Some(1.2),
        facility: pump,
        recipe_of: None,
    });

    b.build().unwrap()
}

/// A linear chain `item_0 <- item_1 <- ... <- item_{depth}` where each step
/// consumes `ratio` units of the next item per unit produced. Used to
/// exercise deep expansions and the bench.
pub fn chain_catalog(depth: usize, ratio: f64) -> Catalog {
    let mut b = CatalogBuilder::new();
    let plant = b
        .add_item(facility("Plant", FacilityType::Chemical, 100.0))
        .unwrap();
    let ids: Vec<ItemId> = (0..=depth)
        .map(|i| b.add_item(component(&format!("item_{i}"))).unwrap())
        .collect();
    for i in 0..depth {
        b.add_recipe(Recipe {
            products: vec![(ids[i], 1.0)],
            materials: vec![(ids[i + 1], ratio)],
            time: Some(1.0),
            facility: plant,
            recipe_of: None,
        });
    }
    b.build().unwrap()
}
