//! Property-based tests for the resolver.
//!
//! Uses proptest to generate catalogs, rates, and policy settings, then
//! verify the structural invariants of a resolution hold.

use fabplan_core::catalog::FacilityType;
use fabplan_core::policy::Policy;
use fabplan_core::requirement::Requirement;
use fabplan_core::resolver::Resolver;
use fabplan_core::test_utils::{chain_catalog, early_game_catalog};
use proptest::prelude::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * b.abs().max(1.0)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Determinism: two resolutions of the same inputs agree everywhere.
    #[test]
    fn deterministic_resolution(rate in 0.1f64..10_000.0) {
        let catalog = early_game_catalog();
        let resolver = Resolver::new(&catalog);
        let policy = Policy::new();

        let a = resolver.resolve(&policy, "Motor", rate).unwrap();
        let b = resolver.resolve(&policy, "Motor", rate).unwrap();

        prop_assert_eq!(a.levels.len(), b.levels.len());
        prop_assert_eq!(a.totals.len(), b.totals.len());
        for (la, lb) in a.levels.iter().zip(&b.levels) {
            prop_assert_eq!(&la.materials, &lb.materials);
            prop_assert_eq!(&la.facilities, &lb.facilities);
            prop_assert!(close(la.power, lb.power));
        }
        for (ta, tb) in a.totals.iter().zip(&b.totals) {
            prop_assert_eq!(ta.product, tb.product);
            prop_assert_eq!(&ta.materials, &tb.materials);
        }
    }

    /// Mass continuity: on a linear chain, the demand at depth k is exactly
    /// the target rate scaled by the consumption ratio k+1 times.
    #[test]
    fn chain_mass_continuity(
        depth in 1usize..8,
        ratio in 0.5f64..3.0,
        rate in 1.0f64..1_000.0,
    ) {
        let catalog = chain_catalog(depth, ratio);
        let resolver = Resolver::new(&catalog);
        let result = resolver.resolve(&Policy::new(), "item_0", rate).unwrap();

        prop_assert_eq!(result.levels.len(), depth);
        for (k, level) in result.levels.iter().enumerate() {
            let next = catalog.item_id(&format!("item_{}", k + 1)).unwrap();
            let expected = rate * ratio.powi(i32::try_from(k).unwrap() + 1);
            prop_assert!(
                close(level.materials[&next], expected),
                "depth {}: {} vs {}", k, level.materials[&next], expected
            );
        }

        let leaf = catalog.item_id(&format!("item_{depth}")).unwrap();
        let tail = result.totals.last().unwrap();
        prop_assert!(close(tail.materials[&leaf], rate * ratio.powi(
            i32::try_from(depth).unwrap()
        )));
    }

    /// Raising mineral utilization never increases extractor counts and
    /// never changes what gets consumed.
    #[test]
    fn utilization_is_monotone(rate in 0.1f64..5_000.0) {
        let catalog = early_game_catalog();
        let resolver = Resolver::new(&catalog);
        let vein = catalog.item_id("Iron Ore Vein").unwrap();

        let mut previous: Option<f64> = None;
        for level in 0..10 {
            let mut policy = Policy::new();
            policy.set_utilization_level(level);
            let result = resolver.resolve(&policy, "Iron Ore", rate).unwrap();
            let count = result.levels[0].facilities[0].1;
            prop_assert!(count >= 1.0);
            if let Some(prev) = previous {
                prop_assert!(count <= prev);
            }
            previous = Some(count);
            // Vein draw shrinks with utilization but stays positive.
            prop_assert!(result.levels[0].materials[&vein] > 0.0);
        }
    }

    /// Substituting the assembler tier rescales facility counts only;
    /// material flow through the chain is untouched.
    #[test]
    fn substitution_preserves_materials(rate in 0.1f64..5_000.0) {
        let catalog = early_game_catalog();
        let resolver = Resolver::new(&catalog);
        let vein = catalog.item_id("Iron Ore Vein").unwrap();
        let ingot = catalog.item_id("Iron Ingot").unwrap();

        let nominal = resolver.resolve(&Policy::new(), "Gear", rate).unwrap();

        for tier in ["Assembling Machine Mk.I", "Assembling Machine Mk.III"] {
            let sub = catalog.item_id(tier).unwrap();
            let mut policy = Policy::new();
            policy
                .set_substitution(&catalog, FacilityType::Assembler, sub)
                .unwrap();
            let result = resolver.resolve(&policy, "Gear", rate).unwrap();

            prop_assert!(close(
                result.levels[0].materials[&ingot],
                nominal.levels[0].materials[&ingot],
            ));
            prop_assert!(close(
                result.totals.last().unwrap().materials[&vein],
                nominal.totals.last().unwrap().materials[&vein],
            ));
            prop_assert_eq!(result.levels[0].facilities[0].0, sub);
        }
    }

    /// A target with no producing recipe yields no levels and passes its
    /// rate straight through to the raw-material total.
    #[test]
    fn raw_target_passes_through(rate in 0.0f64..10_000.0) {
        let catalog = early_game_catalog();
        let resolver = Resolver::new(&catalog);
        let vein = catalog.item_id("Iron Ore Vein").unwrap();

        let result = resolver
            .resolve(&Policy::new(), "Iron Ore Vein", rate)
            .unwrap();
        prop_assert!(result.levels.is_empty());
        prop_assert_eq!(result.totals.len(), 1);
        prop_assert!(close(result.totals[0].materials[&vein], rate));
        prop_assert!(result.totals[0].facilities.is_empty());
    }

    /// Merging levels into a combined view is order-independent: summed
    /// materials, byproducts, and power do not depend on merge order.
    #[test]
    fn level_merge_is_order_independent(rate in 0.1f64..5_000.0) {
        let catalog = early_game_catalog();
        let resolver = Resolver::new(&catalog);
        let result = resolver.resolve(&Policy::new(), "Motor", rate).unwrap();

        let forward = result
            .levels
            .iter()
            .fold(Requirement::new(), |acc, l| acc.merge(l, false));
        let backward = result
            .levels
            .iter()
            .rev()
            .fold(Requirement::new(), |acc, l| acc.merge(l, false));

        for (item, value) in &forward.materials {
            prop_assert!(close(*value, backward.materials[item]));
        }
        prop_assert_eq!(forward.materials.len(), backward.materials.len());
        for (item, value) in &forward.byproducts {
            prop_assert!(close(*value, backward.byproducts[item]));
        }
        prop_assert!(close(forward.power, backward.power));
        prop_assert!(close(forward.sum_power, backward.sum_power));
    }

    /// The tail's power comes from ceiling-rounded facility counts, so it
    /// always dominates the continuous running total of the levels.
    #[test]
    fn rounded_power_dominates_continuous(rate in 0.1f64..5_000.0) {
        let catalog = early_game_catalog();
        let resolver = Resolver::new(&catalog);
        let result = resolver.resolve(&Policy::new(), "Motor", rate).unwrap();

        let continuous: f64 = result.levels.iter().map(|l| l.power).sum();
        let tail = result.totals.last().unwrap();
        prop_assert!(tail.power >= continuous - 1e-9);
        if let Some(last) = result.levels.last() {
            prop_assert!(close(last.sum_power, continuous));
        }
        for req in result.levels.iter().chain(result.totals.iter()) {
            for value in req.materials.values() {
                prop_assert!(value.is_finite());
            }
            prop_assert!(req.power.is_finite());
        }
    }
}
