use std::collections::HashSet;

use casegrid_core::{Assignment, CategorySpace, PairUniverse, value_indices};
use casegrid_generate::{apply_rules, generate};
use casegrid_plan::RuleSet;

fn row(cells: &[(&str, &str)]) -> Assignment {
    cells.iter().copied().collect()
}

fn spaces() -> Vec<CategorySpace> {
    vec![
        CategorySpace::new()
            .with_category("a", ["a1", "a2"])
            .with_category("b", ["b1", "b2"]),
        CategorySpace::new()
            .with_category("os", ["linux", "mac", "windows"])
            .with_category("browser", ["firefox", "chrome", "edge", "safari"])
            .with_category("locale", ["de", "en"])
            .with_category("theme", ["light", "dark", "contrast"]),
        CategorySpace::new()
            .with_category("x", ["1"])
            .with_category("y", ["1", "2", "3"])
            .with_category("z", ["1", "2"])
            .with_category("w", ["1", "2", "3", "4", "5"])
            .with_category("v", ["1", "2"]),
    ]
}

#[test]
fn full_combination_is_the_ordered_product() {
    let space = CategorySpace::new()
        .with_category("A", ["a1", "a2"])
        .with_category("B", ["b1", "b2"]);
    let suite = generate("all", &space).expect("generate");
    assert_eq!(
        suite,
        vec![
            row(&[("A", "a1"), ("B", "b1")]),
            row(&[("A", "a1"), ("B", "b2")]),
            row(&[("A", "a2"), ("B", "b1")]),
            row(&[("A", "a2"), ("B", "b2")]),
        ]
    );
}

#[test]
fn each_choice_cycles_shorter_categories() {
    let space = CategorySpace::new()
        .with_category("A", ["a1", "a2", "a3"])
        .with_category("B", ["b1", "b2"]);
    let suite = generate("each-choice", &space).expect("generate");
    assert_eq!(
        suite,
        vec![
            row(&[("A", "a1"), ("B", "b1")]),
            row(&[("A", "a2"), ("B", "b2")]),
            row(&[("A", "a3"), ("B", "b1")]),
        ]
    );
}

#[test]
fn each_choice_covers_every_value() {
    for space in spaces() {
        let suite = generate("each", &space).expect("generate");
        for category in space.iter() {
            let seen: HashSet<&str> = suite
                .iter()
                .filter_map(|assignment| assignment.get(&category.name))
                .collect();
            assert_eq!(seen.len(), category.values.len(), "category {}", category.name);
        }
    }
}

#[test]
fn pairwise_covers_every_pair_within_product_size() {
    for space in spaces() {
        let full = generate("all", &space).expect("full");
        let pairwise = generate("pairwise", &space).expect("pairwise");
        assert!(pairwise.len() <= full.len());

        let universe = PairUniverse::new(&space);
        let mut covered = HashSet::new();
        for assignment in &pairwise {
            assert!(assignment.is_complete_for(&space));
            let indices: Vec<usize> = value_indices(&space, assignment)
                .into_iter()
                .map(|idx| idx.expect("permitted value"))
                .collect();
            covered.extend(universe.pairs_of(&indices));
        }
        assert_eq!(covered.len(), universe.len());
    }
}

#[test]
fn pairwise_is_deterministic() {
    let space = &spaces()[1];
    let first = generate("orthogonal", space).expect("first");
    let second = generate("pairwise", space).expect("second");
    assert_eq!(first, second);
    assert!(first.len() < 3 * 4 * 2 * 3);
}

#[test]
fn rules_without_entries_are_identity() {
    for space in spaces() {
        for strategy in ["all", "each-choice", "pairwise"] {
            let suite = generate(strategy, &space).expect("generate");
            let out = apply_rules(&space, suite.clone(), &RuleSet::new());
            assert_eq!(out, suite, "strategy {strategy}");
        }
    }
}

#[test]
fn empty_space_is_rejected() {
    let err = generate("all", &CategorySpace::new()).expect_err("no categories");
    assert!(err.to_string().contains("no categories"));
}
