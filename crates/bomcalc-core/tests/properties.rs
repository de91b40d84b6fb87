//! Property tests for the registry and formulation builder

use bomcalc_core::{
    build_formulations, build_registry, Cell, ColorEntry, Dataset, FormulationParams,
    RegistryConfig, Row, Table,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn item(code: &str, seq: usize, weight: f64) -> Row {
    vec![
        Cell::text(code),
        Cell::text("UM03"),
        Cell::Number(1.0),
        Cell::text(format!("ingredient {seq}")),
        Cell::Number(weight),
        Cell::text("KG"),
        Cell::text("RM02"),
    ]
}

fn item_dataset(rows: Vec<Row>) -> Dataset {
    vec![("BOM Item".to_string(), Table::new(vec![Cell::text(""); 7], rows))]
        .into_iter()
        .collect()
}

fn params(group_size: usize) -> FormulationParams {
    FormulationParams {
        group_size,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn partition_is_lossless_and_ordered(
        weights in prop::collection::vec(0.0f64..500.0, 0..40),
        group_size in 1usize..10,
    ) {
        let rows = weights.iter().enumerate().map(|(i, w)| item("C", i, *w)).collect();
        let set = build_formulations(&item_dataset(rows), "C", &params(group_size));

        let seqs: Vec<String> = set
            .iter()
            .flat_map(|f| f.lines.iter().map(|l| l.ingredient.description.to_string()))
            .collect();
        let expected: Vec<String> = (0..weights.len()).map(|i| format!("ingredient {i}")).collect();
        prop_assert_eq!(seqs, expected);

        for (i, f) in set.iter().enumerate() {
            prop_assert_eq!(f.ordinal, i + 1);
            if i + 1 < set.len() {
                prop_assert_eq!(f.len(), group_size);
            } else {
                prop_assert!(f.len() >= 1 && f.len() <= group_size);
            }
        }
    }

    #[test]
    fn rounded_weights_sum_to_target(
        weights in prop::collection::vec(0.0f64..500.0, 1..40),
        group_size in 1usize..10,
    ) {
        let rows = weights.iter().enumerate().map(|(i, w)| item("C", i, *w)).collect();
        let set = build_formulations(&item_dataset(rows), "C", &params(group_size));

        for f in &set {
            let rounded: f64 = f.lines.iter().map(|l| l.weight_text.parse::<f64>().unwrap()).sum();
            if f.raw_total > 0.0 {
                let tolerance = group_size as f64 * 0.0005 + 1e-9;
                prop_assert!((rounded - 100.0).abs() <= tolerance, "sum {} off target", rounded);
            } else {
                prop_assert!(f.lines.iter().all(|l| l.normalized_weight == 0.0));
            }
        }
    }

    #[test]
    fn output_is_deterministic(
        weights in prop::collection::vec(0.0f64..500.0, 0..20),
    ) {
        let rows: Vec<Row> = weights.iter().enumerate().map(|(i, w)| item("C", i, *w)).collect();
        let ds = item_dataset(rows);
        prop_assert_eq!(
            build_formulations(&ds, "C", &params(7)),
            build_formulations(&ds, "C", &params(7))
        );
    }

    #[test]
    fn registry_is_unique_and_covers_items(
        header_codes in prop::collection::vec("[A-D][0-9]", 0..12),
        item_codes in prop::collection::vec("[A-F][0-9]", 0..30),
    ) {
        let header_rows: Vec<Row> = header_codes
            .iter()
            .map(|c| vec![Cell::text(c), Cell::text(format!("name {c}"))])
            .collect();
        let item_rows: Vec<Row> = item_codes.iter().map(|c| vec![Cell::text(c)]).collect();
        let ds: Dataset = vec![
            ("BOM Header".to_string(), Table::new(vec![Cell::text(""); 2], header_rows)),
            ("BOM Item".to_string(), Table::new(vec![Cell::text("")], item_rows)),
        ]
        .into_iter()
        .collect();

        let entries = build_registry(&ds, &RegistryConfig::default());

        let codes: HashSet<&str> = entries.iter().map(|e| e.code.as_str()).collect();
        prop_assert_eq!(codes.len(), entries.len());
        for code in &item_codes {
            prop_assert!(codes.contains(code.as_str()));
        }
        for entry in entries.iter().filter(|e| !header_codes.contains(&e.code)) {
            prop_assert_eq!(&entry.display_name, &format!("Color for {}", entry.code));
        }
    }
}

#[test]
fn item_only_code_is_selectable_and_formulated() {
    let ds: Dataset = vec![
        (
            "BOM Header".to_string(),
            Table::new(
                vec![Cell::text(""); 2],
                vec![vec![Cell::text("C100"), Cell::text("Red")]],
            ),
        ),
        (
            "BOM Item".to_string(),
            Table::new(vec![Cell::text(""); 7], vec![item("X9", 0, 4.0)]),
        ),
    ]
    .into_iter()
    .collect();

    let entries = build_registry(&ds, &RegistryConfig::default());
    assert_eq!(
        entries,
        vec![
            ColorEntry::new("C100", "Red"),
            ColorEntry::new("X9", "Color for X9")
        ]
    );

    let set = build_formulations(&ds, "X9", &FormulationParams::default());
    assert_eq!(set.len(), 1);
    assert_eq!(set.formulations[0].lines[0].weight_text, "100.000");

    let none = build_formulations(&ds, "C100", &FormulationParams::default());
    assert!(none.is_empty());
}
