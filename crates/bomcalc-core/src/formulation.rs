//! Formulation building: group a color's ingredient rows and rescale their weights

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::registry::ColorEntry;
use crate::table::{Dataset, Row, Table};

/// Positions of the ingredient fields in the item table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub code: usize,
    pub unit: usize,
    pub quantity: usize,
    pub description: usize,
    pub weight: usize,
    pub weight_unit: usize,
    pub material_type: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            code: 0,
            unit: 1,
            quantity: 2,
            description: 3,
            weight: 4,
            weight_unit: 5,
            material_type: 6,
        }
    }
}

/// What to do with a negative raw weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeWeightPolicy {
    /// Use the value as given; it can produce negative normalized weights
    #[default]
    Keep,
    /// Count it as 0
    ClampToZero,
}

/// Parameters for building formulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulationParams {
    /// Sheet holding ingredient rows
    pub item_sheet: String,
    /// Rows per formulation
    pub group_size: usize,
    /// Mass every formulation is rescaled to
    pub target_mass: f64,
    /// Fractional digits of the normalized weight text
    pub precision: usize,
    /// Where each ingredient field lives
    pub columns: ColumnMap,
    /// Handling of negative raw weights
    pub negative_weights: NegativeWeightPolicy,
}

impl Default for FormulationParams {
    fn default() -> Self {
        Self {
            item_sheet: "BOM Item".to_string(),
            group_size: 7,
            target_mass: 100.0,
            precision: 3,
            columns: ColumnMap::default(),
            negative_weights: NegativeWeightPolicy::default(),
        }
    }
}

impl FormulationParams {
    /// Reject a zero group size or a target mass that is not positive
    pub fn validate(&self) -> Result<()> {
        if self.group_size == 0 {
            return Err(Error::ZeroGroupSize);
        }
        if !(self.target_mass.is_finite() && self.target_mass > 0.0) {
            return Err(Error::InvalidTargetMass(self.target_mass));
        }
        Ok(())
    }
}

/// One ingredient, projected from an item row
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientRow {
    pub code: Cell,
    pub unit: Cell,
    pub quantity: Cell,
    pub description: Cell,
    /// Parsed weight; unparsable or absent cells read as 0
    pub raw_weight: f64,
    pub weight_unit: Cell,
    pub material_type: Cell,
}

impl IngredientRow {
    /// Project an item row through a column map
    pub fn from_row(row: &[Cell], columns: &ColumnMap) -> Self {
        let cell = |col: usize| row.get(col).cloned().unwrap_or_default();
        Self {
            code: cell(columns.code),
            unit: cell(columns.unit),
            quantity: cell(columns.quantity),
            description: cell(columns.description),
            raw_weight: row.get(columns.weight).map_or(0.0, Cell::weight),
            weight_unit: cell(columns.weight_unit),
            material_type: cell(columns.material_type),
        }
    }
}

/// An ingredient with its rescaled weight
#[derive(Debug, Clone, PartialEq)]
pub struct FormulationLine {
    pub ingredient: IngredientRow,
    /// Share of the target mass
    pub normalized_weight: f64,
    /// `normalized_weight` with the configured fractional digits
    pub weight_text: String,
}

impl FormulationLine {
    /// The line as display fields, weight replaced by its normalized text
    pub fn fields(&self) -> [String; 7] {
        let i = &self.ingredient;
        [
            i.code.to_string(),
            i.unit.to_string(),
            i.quantity.to_string(),
            i.description.to_string(),
            self.weight_text.clone(),
            i.weight_unit.to_string(),
            i.material_type.to_string(),
        ]
    }
}

/// One group of ingredient rows rescaled to the target mass
#[derive(Debug, Clone, PartialEq)]
pub struct Formulation {
    /// 1-based position within its set
    pub ordinal: usize,
    pub lines: Vec<FormulationLine>,
    /// Sum of the raw weights of the group
    pub raw_total: f64,
}

impl Formulation {
    /// Sum of the normalized weights
    pub fn total_normalized(&self) -> f64 {
        self.lines.iter().map(|l| l.normalized_weight).sum()
    }

    /// Number of ingredient lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the formulation has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Every formulation of one color code, in source order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormulationSet {
    pub code: String,
    pub formulations: Vec<Formulation>,
}

impl FormulationSet {
    /// An empty set for a code without ingredient rows
    pub fn empty<S: Into<String>>(code: S) -> Self {
        Self {
            code: code.into(),
            formulations: Vec::new(),
        }
    }

    /// Number of formulations
    pub fn len(&self) -> usize {
        self.formulations.len()
    }

    /// Check if there are no formulations
    pub fn is_empty(&self) -> bool {
        self.formulations.is_empty()
    }

    /// Total ingredient lines across all formulations
    pub fn line_count(&self) -> usize {
        self.formulations.iter().map(Formulation::len).sum()
    }

    /// Iterate over the formulations
    pub fn iter(&self) -> std::slice::Iter<'_, Formulation> {
        self.formulations.iter()
    }
}

impl<'a> IntoIterator for &'a FormulationSet {
    type Item = &'a Formulation;
    type IntoIter = std::slice::Iter<'a, Formulation>;

    fn into_iter(self) -> Self::IntoIter {
        self.formulations.iter()
    }
}

/// Build the formulations of one color code.
///
/// Item rows whose trimmed code equals `color_code` are taken in source order
/// and cut into consecutive groups of `group_size`; the last group may be
/// shorter and is kept as its own formulation. Each group's weights are
/// rescaled so they sum to `target_mass`; a group whose raw weights sum to 0
/// gets all-zero weights. Unknown codes and missing sheets give an empty set.
pub fn build_formulations(
    dataset: &Dataset,
    color_code: &str,
    params: &FormulationParams,
) -> FormulationSet {
    let code = color_code.trim();
    let Some(items) = usable_items(dataset, params) else {
        return FormulationSet::empty(code);
    };

    let rows: Vec<&Row> = items
        .rows()
        .iter()
        .filter(|row| row_code(row, &params.columns).as_deref() == Some(code))
        .collect();

    formulate(code, &rows, params)
}

/// Formulations precomputed for every registry code
#[derive(Debug, Clone, Default)]
pub struct FormulationIndex {
    sets: AHashMap<String, FormulationSet>,
}

impl FormulationIndex {
    /// Compute the sets of every registry code in one pass over the item table
    ///
    /// Only codes with at least one ingredient row are stored.
    pub fn build(dataset: &Dataset, registry: &[ColorEntry], params: &FormulationParams) -> Self {
        let Some(items) = usable_items(dataset, params) else {
            return Self::default();
        };

        let mut buckets: AHashMap<String, Vec<&Row>> = AHashMap::new();
        for row in items.rows() {
            if let Some(code) = row_code(row, &params.columns) {
                buckets.entry(code).or_default().push(row);
            }
        }

        let sets: AHashMap<String, FormulationSet> = registry
            .iter()
            .filter_map(|entry| {
                let rows = buckets.get(&entry.code)?;
                Some((entry.code.clone(), formulate(&entry.code, rows, params)))
            })
            .collect();

        tracing::debug!(codes = sets.len(), "precomputed formulations");
        Self { sets }
    }

    /// The precomputed set of a code, if it has ingredient rows
    pub fn get(&self, code: &str) -> Option<&FormulationSet> {
        self.sets.get(code.trim())
    }

    /// The set of a code, empty when it has none
    pub fn lookup(&self, code: &str) -> FormulationSet {
        self.get(code)
            .cloned()
            .unwrap_or_else(|| FormulationSet::empty(code.trim()))
    }

    /// Number of codes with formulations
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if no code has formulations
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

fn usable_items<'a>(dataset: &'a Dataset, params: &FormulationParams) -> Option<&'a Table> {
    if let Err(e) = params.validate() {
        tracing::warn!(error = %e, "invalid formulation parameters, no formulations built");
        return None;
    }
    let items = dataset.get(&params.item_sheet);
    if items.is_none() {
        tracing::debug!(sheet = %params.item_sheet, "item sheet missing");
    }
    items
}

fn row_code(row: &[Cell], columns: &ColumnMap) -> Option<String> {
    row.get(columns.code).and_then(Cell::key)
}

fn formulate(code: &str, rows: &[&Row], params: &FormulationParams) -> FormulationSet {
    let formulations = rows
        .chunks(params.group_size)
        .enumerate()
        .map(|(i, group)| formulate_group(code, i + 1, group, params))
        .collect();

    FormulationSet {
        code: code.to_string(),
        formulations,
    }
}

fn formulate_group(code: &str, ordinal: usize, group: &[&Row], params: &FormulationParams) -> Formulation {
    let ingredients: Vec<IngredientRow> = group
        .iter()
        .map(|row| {
            let mut ingredient = IngredientRow::from_row(row, &params.columns);
            if ingredient.raw_weight < 0.0 {
                tracing::warn!(
                    code,
                    ordinal,
                    weight = ingredient.raw_weight,
                    policy = ?params.negative_weights,
                    "negative ingredient weight"
                );
                if params.negative_weights == NegativeWeightPolicy::ClampToZero {
                    ingredient.raw_weight = 0.0;
                }
            }
            ingredient
        })
        .collect();

    let raw_total: f64 = ingredients.iter().map(|i| i.raw_weight).sum();

    let lines = ingredients
        .into_iter()
        .map(|ingredient| {
            let normalized_weight = if raw_total > 0.0 {
                (ingredient.raw_weight / raw_total) * params.target_mass
            } else {
                0.0
            };
            FormulationLine {
                weight_text: format!("{:.*}", params.precision, normalized_weight),
                normalized_weight,
                ingredient,
            }
        })
        .collect();

    Formulation {
        ordinal,
        lines,
        raw_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use pretty_assertions::assert_eq;

    fn item(code: &str, weight: Cell) -> Row {
        vec![
            Cell::text(code),
            Cell::text("UM03"),
            Cell::Number(1.0),
            Cell::text(format!("{code} pigment")),
            weight,
            Cell::text("KG"),
            Cell::text("RM02"),
        ]
    }

    fn dataset(rows: Vec<Row>) -> Dataset {
        let header = ["Code", "Unit", "Qty", "Description", "Weight", "Unit", "Type"]
            .iter()
            .map(|s| Cell::text(s))
            .collect();
        vec![("BOM Item".to_string(), Table::new(header, rows))]
            .into_iter()
            .collect()
    }

    fn weights(f: &Formulation) -> Vec<&str> {
        f.lines.iter().map(|l| l.weight_text.as_str()).collect()
    }

    #[test]
    fn test_nine_rows_make_two_formulations() {
        let mut rows: Vec<Row> = (0..7).map(|_| item("C100", Cell::Number(10.0))).collect();
        rows.push(item("C100", Cell::Number(5.0)));
        rows.push(item("C100", Cell::Number(5.0)));

        let set = build_formulations(&dataset(rows), "C100", &FormulationParams::default());

        assert_eq!(set.len(), 2);
        assert_eq!(weights(&set.formulations[0]), vec!["14.286"; 7]);
        assert_eq!(weights(&set.formulations[1]), vec!["50.000", "50.000"]);
        assert_eq!(set.formulations[0].ordinal, 1);
        assert_eq!(set.formulations[1].ordinal, 2);
        assert_eq!(set.formulations[1].raw_total, 10.0);
        assert!((set.formulations[0].total_normalized() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_selects_only_matching_code_in_order() {
        let rows = vec![
            item("A", Cell::Number(1.0)),
            item("B", Cell::Number(2.0)),
            item(" A ", Cell::Number(3.0)),
        ];
        let set = build_formulations(&dataset(rows), "A", &FormulationParams::default());

        assert_eq!(set.len(), 1);
        let raw: Vec<f64> = set.formulations[0]
            .lines
            .iter()
            .map(|l| l.ingredient.raw_weight)
            .collect();
        assert_eq!(raw, vec![1.0, 3.0]);
        assert_eq!(weights(&set.formulations[0]), vec!["25.000", "75.000"]);
    }

    #[test]
    fn test_zero_sum_group_is_all_zero() {
        let rows = vec![
            item("Z", Cell::Absent),
            item("Z", Cell::text("n/a")),
            item("Z", Cell::Number(0.0)),
        ];
        let set = build_formulations(&dataset(rows), "Z", &FormulationParams::default());

        assert_eq!(weights(&set.formulations[0]), vec!["0.000"; 3]);
        assert_eq!(set.formulations[0].raw_total, 0.0);
    }

    #[test]
    fn test_text_weights_are_parsed() {
        let rows = vec![item("T", Cell::text("30 kg")), item("T", Cell::text("10"))];
        let set = build_formulations(&dataset(rows), "T", &FormulationParams::default());
        assert_eq!(weights(&set.formulations[0]), vec!["75.000", "25.000"]);
    }

    #[test]
    fn test_unknown_code_and_missing_sheet() {
        let set = build_formulations(
            &dataset(vec![item("A", Cell::Number(1.0))]),
            "NOPE",
            &FormulationParams::default(),
        );
        assert!(set.is_empty());
        assert_eq!(set.code, "NOPE");

        let set = build_formulations(&Dataset::new(), "A", &FormulationParams::default());
        assert!(set.is_empty());
    }

    #[test]
    fn test_invalid_params_degrade_to_empty() {
        let ds = dataset(vec![item("A", Cell::Number(1.0))]);
        let params = FormulationParams {
            group_size: 0,
            ..Default::default()
        };
        assert!(build_formulations(&ds, "A", &params).is_empty());
        assert!(matches!(params.validate(), Err(Error::ZeroGroupSize)));

        let params = FormulationParams {
            target_mass: -1.0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidTargetMass(_))));
    }

    #[test]
    fn test_negative_weight_policies() {
        let rows = vec![
            item("N", Cell::Number(-10.0)),
            item("N", Cell::Number(30.0)),
        ];
        let ds = dataset(rows);

        let kept = build_formulations(&ds, "N", &FormulationParams::default());
        assert_eq!(weights(&kept.formulations[0]), vec!["-50.000", "150.000"]);

        let params = FormulationParams {
            negative_weights: NegativeWeightPolicy::ClampToZero,
            ..Default::default()
        };
        let clamped = build_formulations(&ds, "N", &params);
        assert_eq!(weights(&clamped.formulations[0]), vec!["0.000", "100.000"]);
    }

    #[test]
    fn test_custom_group_size_and_target() {
        let rows = (1..=5).map(|w| item("G", Cell::from(w))).collect();
        let params = FormulationParams {
            group_size: 2,
            target_mass: 10.0,
            precision: 1,
            ..Default::default()
        };
        let set = build_formulations(&dataset(rows), "G", &params);

        assert_eq!(set.len(), 3);
        assert_eq!(weights(&set.formulations[0]), vec!["3.3", "6.7"]);
        assert_eq!(weights(&set.formulations[2]), vec!["10.0"]);
    }

    #[test]
    fn test_line_fields() {
        let set = build_formulations(
            &dataset(vec![item("F", Cell::Number(2.0))]),
            "F",
            &FormulationParams::default(),
        );
        assert_eq!(
            set.formulations[0].lines[0].fields(),
            [
                "F".to_string(),
                "UM03".to_string(),
                "1".to_string(),
                "F pigment".to_string(),
                "100.000".to_string(),
                "KG".to_string(),
                "RM02".to_string(),
            ]
        );
    }

    #[test]
    fn test_index_matches_direct_build() {
        let rows = vec![
            item("A", Cell::Number(1.0)),
            item("B", Cell::Number(2.0)),
            item("A", Cell::Number(3.0)),
        ];
        let ds = dataset(rows);
        let registry = vec![
            ColorEntry::new("A", "a"),
            ColorEntry::new("B", "b"),
            ColorEntry::new("C", "c"),
        ];
        let params = FormulationParams::default();
        let index = FormulationIndex::build(&ds, &registry, &params);

        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("A"), build_formulations(&ds, "A", &params));
        assert_eq!(index.lookup("B"), build_formulations(&ds, "B", &params));
        assert!(index.get("C").is_none());
        assert!(index.lookup("C").is_empty());
    }
}
