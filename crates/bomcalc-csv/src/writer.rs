//! Formulation export

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use bomcalc_core::FormulationSet;

/// Serializes formulation sets for download or clipboard
pub struct FormulationWriter;

impl FormulationWriter {
    /// Export text of a formulation set.
    ///
    /// A header line of the comma-joined labels, then per formulation an empty
    /// line, a quoted `=== Formulation N ===` marker line padded with empty
    /// quoted fields to the label count, and one fully quoted line per
    /// ingredient. Lines end in `\n`.
    ///
    /// ```text
    /// Code,Unit,Qty,Description,Weight (kg),Unit,Type
    ///
    /// "=== Formulation 1 ===","","","","","",""
    /// "C100","UM03","1","Red pigment","14.286","KG","RM02"
    /// ```
    pub fn serialize<S: AsRef<str>>(set: &FormulationSet, column_labels: &[S]) -> CsvResult<String> {
        let mut out = Vec::new();
        Self::write(set, column_labels, &mut out)?;
        String::from_utf8(out).map_err(|e| {
            CsvError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    /// Write the export text of a formulation set to a writer
    pub fn write<W: Write, S: AsRef<str>>(
        set: &FormulationSet,
        column_labels: &[S],
        mut writer: W,
    ) -> CsvResult<()> {
        if column_labels.is_empty() {
            writer.write_all(b"\n")?;
        } else {
            let mut header = csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::Necessary)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(&mut writer);
            header.write_record(column_labels.iter().map(|l| l.as_ref()))?;
            header.flush()?;
        }

        let width = column_labels.len().max(1);
        for formulation in set {
            writer.write_all(b"\n")?;

            let mut body = csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::Always)
                .terminator(csv::Terminator::Any(b'\n'))
                .flexible(true)
                .from_writer(&mut writer);

            let marker = format!("=== Formulation {} ===", formulation.ordinal);
            let mut marker_record = vec![marker.as_str()];
            marker_record.resize(width, "");
            body.write_record(&marker_record)?;

            for line in &formulation.lines {
                body.write_record(&line.fields())?;
            }
            body.flush()?;
        }

        Ok(())
    }

    /// Write the export text to a file
    pub fn write_file<P: AsRef<Path>, S: AsRef<str>>(
        set: &FormulationSet,
        column_labels: &[S],
        path: P,
    ) -> CsvResult<()> {
        let mut file = File::create(path)?;
        Self::write(set, column_labels, &mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Every ingredient line of every formulation, fields tab-separated, lines
    /// newline-separated, no headers or markers
    pub fn clipboard_text(set: &FormulationSet) -> String {
        set.iter()
            .flat_map(|f| f.lines.iter())
            .map(|line| line.fields().join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Default download name for a color's export
pub fn export_file_name(code: &str) -> String {
    format!("formulations_{}_all.csv", code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomcalc_core::{Cell, Formulation, FormulationLine, IngredientRow};
    use pretty_assertions::assert_eq;

    fn line(code: &str, description: &str, weight: &str) -> FormulationLine {
        FormulationLine {
            ingredient: IngredientRow {
                code: Cell::text(code),
                unit: Cell::text("UM03"),
                quantity: Cell::Number(1.0),
                description: Cell::text(description),
                raw_weight: 0.0,
                weight_unit: Cell::text("KG"),
                material_type: Cell::Absent,
            },
            normalized_weight: weight.parse().unwrap(),
            weight_text: weight.to_string(),
        }
    }

    fn set() -> FormulationSet {
        FormulationSet {
            code: "C1".to_string(),
            formulations: vec![
                Formulation {
                    ordinal: 1,
                    lines: vec![line("C1", "Red", "60.000"), line("C1", "say \"hi\"", "40.000")],
                    raw_total: 5.0,
                },
                Formulation {
                    ordinal: 2,
                    lines: vec![line("C1", "Base, white", "100.000")],
                    raw_total: 1.0,
                },
            ],
        }
    }

    const LABELS: [&str; 7] = ["Code", "Unit", "Qty", "Description", "Weight (kg)", "Unit", "Type"];

    #[test]
    fn test_serialize_layout() {
        let text = FormulationWriter::serialize(&set(), &LABELS).unwrap();
        let expected = "\
Code,Unit,Qty,Description,Weight (kg),Unit,Type

\"=== Formulation 1 ===\",\"\",\"\",\"\",\"\",\"\",\"\"
\"C1\",\"UM03\",\"1\",\"Red\",\"60.000\",\"KG\",\"\"
\"C1\",\"UM03\",\"1\",\"say \"\"hi\"\"\",\"40.000\",\"KG\",\"\"

\"=== Formulation 2 ===\",\"\",\"\",\"\",\"\",\"\",\"\"
\"C1\",\"UM03\",\"1\",\"Base, white\",\"100.000\",\"KG\",\"\"
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_serialize_empty_set() {
        let text = FormulationWriter::serialize(&FormulationSet::empty("X"), &LABELS).unwrap();
        assert_eq!(text, "Code,Unit,Qty,Description,Weight (kg),Unit,Type\n");

        let no_labels: [&str; 0] = [];
        let text = FormulationWriter::serialize(&FormulationSet::empty("X"), &no_labels).unwrap();
        assert_eq!(text, "\n");
    }

    #[test]
    fn test_header_quotes_only_when_needed() {
        let text = FormulationWriter::serialize(&FormulationSet::empty("X"), &["Code", "Weight, kg"]).unwrap();
        assert_eq!(text, "Code,\"Weight, kg\"\n");
    }

    #[test]
    fn test_clipboard_text() {
        let text = FormulationWriter::clipboard_text(&set());
        assert_eq!(
            text,
            "C1\tUM03\t1\tRed\t60.000\tKG\t\n\
             C1\tUM03\t1\tsay \"hi\"\t40.000\tKG\t\n\
             C1\tUM03\t1\tBase, white\t100.000\tKG\t"
        );
        assert_eq!(FormulationWriter::clipboard_text(&FormulationSet::empty("X")), "");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("C100"), "formulations_C100_all.csv");
    }
}
