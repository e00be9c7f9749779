// Expression matrix shaper with optional per-row z-score

use crate::data::RecordSet;
use crate::ir::{Axis, ChartSpec, HeatmapTrace, Layout, Margin, Trace};
use crate::resolve::{resolve_columns, ColumnRole, Fallback, RoleRule};
use crate::PlotKind;

pub const RULES: [RoleRule; 1] = [RoleRule {
    role: ColumnRole::Label,
    aliases: &["Gene.symbol", "Gene.title", "ID", "Gene"],
    kind: None,
    fallback: Fallback::Position(0),
}];

/// Raw matrix as read from the records; never modified by normalization
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapMatrix {
    pub row_column: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `values[row][col]`, NaN where a cell does not parse
    pub values: Vec<Vec<f64>>,
}

/// Sample columns are the numeric columns of the first record other than the
/// row label column; later records are read through the same columns.
pub fn shape_heatmap(records: &RecordSet) -> Option<HeatmapMatrix> {
    let first = records.first()?;
    let mapping = resolve_columns(first, &RULES);
    let row_column = mapping.get(ColumnRole::Label).to_string();

    let columns: Vec<String> = first
        .iter()
        .filter(|(name, value)| *name != row_column && value.is_number())
        .map(|(name, _)| name.to_string())
        .collect();

    let rows = records.iter().map(|r| r.label(&row_column)).collect();
    let values = records
        .iter()
        .map(|r| columns.iter().map(|c| r.float(c)).collect())
        .collect();

    Some(HeatmapMatrix {
        row_column,
        rows,
        columns,
        values,
    })
}

/// Standardize one row with the population standard deviation.
/// A constant row maps to zeros; NaN cells poison their whole row.
pub fn zscore_row(row: &[f64]) -> Vec<f64> {
    // Rounding in the mean leaves a tiny nonzero deviation for constant rows
    if row.windows(2).all(|w| w[0] == w[1]) {
        return vec![0.0; row.len()];
    }
    let n = row.len() as f64;
    let mean = row.iter().sum::<f64>() / n;
    let std = (row.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    row.iter()
        .map(|v| if std == 0.0 { 0.0 } else { (v - mean) / std })
        .collect()
}

pub fn zscore_rows(values: &[Vec<f64>]) -> Vec<Vec<f64>> {
    values.iter().map(|row| zscore_row(row)).collect()
}

impl HeatmapMatrix {
    /// Matrix to display. Always derived from the raw values, so toggling
    /// z-score on and off never compounds.
    pub fn display(&self, zscore: bool) -> Vec<Vec<f64>> {
        if zscore {
            zscore_rows(&self.values)
        } else {
            self.values.clone()
        }
    }

    pub fn to_chart(&self, zscore: bool) -> ChartSpec {
        ChartSpec {
            kind: PlotKind::Heatmap,
            traces: vec![Trace::Heatmap(HeatmapTrace {
                z: self.display(zscore),
                columns: self.columns.clone(),
                rows: self.rows.clone(),
                colorscale: "RdBu".to_string(),
                reverse_scale: true,
                show_scale: true,
            })],
            layout: Layout {
                title: "Expression Heatmap".to_string(),
                x_axis: Axis {
                    tick_angle: Some(-45.0),
                    ..Axis::default()
                },
                y_axis: Axis::default(),
                legend_title: None,
                show_legend: false,
                height: None,
                margin: Margin {
                    left: Some(100),
                    bottom: Some(100),
                    ..Margin::default()
                },
                bar_mode: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Record, Value};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    fn gene_row(symbol: &str, samples: &[f64]) -> Record {
        let mut record = Record::new();
        record.insert("Gene.symbol", symbol);
        for (i, v) in samples.iter().enumerate() {
            record.insert(format!("S{}", i + 1), *v);
        }
        record
    }

    #[test]
    fn test_zscore_known_row() {
        let z = zscore_row(&[10.0, 12.0, 5.0, 2.0]);
        // mean 7.25, population std sqrt(15.6875)
        let expected = [0.6943, 1.1993, -0.5681, -1.3255];
        for (got, want) in z.iter().zip(expected) {
            assert!(approx(*got, want), "{} != {}", got, want);
        }
    }

    #[test]
    fn test_zscore_constant_row_is_zero() {
        assert_eq!(zscore_row(&[4.0, 4.0, 4.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(zscore_row(&[0.1, 0.1, 0.1]), vec![0.0, 0.0, 0.0]);
        assert_eq!(zscore_row(&[7.3]), vec![0.0]);
        assert!(zscore_row(&[]).is_empty());
    }

    #[test]
    fn test_zscore_rows_have_zero_mean_unit_variance() {
        let matrix = vec![vec![1.0, 2.0, 3.0, 10.0], vec![-5.0, 0.5, 7.0, 2.0]];
        for row in zscore_rows(&matrix) {
            let n = row.len() as f64;
            let mean = row.iter().sum::<f64>() / n;
            let var = row.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            assert!(approx(mean, 0.0));
            assert!(approx(var, 1.0));
        }
    }

    #[test]
    fn test_zscore_of_normalized_row_is_stable() {
        let raw = [10.0, 12.0, 5.0, 2.0];
        let once = zscore_row(&raw);
        let twice = zscore_row(&once);
        for (a, b) in once.iter().zip(&twice) {
            assert!((a - b).abs() < 1e-12, "{} vs {}", a, b);
        }

        // The first pass moves the mean, a second one does not
        let mean = |row: &[f64]| row.iter().sum::<f64>() / row.len() as f64;
        assert!((mean(&raw) - mean(&once)).abs() > 1.0);
        assert!((mean(&once) - mean(&twice)).abs() < 1e-12);
    }

    #[test]
    fn test_nan_cell_poisons_its_row_only() {
        let z = zscore_rows(&[vec![1.0, f64::NAN], vec![1.0, 3.0]]);
        assert!(z[0].iter().all(|v| v.is_nan()));
        assert_eq!(z[1], vec![-1.0, 1.0]);
    }

    #[test]
    fn test_sample_columns_are_numeric_non_label_columns() {
        let mut first = Record::new();
        first.insert("ID", "p1");
        first.insert("Gene.symbol", "TP53");
        first.insert("S1", 1.0);
        first.insert("note", "x");
        first.insert("S2", 2.0);
        let data = RecordSet::new(vec![first]);
        let matrix = shape_heatmap(&data).unwrap();
        assert_eq!(matrix.row_column, "Gene.symbol");
        assert_eq!(matrix.columns, vec!["S1", "S2"]);
        assert_eq!(matrix.rows, vec!["TP53"]);
    }

    #[test]
    fn test_cells_use_prefix_parsing() {
        let mut second = Record::new();
        second.insert("Gene.symbol", "B");
        second.insert("S1", "3.5 units");
        second.insert("S2", "none");
        let data = RecordSet::new(vec![gene_row("A", &[1.0, 2.0]), second]);
        let matrix = shape_heatmap(&data).unwrap();
        assert_eq!(matrix.values[1][0], 3.5);
        assert!(matrix.values[1][1].is_nan());
    }

    #[test]
    fn test_display_is_derived_from_raw() {
        let data = RecordSet::new(vec![
            gene_row("Gene1", &[10.0, 12.0, 5.0, 2.0]),
            gene_row("Gene2", &[2.0, 3.0, 15.0, 18.0]),
        ]);
        let matrix = shape_heatmap(&data).unwrap();
        let raw = matrix.display(false);
        let on = matrix.display(true);
        assert_eq!(raw, matrix.values);
        assert_ne!(on, raw);
        // off -> on -> off -> on: both "on" views match and raw is intact
        assert_eq!(matrix.display(false), raw);
        assert_eq!(matrix.display(true), on);
        let raw_mean: f64 = raw[0].iter().sum::<f64>() / 4.0;
        let on_mean: f64 = on[0].iter().sum::<f64>() / 4.0;
        assert!(approx(raw_mean, 7.25));
        assert!(approx(on_mean, 0.0));
    }

    #[test]
    fn test_label_only_records_have_no_samples() {
        let data = RecordSet::new(vec![Record::from_iter([("Gene", Value::from("X"))])]);
        let matrix = shape_heatmap(&data).unwrap();
        assert!(matrix.columns.is_empty());
        assert_eq!(matrix.values, vec![Vec::<f64>::new()]);
        let chart = matrix.to_chart(true);
        assert_eq!(chart.heatmap_trace().unwrap().z, vec![Vec::<f64>::new()]);
    }

    #[test]
    fn test_chart_uses_reversed_rd_bu() {
        let data = RecordSet::new(vec![gene_row("A", &[1.0, 2.0])]);
        let chart = shape_heatmap(&data).unwrap().to_chart(false);
        let trace = chart.heatmap_trace().unwrap();
        assert_eq!(trace.colorscale, "RdBu");
        assert!(trace.reverse_scale);
        assert_eq!(chart.layout.title, "Expression Heatmap");
    }
}
