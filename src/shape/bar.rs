// Differential expression bar shaper: up/down split by sign

use crate::data::RecordSet;
use crate::ir::{Axis, BarTrace, ChartSpec, Layout, Margin, Orientation, Trace};
use crate::palette;
use crate::resolve::{resolve_columns, ColumnRole, Fallback, RoleRule, ValueKind};
use crate::PlotKind;

pub const RULES: [RoleRule; 2] = [
    RoleRule {
        role: ColumnRole::Label,
        aliases: &["Gene.symbol", "Gene.title", "ID", "gene_name"],
        kind: Some(ValueKind::Text),
        fallback: Fallback::Position(0),
    },
    RoleRule {
        role: ColumnRole::Value,
        aliases: &["logFC", "log2FoldChange", "t", "B"],
        kind: Some(ValueKind::Number),
        fallback: Fallback::Position(1),
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct BarPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffBars {
    pub label_column: String,
    pub value_column: String,
    /// value > 0, descending |value|
    pub up: Vec<BarPoint>,
    /// value <= 0, descending |value|
    pub down: Vec<BarPoint>,
}

pub fn shape_diff_bars(records: &RecordSet) -> Option<DiffBars> {
    let mapping = resolve_columns(records.first()?, &RULES);
    let label_column = mapping.get(ColumnRole::Label).to_string();
    let value_column = mapping.get(ColumnRole::Value).to_string();

    let mut points: Vec<BarPoint> = records
        .iter()
        .map(|record| BarPoint {
            label: record.label(&label_column),
            value: super::or_zero(record.number(&value_column)),
        })
        .collect();

    // stable: equal magnitudes keep input order
    points.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
    let (up, down) = points.into_iter().partition(|p| p.value > 0.0);

    Some(DiffBars {
        label_column,
        value_column,
        up,
        down,
    })
}

impl DiffBars {
    pub fn into_chart(self) -> ChartSpec {
        let series = |name: &str, color: &str, points: Vec<BarPoint>| {
            let (categories, values) = points.into_iter().map(|p| (p.label, p.value)).unzip();
            Trace::Bar(BarTrace {
                name: name.to_string(),
                categories,
                values,
                orientation: Orientation::Vertical,
                color: color.to_string(),
            })
        };

        ChartSpec {
            kind: PlotKind::Bar,
            traces: vec![
                series("Upregulated", palette::UPREGULATED, self.up),
                series("Downregulated", palette::DOWNREGULATED, self.down),
            ],
            layout: Layout {
                title: "Differential Gene Expression".to_string(),
                x_axis: Axis {
                    title: Some(self.label_column),
                    tick_angle: Some(-45.0),
                    ..Axis::default()
                },
                y_axis: Axis {
                    title: Some(self.value_column),
                    zero_line: true,
                    ..Axis::default()
                },
                legend_title: None,
                show_legend: true,
                height: None,
                margin: Margin {
                    bottom: Some(100),
                    ..Margin::default()
                },
                bar_mode: None,
            },
        }
    }
}
