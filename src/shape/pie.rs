// Pie shaper: one slice per record

use crate::data::RecordSet;
use crate::ir::{Axis, ChartSpec, Layout, Margin, PieTrace, Trace};
use crate::palette;
use crate::resolve::{resolve_columns, ColumnRole, Fallback, RoleRule, ValueKind};
use crate::PlotKind;

pub const RULES: [RoleRule; 2] = [
    RoleRule {
        role: ColumnRole::Label,
        aliases: &["Gene.symbol", "Gene.title", "ID", "category"],
        kind: Some(ValueKind::Text),
        fallback: Fallback::Position(0),
    },
    RoleRule {
        role: ColumnRole::Value,
        aliases: &["logFC", "t", "B", "P.Value", "value"],
        kind: Some(ValueKind::Number),
        fallback: Fallback::Position(1),
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieData {
    pub label_column: String,
    pub value_column: String,
    pub slices: Vec<PieSlice>,
}

/// Slice magnitudes are absolute values; sign is dropped, the record is kept.
pub fn shape_pie(records: &RecordSet) -> Option<PieData> {
    let mapping = resolve_columns(records.first()?, &RULES);
    let label_column = mapping.get(ColumnRole::Label).to_string();
    let value_column = mapping.get(ColumnRole::Value).to_string();

    let slices = records
        .iter()
        .map(|record| PieSlice {
            label: record.label(&label_column),
            magnitude: super::or_zero(record.number(&value_column).abs()),
        })
        .collect();

    Some(PieData {
        label_column,
        value_column,
        slices,
    })
}

impl PieData {
    pub fn into_chart(self) -> ChartSpec {
        let colors = (0..self.slices.len())
            .map(|i| palette::pie_color(i).to_string())
            .collect();
        let (labels, values) = self
            .slices
            .into_iter()
            .map(|s| (s.label, s.magnitude))
            .unzip();

        ChartSpec {
            kind: PlotKind::Pie,
            traces: vec![Trace::Pie(PieTrace {
                labels,
                values,
                colors,
            })],
            layout: Layout {
                title: format!("Distribution of {}", self.value_column),
                x_axis: Axis::default(),
                y_axis: Axis::default(),
                legend_title: Some(self.label_column),
                show_legend: true,
                height: None,
                margin: Margin {
                    top: Some(50),
                    bottom: Some(50),
                    left: Some(50),
                    right: Some(50),
                },
                bar_mode: None,
            },
        }
    }
}
