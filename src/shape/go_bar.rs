// GO enrichment shaper: horizontal bars grouped by category

use crate::data::{Record, RecordSet, Value};
use crate::ir::{Axis, BarMode, BarTrace, ChartSpec, Layout, Margin, Orientation, Trace};
use crate::palette;
use crate::resolve::{resolve_columns, ColumnRole, Fallback, RoleRule, ValueKind};
use crate::PlotKind;

/// Categories beyond this many distinct values are not drawn
pub const MAX_CATEGORIES: usize = 50;

// Resolved in order; category may reuse the term column.
pub const RULES: [RoleRule; 3] = [
    RoleRule {
        role: ColumnRole::Value,
        aliases: &["logFC", "t", "B"],
        kind: Some(ValueKind::Number),
        fallback: Fallback::Position(0),
    },
    RoleRule {
        role: ColumnRole::Label,
        aliases: &["Gene.title", "ID"],
        kind: Some(ValueKind::Text),
        fallback: Fallback::Position(0),
    },
    RoleRule {
        role: ColumnRole::Category,
        aliases: &["Gene.symbol", "category"],
        kind: None,
        fallback: Fallback::Role(ColumnRole::Label),
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct GoSeries {
    /// Legend name; "Terms" when the category value is falsy
    pub name: String,
    /// Ascending by count
    pub terms: Vec<String>,
    pub counts: Vec<f64>,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoBars {
    pub count_column: String,
    pub term_column: String,
    pub category_column: String,
    /// One series per distinct category, in first-appearance order
    pub series: Vec<GoSeries>,
    /// Rows in the input, including rows in dropped categories
    pub record_count: usize,
}

pub fn shape_go_bars(records: &RecordSet) -> Option<GoBars> {
    let mapping = resolve_columns(records.first()?, &RULES);
    let count_column = mapping.get(ColumnRole::Value).to_string();
    let term_column = mapping.get(ColumnRole::Label).to_string();
    let category_column = mapping.get(ColumnRole::Category).to_string();

    // A missing column and an empty cell are distinct categories
    let category_of = |record: &Record| -> Option<Value> { record.get(&category_column).cloned() };
    let same_category = |a: &Option<Value>, b: &Option<Value>| match (a, b) {
        (Some(a), Some(b)) => a.same_value(b),
        (None, None) => true,
        _ => false,
    };

    let mut categories: Vec<Option<Value>> = Vec::new();
    for record in records {
        if categories.len() == MAX_CATEGORIES {
            break;
        }
        let category = category_of(record);
        if !categories.iter().any(|c| same_category(c, &category)) {
            categories.push(category);
        }
    }

    let series = categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let mut members: Vec<(String, f64)> = records
                .iter()
                .filter(|r| same_category(&category_of(r), category))
                .map(|r| (r.label(&term_column), super::or_zero(r.number(&count_column))))
                .collect();
            members.sort_by(|a, b| a.1.total_cmp(&b.1));
            let (terms, counts) = members.into_iter().unzip();

            GoSeries {
                name: match category {
                    Some(value) if value.is_truthy() => value.to_label(),
                    _ => "Terms".to_string(),
                },
                terms,
                counts,
                color: palette::category_color(i),
            }
        })
        .collect();

    Some(GoBars {
        count_column,
        term_column,
        category_column,
        series,
        record_count: records.len(),
    })
}

/// Chart height grows with the row count, never below 500
pub fn layout_height(record_count: usize) -> u32 {
    let grown = record_count.saturating_mul(20).saturating_add(100);
    u32::try_from(grown).unwrap_or(u32::MAX).max(500)
}

impl GoBars {
    pub fn into_chart(self) -> ChartSpec {
        let traces = self
            .series
            .into_iter()
            .map(|s| {
                Trace::Bar(BarTrace {
                    name: s.name,
                    categories: s.terms,
                    values: s.counts,
                    orientation: Orientation::Horizontal,
                    color: s.color.to_string(),
                })
            })
            .collect();

        ChartSpec {
            kind: PlotKind::Go,
            traces,
            layout: Layout {
                title: "Enrichment / Expression".to_string(),
                x_axis: Axis {
                    title: Some(self.count_column),
                    ..Axis::default()
                },
                y_axis: Axis {
                    dtick: Some(1.0),
                    ..Axis::default()
                },
                legend_title: None,
                show_legend: true,
                height: Some(layout_height(self.record_count)),
                margin: Margin {
                    left: Some(200),
                    ..Margin::default()
                },
                bar_mode: Some(BarMode::Group),
            },
        }
    }
}
