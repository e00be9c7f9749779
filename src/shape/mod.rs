//! Chart shapers.
//!
//! A shaper takes a record set, resolves the columns it needs through
//! [`crate::resolve`], and produces typed series for one chart type. Those
//! series convert into a [`ChartSpec`]. Shaping never fails on data: odd
//! values degrade to zero, empty labels or NaN cells. The only case without
//! a chart is an empty record set.

pub mod bar;
pub mod go_bar;
pub mod heatmap;
pub mod pie;

use crate::data::RecordSet;
use crate::ir::ChartSpec;
use crate::PlotKind;

/// Viewer toggles that change the display but are never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub zscore: bool,
}

/// Shape `records` as a chart of the given kind; `None` for an empty set
pub fn shape_chart(kind: PlotKind, records: &RecordSet, view: &ViewOptions) -> Option<ChartSpec> {
    match kind {
        PlotKind::Pie => pie::shape_pie(records).map(pie::PieData::into_chart),
        PlotKind::Bar => bar::shape_diff_bars(records).map(bar::DiffBars::into_chart),
        PlotKind::Heatmap => heatmap::shape_heatmap(records).map(|m| m.to_chart(view.zscore)),
        PlotKind::Go => go_bar::shape_go_bars(records).map(go_bar::GoBars::into_chart),
    }
}

/// Numeric value used for ordering and bar lengths; NaN becomes zero
pub(crate) fn or_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn test_empty_records_have_no_chart() {
        for kind in PlotKind::ALL {
            assert!(shape_chart(kind, &RecordSet::default(), &ViewOptions::default()).is_none());
        }
    }

    #[test]
    fn test_every_sample_shapes_into_its_own_kind() {
        for kind in PlotKind::ALL {
            let chart = shape_chart(kind, &samples::sample_for(kind), &ViewOptions::default())
                .expect("sample data is never empty");
            assert_eq!(chart.kind, kind);
            assert!(!chart.traces.is_empty());
        }
    }

    #[test]
    fn test_any_record_set_shapes_under_any_kind() {
        // Data meant for one chart must still render under another.
        for data_kind in PlotKind::ALL {
            let records = samples::sample_for(data_kind);
            for kind in PlotKind::ALL {
                assert!(shape_chart(kind, &records, &ViewOptions { zscore: true }).is_some());
            }
        }
    }
}
