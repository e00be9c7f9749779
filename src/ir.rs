use crate::PlotKind;
use serde::Serialize;

// =============================================================================
// Chart Specification
// =============================================================================

/// Renderer-independent description of one chart: traces plus layout.
/// Produced by a shaper, consumed by the graph backend or serialized as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: PlotKind,
    pub traces: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie(PieTrace),
    Bar(BarTrace),
    Heatmap(HeatmapTrace),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieTrace {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Categories along x, bar lengths along y
    Vertical,
    /// Categories along y, bar lengths along x
    Horizontal,
}

/// One named bar series; `categories[i]` is drawn with length `values[i]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub orientation: Orientation,
    pub color: String,
}

/// Row-major matrix; `z[row][col]`, NaN for missing cells (serialized as null)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapTrace {
    pub z: Vec<Vec<f64>>,
    pub columns: Vec<String>,
    pub rows: Vec<String>,
    pub colorscale: String,
    pub reverse_scale: bool,
    pub show_scale: bool,
}

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layout {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_title: Option<String>,
    pub show_legend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_mode: Option<BarMode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_angle: Option<f64>,
    pub zero_line: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Margin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Group,
}

impl ChartSpec {
    pub fn bar_traces(&self) -> impl Iterator<Item = &BarTrace> {
        self.traces.iter().filter_map(|t| match t {
            Trace::Bar(bar) => Some(bar),
            _ => None,
        })
    }

    pub fn pie_trace(&self) -> Option<&PieTrace> {
        self.traces.iter().find_map(|t| match t {
            Trace::Pie(pie) => Some(pie),
            _ => None,
        })
    }

    pub fn heatmap_trace(&self) -> Option<&HeatmapTrace> {
        self.traces.iter().find_map(|t| match t {
            Trace::Heatmap(heatmap) => Some(heatmap),
            _ => None,
        })
    }
}
