// Render pipeline: records -> chart spec -> image bytes

use crate::data::RecordSet;
use crate::graph;
use crate::ir::ChartSpec;
use crate::shape::{shape_chart, ViewOptions};
use crate::{PlotKind, RenderOptions};
use anyhow::{Context, Result};

/// Upper bound on either side of the output canvas, in pixels
const MAX_CANVAS_SIDE: u32 = 16_384;

/// Shape `records` as `kind` and render them
pub fn render_records(
    kind: PlotKind,
    records: &RecordSet,
    view: &ViewOptions,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let chart = build_chart(kind, records, view)?;
    render_chart(&chart, options)
}

pub fn build_chart(kind: PlotKind, records: &RecordSet, view: &ViewOptions) -> Result<ChartSpec> {
    if records.is_empty() {
        anyhow::bail!("Plot requires at least one data row");
    }
    shape_chart(kind, records, view).with_context(|| format!("Failed to shape {} chart", kind))
}

/// Render an already shaped chart as PNG or SVG bytes
pub fn render_chart(chart: &ChartSpec, options: &RenderOptions) -> Result<Vec<u8>> {
    validate_canvas(options)?;
    graph::render(chart, options)
        .with_context(|| format!("Failed to render {} chart", chart.kind))
}

/// Chart spec as pretty JSON (NaN cells become null)
pub fn chart_json(chart: &ChartSpec) -> Result<String> {
    serde_json::to_string_pretty(chart).context("Failed to serialize chart")
}

fn validate_canvas(options: &RenderOptions) -> Result<()> {
    if options.width == 0 || options.height == 0 {
        anyhow::bail!(
            "Canvas size must be positive (width: {}, height: {})",
            options.width,
            options.height
        );
    }
    let (width, height) = options.pixel_size().with_context(|| {
        format!(
            "Canvas of {}x{} at scale {} overflows the pixel range",
            options.width, options.height, options.scale
        )
    })?;
    if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
        anyhow::bail!(
            "Canvas of {}x{} pixels exceeds the {} pixel limit",
            width,
            height,
            MAX_CANVAS_SIDE
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn test_empty_records_are_rejected() {
        let err = build_chart(PlotKind::Pie, &RecordSet::default(), &ViewOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Plot requires at least one data row");
    }

    #[test]
    fn test_zero_sized_canvas_is_rejected() {
        let chart = build_chart(PlotKind::Bar, &samples::fold_changes(), &ViewOptions::default())
            .unwrap();
        let options = RenderOptions {
            width: 0,
            ..RenderOptions::default()
        };
        assert!(render_chart(&chart, &options).is_err());
    }

    #[test]
    fn test_oversized_canvas_is_rejected() {
        let chart = build_chart(PlotKind::Bar, &samples::fold_changes(), &ViewOptions::default())
            .unwrap();
        let options = RenderOptions {
            scale: 20,
            ..RenderOptions::default()
        };
        let err = render_chart(&chart, &options).unwrap_err();
        assert!(err.to_string().contains("pixel limit"));
    }

    #[test]
    fn test_overflowing_canvas_is_rejected() {
        let chart = build_chart(PlotKind::Pie, &samples::transcript_classes(), &ViewOptions::default())
            .unwrap();
        let options = RenderOptions {
            width: 2_147_483_649,
            scale: 2,
            ..RenderOptions::default()
        };
        let err = render_chart(&chart, &options).unwrap_err();
        assert!(err.to_string().contains("overflows the pixel range"));
    }

    #[test]
    fn test_chart_json_uses_null_for_missing_cells() {
        let mut records: Vec<_> = samples::expression_matrix().iter().cloned().collect();
        records[1].insert("Sample1", "n/a");
        let records: RecordSet = records.into_iter().collect();

        let chart = build_chart(PlotKind::Heatmap, &records, &ViewOptions::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&chart_json(&chart).unwrap()).unwrap();
        let z = &json["traces"][0]["z"];
        assert_eq!(json["traces"][0]["type"], "heatmap");
        assert!(z[1][0].is_null());
        assert_eq!(z[0][0], 10.0);
    }
}
