use crate::ir::{BarTrace, ChartSpec, HeatmapTrace, Layout, Orientation, PieTrace};
use crate::palette::{self, parse_color};
use crate::scale::{bar_axis_range, finite_range, pad_range, ColorScale};
use crate::{OutputFormat, PlotKind, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::collections::HashMap;

const FONT: &str = "sans-serif";

/// Share of a category slot covered by its bars
const BAR_WIDTH: f64 = 0.8;

/// Slices smaller than this share of the pie get no percentage label
const MIN_LABELLED_SLICE: f64 = 0.03;

/// Render `chart` in the requested format: PNG bytes or SVG text bytes
pub fn render(chart: &ChartSpec, options: &RenderOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Png => render_png(chart, options),
        OutputFormat::Svg => render_svg(chart, options).map(String::into_bytes),
    }
}

/// Draw into an RGB buffer of `width * scale` by `height * scale` pixels and
/// encode it as PNG
pub fn render_png(chart: &ChartSpec, options: &RenderOptions) -> Result<Vec<u8>> {
    let (width, height) = options
        .pixel_size()
        .context("Canvas size overflows the pixel range")?;
    let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, chart, options.scale.max(1) as f64)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

/// SVG is resolution independent, so it is drawn at the logical size
pub fn render_svg(chart: &ChartSpec, options: &RenderOptions) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        draw_chart(&root, chart, 1.0)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg)
}

/// Draw a chart on any plotters backend. `scale` multiplies fonts and margins.
pub fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &ChartSpec,
    scale: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;
    let area = root
        .titled(&chart.layout.title, font(20.0, scale))
        .context("Failed to draw title")?;

    match chart.kind {
        PlotKind::Pie => {
            let trace = chart.pie_trace().context("Pie chart has no pie trace")?;
            draw_pie(&area, trace, &chart.layout, scale)
        }
        PlotKind::Heatmap => {
            let trace = chart
                .heatmap_trace()
                .context("Heatmap chart has no heatmap trace")?;
            draw_heatmap(&area, trace, &chart.layout, scale)
        }
        PlotKind::Bar | PlotKind::Go => {
            let traces: Vec<&BarTrace> = chart.bar_traces().collect();
            let horizontal = traces
                .first()
                .map(|t| t.orientation == Orientation::Horizontal)
                .unwrap_or(false);
            if horizontal {
                draw_horizontal_bars(&area, &traces, &chart.layout, scale)
            } else {
                draw_vertical_bars(&area, &traces, &chart.layout, scale)
            }
        }
    }
}

fn font(size: f64, scale: f64) -> TextStyle<'static> {
    (FONT, size * scale).into_font().into()
}

fn pixels(logical: u32, scale: f64) -> u32 {
    (logical as f64 * scale).round() as u32
}

/// Tick label style; negative angles read upwards, positive downwards
fn tick_style(angle: Option<f64>, scale: f64) -> TextStyle<'static> {
    let style = font(12.0, scale);
    match angle {
        Some(a) if a < 0.0 => style.transform(FontTransform::Rotate270),
        Some(a) if a > 0.0 => style.transform(FontTransform::Rotate90),
        _ => style,
    }
}

/// Axis range for `count` category slots centred on 0, 1, .., count - 1
fn slot_range(count: usize) -> std::ops::Range<f64> {
    -0.5..count.max(1) as f64 - 0.5
}

/// Category name for a tick; ticks between slot centres stay unlabelled
fn category_label(categories: &[String], position: f64) -> String {
    let index = position.round();
    if index < 0.0 || (position - index).abs() > 1e-6 {
        return String::new();
    }
    categories.get(index as usize).cloned().unwrap_or_default()
}

// =============================================================================
// Pie
// =============================================================================

fn draw_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    trace: &PieTrace,
    layout: &Layout,
    scale: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (width, _) = area.dim_in_pixel();
    let (plot, legend) = area.split_horizontally((width as f64 * 0.72) as i32);

    let (plot_width, plot_height) = plot.dim_in_pixel();
    let center = (plot_width as i32 / 2, plot_height as i32 / 2);
    let radius = plot_width.min(plot_height) as f64 * 0.42;

    let slice_color = |i: usize| {
        parse_color(
            trace
                .colors
                .get(i)
                .map(String::as_str)
                .unwrap_or_else(|| palette::pie_color(i)),
        )
    };

    let total: f64 = trace
        .values
        .iter()
        .filter(|v| v.is_finite() && **v > 0.0)
        .sum();

    if total > 0.0 {
        let mut start = 0.0;
        for (i, &value) in trace.values.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                continue;
            }
            let share = value / total;
            plot.draw(&Polygon::new(
                wedge(center, radius, start, start + share),
                slice_color(i).filled(),
            ))
            .context("Failed to draw pie slice")?;

            if share >= MIN_LABELLED_SLICE {
                let anchor = point_on_circle(center, radius * 0.65, start + share / 2.0);
                plot.draw(&Text::new(
                    format!("{:.1}%", share * 100.0),
                    anchor,
                    font(14.0, scale)
                        .color(&WHITE)
                        .pos(Pos::new(HPos::Center, VPos::Center)),
                ))
                .context("Failed to draw slice label")?;
            }
            start += share;
        }
    }

    if layout.show_legend {
        let entries: Vec<(String, RGBColor)> = trace
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), slice_color(i)))
            .collect();
        draw_legend(&legend, layout.legend_title.as_deref(), &entries, scale)?;
    }

    Ok(())
}

/// Point on the circle at `turn` (fraction of a full turn, clockwise from
/// twelve o'clock)
fn point_on_circle(center: (i32, i32), radius: f64, turn: f64) -> (i32, i32) {
    let angle = turn * std::f64::consts::TAU;
    (
        center.0 + (radius * angle.sin()).round() as i32,
        center.1 - (radius * angle.cos()).round() as i32,
    )
}

fn wedge(center: (i32, i32), radius: f64, from: f64, to: f64) -> Vec<(i32, i32)> {
    let steps = (((to - from) * 360.0).ceil() as usize).max(2);
    let mut points = vec![center];
    points.extend((0..=steps).map(|k| {
        point_on_circle(center, radius, from + (to - from) * k as f64 / steps as f64)
    }));
    points
}

fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: Option<&str>,
    entries: &[(String, RGBColor)],
    scale: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let line = (22.0 * scale) as i32;
    let swatch = (12.0 * scale) as i32;
    let (_, height) = area.dim_in_pixel();
    let mut y = line;

    if let Some(title) = title {
        area.draw(&Text::new(title.to_string(), (0, y), font(14.0, scale)))
            .context("Failed to draw legend title")?;
        y += line;
    }

    for (label, color) in entries {
        if y + line > height as i32 {
            break;
        }
        area.draw(&Rectangle::new([(0, y), (swatch, y + swatch)], color.filled()))
            .context("Failed to draw legend swatch")?;
        area.draw(&Text::new(
            label.clone(),
            (swatch + swatch / 2, y),
            font(12.0, scale),
        ))
        .context("Failed to draw legend label")?;
        y += line;
    }

    Ok(())
}

// =============================================================================
// Bars
// =============================================================================

/// One bar along the category axis: `[lo, hi]` across, `value` along
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedBar {
    pub lo: f64,
    pub hi: f64,
    pub value: f64,
}

/// Lay out grouped bars. Categories take slots in order of first appearance
/// across all traces; traces that share a slot are drawn side by side.
pub fn place_bars(traces: &[&BarTrace]) -> (Vec<String>, Vec<Vec<PlacedBar>>) {
    let mut categories: Vec<String> = Vec::new();
    let mut slot_of: HashMap<&str, usize> = HashMap::new();
    for trace in traces {
        for category in &trace.categories {
            if !slot_of.contains_key(category.as_str()) {
                slot_of.insert(category.as_str(), categories.len());
                categories.push(category.clone());
            }
        }
    }

    // Traces occupying each slot, in trace order
    let mut occupants: Vec<Vec<usize>> = vec![Vec::new(); categories.len()];
    for (t, trace) in traces.iter().enumerate() {
        for category in &trace.categories {
            let slot = slot_of[category.as_str()];
            if !occupants[slot].contains(&t) {
                occupants[slot].push(t);
            }
        }
    }

    let placed = traces
        .iter()
        .enumerate()
        .map(|(t, trace)| {
            trace
                .categories
                .iter()
                .zip(&trace.values)
                .map(|(category, &value)| {
                    let slot = slot_of[category.as_str()];
                    let sharing = &occupants[slot];
                    let rank = sharing.iter().position(|&o| o == t).unwrap_or(0);
                    let width = BAR_WIDTH / sharing.len().max(1) as f64;
                    let lo = slot as f64 - BAR_WIDTH / 2.0 + rank as f64 * width;
                    PlacedBar {
                        lo,
                        hi: lo + width,
                        value,
                    }
                })
                .collect()
        })
        .collect();

    (categories, placed)
}

fn clamp_to(value: f64, (min, max): (f64, f64)) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}

fn draw_vertical_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    traces: &[&BarTrace],
    layout: &Layout,
    scale: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (categories, placed) = place_bars(traces);
    let slots = slot_range(categories.len());
    let range = bar_axis_range(traces.iter().flat_map(|t| t.values.iter().copied()));

    let mut chart = ChartBuilder::on(area)
        .margin((10.0 * scale) as i32)
        .x_label_area_size(pixels(layout.margin.bottom.unwrap_or(60), scale))
        .y_label_area_size(pixels(layout.margin.left.unwrap_or(70), scale))
        .build_cartesian_2d(slots.clone(), range.0..range.1)
        .context("Failed to build chart")?;

    let label_of = |x: &f64| category_label(&categories, *x);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .x_labels(categories.len())
        .x_label_formatter(&label_of)
        .x_label_style(tick_style(layout.x_axis.tick_angle, scale))
        .y_label_style(font(12.0, scale));
    if let Some(title) = &layout.x_axis.title {
        mesh.x_desc(title.as_str());
    }
    if let Some(title) = &layout.y_axis.title {
        mesh.y_desc(title.as_str());
    }
    mesh.draw().context("Failed to draw mesh")?;

    for (trace, bars) in traces.iter().zip(&placed) {
        let color = parse_color(&trace.color);
        chart
            .draw_series(bars.iter().map(|b| {
                Rectangle::new([(b.lo, 0.0), (b.hi, clamp_to(b.value, range))], color.filled())
            }))
            .context("Failed to draw bars")?
            .label(trace.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if layout.y_axis.zero_line {
        chart
            .draw_series(LineSeries::new(
                vec![(slots.start, 0.0), (slots.end, 0.0)],
                BLACK.stroke_width(scale.round().max(1.0) as u32),
            ))
            .context("Failed to draw zero line")?;
    }

    if layout.show_legend {
        chart
            .configure_series_labels()
            .label_font(font(12.0, scale))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .context("Failed to draw legend")?;
    }

    Ok(())
}

fn draw_horizontal_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    traces: &[&BarTrace],
    layout: &Layout,
    scale: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (categories, placed) = place_bars(traces);
    let range = bar_axis_range(traces.iter().flat_map(|t| t.values.iter().copied()));

    let mut chart = ChartBuilder::on(area)
        .margin((10.0 * scale) as i32)
        .x_label_area_size(pixels(layout.margin.bottom.unwrap_or(50), scale))
        .y_label_area_size(pixels(layout.margin.left.unwrap_or(120), scale))
        .build_cartesian_2d(range.0..range.1, slot_range(categories.len()))
        .context("Failed to build chart")?;

    let label_of = |y: &f64| category_label(&categories, *y);
    let mut mesh = chart.configure_mesh();
    mesh.disable_y_mesh()
        .y_labels(categories.len())
        .y_label_formatter(&label_of)
        .x_label_style(font(12.0, scale))
        .y_label_style(tick_style(layout.y_axis.tick_angle, scale));
    if let Some(title) = &layout.x_axis.title {
        mesh.x_desc(title.as_str());
    }
    if let Some(title) = &layout.y_axis.title {
        mesh.y_desc(title.as_str());
    }
    mesh.draw().context("Failed to draw mesh")?;

    for (trace, bars) in traces.iter().zip(&placed) {
        let color = parse_color(&trace.color);
        chart
            .draw_series(bars.iter().map(|b| {
                Rectangle::new([(0.0, b.lo), (clamp_to(b.value, range), b.hi)], color.filled())
            }))
            .context("Failed to draw bars")?
            .label(trace.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if layout.show_legend {
        chart
            .configure_series_labels()
            .label_font(font(12.0, scale))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::LowerRight)
            .draw()
            .context("Failed to draw legend")?;
    }

    Ok(())
}

// =============================================================================
// Heatmap
// =============================================================================

fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    trace: &HeatmapTrace,
    layout: &Layout,
    scale: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let mut colors = ColorScale::named(&trace.colorscale);
    if trace.reverse_scale {
        colors = colors.reversed();
    }
    let domain = finite_range(trace.z.iter().flatten().copied()).unwrap_or((0.0, 1.0));

    let (width, _) = area.dim_in_pixel();
    let (main, color_bar) = area.split_horizontally(width as i32 - (110.0 * scale) as i32);

    let columns = trace.columns.len();
    let rows = trace.rows.len();

    let mut chart = ChartBuilder::on(&main)
        .margin((10.0 * scale) as i32)
        .x_label_area_size(pixels(layout.margin.bottom.unwrap_or(60), scale))
        .y_label_area_size(pixels(layout.margin.left.unwrap_or(80), scale))
        .build_cartesian_2d(slot_range(columns), slot_range(rows))
        .context("Failed to build chart")?;

    let column_label = |x: &f64| category_label(&trace.columns, *x);
    let row_label = |y: &f64| category_label(&trace.rows, *y);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(columns)
        .y_labels(rows)
        .x_label_formatter(&column_label)
        .y_label_formatter(&row_label)
        .x_label_style(tick_style(layout.x_axis.tick_angle, scale))
        .y_label_style(font(12.0, scale))
        .draw()
        .context("Failed to draw mesh")?;

    // First row at the bottom; unparsable cells stay blank
    let mut cells = Vec::new();
    for (r, row) in trace.z.iter().enumerate() {
        for (c, &value) in row.iter().enumerate() {
            if value.is_finite() {
                cells.push(Rectangle::new(
                    [(c as f64 - 0.5, r as f64 - 0.5), (c as f64 + 0.5, r as f64 + 0.5)],
                    colors.map(value, domain).filled(),
                ));
            }
        }
    }
    chart
        .draw_series(cells)
        .context("Failed to draw heatmap cells")?;

    if trace.show_scale {
        draw_color_bar(&color_bar, &colors, domain, scale)?;
    }

    Ok(())
}

fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    colors: &ColorScale,
    domain: (f64, f64),
    scale: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    const STEPS: usize = 100;

    let (lo, hi) = if domain.0 < domain.1 {
        domain
    } else {
        pad_range(domain.0, domain.1)
    };

    let mut chart = ChartBuilder::on(area)
        .margin((10.0 * scale) as i32)
        .set_label_area_size(LabelAreaPosition::Right, pixels(50, scale))
        .x_label_area_size(pixels(60, scale))
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .context("Failed to build color bar")?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_label_style(font(11.0, scale))
        .draw()
        .context("Failed to draw color bar axis")?;

    let step = (hi - lo) / STEPS as f64;
    chart
        .draw_series((0..STEPS).map(|i| {
            let y = lo + step * i as f64;
            Rectangle::new(
                [(0.0, y), (1.0, y + step)],
                colors.map(y + step / 2.0, (lo, hi)).filled(),
            )
        }))
        .context("Failed to draw color bar")?;

    Ok(())
}
