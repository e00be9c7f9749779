// Library exports for srplot

pub mod config;
pub mod data;
pub mod graph;
pub mod ir;
pub mod palette;
pub mod parser;
pub mod resolve;
pub mod runtime;
pub mod samples;
pub mod scale;
pub mod session;
pub mod shape;
pub mod store;
pub mod upload;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four supported chart types, persisted by their lowercase id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    Pie,
    Bar,
    Heatmap,
    Go,
}

impl PlotKind {
    pub const ALL: [PlotKind; 4] = [PlotKind::Pie, PlotKind::Bar, PlotKind::Heatmap, PlotKind::Go];

    pub fn id(self) -> &'static str {
        match self {
            PlotKind::Pie => "pie",
            PlotKind::Bar => "bar",
            PlotKind::Heatmap => "heatmap",
            PlotKind::Go => "go",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PlotKind::Pie => "2D Pie Plot",
            PlotKind::Bar => "Gene Up-Down Bar Plot",
            PlotKind::Heatmap => "Cluster Heatmap",
            PlotKind::Go => "GO Enrichment Bar Plot",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PlotKind::Pie => "Proportional slicing using standard expression data.",
            PlotKind::Bar => "Visualizes differential expression (logFC).",
            PlotKind::Heatmap => "Visualizes expression matrix.",
            PlotKind::Go => {
                "Visualizes enrichment. (Mapping: logFC -> Count, Gene.symbol -> Cat, Gene.title -> Term)"
            }
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

/// Export canvas: logical size plus a pixel multiplier
#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 1200 }
fn default_height() -> u32 { 800 }
fn default_scale() -> u32 { 2 }

impl RenderOptions {
    /// Output size in pixels (logical size times scale), `None` on overflow
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        let scale = self.scale.max(1);
        Some((self.width.checked_mul(scale)?, self.height.checked_mul(scale)?))
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            scale: default_scale(),
            format: OutputFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_defaults_from_json() {
        let options: RenderOptions = serde_json::from_str(r#"{"type": "svg"}"#).unwrap();
        assert_eq!(options.width, 1200);
        assert_eq!(options.height, 800);
        assert_eq!(options.format, OutputFormat::Svg);
        assert_eq!(options.pixel_size(), Some((2400, 1600)));
    }

    #[test]
    fn test_pixel_size_overflow_is_none() {
        let options = RenderOptions {
            width: 2_147_483_649,
            scale: 2,
            ..RenderOptions::default()
        };
        assert_eq!(options.pixel_size(), None);
        let options = RenderOptions {
            scale: 0,
            ..RenderOptions::default()
        };
        assert_eq!(options.pixel_size(), Some((1200, 800)));
    }

    #[test]
    fn test_plot_kind_ids_round_trip_through_serde() {
        for kind in PlotKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
            let back: PlotKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_titles_are_not_accepted_as_kinds() {
        assert!(serde_json::from_str::<PlotKind>("\"2D Pie Plot\"").is_err());
    }
}
