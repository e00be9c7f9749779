// Chart color palettes

use plotters::style::RGBColor;

/// Pie slice colors, cycled when there are more slices
pub const PIE: [&str; 8] = [
    "#4C78A8", "#9EC5E9", "#F58518", "#FFBF79", "#54A24B", "#8CD17D", "#B279A2", "#FF9DA6",
];

pub const UPREGULATED: &str = "#E15759";
pub const DOWNREGULATED: &str = "#59A14F";

/// GO category series colors, assigned by `index mod 5`
pub const CATEGORY: [&str; 5] = ["#E15759", "#4E79A7", "#F28E2B", "#76B7B2", "#59A14F"];

pub fn category_color(index: usize) -> &'static str {
    CATEGORY[index % CATEGORY.len()]
}

pub fn pie_color(index: usize) -> &'static str {
    PIE[index % PIE.len()]
}

/// Parse `#RRGGBB` or a basic color name; anything else is the default blue
pub fn parse_color(color: &str) -> RGBColor {
    if let Some(hex) = color.strip_prefix('#') {
        if hex.len() == 6 {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            if let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) {
                return RGBColor(r, g, b);
            }
        }
    }
    match color {
        "red" => RGBColor(255, 0, 0),
        "green" => RGBColor(0, 255, 0),
        "black" => RGBColor(0, 0, 0),
        "white" => RGBColor(255, 255, 255),
        "gray" | "grey" => RGBColor(128, 128, 128),
        _ => RGBColor(0, 0, 255),
    }
}
