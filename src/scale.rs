// Axis ranges and continuous color scales

use plotters::style::RGBColor;

/// Min/max of the finite values, `None` when there are none
pub fn finite_range<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}

/// Axis range for bar lengths: always includes zero, padded 5% each side
pub fn bar_axis_range<I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = finite_range(values).unwrap_or((0.0, 1.0));
    pad_range(min.min(0.0), max.max(0.0))
}

pub fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}

/// Piecewise-linear color scale over [0, 1]
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<(f64, RGBColor)>,
}

impl ColorScale {
    /// Diverging red/blue scale, blue at the low end
    pub fn rd_bu() -> Self {
        Self {
            stops: vec![
                (0.0, RGBColor(5, 10, 172)),
                (0.35, RGBColor(106, 137, 247)),
                (0.5, RGBColor(190, 190, 190)),
                (0.6, RGBColor(220, 170, 132)),
                (0.7, RGBColor(230, 145, 90)),
                (1.0, RGBColor(178, 10, 28)),
            ],
        }
    }

    pub fn named(name: &str) -> Self {
        match name {
            "RdBu" => Self::rd_bu(),
            _ => Self {
                stops: vec![(0.0, RGBColor(255, 255, 255)), (1.0, RGBColor(0, 0, 0))],
            },
        }
    }

    pub fn reversed(self) -> Self {
        let stops = self
            .stops
            .into_iter()
            .rev()
            .map(|(t, color)| (1.0 - t, color))
            .collect();
        Self { stops }
    }

    /// Color at position `t`, clamped to [0, 1]
    pub fn color_at(&self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let w = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
                return lerp(c0, c1, w);
            }
        }
        self.stops.last().map(|(_, c)| *c).unwrap_or(RGBColor(0, 0, 0))
    }

    /// Color for `value` within the domain `[min, max]`
    pub fn map(&self, value: f64, (min, max): (f64, f64)) -> RGBColor {
        let t = if max > min { (value - min) / (max - min) } else { 0.5 };
        self.color_at(t)
    }
}

fn lerp(a: RGBColor, b: RGBColor, w: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * w).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
