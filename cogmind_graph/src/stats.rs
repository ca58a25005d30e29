//! Small numeric helpers shared by the chart recipes and the renderer.

use ndarray::{Array1, Zip};
use ordered_float::OrderedFloat;

const ENG_PREFIXES: [(i32, &str); 17] = [
    (-24, "y"),
    (-21, "z"),
    (-18, "a"),
    (-15, "f"),
    (-12, "p"),
    (-9, "n"),
    (-6, "µ"),
    (-3, "m"),
    (0, ""),
    (3, "k"),
    (6, "M"),
    (9, "G"),
    (12, "T"),
    (15, "P"),
    (18, "E"),
    (21, "Z"),
    (24, "Y"),
];

/// Least-squares straight line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a line through the finite `(x, y)` pairs.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = pairs.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if sxx <= f64::EPSILON {
        return None;
    }
    let sxy: f64 = pairs
        .iter()
        .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
        .sum();
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Element-wise `a / b` with zero wherever `b` is zero.
pub fn divide_safe(a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
    Zip::from(a)
        .and(b)
        .map_collect(|&num, &den| if den != 0.0 { num / den } else { 0.0 })
}

/// Indices where a value differs from its predecessor.
pub fn changed_indices<T: PartialEq>(values: &[T]) -> Vec<usize> {
    values
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] != w[1])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Minimum and maximum of the finite values.
pub fn finite_range<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut finite = values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .map(OrderedFloat)
        .peekable();
    finite.peek()?;
    let (min, max) = finite.fold(
        (OrderedFloat(f64::INFINITY), OrderedFloat(f64::NEG_INFINITY)),
        |(lo, hi), v| (lo.min(v), hi.max(v)),
    );
    Some((min.into_inner(), max.into_inner()))
}

/// Tick step from the 1-2-2.5-5-10 sequence giving at most `max_ticks` intervals.
pub fn nice_step(span: f64, max_ticks: usize) -> f64 {
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let raw = span / max_ticks.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    for m in [1.0, 2.0, 2.5, 5.0, 10.0] {
        if m * magnitude >= raw {
            return m * magnitude;
        }
    }
    10.0 * magnitude
}

/// First tick at or above `value` on an axis starting at zero.
pub fn nice_ceil(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 1.0;
    }
    let step = nice_step(value, 8);
    (value / step - 1e-9).ceil() * step
}

/// Shortest decimal form with at most six fractional digits.
pub fn trim_float(value: f64) -> String {
    let text = format!("{value:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Engineering notation tick labels (`1.5k`, `20M`); values in `(0, 1)` stay plain.
pub fn eng_format(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value > 0.0 && value < 1.0 {
        return trim_float(value);
    }
    let exponent = ((value.abs().log10() / 3.0).floor() as i32 * 3).clamp(-24, 24);
    let prefix = ENG_PREFIXES
        .iter()
        .find(|(e, _)| *e == exponent)
        .map(|(_, p)| *p)
        .unwrap_or("");
    let mantissa = value / 10f64.powi(exponent);
    format!("{}{}", trim_float((mantissa * 1e6).round() / 1e6), prefix)
}

pub fn percent_format(value: f64) -> String {
    format!("{}%", trim_float((value * 10.0).round() / 10.0))
}

/// Clip the fitted line over `x_range` to the `y_range` box.
pub fn clip_segment(
    fit: &LinearFit,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (x0, x1) = x_range;
    let (y0, y1) = y_range;
    let (lo, hi) = if fit.slope == 0.0 {
        if fit.intercept < y0 || fit.intercept > y1 {
            return None;
        }
        (x0, x1)
    } else {
        let xa = (y0 - fit.intercept) / fit.slope;
        let xb = (y1 - fit.intercept) / fit.slope;
        (x0.max(xa.min(xb)), x1.min(xa.max(xb)))
    };
    if !(lo < hi) {
        return None;
    }
    Some(((lo, fit.at(lo)), (hi, fit.at(hi))))
}
