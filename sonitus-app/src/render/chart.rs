//! Axis-fitting arithmetic for the figure renderer.
//!
//! Non-finite data never decides an axis: ranges are computed over finite
//! values only, padded by 5 percent, and degenerate (flat or empty) data
//! falls back to a unit span so every figure still has usable axes.

/// Pixel-space plot rectangle plus the data ranges mapped onto it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChartLayout {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartLayout {
    pub fn map_x(&self, x: f64) -> f32 {
        let t = (x - self.x_min) / (self.x_max - self.x_min);
        self.left + t as f32 * (self.right - self.left)
    }

    /// Pixel y grows downward, data y grows upward.
    pub fn map_y(&self, y: f64) -> f32 {
        let t = (y - self.y_min) / (self.y_max - self.y_min);
        self.bottom - t as f32 * (self.bottom - self.top)
    }
}

/// Min and max over the finite values of `values`, if any.
pub(crate) fn finite_range<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for &v in values {
        if !v.is_finite() {
            continue;
        }
        range = Some(match range {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    range
}

/// Pad `range` by `frac` of its span on both sides; a collapsed or
/// missing range becomes a unit span around its center.
pub(crate) fn padded(range: Option<(f64, f64)>, frac: f64) -> (f64, f64) {
    let (lo, hi) = range.unwrap_or((0.0, 1.0));
    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 0.5, hi + 0.5);
    }
    (lo - span * frac, hi + span * frac)
}

/// Tick positions at a round step (1, 2 or 5 times a power of ten),
/// covering `[min, max]` with roughly `target` ticks.
pub(crate) fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let span = max - min;
    if !(span.is_finite() && span > 0.0) || target == 0 {
        return Vec::new();
    }
    let step = nice_step(span / target as f64);
    let first = (min / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut tick = first;
    while tick <= max + step * 1e-9 {
        // Snap values that should be exact zero
        ticks.push(if tick.abs() < step * 1e-9 { 0.0 } else { tick });
        tick += step;
    }
    ticks
}

fn nice_step(raw: f64) -> f64 {
    let mag = 10.0_f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let factor = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * mag
}

/// Format a tick value with just enough decimals for its step size.
pub(crate) fn tick_label(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor() as i32).clamp(1, 6) as usize
    };
    format!("{value:.decimals$}")
}
