//! Axis tick generation for rulers and the whole-genome overview.

/// A single axis tick value in basepairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub value: f64,
}

/// Smallest decimal exponent `d` such that `range` falls in
/// `[10^d * count, 10^(d+1) * count)`, found by stepping one exponent at a
/// time from zero.
fn closest_decimal_degree(range: f64, count: f64, degree: i32) -> i32 {
    // range and count are validated by the caller; the bounds cap runaway
    // recursion on pathological float input
    if !(-12..=15).contains(&degree) {
        return degree.clamp(-12, 15);
    }
    let low = 10f64.powi(degree) * count;
    let high = 10f64.powi(degree + 1) * count;
    if range < low {
        closest_decimal_degree(range, count, degree - 1)
    } else if range >= high {
        closest_decimal_degree(range, count, degree + 1)
    } else {
        degree
    }
}

/// Snap a raw step to a multiple of `module`, rounding up when the overshoot
/// stays under 30% of the module and down otherwise.
pub fn find_best_step(value: f64, module: f64) -> f64 {
    if module <= 0.0 {
        return value;
    }
    let v1 = (value / module).floor() * module;
    let v2 = v1 + module;
    const MODULE_ACCEPTANCE_FACTOR: f64 = 0.3;
    if (v2 - value) / module < MODULE_ACCEPTANCE_FACTOR {
        v2
    } else {
        v1
    }
}

/// Generate human-friendly tick values covering `[0, range]`.
///
/// Ticks step from zero to `range + step` inclusive, so the last tick is
/// always at or past the end of the range.
pub fn build_ticks(range: f64, desired_count: usize) -> Vec<Tick> {
    if range <= 0.0 || desired_count == 0 {
        return Vec::new();
    }
    let count = desired_count as f64;
    let degree = closest_decimal_degree(range, count, 0);
    let module = 10f64.powi(degree) / 2.0;
    let mut step = find_best_step(range / (count + 1.0), module);
    if step <= 0.0 {
        step = module;
    }
    let mut ticks = Vec::new();
    let mut value = 0.0;
    while value <= range + step {
        ticks.push(Tick { value });
        value += step;
    }
    ticks
}

/// Compact label for a tick value: `145`, `2.5K`, `1.5M`, `3G`.
pub fn format_tick_value(value: f64) -> String {
    const K: f64 = 1e3;
    const M: f64 = 1e6;
    const G: f64 = 1e9;
    let (scaled, suffix) = if value.abs() >= G {
        (value / G, "G")
    } else if value.abs() >= M {
        (value / M, "M")
    } else if value.abs() >= K {
        (value / K, "K")
    } else {
        (value, "")
    };
    if (scaled - scaled.round()).abs() < 1e-9 {
        format!("{}{}", scaled.round() as i64, suffix)
    } else {
        format!("{scaled:.1}{suffix}")
    }
}
