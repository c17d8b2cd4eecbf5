use super::types::{CurveKind, CurveSpec};

/// Logistic parameters relative to the ramp duration: the center sits at
/// `center_ratio * duration` and the steepness is `steepness / duration`.
#[derive(Debug, Clone, Copy)]
struct LogisticShape {
    center_ratio: f64,
    steepness: f64,
}

fn logistic_shape(kind: CurveKind) -> Option<LogisticShape> {
    match kind {
        CurveKind::SCurveModerate => Some(LogisticShape {
            center_ratio: 0.5,
            steepness: 10.0,
        }),
        CurveKind::Aggressive => Some(LogisticShape {
            center_ratio: 1.0 / 3.0,
            steepness: 12.0,
        }),
        CurveKind::Conservative => Some(LogisticShape {
            center_ratio: 2.0 / 3.0,
            steepness: 8.0,
        }),
        CurveKind::Immediate | CurveKind::Linear => None,
    }
}

/// Fraction of a track's licenses active in `month` (0-based), always within [0, 1].
pub fn activation_fraction(curve: CurveSpec, month: u32) -> f64 {
    let duration = curve.effective_duration();
    if duration == 0 || month >= duration {
        return 1.0;
    }

    match logistic_shape(curve.kind) {
        Some(shape) => pinned_logistic(shape, month as f64, duration as f64),
        None => ((month + 1) as f64 / duration as f64).min(1.0),
    }
}

// Rescaled so the curve is exactly 0 at t = 0 and exactly 1 at t = duration.
fn pinned_logistic(shape: LogisticShape, t: f64, duration: f64) -> f64 {
    let k = shape.steepness / duration;
    let center = shape.center_ratio * duration;
    let raw = |x: f64| 1.0 / (1.0 + (-k * (x - center)).exp());

    let start = raw(0.0);
    let end = raw(duration);
    let span = end - start;
    if span <= f64::EPSILON {
        return 1.0;
    }
    ((raw(t) - start) / span).clamp(0.0, 1.0)
}
