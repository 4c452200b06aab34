// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Conversions between parameter ranges and the 0.0-1.0 scaled domain.

/// Lowest value accepted by logarithmic curves.
const LOG_FLOOR: f64 = 0.001;

/// Parameter value scaling/curve type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterCurve {
    /// Linear mapping from min to max.
    #[default]
    Linear,
    /// Logarithmic (good for frequency, time).
    Logarithmic,
}

/// Normalize a value from a parameter range to 0.0-1.0.
#[inline]
pub fn normalize(value: f64, min: f64, max: f64, curve: ParameterCurve) -> f64 {
    if max <= min {
        return 0.0;
    }
    let clamped = value.clamp(min, max);
    match curve {
        ParameterCurve::Linear => (clamped - min) / (max - min),
        ParameterCurve::Logarithmic => {
            let min_log = min.max(LOG_FLOOR).ln();
            let max_log = max.max(LOG_FLOOR).ln();
            if max_log <= min_log {
                return 0.0;
            }
            (clamped.max(LOG_FLOOR).ln() - min_log) / (max_log - min_log)
        }
    }
}

/// Denormalize a 0.0-1.0 value to a parameter range.
#[inline]
pub fn denormalize(normalized: f64, min: f64, max: f64, curve: ParameterCurve) -> f64 {
    let n = normalized.clamp(0.0, 1.0);
    match curve {
        ParameterCurve::Linear => min + n * (max - min),
        ParameterCurve::Logarithmic => {
            let min_log = min.max(LOG_FLOOR).ln();
            let max_log = max.max(LOG_FLOOR).ln();
            (min_log + n * (max_log - min_log)).exp()
        }
    }
}

/// Linear amplitude for a level in dB. Anything at or below `floor_db` is
/// silence.
#[inline]
pub fn db_to_gain(db: f64, floor_db: f64) -> f64 {
    if db <= floor_db {
        0.0
    } else {
        10.0_f64.powf(db / 20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_to_gain() {
        assert!((db_to_gain(0.0, -60.0) - 1.0).abs() < 1e-9);
        assert!((db_to_gain(-6.0, -60.0) - 0.5012).abs() < 0.001);
        assert!((db_to_gain(6.0, -60.0) - 1.9953).abs() < 0.001);
        assert_eq!(db_to_gain(-60.0, -60.0), 0.0);
        assert_eq!(db_to_gain(-90.0, -60.0), 0.0);
    }

    #[test]
    fn test_linear_scaling() {
        assert!((normalize(50.0, 0.0, 100.0, ParameterCurve::Linear) - 0.5).abs() < 1e-9);
        assert!((denormalize(0.5, 0.0, 100.0, ParameterCurve::Linear) - 50.0).abs() < 1e-9);
        // Out of range input is clamped
        assert_eq!(normalize(150.0, 0.0, 100.0, ParameterCurve::Linear), 1.0);
        assert_eq!(denormalize(-1.0, 0.0, 100.0, ParameterCurve::Linear), 0.0);
    }

    #[test]
    fn test_logarithmic_scaling() {
        // 20Hz..20kHz spans three decades, so 200Hz sits at one third
        let n = normalize(200.0, 20.0, 20000.0, ParameterCurve::Logarithmic);
        assert!((n - 1.0 / 3.0).abs() < 1e-6);

        let f = denormalize(2.0 / 3.0, 20.0, 20000.0, ParameterCurve::Logarithmic);
        assert!((f - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_range() {
        assert_eq!(normalize(5.0, 1.0, 1.0, ParameterCurve::Linear), 0.0);
    }
}
