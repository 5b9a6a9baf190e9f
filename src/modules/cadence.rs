// src/modules/cadence.rs

use crate::globals::SAMPLE_INTERVAL_SECS;

/// Slack for f64 subtraction, so `0.3 - 0.2` still counts as 100 ms.
const EPSILON_SECS: f64 = 1e-9;

/// True once at least [`SAMPLE_INTERVAL_SECS`] have passed since `last`.
pub fn should_sample(last: f64, now: f64) -> bool {
    now - last >= SAMPLE_INTERVAL_SECS - EPSILON_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_boundaries() {
        assert!(!should_sample(0.0, 0.099));
        assert!(should_sample(0.0, 0.100));
        assert!(should_sample(0.0, 0.250));
    }

    #[test]
    fn test_gate_relative_to_last() {
        assert!(!should_sample(5.0, 5.05));
        assert!(should_sample(5.0, 5.2));
        assert!(!should_sample(5.0, 4.0));
    }

    #[test]
    fn test_gate_boundary_away_from_zero() {
        assert!(should_sample(0.2, 0.3));
        assert!(should_sample(1.1, 1.2));
        assert!(!should_sample(0.2, 0.2999));
    }
}
