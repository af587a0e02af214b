//! Two-proportion significance test for visibility rates

use serde::{Deserialize, Serialize};

/// Coarse confidence label derived from the two-sided p-value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_p_value(p_value: f64) -> Self {
        if p_value < 0.01 {
            ConfidenceLevel::High
        } else if p_value < 0.05 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of comparing two visibility rates, with the raw counts it used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Significance {
    pub control_visible: usize,
    pub control_total: usize,
    pub test_visible: usize,
    pub test_total: usize,
    pub z_score: f64,
    pub p_value: f64,
    /// `1 - p_value`
    pub confidence: f64,
    pub level: ConfidenceLevel,
}

impl Significance {
    pub fn is_significant(&self) -> bool {
        self.level != ConfidenceLevel::Low
    }
}

/// Pooled two-proportion z-test (two-sided).
///
/// Returns `None` when either sample is empty. Identical all-or-nothing
/// samples have zero standard error and yield `p = 1`.
pub fn two_proportion_test(
    control_visible: usize,
    control_total: usize,
    test_visible: usize,
    test_total: usize,
) -> Option<Significance> {
    if control_total == 0 || test_total == 0 {
        return None;
    }

    let n1 = control_total as f64;
    let n2 = test_total as f64;
    let p1 = control_visible as f64 / n1;
    let p2 = test_visible as f64 / n2;
    let pooled = (control_visible + test_visible) as f64 / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();

    let (z_score, p_value) = if se == 0.0 {
        (0.0, 1.0)
    } else {
        let z = (p2 - p1) / se;
        (z, (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0))
    };

    Some(Significance {
        control_visible,
        control_total,
        test_visible,
        test_total,
        z_score,
        p_value,
        confidence: 1.0 - p_value,
        level: ConfidenceLevel::from_p_value(p_value),
    })
}

/// Standard normal CDF
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz-Stegun 7.1.26, absolute error below 1.5e-7
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_cdf_reference_points() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 1e-4);
    }

    #[test]
    fn test_four_vs_eleven_of_twenty() {
        let sig = two_proportion_test(4, 20, 11, 20).unwrap();
        assert!((sig.z_score - 2.286).abs() < 0.01);
        assert!((sig.p_value - 0.022).abs() < 0.002);
        assert!((sig.confidence - 0.978).abs() < 0.002);
        assert_eq!(sig.level, ConfidenceLevel::Medium);
        assert_eq!((sig.control_total, sig.test_total), (20, 20));
        assert!(sig.is_significant());
    }

    #[test]
    fn test_no_change_is_low_confidence() {
        let sig = two_proportion_test(10, 20, 10, 20).unwrap();
        assert_eq!(sig.z_score, 0.0);
        assert!((sig.p_value - 1.0).abs() < 1e-6);
        assert_eq!(sig.level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_zero_standard_error() {
        let sig = two_proportion_test(0, 10, 0, 12).unwrap();
        assert_eq!(sig.p_value, 1.0);
        assert_eq!(sig.confidence, 0.0);
    }

    #[test]
    fn test_large_drop_is_high_confidence() {
        let sig = two_proportion_test(45, 50, 10, 50).unwrap();
        assert!(sig.z_score < 0.0);
        assert_eq!(sig.level, ConfidenceLevel::High);
    }

    #[test]
    fn test_empty_sample() {
        assert!(two_proportion_test(0, 0, 3, 10).is_none());
    }
}
