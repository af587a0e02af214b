//! Score trend over a series of checks

use serde::{Deserialize, Serialize};

/// Average change (in score points) needed before a series counts as moving
pub const TREND_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Up => "↑",
            TrendDirection::Down => "↓",
            TrendDirection::Stable => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub change: f64,
    pub percent_change: f64,
    pub recent_avg: f64,
    pub earlier_avg: f64,
}

impl Trend {
    pub fn stable() -> Self {
        Self {
            direction: TrendDirection::Stable,
            change: 0.0,
            percent_change: 0.0,
            recent_avg: 0.0,
            earlier_avg: 0.0,
        }
    }

    /// Compare the latest `window` values against the earliest ones.
    ///
    /// `values` must be oldest first. With fewer than `2 * window` values the
    /// series is split in half instead.
    pub fn from_series(values: &[f64], window: usize) -> Self {
        if values.len() < 2 || window == 0 {
            return Self::stable();
        }

        let (earlier, recent) = if values.len() >= window * 2 {
            (&values[..window], &values[values.len() - window..])
        } else {
            let mid = values.len() / 2;
            (&values[..mid], &values[mid..])
        };

        let recent_avg = mean(recent);
        let earlier_avg = mean(earlier);
        let change = recent_avg - earlier_avg;
        let percent_change = if earlier_avg != 0.0 {
            change / earlier_avg * 100.0
        } else {
            0.0
        };

        let direction = if change > TREND_THRESHOLD {
            TrendDirection::Up
        } else if change < -TREND_THRESHOLD {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        };

        Self {
            direction,
            change,
            percent_change,
            recent_avg,
            earlier_avg,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_is_stable() {
        assert_eq!(Trend::from_series(&[70.0], 7).direction, TrendDirection::Stable);
        assert_eq!(Trend::from_series(&[], 7), Trend::stable());
    }

    #[test]
    fn test_upward_split_in_half() {
        let trend = Trend::from_series(&[0.0, 30.0, 70.0, 100.0], 7);
        assert_eq!(trend.direction, TrendDirection::Up);
        assert!((trend.change - 70.0).abs() < 1e-9);
        assert!((trend.earlier_avg - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_change_is_stable() {
        let trend = Trend::from_series(&[70.0, 70.0, 72.0, 74.0], 2);
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_downward_with_full_windows() {
        let values = [100.0, 100.0, 40.0, 40.0, 0.0, 0.0];
        let trend = Trend::from_series(&values, 2);
        assert_eq!(trend.direction, TrendDirection::Down);
        assert!((trend.percent_change + 100.0).abs() < 1e-9);
    }
}
