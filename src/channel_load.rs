//! Channel load observations produced by the radio once per sampling period.
//!
//! 无线电在每个采样周期产生一次的信道负载观测。

use std::fmt;

/// Channel busy ratio observed during one sampling period.
///
/// The radio probes the channel a number of times per period and counts how
/// many probes found it busy.
///
/// 一个采样周期内观测到的信道繁忙比。
/// 无线电在每个周期内多次探测信道，并统计发现信道繁忙的次数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelLoad {
    probes_above: u32,
    probes_total: u32,
}

/// Resolution used when a load is given directly as a fraction.
const FRACTION_PROBES: u32 = 10_000;

impl ChannelLoad {
    /// Creates a load from raw probe counts.
    ///
    /// 使用原始探测计数创建负载。
    pub fn new(probes_above: u32, probes_total: u32) -> Self {
        Self {
            probes_above,
            probes_total,
        }
    }

    /// Creates a load from a busy ratio, clamped into `[0.0, 1.0]`.
    /// `NaN` is treated as an idle channel.
    ///
    /// 使用繁忙比创建负载，结果被限制在 `[0.0, 1.0]` 内。`NaN` 视为空闲信道。
    pub fn from_fraction(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let probes_above = (fraction * f64::from(FRACTION_PROBES)).round() as u32;
        Self::new(probes_above, FRACTION_PROBES)
    }

    /// Number of probes which sensed a busy channel.
    pub fn probes_above(&self) -> u32 {
        self.probes_above
    }

    /// Total number of probes taken.
    pub fn probes_total(&self) -> u32 {
        self.probes_total
    }

    /// Busy ratio in `[0.0, 1.0]`.
    ///
    /// Without any probes the channel is considered idle; more busy probes
    /// than probes in total saturate at `1.0`.
    ///
    /// `[0.0, 1.0]` 内的繁忙比。没有探测时视为空闲；繁忙次数超过总次数时饱和为 `1.0`。
    pub fn fraction(&self) -> f64 {
        if self.probes_total == 0 {
            0.0
        } else if self.probes_above >= self.probes_total {
            1.0
        } else {
            f64::from(self.probes_above) / f64::from(self.probes_total)
        }
    }
}

impl From<f64> for ChannelLoad {
    fn from(fraction: f64) -> Self {
        Self::from_fraction(fraction)
    }
}

impl fmt::Display for ChannelLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.fraction() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_f64_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "Floats not equal: {} vs {}", a, b);
    }

    #[test]
    fn test_fraction_from_probes() {
        assert_f64_eq(ChannelLoad::new(25, 100).fraction(), 0.25);
        assert_f64_eq(ChannelLoad::new(0, 100).fraction(), 0.0);
        assert_f64_eq(ChannelLoad::new(100, 100).fraction(), 1.0);
    }

    #[test]
    fn test_degenerate_probes() {
        assert_f64_eq(ChannelLoad::new(0, 0).fraction(), 0.0);
        assert_f64_eq(ChannelLoad::new(5, 0).fraction(), 0.0);
        assert_f64_eq(ChannelLoad::new(150, 100).fraction(), 1.0);
        assert_f64_eq(ChannelLoad::default().fraction(), 0.0);
    }

    #[test]
    fn test_from_fraction_clamps() {
        assert_f64_eq(ChannelLoad::from_fraction(0.42).fraction(), 0.42);
        assert_f64_eq(ChannelLoad::from_fraction(-0.3).fraction(), 0.0);
        assert_f64_eq(ChannelLoad::from_fraction(1.7).fraction(), 1.0);
        assert_f64_eq(ChannelLoad::from_fraction(f64::NAN).fraction(), 0.0);
        assert_f64_eq(ChannelLoad::from(0.5).fraction(), 0.5);
    }

    #[test]
    fn test_display() {
        assert_eq!(ChannelLoad::new(1, 4).to_string(), "25.0%");
    }
}
