//! 定义了拥塞控制状态机的可配置参数。
//! Defines configurable parameters for the congestion control state machine.

use crate::error::ConfigError;
use std::time::Duration;

/// Minimum sampling period of the channel load, `NDL_minDccSampling`.
///
/// 信道负载的最小采样周期，即 `NDL_minDccSampling`。
pub const NDL_MIN_DCC_SAMPLING: Duration = Duration::from_millis(100);

/// Upper bound on the number of samples in the history window, ten minutes
/// of history at the minimum sampling period.
///
/// 历史窗口样本数的上限，即最小采样周期下十分钟的历史。
pub const MAX_WINDOW_CAPACITY: usize = 6_000;

/// A structure containing all configurable parameters of the state machine.
///
/// 包含状态机所有可配置参数的结构体。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    /// Sampling cadence and history window parameters.
    /// 采样节奏与历史窗口参数。
    pub sampling: SamplingConfig,

    /// Channel load smoothing parameters.
    /// 信道负载平滑参数。
    pub smoothing: SmoothingConfig,

    /// State transition thresholds.
    /// 状态转换阈值。
    pub thresholds: ThresholdConfig,

    /// Transmission intervals of every state.
    /// 各状态的传输间隔。
    pub intervals: IntervalConfig,
}

/// Sampling cadence and history window parameters.
///
/// 采样节奏与历史窗口参数。
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// The period at which `update` is expected to be called.
    /// 期望调用 `update` 的周期。
    pub sampling_period: Duration,
    /// The span of time covered by the channel load history window.
    /// 信道负载历史窗口覆盖的时间跨度。
    pub observation_window: Duration,
}

/// Channel load smoothing parameters.
///
/// 信道负载平滑参数。
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingConfig {
    /// Weight of the previous estimate in the exponential filter.
    /// A value of `0.0` disables smoothing.
    ///
    /// 指数滤波器中先前估计值的权重。`0.0` 表示不做平滑。
    pub alpha: f64,
}

/// State transition thresholds, all expressed as channel busy ratios.
///
/// 状态转换阈值，均以信道繁忙比表示。
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    /// Relaxed becomes Active when the window maximum exceeds this value.
    /// 当窗口最大值超过此值时，Relaxed 转为 Active。
    pub relaxed_to_active: f64,
    /// Active falls back to Relaxed when the window maximum drops below this value.
    /// 当窗口最大值低于此值时，Active 回退到 Relaxed。
    pub active_to_relaxed: f64,
    /// Active becomes Restrictive when the window maximum exceeds this value.
    /// 当窗口最大值超过此值时，Active 转为 Restrictive。
    pub active_to_restrictive: f64,
    /// Restrictive falls back to Active when the window maximum drops below this value.
    /// 当窗口最大值低于此值时，Restrictive 回退到 Active。
    pub restrictive_to_active: f64,
    /// Inside Active, a window maximum above this value climbs one rung.
    /// 在 Active 内，窗口最大值高于此值时上升一级。
    pub substate_up: f64,
    /// Inside Active, a window minimum below this value descends one rung.
    /// 在 Active 内，窗口最小值低于此值时下降一级。
    pub substate_down: f64,
}

/// Transmission intervals of every state.
///
/// 各状态的传输间隔。
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalConfig {
    /// Interval while Relaxed.
    /// Relaxed 状态下的间隔。
    pub relaxed: Duration,
    /// Interval of the lowest Active rung.
    /// Active 最低一级的间隔。
    pub active_min: Duration,
    /// Interval of the highest Active rung.
    /// Active 最高一级的间隔。
    pub active_max: Duration,
    /// Number of rungs on the Active ladder.
    /// Active 阶梯的级数。
    pub active_substates: usize,
    /// Interval while Restrictive.
    /// Restrictive 状态下的间隔。
    pub restrictive: Duration,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sampling_period: NDL_MIN_DCC_SAMPLING,
            observation_window: Duration::from_secs(1),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { alpha: 0.5 }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            relaxed_to_active: 0.30,
            active_to_relaxed: 0.25,
            active_to_restrictive: 0.60,
            restrictive_to_active: 0.50,
            substate_up: 0.45,
            substate_down: 0.35,
        }
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            relaxed: Duration::from_millis(100),
            active_min: Duration::from_millis(200),
            active_max: Duration::from_millis(500),
            active_substates: 5,
            restrictive: Duration::from_secs(1),
        }
    }
}

impl SamplingConfig {
    /// Number of samples the history window holds: the observation window
    /// divided by the sampling period, rounded up, never less than one and
    /// never more than [`MAX_WINDOW_CAPACITY`].
    ///
    /// 历史窗口容纳的样本数：观察窗口除以采样周期并向上取整，至少为一，
    /// 且不超过 [`MAX_WINDOW_CAPACITY`]。
    pub fn window_capacity(&self) -> usize {
        usize::try_from(self.window_samples())
            .map_or(MAX_WINDOW_CAPACITY, |samples| samples.min(MAX_WINDOW_CAPACITY))
    }

    fn window_samples(&self) -> u128 {
        let period = self.sampling_period.as_nanos().max(1);
        self.observation_window.as_nanos().div_ceil(period).max(1)
    }
}

impl Config {
    /// Checks every constraint the state machine relies on.
    ///
    /// 检查状态机所依赖的全部约束。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sampling.validate()?;
        self.smoothing.validate()?;
        self.thresholds.validate()?;
        self.intervals.validate()
    }
}

impl SamplingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_period.is_zero() {
            return Err(ConfigError::ZeroSamplingPeriod);
        }
        if self.observation_window < self.sampling_period {
            return Err(ConfigError::ObservationWindowTooShort {
                window: self.observation_window,
                period: self.sampling_period,
            });
        }
        if self.window_samples() > MAX_WINDOW_CAPACITY as u128 {
            return Err(ConfigError::ObservationWindowTooLong {
                window: self.observation_window,
                period: self.sampling_period,
                max_samples: MAX_WINDOW_CAPACITY,
            });
        }
        Ok(())
    }
}

impl SmoothingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.alpha) {
            return Err(ConfigError::SmoothingAlphaOutOfRange(self.alpha));
        }
        Ok(())
    }
}

impl ThresholdConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("relaxed_to_active", self.relaxed_to_active),
            ("active_to_relaxed", self.active_to_relaxed),
            ("active_to_restrictive", self.active_to_restrictive),
            ("restrictive_to_active", self.restrictive_to_active),
            ("substate_up", self.substate_up),
            ("substate_down", self.substate_down),
        ];
        for (name, value) in named {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        // Strict orderings form the hysteresis bands.
        strictly_below(named[1], named[0])?;
        strictly_below(named[3], named[2])?;
        strictly_below(named[0], named[2])?;

        // The substate thresholds must sit inside the Active band.
        not_above(named[1], named[5])?;
        not_above(named[5], named[4])?;
        not_above(named[4], named[2])
    }
}

fn strictly_below(lower: (&'static str, f64), upper: (&'static str, f64)) -> Result<(), ConfigError> {
    if lower.1 < upper.1 {
        Ok(())
    } else {
        Err(threshold_order(lower, upper))
    }
}

fn not_above(lower: (&'static str, f64), upper: (&'static str, f64)) -> Result<(), ConfigError> {
    if lower.1 <= upper.1 {
        Ok(())
    } else {
        Err(threshold_order(lower, upper))
    }
}

fn threshold_order(lower: (&'static str, f64), upper: (&'static str, f64)) -> ConfigError {
    ConfigError::ThresholdOrder {
        lower: lower.0,
        lower_value: lower.1,
        upper: upper.0,
        upper_value: upper.1,
    }
}

impl IntervalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.active_substates == 0 {
            return Err(ConfigError::NoSubstates);
        }
        let named = [
            ("relaxed", self.relaxed),
            ("active_min", self.active_min),
            ("active_max", self.active_max),
            ("restrictive", self.restrictive),
        ];
        if let Some(&(name, _)) = named.iter().find(|(_, interval)| interval.is_zero()) {
            return Err(ConfigError::ZeroInterval(name));
        }

        shorter_than(named[0], named[1])?;
        shorter_than(named[2], named[3])?;
        if self.active_substates > 1 {
            shorter_than(named[1], named[2])
        } else if self.active_min != self.active_max {
            // A single rung cannot interpolate, both bounds must agree.
            Err(interval_order(named[1], named[2]))
        } else {
            Ok(())
        }
    }
}

fn shorter_than(
    shorter: (&'static str, Duration),
    longer: (&'static str, Duration),
) -> Result<(), ConfigError> {
    if shorter.1 < longer.1 {
        Ok(())
    } else {
        Err(interval_order(shorter, longer))
    }
}

fn interval_order(shorter: (&'static str, Duration), longer: (&'static str, Duration)) -> ConfigError {
    ConfigError::IntervalOrder {
        shorter: shorter.0,
        shorter_value: shorter.1,
        longer: longer.0,
        longer_value: longer.1,
    }
}
