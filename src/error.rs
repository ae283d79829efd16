//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The primary error type for the DCC library.
/// DCC 库的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// The supplied configuration violates one of its constraints.
    /// 提供的配置违反了某项约束。
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The driver task has stopped and no longer accepts commands.
    /// 驱动任务已停止，不再接受命令。
    #[error("DCC driver has shut down")]
    DriverShutdown,
}

/// A violated configuration constraint.
///
/// 被违反的配置约束。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The sampling period must be non-zero.
    /// 采样周期必须非零。
    #[error("sampling period must be non-zero")]
    ZeroSamplingPeriod,

    /// The observation window must span at least one sampling period.
    /// 观察窗口必须至少覆盖一个采样周期。
    #[error("observation window {window:?} is shorter than sampling period {period:?}")]
    ObservationWindowTooShort {
        window: std::time::Duration,
        period: std::time::Duration,
    },

    /// The observation window holds more samples than the history window allows.
    /// 观察窗口包含的样本数超过历史窗口的上限。
    #[error(
        "observation window {window:?} at sampling period {period:?} exceeds {max_samples} samples"
    )]
    ObservationWindowTooLong {
        window: std::time::Duration,
        period: std::time::Duration,
        max_samples: usize,
    },

    /// The smoothing weight is outside `[0.0, 1.0)`.
    /// 平滑权重超出 `[0.0, 1.0)` 范围。
    #[error("smoothing alpha {0} must lie in [0.0, 1.0)")]
    SmoothingAlphaOutOfRange(f64),

    /// A threshold is outside `[0.0, 1.0]`.
    /// 阈值超出 `[0.0, 1.0]` 范围。
    #[error("threshold `{name}` = {value} must lie in [0.0, 1.0]")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    /// Two thresholds are not ordered as the hysteresis band requires.
    /// 两个阈值的顺序不满足滞回带的要求。
    #[error("threshold `{lower}` ({lower_value}) must be below `{upper}` ({upper_value})")]
    ThresholdOrder {
        lower: &'static str,
        lower_value: f64,
        upper: &'static str,
        upper_value: f64,
    },

    /// The Active ladder needs at least one rung.
    /// Active 阶梯至少需要一级。
    #[error("active state needs at least one substate")]
    NoSubstates,

    /// A transmission interval is zero.
    /// 传输间隔为零。
    #[error("interval `{0}` must be non-zero")]
    ZeroInterval(&'static str),

    /// Intervals are not strictly ordered from Relaxed to Restrictive.
    /// 传输间隔未按 Relaxed 到 Restrictive 严格递增。
    #[error("interval `{shorter}` ({shorter_value:?}) must be shorter than `{longer}` ({longer_value:?})")]
    IntervalOrder {
        shorter: &'static str,
        shorter_value: std::time::Duration,
        longer: &'static str,
        longer_value: std::time::Duration,
    },
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
