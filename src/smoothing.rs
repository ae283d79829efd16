//! Smoothing of raw channel load observations.
//! 原始信道负载观测的平滑处理。

use crate::channel_load::ChannelLoad;
use crate::config::SmoothingConfig;

/// Turns noisy per-period channel load readings into a stable estimate.
///
/// Implementations must return a value in `[0.0, 1.0]` for every input.
///
/// 将每个周期带噪声的信道负载读数转换为稳定的估计值。
/// 实现必须对每个输入返回 `[0.0, 1.0]` 内的值。
pub trait ChannelLoadSmoothing: std::fmt::Debug + Send + 'static {
    /// Feeds one raw observation and returns the new smoothed load.
    ///
    /// 输入一个原始观测并返回新的平滑负载。
    fn update(&mut self, load: &ChannelLoad) -> f64;

    /// Returns the current smoothed load.
    ///
    /// 返回当前的平滑负载。
    fn channel_load(&self) -> f64;
}

/// An exponentially weighted moving average of the busy ratio.
///
/// 繁忙比的指数加权移动平均。
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    /// Weight of the previous estimate.
    /// 先前估计值的权重。
    alpha: f64,
    /// The smoothed busy ratio, `None` until the first sample arrives.
    /// 平滑后的繁忙比，在第一个样本到达前为 `None`。
    smoothed: Option<f64>,
}

impl ExponentialSmoothing {
    /// Creates a filter where `alpha` weights the previous estimate.
    /// `alpha` is clamped into `[0.0, 1.0)`.
    ///
    /// 创建一个滤波器，`alpha` 为先前估计值的权重，并被限制在 `[0.0, 1.0)` 内。
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_nan() {
            0.0
        } else {
            alpha.clamp(0.0, 1.0 - f64::EPSILON)
        };
        Self {
            alpha,
            smoothed: None,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl From<&SmoothingConfig> for ExponentialSmoothing {
    fn from(config: &SmoothingConfig) -> Self {
        Self::new(config.alpha)
    }
}

impl Default for ExponentialSmoothing {
    fn default() -> Self {
        Self::from(&SmoothingConfig::default())
    }
}

impl ChannelLoadSmoothing for ExponentialSmoothing {
    fn update(&mut self, load: &ChannelLoad) -> f64 {
        let sample = load.fraction();
        let smoothed = match self.smoothed {
            // First sample
            None => sample,
            Some(previous) => self.alpha * previous + (1.0 - self.alpha) * sample,
        };
        let smoothed = smoothed.clamp(0.0, 1.0);
        self.smoothed = Some(smoothed);
        smoothed
    }

    fn channel_load(&self) -> f64 {
        self.smoothed.unwrap_or(0.0)
    }
}
