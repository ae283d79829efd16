//! Implements the reactive DCC state machine.
//!
//! The machine is fed one channel load observation per sampling period. Each
//! observation is smoothed, stored in a bounded history window, and the
//! window extremes drive transitions between `Relaxed`, `Active` and
//! `Restrictive`. Enter and leave thresholds differ so that a load hovering
//! around one boundary does not make the state flap.
//!
//! 实现反应式 DCC 状态机。
//!
//! 状态机在每个采样周期接收一次信道负载观测。每次观测先经过平滑，
//! 再存入有界的历史窗口，窗口的极值驱动 `Relaxed`、`Active` 与
//! `Restrictive` 之间的转换。进入与退出阈值不同，
//! 因此在边界附近徘徊的负载不会导致状态来回切换。

use crate::channel_load::ChannelLoad;
use crate::config::{Config, ThresholdConfig};
use crate::error::Result;
use crate::smoothing::{ChannelLoadSmoothing, ExponentialSmoothing};
use crate::state::{Active, Relaxed, Restrictive, State, StateKind, SubstateLadder};
use crate::window::ChannelLoadWindow;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};

pub mod snapshot;
#[cfg(test)]
mod tests;

pub use snapshot::{DccReader, Snapshot};
use snapshot::SnapshotPublisher;

/// A change of congestion state caused by one update.
///
/// 一次更新引起的拥塞状态变化。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: StateKind,
    pub to: StateKind,
    /// 触发转换时窗口内的最小平滑负载
    /// Smallest smoothed load in the window when the transition fired
    pub min_channel_load: f64,
    /// 触发转换时窗口内的最大平滑负载
    /// Largest smoothed load in the window when the transition fired
    pub max_channel_load: f64,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (window max {:.3})",
            self.from, self.to, self.max_channel_load
        )
    }
}

/// The reactive DCC state machine.
///
/// `update` is the only mutator and takes `&mut self`, so there is exactly
/// one writer. Any number of [`DccReader`]s may observe the published
/// snapshot concurrently.
///
/// 反应式 DCC 状态机。`update` 是唯一的修改方法且需要 `&mut self`，
/// 因此只有一个写者。任意数量的 [`DccReader`] 可以并发观察已发布的快照。
#[derive(Debug)]
pub struct StateMachine<S = ExponentialSmoothing> {
    /// 预先构建的各状态
    /// Pre-built state variants
    relaxed: Relaxed,
    active: Active,
    restrictive: Restrictive,

    /// 写者本地的当前快照
    /// The writer's local copy of the current snapshot
    snapshot: Snapshot,

    /// 信道负载平滑器
    /// Channel load smoothing
    smoothing: S,

    /// 平滑负载的历史窗口
    /// History window of smoothed loads
    window: ChannelLoadWindow,

    thresholds: ThresholdConfig,

    sampling_period: Duration,

    publisher: SnapshotPublisher,
}

impl StateMachine<ExponentialSmoothing> {
    /// Creates a state machine with exponential smoothing.
    ///
    /// 创建一个使用指数平滑的状态机。
    pub fn new(config: Config) -> Result<Self> {
        let smoothing = ExponentialSmoothing::from(&config.smoothing);
        Self::with_smoothing(config, smoothing)
    }
}

impl Default for StateMachine<ExponentialSmoothing> {
    fn default() -> Self {
        let config = Config::default();
        let smoothing = ExponentialSmoothing::from(&config.smoothing);
        Self::build(&config, smoothing)
    }
}

impl<S: ChannelLoadSmoothing> StateMachine<S> {
    /// Creates a state machine with a custom smoothing collaborator.
    ///
    /// 使用自定义的平滑器创建状态机。
    pub fn with_smoothing(config: Config, smoothing: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(&config, smoothing))
    }

    fn build(config: &Config, smoothing: S) -> Self {
        let relaxed = Relaxed::new(config.intervals.relaxed);
        let active = Active::new(SubstateLadder::from_config(
            &config.intervals,
            &config.thresholds,
        ));
        let restrictive = Restrictive::new(config.intervals.restrictive);
        let snapshot = Snapshot::initial(State::Relaxed(relaxed));

        Self {
            relaxed,
            active,
            restrictive,
            snapshot,
            smoothing,
            window: ChannelLoadWindow::new(config.sampling.window_capacity()),
            thresholds: config.thresholds.clone(),
            sampling_period: config.sampling.sampling_period,
            publisher: SnapshotPublisher::new(snapshot),
        }
    }

    /// Notifies the state machine about the channel load of the elapsed
    /// sampling period.
    ///
    /// Expected to be called once every `sampling_period`. Returns the
    /// state transition this observation caused, if any.
    ///
    /// 通知状态机上一个采样周期的信道负载。
    /// 期望每个 `sampling_period` 调用一次。返回本次观测引起的状态转换（如有）。
    pub fn update(&mut self, load: &ChannelLoad) -> Option<Transition> {
        let smoothed = self.smoothing.update(load);
        self.window.push(smoothed);
        let min = self.window.min().unwrap_or(smoothed);
        let max = self.window.max().unwrap_or(smoothed);

        let transition = match self.next_state(max) {
            Some(next) => {
                let transition = Transition {
                    from: self.snapshot.state.kind(),
                    to: next.kind(),
                    min_channel_load: min,
                    max_channel_load: max,
                };
                debug!(
                    from = %self.snapshot.state,
                    to = %next,
                    min,
                    max,
                    "DCC state transition"
                );
                self.snapshot.state = next;
                Some(transition)
            }
            None => {
                if let State::Active(active) = &mut self.snapshot.state {
                    let before = active.substate();
                    if active.update(min, max) {
                        trace!(
                            from = before,
                            to = active.substate(),
                            min,
                            max,
                            "Active substate changed"
                        );
                    }
                }
                None
            }
        };

        self.snapshot.min_channel_load = min;
        self.snapshot.max_channel_load = max;
        self.snapshot.smoothed_channel_load = smoothed;
        self.snapshot.tick += 1;
        self.publisher.publish(self.snapshot);

        trace!(
            tick = self.snapshot.tick,
            raw = load.fraction(),
            smoothed,
            state = %self.snapshot.state,
            "Channel load sampled"
        );
        transition
    }

    /// Decides the state to switch to, `None` to stay in the current one.
    fn next_state(&self, max: f64) -> Option<State> {
        let thresholds = &self.thresholds;
        match self.snapshot.state {
            State::Relaxed(_) => (max > thresholds.relaxed_to_active).then(|| {
                let mut active = self.active;
                active.reset_to_lowest();
                State::Active(active)
            }),
            State::Active(_) => {
                if max > thresholds.active_to_restrictive {
                    Some(State::Restrictive(self.restrictive))
                } else if max < thresholds.active_to_relaxed {
                    Some(State::Relaxed(self.relaxed))
                } else {
                    None
                }
            }
            State::Restrictive(_) => (max < thresholds.restrictive_to_active).then(|| {
                let mut active = self.active;
                active.reset_to_highest();
                State::Active(active)
            }),
        }
    }

    /// Currently allowed maximum message rate, in messages per second.
    ///
    /// 当前允许的最大消息速率（每秒消息数）。
    pub fn message_rate(&self) -> f64 {
        self.snapshot.message_rate()
    }

    /// Advised interval between consecutive messages.
    ///
    /// 连续消息之间的建议间隔。
    pub fn transmission_interval(&self) -> Duration {
        self.snapshot.transmission_interval()
    }

    pub fn state(&self) -> &State {
        &self.snapshot.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    /// Smallest smoothed load in the history window, `0.0` before the first update.
    pub fn min_channel_load(&self) -> f64 {
        self.snapshot.min_channel_load
    }

    /// Largest smoothed load in the history window, `0.0` before the first update.
    pub fn max_channel_load(&self) -> f64 {
        self.snapshot.max_channel_load
    }

    pub fn smoothed_channel_load(&self) -> f64 {
        self.smoothing.channel_load()
    }

    pub fn window(&self) -> &ChannelLoadWindow {
        &self.window
    }

    pub fn sampling_period(&self) -> Duration {
        self.sampling_period
    }

    /// Returns a handle observing the snapshots this machine publishes.
    ///
    /// 返回一个观察本状态机所发布快照的句柄。
    pub fn reader(&self) -> DccReader {
        self.publisher.reader()
    }
}
