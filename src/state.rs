//! 拥塞状态及其传输间隔策略。
//! Congestion states and their transmission interval policies.
//!
//! Every state answers which interval applies right now. Only `Active`
//! carries mutable data: its position on a ladder of substates, each rung
//! mapping to a longer interval than the one below.
//!
//! 每个状态都能回答当前适用的传输间隔。只有 `Active` 携带可变数据：
//! 它在子状态阶梯上的位置，每一级对应比下一级更长的间隔。

use crate::config::{IntervalConfig, ThresholdConfig};
use std::fmt;
use std::time::Duration;


/// The channel is quiet, messages may be sent at the shortest interval.
///
/// 信道空闲，可以以最短间隔发送消息。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relaxed {
    interval: Duration,
}

impl Relaxed {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn transmission_interval(&self) -> Duration {
        self.interval
    }

    pub fn name(&self) -> &'static str {
        "Relaxed"
    }
}

/// The channel is persistently overloaded, messages are sent at the longest interval.
///
/// 信道持续过载，以最长间隔发送消息。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Restrictive {
    interval: Duration,
}

impl Restrictive {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn transmission_interval(&self) -> Duration {
        self.interval
    }

    pub fn name(&self) -> &'static str {
        "Restrictive"
    }
}

/// The ladder of substates inside `Active`.
///
/// Rung `0` maps to `min_interval`, the top rung to `max_interval`, rungs in
/// between are interpolated linearly.
///
/// `Active` 内部的子状态阶梯。第 `0` 级对应 `min_interval`，最高级对应
/// `max_interval`，中间各级线性插值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubstateLadder {
    /// 最低一级的间隔
    /// Interval of the lowest rung
    min_interval: Duration,
    /// 最高一级的间隔
    /// Interval of the top rung
    max_interval: Duration,
    /// 级数，至少为一
    /// Number of rungs, at least one
    substates: usize,
    /// 窗口最大值高于此值时上升一级
    /// Climb one rung when the window maximum is above this value
    up_threshold: f64,
    /// 窗口最小值低于此值时下降一级
    /// Descend one rung when the window minimum is below this value
    down_threshold: f64,
}

impl SubstateLadder {
    pub fn new(
        min_interval: Duration,
        max_interval: Duration,
        substates: usize,
        up_threshold: f64,
        down_threshold: f64,
    ) -> Self {
        Self {
            min_interval,
            max_interval: max_interval.max(min_interval),
            substates: substates.max(1),
            up_threshold,
            down_threshold,
        }
    }

    pub fn from_config(intervals: &IntervalConfig, thresholds: &ThresholdConfig) -> Self {
        Self::new(
            intervals.active_min,
            intervals.active_max,
            intervals.active_substates,
            thresholds.substate_up,
            thresholds.substate_down,
        )
    }

    pub fn substates(&self) -> usize {
        self.substates
    }

    /// Index of the most conservative rung.
    pub fn top(&self) -> usize {
        self.substates - 1
    }

    /// Interval of the given rung, saturating at the top rung.
    ///
    /// 指定级别的间隔，超过最高级时取最高级。
    pub fn interval(&self, substate: usize) -> Duration {
        let top = self.top();
        if top == 0 {
            return self.min_interval;
        }
        let substate = substate.min(top);
        let span = (self.max_interval - self.min_interval).as_nanos();
        let offset = span * substate as u128 / top as u128;
        self.min_interval + Duration::from_nanos(u64::try_from(offset).unwrap_or(u64::MAX))
    }
}

/// The channel is busy, the interval follows a ladder of substates.
///
/// 信道繁忙，间隔由子状态阶梯决定。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Active {
    substate: usize,
    ladder: SubstateLadder,
}

impl Active {
    /// Creates the state at its most aggressive rung.
    ///
    /// 创建处于最激进级别的状态。
    pub fn new(ladder: SubstateLadder) -> Self {
        Self {
            substate: 0,
            ladder,
        }
    }

    pub fn substate(&self) -> usize {
        self.substate
    }

    pub fn ladder(&self) -> &SubstateLadder {
        &self.ladder
    }

    /// Moves to the most aggressive rung.
    pub fn reset_to_lowest(&mut self) {
        self.substate = 0;
    }

    /// Moves to the most conservative rung.
    pub fn reset_to_highest(&mut self) {
        self.substate = self.ladder.top();
    }

    /// Adjusts the substate by at most one rung from the window extremes.
    ///
    /// Climbing takes precedence over descending. Returns whether the rung changed.
    ///
    /// 根据窗口极值最多调整一级子状态。上升优先于下降。返回级别是否发生变化。
    pub fn update(&mut self, min_load: f64, max_load: f64) -> bool {
        if max_load > self.ladder.up_threshold {
            if self.substate < self.ladder.top() {
                self.substate += 1;
                return true;
            }
        } else if min_load < self.ladder.down_threshold && self.substate > 0 {
            self.substate -= 1;
            return true;
        }
        false
    }

    pub fn transmission_interval(&self) -> Duration {
        self.ladder.interval(self.substate)
    }

    pub fn name(&self) -> &'static str {
        "Active"
    }
}

/// Discriminant of a [`State`] without its payload.
///
/// 不含负载数据的 [`State`] 判别值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Relaxed,
    Active,
    Restrictive,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Relaxed => "Relaxed",
            StateKind::Active => "Active",
            StateKind::Restrictive => "Restrictive",
        };
        f.write_str(name)
    }
}

/// The current congestion state of the state machine.
///
/// 状态机当前的拥塞状态。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum State {
    Relaxed(Relaxed),
    Active(Active),
    Restrictive(Restrictive),
}

impl State {
    pub fn kind(&self) -> StateKind {
        match self {
            State::Relaxed(_) => StateKind::Relaxed,
            State::Active(_) => StateKind::Active,
            State::Restrictive(_) => StateKind::Restrictive,
        }
    }

    /// Advised interval between two consecutive messages.
    ///
    /// 两条连续消息之间的建议间隔。
    pub fn transmission_interval(&self) -> Duration {
        match self {
            State::Relaxed(relaxed) => relaxed.transmission_interval(),
            State::Active(active) => active.transmission_interval(),
            State::Restrictive(restrictive) => restrictive.transmission_interval(),
        }
    }

    /// Maximum message rate in messages per second.
    ///
    /// 最大消息速率（每秒消息数）。
    pub fn message_rate(&self) -> f64 {
        1.0 / self.transmission_interval().as_secs_f64()
    }

    pub fn name(&self) -> &'static str {
        match self {
            State::Relaxed(relaxed) => relaxed.name(),
            State::Active(active) => active.name(),
            State::Restrictive(restrictive) => restrictive.name(),
        }
    }

    /// The Active substate, `None` in any other state.
    pub fn substate(&self) -> Option<usize> {
        match self {
            State::Active(active) => Some(active.substate()),
            State::Relaxed(_) | State::Restrictive(_) => None,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Active(active) => write!(f, "{}({})", active.name(), active.substate()),
            State::Relaxed(_) | State::Restrictive(_) => f.write_str(self.name()),
        }
    }
}
