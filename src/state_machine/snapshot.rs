//! 状态机快照及其只读句柄。
//! State machine snapshots and their read-only handle.
//!
//! The writer publishes one complete snapshot per tick. Readers copy the
//! whole snapshot out under a read lock, so they see either the previous
//! tick or the current one, never a mix of both.
//!
//! 写者每个周期发布一个完整快照。读者在读锁下复制整个快照，
//! 因此只会看到上一个周期或当前周期的数据，而不会看到两者的混合。

use crate::state::State;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Everything a reader may observe about the state machine after one tick.
///
/// 一个周期后读者可观察到的状态机全部信息。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// 当前状态（包括 Active 的子状态）
    /// Current state, including the Active substate
    pub state: State,
    /// 窗口内的最小平滑负载
    /// Smallest smoothed load in the window
    pub min_channel_load: f64,
    /// 窗口内的最大平滑负载
    /// Largest smoothed load in the window
    pub max_channel_load: f64,
    /// 最新的平滑负载
    /// Latest smoothed load
    pub smoothed_channel_load: f64,
    /// 已处理的更新次数
    /// Number of updates processed
    pub tick: u64,
}

impl Snapshot {
    pub(crate) fn initial(state: State) -> Self {
        Self {
            state,
            min_channel_load: 0.0,
            max_channel_load: 0.0,
            smoothed_channel_load: 0.0,
            tick: 0,
        }
    }

    pub fn transmission_interval(&self) -> Duration {
        self.state.transmission_interval()
    }

    pub fn message_rate(&self) -> f64 {
        self.state.message_rate()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} interval={:?} load={:.3} window=[{:.3}, {:.3}]",
            self.tick,
            self.state,
            self.transmission_interval(),
            self.smoothed_channel_load,
            self.min_channel_load,
            self.max_channel_load,
        )
    }
}

/// A cloneable, read-only view of the latest published snapshot.
///
/// Meant for message generators pacing their transmissions on another
/// thread or task than the one driving the state machine.
///
/// 最新发布快照的可克隆只读视图。
/// 供在驱动状态机之外的线程或任务中调度发送的消息生成器使用。
#[derive(Debug, Clone)]
pub struct DccReader {
    shared: Arc<RwLock<Snapshot>>,
}

impl DccReader {
    pub(crate) fn new(shared: Arc<RwLock<Snapshot>>) -> Self {
        Self { shared }
    }

    /// Copies out the latest published snapshot.
    ///
    /// 复制最新发布的快照。
    pub fn snapshot(&self) -> Snapshot {
        *self.shared.read()
    }

    pub fn state(&self) -> State {
        self.snapshot().state
    }

    pub fn transmission_interval(&self) -> Duration {
        self.snapshot().transmission_interval()
    }

    pub fn message_rate(&self) -> f64 {
        self.snapshot().message_rate()
    }
}

/// Write side of the shared snapshot, owned by the state machine.
#[derive(Debug)]
pub(crate) struct SnapshotPublisher {
    shared: Arc<RwLock<Snapshot>>,
}

impl SnapshotPublisher {
    pub(crate) fn new(initial: Snapshot) -> Self {
        Self {
            shared: Arc::new(RwLock::new(initial)),
        }
    }

    pub(crate) fn publish(&self, snapshot: Snapshot) {
        *self.shared.write() = snapshot;
    }

    pub(crate) fn reader(&self) -> DccReader {
        DccReader::new(Arc::clone(&self.shared))
    }
}
