//! Paces a message generator with the interval of the latest snapshot.
//!
//! 使用最新快照的间隔为消息生成器控制发送节奏。

use crate::state_machine::DccReader;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// Decides when the next message may be transmitted.
///
/// The interval is read from the shared snapshot at every decision, so a
/// state change applies to the next message without any notification.
///
/// 决定下一条消息何时可以发送。每次决策都从共享快照读取间隔，
/// 因此状态变化无需通知即可作用于下一条消息。
#[derive(Debug, Clone)]
pub struct TransmitGate {
    reader: DccReader,
    /// 上一次发送的时间
    /// Time of the last transmission
    last_transmission: Option<Instant>,
}

impl TransmitGate {
    pub fn new(reader: DccReader) -> Self {
        Self {
            reader,
            last_transmission: None,
        }
    }

    pub fn last_transmission(&self) -> Option<Instant> {
        self.last_transmission
    }

    /// Time left until a transmission is allowed, zero if allowed now.
    ///
    /// 距离允许发送还剩的时间，若现在即可发送则为零。
    pub fn delay(&self, now: Instant) -> Duration {
        match self.last_transmission {
            None => Duration::ZERO,
            Some(last) => {
                (last + self.reader.transmission_interval()).saturating_duration_since(now)
            }
        }
    }

    /// Records a transmission at `now` regardless of the current delay.
    ///
    /// 无论当前延迟如何，都记录一次在 `now` 的发送。
    pub fn notify(&mut self, now: Instant) {
        self.last_transmission = Some(now);
    }

    /// Records a transmission at `now` if one is allowed.
    ///
    /// 如果允许发送，则记录一次在 `now` 的发送。
    pub fn try_transmit(&mut self, now: Instant) -> bool {
        if self.delay(now).is_zero() {
            self.notify(now);
            true
        } else {
            false
        }
    }

    /// Waits until a transmission is allowed and records it.
    ///
    /// 等待直到允许发送，并记录这次发送。
    pub async fn wait_for_slot(&mut self) -> Instant {
        loop {
            let delay = self.delay(Instant::now());
            if delay.is_zero() {
                break;
            }
            trace!(?delay, "Waiting for transmission slot");
            sleep(delay).await;
        }
        let now = Instant::now();
        self.notify(now);
        now
    }
}
