//! DCC Driver - 按固定采样周期驱动状态机的 Actor
//!
//! 该模块提供一个 Actor，它收集信道负载测量值，并在每个采样周期
//! 将最新的测量值送入状态机。
//!
//! DCC Driver - Actor ticking the state machine at the sampling cadence
//!
//! This module provides an Actor which collects channel load measurements
//! and feeds the most recent one into the state machine once per sampling
//! period.

use crate::channel_load::ChannelLoad;
use crate::error::{Error, Result};
use crate::smoothing::{ChannelLoadSmoothing, ExponentialSmoothing};
use crate::state_machine::{DccReader, StateMachine};
use std::ops::ControlFlow;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info, trace};


/// Capacity of the driver's command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// 驱动Actor命令类型
/// Driver Actor command types
#[derive(Debug)]
pub enum DccCommand {
    /// 报告一个采样周期的信道负载
    /// Report the channel load of one sampling period
    Report(ChannelLoad),

    /// 获取Actor统计信息
    /// Get Actor statistics
    GetStats {
        response_tx: oneshot::Sender<DriverStats>,
    },

    /// 关闭Actor
    /// Shutdown Actor
    Shutdown,
}

/// 驱动Actor统计信息
/// Driver Actor statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// 已经过的采样周期数
    /// Number of elapsed sampling periods
    pub ticks: u64,
    /// 送入状态机的测量值数量
    /// Number of measurements fed into the state machine
    pub updates: u64,
    /// 没有新测量值而跳过的周期数
    /// Periods skipped because no fresh measurement arrived
    pub skipped_ticks: u64,
    /// 被新测量值覆盖而丢弃的测量值数量
    /// Measurements dropped because a newer one arrived in the same period
    pub superseded_reports: u64,
    /// 状态转换次数
    /// Number of state transitions
    pub transitions: u64,
}

/// DCC驱动Actor
/// DCC driver Actor
#[derive(Debug)]
pub struct DccDriver<S = ExponentialSmoothing> {
    /// 被驱动的状态机
    /// The driven state machine
    machine: StateMachine<S>,

    /// 当前周期内最新的测量值
    /// Latest measurement of the current period
    pending: Option<ChannelLoad>,

    /// Actor统计信息
    /// Actor statistics
    stats: DriverStats,
}

impl<S: ChannelLoadSmoothing> DccDriver<S> {
    pub fn new(machine: StateMachine<S>) -> Self {
        Self {
            machine,
            pending: None,
            stats: DriverStats::default(),
        }
    }

    /// 启动Actor主循环，结束时交还状态机
    /// Start Actor main loop, handing the state machine back when it ends
    pub async fn run(mut self, mut command_rx: mpsc::Receiver<DccCommand>) -> StateMachine<S> {
        let period = self.machine.sampling_period();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(?period, "DCC driver started");

        loop {
            tokio::select! {
                biased;

                // 处理命令
                // Process commands
                command = command_rx.recv() => {
                    match command {
                        Some(command) => {
                            if self.handle_command(command).is_break() {
                                break;
                            }
                        }
                        None => {
                            debug!("DCC driver command channel closed, shutting down");
                            break;
                        }
                    }
                }

                // 采样周期
                // Sampling period
                _ = ticker.tick() => self.on_tick(),
            }
        }

        debug!(stats = ?self.stats, "DCC driver shutdown complete");
        self.machine
    }

    fn handle_command(&mut self, command: DccCommand) -> ControlFlow<()> {
        match command {
            DccCommand::Report(load) => {
                if self.pending.replace(load).is_some() {
                    self.stats.superseded_reports += 1;
                }
            }
            DccCommand::GetStats { response_tx } => {
                let _ = response_tx.send(self.stats);
            }
            // 请求退出主循环
            DccCommand::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn on_tick(&mut self) {
        self.stats.ticks += 1;
        let Some(load) = self.pending.take() else {
            self.stats.skipped_ticks += 1;
            trace!(tick = self.stats.ticks, "No channel load reported, keeping last snapshot");
            return;
        };

        self.stats.updates += 1;
        if self.machine.update(&load).is_some() {
            self.stats.transitions += 1;
        }
    }
}

/// A cloneable sender of channel load measurements.
///
/// 可克隆的信道负载测量值发送端。
#[derive(Debug, Clone)]
pub struct LoadReporter {
    command_tx: mpsc::Sender<DccCommand>,
}

impl LoadReporter {
    /// Reports the channel load measured during the current sampling period.
    /// A later report in the same period replaces this one.
    ///
    /// 报告当前采样周期内测得的信道负载。同一周期内后到的报告会替换此报告。
    pub async fn report(&self, load: ChannelLoad) -> Result<()> {
        self.command_tx
            .send(DccCommand::Report(load))
            .await
            .map_err(|_| Error::DriverShutdown)
    }
}

/// 驱动任务的句柄
/// Handle of the driver task
#[derive(Debug)]
pub struct DccDriverHandle<S = ExponentialSmoothing> {
    reporter: LoadReporter,
    reader: DccReader,
    join_handle: JoinHandle<StateMachine<S>>,
}

impl<S: ChannelLoadSmoothing> DccDriverHandle<S> {
    pub async fn report(&self, load: ChannelLoad) -> Result<()> {
        self.reporter.report(load).await
    }

    pub fn reporter(&self) -> LoadReporter {
        self.reporter.clone()
    }

    pub fn reader(&self) -> DccReader {
        self.reader.clone()
    }

    /// 获取Actor统计信息
    /// Get Actor statistics
    pub async fn stats(&self) -> Result<DriverStats> {
        let (response_tx, response_rx) = oneshot::channel();
        self.reporter
            .command_tx
            .send(DccCommand::GetStats { response_tx })
            .await
            .map_err(|_| Error::DriverShutdown)?;
        response_rx.await.map_err(|_| Error::DriverShutdown)
    }

    /// Stops the driver and hands back the state machine.
    ///
    /// 停止驱动并交还状态机。
    pub async fn shutdown(self) -> Result<StateMachine<S>> {
        // The task may already be gone, joining still reports the outcome.
        let _ = self.reporter.command_tx.send(DccCommand::Shutdown).await;
        self.join_handle.await.map_err(|_| Error::DriverShutdown)
    }
}

/// Spawns a driver task ticking `machine` at its sampling period.
///
/// 启动一个按采样周期驱动 `machine` 的任务。
pub fn spawn_driver<S: ChannelLoadSmoothing>(machine: StateMachine<S>) -> DccDriverHandle<S> {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let reader = machine.reader();
    let join_handle = tokio::spawn(DccDriver::new(machine).run(command_rx));

    DccDriverHandle {
        reporter: LoadReporter { command_tx },
        reader,
        join_handle,
    }
}
