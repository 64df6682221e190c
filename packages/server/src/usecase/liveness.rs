//! Liveness Monitor
//!
//! 一定間隔（既定 30 秒）で開いている全接続を巡回します。
//!
//! ```text
//! ALIVE --(probe 送信)--> AWAITING --(pong)--> ALIVE
//!                         AWAITING --(次の巡回まで応答なし)--> TERMINATED
//! ```
//!
//! 応答しない接続は、黙ってから 1 周期より早く切断されることはなく、2 周期以内に切断されます。
//! 強制切断後の後始末は `DisconnectUseCase`（クライアントからの切断と同じ経路）で行います。

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::domain::ConnectionRepository;

use super::DisconnectUseCase;

/// 1 回の巡回結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// probe を送った接続数
    pub probed: usize,
    /// 前回の probe に応答がなく切断した接続数
    pub terminated: usize,
    /// すでに閉じていたため後始末だけした接続数
    pub reaped: usize,
}

/// Periodic liveness sweep over every open connection
pub struct LivenessMonitor {
    connections: Arc<dyn ConnectionRepository>,
    disconnect_usecase: Arc<DisconnectUseCase>,
    interval: Duration,
}

impl LivenessMonitor {
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        disconnect_usecase: Arc<DisconnectUseCase>,
        interval: Duration,
    ) -> Self {
        Self {
            connections,
            disconnect_usecase,
            interval,
        }
    }

    /// 全接続を 1 回巡回する
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        for connection in self.connections.all().await {
            if !connection.is_open() {
                self.disconnect_usecase.execute(&connection).await;
                report.reaped += 1;
                continue;
            }

            if connection.begin_probe() {
                connection.ping();
                report.probed += 1;
            } else {
                tracing::warn!(
                    "Connection '{}' did not answer the last probe, terminating",
                    connection.id()
                );
                connection.terminate();
                self.disconnect_usecase.execute(&connection).await;
                report.terminated += 1;
            }
        }

        report
    }

    /// 巡回タスクを起動する
    ///
    /// 最初の巡回は起動から 1 周期後。
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(
                "Liveness monitor started (interval: {:?})",
                self.interval
            );

            loop {
                ticker.tick().await;
                let report = self.sweep().await;
                if report.terminated > 0 || report.reaped > 0 {
                    tracing::info!(
                        "Liveness sweep: probed {}, terminated {}, reaped {}",
                        report.probed,
                        report.terminated,
                        report.reaped
                    );
                } else {
                    tracing::debug!("Liveness sweep: probed {}", report.probed);
                }
            }
        })
    }
}
