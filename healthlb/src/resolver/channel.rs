//! 更新チャネル
//!
//! バックグラウンドのスケジューラーから単一の利用者へ更新バッチを
//! 生成順に届ける。容量はエンドポイント数で、`close()` 後は送受信とも
//! 即座に [`WatchError::Closed`] を返す。

use crate::error::WatchError;
use crate::lifecycle::Lifecycle;
use healthlb_common::UpdateBatch;
use tokio::sync::{mpsc, Mutex};

/// 更新チャネルを作成
///
/// `capacity` は保留できるバッチ数（最低1）。
pub fn update_channel(capacity: usize, lifecycle: Lifecycle) -> (UpdateSender, UpdateReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        UpdateSender {
            tx,
            lifecycle: lifecycle.clone(),
        },
        UpdateReceiver {
            rx: Mutex::new(rx),
            lifecycle,
        },
    )
}

/// 送信側（スケジューラーが保持）
#[derive(Debug)]
pub struct UpdateSender {
    tx: mpsc::Sender<UpdateBatch>,
    lifecycle: Lifecycle,
}

impl UpdateSender {
    /// バッチを送信
    ///
    /// 空のバッチは送信しない。チャネルが満杯の場合は空きが出るか
    /// `close()` されるまで待つ。
    pub async fn send(&self, batch: UpdateBatch) -> Result<(), WatchError> {
        if self.lifecycle.is_closed() {
            return Err(WatchError::Closed);
        }
        if batch.is_empty() {
            return Ok(());
        }
        tokio::select! {
            biased;
            _ = self.lifecycle.closed() => Err(WatchError::Closed),
            sent = self.tx.send(batch) => sent.map_err(|_| WatchError::Closed),
        }
    }

    /// 受信側が全て破棄されるまで待つ
    pub async fn receiver_dropped(&self) {
        self.tx.closed().await
    }
}

/// 受信側（Watcherが保持）
#[derive(Debug)]
pub struct UpdateReceiver {
    rx: Mutex<mpsc::Receiver<UpdateBatch>>,
    lifecycle: Lifecycle,
}

impl UpdateReceiver {
    /// 次のバッチを待つ
    ///
    /// `close()` 済みであれば保留中のバッチがあっても `Closed` を返す。
    pub async fn next(&self) -> Result<UpdateBatch, WatchError> {
        if self.lifecycle.is_closed() {
            return Err(WatchError::Closed);
        }
        let mut rx = tokio::select! {
            biased;
            _ = self.lifecycle.closed() => return Err(WatchError::Closed),
            rx = self.rx.lock() => rx,
        };
        tokio::select! {
            biased;
            _ = self.lifecycle.closed() => Err(WatchError::Closed),
            batch = rx.recv() => batch.ok_or(WatchError::Closed),
        }
    }

    /// チャネルを閉じる（冪等）
    pub fn close(&self) {
        self.lifecycle.close();
    }

    /// `close()` 済みか
    pub fn is_closed(&self) -> bool {
        self.lifecycle.is_closed()
    }
}
