//! 消息投递抽象
//!
//! 房间只依赖 [`MessageSink`]，不关心底层是 WebSocket、TCP 还是测试替身。
//! 投递是同步、尽力而为的：失败由调用方记录后丢弃。

use tokio::sync::mpsc;

use crate::error::SinkError;
use crate::message::ServerMessage;

/// 出站消息投递能力
pub trait MessageSink: Send + Sync {
    /// 投递一条消息，不等待网络 I/O
    fn send(&self, msg: &ServerMessage) -> Result<(), SinkError>;
}

/// 有界通道：队列满时立即失败而不是等待
impl MessageSink for mpsc::Sender<ServerMessage> {
    fn send(&self, msg: &ServerMessage) -> Result<(), SinkError> {
        self.try_send(msg.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

impl MessageSink for mpsc::UnboundedSender<ServerMessage> {
    fn send(&self, msg: &ServerMessage) -> Result<(), SinkError> {
        mpsc::UnboundedSender::send(self, msg.clone()).map_err(|_| SinkError::Closed)
    }
}
