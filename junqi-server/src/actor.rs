//! 房间任务
//!
//! 每个房间由一个独立的 tokio 任务独占，命令经有界队列逐条串行执行，
//! 结果通过 oneshot 返回。不同房间之间互不影响。

use std::sync::Arc;

use protocol::{Camp, MessageSink, ProtocolError, Result, RoomState, UserId, WinReason};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::room::Room;
use crate::server::MessageHandler;

/// 房间状态快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub state: RoomState,
    pub turn: Camp,
    pub step: u64,
    pub winner: Option<Camp>,
    pub reason: Option<WinReason>,
}

impl RoomSnapshot {
    fn of(room: &Room) -> Self {
        Self {
            state: room.state(),
            turn: room.turn(),
            step: room.step(),
            winner: room.winner(),
            reason: room.reason(),
        }
    }
}

/// 房间任务命令
enum RoomCommand {
    /// 分发一条客户端原始消息
    Dispatch {
        user_id: UserId,
        raw: Vec<u8>,
        reply: oneshot::Sender<Result<()>>,
    },
    Start {
        turn: Camp,
        reply: oneshot::Sender<Result<()>>,
    },
    /// 玩家上线/重连
    Attach {
        user_id: UserId,
        sink: Arc<dyn MessageSink>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// 玩家断线
    Detach {
        user_id: UserId,
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// 房间任务句柄
///
/// 所有句柄被丢弃后任务退出，并通过 [`JoinHandle`] 交还房间。
#[derive(Debug, Clone)]
pub struct RoomHandle {
    tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// 启动房间任务
    pub fn spawn(room: Room, handler: MessageHandler, capacity: usize) -> (Self, JoinHandle<Room>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(room, handler, rx));
        (Self { tx }, task)
    }

    /// 分发客户端消息，等待处理完成
    pub async fn dispatch(&self, user_id: impl Into<UserId>, raw: impl Into<Vec<u8>>) -> Result<()> {
        let user_id = user_id.into();
        let raw = raw.into();
        self.request(|reply| RoomCommand::Dispatch { user_id, raw, reply })
            .await?
    }

    /// 开局
    pub async fn start(&self, turn: Camp) -> Result<()> {
        self.request(|reply| RoomCommand::Start { turn, reply }).await?
    }

    /// 为玩家绑定出站通道
    pub async fn attach(&self, user_id: impl Into<UserId>, sink: Arc<dyn MessageSink>) -> Result<()> {
        let user_id = user_id.into();
        self.request(|reply| RoomCommand::Attach { user_id, sink, reply })
            .await?
    }

    /// 解绑玩家出站通道
    pub async fn detach(&self, user_id: impl Into<UserId>) -> Result<()> {
        let user_id = user_id.into();
        self.request(|reply| RoomCommand::Detach { user_id, reply }).await?
    }

    /// 获取当前状态快照
    pub async fn snapshot(&self) -> Result<RoomSnapshot> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| ProtocolError::RoomClosed)?;
        rx.await.map_err(|_| ProtocolError::RoomClosed)
    }
}

async fn run(mut room: Room, handler: MessageHandler, mut rx: mpsc::Receiver<RoomCommand>) -> Room {
    tracing::debug!(room_id = %room.id(), "房间任务启动");

    while let Some(command) = rx.recv().await {
        match command {
            RoomCommand::Dispatch { user_id, raw, reply } => {
                let _ = reply.send(handler.handle(&mut room, &user_id, &raw));
            }
            RoomCommand::Start { turn, reply } => {
                let _ = reply.send(room.start(turn).map_err(Into::into));
            }
            RoomCommand::Attach { user_id, sink, reply } => {
                let result = room.player_mut(&user_id).map(|player| player.attach(sink));
                if result.is_ok() {
                    tracing::info!(room_id = %room.id(), %user_id, "玩家上线");
                }
                let _ = reply.send(result.map_err(Into::into));
            }
            RoomCommand::Detach { user_id, reply } => {
                let result = room.player_mut(&user_id).map(|player| {
                    player.detach();
                });
                if result.is_ok() {
                    tracing::info!(room_id = %room.id(), %user_id, "玩家离线");
                }
                let _ = reply.send(result.map_err(Into::into));
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(RoomSnapshot::of(&room));
            }
        }
    }

    tracing::debug!(room_id = %room.id(), step = room.step(), "房间任务退出");
    room
}
