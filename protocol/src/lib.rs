//! 翻棋共享协议库
//!
//! 包含:
//! - 棋子、棋盘、棋子注册表等核心数据结构
//! - 战斗结算规则
//! - 消息类型定义 (ClientMessage, ServerMessage)
//! - 出站消息投递抽象 (MessageSink)

mod battle;
mod board;
mod constants;
mod error;
mod message;
mod piece;
mod registry;
mod sink;

pub use battle::{resolve, BattleReport, BattleResult, WinReason};
pub use board::{Board, Cell};
pub use constants::*;
pub use error::{GameError, ProtocolError, Result, SinkError};
pub use message::{
    BattleEvent, CellView, ClientMessage, Envelope, FlipPayload, MovePayload, RoomId, RoomState,
    ServerMessage, SyncView, UserId,
};
pub use piece::{Camp, Piece, PieceId, PieceType, Position};
pub use registry::PieceRegistry;
pub use sink::MessageSink;
