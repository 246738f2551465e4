//! 消息类型定义
//!
//! 线上格式统一为 `{"type": ..., "data": ...}`。
//! 客户端消息先解析信封，再按类型解析各自的载荷。

use serde::{Deserialize, Serialize};

use crate::battle::{BattleReport, BattleResult, WinReason};
use crate::error::{ProtocolError, Result};
use crate::piece::{Camp, PieceId, PieceType, Position};

/// 玩家 ID
pub type UserId = String;

/// 房间 ID
pub type RoomId = String;

/// 房间状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomState {
    /// 等待开局（棋子已由外部摆放）
    #[default]
    Waiting,
    /// 对局中
    Playing,
    /// 已结束，不可逆
    Finished,
}

/// 消息信封
///
/// 缺少 `type` 时按空类型处理，归入未知消息类型。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// 翻棋载荷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipPayload {
    pub x: i32,
    pub y: i32,
}

/// 走棋载荷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    pub from_x: i32,
    pub from_y: i32,
    pub to_x: i32,
    pub to_y: i32,
}

impl MovePayload {
    pub fn from(&self) -> Position {
        Position::new(self.from_x, self.from_y)
    }

    pub fn to(&self) -> Position {
        Position::new(self.to_x, self.to_y)
    }
}

/// 客户端发送给服务端的消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// 翻棋
    Flip(FlipPayload),
    /// 走棋
    Move(MovePayload),
    /// 心跳请求
    Ping,
}

impl ClientMessage {
    /// 从原始字节解码
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let envelope: Envelope = serde_json::from_slice(raw)?;
        Self::from_envelope(envelope)
    }

    /// 按信封类型解析载荷
    pub fn from_envelope(envelope: Envelope) -> Result<Self> {
        match envelope.kind.as_str() {
            "flip" => Ok(ClientMessage::Flip(serde_json::from_value(envelope.data)?)),
            "move" => Ok(ClientMessage::Move(serde_json::from_value(envelope.data)?)),
            "ping" => Ok(ClientMessage::Ping),
            _ => Err(ProtocolError::UnknownMessageType(envelope.kind)),
        }
    }

    /// 消息类型名
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Flip(_) => "flip",
            ClientMessage::Move(_) => "move",
            ClientMessage::Ping => "ping",
        }
    }
}

/// 同步视图中的一格
///
/// 未翻开的棋子只暴露 ID，不泄露类型和阵营。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub id: PieceId,
    pub flipped: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub piece_type: Option<PieceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camp: Option<Camp>,
}

/// 棋盘同步数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncView {
    /// 按行排列，空格为 null
    pub board: Vec<Vec<Option<CellView>>>,
    pub turn: Camp,
    pub step: u64,
}

impl SyncView {
    /// 获取指定坐标的格子
    pub fn cell(&self, x: usize, y: usize) -> Option<&CellView> {
        self.board.get(y)?.get(x)?.as_ref()
    }
}

/// 战斗事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub from: [i32; 2],
    pub to: [i32; 2],
    pub attacker: PieceType,
    pub defender: PieceType,
    pub result: BattleResult,
}

impl BattleEvent {
    pub fn new(from: Position, to: Position, report: &BattleReport) -> Self {
        Self {
            from: from.to_array(),
            to: to.to_array(),
            attacker: report.attacker_type,
            defender: report.defender_type,
            result: report.result,
        }
    }
}

/// 服务端发送给客户端的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// 棋盘同步
    Sync(SyncView),
    /// 战斗结果
    Battle(BattleEvent),
    /// 游戏结束
    GameOver { winner: Camp, reason: WinReason },
    /// 心跳响应（Unix 秒）
    Pong { ts: i64 },
    /// 错误消息（只发给出错的玩家）
    Error { msg: String },
}

impl ServerMessage {
    pub fn error(msg: impl Into<String>) -> Self {
        ServerMessage::Error { msg: msg.into() }
    }

    /// 消息类型名
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Sync(_) => "sync",
            ServerMessage::Battle(_) => "battle",
            ServerMessage::GameOver { .. } => "game_over",
            ServerMessage::Pong { .. } => "pong",
            ServerMessage::Error { .. } => "error",
        }
    }
}
