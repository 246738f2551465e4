//! 错误类型定义

use thiserror::Error;

/// 翻棋规则错误
///
/// 所有规则校验都在修改房间状态之前完成，返回这些错误时房间保持原样。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// 坐标越界
    #[error("out of bounds")]
    OutOfBounds,

    /// 房间不在对局中
    #[error("room not playing")]
    RoomNotPlaying,

    /// 房间不在等待状态，无法开局
    #[error("room not waiting")]
    RoomNotWaiting,

    /// 玩家不在房间中
    #[error("player not found")]
    PlayerNotFound,

    /// 不是你的回合
    #[error("not your turn")]
    NotYourTurn,

    /// 翻棋目标格为空
    #[error("no piece to flip")]
    NoPieceToFlip,

    /// 棋子不在注册表中
    #[error("piece not found")]
    PieceNotFound,

    /// 棋子已翻开
    #[error("piece already flipped")]
    AlreadyFlipped,

    /// 走法不是单步正交移动
    #[error("invalid move")]
    InvalidMove,

    /// 起点没有棋子
    #[error("no piece to move")]
    NoPieceToMove,

    /// 棋子不可用（已阵亡）
    #[error("piece not available")]
    PieceNotAvailable,

    /// 棋子尚未翻开
    #[error("piece not flipped")]
    PieceNotFlipped,

    /// 不能移动对方棋子
    #[error("cannot move opponent piece")]
    NotYourPiece,

    /// 军旗、地雷不能移动
    #[error("piece cannot move")]
    PieceCannotMove,

    /// 被攻击方不可用
    #[error("defender not available")]
    DefenderNotAvailable,

    /// 不能攻击己方棋子
    #[error("cannot attack own piece")]
    CannotAttackOwnPiece,
}

/// 消息投递错误
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// 对端已关闭
    #[error("sink closed")]
    Closed,

    /// 发送队列已满
    #[error("sink full")]
    Full,
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// JSON 解码错误（信封或载荷格式错误）
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),

    /// 未知的消息类型
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// 规则错误
    #[error(transparent)]
    Game(#[from] GameError),

    /// 房间执行器已停止
    #[error("room closed")]
    RoomClosed,
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
