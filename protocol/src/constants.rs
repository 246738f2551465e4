//! 协议常量定义

/// 棋盘行数
pub const BOARD_ROWS: usize = 12;

/// 棋盘列数
pub const BOARD_COLS: usize = 5;

/// 每方棋子数量（标准翻棋一副 25 枚）
pub const PIECES_PER_CAMP: usize = 25;

/// 未知消息类型的错误提示
pub const UNKNOWN_MESSAGE_TYPE: &str = "unknown message type";
