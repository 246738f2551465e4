//! 军棋翻棋服务端
//!
//! 包含:
//! - 玩家管理
//! - 房间状态机（翻棋、走棋、胜负判定）
//! - 消息分发
//! - 房间任务（串行执行）
//! - 服务端配置

pub mod actor;
pub mod config;
pub mod player;
pub mod room;
pub mod server;

#[cfg(test)]
mod testing;

pub use actor::{RoomHandle, RoomSnapshot};
pub use config::ServerConfig;
pub use player::Player;
pub use room::Room;
pub use server::MessageHandler;
