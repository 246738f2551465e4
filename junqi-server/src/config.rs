//! 服务端配置

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use protocol::ServerMessage;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actor::RoomHandle;
use crate::room::Room;
use crate::server::MessageHandler;

/// 服务端配置，缺省字段使用默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 每个房间命令队列的容量
    pub room_queue_capacity: usize,
    /// 每名玩家出站消息队列的容量
    pub outbound_queue_capacity: usize,
    /// 解码失败时是否通知发送方
    pub notify_decode_errors: bool,
    /// 默认日志过滤指令，RUST_LOG 可追加
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            room_queue_capacity: 64,
            outbound_queue_capacity: 256,
            notify_decode_errors: true,
            log_filter: "junqi_server=debug".to_string(),
        }
    }
}

impl ServerConfig {
    /// 从 JSON 文件加载配置，未指定路径时使用默认配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {:?}", path))
    }

    /// 按配置创建消息处理器
    pub fn handler(&self) -> MessageHandler {
        MessageHandler::new(self.notify_decode_errors)
    }

    /// 按配置启动房间任务
    pub fn spawn_room(&self, room: Room) -> (RoomHandle, JoinHandle<Room>) {
        RoomHandle::spawn(room, self.handler(), self.room_queue_capacity)
    }

    /// 创建玩家出站队列
    pub fn outbound_channel(&self) -> (mpsc::Sender<ServerMessage>, mpsc::Receiver<ServerMessage>) {
        mpsc::channel(self.outbound_queue_capacity.max(1))
    }
}
