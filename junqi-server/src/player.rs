//! 玩家管理

use std::sync::Arc;

use protocol::{Camp, MessageSink, ServerMessage, UserId};

/// 房间内的玩家
pub struct Player {
    pub user_id: UserId,
    /// 首次翻棋时确定，只设置一次
    pub camp: Camp,
    pub online: bool,
    /// 出站消息通道，断线时为 None
    sink: Option<Arc<dyn MessageSink>>,
}

impl Player {
    /// 创建在线玩家
    pub fn new(user_id: impl Into<UserId>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            user_id: user_id.into(),
            camp: Camp::Unknown,
            online: true,
            sink: Some(sink),
        }
    }

    /// 创建尚未连接的玩家
    pub fn offline(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            camp: Camp::Unknown,
            online: false,
            sink: None,
        }
    }

    /// 绑定新的连接（上线或重连）
    pub fn attach(&mut self, sink: Arc<dyn MessageSink>) {
        self.sink = Some(sink);
        self.online = true;
    }

    /// 解绑连接（断线）
    pub fn detach(&mut self) -> Option<Arc<dyn MessageSink>> {
        self.online = false;
        self.sink.take()
    }

    /// 投递消息，失败只记录日志
    pub fn deliver(&self, msg: &ServerMessage) {
        let Some(sink) = &self.sink else {
            tracing::debug!(user_id = %self.user_id, kind = msg.kind(), "玩家未连接，丢弃消息");
            return;
        };
        if let Err(e) = sink.send(msg) {
            tracing::warn!(user_id = %self.user_id, kind = msg.kind(), "消息投递失败: {}", e);
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("user_id", &self.user_id)
            .field("camp", &self.camp)
            .field("online", &self.online)
            .field("connected", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_new_player() {
        let (tx, _rx) = mpsc::unbounded_channel::<ServerMessage>();
        let player = Player::new("alice", Arc::new(tx));
        assert_eq!(player.camp, Camp::Unknown);
        assert!(player.online);

        let player = Player::offline("bob");
        assert!(!player.online);
    }

    #[test]
    fn test_attach_detach() {
        let mut player = Player::offline("alice");
        // 未连接时投递不会出错
        player.deliver(&ServerMessage::Pong { ts: 0 });

        let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
        player.attach(Arc::new(tx));
        assert!(player.online);

        player.deliver(&ServerMessage::Pong { ts: 1 });
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::Pong { ts: 1 });

        assert!(player.detach().is_some());
        assert!(!player.online);
        player.deliver(&ServerMessage::Pong { ts: 2 });
        assert!(rx.try_recv().is_err());
    }
}
