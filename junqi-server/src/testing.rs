//! 测试替身：记录型与失败型消息通道

use std::sync::{Arc, Mutex};

use protocol::{MessageSink, Piece, PieceRegistry, ServerMessage, SinkError};

use crate::player::Player;
use crate::room::Room;

/// 记录收到的所有消息
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<ServerMessage>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<ServerMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.messages.lock().unwrap().iter().map(|m| m.kind()).collect()
    }
}

impl MessageSink for RecordingSink {
    fn send(&self, msg: &ServerMessage) -> Result<(), SinkError> {
        self.messages.lock().unwrap().push(msg.clone());
        Ok(())
    }
}

/// 永远投递失败
#[derive(Debug, Default)]
pub struct FailingSink;

impl MessageSink for FailingSink {
    fn send(&self, _msg: &ServerMessage) -> Result<(), SinkError> {
        Err(SinkError::Closed)
    }
}

/// 创建 alice/bob 两人的房间，并把棋子按各自坐标摆上棋盘
pub fn room_with(pieces: Vec<Piece>) -> (Room, Arc<RecordingSink>, Arc<RecordingSink>) {
    let alice = Arc::new(RecordingSink::default());
    let bob = Arc::new(RecordingSink::default());
    let registry: PieceRegistry = pieces.iter().cloned().collect();

    let mut room = Room::new(
        "room-1",
        Player::new("alice", alice.clone()),
        Player::new("bob", bob.clone()),
        registry,
    );
    for piece in &pieces {
        room.board_mut().place(piece).unwrap();
    }
    (room, alice, bob)
}
