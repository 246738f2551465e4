//! 消息分发
//!
//! 解码客户端消息，调用房间操作，并按顺序发出广播/单播事件。

use chrono::Utc;
use protocol::{
    BattleEvent, ClientMessage, FlipPayload, MovePayload, ProtocolError, Result, RoomState,
    ServerMessage, UNKNOWN_MESSAGE_TYPE,
};

use crate::room::Room;

/// 消息处理器
#[derive(Debug, Clone, Copy)]
pub struct MessageHandler {
    /// 解码失败时是否也向发送方回一条 error
    notify_decode_errors: bool,
}

impl Default for MessageHandler {
    fn default() -> Self {
        Self {
            notify_decode_errors: true,
        }
    }
}

impl MessageHandler {
    pub fn new(notify_decode_errors: bool) -> Self {
        Self { notify_decode_errors }
    }

    pub fn notifies_decode_errors(&self) -> bool {
        self.notify_decode_errors
    }

    /// 处理一条客户端原始消息
    ///
    /// 调用方必须保证同一房间的消息串行处理。
    pub fn handle(&self, room: &mut Room, user_id: &str, raw: &[u8]) -> Result<()> {
        let msg = match ClientMessage::decode(raw) {
            Ok(msg) => msg,
            Err(ProtocolError::UnknownMessageType(kind)) => {
                tracing::warn!(room_id = %room.id(), user_id, kind = %kind, "未知消息类型");
                room.send_to(user_id, &ServerMessage::error(UNKNOWN_MESSAGE_TYPE));
                return Err(ProtocolError::UnknownMessageType(kind));
            }
            Err(e) => {
                tracing::warn!(room_id = %room.id(), user_id, "消息解码失败: {}", e);
                if self.notify_decode_errors {
                    room.send_to(user_id, &ServerMessage::error(e.to_string()));
                }
                return Err(e);
            }
        };

        match msg {
            ClientMessage::Flip(payload) => Self::handle_flip(room, user_id, payload),
            ClientMessage::Move(payload) => Self::handle_move(room, user_id, payload),
            ClientMessage::Ping => {
                Self::handle_ping(room, user_id);
                Ok(())
            }
        }
    }

    /// 处理翻棋
    fn handle_flip(room: &mut Room, user_id: &str, payload: FlipPayload) -> Result<()> {
        if let Err(e) = room.flip(user_id, payload.x, payload.y) {
            tracing::debug!(room_id = %room.id(), user_id, "翻棋被拒绝: {}", e);
            room.send_to(user_id, &ServerMessage::error(e.to_string()));
            return Err(e.into());
        }
        room.broadcast(&ServerMessage::Sync(room.sync_view()));
        Ok(())
    }

    /// 处理走棋
    ///
    /// 发生战斗时先广播 battle；对局结束则广播 game_over 且不再同步。
    fn handle_move(room: &mut Room, user_id: &str, payload: MovePayload) -> Result<()> {
        let (from, to) = (payload.from(), payload.to());
        let battle = match room.make_move(user_id, from, to) {
            Ok(battle) => battle,
            Err(e) => {
                tracing::debug!(room_id = %room.id(), user_id, "走棋被拒绝: {}", e);
                room.send_to(user_id, &ServerMessage::error(e.to_string()));
                return Err(e.into());
            }
        };

        if let Some(report) = &battle {
            room.broadcast(&ServerMessage::Battle(BattleEvent::new(from, to, report)));
        }

        if room.state() == RoomState::Finished {
            if let (Some(winner), Some(reason)) = (room.winner(), room.reason()) {
                room.broadcast(&ServerMessage::GameOver { winner, reason });
            }
            return Ok(());
        }

        room.broadcast(&ServerMessage::Sync(room.sync_view()));
        Ok(())
    }

    /// 处理心跳，只回复发送方
    fn handle_ping(room: &Room, user_id: &str) {
        room.send_to(
            user_id,
            &ServerMessage::Pong {
                ts: Utc::now().timestamp(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{room_with, FailingSink};
    use protocol::{BattleResult, Camp, GameError, Piece, PieceType, Position, WinReason};
    use std::sync::Arc;

    fn flipped(id: &str, piece_type: PieceType, camp: Camp, x: i32, y: i32) -> Piece {
        let mut piece = Piece::new(id, piece_type, camp, Position::new(x, y));
        piece.flipped = true;
        piece
    }

    fn hidden(id: &str, piece_type: PieceType, camp: Camp, x: i32, y: i32) -> Piece {
        Piece::new(id, piece_type, camp, Position::new(x, y))
    }

    fn move_msg(from: (i32, i32), to: (i32, i32)) -> String {
        format!(
            r#"{{"type":"move","data":{{"fromX":{},"fromY":{},"toX":{},"toY":{}}}}}"#,
            from.0, from.1, to.0, to.1
        )
    }

    #[test]
    fn test_flip_broadcasts_sync() {
        let (mut room, alice, bob) = room_with(vec![hidden("r3", PieceType::Captain, Camp::Red, 2, 5)]);
        room.start(Camp::Unknown).unwrap();
        let handler = MessageHandler::default();

        handler
            .handle(&mut room, "alice", br#"{"type":"flip","data":{"x":2,"y":5}}"#)
            .unwrap();

        assert_eq!(alice.kinds(), vec!["sync"]);
        assert_eq!(bob.messages(), alice.messages());
        match &bob.messages()[0] {
            ServerMessage::Sync(view) => {
                assert_eq!(view.step, 1);
                assert_eq!(view.turn, Camp::Blue);
                let cell = view.cell(2, 5).unwrap();
                assert_eq!(cell.piece_type, Some(PieceType::Captain));
                assert_eq!(cell.camp, Some(Camp::Red));
            }
            other => panic!("Unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_flip_error_is_private() {
        let (mut room, alice, bob) = room_with(vec![]);
        room.start(Camp::Unknown).unwrap();
        let handler = MessageHandler::default();

        let err = handler
            .handle(&mut room, "alice", br#"{"type":"flip","data":{"x":0,"y":0}}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Game(GameError::NoPieceToFlip)));
        assert_eq!(alice.messages(), vec![ServerMessage::error("no piece to flip")]);
        assert!(bob.messages().is_empty());
    }

    #[test]
    fn test_move_broadcasts_sync() {
        let (mut room, alice, bob) = room_with(vec![
            flipped("r5", PieceType::Colonel, Camp::Red, 1, 5),
            flipped("b3", PieceType::Captain, Camp::Blue, 4, 0),
        ]);
        room.player_mut("alice").unwrap().camp = Camp::Red;
        room.player_mut("bob").unwrap().camp = Camp::Blue;
        room.start(Camp::Red).unwrap();

        MessageHandler::default()
            .handle(&mut room, "alice", move_msg((1, 5), (1, 4)).as_bytes())
            .unwrap();

        assert_eq!(alice.kinds(), vec!["sync"]);
        assert_eq!(bob.kinds(), vec!["sync"]);
    }

    #[test]
    fn test_move_battle_then_sync() {
        let (mut room, alice, bob) = room_with(vec![
            flipped("r5", PieceType::Colonel, Camp::Red, 1, 5),
            flipped("b3", PieceType::Captain, Camp::Blue, 1, 6),
            flipped("b4", PieceType::Major, Camp::Blue, 4, 11),
        ]);
        room.player_mut("alice").unwrap().camp = Camp::Red;
        room.player_mut("bob").unwrap().camp = Camp::Blue;
        room.start(Camp::Red).unwrap();

        MessageHandler::default()
            .handle(&mut room, "alice", move_msg((1, 5), (1, 6)).as_bytes())
            .unwrap();

        assert_eq!(alice.kinds(), vec!["battle", "sync"]);
        assert_eq!(bob.messages(), alice.messages());
        assert_eq!(
            bob.messages()[0],
            ServerMessage::Battle(BattleEvent {
                from: [1, 5],
                to: [1, 6],
                attacker: PieceType::Colonel,
                defender: PieceType::Captain,
                result: BattleResult::AttackerWin,
            })
        );
    }

    #[test]
    fn test_move_game_over_skips_sync() {
        let (mut room, alice, bob) = room_with(vec![
            flipped("r1", PieceType::Engineer, Camp::Red, 1, 5),
            hidden("bf", PieceType::Flag, Camp::Blue, 1, 6),
            flipped("b9", PieceType::Marshal, Camp::Blue, 4, 11),
        ]);
        room.player_mut("alice").unwrap().camp = Camp::Red;
        room.player_mut("bob").unwrap().camp = Camp::Blue;
        room.start(Camp::Red).unwrap();

        MessageHandler::default()
            .handle(&mut room, "alice", move_msg((1, 5), (1, 6)).as_bytes())
            .unwrap();

        assert_eq!(alice.kinds(), vec!["battle", "game_over"]);
        assert_eq!(
            bob.messages()[1],
            ServerMessage::GameOver {
                winner: Camp::Red,
                reason: WinReason::FlagCaptured,
            }
        );
    }

    #[test]
    fn test_move_error_is_private() {
        let (mut room, alice, bob) = room_with(vec![flipped("r5", PieceType::Colonel, Camp::Red, 1, 5)]);
        room.player_mut("alice").unwrap().camp = Camp::Red;
        room.player_mut("bob").unwrap().camp = Camp::Blue;
        room.start(Camp::Red).unwrap();

        let err = MessageHandler::default()
            .handle(&mut room, "bob", move_msg((1, 5), (1, 4)).as_bytes())
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Game(GameError::NotYourTurn)));
        assert_eq!(bob.messages(), vec![ServerMessage::error("not your turn")]);
        assert!(alice.messages().is_empty());
        assert_eq!(room.step(), 0);
    }

    #[test]
    fn test_ping_pong_unicast() {
        let (mut room, alice, bob) = room_with(vec![]);
        let before = Utc::now().timestamp();

        MessageHandler::default()
            .handle(&mut room, "bob", br#"{"type":"ping","data":{}}"#)
            .unwrap();

        assert!(alice.messages().is_empty());
        match &bob.messages()[..] {
            [ServerMessage::Pong { ts }] => assert!(*ts >= before),
            other => panic!("Unexpected messages: {other:?}"),
        }
        // 心跳不改变状态
        assert_eq!(room.state(), RoomState::Waiting);
        assert_eq!(room.step(), 0);
    }

    #[test]
    fn test_unknown_message_type() {
        let (mut room, alice, bob) = room_with(vec![]);

        let err = MessageHandler::default()
            .handle(&mut room, "alice", br#"{"type":"resign","data":{}}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownMessageType(ref kind) if kind == "resign"));
        assert_eq!(alice.messages(), vec![ServerMessage::error("unknown message type")]);
        assert!(bob.messages().is_empty());
    }

    #[test]
    fn test_missing_type_is_unknown() {
        let (mut room, alice, _) = room_with(vec![]);

        let err = MessageHandler::default()
            .handle(&mut room, "alice", br#"{"data":{}}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownMessageType(ref kind) if kind.is_empty()));
        assert_eq!(alice.messages(), vec![ServerMessage::error("unknown message type")]);
    }

    #[test]
    fn test_decode_error_notifies_sender() {
        let (mut room, alice, bob) = room_with(vec![hidden("r1", PieceType::Captain, Camp::Red, 0, 0)]);
        room.start(Camp::Unknown).unwrap();
        let before = room.sync_view();

        let err = MessageHandler::default()
            .handle(&mut room, "alice", br#"{"type":"flip","data":{"x":"a"}}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
        assert_eq!(alice.kinds(), vec!["error"]);
        assert!(bob.messages().is_empty());
        assert_eq!(room.sync_view(), before);
    }

    #[test]
    fn test_decode_error_silent_when_disabled() {
        let (mut room, alice, _) = room_with(vec![]);

        let err = MessageHandler::new(false)
            .handle(&mut room, "alice", b"{oops")
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Json(_)));
        assert!(alice.messages().is_empty());
    }

    #[test]
    fn test_failing_sink_does_not_block_other_player() {
        let (mut room, _, bob) = room_with(vec![hidden("r3", PieceType::Captain, Camp::Red, 2, 5)]);
        room.player_mut("alice").unwrap().attach(Arc::new(FailingSink));
        room.start(Camp::Unknown).unwrap();

        // 投递失败不回滚状态
        MessageHandler::default()
            .handle(&mut room, "alice", br#"{"type":"flip","data":{"x":2,"y":5}}"#)
            .unwrap();
        assert_eq!(room.step(), 1);
        assert_eq!(bob.kinds(), vec!["sync"]);
    }

    #[test]
    fn test_full_game() {
        // 双方各翻一枚，红方进逼，蓝方连长撞上红方团长后无子可动
        let (mut room, alice, bob) = room_with(vec![
            hidden("r5", PieceType::Colonel, Camp::Red, 1, 5),
            hidden("b3", PieceType::Captain, Camp::Blue, 1, 7),
            hidden("bf", PieceType::Flag, Camp::Blue, 4, 11),
        ]);
        room.start(Camp::Unknown).unwrap();
        let handler = MessageHandler::default();

        handler
            .handle(&mut room, "alice", br#"{"type":"flip","data":{"x":1,"y":5}}"#)
            .unwrap();
        handler
            .handle(&mut room, "bob", br#"{"type":"flip","data":{"x":1,"y":7}}"#)
            .unwrap();
        handler
            .handle(&mut room, "alice", move_msg((1, 5), (1, 6)).as_bytes())
            .unwrap();
        assert_eq!(room.turn(), Camp::Blue);

        handler
            .handle(&mut room, "bob", move_msg((1, 7), (1, 6)).as_bytes())
            .unwrap();

        assert_eq!(room.state(), RoomState::Finished);
        assert_eq!(room.winner(), Some(Camp::Red));
        assert_eq!(room.reason(), Some(WinReason::NoMovablePieces));
        assert_eq!(
            bob.kinds(),
            vec!["sync", "sync", "sync", "battle", "game_over"]
        );
        assert_eq!(alice.messages(), bob.messages());
        match &bob.messages()[3] {
            ServerMessage::Battle(event) => assert_eq!(event.result, BattleResult::DefenderWin),
            other => panic!("Unexpected message: {other:?}"),
        }
    }
}
