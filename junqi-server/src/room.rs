//! 房间系统
//!
//! 一个房间就是一台串行执行的状态机：Waiting → Playing → Finished。
//! 只有翻棋和走棋会修改对局状态，两者都先完成全部校验再修改，
//! 被拒绝的操作不会改变房间。

use protocol::{
    resolve, BattleReport, BattleResult, Board, Camp, CellView, GameError, PieceRegistry,
    Position, RoomId, RoomState, ServerMessage, SyncView, WinReason,
};
use tracing::{debug, info};

use crate::player::Player;

/// 房间
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    players: [Player; 2],
    board: Board,
    pieces: PieceRegistry,
    /// 当前可行动的阵营
    turn: Camp,
    state: RoomState,
    winner: Option<Camp>,
    reason: Option<WinReason>,
    /// 已完成的翻棋/走棋次数
    step: u64,
}

impl Room {
    /// 创建新房间
    ///
    /// 棋子需要由调用方在开局前摆到棋盘上（见 [`Room::board_mut`]）。
    pub fn new(id: impl Into<RoomId>, player1: Player, player2: Player, pieces: PieceRegistry) -> Self {
        Self {
            id: id.into(),
            players: [player1, player2],
            board: Board::empty(),
            pieces,
            turn: Camp::Unknown,
            state: RoomState::Waiting,
            winner: None,
            reason: None,
            step: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn turn(&self) -> Camp {
        self.turn
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn winner(&self) -> Option<Camp> {
        self.winner
    }

    pub fn reason(&self) -> Option<WinReason> {
        self.reason
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 开局前摆子使用
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn pieces(&self) -> &PieceRegistry {
        &self.pieces
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    fn player_index(&self, user_id: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.user_id == user_id)
            .ok_or(GameError::PlayerNotFound)
    }

    /// 按 ID 查找玩家
    pub fn player(&self, user_id: &str) -> Result<&Player, GameError> {
        self.player_index(user_id).map(|i| &self.players[i])
    }

    /// 按 ID 查找玩家（可变，用于绑定/解绑连接）
    pub fn player_mut(&mut self, user_id: &str) -> Result<&mut Player, GameError> {
        let index = self.player_index(user_id)?;
        Ok(&mut self.players[index])
    }

    /// 开始游戏，确定先手阵营（可以是 Unknown，由首次翻棋决定）
    pub fn start(&mut self, turn: Camp) -> Result<(), GameError> {
        if self.state != RoomState::Waiting {
            return Err(GameError::RoomNotWaiting);
        }
        self.turn = turn;
        self.state = RoomState::Playing;
        info!(room_id = %self.id, %turn, "对局开始");
        Ok(())
    }

    /// 翻棋
    ///
    /// 阵营未定的玩家不受回合限制，这样双方都可以抢先翻第一枚棋子。
    pub fn flip(&mut self, user_id: &str, x: i32, y: i32) -> Result<(), GameError> {
        if self.state != RoomState::Playing {
            return Err(GameError::RoomNotPlaying);
        }
        let index = self.player_index(user_id)?;
        let camp = self.players[index].camp;
        if camp.is_known() && camp != self.turn {
            return Err(GameError::NotYourTurn);
        }

        let piece_id = self
            .board
            .cell(x, y)?
            .piece_id
            .clone()
            .ok_or(GameError::NoPieceToFlip)?;
        let piece = self
            .pieces
            .get_mut(&piece_id)
            .ok_or(GameError::PieceNotFound)?;
        if piece.flipped {
            return Err(GameError::AlreadyFlipped);
        }

        piece.flipped = true;
        let piece_camp = piece.camp;

        // 首次翻棋决定双方阵营
        if !camp.is_known() {
            self.players[index].camp = piece_camp;
            self.players[1 - index].camp = piece_camp.opponent();
            if !self.turn.is_known() {
                self.turn = piece_camp;
            }
            info!(room_id = %self.id, user_id, camp = %piece_camp, "阵营确定");
        }

        self.advance_turn();
        debug!(room_id = %self.id, user_id, piece_id = %piece_id, x, y, step = self.step, "翻棋");
        Ok(())
    }

    /// 走棋，目标格有敌方棋子时发生战斗并返回战斗记录
    pub fn make_move(
        &mut self,
        user_id: &str,
        from: Position,
        to: Position,
    ) -> Result<Option<BattleReport>, GameError> {
        if self.state != RoomState::Playing {
            return Err(GameError::RoomNotPlaying);
        }
        let camp = self.player(user_id)?.camp;
        if camp != self.turn {
            return Err(GameError::NotYourTurn);
        }
        if !self.board.in_bounds(from.x, from.y) || !self.board.in_bounds(to.x, to.y) {
            return Err(GameError::OutOfBounds);
        }
        // 只允许正交单步移动
        if from.distance(to) != 1 {
            return Err(GameError::InvalidMove);
        }

        let attacker_id = self
            .board
            .piece_at(from.x, from.y)
            .cloned()
            .ok_or(GameError::NoPieceToMove)?;
        let attacker = self
            .pieces
            .get(&attacker_id)
            .filter(|p| p.alive)
            .ok_or(GameError::PieceNotAvailable)?;
        if !attacker.flipped {
            return Err(GameError::PieceNotFlipped);
        }
        if attacker.camp != camp {
            return Err(GameError::NotYourPiece);
        }
        if !attacker.piece_type.is_movable() {
            return Err(GameError::PieceCannotMove);
        }

        let Some(defender_id) = self.board.piece_at(to.x, to.y).cloned() else {
            self.relocate(&attacker_id, from, to)?;
            self.advance_turn();
            debug!(room_id = %self.id, user_id, piece_id = %attacker_id, %from, %to, step = self.step, "走棋");
            return Ok(None);
        };

        let defender = self
            .pieces
            .get(&defender_id)
            .filter(|p| p.alive)
            .ok_or(GameError::DefenderNotAvailable)?;
        if defender.camp == camp {
            return Err(GameError::CannotAttackOwnPiece);
        }

        let (attacker, defender) = self
            .pieces
            .pair_mut(&attacker_id, &defender_id)
            .ok_or(GameError::PieceNotFound)?;
        let report = resolve(attacker, defender);

        match report.result {
            BattleResult::AttackerWin => self.relocate(&attacker_id, from, to)?,
            BattleResult::DefenderWin => self.board.set_piece(from.x, from.y, None)?,
            BattleResult::BothDie => {
                self.board.set_piece(from.x, from.y, None)?;
                self.board.set_piece(to.x, to.y, None)?;
            }
        }
        debug!(
            room_id = %self.id,
            attacker = %report.attacker_type,
            defender = %report.defender_type,
            result = ?report.result,
            "战斗"
        );

        self.check_game_over(&report);
        if self.state != RoomState::Finished {
            self.advance_turn();
        }
        Ok(Some(report))
    }

    /// 把棋子从 from 移到 to（覆盖 to 上原有的占用）
    fn relocate(&mut self, piece_id: &str, from: Position, to: Position) -> Result<(), GameError> {
        self.board.set_piece(from.x, from.y, None)?;
        self.board.set_piece(to.x, to.y, Some(piece_id.to_string()))?;
        if let Some(piece) = self.pieces.get_mut(piece_id) {
            piece.position = to;
        }
        Ok(())
    }

    /// 切换回合并增加步数
    fn advance_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.step += 1;
    }

    /// 战斗后的胜负判定
    ///
    /// 每次战斗都要检查双方，之前的消耗导致的无子可动也必须在此发现。
    fn check_game_over(&mut self, report: &BattleReport) {
        if let Some((winner, reason)) = report.game_over {
            self.finish(winner, reason);
            return;
        }
        for camp in [Camp::Red, Camp::Blue] {
            if !self.has_movable_pieces(camp) {
                self.finish(camp.opponent(), WinReason::NoMovablePieces);
                return;
            }
        }
    }

    fn finish(&mut self, winner: Camp, reason: WinReason) {
        self.state = RoomState::Finished;
        self.winner = Some(winner);
        self.reason = Some(reason);
        info!(room_id = %self.id, %winner, %reason, step = self.step, "对局结束");
    }

    /// 指定阵营是否还有存活、已翻开且可移动的棋子
    pub fn has_movable_pieces(&self, camp: Camp) -> bool {
        self.pieces.has_movable_pieces(camp)
    }

    /// 生成同步数据，未翻开的棋子只暴露 ID
    pub fn sync_view(&self) -> SyncView {
        let mut board = vec![vec![None; self.board.cols()]; self.board.rows()];
        for (x, y, cell) in self.board.iter() {
            let Some(piece) = cell.piece_id.as_deref().and_then(|id| self.pieces.get(id)) else {
                continue;
            };
            let revealed = piece.flipped;
            board[y as usize][x as usize] = Some(CellView {
                id: piece.id.clone(),
                flipped: revealed,
                piece_type: revealed.then_some(piece.piece_type),
                camp: revealed.then_some(piece.camp),
            });
        }
        SyncView {
            board,
            turn: self.turn,
            step: self.step,
        }
    }

    /// 广播消息给房间内两名玩家
    ///
    /// 一方投递失败不影响另一方。
    pub fn broadcast(&self, msg: &ServerMessage) {
        for player in &self.players {
            player.deliver(msg);
        }
    }

    /// 发送消息给指定玩家
    pub fn send_to(&self, user_id: &str, msg: &ServerMessage) {
        match self.player(user_id) {
            Ok(player) => player.deliver(msg),
            Err(_) => debug!(room_id = %self.id, user_id, "玩家不在房间中，丢弃消息"),
        }
    }
}
