//! 战斗结算
//!
//! 规则按固定优先级匹配，先匹配者生效：
//! 1. 防守方是军旗：攻击方获胜并直接赢得对局
//! 2. 任一方是炸弹：同归于尽
//! 3. 防守方是地雷：工兵排雷成功，其他棋子触雷阵亡
//! 4. 比较军衔：大吃小，相同则同归于尽

use serde::{Deserialize, Serialize};

use crate::piece::{Camp, Piece, PieceId, PieceType};

/// 战斗结果标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    AttackerWin,
    DefenderWin,
    BothDie,
}

/// 胜利原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    /// 夺得对方军旗
    FlagCaptured,
    /// 对方没有可行棋的棋子
    NoMovablePieces,
}

impl std::fmt::Display for WinReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WinReason::FlagCaptured => f.write_str("flag_captured"),
            WinReason::NoMovablePieces => f.write_str("no_movable_pieces"),
        }
    }
}

/// 一次战斗的完整记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleReport {
    pub attacker_id: PieceId,
    pub defender_id: PieceId,
    pub attacker_type: PieceType,
    pub defender_type: PieceType,
    pub attacker_alive: bool,
    pub defender_alive: bool,
    pub result: BattleResult,
    /// 战斗直接决出胜负时（夺旗）的胜方与原因
    pub game_over: Option<(Camp, WinReason)>,
}

/// 结算一次攻击，并更新双方棋子的存活状态
pub fn resolve(attacker: &mut Piece, defender: &mut Piece) -> BattleReport {
    let (result, game_over) = outcome(attacker, defender);

    let (attacker_alive, defender_alive) = match result {
        BattleResult::AttackerWin => (true, false),
        BattleResult::DefenderWin => (false, true),
        BattleResult::BothDie => (false, false),
    };
    attacker.alive &= attacker_alive;
    defender.alive &= defender_alive;

    BattleReport {
        attacker_id: attacker.id.clone(),
        defender_id: defender.id.clone(),
        attacker_type: attacker.piece_type,
        defender_type: defender.piece_type,
        attacker_alive,
        defender_alive,
        result,
        game_over,
    }
}

/// 只依赖双方类型（与军衔）的纯函数部分
fn outcome(attacker: &Piece, defender: &Piece) -> (BattleResult, Option<(Camp, WinReason)>) {
    use PieceType::*;

    match (attacker.piece_type, defender.piece_type) {
        (_, Flag) => (
            BattleResult::AttackerWin,
            Some((attacker.camp, WinReason::FlagCaptured)),
        ),
        (Bomb, _) | (_, Bomb) => (BattleResult::BothDie, None),
        (Engineer, Mine) => (BattleResult::AttackerWin, None),
        (_, Mine) => (BattleResult::DefenderWin, None),
        (a, d) => {
            let attacker_rank = a.rank().unwrap_or(0);
            let defender_rank = d.rank().unwrap_or(0);
            let result = match attacker_rank.cmp(&defender_rank) {
                std::cmp::Ordering::Greater => BattleResult::AttackerWin,
                std::cmp::Ordering::Less => BattleResult::DefenderWin,
                std::cmp::Ordering::Equal => BattleResult::BothDie,
            };
            (result, None)
        }
    }
}
